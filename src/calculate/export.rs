use crate::models::Decklist;

/// The decklist with the leader present exactly once.
pub fn ensure_leader(decklist: &Decklist, leader_id: &str) -> Decklist {
    let mut decklist = decklist.clone();
    decklist.insert(leader_id.to_string(), 1);
    decklist
}

/// Render a decklist in the simulator import format: one `{count}x{card_id}`
/// per line, leader first.
pub fn export_decklist(decklist: &Decklist, leader_id: &str) -> String {
    std::iter::once(format!("1x{}", leader_id))
        .chain(
            decklist
                .iter()
                .filter(|(card_id, _)| card_id.as_str() != leader_id)
                .map(|(card_id, count)| format!("{}x{}", count, card_id)),
        )
        .collect::<Vec<_>>()
        .join("\n")
}
