use crate::models::{CardId, DecklistAggregate};

/// Card ids of `aggregate` ordered by occurrence count descending, ties by
/// card id ascending.
pub fn card_ids_by_occurrence(aggregate: &DecklistAggregate) -> Vec<&CardId> {
    let mut card_ids: Vec<&CardId> = aggregate.card_id_to_occurrences.keys().collect();
    // Keys come out of the map in card id order; the stable sort keeps it for ties.
    card_ids.sort_by(|a, b| aggregate.occurrences(b).cmp(&aggregate.occurrences(a)));
    card_ids
}

/// Card ids played in at least `occurrence_threshold` of the decklists,
/// minus `exclude_card_ids`, by occurrence descending.
///
/// A threshold of `0.0` keeps every card.
pub fn select_card_ids(
    aggregate: &DecklistAggregate,
    occurrence_threshold: f64,
    exclude_card_ids: &[&str],
) -> Vec<CardId> {
    card_ids_by_occurrence(aggregate)
        .into_iter()
        .filter(|card_id| !exclude_card_ids.contains(&card_id.as_str()))
        .filter(|card_id| aggregate.occurrence_proportion(card_id) >= occurrence_threshold)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::normalize;
    use crate::calculate::test_support::{entry, l1_entries};

    #[test]
    fn test_select_with_threshold_and_exclusion() {
        let aggregate = normalize(&l1_entries()).unwrap();
        assert_eq!(select_card_ids(&aggregate, 0.6, &["L1"]), vec!["A"]);
    }

    #[test]
    fn test_select_zero_threshold_keeps_all() {
        let aggregate = normalize(&l1_entries()).unwrap();
        assert_eq!(
            select_card_ids(&aggregate, 0.0, &[]),
            vec!["A", "L1", "B", "C"]
        );
    }

    #[test]
    fn test_select_orders_by_raw_occurrences() {
        let entries = vec![
            entry("p1", "L1", &[("L1", 1), ("Z", 1), ("B", 4)]),
            entry("p2", "L1", &[("L1", 1), ("Z", 1)]),
            entry("p3", "L1", &[("L1", 1), ("Z", 1), ("A", 4)]),
        ];
        let aggregate = normalize(&entries).unwrap();

        assert_eq!(
            select_card_ids(&aggregate, 0.0, &["L1"]),
            vec!["Z", "A", "B"]
        );
    }

    #[test]
    fn test_select_threshold_is_inclusive() {
        let aggregate = normalize(&l1_entries()).unwrap();
        assert_eq!(
            select_card_ids(&aggregate, 0.5, &["L1", "A"]),
            vec!["B", "C"]
        );
        assert!(select_card_ids(&aggregate, 1.01, &[]).is_empty());
    }
}
