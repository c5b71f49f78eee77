use std::collections::{BTreeMap, HashSet};

use crate::models::{
    CardId, DecklistAggregate, RawDecklistEntry, SimilarityMode, SimilarityResult,
};

use super::{normalize, select_card_ids, EngineError};

/// Score how much of the comparison leader's significant card pool the target
/// leader already plays.
///
/// Both pools keep cards at or above `occurrence_threshold`. The comparison
/// pool excludes both leaders so a leader card never inflates the score. An
/// empty comparison pool scores `0.0`.
pub fn compare(
    target: &DecklistAggregate,
    comparison: &DecklistAggregate,
    target_leader_id: &str,
    comparison_leader_id: &str,
    occurrence_threshold: f64,
    mode: SimilarityMode,
) -> SimilarityResult {
    let target_pool: HashSet<CardId> =
        select_card_ids(target, occurrence_threshold, &[target_leader_id])
            .into_iter()
            .collect();
    let comparison_pool = select_card_ids(
        comparison,
        occurrence_threshold,
        &[comparison_leader_id, target_leader_id],
    );

    let (cards_intersection, cards_missing): (Vec<CardId>, Vec<CardId>) = comparison_pool
        .iter()
        .cloned()
        .partition(|card_id| target_pool.contains(card_id));

    let similarity_score = match mode {
        SimilarityMode::CardCount => ratio(
            cards_intersection.len() as f64,
            comparison_pool.len() as f64,
        ),
        SimilarityMode::OccurrenceWeighted => {
            let mass = |cards: &[CardId]| -> f64 {
                cards
                    .iter()
                    .map(|card_id| comparison.occurrence_proportion(card_id))
                    .sum()
            };
            ratio(mass(&cards_intersection), mass(&comparison_pool))
        }
    };

    let card_id_to_avg_count = comparison_pool
        .iter()
        .map(|card_id| (card_id.clone(), comparison.avg_count(card_id)))
        .collect();

    SimilarityResult {
        leader_id: comparison_leader_id.to_string(),
        mode,
        similarity_score,
        cards_intersection,
        cards_missing,
        card_id_to_avg_count,
    }
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Bucket entries by leader id, keeping input order within each bucket.
pub fn group_by_leader(entries: &[RawDecklistEntry]) -> BTreeMap<CardId, Vec<RawDecklistEntry>> {
    let mut groups: BTreeMap<CardId, Vec<RawDecklistEntry>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(entry.leader_id().to_string())
            .or_default()
            .push(entry.clone());
    }
    groups
}

/// Compare the target leader against every other leader in `candidates`.
///
/// Candidates with an empty comparison pool are skipped. Results are sorted
/// by score descending, ties by leader id.
pub fn rank_similar_leaders(
    target_entries: &[RawDecklistEntry],
    target_leader_id: &str,
    candidates: &BTreeMap<CardId, Vec<RawDecklistEntry>>,
    occurrence_threshold: f64,
    mode: SimilarityMode,
) -> Result<Vec<SimilarityResult>, EngineError> {
    let target = normalize(target_entries)?;

    let mut results = Vec::new();
    for (leader_id, entries) in candidates {
        if leader_id == target_leader_id || entries.is_empty() {
            continue;
        }
        let comparison = normalize(entries)?;
        let result = compare(
            &target,
            &comparison,
            target_leader_id,
            leader_id,
            occurrence_threshold,
            mode,
        );
        if result.cards_intersection.is_empty() && result.cards_missing.is_empty() {
            continue;
        }
        results.push(result);
    }

    results.sort_by(|a, b| {
        b.similarity_score
            .total_cmp(&a.similarity_score)
            .then_with(|| a.leader_id.cmp(&b.leader_id))
    });
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::test_support::{entry, l1_entries};
    use pretty_assertions::assert_eq;

    fn l2_entries() -> Vec<RawDecklistEntry> {
        vec![
            entry("q1", "L2", &[("L2", 1), ("A", 4), ("C", 2), ("D", 4)]),
            entry("q2", "L2", &[("L2", 1), ("A", 4), ("D", 4), ("E", 1)]),
            entry("q3", "L2", &[("L2", 1), ("A", 2), ("D", 2), ("L1", 1)]),
            entry("q4", "L2", &[("L2", 1), ("D", 3)]),
        ]
    }

    #[test]
    fn test_self_similarity_is_one() {
        let aggregate = normalize(&l1_entries()).unwrap();
        let result = compare(&aggregate, &aggregate, "L1", "L1", 0.0, SimilarityMode::CardCount);

        assert_eq!(result.similarity_score, 1.0);
        assert_eq!(result.cards_intersection, vec!["A", "B", "C"]);
        assert!(result.cards_missing.is_empty());
    }

    #[test]
    fn test_compare_count_mode() {
        let target = normalize(&l1_entries()).unwrap();
        let comparison = normalize(&l2_entries()).unwrap();
        let result = compare(&target, &comparison, "L1", "L2", 0.0, SimilarityMode::CardCount);

        // comparison pool: D(4) A(3) C(1) E(1); L1 and L2 are dropped
        assert_eq!(result.cards_intersection, vec!["A", "C"]);
        assert_eq!(result.cards_missing, vec!["D", "E"]);
        assert_eq!(result.similarity_score, 0.5);
        assert_eq!(result.leader_id, "L2");
        assert_eq!(result.card_id_to_avg_count.len(), 4);
        assert_eq!(result.card_id_to_avg_count["A"], 3.33);
        assert!(!result.card_id_to_avg_count.contains_key("L1"));
    }

    #[test]
    fn test_compare_weighted_mode() {
        let target = normalize(&l1_entries()).unwrap();
        let comparison = normalize(&l2_entries()).unwrap();
        let result = compare(
            &target,
            &comparison,
            "L1",
            "L2",
            0.0,
            SimilarityMode::OccurrenceWeighted,
        );

        // (0.75 + 0.25) / (1.0 + 0.75 + 0.25 + 0.25)
        assert!((result.similarity_score - 1.0 / 2.25).abs() < 1e-9);
        assert_eq!(result.mode, SimilarityMode::OccurrenceWeighted);
    }

    #[test]
    fn test_compare_threshold_restricts_pools() {
        let target = normalize(&l1_entries()).unwrap();
        let comparison = normalize(&l2_entries()).unwrap();
        let result = compare(&target, &comparison, "L1", "L2", 0.6, SimilarityMode::CardCount);

        // target pool: A; comparison pool: D, A
        assert_eq!(result.cards_intersection, vec!["A"]);
        assert_eq!(result.cards_missing, vec!["D"]);
        assert_eq!(result.similarity_score, 0.5);
    }

    #[test]
    fn test_compare_empty_comparison_pool_scores_zero() {
        let target = normalize(&l1_entries()).unwrap();
        let comparison = normalize(&[entry("q1", "L2", &[("L2", 1)])]).unwrap();

        for mode in [SimilarityMode::CardCount, SimilarityMode::OccurrenceWeighted] {
            let result = compare(&target, &comparison, "L1", "L2", 0.0, mode);
            assert_eq!(result.similarity_score, 0.0);
            assert!(result.cards_intersection.is_empty());
            assert!(result.cards_missing.is_empty());
        }
    }

    #[test]
    fn test_intersection_and_missing_are_disjoint() {
        let target = normalize(&l2_entries()).unwrap();
        let comparison = normalize(&l1_entries()).unwrap();
        let result = compare(&target, &comparison, "L2", "L1", 0.0, SimilarityMode::CardCount);

        for card_id in &result.cards_intersection {
            assert!(!result.cards_missing.contains(card_id));
        }
        assert!(!result.cards_missing.iter().any(|c| c == "L1" || c == "L2"));
        assert!((0.0..=1.0).contains(&result.similarity_score));
    }

    #[test]
    fn test_group_by_leader() {
        let mut entries = l1_entries();
        entries.extend(l2_entries());
        let groups = group_by_leader(&entries);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["L1"].len(), 2);
        assert_eq!(groups["L2"].len(), 4);
        assert_eq!(groups["L2"][0].player_id(), "q1");
    }

    #[test]
    fn test_rank_similar_leaders() {
        let mut entries = l1_entries();
        entries.extend(l2_entries());
        entries.push(entry("r1", "L3", &[("L3", 1), ("A", 4), ("B", 4)]));
        entries.push(entry("s1", "L4", &[("L4", 1)]));
        let groups = group_by_leader(&entries);

        let ranked = rank_similar_leaders(
            &groups["L1"],
            "L1",
            &groups,
            0.0,
            SimilarityMode::CardCount,
        )
        .unwrap();

        let leaders: Vec<&str> = ranked.iter().map(|r| r.leader_id.as_str()).collect();
        // L1 is the target, L4 has nothing besides its leader
        assert_eq!(leaders, vec!["L3", "L2"]);
        assert_eq!(ranked[0].similarity_score, 1.0);
    }

    #[test]
    fn test_rank_similar_leaders_requires_target_data() {
        let groups = group_by_leader(&l1_entries());
        let err = rank_similar_leaders(&[], "L9", &groups, 0.0, SimilarityMode::CardCount);
        assert_eq!(err, Err(EngineError::EmptyInput("decklists")));
    }
}
