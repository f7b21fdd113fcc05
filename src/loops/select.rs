use super::ScoredWalk;
use ordered_float::OrderedFloat;
use rand::Rng;
use rand::seq::SliceRandom;

/// Order in which the retained walks are handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrder {
    /// Best score first.
    #[default]
    Ranked,
    /// The best `count` walks in a random order.
    Randomized,
}

/// Keeps the `count` best scoring walks.
///
/// The sort is stable, so walks with equal scores keep their enumeration order.
/// Randomizing only permutes the kept walks, it never changes which are kept.
pub fn select_walks<R: Rng + ?Sized>(
    mut walks: Vec<ScoredWalk>,
    count: usize,
    order: SelectionOrder,
    rng: &mut R,
) -> Vec<ScoredWalk> {
    walks.sort_by_key(|w| OrderedFloat(w.score));
    walks.truncate(count);

    if order == SelectionOrder::Randomized {
        walks.shuffle(rng);
    }

    walks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loops::Walk;
    use crate::street_graph::EdgeId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn scored(id: i64, score: f64) -> ScoredWalk {
        ScoredWalk {
            walk: Walk {
                nodes: vec![0, id, 0],
                edges: vec![EdgeId(id as u32), EdgeId(id as u32)],
                distance: 100.0,
                turning: 0.0,
            },
            score,
        }
    }

    fn middles(walks: &[ScoredWalk]) -> Vec<i64> {
        walks.iter().map(|w| w.walk.nodes[1]).collect()
    }

    fn sample() -> Vec<ScoredWalk> {
        vec![
            scored(1, 0.5),
            scored(2, 0.1),
            scored(3, 0.3),
            scored(4, 0.1),
            scored(5, 0.9),
        ]
    }

    #[test]
    fn test_ranked_keeps_best_in_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_walks(sample(), 3, SelectionOrder::Ranked, &mut rng);
        // 2 and 4 tie, stable sort keeps input order.
        assert_eq!(middles(&picked), vec![2, 4, 3]);
    }

    #[test]
    fn test_count_larger_than_available() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_walks(sample(), 50, SelectionOrder::Ranked, &mut rng);
        assert_eq!(picked.len(), 5);
        assert!(select_walks(Vec::new(), 3, SelectionOrder::Ranked, &mut rng).is_empty());
    }

    #[test]
    fn test_randomized_permutes_the_same_selection() {
        let mut rng = StdRng::seed_from_u64(42);
        let ranked = select_walks(sample(), 4, SelectionOrder::Ranked, &mut rng);
        let shuffled = select_walks(sample(), 4, SelectionOrder::Randomized, &mut rng);

        let mut a = middles(&ranked);
        let mut b = middles(&shuffled);
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_randomized_is_reproducible_with_a_seed() {
        let first = select_walks(
            sample(),
            5,
            SelectionOrder::Randomized,
            &mut StdRng::seed_from_u64(3),
        );
        let second = select_walks(
            sample(),
            5,
            SelectionOrder::Randomized,
            &mut StdRng::seed_from_u64(3),
        );
        assert_eq!(first, second);
    }
}
