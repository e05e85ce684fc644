use serde::Serialize;

pub mod adapters;

pub use adapters::{CommitRatedRepo, Leaderboards, RatedUser, WatchRatedRepo};

/// Anything that can be ranked: a score and a line describing it.
pub trait Ratable {
    fn score(&self) -> u64;
    fn label(&self) -> String;
}

/// The `capacity` highest-scoring items offered so far, best first.
///
/// Items with equal scores keep their offer order: a newcomer never overtakes
/// a resident with the same score.
#[derive(Debug, Clone, Serialize)]
pub struct Rating<T> {
    capacity: usize,
    items: Vec<T>,
}

impl<T: Ratable> Rating<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Offers a candidate, returning whether it was kept.
    ///
    /// The candidate goes in front of the first resident with a strictly lower
    /// score, or at the end while there is room. When the rating overflows the
    /// last item is dropped.
    pub fn offer(&mut self, item: T) -> bool {
        if self.capacity == 0 {
            return false;
        }

        let score = item.score();
        let position = self
            .items
            .iter()
            .position(|resident| resident.score() < score)
            .unwrap_or(self.items.len());

        if position >= self.capacity {
            return false;
        }

        self.items.insert(position, item);
        self.items.truncate(self.capacity);
        true
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One line per item: `{rank} (Rating: {score}): {label}`, ranks from 1.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        for (i, item) in self.items.iter().enumerate() {
            out.push_str(&format!(
                "{} (Rating: {}): {}\n",
                i + 1,
                item.score(),
                item.label()
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Scored {
        score: u64,
        seq: usize,
    }

    impl Ratable for Scored {
        fn score(&self) -> u64 {
            self.score
        }

        fn label(&self) -> String {
            format!("#{}", self.seq)
        }
    }

    fn offer_all(capacity: usize, scores: &[u64]) -> Rating<Scored> {
        let mut rating = Rating::new(capacity);
        for (seq, &score) in scores.iter().enumerate() {
            rating.offer(Scored { score, seq });
        }
        rating
    }

    #[test]
    fn keeps_top_three_with_first_offered_tie() {
        let rating = offer_all(3, &[5, 3, 3, 8, 1]);
        let held: Vec<(u64, usize)> = rating.items().iter().map(|s| (s.score, s.seq)).collect();
        assert_eq!(held, vec![(8, 3), (5, 0), (3, 1)]);
    }

    #[test]
    fn capacity_is_fixed_at_construction() {
        let rating = offer_all(3, &[4, 9, 1, 7, 2]);
        assert_eq!(rating.capacity(), 3);
        assert_eq!(rating.len(), 3);
        assert_eq!(Rating::<Scored>::new(0).capacity(), 0);
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut rating = Rating::new(0);
        assert!(!rating.offer(Scored { score: 10, seq: 0 }));
        assert!(rating.is_empty());
    }

    #[test]
    fn fewer_candidates_than_capacity() {
        let rating = offer_all(10, &[1, 4, 2]);
        let scores: Vec<u64> = rating.items().iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![4, 2, 1]);
    }

    #[test]
    fn equal_scores_keep_offer_order() {
        let rating = offer_all(3, &[7, 7, 7, 7]);
        let seqs: Vec<usize> = rating.items().iter().map(|s| s.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn full_rating_rejects_equal_and_lower_scores() {
        let mut rating = offer_all(2, &[5, 4]);
        assert!(!rating.offer(Scored { score: 4, seq: 9 }));
        assert!(!rating.offer(Scored { score: 1, seq: 9 }));
        assert!(rating.offer(Scored { score: 6, seq: 9 }));
        let scores: Vec<u64> = rating.items().iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![6, 5]);
    }

    #[test]
    fn duplicate_of_resident_displaces_only_lower_scores() {
        let mut rating = offer_all(3, &[9, 5, 2]);
        assert!(rating.offer(Scored { score: 5, seq: 7 }));
        let held: Vec<(u64, usize)> = rating.items().iter().map(|s| (s.score, s.seq)).collect();
        assert_eq!(held, vec![(9, 0), (5, 1), (5, 7)]);
        assert!(!rating.offer(Scored { score: 5, seq: 8 }));
    }

    #[test]
    fn pretty_is_one_indexed() {
        let rating = offer_all(3, &[2, 8]);
        assert_eq!(rating.pretty(), "1 (Rating: 8): #1\n2 (Rating: 2): #0\n");
        assert_eq!(Rating::<Scored>::new(3).pretty(), "");
    }

    proptest! {
        #[test]
        fn holds_the_true_top_k(
            capacity in 0usize..8,
            scores in prop::collection::vec(0u64..20, 0..60),
        ) {
            let rating = offer_all(capacity, &scores);

            // Stable sort by descending score gives the expected ranking,
            // earliest offer first among equals.
            let mut expected: Vec<(u64, usize)> =
                scores.iter().copied().enumerate().map(|(seq, s)| (s, seq)).collect();
            expected.sort_by(|a, b| b.0.cmp(&a.0));
            expected.truncate(capacity);

            let held: Vec<(u64, usize)> =
                rating.items().iter().map(|s| (s.score, s.seq)).collect();
            prop_assert!(rating.len() <= capacity);
            prop_assert!(held.windows(2).all(|w| w[0].0 >= w[1].0));
            prop_assert_eq!(held, expected);
        }
    }
}
