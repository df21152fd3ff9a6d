//! Scoring module - classification scoring policy
//!
//! A drop on the bin matching the item's category scores a fixed
//! `MATCH_POINTS`; any mismatch scores zero. There is no penalty and no
//! retry: the card is spent either way, and the mismatch is surfaced to
//! observers through the round's last event rather than through the score.

use litter_panda_types::{Category, MATCH_POINTS};

/// Result of evaluating a single drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifyResult {
    pub delta: u32,
    pub correct: bool,
}

/// Evaluate an item category against the bin it was dropped on.
pub fn evaluate(item: Category, target_bin: Category) -> ClassifyResult {
    if item == target_bin {
        ClassifyResult {
            delta: MATCH_POINTS,
            correct: true,
        }
    } else {
        ClassifyResult {
            delta: 0,
            correct: false,
        }
    }
}

/// Score of a flawless round over `cards` cards.
pub fn perfect_score(cards: usize) -> u32 {
    (cards as u32) * MATCH_POINTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_scores_fixed_points() {
        for cat in Category::ALL {
            let result = evaluate(cat, cat);
            assert!(result.correct);
            assert_eq!(result.delta, 200);
        }
    }

    #[test]
    fn test_mismatch_scores_zero() {
        let result = evaluate(Category::Green, Category::General);
        assert!(!result.correct);
        assert_eq!(result.delta, 0);

        let result = evaluate(Category::Recycle, Category::Green);
        assert!(!result.correct);
        assert_eq!(result.delta, 0);
    }

    #[test]
    fn test_perfect_score() {
        assert_eq!(perfect_score(0), 0);
        assert_eq!(perfect_score(4), 800);
        assert_eq!(perfect_score(12), 2400);
    }
}
