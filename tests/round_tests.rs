//! Integration tests for the round state machine

use litter_panda::core::{catalog, item, perfect_score, RoundState};
use litter_panda::types::{Category, ClassifyError, ItemId, RoundPhase, HAND_CAPACITY};

fn correct_bin(id: ItemId) -> Category {
    item(id).unwrap().category
}

fn assert_conserved(state: &RoundState) {
    assert_eq!(
        state.pool_remaining() + state.hand().len() + state.discarded() as usize,
        state.catalog_size() as usize,
        "conservation invariant broken"
    );
}

/// Two general, one recycle, one green card.
fn four_card_set() -> Vec<ItemId> {
    vec![ItemId(0), ItemId(1), ItemId(4), ItemId(8)]
}

#[test]
fn test_round_lifecycle() {
    let mut state = RoundState::new(12345);
    assert!(!state.started());

    state.start();
    assert!(state.started());
    assert_eq!(state.hand().len(), HAND_CAPACITY);
    assert_eq!(state.phase(), RoundPhase::InProgress);
    assert_conserved(&state);
}

#[test]
fn test_scenario_small_catalog_full_hand() {
    // Four cards: the opening deal takes the whole pool.
    let mut state = RoundState::with_items(7, &four_card_set());
    state.start();

    assert_eq!(state.hand().len(), 4);
    assert_eq!(state.pool_remaining(), 0);
    assert_eq!(state.phase(), RoundPhase::InProgress);

    // A correct general drop scores, and the round continues on the
    // non-empty hand even though the pool is empty.
    let outcome = state.classify(ItemId(0), Category::General).unwrap();
    assert!(outcome.correct);
    assert_eq!(state.score(), 200);
    assert_eq!(state.hand().len(), 3);
    assert_eq!(state.phase(), RoundPhase::InProgress);
    assert_conserved(&state);

    // Classify the remaining three correctly; the last one ends the round.
    for &id in &[ItemId(1), ItemId(4), ItemId(8)] {
        assert_eq!(state.phase(), RoundPhase::InProgress);
        state.classify(id, correct_bin(id)).unwrap();
        assert_conserved(&state);
    }

    assert_eq!(state.phase(), RoundPhase::Finished);
    assert_eq!(state.score(), 800);
    assert_eq!(state.score(), perfect_score(4));
}

#[test]
fn test_scenario_unknown_item_leaves_state_untouched() {
    let mut state = RoundState::new(12345);
    state.start();

    let hand_before: Vec<ItemId> = state.hand().to_vec();
    let err = state.classify(ItemId(999), Category::General).unwrap_err();

    assert!(matches!(err, ClassifyError::UnknownItem(_)));
    assert_eq!(state.score(), 0);
    assert_eq!(state.hand(), hand_before.as_slice());
    assert_conserved(&state);
}

#[test]
fn test_scenario_finished_round_rejects_classify() {
    let mut state = RoundState::with_items(3, &four_card_set());
    state.start();
    for id in four_card_set() {
        state.classify(id, correct_bin(id)).unwrap();
    }
    assert!(state.finished());

    for bin in Category::ALL {
        let err = state.classify(ItemId(0), bin).unwrap_err();
        assert_eq!(err, ClassifyError::RoundFinished);
    }
}

#[test]
fn test_scenario_refill_pulls_exactly_one() {
    // Six cards, capacity four: two stay in the pool after the deal.
    let items: Vec<ItemId> = catalog::all_ids().take(6).collect();
    let mut state = RoundState::with_items(11, &items);
    state.start();

    assert_eq!(state.hand().len(), 4);
    assert_eq!(state.pool_remaining(), 2);

    let first = state.hand()[0];
    state.classify(first, correct_bin(first)).unwrap();

    assert_eq!(state.hand().len(), 4);
    assert_eq!(state.pool_remaining(), 1);
    assert_conserved(&state);
}

#[test]
fn test_conservation_holds_through_full_round() {
    let mut state = RoundState::new(424242);
    state.start();
    assert_conserved(&state);

    while !state.finished() {
        let next = state.hand()[state.hand().len() - 1];
        state.classify(next, correct_bin(next)).unwrap();
        assert_conserved(&state);
    }
    assert_eq!(state.discarded() as usize, catalog::CATALOG.len());
}

#[test]
fn test_termination_within_catalog_size_calls() {
    // Arbitrary picks and arbitrary bins still exhaust the round.
    for seed in [1u32, 99, 31337] {
        let mut state = RoundState::new(seed);
        state.start();

        let total = state.catalog_size() as usize;
        let mut calls = 0;
        while !state.finished() {
            let pick = state.hand()[calls % state.hand().len()];
            let bin = Category::ALL[calls % Category::ALL.len()];
            state.classify(pick, bin).unwrap();
            calls += 1;
            assert!(calls <= total, "seed {} did not terminate", seed);
        }
        assert_eq!(calls, total);
    }
}

#[test]
fn test_score_is_monotonic_and_hand_shrinks_by_one() {
    let mut state = RoundState::new(777);
    state.start();

    let mut previous_score = state.score();
    while !state.finished() {
        let hand_before = state.hand().len();
        let pool_before = state.pool_remaining();
        let pick = state.hand()[0];
        // Alternate deliberately wrong and right drops.
        let bin = if hand_before % 2 == 0 {
            correct_bin(pick)
        } else {
            Category::ALL
                .into_iter()
                .find(|&c| c != correct_bin(pick))
                .unwrap()
        };

        state.classify(pick, bin).unwrap();

        // Exactly one card left the hand (before any refill came in).
        let refilled = state.pool_remaining() < pool_before;
        let expected = if refilled { hand_before } else { hand_before - 1 };
        assert_eq!(state.hand().len(), expected);
        assert!(state.score() >= previous_score);
        previous_score = state.score();
    }
}

#[test]
fn test_refill_idempotent_between_classifies() {
    let mut state = RoundState::new(555);
    state.start();

    let first: Vec<ItemId> = state.hand().to_vec();
    state.refill();
    let second: Vec<ItemId> = state.hand().to_vec();

    assert_eq!(first, second);
}

#[test]
fn test_mismatch_surfaced_without_penalty() {
    let mut state = RoundState::with_items(5, &four_card_set());
    state.start();

    let outcome = state.classify(ItemId(8), Category::General).unwrap();
    assert!(!outcome.correct);
    assert_eq!(outcome.delta, 0);
    assert_eq!(state.score(), 0);

    let event = state.take_last_event().unwrap();
    assert_eq!(event.item, ItemId(8));
    assert_eq!(event.bin, Category::General);
    assert!(!event.correct);
}

#[test]
fn test_restart_is_the_only_way_back() {
    let mut state = RoundState::with_items(9, &four_card_set());
    state.start();
    for id in four_card_set() {
        state.classify(id, correct_bin(id)).unwrap();
    }
    assert!(state.finished());

    state.restart();
    assert_eq!(state.phase(), RoundPhase::InProgress);
    assert_eq!(state.round_id(), 1);
    assert_eq!(state.score(), 0);
    assert_eq!(state.hand().len(), 4);
    assert_conserved(&state);
}
