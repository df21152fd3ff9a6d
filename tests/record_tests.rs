//! Record finalization against a played-out round

use std::sync::Mutex;

use litter_panda::core::{item, RoundState};
use litter_panda::record::{
    Identity, MemoryStore, PlayerRecord, RecordFinalizer, RecordStore, SubmitOutcome,
};

struct FixedIdentity(Option<&'static str>);

impl Identity for FixedIdentity {
    fn player_name(&self) -> Option<String> {
        self.0.map(str::to_string)
    }
}

/// Fails the first attempt, then recovers.
struct FlakyStore {
    inner: MemoryStore,
    failed_once: Mutex<bool>,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failed_once: Mutex::new(false),
        }
    }
}

impl RecordStore for FlakyStore {
    fn store_record(&self, record: &PlayerRecord) -> anyhow::Result<()> {
        let mut failed = self.failed_once.lock().unwrap();
        if !*failed {
            *failed = true;
            anyhow::bail!("leaderboard timeout");
        }
        self.inner.store_record(record)
    }
}

fn play_out(seed: u32) -> RoundState {
    let mut state = RoundState::new(seed);
    state.start();
    while !state.finished() {
        let next = state.hand()[0];
        let bin = item(next).unwrap().category;
        state.classify(next, bin).unwrap();
    }
    state
}

#[test]
fn test_final_score_submitted_once() {
    let round = play_out(31);
    let store = MemoryStore::new();
    let mut finalizer = RecordFinalizer::new();

    let outcome = finalizer.submit(&FixedIdentity(Some("panda")), &store, round.score());
    assert_eq!(
        outcome,
        SubmitOutcome::Saved(PlayerRecord::new("panda", round.score()))
    );

    let outcome = finalizer.submit(&FixedIdentity(Some("panda")), &store, round.score());
    assert_eq!(outcome, SubmitOutcome::AlreadySaved);
    assert_eq!(store.records().len(), 1);
}

#[test]
fn test_no_identity_disables_submission_score_stands() {
    let round = play_out(32);
    assert!(round.score() > 0);

    let store = MemoryStore::new();
    let mut finalizer = RecordFinalizer::new();
    let outcome = finalizer.submit(&FixedIdentity(None), &store, round.score());

    assert_eq!(outcome, SubmitOutcome::Disabled);
    assert!(store.records().is_empty());
    // The local score is untouched by the failed hand-off.
    assert!(round.finished());
}

#[test]
fn test_failure_surfaces_reason_and_allows_explicit_retry() {
    let round = play_out(33);
    let store = FlakyStore::new();
    let mut finalizer = RecordFinalizer::new();
    let identity = FixedIdentity(Some("panda"));

    match finalizer.submit(&identity, &store, round.score()) {
        SubmitOutcome::Failed { record, reason } => {
            assert_eq!(record.point, round.score());
            assert_eq!(reason, "leaderboard timeout");
        }
        other => panic!("expected failure, got {:?}", other),
    }

    // The user hits save again; this time it lands.
    match finalizer.submit(&identity, &store, round.score()) {
        SubmitOutcome::Saved(record) => assert_eq!(record.player, "panda"),
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(store.inner.records().len(), 1);
}

#[test]
fn test_new_round_rearms_submission() {
    let store = MemoryStore::new();
    let mut finalizer = RecordFinalizer::new();
    let identity = FixedIdentity(Some("panda"));

    let first = play_out(34);
    finalizer.submit(&identity, &store, first.score());

    let second = play_out(35);
    finalizer.reset();
    let outcome = finalizer.submit(&identity, &store, second.score());
    assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    assert_eq!(store.records().len(), 2);
}
