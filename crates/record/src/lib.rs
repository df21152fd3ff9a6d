//! Record module - final score packaging and leaderboard submission
//!
//! The round core never talks to a backend. When a round finishes, the host
//! asks [`RecordFinalizer`] to package the score together with the player
//! identity and hand it to a [`RecordStore`]. Identity is an explicit
//! parameter, never ambient state: with no signed-in player, submission is
//! disabled and the local score stands on its own.
//!
//! Submission happens at most once per round. A failed attempt surfaces the
//! store's reason unchanged and leaves the finalizer armed so the player can
//! retry explicitly; nothing is retried internally.

use serde::{Deserialize, Serialize};

/// Leaderboard entry, serialized with the backend's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player: String,
    pub point: u32,
}

impl PlayerRecord {
    /// Pure construction; no I/O.
    pub fn new(player: impl Into<String>, point: u32) -> Self {
        Self {
            player: player.into(),
            point,
        }
    }
}

/// Supplies the current player name, if anyone is signed in.
pub trait Identity {
    fn player_name(&self) -> Option<String>;
}

/// Remote record-submission collaborator.
///
/// Implementations report failure with an opaque reason; callers decide
/// whether to retry.
pub trait RecordStore {
    fn store_record(&self, record: &PlayerRecord) -> anyhow::Result<()>;
}

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved(PlayerRecord),
    /// A record for this round was already stored.
    AlreadySaved,
    /// No signed-in player; the local score still stands.
    Disabled,
    /// The store rejected the record; kept available for an explicit retry.
    Failed { record: PlayerRecord, reason: String },
}

/// Packages the final score and drives at-most-once submission per round.
#[derive(Debug, Clone, Default)]
pub struct RecordFinalizer {
    saved: bool,
}

impl RecordFinalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this round's record has been stored.
    pub fn saved(&self) -> bool {
        self.saved
    }

    /// Re-arm for a fresh round.
    pub fn reset(&mut self) {
        self.saved = false;
    }

    /// Package a final score for the given player. Pure construction.
    pub fn finalize(&self, player: &str, score: u32) -> PlayerRecord {
        PlayerRecord::new(player, score)
    }

    /// Submit the final score on behalf of the identified player.
    pub fn submit(
        &mut self,
        identity: &dyn Identity,
        store: &dyn RecordStore,
        score: u32,
    ) -> SubmitOutcome {
        if self.saved {
            return SubmitOutcome::AlreadySaved;
        }

        let Some(player) = identity.player_name() else {
            return SubmitOutcome::Disabled;
        };

        let record = self.finalize(&player, score);
        match store.store_record(&record) {
            Ok(()) => {
                self.saved = true;
                SubmitOutcome::Saved(record)
            }
            Err(err) => SubmitOutcome::Failed {
                record,
                reason: err.to_string(),
            },
        }
    }
}

/// In-process store, used by tests and as a host fallback.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: std::sync::Mutex<Vec<PlayerRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<PlayerRecord> {
        self.records.lock().expect("record store poisoned").clone()
    }
}

impl RecordStore for MemoryStore {
    fn store_record(&self, record: &PlayerRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .expect("record store poisoned")
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedIdentity(Option<&'static str>);

    impl Identity for FixedIdentity {
        fn player_name(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    struct RejectingStore;

    impl RecordStore for RejectingStore {
        fn store_record(&self, _record: &PlayerRecord) -> anyhow::Result<()> {
            anyhow::bail!("backend unavailable")
        }
    }

    #[test]
    fn test_finalize_is_pure_construction() {
        let finalizer = RecordFinalizer::new();
        let record = finalizer.finalize("panda", 800);
        assert_eq!(record, PlayerRecord::new("panda", 800));
        assert!(!finalizer.saved());
    }

    #[test]
    fn test_record_wire_field_names() {
        let record = PlayerRecord::new("panda", 800);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"player":"panda","point":800}"#);
    }

    #[test]
    fn test_submit_stores_once() {
        let mut finalizer = RecordFinalizer::new();
        let store = MemoryStore::new();
        let identity = FixedIdentity(Some("panda"));

        let outcome = finalizer.submit(&identity, &store, 800);
        assert_eq!(outcome, SubmitOutcome::Saved(PlayerRecord::new("panda", 800)));
        assert!(finalizer.saved());
        assert_eq!(store.records().len(), 1);

        // Second save of the same round is refused.
        let outcome = finalizer.submit(&identity, &store, 800);
        assert_eq!(outcome, SubmitOutcome::AlreadySaved);
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn test_submit_disabled_without_identity() {
        let mut finalizer = RecordFinalizer::new();
        let store = MemoryStore::new();

        let outcome = finalizer.submit(&FixedIdentity(None), &store, 400);
        assert_eq!(outcome, SubmitOutcome::Disabled);
        assert!(!finalizer.saved());
        assert!(store.records().is_empty());
    }

    #[test]
    fn test_failed_submit_allows_retry() {
        let mut finalizer = RecordFinalizer::new();
        let identity = FixedIdentity(Some("panda"));

        let outcome = finalizer.submit(&identity, &RejectingStore, 600);
        match outcome {
            SubmitOutcome::Failed { record, reason } => {
                assert_eq!(record, PlayerRecord::new("panda", 600));
                assert_eq!(reason, "backend unavailable");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!finalizer.saved());

        // Explicit retry against a working store succeeds.
        let store = MemoryStore::new();
        let outcome = finalizer.submit(&identity, &store, 600);
        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn test_reset_rearms_for_next_round() {
        let mut finalizer = RecordFinalizer::new();
        let store = MemoryStore::new();
        let identity = FixedIdentity(Some("panda"));

        finalizer.submit(&identity, &store, 200);
        assert!(finalizer.saved());

        finalizer.reset();
        assert!(!finalizer.saved());
        finalizer.submit(&identity, &store, 400);
        assert_eq!(store.records().len(), 2);
    }
}
