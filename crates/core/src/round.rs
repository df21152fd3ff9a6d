//! Round state module - manages the complete state of one sorting round
//!
//! This module ties together the core components: catalog, draw pool, active
//! hand, and scoring. Classification arrives as resolved `(item, bin)` pairs;
//! the module makes no assumption about gesture mechanics. Everything here is
//! synchronous and deterministic under the pool seed.

use arrayvec::ArrayVec;

use litter_panda_types::{
    Category, ClassifyError, ClassifyEvent, ItemId, RoundPhase, HAND_CAPACITY,
};

use crate::rng::DrawPool;
use crate::snapshot::RoundSnapshot;
use crate::{catalog, scoring};

/// Outcome of a successful classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOutcome {
    pub correct: bool,
    pub delta: u32,
    /// Total round score after applying the delta.
    pub score: u32,
    /// Whether this classification ended the round.
    pub finished: bool,
}

/// Complete round state
#[derive(Debug, Clone)]
pub struct RoundState {
    pool: DrawPool,
    hand: ArrayVec<ItemId, HAND_CAPACITY>,
    score: u32,
    discarded: u16,
    catalog_size: u16,
    phase: RoundPhase,
    /// Monotonic round id (increments on restart).
    round_id: u32,
    started: bool,
    /// Last classification event (consumed by observers).
    last_event: Option<ClassifyEvent>,
    /// Item set the round was dealt from (kept for restart).
    items: Vec<ItemId>,
}

impl RoundState {
    /// Create a round over the full compiled-in catalog.
    pub fn new(seed: u32) -> Self {
        let items: Vec<ItemId> = catalog::all_ids().collect();
        Self::with_items(seed, &items)
    }

    /// Create a round over an explicit item set.
    pub fn with_items(seed: u32, items: &[ItemId]) -> Self {
        Self {
            pool: DrawPool::with_items(seed, items),
            hand: ArrayVec::new(),
            score: 0,
            discarded: 0,
            catalog_size: items.len() as u16,
            phase: RoundPhase::InProgress,
            round_id: 0,
            started: false,
            last_event: None,
            items: items.to_vec(),
        }
    }

    /// Start the round and deal the opening hand
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.refill();
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn finished(&self) -> bool {
        self.phase == RoundPhase::Finished
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn hand(&self) -> &[ItemId] {
        &self.hand
    }

    pub fn pool_remaining(&self) -> usize {
        self.pool.len()
    }

    pub fn discarded(&self) -> u16 {
        self.discarded
    }

    pub fn catalog_size(&self) -> u16 {
        self.catalog_size
    }

    pub fn round_id(&self) -> u32 {
        self.round_id
    }

    pub fn seed(&self) -> u32 {
        self.pool.seed()
    }

    /// Resolve a dragged card against a target bin.
    ///
    /// The card is removed from the hand whether or not the bin matched
    /// (there is no retry), the hand is refilled from the pool, and the
    /// round transitions to `Finished` once pool and hand are both empty.
    pub fn classify(
        &mut self,
        item: ItemId,
        bin: Category,
    ) -> Result<ClassifyOutcome, ClassifyError> {
        if self.phase == RoundPhase::Finished {
            return Err(ClassifyError::RoundFinished);
        }

        let Some(position) = self.hand.iter().position(|&held| held == item) else {
            return Err(ClassifyError::UnknownItem(item));
        };

        let Some(entry) = catalog::item(item) else {
            return Err(ClassifyError::UnknownItem(item));
        };

        let result = scoring::evaluate(entry.category, bin);
        self.score += result.delta;

        self.hand.remove(position);
        self.discarded += 1;
        self.refill();

        if self.pool.is_empty() && self.hand.is_empty() {
            self.phase = RoundPhase::Finished;
        }

        self.last_event = Some(ClassifyEvent {
            item,
            bin,
            correct: result.correct,
            delta: result.delta,
        });

        Ok(ClassifyOutcome {
            correct: result.correct,
            delta: result.delta,
            score: self.score,
            finished: self.finished(),
        })
    }

    /// Top the hand back up from the pool.
    ///
    /// No-op when the hand is already full or the pool is exhausted; the
    /// hand may legitimately sit below capacity near the end of a round.
    pub fn refill(&mut self) {
        while self.hand.len() < HAND_CAPACITY {
            let Ok(id) = self.pool.draw_random() else {
                break;
            };
            self.hand.push(id);
        }
        debug_assert!(self.hand.len() == HAND_CAPACITY || self.pool.is_empty());
    }

    /// Begin a fresh round over the same item set.
    ///
    /// The RNG sequence continues from its current state so consecutive
    /// rounds deal different hands.
    pub fn restart(&mut self) {
        let seed = self.pool.seed();
        let next_round = self.round_id.wrapping_add(1);
        let items = std::mem::take(&mut self.items);
        *self = Self::with_items(seed, &items);
        self.round_id = next_round;
        self.start();
    }

    /// Take and clear the last classification event.
    pub fn take_last_event(&mut self) -> Option<ClassifyEvent> {
        self.last_event.take()
    }

    pub fn snapshot_into(&self, out: &mut RoundSnapshot) {
        out.hand = [None; HAND_CAPACITY];
        for (slot, &id) in out.hand.iter_mut().zip(self.hand.iter()) {
            *slot = Some(id);
        }
        out.score = self.score;
        out.phase = self.phase;
        out.pool_remaining = self.pool.len() as u16;
        out.discarded = self.discarded;
        out.catalog_size = self.catalog_size;
        out.round_id = self.round_id;
        out.seed = self.pool.seed();
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let mut s = RoundSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new(1)
    }
}
