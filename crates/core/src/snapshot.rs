use litter_panda_types::{ItemId, RoundPhase, HAND_CAPACITY};

/// Read-only copyable view of a round, for presentation polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundSnapshot {
    /// Active hand, front-filled; trailing slots are `None`.
    pub hand: [Option<ItemId>; HAND_CAPACITY],
    pub score: u32,
    pub phase: RoundPhase,
    pub pool_remaining: u16,
    pub discarded: u16,
    pub catalog_size: u16,
    pub round_id: u32,
    pub seed: u32,
}

impl RoundSnapshot {
    pub fn clear(&mut self) {
        self.hand = [None; HAND_CAPACITY];
        self.score = 0;
        self.phase = RoundPhase::InProgress;
        self.pool_remaining = 0;
        self.discarded = 0;
        self.catalog_size = 0;
        self.round_id = 0;
        self.seed = 0;
    }

    pub fn hand_len(&self) -> usize {
        self.hand.iter().flatten().count()
    }

    pub fn playable(&self) -> bool {
        self.phase == RoundPhase::InProgress
    }
}

impl Default for RoundSnapshot {
    fn default() -> Self {
        let mut s = Self {
            hand: [None; HAND_CAPACITY],
            score: 0,
            phase: RoundPhase::InProgress,
            pool_remaining: 0,
            discarded: 0,
            catalog_size: 0,
            round_id: 0,
            seed: 0,
        };
        s.clear();
        s
    }
}
