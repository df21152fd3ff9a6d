//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the round rules, state management, and scoring.
//! It has **zero dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed deals identical rounds
//! - **Testable**: Comprehensive unit tests for all round rules
//! - **Portable**: Can run under any host (touch UI, headless, tests)
//!
//! # Module Structure
//!
//! - [`catalog`]: the static table of classifiable garbage cards
//! - [`rng`]: seeded uniform draw-without-replacement over the pool
//! - [`round`]: complete round state machine (deal, classify, finish)
//! - [`scoring`]: fixed-points classification scoring policy
//! - [`snapshot`]: read-only round view for presentation polling
//!
//! # Game Rules
//!
//! - A round deals the whole catalog exactly once, four cards at a time
//! - Dropping a card on the bin matching its category scores 200 points
//! - A mismatch scores nothing but still spends the card (no retry)
//! - The hand refills after every drop; the round ends when pool and hand
//!   are both empty
//!
//! # Example
//!
//! ```
//! use litter_panda_core::{item, RoundState};
//!
//! let mut round = RoundState::new(12345);
//! round.start();
//!
//! let card = round.hand()[0];
//! let bin = item(card).unwrap().category;
//! let outcome = round.classify(card, bin).unwrap();
//!
//! assert!(outcome.correct);
//! assert_eq!(round.score(), 200);
//! ```

pub mod catalog;
pub mod rng;
pub mod round;
pub mod scoring;
pub mod snapshot;

pub use litter_panda_types as types;

// Re-export commonly used types for convenience
pub use catalog::{item, Item, CATALOG};
pub use rng::{DrawPool, SimpleRng};
pub use round::{ClassifyOutcome, RoundState};
pub use scoring::{evaluate, perfect_score, ClassifyResult};
pub use snapshot::RoundSnapshot;
