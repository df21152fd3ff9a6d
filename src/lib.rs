//! Litter Panda (workspace facade crate).
//!
//! This package keeps the `litter_panda::{core,adapter,record,types}` public
//! API stable while the implementation lives in dedicated crates under
//! `crates/`.

pub use litter_panda_adapter as adapter;
pub use litter_panda_core as core;
pub use litter_panda_record as record;
pub use litter_panda_types as types;
