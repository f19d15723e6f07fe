//! Seeded simulation module
//!
//! All gameplay logic lives here. This module must stay platform neutral:
//! - Seeded RNG only
//! - Stable iteration order (spawn order, which is also id order)
//! - No rendering or platform dependencies

pub mod circle;
pub mod collision;
pub mod state;
pub mod tick;
pub mod wave;

pub use circle::{Circle, Removal, RemovalCause};
pub use collision::{CooldownTable, PairKey, resolve_all, resolve_pair};
pub use state::{FrameStats, GameEvent, GamePhase, GameState};
pub use tick::tick;
pub use wave::{Progress, advance_level, apply_failsafe, level_speed, spawn_batch};
