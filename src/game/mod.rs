//! Deterministic game module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod deck;
pub mod grid;
pub mod rating;
pub mod state;
pub mod tick;

pub use deck::{Card, build_deck};
pub use grid::{hit_test, slot_center};
pub use rating::Rating;
pub use state::{GameEvent, GameState, RoundPhase, SessionStats};
pub use tick::{TickInput, tick};
