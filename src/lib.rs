//! Echo Pairs - a memory-matching card game
//!
//! Core modules:
//! - `game`: Deterministic game logic (deck, board layout, match arbitration)
//! - `render`: WebGPU rendering pipeline
//! - `audio`: Procedurally synthesized sound cues

pub mod audio;
pub mod game;
pub mod render;

pub use game::{GameState, SessionStats};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation tick rate (120 Hz for smooth animation)
    pub const TICK_RATE: u32 = 120;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical view the board is laid out in (letterboxed onto the canvas)
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;

    /// Board dimensions
    pub const GRID_COLS: usize = 4;
    pub const GRID_ROWS: usize = 4;
    pub const CARD_COUNT: usize = GRID_COLS * GRID_ROWS;
    pub const PAIR_COUNT: usize = CARD_COUNT / 2;

    /// Card geometry (view units)
    pub const CARD_WIDTH: f32 = 100.0;
    pub const CARD_HEIGHT: f32 = 140.0;
    pub const CARD_SPACING: f32 = 20.0;
    /// The board sits below the title row
    pub const BOARD_OFFSET_Y: f32 = 40.0;

    /// Convert a millisecond duration to simulation ticks
    pub const fn ms_to_ticks(ms: u32) -> u32 {
        ms * TICK_RATE / 1000
    }

    /// Full card flip (shrink + expand)
    pub const FLIP_TICKS: u32 = ms_to_ticks(300);
    /// Pause between a confirmed match and locking the pair in
    pub const MATCH_HOLD_TICKS: u32 = ms_to_ticks(500);
    /// How long a mismatched pair lingers face up
    pub const MISMATCH_HOLD_TICKS: u32 = ms_to_ticks(1000);
    /// Pause between the final match and the win transition
    pub const WIN_HOLD_TICKS: u32 = ms_to_ticks(1000);
    /// Deal-in stagger per card
    pub const DEAL_STAGGER_TICKS: u32 = ms_to_ticks(50);

    /// Animation durations in seconds (dt-driven)
    pub const FLIP_SECS: f32 = 0.3;
    pub const DEAL_SECS: f32 = 0.3;
    pub const HOVER_SECS: f32 = 0.15;
}

/// Uniform scale that fits the logical view inside a surface (FIT, centered)
#[inline]
pub fn view_scale(surface: Vec2) -> f32 {
    (surface.x / consts::VIEW_WIDTH).min(surface.y / consts::VIEW_HEIGHT)
}

/// Map a physical canvas point into the letterboxed logical view.
///
/// The fragment shader applies the identical mapping, so pointer hit regions
/// and rendered pixels always agree.
pub fn view_from_screen(p: Vec2, surface: Vec2) -> Vec2 {
    let scale = view_scale(surface);
    let view = Vec2::new(consts::VIEW_WIDTH, consts::VIEW_HEIGHT);
    let offset = (surface - view * scale) / 2.0;
    (p - offset) / scale
}
