//! Board layout and pointer hit testing
//!
//! The board lives in a fixed 800x600 logical view; `view_from_screen` in the
//! crate root maps physical canvas pixels into it.

use glam::Vec2;

use crate::consts::*;

/// Center of the top-left card
fn board_origin() -> Vec2 {
    let total_w = GRID_COLS as f32 * CARD_WIDTH + (GRID_COLS - 1) as f32 * CARD_SPACING;
    let total_h = GRID_ROWS as f32 * CARD_HEIGHT + (GRID_ROWS - 1) as f32 * CARD_SPACING;
    Vec2::new(
        (VIEW_WIDTH - total_w) / 2.0 + CARD_WIDTH / 2.0,
        (VIEW_HEIGHT - total_h) / 2.0 + CARD_HEIGHT / 2.0 + BOARD_OFFSET_Y,
    )
}

/// Center of a grid slot in view space (row-major)
pub fn slot_center(slot: usize) -> Vec2 {
    let col = (slot % GRID_COLS) as f32;
    let row = (slot / GRID_COLS) as f32;
    board_origin()
        + Vec2::new(
            col * (CARD_WIDTH + CARD_SPACING),
            row * (CARD_HEIGHT + CARD_SPACING),
        )
}

/// Slot whose card rectangle contains the view-space point
pub fn hit_test(p: Vec2) -> Option<usize> {
    (0..CARD_COUNT).find(|&slot| {
        let c = slot_center(slot);
        (p.x - c.x).abs() <= CARD_WIDTH / 2.0 && (p.y - c.y).abs() <= CARD_HEIGHT / 2.0
    })
}
