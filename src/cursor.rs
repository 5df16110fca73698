//! Player cursor on the hit plane
//!
//! Driven by relative pointer-lock motion. The camera looks down +z, which mirrors
//! screen x, so both axes are subtracted.

use glam::Vec2;

use crate::consts::{CURSOR_LIMIT, MOUSE_SCALE, SENSITIVITY};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pos: Vec2,
    sensitivity: f32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(SENSITIVITY)
    }
}

impl Cursor {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            sensitivity,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    pub fn center(&mut self) {
        self.pos = Vec2::ZERO;
    }

    /// Apply raw mouse movement (pixels); result is clamped to the play-field
    pub fn apply_movement(&mut self, dx: f32, dy: f32) {
        let scale = self.sensitivity * MOUSE_SCALE;
        let next = self.pos - Vec2::new(dx, dy) * scale;
        self.pos = next.clamp(Vec2::splat(-CURSOR_LIMIT), Vec2::splat(CURSOR_LIMIT));
    }
}
