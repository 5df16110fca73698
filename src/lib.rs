//! Hitplane - a lane-based 3D rhythm aim game
//!
//! Core modules:
//! - `sim`: Deterministic timing and judgement (clock, scheduler, notes, judge)
//! - `game`: Fixed-step loop and session control around the simulation
//! - `chart`: Chart data model, text import and practice charts
//! - `renderer`: Render sink and WebGPU pipeline
//! - `platform`: Browser resource resolution
//! - `tuning`: Data-driven timing constants

pub mod audio;
pub mod chart;
pub mod cursor;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use chart::{Chart, ChartError, NoteSpec};
pub use game::{Game, PlayError};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (~60 Hz)
    pub const SIM_DT_MS: f64 = 16.6;
    /// Largest frame delta fed to the accumulator (guards catch-up after a stall)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// World units between adjacent lanes
    pub const LANE_SCALE: f32 = 30.0;
    /// Play-field square edge length
    pub const GRID_SIZE: f32 = 90.0;
    /// Cursor square edge length
    pub const CURSOR_SIZE: f32 = 15.0;
    /// Cursor travel limit on each axis
    pub const CURSOR_LIMIT: f32 = GRID_SIZE / 2.0 - CURSOR_SIZE / 2.0;
    /// Relative mouse motion scale applied on top of sensitivity
    pub const MOUSE_SCALE: f32 = 0.15;

    /// Note outline edge length and stroke
    pub const NOTE_SIZE: f32 = 25.0;
    pub const NOTE_STROKE: f32 = 2.0;

    /// Depth of the hit plane
    pub const HIT_Z: f32 = 0.0;
    /// Camera depth (looking down +z toward the notes)
    pub const CAMERA_Z: f32 = -100.0;
    /// Vertical field of view in degrees
    pub const CAMERA_FOV_DEG: f32 = 75.0;

    /// Scroll speed (world units per second)
    pub const NOTE_SPEED: f32 = 150.0;
    /// Depth at which notes appear
    pub const SPAWN_DISTANCE: f32 = 800.0;
    /// Half-width of the judgeable window (seconds)
    pub const HIT_START: f64 = 0.015;
    /// Offset past the target time after which a note is forced to miss
    pub const MISS_GRACE: f64 = -0.015;
    /// Cursor tolerance box half-width (derived from note size)
    pub const HIT_TOLERANCE: f32 = 18.0;
    /// Points per hit
    pub const HIT_SCORE: u64 = 100;

    /// Pre-roll before audio starts (seconds)
    pub const COUNTDOWN_SECS: f64 = 3.0;
    /// Default audio calibration offset (seconds)
    pub const AUDIO_OFFSET: f64 = -0.250;
    /// Default mouse sensitivity
    pub const SENSITIVITY: f32 = 1.2;
}

/// World position of a lane pair: lanes 0, 1, 2 map to -30, 0, +30
#[inline]
pub fn lane_to_world(x: i32, y: i32) -> Vec2 {
    // Float math so any i32 lane maps without overflow
    Vec2::new(
        (x as f32 - 1.0) * consts::LANE_SCALE,
        (y as f32 - 1.0) * consts::LANE_SCALE,
    )
}

/// Axis-aligned proximity check (both axes strictly inside `tolerance`)
#[inline]
pub fn within_box(a: Vec2, b: Vec2, tolerance: f32) -> bool {
    let d = (a - b).abs();
    d.x < tolerance && d.y < tolerance
}
