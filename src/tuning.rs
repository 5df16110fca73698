//! Data-driven timing and judgement constants
//!
//! Everything the simulation reads about scroll speed, windows and scoring lives in
//! one serializable struct so a session can be replayed with identical numbers.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Fixed tick size in milliseconds
    pub tick_ms: f64,
    /// Frame delta clamp in milliseconds
    pub max_frame_ms: f64,
    /// Scroll speed (units/s)
    pub note_speed: f32,
    /// Depth at which notes become visible
    pub spawn_distance: f32,
    /// Half-width of the judgeable window (s)
    pub hit_start: f64,
    /// Negative offset past target time that forces a miss (s)
    pub miss_grace: f64,
    /// Cursor tolerance box half-width
    pub hit_tolerance: f32,
    /// Points per hit
    pub hit_score: u64,
    /// Countdown before playback (s)
    pub countdown_secs: f64,
    /// Judged time = clock time - audio_offset
    pub audio_offset: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_ms: SIM_DT_MS,
            max_frame_ms: MAX_FRAME_MS,
            note_speed: NOTE_SPEED,
            spawn_distance: SPAWN_DISTANCE,
            hit_start: HIT_START,
            miss_grace: MISS_GRACE,
            hit_tolerance: HIT_TOLERANCE,
            hit_score: HIT_SCORE,
            countdown_secs: COUNTDOWN_SECS,
            audio_offset: AUDIO_OFFSET,
        }
    }
}

impl Tuning {
    /// Seconds before its target time at which a note must be admitted
    pub fn lead_time(&self) -> f64 {
        self.spawn_distance as f64 / self.note_speed as f64
    }

    /// Fixed tick size in seconds
    pub fn tick_secs(&self) -> f64 {
        self.tick_ms / 1000.0
    }

    /// Same tuning without calibration offset (judged time == clock time)
    pub fn uncalibrated(mut self) -> Self {
        self.audio_offset = 0.0;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lead_time() {
        let tuning = Tuning::default();
        assert!((tuning.lead_time() - 800.0 / 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_tick_secs() {
        assert!((Tuning::default().tick_secs() - 0.0166).abs() < 1e-12);
    }

    #[test]
    fn test_roundtrip_json() {
        let tuning = Tuning::default().uncalibrated();
        let json = serde_json::to_string(&tuning).unwrap();
        let back: Tuning = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tuning);
        assert_eq!(back.audio_offset, 0.0);
    }
}
