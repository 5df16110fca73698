//! Runtime note entity and its depth geometry

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::chart::NoteSpec;
use crate::consts::HIT_Z;
use crate::lane_to_world;
use crate::tuning::Tuning;

/// Stable handle shared with the render sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(pub u32);

/// An admitted note scrolling toward the hit plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Lane position on the hit plane
    pub pos: Vec2,
    /// Target time (judged seconds)
    pub time: f64,
    /// True once hit or expired
    pub resolved: bool,
    /// Distance in front of the hit plane, recomputed every tick
    pub depth: f32,
    pub visible: bool,
}

impl Note {
    pub fn from_spec(id: NoteId, spec: &NoteSpec) -> Self {
        Self {
            id,
            pos: lane_to_world(spec.x, spec.y),
            time: spec.time,
            resolved: false,
            depth: f32::INFINITY,
            visible: false,
        }
    }

    /// Timing error: positive while the note is not yet due
    #[inline]
    pub fn error(&self, sim_time: f64) -> f64 {
        self.time - sim_time
    }

    /// Recompute depth and visibility. Pure in `sim_time`.
    pub fn update(&mut self, sim_time: f64, tuning: &Tuning) {
        let err = self.error(sim_time);
        self.depth = (err as f32 * tuning.note_speed + HIT_Z).max(HIT_Z);
        self.visible = self.depth < tuning.spawn_distance && err > tuning.miss_grace;
    }
}
