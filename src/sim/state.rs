//! Session state and simulation events
//!
//! Everything one play-through mutates lives in `Session`; a new `play` builds a fresh one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::note::{Note, NoteId};
use super::scheduler::Scheduler;
use crate::chart::{Chart, NoteSpec};
use crate::tuning::Tuning;

/// How a note left the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Judgement {
    Hit,
    Miss,
}

/// Side effects produced by a tick, drained by the loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Countdown expired; external playback must start now
    PlaybackStarted,
    /// A note was admitted and needs a render representation
    NoteSpawned { id: NoteId, pos: Vec2 },
    /// A note was resolved and removed from the active set
    NoteResolved {
        id: NoteId,
        judgement: Judgement,
        /// Timing error at resolution (target - judged time)
        error: f64,
    },
}

/// End-of-play totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub score: u64,
    pub hits: u32,
    pub misses: u32,
    pub max_combo: u32,
    pub total: u32,
}

/// One play of one chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub chart: Chart,
    pub clock: Clock,
    pub scheduler: Scheduler,
    /// Judged simulation time (clock time minus calibration offset)
    pub sim_time: f64,
    /// Active notes (admitted, unresolved)
    pub notes: Vec<Note>,
    pub score: u64,
    /// Consecutive hits since the last miss
    pub combo: u32,
    pub max_combo: u32,
    pub hits: u32,
    pub misses: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl Session {
    /// Fresh session in the counting-down phase
    pub fn new(chart: Chart, tuning: &Tuning) -> Self {
        let clock = Clock::counting_down(tuning.countdown_secs);
        Self {
            chart,
            sim_time: clock.time() - tuning.audio_offset,
            clock,
            scheduler: Scheduler::new(),
            notes: Vec::new(),
            score: 0,
            combo: 0,
            max_combo: 0,
            hits: 0,
            misses: 0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new note ID
    pub fn next_note_id(&mut self) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Instantiate an admitted chart entry
    pub fn spawn(&mut self, spec: &NoteSpec) {
        let note = Note::from_spec(self.next_note_id(), spec);
        self.events.push(GameEvent::NoteSpawned {
            id: note.id,
            pos: note.pos,
        });
        self.notes.push(note);
    }

    pub fn record_hit(&mut self, score: u64) {
        self.score += score;
        self.combo += 1;
        self.hits += 1;
        self.max_combo = self.max_combo.max(self.combo);
    }

    pub fn record_miss(&mut self) {
        self.combo = 0;
        self.misses += 1;
    }

    /// All notes admitted and resolved
    pub fn is_finished(&self) -> bool {
        self.notes.is_empty() && self.scheduler.is_exhausted(self.chart.notes())
    }

    pub fn summary(&self) -> Summary {
        Summary {
            score: self.score,
            hits: self.hits,
            misses: self.misses,
            max_combo: self.max_combo,
            total: self.chart.len() as u32,
        }
    }
}
