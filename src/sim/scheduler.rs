//! Note admission: pending chart entries become active notes one lead time early

use serde::{Deserialize, Serialize};

use crate::chart::NoteSpec;

/// Cursor into a time-sorted chart. Only ever moves forward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    next: usize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next not-yet-admitted note
    pub fn cursor(&self) -> usize {
        self.next
    }

    /// True once every note has been admitted
    pub fn is_exhausted(&self, notes: &[NoteSpec]) -> bool {
        self.next >= notes.len()
    }

    /// Admit every note with `sim_time >= time - lead_time`, in chart order.
    ///
    /// Returns the newly admitted slice; amortized O(1) per tick because the
    /// cursor never rewinds.
    pub fn admit<'c>(&mut self, notes: &'c [NoteSpec], sim_time: f64, lead_time: f64) -> &'c [NoteSpec] {
        let start = self.next.min(notes.len());
        let count = notes[start..]
            .iter()
            .take_while(|n| sim_time >= n.time - lead_time)
            .count();
        self.next = start + count;
        &notes[start..self.next]
    }
}
