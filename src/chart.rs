//! Chart data model and text import
//!
//! Text charts look like `12345,1|1|1000,0|2|1500,...`: a numeric asset id up front,
//! then comma separated `x|y|time_ms` entries.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest lane index on either axis
pub const MAX_LANE: i32 = 2;

/// One note as authored: lane indices and target time in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteSpec {
    pub x: i32,
    pub y: i32,
    pub time: f64,
}

/// An identified, time-sorted list of notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub id: String,
    notes: Vec<NoteSpec>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("Input is empty.")]
    EmptyInput,

    #[error("No notes found.")]
    NoNotes { dropped: usize },
}

impl Chart {
    /// Build a chart, stable-sorting notes by target time
    pub fn new(id: impl Into<String>, mut notes: Vec<NoteSpec>) -> Self {
        notes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            id: id.into(),
            notes,
        }
    }

    pub fn notes(&self) -> &[NoteSpec] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Target time of the last note (0 for an empty chart)
    pub fn duration(&self) -> f64 {
        self.notes.last().map(|n| n.time).unwrap_or(0.0)
    }

    /// Deterministic practice chart: random lanes, evenly spaced from t = 1s
    pub fn practice(seed: u64, count: usize, spacing: f64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let notes = (0..count)
            .map(|i| NoteSpec {
                x: rng.random_range(0..=MAX_LANE),
                y: rng.random_range(0..=MAX_LANE),
                time: 1.0 + i as f64 * spacing,
            })
            .collect();
        Self::new(format!("practice-{seed}"), notes)
    }
}

/// Parse a text chart. Malformed entries are dropped; an empty result is an error.
pub fn parse_chart(raw: &str) -> Result<Chart, ChartError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ChartError::EmptyInput);
    }

    let digits = raw.bytes().take_while(u8::is_ascii_digit).count();
    let id = if digits > 0 { &raw[..digits] } else { "0" };

    let mut entries = raw.split(',').peekable();
    // The id token on its own is not a note
    if digits > 0 && entries.peek().is_some_and(|first| first.trim() == id) {
        entries.next();
    }

    let mut notes = Vec::new();
    let mut dropped = 0;
    for entry in entries {
        match parse_entry(entry) {
            Some(note) => notes.push(note),
            None => dropped += 1,
        }
    }

    if notes.is_empty() {
        return Err(ChartError::NoNotes { dropped });
    }
    if dropped > 0 {
        log::warn!("Chart {}: dropped {} malformed entries", id, dropped);
    }

    Ok(Chart::new(id, notes))
}

/// Lane indices representable as `i32`
const LANE_RANGE: std::ops::RangeInclusive<f64> = i32::MIN as f64..=i32::MAX as f64;

/// `x|y|time_ms` with integral in-range lanes and finite numbers
fn parse_entry(entry: &str) -> Option<NoteSpec> {
    let fields: Vec<f64> = entry
        .split('|')
        .map(|f| f.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<_>>()?;

    let [x, y, time_ms] = fields[..] else {
        return None;
    };
    if x.fract() != 0.0 || y.fract() != 0.0 {
        return None;
    }
    if !LANE_RANGE.contains(&x) || !LANE_RANGE.contains(&y) {
        return None;
    }

    Some(NoteSpec {
        x: x as i32,
        y: y as i32,
        time: time_ms / 1000.0,
    })
}
