//! Rendering module
//!
//! The simulation owns no visual resources. It issues commands to a `RenderSink`;
//! `NoteField` keeps the resulting per-note records and the SDF pipeline draws them.

pub mod note_field;
pub mod sdf_pipeline;

pub use note_field::{NoteField, NoteInstance};
pub use sdf_pipeline::SdfRenderState;

use glam::Vec2;

use crate::sim::NoteId;

/// Receiver of note render commands
pub trait RenderSink {
    /// A note entered the active set
    fn spawn(&mut self, id: NoteId);
    /// Latest lane position and depth
    fn set_position(&mut self, id: NoteId, pos: Vec2, depth: f32);
    fn set_visible(&mut self, id: NoteId, visible: bool);
    /// A note left the active set
    fn remove(&mut self, id: NoteId);
}
