//! Render-side mirror of the active notes

use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::RenderSink;
use crate::sim::NoteId;

/// GPU record for one note (must match `NoteData` in the shader)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct NoteInstance {
    pub pos: [f32; 2],
    pub depth: f32,
    pub visible: u32,
}

/// Notes currently on screen, ordered by ID
#[derive(Debug, Default)]
pub struct NoteField {
    notes: BTreeMap<NoteId, NoteInstance>,
}

impl NoteField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: NoteId) -> Option<&NoteInstance> {
        self.notes.get(&id)
    }

    /// Visible notes, farthest first so near outlines draw on top
    pub fn visible_instances(&self, limit: usize) -> Vec<NoteInstance> {
        let mut visible: Vec<NoteInstance> = self
            .notes
            .values()
            .filter(|n| n.visible != 0)
            .copied()
            .collect();
        // Keep the nearest `limit`, then draw back to front
        visible.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        visible.truncate(limit);
        visible.reverse();
        visible
    }
}

impl RenderSink for NoteField {
    fn spawn(&mut self, id: NoteId) {
        self.notes.insert(id, NoteInstance::zeroed());
    }

    fn set_position(&mut self, id: NoteId, pos: Vec2, depth: f32) {
        if let Some(note) = self.notes.get_mut(&id) {
            note.pos = pos.to_array();
            note.depth = depth;
        }
    }

    fn set_visible(&mut self, id: NoteId, visible: bool) {
        if let Some(note) = self.notes.get_mut(&id) {
            note.visible = visible as u32;
        }
    }

    fn remove(&mut self, id: NoteId) {
        self.notes.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout() {
        // 16 bytes per note, matching the WGSL struct stride
        assert_eq!(std::mem::size_of::<NoteInstance>(), 16);
    }

    #[test]
    fn test_commands_update_records() {
        let mut field = NoteField::new();
        field.spawn(NoteId(1));
        field.set_position(NoteId(1), Vec2::new(30.0, 0.0), 120.0);
        field.set_visible(NoteId(1), true);
        let note = field.get(NoteId(1)).unwrap();
        assert_eq!(note.pos, [30.0, 0.0]);
        assert_eq!(note.depth, 120.0);
        assert_eq!(note.visible, 1);

        // Commands for unknown notes are ignored
        field.set_position(NoteId(9), Vec2::ZERO, 1.0);
        assert_eq!(field.len(), 1);

        field.remove(NoteId(1));
        assert!(field.is_empty());
    }

    #[test]
    fn test_visible_instances_far_to_near() {
        let mut field = NoteField::new();
        for (i, depth) in [50.0, 300.0, 10.0].into_iter().enumerate() {
            let id = NoteId(i as u32);
            field.spawn(id);
            field.set_position(id, Vec2::ZERO, depth);
            field.set_visible(id, true);
        }
        field.spawn(NoteId(7));
        let depths: Vec<f32> = field.visible_instances(8).iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![300.0, 50.0, 10.0]);
        assert_eq!(field.visible_instances(1)[0].depth, 10.0);
    }
}
