//! Per-tick hit/miss resolution and scoring

use glam::Vec2;

use super::state::{GameEvent, Judgement, Session};
use crate::tuning::Tuning;
use crate::within_box;

/// Classify one unresolved note. `None` leaves it active for the next tick.
///
/// Inside the window (`|err| < hit_start`) only a hit can resolve the note; the miss
/// branch is reachable only once `err <= miss_grace`, so the two never overlap.
pub fn classify(err: f64, note_pos: Vec2, cursor: Vec2, tuning: &Tuning) -> Option<Judgement> {
    if err.abs() < tuning.hit_start {
        within_box(cursor, note_pos, tuning.hit_tolerance).then_some(Judgement::Hit)
    } else if err <= tuning.miss_grace {
        Some(Judgement::Miss)
    } else {
        None
    }
}

/// Judge every active note against the cursor at `session.sim_time`.
///
/// Marks resolved notes during a reverse pass, then compacts the active set.
pub fn judge(session: &mut Session, cursor: Vec2, tuning: &Tuning) {
    // Resolved notes are compacted away on the tick that resolves them
    debug_assert!(
        session.notes.iter().all(|n| !n.resolved),
        "resolved note left in the active set"
    );
    let sim_time = session.sim_time;
    let mut resolved = Vec::new();

    for note in session.notes.iter_mut().rev() {
        if note.resolved {
            continue;
        }
        let err = note.error(sim_time);
        if let Some(judgement) = classify(err, note.pos, cursor, tuning) {
            note.resolved = true;
            resolved.push((note.id, judgement, err));
        }
    }

    for (id, judgement, error) in resolved {
        match judgement {
            Judgement::Hit => session.record_hit(tuning.hit_score),
            Judgement::Miss => session.record_miss(),
        }
        log::debug!("{:?} {:?} err={:+.4}s", id, judgement, error);
        session.events.push(GameEvent::NoteResolved {
            id,
            judgement,
            error,
        });
    }

    session.notes.retain(|n| !n.resolved);
}
