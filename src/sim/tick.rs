//! Fixed timestep simulation tick
//!
//! Advances one session deterministically: Clock -> Scheduler -> Note.update -> Judge.

use glam::Vec2;

use super::judge::judge;
use super::state::{GameEvent, Session};
use crate::tuning::Tuning;

/// Inputs sampled once per tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Cursor position on the hit plane
    pub cursor: Vec2,
    /// Playback position, `None` while audio is paused or unknown
    pub audio_position: Option<f64>,
}

/// Advance the session by one fixed timestep of `dt` seconds
pub fn tick(session: &mut Session, input: &TickInput, tuning: &Tuning, dt: f64) {
    session.time_ticks += 1;

    if session.clock.advance(dt, input.audio_position) {
        log::info!("Countdown finished, starting playback");
        session.events.push(GameEvent::PlaybackStarted);
    }
    session.sim_time = session.clock.time() - tuning.audio_offset;
    let sim_time = session.sim_time;

    let lead_time = tuning.lead_time();
    let start = session.scheduler.cursor();
    let admitted = session.scheduler.admit(session.chart.notes(), sim_time, lead_time).len();
    for i in start..start + admitted {
        let spec = session.chart.notes()[i];
        session.spawn(&spec);
    }

    for note in &mut session.notes {
        note.update(sim_time, tuning);
    }

    judge(session, input.cursor, tuning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Chart, NoteSpec};
    use crate::sim::state::Judgement;
    use proptest::prelude::*;

    const DT: f64 = 0.0166;

    fn running_session(notes: Vec<NoteSpec>, tuning: &Tuning) -> Session {
        let mut session = Session::new(Chart::new("t", notes), tuning);
        // Skip the countdown in one step
        tick(&mut session, &TickInput::default(), tuning, tuning.countdown_secs);
        session
            .events
            .retain(|e| !matches!(e, GameEvent::PlaybackStarted));
        session
    }

    #[test]
    fn test_countdown_then_playback_event_once() {
        let tuning = Tuning {
            countdown_secs: 3.0,
            ..Tuning::default()
        };
        let mut session = Session::new(Chart::new("t", vec![]), &tuning);
        let input = TickInput::default();
        for i in 1..=12 {
            tick(&mut session, &input, &tuning, 0.25);
            assert_eq!(session.clock.is_running(), i == 12);
        }
        for _ in 0..5 {
            tick(&mut session, &input, &tuning, 0.25);
        }
        let starts = session
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlaybackStarted))
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_admission_at_first_tick_past_lead() {
        let tuning = Tuning::default().uncalibrated();
        let mut session = Session::new(
            Chart::new("t", vec![NoteSpec { x: 1, y: 1, time: 5.0 }]),
            &tuning,
        );
        let input = TickInput::default();
        let threshold = 5.0 - 800.0 / 150.0;
        while session.notes.is_empty() {
            let before = session.sim_time;
            tick(&mut session, &input, &tuning, DT);
            if session.notes.is_empty() {
                assert!(session.sim_time < threshold);
            } else {
                assert!(session.sim_time >= threshold);
                assert!(before < threshold);
            }
        }
        assert!(session.sim_time < threshold + DT);
    }

    #[test]
    fn test_audio_drives_running_time() {
        let tuning = Tuning::default();
        let mut session = running_session(vec![], &tuning);
        let input = TickInput {
            cursor: Vec2::ZERO,
            audio_position: Some(10.0),
        };
        tick(&mut session, &input, &tuning, DT);
        assert!((session.sim_time - 10.25).abs() < 1e-12);
    }

    #[test]
    fn test_full_note_lifecycle_hit() {
        let tuning = Tuning::default().uncalibrated();
        let mut session = running_session(vec![NoteSpec { x: 2, y: 2, time: 1.0 }], &tuning);
        let cursor = Vec2::new(30.0, 30.0);

        let mut t = 0.0;
        while t < 1.5 {
            let input = TickInput {
                cursor,
                audio_position: Some(t),
            };
            tick(&mut session, &input, &tuning, DT);
            t += 0.005;
        }
        assert_eq!(session.score, 100);
        assert_eq!(session.combo, 1);
        assert!(session.is_finished());
        assert!(matches!(session.events[0], GameEvent::NoteSpawned { .. }));
        assert!(matches!(
            session.events[1],
            GameEvent::NoteResolved {
                judgement: Judgement::Hit,
                ..
            }
        ));
    }

    #[test]
    fn test_reset_isolation_between_sessions() {
        let tuning = Tuning::default();
        let chart = Chart::new("t", vec![NoteSpec { x: 0, y: 0, time: 0.5 }]);
        let mut first = running_session(chart.notes().to_vec(), &tuning);
        let input = TickInput {
            cursor: Vec2::ZERO,
            audio_position: Some(0.0),
        };
        tick(&mut first, &input, &tuning, DT);
        assert_eq!(first.notes.len(), 1);

        let second = Session::new(chart, &tuning);
        assert!(second.notes.is_empty());
        assert_eq!((second.score, second.combo), (0, 0));
    }

    proptest! {
        #[test]
        fn every_note_resolves_exactly_once(
            lanes in proptest::collection::vec((0i32..3, 0i32..3), 1..24),
            cursor_lane in (0i32..3, 0i32..3),
            step in 0.004f64..0.03,
        ) {
            let tuning = Tuning::default().uncalibrated();
            let notes: Vec<NoteSpec> = lanes
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| NoteSpec { x, y, time: 1.0 + i as f64 * 0.1 })
                .collect();
            let total = notes.len();
            let mut session = running_session(notes, &tuning);
            let cursor = crate::lane_to_world(cursor_lane.0, cursor_lane.1);

            let mut t = 0.0;
            while t < 1.0 + total as f64 * 0.1 + 1.0 {
                let input = TickInput { cursor, audio_position: Some(t) };
                tick(&mut session, &input, &tuning, DT);
                t += step;
            }

            let mut resolved: Vec<u32> = session
                .events
                .iter()
                .filter_map(|e| match e {
                    GameEvent::NoteResolved { id, .. } => Some(id.0),
                    _ => None,
                })
                .collect();
            let count = resolved.len();
            resolved.sort_unstable();
            resolved.dedup();
            prop_assert_eq!(resolved.len(), count);
            prop_assert_eq!(count, total);
            prop_assert_eq!(session.hits + session.misses, total as u32);
            prop_assert_eq!(session.score, session.hits as u64 * 100);
            prop_assert!(session.is_finished());
        }
    }
}
