//! Fixed-step game loop and session control
//!
//! Frames arrive at whatever rate the host delivers them. Elapsed time is banked in an
//! accumulator and drained in fixed ticks, so judgement windows are measured in
//! simulation seconds rather than frames. Rendering happens once per frame, after the
//! drain.

use thiserror::Error;

use crate::audio::AudioTrack;
use crate::chart::Chart;
use crate::cursor::Cursor;
use crate::renderer::RenderSink;
use crate::settings::Settings;
use crate::sim::{GameEvent, Judgement, Session, TickInput, tick};
use crate::tuning::Tuning;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayError {
    #[error("No chart loaded.")]
    NoChart,
}

/// Game instance holding all state
pub struct Game<A: AudioTrack, R: RenderSink> {
    settings: Settings,
    tuning: Tuning,
    chart: Option<Chart>,
    session: Option<Session>,
    audio: A,
    sink: R,
    cursor: Cursor,
    accumulator: f64,
    last_frame: Option<f64>,
    /// Events drained during the last frame (for HUD/sfx reactions)
    frame_events: Vec<GameEvent>,
}

impl<A: AudioTrack, R: RenderSink> Game<A, R> {
    pub fn new(audio: A, sink: R, settings: Settings) -> Self {
        Self {
            tuning: settings.tuning(),
            cursor: Cursor::new(settings.sensitivity),
            settings,
            chart: None,
            session: None,
            audio,
            sink,
            accumulator: 0.0,
            last_frame: None,
            frame_events: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace settings. Timing changes apply from the next `play`.
    pub fn set_settings(&mut self, settings: Settings) {
        self.cursor.set_sensitivity(settings.sensitivity);
        if self.session.is_none() {
            self.tuning = settings.tuning();
        }
        self.settings = settings;
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    pub fn load_chart(&mut self, chart: Chart) {
        log::info!("Chart {} loaded ({} notes)", chart.id, chart.len());
        self.chart = Some(chart);
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn frame_events(&self) -> &[GameEvent] {
        &self.frame_events
    }

    /// Start a new session on the loaded chart, discarding any previous one.
    ///
    /// Without a chart nothing changes.
    pub fn play(&mut self) -> Result<(), PlayError> {
        let chart = self.chart.clone().ok_or(PlayError::NoChart)?;
        self.reset();
        self.tuning = self.settings.tuning();
        log::info!(
            "Playing chart {} ({} notes, lead {:.2}s)",
            chart.id,
            chart.len(),
            self.tuning.lead_time()
        );
        self.session = Some(Session::new(chart, &self.tuning));
        Ok(())
    }

    /// Drop the session and every render object it created
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            for note in &session.notes {
                self.sink.remove(note.id);
            }
            self.audio.stop();
            log::info!("Session reset (score {})", session.score);
        }
        self.accumulator = 0.0;
        self.frame_events.clear();
        self.cursor.center();
    }

    /// One host frame at `now_ms`: drain fixed ticks, then sync render state
    pub fn frame(&mut self, now_ms: f64) {
        let delta = match self.last_frame {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_frame = Some(now_ms);

        if delta > self.tuning.max_frame_ms {
            log::warn!(
                "Frame stalled {:.0}ms, clamping to {:.0}ms",
                delta,
                self.tuning.max_frame_ms
            );
        }
        self.accumulator += delta.min(self.tuning.max_frame_ms);

        self.frame_events.clear();
        let tick_ms = self.tuning.tick_ms;
        while self.accumulator >= tick_ms {
            self.step();
            self.accumulator -= tick_ms;
        }

        self.sync_render();
    }

    /// Run exactly one physics tick (no-op without a session)
    pub fn step(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let input = TickInput {
            cursor: self.cursor.position(),
            audio_position: if self.audio.is_playing() {
                self.audio.position()
            } else {
                None
            },
        };
        tick(session, &input, &self.tuning, self.tuning.tick_secs());

        for event in session.events.drain(..) {
            match event {
                GameEvent::PlaybackStarted => {
                    log::info!("Starting playback");
                    self.audio.start();
                }
                GameEvent::NoteSpawned { id, .. } => self.sink.spawn(id),
                GameEvent::NoteResolved { id, .. } => self.sink.remove(id),
            }
            self.frame_events.push(event);
        }
    }

    fn sync_render(&mut self) {
        if let Some(session) = &self.session {
            for note in &session.notes {
                self.sink.set_position(note.id, note.pos, note.depth);
                self.sink.set_visible(note.id, note.visible);
            }
        }
    }

    /// Any hits during the last frame
    pub fn hit_this_frame(&self) -> bool {
        self.frame_events.iter().any(|e| {
            matches!(
                e,
                GameEvent::NoteResolved {
                    judgement: Judgement::Hit,
                    ..
                }
            )
        })
    }

    /// Scoreboard line
    pub fn hud_text(&self) -> String {
        let Some(session) = &self.session else {
            return String::new();
        };
        match session.clock.remaining() {
            Some(remaining) => format!("WAIT: {}", remaining.ceil().max(0.0) as u32),
            None => format!("SCORE: {} | COMBO: {}", session.score, session.combo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SimulatedTrack;
    use crate::chart::NoteSpec;
    use crate::renderer::NoteField;
    use crate::sim::NoteId;

    type TestGame = Game<SimulatedTrack, NoteField>;

    fn game() -> TestGame {
        let settings = Settings {
            audio_offset: 0.0,
            ..Settings::default()
        };
        Game::new(SimulatedTrack::new(), NoteField::new(), settings)
    }

    /// Feed frames of `frame_ms`, advancing the track in step with wall time
    fn run(game: &mut TestGame, start_ms: f64, frames: usize, frame_ms: f64) -> f64 {
        let mut now = start_ms;
        for _ in 0..frames {
            now += frame_ms;
            game.audio_mut().advance(frame_ms / 1000.0);
            game.frame(now);
        }
        now
    }

    #[test]
    fn test_play_without_chart_is_noop() {
        let mut game = game();
        assert_eq!(game.play(), Err(PlayError::NoChart));
        assert!(game.session().is_none());
        assert_eq!(game.hud_text(), "");
    }

    #[test]
    fn test_accumulator_drains_fixed_ticks() {
        let mut game = game();
        game.load_chart(Chart::new("a", vec![NoteSpec { x: 1, y: 1, time: 30.0 }]));
        game.play().unwrap();
        game.frame(1000.0);
        // 50ms banks 3 ticks with 0.2ms left over
        game.frame(1050.0);
        assert_eq!(game.session().unwrap().time_ticks, 3);
        game.frame(1060.0);
        assert_eq!(game.session().unwrap().time_ticks, 3);
        game.frame(1067.0);
        assert_eq!(game.session().unwrap().time_ticks, 4);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut game = game();
        game.load_chart(Chart::new("a", vec![NoteSpec { x: 1, y: 1, time: 30.0 }]));
        game.play().unwrap();
        game.frame(0.0);
        game.frame(60_000.0);
        // 100ms max -> 6 ticks, not thousands
        assert_eq!(game.session().unwrap().time_ticks, 6);
    }

    #[test]
    fn test_countdown_starts_audio_once() {
        let mut game = game();
        game.load_chart(Chart::new("a", vec![NoteSpec { x: 1, y: 1, time: 30.0 }]));
        game.play().unwrap();
        game.frame(0.0);
        assert_eq!(game.hud_text(), "WAIT: 3");

        run(&mut game, 0.0, 240, 16.0);
        assert_eq!(game.audio().starts(), 1);
        assert!(game.session().unwrap().clock.is_running());
        assert!(game.hud_text().starts_with("SCORE: 0"));
    }

    #[test]
    fn test_render_sink_mirrors_active_notes() {
        let mut game = game();
        game.load_chart(Chart::new(
            "a",
            vec![NoteSpec { x: 0, y: 2, time: 1.0 }, NoteSpec { x: 2, y: 2, time: 20.0 }],
        ));
        game.play().unwrap();
        game.frame(0.0);
        // Countdown (3s) plus a bit: first note is active, second still pending
        let now = run(&mut game, 0.0, 200, 16.0);
        assert_eq!(game.sink().len(), 1);
        let first = game.sink().get(NoteId(1)).unwrap();
        assert_eq!(first.pos, [-30.0, 30.0]);
        assert_eq!(first.visible, 1);

        // Cursor never moves, so the first note expires and is removed from the sink
        run(&mut game, now, 120, 16.0);
        assert!(game.sink().get(NoteId(1)).is_none());
        assert_eq!(game.session().unwrap().misses, 1);
    }

    #[test]
    fn test_second_play_starts_clean() {
        let mut game = game();
        game.load_chart(Chart::new("a", vec![NoteSpec { x: 1, y: 1, time: 5.0 }]));
        game.play().unwrap();
        game.frame(0.0);
        // Past the countdown with the note still pending judgement
        let now = run(&mut game, 0.0, 200, 16.0);
        assert_eq!(game.audio().starts(), 1);
        assert!(game.audio().is_playing());
        assert_eq!(game.session().unwrap().notes.len(), 1);
        assert_eq!(game.sink().len(), 1);

        game.play().unwrap();
        assert!(!game.audio().is_playing());
        let session = game.session().unwrap();
        assert!(session.notes.is_empty());
        assert_eq!((session.score, session.combo), (0, 0));
        assert_eq!(session.scheduler.cursor(), 0);
        assert!(session.clock.remaining().is_some());
        assert!(game.sink().is_empty());

        // The new session starts the track exactly once, from the top
        run(&mut game, now, 200, 16.0);
        assert_eq!(game.audio().starts(), 2);
        assert!(game.audio().is_playing());
        assert!(game.audio().position().unwrap() < 0.5);
    }

    #[test]
    fn test_autoplay_scores_every_note() {
        let mut game = game();
        let chart = Chart::practice(7, 12, 0.4);
        let total = chart.len();
        game.load_chart(chart);
        game.play().unwrap();
        game.frame(0.0);

        // 10ms frames keep consecutive tick samples closer than the hit window
        let mut now = 0.0;
        for _ in 0..2000 {
            // Aim at the nearest unresolved note
            let target = game
                .session()
                .and_then(|s| s.notes.iter().min_by(|a, b| a.time.total_cmp(&b.time)))
                .map(|n| n.pos);
            if let Some(target) = target {
                let delta = game.cursor().position() - target;
                let scale = game.settings().sensitivity * crate::consts::MOUSE_SCALE;
                game.cursor_mut().apply_movement(delta.x / scale, delta.y / scale);
            }
            now = run(&mut game, now, 1, 10.0);
        }

        let summary = game.session().unwrap().summary();
        assert_eq!(summary.hits as usize, total);
        assert_eq!(summary.score, total as u64 * 100);
        assert_eq!(summary.max_combo as usize, total);
        assert!(game.session().unwrap().is_finished());
    }
}
