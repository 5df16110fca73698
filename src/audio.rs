//! Music playback collaborator
//!
//! The simulation never reads a wall clock: while running, its time is whatever the
//! track reports. The browser build wraps an `<audio>` element; the simulated track
//! is driven by hand (headless demo, tests).

/// A playable music track the clock can sync to
pub trait AudioTrack {
    /// Playback position in seconds, `None` when paused or unknown
    fn position(&self) -> Option<f64>;
    /// Begin playback from the top (called once per session)
    fn start(&mut self);
    /// Halt playback (session discarded)
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
}

/// Manually advanced track
#[derive(Debug, Clone, Default)]
pub struct SimulatedTrack {
    position: f64,
    playing: bool,
    starts: u32,
}

impl SimulatedTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the playhead forward if playing
    pub fn advance(&mut self, secs: f64) {
        if self.playing {
            self.position += secs;
        }
    }

    /// Number of `start` calls so far
    pub fn starts(&self) -> u32 {
        self.starts
    }
}

impl AudioTrack for SimulatedTrack {
    fn position(&self) -> Option<f64> {
        self.playing.then_some(self.position)
    }

    fn start(&mut self) {
        self.position = 0.0;
        self.playing = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::HtmlAudioTrack;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::HtmlAudioElement;

    use super::AudioTrack;

    /// `<audio>` element backed track
    pub struct HtmlAudioTrack {
        element: HtmlAudioElement,
    }

    impl HtmlAudioTrack {
        pub fn new(element: HtmlAudioElement) -> Self {
            Self { element }
        }

        pub fn element(&self) -> &HtmlAudioElement {
            &self.element
        }

        /// Point the element at a new source and start buffering
        pub fn load(&self, src: &str) {
            self.element.pause().ok();
            self.element.set_src(src);
            self.element.load();
        }
    }

    impl AudioTrack for HtmlAudioTrack {
        fn position(&self) -> Option<f64> {
            (!self.element.paused()).then(|| self.element.current_time())
        }

        fn start(&mut self) {
            self.element.set_current_time(0.0);
            if let Err(e) = self.element.play() {
                log::warn!("Audio play failed: {:?}", e);
            }
        }

        fn stop(&mut self) {
            self.element.pause().ok();
        }

        fn is_playing(&self) -> bool {
            !self.element.paused()
        }
    }
}
