//! Audio-synced game clock with pre-roll countdown

use serde::{Deserialize, Serialize};

/// Clock phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClockPhase {
    /// Pre-roll; time integrates from `-countdown` toward zero
    CountingDown { remaining: f64 },
    /// Audio is authoritative; time follows the playback position
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    phase: ClockPhase,
    /// Clock time in seconds (before calibration offset)
    time: f64,
}

impl Clock {
    /// Start a countdown of `secs` seconds, time starting at `-secs`
    pub fn counting_down(secs: f64) -> Self {
        Self {
            phase: ClockPhase::CountingDown { remaining: secs },
            time: -secs,
        }
    }

    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_running(&self) -> bool {
        self.phase == ClockPhase::Running
    }

    /// Remaining countdown seconds, if still counting down
    pub fn remaining(&self) -> Option<f64> {
        match self.phase {
            ClockPhase::CountingDown { remaining } => Some(remaining),
            ClockPhase::Running => None,
        }
    }

    /// Advance one tick. Returns true exactly once: on the tick the countdown expires
    /// and playback must be started.
    ///
    /// While running, time is re-read from `audio_position` every tick rather than
    /// integrated; `None` holds the previous value. Time never moves backwards: the
    /// countdown can overshoot zero by part of a tick while playback starts at 0, so
    /// the clock takes `max(time, audio_position)` and holds until the audio catches up.
    /// Past that point it equals the audio position exactly.
    pub fn advance(&mut self, dt: f64, audio_position: Option<f64>) -> bool {
        match self.phase {
            ClockPhase::CountingDown { remaining } => {
                let remaining = remaining - dt;
                self.time += dt;
                if remaining <= 0.0 {
                    self.phase = ClockPhase::Running;
                    true
                } else {
                    self.phase = ClockPhase::CountingDown { remaining };
                    false
                }
            }
            ClockPhase::Running => {
                if let Some(pos) = audio_position {
                    self.time = self.time.max(pos);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_counts_up_from_negative() {
        let mut clock = Clock::counting_down(3.0);
        assert_eq!(clock.time(), -3.0);
        assert!(!clock.advance(0.5, None));
        assert_eq!(clock.time(), -2.5);
        assert_eq!(clock.remaining(), Some(2.5));
    }

    #[test]
    fn test_countdown_transition_fires_once() {
        let mut clock = Clock::counting_down(3.0);
        let mut starts = 0;
        // 0.25 is exact in binary, so 12 ticks land on exactly 3 seconds
        for i in 1..=12 {
            if clock.advance(0.25, None) {
                starts += 1;
            }
            if i < 12 {
                assert!(!clock.is_running(), "running early at tick {i}");
            }
        }
        assert!(clock.is_running());
        assert_eq!(starts, 1);
        assert_eq!(clock.time(), 0.0);

        for _ in 0..10 {
            assert!(!clock.advance(0.25, Some(1.0)));
        }
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_countdown_ignores_audio() {
        let mut clock = Clock::counting_down(1.0);
        clock.advance(0.25, Some(42.0));
        assert_eq!(clock.time(), -0.75);
    }

    #[test]
    fn test_running_follows_audio_and_holds() {
        let mut clock = Clock::counting_down(0.1);
        assert!(clock.advance(0.2, None));
        clock.advance(0.0166, Some(1.25));
        assert_eq!(clock.time(), 1.25);
        // Unknown position holds the previous value
        clock.advance(0.0166, None);
        assert_eq!(clock.time(), 1.25);
        // No integration between audio reads
        clock.advance(0.0166, Some(1.25));
        assert_eq!(clock.time(), 1.25);
    }

    #[test]
    fn test_countdown_overshoot_is_held() {
        let mut clock = Clock::counting_down(0.5);
        assert!(clock.advance(0.75, None));
        assert_eq!(clock.time(), 0.25);
        // Playback just started at zero: time holds instead of jumping back
        clock.advance(0.0166, Some(0.0));
        assert_eq!(clock.time(), 0.25);
        clock.advance(0.0166, Some(0.5));
        assert_eq!(clock.time(), 0.5);
    }
}
