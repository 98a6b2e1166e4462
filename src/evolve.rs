//! Mutation controller: manual mutation edits plus the auto-evolve timer.
//!
//! The controller never talks to the engine directly. It produces mutation
//! states; the owner republishes them as a reconfigure, which routes the
//! change through the scheduler's stop/restart contract like every other
//! parameter edit.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::params::MutationState;

/// Ranges for evolved states, kept musical: detune within a few Hz, tempo
/// between a drag and a push, blend across the whole chord range.
const DETUNE_RANGE: std::ops::Range<f32> = -8.0..8.0;
const TEMPO_RANGE: std::ops::Range<f32> = 0.6..1.6;
const BLEND_RANGE: std::ops::Range<f32> = 0.0..1.0;

pub struct MutationController {
    interval: Duration,
    enabled: bool,
    last_evolved: Instant,
    current: MutationState,
}

impl MutationController {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            enabled: false,
            last_evolved: Instant::now(),
            current: MutationState::default(),
        }
    }

    /// Explicit manual edit. Resets the auto-evolve timer so a fresh edit
    /// is not immediately overwritten.
    pub fn set(&mut self, state: MutationState) {
        self.current = state;
        self.last_evolved = Instant::now();
    }

    /// Regenerate a random mutation state right now.
    pub fn randomize(&mut self) -> MutationState {
        let mut rng = rand::thread_rng();
        self.current = MutationState::new(
            rng.gen_range(DETUNE_RANGE),
            rng.gen_range(TEMPO_RANGE),
            rng.gen_range(BLEND_RANGE),
        );
        self.last_evolved = Instant::now();
        tracing::debug!(
            detune = self.current.detune,
            tempo = self.current.tempo_variation,
            blend = self.current.harmonic_blend,
            "mutation evolved"
        );
        self.current
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if enabled {
            self.last_evolved = Instant::now();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current(&self) -> MutationState {
        self.current
    }

    /// Poll from the frame loop. Returns a freshly evolved state once per
    /// interval while auto-evolve is enabled, `None` otherwise.
    pub fn poll(&mut self, now: Instant) -> Option<MutationState> {
        if !self.enabled || now.duration_since(self.last_evolved) < self.interval {
            return None;
        }
        let state = self.randomize();
        self.last_evolved = now;
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_controller_never_evolves() {
        let mut ctl = MutationController::new(Duration::from_secs(4));
        let later = Instant::now() + Duration::from_secs(60);
        assert!(ctl.poll(later).is_none());
    }

    #[test]
    fn evolves_once_per_interval() {
        let mut ctl = MutationController::new(Duration::from_secs(4));
        ctl.set_enabled(true);

        let start = Instant::now();
        assert!(ctl.poll(start).is_none(), "interval has not elapsed yet");

        let later = start + Duration::from_secs(5);
        let evolved = ctl.poll(later).expect("interval elapsed");
        assert!(evolved.tempo_variation > 0.0);
        assert!((0.0..=1.0).contains(&evolved.harmonic_blend));

        assert!(
            ctl.poll(later + Duration::from_secs(1)).is_none(),
            "next evolve is a full interval away"
        );
    }

    #[test]
    fn manual_set_resets_the_timer_and_sticks() {
        let mut ctl = MutationController::new(Duration::from_secs(4));
        let manual = MutationState::new(3.0, 1.2, 0.4);
        ctl.set(manual);
        assert_eq!(ctl.current(), manual);
    }
}
