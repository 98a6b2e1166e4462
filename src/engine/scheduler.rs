//! Sample-accurate trigger loop.
//!
//! The scheduler owns the validated sequence and the current desired state
//! (key, mutation, speed) and converts them into a stream of [`Trigger`]s.
//! It never renders audio itself; the engine interleaves `fire_due` /
//! `advance` with voice rendering so every trigger lands on its exact
//! sample inside the output block.
//!
//! Parameter changes while playing go through [`Scheduler::reconfigure`],
//! which stops, holds for the configured restart latency, then restarts
//! from the head of the sequence. Tearing a live tick is deliberately not
//! supported.

use std::sync::Arc;

use crate::error::EngineError;
use crate::params::{EngineConfig, EngineParams};
use crate::pitch;
use crate::sequence::Sequence;
use crate::synth::{Note, Trigger};

use super::broadcast::{LevelCell, PositionCell};

/// Velocity of every tick before the biofeedback gain mapping.
const TICK_VELOCITY: f32 = 0.8;

/// Fraction of the tick interval a note stays gated, leaving a gap before
/// the next onset.
const GATE_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Stopped,
    Playing,
    /// The silent window between a reconfigure and its restart.
    Restarting { remaining: u64 },
}

pub struct Scheduler {
    config: EngineConfig,
    sample_rate: f32,
    sequence: Sequence,
    params: EngineParams,
    state: State,
    /// Index of the currently sounding symbol, -1 when idle.
    position: i32,
    samples_per_tick: f64,
    /// Fractional samples until the next tick. <= 0 means due now.
    countdown: f64,
    position_cell: Arc<PositionCell>,
    level_cell: Arc<LevelCell>,
}

impl Scheduler {
    pub fn new(
        sample_rate: f32,
        config: EngineConfig,
        position_cell: Arc<PositionCell>,
        level_cell: Arc<LevelCell>,
    ) -> Self {
        Self {
            config,
            sample_rate,
            sequence: Sequence::default(),
            params: EngineParams::default().clamped(),
            state: State::Stopped,
            position: PositionCell::IDLE,
            samples_per_tick: 1.0,
            countdown: 0.0,
            position_cell,
            level_cell,
        }
    }

    /// Begin playback from the head of `sequence`.
    ///
    /// The first tick is due immediately, so the first triggered frequency
    /// is always symbol 0 under the given params; play/stop/play cycles
    /// reproduce the original run exactly.
    pub fn play(&mut self, sequence: Sequence, params: EngineParams) -> Result<(), EngineError> {
        if sequence.is_empty() {
            return Err(EngineError::EmptySequence);
        }

        self.sequence = sequence;
        self.params = params.clamped();
        self.start_from_head();
        Ok(())
    }

    /// Stop and reset the position broadcast. Idempotent: stopping an
    /// already-stopped scheduler changes nothing.
    pub fn stop(&mut self) {
        if self.state == State::Stopped {
            return;
        }
        self.state = State::Stopped;
        self.position = PositionCell::IDLE;
        self.position_cell.store(PositionCell::IDLE);
    }

    /// Apply new parameters.
    ///
    /// While playing this is a stop-then-restart after the configured
    /// restart latency; the position broadcast reads idle during the silent
    /// window so renderers fall back to their ambient state. When stopped,
    /// the params are simply adopted for the next play.
    pub fn reconfigure(&mut self, params: EngineParams) {
        self.params = params.clamped();
        match self.state {
            State::Stopped => {}
            State::Playing | State::Restarting { .. } => {
                let remaining =
                    (self.config.restart_latency_seconds * self.sample_rate).round() as u64;
                self.state = State::Restarting {
                    remaining: remaining.max(1),
                };
                self.position = PositionCell::IDLE;
                self.position_cell.store(PositionCell::IDLE);
            }
        }
    }

    fn start_from_head(&mut self) {
        let mutation = self.params.mutation;
        let tick_seconds =
            self.config.base_note_seconds / (mutation.tempo_variation * self.params.speed);
        self.samples_per_tick = (tick_seconds * self.sample_rate).max(1.0) as f64;
        self.position = PositionCell::IDLE;
        self.countdown = 0.0;
        self.state = State::Playing;
    }

    /// Samples until the next scheduler event (tick or restart), or `None`
    /// when stopped. `Some(0)` means [`Scheduler::fire_due`] must run before
    /// any more audio is rendered.
    pub fn next_event(&self) -> Option<u64> {
        match self.state {
            State::Stopped => None,
            State::Playing => Some(self.countdown.ceil().max(0.0) as u64),
            State::Restarting { remaining } => Some(remaining),
        }
    }

    /// Handle an event that is due now: fire the tick (emitting a trigger
    /// and the paired position write) or complete a pending restart.
    pub fn fire_due(&mut self, sink: &mut impl FnMut(Trigger)) {
        match self.state {
            State::Stopped => {}
            State::Restarting { remaining } => {
                if remaining == 0 {
                    self.start_from_head();
                    // First tick of the restarted loop is due immediately;
                    // the engine loop will call back in before rendering.
                }
            }
            State::Playing => {
                if self.countdown <= 0.0 {
                    self.fire_tick(sink);
                    self.countdown += self.samples_per_tick;
                }
            }
        }
    }

    /// Account for `frames` samples of rendered audio.
    pub fn advance(&mut self, frames: u64) {
        match &mut self.state {
            State::Stopped => {}
            State::Playing => self.countdown -= frames as f64,
            State::Restarting { remaining } => {
                *remaining = remaining.saturating_sub(frames);
            }
        }
    }

    fn fire_tick(&mut self, sink: &mut impl FnMut(Trigger)) {
        let len = self.sequence.len() as i32;
        debug_assert!(len > 0);

        // Wraparound: after the last symbol the next tick returns to 0.
        self.position = (self.position + 1).rem_euclid(len);
        let base = match self.sequence.get(self.position as usize) {
            Some(base) => base,
            None => return,
        };

        // Position write is paired with the trigger inside the same tick,
        // so the visual highlight is time-aligned with the audible onset.
        self.position_cell.store(self.position);

        let frequency = pitch::frequency(
            base,
            self.params.key,
            &self.params.mutation,
            self.config.detune_scale,
        );

        let amplitude = TICK_VELOCITY * self.output_gain();
        let blend = self.params.mutation.harmonic_blend;
        let harmonic = if blend > self.config.chord_blend_threshold {
            Some(Note {
                frequency: frequency * 2.0,
                amplitude: amplitude * blend,
            })
        } else {
            None
        };

        sink(Trigger {
            root: Note {
                frequency,
                amplitude,
            },
            harmonic,
            duration_samples: (self.samples_per_tick * GATE_RATIO) as u64,
        });
    }

    /// Biofeedback gain: linear from -10 dB (level 0) to 0 dB (level 1)
    /// while enabled, 0 dB baseline otherwise.
    fn output_gain(&self) -> f32 {
        if !self.params.biofeedback_enabled {
            return 1.0;
        }
        let level = self.level_cell.load();
        let db = -10.0 + 10.0 * level;
        10.0f32.powf(db / 20.0)
    }

    pub fn is_playing(&self) -> bool {
        self.state != State::Stopped
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn samples_per_tick(&self) -> f64 {
        self.samples_per_tick
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn params(&self) -> EngineParams {
        self.params
    }
}
