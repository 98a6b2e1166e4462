//! Engine parameters and tuned defaults.
//!
//! Parameters are owned by the caller (the TUI or a test) and handed to the
//! engine as desired state; the scheduler applies them only at tick-loop
//! (re)construction boundaries, never mid-tick.

use crate::pitch::Key;

/// Playback speed bounds exposed to transport controls.
pub const SPEED_MIN: f32 = 0.5;
pub const SPEED_MAX: f32 = 2.0;

/// Expressive modulation triple applied to every scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutationState {
    /// Additive frequency offset in Hz. Signed.
    pub detune: f32,
    /// Tick-rate multiplier. Always positive.
    pub tempo_variation: f32,
    /// Harmonic chord blend in [0, 1].
    pub harmonic_blend: f32,
}

impl MutationState {
    /// Build a mutation state, clamping each field into its legal range.
    pub fn new(detune: f32, tempo_variation: f32, harmonic_blend: f32) -> Self {
        Self {
            detune,
            tempo_variation: tempo_variation.max(f32::EPSILON),
            harmonic_blend: harmonic_blend.clamp(0.0, 1.0),
        }
    }
}

impl Default for MutationState {
    fn default() -> Self {
        Self {
            detune: 0.0,
            tempo_variation: 1.0,
            harmonic_blend: 0.0,
        }
    }
}

/// The full desired state the scheduler rebuilds its trigger loop from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineParams {
    pub key: Key,
    pub mutation: MutationState,
    /// Playback speed multiplier, clamped to [`SPEED_MIN`]..[`SPEED_MAX`]
    /// when the scheduler picks the params up. A `Default` of 0.0 would be
    /// meaningless, so `Default` uses 1.0 via [`EngineParams::clamped`].
    pub speed: f32,
    /// When false the biofeedback gain mapping is bypassed entirely and
    /// playback stays at the 0 dB baseline.
    pub biofeedback_enabled: bool,
}

impl EngineParams {
    /// A copy with every field forced into its legal range.
    pub fn clamped(mut self) -> Self {
        self.mutation = MutationState::new(
            self.mutation.detune,
            self.mutation.tempo_variation,
            self.mutation.harmonic_blend,
        );
        self.speed = if self.speed > 0.0 {
            self.speed.clamp(SPEED_MIN, SPEED_MAX)
        } else {
            1.0
        };
        self
    }
}

/// Engine-lifetime configuration.
///
/// The timing constants here are empirically tuned defaults, not contracts:
/// they are fields precisely so product can revisit them without touching
/// scheduler code.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Duration of one tick at tempo variation 1.0 and speed 1.0.
    pub base_note_seconds: f32,
    /// How long a reconfigure holds in the stopped state before restarting.
    pub restart_latency_seconds: f32,
    /// Harmonic blend above this triggers a two-note chord.
    pub chord_blend_threshold: f32,
    /// Scale applied to `MutationState::detune` before it is added in Hz.
    pub detune_scale: f32,
    /// Auto-evolve interval for the mutation controller.
    pub auto_evolve_seconds: f32,
    /// Polyphony bound. Chords use at most 2; headroom covers release tails.
    pub max_voices: usize,
    /// Fixed timbral envelope, set once at voice construction.
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_note_seconds: 0.3,
            restart_latency_seconds: 0.1,
            chord_blend_threshold: 0.3,
            detune_scale: 1.0,
            auto_evolve_seconds: 4.0,
            max_voices: 4,
            attack: 0.01,
            decay: 0.08,
            sustain: 0.6,
            release: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_state_clamps_its_fields() {
        let m = MutationState::new(12.0, -3.0, 1.8);
        assert!(m.tempo_variation > 0.0);
        assert_eq!(m.harmonic_blend, 1.0);
        assert_eq!(m.detune, 12.0);
    }

    #[test]
    fn params_clamp_speed_into_range() {
        let fast = EngineParams {
            speed: 9.0,
            ..Default::default()
        };
        assert_eq!(fast.clamped().speed, SPEED_MAX);

        let slow = EngineParams {
            speed: 0.1,
            ..Default::default()
        };
        assert_eq!(slow.clamped().speed, SPEED_MIN);
    }

    #[test]
    fn default_params_clamp_to_unit_speed() {
        assert_eq!(EngineParams::default().clamped().speed, 1.0);
    }
}
