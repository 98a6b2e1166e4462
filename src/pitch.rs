//! Symbol-to-frequency mapping.
//!
//! The whole pitch model is three pure pieces: a fixed four-entry base
//! frequency table, a key signature that transposes the table uniformly, and
//! an additive detune from the mutation state. Everything downstream (the
//! scheduler, the renderers' frequency labels) derives from
//! [`frequency`], so playback and visuals can never disagree about pitch.

use crate::params::MutationState;
use crate::sequence::Base;

/// Base frequency table: C4 / E4 / G4 / A4, a major-sixth chord, so any
/// symbol combination stays consonant before transposition.
const BASE_TABLE: [f32; 4] = [261.63, 329.63, 392.00, 440.00];

/// Base frequency for a symbol, before key transposition and detune.
pub fn base_frequency(base: Base) -> f32 {
    BASE_TABLE[base.index()]
}

/// Key signature: a named, fixed multiplier applied uniformly to the base
/// frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    /// The untransposed table (×1.0).
    #[default]
    Natural,
    /// One whole tone up (×1.122).
    Sharp,
    /// One semitone down (×0.944).
    Flat,
}

impl Key {
    /// Transposition factor. Always positive.
    pub fn multiplier(self) -> f32 {
        match self {
            Key::Natural => 1.0,
            Key::Sharp => 1.122,
            Key::Flat => 0.944,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Key::Natural => "natural",
            Key::Sharp => "sharp",
            Key::Flat => "flat",
        }
    }

    /// The next key in the fixed cycle, for transport controls.
    pub fn cycled(self) -> Key {
        match self {
            Key::Natural => Key::Sharp,
            Key::Sharp => Key::Flat,
            Key::Flat => Key::Natural,
        }
    }
}

/// Map a symbol to its audible frequency in Hz.
///
/// Pure and deterministic:
/// `table[base] * key.multiplier() + mutation.detune * detune_scale`.
pub fn frequency(base: Base, key: Key, mutation: &MutationState, detune_scale: f32) -> f32 {
    base_frequency(base) * key.multiplier() + mutation.detune * detune_scale
}
