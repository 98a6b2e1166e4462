//! Low-level DSP primitives used by the voices.
//!
//! Allocation-free and realtime-safe, so they can live directly inside voice
//! structs rendered from the audio callback.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Sine tone source.
pub mod oscillator;

pub use envelope::Envelope;
pub use oscillator::SineOsc;
