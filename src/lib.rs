//! nucleotone: sequence sonification and synchronized rendering engine.
//!
//! Maps a short symbolic sequence over the alphabet {A, C, G, T} to audible
//! frequencies, plays it back as a timed note stream from a real-time audio
//! callback, and publishes a lock-free playback position that independent,
//! frame-paced renderers sample without ever blocking the audio clock.

pub mod biofeedback;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod evolve;
pub mod params;
pub mod pitch;
pub mod sequence;
pub mod synth; // Voice allocation and chord triggering

pub use engine::{Engine, EngineHandle};
pub use error::EngineError;
pub use params::{EngineConfig, EngineParams, MutationState};
pub use pitch::Key;
pub use sequence::{Base, Sequence};

/// Largest number of frames rendered in one internal chunk.
pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
