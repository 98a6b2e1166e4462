//! Voice management and chord triggering.
//!
//! This layer sits between the scheduler (which decides what to play) and
//! the DSP primitives (which make sound). It owns the polyphony bound and
//! the fixed timbral envelope.

pub mod chord;
pub mod voice;

pub use chord::{ChordSynth, Note, Trigger};
pub use voice::Voice;
