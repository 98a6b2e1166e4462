use crate::params::EngineParams;
use crate::sequence::Sequence;

/// Control messages carried from the owner thread to the audio thread over
/// an SPSC ring. Validation (non-empty sequence, clamped params) happens on
/// the sending side so the audio thread only ever applies legal state.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Start playback from the head of `sequence`.
    Play {
        sequence: Sequence,
        params: EngineParams,
    },
    /// Apply new parameters via the stop/restart-with-latency contract.
    Reconfigure { params: EngineParams },
    /// Stop playback and reset the position broadcast to idle.
    Stop,
}
