/// Errors surfaced by the sonification engine.
///
/// All user-facing conditions are recoverable: the engine always ends up in
/// a well-defined stopped or playing state after any of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `play` was attempted with a sequence that filtered down to nothing.
    EmptySequence,
    /// An out-of-alphabet character reached the parse boundary. This is an
    /// upstream sanitization bug, not a runtime condition.
    InvalidSymbol(char),
    /// Microphone capture could not start; biofeedback disables itself and
    /// the level holds at the neutral 0.
    PermissionDenied(String),
    /// The audio backend could not start. Surfaced as a warning and retried
    /// only on the next explicit play action.
    AudioInit(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::EmptySequence => {
                write!(f, "sequence contains no playable symbols")
            }
            EngineError::InvalidSymbol(c) => {
                write!(f, "symbol {c:?} is outside the A/C/G/T alphabet")
            }
            EngineError::PermissionDenied(reason) => {
                write!(f, "microphone unavailable: {reason}")
            }
            EngineError::AudioInit(reason) => {
                write!(f, "audio output could not start: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
