//! Microphone-driven biofeedback level.
//!
//! Runs a cpal input stream on its own callback, follows the RMS amplitude
//! with a one-pole smoother, and writes the scaled result into the shared
//! last-value cell. The engine never waits on this: it reads whatever level
//! is current at each tick.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::engine::broadcast::LevelCell;
use crate::error::EngineError;

/// One-pole smoothing applied per input callback.
const SMOOTHING: f32 = 0.8;

/// Gain from raw RMS (typically well below 1.0 for speech) into the useful
/// part of the [0, 1] range.
const LEVEL_GAIN: f32 = 4.0;

/// Live microphone amplitude producer.
///
/// Dropping the source stops the capture stream. Callers that drop it
/// should also reset the cell to neutral so a stale level does not linger.
pub struct BiofeedbackSource {
    _stream: cpal::Stream,
}

impl BiofeedbackSource {
    /// Start capturing into `level`.
    ///
    /// Any failure (no input device, permission refused, stream error) maps
    /// to [`EngineError::PermissionDenied`]; the cell is reset to the
    /// neutral 0 before returning, so the scheduler's gain mapping stays at
    /// baseline and playback is unaffected.
    pub fn start(level: Arc<LevelCell>) -> Result<Self, EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Self::deny(&level, "no input device available"))?;
        let supported = device
            .default_input_config()
            .map_err(|e| Self::deny(&level, &e.to_string()))?;

        let cell = level.clone();
        let mut smoothed = 0.0f32;
        let stream = device
            .build_input_stream(
                &supported.config(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if data.is_empty() {
                        return;
                    }
                    let rms =
                        (data.iter().map(|&s| s * s).sum::<f32>() / data.len() as f32).sqrt();
                    smoothed = SMOOTHING * smoothed + (1.0 - SMOOTHING) * rms;
                    cell.store((smoothed * LEVEL_GAIN).clamp(0.0, 1.0));
                },
                |err| tracing::warn!("biofeedback input error: {err}"),
                None,
            )
            .map_err(|e| Self::deny(&level, &e.to_string()))?;

        stream
            .play()
            .map_err(|e| Self::deny(&level, &e.to_string()))?;

        tracing::info!("biofeedback capture started");
        Ok(Self { _stream: stream })
    }

    fn deny(level: &LevelCell, reason: &str) -> EngineError {
        level.store(0.0);
        tracing::warn!("biofeedback disabled: {reason}");
        EngineError::PermissionDenied(reason.to_string())
    }
}
