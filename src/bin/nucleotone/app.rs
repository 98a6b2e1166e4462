//! Application state: engine wiring, audio streams, and transport actions.

use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use nucleotone::biofeedback::BiofeedbackSource;
use nucleotone::evolve::MutationController;
use nucleotone::params::{SPEED_MAX, SPEED_MIN};
use nucleotone::{Engine, EngineConfig, EngineError, EngineHandle, EngineParams, Sequence};
use nucleotone::MAX_BLOCK_SIZE;

/// Audio tap capacity: enough for a few output blocks between UI frames.
const TAP_CAPACITY: usize = 8_192;

/// The running output side: engine handle, stream, and the visualization tap.
pub struct AudioRig {
    pub handle: EngineHandle,
    pub tap: rtrb::Consumer<f32>,
    _stream: cpal::Stream,
}

pub struct App {
    pub config: EngineConfig,
    /// None when the audio backend failed to start. Retried only on the
    /// next explicit play action, never silently.
    pub audio: Option<AudioRig>,
    pub biofeedback: Option<BiofeedbackSource>,
    pub evolve: MutationController,
    pub params: EngineParams,
    pub sequence_text: String,
    pub notice: Option<String>,
}

impl App {
    pub fn new(sequence_text: &str) -> Self {
        let config = EngineConfig::default();
        let mut notice = None;

        let audio = match start_audio(config) {
            Ok(rig) => Some(rig),
            Err(err) => {
                notice = Some(err.to_string());
                None
            }
        };

        Self {
            config,
            audio,
            biofeedback: None,
            evolve: MutationController::new(Duration::from_secs_f32(config.auto_evolve_seconds)),
            params: EngineParams::default().clamped(),
            sequence_text: sequence_text.to_string(),
            notice,
        }
    }

    /// Space bar: toggle playback. A failed audio init is retried here and
    /// only here, on an explicit user action.
    pub fn toggle_play(&mut self) {
        if self.audio.is_none() {
            match start_audio(self.config) {
                Ok(rig) => {
                    self.audio = Some(rig);
                    self.notice = None;
                }
                Err(err) => {
                    self.notice = Some(err.to_string());
                    return;
                }
            }
        }

        let params = self.params;
        let sequence = Sequence::sanitize(&self.sequence_text);
        if let Some(rig) = &mut self.audio {
            if rig.handle.is_playing() {
                rig.handle.stop();
            } else {
                match rig.handle.play(sequence, params) {
                    Ok(()) => self.notice = None,
                    Err(err) => self.notice = Some(err.to_string()),
                }
            }
        }
    }

    pub fn cycle_key(&mut self) {
        self.params.key = self.params.key.cycled();
        self.reconfigure();
    }

    pub fn randomize_mutation(&mut self) {
        self.params.mutation = self.evolve.randomize();
        self.reconfigure();
    }

    pub fn toggle_evolve(&mut self) {
        let enabled = !self.evolve.is_enabled();
        self.evolve.set_enabled(enabled);
    }

    pub fn toggle_biofeedback(&mut self) {
        if self.biofeedback.is_some() {
            self.biofeedback = None;
            self.params.biofeedback_enabled = false;
            if let Some(rig) = &self.audio {
                rig.handle.level_cell().store(0.0);
            }
            self.reconfigure();
            return;
        }

        let Some(rig) = &self.audio else {
            self.notice = Some("audio not running".to_string());
            return;
        };

        match BiofeedbackSource::start(rig.handle.level_cell()) {
            Ok(source) => {
                self.biofeedback = Some(source);
                self.params.biofeedback_enabled = true;
                self.notice = None;
                self.reconfigure();
            }
            Err(err) => {
                // Feature disables itself; level holds at neutral 0.
                self.params.biofeedback_enabled = false;
                self.notice = Some(err.to_string());
            }
        }
    }

    pub fn adjust_speed(&mut self, delta: f32) {
        self.params.speed = (self.params.speed + delta).clamp(SPEED_MIN, SPEED_MAX);
        self.reconfigure();
    }

    /// Frame-loop poll: republish auto-evolved mutation states.
    pub fn poll_evolve(&mut self, now: Instant) {
        if let Some(mutation) = self.evolve.poll(now) {
            self.params.mutation = mutation;
            self.reconfigure();
        }
    }

    fn reconfigure(&mut self) {
        if let Some(rig) = &mut self.audio {
            rig.handle.reconfigure(self.params);
        }
    }

    pub fn position(&self) -> i32 {
        self.audio.as_ref().map_or(-1, |rig| rig.handle.position())
    }

    pub fn is_playing(&self) -> bool {
        self.audio.as_ref().is_some_and(|rig| rig.handle.is_playing())
    }

    pub fn level(&self) -> f32 {
        self.audio.as_ref().map_or(0.0, |rig| rig.handle.level())
    }

    /// Per-symbol frequency list for the active sequence.
    pub fn frequencies(&self) -> Vec<f32> {
        self.audio
            .as_ref()
            .map(|rig| rig.handle.frequencies())
            .unwrap_or_default()
    }

    pub fn active_sequence(&self) -> Sequence {
        self.audio
            .as_ref()
            .map(|rig| rig.handle.sequence().clone())
            .unwrap_or_default()
    }
}

/// Build the output stream and move the engine into its callback.
fn start_audio(config: EngineConfig) -> Result<AudioRig, EngineError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| EngineError::AudioInit("no default output device".to_string()))?;
    let supported = device
        .default_output_config()
        .map_err(|e| EngineError::AudioInit(e.to_string()))?;

    let sample_rate = supported.sample_rate().0 as f32;
    let channels = supported.channels() as usize;

    let (mut engine, handle) = Engine::new(sample_rate, config);
    let (mut tap_tx, tap_rx) = rtrb::RingBuffer::<f32>::new(TAP_CAPACITY);
    let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &supported.config(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels.max(1);
                let mut done = 0;
                while done < frames {
                    let n = (frames - done).min(MAX_BLOCK_SIZE);
                    let block = &mut mono[..n];
                    engine.process_block(block);

                    // Fan mono out to every channel
                    for (i, &sample) in block.iter().enumerate() {
                        let off = (done + i) * channels;
                        for ch in 0..channels {
                            data[off + ch] = sample;
                        }
                    }

                    // Feed the visualization tap; dropping samples when the
                    // UI lags is fine, audio never waits.
                    for &sample in block.iter() {
                        let _ = tap_tx.push(sample);
                    }

                    done += n;
                }
            },
            |err| tracing::warn!("audio output error: {err}"),
            None,
        )
        .map_err(|e| EngineError::AudioInit(e.to_string()))?;

    stream
        .play()
        .map_err(|e| EngineError::AudioInit(e.to_string()))?;

    tracing::info!(sample_rate, channels, "audio output started");

    Ok(AudioRig {
        handle,
        tap: tap_rx,
        _stream: stream,
    })
}
