//! The sonification engine: an explicitly owned object pair.
//!
//! [`Engine`] is the audio-side half, moved into the output callback; it
//! owns the scheduler and the voices. [`EngineHandle`] stays with the owner
//! thread; it validates and sends commands and reads the broadcast cells.
//! The pair is constructed once per engine lifetime and torn down together,
//! independent of any UI redraw cycle.
//!
//! Two clocks meet here without ever blocking each other: the audio clock
//! (authoritative for trigger timing, advanced by `process_block`) and the
//! render clock (whatever cadence the handle's reader runs at). The only
//! shared state is an SPSC command ring and three last-value atomics.

pub mod broadcast;
pub mod command;
pub mod scheduler;

use std::sync::Arc;

use crate::error::EngineError;
use crate::params::{EngineConfig, EngineParams};
use crate::sequence::Sequence;
use crate::synth::ChordSynth;
use crate::MAX_BLOCK_SIZE;

pub use broadcast::{LevelCell, PlayingFlag, PositionCell};
pub use command::EngineCommand;
pub use scheduler::Scheduler;

/// Commands are tiny and infrequent; a small ring is plenty.
const COMMAND_CAPACITY: usize = 64;

/// Audio-side half: owns the scheduler and voices, renders blocks.
pub struct Engine {
    scheduler: Scheduler,
    synth: ChordSynth,
    commands: rtrb::Consumer<EngineCommand>,
    playing: Arc<PlayingFlag>,
}

impl Engine {
    /// Build an engine/handle pair for the given sample rate.
    pub fn new(sample_rate: f32, config: EngineConfig) -> (Engine, EngineHandle) {
        let (tx, rx) = rtrb::RingBuffer::new(COMMAND_CAPACITY);
        let position = Arc::new(PositionCell::new());
        let level = Arc::new(LevelCell::new());
        let playing = Arc::new(PlayingFlag::new());

        let engine = Engine {
            scheduler: Scheduler::new(sample_rate, config, position.clone(), level.clone()),
            synth: ChordSynth::new(sample_rate, &config),
            commands: rx,
            playing: playing.clone(),
        };

        let handle = EngineHandle {
            commands: tx,
            position,
            level,
            playing,
            config,
            sequence: Sequence::default(),
            params: EngineParams::default().clamped(),
        };

        (engine, handle)
    }

    /// Render one mono block. Call from the audio callback.
    ///
    /// Drains pending commands first, then splits the block at scheduler
    /// event boundaries so every trigger's envelope starts on its exact
    /// sample.
    pub fn process_block(&mut self, out: &mut [f32]) {
        self.drain_commands();

        out.fill(0.0);
        let frames = out.len();
        let mut done = 0usize;
        while done < frames {
            let span = frames - done;
            let step = match self.scheduler.next_event() {
                Some(0) => {
                    let synth = &mut self.synth;
                    self.scheduler.fire_due(&mut |trigger| synth.trigger(&trigger));
                    continue;
                }
                Some(n) => span.min(n as usize).min(MAX_BLOCK_SIZE),
                None => span.min(MAX_BLOCK_SIZE),
            };
            self.synth.render(&mut out[done..done + step]);
            self.scheduler.advance(step as u64);
            done += step;
        }

        self.playing.store(self.scheduler.is_playing());
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                EngineCommand::Play { sequence, params } => {
                    // Cut anything still sounding before the new run.
                    self.synth.all_off();
                    // Emptiness was validated handle-side; a failure here
                    // just leaves the scheduler stopped.
                    let _ = self.scheduler.play(sequence, params);
                }
                EngineCommand::Reconfigure { params } => {
                    self.synth.all_off();
                    self.scheduler.reconfigure(params);
                }
                EngineCommand::Stop => {
                    self.scheduler.stop();
                    self.synth.all_off();
                }
            }
        }
    }

    /// Direct scheduler access for offline tests and tooling.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

/// Owner-side half: validates commands, reads the broadcast cells, and
/// derives the per-symbol frequency list renderers label themselves with.
pub struct EngineHandle {
    commands: rtrb::Producer<EngineCommand>,
    position: Arc<PositionCell>,
    level: Arc<LevelCell>,
    playing: Arc<PlayingFlag>,
    config: EngineConfig,
    sequence: Sequence,
    params: EngineParams,
}

impl EngineHandle {
    /// Start playback. Fails with [`EngineError::EmptySequence`] before any
    /// command is sent, so an empty play never reaches the audio thread.
    pub fn play(&mut self, sequence: Sequence, params: EngineParams) -> Result<(), EngineError> {
        if sequence.is_empty() {
            return Err(EngineError::EmptySequence);
        }
        self.sequence = sequence.clone();
        self.params = params.clamped();
        tracing::info!(sequence = %self.sequence, key = self.params.key.name(), "play");
        self.send(EngineCommand::Play {
            sequence,
            params: self.params,
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        tracing::info!("stop");
        self.send(EngineCommand::Stop);
    }

    /// Apply new parameters via the stop/restart contract.
    pub fn reconfigure(&mut self, params: EngineParams) {
        self.params = params.clamped();
        tracing::debug!(
            key = self.params.key.name(),
            speed = self.params.speed,
            detune = self.params.mutation.detune,
            blend = self.params.mutation.harmonic_blend,
            "reconfigure"
        );
        self.send(EngineCommand::Reconfigure {
            params: self.params,
        });
    }

    fn send(&mut self, command: EngineCommand) {
        if self.commands.push(command).is_err() {
            // Ring full: the audio thread has not drained in a while.
            // Dropping a control message is preferable to blocking here.
            tracing::warn!("engine command dropped: queue full");
        }
    }

    /// Current playback position, or -1 when idle. Non-blocking; safe to
    /// call every frame.
    pub fn position(&self) -> i32 {
        self.position.load()
    }

    /// Latest biofeedback level in [0, 1].
    pub fn level(&self) -> f32 {
        self.level.load()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load()
    }

    /// The shared level cell, for wiring up a biofeedback source.
    pub fn level_cell(&self) -> Arc<LevelCell> {
        self.level.clone()
    }

    /// Derived per-symbol frequency list for the active sequence.
    pub fn frequencies(&self) -> Vec<f32> {
        self.sequence.frequencies(
            self.params.key,
            &self.params.mutation,
            self.config.detune_scale,
        )
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn params(&self) -> EngineParams {
        self.params
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }
}
