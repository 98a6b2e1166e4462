//! Last-value cells shared between the audio clock and the render clock.
//!
//! Each cell has exactly one writer and any number of readers, holds a
//! single scalar, and tolerates one-cycle staleness, so plain relaxed
//! atomics are enough. No queues, no backpressure: readers always see the
//! most recent write.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

/// Playback position of the currently sounding symbol. Written only by the
/// scheduler, in the same tick as the paired audio trigger.
#[derive(Debug)]
pub struct PositionCell(AtomicI32);

impl PositionCell {
    /// Idle: nothing is currently sounding.
    pub const IDLE: i32 = -1;

    pub fn new() -> Self {
        Self(AtomicI32::new(Self::IDLE))
    }

    pub fn store(&self, position: i32) {
        self.0.store(position, Ordering::Relaxed);
    }

    pub fn load(&self) -> i32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for PositionCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized biofeedback level in [0, 1], stored as f32 bits. Written only
/// by the capture callback; a neutral 0 means "no modulation".
#[derive(Debug)]
pub struct LevelCell(AtomicU32);

impl LevelCell {
    pub fn new() -> Self {
        Self(AtomicU32::new(0.0f32.to_bits()))
    }

    pub fn store(&self, level: f32) {
        self.0
            .store(level.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

impl Default for LevelCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Play/stop boolean mirrored out of the audio thread for transport display.
#[derive(Debug, Default)]
pub struct PlayingFlag(AtomicBool);

impl PlayingFlag {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn store(&self, playing: bool) {
        self.0.store(playing, Ordering::Relaxed);
    }

    pub fn load(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_starts_idle() {
        assert_eq!(PositionCell::new().load(), PositionCell::IDLE);
    }

    #[test]
    fn position_holds_last_value() {
        let cell = PositionCell::new();
        cell.store(3);
        cell.store(7);
        assert_eq!(cell.load(), 7);
    }

    #[test]
    fn level_starts_neutral_and_clamps() {
        let cell = LevelCell::new();
        assert_eq!(cell.load(), 0.0);
        cell.store(2.5);
        assert_eq!(cell.load(), 1.0);
        cell.store(-1.0);
        assert_eq!(cell.load(), 0.0);
    }
}
