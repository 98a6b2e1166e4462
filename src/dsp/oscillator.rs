use std::f32::consts::TAU;

/// Phase-accumulator sine oscillator.
///
/// The phase is kept in [0, 1) and wrapped every sample, so frequency can
/// change between samples without a click and precision does not degrade
/// over long playback.
#[derive(Debug, Clone, Default)]
pub struct SineOsc {
    phase: f32,
}

impl SineOsc {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Restart the waveform from zero phase. Called on every voice start so
    /// repeated triggers of the same pitch sound identical.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = (TAU * self.phase).sin();
        self.phase += frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_matches_closed_form() {
        let sample_rate = 48_000.0;
        let frequency = 440.0;
        let mut osc = SineOsc::new();

        // sample n should be sin(2pi f n / sr)
        for n in 0..64 {
            let expected = (TAU * frequency * n as f32 / sample_rate).sin();
            let actual = osc.next_sample(frequency, sample_rate);
            assert!(
                (actual - expected).abs() < 1e-4,
                "sample {n}: expected {expected}, got {actual}"
            );
        }
    }

    #[test]
    fn output_stays_in_unit_range() {
        let mut osc = SineOsc::new();
        for _ in 0..10_000 {
            let s = osc.next_sample(1_234.5, 48_000.0);
            assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn reset_restarts_from_zero_phase() {
        let mut osc = SineOsc::new();
        let first = osc.next_sample(440.0, 48_000.0);
        for _ in 0..100 {
            osc.next_sample(440.0, 48_000.0);
        }
        osc.reset();
        assert_eq!(osc.next_sample(440.0, 48_000.0), first);
    }
}
