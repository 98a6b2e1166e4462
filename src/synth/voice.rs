use crate::dsp::{Envelope, SineOsc};

/// One sounding tone: a sine oscillator under a fixed ADSR profile with a
/// gate length in samples.
///
/// The envelope shape is set once at construction, never per trigger; a
/// trigger only supplies frequency, amplitude, and gate duration. The voice
/// releases itself when the gate runs out and frees itself when the release
/// tail finishes.
pub struct Voice {
    osc: SineOsc,
    env: Envelope,
    frequency: f32,
    amplitude: f32,
    gate_remaining: u64,
    age: u64,
    sample_rate: f32,
}

impl Voice {
    pub fn new(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            osc: SineOsc::new(),
            env: Envelope::adsr(attack, decay, sustain, release),
            frequency: 0.0,
            amplitude: 0.0,
            gate_remaining: 0,
            age: 0,
            sample_rate,
        }
    }

    /// Start (or restart) this voice on a new tone.
    pub fn start(&mut self, frequency: f32, amplitude: f32, gate_samples: u64, age: u64) {
        self.frequency = frequency;
        self.amplitude = amplitude;
        self.gate_remaining = gate_samples.max(1);
        self.age = age;
        self.osc.reset();
        self.env.note_on();
    }

    /// Drop the gate immediately. The release tail still plays out.
    pub fn release(&mut self) {
        self.gate_remaining = 0;
        self.env.note_off(self.sample_rate);
    }

    /// Render this voice additively into `out`.
    pub fn render_add(&mut self, out: &mut [f32]) {
        if !self.env.is_active() {
            return;
        }

        for sample in out.iter_mut() {
            if self.gate_remaining > 0 {
                self.gate_remaining -= 1;
                if self.gate_remaining == 0 {
                    self.env.note_off(self.sample_rate);
                }
            }

            let level = self.env.next_sample(self.sample_rate);
            if !self.env.is_active() {
                break;
            }
            *sample += self.osc.next_sample(self.frequency, self.sample_rate) * level
                * self.amplitude;
        }
    }

    pub fn is_free(&self) -> bool {
        !self.env.is_active()
    }

    pub fn is_active(&self) -> bool {
        self.env.is_active()
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn envelope_level(&self) -> f32 {
        self.env.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn test_voice() -> Voice {
        Voice::new(SAMPLE_RATE, 0.001, 0.01, 0.7, 0.01)
    }

    #[test]
    fn fresh_voice_is_free_and_silent() {
        let mut voice = test_voice();
        assert!(voice.is_free());

        let mut buf = vec![0.0f32; 128];
        voice.render_add(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn started_voice_produces_sound_then_frees_after_gate() {
        let mut voice = test_voice();
        voice.start(440.0, 0.8, 200, 0);
        assert!(voice.is_active());

        let mut buf = vec![0.0f32; 256];
        voice.render_add(&mut buf);
        assert!(buf.iter().any(|&s| s.abs() > 0.0));

        // Gate (200) plus release (~480 samples) fits well inside this
        let mut tail = vec![0.0f32; 4_096];
        voice.render_add(&mut tail);
        assert!(voice.is_free(), "voice should free itself after release");
    }

    #[test]
    fn render_is_additive() {
        let mut voice = test_voice();
        voice.start(440.0, 0.5, 1_000, 0);

        let mut buf = vec![1.0f32; 64];
        voice.render_add(&mut buf);
        // The first sample of a sine attack is ~0, so the pre-existing
        // content must survive.
        assert!((buf[0] - 1.0).abs() < 0.01);
    }

    #[test]
    fn release_cuts_the_gate_short() {
        let mut voice = test_voice();
        voice.start(440.0, 0.8, 1_000_000, 0);
        voice.release();

        let mut buf = vec![0.0f32; 4_096];
        voice.render_add(&mut buf);
        assert!(voice.is_free());
    }
}
