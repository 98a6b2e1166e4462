use crate::MIN_TIME;

/*
Linear ADSR envelope.

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Gate high (note_on) starts Attack from zero; gate low (note_off) starts
Release from the CURRENT level, whatever stage we are in. Releasing from the
current level rather than the sustain level avoids clicks when a short gate
cuts off mid-attack, which happens constantly here because every tick is a
short gated note.

Release interpolates from a snapshot taken at note_off so it lands exactly
on 0.0 after the configured time.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    // Shape, fixed at construction
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    // Runtime state
    stage: EnvelopeStage,
    level: f32,
    decay_start_level: f32,
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),

            stage: EnvelopeStage::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Gate high: restart the attack from zero for a clean retrigger.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: release from the current level.
    pub fn note_off(&mut self, sample_rate: f32) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeStage::Release;
    }

    /// Advance by one sample and return the new level.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level += 1.0 / (self.attack_time * sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                let drop = self.decay_start_level - self.sustain_level;
                self.level -= drop / (self.decay_time * sample_rate);
                if self.level <= self.sustain_level {
                    self.level = self.sustain_level;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeStage::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);
                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// True while the envelope is producing output. Voice management frees
    /// a voice once this goes false.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.decay_start_level = 0.0;
        self.release_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn run(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample(SAMPLE_RATE);
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(0.01, 0.1, 0.7, 0.2);
        env.note_on();
        run(&mut env, (0.01 * SAMPLE_RATE) as usize);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_ne!(env.stage(), EnvelopeStage::Attack);
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(0.01, 0.05, sustain, 0.2);
        env.note_on();
        run(&mut env, ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5);

        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.level() - sustain).abs() < 0.05);
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(0.01, 0.05, 0.5, release);
        env.note_on();
        run(&mut env, (0.02 * SAMPLE_RATE) as usize);

        env.note_off(SAMPLE_RATE);
        run(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert!(env.level() <= 0.001, "release should fall back to zero");
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert!(!env.is_active());
    }

    #[test]
    fn release_during_attack_starts_from_current_level() {
        let mut env = Envelope::adsr(0.1, 0.1, 0.7, 0.05);
        env.note_on();
        run(&mut env, 20); // partway through a 100-sample attack
        let mid = env.level();
        assert!(mid < 0.9);

        env.note_off(SAMPLE_RATE);
        let after = env.next_sample(SAMPLE_RATE);
        assert!(after <= mid, "release must never jump upward");
    }
}
