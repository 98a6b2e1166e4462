use crate::params::EngineConfig;
use crate::synth::voice::Voice;

/// Headroom scaling so simultaneous voices cannot clip. With the default
/// polyphony bound of 4 and tick velocities <= 0.8, the mixed output stays
/// inside [-1, 1].
const MASTER_GAIN: f32 = 0.25;

/// One tone of a trigger: frequency plus final amplitude (velocity already
/// multiplied by the scheduler's gain mapping).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency: f32,
    pub amplitude: f32,
}

/// One scheduled audio event: a root tone, optionally an octave harmonic,
/// and a shared gate duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub root: Note,
    pub harmonic: Option<Note>,
    pub duration_samples: u64,
}

impl Trigger {
    /// Number of simultaneous tones (1 or 2 in this design).
    pub fn chord_size(&self) -> usize {
        1 + self.harmonic.is_some() as usize
    }
}

/// Polyphonic tone generator driven by scheduler triggers.
///
/// Voice allocation prefers free voices, then steals the oldest one, so the
/// most recent trigger is always audible even under rapid successive ticks.
pub struct ChordSynth {
    voices: Vec<Voice>,
    trigger_counter: u64,
}

impl ChordSynth {
    pub fn new(sample_rate: f32, config: &EngineConfig) -> Self {
        let voices = (0..config.max_voices.max(2))
            .map(|_| {
                Voice::new(
                    sample_rate,
                    config.attack,
                    config.decay,
                    config.sustain,
                    config.release,
                )
            })
            .collect();

        Self {
            voices,
            trigger_counter: 0,
        }
    }

    /// Play one or two simultaneous tones for `trigger.duration_samples`.
    pub fn trigger(&mut self, trigger: &Trigger) {
        self.trigger_counter += 1;
        let age = self.trigger_counter;
        self.start_note(trigger.root, trigger.duration_samples, age);
        if let Some(harmonic) = trigger.harmonic {
            self.start_note(harmonic, trigger.duration_samples, age);
        }
    }

    fn start_note(&mut self, note: Note, duration: u64, age: u64) {
        let idx = self.allocate_voice();
        self.voices[idx].start(note.frequency, note.amplitude, duration, age);
    }

    /// Free voice if any, otherwise the oldest (smallest age).
    fn allocate_voice(&mut self) -> usize {
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return idx;
        }

        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.age())
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    /// Release every active voice. Tails play out; nothing retriggers.
    pub fn all_off(&mut self) {
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.release();
            }
        }
    }

    /// Mix all active voices additively into `out` (pre-cleared by the
    /// engine), then apply headroom scaling.
    pub fn render(&mut self, out: &mut [f32]) {
        for voice in &mut self.voices {
            voice.render_add(out);
        }
        for sample in out.iter_mut() {
            *sample *= MASTER_GAIN;
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn synth() -> ChordSynth {
        ChordSynth::new(SAMPLE_RATE, &EngineConfig::default())
    }

    fn single(frequency: f32) -> Trigger {
        Trigger {
            root: Note {
                frequency,
                amplitude: 0.8,
            },
            harmonic: None,
            duration_samples: 2_000,
        }
    }

    #[test]
    fn trigger_produces_audible_output() {
        let mut s = synth();
        s.trigger(&single(440.0));

        let mut buf = vec![0.0f32; 512];
        s.render(&mut buf);
        assert!(buf.iter().any(|&x| x.abs() > 0.0));
        assert!(buf.iter().all(|&x| x.abs() <= 1.0));
    }

    #[test]
    fn chord_uses_two_voices() {
        let mut s = synth();
        s.trigger(&Trigger {
            root: Note {
                frequency: 300.0,
                amplitude: 0.8,
            },
            harmonic: Some(Note {
                frequency: 600.0,
                amplitude: 0.4,
            }),
            duration_samples: 2_000,
        });
        assert_eq!(s.active_voices(), 2);
    }

    #[test]
    fn steals_oldest_when_all_voices_busy() {
        let mut s = synth();
        // Default bound is 4 voices; the 5th trigger must steal.
        for i in 0..5 {
            s.trigger(&single(200.0 + i as f32 * 100.0));
        }
        assert_eq!(s.active_voices(), 4);
    }

    #[test]
    fn all_off_drains_to_silence() {
        let mut s = synth();
        s.trigger(&single(440.0));
        let mut buf = vec![0.0f32; 256];
        s.render(&mut buf);

        s.all_off();
        // Render past the release tail (0.15 s at 48 kHz = 7200 samples)
        let mut tail = vec![0.0f32; 16_384];
        s.render(&mut tail);

        assert_eq!(s.active_voices(), 0);
        let mut last = vec![0.0f32; 256];
        s.render(&mut last);
        assert!(last.iter().all(|&x| x == 0.0));
    }
}
