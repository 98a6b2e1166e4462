//! End-to-end engine tests: command the handle, render blocks offline, and
//! observe the broadcast cells the way a UI would.

use nucleotone::{Engine, EngineConfig, EngineError, EngineParams, Sequence};

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 512;

fn render_seconds(engine: &mut Engine, seconds: f32) -> Vec<f32> {
    let frames = (seconds * SAMPLE_RATE) as usize;
    let mut out = Vec::with_capacity(frames);
    let mut block = [0.0f32; BLOCK];
    let mut done = 0;
    while done < frames {
        let n = BLOCK.min(frames - done);
        engine.process_block(&mut block[..n]);
        out.extend_from_slice(&block[..n]);
        done += n;
    }
    out
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

#[test]
fn idle_engine_renders_silence() {
    let (mut engine, handle) = Engine::new(SAMPLE_RATE, EngineConfig::default());

    let out = render_seconds(&mut engine, 0.5);
    assert_eq!(peak(&out), 0.0);
    assert_eq!(handle.position(), -1);
    assert!(!handle.is_playing());
}

#[test]
fn playback_produces_bounded_audio() {
    let (mut engine, mut handle) = Engine::new(SAMPLE_RATE, EngineConfig::default());

    handle
        .play(Sequence::sanitize("ACGT"), EngineParams::default())
        .unwrap();

    let out = render_seconds(&mut engine, 1.0);
    let p = peak(&out);
    assert!(p > 0.01, "playback should be audible, peak was {p}");
    assert!(p <= 1.0, "output must stay within [-1, 1], peak was {p}");
    assert!(handle.is_playing());
}

#[test]
fn position_tracks_playback_and_clears_on_stop() {
    let (mut engine, mut handle) = Engine::new(SAMPLE_RATE, EngineConfig::default());
    assert_eq!(handle.position(), -1);

    handle
        .play(Sequence::sanitize("ACGT"), EngineParams::default())
        .unwrap();

    // First block fires the first tick immediately at index 0
    let mut block = [0.0f32; BLOCK];
    engine.process_block(&mut block);
    assert_eq!(handle.position(), 0);

    // One full tick later the position has advanced
    render_seconds(&mut engine, 0.35);
    assert_eq!(handle.position(), 1);

    handle.stop();
    engine.process_block(&mut block);
    assert_eq!(handle.position(), -1);
    assert!(!handle.is_playing());
}

#[test]
fn stop_silences_the_output() {
    let (mut engine, mut handle) = Engine::new(SAMPLE_RATE, EngineConfig::default());
    handle
        .play(Sequence::sanitize("GGGG"), EngineParams::default())
        .unwrap();
    render_seconds(&mut engine, 0.5);

    handle.stop();
    // Release tails (0.15 s) play out past the stop before true silence.
    render_seconds(&mut engine, 0.3);
    let out = render_seconds(&mut engine, 0.2);
    assert_eq!(peak(&out), 0.0);
}

#[test]
fn empty_sequence_is_rejected_before_sending() {
    let (mut engine, mut handle) = Engine::new(SAMPLE_RATE, EngineConfig::default());

    let result = handle.play(Sequence::sanitize("xyz"), EngineParams::default());
    assert_eq!(result, Err(EngineError::EmptySequence));

    // Nothing reached the audio side
    let out = render_seconds(&mut engine, 0.2);
    assert_eq!(peak(&out), 0.0);
    assert!(!handle.is_playing());
}

#[test]
fn reconfigure_restarts_from_the_head() {
    let config = EngineConfig::default();
    let (mut engine, mut handle) = Engine::new(SAMPLE_RATE, config);
    handle
        .play(Sequence::sanitize("ACGT"), EngineParams::default())
        .unwrap();

    // Advance into the middle of the sequence
    render_seconds(&mut engine, 0.65);
    assert!(handle.position() > 0);

    let params = EngineParams {
        speed: 2.0,
        ..EngineParams::default()
    };
    handle.reconfigure(params);

    // The position broadcast reads idle for the whole restart window
    let mut block = [0.0f32; BLOCK];
    engine.process_block(&mut block);
    assert_eq!(handle.position(), -1);

    // After the window it restarts from index 0 and sounds again
    let after = render_seconds(&mut engine, config.restart_latency_seconds * 2.0);
    assert!(peak(&after) > 0.01);
    assert_eq!(handle.position(), 0);
    assert!(handle.is_playing());
}

#[test]
fn handle_frequencies_match_sequence_length() {
    let (_engine, mut handle) = Engine::new(SAMPLE_RATE, EngineConfig::default());
    assert!(handle.frequencies().is_empty());

    handle
        .play(Sequence::sanitize("ACGTAC"), EngineParams::default())
        .unwrap();
    assert_eq!(handle.frequencies().len(), 6);
}

#[test]
fn faster_speed_advances_position_sooner() {
    let (mut engine, mut handle) = Engine::new(SAMPLE_RATE, EngineConfig::default());
    let params = EngineParams {
        speed: 2.0,
        ..EngineParams::default()
    };
    handle.play(Sequence::sanitize("ACGT"), params).unwrap();

    // At speed 2.0 a tick lasts 0.15 s; after 0.2 s we are on index 1
    render_seconds(&mut engine, 0.2);
    assert_eq!(handle.position(), 1);
}
