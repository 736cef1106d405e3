//! Processor-level behaviour: lanes, bypass, latency and robustness.

mod common;

use std::sync::Arc;

use common::{render, render_block, sine_f32};
use tapehyst::{
    AudioSetup, Buffer, HysteresisParams, HysteresisPlugin, HysteresisProcessor, OsFactor, ProcessorOptions,
    LATENCY_FUDGE,
};

const RATE: f64 = 48_000.0;
const BLOCK: usize = 256;

fn prepare(params: &Arc<HysteresisParams>, num_channels: usize, vectorize: bool) -> HysteresisProcessor {
    HysteresisPlugin::new(params.clone())
        .with_options(ProcessorOptions { vectorize, ..Default::default() })
        .prepare(AudioSetup::new(RATE, BLOCK, num_channels))
        .unwrap()
}

fn stereo_input(len: usize) -> Vec<Vec<f32>> {
    vec![sine_f32(len, 440.0, 0.8, RATE), sine_f32(len, 1250.0, 0.5, RATE)]
}

#[test]
fn test_vectorized_matches_scalar_with_odd_channel_count() {
    let inputs = vec![
        sine_f32(2048, 300.0, 0.9, RATE),
        sine_f32(2048, 1000.0, 0.4, RATE),
        sine_f32(2048, 2500.0, 0.7, RATE),
    ];

    for mode in 0..6 {
        let scalar_params = Arc::new(HysteresisParams::default());
        let vector_params = Arc::new(HysteresisParams::default());
        let mut scalar = prepare(&scalar_params, 3, false);
        let mut vector = prepare(&vector_params, 3, true);

        let mut expected = vec![vec![0.0f32; 2048]; 3];
        let mut actual = vec![vec![0.0f32; 2048]; 3];
        for (i, start) in (0..2048).step_by(BLOCK).enumerate() {
            // Move controls and mode part-way through so every path runs
            if i == 2 {
                for params in [&scalar_params, &vector_params] {
                    params.drive.set(0.9);
                    params.bias.set(0.2);
                    params.mode.set_index(mode);
                }
            }
            render_block(&mut scalar, &inputs, &mut expected, start, start + BLOCK);
            render_block(&mut vector, &inputs, &mut actual, start, start + BLOCK);
        }

        assert_eq!(expected, actual, "mode {mode}");
    }
}

#[test]
fn test_processing_is_deterministic() {
    let inputs = stereo_input(4096);
    let run = || {
        let params = Arc::new(HysteresisParams::default());
        params.mode.set_index(3);
        let mut processor = prepare(&params, 2, true);
        render(&mut processor, &inputs, BLOCK)
    };
    assert_eq!(run(), run());
}

#[test]
fn test_block_size_does_not_change_output() {
    let inputs = stereo_input(3000);
    let params = Arc::new(HysteresisParams::default());

    let mut whole = prepare(&params, 2, true);
    let mut split = prepare(&params, 2, true);
    let a = render(&mut whole, &inputs, BLOCK);
    let b = render(&mut split, &inputs, 37);

    for (x, y) in a.iter().flatten().zip(b.iter().flatten()) {
        assert!((x - y).abs() < 1e-5, "{x} vs {y}");
    }
}

#[test]
fn test_disabled_processor_is_transparent() {
    let params = Arc::new(HysteresisParams::default());
    params.enabled.set(false);
    let mut processor = prepare(&params, 2, true);

    let inputs = stereo_input(1024);
    let outputs = render(&mut processor, &inputs, BLOCK);
    assert_eq!(outputs, inputs);
    assert_eq!(processor.latency_samples(), 0.0);
}

#[test]
fn test_bypass_toggle_crossfades_once() {
    let params = Arc::new(HysteresisParams::default());
    let mut processor = prepare(&params, 2, true);
    let inputs = stereo_input(6 * BLOCK);
    let mut outputs = vec![vec![0.0f32; 6 * BLOCK]; 2];

    render_block(&mut processor, &inputs, &mut outputs, 0, BLOCK);
    assert!(!processor.bypass().is_ramping());

    // Switching off repeatedly only produces one transition block
    params.enabled.set(false);
    render_block(&mut processor, &inputs, &mut outputs, BLOCK, 2 * BLOCK);
    params.enabled.set(false);
    render_block(&mut processor, &inputs, &mut outputs, 2 * BLOCK, 3 * BLOCK);
    assert!(processor.bypass().is_bypassed());

    for ch in 0..2 {
        // Transition block ends exactly on the dry signal
        assert_eq!(outputs[ch][2 * BLOCK - 1], inputs[ch][2 * BLOCK - 1]);
        assert_eq!(outputs[ch][2 * BLOCK..3 * BLOCK], inputs[ch][2 * BLOCK..3 * BLOCK]);
    }

    params.enabled.set(true);
    render_block(&mut processor, &inputs, &mut outputs, 3 * BLOCK, 4 * BLOCK);
    params.enabled.set(true);
    render_block(&mut processor, &inputs, &mut outputs, 4 * BLOCK, 5 * BLOCK);
    assert!(!processor.bypass().is_bypassed());
    assert!(!processor.bypass().is_ramping());
    assert_ne!(outputs[0][4 * BLOCK..5 * BLOCK], inputs[0][4 * BLOCK..5 * BLOCK]);
}

#[test]
fn test_latency_follows_oversampling_and_enable() {
    let params = Arc::new(HysteresisParams::default());
    let mut processor = prepare(&params, 2, true);
    let inputs = stereo_input(BLOCK);

    assert!((processor.latency_samples() - (32.0 + LATENCY_FUDGE)).abs() < 1e-4);

    params.oversampling.set_index(OsFactor::One.index());
    render(&mut processor, &inputs, BLOCK);
    assert!((processor.latency_samples() - LATENCY_FUDGE).abs() < 1e-4);

    params.oversampling.set_index(OsFactor::Sixteen.index());
    render(&mut processor, &inputs, BLOCK);
    assert_eq!(processor.oversampling_factor(), 16);
    assert!((processor.latency_samples() - (32.0 + LATENCY_FUDGE)).abs() < 1e-4);

    params.enabled.set(false);
    render(&mut processor, &inputs, BLOCK);
    assert_eq!(processor.latency_samples(), 0.0);
}

#[test]
fn test_non_finite_input_is_contained() {
    let params = Arc::new(HysteresisParams::default());
    let mut processor = prepare(&params, 1, true);

    let mut input = sine_f32(1024, 440.0, 0.5, RATE);
    input[100] = f32::NAN;
    input[300] = f32::INFINITY;
    input[301] = f32::NEG_INFINITY;
    let outputs = render(&mut processor, &[input], BLOCK);

    assert!(outputs[0].iter().all(|y| y.is_finite()));
    assert!(outputs[0][800..].iter().any(|y| y.abs() > 1e-3));
}

#[test]
fn test_double_precision_buffers() {
    let params = Arc::new(HysteresisParams::default());
    let mut processor = prepare(&params, 1, false);

    let input: Vec<f64> = (0..BLOCK).map(|n| 0.5 * (n as f64 * 0.07).sin()).collect();
    let mut output = vec![0.0f64; BLOCK];
    let mut buffer = Buffer::new([&input[..]], [&mut output[..]], BLOCK);
    processor.process(&mut buffer);

    assert!(output.iter().all(|y| y.is_finite()));
    assert!(output.iter().any(|y| y.abs() > 1e-4));
}

#[test]
fn test_reset_restarts_from_silence() {
    let params = Arc::new(HysteresisParams::default());
    let mut processor = prepare(&params, 2, true);
    let inputs = stereo_input(1024);

    let first = render(&mut processor, &inputs, BLOCK);
    processor.reset();
    let second = render(&mut processor, &inputs, BLOCK);
    assert_eq!(first, second);
}
