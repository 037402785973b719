//! Test signal generation

use std::f32::consts::PI;

/// `frames` samples of a sine wave
pub fn sine(freq: f32, sample_rate: u32, frames: usize, amplitude: f32) -> Vec<f32> {
    (0..frames)
        .map(|i| amplitude * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Left and right sine channels at different frequencies
pub fn stereo_sine(sample_rate: u32, frames: usize) -> (Vec<f32>, Vec<f32>) {
    (
        sine(440.0, sample_rate, frames, 0.5),
        sine(660.0, sample_rate, frames, 0.5),
    )
}

/// Interleave two channels as `[L0, R0, L1, R1, ...]`
pub fn interleave(left: &[f32], right: &[f32]) -> Vec<f32> {
    left.iter()
        .zip(right)
        .flat_map(|(&l, &r)| [l, r])
        .collect()
}

/// Deterministic pseudo-random noise in [-amplitude, amplitude]
pub fn noise(frames: usize, amplitude: f32, seed: u32) -> Vec<f32> {
    let mut state = seed.max(1);
    (0..frames)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            amplitude * (state as f32 / u32::MAX as f32 * 2.0 - 1.0)
        })
        .collect()
}
