//! PCM audio data processing utilities
//!
//! Helpers for moving caller PCM into the session's per-channel staging
//! buffers.

/// De-interleave `[L0, R0, L1, R1, ...]` into `left` and `right`.
///
/// Copies `min(pcm.len() / channels, left.len())` frames and returns that
/// count. With one channel the data goes to `left` and `right` is left
/// untouched.
pub fn deinterleave_into(pcm: &[f32], channels: usize, left: &mut [f32], right: &mut [f32]) -> usize {
    match channels {
        0 => 0,
        1 => {
            let frames = pcm.len().min(left.len());
            left[..frames].copy_from_slice(&pcm[..frames]);
            frames
        }
        _ => {
            let frames = (pcm.len() / channels).min(left.len()).min(right.len());
            for (i, frame) in pcm.chunks_exact(channels).take(frames).enumerate() {
                left[i] = frame[0];
                right[i] = frame[1];
            }
            frames
        }
    }
}

/// Split interleaved PCM into owned channel vectors
pub fn deinterleave(pcm: &[f32], channels: usize) -> (Vec<f32>, Vec<f32>) {
    let frames = if channels == 0 { 0 } else { pcm.len() / channels };
    let mut left = vec![0.0; frames];
    let mut right = if channels > 1 { vec![0.0; frames] } else { Vec::new() };
    deinterleave_into(pcm, channels, &mut left, &mut right);
    (left, right)
}
