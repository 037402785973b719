//! LAME Engine Encoding Tests
//!
//! End-to-end checks of `Mp3Session` against libmp3lame: stream structure,
//! configured bitrate and sample rate in the frame headers, flush behaviour
//! and determinism.

#![cfg(feature = "lame")]

use mp3_session::{EncoderConfig, Mode, Mp3Session, SessionError};
use sha2::{Digest, Sha256};
use util::{scan_frames, stereo_sine, sine, ChannelMode, MpegVersion};

/// Encode `left`/`right` chunk by chunk, then flush; returns the stream
fn encode_stream(config: &EncoderConfig, left: &[f32], right: &[f32]) -> Vec<u8> {
    let mut session = Mp3Session::create();
    session.init(config).expect("init");
    let chunk = session.input_sample_capacity();
    let mut stream = Vec::new();

    for (l, r) in left.chunks(chunk).zip(right.chunks(chunk)) {
        let (left_buf, right_buf) = session.input_buffers_mut().expect("initialized");
        left_buf[..l.len()].copy_from_slice(l);
        right_buf[..r.len()].copy_from_slice(r);
        session.encode(l.len() as i32).expect("encode");
        stream.extend_from_slice(session.output());
    }

    session.flush().expect("flush");
    stream.extend_from_slice(session.output());
    session.destroy();
    stream
}

#[test]
fn test_cbr_stream_is_structurally_valid() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (left, right) = stereo_sine(44100, 44100);
    let config = EncoderConfig::new()
        .sample_rate(44100)
        .channels(2)
        .quality(4)
        .samples(4096)
        .mode(Mode::Cbr);

    let stream = encode_stream(&config, &left, &right);
    let frames = scan_frames(&stream).expect("valid MP3 stream");

    assert!(!frames.is_empty());
    for frame in frames.iter().skip(1) {
        assert_eq!(frame.version, MpegVersion::Mpeg1);
        assert_eq!(frame.sample_rate, 44100);
        assert_eq!(frame.bitrate_kbps, 128);
        assert_ne!(frame.channel_mode, ChannelMode::Mono);
    }

    let encoded_samples: usize = frames.iter().map(|f| f.samples()).sum();
    assert!(encoded_samples >= left.len());
}

#[test]
fn test_cbr_quality_selects_frame_bitrate() {
    let left = sine(440.0, 44100, 22050, 0.5);

    for (quality, kbps) in [(0, 32), (5, 160), (9, 320)] {
        let config = EncoderConfig::new()
            .channels(1)
            .quality(quality)
            .mode(Mode::Cbr);
        let stream = encode_stream(&config, &left, &left);
        let frames = scan_frames(&stream).expect("valid MP3 stream");

        // The first frame may be the bitrate-independent info frame.
        assert!(frames.iter().skip(1).all(|f| f.bitrate_kbps == kbps), "quality {}", quality);
        assert!(frames.iter().all(|f| f.channel_mode == ChannelMode::Mono));
    }
}

#[test]
fn test_output_is_resampled_to_44100() {
    for input_rate in [11025, 22050, 32000, 48000] {
        let (left, right) = stereo_sine(input_rate as u32, input_rate as usize / 2);
        let config = EncoderConfig::new()
            .sample_rate(input_rate)
            .channels(2)
            .quality(6)
            .mode(Mode::Cbr);

        let stream = encode_stream(&config, &left, &right);
        let frames = scan_frames(&stream).expect("valid MP3 stream");

        assert!(!frames.is_empty(), "{} Hz", input_rate);
        assert!(frames.iter().all(|f| f.sample_rate == 44100), "{} Hz", input_rate);
    }
}

#[test]
fn test_vbr_stream_is_structurally_valid() {
    let (left, right) = stereo_sine(48000, 48000);
    for quality in [0, 5, 9] {
        let config = EncoderConfig::new()
            .sample_rate(48000)
            .channels(2)
            .quality(quality)
            .samples(16384)
            .mode(Mode::Vbr);

        let stream = encode_stream(&config, &left, &right);
        let frames = scan_frames(&stream).expect("valid MP3 stream");
        assert!(frames.len() > 10, "quality {}", quality);
    }
}

#[test]
fn test_encoding_is_deterministic() {
    let (left, right) = stereo_sine(44100, 20000);
    let config = EncoderConfig::new().channels(2).quality(7);

    let first = Sha256::digest(encode_stream(&config, &left, &right));
    let second = Sha256::digest(encode_stream(&config, &left, &right));
    assert_eq!(first, second);
}

#[test]
fn test_mono_ignores_poisoned_right_buffer() {
    let left = sine(440.0, 44100, 2048 * 4, 0.8);
    let config = EncoderConfig::new().channels(1).samples(2048);

    let zeros = vec![0.0f32; left.len()];
    let poison = vec![f32::NAN; left.len()];

    let clean = encode_stream(&config, &left, &zeros);
    let poisoned = encode_stream(&config, &left, &poison);

    assert!(!clean.is_empty());
    assert_eq!(Sha256::digest(&clean), Sha256::digest(&poisoned));
}

#[test]
fn test_encode_zero_matches_flush() {
    let (left, right) = stereo_sine(44100, 4096);
    let config = EncoderConfig::new().channels(2).samples(4096);

    let mut outputs = Vec::new();
    for use_sentinel in [true, false] {
        let mut session = Mp3Session::create();
        session.init(&config).expect("init");
        let (l, r) = session.input_buffers_mut().expect("initialized");
        l.copy_from_slice(&left);
        r.copy_from_slice(&right);
        session.encode(4096).expect("encode");

        let flushed = if use_sentinel {
            session.encode(0)
        } else {
            session.flush()
        }
        .expect("flush");

        assert!(flushed > 0);
        outputs.push(session.output().to_vec());
        session.destroy();
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_flush_emits_trailing_frames() {
    let left = sine(440.0, 44100, 2048, 0.5);
    let config = EncoderConfig::new().channels(1).samples(2048);

    let mut session = Mp3Session::create();
    session.init(&config).expect("init");
    session
        .input_buffer_left_mut()
        .expect("initialized")
        .copy_from_slice(&left);
    let encoded = session.encode(2048).expect("encode");
    let flushed = session.flush().expect("flush");
    session.destroy();

    // One chunk is not enough to fill the engine's lookahead; the flush has
    // to deliver the rest.
    assert!(flushed > 0);
    assert!(encoded + flushed <= 2 * config.output_buffer_capacity());
}

#[test]
fn test_sample_count_errors() {
    let mut session = Mp3Session::create();
    session.init(&EncoderConfig::new().samples(2048)).expect("init");

    assert_eq!(session.encode(-5), Err(SessionError::InvalidNumSamples(-5)));
    assert_eq!(
        session.encode(2049),
        Err(SessionError::TooManySamples {
            requested: 2049,
            capacity: 2048
        })
    );
    assert!(session.encode(2048).is_ok());
    session.destroy();
}

#[test]
fn test_output_never_exceeds_capacity_for_noise() {
    let left = util::noise(16384 * 3, 1.0, 11);
    let right = util::noise(16384 * 3, 1.0, 29);
    let config = EncoderConfig::new()
        .channels(2)
        .quality(9)
        .samples(16384)
        .mode(Mode::Cbr);

    let mut session = Mp3Session::create();
    session.init(&config).expect("init");
    let capacity = session.output_buffer_capacity();

    for (l, r) in left.chunks(16384).zip(right.chunks(16384)) {
        let (lb, rb) = session.input_buffers_mut().expect("initialized");
        lb.copy_from_slice(l);
        rb.copy_from_slice(r);
        let n = session.encode(16384).expect("encode");
        assert!(n <= capacity);
    }
    session.destroy();
}
