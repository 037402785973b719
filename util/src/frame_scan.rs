//! MPEG audio Layer III frame scanning
//!
//! Walks an elementary stream frame by frame using the header fields, so a
//! stream only passes if every frame starts exactly where the previous one
//! ended.

use crate::error::{UtilError, UtilResult};

/// MPEG version enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    /// MPEG-1
    Mpeg1,
    /// MPEG-2
    Mpeg2,
    /// MPEG-2.5
    Mpeg25,
}

/// Channel mode from the frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

/// Decoded Layer III frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub offset: usize,
    pub version: MpegVersion,
    pub bitrate_kbps: u32,
    pub sample_rate: u32,
    pub padding: bool,
    pub channel_mode: ChannelMode,
    pub frame_len: usize,
}

impl FrameHeader {
    /// Samples per channel carried by this frame
    pub fn samples(&self) -> usize {
        match self.version {
            MpegVersion::Mpeg1 => 1152,
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => 576,
        }
    }

    pub fn channels(&self) -> usize {
        match self.channel_mode {
            ChannelMode::Mono => 1,
            _ => 2,
        }
    }
}

const MPEG1_BITRATES: [u32; 16] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0];
const MPEG2_BITRATES: [u32; 16] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0];

/// Parse the four header bytes at `offset`.
pub fn parse_header(data: &[u8], offset: usize) -> UtilResult<FrameHeader> {
    let bytes = data.get(offset..offset + 4).ok_or(UtilError::Truncated {
        offset,
        needed: 4,
        available: data.len().saturating_sub(offset),
    })?;
    let header = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

    if header >> 21 != 0x7FF {
        return Err(UtilError::LostSync(offset));
    }

    let invalid = |reason| UtilError::InvalidHeader { offset, reason };

    let version = match (header >> 19) & 0b11 {
        0b00 => MpegVersion::Mpeg25,
        0b10 => MpegVersion::Mpeg2,
        0b11 => MpegVersion::Mpeg1,
        _ => return Err(invalid("reserved version")),
    };

    if (header >> 17) & 0b11 != 0b01 {
        return Err(invalid("not layer III"));
    }

    let bitrate_index = ((header >> 12) & 0xF) as usize;
    let bitrate_kbps = match version {
        MpegVersion::Mpeg1 => MPEG1_BITRATES[bitrate_index],
        MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => MPEG2_BITRATES[bitrate_index],
    };
    if bitrate_kbps == 0 {
        return Err(invalid("free or forbidden bitrate"));
    }

    let rates = match version {
        MpegVersion::Mpeg1 => [44100, 48000, 32000],
        MpegVersion::Mpeg2 => [22050, 24000, 16000],
        MpegVersion::Mpeg25 => [11025, 12000, 8000],
    };
    let sample_rate = *rates
        .get(((header >> 10) & 0b11) as usize)
        .ok_or_else(|| invalid("reserved sample rate"))?;

    let padding = (header >> 9) & 1 == 1;
    let channel_mode = match (header >> 6) & 0b11 {
        0b00 => ChannelMode::Stereo,
        0b01 => ChannelMode::JointStereo,
        0b10 => ChannelMode::DualChannel,
        _ => ChannelMode::Mono,
    };

    let coefficient = match version {
        MpegVersion::Mpeg1 => 144,
        MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => 72,
    };
    let frame_len = (coefficient * bitrate_kbps * 1000 / sample_rate) as usize + padding as usize;

    Ok(FrameHeader {
        offset,
        version,
        bitrate_kbps,
        sample_rate,
        padding,
        channel_mode,
        frame_len,
    })
}

/// Size of a leading ID3v2 tag, 0 if there is none
fn id3v2_len(data: &[u8]) -> usize {
    if data.len() < 10 || &data[..3] != b"ID3" {
        return 0;
    }
    let size = data[6..10]
        .iter()
        .fold(0usize, |acc, &b| (acc << 7) | (b & 0x7F) as usize);
    10 + size
}

/// Scan a complete stream and return every frame header in order.
///
/// A leading ID3v2 tag and a trailing ID3v1 tag are skipped. Any gap,
/// garbage or truncated frame is an error.
pub fn scan_frames(data: &[u8]) -> UtilResult<Vec<FrameHeader>> {
    let mut end = data.len();
    if end >= 128 && &data[end - 128..end - 125] == b"TAG" {
        end -= 128;
    }
    let data = &data[..end];

    let mut frames = Vec::new();
    let mut offset = id3v2_len(data);

    while offset < data.len() {
        let header = parse_header(data, offset)?;
        if offset + header.frame_len > data.len() {
            return Err(UtilError::Truncated {
                offset,
                needed: header.frame_len,
                available: data.len() - offset,
            });
        }
        offset += header.frame_len;
        frames.push(header);
    }

    Ok(frames)
}
