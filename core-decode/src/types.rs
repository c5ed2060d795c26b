//! # Audio Buffer Types
//!
//! Canonical, codec-agnostic description of decoded audio. Every decoder in
//! this crate returns an [`AudioBuffer`] regardless of where the samples came
//! from.

use crate::error::{DecodeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============================================================================
// Format Descriptors
// ============================================================================

/// Canonical sample representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    U8,
    U16,
    U24,
    U32,
    U64,
    I8,
    I16,
    I24,
    I32,
    I64,
    F32,
    F64,
}

impl SampleFormat {
    /// Width of one sample in bits.
    pub fn bits(&self) -> u32 {
        match self {
            SampleFormat::U8 | SampleFormat::I8 => 8,
            SampleFormat::U16 | SampleFormat::I16 => 16,
            SampleFormat::U24 | SampleFormat::I24 => 24,
            SampleFormat::U32 | SampleFormat::I32 | SampleFormat::F32 => 32,
            SampleFormat::U64 | SampleFormat::I64 | SampleFormat::F64 => 64,
        }
    }

    /// Returns `true` for floating point formats.
    pub fn is_float(&self) -> bool {
        matches!(self, SampleFormat::F32 | SampleFormat::F64)
    }

    /// Returns `true` for signed integer formats.
    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            SampleFormat::I8
                | SampleFormat::I16
                | SampleFormat::I24
                | SampleFormat::I32
                | SampleFormat::I64
        )
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_float() {
            "f"
        } else if self.is_signed_integer() {
            "i"
        } else {
            "u"
        };
        write!(f, "{}{}", prefix, self.bits())
    }
}

/// How channels are laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    /// One contiguous sequence per channel.
    Planar,
    /// A single sequence alternating channel samples per frame (LRLRLR...).
    Interleaved,
}

/// Format of the samples stored in an [`AudioBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferFormat {
    /// Representation of the stored samples.
    pub sample_format: SampleFormat,
    /// Native format of the encoded stream, when the codec reported one.
    pub source_format: Option<SampleFormat>,
    pub layout: ChannelLayout,
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

// ============================================================================
// Stream Metadata
// ============================================================================

/// Metadata a codec session reports once it has read the stream headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamInfo {
    pub channels: usize,
    pub sample_rate: u32,
    /// The codec's a-priori frame count estimate. `None` when the stream could
    /// not be scanned (e.g. a non-seekable source).
    pub declared_frames: Option<u64>,
    /// Encoder/vendor tag.
    pub encoder: String,
    /// User comments as `KEY=value` strings.
    pub comments: Vec<String>,
}

impl StreamInfo {
    pub fn new(channels: usize, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            ..Default::default()
        }
    }

    pub fn with_declared_frames(mut self, frames: Option<u64>) -> Self {
        self.declared_frames = frames;
        self
    }

    pub fn with_encoder(mut self, encoder: impl Into<String>) -> Self {
        self.encoder = encoder.into();
        self
    }

    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }

    /// Duration implied by the declared frame count.
    pub fn declared_duration(&self) -> Option<Duration> {
        let frames = self.declared_frames?;
        if self.sample_rate == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(
            frames as f64 / self.sample_rate as f64,
        ))
    }
}

// ============================================================================
// Decoded Audio
// ============================================================================

/// Sample storage of an [`AudioBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Planar(Vec<Vec<f32>>),
    Interleaved(Vec<f32>),
}

/// A fully decoded audio asset.
///
/// Constructors check the length invariant: planar buffers hold one sequence
/// per channel, each exactly `frame_count` long; interleaved buffers hold
/// `frame_count * channels` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    format: BufferFormat,
    frame_count: usize,
    samples: Samples,
}

impl AudioBuffer {
    /// Build a planar `f32` buffer from per-channel sequences.
    pub fn planar(
        channels: Vec<Vec<f32>>,
        frame_count: usize,
        sample_rate: u32,
        source_format: Option<SampleFormat>,
    ) -> Result<Self> {
        if channels.is_empty() {
            return Err(DecodeError::InvalidChannelCount(0));
        }
        let channel_count = u16::try_from(channels.len())
            .map_err(|_| DecodeError::InvalidChannelCount(channels.len()))?;

        if let Some((index, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, channel)| channel.len() != frame_count)
        {
            return Err(DecodeError::LengthMismatch {
                channel: index,
                len: channel.len(),
                expected: frame_count,
            });
        }

        Ok(Self {
            format: BufferFormat {
                sample_format: SampleFormat::F32,
                source_format,
                layout: ChannelLayout::Planar,
                channels: channel_count,
                sample_rate,
            },
            frame_count,
            samples: Samples::Planar(channels),
        })
    }

    /// Build an interleaved `f32` buffer. `samples.len()` must be a multiple of
    /// `channels`.
    pub fn interleaved(
        samples: Vec<f32>,
        channels: u16,
        sample_rate: u32,
        source_format: Option<SampleFormat>,
    ) -> Result<Self> {
        if channels == 0 {
            return Err(DecodeError::InvalidChannelCount(0));
        }
        let channel_count = channels as usize;
        if samples.len() % channel_count != 0 {
            return Err(DecodeError::PartialFrame {
                len: samples.len(),
                channels: channel_count,
            });
        }

        Ok(Self {
            format: BufferFormat {
                sample_format: SampleFormat::F32,
                source_format,
                layout: ChannelLayout::Interleaved,
                channels,
                sample_rate,
            },
            frame_count: samples.len() / channel_count,
            samples: Samples::Interleaved(samples),
        })
    }

    pub fn format(&self) -> &BufferFormat {
        &self.format
    }

    /// Number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn channel_count(&self) -> usize {
        self.format.channels as usize
    }

    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate
    }

    pub fn layout(&self) -> ChannelLayout {
        self.format.layout
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn into_samples(self) -> Samples {
        self.samples
    }

    /// Samples of one channel, for planar buffers.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        match &self.samples {
            Samples::Planar(channels) => channels.get(index).map(Vec::as_slice),
            Samples::Interleaved(_) => None,
        }
    }

    /// Playback duration of the decoded frames.
    pub fn duration(&self) -> Duration {
        if self.format.sample_rate == 0 {
            return Duration::from_secs(0);
        }
        Duration::from_secs_f64(self.frame_count as f64 / self.format.sample_rate as f64)
    }
}
