//! # Format Normalizer
//!
//! Maps codec-native sample formats onto [`SampleFormat`] and turns flat
//! interleaved output into an [`AudioBuffer`].

use crate::decoder::symphonia::FlatPcm;
use crate::error::{DecodeError, Result};
use crate::types::{AudioBuffer, SampleFormat};
use symphonia::core::sample::SampleFormat as NativeFormat;
use tracing::warn;

/// Canonical format for a native one. An absent native format is an error.
pub fn normalize(native: Option<NativeFormat>) -> Result<SampleFormat> {
    let native = native.ok_or_else(|| {
        DecodeError::UnsupportedFormat("codec did not report a sample format".to_string())
    })?;

    #[allow(unreachable_patterns)]
    let format = match native {
        NativeFormat::U8 => SampleFormat::U8,
        NativeFormat::U16 => SampleFormat::U16,
        NativeFormat::U24 => SampleFormat::U24,
        NativeFormat::U32 => SampleFormat::U32,
        NativeFormat::S8 => SampleFormat::I8,
        NativeFormat::S16 => SampleFormat::I16,
        NativeFormat::S24 => SampleFormat::I24,
        NativeFormat::S32 => SampleFormat::I32,
        NativeFormat::F32 => SampleFormat::F32,
        NativeFormat::F64 => SampleFormat::F64,
        other => return Err(DecodeError::UnsupportedFormat(format!("{:?}", other))),
    };
    Ok(format)
}

/// Wrap flat interleaved PCM in an [`AudioBuffer`].
///
/// `frame_count` is `samples / channels`; a trailing partial frame is dropped.
pub fn flat_to_buffer(pcm: FlatPcm) -> Result<AudioBuffer> {
    if pcm.channel_count == 0 {
        return Err(DecodeError::InvalidChannelCount(0));
    }
    let channels = u16::try_from(pcm.channel_count)
        .map_err(|_| DecodeError::InvalidChannelCount(pcm.channel_count))?;
    let source_format = normalize(pcm.native_format)?;

    let mut samples = pcm.samples;
    let remainder = samples.len() % pcm.channel_count;
    if remainder != 0 {
        warn!(
            samples = samples.len(),
            channels = pcm.channel_count,
            dropped = remainder,
            "Dropping trailing partial frame"
        );
        samples.truncate(samples.len() - remainder);
    }

    AudioBuffer::interleaved(samples, channels, pcm.sample_rate, Some(source_format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelLayout;

    const NATIVE: [NativeFormat; 10] = [
        NativeFormat::U8,
        NativeFormat::U16,
        NativeFormat::U24,
        NativeFormat::U32,
        NativeFormat::S8,
        NativeFormat::S16,
        NativeFormat::S24,
        NativeFormat::S32,
        NativeFormat::F32,
        NativeFormat::F64,
    ];

    fn pcm(samples: Vec<f32>, channels: usize, native: Option<NativeFormat>) -> FlatPcm {
        FlatPcm {
            samples,
            channel_count: channels,
            sample_rate: 22050,
            native_format: native,
        }
    }

    #[test]
    fn test_every_native_format_maps_to_one_canonical() {
        let mapped: Vec<SampleFormat> = NATIVE
            .iter()
            .map(|native| normalize(Some(*native)).unwrap())
            .collect();

        for (i, a) in mapped.iter().enumerate() {
            for b in &mapped[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(normalize(Some(NativeFormat::S24)).unwrap(), SampleFormat::I24);
        assert_eq!(normalize(Some(NativeFormat::U8)).unwrap().bits(), 8);
        assert!(normalize(Some(NativeFormat::F64)).unwrap().is_float());
    }

    #[test]
    fn test_missing_format_is_unsupported() {
        let err = normalize(None).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_frame_count_from_interleaved() {
        let buffer = flat_to_buffer(pcm(vec![0.0; 12], 2, Some(NativeFormat::S16))).unwrap();
        assert_eq!(buffer.frame_count(), 6);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.layout(), ChannelLayout::Interleaved);
        assert_eq!(buffer.format().sample_format, SampleFormat::F32);
        assert_eq!(buffer.format().source_format, Some(SampleFormat::I16));
    }

    #[test]
    fn test_zero_channels_rejected() {
        let err = flat_to_buffer(pcm(vec![0.0; 4], 0, Some(NativeFormat::F32))).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidChannelCount(0)));
    }

    #[test]
    fn test_partial_frame_dropped() {
        let buffer = flat_to_buffer(pcm(vec![0.5; 7], 3, Some(NativeFormat::F32))).unwrap();
        assert_eq!(buffer.frame_count(), 2);
    }
}
