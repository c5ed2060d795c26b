//! Asset decoder tests over in-memory files.

use core_decode::{
    AudioAssetConverter, AudioAssetDecoder, ChannelLayout, DecodeConfig, FlatAssetDecoder,
    OpenErrorKind, PassthroughConverter, SampleFormat, Samples, TracingObserver,
    VorbisAssetDecoder,
};
use std::io::Cursor;
use std::sync::Arc;

/// Canonical PCM WAV file around `data`.
fn wav(channels: u16, sample_rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
    let block_align = channels * (bits / 8);
    let byte_rate = sample_rate * block_align as u32;

    let mut out = Vec::with_capacity(44 + data.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    out
}

/// 16-bit stereo: left at +0.5, right at -0.5.
fn stereo_16bit(frames: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(frames * 4);
    for _ in 0..frames {
        data.extend_from_slice(&16384i16.to_le_bytes());
        data.extend_from_slice(&(-16384i16).to_le_bytes());
    }
    wav(2, 48000, 16, &data)
}

#[test]
fn test_flat_decode_16bit_stereo_wav() {
    let mut source = Cursor::new(stereo_16bit(1000));

    let buffer = FlatAssetDecoder::new()
        .with_extension("wav")
        .decode(&mut source)
        .unwrap();

    assert_eq!(buffer.frame_count(), 1000);
    assert_eq!(buffer.channel_count(), 2);
    assert_eq!(buffer.sample_rate(), 48000);
    assert_eq!(buffer.layout(), ChannelLayout::Interleaved);
    assert_eq!(buffer.format().sample_format, SampleFormat::F32);
    assert_eq!(buffer.format().source_format, Some(SampleFormat::I16));

    let Samples::Interleaved(samples) = buffer.samples() else {
        panic!("flat decode must be interleaved");
    };
    assert_eq!(samples.len(), 2000);
    assert!((samples[0] - 0.5).abs() < 1e-3);
    assert!((samples[1] + 0.5).abs() < 1e-3);
}

#[test]
fn test_flat_decode_8bit_mono_reports_u8() {
    let data = vec![128u8; 441];
    let mut source = Cursor::new(wav(1, 44100, 8, &data));

    let buffer = FlatAssetDecoder::new().decode(&mut source).unwrap();

    assert_eq!(buffer.frame_count(), 441);
    assert_eq!(buffer.channel_count(), 1);
    assert_eq!(buffer.format().source_format, Some(SampleFormat::U8));
}

#[test]
fn test_flat_decode_rejects_unknown_bytes() {
    let mut source = Cursor::new(vec![0x42u8; 2048]);
    let err = FlatAssetDecoder::new().decode(&mut source).unwrap_err();
    assert!(err.is_open_error());
}

#[test]
fn test_vorbis_decoder_rejects_wav() {
    let mut source = Cursor::new(stereo_16bit(64));
    let err = VorbisAssetDecoder::new().decode(&mut source).unwrap_err();

    assert!(err.is_open_error());
    assert_ne!(err.open_kind(), Some(OpenErrorKind::Read));
}

#[test]
fn test_vorbis_decoder_rejects_empty_stream() {
    let mut source = Cursor::new(Vec::new());
    let err = VorbisAssetDecoder::new()
        .with_config(DecodeConfig::strict())
        .decode(&mut source)
        .unwrap_err();

    assert_eq!(err.open_kind(), Some(OpenErrorKind::NotThisCodec));
}

#[test]
fn test_vorbis_decoder_validates_config_first() {
    let mut source = Cursor::new(Vec::new());
    let err = VorbisAssetDecoder::new()
        .with_config(DecodeConfig::default().with_chunk_frames(0))
        .decode(&mut source)
        .unwrap_err();

    assert!(matches!(err, core_decode::DecodeError::InvalidConfig(_)));
}

#[test]
fn test_passthrough_converter_shares_buffer() {
    let mut source = Cursor::new(stereo_16bit(256));

    let asset: Arc<_> = PassthroughConverter.load(&mut source).unwrap();
    let shared = Arc::clone(&asset);

    assert_eq!(shared.frame_count(), 256);
    assert_eq!(Arc::strong_count(&asset), 2);
}

#[test]
fn test_one_decoder_serves_concurrent_calls() {
    let decoder = FlatAssetDecoder::new()
        .with_extension("wav")
        .with_observer(Arc::new(TracingObserver));
    let file = stereo_16bit(500);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let decoder = &decoder;
                let file = file.clone();
                scope.spawn(move || decoder.decode(&mut Cursor::new(file)))
            })
            .collect();

        for handle in handles {
            let buffer = handle.join().unwrap().unwrap();
            assert_eq!(buffer.frame_count(), 500);
        }
    });
}
