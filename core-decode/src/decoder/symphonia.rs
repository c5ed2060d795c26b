//! # Symphonia Flat Loader
//!
//! Non-streaming path: read the whole source into memory, probe the container
//! and decode every packet of the default track to interleaved `f32`.

use crate::error::{DecodeError, OpenError, OpenErrorKind, Result, StreamError, StreamFault};
use crate::observer::DecodeObserver;
use crate::types::StreamInfo;
use std::io::{Cursor, Read, Seek};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer, SignalSpec};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::SampleFormat as NativeFormat;
use tracing::{debug, instrument};

/// Fully decoded interleaved PCM with the codec's native sample format.
#[derive(Debug, Clone)]
pub struct FlatPcm {
    pub samples: Vec<f32>,
    pub channel_count: usize,
    pub sample_rate: u32,
    /// Native format reported by the codec, if it reported one.
    pub native_format: Option<NativeFormat>,
}

/// Probes and decodes any container/codec pair `symphonia` supports.
#[derive(Debug, Clone, Default)]
pub struct FlatLoader {
    extension: Option<String>,
}

impl FlatLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// File extension used as a probe hint.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Decode everything from the current position of `source` to its end.
    ///
    /// Packets the codec rejects are reported to `observer` as holes and
    /// skipped.
    #[instrument(skip(self, source, observer), fields(extension = ?self.extension))]
    pub fn load<R: Read + Seek>(
        &self,
        source: &mut R,
        observer: &dyn DecodeObserver,
    ) -> Result<FlatPcm> {
        let mut data = Vec::new();
        source.read_to_end(&mut data).map_err(|e| {
            let err = OpenError::new(OpenErrorKind::Read, e.to_string());
            observer.open_failed(&err);
            err
        })?;
        debug!(bytes = data.len(), "Source read into memory");

        let mut hint = Hint::new();
        if let Some(extension) = &self.extension {
            hint.with_extension(extension);
        }

        let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| report_open(observer, open_error(e)))?;
        let mut format = probed.format;

        let track = format
            .default_track()
            .filter(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                report_open(
                    observer,
                    OpenError::new(OpenErrorKind::NotThisCodec, "no decodable audio track"),
                )
            })?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        let mut decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| report_open(observer, open_error(e)))?;

        let mut channel_count = params.channels.map_or(0, |c| c.count());
        let mut sample_rate = params.sample_rate.unwrap_or(0);
        let encoder = symphonia::default::get_codecs()
            .get_codec(params.codec)
            .map(|descriptor| descriptor.short_name.to_string())
            .unwrap_or_default();
        let comments = format
            .metadata()
            .current()
            .map(|revision| {
                revision
                    .tags()
                    .iter()
                    .map(|tag| format!("{}={}", tag.key, tag.value))
                    .collect()
            })
            .unwrap_or_default();
        observer.stream_opened(
            &StreamInfo::new(channel_count, sample_rate)
                .with_declared_frames(params.n_frames)
                .with_encoder(encoder)
                .with_comments(comments),
        );

        let mut samples = Vec::new();
        let mut native_format = params.sample_format;
        let mut scratch: Option<(SampleBuffer<f32>, u64, SignalSpec)> = None;
        let mut consecutive_holes = 0usize;

        let result = loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break Ok(());
                }
                Err(e) => break Err(stream_error(e)),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    consecutive_holes += 1;
                    debug!(error = e, "Skipping undecodable packet");
                    let frame_offset = samples.len() / channel_count.max(1);
                    observer.hole(frame_offset, consecutive_holes);
                    continue;
                }
                Err(e) => break Err(stream_error(e)),
            };
            consecutive_holes = 0;

            let spec = *decoded.spec();
            native_format = Some(native_format_of(&decoded));
            channel_count = spec.channels.count();
            sample_rate = spec.rate;

            let frames = decoded.capacity() as u64;
            let stale = scratch
                .as_ref()
                .map_or(true, |(_, capacity, old)| *capacity < frames || *old != spec);
            if stale {
                scratch = Some((SampleBuffer::new(frames, spec), frames, spec));
            }
            if let Some((buf, _, _)) = scratch.as_mut() {
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
        };

        if let Err(err) = result {
            observer.decode_failed(&err);
            return Err(err);
        }

        debug!(
            samples = samples.len(),
            channels = channel_count,
            sample_rate,
            "Flat decode complete"
        );
        Ok(FlatPcm {
            samples,
            channel_count,
            sample_rate,
            native_format,
        })
    }
}

fn report_open(observer: &dyn DecodeObserver, err: OpenError) -> OpenError {
    observer.open_failed(&err);
    err
}

fn open_error(err: SymphoniaError) -> OpenError {
    let kind = match &err {
        SymphoniaError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            OpenErrorKind::NotThisCodec
        }
        SymphoniaError::IoError(_) => OpenErrorKind::Read,
        SymphoniaError::Unsupported(_) => OpenErrorKind::NotThisCodec,
        SymphoniaError::DecodeError(_) => OpenErrorKind::BadHeader,
        _ => OpenErrorKind::InternalFault,
    };
    OpenError::new(kind, err.to_string())
}

fn stream_error(err: SymphoniaError) -> DecodeError {
    let fault = match &err {
        SymphoniaError::IoError(_) => StreamFault::Read,
        _ => StreamFault::BadLink,
    };
    StreamError::new(fault, err.to_string()).into()
}

/// Sample format of a decoded buffer before conversion.
fn native_format_of(buffer: &AudioBufferRef<'_>) -> NativeFormat {
    match buffer {
        AudioBufferRef::U8(_) => NativeFormat::U8,
        AudioBufferRef::U16(_) => NativeFormat::U16,
        AudioBufferRef::U24(_) => NativeFormat::U24,
        AudioBufferRef::U32(_) => NativeFormat::U32,
        AudioBufferRef::S8(_) => NativeFormat::S8,
        AudioBufferRef::S16(_) => NativeFormat::S16,
        AudioBufferRef::S24(_) => NativeFormat::S24,
        AudioBufferRef::S32(_) => NativeFormat::S32,
        AudioBufferRef::F32(_) => NativeFormat::F32,
        AudioBufferRef::F64(_) => NativeFormat::F64,
    }
}
