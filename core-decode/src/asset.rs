//! # Asset Decoders
//!
//! Entry points used by an asset pipeline: decode a caller-owned stream into
//! an [`AudioBuffer`], and hand the result on to a converter.
//!
//! Decoders hold configuration only. One instance can serve any number of
//! calls, concurrently if needed; every call owns its own codec state.

use crate::error::Result;
use crate::observer::{DecodeObserver, TracingObserver};
use crate::types::AudioBuffer;
use std::io::{Read, Seek};
use std::sync::Arc;

#[cfg(feature = "vorbis")]
use crate::{
    config::DecodeConfig, decoder::VorbisSession, orchestrator::DecodeOrchestrator,
    stream::StreamAdapter, types::SampleFormat,
};

#[cfg(feature = "flat")]
use crate::decoder::{format, FlatLoader};

/// Shared observer handle held by decoders.
pub type SharedObserver = Arc<dyn DecodeObserver + Send + Sync>;

/// Decode a byte stream into an audio buffer.
///
/// The stream is read from its current position and is never closed; the
/// caller keeps ownership.
pub trait AudioAssetDecoder {
    fn decode<R: Read + Seek>(&self, source: &mut R) -> Result<AudioBuffer>;
}

// ============================================================================
// Streaming Vorbis
// ============================================================================

/// Ogg Vorbis decoder built on the streaming pipeline. Produces planar `f32`.
#[cfg(feature = "vorbis")]
#[derive(Clone)]
pub struct VorbisAssetDecoder {
    config: DecodeConfig,
    observer: SharedObserver,
}

#[cfg(feature = "vorbis")]
impl VorbisAssetDecoder {
    pub fn new() -> Self {
        Self {
            config: DecodeConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_config(mut self, config: DecodeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }
}

#[cfg(feature = "vorbis")]
impl Default for VorbisAssetDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "vorbis")]
impl AudioAssetDecoder for VorbisAssetDecoder {
    #[tracing::instrument(skip_all, name = "vorbis_decode")]
    fn decode<R: Read + Seek>(&self, source: &mut R) -> Result<AudioBuffer> {
        let tail_scan_bytes = self.config.tail_scan_bytes;
        DecodeOrchestrator::new(&self.config, self.observer.as_ref())
            .with_source_format(SampleFormat::F32)
            .run(move || VorbisSession::open(StreamAdapter::new(source), tail_scan_bytes))
    }
}

// ============================================================================
// Flat multi-format
// ============================================================================

/// Decoder for any format `symphonia` can probe. Produces interleaved `f32`
/// and records the codec's native sample format.
#[cfg(feature = "flat")]
#[derive(Clone)]
pub struct FlatAssetDecoder {
    extension: Option<String>,
    observer: SharedObserver,
}

#[cfg(feature = "flat")]
impl FlatAssetDecoder {
    pub fn new() -> Self {
        Self {
            extension: None,
            observer: Arc::new(TracingObserver),
        }
    }

    /// File extension passed to the container probe as a hint.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }
}

#[cfg(feature = "flat")]
impl Default for FlatAssetDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "flat")]
impl AudioAssetDecoder for FlatAssetDecoder {
    #[tracing::instrument(skip_all, name = "flat_decode", fields(extension = ?self.extension))]
    fn decode<R: Read + Seek>(&self, source: &mut R) -> Result<AudioBuffer> {
        let mut loader = FlatLoader::new();
        if let Some(extension) = &self.extension {
            loader = loader.with_extension(extension.clone());
        }

        let observer = self.observer.as_ref();
        let pcm = loader.load(source, observer)?;
        match format::flat_to_buffer(pcm) {
            Ok(buffer) => {
                observer.finished(buffer.frame_count());
                Ok(buffer)
            }
            Err(err) => {
                observer.decode_failed(&err);
                Err(err)
            }
        }
    }
}

// ============================================================================
// Converters
// ============================================================================

/// Turns a decoded buffer into the asset type a pipeline stores.
pub trait AudioAssetConverter {
    type Output;

    /// Decoder used when the pipeline does not pick one.
    type DefaultDecoder: AudioAssetDecoder + Default;

    fn convert(&self, buffer: AudioBuffer) -> Self::Output;

    /// Decode `source` with the default decoder and convert the result.
    fn load<R: Read + Seek>(&self, source: &mut R) -> Result<Self::Output> {
        let buffer = Self::DefaultDecoder::default().decode(source)?;
        Ok(self.convert(buffer))
    }
}

/// Stores the decoded buffer as-is behind an [`Arc`].
#[cfg(feature = "flat")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughConverter;

#[cfg(feature = "flat")]
impl AudioAssetConverter for PassthroughConverter {
    type Output = Arc<AudioBuffer>;
    type DefaultDecoder = FlatAssetDecoder;

    fn convert(&self, buffer: AudioBuffer) -> Arc<AudioBuffer> {
        Arc::new(buffer)
    }
}
