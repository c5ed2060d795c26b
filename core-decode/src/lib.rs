//! # Core Decode Module
//!
//! Decodes compressed or container-wrapped audio byte streams into a uniform,
//! codec-agnostic [`AudioBuffer`].
//!
//! ## Overview
//!
//! The streaming path bridges a caller-owned `Read + Seek` source to a
//! pull-based codec:
//!
//! ```text
//! source → StreamAdapter → CodecSession → DecodeOrchestrator → BufferAssembler → AudioBuffer
//! ```
//!
//! - [`stream`]: borrowing adapter with bounded reads and a fault side channel
//! - [`session`]: the codec capability and the guard that closes it
//! - [`assembler`]: planar destination storage sized by the declared length
//! - [`orchestrator`]: the decode loop and its error classification
//!
//! The flat path (`flat` feature) decodes whole files through `symphonia` and
//! normalizes the native sample format.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core_decode::{AudioAssetDecoder, VorbisAssetDecoder};
//! use std::fs::File;
//!
//! # fn main() -> core_decode::Result<()> {
//! let mut file = File::open("theme.ogg")?;
//! let buffer = VorbisAssetDecoder::new().decode(&mut file)?;
//! println!("{} frames, {} channels", buffer.frame_count(), buffer.channel_count());
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod asset;
pub mod config;
pub mod decoder;
pub mod error;
pub mod observer;
pub mod orchestrator;
pub mod session;
pub mod stream;
pub mod types;

pub use asset::{AudioAssetConverter, AudioAssetDecoder, SharedObserver};
pub use config::{DecodeConfig, OverflowPolicy};
pub use error::{DecodeError, OpenError, OpenErrorKind, Result, StreamError, StreamFault};
pub use observer::{DecodeObserver, TracingObserver};
pub use orchestrator::{DecodeOrchestrator, DecodeState};
pub use session::{Chunk, CodecSession, PullResult, SessionGuard};
pub use stream::StreamAdapter;
pub use types::{AudioBuffer, BufferFormat, ChannelLayout, SampleFormat, Samples, StreamInfo};

#[cfg(feature = "vorbis")]
pub use asset::VorbisAssetDecoder;

#[cfg(feature = "flat")]
pub use asset::{FlatAssetDecoder, PassthroughConverter};
