//! # Codec Backends
//!
//! Concrete decoders behind the pipeline.
//!
//! | Backend | Crate | Feature | Path |
//! |---------|-------|---------|------|
//! | [`VorbisSession`] | `lewton` + `ogg` | `vorbis` | streaming, planar output |
//! | [`FlatLoader`] | `symphonia` | `flat` | whole file, interleaved output |
//!
//! The Vorbis session is a [`CodecSession`](crate::session::CodecSession) and
//! is driven by the orchestrator. The flat loader decodes in one call and its
//! output goes through the format normalizer.

#[cfg(feature = "vorbis")]
mod ogg_tail;

#[cfg(feature = "vorbis")]
mod vorbis;

#[cfg(feature = "flat")]
mod symphonia;

#[cfg(feature = "flat")]
pub mod format;

#[cfg(feature = "vorbis")]
pub use self::vorbis::VorbisSession;

#[cfg(feature = "flat")]
pub use self::symphonia::{FlatLoader, FlatPcm};
