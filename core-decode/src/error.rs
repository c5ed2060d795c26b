//! # Decode Error Types
//!
//! Error taxonomy for the decode pipeline. Open failures, fatal mid-stream
//! faults and format mapping failures each keep their specific kind so callers
//! can tell them apart without parsing messages.

use std::fmt;
use thiserror::Error;

/// Why a codec session could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenErrorKind {
    /// A read from the underlying source failed.
    Read,
    /// The stream does not contain data for this codec.
    NotThisCodec,
    /// The stream uses a codec or container version this decoder cannot handle.
    VersionMismatch,
    /// A codec header is malformed.
    BadHeader,
    /// The codec hit an internal logic fault.
    InternalFault,
}

impl fmt::Display for OpenErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpenErrorKind::Read => "read error",
            OpenErrorKind::NotThisCodec => "not this codec",
            OpenErrorKind::VersionMismatch => "version mismatch",
            OpenErrorKind::BadHeader => "bad header",
            OpenErrorKind::InternalFault => "internal fault",
        };
        f.write_str(name)
    }
}

/// Failure reported by a codec session's `open`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct OpenError {
    pub kind: OpenErrorKind,
    pub detail: String,
}

impl OpenError {
    pub fn new(kind: OpenErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Fatal fault discovered while pulling decoded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamFault {
    /// A logical stream link is corrupt or an invalid section was reached.
    BadLink,
    /// Stream headers read mid-stream are missing or corrupt.
    InvalidHeader,
    /// The underlying source failed (closed, truncated by I/O error, cancelled).
    Read,
}

impl fmt::Display for StreamFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamFault::BadLink => "bad link",
            StreamFault::InvalidHeader => "invalid header",
            StreamFault::Read => "read failure",
        };
        f.write_str(name)
    }
}

/// A fatal mid-decode fault together with the codec's description of it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{fault}: {detail}")]
pub struct StreamError {
    pub fault: StreamFault,
    pub detail: String,
}

impl StreamError {
    pub fn new(fault: StreamFault, detail: impl Into<String>) -> Self {
        Self {
            fault,
            detail: detail.into(),
        }
    }
}

/// Errors that can occur while decoding an audio asset.
#[derive(Error, Debug)]
pub enum DecodeError {
    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// The codec session could not be opened.
    #[error("Failed to open stream ({0})")]
    Open(#[from] OpenError),

    /// A fatal fault stopped decoding mid-stream.
    #[error("Fatal stream fault ({0})")]
    Stream(#[from] StreamError),

    /// More consecutive holes than the configured limit.
    #[error("Gave up after {0} consecutive holes in the stream")]
    TooManyHoles(usize),

    // ========================================================================
    // Format/Layout Errors
    // ========================================================================
    /// The codec-native sample format has no canonical counterpart.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The stream reported a channel count the pipeline cannot store.
    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(usize),

    /// A chunk arrived with a different channel count than the stream declared.
    #[error("Channel count changed mid-stream: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// The codec produced more frames than declared and overflow is fatal.
    #[error("Decoded {required} frames but the stream declared only {declared}")]
    FrameOverflow { declared: usize, required: usize },

    /// A write would land outside the prepared destination.
    #[error("Write of {frames} frames at offset {offset} exceeds buffer of {len} frames")]
    OutOfBounds {
        offset: usize,
        frames: usize,
        len: usize,
    },

    /// A planar channel's length disagrees with the buffer's frame count.
    #[error("Channel {channel} holds {len} samples but the buffer has {expected} frames")]
    LengthMismatch {
        channel: usize,
        len: usize,
        expected: usize,
    },

    /// Interleaved samples do not divide evenly into frames.
    #[error("{len} interleaved samples do not divide into {channels} channels")]
    PartialFrame { len: usize, channels: usize },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Configuration values are out of range.
    #[error("Invalid decode configuration: {0}")]
    InvalidConfig(String),

    /// I/O error while reading the source outside a codec session.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Returns `true` if the session never opened.
    pub fn is_open_error(&self) -> bool {
        matches!(self, DecodeError::Open(_))
    }

    /// Returns `true` if decoding started but a fatal fault stopped it.
    pub fn is_stream_fault(&self) -> bool {
        matches!(
            self,
            DecodeError::Stream(_)
                | DecodeError::TooManyHoles(_)
                | DecodeError::ChannelMismatch { .. }
        )
    }

    /// Returns `true` if the failure concerns sample format or layout mapping.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            DecodeError::UnsupportedFormat(_) | DecodeError::InvalidChannelCount(_)
        )
    }

    /// The open failure kind, if this is an open failure.
    pub fn open_kind(&self) -> Option<OpenErrorKind> {
        match self {
            DecodeError::Open(err) => Some(err.kind),
            _ => None,
        }
    }

    /// The fatal stream fault, if this is a mid-stream failure.
    pub fn stream_fault(&self) -> Option<StreamFault> {
        match self {
            DecodeError::Stream(err) => Some(err.fault),
            _ => None,
        }
    }
}

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
