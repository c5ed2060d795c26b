//! # Decode Observer
//!
//! Diagnostic events raised by the decode loop. The loop never branches on an
//! observer, it only reports to it, so the decode logic can be exercised with
//! a mock or a silent observer. [`TracingObserver`] is the default and writes
//! everything through `tracing`.

use crate::error::{DecodeError, OpenError};
use crate::types::StreamInfo;
use tracing::{debug, error, info, warn};

/// Receiver of decode loop events. Every method defaults to doing nothing.
#[cfg_attr(test, mockall::automock)]
pub trait DecodeObserver {
    /// Stream headers were read.
    fn stream_opened(&self, _info: &StreamInfo) {}

    /// The codec rejected the stream while opening.
    fn open_failed(&self, _error: &OpenError) {}

    /// A hole in the data was skipped at `frame_offset`.
    fn hole(&self, _frame_offset: usize, _consecutive: usize) {}

    /// The codec produced more frames than it declared.
    fn declared_overflow(&self, _declared: usize, _required: usize) {}

    /// Fewer frames were decoded than declared; the buffer was shrunk.
    fn size_mismatch(&self, _declared: usize, _actual: usize) {}

    /// Decoding stopped on a fatal error after the session opened.
    fn decode_failed(&self, _error: &DecodeError) {}

    /// Decoding finished with `frames` frames.
    fn finished(&self, _frames: usize) {}
}

/// Observer that logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecodeObserver for TracingObserver {
    fn stream_opened(&self, info: &StreamInfo) {
        for comment in &info.comments {
            info!("    [{}]", comment);
        }
        info!(
            channels = info.channels,
            sample_rate = info.sample_rate,
            declared_frames = ?info.declared_frames,
            declared_duration = ?info.declared_duration(),
            encoder = %info.encoder,
            "Stream opened"
        );
    }

    fn open_failed(&self, error: &OpenError) {
        error!(kind = %error.kind, "Failed to open stream: {}", error.detail);
    }

    fn hole(&self, frame_offset: usize, consecutive: usize) {
        warn!(
            frame_offset,
            consecutive, "Interruption in the data, skipping hole"
        );
    }

    fn declared_overflow(&self, declared: usize, required: usize) {
        warn!(
            declared,
            required, "Codec produced more frames than declared, growing buffer"
        );
    }

    fn size_mismatch(&self, declared: usize, actual: usize) {
        warn!(
            declared,
            actual, "Decoded fewer frames than declared, shrinking buffer"
        );
    }

    fn decode_failed(&self, error: &DecodeError) {
        error!("Decoding failed: {}", error);
    }

    fn finished(&self, frames: usize) {
        debug!(frames, "Ended reading stream");
    }
}
