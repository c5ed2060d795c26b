//! # Decode Orchestrator
//!
//! Drives one decode call through
//! `Opening → MetadataRead → Decoding → Finalizing → {Done, Failed}`.
//!
//! The session is held by a [`SessionGuard`] from the moment it opens, so it
//! is closed exactly once no matter which state the call leaves from.

use crate::assembler::BufferAssembler;
use crate::config::{DecodeConfig, OverflowPolicy};
use crate::error::{DecodeError, OpenError, Result};
use crate::observer::DecodeObserver;
use crate::session::{CodecSession, PullResult, SessionGuard};
use crate::types::{AudioBuffer, SampleFormat};
use tracing::{instrument, trace};

/// States of one decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    Opening,
    MetadataRead,
    Decoding,
    Finalizing,
    Done,
    Failed,
}

/// Runs the read-decode-copy loop against a codec session.
pub struct DecodeOrchestrator<'a> {
    config: &'a DecodeConfig,
    observer: &'a dyn DecodeObserver,
    source_format: Option<SampleFormat>,
}

impl<'a> DecodeOrchestrator<'a> {
    pub fn new(config: &'a DecodeConfig, observer: &'a dyn DecodeObserver) -> Self {
        Self {
            config,
            observer,
            source_format: None,
        }
    }

    /// Native sample format recorded on the output buffer.
    pub fn with_source_format(mut self, format: SampleFormat) -> Self {
        self.source_format = Some(format);
        self
    }

    /// Open a session with `open` and decode it to completion.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Open`] if `open` fails
    /// - [`DecodeError::InvalidChannelCount`] if the stream reports no channels
    /// - [`DecodeError::Stream`] on a fatal mid-stream fault
    /// - [`DecodeError::FrameOverflow`] when overflow is configured as fatal
    /// - [`DecodeError::TooManyHoles`] when a hole limit is configured and hit
    #[instrument(skip_all, fields(chunk_frames = self.config.chunk_frames))]
    pub fn run<C, F>(&self, open: F) -> Result<AudioBuffer>
    where
        C: CodecSession,
        F: FnOnce() -> std::result::Result<C, OpenError>,
    {
        self.config.validate()?;

        trace!(state = ?DecodeState::Opening);
        let session = match open() {
            Ok(session) => session,
            Err(err) => {
                self.observer.open_failed(&err);
                trace!(state = ?DecodeState::Failed);
                return Err(err.into());
            }
        };
        let mut session = SessionGuard::new(session);

        match self.decode(&mut session) {
            Ok(buffer) => {
                trace!(state = ?DecodeState::Done);
                self.observer.finished(buffer.frame_count());
                Ok(buffer)
            }
            Err(err) => {
                trace!(state = ?DecodeState::Failed);
                self.observer.decode_failed(&err);
                Err(err)
            }
        }
    }

    fn decode<C: CodecSession>(&self, session: &mut SessionGuard<C>) -> Result<AudioBuffer> {
        trace!(state = ?DecodeState::MetadataRead);
        let info = session.info().clone();
        self.observer.stream_opened(&info);

        let declared = info
            .declared_frames
            .map(|frames| usize::try_from(frames).unwrap_or(usize::MAX));
        let mut assembler = BufferAssembler::prepare(
            info.channels,
            declared.unwrap_or(0),
            self.config.max_preallocated_frames,
        )?;

        trace!(state = ?DecodeState::Decoding);
        let mut write_offset = 0usize;
        let mut consecutive_holes = 0usize;
        let mut overflowed = false;
        loop {
            match session.pull(self.config.chunk_frames) {
                PullResult::Chunk(chunk) => {
                    consecutive_holes = 0;
                    let required = write_offset + chunk.frames();
                    if required > assembler.len_frames() {
                        self.make_room(&mut assembler, declared, required, &mut overflowed)?;
                    }
                    assembler.append(&chunk, write_offset)?;
                    write_offset = required;
                }
                PullResult::Hole => {
                    consecutive_holes += 1;
                    self.observer.hole(write_offset, consecutive_holes);
                    if let Some(limit) = self.config.max_consecutive_holes {
                        if consecutive_holes > limit {
                            return Err(DecodeError::TooManyHoles(consecutive_holes));
                        }
                    }
                }
                PullResult::EndOfStream => break,
                PullResult::Fatal(err) => return Err(err.into()),
            }
        }

        trace!(state = ?DecodeState::Finalizing);
        if let Some(declared) = declared {
            if write_offset < declared {
                self.observer.size_mismatch(declared, write_offset);
            }
        }
        let (channels, frame_count) = assembler.finalize(write_offset);
        AudioBuffer::planar(channels, frame_count, info.sample_rate, self.source_format)
    }

    fn make_room(
        &self,
        assembler: &mut BufferAssembler,
        declared: Option<usize>,
        required: usize,
        overflowed: &mut bool,
    ) -> Result<()> {
        let target = required.max(assembler.len_frames().saturating_mul(2));
        match declared {
            // Storage was capped below the declaration; fill up to it first.
            Some(declared) if required <= declared => assembler.grow(target.min(declared)),
            Some(declared) => match self.config.overflow_policy {
                OverflowPolicy::Grow => {
                    if !*overflowed {
                        *overflowed = true;
                        self.observer.declared_overflow(declared, required);
                    }
                    assembler.grow(target);
                }
                OverflowPolicy::Fail => {
                    return Err(DecodeError::FrameOverflow { declared, required });
                }
            },
            None => assembler.grow(target),
        }
        Ok(())
    }
}
