//! # Buffer Assembler
//!
//! Owns the planar destination storage for one decode. Storage is sized from
//! the codec's declared frame count, which is only a hint: the up-front
//! allocation is capped, the decode loop grows storage when the codec
//! produces more and [`BufferAssembler::finalize`] shrinks it when the codec
//! produces less.

use crate::error::{DecodeError, Result};
use crate::session::Chunk;
use tracing::debug;

/// Per-channel destination storage for decoded frames.
#[derive(Debug)]
pub struct BufferAssembler {
    channels: Vec<Vec<f32>>,
    declared_frames: usize,
}

impl BufferAssembler {
    /// Allocate `channel_count` sequences for `declared_frames` samples each,
    /// holding at most `max_preallocated` frames up front.
    ///
    /// If the allocator refuses the reservation, storage starts empty and
    /// grows as frames arrive.
    pub fn prepare(
        channel_count: usize,
        declared_frames: usize,
        max_preallocated: usize,
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(DecodeError::InvalidChannelCount(0));
        }

        let mut frames = declared_frames.min(max_preallocated);
        let mut channels: Vec<Vec<f32>> = Vec::with_capacity(channel_count);
        for _ in 0..channel_count {
            let mut channel = Vec::new();
            if let Err(e) = channel.try_reserve_exact(frames) {
                debug!(error = %e, frames, "Preallocation refused, growing on demand");
                frames = 0;
                channels.iter_mut().for_each(|c| *c = Vec::new());
            }
            channel.resize(frames, 0.0);
            channels.push(channel);
        }

        Ok(Self {
            channels,
            declared_frames,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn declared_frames(&self) -> usize {
        self.declared_frames
    }

    /// Frames every channel can currently hold.
    pub fn len_frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Extend every channel so at least `frames` frames fit.
    pub fn grow(&mut self, frames: usize) {
        if frames <= self.len_frames() {
            return;
        }
        for channel in &mut self.channels {
            channel.resize(frames, 0.0);
        }
    }

    /// Copy every channel of `chunk` into storage starting at `write_offset`.
    ///
    /// The write must fit inside the prepared (or grown) length.
    pub fn append(&mut self, chunk: &Chunk<'_>, write_offset: usize) -> Result<()> {
        if chunk.channels() != self.channels.len() {
            return Err(DecodeError::ChannelMismatch {
                expected: self.channels.len(),
                actual: chunk.channels(),
            });
        }

        let frames = chunk.frames();
        let end = write_offset
            .checked_add(frames)
            .filter(|end| *end <= self.len_frames())
            .ok_or(DecodeError::OutOfBounds {
                offset: write_offset,
                frames,
                len: self.len_frames(),
            })?;

        for (dest, src) in self.channels.iter_mut().zip(chunk.iter()) {
            dest[write_offset..end].copy_from_slice(src);
        }
        Ok(())
    }

    /// Reconcile storage with the frames actually decoded.
    ///
    /// Shrinks every channel to `actual_frames` (releasing excess capacity)
    /// and returns the channels with the final frame count.
    pub fn finalize(mut self, actual_frames: usize) -> (Vec<Vec<f32>>, usize) {
        if actual_frames < self.len_frames() {
            for channel in &mut self.channels {
                channel.truncate(actual_frames);
                channel.shrink_to_fit();
            }
        }
        (self.channels, actual_frames)
    }
}
