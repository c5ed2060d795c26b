//! # Codec Session
//!
//! The narrow capability the decode loop drives: read the stream metadata,
//! pull decoded chunks, and release codec resources. Opening is the
//! implementation's constructor, so the orchestrator only ever sees an already
//! opened session.

use crate::error::StreamError;
use crate::types::StreamInfo;
use std::ops::{Deref, DerefMut, Range};

/// Borrowed view of decoded per-channel `f32` samples.
///
/// A chunk borrows the session that produced it, so it cannot outlive the
/// next pull.
#[derive(Debug, Clone)]
pub struct Chunk<'a> {
    planes: &'a [Vec<f32>],
    range: Range<usize>,
}

impl<'a> Chunk<'a> {
    /// A chunk covering `range` of every plane. Each plane must be at least
    /// `range.end` samples long.
    pub fn new(planes: &'a [Vec<f32>], range: Range<usize>) -> Self {
        debug_assert!(planes.iter().all(|plane| plane.len() >= range.end));
        Self { planes, range }
    }

    /// A chunk covering every plane in full.
    pub fn whole(planes: &'a [Vec<f32>]) -> Self {
        let frames = planes.first().map_or(0, Vec::len);
        Self::new(planes, 0..frames)
    }

    pub fn frames(&self) -> usize {
        self.range.len()
    }

    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> &'a [f32] {
        &self.planes[index][self.range.clone()]
    }

    /// Iterate the channels in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a [f32]> + '_ {
        self.planes
            .iter()
            .map(move |plane| &plane[self.range.clone()])
    }
}

/// Outcome of one pull from a codec session.
#[derive(Debug)]
pub enum PullResult<'a> {
    /// Decoded frames, valid until the next pull.
    Chunk(Chunk<'a>),
    /// The stream is exhausted.
    EndOfStream,
    /// A recoverable discontinuity in the data. Decoding may continue.
    Hole,
    /// An unrecoverable fault.
    Fatal(StreamError),
}

/// An opened codec decoding context.
///
/// `close` must be safe to call more than once; only the first call releases
/// anything. After `close`, `pull` returns [`PullResult::EndOfStream`].
pub trait CodecSession {
    /// Stream metadata read while opening.
    fn info(&self) -> &StreamInfo;

    /// Decode up to `max_frames` frames.
    fn pull(&mut self, max_frames: usize) -> PullResult<'_>;

    /// Release all codec-owned resources.
    fn close(&mut self);
}

/// Scoped owner of a session that closes it when dropped.
///
/// The orchestrator holds its session through this guard so teardown runs on
/// every exit path, including early returns and unwinding.
pub struct SessionGuard<C: CodecSession> {
    session: C,
}

impl<C: CodecSession> SessionGuard<C> {
    pub fn new(session: C) -> Self {
        Self { session }
    }
}

impl<C: CodecSession> Deref for SessionGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.session
    }
}

impl<C: CodecSession> DerefMut for SessionGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.session
    }
}

impl<C: CodecSession> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        self.session.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_chunk_views_range_of_every_plane() {
        let planes = vec![vec![0.0, 1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0, 7.0]];
        let chunk = Chunk::new(&planes, 1..3);
        assert_eq!(chunk.frames(), 2);
        assert_eq!(chunk.channels(), 2);
        assert_eq!(chunk.channel(0), &[1.0, 2.0]);
        assert_eq!(chunk.channel(1), &[5.0, 6.0]);
        assert_eq!(chunk.iter().count(), 2);
    }

    #[test]
    fn test_whole_chunk() {
        let planes = vec![vec![0.5; 3]];
        assert_eq!(Chunk::whole(&planes).frames(), 3);

        let empty: Vec<Vec<f32>> = Vec::new();
        assert_eq!(Chunk::whole(&empty).frames(), 0);
    }

    struct CountingSession {
        info: StreamInfo,
        closes: Rc<Cell<usize>>,
        open: bool,
    }

    impl CodecSession for CountingSession {
        fn info(&self) -> &StreamInfo {
            &self.info
        }

        fn pull(&mut self, _max_frames: usize) -> PullResult<'_> {
            PullResult::EndOfStream
        }

        fn close(&mut self) {
            if self.open {
                self.open = false;
                self.closes.set(self.closes.get() + 1);
            }
        }
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let closes = Rc::new(Cell::new(0));
        {
            let _guard = SessionGuard::new(CountingSession {
                info: StreamInfo::new(1, 8000),
                closes: Rc::clone(&closes),
                open: true,
            });
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_explicit_close_then_drop_releases_once() {
        let closes = Rc::new(Cell::new(0));
        {
            let mut guard = SessionGuard::new(CountingSession {
                info: StreamInfo::new(1, 8000),
                closes: Rc::clone(&closes),
                open: true,
            });
            guard.close();
        }
        assert_eq!(closes.get(), 1);
    }
}
