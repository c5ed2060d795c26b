//! # Stream Adapter
//!
//! Exposes a caller-owned byte source through the three primitives a
//! pull-based codec needs: bounded read, seek and tell.
//!
//! The adapter only borrows the source. Read failures never show up in the
//! return value of [`StreamAdapter::read_bytes`]; they land in a side-channel
//! fault slot that the caller inspects with [`StreamAdapter::take_fault`].
//! Once a read hits the end of the source the adapter refuses further reads
//! until a seek repositions it.
//!
//! The [`Read`] and [`Seek`] impls are the shim a codec binds to: they forward
//! to the primitives and turn a recorded fault back into an `io::Error`.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use tracing::trace;

/// Borrowing adapter over a seekable byte source.
pub struct StreamAdapter<'a, S: Read + Seek> {
    source: &'a mut S,
    at_end: bool,
    fault: Option<io::Error>,
}

impl<'a, S: Read + Seek> StreamAdapter<'a, S> {
    pub fn new(source: &'a mut S) -> Self {
        Self {
            source,
            at_end: false,
            fault: None,
        }
    }

    /// Read up to `buf.len()` bytes, looping over short reads.
    ///
    /// Returns the number of bytes read. Fewer than requested means the end of
    /// the source was reached or a read failed; in the latter case the error is
    /// available from [`take_fault`](Self::take_fault).
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        if buf.is_empty() || self.at_end {
            return 0;
        }

        let mut filled = 0;
        while filled < buf.len() {
            match self.source.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.at_end = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    trace!(error = %e, "source read failed");
                    self.fault = Some(e);
                    break;
                }
            }
        }
        filled
    }

    /// Reposition the source. Returns `false` on failure and records the fault.
    ///
    /// Any end-of-source condition is cleared before repositioning.
    pub fn seek_to(&mut self, pos: SeekFrom) -> bool {
        self.at_end = false;
        match self.source.seek(pos) {
            Ok(_) => true,
            Err(e) => {
                trace!(error = %e, ?pos, "source seek failed");
                self.fault = Some(e);
                false
            }
        }
    }

    /// Absolute position of the source's cursor.
    pub fn tell(&mut self) -> Option<u64> {
        match self.source.stream_position() {
            Ok(pos) => Some(pos),
            Err(e) => {
                self.fault = Some(e);
                None
            }
        }
    }

    /// Returns `true` once a read has reached the end of the source.
    pub fn at_end(&self) -> bool {
        self.at_end
    }

    /// Take the last recorded read/seek failure, if any.
    pub fn take_fault(&mut self) -> Option<io::Error> {
        self.fault.take()
    }
}

impl<S: Read + Seek> Read for StreamAdapter<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(e) = self.fault.take() {
            return Err(e);
        }

        let n = self.read_bytes(buf);
        match self.fault.take() {
            Some(e) if n == 0 => Err(e),
            Some(e) => {
                // Hand back what was read now and report the failure on the
                // next call.
                self.fault = Some(e);
                Ok(n)
            }
            None => Ok(n),
        }
    }
}

impl<S: Read + Seek> Seek for StreamAdapter<'_, S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if !self.seek_to(pos) {
            return Err(self
                .take_fault()
                .unwrap_or_else(|| io::Error::new(ErrorKind::Other, "seek failed")));
        }
        self.tell().ok_or_else(|| {
            self.take_fault()
                .unwrap_or_else(|| io::Error::new(ErrorKind::Other, "tell failed"))
        })
    }
}
