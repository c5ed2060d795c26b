//! # Vorbis Codec Session
//!
//! Streaming Ogg Vorbis session backed by `lewton`, reading through a
//! [`StreamAdapter`] so the caller keeps ownership of the byte source.

use crate::decoder::ogg_tail;
use crate::error::{OpenError, OpenErrorKind, StreamError, StreamFault};
use crate::session::{Chunk, CodecSession, PullResult};
use crate::stream::StreamAdapter;
use crate::types::StreamInfo;
use lewton::audio::AudioReadError;
use lewton::header::HeaderReadError;
use lewton::inside_ogg::OggStreamReader;
use lewton::VorbisError;
use ogg::OggReadError;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Seek};
use tracing::{debug, instrument, trace};

/// Packets decoded while looking for the end of the first audio page.
const MAX_LEAD_PACKETS: usize = 512;

type Packet = Vec<Vec<f32>>;

/// Pull-based Vorbis decoding context.
///
/// Decoded packets are kept until every frame has been handed out, so a
/// packet larger than `max_frames` spans several pulls.
pub struct VorbisSession<'s, S: Read + Seek> {
    reader: Option<OggStreamReader<StreamAdapter<'s, S>>>,
    info: StreamInfo,
    lead: VecDeque<Lead>,
    pending: Packet,
    cursor: usize,
}

/// Result of a packet read ahead during open, replayed by the first pulls.
enum Lead {
    Packet(Packet),
    Failed(VorbisError),
    End,
}

/// Where the stream's first audio page ends.
struct StreamStart {
    /// Granule position of the first audio page.
    granule: u64,
    /// Frames the decoder produced for that page.
    frames: u64,
}

enum Refill {
    Ready,
    End,
    Hole,
    Fatal(StreamError),
}

impl<'s, S: Read + Seek> VorbisSession<'s, S> {
    /// Read the stream headers and metadata.
    ///
    /// Up to `tail_scan_bytes` at the end of the source are searched for the
    /// final page first. The packets of the first audio page are then decoded
    /// ahead, so the declared frame count is measured from where the stream
    /// starts rather than from granule zero.
    #[instrument(skip(adapter))]
    pub fn open(
        mut adapter: StreamAdapter<'s, S>,
        tail_scan_bytes: u64,
    ) -> Result<Self, OpenError> {
        let last_page = ogg_tail::scan_last_page(&mut adapter, tail_scan_bytes);
        let mut reader = OggStreamReader::new(adapter).map_err(open_error)?;

        let serial = reader.stream_serial();
        let (lead, start) = read_lead(&mut reader);
        let declared_frames = match (last_page, start) {
            (Some(page), Some(start)) if page.serial == serial => page
                .granule
                .checked_sub(start.granule)
                .and_then(|rest| rest.checked_add(start.frames)),
            (Some(page), _) if page.serial != serial => {
                debug!(
                    expected = serial,
                    found = page.serial,
                    "Last page belongs to another logical stream"
                );
                None
            }
            _ => None,
        };

        let comments = reader
            .comment_hdr
            .comment_list
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        let info = StreamInfo::new(
            reader.ident_hdr.audio_channels as usize,
            reader.ident_hdr.audio_sample_rate,
        )
        .with_declared_frames(declared_frames)
        .with_encoder(reader.comment_hdr.vendor.clone())
        .with_comments(comments);

        Ok(Self {
            reader: Some(reader),
            info,
            lead,
            pending: Vec::new(),
            cursor: 0,
        })
    }

    fn pending_frames(&self) -> usize {
        self.pending.first().map_or(0, Vec::len)
    }

    fn next_packet(&mut self) -> Result<Option<Packet>, VorbisError> {
        match self.lead.pop_front() {
            Some(Lead::Packet(packet)) => Ok(Some(packet)),
            Some(Lead::Failed(err)) => Err(err),
            Some(Lead::End) => {
                // Stays queued so every later pull reports the end too.
                self.lead.push_front(Lead::End);
                Ok(None)
            }
            None => match self.reader.as_mut() {
                Some(reader) => reader.read_dec_packet_generic::<Packet>(),
                None => Ok(None),
            },
        }
    }

    fn refill(&mut self) -> Refill {
        loop {
            match self.next_packet() {
                Ok(Some(packet)) => {
                    // The first audio packet after the headers decodes to nothing.
                    if packet.first().map_or(true, Vec::is_empty) {
                        continue;
                    }
                    self.pending = packet;
                    self.cursor = 0;
                    return Refill::Ready;
                }
                Ok(None) => return Refill::End,
                Err(err) => return pull_error(err),
            }
        }
    }
}

impl<'s, S: Read + Seek> CodecSession for VorbisSession<'s, S> {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn pull(&mut self, max_frames: usize) -> PullResult<'_> {
        if self.cursor >= self.pending_frames() {
            match self.refill() {
                Refill::Ready => {}
                Refill::End => return PullResult::EndOfStream,
                Refill::Hole => return PullResult::Hole,
                Refill::Fatal(err) => return PullResult::Fatal(err),
            }
        }

        let start = self.cursor;
        let end = start
            .saturating_add(max_frames.max(1))
            .min(self.pending_frames());
        self.cursor = end;
        PullResult::Chunk(Chunk::new(&self.pending, start..end))
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            trace!("Vorbis session closed");
        }
        self.lead.clear();
        self.pending = Vec::new();
        self.cursor = 0;
    }
}

/// Decode up to the end of the first audio page.
///
/// The reader does not trim the start of a stream, so the frames it yields
/// for that page plus the granule distance to the last page is the total it
/// will produce.
fn read_lead<R: Read + Seek>(
    reader: &mut OggStreamReader<R>,
) -> (VecDeque<Lead>, Option<StreamStart>) {
    let mut lead = VecDeque::new();
    let mut frames = 0u64;

    while lead.len() < MAX_LEAD_PACKETS {
        match reader.read_dec_packet_generic::<Packet>() {
            Ok(Some(packet)) => {
                frames += packet.first().map_or(0, Vec::len) as u64;
                lead.push_back(Lead::Packet(packet));
                if let Some(granule) = reader.get_last_absgp() {
                    trace!(granule, frames, "first audio page decoded");
                    return (lead, Some(StreamStart { granule, frames }));
                }
            }
            Ok(None) => {
                lead.push_back(Lead::End);
                break;
            }
            Err(err) => {
                lead.push_back(Lead::Failed(err));
                break;
            }
        }
    }
    debug!(packets = lead.len(), "Stream start not located");
    (lead, None)
}

fn open_error(err: VorbisError) -> OpenError {
    let kind = match &err {
        VorbisError::OggError(OggReadError::ReadError(io)) => {
            if io.kind() == ErrorKind::UnexpectedEof {
                OpenErrorKind::NotThisCodec
            } else {
                OpenErrorKind::Read
            }
        }
        VorbisError::OggError(OggReadError::NoCapturePatternFound) => OpenErrorKind::NotThisCodec,
        VorbisError::OggError(OggReadError::InvalidStreamStructVer(_)) => {
            OpenErrorKind::VersionMismatch
        }
        VorbisError::OggError(OggReadError::HashMismatch(..))
        | VorbisError::OggError(OggReadError::InvalidData) => OpenErrorKind::BadHeader,
        VorbisError::BadHeader(header) => match header {
            HeaderReadError::NotVorbisHeader | HeaderReadError::HeaderIsAudio => {
                OpenErrorKind::NotThisCodec
            }
            HeaderReadError::UnsupportedVorbisVersion => OpenErrorKind::VersionMismatch,
            _ => OpenErrorKind::BadHeader,
        },
        _ => OpenErrorKind::InternalFault,
    };
    OpenError::new(kind, err.to_string())
}

fn pull_error(err: VorbisError) -> Refill {
    let fault = match &err {
        VorbisError::BadAudio(AudioReadError::AudioIsHeader) => StreamFault::BadLink,
        VorbisError::BadAudio(_) | VorbisError::OggError(OggReadError::HashMismatch(..)) => {
            trace!(error = %err, "recoverable packet error");
            return Refill::Hole;
        }
        VorbisError::OggError(OggReadError::ReadError(_)) => StreamFault::Read,
        VorbisError::BadHeader(_) => StreamFault::InvalidHeader,
        _ => StreamFault::BadLink,
    };
    Refill::Fatal(StreamError::new(fault, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, SeekFrom};

    fn open_bytes(data: Vec<u8>) -> Result<(), OpenError> {
        let mut source = Cursor::new(data);
        VorbisSession::open(StreamAdapter::new(&mut source), 64 * 1024).map(|_| ())
    }

    #[test]
    fn test_empty_input_is_not_vorbis() {
        let err = open_bytes(Vec::new()).unwrap_err();
        assert_eq!(err.kind, OpenErrorKind::NotThisCodec);
    }

    #[test]
    fn test_garbage_input_fails_to_open() {
        let err = open_bytes(b"RIFF\x00\x00\x00\x00WAVEfmt garbage".repeat(8)).unwrap_err();
        assert!(matches!(
            err.kind,
            OpenErrorKind::NotThisCodec | OpenErrorKind::BadHeader
        ));
    }

    #[test]
    fn test_ogg_page_without_vorbis_is_rejected() {
        let data = ogg_tail::tests::page(0, 5, b"\x80theora-ish header");
        let err = open_bytes(data).unwrap_err();
        assert_ne!(err.kind, OpenErrorKind::Read);
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::ConnectionReset, "gone"))
        }
    }

    impl Seek for Failing {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Ok(0)
        }
    }

    #[test]
    fn test_read_failure_reports_read_error() {
        let mut source = Failing;
        let err = VorbisSession::open(StreamAdapter::new(&mut source), 1024)
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err.kind, OpenErrorKind::Read);
    }

    #[test]
    fn test_header_errors_map_to_kinds() {
        let kind = |e| open_error(VorbisError::BadHeader(e)).kind;
        assert_eq!(kind(HeaderReadError::NotVorbisHeader), OpenErrorKind::NotThisCodec);
        assert_eq!(
            kind(HeaderReadError::UnsupportedVorbisVersion),
            OpenErrorKind::VersionMismatch
        );
        assert_eq!(kind(HeaderReadError::HeaderBadFormat), OpenErrorKind::BadHeader);
        assert_eq!(
            open_error(VorbisError::OggError(OggReadError::InvalidStreamStructVer(1))).kind,
            OpenErrorKind::VersionMismatch
        );
    }

    #[test]
    fn test_pull_errors_classify() {
        assert!(matches!(
            pull_error(VorbisError::BadAudio(AudioReadError::AudioBadFormat)),
            Refill::Hole
        ));
        assert!(matches!(
            pull_error(VorbisError::OggError(OggReadError::HashMismatch(1, 2))),
            Refill::Hole
        ));
        assert!(matches!(
            pull_error(VorbisError::BadAudio(AudioReadError::AudioIsHeader)),
            Refill::Fatal(StreamError { fault: StreamFault::BadLink, .. })
        ));
        assert!(matches!(
            pull_error(VorbisError::BadHeader(HeaderReadError::HeaderBadFormat)),
            Refill::Fatal(StreamError { fault: StreamFault::InvalidHeader, .. })
        ));
        assert!(matches!(
            pull_error(VorbisError::OggError(OggReadError::ReadError(io::Error::new(
                ErrorKind::Other,
                "boom"
            )))),
            Refill::Fatal(StreamError { fault: StreamFault::Read, .. })
        ));
    }
}
