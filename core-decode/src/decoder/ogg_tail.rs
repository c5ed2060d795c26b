//! Locate the final Ogg page of a stream to read its granule position.
//!
//! For Vorbis the granule position of the last page, taken relative to where
//! the stream's first audio page starts, is the total PCM frame count. This
//! is how a session declares its length up front.

use crate::stream::StreamAdapter;
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, trace};

const CAPTURE: &[u8; 4] = b"OggS";
const HEADER_LEN: usize = 27;
const NO_GRANULE: u64 = u64::MAX;

/// Granule and serial of the last complete page found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LastPage {
    pub granule: u64,
    pub serial: u32,
}

/// Search the last `window` bytes of the source for the final valid page.
///
/// The adapter is put back where it was and any fault raised during the scan
/// is discarded. Returns `None` when the source cannot seek or no page with a
/// granule position and a matching checksum lies inside the window.
pub(crate) fn scan_last_page<S: Read + Seek>(
    adapter: &mut StreamAdapter<'_, S>,
    window: u64,
) -> Option<LastPage> {
    let start = adapter.tell()?;
    let found = scan_from(adapter, start, window);

    if !adapter.seek_to(SeekFrom::Start(start)) {
        debug!("Could not restore position after tail scan");
    }
    if let Some(fault) = adapter.take_fault() {
        trace!(error = %fault, "tail scan fault discarded");
    }
    found
}

fn scan_from<S: Read + Seek>(
    adapter: &mut StreamAdapter<'_, S>,
    start: u64,
    window: u64,
) -> Option<LastPage> {
    if !adapter.seek_to(SeekFrom::End(0)) {
        return None;
    }
    let end = adapter.tell()?;
    let from = end.saturating_sub(window).max(start);
    if end - from < HEADER_LEN as u64 || !adapter.seek_to(SeekFrom::Start(from)) {
        return None;
    }

    let mut tail = vec![0u8; usize::try_from(end - from).ok()?];
    let read = adapter.read_bytes(&mut tail);
    tail.truncate(read);

    let page = find_last_page(&tail);
    trace!(window_start = from, window_len = read, page = ?page, "tail scan");
    page
}

/// Walk `data` backwards for the last page whose checksum verifies.
fn find_last_page(data: &[u8]) -> Option<LastPage> {
    if data.len() < HEADER_LEN {
        return None;
    }

    (0..=data.len() - HEADER_LEN).rev().find_map(|at| {
        let page = &data[at..];
        if &page[..4] != CAPTURE || page[4] != 0 {
            return None;
        }
        let granule = u64::from_le_bytes(page[6..14].try_into().ok()?);
        if granule == NO_GRANULE {
            return None;
        }
        let len = page_len(page)?;
        if !checksum_matches(&page[..len]) {
            return None;
        }
        let serial = u32::from_le_bytes(page[14..18].try_into().ok()?);
        Some(LastPage { granule, serial })
    })
}

/// Total page length if the whole page lies inside `page`.
fn page_len(page: &[u8]) -> Option<usize> {
    let segments = page[26] as usize;
    let lacing = page.get(HEADER_LEN..HEADER_LEN + segments)?;
    let body: usize = lacing.iter().map(|&b| b as usize).sum();
    let len = HEADER_LEN + segments + body;
    (len <= page.len()).then_some(len)
}

fn checksum_matches(page: &[u8]) -> bool {
    let stored = u32::from_le_bytes([page[22], page[23], page[24], page[25]]);
    // The checksum field itself is hashed as zeros.
    let crc = crc_update(0, &page[..22]);
    let crc = crc_update(crc, &[0; 4]);
    crc_update(crc, &page[26..]) == stored
}

/// Ogg CRC-32 lookup table (polynomial 0x04c11db7, no reflection).
static CRC_TABLE: [u32; 256] = crc_table();

const fn crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ 0x04c1_1db7
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

fn crc_update(crc: u32, data: &[u8]) -> u32 {
    data.iter().fold(crc, |crc, &byte| {
        (crc << 8) ^ CRC_TABLE[((crc >> 24) as u8 ^ byte) as usize]
    })
}
