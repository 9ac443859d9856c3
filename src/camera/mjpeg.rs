//! Splits a `multipart/x-mixed-replace` MJPEG body into JPEG frames.
//!
//! Part headers and boundaries are not parsed. A frame starts at an SOI
//! marker (`FF D8`); anything between frames is discarded. Marker segments
//! before the first scan are skipped by their length field, so an EOI inside
//! an embedded EXIF thumbnail does not end the frame early. From the first
//! scan (`FF DA`) on, the frame ends at the next EOI (`FF D9`).

use bytes::{Bytes, BytesMut};
use log::warn;

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];
const SOS: u8 = 0xDA;

/// A frame that grows past this without an EOI is dropped.
pub const MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// Where the current frame is being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Looking for the next SOI.
    Seeking,
    /// Next marker segment header starts at this offset.
    Segment(usize),
    /// Inside scan data; the EOI search resumes at this offset.
    Entropy(usize),
}

#[derive(Debug)]
pub struct JpegSplitter {
    buf: BytesMut,
    cursor: Cursor,
}

impl Default for JpegSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl JpegSplitter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
            cursor: Cursor::Seeking,
        }
    }

    /// Feed one body chunk and return every JPEG it completes, oldest first.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        loop {
            if self.cursor == Cursor::Seeking {
                if !self.align_to_soi() {
                    break;
                }
                self.cursor = Cursor::Segment(SOI.len());
            }

            match self.find_end() {
                Some(end) => {
                    frames.push(self.buf.split_to(end).freeze());
                    self.cursor = Cursor::Seeking;
                }
                None => {
                    if self.buf.len() > MAX_FRAME_BYTES {
                        warn!("camera: dropping {} byte frame without EOI", self.buf.len());
                        self.buf.clear();
                        self.cursor = Cursor::Seeking;
                    }
                    break;
                }
            }
        }
        frames
    }

    /// Advance the cursor through the buffered frame. Returns the end offset
    /// (one past EOI) once the frame is complete.
    fn find_end(&mut self) -> Option<usize> {
        loop {
            match self.cursor {
                Cursor::Seeking => return None,
                Cursor::Segment(pos) => {
                    let &[m0, m1] = self.buf.get(pos..pos + 2)? else {
                        return None;
                    };
                    self.cursor = match (m0, m1) {
                        // Not a marker: not a well-formed header, fall back to a plain search.
                        (m0, _) if m0 != 0xFF => Cursor::Entropy(pos),
                        // Fill byte.
                        (_, 0xFF) => Cursor::Segment(pos + 1),
                        (_, m) if m == EOI[1] => return Some(pos + 2),
                        (_, SOS) => Cursor::Entropy(pos + 2),
                        // Standalone markers carry no length.
                        (_, 0x01 | 0xD0..=0xD7) => Cursor::Segment(pos + 2),
                        _ => {
                            let &[hi, lo] = self.buf.get(pos + 2..pos + 4)? else {
                                return None;
                            };
                            Cursor::Segment(pos + 2 + usize::from(u16::from_be_bytes([hi, lo])))
                        }
                    };
                }
                Cursor::Entropy(from) => {
                    return match find(&self.buf[from..], &EOI) {
                        Some(pos) => Some(from + pos + EOI.len()),
                        None => {
                            // Keep the last byte: it may be the FF of a split marker.
                            self.cursor = Cursor::Entropy(self.buf.len().saturating_sub(1).max(from));
                            None
                        }
                    };
                }
            }
        }
    }

    /// Drop everything before the next SOI. Returns false when there is none yet.
    fn align_to_soi(&mut self) -> bool {
        match find(&self.buf, &SOI) {
            Some(pos) => {
                drop(self.buf.split_to(pos));
                true
            }
            None => {
                let keep = usize::from(self.buf.last() == Some(&SOI[0]));
                drop(self.buf.split_to(self.buf.len() - keep));
                false
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|w| w == needle)
}
