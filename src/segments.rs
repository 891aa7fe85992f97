//! JPEG segment surgery.
//!
//! A JPEG file is read as an ordered list of [`Segment`]s: standalone markers
//! (SOI, EOI, RSTn), length-prefixed marker segments (APPn, DQT, SOF, SOS
//! header, ...) and raw byte runs (entropy-coded scan data and anything
//! trailing EOI). [`rebuild_with_metadata`] uses that model to carry the EXIF
//! APP1 block of an original file over to a freshly re-encoded one without
//! interpreting the EXIF contents.

use crate::logger::Logger;
use thiserror::Error;

pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const APP1: u8 = 0xE1;
pub const TEM: u8 = 0x01;
/// Pseudo-marker for raw bytes. `FF 00` is byte stuffing, never a marker.
pub const RAW: u8 = 0x00;

/// Payload prefix identifying an EXIF APP1 segment.
pub const EXIF_SIGNATURE: &[u8; 6] = b"Exif\0\0";

const MARKER_PREFIX: u8 = 0xFF;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("data does not start with a start-of-image marker")]
    MissingStartOfImage,

    #[error("data truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("expected a marker at offset {offset}, found byte {byte:#04x}")]
    UnexpectedByte { offset: usize, byte: u8 },

    #[error("invalid segment length {len} at offset {offset}")]
    InvalidLength { offset: usize, len: usize },

    #[error("no EXIF segment present")]
    NoMetadata,

    #[error("expected at least two segments, found {0}")]
    TooFewSegments(usize),

    #[error("segment {marker:#04x} payload of {len} bytes does not fit a length field")]
    SegmentTooLarge { marker: u8, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub marker: u8,
    /// Bytes after the length field for marker segments, the bytes
    /// themselves for [`RAW`] runs, empty for standalone markers.
    pub payload: Vec<u8>,
}

impl Segment {
    pub fn standalone(marker: u8) -> Self {
        Self {
            marker,
            payload: Vec::new(),
        }
    }

    pub fn new(marker: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            marker,
            payload: payload.into(),
        }
    }

    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(RAW, bytes)
    }

    pub fn is_exif(&self) -> bool {
        self.marker == APP1 && self.payload.starts_with(EXIF_SIGNATURE)
    }

    pub fn name(&self) -> &'static str {
        marker_name(self.marker)
    }

    fn write_to(&self, out: &mut Vec<u8>) -> Result<(), SegmentError> {
        if self.marker == RAW {
            out.extend_from_slice(&self.payload);
            return Ok(());
        }

        out.push(MARKER_PREFIX);
        out.push(self.marker);
        if is_standalone(self.marker) {
            return Ok(());
        }

        let len = u16::try_from(self.payload.len() + 2).map_err(|_| SegmentError::SegmentTooLarge {
            marker: self.marker,
            len: self.payload.len(),
        })?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&self.payload);
        Ok(())
    }
}

/// Markers that carry no length field.
fn is_standalone(marker: u8) -> bool {
    matches!(marker, SOI | EOI | TEM | 0xD0..=0xD7)
}

pub fn marker_name(marker: u8) -> &'static str {
    match marker {
        RAW => "raw data",
        TEM => "TEM",
        SOI => "SOI",
        EOI => "EOI",
        SOS => "SOS",
        0xC4 => "DHT",
        0xCC => "DAC",
        0xDB => "DQT",
        0xDD => "DRI",
        0xFE => "COM",
        0xC0..=0xCF => "SOF",
        0xD0..=0xD7 => "RST",
        0xE0..=0xEF => "APP",
        _ => "unknown",
    }
}

/// Ordered segments of one JPEG stream. The first segment is always SOI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentList {
    segments: Vec<Segment>,
}

impl SegmentList {
    pub fn parse(data: &[u8]) -> Result<Self, SegmentError> {
        if data.len() < 2 || data[0] != MARKER_PREFIX || data[1] != SOI {
            return Err(SegmentError::MissingStartOfImage);
        }

        let mut segments = vec![Segment::standalone(SOI)];
        let mut pos = 2;

        while pos < data.len() {
            if data[pos] != MARKER_PREFIX {
                return Err(SegmentError::UnexpectedByte {
                    offset: pos,
                    byte: data[pos],
                });
            }

            // Any number of 0xFF fill bytes may precede a marker.
            let mut marker_pos = pos + 1;
            while marker_pos < data.len() && data[marker_pos] == MARKER_PREFIX {
                marker_pos += 1;
            }
            let marker = *data
                .get(marker_pos)
                .ok_or(SegmentError::Truncated { offset: marker_pos })?;
            pos = marker_pos + 1;

            if marker == EOI {
                segments.push(Segment::standalone(EOI));
                if pos < data.len() {
                    segments.push(Segment::raw(&data[pos..]));
                }
                break;
            }

            if is_standalone(marker) {
                segments.push(Segment::standalone(marker));
                continue;
            }

            if pos + 2 > data.len() {
                return Err(SegmentError::Truncated { offset: pos });
            }
            let len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
            if len < 2 {
                return Err(SegmentError::InvalidLength { offset: pos, len });
            }
            let end = pos + len;
            if end > data.len() {
                return Err(SegmentError::Truncated { offset: data.len() });
            }
            segments.push(Segment::new(marker, &data[pos + 2..end]));
            pos = end;

            if marker == SOS {
                let scan_end = find_scan_end(data, pos);
                if scan_end > pos {
                    segments.push(Segment::raw(&data[pos..scan_end]));
                }
                pos = scan_end;
            }
        }

        Ok(Self { segments })
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn exif(&self) -> Option<&Segment> {
        self.segments.iter().find(|segment| segment.is_exif())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SegmentError> {
        let capacity = self.segments.iter().map(|s| s.payload.len() + 4).sum();
        let mut out = Vec::with_capacity(capacity);
        for segment in &self.segments {
            segment.write_to(&mut out)?;
        }
        Ok(out)
    }
}

/// Returns the offset of the first real marker after entropy-coded data that
/// starts at `start`, skipping byte stuffing (`FF 00`), restart markers and
/// fill bytes. Returns `data.len()` if the scan runs to the end.
fn find_scan_end(data: &[u8], start: usize) -> usize {
    let mut i = start;
    while i + 1 < data.len() {
        if data[i] != MARKER_PREFIX {
            i += 1;
            continue;
        }
        match data[i + 1] {
            0x00 | 0xD0..=0xD7 => i += 2,
            MARKER_PREFIX => i += 1,
            _ => return i,
        }
    }
    data.len()
}

/// Splices the EXIF segment of `original` into `reencoded` right after SOI,
/// dropping any EXIF segment the re-encoded stream already had.
pub fn splice_exif_segment(original: &[u8], reencoded: &[u8]) -> Result<Vec<u8>, SegmentError> {
    let original = SegmentList::parse(original)?;
    let exif = original.exif().ok_or(SegmentError::NoMetadata)?;

    let reencoded = SegmentList::parse(reencoded)?;
    if reencoded.len() < 2 {
        return Err(SegmentError::TooFewSegments(reencoded.len()));
    }

    let mut segments = Vec::with_capacity(reencoded.len() + 1);
    segments.push(reencoded.segments[0].clone());
    segments.push(exif.clone());
    segments.extend(
        reencoded.segments[1..]
            .iter()
            .filter(|segment| !segment.is_exif())
            .cloned(),
    );

    SegmentList::from_segments(segments).to_bytes()
}

type RebuildStrategy = fn(&[u8], &[u8]) -> Result<Vec<u8>, SegmentError>;

/// Tried in order; the first success wins.
const REBUILD_STRATEGIES: &[(&str, RebuildStrategy)] = &[("exif segment splice", splice_exif_segment)];

/// Carries the EXIF block of `original` over to `reencoded`.
///
/// Never fails: without EXIF in the original, or when either stream cannot be
/// parsed, the re-encoded bytes are returned unchanged. The result depends on
/// the two inputs only.
pub fn rebuild_with_metadata(original: &[u8], reencoded: &[u8], logger: &Logger) -> Vec<u8> {
    let mut last_error = None;

    for (name, strategy) in REBUILD_STRATEGIES {
        match strategy(original, reencoded) {
            Ok(bytes) => {
                logger.verbose(format!("EXIF metadata preserved ({})", name));
                return bytes;
            }
            Err(SegmentError::NoMetadata) => {
                logger.verbose("No EXIF segment found in original");
                return reencoded.to_vec();
            }
            Err(e) => last_error = Some((*name, e)),
        }
    }

    if let Some((name, e)) = last_error {
        logger.verbose(format!(
            "Could not preserve EXIF metadata ({}: {}), saving without it",
            name, e
        ));
    }
    reencoded.to_vec()
}
