//! Decode errors surfaced to callers of [`crate::Decoder`].
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Errors that can occur while decoding a baseline JPEG.
///
/// All variants are fatal: the decoder does not attempt to recover from a
/// malformed segment or an out of range Huffman code, it simply stops and
/// returns the error. The pixel sink may have already received a partial
/// image by the time an error surfaces.
pub enum DecodeErrors {
    /// The cursor ran past the end of the input buffer while reading a
    /// fixed-size field or the requested number of entropy-coded bits.
    UnexpectedEof,
    /// A byte that should have been a marker did not start with `0xFF`, or
    /// named a marker this decoder does not dispatch on.
    BadMarker(u8, u8),
    /// The bitstream uses a JPEG feature this decoder does not implement
    /// (progressive/arithmetic/lossless coding, >8 bit precision, restart
    /// intervals, or a component count outside `{1, 3}`).
    UnsupportedFeature(String),
    /// First marker in the stream was not `SOI`.
    MissingSoi,
    /// A scan (`SOS`) was encountered before any `SOF0`.
    MissingSof,
    /// The buffer ended before an `SOS` segment was seen.
    MissingSos,
    /// The entropy-coded scan ran out of input before an `EOI` marker.
    MissingEoi,
    /// A component's frame header referenced a quantization table id that
    /// was never defined by a `DQT` segment.
    MissingQuantTable(u8),
    /// A component's scan header referenced a DC or AC Huffman table id
    /// that was never defined by a `DHT` segment.
    MissingHuffmanTable(u8, u8),
    /// A `DHT` segment's code length counts described more than 256
    /// symbols, or produced a tree with an over/under-subscribed code.
    InvalidHuffmanTable(String),
    /// A Huffman walk reached a node with no child for the bit read, or ran
    /// out of bits before reaching a leaf.
    InvalidHuffmanCode,
    /// An AC run (`ZRL`/`RRRR`) pushed the zig-zag index to 64 or beyond.
    InvalidAcRun,
    /// `DQT`, `DHT`, `SOF0` or `SOS` carried a malformed or inconsistent
    /// length/field.
    MalformedSegment(String),
    /// Width or height in `SOF0` was zero.
    InvalidDimensions,
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input while decoding"),
            Self::BadMarker(a, b) => {
                write!(f, "expected a marker, found bytes 0x{:02x}{:02x}", a, b)
            }
            Self::UnsupportedFeature(reason) => write!(f, "unsupported JPEG feature: {}", reason),
            Self::MissingSoi => write!(f, "image does not start with an SOI marker"),
            Self::MissingSof => write!(f, "start of scan encountered before a start of frame"),
            Self::MissingSos => write!(f, "input ended before a start of scan marker"),
            Self::MissingEoi => write!(f, "entropy coded data ended before an EOI marker"),
            Self::MissingQuantTable(id) => {
                write!(f, "component references undefined quantization table {}", id)
            }
            Self::MissingHuffmanTable(class, id) => write!(
                f,
                "component references undefined {} Huffman table {}",
                if *class == 0 { "DC" } else { "AC" },
                id
            ),
            Self::InvalidHuffmanTable(reason) => write!(f, "invalid Huffman table: {}", reason),
            Self::InvalidHuffmanCode => write!(f, "Huffman walk reached an empty node"),
            Self::InvalidAcRun => write!(f, "AC coefficient run pushed past index 63"),
            Self::MalformedSegment(reason) => write!(f, "malformed segment: {}", reason),
            Self::InvalidDimensions => write!(f, "image width or height is zero"),
        }
    }
}

impl Error for DecodeErrors {}
