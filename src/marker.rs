//! JPEG marker codes.
//!
//! A marker is always the second byte of a `0xFF xx` pair; the first byte
//! is dropped once it has been recognised by the caller.

/// A recognised marker code, split out by the fields it carries.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Marker {
    /// Start of image, `0xD8`.
    SOI,
    /// End of image, `0xD9`.
    EOI,
    /// Start of frame, carrying the SOF number (0 = baseline DCT).
    SOF(u8),
    /// Define Huffman table(s), `0xC4`.
    DHT,
    /// Define quantization table(s), `0xDB`.
    DQT,
    /// Define restart interval, `0xDD`.
    DRI,
    /// Start of scan, `0xDA`.
    SOS,
    /// Restart marker `RSTn`, `0xD0..=0xD7`, carrying `n`.
    RST(u8),
    /// Application segment `APPn`, `0xE0..=0xEF`, carrying `n`.
    APP(u8),
    /// Comment segment, `0xFE`.
    COM,
    /// Any other marker byte this decoder does not special-case but which
    /// still carries a length-prefixed payload that can be skipped.
    Other(u8),
}

impl Marker {
    /// Map the second byte of a `0xFF xx` pair to a [`Marker`].
    ///
    /// Returns `None` for `0x00` (a byte-stuffed literal `0xFF`, never a
    /// marker on its own) and `0xFF` (a fill byte preceding the real
    /// marker).
    pub(crate) fn from_u8(byte: u8) -> Option<Marker> {
        match byte {
            0x00 | 0xFF => None,
            0xD8 => Some(Marker::SOI),
            0xD9 => Some(Marker::EOI),
            0xC0 => Some(Marker::SOF(0)),
            0xC1..=0xCF if byte != 0xC4 && byte != 0xC8 && byte != 0xCC => {
                Some(Marker::SOF(byte - 0xC0))
            }
            0xC4 => Some(Marker::DHT),
            0xDB => Some(Marker::DQT),
            0xDD => Some(Marker::DRI),
            0xDA => Some(Marker::SOS),
            0xD0..=0xD7 => Some(Marker::RST(byte - 0xD0)),
            0xE0..=0xEF => Some(Marker::APP(byte - 0xE0)),
            0xFE => Some(Marker::COM),
            other => Some(Marker::Other(other)),
        }
    }

    /// Whether this marker carries a `u16` big-endian length field followed
    /// by that many minus two payload bytes, the way every segment marker
    /// except `SOI`/`EOI`/`RSTn` does.
    pub(crate) fn has_length(self) -> bool {
        !matches!(self, Marker::SOI | Marker::EOI | Marker::RST(_))
    }
}
