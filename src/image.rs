//! Frame/Scan State and the public `Decoder` entry point.
//!
//! A [`Decoder`] owns the byte cursor and the Quantization/Huffman Table
//! Stores for the lifetime of one decode. Headers are parsed in order
//! until a `SOS` is reached, at which point the frame is known well
//! enough to decode its one scan and hand pixels to a [`PixelSink`].

use crate::errors::DecodeErrors;
use crate::headers::{
    parse_app0, parse_dht, parse_dqt, parse_frame_header, parse_scan_header, skip_segment,
    FrameInfo, JfifDensity,
};
use crate::huffman::HuffmanTable;
use crate::marker::Marker;
use crate::mcu::{assemble_and_emit, decode_scan, PixelSink, RasterSink};
use crate::misc::MAX_TABLES;
use crate::reader::Reader;

/// Header fields a caller can inspect without decoding pixels, returned
/// from [`Decoder::decode_into`]/[`Decoder::decode_buffer`] and from
/// [`Decoder::info`] once headers have been parsed.
#[derive(Copy, Clone, Debug)]
pub struct ImageInfo {
    pub width: u16,
    pub height: u16,
    pub component_count: u8,
    /// `(x, y)` pixel density from a JFIF `APP0` segment, if one was
    /// present.
    pub jfif_density: Option<(u16, u16)>,
}

/// A single-use baseline JPEG decoder over one input buffer.
pub struct Decoder<'a> {
    reader: Reader<'a>,
    quant_tables: [Option<[u16; 64]>; MAX_TABLES],
    dc_tables: [Option<HuffmanTable>; MAX_TABLES],
    ac_tables: [Option<HuffmanTable>; MAX_TABLES],
    frame: Option<FrameInfo>,
    jfif_density: Option<JfifDensity>,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Decoder<'a> {
        Decoder {
            reader: Reader::new(buf),
            quant_tables: [None, None, None, None],
            dc_tables: [None, None, None, None],
            ac_tables: [None, None, None, None],
            frame: None,
            jfif_density: None,
        }
    }

    /// Header fields parsed so far. `None` until a `SOF0` has been seen,
    /// which happens somewhere inside [`Decoder::decode_into`] or
    /// [`Decoder::decode_buffer`].
    pub fn info(&self) -> Option<ImageInfo> {
        let frame = self.frame.as_ref()?;
        Some(ImageInfo {
            width: frame.width,
            height: frame.height,
            component_count: frame.components.len() as u8,
            jfif_density: self.jfif_density.map(|d| (d.x_density, d.y_density)),
        })
    }

    /// Decode into a caller-supplied [`PixelSink`], for hosts that want
    /// pixels written straight into their own framebuffer rather than
    /// collected into an intermediate buffer.
    pub fn decode_into<S: PixelSink>(&mut self, sink: &mut S) -> Result<ImageInfo, DecodeErrors> {
        self.decode_headers()?;
        self.decode_scan_into(sink)?;
        Ok(self.info().expect("decode_headers guarantees a frame"))
    }

    /// Decode into a fresh [`RasterSink`], for callers that just want a
    /// packed RGB8 buffer back.
    pub fn decode_buffer(&mut self) -> Result<RasterSink, DecodeErrors> {
        self.decode_headers()?;
        let (width, height) = {
            let frame = self.frame.as_ref().expect("decode_headers guarantees a frame");
            (frame.width, frame.height)
        };
        let mut sink = RasterSink::new(width, height);
        self.decode_scan_into(&mut sink)?;
        Ok(sink)
    }

    /// Read markers up to and including `SOS`, updating the table stores
    /// and frame state as each segment is seen. Returns with `self.frame`
    /// populated and its components' table ids assigned from the scan
    /// header.
    fn decode_headers(&mut self) -> Result<(), DecodeErrors> {
        if self.next_marker()? != Marker::SOI {
            return Err(DecodeErrors::MissingSoi);
        }

        loop {
            let marker = self.next_marker()?;
            match marker {
                Marker::DQT => parse_dqt(&mut self.reader, &mut self.quant_tables)?,
                Marker::DHT => parse_dht(&mut self.reader, &mut self.dc_tables, &mut self.ac_tables)?,
                Marker::SOF(n) => {
                    let frame = parse_frame_header(&mut self.reader, n)?;
                    log::debug!(
                        "parsed frame header: {}x{}, {} component(s)",
                        frame.width,
                        frame.height,
                        frame.components.len()
                    );
                    self.frame = Some(frame);
                }
                Marker::APP(0) => {
                    self.jfif_density = parse_app0(&mut self.reader)?;
                }
                Marker::SOS => {
                    let frame = self.frame.as_mut().ok_or(DecodeErrors::MissingSof)?;
                    parse_scan_header(&mut self.reader, &mut frame.components)?;
                    return Ok(());
                }
                Marker::EOI => return Err(DecodeErrors::MissingSos),
                Marker::RST(_) => {
                    return Err(DecodeErrors::UnsupportedFeature(
                        "restart marker encountered before a scan".into(),
                    ));
                }
                Marker::APP(_) | Marker::COM | Marker::DRI | Marker::Other(_) => {
                    debug_assert!(marker.has_length());
                    skip_segment(&mut self.reader)?;
                }
            }
        }
    }

    /// Decode the one scan `decode_headers` just stopped at, assemble and
    /// color-convert it into `sink`, then consume the trailing `EOI`.
    fn decode_scan_into<S: PixelSink>(&mut self, sink: &mut S) -> Result<(), DecodeErrors> {
        let (width, height) = {
            let frame = self.frame.as_ref().expect("decode_headers guarantees a frame");
            (frame.width, frame.height)
        };

        let planes = {
            let frame = self.frame.as_mut().expect("decode_headers guarantees a frame");
            decode_scan(
                &mut self.reader,
                &mut frame.components,
                &self.quant_tables,
                &self.dc_tables,
                &self.ac_tables,
                usize::from(width),
                usize::from(height),
            )?
        };

        {
            let frame = self.frame.as_ref().expect("decode_headers guarantees a frame");
            assemble_and_emit(&planes, &frame.components, width, height, sink);
        }

        loop {
            match self.next_marker()? {
                Marker::EOI => return Ok(()),
                // A trailing restart marker right before EOI is harmless;
                // this decoder never emits them during a scan (no DRI
                // support) but tolerates one appearing anyway.
                Marker::RST(_) => continue,
                _ => return Err(DecodeErrors::MissingEoi),
            }
        }
    }

    /// Read one marker code, skipping any run of fill bytes (`0xFF`
    /// repeated) before it the way `FF FF ... FF xx` padding requires.
    fn next_marker(&mut self) -> Result<Marker, DecodeErrors> {
        let first = self.reader.read_u8()?;
        if first != 0xFF {
            return Err(DecodeErrors::BadMarker(first, 0));
        }

        let mut second = self.reader.read_u8()?;
        while second == 0xFF {
            second = self.reader.read_u8()?;
        }

        Marker::from_u8(second).ok_or(DecodeErrors::BadMarker(0xFF, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build the smallest possible baseline JPEG: one grayscale 8x8 block,
    /// a single MCU, DC diff and AC run both coded as one-bit symbols.
    fn single_block_gray_jpeg() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xFF, 0xD8]); // SOI

        // DQT: one 8-bit table, id 0, every step size 1.
        data.extend_from_slice(&[0xFF, 0xDB]);
        data.extend_from_slice(&67u16.to_be_bytes());
        data.push(0x00);
        data.extend(std::iter::repeat(1u8).take(64));

        // DHT: DC table 0, one symbol (category 0).
        data.extend_from_slice(&[0xFF, 0xC4]);
        data.extend_from_slice(&20u16.to_be_bytes());
        data.push(0x00);
        let mut counts = [0u8; 16];
        counts[0] = 1;
        data.extend_from_slice(&counts);
        data.push(0x00);

        // DHT: AC table 0, one symbol (EOB).
        data.extend_from_slice(&[0xFF, 0xC4]);
        data.extend_from_slice(&20u16.to_be_bytes());
        data.push(0x10);
        data.extend_from_slice(&counts);
        data.push(0x00);

        // SOF0: 8x8, one component.
        data.extend_from_slice(&[0xFF, 0xC0]);
        data.extend_from_slice(&11u16.to_be_bytes());
        data.push(8); // precision
        data.extend_from_slice(&8u16.to_be_bytes()); // height
        data.extend_from_slice(&8u16.to_be_bytes()); // width
        data.push(1); // component count
        data.extend_from_slice(&[1, 0x11, 0]); // id=1, h=v=1, qt=0

        // SOS: one component.
        data.extend_from_slice(&[0xFF, 0xDA]);
        data.extend_from_slice(&8u16.to_be_bytes());
        data.push(1);
        data.extend_from_slice(&[1, 0x00]);
        data.extend_from_slice(&[0x00, 0x3F, 0x00]);

        // Entropy data: DC code "0" (category 0, diff 0), AC code "0" (EOB).
        data.push(0x00);

        data.extend_from_slice(&[0xFF, 0xD9]); // EOI
        data
    }

    #[test]
    fn decodes_a_single_block_grayscale_image_to_flat_gray() {
        let data = single_block_gray_jpeg();
        let mut decoder = Decoder::new(&data);
        let sink = decoder.decode_buffer().unwrap();

        assert_eq!(sink.width(), 8);
        assert_eq!(sink.height(), 8);
        let rgb = sink.into_rgb8();
        assert_eq!(rgb.len(), 8 * 8 * 3);
        assert!(rgb.chunks(3).all(|px| px == [128, 128, 128]));
    }

    #[test]
    fn info_reflects_the_parsed_frame_header() {
        let data = single_block_gray_jpeg();
        let mut decoder = Decoder::new(&data);
        let info = decoder.decode_buffer().map(|_| decoder.info().unwrap());
        let info = info.unwrap();
        assert_eq!(info.width, 8);
        assert_eq!(info.height, 8);
        assert_eq!(info.component_count, 1);
    }

    #[test]
    fn missing_soi_is_rejected() {
        let data = [0x00, 0x01, 0x02];
        let mut decoder = Decoder::new(&data);
        assert!(decoder.decode_buffer().is_err());
    }

    #[test]
    fn scan_before_frame_header_is_rejected() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xFF, 0xD8]); // SOI
        data.extend_from_slice(&[0xFF, 0xDA]); // SOS with no SOF0 first
        data.extend_from_slice(&4u16.to_be_bytes());
        data.extend_from_slice(&[0x00, 0x00]);
        let mut decoder = Decoder::new(&data);
        assert!(matches!(decoder.decode_buffer(), Err(DecodeErrors::MissingSof)));
    }
}
