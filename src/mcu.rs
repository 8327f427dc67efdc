//! Entropy Decoder and MCU Assembler & Color Converter.
//!
//! Decoding happens in two passes over the scan. The first, [`decode_scan`],
//! walks MCUs in order, Huffman-decodes each block's coefficients,
//! dequantizes and inverse-DCTs them, and writes the resulting samples into
//! one full-resolution-for-its-sampling-factor plane per component. The
//! second, [`assemble_and_emit`], walks every output pixel once, maps it to
//! a sample in each component's plane (doing chroma upsampling along the
//! way), color-converts, and hands the result to a [`PixelSink`].
//!
//! Splitting it this way means upsampling can look at any previously
//! decoded block regardless of which MCU produced it, which a single
//! MCU-at-a-time pass cannot do for asymmetric sampling ratios.

use crate::components::Component;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::idct;
use crate::color_convert::ycbcr_to_rgb;
use crate::misc::MAX_TABLES;
use crate::reader::{BitStream, Reader};
use crate::upsampler::chroma_sample_coordinate;

/// Where decoded pixels go. A host embedding this decoder over its own
/// framebuffer implements this directly; [`RasterSink`] is provided for
/// callers that just want a packed RGB buffer back.
pub trait PixelSink {
    fn emit(&mut self, x: u16, y: u16, r: u8, g: u8, b: u8);
}

/// A [`PixelSink`] that collects decoded pixels into a packed,
/// row-major RGB8 buffer.
pub struct RasterSink {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl RasterSink {
    pub fn new(width: u16, height: u16) -> RasterSink {
        RasterSink {
            width,
            height,
            pixels: vec![0u8; usize::from(width) * usize::from(height) * 3],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// The decoded image as packed, row-major `[r, g, b, r, g, b, ...]`.
    pub fn into_rgb8(self) -> Vec<u8> {
        self.pixels
    }
}

impl PixelSink for RasterSink {
    fn emit(&mut self, x: u16, y: u16, r: u8, g: u8, b: u8) {
        let idx = (usize::from(y) * usize::from(self.width) + usize::from(x)) * 3;
        self.pixels[idx] = r;
        self.pixels[idx + 1] = g;
        self.pixels[idx + 2] = b;
    }
}

/// Undo the signed-magnitude encoding JPEG uses for DC diffs and AC
/// coefficients: values in the lower half of the `bits`-bit range are
/// negative, the upper half positive.
fn extend(value: u32, bits: u32) -> i32 {
    if bits == 0 {
        return 0;
    }
    let half = 1u32 << (bits - 1);
    if value < half {
        value as i32 - ((1i32 << bits) - 1)
    } else {
        value as i32
    }
}

/// Decode one 8x8 block's worth of coefficients in zig-zag scan order:
/// one DC diff against the running predictor, then a run-length coded AC
/// tail terminated by an end-of-block or a full run to index 63.
fn decode_block(
    reader: &mut Reader,
    bits: &mut BitStream,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    dc_predictor: &mut i32,
) -> Result<[i32; 64], DecodeErrors> {
    let mut coeffs = [0i32; 64];

    let dc_size = dc_table.decode(bits, reader)?;
    let dc_diff = if dc_size == 0 {
        0
    } else {
        let raw = bits.read_bits(reader, u32::from(dc_size))?;
        extend(raw, u32::from(dc_size))
    };
    *dc_predictor += dc_diff;
    coeffs[0] = *dc_predictor;

    let mut k = 1usize;
    while k < 64 {
        let rs = ac_table.decode(bits, reader)?;
        if rs == 0x00 {
            break; // EOB: remaining coefficients in this block are zero.
        }
        if rs == 0xF0 {
            k += 16; // ZRL: 16 zero coefficients with no value attached.
            continue;
        }

        let run = usize::from(rs >> 4);
        let size = rs & 0x0F;
        k += run;
        if k >= 64 {
            return Err(DecodeErrors::InvalidAcRun);
        }

        let raw = bits.read_bits(reader, u32::from(size))?;
        coeffs[k] = extend(raw, u32::from(size));
        k += 1;
    }

    Ok(coeffs)
}

/// One component's decoded samples, sized to exactly cover every MCU's
/// worth of blocks for that component (which may run a little past the
/// image's true width/height at the right and bottom edges).
pub(crate) struct ComponentPlane {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl ComponentPlane {
    fn new(width: usize, height: usize) -> ComponentPlane {
        ComponentPlane {
            width,
            height,
            samples: vec![0u8; width * height],
        }
    }

    fn set_block(&mut self, block_x: usize, block_y: usize, block: &[u8; 64]) {
        let origin_x = block_x * 8;
        let origin_y = block_y * 8;
        for row in 0..8 {
            let dst = (origin_y + row) * self.width + origin_x;
            self.samples[dst..dst + 8].copy_from_slice(&block[row * 8..row * 8 + 8]);
        }
    }

    fn sample(&self, x: usize, y: usize) -> u8 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.samples[y * self.width + x]
    }
}

/// Decode every MCU of the one scan this decoder supports, returning one
/// fully populated [`ComponentPlane`] per component in frame order.
pub(crate) fn decode_scan(
    reader: &mut Reader,
    components: &mut [Component],
    quant_tables: &[Option<[u16; 64]>; MAX_TABLES],
    dc_tables: &[Option<HuffmanTable>; MAX_TABLES],
    ac_tables: &[Option<HuffmanTable>; MAX_TABLES],
    width: usize,
    height: usize,
) -> Result<Vec<ComponentPlane>, DecodeErrors> {
    let max_h = components.iter().map(|c| c.h_samp).max().unwrap_or(1);
    let max_v = components.iter().map(|c| c.v_samp).max().unwrap_or(1);
    let mcu_width = 8 * max_h;
    let mcu_height = 8 * max_v;
    let mcus_per_row = (width + mcu_width - 1) / mcu_width;
    let mcus_per_col = (height + mcu_height - 1) / mcu_height;

    let mut planes: Vec<ComponentPlane> = components
        .iter()
        .map(|c| ComponentPlane::new(mcus_per_row * 8 * c.h_samp, mcus_per_col * 8 * c.v_samp))
        .collect();

    let mut bits = BitStream::new();

    for mcu_y in 0..mcus_per_col {
        for mcu_x in 0..mcus_per_row {
            for (ci, component) in components.iter_mut().enumerate() {
                let quant = quant_tables[usize::from(component.quant_id)]
                    .ok_or(DecodeErrors::MissingQuantTable(component.quant_id))?;
                let dc_table = dc_tables[usize::from(component.dc_table_id)]
                    .as_ref()
                    .ok_or(DecodeErrors::MissingHuffmanTable(0, component.dc_table_id))?;
                let ac_table = ac_tables[usize::from(component.ac_table_id)]
                    .as_ref()
                    .ok_or(DecodeErrors::MissingHuffmanTable(1, component.ac_table_id))?;

                for by in 0..component.v_samp {
                    for bx in 0..component.h_samp {
                        let coeffs = decode_block(
                            reader,
                            &mut bits,
                            dc_table,
                            ac_table,
                            &mut component.dc_predictor,
                        )?;
                        let natural = idct::dequantize(&coeffs, &quant);
                        let block = idct::idct(&natural);
                        let block_x = mcu_x * component.h_samp + bx;
                        let block_y = mcu_y * component.v_samp + by;
                        planes[ci].set_block(block_x, block_y, &block);
                    }
                }
            }
        }
    }

    if !bits.hit_marker {
        log::debug!("scan entropy data ended without leaving a trailing marker in view");
    }

    Ok(planes)
}

/// Walk every output pixel once, upsample each component's plane to that
/// coordinate, color-convert, and emit.
pub(crate) fn assemble_and_emit<S: PixelSink>(
    planes: &[ComponentPlane],
    components: &[Component],
    width: u16,
    height: u16,
    sink: &mut S,
) {
    let max_h = components.iter().map(|c| c.h_samp).max().unwrap_or(1);
    let max_v = components.iter().map(|c| c.v_samp).max().unwrap_or(1);

    for y in 0..height {
        for x in 0..width {
            let (xu, yu) = (usize::from(x), usize::from(y));

            if components.len() == 1 {
                let sample = planes[0].sample(
                    chroma_sample_coordinate(xu, components[0].h_samp, max_h),
                    chroma_sample_coordinate(yu, components[0].v_samp, max_v),
                );
                sink.emit(x, y, sample, sample, sample);
            } else {
                let y_sample = planes[0].sample(
                    chroma_sample_coordinate(xu, components[0].h_samp, max_h),
                    chroma_sample_coordinate(yu, components[0].v_samp, max_v),
                );
                let cb_sample = planes[1].sample(
                    chroma_sample_coordinate(xu, components[1].h_samp, max_h),
                    chroma_sample_coordinate(yu, components[1].v_samp, max_v),
                );
                let cr_sample = planes[2].sample(
                    chroma_sample_coordinate(xu, components[2].h_samp, max_h),
                    chroma_sample_coordinate(yu, components[2].v_samp, max_v),
                );
                let (r, g, b) = ycbcr_to_rgb(y_sample, cb_sample, cr_sample);
                sink.emit(x, y, r, g, b);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_decodes_the_signed_magnitude_ranges() {
        // 3-bit category: codes 0..3 are negative (-7..-4), 4..7 positive (4..7).
        assert_eq!(extend(0, 3), -7);
        assert_eq!(extend(3, 3), -4);
        assert_eq!(extend(4, 3), 4);
        assert_eq!(extend(7, 3), 7);
        assert_eq!(extend(0, 0), 0);
    }

    #[test]
    fn component_plane_roundtrips_a_block() {
        let mut plane = ComponentPlane::new(16, 16);
        let mut block = [0u8; 64];
        for (i, sample) in block.iter_mut().enumerate() {
            *sample = i as u8;
        }
        plane.set_block(1, 0, &block);
        assert_eq!(plane.sample(8, 0), 0);
        assert_eq!(plane.sample(15, 7), 63);
    }

    #[test]
    fn single_component_assembly_produces_gray_rgb() {
        let component = Component::parse([1, 0x11, 0]).unwrap();
        let mut plane = ComponentPlane::new(8, 8);
        plane.set_block(0, 0, &[200u8; 64]);

        let mut sink = RasterSink::new(8, 8);
        assemble_and_emit(&[plane], &[component], 8, 8, &mut sink);
        let rgb = sink.into_rgb8();
        assert_eq!(&rgb[0..3], &[200, 200, 200]);
    }
}
