//! Marker Parser: turns the length-prefixed segments that follow each
//! marker into the Quantization/Huffman Table Store updates and the frame
//! and scan state the rest of the decoder needs.
//!
//! Every function here consumes exactly the bytes its segment's length
//! field says it owns, starting from the two-byte length itself; the
//! caller has already read and dispatched on the marker code.

use crate::components::{Component, ComponentId};
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::misc::MAX_TABLES;
use crate::reader::Reader;

/// The frame header (`SOF0`) fields a decode run needs once, up front.
pub(crate) struct FrameInfo {
    pub precision: u8,
    pub width: u16,
    pub height: u16,
    pub components: Vec<Component>,
}

/// JFIF pixel density, read out of an `APP0` segment if present. Purely
/// informational: nothing downstream of header parsing consults it.
#[derive(Copy, Clone, Debug)]
pub(crate) struct JfifDensity {
    pub x_density: u16,
    pub y_density: u16,
}

/// Read a `DQT` segment, storing each table it carries (there may be more
/// than one back to back) at its declared id.
pub(crate) fn parse_dqt(
    reader: &mut Reader,
    tables: &mut [Option<[u16; 64]>; MAX_TABLES],
) -> Result<(), DecodeErrors> {
    let length = reader.read_u16_be()? as usize;
    let mut remaining = length
        .checked_sub(2)
        .ok_or_else(|| DecodeErrors::MalformedSegment("DQT length shorter than its own field".into()))?;

    while remaining > 0 {
        let pq_tq = reader.read_u8()?;
        remaining -= 1;
        let precision = pq_tq >> 4;
        let id = pq_tq & 0x0F;
        if usize::from(id) >= MAX_TABLES {
            return Err(DecodeErrors::MalformedSegment(format!(
                "DQT table id {} out of range 0..{}",
                id, MAX_TABLES
            )));
        }

        let mut table = [0u16; 64];
        match precision {
            0 => {
                if remaining < 64 {
                    return Err(DecodeErrors::MalformedSegment(
                        "DQT segment too short for an 8-bit table".into(),
                    ));
                }
                for slot in table.iter_mut() {
                    *slot = u16::from(reader.read_u8()?);
                }
                remaining -= 64;
            }
            1 => {
                return Err(DecodeErrors::UnsupportedFeature(
                    "16-bit quantization table precision".into(),
                ));
            }
            other => {
                return Err(DecodeErrors::MalformedSegment(format!(
                    "quantization table precision {} is not 0 or 1",
                    other
                )));
            }
        }

        tables[usize::from(id)] = Some(table);
    }

    Ok(())
}

/// Read a `DHT` segment, building and storing each Huffman table it
/// carries at its declared class and id.
pub(crate) fn parse_dht(
    reader: &mut Reader,
    dc_tables: &mut [Option<HuffmanTable>; MAX_TABLES],
    ac_tables: &mut [Option<HuffmanTable>; MAX_TABLES],
) -> Result<(), DecodeErrors> {
    let length = reader.read_u16_be()? as usize;
    let mut remaining = length
        .checked_sub(2)
        .ok_or_else(|| DecodeErrors::MalformedSegment("DHT length shorter than its own field".into()))?;

    while remaining > 0 {
        let tc_th = reader.read_u8()?;
        remaining = remaining
            .checked_sub(1)
            .ok_or_else(|| DecodeErrors::MalformedSegment("DHT segment truncated".into()))?;

        let class = tc_th >> 4;
        let id = tc_th & 0x0F;
        if usize::from(id) >= MAX_TABLES {
            return Err(DecodeErrors::MalformedSegment(format!(
                "DHT table id {} out of range 0..{}",
                id, MAX_TABLES
            )));
        }

        if remaining < 16 {
            return Err(DecodeErrors::MalformedSegment(
                "DHT segment too short for its 16 code length counts".into(),
            ));
        }
        let mut counts = [0u8; 16];
        counts.copy_from_slice(reader.read_bytes(16)?);
        remaining -= 16;

        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if remaining < total {
            return Err(DecodeErrors::MalformedSegment(
                "DHT segment too short for the symbols its counts describe".into(),
            ));
        }
        let symbols = reader.read_bytes(total)?.to_vec();
        remaining -= total;

        let table = HuffmanTable::build(&counts, &symbols)?;
        match class {
            0 => dc_tables[usize::from(id)] = Some(table),
            1 => ac_tables[usize::from(id)] = Some(table),
            other => {
                return Err(DecodeErrors::MalformedSegment(format!(
                    "Huffman table class {} is not 0 (DC) or 1 (AC)",
                    other
                )));
            }
        }
    }

    Ok(())
}

/// Read a `SOFn` segment. `sof_number` is the `n` the caller already
/// pulled out of the marker code; anything but plain baseline (`0`) is
/// rejected here rather than partially parsed.
pub(crate) fn parse_frame_header(reader: &mut Reader, sof_number: u8) -> Result<FrameInfo, DecodeErrors> {
    if sof_number != 0 {
        return Err(DecodeErrors::UnsupportedFeature(format!(
            "SOF{} (only baseline SOF0 is supported)",
            sof_number
        )));
    }

    let length = reader.read_u16_be()?;
    let precision = reader.read_u8()?;
    if precision != 8 {
        return Err(DecodeErrors::UnsupportedFeature(format!(
            "{}-bit sample precision",
            precision
        )));
    }

    let height = reader.read_u16_be()?;
    let width = reader.read_u16_be()?;
    if height == 0 || width == 0 {
        return Err(DecodeErrors::InvalidDimensions);
    }

    let component_count = reader.read_u8()?;
    if component_count != 1 && component_count != 3 {
        return Err(DecodeErrors::UnsupportedFeature(format!(
            "{} frame components (only 1 or 3 are supported)",
            component_count
        )));
    }

    let expected_length = 8u16 + 3u16 * u16::from(component_count);
    if length != expected_length {
        return Err(DecodeErrors::MalformedSegment(format!(
            "SOF length {} does not match {} components",
            length, component_count
        )));
    }

    let mut components = Vec::with_capacity(component_count as usize);
    for _ in 0..component_count {
        let bytes = reader.read_bytes(3)?;
        components.push(Component::parse([bytes[0], bytes[1], bytes[2]])?);
    }

    Ok(FrameInfo {
        precision,
        width,
        height,
        components,
    })
}

/// Read a `SOS` segment, assigning each listed component's DC/AC table ids
/// and resetting its DC predictor. Baseline sequential decoding requires
/// every frame component to appear in the one scan this decoder supports,
/// and the spectral selection/successive approximation fields to be the
/// fixed baseline values.
pub(crate) fn parse_scan_header(
    reader: &mut Reader,
    components: &mut [Component],
) -> Result<(), DecodeErrors> {
    let _length = reader.read_u16_be()?;
    let count = reader.read_u8()?;
    if usize::from(count) != components.len() {
        return Err(DecodeErrors::MalformedSegment(format!(
            "SOS lists {} components but the frame has {}",
            count,
            components.len()
        )));
    }

    for _ in 0..count {
        let id = reader.read_u8()?;
        let td_ta = reader.read_u8()?;
        let dc_table_id = td_ta >> 4;
        let ac_table_id = td_ta & 0x0F;

        let component_id = ComponentId::from(id);
        let component = components
            .iter_mut()
            .find(|c| c.id == component_id)
            .ok_or_else(|| {
                DecodeErrors::MalformedSegment(format!(
                    "SOS references component id {} which the frame header never declared",
                    id
                ))
            })?;
        component.dc_table_id = dc_table_id;
        component.ac_table_id = ac_table_id;
        component.dc_predictor = 0;
    }

    let spectral_start = reader.read_u8()?;
    let spectral_end = reader.read_u8()?;
    let approximation = reader.read_u8()?;
    if spectral_start != 0 || spectral_end != 63 || approximation != 0 {
        return Err(DecodeErrors::UnsupportedFeature(
            "non-baseline spectral selection or successive approximation".into(),
        ));
    }

    Ok(())
}

/// Read an `APP0` segment, extracting the JFIF density fields if the
/// identifier matches; any other `APPn` payload (Exif, Adobe, ...) is of
/// no interest to this decoder and comes back as `None`.
pub(crate) fn parse_app0(reader: &mut Reader) -> Result<Option<JfifDensity>, DecodeErrors> {
    let length = reader.read_u16_be()? as usize;
    let payload_len = length
        .checked_sub(2)
        .ok_or_else(|| DecodeErrors::MalformedSegment("APP0 length shorter than its own field".into()))?;
    let payload = reader.read_bytes(payload_len)?;

    if payload.len() >= 12 && &payload[0..5] == b"JFIF\0" {
        let x_density = u16::from_be_bytes([payload[8], payload[9]]);
        let y_density = u16::from_be_bytes([payload[10], payload[11]]);
        Ok(Some(JfifDensity { x_density, y_density }))
    } else {
        Ok(None)
    }
}

/// Skip a segment this decoder has no use for (`APPn` other than `APP0`,
/// `COM`, `DRI`) without interpreting its payload.
pub(crate) fn skip_segment(reader: &mut Reader) -> Result<(), DecodeErrors> {
    let length = reader.read_u16_be()? as usize;
    let payload_len = length
        .checked_sub(2)
        .ok_or_else(|| DecodeErrors::MalformedSegment("segment length shorter than its own field".into()))?;
    reader.skip_bytes(payload_len)
}
