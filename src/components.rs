//! Per-component state extracted from the frame and scan headers.

use crate::errors::DecodeErrors;
use crate::misc::MAX_TABLES;

/// Which channel a component represents. Only used for clearer log output
/// and error messages; decoding dispatches on array position, not on this.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ComponentId {
    Y,
    Cb,
    Cr,
    Unknown(u8),
}

impl From<u8> for ComponentId {
    fn from(id: u8) -> Self {
        match id {
            1 => ComponentId::Y,
            2 => ComponentId::Cb,
            3 => ComponentId::Cr,
            other => ComponentId::Unknown(other),
        }
    }
}

/// Everything the decoder needs to know about one color component for the
/// duration of a scan: its sampling geometry, which tables it uses, and its
/// running DC predictor.
#[derive(Clone)]
pub(crate) struct Component {
    pub id: ComponentId,
    /// Horizontal sampling factor, 1..=4.
    pub h_samp: usize,
    /// Vertical sampling factor, 1..=4.
    pub v_samp: usize,
    /// Which quantization table (0..4) this component dequantizes with.
    pub quant_id: u8,
    /// Which DC Huffman table (0..4) this component decodes with. Filled
    /// in at SOS time.
    pub dc_table_id: u8,
    /// Which AC Huffman table (0..4) this component decodes with. Filled
    /// in at SOS time.
    pub ac_table_id: u8,
    /// Running DC predictor, reset to zero at the start of every scan.
    pub dc_predictor: i32,
}

impl Component {
    /// Build a `Component` from the three bytes of a single SOF0 component
    /// record: `(id, (h<<4)|v, quant_id)`.
    pub(crate) fn parse(bytes: [u8; 3]) -> Result<Component, DecodeErrors> {
        let id = ComponentId::from(bytes[0]);
        let h_samp = (bytes[1] >> 4) as usize;
        let v_samp = (bytes[1] & 0x0F) as usize;
        let quant_id = bytes[2];

        if h_samp == 0 || h_samp > 4 || v_samp == 0 || v_samp > 4 {
            return Err(DecodeErrors::MalformedSegment(format!(
                "component {:?} has sampling factors out of range 1..=4: {}x{}",
                id, h_samp, v_samp
            )));
        }
        if usize::from(quant_id) >= MAX_TABLES {
            return Err(DecodeErrors::MalformedSegment(format!(
                "component {:?} references out of range quantization table {}",
                id, quant_id
            )));
        }

        Ok(Component {
            id,
            h_samp,
            v_samp,
            quant_id,
            dc_table_id: 0,
            ac_table_id: 0,
            dc_predictor: 0,
        })
    }
}
