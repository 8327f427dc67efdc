//! End-to-end decode scenarios exercised only through the public API:
//! hand-built minimal JPEGs covering the sampling geometries and boundary
//! behaviors a baseline decoder has to get right.

use numjpeg::Decoder;

struct TestComponent {
    id: u8,
    h_samp: u8,
    v_samp: u8,
    quant_id: u8,
}

/// Build a baseline JPEG whose every block decodes to DC diff 0 and an
/// immediate EOB (one Huffman bit each), so every pixel comes out flat
/// mid-gray (or, for a single luma-only component, flat gray-as-RGB).
/// This exercises marker parsing, MCU geometry, and chroma upsampling
/// without needing to hand-encode non-trivial coefficients.
fn build_flat_jpeg(width: u16, height: u16, components: &[TestComponent]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&[0xFF, 0xD8]); // SOI

    // DQT: one shared 8-bit table, id 0.
    data.extend_from_slice(&[0xFF, 0xDB]);
    data.extend_from_slice(&67u16.to_be_bytes());
    data.push(0x00);
    data.extend(std::iter::repeat(1u8).take(64));

    let mut counts = [0u8; 16];
    counts[0] = 1;

    // DHT: DC table 0 (category 0) and AC table 0 (EOB), shared by every
    // component.
    data.extend_from_slice(&[0xFF, 0xC4]);
    data.extend_from_slice(&20u16.to_be_bytes());
    data.push(0x00);
    data.extend_from_slice(&counts);
    data.push(0x00);

    data.extend_from_slice(&[0xFF, 0xC4]);
    data.extend_from_slice(&20u16.to_be_bytes());
    data.push(0x10);
    data.extend_from_slice(&counts);
    data.push(0x00);

    // SOF0
    data.extend_from_slice(&[0xFF, 0xC0]);
    let sof_len = 8u16 + 3 * components.len() as u16;
    data.extend_from_slice(&sof_len.to_be_bytes());
    data.push(8); // precision
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.push(components.len() as u8);
    for c in components {
        data.push(c.id);
        data.push((c.h_samp << 4) | c.v_samp);
        data.push(c.quant_id);
    }

    // SOS
    data.extend_from_slice(&[0xFF, 0xDA]);
    let sos_len = 6u16 + 2 * components.len() as u16;
    data.extend_from_slice(&sos_len.to_be_bytes());
    data.push(components.len() as u8);
    for c in components {
        data.push(c.id);
        data.push(0x00); // DC table 0, AC table 0
    }
    data.extend_from_slice(&[0x00, 0x3F, 0x00]);

    // Entropy data: two zero bits per block (DC category 0, AC EOB).
    let max_h = components.iter().map(|c| c.h_samp as usize).max().unwrap();
    let max_v = components.iter().map(|c| c.v_samp as usize).max().unwrap();
    let mcu_width = 8 * max_h;
    let mcu_height = 8 * max_v;
    let mcus_per_row = (usize::from(width) + mcu_width - 1) / mcu_width;
    let mcus_per_col = (usize::from(height) + mcu_height - 1) / mcu_height;
    let mcu_count = mcus_per_row * mcus_per_col;
    let blocks_per_mcu: usize = components
        .iter()
        .map(|c| usize::from(c.h_samp) * usize::from(c.v_samp))
        .sum();
    let total_bits = mcu_count * blocks_per_mcu * 2;
    let total_bytes = (total_bits + 7) / 8;
    data.extend(std::iter::repeat(0u8).take(total_bytes.max(1)));

    data.extend_from_slice(&[0xFF, 0xD9]); // EOI
    data
}

#[test]
fn single_block_solid_gray() {
    let data = build_flat_jpeg(
        8,
        8,
        &[TestComponent {
            id: 1,
            h_samp: 1,
            v_samp: 1,
            quant_id: 0,
        }],
    );
    let mut decoder = Decoder::new(&data);
    let sink = decoder.decode_buffer().unwrap();
    assert_eq!((sink.width(), sink.height()), (8, 8));
    let rgb = sink.into_rgb8();
    assert!(rgb.chunks(3).all(|px| px == [128, 128, 128]));
}

#[test]
fn minimum_four_four_four_color() {
    let components = [
        TestComponent { id: 1, h_samp: 1, v_samp: 1, quant_id: 0 },
        TestComponent { id: 2, h_samp: 1, v_samp: 1, quant_id: 0 },
        TestComponent { id: 3, h_samp: 1, v_samp: 1, quant_id: 0 },
    ];
    let data = build_flat_jpeg(8, 8, &components);
    let mut decoder = Decoder::new(&data);
    let sink = decoder.decode_buffer().unwrap();
    let rgb = sink.into_rgb8();
    // Y = Cb = Cr = 128 (flat DC=0 everywhere) converts to gray (128,128,128).
    assert!(rgb.chunks(3).all(|px| px == [128, 128, 128]));
}

#[test]
fn four_two_zero_subsampling_decodes_the_full_mcu() {
    let components = [
        TestComponent { id: 1, h_samp: 2, v_samp: 2, quant_id: 0 },
        TestComponent { id: 2, h_samp: 1, v_samp: 1, quant_id: 0 },
        TestComponent { id: 3, h_samp: 1, v_samp: 1, quant_id: 0 },
    ];
    let data = build_flat_jpeg(16, 16, &components);
    let mut decoder = Decoder::new(&data);
    let info = decoder.decode_into(&mut numjpeg::RasterSink::new(16, 16)).unwrap();
    assert_eq!((info.width, info.height), (16, 16));
    assert_eq!(info.component_count, 3);

    let mut decoder = Decoder::new(&data);
    let sink = decoder.decode_buffer().unwrap();
    let rgb = sink.into_rgb8();
    assert_eq!(rgb.len(), 16 * 16 * 3);
    assert!(rgb.chunks(3).all(|px| px == [128, 128, 128]));
}

#[test]
fn non_multiple_dimensions_emit_exactly_width_times_height_pixels() {
    let components = [
        TestComponent { id: 1, h_samp: 2, v_samp: 2, quant_id: 0 },
        TestComponent { id: 2, h_samp: 1, v_samp: 1, quant_id: 0 },
        TestComponent { id: 3, h_samp: 1, v_samp: 1, quant_id: 0 },
    ];
    // 10x7 needs one 16x16 MCU, but only 70 of its 256 pixels are real.
    let data = build_flat_jpeg(10, 7, &components);
    let mut decoder = Decoder::new(&data);
    let sink = decoder.decode_buffer().unwrap();
    assert_eq!((sink.width(), sink.height()), (10, 7));
    assert_eq!(sink.into_rgb8().len(), 10 * 7 * 3);
}

#[test]
fn grayscale_frame_yields_r_equals_g_equals_b() {
    let data = build_flat_jpeg(
        8,
        8,
        &[TestComponent { id: 1, h_samp: 1, v_samp: 1, quant_id: 0 }],
    );
    let mut decoder = Decoder::new(&data);
    let sink = decoder.decode_buffer().unwrap();
    for px in sink.into_rgb8().chunks(3) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }
}

#[test]
fn missing_quantization_table_is_reported() {
    // Component references qt id 2, which no DQT segment ever defines.
    let data = build_flat_jpeg(
        8,
        8,
        &[TestComponent { id: 1, h_samp: 1, v_samp: 1, quant_id: 2 }],
    );
    let mut decoder = Decoder::new(&data);
    assert!(decoder.decode_buffer().is_err());
}
