//! Block Reconstruction: dequantize, undo the zig-zag scan order, and run
//! the inverse DCT to recover an 8x8 block of samples.

use std::f64::consts::PI;
use std::sync::OnceLock;

use crate::misc::ZIGZAG;

fn cosine_table() -> &'static [[f64; 8]; 8] {
    static TABLE: OnceLock<[[f64; 8]; 8]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [[0f64; 8]; 8];
        for (spatial, row) in table.iter_mut().enumerate() {
            for (freq, cell) in row.iter_mut().enumerate() {
                *cell = (((2 * spatial + 1) * freq) as f64 * PI / 16.0).cos();
            }
        }
        table
    })
}

fn alpha(u: usize) -> f64 {
    if u == 0 {
        std::f64::consts::FRAC_1_SQRT_2
    } else {
        1.0
    }
}

/// Undo zig-zag ordering and multiply each coefficient by its quantization
/// step, both of which the entropy decoder and the `DQT` table keep in
/// scan order. Returns the block in natural row-major order, `[v][u]`
/// with `v` the vertical (row) frequency and `u` the horizontal (column)
/// frequency.
pub(crate) fn dequantize(scan_order_coeffs: &[i32; 64], scan_order_quant: &[u16; 64]) -> [i32; 64] {
    let mut natural = [0i32; 64];
    for i in 0..64 {
        natural[ZIGZAG[i]] = scan_order_coeffs[i] * i32::from(scan_order_quant[i]);
    }
    natural
}

/// Run the 8x8 inverse DCT (type II) on a dequantized, naturally-ordered
/// block, level-shifting by +128 and clamping to `u8`. This is the direct,
/// non-separable formulation: readable and easy to check by hand against a
/// known coefficient array, at the cost of the separable fast variants'
/// speed. Baseline decoding of a 320x222 viewport does not need the speed.
pub(crate) fn idct(natural: &[i32; 64]) -> [u8; 64] {
    let cos = cosine_table();
    let mut out = [0u8; 64];

    for y in 0..8 {
        for x in 0..8 {
            let mut sum = 0f64;
            for v in 0..8 {
                for u in 0..8 {
                    let coeff = f64::from(natural[v * 8 + u]);
                    sum += alpha(u) * alpha(v) * coeff * cos[x][u] * cos[y][v];
                }
            }
            let sample = sum / 4.0 + 128.0;
            out[y * 8 + x] = sample.round().clamp(0.0, 255.0) as u8;
        }
    }

    out
}
