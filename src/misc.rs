//! Small shared constants used across the decoder.

/// Maximum number of Huffman/quantization table slots per class (JPEG caps
/// the low nibble of `table_info` at 4 values).
pub(crate) const MAX_TABLES: usize = 4;

/// Maps a zig-zag scan index to its position in the natural (row-major)
/// 8x8 ordering: `natural[ZIGZAG[i]]` is the `i`th coefficient read off the
/// scan.
#[rustfmt::skip]
pub(crate) const ZIGZAG: [usize; 64] = [
     0,  1,  5,  6, 14, 15, 27, 28,
     2,  4,  7, 13, 16, 26, 29, 42,
     3,  8, 12, 17, 25, 30, 41, 43,
     9, 11, 18, 24, 31, 40, 44, 53,
    10, 19, 23, 32, 39, 45, 52, 54,
    20, 22, 33, 38, 46, 51, 55, 60,
    21, 34, 37, 47, 50, 56, 59, 61,
    35, 36, 48, 49, 57, 58, 62, 63,
];
