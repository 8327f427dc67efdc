//! A small baseline-sequential JPEG decoder for fixed, low-resolution
//! viewports.
//!
//! ```no_run
//! use numjpeg::Decoder;
//!
//! let data = std::fs::read("photo.jpg").unwrap();
//! let mut decoder = Decoder::new(&data);
//! let image = decoder.decode_buffer().unwrap();
//! println!("{}x{}", image.width(), image.height());
//! ```
//!
//! Progressive, arithmetic-coded, lossless and 12-bit JPEG are all out of
//! scope; [`Decoder`] rejects them with [`DecodeErrors::UnsupportedFeature`]
//! rather than guessing at a partial decode.

#![warn(clippy::all)]
#![allow(clippy::many_single_char_names)]

mod color_convert;
mod components;
mod errors;
mod headers;
mod huffman;
mod idct;
mod marker;
mod mcu;
mod misc;
mod image;
mod reader;
mod upsampler;

pub use crate::errors::DecodeErrors;
pub use crate::image::{Decoder, ImageInfo};
pub use crate::mcu::{PixelSink, RasterSink};
