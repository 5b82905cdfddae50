//! Baseline sequential JPEG codec with a planar RGB image type.
//!
//! The decoder accepts any `Read` source and handles grayscale, YCbCr
//! and four-component baseline streams, chroma subsampling, restart
//! markers and 16-bit quantization tables. The encoder writes
//! three-component 4:4:4 JFIF output with the standard default tables.
//!
//! ```no_run
//! use luxel::{JpegEncoder, RgbImage};
//!
//! let mut image = RgbImage::new(64, 64)?;
//! image.write_rgb(0, 0, 255, 128, 0)?;
//! let bytes = JpegEncoder::new(Vec::new()).encode(&image)?;
//! # Ok::<(), luxel::JpegError>(())
//! ```

pub mod codec;
pub mod image;
pub mod utils;

pub use crate::codec::decoder::{FrameComponent, JpegDecoder, QuantizationTable};
pub use crate::codec::encoder::JpegEncoder;
pub use crate::codec::tables::DEFAULT_QUALITY;
pub use crate::image::RgbImage;
pub use crate::utils::error::{JpegError, JpegResult, TableKind};
pub use crate::utils::logger::Logger;
pub use crate::utils::marker::JpegMarker;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Reports whether the stream starts with a JPEG SOI marker. Exactly
/// two bytes are consumed; a stream shorter than that is not a JPEG.
pub fn is_jpeg<R: Read>(reader: &mut R) -> JpegResult<bool> {
    let mut magic = [0u8; 2];
    match reader.read_exact(&mut magic) {
        Ok(()) => Ok(magic == [0xFF, 0xD8]),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(JpegError::Io(err)),
    }
}

/// Decodes a JPEG stream into a planar RGB image.
pub fn decode<R: Read>(reader: R) -> JpegResult<RgbImage> {
    JpegDecoder::new(reader).decode()
}

/// Encodes an image as baseline JPEG at the given quality (1..=100).
pub fn encode<W: Write>(image: &RgbImage, quality: u8, writer: W) -> JpegResult<W> {
    JpegEncoder::with_quality(writer, quality).encode(image)
}

/// Decodes the JPEG file at `path`.
pub fn open<P: AsRef<Path>>(path: P) -> JpegResult<RgbImage> {
    let file = File::open(path).map_err(JpegError::Io)?;
    decode(BufReader::new(file))
}

/// Encodes `image` to a JPEG file at `path`.
pub fn save<P: AsRef<Path>>(image: &RgbImage, quality: u8, path: P) -> JpegResult<()> {
    let file = File::create(path).map_err(JpegError::Io)?;
    let mut writer = encode(image, quality, BufWriter::new(file))?;
    writer.flush().map_err(JpegError::Io)?;
    Ok(())
}
