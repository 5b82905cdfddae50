use crate::codec::dct::Dct;
use crate::codec::huffman::{magnitude, HuffmanTable, CLASS_AC, CLASS_DC};
use crate::codec::tables::{
    scale_quant_table, DEFAULT_CHROMA_AC_COUNTS, DEFAULT_CHROMA_AC_SYMBOLS,
    DEFAULT_CHROMA_DC_COUNTS, DEFAULT_CHROMA_DC_SYMBOLS, DEFAULT_CHROMA_QUANT,
    DEFAULT_LUMA_AC_COUNTS, DEFAULT_LUMA_AC_SYMBOLS, DEFAULT_LUMA_DC_COUNTS,
    DEFAULT_LUMA_DC_SYMBOLS, DEFAULT_LUMA_QUANT, DEFAULT_QUALITY, ZIGZAG_ORDER,
};
use crate::image::RgbImage;
use crate::utils::bitwriter::BitWriter;
use crate::utils::error::{JpegError, JpegResult};
use crate::utils::marker::JpegMarker;
use log::debug;
use std::io::Write;

/// Encode-side Huffman lookup: code and code length per symbol value.
struct EncodeTable {
    codes: [u16; 256],
    sizes: [u8; 256],
}

impl EncodeTable {
    fn from_spec(class: u8, id: u8, counts: &[u8; 16], symbols: &[u8]) -> JpegResult<EncodeTable> {
        let table = HuffmanTable::build(class, id, counts, symbols.to_vec())?;
        let (codes, sizes) = table.encode_lookup();
        Ok(EncodeTable { codes, sizes })
    }
}

/// Baseline sequential JPEG encoder.
///
/// Writes a three-component 4:4:4 YCbCr image using the Annex K default
/// Huffman tables and quality-scaled Annex K quantization tables. No
/// subsampling and no restart markers are emitted.
pub struct JpegEncoder<W: Write> {
    writer: BitWriter<W>,
    quality: u8,
    dct: Dct,
}

impl<W: Write> JpegEncoder<W> {
    pub fn new(writer: W) -> JpegEncoder<W> {
        Self::with_quality(writer, DEFAULT_QUALITY)
    }

    /// `quality` is clamped to 1..=100; 50 keeps the Annex K tables as
    /// they are, higher is finer quantization.
    pub fn with_quality(writer: W, quality: u8) -> JpegEncoder<W> {
        JpegEncoder {
            writer: BitWriter::new(writer),
            quality: quality.clamp(1, 100),
            dct: Dct::new(),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encodes `image` and returns the underlying writer.
    pub fn encode(mut self, image: &RgbImage) -> JpegResult<W> {
        let width = image.ncol();
        let height = image.nrow();
        if width == 0 || height == 0 || width > 0xFFFF || height > 0xFFFF {
            return Err(JpegError::UnsupportedEncoding(format!(
                "{}x{} image does not fit a baseline frame",
                width, height
            )));
        }

        let luma_quant = scale_quant_table(&DEFAULT_LUMA_QUANT, self.quality);
        let chroma_quant = scale_quant_table(&DEFAULT_CHROMA_QUANT, self.quality);

        let luma_dc =
            EncodeTable::from_spec(CLASS_DC, 0, &DEFAULT_LUMA_DC_COUNTS, &DEFAULT_LUMA_DC_SYMBOLS)?;
        let luma_ac =
            EncodeTable::from_spec(CLASS_AC, 0, &DEFAULT_LUMA_AC_COUNTS, &DEFAULT_LUMA_AC_SYMBOLS)?;
        let chroma_dc = EncodeTable::from_spec(
            CLASS_DC,
            1,
            &DEFAULT_CHROMA_DC_COUNTS,
            &DEFAULT_CHROMA_DC_SYMBOLS,
        )?;
        let chroma_ac = EncodeTable::from_spec(
            CLASS_AC,
            1,
            &DEFAULT_CHROMA_AC_COUNTS,
            &DEFAULT_CHROMA_AC_SYMBOLS,
        )?;

        self.write_headers(width as u16, height as u16, &luma_quant, &chroma_quant)?;

        let blocks_x = width.div_ceil(8);
        let blocks_y = height.div_ceil(8);
        debug!(
            "Encoding {}x{} at quality {} ({} blocks per component)",
            width,
            height,
            self.quality,
            blocks_x as u64 * blocks_y as u64
        );

        let mut previous_dc = [0i32; 3];
        for block_y in 0..blocks_y {
            for block_x in 0..blocks_x {
                let (luma, cb, cr) = Self::extract_block(image, block_x * 8, block_y * 8)?;

                let coeffs = self.quantize(&luma, &luma_quant);
                self.encode_block(&coeffs, &mut previous_dc[0], &luma_dc, &luma_ac)?;

                let coeffs = self.quantize(&cb, &chroma_quant);
                self.encode_block(&coeffs, &mut previous_dc[1], &chroma_dc, &chroma_ac)?;

                let coeffs = self.quantize(&cr, &chroma_quant);
                self.encode_block(&coeffs, &mut previous_dc[2], &chroma_dc, &chroma_ac)?;
            }
        }

        self.writer.flush_bits()?;
        self.writer.write_u16(JpegMarker::Eoi.word())?;
        Ok(self.writer.into_inner())
    }

    fn write_headers(
        &mut self,
        width: u16,
        height: u16,
        luma_quant: &[u16; 64],
        chroma_quant: &[u16; 64],
    ) -> JpegResult<()> {
        self.writer.write_u16(JpegMarker::Soi.word())?;

        // APP0: JFIF 1.02, no density, no thumbnail
        self.writer.write_u16(JpegMarker::App(0).word())?;
        self.writer.write_u16(16)?;
        self.writer.write_all(b"JFIF\0")?;
        self.writer.write_all(&[0x01, 0x02, 0x00])?;
        self.writer.write_u16(1)?;
        self.writer.write_u16(1)?;
        self.writer.write_all(&[0x00, 0x00])?;

        for (id, table) in [(0u8, luma_quant), (1u8, chroma_quant)] {
            self.writer.write_u16(JpegMarker::Dqt.word())?;
            self.writer.write_u16(2 + 1 + 64)?;
            self.writer.write_u8(id)?;
            for &position in ZIGZAG_ORDER.iter() {
                self.writer.write_u8(table[position] as u8)?;
            }
        }

        // SOF0: 8-bit, three components, all 1x1 sampling
        self.writer.write_u16(JpegMarker::Sof(0).word())?;
        self.writer.write_u16(8 + 3 * 3)?;
        self.writer.write_u8(8)?;
        self.writer.write_u16(height)?;
        self.writer.write_u16(width)?;
        self.writer.write_u8(3)?;
        for (id, quant_id) in [(1u8, 0u8), (2, 1), (3, 1)] {
            self.writer.write_u8(id)?;
            self.writer.write_u8(0x11)?;
            self.writer.write_u8(quant_id)?;
        }

        let huffman_specs: [(u8, u8, &[u8], &[u8]); 4] = [
            (CLASS_DC, 0, &DEFAULT_LUMA_DC_COUNTS, &DEFAULT_LUMA_DC_SYMBOLS),
            (CLASS_AC, 0, &DEFAULT_LUMA_AC_COUNTS, &DEFAULT_LUMA_AC_SYMBOLS),
            (CLASS_DC, 1, &DEFAULT_CHROMA_DC_COUNTS, &DEFAULT_CHROMA_DC_SYMBOLS),
            (CLASS_AC, 1, &DEFAULT_CHROMA_AC_COUNTS, &DEFAULT_CHROMA_AC_SYMBOLS),
        ];
        for (class, id, counts, symbols) in huffman_specs {
            self.writer.write_u16(JpegMarker::Dht.word())?;
            self.writer.write_u16(2 + 1 + 16 + symbols.len() as u16)?;
            self.writer.write_u8((class << 4) | id)?;
            self.writer.write_all(counts)?;
            self.writer.write_all(symbols)?;
        }

        // SOS: all three components, luma tables 0, chroma tables 1
        self.writer.write_u16(JpegMarker::Sos.word())?;
        self.writer.write_u16(6 + 2 * 3)?;
        self.writer.write_u8(3)?;
        for (id, selectors) in [(1u8, 0x00u8), (2, 0x11), (3, 0x11)] {
            self.writer.write_u8(id)?;
            self.writer.write_u8(selectors)?;
        }
        self.writer.write_all(&[0, 63, 0])?;

        Ok(())
    }

    /// Pulls one 8x8 tile out of the image and converts it to centered
    /// YCbCr. Pixels past the right and bottom edges replicate the last
    /// row and column.
    fn extract_block(
        image: &RgbImage,
        origin_x: u32,
        origin_y: u32,
    ) -> JpegResult<([f32; 64], [f32; 64], [f32; 64])> {
        let mut luma = [0.0f32; 64];
        let mut cb = [0.0f32; 64];
        let mut cr = [0.0f32; 64];

        for row in 0..8u32 {
            for col in 0..8u32 {
                let x = (origin_x + col).min(image.ncol() - 1);
                let y = (origin_y + row).min(image.nrow() - 1);
                let (r, g, b) = image.read_rgb(x, y)?;
                let (r, g, b) = (r as f32, g as f32, b as f32);

                let i = (row * 8 + col) as usize;
                luma[i] = 0.299 * r + 0.587 * g + 0.114 * b - 128.0;
                cb[i] = -0.168736 * r - 0.331264 * g + 0.5 * b;
                cr[i] = 0.5 * r - 0.418688 * g - 0.081312 * b;
            }
        }

        Ok((luma, cb, cr))
    }

    /// Forward transform plus quantization; the result is in zig-zag
    /// order, ready for run-length coding.
    fn quantize(&self, samples: &[f32; 64], quant: &[u16; 64]) -> [i32; 64] {
        let coeffs = self.dct.forward(samples);
        let mut quantized = [0i32; 64];
        for (k, slot) in quantized.iter_mut().enumerate() {
            let position = ZIGZAG_ORDER[k];
            *slot = (coeffs[position] / quant[position] as f32).round() as i32;
            if k > 0 {
                // AC magnitudes above 1023 have no code in the default tables
                *slot = (*slot).clamp(-1023, 1023);
            }
        }
        quantized
    }

    /// Emits one quantized block: DC difference, then AC run-length
    /// pairs with ZRL for runs of sixteen zeros and EOB when the rest of
    /// the block is zero.
    fn encode_block(
        &mut self,
        coeffs: &[i32; 64],
        previous_dc: &mut i32,
        dc_table: &EncodeTable,
        ac_table: &EncodeTable,
    ) -> JpegResult<()> {
        let diff = coeffs[0] - *previous_dc;
        *previous_dc = coeffs[0];

        let (bits, length) = magnitude(diff);
        self.writer
            .write_bits(dc_table.codes[length as usize], dc_table.sizes[length as usize])?;
        self.writer.write_bits(bits, length)?;

        let last_nonzero = coeffs.iter().rposition(|&c| c != 0).unwrap_or(0);
        let mut k = 1;
        while k <= last_nonzero {
            let mut run = 0u8;
            while coeffs[k] == 0 {
                run += 1;
                k += 1;
            }
            while run >= 16 {
                self.writer.write_bits(ac_table.codes[0xF0], ac_table.sizes[0xF0])?;
                run -= 16;
            }

            let (bits, length) = magnitude(coeffs[k]);
            let symbol = ((run as usize) << 4) | length as usize;
            self.writer.write_bits(ac_table.codes[symbol], ac_table.sizes[symbol])?;
            self.writer.write_bits(bits, length)?;
            k += 1;
        }

        if last_nonzero < 63 {
            self.writer.write_bits(ac_table.codes[0x00], ac_table.sizes[0x00])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_is_clamped() {
        let encoder = JpegEncoder::with_quality(Vec::new(), 200);
        assert_eq!(encoder.quality(), 100);
        let encoder = JpegEncoder::with_quality(Vec::new(), 0);
        assert_eq!(encoder.quality(), 1);
    }

    #[test]
    fn rejects_oversized_images() {
        let image = RgbImage::new(70000, 1).unwrap();
        let result = JpegEncoder::new(Vec::new()).encode(&image);
        assert!(matches!(result, Err(JpegError::UnsupportedEncoding(_))));
    }

    #[test]
    fn output_starts_with_soi_and_ends_with_eoi() {
        let image = RgbImage::new(8, 8).unwrap();
        let bytes = JpegEncoder::new(Vec::new()).encode(&image).unwrap();

        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }
}
