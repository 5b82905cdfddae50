#[cfg(test)]
mod tests {
    use luxel::utils::bitreader::BitReader;
    use luxel::{JpegDecoder, JpegEncoder, JpegError, RgbImage, TableKind};
    use std::io::Cursor;

    // Minimal single-component 8x8 stream: flat quantization, one-symbol
    // Huffman tables, and one block whose coefficients are all zero, so
    // every pixel decodes to mid-gray (128, 128, 128).
    fn gray_segments() -> Vec<Vec<u8>> {
        let mut dqt = vec![0xFF, 0xDB, 0x00, 0x43, 0x00];
        dqt.extend(std::iter::repeat(0x01).take(64));

        let mut dht_dc = vec![0xFF, 0xC4, 0x00, 0x14, 0x00, 0x01];
        dht_dc.extend(std::iter::repeat(0x00).take(15));
        dht_dc.push(0x00);

        let mut dht_ac = vec![0xFF, 0xC4, 0x00, 0x14, 0x10, 0x01];
        dht_ac.extend(std::iter::repeat(0x00).take(15));
        dht_ac.push(0x00);

        vec![
            vec![0xFF, 0xD8],
            dqt,
            vec![0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00],
            dht_dc,
            dht_ac,
            vec![0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00],
            // DC category 0 plus EOB is two zero bits, padded with ones
            vec![0x3F],
            vec![0xFF, 0xD9],
        ]
    }

    fn gray_jpeg() -> Vec<u8> {
        gray_segments().concat()
    }

    #[test]
    pub fn test_bitreader() -> Result<(), Box<dyn std::error::Error>> {
        let data = vec![0b10101010];
        let mut reader = BitReader::new(Cursor::new(data));

        assert_eq!(reader.read_bit()?, true);
        assert_eq!(reader.read_bit()?, false);
        assert_eq!(reader.read_bits(6)?, 0b101010);

        let data = vec![0b10101010, 0b11001100];
        let mut reader = BitReader::new(Cursor::new(data));

        assert_eq!(reader.read_bits(3)?, 0b101);
        assert_eq!(reader.read_bits(7)?, 0b0101011);
        assert_eq!(reader.read_bits(6)?, 0b001100);

        let data = vec![0x12, 0x34, 0x56];
        let mut reader = BitReader::new(Cursor::new(data));
        assert_eq!(reader.read_u16()?, 0x1234);
        assert_eq!(reader.read_u8()?, 0x56);

        Ok(())
    }

    #[test]
    pub fn test_format_predicate() -> Result<(), Box<dyn std::error::Error>> {
        let mut jpeg = Cursor::new(vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert!(luxel::is_jpeg(&mut jpeg)?);
        // exactly two bytes consumed
        assert_eq!(jpeg.position(), 2);

        let png = [0x89u8, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(!luxel::is_jpeg(&mut &png[..])?);

        let empty: &[u8] = &[];
        assert!(!luxel::is_jpeg(&mut &empty[..])?);

        Ok(())
    }

    #[test]
    pub fn test_image_bounds() -> Result<(), Box<dyn std::error::Error>> {
        let mut image = RgbImage::new(4, 4)?;
        image.write_rgb(3, 3, 10, 20, 30)?;

        let result = image.write_rgb(4, 0, 1, 2, 3);
        assert!(matches!(result, Err(JpegError::OutOfBounds { x: 4, y: 0, .. })));
        let result = image.read_rgb(0, 4);
        assert!(matches!(result, Err(JpegError::OutOfBounds { .. })));

        // the failed write left the planes untouched
        assert_eq!(image.read_rgb(3, 3)?, (10, 20, 30));
        assert_eq!(image.read_rgb(0, 0)?, (0, 0, 0));

        Ok(())
    }

    #[test]
    pub fn test_allocation_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
        let image = RgbImage::new(32, 32)?;
        assert_eq!(image.npix(), 1024);
        drop(image);

        let again = RgbImage::new(32, 32)?;
        assert_eq!(again.npix(), 1024);

        let result = RgbImage::new(u32::MAX, u32::MAX);
        assert!(matches!(result, Err(JpegError::AllocationFailure(_))));

        Ok(())
    }

    #[test]
    pub fn test_decode_gray_block() -> Result<(), Box<dyn std::error::Error>> {
        let mut decoder = JpegDecoder::new(Cursor::new(gray_jpeg()));
        let image = decoder.decode()?;

        assert_eq!(decoder.width(), 8);
        assert_eq!(decoder.height(), 8);
        assert_eq!(decoder.precision(), 8);
        assert_eq!(decoder.components().len(), 1);

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(image.read_rgb(x, y)?, (128, 128, 128));
            }
        }

        Ok(())
    }

    #[test]
    pub fn test_decode_16bit_quant_table() -> Result<(), Box<dyn std::error::Error>> {
        // the gray fixture with its DQT swapped for a Pq=1 table of
        // big-endian 16-bit entries, all equal to one
        let mut dqt = vec![0xFF, 0xDB, 0x00, 0x83, 0x10];
        for _ in 0..64 {
            dqt.extend_from_slice(&[0x00, 0x01]);
        }

        let mut segments = gray_segments();
        segments[1] = dqt;
        let image = luxel::decode(Cursor::new(segments.concat()))?;

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(image.read_rgb(x, y)?, (128, 128, 128));
            }
        }

        Ok(())
    }

    #[test]
    pub fn test_decode_four_component_passthrough() -> Result<(), Box<dyn std::error::Error>> {
        // four components, 1x1 sampling: channels 1-3 pass through as
        // R, G, B and the fourth is dropped
        let mut stream = Vec::new();
        stream.extend_from_slice(&[0xFF, 0xD8]);
        stream.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
        stream.extend(std::iter::repeat(0x01).take(64));
        stream.extend_from_slice(&[
            0xFF, 0xC0, 0x00, 0x14, 0x08, 0x00, 0x08, 0x00, 0x08, 0x04, 0x01, 0x11, 0x00, 0x02,
            0x11, 0x00, 0x03, 0x11, 0x00, 0x04, 0x11, 0x00,
        ]);
        stream.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x00, 0x01]);
        stream.extend(std::iter::repeat(0x00).take(15));
        stream.push(0x00);
        stream.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x10, 0x01]);
        stream.extend(std::iter::repeat(0x00).take(15));
        stream.push(0x00);
        stream.extend_from_slice(&[
            0xFF, 0xDA, 0x00, 0x0E, 0x04, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00, 0x00,
            0x3F, 0x00,
        ]);
        // four all-zero blocks are eight zero bits
        stream.push(0x00);
        stream.extend_from_slice(&[0xFF, 0xD9]);

        let mut decoder = JpegDecoder::new(Cursor::new(stream));
        let image = decoder.decode()?;

        assert_eq!(decoder.components().len(), 4);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(image.read_rgb(x, y)?, (128, 128, 128));
            }
        }

        Ok(())
    }

    #[test]
    pub fn test_decode_subsampled() -> Result<(), Box<dyn std::error::Error>> {
        // 4:2:0 YCbCr 8x8 frame: four luma blocks, one of each chroma,
        // all zero coefficients. Six blocks of two zero bits each, then
        // four one-bits of padding.
        let mut stream = Vec::new();
        stream.extend_from_slice(&[0xFF, 0xD8]);
        stream.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
        stream.extend(std::iter::repeat(0x01).take(64));
        stream.extend_from_slice(&[
            0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x08, 0x00, 0x08, 0x03, 0x01, 0x22, 0x00, 0x02,
            0x11, 0x00, 0x03, 0x11, 0x00,
        ]);
        stream.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x00, 0x01]);
        stream.extend(std::iter::repeat(0x00).take(15));
        stream.push(0x00);
        stream.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x10, 0x01]);
        stream.extend(std::iter::repeat(0x00).take(15));
        stream.push(0x00);
        stream.extend_from_slice(&[
            0xFF, 0xDA, 0x00, 0x0C, 0x03, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x3F, 0x00,
        ]);
        stream.extend_from_slice(&[0x00, 0x0F]);
        stream.extend_from_slice(&[0xFF, 0xD9]);

        let image = luxel::decode(Cursor::new(stream))?;

        // Y = 128, Cb = Cr = 128 is pure mid-gray
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(image.read_rgb(x, y)?, (128, 128, 128));
            }
        }

        Ok(())
    }

    #[test]
    pub fn test_decode_with_restart_markers() -> Result<(), Box<dyn std::error::Error>> {
        // 8x16 single-component frame, restart interval of one MCU:
        // each of the two blocks is byte-aligned and separated by RST0.
        let mut stream = Vec::new();
        stream.extend_from_slice(&[0xFF, 0xD8]);
        stream.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
        stream.extend(std::iter::repeat(0x01).take(64));
        stream.extend_from_slice(&[
            0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x10, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00,
        ]);
        stream.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x00, 0x01]);
        stream.extend(std::iter::repeat(0x00).take(15));
        stream.push(0x00);
        stream.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x10, 0x01]);
        stream.extend(std::iter::repeat(0x00).take(15));
        stream.push(0x00);
        stream.extend_from_slice(&[0xFF, 0xDD, 0x00, 0x04, 0x00, 0x01]);
        stream.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        stream.extend_from_slice(&[0x3F, 0xFF, 0xD0, 0x3F]);
        stream.extend_from_slice(&[0xFF, 0xD9]);

        let mut decoder = JpegDecoder::new(Cursor::new(stream));
        let image = decoder.decode()?;

        assert_eq!(decoder.restart_interval(), 1);
        assert_eq!(image.nrow(), 16);
        assert_eq!(image.read_rgb(4, 4)?, (128, 128, 128));
        assert_eq!(image.read_rgb(4, 12)?, (128, 128, 128));

        Ok(())
    }

    #[test]
    pub fn test_truncated_stream() {
        let mut bytes = gray_jpeg();
        bytes.truncate(bytes.len() - 3); // drop the entropy byte and EOI

        let result = luxel::decode(Cursor::new(bytes));
        assert!(matches!(result, Err(JpegError::TruncatedStream)));
    }

    #[test]
    pub fn test_not_a_jpeg() {
        let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let result = luxel::decode(Cursor::new(png));
        assert!(matches!(result, Err(JpegError::NotAJpeg)));

        let result = luxel::decode(Cursor::new(Vec::new()));
        assert!(matches!(result, Err(JpegError::NotAJpeg)));
    }

    #[test]
    pub fn test_unsupported_progressive() {
        let result = luxel::decode(Cursor::new(vec![0xFF, 0xD8, 0xFF, 0xC2]));
        assert!(matches!(result, Err(JpegError::UnsupportedEncoding(_))));
    }

    #[test]
    pub fn test_missing_huffman_table() {
        // same stream as the gray fixture, but the DHT segments removed
        let segments = gray_segments();
        let mut bytes = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            if i == 3 || i == 4 {
                continue;
            }
            bytes.extend_from_slice(segment);
        }

        let result = luxel::decode(Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(JpegError::MissingTable {
                kind: TableKind::HuffmanDc,
                id: 0
            })
        ));
    }

    #[test]
    pub fn test_malformed_segment_length() {
        // APP0 declaring 65535 bytes that are not there
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0xFF, 0xFF, 0x00];
        let result = luxel::decode(Cursor::new(bytes));
        assert!(matches!(result, Err(JpegError::MalformedMarker(_))));

        // a length field shorter than itself
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x01];
        let result = luxel::decode(Cursor::new(bytes));
        assert!(matches!(result, Err(JpegError::MalformedMarker(_))));
    }

    #[test]
    pub fn test_encode_decode_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        // solid color, so quantization error is the only loss
        let mut image = RgbImage::new(10, 6)?;
        for y in 0..6 {
            for x in 0..10 {
                image.write_rgb(x, y, 200, 30, 90)?;
            }
        }

        let bytes = JpegEncoder::with_quality(Vec::new(), 90).encode(&image)?;
        let first = luxel::decode(Cursor::new(&bytes))?;

        assert_eq!(first.ncol(), 10);
        assert_eq!(first.nrow(), 6);
        for y in 0..6 {
            for x in 0..10 {
                let (r, g, b) = first.read_rgb(x, y)?;
                assert!((r as i32 - 200).abs() <= 3, "r = {} at ({}, {})", r, x, y);
                assert!((g as i32 - 30).abs() <= 3, "g = {} at ({}, {})", g, x, y);
                assert!((b as i32 - 90).abs() <= 3, "b = {} at ({}, {})", b, x, y);
            }
        }

        // a second generation settles: decode(encode(D1)) stays close to D1
        let bytes = JpegEncoder::with_quality(Vec::new(), 90).encode(&first)?;
        let second = luxel::decode(Cursor::new(&bytes))?;
        for y in 0..6 {
            for x in 0..10 {
                let (r1, g1, b1) = first.read_rgb(x, y)?;
                let (r2, g2, b2) = second.read_rgb(x, y)?;
                assert!((r1 as i32 - r2 as i32).abs() <= 3);
                assert!((g1 as i32 - g2 as i32).abs() <= 3);
                assert!((b1 as i32 - b2 as i32).abs() <= 3);
            }
        }

        Ok(())
    }

    #[test]
    pub fn test_encoded_stream_is_well_formed() -> Result<(), Box<dyn std::error::Error>> {
        let mut image = RgbImage::new(16, 16)?;
        for y in 0..16 {
            for x in 0..16 {
                let v = ((x * 16 + y * 4) % 256) as u8;
                image.write_rgb(x, y, v, 255 - v, 128)?;
            }
        }

        let bytes = luxel::encode(&image, 75, Vec::new())?;

        assert!(luxel::is_jpeg(&mut &bytes[..])?);
        // no bare marker prefix inside the stream except real markers
        let mut decoder = JpegDecoder::new(Cursor::new(&bytes));
        let decoded = decoder.decode()?;
        assert_eq!(decoded.ncol(), 16);
        assert_eq!(decoded.nrow(), 16);
        assert_eq!(decoder.components().len(), 3);

        Ok(())
    }
}
