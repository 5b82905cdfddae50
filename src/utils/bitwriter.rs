use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;

/// MSB-first bit writer for entropy-coded JPEG data.
///
/// Whole bytes equal to `0xFF` get a stuffed `0x00` appended so the
/// output never forms an accidental marker. Marker segments are written
/// through the aligned `write_*` methods, which bypass stuffing.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    writer: W,
    buffer: u32,
    bits_in_buffer: u8,
}

impl<W: Write> BitWriter<W> {
    pub fn new(writer: W) -> Self {
        BitWriter {
            writer,
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    /// Appends the low `n` bits of `bits` to the entropy stream.
    pub fn write_bits(&mut self, bits: u16, n: u8) -> Result<(), std::io::Error> {
        debug_assert!(n <= 16);
        if n == 0 {
            return Ok(());
        }
        let masked = bits as u32 & ((1u32 << n) - 1);
        self.buffer |= masked << (32 - self.bits_in_buffer - n);
        self.bits_in_buffer += n;

        while self.bits_in_buffer >= 8 {
            let byte = (self.buffer >> 24) as u8;
            self.writer.write_u8(byte)?;
            if byte == 0xFF {
                // Byte stuffing: tell the decoder this is data, not a marker.
                self.writer.write_u8(0x00)?;
            }
            self.buffer <<= 8;
            self.bits_in_buffer -= 8;
        }

        Ok(())
    }

    /// Pads any pending bits with 1s up to a byte boundary and writes the
    /// final byte. Entropy segments end this way before the next marker.
    pub fn flush_bits(&mut self) -> Result<(), std::io::Error> {
        if self.bits_in_buffer > 0 {
            let pad = 8 - self.bits_in_buffer;
            self.write_bits((1u16 << pad) - 1, pad)?;
        }
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), std::io::Error> {
        debug_assert_eq!(self.bits_in_buffer, 0);
        self.writer.write_u8(value)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), std::io::Error> {
        debug_assert_eq!(self.bits_in_buffer, 0);
        self.writer.write_u16::<BigEndian>(value)
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), std::io::Error> {
        debug_assert_eq!(self.bits_in_buffer, 0);
        self.writer.write_all(bytes)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stuffs_ff_bytes() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0xFF, 8).unwrap();
        writer.write_bits(0x12, 8).unwrap();
        assert_eq!(writer.into_inner(), vec![0xFF, 0x00, 0x12]);
    }

    #[test]
    fn pads_with_ones() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b00, 2).unwrap();
        writer.flush_bits().unwrap();
        assert_eq!(writer.into_inner(), vec![0b0011_1111]);
    }

    #[test]
    fn crosses_byte_boundaries() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b0101_0111_001, 11).unwrap();
        writer.write_bits(0b10, 2).unwrap();
        writer.flush_bits().unwrap();
        assert_eq!(writer.into_inner(), vec![0b1010_1010, 0b1110_0110]);
    }
}
