use std::io::Read;

/// MSB-first bit reader over a sequential byte source.
///
/// The source only needs to support `Read`; nothing here seeks, so files,
/// memory buffers and pipes all work. Exhaustion surfaces as
/// `io::ErrorKind::UnexpectedEof` from the underlying reader.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    reader: R,
    buffer: u32,
    bits_in_buffer: u8,
}

impl<R: Read> BitReader<R> {
    pub fn new(reader: R) -> Self {
        BitReader {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    /// Reads a single bit from the stream.
    pub fn read_bit(&mut self) -> Result<bool, std::io::Error> {
        if self.bits_in_buffer == 0 {
            let mut byte = [0u8; 1];
            self.reader.read_exact(&mut byte)?;
            self.buffer = u32::from(byte[0]);
            self.bits_in_buffer = 8;
        }

        self.bits_in_buffer -= 1;
        Ok(((self.buffer >> self.bits_in_buffer) & 1) != 0)
    }

    /// Reads `n` bits (`n <= 32`), most significant first.
    pub fn read_bits(&mut self, n: u8) -> Result<u32, std::io::Error> {
        let mut result = 0;
        for _ in 0..n {
            result = (result << 1) | (self.read_bit()? as u32);
        }
        Ok(result)
    }

    pub fn read_u8(&mut self) -> Result<u8, std::io::Error> {
        self.read_bits(8).map(|b| b as u8)
    }

    /// Reads a big-endian 16-bit value.
    pub fn read_u16(&mut self) -> Result<u16, std::io::Error> {
        let high = self.read_u8()? as u16;
        let low = self.read_u8()? as u16;
        Ok((high << 8) | low)
    }

    /// Reads `n` whole bytes. Any partially consumed byte is discarded
    /// first, so the read starts on a byte boundary.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, std::io::Error> {
        self.clear_buffer();
        let mut bytes = vec![0; n];
        self.reader.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Drops any partially consumed byte, realigning to the next byte
    /// boundary.
    pub fn clear_buffer(&mut self) {
        self.bits_in_buffer = 0;
        self.buffer = 0;
    }
}
