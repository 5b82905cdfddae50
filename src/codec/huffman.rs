use crate::utils::bitreader::BitReader;
use crate::utils::error::{JpegError, JpegResult};
use std::io::Read;

/// A canonical Huffman table as defined by a DHT segment.
///
/// `offsets[len]..offsets[len + 1]` indexes the symbols (and their codes)
/// of bit length `len + 1`; codes are assigned in increasing length and,
/// within a length, in symbol order. This is the offsets/symbols/codes
/// layout the decode loop walks one bit at a time.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    pub class: u8,
    pub id: u8,
    offsets: [u16; 17],
    symbols: Vec<u8>,
    codes: Vec<u16>,
}

/// Table class values from the DHT segment.
pub const CLASS_DC: u8 = 0;
pub const CLASS_AC: u8 = 1;

impl HuffmanTable {
    /// Builds the table from the 16-entry per-length symbol counts and
    /// the flat symbol list, assigning canonical codes.
    pub fn build(class: u8, id: u8, counts: &[u8; 16], symbols: Vec<u8>) -> JpegResult<HuffmanTable> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if symbols.len() != total {
            return Err(JpegError::MalformedMarker(format!(
                "Huffman table {}/{} declares {} symbols but provides {}",
                class,
                id,
                total,
                symbols.len()
            )));
        }
        if total > 256 {
            return Err(JpegError::MalformedMarker(format!(
                "Huffman table {}/{} declares {} symbols",
                class, id, total
            )));
        }

        let mut offsets = [0u16; 17];
        for len in 0..16 {
            offsets[len + 1] = offsets[len] + counts[len] as u16;
        }

        let mut codes = vec![0u16; total];
        let mut code = 0u32;
        for len in 0..16 {
            for k in offsets[len]..offsets[len + 1] {
                if code >> (len + 1) != 0 {
                    return Err(JpegError::MalformedMarker(format!(
                        "Huffman table {}/{} overfull at length {}",
                        class,
                        id,
                        len + 1
                    )));
                }
                codes[k as usize] = code as u16;
                code += 1;
            }
            code <<= 1;
        }

        Ok(HuffmanTable {
            class,
            id,
            offsets,
            symbols,
            codes,
        })
    }

    /// Reads bits until they match a code in this table, up to the
    /// 16-bit maximum code length.
    pub fn decode_symbol<R: Read>(&self, reader: &mut BitReader<R>) -> JpegResult<u8> {
        let mut code = 0u16;

        for len in 0..16 {
            code = (code << 1) | (reader.read_bit()? as u16);

            for k in self.offsets[len]..self.offsets[len + 1] {
                if self.codes[k as usize] == code {
                    return Ok(self.symbols[k as usize]);
                }
            }
        }

        Err(JpegError::InvalidHuffmanCode)
    }

    /// Produces the encode-side lookup: for each symbol value, its code
    /// and code length in bits. Symbols absent from the table have
    /// length 0.
    pub fn encode_lookup(&self) -> ([u16; 256], [u8; 256]) {
        let mut codes = [0u16; 256];
        let mut sizes = [0u8; 256];

        for len in 0..16 {
            for k in self.offsets[len]..self.offsets[len + 1] {
                let symbol = self.symbols[k as usize] as usize;
                codes[symbol] = self.codes[k as usize];
                sizes[symbol] = (len + 1) as u8;
            }
        }

        (codes, sizes)
    }
}

/// Sign-extends a magnitude-category value: `length` raw bits read from
/// the stream become the signed coefficient (T.81 F.2.2.1 EXTEND).
pub fn extend_sign(value: u32, length: u8) -> i32 {
    if length == 0 {
        return 0;
    }
    let value = value as i32;
    if value < (1 << (length - 1)) {
        value - (1 << length) + 1
    } else {
        value
    }
}

/// Encoder-side inverse of `extend_sign`: splits a signed coefficient
/// into its magnitude category and the raw bits to emit.
pub fn magnitude(value: i32) -> (u16, u8) {
    let mut bits = value;
    let mut abs = value;
    if value < 0 {
        abs = -abs;
        bits -= 1;
    }

    let mut length = 0u8;
    while abs != 0 {
        abs >>= 1;
        length += 1;
    }

    ((bits & ((1 << length) - 1)) as u16, length)
}
