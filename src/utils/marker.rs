use std::fmt::{self, Display, Formatter};

/// JPEG marker codes, identified by the byte following `0xFF`.
///
/// Families that share handling carry their low nibble as payload rather
/// than getting one variant per code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegMarker {
    /// Start of image
    Soi,
    /// End of image
    Eoi,
    /// Start of scan
    Sos,
    /// Define quantization table(s)
    Dqt,
    /// Define Huffman table(s)
    Dht,
    /// Define arithmetic coding conditioning(s)
    Dac,
    /// Define restart interval
    Dri,
    /// Define number of lines
    Dnl,
    /// Define hierarchical progression
    Dhp,
    /// Expand reference component(s)
    Exp,
    /// Comment
    Com,
    /// Temporary private use in arithmetic coding
    Tem,
    /// Start of frame `n` (0xFFC0 + n); n = 0 is baseline DCT
    Sof(u8),
    /// Restart marker `n` (0xFFD0 + n)
    Rst(u8),
    /// Application segment `n` (0xFFE0 + n)
    App(u8),
    /// JPEG extension `n` (0xFFF0 + n)
    JpgExt(u8),
    /// Reserved marker
    Res(u8),
}

impl JpegMarker {
    /// Maps the byte after `0xFF` to a marker. `0x00` is a stuffed data
    /// byte and `0xFF` is a fill byte; neither names a marker.
    pub fn from_code(code: u8) -> Option<JpegMarker> {
        match code {
            0x00 | 0xFF => None,
            0x01 => Some(JpegMarker::Tem),
            0xC4 => Some(JpegMarker::Dht),
            0xCC => Some(JpegMarker::Dac),
            0xC0..=0xCF => Some(JpegMarker::Sof(code - 0xC0)),
            0xD0..=0xD7 => Some(JpegMarker::Rst(code - 0xD0)),
            0xD8 => Some(JpegMarker::Soi),
            0xD9 => Some(JpegMarker::Eoi),
            0xDA => Some(JpegMarker::Sos),
            0xDB => Some(JpegMarker::Dqt),
            0xDC => Some(JpegMarker::Dnl),
            0xDD => Some(JpegMarker::Dri),
            0xDE => Some(JpegMarker::Dhp),
            0xDF => Some(JpegMarker::Exp),
            0xE0..=0xEF => Some(JpegMarker::App(code - 0xE0)),
            0xF0..=0xFD => Some(JpegMarker::JpgExt(code - 0xF0)),
            0xFE => Some(JpegMarker::Com),
            0x02..=0xBF => Some(JpegMarker::Res(code)),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            JpegMarker::Tem => 0x01,
            JpegMarker::Dht => 0xC4,
            JpegMarker::Dac => 0xCC,
            JpegMarker::Sof(n) => 0xC0 + n,
            JpegMarker::Rst(n) => 0xD0 + n,
            JpegMarker::Soi => 0xD8,
            JpegMarker::Eoi => 0xD9,
            JpegMarker::Sos => 0xDA,
            JpegMarker::Dqt => 0xDB,
            JpegMarker::Dnl => 0xDC,
            JpegMarker::Dri => 0xDD,
            JpegMarker::Dhp => 0xDE,
            JpegMarker::Exp => 0xDF,
            JpegMarker::App(n) => 0xE0 + n,
            JpegMarker::JpgExt(n) => 0xF0 + n,
            JpegMarker::Com => 0xFE,
            JpegMarker::Res(code) => *code,
        }
    }

    pub fn word(&self) -> u16 {
        0xFF00 | self.code() as u16
    }
}

impl Display for JpegMarker {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JpegMarker::Sof(n) => write!(f, "SOF{}", n),
            JpegMarker::Rst(n) => write!(f, "RST{}", n),
            JpegMarker::App(n) => write!(f, "APP{}", n),
            JpegMarker::JpgExt(n) => write!(f, "JPG{}", n),
            JpegMarker::Res(code) => write!(f, "RES({:#04X})", code),
            other => write!(f, "{}", format!("{:?}", other).to_uppercase()),
        }
    }
}
