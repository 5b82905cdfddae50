use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;

#[derive(Debug)]
pub enum JpegError {
    /// I/O failure on the underlying byte source or sink.
    Io(io::Error),
    /// The stream does not start with an SOI marker.
    NotAJpeg,
    /// The stream is JPEG, but not baseline sequential Huffman.
    UnsupportedEncoding(String),
    /// A marker segment's length field is inconsistent with its contents
    /// or with the remaining stream.
    MalformedMarker(String),
    /// A scan referenced a table index that was never defined.
    MissingTable { kind: TableKind, id: u8 },
    /// More than 16 bits were consumed without matching a Huffman code,
    /// or a code resolved to a symbol that is invalid where it appeared.
    InvalidHuffmanCode,
    /// The byte source ran out mid-read.
    TruncatedStream,
    /// A pixel access outside the image bounds.
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },
    /// An image plane could not be reserved; nothing stays allocated.
    AllocationFailure(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Quantization,
    HuffmanDc,
    HuffmanAc,
}

impl Display for TableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Quantization => write!(f, "quantization"),
            TableKind::HuffmanDc => write!(f, "DC Huffman"),
            TableKind::HuffmanAc => write!(f, "AC Huffman"),
        }
    }
}

impl Error for JpegError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            JpegError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for JpegError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JpegError::Io(err) => write!(f, "I/O error: {}", err),
            JpegError::NotAJpeg => write!(f, "Not a JPEG stream"),
            JpegError::UnsupportedEncoding(what) => write!(f, "Unsupported JPEG encoding: {}", what),
            JpegError::MalformedMarker(what) => write!(f, "Malformed marker segment: {}", what),
            JpegError::MissingTable { kind, id } => {
                write!(f, "Scan references undefined {} table {}", kind, id)
            }
            JpegError::InvalidHuffmanCode => write!(f, "Invalid Huffman code in entropy data"),
            JpegError::TruncatedStream => write!(f, "Unexpected end of stream"),
            JpegError::OutOfBounds { x, y, width, height } => {
                write!(f, "Pixel ({}, {}) out of bounds for {}x{} image", x, y, width, height)
            }
            JpegError::AllocationFailure(bytes) => {
                write!(f, "Failed to allocate image plane of {} bytes", bytes)
            }
        }
    }
}

impl From<io::Error> for JpegError {
    fn from(error: io::Error) -> Self {
        // Running off the end of the source is a decode-level condition,
        // not a transport failure.
        if error.kind() == io::ErrorKind::UnexpectedEof {
            JpegError::TruncatedStream
        } else {
            JpegError::Io(error)
        }
    }
}

// Result type alias for all codec operations
pub type JpegResult<T> = Result<T, JpegError>;
