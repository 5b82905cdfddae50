pub mod dct;
pub mod decoder;
pub mod encoder;
pub mod huffman;
pub mod tables;
