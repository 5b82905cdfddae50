pub mod bitreader;
pub mod bitwriter;
pub mod error;
pub mod logger;
pub mod marker;
