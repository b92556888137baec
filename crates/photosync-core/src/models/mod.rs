//! Data models shared by the ingestion pipeline

mod classification;
mod media;
mod storage;

pub use classification::*;
pub use media::*;
pub use storage::*;
