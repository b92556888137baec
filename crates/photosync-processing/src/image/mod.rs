//! Legacy image container normalization

mod capability;
#[cfg(feature = "embedded-decoder")]
mod encoder;
mod metadata;
mod normalizer;

pub use capability::{detect_capability, ConverterCapability, PathLocator, ToolLocator};
pub use metadata::{embed_exif, read_metadata, ImageMetadata};
pub use normalizer::{ConversionError, ConversionOutcome, FormatNormalizer, NormalizerSettings};
