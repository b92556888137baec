//! Media processing for PhotoSync: validation of incoming objects and
//! normalization of legacy image containers to JPEG.

pub mod image;
pub mod validator;

pub use image::{
    detect_capability, ConversionOutcome, ConverterCapability, FormatNormalizer, ImageMetadata,
    NormalizerSettings, PathLocator, ToolLocator,
};
pub use validator::{MediaValidator, ValidationError};
