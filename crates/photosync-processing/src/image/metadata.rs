use std::io::Cursor;

use bytes::Bytes;
use exif::{In, Tag};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;

/// Metadata captured from a source image before conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    /// `DateTimeOriginal`, falling back to `DateTime`
    pub capture_date: Option<String>,
    pub orientation: Option<u32>,
    /// Raw EXIF (TIFF) block, suitable for a JPEG APP1 segment
    pub exif: Option<Vec<u8>>,
}

impl ImageMetadata {
    pub fn is_empty(&self) -> bool {
        self.exif.is_none()
    }
}

/// Read EXIF from any container kamadak-exif understands (HEIF, JPEG, PNG, TIFF, WebP).
/// Images without EXIF yield an empty value.
pub fn read_metadata(data: &[u8]) -> ImageMetadata {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!(error = %e, "No readable EXIF in source image");
            return ImageMetadata::default();
        }
    };

    let capture_date = [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .find_map(|tag| exif.get_field(tag, In::PRIMARY))
        .map(|field| field.display_value().to_string());
    let orientation = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0));

    ImageMetadata {
        capture_date,
        orientation,
        exif: Some(exif.buf().to_vec()),
    }
}

/// Replace the EXIF segment of a JPEG. `None` strips it.
pub fn embed_exif(jpeg: &[u8], exif: Option<&[u8]>) -> Result<Vec<u8>, img_parts::Error> {
    let mut jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(jpeg))?;
    jpeg.set_exif(exif.map(Bytes::copy_from_slice));
    Ok(jpeg.encoder().bytes().to_vec())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Little-endian TIFF block with a single IFD0 entry: Orientation = 6.
    pub(crate) const ORIENTATION_EXIF: [u8; 26] = [
        0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, // header, IFD0 at 8
        0x01, 0x00, // one entry
        0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, // Orientation
        0x00, 0x00, 0x00, 0x00, // no next IFD
    ];

    #[test]
    fn test_read_metadata_without_exif() {
        let metadata = read_metadata(b"definitely not an image");
        assert!(metadata.is_empty());
        assert_eq!(metadata.orientation, None);
    }

    #[test]
    fn test_embed_rejects_non_jpeg() {
        assert!(embed_exif(b"GIF89a....", Some(&ORIENTATION_EXIF)).is_err());
    }

    #[cfg(feature = "embedded-decoder")]
    #[test]
    fn test_embed_then_read_orientation() {
        let jpeg = super::super::encoder::tests::sample_jpeg();
        let tagged = embed_exif(&jpeg, Some(&ORIENTATION_EXIF)).unwrap();

        let metadata = read_metadata(&tagged);
        assert_eq!(metadata.orientation, Some(6));
        assert_eq!(metadata.capture_date, None);

        let stripped = embed_exif(&tagged, None).unwrap();
        assert!(read_metadata(&stripped).is_empty());
    }
}
