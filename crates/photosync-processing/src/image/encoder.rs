//! In-process decode and JPEG encode

use std::io::Cursor;

use image::{DynamicImage, ImageReader};

use super::normalizer::ConversionError;

/// Decode whatever `image` recognises by signature and re-encode as RGB JPEG.
pub(crate) fn encode_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>, ConversionError> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ConversionError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| ConversionError::Decode(e.to_string()))?;

    compress_jpeg(&img, quality).map_err(|e| ConversionError::Encode(e.to_string()))
}

fn compress_jpeg(img: &DynamicImage, quality: u8) -> std::io::Result<Vec<u8>> {
    // Gray, alpha and 16-bit layouts all go through RGB8
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_optimize_coding(true);

    let mut comp = comp.start_compress(Vec::new())?;
    comp.write_scanlines(&rgb_img)?;
    comp.finish()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    pub(crate) fn sample_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(16, 12, |x, y| Rgba([(x * 15) as u8, (y * 20) as u8, 128, 200]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    pub(crate) fn sample_jpeg() -> Vec<u8> {
        encode_jpeg(&sample_png(), 80).unwrap()
    }

    #[test]
    fn test_rgba_png_becomes_jpeg() {
        let jpeg = encode_jpeg(&sample_png(), 85).unwrap();
        assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF]);

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 12));
    }

    #[test]
    fn test_undecodable_input() {
        let err = encode_jpeg(b"ftypheic-but-not-really", 85).unwrap_err();
        assert!(matches!(err, ConversionError::Decode(_)));
    }
}
