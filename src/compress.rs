use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

/// Upper bound for an uploaded JPEG (800 KiB).
pub const MAX_JPEG_BYTES: usize = 800 * 1024;
pub const START_QUALITY: u8 = 85;
pub const MIN_QUALITY: u8 = 60;
const QUALITY_STEP: u8 = 5;

#[derive(Debug, thiserror::Error)]
#[error("JPEG encoding failed: {0}")]
pub struct CompressionError(#[from] image::ImageError);

#[derive(Debug)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub quality: u8,
}

/// Re-encode as JPEG, stepping quality down until the output fits in
/// [`MAX_JPEG_BYTES`]. At [`MIN_QUALITY`] the encoding is returned whatever its size.
pub fn compress_jpeg(image: &RgbImage) -> Result<CompressedImage, CompressionError> {
    compress_within(image, MAX_JPEG_BYTES)
}

fn compress_within(image: &RgbImage, max_bytes: usize) -> Result<CompressedImage, CompressionError> {
    let mut quality = START_QUALITY;
    loop {
        let bytes = encode_jpeg(image, quality)?;
        if bytes.len() <= max_bytes || quality <= MIN_QUALITY {
            return Ok(CompressedImage { bytes, quality });
        }
        quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
    }
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CompressionError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(image)?;
    Ok(buf)
}
