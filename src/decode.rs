use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::RgbImage;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unreadable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode any supported raster format and normalize it to 8-bit RGB.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, DecodeError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Decode a base64 image payload, with or without a `data:<mime>;base64,`
/// header. Line wrapping and other ASCII whitespace are ignored.
pub fn decode_base64_image(payload: &str) -> Result<RgbImage, DecodeError> {
    let compact: Vec<u8> = strip_data_uri(payload)
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact)?;
    decode_rgb(&bytes)
}

fn strip_data_uri(payload: &str) -> &str {
    let trimmed = payload.trim_start();
    if trimmed.starts_with("data:") {
        if let Some((_, data)) = trimmed.split_once(',') {
            return data;
        }
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{encode_png, gradient_image};

    #[test]
    fn strips_data_uri_header() {
        assert_eq!(strip_data_uri("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_uri("AAAA"), "AAAA");
        assert_eq!(strip_data_uri("data:broken"), "data:broken");
    }

    #[test]
    fn decodes_prefixed_png_to_rgb() {
        let png = encode_png(&gradient_image(40, 20));
        let payload = format!("data:image/png;base64,{}", STANDARD.encode(&png));

        let image = decode_base64_image(&payload).unwrap();
        assert_eq!(image.dimensions(), (40, 20));
    }

    #[test]
    fn decodes_bare_payload() {
        let png = encode_png(&gradient_image(8, 8));
        let image = decode_base64_image(&STANDARD.encode(&png)).unwrap();
        assert_eq!(image.dimensions(), (8, 8));
    }

    #[test]
    fn decodes_line_wrapped_payload() {
        let encoded = STANDARD.encode(encode_png(&gradient_image(30, 10)));
        let wrapped = encoded
            .as_bytes()
            .chunks(76)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect::<Vec<_>>()
            .join("\r\n");
        assert!(wrapped.contains('\n'));

        let image = decode_base64_image(&format!("data:image/png;base64,{}\n", wrapped)).unwrap();
        assert_eq!(image.dimensions(), (30, 10));
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_base64_image("data:image/png;base64,!!!not-base64!!!").unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[test]
    fn rejects_non_image_bytes() {
        let err = decode_base64_image(&STANDARD.encode(b"<svg></svg>")).unwrap_err();
        assert!(matches!(err, DecodeError::Image(_)));
    }
}
