//! Inline property images
//!
//! Images travel as base64 data URLs and are stored verbatim on the property
//! row. Only the size and the media type are checked.

use base64::{engine::general_purpose::STANDARD, Engine};
use propdesk_common::{Error, Result};

/// Largest accepted image, in decoded bytes
pub const MAX_INLINE_IMAGE_BYTES: usize = 700 * 1024;

const ACCEPTED_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

/// A validated `data:image/...;base64,` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    data_url: String,
    media_type: String,
    decoded_len: usize,
}

impl InlineImage {
    /// Validate a data URL.
    ///
    /// Rejects anything that is not base64, not one of the accepted image
    /// types, or larger than [`MAX_INLINE_IMAGE_BYTES`] once decoded.
    pub fn parse(data_url: &str) -> Result<Self> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| Error::Validation("Image must be a data URL".to_string()))?;

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::Validation("Malformed image data URL".to_string()))?;

        let media_type = header.strip_suffix(";base64").ok_or_else(|| {
            Error::Validation("Image data URL must be base64 encoded".to_string())
        })?;

        if !ACCEPTED_TYPES.contains(&media_type) {
            return Err(Error::Validation(format!(
                "Unsupported image type '{}'",
                media_type
            )));
        }

        // Cheap upper bound before decoding: 4 chars carry 3 bytes
        if payload.len() / 4 * 3 > MAX_INLINE_IMAGE_BYTES + 3 {
            return Err(Self::too_large());
        }

        let decoded = STANDARD
            .decode(payload)
            .map_err(|_| Error::Validation("Image payload is not valid base64".to_string()))?;

        if decoded.is_empty() {
            return Err(Error::Validation("Image payload is empty".to_string()));
        }
        if decoded.len() > MAX_INLINE_IMAGE_BYTES {
            return Err(Self::too_large());
        }

        Ok(Self {
            data_url: data_url.to_string(),
            media_type: media_type.to_string(),
            decoded_len: decoded.len(),
        })
    }

    fn too_large() -> Error {
        Error::Validation(format!(
            "Image exceeds the {} KB limit",
            MAX_INLINE_IMAGE_BYTES / 1024
        ))
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn decoded_len(&self) -> usize {
        self.decoded_len
    }

    pub fn into_data_url(self) -> String {
        self.data_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_url(media_type: &str, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
    }

    #[test]
    fn test_accepts_small_png() {
        let url = data_url("image/png", &[0x89, b'P', b'N', b'G']);
        let image = InlineImage::parse(&url).unwrap();
        assert_eq!(image.media_type(), "image/png");
        assert_eq!(image.decoded_len(), 4);
        assert_eq!(image.into_data_url(), url);
    }

    #[test]
    fn test_accepts_exactly_the_limit() {
        let bytes = vec![7u8; MAX_INLINE_IMAGE_BYTES];
        assert!(InlineImage::parse(&data_url("image/jpeg", &bytes)).is_ok());
    }

    #[test]
    fn test_rejects_one_byte_over_the_limit() {
        let bytes = vec![7u8; MAX_INLINE_IMAGE_BYTES + 1];
        let err = InlineImage::parse(&data_url("image/jpeg", &bytes)).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("700 KB")));
    }

    #[test]
    fn test_rejects_malformed_urls() {
        for bad in [
            "https://cdn.example.com/a.png",
            "data:image/png;base64",
            "data:image/png,rawbytes",
            "data:image/png;base64,@@@not-base64@@@",
            "data:image/png;base64,",
        ] {
            assert!(InlineImage::parse(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_rejects_non_image_types() {
        let url = data_url("application/pdf", b"%PDF");
        assert!(InlineImage::parse(&url).is_err());
    }
}
