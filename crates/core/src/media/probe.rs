//! Media family probing: derive media type and details from the payload.

use serde_json::json;

/// Derives the media family and details for a payload.
///
/// `image/*` payloads are decoded to extract dimensions; everything else
/// is the generic "file" family with empty details. Probing is
/// best-effort: an undecodable image keeps its declared family but gets
/// empty details rather than failing ingestion.
#[must_use]
pub fn inspect_payload(mime_type: &str, payload: &[u8]) -> (String, serde_json::Value) {
    if mime_type.starts_with("image/") {
        let details = image::load_from_memory(payload).map_or_else(
            |_| json!({}),
            |img| {
                json!({
                    "width": img.width(),
                    "height": img.height(),
                    "filesize": payload.len(),
                })
            },
        );
        ("image".to_string(), details)
    } else {
        ("file".to_string(), json!({}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("png encoding");
        out.into_inner()
    }

    #[test]
    fn image_payload_yields_dimensions() {
        let payload = png_bytes(2, 3);
        let (media_type, details) = inspect_payload("image/png", &payload);

        assert_eq!(media_type, "image");
        assert_eq!(details["width"], 2);
        assert_eq!(details["height"], 3);
        assert_eq!(details["filesize"], payload.len());
    }

    #[test]
    fn undecodable_image_keeps_family_with_empty_details() {
        let (media_type, details) = inspect_payload("image/jpeg", b"not an image");
        assert_eq!(media_type, "image");
        assert_eq!(details, serde_json::json!({}));
    }

    #[test]
    fn non_image_is_generic_file() {
        let (media_type, details) = inspect_payload("application/pdf", b"%PDF-1.4");
        assert_eq!(media_type, "file");
        assert_eq!(details, serde_json::json!({}));
    }
}
