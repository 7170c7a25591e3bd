//! Upload validator: ordered header/body checks, first failure wins.

use super::error::MediaError;
use super::types::{UploadRequest, ValidatedUpload};

/// Validates an inbound upload.
///
/// Checks run in strict order so the caller always receives the
/// cheapest, most fundamental failure:
/// 1. non-empty body
/// 2. declared content type
/// 3. filename-bearing disposition
///
/// # Errors
///
/// Returns the first failing check as a typed [`MediaError`].
pub fn validate(req: &UploadRequest) -> Result<ValidatedUpload, MediaError> {
    if req.body.is_empty() {
        return Err(MediaError::NoData);
    }

    let mime_type = req
        .content_type
        .as_deref()
        .map(parse_mime_type)
        .filter(|mime| !mime.is_empty())
        .ok_or(MediaError::NoContentType)?;

    let filename = req
        .content_disposition
        .as_deref()
        .and_then(parse_disposition_filename)
        .ok_or(MediaError::NoContentDisposition)?;

    Ok(ValidatedUpload {
        mime_type,
        filename,
    })
}

/// Strips parameters from a Content-Type value (`image/jpeg; charset=x`
/// becomes `image/jpeg`).
fn parse_mime_type(raw: &str) -> String {
    raw.split(';').next().unwrap_or("").trim().to_string()
}

/// Extracts the filename from a Content-Disposition value.
///
/// Accepts `filename=canola.jpg`, quoted filenames, and an optional
/// leading `attachment;` token. Path components are discarded. Returns
/// `None` when no non-empty filename can be parsed.
pub(crate) fn parse_disposition_filename(raw: &str) -> Option<String> {
    for part in raw.split(';') {
        let part = part.trim();
        let Some((param, value)) = part.split_once('=') else {
            continue;
        };
        if !param.trim().eq_ignore_ascii_case("filename") {
            continue;
        }

        let value = value.trim().trim_matches('"');
        // Drop any client-supplied path components.
        let name = value
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(value)
            .trim()
            .to_string();
        if !name.is_empty() {
            return Some(name);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use rstest::rstest;

    fn upload(
        body: &'static [u8],
        content_type: Option<&str>,
        disposition: Option<&str>,
    ) -> UploadRequest {
        UploadRequest {
            body: Bytes::from_static(body),
            content_type: content_type.map(String::from),
            content_disposition: disposition.map(String::from),
            ..UploadRequest::default()
        }
    }

    #[test]
    fn empty_body_reported_first() {
        // Even with every header missing, the empty body wins.
        let err = validate(&upload(b"", None, None)).unwrap_err();
        assert!(matches!(err, MediaError::NoData));
    }

    #[test]
    fn missing_content_type_precedes_missing_disposition() {
        let err = validate(&upload(b"payload", None, None)).unwrap_err();
        assert!(matches!(err, MediaError::NoContentType));
    }

    #[test]
    fn missing_disposition_reported_last() {
        let err = validate(&upload(b"payload", Some("image/jpeg"), None)).unwrap_err();
        assert!(matches!(err, MediaError::NoContentDisposition));
    }

    #[test]
    fn disposition_without_filename_fails() {
        let err =
            validate(&upload(b"payload", Some("image/jpeg"), Some("attachment"))).unwrap_err();
        assert!(matches!(err, MediaError::NoContentDisposition));
    }

    #[test]
    fn valid_upload_passes() {
        let validated = validate(&upload(
            b"payload",
            Some("image/jpeg"),
            Some("filename=canola.jpg"),
        ))
        .unwrap();
        assert_eq!(validated.mime_type, "image/jpeg");
        assert_eq!(validated.filename, "canola.jpg");
    }

    #[test]
    fn mime_parameters_are_stripped() {
        let validated = validate(&upload(
            b"payload",
            Some("image/png; charset=binary"),
            Some("filename=a.png"),
        ))
        .unwrap();
        assert_eq!(validated.mime_type, "image/png");
    }

    #[rstest]
    #[case("filename=canola.jpg", Some("canola.jpg"))]
    #[case("attachment; filename=canola.jpg", Some("canola.jpg"))]
    #[case("attachment; filename=\"canola.jpg\"", Some("canola.jpg"))]
    #[case("ATTACHMENT; FILENAME=canola.jpg", Some("canola.jpg"))]
    #[case("attachment; filename=/tmp/canola.jpg", Some("canola.jpg"))]
    #[case("attachment; filename=C:\\tmp\\canola.jpg", Some("canola.jpg"))]
    #[case("attachment; filename=\"\"", None)]
    #[case("attachment", None)]
    #[case("inline; name=field", None)]
    fn disposition_filename_parsing(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            parse_disposition_filename(raw).as_deref(),
            expected,
            "raw: {raw}"
        );
    }
}
