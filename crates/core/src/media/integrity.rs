//! Integrity checker: optional Content-MD5 verification.

use super::error::MediaError;

/// Verifies a declared Content-MD5 digest against the payload.
///
/// No declared digest is a pass-through. A declared digest is compared
/// hex-wise, case-insensitively, against the computed MD5 of the raw
/// payload; any difference, including a syntactically invalid declared
/// value, is a hash mismatch.
///
/// # Errors
///
/// Returns [`MediaError::HashMismatch`] when the declared digest does
/// not match.
pub fn verify_content_md5(payload: &[u8], declared: Option<&str>) -> Result<(), MediaError> {
    let Some(declared) = declared else {
        return Ok(());
    };

    let computed = format!("{:x}", md5::compute(payload));
    if declared.trim().eq_ignore_ascii_case(&computed) {
        Ok(())
    } else {
        Err(MediaError::HashMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_digest_passes() {
        assert!(verify_content_md5(b"anything", None).is_ok());
    }

    #[test]
    fn matching_digest_passes() {
        let digest = format!("{:x}", md5::compute(b"payload"));
        assert!(verify_content_md5(b"payload", Some(&digest)).is_ok());
    }

    #[test]
    fn uppercase_digest_passes() {
        let digest = format!("{:x}", md5::compute(b"payload")).to_uppercase();
        assert!(verify_content_md5(b"payload", Some(&digest)).is_ok());
    }

    #[test]
    fn wrong_digest_fails() {
        let digest = format!("{:x}", md5::compute(b"other"));
        let err = verify_content_md5(b"payload", Some(&digest)).unwrap_err();
        assert!(matches!(err, MediaError::HashMismatch));
    }

    #[test]
    fn malformed_digest_fails() {
        // Not valid hex, not the right length: still a mismatch, never a parse error.
        let err = verify_content_md5(b"payload", Some("abc123")).unwrap_err();
        assert!(matches!(err, MediaError::HashMismatch));
    }
}
