//! Media pipeline error types.

use thiserror::Error;

use crate::capability::Denial;
use crate::storage::StorageError;

/// Media pipeline errors.
///
/// Covers the full taxonomy: validation (malformed request, never
/// reaches storage), integrity (declared digest mismatch),
/// authorization (capability denial) and storage (ingestion failure
/// after validation, the only server-fault class).
#[derive(Debug, Error)]
pub enum MediaError {
    /// Upload body is empty.
    #[error("no data supplied")]
    NoData,

    /// Upload carries no content type.
    #[error("no Content-Type supplied")]
    NoContentType,

    /// Upload carries no filename-bearing disposition.
    #[error("no Content-Disposition supplied")]
    NoContentDisposition,

    /// Declared Content-MD5 does not match the payload digest.
    #[error("Content-MD5 hash does not match the received data")]
    HashMismatch,

    /// Identity lacks the upload-files capability.
    #[error("sorry, you are not allowed to create new media")]
    CannotCreate,

    /// Identity lacks edit capability on the target resource.
    #[error("sorry, you are not allowed to edit this resource")]
    CannotEdit,

    /// Identity lacks delete capability on the resource.
    #[error("sorry, you are not allowed to delete this resource")]
    CannotDelete,

    /// Requested context requires edit capability.
    #[error("sorry, you are not allowed to view this resource in the requested context")]
    ForbiddenContext,

    /// Attachment not found.
    #[error("attachment not found: {0}")]
    NotFound(i64),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl MediaError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Machine-readable error code, surfaced to API clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoData => "upload_no_data",
            Self::NoContentType => "upload_no_content_type",
            Self::NoContentDisposition => "upload_no_content_disposition",
            Self::HashMismatch => "upload_hash_mismatch",
            Self::CannotCreate => "cannot_create",
            Self::CannotEdit => "cannot_edit",
            Self::CannotDelete => "cannot_delete",
            Self::ForbiddenContext => "forbidden_context",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) | Self::Repository(_) => "storage_error",
        }
    }

    /// HTTP status code class for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NoData | Self::NoContentType | Self::NoContentDisposition | Self::CannotCreate => {
                400
            }
            Self::CannotEdit | Self::CannotDelete => 401,
            Self::ForbiddenContext => 403,
            Self::NotFound(_) => 404,
            Self::HashMismatch => 412,
            Self::Storage(_) | Self::Repository(_) => 500,
        }
    }
}

impl From<Denial> for MediaError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::CannotCreate => Self::CannotCreate,
            Denial::CannotEdit => Self::CannotEdit,
            Denial::CannotDelete => Self::CannotDelete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_and_status_classes() {
        assert_eq!(MediaError::NoData.code(), "upload_no_data");
        assert_eq!(MediaError::NoData.status_code(), 400);
        assert_eq!(MediaError::NoContentType.code(), "upload_no_content_type");
        assert_eq!(MediaError::NoContentType.status_code(), 400);
        assert_eq!(
            MediaError::NoContentDisposition.code(),
            "upload_no_content_disposition"
        );
        assert_eq!(MediaError::NoContentDisposition.status_code(), 400);
        assert_eq!(MediaError::HashMismatch.code(), "upload_hash_mismatch");
        assert_eq!(MediaError::HashMismatch.status_code(), 412);
        assert_eq!(MediaError::CannotCreate.code(), "cannot_create");
        assert_eq!(MediaError::CannotCreate.status_code(), 400);
        assert_eq!(MediaError::CannotEdit.code(), "cannot_edit");
        assert_eq!(MediaError::CannotEdit.status_code(), 401);
        assert_eq!(MediaError::ForbiddenContext.status_code(), 403);
        assert_eq!(MediaError::NotFound(3).status_code(), 404);
        assert_eq!(MediaError::repository("boom").status_code(), 500);
        assert_eq!(MediaError::repository("boom").code(), "storage_error");
    }

    #[test]
    fn denial_maps_to_typed_error() {
        assert!(matches!(
            MediaError::from(Denial::CannotCreate),
            MediaError::CannotCreate
        ));
        assert!(matches!(
            MediaError::from(Denial::CannotEdit),
            MediaError::CannotEdit
        ));
        assert!(matches!(
            MediaError::from(Denial::CannotDelete),
            MediaError::CannotDelete
        ));
    }
}
