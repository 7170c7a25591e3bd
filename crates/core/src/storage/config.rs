//! Storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageBackend {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-memory storage (tests)
    Memory,
}

impl StorageBackend {
    /// Create an S3-compatible backend (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create an Azure Blob Storage backend.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Create a local filesystem backend (development).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the backend name for logging and records.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend configuration.
    pub backend: StorageBackend,
    /// Base URL under which stored objects are publicly resolvable.
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create a new storage config.
    #[must_use]
    pub fn new(backend: StorageBackend, public_base_url: impl Into<String>) -> Self {
        Self {
            backend,
            public_base_url: public_base_url.into(),
        }
    }

    /// In-memory config for tests.
    #[must_use]
    pub fn memory(public_base_url: impl Into<String>) -> Self {
        Self::new(StorageBackend::Memory, public_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names() {
        assert_eq!(
            StorageBackend::s3("https://e", "b", "ak", "sk", "auto").name(),
            "s3"
        );
        assert_eq!(
            StorageBackend::azure_blob("acct", "key", "media").name(),
            "azure_blob"
        );
        assert_eq!(StorageBackend::local_fs("./uploads").name(), "local");
        assert_eq!(StorageBackend::Memory.name(), "memory");
    }
}
