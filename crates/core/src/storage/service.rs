//! Storage service implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};

use super::config::{StorageBackend, StorageConfig};
use super::error::StorageError;

/// Storage service for attachment payloads.
///
/// Thin facade over an OpenDAL operator: persist bytes under a key,
/// read them back, and resolve the public URL for a stored key.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.backend)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from backend config.
    fn create_operator(backend: &StorageBackend) -> Result<Operator, StorageError> {
        match backend {
            StorageBackend::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageBackend::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageBackend::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageBackend::Memory => {
                let builder = services::Memory::default();

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Persist a byte payload under the given key.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn store(&self, key: &str, payload: Bytes) -> Result<(), StorageError> {
        self.operator
            .write(key, payload)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Read a stored payload back.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or the read fails.
    pub async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        let buffer = self.operator.read(key).await.map_err(StorageError::from)?;
        Ok(buffer.to_bytes())
    }

    /// Delete a stored object.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check whether an object exists under the given key.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Resolve the public URL for a stored key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            key
        )
    }

    /// Base URL under which stored objects are publicly resolvable.
    #[must_use]
    pub fn public_base_url(&self) -> &str {
        self.config.public_base_url.trim_end_matches('/')
    }

    /// Get the backend name.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.config.backend.name()
    }
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("backend", &self.config.backend.name())
            .field("public_base_url", &self.config.public_base_url)
            .finish_non_exhaustive()
    }
}

/// Sanitize a client-declared filename for use in a storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and
/// underscores; everything else becomes an underscore.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_service() -> StorageService {
        StorageService::from_config(StorageConfig::memory("http://localhost:8080/files"))
            .expect("memory backend should initialize")
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("canola.jpg"), "canola.jpg");
        assert_eq!(sanitize_filename("my file (1).png"), "my_file__1_.png");
        assert_eq!(sanitize_filename("test@#$%.gif"), "test____.gif");
        assert_eq!(sanitize_filename("日本語.jpg"), "___.jpg");
    }

    #[test]
    fn test_public_url_joins_key() {
        let service = memory_service();
        assert_eq!(
            service.public_url("2026/08/canola.jpg"),
            "http://localhost:8080/files/2026/08/canola.jpg"
        );
    }

    #[test]
    fn test_public_url_trims_trailing_slash() {
        let service =
            StorageService::from_config(StorageConfig::memory("http://localhost:8080/files/"))
                .expect("memory backend should initialize");
        assert_eq!(
            service.public_url("a.png"),
            "http://localhost:8080/files/a.png"
        );
    }

    #[tokio::test]
    async fn test_store_read_roundtrip() {
        let service = memory_service();
        let payload = Bytes::from_static(b"hello bytes");

        service.store("2026/08/a.bin", payload.clone()).await.unwrap();
        assert!(service.exists("2026/08/a.bin").await);

        let read_back = service.read("2026/08/a.bin").await.unwrap();
        assert_eq!(read_back, payload);
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let service = memory_service();
        service
            .store("x.bin", Bytes::from_static(b"x"))
            .await
            .unwrap();

        service.delete("x.bin").await.unwrap();
        assert!(!service.exists("x.bin").await);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let service = memory_service();
        let err = service.read("missing.bin").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
