//! Object storage facade backed by Apache OpenDAL.

mod config;
mod error;
mod service;

pub use config::{StorageBackend, StorageConfig};
pub use error::StorageError;
pub use service::{StorageService, sanitize_filename};
