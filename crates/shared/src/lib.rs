//! Shared types and configuration for Leafpress.
//!
//! This crate provides common types used across all other crates:
//! - Pagination types for list endpoints
//! - Configuration management
//! - JWT token handling

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::{PageMeta, PageRequest, PageResponse};
