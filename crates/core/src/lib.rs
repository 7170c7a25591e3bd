//! Core business logic for Leafpress.
//!
//! This crate contains the media upload ingestion pipeline:
//! capability gate, upload validator, integrity checker, attachment
//! ingestor and resource presenter, plus the object-storage facade.
//! It has no web or database dependencies; persistence and identity
//! resolution are injected through traits.

pub mod capability;
pub mod media;
pub mod storage;
