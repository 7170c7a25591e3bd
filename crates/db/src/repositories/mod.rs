//! Repository implementations for data access.

mod media;

pub use media::SeaOrmMediaRepository;
