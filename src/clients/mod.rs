/// Data entities for tracks and the retry queue
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Last.fm API client
pub mod lastfm;
/// Local storage using `DuckDB`
pub mod local_storage;

pub use lastfm::{LastFmClient, MetadataProvider};
pub use local_storage::LocalStorage;
