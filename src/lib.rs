//! Rsimilar - find tracks similar to a seed song
//!
//! This library asks Last.fm for tracks similar to a (song, artist) pair and
//! falls back to fuzzy search and spelling variants when the seed is unknown.

/// Client modules for interacting with external services and local storage
pub mod clients;
/// Deduplication and remix-first ranking
pub mod ranking;
/// The fallback pipeline, retry flow and session state
pub mod recommender;
/// Artist and title query variants
pub mod variations;
