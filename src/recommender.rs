//! Recommendation pipeline.
//!
//! A seed (song, artist) goes through a chain of increasingly loose lookups,
//! stopping at the first one that yields tracks:
//! 1. similar tracks for the seed, once per artist query variant
//! 2. fuzzy search for the seed, then similar tracks for each match
//! 3. fuzzy search for spelling variants of the title, then similar tracks
//!    for the matches (or the matches themselves)
//!
//! Provider failures on a single request are logged and skipped. An exhausted
//! chain is an empty list, not an error.

use log::{debug, info, warn};

use crate::clients::{
    LastFmClient, LocalStorage, MetadataProvider,
    entities::{RetryQueue, Track},
    errors::{Result, RetryError},
};
use crate::ranking::{filter_duplicates, prioritize_remixes};
use crate::variations::{artist_queries, spelling_variants};

/// Matches requested per artist variant in a fuzzy search
pub const SEARCH_CANDIDATES: usize = 5;

// Configuration for the Recommender and the commands around it
pub struct Config {
    pub lastfm: LastFmClient,
    pub storage: LocalStorage,
}

pub struct ConfigBuilder {
    lastfm: Option<LastFmClient>,
    storage: Option<LocalStorage>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            lastfm: None,
            storage: None,
        }
    }

    pub async fn build(self) -> Result<Config> {
        let lastfm = match self.lastfm {
            Some(l) => l,
            None => LastFmClient::try_default()?,
        };
        let storage = match self.storage {
            Some(s) => s,
            None => LocalStorage::try_default().await?,
        };
        Ok(Config { lastfm, storage })
    }
}

pub struct Recommender<P> {
    provider: P,
}

impl<P: MetadataProvider> Recommender<P> {
    pub fn new(provider: P) -> Self {
        Recommender { provider }
    }

    /// Similar tracks for `song`, trying each artist variant in turn.
    ///
    /// Results from successive variants are concatenated until `limit` is
    /// reached. Without an artist no request is made.
    pub async fn get_similar_tracks(
        &self,
        song: &str,
        artist: Option<&str>,
        limit: usize,
    ) -> Vec<Track> {
        let mut recommendations = Vec::new();
        if limit == 0 {
            return recommendations;
        }

        for query in artist_queries(artist.unwrap_or_default()) {
            match self.provider.similar_tracks(song, &query).await {
                Ok(tracks) if !tracks.is_empty() => {
                    debug!("{} similar tracks for {song} - {query}", tracks.len());
                    recommendations.extend(tracks);
                    if recommendations.len() >= limit {
                        break;
                    }
                }
                Ok(_) => debug!("No similar tracks for {song} - {query}"),
                Err(e) => warn!("Skipping similar tracks for {song} - {query}: {e}"),
            }
        }

        recommendations.truncate(limit);
        recommendations
    }

    /// Fuzzy search for `song` combined with each artist variant.
    /// Matches from all variants are returned, duplicates included.
    pub async fn search_alternative_tracks(&self, song: &str, artist: Option<&str>) -> Vec<Track> {
        let mut alternatives = Vec::new();

        for query in artist_queries(artist.unwrap_or_default()) {
            let text = format!("{song} {query}");
            match self.provider.search_tracks(&text, SEARCH_CANDIDATES).await {
                Ok(tracks) => {
                    debug!("{} search matches for {text:?}", tracks.len());
                    alternatives.extend(tracks);
                }
                Err(e) => warn!("Skipping track search for {text:?}: {e}"),
            }
        }
        alternatives
    }

    /// Similar tracks of the first alternative that has any.
    pub async fn search_recursive_alternatives(
        &self,
        alternatives: &[Track],
        limit: usize,
    ) -> Vec<Track> {
        for alternative in alternatives {
            let recs = self
                .get_similar_tracks(&alternative.title, Some(&alternative.artist), limit)
                .await;
            if !recs.is_empty() {
                debug!("Alternative {alternative} produced {} tracks", recs.len());
                return recs;
            }
        }
        Vec::new()
    }

    /// Fuzzy search on spelling variants of `song`; the first variant with
    /// matches wins and its matches come back deduplicated, remixes first.
    pub async fn try_alternative_spellings(&self, song: &str, artist: Option<&str>) -> Vec<Track> {
        for variant in spelling_variants(song) {
            let recs = self.search_alternative_tracks(&variant, artist).await;
            if recs.is_empty() {
                continue;
            }
            let recs = prioritize_remixes(filter_duplicates(recs));
            if !recs.is_empty() {
                debug!("Spelling {variant:?} matched {} tracks", recs.len());
                return recs;
            }
        }
        Vec::new()
    }

    /// Up to `limit` distinct tracks similar to `song` by `artist`.
    ///
    /// Similarity results keep the provider's order; only spelling-variant
    /// matches are ranked remixes first.
    pub async fn get_recommendations(&self, song: &str, artist: &str, limit: usize) -> Vec<Track> {
        info!("Fetching recommendations for {song} - {artist} (limit {limit})");
        let mut recs = self.get_similar_tracks(song, Some(artist), limit).await;

        if recs.is_empty() {
            info!("No direct matches, searching alternatives ...");
            let alternatives = self.search_alternative_tracks(song, Some(artist)).await;
            if !alternatives.is_empty() {
                recs = self.search_recursive_alternatives(&alternatives, limit).await;
            }
        }

        if recs.is_empty() {
            info!("No alternative matches, trying spelling variants ...");
            let spelled = self.try_alternative_spellings(song, Some(artist)).await;
            for track in &spelled {
                if recs.len() >= limit {
                    break;
                }
                let similar = self
                    .get_similar_tracks(&track.title, Some(&track.artist), limit)
                    .await;
                recs.extend(similar);
            }
            if recs.is_empty() {
                recs = spelled;
            }
        }

        let mut recs = filter_duplicates(recs);
        recs.truncate(limit);
        info!("Found {} recommendations", recs.len());
        recs
    }

    /// Re-seeds from the head of `queue`.
    ///
    /// The head is always removed when present. On success the new list is
    /// returned; otherwise the returned list is what remains of the queue.
    pub async fn retry_with_first_result(
        &self,
        queue: &mut RetryQueue,
        limit: usize,
    ) -> (Vec<Track>, Option<RetryError>) {
        let Some(first) = queue.pop_head() else {
            return (Vec::new(), Some(RetryError::EmptyQueue));
        };

        info!("Retrying with {first}");
        let similar = self
            .get_similar_tracks(&first.title, Some(&first.artist), limit)
            .await;
        if similar.is_empty() {
            (queue.to_vec(), Some(RetryError::NoResults))
        } else {
            (similar, None)
        }
    }
}

/// What a front end keeps between calls: the list on display and the queue
/// of tracks a retry can start from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub recommendations: Vec<Track>,
    pub retry_queue: RetryQueue,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session resuming from a previously saved list
    pub fn from_saved(tracks: Vec<Track>) -> Self {
        Session {
            retry_queue: RetryQueue::from(tracks.as_slice()),
            recommendations: tracks,
        }
    }

    /// Runs the primary flow. A non-empty result replaces the list and
    /// re-seeds the queue; an empty one leaves the session untouched.
    pub async fn recommend<P: MetadataProvider>(
        &mut self,
        recommender: &Recommender<P>,
        song: &str,
        artist: &str,
        limit: usize,
    ) -> &[Track] {
        let recs = recommender.get_recommendations(song, artist, limit).await;
        if recs.is_empty() {
            return &[];
        }
        self.replace(recs);
        &self.recommendations
    }

    pub async fn retry<P: MetadataProvider>(
        &mut self,
        recommender: &Recommender<P>,
        limit: usize,
    ) -> Result<&[Track], RetryError> {
        let (recs, err) = recommender
            .retry_with_first_result(&mut self.retry_queue, limit)
            .await;
        match err {
            Some(err) => Err(err),
            None => {
                self.replace(recs);
                Ok(&self.recommendations)
            }
        }
    }

    pub fn stop_retries(&mut self) {
        self.retry_queue.clear();
    }

    fn replace(&mut self, recs: Vec<Track>) {
        self.retry_queue = RetryQueue::from(recs.as_slice());
        self.recommendations = recs;
    }
}
