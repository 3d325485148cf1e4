use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::clients::{
    entities::Track,
    errors::{Error, Result},
};

const LASTFM_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// Source of similarity and search results for the recommender.
///
/// Requests are awaited one at a time by the caller; implementations don't
/// need to be shareable across tasks.
#[allow(async_fn_in_trait)]
pub trait MetadataProvider {
    /// Tracks the catalog considers similar to `title` by `artist`.
    /// An unknown track yields an empty list, not an error.
    async fn similar_tracks(&self, title: &str, artist: &str) -> Result<Vec<Track>>;

    /// Free-text track search returning at most `limit` matches.
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>>;
}

// Last.fm returns a bare object instead of a one-element array when there is a single match
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize, Debug)]
struct LastFMAPIArtist {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize, Debug)]
struct LastFMAPISimilarTrack {
    #[serde(default)]
    name: String,
    artist: LastFMAPIArtist,
}

#[derive(Deserialize, Debug)]
struct SimilarTracks {
    #[serde(default)]
    track: OneOrMany<LastFMAPISimilarTrack>,
}

#[derive(Deserialize, Debug)]
struct SimilarTracksResponse {
    similartracks: Option<SimilarTracks>,
}

#[derive(Deserialize, Debug)]
struct LastFMAPITrack {
    #[serde(default)]
    name: String,
    #[serde(default)]
    artist: String,
}

#[derive(Deserialize, Debug)]
struct Tracks {
    #[serde(default)]
    track: OneOrMany<LastFMAPITrack>,
}

#[derive(Deserialize, Debug)]
struct TrackMatches {
    trackmatches: Option<Tracks>,
}

#[derive(Deserialize, Debug)]
struct TrackSearchResponse {
    results: Option<TrackMatches>,
}

#[derive(Deserialize, Debug)]
struct LastFMAPIError {
    error: u32,
    #[serde(default)]
    message: String,
}

// Error envelopes can come back with a 200 status, so check the body first
fn decode_payload<T: DeserializeOwned>(payload: Value) -> Result<T> {
    if payload.get("error").is_some() {
        let err: LastFMAPIError = serde_json::from_value(payload)?;
        return Err(Error::LastFMError {
            code: err.error,
            message: err.message,
        });
    }
    Ok(serde_json::from_value(payload)?)
}

fn non_empty(track: &Track) -> bool {
    !track.title.trim().is_empty() && !track.artist.trim().is_empty()
}

/// Extract tracks from a `track.getsimilar` response body
pub fn parse_similar_tracks(payload: Value) -> Result<Vec<Track>> {
    let response: SimilarTracksResponse = decode_payload(payload)?;
    let tracks: Vec<LastFMAPISimilarTrack> = response
        .similartracks
        .map(|s| s.track.into())
        .unwrap_or_default();

    Ok(tracks
        .into_iter()
        .map(|t| Track::new(t.name, t.artist.name))
        .filter(non_empty)
        .collect())
}

/// Extract tracks from a `track.search` response body
pub fn parse_track_matches(payload: Value) -> Result<Vec<Track>> {
    let response: TrackSearchResponse = decode_payload(payload)?;
    let tracks: Vec<LastFMAPITrack> = response
        .results
        .and_then(|r| r.trackmatches)
        .map(|m| m.track.into())
        .unwrap_or_default();

    Ok(tracks
        .into_iter()
        .map(|t| Track::new(t.name, t.artist))
        .filter(non_empty)
        .collect())
}

pub struct LastFmClient {
    http: Client,
    api_key: String,
}

impl LastFmClient {
    pub fn new(http: Client, api_key: String) -> Self {
        LastFmClient { http, api_key }
    }

    // Create a LastFmClient from LASTFM_API_KEY or raise a configuration error
    pub fn try_default() -> Result<Self> {
        let api_key = std::env::var("LASTFM_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::ConfigurationError(
                    "Missing LASTFM_API_KEY in environment variables or .env file".into(),
                )
            })?;
        let http = Client::builder()
            .user_agent(concat!("rsimilar/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(LastFmClient::new(http, api_key))
    }

    async fn call(&self, params: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .http
            .get(LASTFM_API_BASE)
            .query(params)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(payload) => Ok(payload),
            Err(_) if !status.is_success() => Err(Error::LastFMUnexpectedResponse(format!(
                "status {status}"
            ))),
            Err(e) => Err(Error::LastFMDeserializationError(e)),
        }
    }
}

impl MetadataProvider for LastFmClient {
    async fn similar_tracks(&self, title: &str, artist: &str) -> Result<Vec<Track>> {
        debug!("track.getsimilar: {title} - {artist}");
        let payload = self
            .call(&[
                ("method", "track.getsimilar"),
                ("track", title),
                ("artist", artist),
            ])
            .await?;
        parse_similar_tracks(payload)
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>> {
        debug!("track.search: {query} (limit {limit})");
        let limit = limit.to_string();
        let payload = self
            .call(&[
                ("method", "track.search"),
                ("track", query),
                ("limit", limit.as_str()),
            ])
            .await?;
        parse_track_matches(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_similar_tracks() {
        let payload = json!({
            "similartracks": {
                "track": [
                    {"name": "Somebody to Love", "artist": {"name": "Queen", "mbid": ""}, "match": 1.0},
                    {"name": "Stairway to Heaven", "artist": {"name": "Led Zeppelin"}, "match": 0.8}
                ],
                "@attr": {"artist": "Queen"}
            }
        });

        let tracks = parse_similar_tracks(payload).unwrap();
        assert_eq!(
            tracks,
            vec![
                Track::new("Somebody to Love", "Queen"),
                Track::new("Stairway to Heaven", "Led Zeppelin"),
            ]
        );
    }

    #[test]
    fn test_parse_similar_tracks_missing_section_is_empty() {
        assert!(parse_similar_tracks(json!({})).unwrap().is_empty());
        assert!(
            parse_similar_tracks(json!({"similartracks": {"track": []}}))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_parse_similar_tracks_drops_blank_entries() {
        let payload = json!({
            "similartracks": {
                "track": [
                    {"name": "", "artist": {"name": "Queen"}},
                    {"name": "Heroes", "artist": {"name": "  "}},
                    {"name": "Heroes", "artist": {"name": "David Bowie"}}
                ]
            }
        });
        assert_eq!(
            parse_similar_tracks(payload).unwrap(),
            vec![Track::new("Heroes", "David Bowie")]
        );
    }

    #[test]
    fn test_parse_track_matches_list() {
        let payload = json!({
            "results": {
                "opensearch:totalResults": "2",
                "trackmatches": {
                    "track": [
                        {"name": "Believe", "artist": "Cher", "listeners": "100"},
                        {"name": "Believe (Remix)", "artist": "Cher"}
                    ]
                }
            }
        });
        assert_eq!(
            parse_track_matches(payload).unwrap(),
            vec![Track::new("Believe", "Cher"), Track::new("Believe (Remix)", "Cher")]
        );
    }

    #[test]
    fn test_parse_track_matches_single_object() {
        let payload = json!({
            "results": {
                "trackmatches": {
                    "track": {"name": "Believe", "artist": "Cher"}
                }
            }
        });
        assert_eq!(
            parse_track_matches(payload).unwrap(),
            vec![Track::new("Believe", "Cher")]
        );
    }

    #[test]
    fn test_api_error_envelope() {
        let payload = json!({"error": 6, "message": "Track not found"});
        match parse_similar_tracks(payload) {
            Err(Error::LastFMError { code, message }) => {
                assert_eq!(code, 6);
                assert_eq!(message, "Track not found");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_body_is_deserialization_error() {
        let payload = json!({"results": {"trackmatches": {"track": 42}}});
        assert!(matches!(
            parse_track_matches(payload),
            Err(Error::LastFMDeserializationError(_))
        ));
    }
}
