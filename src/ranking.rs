//! Post-processing applied to merged candidate lists.

use std::collections::HashSet;

use crate::clients::entities::Track;

/// Title fragments that mark a track as a remix or alternate version.
pub const REMIX_KEYWORDS: [&str; 6] = [
    "remix",
    "version",
    "extended",
    "radio edit",
    "club mix",
    "reprise",
];

/// Drops every track whose normalized (title, artist) was already seen,
/// keeping the first occurrence in place.
pub fn filter_duplicates(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|track| seen.insert(track.normalized_key()))
        .collect()
}

pub fn contains_remix_keywords(title: &str) -> bool {
    let title = title.to_lowercase();
    REMIX_KEYWORDS.iter().any(|keyword| title.contains(keyword))
}

/// Moves remix-tagged tracks ahead of the rest. Stable within both groups.
pub fn prioritize_remixes(mut tracks: Vec<Track>) -> Vec<Track> {
    tracks.sort_by_key(|track| !contains_remix_keywords(&track.title));
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(title: &str, artist: &str) -> Track {
        Track::new(title, artist)
    }

    #[test]
    fn test_filter_duplicates_keeps_first_seen() {
        let tracks = vec![t("A", "1"), t("B", "2"), t("A", "1")];
        assert_eq!(filter_duplicates(tracks), vec![t("A", "1"), t("B", "2")]);
    }

    #[test]
    fn test_filter_duplicates_normalizes_case_and_whitespace() {
        let tracks = vec![t("Hello ", "Adele"), t("hello", " ADELE"), t("Hello", "Lionel Richie")];
        assert_eq!(
            filter_duplicates(tracks),
            vec![t("Hello ", "Adele"), t("Hello", "Lionel Richie")]
        );
    }

    #[test]
    fn test_filter_duplicates_is_idempotent() {
        let tracks = vec![t("x", "a"), t("X", "A"), t("y", "b"), t("x ", "a"), t("z", "c")];
        let once = filter_duplicates(tracks);
        let twice = filter_duplicates(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_contains_remix_keywords() {
        assert!(contains_remix_keywords("Blue (Da Ba Dee) - Gabry Ponte REMIX"));
        assert!(contains_remix_keywords("One More Time (Radio Edit)"));
        assert!(contains_remix_keywords("Intro - Reprise"));
        assert!(contains_remix_keywords("Song (Club Mix)"));
        assert!(!contains_remix_keywords("Bohemian Rhapsody"));
        assert!(!contains_remix_keywords("Mixtape"));
    }

    #[test]
    fn test_prioritize_remixes_is_stable() {
        let tracks = vec![
            t("Song Remix", "X"),
            t("Plain Song", "Y"),
            t("Another Remix", "Z"),
        ];
        assert_eq!(
            prioritize_remixes(tracks),
            vec![
                t("Song Remix", "X"),
                t("Another Remix", "Z"),
                t("Plain Song", "Y"),
            ]
        );
    }

    #[test]
    fn test_prioritize_remixes_ignores_keyword_count() {
        let tracks = vec![
            t("Plain", "A"),
            t("Remix", "B"),
            t("Extended Remix Version", "C"),
            t("Other", "D"),
        ];
        assert_eq!(
            prioritize_remixes(tracks),
            vec![
                t("Remix", "B"),
                t("Extended Remix Version", "C"),
                t("Plain", "A"),
                t("Other", "D"),
            ]
        );
    }
}
