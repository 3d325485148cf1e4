//! Query variants sent to the catalog when the literal seed doesn't match.

/// Separators that join several credited artists ("Queen & David Bowie").
const ARTIST_SEPARATORS: [char; 3] = ['&', ',', ';'];

/// Artist strings to try, in request order.
///
/// The trimmed full name comes first, followed by the text before the first
/// occurrence of each separator present in the name. Blank entries and
/// duplicates are dropped, so an empty name yields nothing.
pub fn artist_queries(artist_name: &str) -> Vec<String> {
    let mut queries: Vec<String> = Vec::new();
    let mut push = |candidate: &str| {
        let candidate = candidate.trim();
        if !candidate.is_empty() && !queries.iter().any(|q| q == candidate) {
            queries.push(candidate.to_string());
        }
    };

    push(artist_name);
    for separator in ARTIST_SEPARATORS {
        if let Some((head, _)) = artist_name.split_once(separator) {
            push(head);
        }
    }
    queries
}

/// Lexical variants of a song title used when fuzzy search on the title
/// itself finds nothing.
pub fn spelling_variants(song: &str) -> [String; 5] {
    [
        song.to_lowercase(),
        song.to_uppercase(),
        format!("{song} (feat. [Artist])"),
        format!("{song} - Remix"),
        format!("{song} (Extended Version)"),
    ]
}
