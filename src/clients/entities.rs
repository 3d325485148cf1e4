use std::collections::VecDeque;
use std::fmt;

/// A song identified by its title and artist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Track {
    pub title: String,
    pub artist: String,
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Track {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Key used to decide whether two tracks are the same song.
    /// Both fields are trimmed and lower-cased.
    pub fn normalized_key(&self) -> (String, String) {
        (
            self.title.trim().to_lowercase(),
            self.artist.trim().to_lowercase(),
        )
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.artist)
    }
}

/// Previously returned tracks that can seed a new search, head first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryQueue {
    tracks: VecDeque<Track>,
}

impl RetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track that the next retry will use
    pub fn peek_head(&self) -> Option<&Track> {
        self.tracks.front()
    }

    pub fn pop_head(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn to_vec(&self) -> Vec<Track> {
        self.tracks.iter().cloned().collect()
    }
}

impl From<Vec<Track>> for RetryQueue {
    fn from(tracks: Vec<Track>) -> Self {
        RetryQueue {
            tracks: tracks.into(),
        }
    }
}

impl From<&[Track]> for RetryQueue {
    fn from(tracks: &[Track]) -> Self {
        RetryQueue {
            tracks: tracks.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_key_trims_and_lowercases() {
        let a = Track::new("  Bohemian Rhapsody ", "QUEEN");
        let b = Track::new("bohemian rhapsody", " queen");
        assert_eq!(a.normalized_key(), b.normalized_key());
        assert_ne!(a, b);
    }

    #[test]
    fn test_retry_queue_pops_in_order() {
        let mut queue = RetryQueue::from(vec![Track::new("A", "1"), Track::new("B", "2")]);
        assert_eq!(queue.peek_head(), Some(&Track::new("A", "1")));
        assert_eq!(queue.pop_head(), Some(Track::new("A", "1")));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_head(), Some(Track::new("B", "2")));
        assert!(queue.is_empty());
        assert_eq!(queue.pop_head(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Track::new("Song", "Band").to_string(), "Song by Band");
    }
}
