use serde::Serialize;

use crate::builder::PlaylistEntry;

/// Ordered entries plus a cursor that stays within `[0, len-1]`.
///
/// Replaced wholesale on every fetch; entries are never edited in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
    cursor: usize,
}

impl Playlist {
    pub fn new(entries: Vec<PlaylistEntry>) -> Self {
        Self { entries, cursor: 0 }
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<&PlaylistEntry> {
        self.entries.get(self.cursor)
    }

    /// Move the cursor to `index`. Out-of-range indices leave it where it is.
    pub fn seek(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.cursor = index;
        true
    }
}
