//! Audio index collaborator boundary.
//!
//! The generator consults this only when audio attachment is enabled;
//! how the index is populated (network fetch, manifest file) is outside
//! the core.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Resolves recorded audio for chapters.
pub trait AudioIndex {
    /// Reader identifiers known for a translation.
    fn readers(&self, translation: &str) -> Vec<String>;

    /// Resolved audio URL for one (translation, book, chapter, reader),
    /// or `None` when absent.
    fn resolve(&self, translation: &str, book: &str, chapter: u32, reader: &str) -> Option<String>;
}

/// In-memory audio index backed by explicit entries.
#[derive(Debug, Default)]
pub struct StaticAudioIndex {
    entries: HashMap<(String, String, u32, String), String>,
    readers: BTreeMap<String, BTreeSet<String>>,
}

impl StaticAudioIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        translation: impl Into<String>,
        book: impl Into<String>,
        chapter: u32,
        reader: impl Into<String>,
        url: impl Into<String>,
    ) {
        let translation = translation.into();
        let reader = reader.into();
        self.readers
            .entry(translation.clone())
            .or_default()
            .insert(reader.clone());
        self.entries
            .insert((translation, book.into(), chapter, reader), url.into());
    }
}

impl AudioIndex for StaticAudioIndex {
    fn readers(&self, translation: &str) -> Vec<String> {
        self.readers
            .get(translation)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn resolve(&self, translation: &str, book: &str, chapter: u32, reader: &str) -> Option<String> {
        self.entries
            .get(&(
                translation.to_string(),
                book.to_string(),
                chapter,
                reader.to_string(),
            ))
            .cloned()
    }
}
