//! Document path synthesis.
//!
//! The scheme is a compatibility contract and must be reproduced
//! bit-exactly:
//!
//! ```text
//! /bible/available_translations
//! /bible/{translationId}/books
//! /bible/{translationId}/{bookSegment}/{chapterNumber}.json
//! ```
//!
//! The book segment is the book's common name or canonical id — a
//! run-level configuration choice, never a per-book one.

/// Path of the mergeable cross-translation index.
pub const TRANSLATIONS_PATH: &str = "/bible/available_translations";

/// Path of one translation's book index.
pub fn books_path(translation_id: &str) -> String {
    format!("/bible/{translation_id}/books")
}

/// Path of one chapter document.
pub fn chapter_path(translation_id: &str, book_segment: &str, chapter: u32) -> String {
    format!("/bible/{translation_id}/{book_segment}/{chapter}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_the_compatibility_scheme() {
        assert_eq!(TRANSLATIONS_PATH, "/bible/available_translations");
        assert_eq!(books_path("bsb"), "/bible/bsb/books");
        assert_eq!(chapter_path("bsb", "Genesis", 1), "/bible/bsb/Genesis/1.json");
        assert_eq!(chapter_path("bsb", "GEN", 50), "/bible/bsb/GEN/50.json");
    }
}
