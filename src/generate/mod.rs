//! Generator: turns parsed books into the output document tree.
//!
//! Pure over its inputs: given the parsed books of one or more
//! translations, it produces a mapping from path to JSON-serializable
//! body and never touches storage. Chapter documents are independent,
//! order-insensitive units — only their *positions* in the canonical
//! ordering matter for navigation links, and those are known up front.

pub mod paths;

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audio::AudioIndex;
use crate::error::Result;
use crate::model::{Book, Chapter, ParsedBook, Translation};

/// Which form the book segment of chapter paths takes. A run-level
/// choice, not a per-book one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSegment {
    #[default]
    CommonName,
    Id,
}

/// Generation configuration.
#[derive(Default)]
pub struct GenerateOptions<'a> {
    pub book_segment: BookSegment,
    /// When set, chapter documents gain an audio-link map per reader.
    pub audio: Option<&'a dyn AudioIndex>,
    /// Restricts emitted documents by path, applied after path synthesis
    /// so navigation links still see the full book set.
    pub path_filter: Option<Regex>,
}

/// One entry of the output document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDoc {
    /// Unique path key, synthesized by [`paths`].
    pub path: String,
    pub content: Value,
    /// Mergeable documents may be combined across generation runs over
    /// disjoint translation sets instead of overwritten.
    pub mergeable: bool,
}

/// Body of the cross-translation availability index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationIndexDoc {
    pub translations: Vec<TranslationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationEntry {
    #[serde(flatten)]
    pub translation: Translation,
    pub available_formats: Vec<String>,
    pub list_of_books_api_link: String,
}

/// Body of one translation's book index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookIndexDoc {
    pub translation: Translation,
    pub books: Vec<BookEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookEntry {
    pub id: String,
    pub name: String,
    pub common_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub order: usize,
    pub number_of_chapters: usize,
    pub first_chapter_api_link: String,
}

/// Book identity carried on each chapter document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub common_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub order: usize,
}

/// Body of one chapter document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDoc {
    pub translation: Translation,
    pub book: BookSummary,
    pub chapter: Chapter,
    /// `null` at the natural boundaries of the translation's canon.
    pub previous_chapter_link: Option<String>,
    pub next_chapter_link: Option<String>,
    /// Reader id -> resolved audio URL. Absent entirely when audio
    /// attachment is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_links: Option<BTreeMap<String, String>>,
}

/// Merge two availability indexes: by translation id, last write wins,
/// result ordered by id so merge order never matters.
pub fn merge_translation_index(base: &mut TranslationIndexDoc, other: TranslationIndexDoc) {
    let mut by_id: BTreeMap<String, TranslationEntry> = base
        .translations
        .drain(..)
        .map(|e| (e.translation.id.clone(), e))
        .collect();
    for entry in other.translations {
        by_id.insert(entry.translation.id.clone(), entry);
    }
    base.translations = by_id.into_values().collect();
}

/// Split the document tree into fixed-size batches for a concurrent
/// sink. Documents are independent, so any partition is correct.
pub fn batched(docs: &[OutputDoc], size: usize) -> std::slice::Chunks<'_, OutputDoc> {
    docs.chunks(size.max(1))
}

/// Generate the complete document tree for one or more translations.
///
/// Fatal conditions (malformed translation metadata) abort the whole run;
/// there is no partial output.
pub fn generate(books: &[ParsedBook], options: &GenerateOptions<'_>) -> Result<Vec<OutputDoc>> {
    // Group by translation; BTreeMap keeps the index deterministic.
    let mut grouped: BTreeMap<&str, (&Translation, Vec<&Book>)> = BTreeMap::new();
    for parsed in books {
        grouped
            .entry(parsed.translation.id.as_str())
            .or_insert_with(|| (&parsed.translation, Vec::new()))
            .1
            .push(&parsed.book);
    }

    let mut docs = Vec::new();

    let mut index = TranslationIndexDoc {
        translations: Vec::new(),
    };
    for (id, (translation, books)) in &mut grouped {
        translation.validate()?;
        // Canonical order, not input order.
        books.sort_by_key(|b| b.order);
        index.translations.push(TranslationEntry {
            translation: (*translation).clone(),
            available_formats: vec!["json".to_string()],
            list_of_books_api_link: paths::books_path(id),
        });
    }
    docs.push(OutputDoc {
        path: paths::TRANSLATIONS_PATH.to_string(),
        content: serde_json::to_value(&index)?,
        mergeable: true,
    });

    for (id, (translation, books)) in &grouped {
        docs.push(book_index_doc(id, translation, books, options)?);
        generate_chapters(id, translation, books, options, &mut docs)?;
    }

    if let Some(filter) = &options.path_filter {
        docs.retain(|doc| filter.is_match(&doc.path));
    }
    Ok(docs)
}

fn segment<'a>(book: &'a Book, options: &GenerateOptions<'_>) -> &'a str {
    match options.book_segment {
        BookSegment::CommonName => &book.common_name,
        BookSegment::Id => &book.id,
    }
}

fn book_index_doc(
    id: &str,
    translation: &Translation,
    books: &[&Book],
    options: &GenerateOptions<'_>,
) -> Result<OutputDoc> {
    let entries = books
        .iter()
        .map(|book| {
            let first_chapter = book.chapters.first().map_or(1, |c| c.number);
            BookEntry {
                id: book.id.clone(),
                name: book.name.clone(),
                common_name: book.common_name.clone(),
                title: book.title.clone(),
                order: book.order,
                number_of_chapters: book.chapters.len(),
                first_chapter_api_link: paths::chapter_path(
                    id,
                    segment(book, options),
                    first_chapter,
                ),
            }
        })
        .collect();
    let body = BookIndexDoc {
        translation: translation.clone(),
        books: entries,
    };
    Ok(OutputDoc {
        path: paths::books_path(id),
        content: serde_json::to_value(&body)?,
        mergeable: false,
    })
}

fn generate_chapters(
    id: &str,
    translation: &Translation,
    books: &[&Book],
    options: &GenerateOptions<'_>,
    docs: &mut Vec<OutputDoc>,
) -> Result<()> {
    // Flatten the translation's chapters in canonical order; adjacency in
    // this sequence defines the navigation links, so the last chapter of
    // one book links forward into the next canonical book.
    let sequence: Vec<(usize, usize)> = books
        .iter()
        .enumerate()
        .flat_map(|(b, book)| (0..book.chapters.len()).map(move |c| (b, c)))
        .collect();

    let path_at = |i: usize| {
        let (b, c) = sequence[i];
        let book = books[b];
        paths::chapter_path(id, segment(book, options), book.chapters[c].number)
    };

    for (i, &(b, c)) in sequence.iter().enumerate() {
        let book = books[b];
        let chapter = &book.chapters[c];
        let audio_links = options.audio.map(|audio| {
            audio
                .readers(id)
                .into_iter()
                .filter_map(|reader| {
                    audio
                        .resolve(id, &book.id, chapter.number, &reader)
                        .map(|url| (reader, url))
                })
                .collect()
        });
        let body = ChapterDoc {
            translation: translation.clone(),
            book: BookSummary {
                id: book.id.clone(),
                name: book.name.clone(),
                common_name: book.common_name.clone(),
                title: book.title.clone(),
                order: book.order,
            },
            chapter: chapter.clone(),
            previous_chapter_link: (i > 0).then(|| path_at(i - 1)),
            next_chapter_link: (i + 1 < sequence.len()).then(|| path_at(i + 1)),
            audio_links,
        };
        docs.push(OutputDoc {
            path: path_at(i),
            content: serde_json::to_value(&body)?,
            mergeable: false,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> TranslationEntry {
        TranslationEntry {
            translation: Translation::new(id, id.to_uppercase())
                .with_website("https://example.org")
                .with_license_url("https://example.org/license"),
            available_formats: vec!["json".into()],
            list_of_books_api_link: paths::books_path(id),
        }
    }

    #[test]
    fn merge_is_order_insensitive_and_deduplicates() {
        let left = TranslationIndexDoc {
            translations: vec![entry("bsb"), entry("web")],
        };
        let right = TranslationIndexDoc {
            translations: vec![entry("kjv"), entry("bsb")],
        };

        let mut forward = left.clone();
        merge_translation_index(&mut forward, right.clone());
        let mut backward = right;
        merge_translation_index(&mut backward, left);

        assert_eq!(forward, backward);
        let ids: Vec<_> = forward
            .translations
            .iter()
            .map(|e| e.translation.id.as_str())
            .collect();
        assert_eq!(ids, vec!["bsb", "kjv", "web"]);
    }

    #[test]
    fn batches_cover_every_document_once() {
        let docs: Vec<OutputDoc> = (0..7)
            .map(|i| OutputDoc {
                path: format!("/doc/{i}"),
                content: Value::Null,
                mergeable: false,
            })
            .collect();
        let batches: Vec<_> = batched(&docs, 3).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches.iter().map(|b| b.len()).sum::<usize>(), 7);
        // Zero batch size is clamped rather than panicking.
        assert_eq!(batched(&docs, 0).count(), 7);
    }
}
