//! # lectern
//!
//! A fast, lightweight library for parsing USFM/USX scripture texts and
//! generating a cross-linked, JSON-serializable document set suitable for
//! serving as a read-only Bible API.
//!
//! ## Features
//!
//! - Parse USFM (marker-based) and USX (XML) book sources into one
//!   format-agnostic parse tree
//! - Chapters, verses, headings, poetry indents, words of Jesus,
//!   footnotes with caller policies
//! - Generate a complete document tree: mergeable translation index,
//!   per-translation book list, per-chapter documents with navigation
//!   links in canonical book order, optional audio attachment
//!
//! ## Quick Start
//!
//! ```
//! use lectern::{GenerateOptions, ParsedBook, SourceFormat, Translation};
//!
//! let usfm = "\\id GEN\n\\h Genesis\n\\c 1\n\\v 1 In the beginning\n";
//! let parsed = lectern::parse(usfm, SourceFormat::Usfm)?;
//!
//! let translation = Translation::new("bsb", "Berean Standard Bible")
//!     .with_website("https://berean.bible")
//!     .with_license_url("https://berean.bible/terms.htm");
//! let books = vec![ParsedBook { translation, book: parsed.book }];
//!
//! let docs = lectern::generate(&books, &GenerateOptions::default())?;
//! assert!(docs.iter().any(|d| d.path == "/bible/bsb/Genesis/1.json"));
//! # Ok::<(), lectern::Error>(())
//! ```

pub mod audio;
pub mod books;
pub mod error;
pub mod generate;
pub mod model;
pub mod render;
pub mod sink;
pub mod usfm;
pub mod usx;

pub use audio::{AudioIndex, StaticAudioIndex};
pub use error::{Error, Result};
pub use generate::{BookSegment, GenerateOptions, OutputDoc, generate};
pub use model::{
    Book, Caller, Chapter, ChapterContent, Footnote, FormattedText, ParsedBook, TextDirection,
    Translation, VerseContent, VerseRef,
};
pub use sink::{FsSink, MemorySink, OutputSink};
pub use usfm::{ParseOutput, ParseWarning, WarningCondition};

/// Markup grammar of a raw book source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Usfm,
    Usx,
}

/// Parse one raw book document in either supported format.
pub fn parse(content: &str, format: SourceFormat) -> Result<ParseOutput> {
    match format {
        SourceFormat::Usfm => usfm::parse(content),
        SourceFormat::Usx => usx::parse(content),
    }
}
