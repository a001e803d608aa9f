//! Parse-tree builder: a stateful single pass over the token stream.
//!
//! The builder tracks the current chapter and verse, the poetry indent
//! level, the words-of-Jesus span flag, and an open-footnote accumulator.
//! It is format-agnostic: both the USFM tokenizer and the USX tree walk
//! feed it the same [`Token`] vocabulary.
//!
//! Error policy: an unresolvable book identifier is the only fatal
//! condition. Out-of-order structural markers are recoverable — the
//! builder substitutes the most reasonable interpretation, records a
//! [`ParseWarning`], and continues, since the priority is maximal yield
//! from heterogeneous real-world corpora.

use std::collections::HashSet;
use std::fmt;

use crate::books::{self, BookInfo};
use crate::error::{Error, Result};
use crate::model::{
    Book, Caller, Chapter, ChapterContent, Footnote, FormattedText, VerseContent, VerseRef,
};
use crate::usfm::tokenizer::Token;

/// A parsed book plus the recoverable conditions hit along the way.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub book: Book,
    pub warnings: Vec<ParseWarning>,
}

/// One recoverable parse condition: which book, which chapter, what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Canonical book id, filled once the `\id` line has been seen.
    pub book: Option<String>,
    pub chapter: Option<u32>,
    pub condition: WarningCondition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningCondition {
    /// A verse marker arrived before any chapter marker; chapter 1 was
    /// opened implicitly.
    VerseBeforeChapter,
    /// A footnote close with no matching open; ignored.
    UnmatchedFootnoteClose,
    /// A footnote was still open at a structural boundary and was closed
    /// implicitly.
    UnclosedFootnote,
    /// An unrecognized marker, treated as inert. Reported once per tag.
    UnknownMarker { tag: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.book {
            Some(book) => write!(f, "{book} ")?,
            None => write!(f, "<unknown book> ")?,
        }
        if let Some(chapter) = self.chapter {
            write!(f, "chapter {chapter}: ")?;
        }
        match &self.condition {
            WarningCondition::VerseBeforeChapter => {
                write!(f, "verse marker before any chapter marker")
            }
            WarningCondition::UnmatchedFootnoteClose => {
                write!(f, "footnote close with no open footnote")
            }
            WarningCondition::UnclosedFootnote => {
                write!(f, "footnote closed implicitly at structural boundary")
            }
            WarningCondition::UnknownMarker { tag } => write!(f, "unrecognized marker \\{tag}"),
        }
    }
}

/// Where the next plain text run lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    /// Into the open verse or hebrew subtitle; discarded when neither is
    /// open (intro paragraphs before the first chapter, `\id` comments).
    Body,
    /// Into the pending heading accumulator.
    Heading,
    /// `\h`: the translation's running-header name for the book.
    BookName,
    /// `\toc2`: short table-of-contents name, fallback for the book name.
    ShortName,
    /// `\mt*`: major title segments.
    Title,
    /// `\r`, `\rem`, `\toc1`, `\toc3`: recognized but not kept.
    Discard,
}

/// The currently open body accumulator, an index into chapter content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accum {
    None,
    Verse(usize),
    Subtitle(usize),
}

#[derive(Debug)]
struct OpenFootnote {
    note_id: u32,
    caller: Caller,
    text: String,
    reference: Option<VerseRef>,
    /// Set after `\fr`: origin-reference text duplicates what the builder
    /// already knows, so it is skipped until `\ft`.
    skipping: bool,
}

/// Single-pass consumer of the token stream for one book.
pub struct ParseTreeBuilder {
    info: Option<&'static BookInfo>,
    book_name: Option<String>,
    short_name: Option<String>,
    title_parts: Vec<String>,
    chapters: Vec<Chapter>,

    current: Option<Chapter>,
    accum: Accum,
    target: TextTarget,
    verse_number: Option<u32>,
    poetry_level: Option<u8>,
    words_of_jesus: bool,
    footnote: Option<OpenFootnote>,
    in_cross_ref: bool,
    /// Pending `\b`: becomes an inline break if verse text follows, a
    /// chapter-level break otherwise.
    pending_break: bool,
    /// Pending `\s*` segments: become an inline heading if verse text
    /// follows, a chapter-level heading otherwise.
    pending_heading: Option<Vec<String>>,

    warnings: Vec<ParseWarning>,
    seen_unknown: HashSet<String>,
}

impl Default for ParseTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseTreeBuilder {
    pub fn new() -> Self {
        Self {
            info: None,
            book_name: None,
            short_name: None,
            title_parts: Vec::new(),
            chapters: Vec::new(),
            current: None,
            accum: Accum::None,
            target: TextTarget::Discard,
            verse_number: None,
            poetry_level: None,
            words_of_jesus: false,
            footnote: None,
            in_cross_ref: false,
            pending_break: false,
            pending_heading: None,
            warnings: Vec::new(),
            seen_unknown: HashSet::new(),
        }
    }

    /// Consume an entire token stream and produce the parsed book.
    pub fn build(tokens: impl IntoIterator<Item = Token>) -> Result<ParseOutput> {
        let mut builder = Self::new();
        for token in tokens {
            builder.push(token)?;
        }
        builder.finish()
    }

    fn warn(&mut self, condition: WarningCondition) {
        let warning = ParseWarning {
            book: self.info.map(|i| i.id.to_string()),
            chapter: self.current.as_ref().map(|c| c.number),
            condition,
        };
        tracing::warn!(warning = %warning, "recoverable parse condition");
        self.warnings.push(warning);
    }

    /// Feed one token. Fails only on an unresolvable book identifier.
    pub fn push(&mut self, token: Token) -> Result<()> {
        // Cross-reference spans are recognized and discarded whole.
        if self.in_cross_ref {
            if matches!(token, Token::CrossRefEnd) {
                self.in_cross_ref = false;
            }
            return Ok(());
        }

        match token {
            Token::BookId { code } => {
                self.info = Some(books::lookup(&code)?);
                self.target = TextTarget::Discard;
            }
            Token::Chapter(number) => {
                self.flush_chapter();
                self.current = Some(Chapter::new(number));
                self.target = TextTarget::Body;
            }
            Token::Verse { number, end } => {
                self.flush_pending(false);
                if self.current.is_none() {
                    self.warn(WarningCondition::VerseBeforeChapter);
                }
                let chapter = self.current.get_or_insert_with(|| Chapter::new(1));
                chapter.content.push(ChapterContent::Verse {
                    number,
                    end_number: end,
                    content: Vec::new(),
                });
                self.accum = Accum::Verse(chapter.content.len() - 1);
                self.verse_number = Some(number);
                self.words_of_jesus = false;
                self.target = TextTarget::Body;
            }
            Token::Heading { level: _ } => {
                self.flush_pending(false);
                self.pending_heading = Some(Vec::new());
                self.target = TextTarget::Heading;
            }
            Token::HebrewSubtitle => {
                self.flush_pending(false);
                if let Some(chapter) = self.current.as_mut() {
                    chapter.content.push(ChapterContent::HebrewSubtitle {
                        content: Vec::new(),
                    });
                    self.accum = Accum::Subtitle(chapter.content.len() - 1);
                    self.verse_number = None;
                }
                self.target = TextTarget::Body;
            }
            Token::LineBreak => {
                self.flush_pending(false);
                self.pending_break = true;
                self.target = TextTarget::Body;
            }
            Token::Paragraph => {
                // Paragraph markers end heading accumulation and reset the
                // poetry context, but the heading itself stays pending: if
                // verse text resumes before the next structural boundary it
                // becomes an inline node in the still-open verse.
                self.poetry_level = None;
                self.target = TextTarget::Body;
            }
            Token::Poetry { level } => {
                self.poetry_level = Some(level);
                self.target = TextTarget::Body;
            }
            Token::WordsOfJesusStart => self.words_of_jesus = true,
            Token::WordsOfJesusEnd => self.words_of_jesus = false,
            Token::FootnoteStart { caller } => {
                if self.footnote.is_some() {
                    self.warn(WarningCondition::UnclosedFootnote);
                    self.close_footnote();
                }
                self.open_footnote(caller);
            }
            Token::FootnoteEnd => {
                if self.footnote.is_some() {
                    self.close_footnote();
                } else {
                    self.warn(WarningCondition::UnmatchedFootnoteClose);
                }
            }
            Token::FootnoteReference => {
                if let Some(f) = self.footnote.as_mut() {
                    f.skipping = true;
                }
            }
            Token::FootnoteText => {
                if let Some(f) = self.footnote.as_mut() {
                    f.skipping = false;
                }
            }
            Token::CrossRefStart => self.in_cross_ref = true,
            Token::CrossRefEnd => {}
            Token::BookName => self.target = TextTarget::BookName,
            Token::TableOfContents { level } => {
                self.target = if level == 2 {
                    TextTarget::ShortName
                } else {
                    TextTarget::Discard
                };
            }
            Token::MajorTitle { level: _ } => self.target = TextTarget::Title,
            Token::ReferenceLine | Token::Remark => self.target = TextTarget::Discard,
            Token::Text(text) => self.push_text(text),
            Token::Unknown { tag } => {
                if self.seen_unknown.insert(tag.clone()) {
                    self.warn(WarningCondition::UnknownMarker { tag });
                }
            }
        }
        Ok(())
    }

    fn push_text(&mut self, text: String) {
        // An open footnote captures all text until its close, regardless
        // of the outer target.
        if let Some(f) = self.footnote.as_mut() {
            if f.skipping {
                return;
            }
            if !f.text.is_empty() {
                f.text.push(' ');
            }
            f.text.push_str(&text);
            return;
        }

        match self.target {
            TextTarget::Body => {
                self.flush_pending(true);
                let poem = self.poetry_level;
                let words_of_jesus = self.words_of_jesus;
                if let Some(nodes) = self.open_body() {
                    push_body_text(nodes, text, poem, words_of_jesus);
                }
            }
            TextTarget::Heading => {
                if let Some(segments) = self.pending_heading.as_mut() {
                    segments.push(text);
                }
            }
            TextTarget::BookName => self.book_name = Some(text),
            TextTarget::ShortName => self.short_name = Some(text),
            TextTarget::Title => self.title_parts.push(text),
            TextTarget::Discard => {}
        }
    }

    /// The content list of the open verse or subtitle, if any.
    fn open_body(&mut self) -> Option<&mut Vec<VerseContent>> {
        let chapter = self.current.as_mut()?;
        match self.accum {
            Accum::None => None,
            Accum::Verse(i) | Accum::Subtitle(i) => match &mut chapter.content[i] {
                ChapterContent::Verse { content, .. }
                | ChapterContent::HebrewSubtitle { content } => Some(content),
                _ => None,
            },
        }
    }

    fn open_footnote(&mut self, caller: Caller) {
        let Some(chapter) = self.current.as_mut() else {
            // Footnote outside any chapter (intro material): discard.
            return;
        };
        let note_id = chapter.footnotes.len() as u32;
        let reference = self.verse_number.map(|verse| VerseRef {
            chapter: chapter.number,
            verse,
        });
        self.footnote = Some(OpenFootnote {
            note_id,
            caller,
            text: String::new(),
            reference,
            skipping: false,
        });
        // The reference node interrupts the open content stream at the
        // point the footnote was declared. Footnotes inside headings or
        // header fields have no content stream to interrupt; they still
        // land in the chapter's table.
        if self.target == TextTarget::Body {
            if let Some(nodes) = self.open_body() {
                nodes.push(VerseContent::NoteRef { note_id });
            }
        }
    }

    fn close_footnote(&mut self) {
        let Some(f) = self.footnote.take() else {
            return;
        };
        if let Some(chapter) = self.current.as_mut() {
            chapter.footnotes.push(Footnote {
                note_id: f.note_id,
                text: f.text,
                reference: f.reference,
                caller: f.caller,
            });
        }
    }

    /// Flush pending heading and break. With `into_verse` set (verse text
    /// is about to continue), both stay inline in the open verse;
    /// otherwise they land as chapter-level nodes and close the verse.
    fn flush_pending(&mut self, into_verse: bool) {
        self.flush_pending_heading(into_verse);
        if !self.pending_break {
            return;
        }
        self.pending_break = false;
        if into_verse && matches!(self.accum, Accum::Verse(_)) {
            if let Some(nodes) = self.open_body() {
                nodes.push(VerseContent::line_break());
                return;
            }
        }
        self.accum = Accum::None;
        self.verse_number = None;
        if let Some(chapter) = self.current.as_mut() {
            chapter.content.push(ChapterContent::LineBreak);
        }
    }

    fn flush_pending_heading(&mut self, into_verse: bool) {
        let Some(segments) = self.pending_heading.take() else {
            return;
        };
        if segments.is_empty() {
            return;
        }
        if into_verse && matches!(self.accum, Accum::Verse(_)) {
            let heading = segments.join(" ");
            if let Some(nodes) = self.open_body() {
                nodes.push(VerseContent::InlineHeading { heading });
                return;
            }
        }
        self.accum = Accum::None;
        self.verse_number = None;
        if let Some(chapter) = self.current.as_mut() {
            chapter
                .content
                .push(ChapterContent::Heading { content: segments });
        }
    }

    /// Close out the current chapter, if any, and append it to the book.
    fn flush_chapter(&mut self) {
        if self.footnote.is_some() {
            self.warn(WarningCondition::UnclosedFootnote);
            self.close_footnote();
        }
        self.flush_pending(false);
        self.accum = Accum::None;
        self.verse_number = None;
        self.poetry_level = None;
        self.words_of_jesus = false;
        if let Some(chapter) = self.current.take() {
            self.chapters.push(chapter);
        }
    }

    /// End of input: flush remaining state and assemble the book.
    pub fn finish(mut self) -> Result<ParseOutput> {
        self.flush_chapter();
        let info = self
            .info
            .ok_or_else(|| Error::UnknownBook("<missing \\id marker>".to_string()))?;
        for w in &mut self.warnings {
            w.book.get_or_insert_with(|| info.id.to_string());
        }
        let name = self
            .book_name
            .or(self.short_name)
            .unwrap_or_else(|| info.common_name.to_string());
        let title = if self.title_parts.is_empty() {
            None
        } else {
            Some(self.title_parts.join(" "))
        };
        Ok(ParseOutput {
            book: Book {
                id: info.id.to_string(),
                name,
                common_name: info.common_name.to_string(),
                title,
                order: info.order,
                chapters: self.chapters,
            },
            warnings: self.warnings,
        })
    }
}

/// Append a text run to an open verse/subtitle content list.
///
/// Plain runs merge into a preceding plain run with a joining space;
/// formatted runs always start a new node so poetry lines stay distinct.
fn push_body_text(nodes: &mut Vec<VerseContent>, text: String, poem: Option<u8>, wj: bool) {
    if poem.is_none() && !wj {
        if let Some(VerseContent::Text(prev)) = nodes.last_mut() {
            prev.push(' ');
            prev.push_str(&text);
            return;
        }
        nodes.push(VerseContent::Text(text));
    } else {
        nodes.push(VerseContent::Formatted(FormattedText {
            text,
            poem,
            words_of_jesus: wj,
        }));
    }
}
