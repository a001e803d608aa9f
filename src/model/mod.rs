//! Core data model for scripture processing.
//!
//! This module contains:
//! - Translation metadata (identity, language, text direction)
//! - Book representation (canonical identity + ordered chapters)
//! - Chapter content nodes (headings, verses, poetry, words of Jesus)
//! - Footnotes and footnote references
//!
//! Parse trees are built once per book and are immutable afterward. The
//! serde derives define the wire shapes used by every generated document,
//! so changes here are wire-format changes.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Text direction of a translation's primary language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

/// Metadata identifying one translation.
///
/// Supplied once per run and read-only afterward; every downstream
/// artifact carries the id of its owning translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub id: String,
    pub name: String,
    pub english_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    pub website: String,
    pub license_url: String,
    /// BCP 47 language tag as declared by the source.
    pub language: String,
    pub text_direction: TextDirection,
}

impl Translation {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            english_name: name.clone(),
            name,
            short_name: None,
            website: String::new(),
            license_url: String::new(),
            language: String::from("en"),
            text_direction: TextDirection::Ltr,
        }
    }

    pub fn with_english_name(mut self, name: impl Into<String>) -> Self {
        self.english_name = name.into();
        self
    }

    pub fn with_short_name(mut self, name: impl Into<String>) -> Self {
        self.short_name = Some(name.into());
        self
    }

    pub fn with_website(mut self, url: impl Into<String>) -> Self {
        self.website = url.into();
        self
    }

    pub fn with_license_url(mut self, url: impl Into<String>) -> Self {
        self.license_url = url.into();
        self
    }

    pub fn with_language(mut self, tag: impl Into<String>, direction: TextDirection) -> Self {
        self.language = tag.into();
        self.text_direction = direction;
        self
    }

    /// Check that every required field is present.
    ///
    /// Malformed metadata is fatal: documents keyed on a missing id or
    /// pointing at an empty website are not worth emitting.
    pub fn validate(&self) -> Result<()> {
        let missing = |field: &str| Error::InvalidMetadata {
            translation: self.id.clone(),
            field: field.to_string(),
        };
        if self.id.is_empty() {
            return Err(missing("id"));
        }
        if self.name.is_empty() {
            return Err(missing("name"));
        }
        if self.english_name.is_empty() {
            return Err(missing("englishName"));
        }
        if self.website.is_empty() {
            return Err(missing("website"));
        }
        if self.license_url.is_empty() {
            return Err(missing("licenseUrl"));
        }
        if self.language.is_empty() {
            return Err(missing("language"));
        }
        Ok(())
    }
}

/// One parsed book of one translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Canonical identifier from the catalog (e.g. `GEN`).
    pub id: String,
    /// Name as supplied by the translation (`\h` / `\toc2`).
    pub name: String,
    /// Display form from the catalog (e.g. `Genesis`).
    pub common_name: String,
    /// Major title (`\mt*`), when the source declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Position in canonical biblical ordering, not input order.
    pub order: usize,
    pub chapters: Vec<Chapter>,
}

/// One chapter: an ordered content sequence plus its footnote table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub number: u32,
    pub content: Vec<ChapterContent>,
    pub footnotes: Vec<Footnote>,
}

impl Chapter {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            content: Vec::new(),
            footnotes: Vec::new(),
        }
    }

    /// Look up a footnote by id within this chapter's table.
    pub fn footnote(&self, note_id: u32) -> Option<&Footnote> {
        self.footnotes.iter().find(|f| f.note_id == note_id)
    }
}

/// A top-level node in a chapter's content sequence.
///
/// Closed variant: every consumer matches exhaustively, so adding a node
/// kind forces every renderer and generator site to handle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChapterContent {
    /// Section heading outside any verse. Segments join with a space.
    Heading { content: Vec<String> },
    /// Structural break (`\b`), no payload.
    LineBreak,
    /// Hebrew subtitle (`\d`), e.g. psalm superscriptions.
    #[serde(rename_all = "camelCase")]
    HebrewSubtitle { content: Vec<VerseContent> },
    /// A verse (possibly a combined range keyed by its first number).
    #[serde(rename_all = "camelCase")]
    Verse {
        number: u32,
        /// Last number of a combined range like `3-4`; absent for plain verses.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_number: Option<u32>,
        content: Vec<VerseContent>,
    },
}

/// A node inside a verse or hebrew subtitle.
///
/// Plain strings are formatting-free shorthand for the common case, so the
/// wire shape is untagged: a bare string, or an object whose fields pick
/// the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerseContent {
    Text(String),
    Formatted(FormattedText),
    #[serde(rename_all = "camelCase")]
    InlineHeading { heading: String },
    #[serde(rename_all = "camelCase")]
    InlineLineBreak { line_break: bool },
    #[serde(rename_all = "camelCase")]
    NoteRef { note_id: u32 },
}

impl VerseContent {
    pub fn text(s: impl Into<String>) -> Self {
        VerseContent::Text(s.into())
    }

    pub fn line_break() -> Self {
        VerseContent::InlineLineBreak { line_break: true }
    }
}

impl From<FormattedText> for VerseContent {
    fn from(f: FormattedText) -> Self {
        // Formatting-free runs collapse back to the shorthand.
        if f.poem.is_none() && !f.words_of_jesus {
            VerseContent::Text(f.text)
        } else {
            VerseContent::Formatted(f)
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A text run with optional poetry indent and words-of-Jesus attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedText {
    pub text: String,
    /// Poetry indent level (`\q1`, `\q2`, ...), used in Psalms-style layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poem: Option<u8>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub words_of_jesus: bool,
}

/// The verse a footnote originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseRef {
    pub chapter: u32,
    pub verse: u32,
}

/// Caller policy declared on a footnote's opening marker.
///
/// Serializes as `"+"` (auto-generate at render time), `null` (no visible
/// caller glyph), or the literal string to use verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    Auto,
    None,
    Literal(String),
}

impl Serialize for Caller {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Caller::Auto => serializer.serialize_str("+"),
            Caller::None => serializer.serialize_none(),
            Caller::Literal(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Caller {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Option::None => Ok(Caller::None),
            Some(s) if s == "+" => Ok(Caller::Auto),
            Some(s) if s.is_empty() => Err(D::Error::custom("empty footnote caller")),
            Some(s) => Ok(Caller::Literal(s)),
        }
    }
}

/// A footnote in a chapter's footnote table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footnote {
    /// Unique within the owning chapter; content nodes link here.
    pub note_id: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<VerseRef>,
    pub caller: Caller,
}

/// A parsed book tagged with its owning translation, ready for generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBook {
    pub translation: Translation,
    pub book: Book,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verse_serializes_with_type_tag() {
        let verse = ChapterContent::Verse {
            number: 1,
            end_number: None,
            content: vec![VerseContent::text("In the beginning")],
        };
        assert_eq!(
            serde_json::to_value(&verse).unwrap(),
            json!({"type": "verse", "number": 1, "content": ["In the beginning"]})
        );
    }

    #[test]
    fn line_break_is_a_bare_tag() {
        assert_eq!(
            serde_json::to_value(&ChapterContent::LineBreak).unwrap(),
            json!({"type": "line_break"})
        );
    }

    #[test]
    fn combined_range_keeps_end_number() {
        let verse = ChapterContent::Verse {
            number: 3,
            end_number: Some(4),
            content: vec![],
        };
        assert_eq!(
            serde_json::to_value(&verse).unwrap(),
            json!({"type": "verse", "number": 3, "endNumber": 4, "content": []})
        );
    }

    #[test]
    fn formatted_text_omits_absent_flags() {
        let poem = VerseContent::Formatted(FormattedText {
            text: "Selah".into(),
            poem: Some(2),
            words_of_jesus: false,
        });
        assert_eq!(
            serde_json::to_value(&poem).unwrap(),
            json!({"text": "Selah", "poem": 2})
        );

        let wj = VerseContent::Formatted(FormattedText {
            text: "Follow me".into(),
            poem: None,
            words_of_jesus: true,
        });
        assert_eq!(
            serde_json::to_value(&wj).unwrap(),
            json!({"text": "Follow me", "wordsOfJesus": true})
        );
    }

    #[test]
    fn caller_wire_shapes() {
        let auto = Footnote {
            note_id: 0,
            text: "or, the heavens".into(),
            reference: Some(VerseRef {
                chapter: 1,
                verse: 1,
            }),
            caller: Caller::Auto,
        };
        assert_eq!(
            serde_json::to_value(&auto).unwrap(),
            json!({
                "noteId": 0,
                "text": "or, the heavens",
                "reference": {"chapter": 1, "verse": 1},
                "caller": "+"
            })
        );

        let none = Footnote {
            note_id: 1,
            text: "x".into(),
            reference: None,
            caller: Caller::None,
        };
        assert_eq!(
            serde_json::to_value(&none).unwrap()["caller"],
            serde_json::Value::Null
        );

        let lit = Footnote {
            note_id: 2,
            text: "x".into(),
            reference: None,
            caller: Caller::Literal("†".into()),
        };
        assert_eq!(serde_json::to_value(&lit).unwrap()["caller"], json!("†"));
    }

    #[test]
    fn caller_round_trips() {
        for caller in [
            Caller::Auto,
            Caller::None,
            Caller::Literal("a".into()),
        ] {
            let note = Footnote {
                note_id: 9,
                text: "t".into(),
                reference: None,
                caller: caller.clone(),
            };
            let back: Footnote =
                serde_json::from_value(serde_json::to_value(&note).unwrap()).unwrap();
            assert_eq!(back.caller, caller);
        }
    }

    #[test]
    fn note_ref_uses_camel_case() {
        assert_eq!(
            serde_json::to_value(&VerseContent::NoteRef { note_id: 3 }).unwrap(),
            json!({"noteId": 3})
        );
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let t = Translation::new("bsb", "Berean Standard Bible");
        assert!(matches!(
            t.validate(),
            Err(Error::InvalidMetadata { field, .. }) if field == "website"
        ));

        let t = t
            .with_website("https://berean.bible")
            .with_license_url("https://berean.bible/terms.htm");
        assert!(t.validate().is_ok());
    }
}
