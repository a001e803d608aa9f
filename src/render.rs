//! Rendering parsed books back out to flat text.
//!
//! Two consumers: footnote caller assignment (the `+` policy defers the
//! visible glyph to render time) and a USFM re-serializer, which is what
//! the round-trip stability tests drive content through.

use std::fmt::Write;

use crate::model::{Book, Caller, Chapter, ChapterContent, VerseContent};

/// Assign visible callers to a chapter's footnote table, in table order.
///
/// `+` callers receive generated symbols (`a`, `b`, ... `z`, `aa`, ...),
/// literal callers are used verbatim, and `None` callers stay invisible.
pub fn assign_callers(chapter: &Chapter) -> Vec<(u32, Option<String>)> {
    let mut auto = 0usize;
    chapter
        .footnotes
        .iter()
        .map(|note| {
            let glyph = match &note.caller {
                Caller::Auto => {
                    let glyph = auto_caller(auto);
                    auto += 1;
                    Some(glyph)
                }
                Caller::Literal(lit) => Some(lit.clone()),
                Caller::None => None,
            };
            (note.note_id, glyph)
        })
        .collect()
}

/// The n-th generated caller: `a`..`z`, then `aa`, `ab`, ...
fn auto_caller(mut n: usize) -> String {
    let mut glyph = String::new();
    loop {
        glyph.insert(0, (b'a' + (n % 26) as u8) as char);
        if n < 26 {
            return glyph;
        }
        n = n / 26 - 1;
    }
}

/// Serialize a parsed book back to USFM.
///
/// Not a pretty-printer: the goal is that re-parsing the output yields
/// equivalent content nodes (verse numbers, text, formatting, footnote
/// ids) modulo whitespace.
pub fn render_usfm(book: &Book) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\\id {} {}", book.id, book.name);
    let _ = writeln!(out, "\\h {}", book.name);
    if let Some(title) = &book.title {
        let _ = writeln!(out, "\\mt1 {title}");
    }
    for chapter in &book.chapters {
        render_chapter(&mut out, chapter);
    }
    out
}

fn render_chapter(out: &mut String, chapter: &Chapter) {
    let _ = writeln!(out, "\\c {}", chapter.number);
    // Poetry level carries across verse boundaries until reset, so it is
    // tracked per chapter, matching the builder.
    let mut poem: Option<u8> = None;
    for node in &chapter.content {
        match node {
            ChapterContent::Heading { content } => {
                if poem.take().is_some() {
                    let _ = writeln!(out, "\\m");
                }
                let _ = writeln!(out, "\\s1 {}", content.join(" "));
            }
            ChapterContent::LineBreak => {
                let _ = writeln!(out, "\\b");
            }
            ChapterContent::HebrewSubtitle { content } => {
                let _ = write!(out, "\\d ");
                render_inline(out, content, chapter, &mut poem);
                out.push('\n');
            }
            ChapterContent::Verse {
                number,
                end_number,
                content,
            } => {
                match end_number {
                    Some(end) => {
                        let _ = write!(out, "\\v {number}-{end} ");
                    }
                    None => {
                        let _ = write!(out, "\\v {number} ");
                    }
                }
                render_inline(out, content, chapter, &mut poem);
                out.push('\n');
            }
        }
    }
}

fn render_inline(
    out: &mut String,
    nodes: &[VerseContent],
    chapter: &Chapter,
    poem: &mut Option<u8>,
) {
    for node in nodes {
        match node {
            VerseContent::Text(text) => {
                if poem.take().is_some() {
                    let _ = write!(out, "\\m ");
                }
                out.push_str(text);
                out.push(' ');
            }
            VerseContent::Formatted(f) => {
                if f.poem != *poem {
                    *poem = f.poem;
                    if let Some(level) = f.poem {
                        let _ = write!(out, "\\q{level} ");
                    } else {
                        let _ = write!(out, "\\m ");
                    }
                }
                if f.words_of_jesus {
                    let _ = write!(out, "\\wj {}\\wj* ", f.text);
                } else {
                    out.push_str(&f.text);
                    out.push(' ');
                }
            }
            VerseContent::InlineHeading { heading } => {
                // The paragraph marker returns to body text; it also resets
                // the poetry context on re-parse, so track that here.
                let _ = write!(out, "\\s1 {heading} \\p ");
                *poem = None;
            }
            VerseContent::InlineLineBreak { .. } => {
                let _ = write!(out, "\\b ");
            }
            VerseContent::NoteRef { note_id } => {
                let Some(note) = chapter.footnote(*note_id) else {
                    continue;
                };
                let caller = match &note.caller {
                    Caller::Auto => "+",
                    Caller::None => "-",
                    Caller::Literal(lit) => lit,
                };
                let _ = write!(out, "\\f {caller} ");
                if let Some(reference) = &note.reference {
                    let _ = write!(out, "\\fr {}:{} ", reference.chapter, reference.verse);
                }
                let _ = write!(out, "\\ft {}\\f* ", note.text);
            }
        }
    }
}

/// Render a chapter as plain reader-facing text, one line per content
/// node, with assigned footnote callers in brackets.
pub fn render_plain_text(chapter: &Chapter) -> String {
    let callers: std::collections::HashMap<u32, Option<String>> =
        assign_callers(chapter).into_iter().collect();
    let mut out = String::new();
    for node in &chapter.content {
        match node {
            ChapterContent::Heading { content } => {
                let _ = writeln!(out, "{}", content.join(" "));
            }
            ChapterContent::LineBreak => out.push('\n'),
            ChapterContent::HebrewSubtitle { content } => {
                render_plain_inline(&mut out, content, &callers);
                out.push('\n');
            }
            ChapterContent::Verse {
                number, content, ..
            } => {
                let _ = write!(out, "{number} ");
                render_plain_inline(&mut out, content, &callers);
                out.push('\n');
            }
        }
    }
    out
}

fn render_plain_inline(
    out: &mut String,
    nodes: &[VerseContent],
    callers: &std::collections::HashMap<u32, Option<String>>,
) {
    for node in nodes {
        match node {
            VerseContent::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            VerseContent::Formatted(f) => {
                out.push_str(&f.text);
                out.push(' ');
            }
            VerseContent::InlineHeading { heading } => {
                out.push_str(heading);
                out.push(' ');
            }
            VerseContent::InlineLineBreak { .. } => out.push('\n'),
            VerseContent::NoteRef { note_id } => {
                if let Some(Some(glyph)) = callers.get(note_id) {
                    let _ = write!(out, "[{glyph}] ");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Footnote, VerseRef};

    fn chapter_with_callers() -> Chapter {
        let mut chapter = Chapter::new(1);
        for (note_id, caller) in [
            (0, Caller::Auto),
            (1, Caller::Literal("†".into())),
            (2, Caller::None),
            (3, Caller::Auto),
        ] {
            chapter.footnotes.push(Footnote {
                note_id,
                text: format!("note {note_id}"),
                reference: Some(VerseRef {
                    chapter: 1,
                    verse: 1,
                }),
                caller,
            });
        }
        chapter
    }

    #[test]
    fn auto_callers_are_sequential_and_distinct() {
        let callers = assign_callers(&chapter_with_callers());
        assert_eq!(callers[0], (0, Some("a".into())));
        assert_eq!(callers[1], (1, Some("†".into())));
        assert_eq!(callers[2], (2, None));
        assert_eq!(callers[3], (3, Some("b".into())));
    }

    #[test]
    fn plain_text_shows_assigned_callers_and_hides_none() {
        let mut chapter = chapter_with_callers();
        chapter.content.push(ChapterContent::Heading {
            content: vec!["The Shepherd".to_string()],
        });
        chapter.content.push(ChapterContent::Verse {
            number: 1,
            end_number: None,
            content: vec![
                VerseContent::text("The LORD is my shepherd;"),
                VerseContent::NoteRef { note_id: 0 },
                VerseContent::NoteRef { note_id: 1 },
                VerseContent::line_break(),
                VerseContent::text("I shall not want."),
                VerseContent::NoteRef { note_id: 2 },
            ],
        });

        let text = render_plain_text(&chapter);
        assert_eq!(
            text,
            "The Shepherd\n1 The LORD is my shepherd; [a] [\u{2020}] \nI shall not want. \n"
        );
    }

    #[test]
    fn auto_caller_sequence_wraps_past_z() {
        assert_eq!(auto_caller(0), "a");
        assert_eq!(auto_caller(25), "z");
        assert_eq!(auto_caller(26), "aa");
        assert_eq!(auto_caller(27), "ab");
        assert_eq!(auto_caller(51), "az");
        assert_eq!(auto_caller(52), "ba");
    }
}
