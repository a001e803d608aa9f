//! Marker tokenizer for USFM documents.
//!
//! A single left-to-right scan with no backtracking. Markers are a
//! backslash followed by an alphabetic tag, an optional level digit, and
//! an optional `*` for closing markers. Everything between markers is a
//! plain text run. Unrecognized markers are preserved as inert
//! [`Token::Unknown`] rather than failing the scan; real-world corpora
//! are not uniform enough to treat them as errors.

use memchr::memchr;

use crate::model::Caller;

/// One token in the marker/content stream.
///
/// Both the USFM scanner and the USX tree walk produce this vocabulary,
/// which is what keeps the parse-tree builder format-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `\id GEN - ...`: book identification line.
    BookId { code: String },
    /// `\c N`
    Chapter(u32),
    /// `\v N` or `\v N-M` (combined range).
    Verse { number: u32, end: Option<u32> },
    /// `\s`, `\s1`..`\s4`: section heading.
    Heading { level: u8 },
    /// `\r`: parallel reference line (discarded downstream).
    ReferenceLine,
    /// `\rem`: transmitter remark (discarded downstream).
    Remark,
    /// `\h`: running header, the translation's name for the book.
    BookName,
    /// `\toc1`..`\toc3`: long/short/abbreviated table-of-contents names.
    TableOfContents { level: u8 },
    /// `\mt`, `\mt1`..`\mt3`: major title segments.
    MajorTitle { level: u8 },
    /// `\p`, `\m`, `\pc`, `\pi`, `\nb`: paragraph-level structure.
    Paragraph,
    /// `\q`, `\q1`..`\q4`: poetry line with indent level.
    Poetry { level: u8 },
    /// `\b`: blank line / structural break.
    LineBreak,
    /// `\d`: hebrew subtitle (psalm superscription).
    HebrewSubtitle,
    /// `\wj` / `\wj*`
    WordsOfJesusStart,
    WordsOfJesusEnd,
    /// `\f <caller>` / `\f*`
    FootnoteStart { caller: Caller },
    FootnoteEnd,
    /// `\fr`: footnote origin reference text follows.
    FootnoteReference,
    /// `\ft`, `\fq`, `\fqa`, `\fk`, `\fl`: footnote body text follows.
    FootnoteText,
    /// `\x <caller>` / `\x*`: cross reference span (discarded downstream).
    CrossRefStart,
    CrossRefEnd,
    /// Plain text run between markers. Runs of whitespace collapse to a
    /// single space and empty runs are dropped; the single space that
    /// separates a marker from its text is a separator, not content.
    Text(String),
    /// Unrecognized marker, inert.
    Unknown { tag: String },
}

/// Single-pass scanner over one raw USFM document.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        // Strip a UTF-8 BOM if the source carries one.
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Skip spaces/tabs (not newlines) and read one whitespace-delimited word.
    fn read_word(&mut self) -> &'a str {
        let rest = self.rest();
        let start = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        let rest = &rest[start..];
        let end = rest
            .find(char::is_whitespace)
            .unwrap_or(rest.len());
        self.pos += start + end;
        &rest[..end]
    }

    /// Consume the remainder of the current line.
    fn skip_line(&mut self) {
        let rest = self.rest();
        match rest.find('\n') {
            Some(i) => self.pos += i + 1,
            None => self.pos = self.input.len(),
        }
    }

    fn scan_marker(&mut self) -> Token {
        // self.pos is at the backslash.
        self.pos += 1;
        let rest = self.rest();

        let alpha_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let prefix = &rest[..alpha_len];
        let after = &rest[alpha_len..];
        let digit_len = after
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after.len());
        let level: Option<u8> = after[..digit_len].parse().ok();
        let mut consumed = alpha_len + digit_len;
        let closing = after[digit_len..].starts_with('*');
        if closing {
            consumed += 1;
        }
        self.pos += consumed;

        if prefix.is_empty() {
            // A lone backslash; keep it inert.
            return Token::Unknown { tag: String::new() };
        }

        let tag = || format!("{}{}", prefix, &after[..digit_len]);

        match (prefix, closing) {
            ("id", false) => {
                let code = self.read_word().to_string();
                // The rest of the id line is a free-form comment.
                self.skip_line();
                Token::BookId { code }
            }
            ("c", false) => match parse_number(self.read_word()) {
                Some(n) => Token::Chapter(n),
                None => Token::Unknown { tag: tag() },
            },
            ("v", false) => match parse_verse_number(self.read_word()) {
                Some((number, end)) => Token::Verse { number, end },
                None => Token::Unknown { tag: tag() },
            },
            ("s", false) => Token::Heading {
                level: level.unwrap_or(1),
            },
            ("r", false) => Token::ReferenceLine,
            ("rem", false) => Token::Remark,
            ("h", false) => Token::BookName,
            ("toc", false) => Token::TableOfContents {
                level: level.unwrap_or(1),
            },
            ("mt", false) => Token::MajorTitle {
                level: level.unwrap_or(1),
            },
            ("p" | "m" | "pc" | "pi" | "nb", false) => Token::Paragraph,
            ("q", false) => Token::Poetry {
                level: level.unwrap_or(1),
            },
            ("b", false) => Token::LineBreak,
            ("d", false) => Token::HebrewSubtitle,
            ("wj", false) => Token::WordsOfJesusStart,
            ("wj", true) => Token::WordsOfJesusEnd,
            ("f", false) => Token::FootnoteStart {
                caller: parse_caller(self.read_word()),
            },
            ("f", true) => Token::FootnoteEnd,
            ("fr", false) => Token::FootnoteReference,
            ("ft" | "fq" | "fqa" | "fk" | "fl", false) => Token::FootnoteText,
            ("x", false) => {
                // Caller word on the opening marker; the span is discarded
                // downstream, but the caller must not leak into text.
                self.read_word();
                Token::CrossRefStart
            }
            ("x", true) => Token::CrossRefEnd,
            _ => Token::Unknown { tag: tag() },
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if self.pos >= self.input.len() {
                return None;
            }
            let rest = self.rest();
            if rest.as_bytes()[0] == b'\\' {
                return Some(self.scan_marker());
            }
            let run = match memchr(b'\\', rest.as_bytes()) {
                Some(i) => {
                    self.pos += i;
                    &rest[..i]
                }
                None => {
                    self.pos = self.input.len();
                    rest
                }
            };
            let text = normalize_whitespace(run);
            if !text.is_empty() {
                return Some(Token::Text(text));
            }
        }
    }
}

pub(crate) fn normalize_whitespace(run: &str) -> String {
    run.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a chapter number, tolerating trailing junk like `1.` or `1a`.
pub(crate) fn parse_number(word: &str) -> Option<u32> {
    let digits = word
        .find(|c: char| !c.is_ascii_digit())
        .map_or(word, |i| &word[..i]);
    digits.parse().ok()
}

/// Parse a verse number or combined range (`3-4`), keyed by its first value.
pub(crate) fn parse_verse_number(word: &str) -> Option<(u32, Option<u32>)> {
    let mut parts = word.splitn(2, ['-', '\u{2013}']);
    let number = parse_number(parts.next()?)?;
    let end = parts.next().and_then(parse_number).filter(|&e| e > number);
    Some((number, end))
}

pub(crate) fn parse_caller(word: &str) -> Caller {
    match word {
        "+" => Caller::Auto,
        "-" | "" => Caller::None,
        lit => Caller::Literal(lit.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Tokenizer::new(input).collect()
    }

    #[test]
    fn scans_chapter_and_verse_markers() {
        let toks = tokens("\\c 1\n\\v 1 In the beginning");
        assert_eq!(toks[0], Token::Chapter(1));
        assert_eq!(
            toks[1],
            Token::Verse {
                number: 1,
                end: None
            }
        );
        assert_eq!(toks[2], Token::Text("In the beginning".into()));
    }

    #[test]
    fn scans_verse_ranges() {
        let toks = tokens("\\v 3-4 text");
        assert_eq!(
            toks[0],
            Token::Verse {
                number: 3,
                end: Some(4)
            }
        );
    }

    #[test]
    fn inverted_range_drops_end() {
        let toks = tokens("\\v 4-3 text");
        assert_eq!(
            toks[0],
            Token::Verse {
                number: 4,
                end: None
            }
        );
    }

    #[test]
    fn id_line_yields_code_and_skips_comment() {
        let toks = tokens("\\id GEN - Berean Study Bible\n\\h Genesis\n");
        assert_eq!(toks[0], Token::BookId { code: "GEN".into() });
        assert_eq!(toks[1], Token::BookName);
    }

    #[test]
    fn footnote_callers() {
        assert_eq!(
            tokens("\\f + \\ft note \\f*")[0],
            Token::FootnoteStart {
                caller: Caller::Auto
            }
        );
        assert_eq!(
            tokens("\\f - \\ft note \\f*")[0],
            Token::FootnoteStart {
                caller: Caller::None
            }
        );
        assert_eq!(
            tokens("\\f a \\ft note \\f*")[0],
            Token::FootnoteStart {
                caller: Caller::Literal("a".into())
            }
        );
    }

    #[test]
    fn cross_ref_caller_does_not_leak_into_text() {
        let toks = tokens("\\x + \\xt John 1:1\\x* after");
        assert_eq!(toks[0], Token::CrossRefStart);
        assert!(toks.iter().any(|t| *t == Token::CrossRefEnd));
        assert!(!toks.iter().any(
            |t| matches!(t, Token::Text(s) if s.trim_start().starts_with('+'))
        ));
    }

    #[test]
    fn words_of_jesus_span() {
        let toks = tokens("\\wj Follow me\\wj* and");
        assert_eq!(toks[0], Token::WordsOfJesusStart);
        assert_eq!(toks[1], Token::Text("Follow me".into()));
        assert_eq!(toks[2], Token::WordsOfJesusEnd);
    }

    #[test]
    fn levels_default_to_one() {
        assert_eq!(tokens("\\s head")[0], Token::Heading { level: 1 });
        assert_eq!(tokens("\\s2 head")[0], Token::Heading { level: 2 });
        assert_eq!(tokens("\\q line")[0], Token::Poetry { level: 1 });
        assert_eq!(tokens("\\q2 line")[0], Token::Poetry { level: 2 });
    }

    #[test]
    fn unknown_markers_are_inert() {
        let toks = tokens("\\zweird text \\nd LORD\\nd* more");
        assert_eq!(toks[0], Token::Unknown { tag: "zweird".into() });
        assert!(toks.contains(&Token::Unknown { tag: "nd".into() }));
    }

    #[test]
    fn malformed_chapter_number_is_inert() {
        assert_eq!(tokens("\\c one")[0], Token::Unknown { tag: "c".into() });
    }

    #[test]
    fn strips_bom() {
        let toks = tokens("\u{feff}\\id EXO\n");
        assert_eq!(toks[0], Token::BookId { code: "EXO".into() });
    }
}
