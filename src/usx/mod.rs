//! USX front-end: a depth-first walk of the element tree that maps each
//! element/attribute combination onto the USFM token vocabulary, so the
//! parse-tree builder never knows which format it is consuming.
//!
//! Element mapping:
//! - `<book code="GEN">` → book identification
//! - `<chapter number="N">` → chapter marker (`eid` end milestones are skipped)
//! - `<verse number="N">` / `number="N-M"` → verse marker
//! - `<para style="...">` → the same vocabulary as the USFM paragraph tags
//! - `<char style="wj|fr|ft|...">` → inline spans
//! - `<note style="f" caller="...">` → footnote span; `style="x"` → cross
//!   reference span (discarded); unknown note styles are discarded whole
//!   rather than letting annotation text leak into verse content

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::usfm::tokenizer::{
    Token, normalize_whitespace, parse_caller, parse_number, parse_verse_number,
};
use crate::usfm::{ParseOutput, ParseTreeBuilder};

/// Parse one raw USX document (one book of one translation).
pub fn parse(content: &str) -> Result<ParseOutput> {
    ParseTreeBuilder::build(tokenize(content)?)
}

/// What a `<char>` or `<note>` element contributes, remembered until its
/// end tag so the matching close token can be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Span {
    WordsOfJesus,
    FootnoteReference,
    FootnoteBody,
    Footnote,
    CrossRef,
    Inert,
}

/// Walk the element tree and produce the shared token stream.
pub fn tokenize(content: &str) -> Result<Vec<Token>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut tokens = Vec::new();
    // Open `<char>`/`<note>` spans, innermost last.
    let mut spans: Vec<Span> = Vec::new();
    // Text accumulates across entity references so a run split by `&#8211;`
    // stays one token.
    let mut text_buf = String::new();

    let flush = |buf: &mut String, tokens: &mut Vec<Token>| {
        let text = normalize_whitespace(buf);
        buf.clear();
        if !text.is_empty() {
            tokens.push(Token::Text(text));
        }
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                flush(&mut text_buf, &mut tokens);
                if let Some(span) = open_element(&e, true, &mut tokens)? {
                    spans.push(span);
                }
            }
            Event::Empty(e) => {
                flush(&mut text_buf, &mut tokens);
                open_element(&e, false, &mut tokens)?;
            }
            Event::End(e) => {
                flush(&mut text_buf, &mut tokens);
                let name = e.name();
                if matches!(name.as_ref(), b"char" | b"note") {
                    match spans.pop() {
                        Some(Span::WordsOfJesus) => tokens.push(Token::WordsOfJesusEnd),
                        // After `<char style="fr">`, following text is body.
                        Some(Span::FootnoteReference) => tokens.push(Token::FootnoteText),
                        Some(Span::Footnote) => tokens.push(Token::FootnoteEnd),
                        Some(Span::CrossRef) => tokens.push(Token::CrossRefEnd),
                        Some(Span::FootnoteBody) | Some(Span::Inert) | None => {}
                    }
                }
            }
            Event::Text(e) => {
                text_buf.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                text_buf.push_str(&resolve_entity(&entity));
            }
            Event::Eof => {
                flush(&mut text_buf, &mut tokens);
                break;
            }
            _ => {}
        }
    }

    Ok(tokens)
}

/// Resolve a general entity reference: the predefined XML five plus
/// numeric character references. Unknown entities resolve to nothing.
fn resolve_entity(entity: &str) -> String {
    match entity {
        "apos" => "'".to_string(),
        "quot" => "\"".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "amp" => "&".to_string(),
        _ => {
            let code = match entity.strip_prefix('#') {
                Some(hex) if hex.starts_with(['x', 'X']) => {
                    u32::from_str_radix(&hex[1..], 16).ok()
                }
                Some(dec) => dec.parse().ok(),
                None => None,
            };
            code.and_then(char::from_u32).map(String::from).unwrap_or_default()
        }
    }
}

/// Handle an opening (or empty) element, emitting its token. Returns the
/// span kind for elements whose end tag matters.
fn open_element(
    e: &BytesStart<'_>,
    _has_children: bool,
    tokens: &mut Vec<Token>,
) -> Result<Option<Span>> {
    match e.name().as_ref() {
        b"book" => {
            let code = attr(e, b"code")?.ok_or_else(|| {
                Error::InvalidUsx("<book> element without a code attribute".to_string())
            })?;
            tokens.push(Token::BookId { code });
            Ok(None)
        }
        b"chapter" => {
            match attr(e, b"number")? {
                Some(number) => match parse_number(&number) {
                    Some(n) => tokens.push(Token::Chapter(n)),
                    None => tokens.push(Token::Unknown { tag: "c".into() }),
                },
                // End milestones (`<chapter eid="GEN 1"/>`) carry no number.
                None if attr(e, b"eid")?.is_some() => {}
                None => {
                    return Err(Error::InvalidUsx(
                        "<chapter> element without a number or eid attribute".to_string(),
                    ));
                }
            }
            Ok(None)
        }
        b"verse" => {
            if let Some(number) = attr(e, b"number")? {
                match parse_verse_number(&number) {
                    Some((number, end)) => tokens.push(Token::Verse { number, end }),
                    None => tokens.push(Token::Unknown { tag: "v".into() }),
                }
            }
            Ok(None)
        }
        b"para" => {
            let style = attr(e, b"style")?.unwrap_or_default();
            tokens.push(para_token(&style));
            Ok(None)
        }
        b"char" => {
            let style = attr(e, b"style")?.unwrap_or_default();
            let (token, span) = char_token(&style);
            if let Some(token) = token {
                tokens.push(token);
            }
            Ok(Some(span))
        }
        b"note" => {
            let style = attr(e, b"style")?.unwrap_or_default();
            match style.as_str() {
                "f" | "fe" => {
                    let caller = attr(e, b"caller")?.unwrap_or_default();
                    tokens.push(Token::FootnoteStart {
                        caller: parse_caller(&caller),
                    });
                    Ok(Some(Span::Footnote))
                }
                // Cross references and unrecognized annotation kinds are
                // discarded whole.
                _ => {
                    tokens.push(Token::CrossRefStart);
                    Ok(Some(Span::CrossRef))
                }
            }
        }
        _ => Ok(None),
    }
}

/// Map a `<para>` style onto the USFM paragraph-marker vocabulary.
fn para_token(style: &str) -> Token {
    let (prefix, level) = split_style(style);
    match prefix {
        "s" => Token::Heading {
            level: level.unwrap_or(1),
        },
        "r" => Token::ReferenceLine,
        "rem" => Token::Remark,
        "h" => Token::BookName,
        "toc" => Token::TableOfContents {
            level: level.unwrap_or(1),
        },
        "mt" => Token::MajorTitle {
            level: level.unwrap_or(1),
        },
        "p" | "m" | "pc" | "pi" | "nb" => Token::Paragraph,
        "q" => Token::Poetry {
            level: level.unwrap_or(1),
        },
        "b" => Token::LineBreak,
        "d" => Token::HebrewSubtitle,
        _ => Token::Unknown {
            tag: style.to_string(),
        },
    }
}

fn char_token(style: &str) -> (Option<Token>, Span) {
    match style {
        "wj" => (Some(Token::WordsOfJesusStart), Span::WordsOfJesus),
        "fr" => (Some(Token::FootnoteReference), Span::FootnoteReference),
        "ft" | "fq" | "fqa" | "fk" | "fl" => (Some(Token::FootnoteText), Span::FootnoteBody),
        // Inline formatting we do not model; its text stays, inert.
        _ => (
            Some(Token::Unknown {
                tag: style.to_string(),
            }),
            Span::Inert,
        ),
    }
}

/// Split a style like `q2` into its alphabetic prefix and level digit.
fn split_style(style: &str) -> (&str, Option<u8>) {
    let alpha = style
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(style.len());
    (&style[..alpha], style[alpha..].parse().ok())
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Ok(Some(String::from_utf8(attr.value.to_vec())?));
        }
    }
    Ok(None)
}
