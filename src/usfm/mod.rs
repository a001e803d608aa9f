//! USFM front-end: marker tokenizer plus the parse-tree builder.
//!
//! The builder is shared with the USX front-end; only the tokenizer is
//! USFM-specific.

mod parser;
pub(crate) mod tokenizer;

pub use parser::{ParseOutput, ParseTreeBuilder, ParseWarning, WarningCondition};
pub use tokenizer::{Token, Tokenizer};

use crate::error::Result;

/// Parse one raw USFM document (one book of one translation).
pub fn parse(content: &str) -> Result<ParseOutput> {
    ParseTreeBuilder::build(Tokenizer::new(content))
}
