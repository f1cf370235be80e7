//! Parser for the text format written by `iptables-save`.
//!
//! ```text
//! *filter
//! :INPUT ACCEPT [10:500]
//! -A INPUT -p tcp --dport 22 -j ACCEPT
//! COMMIT
//! ```
//!
//! Lines are classified by their first character, rule lines are split into
//! `(argument, negated, value)` pieces, and a small state machine checks that
//! every table reads as header, chains, rules and `COMMIT`. Reading files and
//! printing the result are left to the caller.

use builder::DocumentBuilder;
use scanner::ScannedLine;

pub use builder::{ParseOptions, UnrecognizedPolicy};
pub use error::{LineError, ParseError, ParseResult};
pub use model::{Chain, Document, Rule, RulePiece, Table};

pub mod builder;
pub mod error;
pub mod iptparser;
pub mod line;
pub mod model;
pub mod scanner;

/// Parse a complete dump, rejecting unrecognized lines.
pub fn parse(text: &str) -> ParseResult<Document> {
  self::parse_with(text, &ParseOptions::default())
}

pub fn parse_with(text: &str, options: &ParseOptions) -> ParseResult<Document> {
  let mut builder = DocumentBuilder::new(options.clone());
  for line in scanner::scan(text) {
    builder.feed(line)?;
  }
  builder.finish()
}

/// Parse an ordered sequence of lines, numbered from 1.
pub fn parse_lines<I, S>(lines: I, options: &ParseOptions) -> ParseResult<Document>
  where I: IntoIterator<Item=S>, S: AsRef<str> {
  let mut builder = DocumentBuilder::new(options.clone());
  for (index, line) in lines.into_iter().enumerate() {
    builder.feed(ScannedLine::new(index + 1, line.as_ref()))?;
  }
  builder.finish()
}

/// Canonical save text of `document`.
pub fn render(document: &Document) -> String {
  document.to_string()
}
