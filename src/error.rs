use std::string::FromUtf8Error;

use thiserror::Error;

/// Document level parse failure.
///
/// Every variant carries the 1-based line number and the raw text of the
/// offending line, untrimmed and without its newline. A parse is
/// all-or-nothing: no partial document is returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("line {line}: malformed table header `{text}`: {reason}")]
  MalformedTable { line: usize, text: String, reason: String },

  #[error("line {line}: malformed chain header `{text}`: {reason}")]
  MalformedChain { line: usize, text: String, reason: String },

  #[error("line {line}: malformed rule `{text}`: {reason}")]
  MalformedRule { line: usize, text: String, reason: String },

  #[error("line {line}: `{text}` is out of order: {reason}")]
  MalformedOrder { line: usize, text: String, reason: String },

  #[error("line {line}: table opened by `{text}` has no COMMIT")]
  UnterminatedTable { line: usize, text: String },

  #[error("line {line}: unrecognized line `{text}`")]
  UnrecognizedLine { line: usize, text: String },
}

/// Defines the Result type of a whole-document parse
pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
  /// Line number the error points at.
  pub fn line(&self) -> usize {
    match *self {
      ParseError::MalformedTable { line, .. }
      | ParseError::MalformedChain { line, .. }
      | ParseError::MalformedRule { line, .. }
      | ParseError::MalformedOrder { line, .. }
      | ParseError::UnterminatedTable { line, .. }
      | ParseError::UnrecognizedLine { line, .. } => line,
    }
  }

  /// Raw text of the line the error points at.
  pub fn text(&self) -> &str {
    match self {
      ParseError::MalformedTable { text, .. }
      | ParseError::MalformedChain { text, .. }
      | ParseError::MalformedRule { text, .. }
      | ParseError::MalformedOrder { text, .. }
      | ParseError::UnterminatedTable { text, .. }
      | ParseError::UnrecognizedLine { text, .. } => text,
    }
  }
}

/// Failure inside a single line, before it is placed in the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
  #[error("{0}")]
  Table(String),

  #[error("{0}")]
  Chain(String),

  #[error("{0}")]
  Rule(String),

  #[error(transparent)]
  FromUtf8Error(#[from] FromUtf8Error),
}

pub type LineResult<T> = Result<T, LineError>;

impl LineError {
  /// Attach the position of the line that failed.
  pub fn at(self, line: usize, text: &str) -> ParseError {
    let text = text.to_string();
    match self {
      LineError::Table(reason) => ParseError::MalformedTable { line, text, reason },
      LineError::Chain(reason) => ParseError::MalformedChain { line, text, reason },
      LineError::Rule(reason) => ParseError::MalformedRule { line, text, reason },
      LineError::FromUtf8Error(err) => ParseError::MalformedRule { line, text, reason: err.to_string() },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_line_error_keeps_position() {
    let err = LineError::Chain("missing `]`".to_string()).at(3, ":INPUT ACCEPT [0:0");
    assert_eq!(err.line(), 3);
    assert_eq!(err.text(), ":INPUT ACCEPT [0:0");
    assert!(matches!(err, ParseError::MalformedChain { .. }));
    assert_eq!(err.to_string(), "line 3: malformed chain header `:INPUT ACCEPT [0:0`: missing `]`");
  }

  #[test]
  fn test_unterminated_message() {
    let err = ParseError::UnterminatedTable { line: 1, text: "*nat".to_string() };
    assert_eq!(err.to_string(), "line 1: table opened by `*nat` has no COMMIT");
  }
}
