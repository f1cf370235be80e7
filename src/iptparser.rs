use string_builder::Builder;
use text_reader::TextReader;

use crate::error::{LineError, LineResult};
use crate::model::{Rule, RulePiece};

/// A whitespace separated unit of a rule line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
  /// A standalone `!`.
  Negation,
  Word(String),
  /// Content of a `"..."` run, quotes removed.
  Quoted(String),
}

/// Split a rule line into tokens. Quotes only open a quoted run at the start
/// of a token; inside the run whitespace and dashes are kept verbatim and
/// `\"`/`\\` stand for `"`/`\`. A `"` inside a bare word, or text glued to a
/// closing quote, is rejected.
pub fn split_tokens(text: &str) -> LineResult<Vec<Token>> {
  let mut reader = TextReader::new(text.to_string());
  let mut tokens = vec![];
  let mut builder = Builder::default();
  let mut started = false;
  let mut quoted = false;
  let mut escaped = false;
  let mut closed = false;

  while let Some(ch) = reader.next() {
    if quoted {
      match ch {
        ch if escaped => {
          // unknown escapes stay as written
          if ch != '"' && ch != '\\' {
            builder.append('\\');
          }
          builder.append(ch);
          escaped = false;
        }
        '\\' => escaped = true,
        '"' => {
          let value = std::mem::take(&mut builder).string()?;
          tokens.push(Token::Quoted(value));
          quoted = false;
          closed = true;
        }
        ch => builder.append(ch),
      }
      continue;
    }
    match ch {
      ch if ch.is_whitespace() => {
        closed = false;
        if started {
          tokens.push(self::to_word(std::mem::take(&mut builder))?);
          started = false;
        }
      }
      ch if closed => return self::malformed(format!("unexpected `{}` after closing quote", ch)),
      '"' if started => return self::malformed("quote inside a word".to_string()),
      '"' => quoted = true,
      ch => {
        builder.append(ch);
        started = true;
      }
    }
  }

  if quoted {
    return self::malformed("unterminated quote".to_string());
  }
  if started {
    tokens.push(self::to_word(builder)?);
  }
  Ok(tokens)
}

fn to_word(builder: Builder) -> LineResult<Token> {
  let word = builder.string()?;
  if word == "!" {
    return Ok(Token::Negation);
  }
  Ok(Token::Word(word))
}

/// One or more dashes followed by a letter. A dash followed by a digit or any
/// other character is value content (`-1`, `10.0.0.1-10.0.0.9`).
pub fn starts_argument(word: &str) -> bool {
  let name = word.trim_start_matches('-');
  name.len() < word.len() && name.chars().next().map_or(false, |ch| ch.is_ascii_alphabetic())
}

fn is_value(token: &Token) -> bool {
  match token {
    Token::Word(word) => !self::starts_argument(word),
    Token::Quoted(_) => true,
    Token::Negation => false,
  }
}

fn malformed<T>(reason: String) -> LineResult<T> {
  Err(LineError::Rule(reason))
}

/// Turn a rule line into its ordered pieces.
///
/// A `!` before an argument, or between an argument and its value, negates
/// that piece. A `!` closing the line negates the last piece. A piece takes
/// every following value token up to the next argument or `!`, joined by a
/// single space, so `--tcp-flags FIN,SYN SYN` stays one piece.
pub fn tokenize_rule(text: &str) -> LineResult<Rule> {
  let tokens = self::split_tokens(text)?;
  let mut pieces = vec![];
  let mut pending = false;
  let mut cursor = 0;

  while cursor < tokens.len() {
    let argument = match &tokens[cursor] {
      Token::Negation => {
        if pending {
          return self::malformed("repeated `!`".to_string());
        }
        pending = true;
        cursor += 1;
        continue;
      }
      Token::Word(word) if word.starts_with('-') => {
        if word.trim_start_matches('-').is_empty() {
          return self::malformed(format!("argument `{}` has no name", word));
        }
        word.clone()
      }
      Token::Word(word) => return self::malformed(format!("expected an argument, found `{}`", word)),
      Token::Quoted(value) => return self::malformed(format!("expected an argument, found \"{}\"", value)),
    };
    cursor += 1;

    let mut negated = std::mem::replace(&mut pending, false);
    if let (Some(Token::Negation), Some(next)) = (tokens.get(cursor), tokens.get(cursor + 1)) {
      if self::is_value(next) {
        if negated {
          return self::malformed(format!("`{}` is negated twice", argument));
        }
        negated = true;
        cursor += 1;
      }
    }

    let mut values: Vec<&str> = vec![];
    while let Some(token) = tokens.get(cursor) {
      match token {
        Token::Word(word) if !self::starts_argument(word) => values.push(word),
        Token::Quoted(value) => values.push(value),
        _ => break,
      }
      cursor += 1;
    }

    if let Some(Token::Negation) = tokens.get(cursor) {
      if cursor + 1 == tokens.len() {
        if negated {
          return self::malformed(format!("`{}` is negated twice", argument));
        }
        negated = true;
        cursor += 1;
      }
    }

    let value = if values.is_empty() { None } else { Some(values.join(" ")) };
    pieces.push(RulePiece { argument, negated, value });
  }

  if pending {
    return self::malformed("`!` is not followed by an argument".to_string());
  }
  if pieces.is_empty() {
    return self::malformed("rule has no arguments".to_string());
  }
  Ok(Rule { pieces })
}
