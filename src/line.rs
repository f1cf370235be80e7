use crate::error::{LineError, LineResult};
use crate::iptparser;
use crate::model::{Chain, Rule};
use crate::scanner::{LineKind, ScannedLine};

/// Typed payload of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
  /// Raw text including the leading `#`.
  Comment(String),
  TableHeader(String),
  ChainHeader(Chain),
  Commit,
  Rule(Rule),
  Blank,
  Unrecognized,
}

/// Dispatch a classified line to its parser.
pub fn parse_line(line: &ScannedLine) -> LineResult<ParsedLine> {
  Ok(match line.kind {
    LineKind::Comment => ParsedLine::Comment(line.text.to_string()),
    LineKind::TableHeader => ParsedLine::TableHeader(self::parse_table_header(line.text)?),
    LineKind::ChainHeader => ParsedLine::ChainHeader(self::parse_chain_header(line.text)?),
    LineKind::Commit => ParsedLine::Commit,
    LineKind::Rule => ParsedLine::Rule(iptparser::tokenize_rule(line.text)?),
    LineKind::Blank => ParsedLine::Blank,
    LineKind::Unrecognized => ParsedLine::Unrecognized,
  })
}

/// `*filter` -> `filter`
pub fn parse_table_header(text: &str) -> LineResult<String> {
  let name = text.strip_prefix('*')
    .ok_or_else(|| LineError::Table("missing `*`".to_string()))?
    .trim();
  if name.is_empty() {
    return Err(LineError::Table("table has no name".to_string()));
  }
  Ok(name.to_string())
}

/// `:INPUT ACCEPT [10:500]`
pub fn parse_chain_header(text: &str) -> LineResult<Chain> {
  let rest = text.strip_prefix(':')
    .ok_or_else(|| LineError::Chain("missing `:`".to_string()))?;
  let mut fields = rest.split_whitespace();
  let name = fields.next()
    .ok_or_else(|| LineError::Chain("chain has no name".to_string()))?;
  let policy = fields.next()
    .ok_or_else(|| LineError::Chain("missing policy".to_string()))?;
  if policy.starts_with('[') {
    return Err(LineError::Chain("missing policy".to_string()));
  }
  let counters = fields.next()
    .ok_or_else(|| LineError::Chain("missing counters".to_string()))?;
  if let Some(extra) = fields.next() {
    return Err(LineError::Chain(format!("unexpected `{}` after counters", extra)));
  }

  let counters = counters.strip_prefix('[')
    .ok_or_else(|| LineError::Chain("missing `[`".to_string()))?;
  let counters = counters.strip_suffix(']')
    .ok_or_else(|| LineError::Chain("missing `]`".to_string()))?;
  let (packets, bytes) = counters.split_once(':')
    .ok_or_else(|| LineError::Chain("missing `:` between counters".to_string()))?;

  Ok(Chain {
    name: name.to_string(),
    policy: policy.to_string(),
    packet_counter: self::parse_counter(packets)?,
    byte_counter: self::parse_counter(bytes)?,
  })
}

fn parse_counter(digits: &str) -> LineResult<u64> {
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return Err(LineError::Chain(format!("counter `{}` is not numeric", digits)));
  }
  digits.parse::<u64>()
    .map_err(|_| LineError::Chain(format!("counter `{}` is out of range", digits)))
}
