use tracing::{debug, trace, warn};

use crate::error::{ParseError, ParseResult};
use crate::line::{self, ParsedLine};
use crate::model::{Document, Table};
use crate::scanner::ScannedLine;

/// What to do with a line that matches no known line kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnrecognizedPolicy {
  /// Fail with `ParseError::UnrecognizedLine`.
  Reject,
  /// Log a warning and drop the line.
  Skip,
}

impl Default for UnrecognizedPolicy {
  fn default() -> Self {
    UnrecognizedPolicy::Reject
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
  pub unrecognized: UnrecognizedPolicy,
}

impl ParseOptions {
  pub fn unrecognized(mut self, policy: UnrecognizedPolicy) -> Self {
    self.unrecognized = policy;
    self
  }
}

struct OpenTable {
  table: Table,
  line: usize,
  text: String,
}

enum State {
  Start,
  /// Header seen, collecting chains.
  InTable(OpenTable),
  /// At least one rule seen, chains are closed.
  InRules(OpenTable),
  Done,
}

/// Assembles classified lines into a `Document`.
///
/// Each table must read as header, chains, rules, `COMMIT`. Comments and
/// blank lines are accepted anywhere and dropped. After an error the builder
/// is spent and rejects further lines.
pub struct DocumentBuilder {
  options: ParseOptions,
  state: State,
  document: Document,
}

impl DocumentBuilder {
  pub fn new(options: ParseOptions) -> DocumentBuilder {
    DocumentBuilder {
      options,
      state: State::Start,
      document: Document::default(),
    }
  }

  pub fn feed(&mut self, line: ScannedLine) -> ParseResult<()> {
    let state = std::mem::replace(&mut self.state, State::Done);
    let parsed = line::parse_line(&line).map_err(|err| err.at(line.number, line.raw))?;

    self.state = match (state, parsed) {
      (State::Done, _) => {
        return Err(self::out_of_order(&line, "document is already finished"));
      }
      (state, ParsedLine::Blank) => state,
      (state, ParsedLine::Comment(_)) => {
        trace!(line = line.number, "skipping comment");
        state
      }
      (state, ParsedLine::Unrecognized) => match self.options.unrecognized {
        UnrecognizedPolicy::Reject => {
          return Err(ParseError::UnrecognizedLine { line: line.number, text: line.raw.to_string() });
        }
        UnrecognizedPolicy::Skip => {
          warn!(line = line.number, text = line.text, "skipping unrecognized line");
          state
        }
      },
      (State::Start, ParsedLine::TableHeader(name)) => {
        debug!(line = line.number, table = name.as_str(), "opening table");
        State::InTable(OpenTable {
          table: Table::new(name),
          line: line.number,
          text: line.raw.to_string(),
        })
      }
      (State::InTable(mut open), ParsedLine::ChainHeader(chain)) => {
        trace!(table = open.table.name.as_str(), chain = chain.name.as_str(), "chain");
        open.table.chains.push(chain);
        State::InTable(open)
      }
      (State::InTable(mut open), ParsedLine::Rule(rule))
      | (State::InRules(mut open), ParsedLine::Rule(rule)) => {
        trace!(table = open.table.name.as_str(), pieces = rule.pieces.len(), "rule");
        open.table.rules.push(rule);
        State::InRules(open)
      }
      (State::InTable(open), ParsedLine::Commit) | (State::InRules(open), ParsedLine::Commit) => {
        debug!(
          line = line.number,
          table = open.table.name.as_str(),
          chains = open.table.chains.len(),
          rules = open.table.rules.len(),
          "committing table"
        );
        self.document.tables.push(open.table);
        State::Start
      }
      (State::Start, ParsedLine::ChainHeader(_)) => {
        return Err(self::out_of_order(&line, "chain header before a table header"));
      }
      (State::Start, ParsedLine::Rule(_)) => {
        return Err(self::out_of_order(&line, "rule before a table header"));
      }
      (State::Start, ParsedLine::Commit) => {
        return Err(self::out_of_order(&line, "COMMIT without an open table"));
      }
      (State::InRules(_), ParsedLine::ChainHeader(_)) => {
        return Err(self::out_of_order(&line, "chain header after the first rule"));
      }
      (State::InTable(_), ParsedLine::TableHeader(_)) | (State::InRules(_), ParsedLine::TableHeader(_)) => {
        return Err(self::out_of_order(&line, "table header inside an open table"));
      }
    };
    Ok(())
  }

  /// End of input. Fails if a table is still open.
  pub fn finish(mut self) -> ParseResult<Document> {
    match std::mem::replace(&mut self.state, State::Done) {
      State::InTable(open) | State::InRules(open) => {
        Err(ParseError::UnterminatedTable { line: open.line, text: open.text })
      }
      State::Start | State::Done => Ok(self.document),
    }
  }
}

fn out_of_order(line: &ScannedLine, reason: &str) -> ParseError {
  ParseError::MalformedOrder {
    line: line.number,
    text: line.raw.to_string(),
    reason: reason.to_string(),
  }
}
