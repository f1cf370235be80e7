use std::str::Lines;

/// Kind of a save-file line, decided from its first characters only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
  Comment,
  TableHeader,
  ChainHeader,
  Commit,
  Rule,
  Blank,
  Unrecognized,
}

/// A logical line with its 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedLine<'a> {
  pub number: usize,
  /// Line as it appeared in the input, without the newline.
  pub raw: &'a str,
  /// `raw` with surrounding whitespace removed; what the parsers read.
  pub text: &'a str,
  pub kind: LineKind,
}

impl<'a> ScannedLine<'a> {
  pub fn new(number: usize, raw: &'a str) -> ScannedLine<'a> {
    let text = raw.trim();
    ScannedLine { number, raw, text, kind: classify(text) }
  }
}

/// Classify an already trimmed line. The rest of the line is not validated.
pub fn classify(text: &str) -> LineKind {
  if text == "COMMIT" {
    return LineKind::Commit;
  }
  match text.chars().next() {
    None => LineKind::Blank,
    Some('#') => LineKind::Comment,
    Some('*') => LineKind::TableHeader,
    Some(':') => LineKind::ChainHeader,
    Some('-') => LineKind::Rule,
    Some(_) => LineKind::Unrecognized,
  }
}

/// Lazy line splitter over a complete dump.
pub struct Scanner<'a> {
  lines: Lines<'a>,
  number: usize,
}

pub fn scan(text: &str) -> Scanner<'_> {
  Scanner { lines: text.lines(), number: 0 }
}

impl<'a> Iterator for Scanner<'a> {
  type Item = ScannedLine<'a>;

  fn next(&mut self) -> Option<Self::Item> {
    let raw = self.lines.next()?;
    self.number += 1;
    Some(ScannedLine::new(self.number, raw))
  }
}
