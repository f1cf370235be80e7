use std::fmt;

use serde::{Deserialize, Serialize};

use crate::iptparser;

/// Policy placeholder of chains that have none, such as user-defined chains.
pub const NO_POLICY: &str = "-";

/// A parsed `iptables-save` dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
  /// Name without the leading `*`.
  pub name: String,
  pub chains: Vec<Chain>,
  pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
  pub name: String,
  /// Verbatim policy, `-` when the chain has none.
  pub policy: String,
  pub packet_counter: u64,
  pub byte_counter: u64,
}

/// Rule pieces in the order iptables evaluates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
  pub pieces: Vec<RulePiece>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePiece {
  /// Flag with its dashes, e.g. `-p` or `--dport`.
  pub argument: String,
  pub negated: bool,
  pub value: Option<String>,
}

impl Document {
  pub fn is_empty(&self) -> bool {
    self.tables.is_empty()
  }

  /// First table with the given name.
  pub fn table(&self, name: &str) -> Option<&Table> {
    self.tables.iter().find(|table| table.name == name)
  }
}

impl Table {
  pub fn new<S: Into<String>>(name: S) -> Table {
    Table {
      name: name.into(),
      chains: vec![],
      rules: vec![],
    }
  }

  pub fn chain(&self, name: &str) -> Option<&Chain> {
    self.chains.iter().find(|chain| chain.name == name)
  }

  pub fn chain_names(&self) -> Vec<&str> {
    self.chains.iter().map(|chain| &chain.name[..]).collect()
  }

  /// Rules appended to `chain`, in file order.
  pub fn rules_in<'a>(&'a self, chain: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
    self.rules.iter().filter(move |rule| rule.chain() == Some(chain))
  }
}

impl Chain {
  /// `None` for the `-` placeholder.
  pub fn policy(&self) -> Option<&str> {
    if self.policy == NO_POLICY {
      None
    } else {
      Some(&self.policy[..])
    }
  }
}

impl Rule {
  /// First piece carrying `argument`.
  pub fn piece(&self, argument: &str) -> Option<&RulePiece> {
    self.pieces.iter().find(|piece| piece.argument == argument)
  }

  /// Chain named by a leading `-A`/`--append`.
  pub fn chain(&self) -> Option<&str> {
    self.pieces.first()
      .filter(|piece| piece.argument == "-A" || piece.argument == "--append")
      .and_then(|piece| piece.value.as_deref())
  }

  /// Value of `-j`/`--jump`.
  pub fn target(&self) -> Option<&str> {
    self.pieces.iter()
      .find(|piece| piece.argument == "-j" || piece.argument == "--jump")
      .and_then(|piece| piece.value.as_deref())
  }
}

// Values that would not read back as the same single value get quoted.
fn needs_quoting(value: &str) -> bool {
  value.is_empty()
    || value == "!"
    || value.contains('"')
    || value.chars().any(char::is_whitespace)
    || iptparser::starts_argument(value)
}

impl fmt::Display for RulePiece {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if self.negated {
      write!(f, "! ")?;
    }
    write!(f, "{}", self.argument)?;
    match self.value {
      Some(ref value) if self::needs_quoting(value) => {
        write!(f, " \"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
      }
      Some(ref value) => write!(f, " {}", value),
      None => Ok(()),
    }
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for (index, piece) in self.pieces.iter().enumerate() {
      if index > 0 {
        write!(f, " ")?;
      }
      write!(f, "{}", piece)?;
    }
    Ok(())
  }
}

impl fmt::Display for Chain {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, ":{} {} [{}:{}]", self.name, self.policy, self.packet_counter, self.byte_counter)
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(f, "*{}", self.name)?;
    for chain in &self.chains {
      writeln!(f, "{}", chain)?;
    }
    for rule in &self.rules {
      writeln!(f, "{}", rule)?;
    }
    writeln!(f, "COMMIT")
  }
}

/// Canonical save text. Parsing it back yields an equal document.
impl fmt::Display for Document {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for table in &self.tables {
      write!(f, "{}", table)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rule(pieces: &[(&str, bool, Option<&str>)]) -> Rule {
    Rule {
      pieces: pieces.iter()
        .map(|(argument, negated, value)| RulePiece {
          argument: argument.to_string(),
          negated: *negated,
          value: value.map(|v| v.to_string()),
        })
        .collect(),
    }
  }

  #[test]
  fn test_render_rule() {
    let rule = rule(&[
      ("-A", false, Some("INPUT")),
      ("-s", true, Some("10.0.0.0/8")),
      ("--comment", false, Some("no ssh")),
      ("--syn", false, None),
      ("-j", false, Some("DROP")),
    ]);
    assert_eq!(rule.to_string(), "-A INPUT ! -s 10.0.0.0/8 --comment \"no ssh\" --syn -j DROP");
  }

  #[test]
  fn test_render_quotes_ambiguous_values() {
    let rule = rule(&[("--comment", false, Some("-bad")), ("--x", false, Some("")), ("--y", false, Some("!"))]);
    assert_eq!(rule.to_string(), "--comment \"-bad\" --x \"\" --y \"!\"");
  }

  #[test]
  fn test_render_escapes_quoted_values() {
    let rule = rule(&[("--comment", false, Some(r#"say "hi""#)), ("--log-prefix", false, Some(r"a\b c"))]);
    assert_eq!(rule.to_string(), r#"--comment "say \"hi\"" --log-prefix "a\\b c""#);
  }

  #[test]
  fn test_render_table() {
    let mut table = Table::new("filter");
    table.chains.push(Chain {
      name: "INPUT".to_string(),
      policy: "ACCEPT".to_string(),
      packet_counter: 10,
      byte_counter: 500,
    });
    table.rules.push(rule(&[("-A", false, Some("INPUT")), ("-j", false, Some("ACCEPT"))]));
    let document = Document { tables: vec![table] };
    assert_eq!(document.to_string(), "*filter\n:INPUT ACCEPT [10:500]\n-A INPUT -j ACCEPT\nCOMMIT\n");
  }

  #[test]
  fn test_lookups() {
    let mut table = Table::new("filter");
    table.chains.push(Chain {
      name: "LOGDROP".to_string(),
      policy: NO_POLICY.to_string(),
      packet_counter: 0,
      byte_counter: 0,
    });
    table.rules.push(rule(&[("-A", false, Some("INPUT")), ("-j", false, Some("LOGDROP"))]));
    table.rules.push(rule(&[("-A", false, Some("LOGDROP")), ("--jump", false, Some("DROP"))]));

    assert_eq!(table.chain("LOGDROP").and_then(Chain::policy), None);
    assert_eq!(table.chain_names(), vec!["LOGDROP"]);
    let targets: Vec<_> = table.rules_in("LOGDROP").filter_map(Rule::target).collect();
    assert_eq!(targets, vec!["DROP"]);
    assert_eq!(table.rules[0].piece("-j").and_then(|p| p.value.as_deref()), Some("LOGDROP"));
  }
}
