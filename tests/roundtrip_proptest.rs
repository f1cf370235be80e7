//! Property tests: rendering a parsed document and parsing it again gives the
//! same document.

use proptest::prelude::*;

fn table_name_strategy() -> impl Strategy<Value = String> {
  "[a-z]{1,8}"
}

fn chain_strategy() -> impl Strategy<Value = String> {
  (
    "[A-Z][A-Z0-9_]{0,10}",
    prop_oneof![Just("ACCEPT"), Just("DROP"), Just("RETURN"), Just("-")],
    any::<u64>(),
    any::<u64>(),
  )
    .prop_map(|(name, policy, packets, bytes)| format!(":{} {} [{}:{}]", name, policy, packets, bytes))
}

fn argument_strategy() -> impl Strategy<Value = String> {
  prop_oneof![
    "-[a-zA-Z]",
    "--[a-z][a-z-]{0,10}",
  ]
}

fn quote(content: &str) -> String {
  format!("\"{}\"", content.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Value tokens as they appear in a dump, quotes included.
fn value_strategy() -> impl Strategy<Value = String> {
  prop_oneof![
    "[a-zA-Z0-9./,:_]{1,12}",
    "[0-9]{1,3}-[0-9]{1,3}",
    "-[0-9]{1,4}",
    "[a-z\\\\][a-z!\\\\]{0,5}",
    "[a-z][a-z -]{0,15}".prop_map(|v| quote(&v)),
    "[a-z \"\\\\!-]{0,12}".prop_map(|v| quote(&v)),
  ]
}

/// Words that may carry stray quotes, backslashes and `!`.
fn noisy_word_strategy() -> impl Strategy<Value = String> {
  "[a-z\"\\\\!-]{1,6}"
}

fn piece_strategy() -> impl Strategy<Value = String> {
  (argument_strategy(), prop::option::of(value_strategy()), any::<bool>(), any::<bool>())
    .prop_map(|(argument, value, negated, leading)| match (value, negated) {
      (None, false) => argument,
      (None, true) => format!("! {}", argument),
      (Some(value), false) => format!("{} {}", argument, value),
      (Some(value), true) if leading => format!("! {} {}", argument, value),
      (Some(value), true) => format!("{} ! {}", argument, value),
    })
}

fn rule_strategy() -> impl Strategy<Value = String> {
  ("[A-Z]{1,8}", prop::collection::vec(piece_strategy(), 0..6))
    .prop_map(|(chain, pieces)| {
      let mut line = format!("-A {}", chain);
      for piece in pieces {
        line.push(' ');
        line.push_str(&piece);
      }
      line
    })
}

fn table_strategy() -> impl Strategy<Value = String> {
  (
    table_name_strategy(),
    prop::collection::vec(chain_strategy(), 0..4),
    prop::collection::vec(rule_strategy(), 0..6),
  )
    .prop_map(|(name, chains, rules)| {
      let mut lines = vec![format!("*{}", name)];
      lines.extend(chains);
      lines.extend(rules);
      lines.push("COMMIT".to_string());
      lines.join("\n")
    })
}

fn document_strategy() -> impl Strategy<Value = String> {
  prop::collection::vec(table_strategy(), 0..3)
    .prop_map(|tables| format!("# Generated by iptables-save\n{}\n", tables.join("\n")))
}

proptest! {
  #[test]
  fn test_render_round_trip(text in document_strategy()) {
    let document = riptables_save::parse(&text);
    prop_assert!(document.is_ok(), "failed to parse: {}\n{:?}", text, document);
    let document = document.unwrap();

    let rendered = riptables_save::render(&document);
    let reparsed = riptables_save::parse(&rendered);
    prop_assert_eq!(reparsed, Ok(document), "rendered:\n{}", rendered);
  }

  #[test]
  fn test_noisy_rules_round_trip_or_fail(words in prop::collection::vec(noisy_word_strategy(), 1..5)) {
    let text = format!("*t\n-A X --c {}\nCOMMIT\n", words.join(" "));
    match riptables_save::parse(&text) {
      Ok(document) => {
        let rendered = riptables_save::render(&document);
        prop_assert_eq!(riptables_save::parse(&rendered), Ok(document), "rendered:\n{}", rendered);
      }
      Err(err) => {
        let malformed_rule = matches!(err, riptables_save::ParseError::MalformedRule { line: 2, .. });
        prop_assert!(malformed_rule, "{}: {}", text, err);
      }
    }
  }

  #[test]
  fn test_negation_placement_is_normalized(argument in argument_strategy(), value in "[a-z0-9.]{1,8}") {
    let before_value = riptables_save::parse(&format!("*t\n-A X {} ! {}\nCOMMIT\n", argument, value)).unwrap();
    let before_argument = riptables_save::parse(&format!("*t\n-A X ! {} {}\nCOMMIT\n", argument, value)).unwrap();
    prop_assert_eq!(&before_value, &before_argument);
    prop_assert!(before_value.tables[0].rules[0].pieces[1].negated);
  }
}
