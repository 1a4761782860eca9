#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use the_snippet::{
  parse_with,
  resolve_indenting,
  tokenize,
};

use crate::common::insertion_from_bytes;

fuzz_target!(|data: &[u8]| {
  let insertion = insertion_from_bytes(data);
  let text = insertion.text.slice(..);
  let pos = insertion.position.to_char_idx(text);

  let tokens = tokenize(&insertion.template);
  let decision = resolve_indenting(&insertion.template, text, pos, &insertion.thresholds);
  let snippet = parse_with(&insertion.template, Some(&decision), &insertion.thresholds);

  assert_eq!(snippet.is_some(), !tokens.is_empty());
  if let Some(snippet) = snippet {
    assert!(snippet.tabstops().count() <= tokens.len());
    let _ = snippet.to_snippet_string();
  }
});
