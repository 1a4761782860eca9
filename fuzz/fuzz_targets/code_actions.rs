#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use the_lsp::{
  NormalizeContext,
  host_actions_json,
  normalize_code_actions,
  parse_code_actions_response,
};

use crate::common::insertion_from_bytes;

const URI: &str = "file:///fuzz/lib.rs";

fuzz_target!(|data: &[u8]| {
  let insertion = insertion_from_bytes(data);
  let Ok(response) = serde_json::from_str::<Value>(&insertion.template) else {
    return;
  };
  let Ok(actions) = parse_code_actions_response(Some(&response)) else {
    return;
  };

  let context =
    NormalizeContext::for_document(URI, insertion.text.slice(..), insertion.thresholds);
  let host = normalize_code_actions(actions, &context);
  let _ = host_actions_json(&host);
});
