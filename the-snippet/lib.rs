//! Snippet templates smuggled through code action edits.
//!
//! Language servers can only mark completion edits as snippets, so code
//! actions ship their templates out of band and the client rebuilds the
//! interactive edit. This crate holds the pieces that do not care about the
//! protocol:
//! - [`tokenize`] splits a template into text, tab stops and placeholders
//! - [`build`] / [`parse`] compose tokens into a [`Snippet`]
//! - [`resolve_indenting`] decides how much of the template's own indentation
//!   must go so the host's automatic re-indent does not double it

mod indent;
mod snippet;
mod token;

use std::fmt;

pub use indent::{
  IndentThresholds,
  IndentingDecision,
  resolve_indenting,
};
pub use snippet::{
  Dedent,
  Snippet,
  SnippetSegment,
  build,
  parse,
  parse_with,
};
pub use token::{
  SnippetToken,
  tokenize,
};

#[derive(PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Clone, Copy)]
pub struct TabstopIdx(usize);

/// `$0`, the implicit final cursor position.
pub const FINAL_TABSTOP_IDX: TabstopIdx = TabstopIdx(0);

impl TabstopIdx {
  pub const fn new(index: usize) -> Self {
    Self(index)
  }

  pub const fn get(self) -> usize {
    self.0
  }

  pub const fn is_final(self) -> bool {
    self.0 == FINAL_TABSTOP_IDX.0
  }
}

impl fmt::Display for TabstopIdx {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Whitespace that does not end a line.
pub(crate) fn is_horizontal_whitespace(ch: char) -> bool {
  ch.is_whitespace() && ch != '\n' && ch != '\r'
}

/// Escapes text for snippet syntax (`$`, `}` and `\`).
pub(crate) fn escape_snippet_text(text: &str, out: &mut String) {
  for ch in text.chars() {
    if matches!(ch, '$' | '}' | '\\') {
      out.push('\\');
    }
    out.push(ch);
  }
}
