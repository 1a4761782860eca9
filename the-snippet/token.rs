use std::fmt;

use crate::{
  TabstopIdx,
  escape_snippet_text,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetToken {
  Text(String),
  TabStop(TabstopIdx),
  Placeholder {
    index:   TabstopIdx,
    content: String,
  },
}

impl SnippetToken {
  pub fn text(content: impl Into<String>) -> Self {
    Self::Text(content.into())
  }

  pub fn tabstop(index: usize) -> Self {
    Self::TabStop(TabstopIdx::new(index))
  }

  pub fn placeholder(content: impl Into<String>, index: usize) -> Self {
    Self::Placeholder {
      index:   TabstopIdx::new(index),
      content: content.into(),
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Self::Text(_) => "text",
      Self::TabStop(_) => "tabstop",
      Self::Placeholder { .. } => "placeholder",
    }
  }

  pub fn index(&self) -> Option<TabstopIdx> {
    match self {
      Self::Text(_) => None,
      Self::TabStop(index) | Self::Placeholder { index, .. } => Some(*index),
    }
  }
}

/// Renders the token back to snippet syntax.
impl fmt::Display for SnippetToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut out = String::new();
    match self {
      Self::Text(content) => escape_snippet_text(content, &mut out),
      Self::TabStop(index) => {
        out.push('$');
        out.push_str(&index.to_string());
      },
      Self::Placeholder { index, content } => {
        out.push_str("${");
        out.push_str(&index.to_string());
        out.push(':');
        escape_snippet_text(content, &mut out);
        out.push('}');
      },
    }
    f.write_str(&out)
  }
}

/// Splits a snippet template into text, tab stop and placeholder tokens.
///
/// Recognized markers are `$N` and `${N:content}`. Index `0` is the implicit
/// final cursor and never produces a token. A template without any marker
/// yields an empty sequence, which callers treat as "not a snippet" and fall
/// back to the raw string. Anything that does not form a marker (a lone `$`,
/// an unterminated `${`, an empty placeholder) stays literal text.
///
/// Markers are consumed left to right in a single pass.
pub fn tokenize(template: &str) -> Vec<SnippetToken> {
  let mut tokens = Vec::new();
  let mut rest = template;
  let mut found_marker = false;

  while let Some(marker) = find_marker(rest) {
    found_marker = true;
    let prefix = &rest[..marker.start];
    if !prefix.is_empty() {
      tokens.push(SnippetToken::Text(prefix.to_owned()));
    }
    if let Some(token) = marker.token {
      tokens.push(token);
    }
    rest = &rest[marker.end..];
  }

  if found_marker && !rest.is_empty() {
    tokens.push(SnippetToken::Text(rest.to_owned()));
  }

  tokens
}

struct Marker {
  start: usize,
  end:   usize,
  token: Option<SnippetToken>,
}

fn find_marker(text: &str) -> Option<Marker> {
  let mut search_from = 0;
  while let Some(offset) = text[search_from..].find('$') {
    let start = search_from + offset;
    if let Some((end, token)) = marker_at(text, start + 1) {
      return Some(Marker { start, end, token });
    }
    search_from = start + 1;
  }
  None
}

/// Parses the marker body following a `$` at `pos - 1`.
///
/// Returns the byte offset just past the marker and the token it produces
/// (`None` for index 0).
fn marker_at(text: &str, pos: usize) -> Option<(usize, Option<SnippetToken>)> {
  let bytes = text.as_bytes();

  if let Some((index, end)) = parse_index(text, pos) {
    let token = (!index.is_final()).then_some(SnippetToken::TabStop(index));
    return Some((end, token));
  }

  if bytes.get(pos) != Some(&b'{') {
    return None;
  }
  let (index, colon) = parse_index(text, pos + 1)?;
  if bytes.get(colon) != Some(&b':') {
    return None;
  }

  let content_start = colon + 1;
  let mut content = String::new();
  let mut chars = text[content_start..].char_indices().peekable();
  while let Some((offset, ch)) = chars.next() {
    match ch {
      '\\' if matches!(chars.peek(), Some((_, '}'))) => {
        chars.next();
        content.push('}');
      },
      '}' => {
        if content.is_empty() {
          return None;
        }
        let end = content_start + offset + 1;
        let token = (!index.is_final()).then_some(SnippetToken::Placeholder { index, content });
        return Some((end, token));
      },
      _ => content.push(ch),
    }
  }

  None
}

fn parse_index(text: &str, pos: usize) -> Option<(TabstopIdx, usize)> {
  let digits = text
    .get(pos..)?
    .bytes()
    .take_while(u8::is_ascii_digit)
    .count();
  if digits == 0 {
    return None;
  }
  let end = pos + digits;
  let index = text[pos..end].parse::<usize>().ok()?;
  Some((TabstopIdx::new(index), end))
}
