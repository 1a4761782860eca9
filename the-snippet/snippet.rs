use crate::{
  IndentThresholds,
  IndentingDecision,
  SnippetToken,
  TabstopIdx,
  escape_snippet_text,
  is_horizontal_whitespace,
  tokenize,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetSegment {
  Text(String),
  TabStop(TabstopIdx),
  Placeholder {
    index:   TabstopIdx,
    content: String,
  },
}

/// An interactive edit body: literal text interleaved with tab stops and
/// placeholders, ready to hand to the host editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippet {
  segments: Vec<SnippetSegment>,
}

impl Snippet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn segments(&self) -> &[SnippetSegment] {
    &self.segments
  }

  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }

  pub fn append_text(&mut self, text: impl Into<String>) -> &mut Self {
    self.segments.push(SnippetSegment::Text(text.into()));
    self
  }

  pub fn append_tabstop(&mut self, index: TabstopIdx) -> &mut Self {
    self.segments.push(SnippetSegment::TabStop(index));
    self
  }

  pub fn append_placeholder(&mut self, content: impl Into<String>, index: TabstopIdx) -> &mut Self {
    self.segments.push(SnippetSegment::Placeholder {
      index,
      content: content.into(),
    });
    self
  }

  /// Snippet syntax as the host stores it, with `$`, `}` and `\` escaped.
  ///
  /// Templates render back unchanged only when their text has none of those
  /// characters: a literal `}` comes out as `\}`. Segments are kept as
  /// tokenized either way.
  pub fn to_snippet_string(&self) -> String {
    let mut out = String::new();
    for segment in &self.segments {
      match segment {
        SnippetSegment::Text(text) => escape_snippet_text(text, &mut out),
        SnippetSegment::TabStop(index) => {
          out.push('$');
          out.push_str(&index.to_string());
        },
        SnippetSegment::Placeholder { index, content } => {
          out.push_str("${");
          out.push_str(&index.to_string());
          out.push(':');
          escape_snippet_text(content, &mut out);
          out.push('}');
        },
      }
    }
    out
  }

  /// Text inserted when every placeholder is accepted as-is.
  pub fn plain_text(&self) -> String {
    self
      .segments
      .iter()
      .filter_map(|segment| {
        match segment {
          SnippetSegment::Text(text) => Some(text.as_str()),
          SnippetSegment::Placeholder { content, .. } => Some(content.as_str()),
          SnippetSegment::TabStop(_) => None,
        }
      })
      .collect()
  }

  pub fn tabstops(&self) -> impl Iterator<Item = TabstopIdx> + '_ {
    self.segments.iter().filter_map(|segment| {
      match segment {
        SnippetSegment::Text(_) => None,
        SnippetSegment::TabStop(index) | SnippetSegment::Placeholder { index, .. } => Some(*index),
      }
    })
  }
}

/// Indentation rewrite applied to every text token of one template.
///
/// The indent is detected once on the whole template so that text tokens
/// split apart by markers are all rewritten the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dedent {
  pattern:     String,
  replacement: String,
}

impl Dedent {
  /// Returns `None` when the decision keeps indentation or the template has
  /// no indented line.
  pub fn new(
    template: &str,
    decision: &IndentingDecision,
    thresholds: &IndentThresholds,
  ) -> Option<Self> {
    if !decision.strips_indent() {
      return None;
    }

    let indent = detect_indent(template)?;
    let replacement = if decision.remove_all_top_level {
      String::new()
    } else {
      reduce_one_level(indent, thresholds.level_width)
    };

    Some(Self {
      pattern:     format!("\n{indent}"),
      replacement: format!("\n{replacement}"),
    })
  }

  pub fn apply(&self, text: &str) -> String {
    text.replace(&self.pattern, &self.replacement)
  }
}

/// Leading whitespace of the first line that has any.
fn detect_indent(template: &str) -> Option<&str> {
  template.split('\n').find_map(|line| {
    let end = line
      .char_indices()
      .find(|&(_, ch)| !is_horizontal_whitespace(ch))
      .map_or(line.len(), |(idx, _)| idx);
    (end > 0).then(|| &line[..end])
  })
}

/// Drops one level from `indent`: `width` leading characters if there are
/// that many, otherwise the first tab.
fn reduce_one_level(indent: &str, width: usize) -> String {
  if width == 0 {
    return indent.to_owned();
  }
  if let Some((idx, ch)) = indent.char_indices().nth(width - 1) {
    return indent[idx + ch.len_utf8()..].to_owned();
  }
  indent.replacen('\t', "", 1)
}

/// Composes tokens into a [`Snippet`], rewriting text indentation with
/// `dedent` when given. Returns `None` for an empty token sequence.
pub fn build(tokens: Vec<SnippetToken>, dedent: Option<&Dedent>) -> Option<Snippet> {
  if tokens.is_empty() {
    return None;
  }

  let snippet = tokens
    .into_iter()
    .fold(Snippet::new(), |mut snippet, token| {
      match token {
        SnippetToken::TabStop(index) => {
          snippet.append_tabstop(index);
        },
        SnippetToken::Placeholder { index, content } => {
          snippet.append_placeholder(content, index);
        },
        SnippetToken::Text(text) => {
          let text = match dedent {
            Some(dedent) if !text.is_empty() => dedent.apply(&text),
            _ => text,
          };
          snippet.append_text(text);
        },
      }
      snippet
    });

  Some(snippet)
}

/// Tokenizes and builds `template` with the default thresholds.
pub fn parse(template: &str, decision: Option<&IndentingDecision>) -> Option<Snippet> {
  parse_with(template, decision, &IndentThresholds::default())
}

pub fn parse_with(
  template: &str,
  decision: Option<&IndentingDecision>,
  thresholds: &IndentThresholds,
) -> Option<Snippet> {
  let tokens = tokenize(template);
  if tokens.is_empty() {
    return None;
  }
  let dedent = decision.and_then(|decision| Dedent::new(template, decision, thresholds));
  build(tokens, dedent.as_ref())
}
