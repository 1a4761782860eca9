use ropey::RopeSlice;
use serde::Deserialize;
use tracing::trace;

use crate::is_horizontal_whitespace;

/// Host editor re-indent thresholds.
///
/// These are observed behavior of the host's snippet insertion, not a
/// formatting rule. Keep the defaults unless the host changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct IndentThresholds {
  /// Leading spaces that count as more than one level of indentation.
  pub nested_spaces: usize,
  /// Leading tabs that count as more than one level of indentation.
  pub nested_tabs:   usize,
  /// Characters removed when reducing by one level.
  pub level_width:   usize,
}

impl Default for IndentThresholds {
  fn default() -> Self {
    Self {
      nested_spaces: 5,
      nested_tabs:   2,
      level_width:   4,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndentingDecision {
  pub reduce_one_level:     bool,
  /// Takes precedence over `reduce_one_level`.
  pub remove_all_top_level: bool,
  pub previous_char:        Option<char>,
}

impl IndentingDecision {
  pub fn strips_indent(&self) -> bool {
    self.reduce_one_level || self.remove_all_top_level
  }
}

/// Decides how much of `template`'s indentation to strip when it is inserted
/// at char index `pos` of `text`.
///
/// The host re-indents every line of a multi-line snippet to the current
/// line's indentation, but only after whitespace, a comment, a block or
/// statement end (`}` / `;`), or at the start of a block (`{`) when the
/// template is nested deeper than one level.
pub fn resolve_indenting(
  template: &str,
  text: RopeSlice,
  pos: usize,
  thresholds: &IndentThresholds,
) -> IndentingDecision {
  let pos = pos.min(text.len_chars());
  let line = text.char_to_line(pos);
  let line_start = text.line_to_char(line);
  let column = pos - line_start;

  if column == 0 {
    return IndentingDecision {
      reduce_one_level:     false,
      remove_all_top_level: false,
      previous_char:        (line != 0).then_some('\n'),
    };
  }

  let previous = text.char(pos - 1);
  let after_whitespace_block_or_statement =
    previous.is_whitespace() || previous == '}' || previous == ';';
  // `///` doc comments contain `//` as well
  let after_comment = comment_start(text.line(line)).is_some_and(|start| column > start);
  let at_block_start = previous == '{';

  let remove_all = after_whitespace_block_or_statement || after_comment;
  let decision = IndentingDecision {
    reduce_one_level:     remove_all
      || (at_block_start && is_nested_more_than_one_level(template, thresholds)),
    remove_all_top_level: remove_all,
    previous_char:        Some(previous),
  };

  trace!(
    previous = ?decision.previous_char,
    reduce = decision.reduce_one_level,
    remove_all = decision.remove_all_top_level,
    "resolved snippet indenting"
  );
  decision
}

/// Column of the first `//` on the line.
fn comment_start(line: RopeSlice) -> Option<usize> {
  let mut previous_slash = false;
  for (idx, ch) in line.chars().enumerate() {
    if ch == '/' {
      if previous_slash {
        return Some(idx - 1);
      }
      previous_slash = true;
    } else {
      previous_slash = false;
    }
  }
  None
}

/// Whether the template's first line (after leading newlines) is indented
/// more than one level.
fn is_nested_more_than_one_level(template: &str, thresholds: &IndentThresholds) -> bool {
  let body = template.trim_start_matches('\n');
  let leading = |excluded: char| {
    body
      .chars()
      .take_while(|&ch| is_horizontal_whitespace(ch) && ch != excluded)
      .count()
  };

  leading('\t') >= thresholds.nested_spaces || leading(' ') >= thresholds.nested_tabs
}
