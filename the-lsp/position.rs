use std::path::Path;

use ropey::RopeSlice;
use serde::Deserialize;
use serde_json::{
  Value,
  json,
};

/// A position in LSP coordinates: zero-based line and UTF-16 column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct LspPosition {
  pub line:      u32,
  pub character: u32,
}

impl LspPosition {
  pub const fn new(line: u32, character: u32) -> Self {
    Self { line, character }
  }

  pub(crate) fn as_json(self) -> Value {
    json!({
      "line": self.line,
      "character": self.character,
    })
  }

  /// Char index of this position in `text`.
  ///
  /// Lines past the end clamp to the last line; columns past the end of the
  /// line clamp to the line end, before its line break. A column inside a surrogate pair rounds
  /// down to the start of that char.
  pub fn to_char_idx(self, text: RopeSlice) -> usize {
    if text.len_chars() == 0 {
      return 0;
    }

    let line = (self.line as usize).min(text.len_lines().saturating_sub(1));
    let line_start = text.line_to_char(line);
    let mut content_end = if line + 1 < text.len_lines() {
      text.line_to_char(line + 1)
    } else {
      text.len_chars()
    };
    while content_end > line_start && matches!(text.char(content_end - 1), '\n' | '\r') {
      content_end -= 1;
    }

    let mut utf16_count = 0u32;
    let mut char_idx = line_start;
    for ch in text.slice(line_start..content_end).chars() {
      let next = utf16_count.saturating_add(ch.len_utf16() as u32);
      if next > self.character {
        break;
      }
      utf16_count = next;
      char_idx = char_idx.saturating_add(1);
    }

    char_idx
  }

  pub fn from_char_idx(text: RopeSlice, pos: usize) -> Self {
    let pos = pos.min(text.len_chars());
    let line = text.char_to_line(pos);
    let line_start = text.line_to_char(line);
    let character = text
      .slice(line_start..pos)
      .chars()
      .map(|ch| ch.len_utf16() as u32)
      .sum::<u32>();

    Self {
      line: line as u32,
      character,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LspRange {
  pub start: LspPosition,
  pub end:   LspPosition,
}

impl LspRange {
  pub const fn new(start: LspPosition, end: LspPosition) -> Self {
    Self { start, end }
  }

  pub const fn point(position: LspPosition) -> Self {
    Self {
      start: position,
      end:   position,
    }
  }

  pub(crate) fn as_json(self) -> Value {
    json!({
      "start": self.start.as_json(),
      "end": self.end.as_json(),
    })
  }
}

/// `file://` URI for a local path, resolved against the working directory.
pub fn file_uri_for_path(path: &Path) -> Option<String> {
  let absolute = if path.is_absolute() {
    path.to_path_buf()
  } else {
    std::env::current_dir().ok()?.join(path)
  };
  url::Url::from_file_path(absolute)
    .ok()
    .map(String::from)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RangePayload {
  start: PositionPayload,
  end:   PositionPayload,
}

impl RangePayload {
  pub(crate) fn into_range(self) -> LspRange {
    LspRange {
      start: self.start.into_position(),
      end:   self.end.into_position(),
    }
  }
}

#[derive(Debug, Deserialize)]
struct PositionPayload {
  line:      u32,
  character: u32,
}

impl PositionPayload {
  fn into_position(self) -> LspPosition {
    LspPosition {
      line:      self.line,
      character: self.character,
    }
  }
}

#[cfg(test)]
mod tests {
  use ropey::Rope;

  use super::*;

  #[test]
  fn utf16_columns_map_to_char_indices() {
    let text = Rope::from("a😀b\nsecond");
    let slice = text.slice(..);

    assert_eq!(LspPosition::new(0, 0).to_char_idx(slice), 0);
    assert_eq!(LspPosition::new(0, 1).to_char_idx(slice), 1);
    // inside the surrogate pair
    assert_eq!(LspPosition::new(0, 2).to_char_idx(slice), 1);
    assert_eq!(LspPosition::new(0, 3).to_char_idx(slice), 2);
    assert_eq!(LspPosition::new(1, 3).to_char_idx(slice), 7);
  }

  #[test]
  fn out_of_range_positions_clamp() {
    let text = Rope::from("ab\ncd");
    let slice = text.slice(..);

    assert_eq!(LspPosition::new(0, 99).to_char_idx(slice), 2);
    assert_eq!(LspPosition::new(9, 1).to_char_idx(slice), 4);
    assert_eq!(LspPosition::new(9, 99).to_char_idx(slice), 5);
    assert_eq!(LspPosition::new(3, 3).to_char_idx(Rope::new().slice(..)), 0);
  }

  #[test]
  fn long_columns_stay_before_the_line_break() {
    let text = Rope::from("// note\r\nx\n");
    let slice = text.slice(..);

    assert_eq!(LspPosition::new(0, 99).to_char_idx(slice), 7);
    assert_eq!(LspPosition::new(1, 99).to_char_idx(slice), 10);
  }

  #[test]
  fn char_indices_map_back_to_utf16() {
    let text = Rope::from("a😀b\nsecond");
    let slice = text.slice(..);

    assert_eq!(LspPosition::from_char_idx(slice, 2), LspPosition::new(0, 3));
    assert_eq!(LspPosition::from_char_idx(slice, 5), LspPosition::new(1, 1));
  }

  #[cfg(unix)]
  #[test]
  fn file_uris_for_absolute_paths() {
    assert_eq!(
      file_uri_for_path(Path::new("/tmp/lib.rs")).as_deref(),
      Some("file:///tmp/lib.rs")
    );
  }
}
