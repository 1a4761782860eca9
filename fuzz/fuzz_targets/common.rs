use ropey::Rope;
use the_lsp::LspPosition;
use the_snippet::IndentThresholds;

const MAX_TEMPLATE_BYTES: usize = 2 * 1024;
const MAX_DOCUMENT_BYTES: usize = 8 * 1024;

pub struct Insertion {
  pub template:   String,
  pub text:       Rope,
  pub position:   LspPosition,
  pub thresholds: IndentThresholds,
}

pub fn insertion_from_bytes(data: &[u8]) -> Insertion {
  let mut cursor = ByteCursor::new(data);
  let thresholds = IndentThresholds {
    nested_spaces: cursor.next_usize(8),
    nested_tabs:   cursor.next_usize(4),
    level_width:   cursor.next_usize(8),
  };
  let position = LspPosition::new(cursor.next_u16() as u32, cursor.next_u16() as u32);
  let template_len = cursor.next_usize(MAX_TEMPLATE_BYTES);
  let template = lossy_text(cursor.next_bytes(template_len));
  let document_len = cursor.next_usize(MAX_DOCUMENT_BYTES);
  let text = Rope::from_str(&lossy_text(cursor.next_bytes(document_len)));

  Insertion {
    template,
    text,
    position,
    thresholds,
  }
}

pub fn lossy_text(bytes: &[u8]) -> String {
  String::from_utf8_lossy(bytes).into_owned()
}

struct ByteCursor<'a> {
  data: &'a [u8],
  pos:  usize,
}

impl<'a> ByteCursor<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }

  fn next_u8(&mut self) -> u8 {
    let value = self.data.get(self.pos).copied().unwrap_or(0);
    self.pos = self.pos.saturating_add(1);
    value
  }

  fn next_u16(&mut self) -> u16 {
    let lo = self.next_u8() as u16;
    let hi = self.next_u8() as u16;
    lo | (hi << 8)
  }

  fn next_usize(&mut self, max: usize) -> usize {
    if max == 0 {
      return 0;
    }
    (self.next_u16() as usize) % (max + 1)
  }

  fn next_bytes(&mut self, len: usize) -> &'a [u8] {
    let start = self.pos.min(self.data.len());
    let end = start.saturating_add(len).min(self.data.len());
    self.pos = end;
    &self.data[start..end]
  }
}
