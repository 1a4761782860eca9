use serde_json::{
  Map,
  Value,
  json,
};
use the_snippet::Snippet;

use crate::{
  editing::{
    LspCommand,
    LspTextEdit,
  },
  position::LspRange,
};

/// Edit whose body is an interactive snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetTextEdit {
  pub range:   LspRange,
  pub snippet: Snippet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEdit {
  Text(LspTextEdit),
  Snippet(SnippetTextEdit),
}

impl HostEdit {
  pub fn range(&self) -> LspRange {
    match self {
      Self::Text(edit) => edit.range,
      Self::Snippet(edit) => edit.range,
    }
  }

  pub fn is_snippet(&self) -> bool {
    matches!(self, Self::Snippet(_))
  }

  fn as_json(&self) -> Value {
    match self {
      Self::Text(edit) => {
        json!({
          "range": edit.range.as_json(),
          "newText": edit.new_text,
        })
      },
      Self::Snippet(edit) => {
        json!({
          "range": edit.range.as_json(),
          "snippet": {
            "kind": "snippet",
            "value": edit.snippet.to_snippet_string(),
          },
        })
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDocumentEdit {
  pub uri:     String,
  pub version: Option<i32>,
  pub edits:   Vec<HostEdit>,
}

impl HostDocumentEdit {
  fn as_json(&self) -> Value {
    json!({
      "textDocument": {
        "uri": self.uri,
        "version": self.version,
      },
      "edits": self.edits.iter().map(HostEdit::as_json).collect::<Vec<_>>(),
    })
  }
}

/// A code action ready for the host. `documents` is applied as one atomic
/// multi-file edit.
#[derive(Debug, Clone, PartialEq)]
pub struct HostCodeAction {
  pub title:        String,
  pub kind:         Option<String>,
  pub is_preferred: bool,
  pub documents:    Vec<HostDocumentEdit>,
  pub command:      Option<LspCommand>,
}

impl HostCodeAction {
  pub fn edit_count(&self) -> usize {
    self
      .documents
      .iter()
      .map(|document| document.edits.len())
      .sum()
  }

  fn as_json(&self) -> Value {
    let mut object = Map::new();
    object.insert("title".into(), json!(self.title));
    if let Some(kind) = &self.kind {
      object.insert("kind".into(), json!(kind));
    }
    object.insert("isPreferred".into(), json!(self.is_preferred));
    if !self.documents.is_empty() {
      object.insert(
        "edit".into(),
        json!({
          "documentChanges": self
            .documents
            .iter()
            .map(HostDocumentEdit::as_json)
            .collect::<Vec<_>>(),
        }),
      );
    }
    if let Some(command) = &self.command {
      object.insert("command".into(), command_json(command));
    }
    Value::Object(object)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostAction {
  Command(LspCommand),
  CodeAction(HostCodeAction),
}

impl HostAction {
  pub fn title(&self) -> &str {
    match self {
      Self::Command(command) => &command.title,
      Self::CodeAction(action) => &action.title,
    }
  }
}

/// Encodes host actions in LSP 3.18 shape: edits go into `documentChanges`
/// and interactive edits become `SnippetTextEdit`s.
pub fn host_actions_json(actions: &[HostAction]) -> Value {
  Value::Array(
    actions
      .iter()
      .map(|action| {
        match action {
          HostAction::Command(command) => command_json(command),
          HostAction::CodeAction(action) => action.as_json(),
        }
      })
      .collect(),
  )
}

fn command_json(command: &LspCommand) -> Value {
  match &command.arguments {
    Some(arguments) => {
      json!({
        "title": command.title,
        "command": command.command,
        "arguments": arguments,
      })
    },
    None => {
      json!({
        "title": command.title,
        "command": command.command,
      })
    },
  }
}

#[cfg(test)]
mod tests {
  use the_snippet::parse;

  use super::*;
  use crate::position::LspPosition;

  #[test]
  fn encodes_text_and_snippet_edits() {
    let range = LspRange::point(LspPosition::new(3, 4));
    let action = HostAction::CodeAction(HostCodeAction {
      title:        "Add storage".into(),
      kind:         Some("refactor.rewrite".into()),
      is_preferred: false,
      documents:    vec![HostDocumentEdit {
        uri:     "file:///tmp/lib.rs".into(),
        version: Some(1),
        edits:   vec![
          HostEdit::Snippet(SnippetTextEdit {
            range,
            snippet: parse("struct ${1:S} {}", None).expect("snippet"),
          }),
          HostEdit::Text(LspTextEdit {
            range,
            new_text: "\n".into(),
          }),
        ],
      }],
      command:      None,
    });

    let value = host_actions_json(&[action]);
    assert_eq!(value, json!([{
      "title": "Add storage",
      "kind": "refactor.rewrite",
      "isPreferred": false,
      "edit": {
        "documentChanges": [{
          "textDocument": { "uri": "file:///tmp/lib.rs", "version": 1 },
          "edits": [
            {
              "range": {
                "start": { "line": 3, "character": 4 },
                "end": { "line": 3, "character": 4 },
              },
              "snippet": { "kind": "snippet", "value": "struct ${1:S} {\\}" },
            },
            {
              "range": {
                "start": { "line": 3, "character": 4 },
                "end": { "line": 3, "character": 4 },
              },
              "newText": "\n",
            },
          ],
        }],
      },
    }]));
  }

  #[test]
  fn encodes_bare_commands() {
    let value = host_actions_json(&[HostAction::Command(LspCommand {
      title:     "Run".into(),
      command:   "ink.run".into(),
      arguments: None,
    })]);
    assert_eq!(value, json!([{ "title": "Run", "command": "ink.run" }]));
  }
}
