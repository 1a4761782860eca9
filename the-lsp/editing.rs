use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{
  Value,
  json,
};
use thiserror::Error;
use tracing::debug;

use crate::position::{
  LspRange,
  RangePayload,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LspTextEdit {
  pub range:    LspRange,
  pub new_text: String,
}

/// A text edit as decoded from a code action, tagged with the snippet
/// template the server attached to it through the action's `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateEdit {
  Plain(LspTextEdit),
  Templated {
    edit:     LspTextEdit,
    template: String,
  },
}

impl CandidateEdit {
  pub fn edit(&self) -> &LspTextEdit {
    match self {
      Self::Plain(edit) | Self::Templated { edit, .. } => edit,
    }
  }

  pub fn template(&self) -> Option<&str> {
    match self {
      Self::Plain(_) => None,
      Self::Templated { template, .. } => Some(template.as_str()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LspDocumentEdit {
  pub uri:     String,
  pub version: Option<i32>,
  pub edits:   Vec<CandidateEdit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LspWorkspaceEdit {
  pub documents: Vec<LspDocumentEdit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LspCommand {
  pub title:     String,
  pub command:   String,
  pub arguments: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LspCodeAction {
  pub title:        String,
  pub kind:         Option<String>,
  pub edit:         Option<LspWorkspaceEdit>,
  pub command:      Option<LspCommand>,
  pub is_preferred: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LspCodeActionOrCommand {
  Command(LspCommand),
  CodeAction(LspCodeAction),
}

#[derive(Debug, Error)]
pub enum EditingParseError {
  #[error("invalid lsp editing result shape")]
  InvalidShape,
  #[error("failed to decode lsp editing payload: {0}")]
  Decode(#[from] serde_json::Error),
}

pub fn code_action_params(
  uri: &str,
  range: LspRange,
  diagnostics: Value,
  only: Option<Vec<String>>,
) -> Value {
  let mut value = json!({
    "textDocument": { "uri": uri },
    "range": range.as_json(),
    "context": {
      "diagnostics": diagnostics,
    },
  });
  if let Some(only) = only
    && let Some(context) = value.get_mut("context").and_then(Value::as_object_mut)
  {
    context.insert("only".into(), json!(only));
  }
  value
}

pub fn parse_code_actions_response(
  result: Option<&Value>,
) -> Result<Vec<LspCodeActionOrCommand>, EditingParseError> {
  let Some(result) = result else {
    return Ok(Vec::new());
  };
  if result.is_null() {
    return Ok(Vec::new());
  }
  if !result.is_array() {
    return Err(EditingParseError::InvalidShape);
  }

  let payload: Vec<CodeActionOrCommandPayload> = serde_json::from_value(result.clone())?;
  Ok(
    payload
      .into_iter()
      .map(CodeActionOrCommandPayload::into_item)
      .collect(),
  )
}

/// Edits grouped per document, in the order documents first appear.
struct DocumentGroups<'a> {
  snippets: &'a SnippetDataPayload,
  groups:   IndexMap<String, LspDocumentEdit>,
}

impl<'a> DocumentGroups<'a> {
  fn new(snippets: &'a SnippetDataPayload) -> Self {
    Self {
      snippets,
      groups: IndexMap::new(),
    }
  }

  fn extend(&mut self, uri: String, version: Option<i32>, edits: Vec<TextEditPayload>) {
    let group = self
      .groups
      .entry(uri)
      .or_insert_with_key(|uri| {
        LspDocumentEdit {
          uri:     uri.clone(),
          version: None,
          edits:   Vec::new(),
        }
      });
    group.version = group.version.or(version);
    group.edits.extend(
      edits
        .into_iter()
        .map(|edit| self.snippets.attach(edit.into_text_edit())),
    );
  }

  fn finish(self) -> LspWorkspaceEdit {
    LspWorkspaceEdit {
      documents: self.groups.into_values().collect(),
    }
  }
}

fn workspace_edit_from_payload(
  payload: WorkspaceEditPayload,
  snippets: &SnippetDataPayload,
) -> LspWorkspaceEdit {
  let mut groups = DocumentGroups::new(snippets);
  for (uri, edits) in payload.changes {
    groups.extend(uri, None, edits);
  }
  for change in payload.document_changes {
    match change {
      DocumentChangePayload::Edit(edit) => {
        groups.extend(edit.text_document.uri, edit.text_document.version, edit.edits);
      },
      DocumentChangePayload::Resource(operation) => {
        debug!(kind = %operation.kind, uri = ?operation.uri, "skipping resource operation");
      },
    }
  }
  groups.finish()
}

/// Side-channel snippet templates carried in a code action's `data`.
#[derive(Debug, Default)]
struct SnippetDataPayload {
  snippet:  Option<String>,
  snippets: IndexMap<String, String>,
}

impl SnippetDataPayload {
  /// Each field is read on its own; a malformed `snippets` entry does not
  /// hide the action-wide `snippet`.
  fn from_data(data: Option<Value>) -> Self {
    let data = match data {
      None | Some(Value::Null) => return Self::default(),
      Some(Value::Object(data)) => data,
      Some(other) => {
        debug!(data = %other, "code action data carries no snippet templates");
        return Self::default();
      },
    };

    let snippet = match data.get("snippet") {
      None | Some(Value::Null) => None,
      Some(Value::String(template)) => Some(template.clone()),
      Some(other) => {
        debug!(snippet = %other, "ignoring non-string snippet template");
        None
      },
    };

    let mut snippets = IndexMap::new();
    match data.get("snippets") {
      None | Some(Value::Null) => {},
      Some(Value::Object(entries)) => {
        for (new_text, template) in entries {
          match template.as_str() {
            Some(template) => {
              snippets.insert(new_text.clone(), template.to_owned());
            },
            None => debug!(%new_text, "ignoring non-string keyed snippet template"),
          }
        }
      },
      Some(other) => debug!(snippets = %other, "ignoring malformed keyed snippet templates"),
    }

    Self { snippet, snippets }
  }

  /// Templates are keyed by the edit's replacement text, falling back to the
  /// action-wide template. An empty template means no template.
  fn template_for(&self, new_text: &str) -> Option<&str> {
    self
      .snippets
      .get(new_text)
      .or(self.snippet.as_ref())
      .map(String::as_str)
      .filter(|template| !template.is_empty())
  }

  fn attach(&self, edit: LspTextEdit) -> CandidateEdit {
    match self.template_for(&edit.new_text) {
      Some(template) => {
        CandidateEdit::Templated {
          template: template.to_owned(),
          edit,
        }
      },
      None => CandidateEdit::Plain(edit),
    }
  }
}

/// Commands are tried first: a code action's `command` is an object, never
/// a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CodeActionOrCommandPayload {
  Command(CommandPayload),
  CodeAction(CodeActionPayload),
}

impl CodeActionOrCommandPayload {
  fn into_item(self) -> LspCodeActionOrCommand {
    match self {
      Self::Command(command) => LspCodeActionOrCommand::Command(command.into()),
      Self::CodeAction(action) => LspCodeActionOrCommand::CodeAction(action.into_code_action()),
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeActionPayload {
  title:        String,
  kind:         Option<String>,
  edit:         Option<WorkspaceEditPayload>,
  command:      Option<CommandPayload>,
  #[serde(default)]
  is_preferred: bool,
  data:         Option<Value>,
}

impl CodeActionPayload {
  fn into_code_action(self) -> LspCodeAction {
    let snippets = SnippetDataPayload::from_data(self.data);
    LspCodeAction {
      title:        self.title,
      kind:         self.kind,
      edit:         self
        .edit
        .map(|edit| workspace_edit_from_payload(edit, &snippets))
        .filter(|edit| !edit.documents.is_empty()),
      command:      self.command.map(LspCommand::from),
      is_preferred: self.is_preferred,
    }
  }
}

#[derive(Debug, Deserialize)]
struct CommandPayload {
  title:     String,
  command:   String,
  arguments: Option<Vec<Value>>,
}

impl From<CommandPayload> for LspCommand {
  fn from(payload: CommandPayload) -> Self {
    Self {
      title:     payload.title,
      command:   payload.command,
      arguments: payload.arguments,
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceEditPayload {
  #[serde(default)]
  changes:          IndexMap<String, Vec<TextEditPayload>>,
  #[serde(default)]
  document_changes: Vec<DocumentChangePayload>,
}

/// A `documentChanges` entry. Resource operations (create, rename, delete)
/// are told apart by their `kind`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentChangePayload {
  Edit(TextDocumentEditPayload),
  Resource(ResourceOperationPayload),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextDocumentEditPayload {
  text_document: TextDocumentPayload,
  edits:         Vec<TextEditPayload>,
}

#[derive(Debug, Deserialize)]
struct TextDocumentPayload {
  uri:     String,
  version: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ResourceOperationPayload {
  kind: String,
  uri:  Option<String>,
}

/// Also decodes annotated edits; `annotationId` is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextEditPayload {
  range:    RangePayload,
  new_text: String,
}

impl TextEditPayload {
  fn into_text_edit(self) -> LspTextEdit {
    LspTextEdit {
      range:    self.range.into_range(),
      new_text: self.new_text,
    }
  }
}
