use std::collections::HashMap;

use ropey::RopeSlice;
use the_snippet::{
  IndentThresholds,
  parse_with,
  resolve_indenting,
};
use tracing::debug;

use crate::{
  editing::{
    CandidateEdit,
    LspCodeAction,
    LspCodeActionOrCommand,
    LspDocumentEdit,
  },
  host::{
    HostAction,
    HostCodeAction,
    HostDocumentEdit,
    HostEdit,
    SnippetTextEdit,
  },
};

/// Document text available while normalizing one code action response.
#[derive(Debug, Clone, Default)]
pub struct NormalizeContext<'a> {
  documents:  HashMap<&'a str, RopeSlice<'a>>,
  thresholds: IndentThresholds,
}

impl<'a> NormalizeContext<'a> {
  pub fn new(thresholds: IndentThresholds) -> Self {
    Self {
      documents: HashMap::new(),
      thresholds,
    }
  }

  /// Context for the document the code actions were requested for.
  pub fn for_document(uri: &'a str, text: RopeSlice<'a>, thresholds: IndentThresholds) -> Self {
    Self::new(thresholds).with_document(uri, text)
  }

  pub fn with_document(mut self, uri: &'a str, text: RopeSlice<'a>) -> Self {
    self.documents.insert(uri, text);
    self
  }

  pub fn thresholds(&self) -> &IndentThresholds {
    &self.thresholds
  }

  fn document(&self, uri: &str) -> Option<RopeSlice<'a>> {
    self.documents.get(uri).copied()
  }
}

/// Turns a code action response into actions the host can apply.
///
/// Edits with a snippet template become interactive edits; everything else,
/// including templates without any tab stop, stays a plain text edit. Code
/// actions without edits are dropped even when they carry a command; bare
/// commands pass through.
pub fn normalize_code_actions(
  actions: Vec<LspCodeActionOrCommand>,
  context: &NormalizeContext<'_>,
) -> Vec<HostAction> {
  actions
    .into_iter()
    .filter_map(|action| {
      match action {
        LspCodeActionOrCommand::Command(command) => Some(HostAction::Command(command)),
        LspCodeActionOrCommand::CodeAction(action) => {
          normalize_code_action(action, context).map(HostAction::CodeAction)
        },
      }
    })
    .collect()
}

fn normalize_code_action(
  action: LspCodeAction,
  context: &NormalizeContext<'_>,
) -> Option<HostCodeAction> {
  let LspCodeAction {
    title,
    kind,
    edit,
    command,
    is_preferred,
  } = action;

  let documents: Vec<_> = edit
    .into_iter()
    .flat_map(|edit| edit.documents)
    .filter_map(|document| normalize_document(document, context))
    .collect();
  if documents.is_empty() {
    debug!(%title, "dropping code action without edits");
    return None;
  }

  Some(HostCodeAction {
    title,
    kind,
    is_preferred,
    documents,
    command,
  })
}

fn normalize_document(
  document: LspDocumentEdit,
  context: &NormalizeContext<'_>,
) -> Option<HostDocumentEdit> {
  if document.edits.is_empty() {
    return None;
  }

  let text = context.document(&document.uri);
  let edits = document
    .edits
    .into_iter()
    .map(|edit| normalize_edit(edit, &document.uri, text, context.thresholds()))
    .collect();

  Some(HostDocumentEdit {
    uri: document.uri,
    version: document.version,
    edits,
  })
}

fn normalize_edit(
  candidate: CandidateEdit,
  uri: &str,
  text: Option<RopeSlice<'_>>,
  thresholds: &IndentThresholds,
) -> HostEdit {
  let (edit, template) = match candidate {
    CandidateEdit::Plain(edit) => return HostEdit::Text(edit),
    CandidateEdit::Templated { edit, template } => (edit, template),
  };

  let decision = match text {
    Some(text) => {
      let pos = edit.range.start.to_char_idx(text);
      Some(resolve_indenting(&template, text, pos, thresholds))
    },
    None => {
      debug!(%uri, "no document text for snippet edit, keeping template indentation");
      None
    },
  };

  match parse_with(&template, decision.as_ref(), thresholds) {
    Some(snippet) => {
      HostEdit::Snippet(SnippetTextEdit {
        range: edit.range,
        snippet,
      })
    },
    None => {
      debug!(%uri, "snippet template has no tab stops, using plain edit");
      HostEdit::Text(edit)
    },
  }
}

#[cfg(test)]
mod tests {
  use ropey::Rope;
  use the_snippet::{
    SnippetSegment,
    TabstopIdx,
  };

  use super::*;
  use crate::{
    editing::{
      LspCommand,
      LspTextEdit,
      LspWorkspaceEdit,
    },
    position::{
      LspPosition,
      LspRange,
    },
  };

  const URI: &str = "file:///tmp/lib.rs";

  fn edit(line: u32, character: u32, new_text: &str) -> LspTextEdit {
    LspTextEdit {
      range:    LspRange::point(LspPosition::new(line, character)),
      new_text: new_text.into(),
    }
  }

  fn templated(edit: LspTextEdit, template: &str) -> CandidateEdit {
    CandidateEdit::Templated {
      edit,
      template: template.into(),
    }
  }

  fn action(edits: Vec<CandidateEdit>) -> LspCodeActionOrCommand {
    LspCodeActionOrCommand::CodeAction(LspCodeAction {
      title:        "Add".into(),
      kind:         Some("quickfix".into()),
      edit:         Some(LspWorkspaceEdit {
        documents: vec![LspDocumentEdit {
          uri:     URI.into(),
          version: None,
          edits,
        }],
      }),
      command:      None,
      is_preferred: true,
    })
  }

  fn normalize(actions: Vec<LspCodeActionOrCommand>, doc: &str) -> Vec<HostAction> {
    let text = Rope::from(doc);
    let context = NormalizeContext::for_document(URI, text.slice(..), IndentThresholds::default());
    normalize_code_actions(actions, &context)
  }

  fn host_edits(action: &HostAction) -> &[HostEdit] {
    let HostAction::CodeAction(action) = action else {
      panic!("expected code action");
    };
    &action.documents[0].edits
  }

  #[test]
  fn mixes_snippet_and_plain_edits() {
    let first = edit(0, 0, "A");
    let second = edit(1, 0, "B");
    let result = normalize(
      vec![action(vec![
        templated(first.clone(), "${1:x}"),
        CandidateEdit::Plain(second.clone()),
      ])],
      "\n\n",
    );

    assert_eq!(result.len(), 1);
    let edits = host_edits(&result[0]);
    let HostEdit::Snippet(snippet) = &edits[0] else {
      panic!("expected snippet edit");
    };
    assert_eq!(snippet.range, first.range);
    assert_eq!(snippet.snippet.segments(), &[SnippetSegment::Placeholder {
      index:   TabstopIdx::new(1),
      content: "x".into(),
    }]);
    assert_eq!(edits[1], HostEdit::Text(second));
  }

  #[test]
  fn templates_without_markers_fall_back_to_plain_edits() {
    let plain = edit(0, 0, "A");
    let result = normalize(vec![action(vec![templated(plain.clone(), "no stops")])], "");
    assert_eq!(host_edits(&result[0]), &[HostEdit::Text(plain)]);
  }

  #[test]
  fn actions_without_edits_are_dropped() {
    assert!(normalize(vec![action(Vec::new())], "").is_empty());

    let no_edit = LspCodeActionOrCommand::CodeAction(LspCodeAction {
      title:        "Nothing".into(),
      kind:         None,
      edit:         None,
      command:      None,
      is_preferred: false,
    });
    assert!(normalize(vec![no_edit], "").is_empty());
  }

  #[test]
  fn bare_commands_pass_through() {
    let command = LspCommand {
      title:     "Run".into(),
      command:   "ink.run".into(),
      arguments: None,
    };
    let result = normalize(vec![LspCodeActionOrCommand::Command(command.clone())], "");
    assert_eq!(result, vec![HostAction::Command(command)]);
  }

  #[test]
  fn code_actions_with_only_a_command_are_dropped() {
    let with_command = LspCodeActionOrCommand::CodeAction(LspCodeAction {
      title:        "Extract".into(),
      kind:         None,
      edit:         None,
      command:      Some(LspCommand {
        title:     "Rename".into(),
        command:   "editor.rename".into(),
        arguments: None,
      }),
      is_preferred: false,
    });
    assert!(normalize(vec![with_command], "").is_empty());
  }

  #[test]
  fn edited_actions_keep_their_command() {
    let command = LspCommand {
      title:     "Rename".into(),
      command:   "editor.rename".into(),
      arguments: None,
    };
    let LspCodeActionOrCommand::CodeAction(mut action) = action(vec![CandidateEdit::Plain(
      edit(0, 0, "A"),
    )]) else {
      unreachable!();
    };
    action.command = Some(command.clone());

    let result = normalize(vec![LspCodeActionOrCommand::CodeAction(action)], "\n");
    let HostAction::CodeAction(action) = &result[0] else {
      panic!("expected code action");
    };
    assert_eq!(action.edit_count(), 1);
    assert_eq!(action.command.as_ref(), Some(&command));
  }

  #[test]
  fn indentation_is_resolved_at_the_edit_start() {
    let template = "\n    #[ink(message)]\n    pub fn ${1:run}(&self) {}";
    // inserting after the indentation of an empty line
    let result = normalize(
      vec![action(vec![templated(edit(1, 4, ""), template)])],
      "impl A {\n    \n}\n",
    );

    let HostEdit::Snippet(snippet) = &host_edits(&result[0])[0] else {
      panic!("expected snippet edit");
    };
    assert_eq!(
      snippet.snippet.to_snippet_string(),
      "\n#[ink(message)]\npub fn ${1:run}(&self) {\\}"
    );
  }

  #[test]
  fn long_columns_after_a_comment_strip_indentation() {
    let template = "\n    fn ${1:f}() {}";
    let result = normalize(
      vec![action(vec![templated(edit(0, 99, ""), template)])],
      "// note\nx\n",
    );

    let HostEdit::Snippet(snippet) = &host_edits(&result[0])[0] else {
      panic!("expected snippet edit");
    };
    assert_eq!(snippet.snippet.to_snippet_string(), "\nfn ${1:f}() {\\}");
  }

  #[test]
  fn unknown_documents_keep_template_indentation() {
    let template = "\n    fn ${1:f}() {}";
    let text = Rope::from("impl A {\n    \n}\n");
    let context = NormalizeContext::for_document(
      "file:///tmp/other.rs",
      text.slice(..),
      IndentThresholds::default(),
    );

    let result = normalize_code_actions(
      vec![action(vec![templated(edit(1, 4, ""), template)])],
      &context,
    );
    let HostEdit::Snippet(snippet) = &host_edits(&result[0])[0] else {
      panic!("expected snippet edit");
    };
    assert_eq!(snippet.snippet.to_snippet_string(), "\n    fn ${1:f}() {\\}");
  }
}
