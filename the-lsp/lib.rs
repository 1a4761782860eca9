//! Client side of code actions whose edits carry snippet templates.
//!
//! The server marks interactive edits through each code action's `data`
//! (`snippet` / `snippets`); [`parse_code_actions_response`] attaches those
//! templates to the decoded edits and [`normalize_code_actions`] turns them
//! into host edits.

pub mod editing;
pub mod host;
pub mod jsonrpc;
pub mod normalize;
pub mod position;

pub use editing::{
  CandidateEdit,
  EditingParseError,
  LspCodeAction,
  LspCodeActionOrCommand,
  LspCommand,
  LspDocumentEdit,
  LspTextEdit,
  LspWorkspaceEdit,
  code_action_params,
  parse_code_actions_response,
};
pub use host::{
  HostAction,
  HostCodeAction,
  HostDocumentEdit,
  HostEdit,
  SnippetTextEdit,
  host_actions_json,
};
pub use normalize::{
  NormalizeContext,
  normalize_code_actions,
};
pub use position::{
  LspPosition,
  LspRange,
  file_uri_for_path,
};
