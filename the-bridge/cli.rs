use std::{
  path::PathBuf,
  str::FromStr,
};

use clap::{
  ArgAction,
  Parser,
  Subcommand,
};
use eyre::{
  Result,
  eyre,
};
use the_lsp::LspPosition;

#[derive(Debug, Parser)]
#[command(name = "the-bridge")]
#[command(about = "Inspect snippet templates and code action responses the way the editor sees them")]
pub struct Cli {
  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count, global = true)]
  pub verbosity: u8,

  /// Load configuration from a specific file
  #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
  pub config_file: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Print the tokens of a snippet template, one per line
  Tokenize {
    template: String,
  },

  /// Normalize a recorded `textDocument/codeAction` response into host edits
  Normalize {
    /// Document the code actions were requested for
    #[arg(short, long, value_name = "FILE")]
    document: PathBuf,

    /// URI of the document in the response (defaults to its file URI)
    #[arg(long)]
    uri: Option<String>,

    /// JSON-RPC response or bare result (`-` reads stdin)
    #[arg(value_name = "RESPONSE", default_value = "-")]
    response: String,
  },

  /// Print the `textDocument/codeAction` request for a range
  Request {
    #[arg(long)]
    uri: String,

    /// Start of the range as LINE:CHARACTER (zero-based)
    #[arg(long, value_name = "LINE:CHARACTER")]
    start: PositionArg,

    /// End of the range (defaults to the start)
    #[arg(long, value_name = "LINE:CHARACTER")]
    end: Option<PositionArg>,

    /// Only ask for these code action kinds
    #[arg(long = "only", value_name = "KIND")]
    only: Vec<String>,

    #[arg(long, default_value_t = 1)]
    id: u64,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionArg(pub LspPosition);

impl FromStr for PositionArg {
  type Err = eyre::Report;

  fn from_str(value: &str) -> Result<Self> {
    let (line, character) = value
      .split_once(':')
      .ok_or_else(|| eyre!("expected LINE:CHARACTER, got {value:?}"))?;
    Ok(Self(LspPosition::new(line.trim().parse()?, character.trim().parse()?)))
  }
}
