//! Command line bridge for snippet-bearing code actions.
//!
//! Replays recorded `textDocument/codeAction` responses against a document
//! and prints the edits the editor would apply, which makes it easy to check
//! how a language server's snippet templates end up indented.

mod cli;
mod config;

use std::{
  io::{
    self,
    Read,
    Write,
  },
  path::Path,
};

use clap::Parser;
use eyre::{
  Result,
  WrapErr,
  eyre,
};
use ropey::Rope;
use serde_json::Value;
use the_lsp::{
  LspRange,
  NormalizeContext,
  code_action_params,
  file_uri_for_path,
  host_actions_json,
  jsonrpc::{
    Request,
    reply_result,
  },
  normalize_code_actions,
  parse_code_actions_response,
};
use the_snippet::tokenize;
use tracing::{
  debug,
  info,
};
use tracing_subscriber::EnvFilter;

use crate::{
  cli::{
    Cli,
    Command,
  },
  config::Config,
};

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbosity);

  let config = Config::load(cli.config_file.as_deref())?;
  debug!(?config, "loaded config");

  let mut stdout = io::stdout().lock();
  match cli.command {
    Command::Tokenize { template } => {
      for token in tokenize(&template) {
        writeln!(stdout, "{}\t{token}", token.kind())?;
      }
    },
    Command::Normalize {
      document,
      uri,
      response,
    } => {
      let text = read_document(&document)?;
      let uri = match uri {
        Some(uri) => uri,
        None => {
          file_uri_for_path(&document)
            .ok_or_else(|| eyre!("cannot build a file uri for {}", document.display()))?
        },
      };
      let result = read_response(&response)?;
      let actions = parse_code_actions_response(result.as_ref())?;
      info!(count = actions.len(), %uri, "normalizing code actions");

      let context = NormalizeContext::for_document(&uri, text.slice(..), config.indent);
      let host = normalize_code_actions(actions, &context);
      writeln!(stdout, "{}", serde_json::to_string_pretty(&host_actions_json(&host))?)?;
    },
    Command::Request {
      uri,
      start,
      end,
      only,
      id,
    } => {
      let range = LspRange::new(start.0, end.unwrap_or(start).0);
      let only = (!only.is_empty()).then_some(only);
      let params = code_action_params(&uri, range, Value::Array(Vec::new()), only);
      let request = Request::code_action(id, params);
      writeln!(stdout, "{}", serde_json::to_string_pretty(&request)?)?;
    },
  }

  Ok(())
}

fn init_logging(verbosity: u8) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    EnvFilter::new(match verbosity {
      0 => "warn",
      1 => "info",
      2 => "debug",
      _ => "trace",
    })
  });
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

fn read_document(path: &Path) -> Result<Rope> {
  let file =
    std::fs::File::open(path).wrap_err_with(|| format!("failed to open {}", path.display()))?;
  Rope::from_reader(io::BufReader::new(file))
    .wrap_err_with(|| format!("failed to read {}", path.display()))
}

/// Reads a response message or a bare result. `-` reads stdin.
fn read_response(source: &str) -> Result<Option<Value>> {
  let contents = if source == "-" {
    let mut contents = String::new();
    io::stdin().read_to_string(&mut contents)?;
    contents
  } else {
    std::fs::read_to_string(source).wrap_err_with(|| format!("failed to read {source}"))?
  };

  let value: Value = serde_json::from_str(&contents).wrap_err("response is not valid json")?;
  Ok(reply_result(value)?)
}
