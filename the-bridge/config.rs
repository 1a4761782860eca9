use std::{
  io::ErrorKind,
  path::{
    Path,
    PathBuf,
  },
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};
use eyre::{
  Context,
  Result,
  eyre,
};
use serde::Deserialize;
use the_snippet::IndentThresholds;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "bridge.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  pub indent: IndentThresholds,
}

impl Config {
  /// Loads `specified` if given, otherwise the user config file when it
  /// exists. Without either, defaults apply.
  pub fn load(specified: Option<&Path>) -> Result<Self> {
    if let Some(path) = specified {
      return Self::from_file(path);
    }

    let path = default_config_file()?;
    match std::fs::read_to_string(&path) {
      Ok(contents) => Self::from_toml(&contents, &path),
      Err(err) if err.kind() == ErrorKind::NotFound => {
        debug!(path = %path.display(), "no config file, using defaults");
        Ok(Self::default())
      },
      Err(err) => Err(err).wrap_err_with(|| format!("failed to read {}", path.display())),
    }
  }

  fn from_file(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Self::from_toml(&contents, path)
  }

  fn from_toml(contents: &str, path: &Path) -> Result<Self> {
    toml::from_str(contents).wrap_err_with(|| format!("failed to parse {}", path.display()))
  }
}

pub fn config_dir() -> Result<PathBuf> {
  if let Ok(dir) = std::env::var("THE_EDITOR_CONFIG_DIR") {
    return Ok(PathBuf::from(dir));
  }
  let strategy =
    choose_base_strategy().map_err(|_| eyre!("unable to find the config directory"))?;
  let mut path = strategy.config_dir();
  path.push("the-editor");
  Ok(path)
}

fn default_config_file() -> Result<PathBuf> {
  Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn indent_section_overrides_defaults() {
    let config: Config = toml::from_str(
      r#"
        [indent]
        nested-tabs = 3
      "#,
    )
    .expect("valid config");

    assert_eq!(config.indent, IndentThresholds {
      nested_tabs: 3,
      ..IndentThresholds::default()
    });
  }

  #[test]
  fn empty_config_is_default() {
    let config: Config = toml::from_str("").expect("valid config");
    assert_eq!(config, Config::default());
  }

  #[test]
  fn specified_file_must_parse() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[indent]\nlevel-width = 2").expect("write config");
    let config = Config::load(Some(file.path())).expect("loads");
    assert_eq!(config.indent.level_width, 2);

    let mut bad = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(bad, "[indnet]").expect("write config");
    assert!(Config::load(Some(bad.path())).is_err());
  }

  #[test]
  fn missing_specified_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
  }
}
