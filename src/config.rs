use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{OxErr, OxResult};

pub const CONFIG_ENV_VAR: &str = "OXSH_CONFIG";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
	pub limits: Limits,
	pub shell: ShellOpts,
}

/// Upper bounds on a single input line and on the job table.
/// Going over any of the input bounds is reported as an error rather than truncated.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Limits {
	pub max_tokens: usize,
	pub max_pipeline_commands: usize,
	pub max_sequence_pipelines: usize,
	pub max_jobs: usize,
	pub max_command_name: usize,
}

impl Default for Limits {
	fn default() -> Self {
		Self {
			max_tokens: 64,
			max_pipeline_commands: 32,
			max_sequence_pipelines: 16,
			max_jobs: 100,
			max_command_name: 256,
		}
	}
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ShellOpts {
	pub prompt: PromptMode,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
	#[default]
	Auto,
	Always,
	Never,
}

impl ShellConfig {
	pub fn from_toml(text: &str) -> OxResult<Self> {
		toml::from_str(text).map_err(|e| OxErr::Config(e.to_string()))
	}

	pub fn from_file(path: &Path) -> OxResult<Self> {
		let text = std::fs::read_to_string(path)
			.map_err(|e| OxErr::Config(format!("{}: {}", path.display(), e)))?;
		Self::from_toml(&text)
	}

	/// Resolve the config file (explicit path, then $OXSH_CONFIG, then the user config dir)
	/// and load it. Problems are logged and the defaults are used instead.
	pub fn load(explicit: Option<&Path>) -> Self {
		let Some(path) = Self::locate(explicit) else {
			debug!("no config file found, using defaults");
			return Self::default()
		};
		debug!("loading config from {}", path.display());
		match Self::from_file(&path) {
			Ok(config) => config,
			Err(e) => {
				warn!("{}", e);
				eprintln!("oxsh: {}", e);
				Self::default()
			}
		}
	}

	fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
		if let Some(path) = explicit {
			return Some(path.to_path_buf())
		}
		if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
			return Some(PathBuf::from(path))
		}
		let home = std::env::var_os("HOME")?;
		let path = Path::new(&home).join(".config/oxsh/config.toml");
		path.is_file().then_some(path)
	}
}
