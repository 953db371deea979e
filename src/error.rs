use std::fmt::Display;

use nix::errno::Errno;
use thiserror::Error;

pub type OxResult<T> = Result<T, OxErr>;

// Each variant belongs to one stage of the pipeline:
// Syntax and OversizedInput are raised before anything is spawned,
// Redirection, Launch and CmdNotFound only ever terminate a single child,
// JobLookup, JobState and Usage come out of the builtins.

#[derive(Debug, Error)]
pub enum OxErr {
	#[error("Invalid Syntax: {0}")]
	Syntax(String),

	#[error("Input too large: more than {limit} {what}")]
	OversizedInput { what: &'static str, limit: usize },

	#[error("{kind} redirection failed: {path}: {source}")]
	Redirection {
		kind: RedirKind,
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("{0}")]
	Launch(String),

	#[error("{0}: command not found")]
	CmdNotFound(String),

	#[error("{0}")]
	JobLookup(String),

	#[error("{0}")]
	JobState(String),

	#[error("{0}")]
	Usage(String),

	#[error("Config Error: {0}")]
	Config(String),

	#[error("I/O Error: {0}")]
	Io(#[from] std::io::Error),

	#[error("ERRNO: {0}")]
	Errno(#[from] Errno),

	// Not an actual error, carries the status of an `exit` call up to the main loop
	#[error("")]
	CleanExit(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirKind {
	Input,
	Output,
}

impl Display for RedirKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RedirKind::Input => write!(f, "Input"),
			RedirKind::Output => write!(f, "Output"),
		}
	}
}

impl OxErr {
	pub fn syntax(msg: impl Into<String>) -> Self {
		Self::Syntax(msg.into())
	}

	pub fn launch(msg: impl Into<String>) -> Self {
		Self::Launch(msg.into())
	}

	pub fn no_job(msg: impl Into<String>) -> Self {
		Self::JobLookup(msg.into())
	}

	pub fn bad_job_state(msg: impl Into<String>) -> Self {
		Self::JobState(msg.into())
	}

	pub fn usage(msg: impl Into<String>) -> Self {
		Self::Usage(msg.into())
	}

	pub fn redirection(kind: RedirKind, path: impl Into<String>, source: std::io::Error) -> Self {
		Self::Redirection { kind, path: path.into(), source }
	}

	/// Status a child exits with when this error kills it before `exec`
	pub fn exit_code(&self) -> i32 {
		match self {
			OxErr::CleanExit(code) => *code,
			OxErr::CmdNotFound(_) => 127,
			OxErr::Launch(_) => 126,
			OxErr::Errno(Errno::EACCES) => 126,
			_ => 1,
		}
	}
}
