pub mod hop;
pub mod reveal;
pub mod ping;
pub mod job;
pub mod control;

use crate::prelude::*;

pub const BUILTINS: [&str; 7] = [
	"hop", "reveal", "activities", "ping", "fg", "bg", "exit",
];

/// Commands that run inside the shell process. Resolved once, when the command is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
	/// Change directory
	Hop,
	/// List a directory
	Reveal,
	/// List jobs
	Activities,
	/// Send a signal to a pid
	Ping,
	Fg,
	Bg,
	Exit,
}

impl Builtin {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"hop" => Some(Builtin::Hop),
			"reveal" => Some(Builtin::Reveal),
			"activities" => Some(Builtin::Activities),
			"ping" => Some(Builtin::Ping),
			"fg" => Some(Builtin::Fg),
			"bg" => Some(Builtin::Bg),
			"exit" => Some(Builtin::Exit),
			_ => None,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Builtin::Hop => "hop",
			Builtin::Reveal => "reveal",
			Builtin::Activities => "activities",
			Builtin::Ping => "ping",
			Builtin::Fg => "fg",
			Builtin::Bg => "bg",
			Builtin::Exit => "exit",
		}
	}
}

impl Display for Builtin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}
