use log::trace;

use crate::builtin::{control, hop, job, ping, reveal, Builtin};
use crate::prelude::*;

pub fn exec_builtin(builtin: Builtin, argv: &[String], shell: &mut Shell) -> OxResult<i32> {
	trace!("builtin {} with argv {:?}", builtin, argv);
	match builtin {
		Builtin::Hop => hop::execute(shell, argv),
		Builtin::Reveal => reveal::execute(shell, argv),
		Builtin::Activities => job::activities(shell, argv),
		Builtin::Ping => ping::execute(shell, argv),
		Builtin::Fg => job::fg(shell, argv),
		Builtin::Bg => job::bg(shell, argv),
		Builtin::Exit => control::exit(shell, argv),
	}
}
