pub mod builtin;
pub mod command;
pub mod pipeline;

use log::debug;

use crate::interp::CommandSequence;
use crate::prelude::*;

/// Run every pipeline of `seq` in order. A failing pipeline never stops the ones after it;
/// the status of the last one is returned.
pub fn execute_sequence(shell: &mut Shell, seq: &CommandSequence) -> OxResult<i32> {
	let mut status = 0;
	for pipeline in &seq.pipelines {
		status = match pipeline::execute_pipeline(shell, pipeline) {
			Ok(code) => code,
			Err(OxErr::CleanExit(code)) => return Err(OxErr::CleanExit(code)),
			Err(e) => {
				eprintln!("oxsh: {}", e);
				e.exit_code()
			}
		};
		debug!("`{}' finished with status {}", pipeline, status);
	}
	Ok(status)
}
