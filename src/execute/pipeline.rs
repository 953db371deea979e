use log::{debug, trace, warn};

use crate::interp::Pipeline;
use crate::jobs::{wait_fg, ChildProc, FgOutcome, Job, JobBuilder};
use crate::prelude::*;
use crate::utils::{ExecFlags, RustFd};

use super::{builtin, command};

pub fn execute_pipeline(shell: &mut Shell, pipeline: &Pipeline) -> OxResult<i32> {
	if let [cmd] = pipeline.commands.as_slice() {
		if let Some(bltn) = cmd.builtin {
			if pipeline.background {
				eprintln!("Warning: Built-in command '{}' cannot run in background", bltn);
			}
			if !cmd.has_redirection() {
				return builtin::exec_builtin(bltn, &cmd.argv, shell)
			}
			// Redirected builtins get a child of their own, below
		}
	}

	let job = spawn_pipeline(shell, pipeline, pipeline.background)?;
	if pipeline.background {
		shell.jobs_mut().add_running(job)?;
		return Ok(0)
	}
	handle_fg(shell, job)
}

/// Wait on a freshly spawned job. If it stops, it moves into the job table.
fn handle_fg(shell: &mut Shell, mut job: Job) -> OxResult<i32> {
	match wait_fg(&mut job, shell.is_interactive())? {
		FgOutcome::Finished(code) => Ok(code),
		FgOutcome::Stopped => {
			let name = job.name().to_string();
			let id = shell.jobs_mut().add_stopped(job)?;
			let mut stdout = io::stdout();
			writeln!(stdout, "[{}] Stopped {}", id, name)?;
			stdout.flush()?;
			Ok(0)
		}
	}
}

/// Fork one child per command, wired together with pipes, all in the first child's group
fn spawn_pipeline(shell: &mut Shell, pipeline: &Pipeline, background: bool) -> OxResult<Job> {
	let argvs = pipeline.commands.iter()
		.map(|cmd| command::to_cstrings(&cmd.argv))
		.collect::<OxResult<Vec<_>>>()?;
	// Anything still buffered would be written a second time by each child
	io::stdout().flush()?;

	let mut children = vec![];
	let mut pgid = None;
	if let Err(e) = fork_stages(shell, pipeline, &argvs, background, &mut children, &mut pgid) {
		abandon(pgid, &children);
		return Err(e)
	}

	let name = pipeline.display_name(shell.limits().max_command_name);
	let mut builder = JobBuilder::new()
		.with_name(name)
		.with_children(children);
	if let Some(pgid) = pgid {
		builder = builder.with_pgid(pgid);
	}
	Ok(builder.build())
}

fn fork_stages(
	shell: &mut Shell,
	pipeline: &Pipeline,
	argvs: &[Vec<CString>],
	background: bool,
	children: &mut Vec<ChildProc>,
	pgid: &mut Option<Pid>,
) -> OxResult<()> {
	let count = pipeline.commands.len();
	let take_tty = shell.is_interactive() && !background;
	let mut prev_read_pipe: Option<RustFd> = None;

	for (idx, (cmd, argv)) in pipeline.commands.iter().zip(argvs).enumerate() {
		let flags = ExecFlags::for_stage(idx, count, background);
		let (r_pipe, w_pipe) = if flags.contains(ExecFlags::LAST) {
			(None, None)
		} else {
			match RustFd::pipe() {
				Ok((r_pipe, w_pipe)) => (Some(r_pipe), Some(w_pipe)),
				Err(e) => {
					close_all([prev_read_pipe]);
					return Err(e.into())
				}
			}
		};

		match unsafe { fork() } {
			Ok(ForkResult::Child) => {
				let io = command::StageIo { stdin: prev_read_pipe, stdout: w_pipe, unused: r_pipe };
				command::exec_stage(shell, cmd, argv, io, flags, *pgid, take_tty)
			}
			Ok(ForkResult::Parent { child }) => {
				let group = *pgid.get_or_insert(child);
				// Fails harmlessly once the child has exec'd
				if let Err(e) = setpgid(child, group) {
					debug!("setpgid({}, {}) from parent: {}", child, group, e);
				}
				trace!("stage {} `{}' is pid {}", idx, cmd, child);
				children.push(ChildProc::new(child));
				close_all([w_pipe, prev_read_pipe.take()]);
				prev_read_pipe = r_pipe;
			}
			Err(e) => {
				close_all([r_pipe, w_pipe, prev_read_pipe]);
				return Err(OxErr::launch(format!("fork failed: {}", e)))
			}
		}
	}
	Ok(())
}

fn close_all<const N: usize>(fds: [Option<RustFd>; N]) {
	for mut fd in fds.into_iter().flatten() {
		if let Err(e) = fd.close() {
			warn!("failed to close fd {}: {}", fd, e);
		}
	}
}

/// A pipeline that could not be fully started is killed and reaped
fn abandon(pgid: Option<Pid>, children: &[ChildProc]) {
	if let Some(pgid) = pgid {
		let _ = killpg(pgid, Signal::SIGKILL);
	}
	for child in children {
		let _ = waitpid(child.pid(), None);
	}
}
