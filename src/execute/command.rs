use nix::unistd::{execvp, getpid};

use crate::interp::Command;
use crate::prelude::*;
use crate::utils::{redirect_fd, ExecFlags, RustFd};
use crate::{jobs, signal};

/// Descriptors a stage inherits from the pipeline around it
pub struct StageIo {
	/// Read end of the previous pipe
	pub stdin: Option<RustFd>,
	/// Write end of the next pipe
	pub stdout: Option<RustFd>,
	/// Read end of the next pipe, belongs to the following stage
	pub unused: Option<RustFd>,
}

pub fn to_cstrings(argv: &[String]) -> OxResult<Vec<CString>> {
	argv.iter()
		.map(|arg| CString::new(arg.as_str()))
		.collect::<Result<Vec<_>, _>>()
		.map_err(|_| OxErr::launch(format!("{}: argument contains a NUL byte", argv.first().map(|s| s.as_str()).unwrap_or(""))))
}

/// Body of a forked stage. Never returns: the child either becomes the program or exits.
pub fn exec_stage(
	shell: &mut Shell,
	cmd: &Command,
	argv: &[CString],
	io: StageIo,
	flags: ExecFlags,
	pgid: Option<Pid>,
	take_tty: bool,
) -> ! {
	let code = match run_stage(shell, cmd, argv, io, flags, pgid, take_tty) {
		Ok(code) => code,
		Err(OxErr::CleanExit(code)) => code,
		Err(e) => {
			eprintln!("oxsh: {}", e);
			e.exit_code()
		}
	};
	let _ = io::stdout().flush();
	std::process::exit(code)
}

fn run_stage(
	shell: &mut Shell,
	cmd: &Command,
	argv: &[CString],
	io: StageIo,
	flags: ExecFlags,
	pgid: Option<Pid>,
	take_tty: bool,
) -> OxResult<i32> {
	// The parent makes the same call, whichever runs first wins
	let group = pgid.unwrap_or_else(getpid);
	let _ = setpgid(Pid::from_raw(0), group);
	if take_tty {
		// Still ignoring SIGTTOU at this point
		let _ = jobs::attach_tty(group);
	}
	signal::reset_child_signals();

	wire_stdio(cmd, io, flags)?;

	match cmd.builtin {
		Some(builtin) => super::builtin::exec_builtin(builtin, &cmd.argv, shell),
		None => Err(exec_external(argv)),
	}
}

/// Pipes first, then the command's own files: a stage's `<` only counts at the head of
/// the pipeline and its `>` only at the tail.
fn wire_stdio(cmd: &Command, io: StageIo, flags: ExecFlags) -> OxResult<()> {
	let StageIo { stdin, stdout, unused } = io;
	if let Some(mut fd) = unused {
		fd.close()?;
	}

	if flags.contains(ExecFlags::FIRST | ExecFlags::BACKGROUND) {
		redirect_fd("/dev/null", RedirKind::Input, false, STDIN_FILENO)?;
	}
	if let Some(mut fd) = stdin {
		fd.dup2(&STDIN_FILENO)?;
		fd.close()?;
	}
	if let Some(mut fd) = stdout {
		fd.dup2(&STDOUT_FILENO)?;
		fd.close()?;
	}

	if flags.contains(ExecFlags::FIRST) {
		if let Some(path) = &cmd.input_file {
			redirect_fd(path, RedirKind::Input, false, STDIN_FILENO)?;
		}
	}
	if flags.contains(ExecFlags::LAST) {
		if let Some(path) = &cmd.output_file {
			redirect_fd(path, RedirKind::Output, cmd.append, STDOUT_FILENO)?;
		}
	}
	Ok(())
}

/// Replace the process image. Only comes back with the reason it failed.
pub fn exec_external(argv: &[CString]) -> OxErr {
	let Some(program) = argv.first() else {
		return OxErr::launch("empty command")
	};
	let e = match execvp(program, argv) {
		Ok(never) => match never {},
		Err(e) => e,
	};
	let name = program.to_string_lossy().into_owned();
	match e {
		Errno::ENOENT | Errno::ENOTDIR => OxErr::CmdNotFound(name),
		Errno::EACCES => OxErr::launch(format!("{}: Permission denied", name)),
		_ => OxErr::launch(format!("{}: {}", name, e)),
	}
}
