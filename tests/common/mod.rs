#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Output, Stdio};

/// The shell binary, run from `dir` with no config file in reach
pub fn oxsh(dir: &Path) -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_oxsh"));
	cmd.current_dir(dir)
		.env("HOME", dir)
		.env_remove("OXSH_CONFIG")
		.env_remove("OXSH_LOG");
	cmd
}

/// `oxsh -c LINE`
pub fn run_line(dir: &Path, line: &str) -> Output {
	oxsh(dir).arg("-c").arg(line).output().unwrap()
}

/// Feed `script` on stdin and wait for the shell to hit end of input
pub fn run_script(dir: &Path, script: &str) -> Output {
	let mut child = oxsh(dir)
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.unwrap();
	child.stdin.take().unwrap().write_all(script.as_bytes()).unwrap();
	child.wait_with_output().unwrap()
}

pub fn stdout_of(output: &Output) -> String {
	String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
	String::from_utf8_lossy(&output.stderr).into_owned()
}

/// A shell kept alive between lines, for tests that need to react to its output
pub struct Session {
	child: Child,
	stdin: ChildStdin,
	stdout: BufReader<ChildStdout>,
	stderr: BufReader<ChildStderr>,
}

impl Session {
	pub fn start(dir: &Path) -> Self {
		let mut child = oxsh(dir)
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.spawn()
			.unwrap();
		let stdin = child.stdin.take().unwrap();
		let stdout = BufReader::new(child.stdout.take().unwrap());
		let stderr = BufReader::new(child.stderr.take().unwrap());
		Self { child, stdin, stdout, stderr }
	}

	pub fn pid(&self) -> i32 {
		self.child.id() as i32
	}

	pub fn send(&mut self, line: &str) {
		writeln!(self.stdin, "{}", line).unwrap();
		self.stdin.flush().unwrap();
	}

	pub fn read_line(&mut self) -> String {
		let mut line = String::new();
		self.stdout.read_line(&mut line).unwrap();
		line.trim_end_matches('\n').to_string()
	}

	pub fn read_err_line(&mut self) -> String {
		let mut line = String::new();
		self.stderr.read_line(&mut line).unwrap();
		line.trim_end_matches('\n').to_string()
	}

	/// Close stdin, then collect whatever is left on stdout and the exit status
	pub fn finish(self) -> (String, i32) {
		let Session { mut child, stdin, mut stdout, stderr: _stderr } = self;
		drop(stdin);
		let mut rest = String::new();
		std::io::Read::read_to_string(&mut stdout, &mut rest).unwrap();
		let code = child.wait().unwrap().code().unwrap_or(-1);
		(rest, code)
	}
}
