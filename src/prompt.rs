use log::{trace, warn};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::unistd::{gethostname, getuid, User};

use crate::prelude::*;
use crate::signal;
use crate::utils::RustFd;

/// `<user@host:path> `, with the shell's home directory shown as `~`
pub fn render_prompt(home: &Path) -> String {
	let user = User::from_uid(getuid())
		.ok()
		.flatten()
		.map(|user| user.name)
		.or_else(|| env::var("USER").ok())
		.unwrap_or_else(|| "unknown".into());
	let host = gethostname()
		.ok()
		.and_then(|host| host.into_string().ok())
		.unwrap_or_else(|| "unknown".into());
	let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("?"));
	format!("<{}@{}:{}> ", user, host, display_path(&cwd, home))
}

pub fn display_path(cwd: &Path, home: &Path) -> String {
	match cwd.strip_prefix(home) {
		Ok(rest) if rest.as_os_str().is_empty() => "~".into(),
		Ok(rest) => format!("~/{}", rest.display()),
		Err(_) => cwd.display().to_string(),
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
	Line(String),
	/// An interrupt or stop key arrived at the prompt, the partial line is gone
	Interrupted,
	Eof,
}

/// Reads stdin one byte at a time, so nothing past the newline is taken away from
/// the commands that run next, and gives up on the line when the signal pipe wakes up.
pub struct LineReader {
	stdin: RustFd,
	buf: Vec<u8>,
}

impl LineReader {
	pub fn new() -> OxResult<Self> {
		Ok(Self { stdin: RustFd::new(STDIN_FILENO)?, buf: vec![] })
	}

	fn wait_readable(&self) -> OxResult<bool> {
		let stdin_fd = self.stdin.as_fd();
		let mut fds = vec![PollFd::new(stdin_fd, PollFlags::POLLIN)];
		if let Some(wake) = signal::wake_fd() {
			fds.push(PollFd::new(wake, PollFlags::POLLIN));
		}
		loop {
			match poll(&mut fds, PollTimeout::NONE) {
				Ok(_) => break,
				Err(Errno::EINTR) => continue,
				Err(e) => return Err(e.into()),
			}
		}
		let woke = fds.get(1)
			.and_then(|fd| fd.revents())
			.is_some_and(|ev| ev.contains(PollFlags::POLLIN));
		Ok(!woke)
	}

	pub fn read_line(&mut self) -> OxResult<ReadOutcome> {
		let mut byte = [0u8; 1];
		loop {
			if !self.wait_readable()? {
				signal::drain_wakeups();
				self.buf.clear();
				trace!("line read interrupted");
				return Ok(ReadOutcome::Interrupted)
			}
			match self.stdin.read(&mut byte) {
				Ok(0) => {
					if self.buf.is_empty() {
						return Ok(ReadOutcome::Eof)
					}
					return Ok(ReadOutcome::Line(self.take_line()))
				}
				Ok(_) if byte[0] == b'\n' => return Ok(ReadOutcome::Line(self.take_line())),
				Ok(_) => self.buf.push(byte[0]),
				Err(e) => {
					warn!("read from stdin failed: {}", e);
					return Err(e.into())
				}
			}
		}
	}

	fn take_line(&mut self) -> String {
		let line = String::from_utf8_lossy(&self.buf).into_owned();
		self.buf.clear();
		line
	}
}
