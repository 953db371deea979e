use log::{debug, info};

use crate::config::{Limits, PromptMode, ShellConfig};
use crate::execute;
use crate::interp::{self, CommandSequence};
use crate::jobs::JobTable;
use crate::prelude::*;

/// Everything the shell carries from one line to the next
#[derive(Debug)]
pub struct Shell {
	config: ShellConfig,
	jobs: JobTable,
	home_dir: PathBuf,
	prev_dir: Option<PathBuf>,
	interactive: bool,
	last_status: i32,
}

impl Shell {
	/// The start-up directory becomes the shell's home
	pub fn new(config: ShellConfig, interactive: bool) -> OxResult<Self> {
		let home_dir = env::current_dir()?;
		info!("home directory is {}", home_dir.display());
		let jobs = JobTable::new(config.limits.max_jobs);
		Ok(Self { config, jobs, home_dir, prev_dir: None, interactive, last_status: 0 })
	}

	pub fn config(&self) -> &ShellConfig {
		&self.config
	}
	pub fn limits(&self) -> &Limits {
		&self.config.limits
	}
	pub fn jobs(&self) -> &JobTable {
		&self.jobs
	}
	pub fn jobs_mut(&mut self) -> &mut JobTable {
		&mut self.jobs
	}
	pub fn home_dir(&self) -> &Path {
		&self.home_dir
	}
	pub fn prev_dir(&self) -> Option<&Path> {
		self.prev_dir.as_deref()
	}
	pub fn set_prev_dir(&mut self, dir: PathBuf) {
		self.prev_dir = Some(dir)
	}
	/// Stdin is a terminal that we hand to foreground jobs
	pub fn is_interactive(&self) -> bool {
		self.interactive
	}
	pub fn last_status(&self) -> i32 {
		self.last_status
	}

	pub fn shows_prompt(&self) -> bool {
		match self.config.shell.prompt {
			PromptMode::Always => true,
			PromptMode::Never => false,
			PromptMode::Auto => self.interactive,
		}
	}

	pub fn parse(&self, line: &str) -> OxResult<CommandSequence> {
		if !interp::is_valid(line) {
			return Err(OxErr::syntax("Invalid Syntax!"))
		}
		interp::parse_line(line, self.limits())
	}

	/// Validate, parse and run one input line. Blank lines are a no-op.
	///
	/// Only `exit` escapes as an error, everything else has already been reported
	/// and is folded into the returned status.
	pub fn exec_line(&mut self, line: &str) -> OxResult<i32> {
		if line.trim().is_empty() {
			return Ok(self.last_status)
		}
		debug!("executing line: {:?}", line);
		let status = match self.parse(line) {
			Ok(seq) => execute::execute_sequence(self, &seq)?,
			Err(e @ OxErr::Syntax(_)) => {
				debug!("{}", e);
				eprintln!("Invalid Syntax!");
				1
			}
			Err(e) => {
				eprintln!("oxsh: {}", e);
				e.exit_code()
			}
		};
		self.last_status = status;
		Ok(status)
	}

	/// Kill everything we are still tracking, on the way out
	pub fn shutdown(&mut self) {
		info!("shutting down, {} job(s) left", self.jobs.len());
		self.jobs.kill_all();
	}
}
