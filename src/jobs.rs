use std::fmt;

use log::{debug, trace, warn};
use nix::unistd::{getpgrp, tcsetpgrp};

use crate::prelude::*;
use crate::signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobState {
	Running,
	Stopped,
	Terminated,
}

impl fmt::Display for JobState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			JobState::Running => write!(f, "Running"),
			JobState::Stopped => write!(f, "Stopped"),
			JobState::Terminated => write!(f, "Terminated"),
		}
	}
}

/// Last thing we learned about a single process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcStatus {
	Running,
	Stopped(Signal),
	Exited(i32),
	Signaled(Signal),
	/// Reaped by someone else, or never ours to begin with
	Vanished,
}

impl ProcStatus {
	pub fn state(&self) -> JobState {
		match self {
			ProcStatus::Running => JobState::Running,
			ProcStatus::Stopped(_) => JobState::Stopped,
			ProcStatus::Exited(_) | ProcStatus::Signaled(_) | ProcStatus::Vanished => JobState::Terminated,
		}
	}

	/// Shell-style status code: the exit code, or 128 + signal number
	pub fn code(&self) -> i32 {
		match self {
			ProcStatus::Exited(code) => *code,
			ProcStatus::Signaled(sig) => 128 + *sig as i32,
			ProcStatus::Running | ProcStatus::Stopped(_) => 0,
			ProcStatus::Vanished => 1,
		}
	}

	fn from_wait(status: WaitStatus) -> Option<Self> {
		match status {
			WaitStatus::Exited(_, code) => Some(ProcStatus::Exited(code)),
			WaitStatus::Signaled(_, sig, _) => Some(ProcStatus::Signaled(sig)),
			WaitStatus::Stopped(_, sig) => Some(ProcStatus::Stopped(sig)),
			WaitStatus::Continued(_) => Some(ProcStatus::Running),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildProc {
	pid: Pid,
	status: ProcStatus,
}

impl ChildProc {
	pub fn new(pid: Pid) -> Self {
		Self { pid, status: ProcStatus::Running }
	}
	pub fn pid(&self) -> Pid {
		self.pid
	}
	pub fn status(&self) -> ProcStatus {
		self.status
	}
	pub fn set_status(&mut self, status: ProcStatus) {
		self.status = status
	}
	pub fn is_done(&self) -> bool {
		self.status.state() == JobState::Terminated
	}
}

/// A process group started from one pipeline. The first child is the group leader
/// and the pid shown to the user, the last child decides the reported status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
	id: usize,
	pgid: Pid,
	name: String,
	children: Vec<ChildProc>,
}

impl Job {
	pub fn id(&self) -> usize {
		self.id
	}
	pub fn pgid(&self) -> Pid {
		self.pgid
	}
	pub fn name(&self) -> &str {
		&self.name
	}
	pub fn children(&self) -> &[ChildProc] {
		&self.children
	}

	/// Representative pid, the first stage
	pub fn pid(&self) -> Pid {
		self.children.first().map(|child| child.pid()).unwrap_or(self.pgid)
	}

	/// Running while anything runs, otherwise Stopped while anything is stopped
	pub fn state(&self) -> JobState {
		self.children.iter()
			.map(|child| child.status.state())
			.min()
			.unwrap_or(JobState::Terminated)
	}

	pub fn last_status(&self) -> ProcStatus {
		self.children.last().map(|child| child.status).unwrap_or(ProcStatus::Vanished)
	}

	pub fn exited_normally(&self) -> bool {
		self.last_status() == ProcStatus::Exited(0)
	}

	pub fn update(&mut self, pid: Pid, status: ProcStatus) {
		if let Some(child) = self.children.iter_mut().find(|child| child.pid() == pid) {
			trace!("job {} child {} -> {:?}", self.id, pid, status);
			child.set_status(status);
		}
	}

	pub fn killpg(&self, sig: Signal) -> OxResult<()> {
		killpg(self.pgid, sig)?;
		Ok(())
	}

	/// Send SIGCONT to the group and mark every stopped child as running again
	pub fn resume(&mut self) -> OxResult<()> {
		self.killpg(Signal::SIGCONT)?;
		for child in self.children.iter_mut() {
			if let ProcStatus::Stopped(_) = child.status {
				child.set_status(ProcStatus::Running);
			}
		}
		Ok(())
	}

	/// Non-blocking status refresh of every child that is not known to be done
	pub fn poll(&mut self) {
		let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
		for child in self.children.iter_mut().filter(|child| !child.is_done()) {
			match waitpid(child.pid(), Some(flags)) {
				Ok(WaitStatus::StillAlive) => {}
				Ok(status) => {
					if let Some(new_status) = ProcStatus::from_wait(status) {
						child.set_status(new_status);
					}
				}
				Err(Errno::ECHILD) => child.set_status(ProcStatus::Vanished),
				Err(e) => warn!("waitpid({}) failed: {}", child.pid(), e),
			}
		}
	}
}

pub struct JobBuilder {
	pgid: Option<Pid>,
	name: String,
	children: Vec<ChildProc>,
}

impl Default for JobBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl JobBuilder {
	pub fn new() -> Self {
		Self { pgid: None, name: String::new(), children: vec![] }
	}
	pub fn with_pgid(self, pgid: Pid) -> Self {
		Self { pgid: Some(pgid), ..self }
	}
	pub fn with_name(self, name: impl Into<String>) -> Self {
		Self { name: name.into(), ..self }
	}
	pub fn with_children(self, children: Vec<ChildProc>) -> Self {
		Self { children, ..self }
	}
	pub fn build(self) -> Job {
		let pgid = self.pgid
			.or_else(|| self.children.first().map(|child| child.pid()))
			.unwrap_or(Pid::from_raw(0));
		Job { id: 0, pgid, name: self.name, children: self.children }
	}
}

/// How a foreground wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FgOutcome {
	Finished(i32),
	Stopped,
}

/// Hand the terminal to `pgid`. Only meaningful when stdin is a terminal.
pub fn attach_tty(pgid: Pid) -> OxResult<()> {
	tcsetpgrp(io::stdin().as_fd(), pgid)?;
	Ok(())
}

/// Block until every stage of `job` has exited or stopped.
///
/// While waiting, the job's group is published as the foreground group so that
/// interactive signals reach it, and the terminal is lent to it when `interactive` is set.
pub fn wait_fg(job: &mut Job, interactive: bool) -> OxResult<FgOutcome> {
	signal::set_foreground(job.pid(), job.pgid());
	if interactive {
		if let Err(e) = attach_tty(job.pgid()) {
			debug!("could not give the terminal to {}: {}", job.pgid(), e);
		}
	}

	let result = wait_group(job);

	signal::clear_foreground();
	if interactive {
		if let Err(e) = attach_tty(getpgrp()) {
			warn!("could not reclaim the terminal: {}", e);
		}
	}
	// Interrupts meant for the job must not cancel the next prompt
	signal::drain_wakeups();
	result?;

	match job.state() {
		JobState::Terminated => Ok(FgOutcome::Finished(job.last_status().code())),
		_ => Ok(FgOutcome::Stopped),
	}
}

/// Reap the job's group until none of its stages is running. A stage stopped on its own
/// does not end the wait while its siblings still run.
fn wait_group(job: &mut Job) -> OxResult<()> {
	let group = Pid::from_raw(-job.pgid().as_raw());
	while job.state() == JobState::Running {
		match wait_child(group)? {
			(Some(pid), status) => job.update(pid, status),
			(None, _) => {
				// Nothing left in the group to wait for
				for child in job.children.iter_mut().filter(|child| !child.is_done()) {
					child.set_status(ProcStatus::Vanished);
				}
			}
		}
	}
	Ok(())
}

/// Wait for one member of `target` to exit, die, or stop. `None` once there is nothing
/// left to wait for.
fn wait_child(target: Pid) -> OxResult<(Option<Pid>, ProcStatus)> {
	loop {
		match waitpid(target, Some(WaitPidFlag::WUNTRACED)) {
			Ok(WaitStatus::Exited(pid, code)) => return Ok((Some(pid), ProcStatus::Exited(code))),
			Ok(WaitStatus::Signaled(pid, sig, _)) => return Ok((Some(pid), ProcStatus::Signaled(sig))),
			Ok(WaitStatus::Stopped(pid, sig)) => return Ok((Some(pid), ProcStatus::Stopped(sig))),
			Ok(_) => continue,
			Err(Errno::EINTR) => continue,
			Err(Errno::ECHILD) => return Ok((None, ProcStatus::Vanished)),
			Err(e) => return Err(e.into()),
		}
	}
}

/// Registry of background and stopped jobs.
///
/// Slots are reused first-free, ids only ever grow, so an id is never handed to a
/// second job while the first one still holds it.
#[derive(Debug)]
pub struct JobTable {
	slots: Vec<Option<Job>>,
	next_id: usize,
	max_jobs: usize,
}

impl JobTable {
	pub fn new(max_jobs: usize) -> Self {
		Self { slots: vec![], next_id: 1, max_jobs }
	}

	fn insert(&mut self, mut job: Job) -> OxResult<usize> {
		let slot = match self.slots.iter().position(|slot| slot.is_none()) {
			Some(idx) => idx,
			None if self.slots.len() < self.max_jobs => {
				self.slots.push(None);
				self.slots.len() - 1
			}
			None => {
				// Nobody will ever wait for it, so don't leave it running
				let _ = job.killpg(Signal::SIGKILL);
				return Err(OxErr::OversizedInput { what: "jobs", limit: self.max_jobs })
			}
		};
		let id = self.next_id;
		self.next_id += 1;
		job.id = id;
		debug!("job {} ({}) in slot {}", id, job.name, slot);
		self.slots[slot] = Some(job);
		Ok(id)
	}

	/// Register a job that keeps running without the shell waiting on it, prints `[id] pid`
	pub fn add_running(&mut self, job: Job) -> OxResult<usize> {
		let pid = job.pid();
		let id = self.insert(job)?;
		let mut stdout = io::stdout();
		writeln!(stdout, "[{}] {}", id, pid)?;
		stdout.flush()?;
		Ok(id)
	}

	/// Register a job that was stopped while in the foreground
	pub fn add_stopped(&mut self, job: Job) -> OxResult<usize> {
		self.insert(job)
	}

	pub fn find(&self, id: usize) -> Option<&Job> {
		self.jobs().find(|job| job.id() == id)
	}

	pub fn find_mut(&mut self, id: usize) -> Option<&mut Job> {
		self.slots.iter_mut().flatten().find(|job| job.id() == id)
	}

	/// Take the job out of the table, e.g. because it finished in the foreground
	pub fn remove(&mut self, id: usize) -> Option<Job> {
		let slot = self.slots.iter_mut().find(|slot| slot.as_ref().is_some_and(|job| job.id() == id))?;
		slot.take()
	}

	pub fn most_recent_id(&self) -> Option<usize> {
		self.jobs().map(|job| job.id()).max()
	}

	pub fn jobs(&self) -> impl Iterator<Item = &Job> {
		self.slots.iter().flatten()
	}

	pub fn len(&self) -> usize {
		self.jobs().count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Reap whatever changed since the last call. Finished jobs leave the table;
	/// with `report` set, each of them prints a completion notice.
	pub fn poll(&mut self, report: bool) -> OxResult<()> {
		let mut stdout = io::stdout();
		for slot in self.slots.iter_mut() {
			let Some(job) = slot else { continue };
			job.poll();
			if job.state() != JobState::Terminated {
				continue
			}
			debug!("job {} ({}) finished with {:?}", job.id(), job.name(), job.last_status());
			if report && job.last_status() != ProcStatus::Vanished {
				let how = if job.exited_normally() { "normally" } else { "abnormally" };
				writeln!(stdout, "{} with pid {} exited {}", job.name(), job.pid(), how)?;
			}
			*slot = None;
		}
		stdout.flush()?;
		Ok(())
	}

	/// SIGKILL every tracked group and the current foreground group, used on the way out
	pub fn kill_all(&mut self) {
		for job in self.slots.iter_mut().filter_map(|slot| slot.take()) {
			if let Err(e) = job.killpg(Signal::SIGKILL) {
				debug!("killpg({}) failed: {}", job.pgid(), e);
			}
			for child in job.children().iter().filter(|child| !child.is_done()) {
				let _ = waitpid(child.pid(), None);
			}
		}
		if let Some(pgid) = signal::foreground_pgid() {
			let _ = killpg(pgid, Signal::SIGKILL);
		}
	}
}
