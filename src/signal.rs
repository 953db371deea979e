use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicI32, Ordering};

use log::{debug, warn};
use nix::sys::signal::{signal, SigHandler};
use once_cell::sync::OnceCell;

use crate::prelude::*;

// Signal handlers only ever read these two and call killpg, everything else
// (job bookkeeping, notices) happens on the main thread once the wait returns.
static FG_PID: AtomicI32 = AtomicI32::new(0);
static FG_PGID: AtomicI32 = AtomicI32::new(0);

// Read end of the self-pipe that SIGINT and SIGTSTP write into
static WAKE_PIPE: OnceCell<UnixStream> = OnceCell::new();

/// Signals a child gets back at their default disposition before it runs
const CHILD_DEFAULTS: [Signal; 6] = [
	Signal::SIGINT,
	Signal::SIGTSTP,
	Signal::SIGQUIT,
	Signal::SIGTTIN,
	Signal::SIGTTOU,
	Signal::SIGPIPE,
];

pub fn set_foreground(pid: Pid, pgid: Pid) {
	FG_PID.store(pid.as_raw(), Ordering::SeqCst);
	FG_PGID.store(pgid.as_raw(), Ordering::SeqCst);
}

pub fn clear_foreground() {
	FG_PGID.store(0, Ordering::SeqCst);
	FG_PID.store(0, Ordering::SeqCst);
}

pub fn foreground_pid() -> Option<Pid> {
	match FG_PID.load(Ordering::SeqCst) {
		0 => None,
		pid => Some(Pid::from_raw(pid)),
	}
}

pub fn foreground_pgid() -> Option<Pid> {
	match FG_PGID.load(Ordering::SeqCst) {
		0 => None,
		pgid => Some(Pid::from_raw(pgid)),
	}
}

fn forward_to_foreground(sig: Signal) {
	let pgid = FG_PGID.load(Ordering::SeqCst);
	if pgid > 0 {
		let _ = killpg(Pid::from_raw(pgid), sig);
	}
}

/// Install the shell's own dispositions.
///
/// SIGINT and SIGTSTP are forwarded to the foreground group, if there is one, and
/// also wake up a pending line read. SIGTTIN and SIGTTOU are ignored so the shell can
/// take the terminal back from a job.
pub fn sig_handler_setup() -> OxResult<()> {
	unsafe {
		signal(Signal::SIGTTIN, SigHandler::SigIgn)?;
		signal(Signal::SIGTTOU, SigHandler::SigIgn)?;
		signal(Signal::SIGQUIT, SigHandler::SigIgn)?;
	}

	for sig in [Signal::SIGINT, Signal::SIGTSTP] {
		unsafe {
			signal_hook::low_level::register(sig as libc::c_int, move || forward_to_foreground(sig))?;
		}
	}

	let (read_end, write_end) = UnixStream::pair()?;
	read_end.set_nonblocking(true)?;
	write_end.set_nonblocking(true)?;
	signal_hook::low_level::pipe::register(libc::SIGINT, write_end.try_clone()?)?;
	signal_hook::low_level::pipe::register(libc::SIGTSTP, write_end)?;
	if WAKE_PIPE.set(read_end).is_err() {
		debug!("signal handlers were already installed");
	}
	Ok(())
}

/// Descriptor that becomes readable when an interactive signal arrives
pub fn wake_fd() -> Option<BorrowedFd<'static>> {
	WAKE_PIPE.get().map(|stream| stream.as_fd())
}

/// Swallow pending wake-ups. Returns true if there were any.
pub fn drain_wakeups() -> bool {
	let Some(mut stream) = WAKE_PIPE.get() else { return false };
	let mut buf = [0u8; 64];
	let mut woke = false;
	loop {
		match stream.read(&mut buf) {
			Ok(0) => break,
			Ok(_) => woke = true,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
			Err(e) => {
				warn!("failed to drain signal pipe: {}", e);
				break
			}
		}
	}
	woke
}

/// Runs in a freshly forked child, before any redirection or exec
pub fn reset_child_signals() {
	for sig in CHILD_DEFAULTS {
		unsafe {
			let _ = signal(sig, SigHandler::SigDfl);
		}
	}
}
