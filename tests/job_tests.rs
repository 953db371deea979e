mod common;

use std::thread::sleep;
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use regex::Regex;

use common::{run_line, run_script, stderr_of, stdout_of, Session};

fn settle() {
	sleep(Duration::from_millis(300));
}

#[test]
fn test_background_job_notice() {
	let dir = tempfile::tempdir().unwrap();
	let mut session = Session::start(dir.path());

	session.send("sleep 1 &");
	let notice = session.read_line();
	let re = Regex::new(r"^\[1\] (\d+)$").unwrap();
	let pid = re.captures(&notice).expect("job notice")[1].to_string();

	session.send("activities");
	assert_eq!(session.read_line(), format!("[{}] : sleep - Running", pid));

	let (_, code) = session.finish();
	assert_eq!(code, 0);
}

#[test]
fn test_background_completion_is_reported() {
	let dir = tempfile::tempdir().unwrap();
	let output = run_script(dir.path(), "sleep 0.2 &\nsleep 1\n");
	let stdout = stdout_of(&output);
	let re = Regex::new(r"(?m)^\[1\] (\d+)\nsleep with pid (\d+) exited normally\nlogout\n$").unwrap();
	let caps = re.captures(&stdout).unwrap_or_else(|| panic!("unexpected output: {:?}", stdout));
	assert_eq!(&caps[1], &caps[2]);
}

#[test]
fn test_abnormal_exit_is_reported() {
	let dir = tempfile::tempdir().unwrap();
	let output = run_script(dir.path(), "sh -c 'exit 3' &\nsleep 0.5\n");
	assert!(stdout_of(&output).contains("sh with pid"));
	assert!(stdout_of(&output).contains("exited abnormally"));
}

#[test]
fn test_background_returns_immediately() {
	let dir = tempfile::tempdir().unwrap();
	let start = std::time::Instant::now();
	let output = run_line(dir.path(), "sleep 3 & echo done");
	assert!(start.elapsed() < Duration::from_secs(2));
	assert!(stdout_of(&output).ends_with("done\n"));
	assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_bg_rejects_running_job() {
	let dir = tempfile::tempdir().unwrap();
	let mut session = Session::start(dir.path());
	session.send("sleep 2 &");
	session.read_line();

	session.send("bg ; echo marker");
	assert_eq!(session.read_err_line(), "oxsh: Job already running");
	assert_eq!(session.read_line(), "marker");
	session.finish();
}

#[test]
fn test_bg_rejects_finished_job() {
	let dir = tempfile::tempdir().unwrap();
	// The table is only swept between lines, so the job is still there, but gone
	let output = run_line(dir.path(), "sleep 0.1 & sleep 0.5 ; bg");
	assert!(stdout_of(&output).starts_with("[1] "));
	assert!(stderr_of(&output).contains("oxsh: Job is not stopped"));
	assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_fg_job_can_stop_again() {
	let dir = tempfile::tempdir().unwrap();
	let mut session = Session::start(dir.path());
	let shell = Pid::from_raw(session.pid());

	session.send("sleep 5");
	settle();
	kill(shell, Signal::SIGTSTP).unwrap();
	assert_eq!(session.read_line(), "[1] Stopped sleep");

	session.send("fg %1");
	assert_eq!(session.read_line(), "sleep");
	settle();
	kill(shell, Signal::SIGTSTP).unwrap();
	assert_eq!(session.read_line(), "[1] Stopped sleep");

	session.send("activities");
	assert!(session.read_line().ends_with(": sleep - Stopped"));
	session.finish();
}

#[test]
fn test_stop_and_resume_foreground_job() {
	let dir = tempfile::tempdir().unwrap();
	let mut session = Session::start(dir.path());
	let shell = Pid::from_raw(session.pid());

	session.send("sleep 5");
	settle();
	kill(shell, Signal::SIGTSTP).unwrap();
	assert_eq!(session.read_line(), "[1] Stopped sleep");

	session.send("activities");
	assert!(session.read_line().ends_with(": sleep - Stopped"));

	session.send("bg");
	assert_eq!(session.read_line(), "[1] sleep &");

	session.send("activities");
	assert!(session.read_line().ends_with(": sleep - Running"));

	session.send("echo alive");
	assert_eq!(session.read_line(), "alive");
	session.finish();
}

#[test]
fn test_interrupt_reaches_foreground_only() {
	let dir = tempfile::tempdir().unwrap();
	let mut session = Session::start(dir.path());
	let shell = Pid::from_raw(session.pid());

	let start = std::time::Instant::now();
	session.send("sleep 5");
	settle();
	kill(shell, Signal::SIGINT).unwrap();

	session.send("echo after");
	assert_eq!(session.read_line(), "after");
	assert!(start.elapsed() < Duration::from_secs(4));

	let (rest, code) = session.finish();
	assert_eq!(rest, "logout\n");
	assert_eq!(code, 0);
}

#[test]
fn test_ping_stop_then_bg() {
	let dir = tempfile::tempdir().unwrap();
	let mut session = Session::start(dir.path());

	session.send("sleep 5 &");
	let notice = session.read_line();
	let pid = notice.split_whitespace().nth(1).unwrap().to_string();

	session.send(&format!("ping {} 19", pid));
	assert_eq!(session.read_line(), format!("Sent signal 19 to process with pid {}", pid));
	settle();

	session.send("bg %1");
	assert_eq!(session.read_line(), "[1] sleep &");
	session.finish();
}

#[test]
fn test_fg_waits_for_job() {
	let dir = tempfile::tempdir().unwrap();
	let output = run_script(dir.path(), "sleep 0.3 &\nfg\necho after\n");
	let stdout = stdout_of(&output);
	let lines: Vec<&str> = stdout.lines().collect();
	assert!(lines[0].starts_with("[1] "));
	assert_eq!(&lines[1..], &["sleep", "after", "logout"]);
}

#[test]
fn test_redirected_builtin_runs_as_job() {
	let dir = tempfile::tempdir().unwrap();
	let output = run_script(dir.path(), "reveal -l > listing.txt &\nsleep 0.5\n");
	let stdout = stdout_of(&output);
	let re = Regex::new(r"^\[1\] (\d+)\nreveal with pid (\d+) exited normally\nlogout\n$").unwrap();
	let caps = re.captures(&stdout).unwrap_or_else(|| panic!("unexpected output: {:?}", stdout));
	assert_eq!(&caps[1], &caps[2]);
	assert!(stderr_of(&output).contains("Warning: Built-in command 'reveal' cannot run in background"));
	assert_eq!(std::fs::read_to_string(dir.path().join("listing.txt")).unwrap(), "listing.txt\n");
}
