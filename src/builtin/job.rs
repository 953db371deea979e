use once_cell::sync::Lazy;
use regex::Regex;

use crate::jobs::{wait_fg, FgOutcome, JobState};
use crate::prelude::*;

static JOB_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^%?(\d+)$").unwrap());

/// `N` or `%N`, with N a positive job number
pub fn parse_job_id(arg: &str) -> Option<usize> {
	let caps = JOB_ID.captures(arg)?;
	caps[1].parse::<usize>().ok().filter(|id| *id > 0)
}

/// Pick the job named by `argv`, or the most recent one when no id was given
fn select_job(shell: &Shell, argv: &[String], none_msg: &str) -> OxResult<usize> {
	let id = match argv {
		[_] => shell.jobs().most_recent_id().ok_or_else(|| OxErr::no_job(none_msg))?,
		[_, arg] => parse_job_id(arg).ok_or_else(|| OxErr::usage(format!("Invalid job number: {}", arg)))?,
		_ => {
			let name = argv.first().map(|s| s.as_str()).unwrap_or("fg");
			return Err(OxErr::usage(format!("Usage: {} [job_number]", name)))
		}
	};
	if shell.jobs().find(id).is_none() {
		return Err(OxErr::no_job("No such job"))
	}
	Ok(id)
}

pub fn activities(shell: &mut Shell, _argv: &[String]) -> OxResult<i32> {
	shell.jobs_mut().poll(false)?;
	let mut jobs: Vec<_> = shell.jobs().jobs().collect();
	jobs.sort_by(|a, b| a.name().cmp(b.name()));

	let mut stdout = io::stdout().lock();
	for job in jobs {
		writeln!(stdout, "[{}] : {} - {}", job.pid(), job.name(), job.state())?;
	}
	stdout.flush()?;
	Ok(0)
}

pub fn fg(shell: &mut Shell, argv: &[String]) -> OxResult<i32> {
	let id = select_job(shell, argv, "No jobs to bring to foreground")?;
	let interactive = shell.is_interactive();
	let job = shell.jobs_mut().find_mut(id).ok_or_else(|| OxErr::no_job("No such job"))?;

	let mut stdout = io::stdout();
	writeln!(stdout, "{}", job.name())?;
	stdout.flush()?;

	if job.state() == JobState::Stopped {
		job.resume()?;
	}
	match wait_fg(job, interactive)? {
		FgOutcome::Finished(code) => {
			shell.jobs_mut().remove(id);
			Ok(code)
		}
		FgOutcome::Stopped => {
			writeln!(stdout, "[{}] Stopped {}", id, job.name())?;
			stdout.flush()?;
			Ok(0)
		}
	}
}

pub fn bg(shell: &mut Shell, argv: &[String]) -> OxResult<i32> {
	let id = select_job(shell, argv, "No jobs to resume in background")?;
	let job = shell.jobs_mut().find_mut(id).ok_or_else(|| OxErr::no_job("No such job"))?;

	job.poll();
	match job.state() {
		JobState::Running => Err(OxErr::bad_job_state("Job already running")),
		JobState::Terminated => Err(OxErr::bad_job_state("Job is not stopped")),
		JobState::Stopped => {
			job.resume()?;
			let mut stdout = io::stdout();
			writeln!(stdout, "[{}] {} &", id, job.name())?;
			stdout.flush()?;
			Ok(0)
		}
	}
}
