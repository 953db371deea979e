use crate::prelude::*;

pub fn execute(_shell: &mut Shell, argv: &[String]) -> OxResult<i32> {
	let [_, pid_arg, sig_arg] = argv else {
		return Err(OxErr::usage("Usage: ping <pid> <signal_number>"))
	};

	let pid = pid_arg.parse::<i32>()
		.ok()
		.filter(|pid| *pid > 0)
		.ok_or_else(|| OxErr::usage(format!("Invalid PID: {}", pid_arg)))?;
	let invalid_sig = || OxErr::usage(format!("Invalid signal number: {}", sig_arg));
	let sig_num = sig_arg.parse::<i32>().map_err(|_| invalid_sig())?;

	let signal = match sig_num % 32 {
		0 => None,
		n => Some(Signal::try_from(n).map_err(|_| invalid_sig())?),
	};

	match kill(Pid::from_raw(pid), signal) {
		Ok(()) => {}
		Err(Errno::ESRCH) => return Err(OxErr::usage("No such process found")),
		Err(e) => return Err(e.into()),
	}
	let mut stdout = io::stdout();
	writeln!(stdout, "Sent signal {} to process with pid {}", sig_num, pid)?;
	stdout.flush()?;
	Ok(0)
}
