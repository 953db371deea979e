use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{value_parser, Arg, Command};
use env_logger::Env;
use log::{debug, info, warn};

use oxsh::config::ShellConfig;
use oxsh::prompt::{render_prompt, LineReader, ReadOutcome};
use oxsh::{signal, OxErr, OxResult, Shell};

fn cli() -> Command {
	Command::new("oxsh")
		.about("A small job-control shell")
		.version(env!("CARGO_PKG_VERSION"))
		.arg(
			Arg::new("command")
				.short('c')
				.value_name("COMMAND")
				.help("Run one command line and exit"),
		)
		.arg(
			Arg::new("config")
				.long("config")
				.value_name("FILE")
				.value_parser(value_parser!(PathBuf))
				.help("Read settings from FILE instead of the default locations"),
		)
}

fn main() {
	env_logger::Builder::from_env(Env::new().filter_or("OXSH_LOG", "warn")).init();
	let matches = cli().get_matches();

	let config = ShellConfig::load(matches.get_one::<PathBuf>("config").map(|path| path.as_path()));
	let interactive = io::stdin().is_terminal();
	debug!("interactive: {}", interactive);

	if let Err(e) = signal::sig_handler_setup() {
		warn!("signal setup failed: {}", e);
	}

	let code = match run(config, interactive, matches.get_one::<String>("command")) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("oxsh: {}", e);
			e.exit_code()
		}
	};
	std::process::exit(code)
}

fn run(config: ShellConfig, interactive: bool, command: Option<&String>) -> OxResult<i32> {
	let mut shell = Shell::new(config, interactive)?;
	let code = match command {
		Some(line) => match shell.exec_line(line) {
			Ok(code) => code,
			Err(OxErr::CleanExit(code)) => code,
			Err(e) => {
				eprintln!("oxsh: {}", e);
				e.exit_code()
			}
		},
		None => main_loop(&mut shell)?,
	};
	shell.shutdown();
	Ok(code)
}

fn main_loop(shell: &mut Shell) -> OxResult<i32> {
	let mut reader = LineReader::new()?;
	let mut stdout = io::stdout();
	loop {
		shell.jobs_mut().poll(true)?;
		if shell.shows_prompt() {
			write!(stdout, "{}", render_prompt(shell.home_dir()))?;
			stdout.flush()?;
		}

		match reader.read_line()? {
			ReadOutcome::Line(line) => match shell.exec_line(&line) {
				Ok(_) => {}
				Err(OxErr::CleanExit(code)) => {
					info!("exit requested with status {}", code);
					return Ok(code)
				}
				Err(e) => eprintln!("oxsh: {}", e),
			},
			ReadOutcome::Interrupted => writeln!(stdout)?,
			ReadOutcome::Eof => {
				if shell.shows_prompt() {
					writeln!(stdout)?;
				}
				writeln!(stdout, "logout")?;
				stdout.flush()?;
				return Ok(0)
			}
		}
	}
}
