use crate::prelude::*;

use super::hop;

bitflags! {
	#[derive(Debug,Clone,Copy,PartialEq,Eq)]
	pub struct RevealFlags: u32 {
		/// Include entries starting with '.'
		const ALL  = 0b01;
		/// One entry per line
		const LONG = 0b10;
	}
}

const NO_SUCH_DIR: &str = "No such directory!";

fn parse_flags<'a>(args: &mut std::iter::Peekable<std::slice::Iter<'a, String>>) -> OxResult<RevealFlags> {
	let mut flags = RevealFlags::empty();
	while let Some(arg) = args.next_if(|arg| arg.starts_with('-') && arg.len() > 1) {
		for ch in arg.chars().skip(1) {
			flags |= match ch {
				'a' => RevealFlags::ALL,
				'l' => RevealFlags::LONG,
				_ => return Err(OxErr::usage(format!("reveal: Invalid flag -{}", ch)))
			};
		}
	}
	Ok(flags)
}

/// Sorted entry names of `dir`. `.` and `..` are listed along with the other hidden entries.
pub fn list_dir(dir: &Path, flags: RevealFlags) -> OxResult<Vec<String>> {
	let mut names = vec![];
	if flags.contains(RevealFlags::ALL) {
		names.push(".".to_string());
		names.push("..".to_string());
	}
	for entry in std::fs::read_dir(dir).map_err(|_| OxErr::usage(NO_SUCH_DIR))? {
		let name = entry?.file_name().to_string_lossy().into_owned();
		if name.starts_with('.') && !flags.contains(RevealFlags::ALL) {
			continue
		}
		names.push(name);
	}
	names.sort();
	Ok(names)
}

pub fn execute(shell: &mut Shell, argv: &[String]) -> OxResult<i32> {
	let mut args = argv[1..].iter().peekable();
	let flags = parse_flags(&mut args)?;
	let rest: Vec<&String> = args.collect();
	if rest.len() > 1 {
		return Err(OxErr::usage("reveal: Invalid Syntax!"))
	}

	let target = match rest.first() {
		Some(arg) => hop::resolve_path(shell, arg)?.ok_or_else(|| OxErr::usage(NO_SUCH_DIR))?,
		None => env::current_dir()?,
	};
	if !target.is_dir() {
		return Err(OxErr::usage(NO_SUCH_DIR))
	}

	let names = list_dir(&target, flags)?;
	let mut stdout = io::stdout().lock();
	if flags.contains(RevealFlags::LONG) {
		for name in &names {
			writeln!(stdout, "{}", name)?;
		}
	} else if !names.is_empty() {
		writeln!(stdout, "{}", names.join("  "))?;
	}
	stdout.flush()?;
	Ok(0)
}
