use crate::prelude::*;

const NO_SUCH_DIR: &str = "No such directory!";

/// Resolve a hop/reveal argument. `None` means `-` was given before any directory change.
pub fn resolve_path(shell: &Shell, arg: &str) -> OxResult<Option<PathBuf>> {
	let path = match arg {
		"~" => shell.home_dir().to_path_buf(),
		"-" => match shell.prev_dir() {
			Some(prev) => prev.to_path_buf(),
			None => return Ok(None),
		},
		"." => env::current_dir()?,
		".." => {
			let cwd = env::current_dir()?;
			cwd.parent().map(Path::to_path_buf).unwrap_or(cwd)
		}
		_ => {
			if let Some(rest) = arg.strip_prefix("~/") {
				shell.home_dir().join(rest)
			} else {
				env::current_dir()?.join(arg)
			}
		}
	};
	Ok(Some(path))
}

fn change_dir(shell: &mut Shell, target: &Path) -> OxResult<()> {
	let cwd = env::current_dir()?;
	env::set_current_dir(target).map_err(|_| OxErr::usage(NO_SUCH_DIR))?;
	if cwd != target {
		shell.set_prev_dir(cwd);
	}
	Ok(())
}

pub fn execute(shell: &mut Shell, argv: &[String]) -> OxResult<i32> {
	let args = &argv[1..];
	if args.is_empty() {
		let home = shell.home_dir().to_path_buf();
		change_dir(shell, &home)?;
		return Ok(0)
	}

	for arg in args {
		if arg == "." {
			continue
		}
		let Some(target) = resolve_path(shell, arg)? else {
			continue
		};
		if !target.is_dir() {
			return Err(OxErr::usage(NO_SUCH_DIR))
		}
		change_dir(shell, &target)?;
	}
	Ok(0)
}
