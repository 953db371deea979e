use crate::prelude::*;

pub fn exit(_shell: &mut Shell, argv: &[String]) -> OxResult<i32> {
	let code = argv.get(1)
		.and_then(|arg| arg.parse::<i32>().ok())
		.unwrap_or(0);
	Err(OxErr::CleanExit(code))
}
