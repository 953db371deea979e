pub use std::{
	collections::VecDeque,
	env,
	ffi::{
		c_void,
		CString
	},
	fmt::{
		self,
		Display
	},
	io::{
		self,
		Read,
		Write
	},
	os::fd::{
		AsFd,
		AsRawFd,
		BorrowedFd,
		FromRawFd,
		IntoRawFd,
		RawFd
	}, path::{
		Path,
		PathBuf
	}
};

pub use libc::{
	mode_t,
	STDIN_FILENO,
	STDOUT_FILENO,
	STDERR_FILENO,
	O_APPEND,
	O_CREAT,
	O_RDONLY,
	O_TRUNC,
	O_WRONLY
};
pub use nix::{
	errno::Errno,
	sys::{
		signal::{
			kill,
			killpg,
			Signal
		},
		wait::{
			waitpid,
			WaitPidFlag,
			WaitStatus
		}
	}, unistd::{
		setpgid,
		fork,
		ForkResult,
		Pid
	}
};
pub use bitflags::bitflags;
pub use crate::{
	shellenv::Shell,
	error::{
		OxResult,
		OxErr,
		RedirKind
	},
};
