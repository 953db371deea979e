use crate::prelude::*;

bitflags::bitflags! {
	/// Where a stage sits in its pipeline, decides which of its own redirections apply
	#[derive(Debug,Clone,Copy,PartialEq,Eq)]
	pub struct ExecFlags: u32 {
		const BACKGROUND = 0b00000000000000000000000000000001;
		const FIRST      = 0b00000000000000000000000000000010;
		const LAST       = 0b00000000000000000000000000000100;
	}
}

impl ExecFlags {
	pub fn for_stage(index: usize, count: usize, background: bool) -> Self {
		let mut flags = ExecFlags::empty();
		if index == 0 {
			flags |= ExecFlags::FIRST;
		}
		if index + 1 == count {
			flags |= ExecFlags::LAST;
		}
		if background {
			flags |= ExecFlags::BACKGROUND;
		}
		flags
	}
}

/// Thin owner of a raw file descriptor. Closing is explicit, nothing happens on drop,
/// so a forked child can close exactly the descriptors it does not need.
#[derive(Hash, Eq, PartialEq, Debug)]
pub struct RustFd {
	fd: RawFd,
}

impl io::Read for RustFd {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if !self.is_valid() {
			return Err(io::Error::new(io::ErrorKind::Other, "Invalid RustFd"));
		}

		loop {
			let result = unsafe { libc::read(self.as_raw_fd(), buf.as_mut_ptr() as *mut c_void, buf.len()) };
			if result >= 0 {
				return Ok(result as usize)
			}
			let err = io::Error::last_os_error();
			if err.kind() != io::ErrorKind::Interrupted {
				return Err(err)
			}
		}
	}
}

impl AsFd for RustFd {
	fn as_fd(&self) -> BorrowedFd<'_> {
		unsafe { BorrowedFd::borrow_raw(self.as_raw_fd()) }
	}
}

impl RustFd {
	pub fn new(fd: RawFd) -> io::Result<Self> {
		if fd < 0 {
			return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid file descriptor: {}", fd)))
		}
		Ok(RustFd { fd })
	}

	/// Produces two `RustFds` that point to the read and write ends of a new pipe
	pub fn pipe() -> io::Result<(Self,Self)> {
		let mut fds = [0;2];
		let result = unsafe { libc::pipe(fds.as_mut_ptr()) };

		if result == -1 {
			return Err(io::Error::last_os_error())
		}
		let r_fd = RustFd::new(fds[0])?;
		let w_fd = RustFd::new(fds[1])?;
		Ok((r_fd,w_fd))
	}

	/// Duplicate 'self' onto the given target file descriptor
	pub fn dup2<T: AsRawFd>(&self, target: &T) -> io::Result<()> {
		let target_fd = target.as_raw_fd();
		if self.fd == target_fd {
			return Ok(())
		}
		if !self.is_valid() || target_fd < 0 {
			return Err(io::Error::new(io::ErrorKind::Other, "Invalid RustFd"));
		}

		if unsafe { libc::dup2(self.as_raw_fd(), target_fd) } < 0 {
			return Err(io::Error::last_os_error())
		}
		Ok(())
	}

	/// Open a file with the given open(2) flags and creation mode
	pub fn open(path: &str, flags: i32, mode: mode_t) -> io::Result<Self> {
		let c_path = CString::new(path)
			.map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid path: {}", e)))?;
		let file_fd = unsafe { libc::open(c_path.as_ptr(), flags, mode as libc::c_uint) };
		if file_fd < 0 {
			return Err(io::Error::last_os_error())
		}
		Self::new(file_fd)
	}

	/// Open `path` for a redirection, creating it with mode 0644 when writing
	pub fn open_redirect(path: &str, kind: RedirKind, append: bool) -> io::Result<Self> {
		let flags = match (kind, append) {
			(RedirKind::Input, _) => O_RDONLY,
			(RedirKind::Output, false) => O_WRONLY | O_CREAT | O_TRUNC,
			(RedirKind::Output, true) => O_WRONLY | O_CREAT | O_APPEND,
		};
		Self::open(path, flags, 0o644)
	}

	pub fn close(&mut self) -> io::Result<()> {
		if !self.is_valid() {
			return Ok(())
		}
		if matches!(self.as_raw_fd(), 0 | 1 | 2) {
			self.fd = -1;
			return Ok(())
		}

		let result = unsafe { libc::close(self.as_raw_fd()) };
		self.fd = -1;
		if result < 0 {
			Err(io::Error::last_os_error())
		} else {
			Ok(())
		}
	}

	pub fn is_valid(&self) -> bool {
		self.fd >= 0
	}
}

impl Display for RustFd {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.fd)
	}
}

impl AsRawFd for RustFd {
	fn as_raw_fd(&self) -> RawFd {
		self.fd
	}
}

/// Point `target` at `path`, the way a redirection does. The opened descriptor is closed again
/// once it has been duplicated.
pub fn redirect_fd(path: &str, kind: RedirKind, append: bool, target: RawFd) -> OxResult<()> {
	let mut file_fd = RustFd::open_redirect(path, kind, append)
		.map_err(|e| OxErr::redirection(kind, path, e))?;
	file_fd.dup2(&target)?;
	file_fd.close()?;
	Ok(())
}
