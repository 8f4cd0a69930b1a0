use std::convert::TryFrom;
use std::io;
use std::str;

use crate::error::I2cError;
use crate::transaction::Transact;

use super::Eeprom24;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Whence {
	Start,
	Current,
	End,
}

impl Whence {
	/// 0: start, 1: current position, 2: end
	pub fn from_raw(whence: u32) -> crate::AResult<Self> {
		match whence {
			0 => Ok(Whence::Start),
			1 => Ok(Whence::Current),
			2 => Ok(Whence::End),
			_ => Err(I2cError::InvalidWhence.into()),
		}
	}
}

impl str::FromStr for Whence {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"start" | "set" => Ok(Whence::Start),
			"current" | "cur" => Ok(Whence::Current),
			"end" => Ok(Whence::End),
			_ => Err(I2cError::InvalidWhence.into()),
		}
	}
}

fn to_io_error(e: failure::Error) -> io::Error {
	let kind = match e.downcast_ref::<I2cError>() {
		Some(I2cError::NoSuchDevice) => io::ErrorKind::NotFound,
		Some(I2cError::EndOfStream) => io::ErrorKind::UnexpectedEof,
		Some(I2cError::InvalidWhence)
		| Some(I2cError::NegativePosition)
		| Some(I2cError::PositionOutOfRange) => io::ErrorKind::InvalidInput,
		_ => io::ErrorKind::Other,
	};
	io::Error::new(kind, format!("{}", e))
}

// partial progress is reported now, the error (if it persists) with the
// next call
impl<T: Transact> io::Read for Eeprom24<T> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if buf.is_empty() {
			return Ok(0);
		}
		match Eeprom24::read(self, buf) {
			Ok(n) => Ok(n),
			Err(e) => {
				if e.done > 0 || e.is_end_of_stream() {
					Ok(e.done)
				} else {
					Err(to_io_error(e.error))
				}
			},
		}
	}
}

impl<T: Transact> io::Write for Eeprom24<T> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let start = self.position();
		match Eeprom24::write(self, buf) {
			Ok(n) => Ok(n),
			Err(e) => {
				// only report what the file pointer moved past; a failed page
				// chunk is retried as a whole
				let done = self.position() - start;
				if done > 0 {
					Ok(done)
				} else if e.is_end_of_stream() {
					Err(io::Error::new(io::ErrorKind::WriteZero, "end of EEPROM array"))
				} else {
					Err(to_io_error(e.error))
				}
			},
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl<T: Transact> io::Seek for Eeprom24<T> {
	fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
		let (offset, whence) = match pos {
			io::SeekFrom::Start(offset) => (i64::try_from(offset).unwrap_or(i64::max_value()), Whence::Start),
			io::SeekFrom::Current(offset) => (offset, Whence::Current),
			io::SeekFrom::End(offset) => (offset, Whence::End),
		};
		Eeprom24::seek(self, offset, whence).map_err(to_io_error)?;
		Ok(self.position() as u64)
	}
}
