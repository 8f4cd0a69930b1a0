//! Driver for 24Cxx family I2C EEPROMs.
//!
//! The memory array is presented as a fixed size file with a file pointer;
//! see `Eeprom24::read`, `Eeprom24::write` and `Eeprom24::seek`, or the
//! `std::io` traits implemented on top of them.
//!
//! Both addressing conventions are supported, picked from the array size
//! (see `AddressingMode`). Offsets beyond what the register address covers
//! go into the low bits of the device address, i.e. the driver talks to
//! `base + (offset >> 8)` (small parts) or `base + (offset >> 16)` (large
//! parts).
//!
//! Not implemented: waiting `write_delay` after page writes, and address
//! polling until a write completed. Callers writing several pages in a row
//! need to pace themselves. Whether a read crossing a device address
//! boundary continues into the next bank or wraps depends on the part; the
//! driver issues a single transaction per read regardless.

mod config;
mod io;

pub use self::config::{
	AddressingMode,
	Eeprom24Config,
	MAX_EEPROM_SIZE,
};
pub use self::io::Whence;

use std::cmp;

use crate::addr::{
	Addr,
	Addr7,
	require_addr7,
};
use crate::error::{
	I2cError,
	StreamError,
	TransactionError,
};
use crate::master::I2cMaster;
use crate::transaction::{
	Transact,
	Transactor,
	Transferred,
};

pub struct Eeprom24<T> {
	conf: Eeprom24Config,
	mode: AddressingMode,
	transactor: T,
	devaddr: Addr7,
	pos: usize, // file pointer, 0 <= pos <= size
}

impl<M: I2cMaster> Eeprom24<Transactor<M>> {
	/// EEPROM with base address `devaddr` on the bus driven by `master`.
	pub fn from_master(master: M, devaddr: &dyn Addr, conf: Eeprom24Config) -> crate::AResult<Self> {
		Eeprom24::new(Transactor::new(master), devaddr, conf)
	}
}

impl<T: Transact> Eeprom24<T> {
	/// Only 7 bit device addresses are supported.
	pub fn new(transactor: T, devaddr: &dyn Addr, conf: Eeprom24Config) -> crate::AResult<Self> {
		conf.validate()?;
		let devaddr = with_context!("EEPROM device address", require_addr7(devaddr))?;
		let mode = conf.addressing_mode();

		debug!("EEPROM @{}: {} bytes, {} byte pages, {} addressing", devaddr, conf.size(), conf.page_size(), mode);

		Ok(Eeprom24 {
			conf,
			mode,
			transactor,
			devaddr,
			pos: 0,
		})
	}

	pub fn config(&self) -> &Eeprom24Config {
		&self.conf
	}

	pub fn addressing_mode(&self) -> AddressingMode {
		self.mode
	}

	pub fn position(&self) -> usize {
		self.pos
	}

	pub fn into_inner(self) -> T {
		self.transactor
	}

	// device address and register address for an array offset
	fn locate(&self, offset: usize) -> (Addr7, usize) {
		let bits = self.mode.register_bits();
		// offset < MAX_EEPROM_SIZE keeps this in 3 bits
		let bank = (offset >> bits) as u8;
		let devaddr = Addr7::new(self.devaddr.value().wrapping_add(bank));
		(devaddr, offset & ((1 << bits) - 1))
	}

	fn transact(&mut self, offset: usize, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		let (devaddr, regaddr) = self.locate(offset);
		match self.mode {
			AddressingMode::Small => self.transactor.transact8x8(&devaddr, regaddr as u8, w, r),
			AddressingMode::Large => self.transactor.transact16x8(&devaddr, regaddr as u16, w, r),
		}
	}

	/// Reads up to `buf.len()` bytes in a single transaction, stopping at the
	/// end of the array.
	///
	/// Fails with `I2cError::EndOfStream` (and nothing read) if the file
	/// pointer already is at the end. On other errors the file pointer still
	/// advances by the bytes read before the fault.
	pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
		let start = self.pos;
		let end = cmp::min(start + buf.len(), self.conf.size());
		if end == start {
			return Err(StreamError::end_of_stream(0));
		}

		trace!("EEPROM @{}: read {} bytes at 0x{:05x}", self.devaddr, end - start, start);

		match self.transact(start, &[], &mut buf[..end - start]) {
			Ok(done) => {
				self.pos += done.read;
				Ok(done.read)
			},
			Err(e) => {
				self.pos += e.transferred.read;
				Err(StreamError::new(e.transferred.read, e.error))
			},
		}
	}

	/// Writes `buf` with one transaction per page touched; a transaction
	/// never crosses a page boundary, as the device would wrap around to the
	/// start of the same page.
	///
	/// If the end of the array is reached before `buf` is consumed, fails
	/// with `I2cError::EndOfStream` and the number of bytes written. A failed
	/// transaction stops the write; the error carries the bytes written so
	/// far (including the partial page) and the file pointer stays at the
	/// start of the failed page chunk.
	pub fn write(&mut self, buf: &[u8]) -> Result<usize, StreamError> {
		let size = self.conf.size();
		let page_size = self.conf.page_size();
		let mut rest = buf;

		while !rest.is_empty() && self.pos < size {
			let in_page = self.pos & (page_size - 1);
			let len = cmp::min(rest.len(), page_size - in_page);

			trace!("EEPROM @{}: write {} bytes at 0x{:05x}", self.devaddr, len, self.pos);

			if let Err(e) = self.transact(self.pos, &rest[..len], &mut []) {
				let done = buf.len() - rest.len() + e.transferred.written;
				return Err(StreamError::new(done, e.error));
			}

			self.pos += len;
			rest = &rest[len..];
		}

		if self.pos > size {
			panic!("wrote beyond end of EEPROM (0x{:x} > 0x{:x}); is the configuration correct?", self.pos, size);
		}

		let done = buf.len() - rest.len();
		if !rest.is_empty() {
			return Err(StreamError::end_of_stream(done));
		}
		Ok(done)
	}

	/// Moves the file pointer and returns its previous value. The new
	/// position must be within `0..=size`.
	pub fn seek(&mut self, offset: i64, whence: Whence) -> crate::AResult<u64> {
		let prev = self.pos as i64;
		let base = match whence {
			Whence::Start => 0,
			Whence::Current => prev,
			Whence::End => self.conf.size() as i64,
		};

		let target = match base.checked_add(offset) {
			Some(target) => target,
			None if offset < 0 => return Err(I2cError::NegativePosition.into()),
			None => return Err(I2cError::PositionOutOfRange.into()),
		};
		if target < 0 {
			return Err(I2cError::NegativePosition.into());
		}
		if target > self.conf.size() as i64 {
			return Err(I2cError::PositionOutOfRange.into());
		}

		self.pos = target as usize;
		Ok(prev as u64)
	}
}
