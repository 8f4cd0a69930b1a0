//! Write-then-read transactions on top of a low level `I2cMaster`.
//!
//! 8x8: 8 bit register address, 8 bit data. Without read phase:
//!
//! ```text
//! [S] [addr<<1] A [reg] A [w0] A ... [P]
//! ```
//!
//! With read phase:
//!
//! ```text
//! [S] [addr<<1] A [reg] A [w0] A ... [S] [(addr<<1)|1] A [r0] A ... [rN] N [P]
//! ```
//!
//! 16x8 is the same with two register address bytes (high byte first); it is
//! emulated on 8x8 unless the bus adapter implements it natively.

mod emulate;
mod protocol;

pub use self::emulate::emulate_transact16x8;
pub use self::protocol::master_transact8x8;

use crate::addr::Addr;
use crate::error::TransactionError;
use crate::master::I2cMaster;

/// Bytes transferred by a transaction.
///
/// On success `written` and `read` match the requested lengths.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Transferred {
	pub written: usize,
	pub read: usize,
}

pub trait Transact8x8 {
	/// The register address is always written; the read phase only happens
	/// for a non-empty `r`.
	fn transact8x8(&mut self, addr: &dyn Addr, regaddr: u8, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError>;
}

pub trait Transact16x8 {
	fn transact16x8(&mut self, addr: &dyn Addr, regaddr: u16, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError>;
}

/// Both transaction kinds; what the EEPROM driver needs.
pub trait Transact: Transact8x8 + Transact16x8 {}

impl<T: ?Sized + Transact8x8 + Transact16x8> Transact for T {}

impl<'a, T: ?Sized + Transact8x8> Transact8x8 for &'a mut T {
	fn transact8x8(&mut self, addr: &dyn Addr, regaddr: u8, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		T::transact8x8(*self, addr, regaddr, w, r)
	}
}

impl<'a, T: ?Sized + Transact16x8> Transact16x8 for &'a mut T {
	fn transact16x8(&mut self, addr: &dyn Addr, regaddr: u16, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		T::transact16x8(*self, addr, regaddr, w, r)
	}
}

/// All transaction kinds for one bus.
///
/// If the master runs a transaction kind natively (see
/// `I2cMaster::as_transact8x8`) that implementation is used, otherwise the
/// transaction is built from start/stop/read/write.
pub struct Transactor<M: I2cMaster> {
	master: M,
}

impl<M: I2cMaster> Transactor<M> {
	pub fn new(master: M) -> Self {
		Transactor { master }
	}

	pub fn master_mut(&mut self) -> &mut M {
		&mut self.master
	}

	pub fn into_inner(self) -> M {
		self.master
	}
}

impl<M: I2cMaster> Transact8x8 for Transactor<M> {
	fn transact8x8(&mut self, addr: &dyn Addr, regaddr: u8, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		if let Some(native) = self.master.as_transact8x8() {
			return native.transact8x8(addr, regaddr, w, r);
		}
		master_transact8x8(&mut self.master, addr, regaddr, w, r)
	}
}

impl<M: I2cMaster> Transact16x8 for Transactor<M> {
	fn transact16x8(&mut self, addr: &dyn Addr, regaddr: u16, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		if let Some(native) = self.master.as_transact16x8() {
			return native.transact16x8(addr, regaddr, w, r);
		}
		// goes through our own 8x8, which might be native
		emulate_transact16x8(self, addr, regaddr, w, r)
	}
}
