#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod addr;
pub mod eeprom24;
pub mod error;
pub mod linux;
pub mod master;
pub mod transaction;

#[cfg(test)]
mod testing;

pub use self::addr::{
	Addr,
	Addr10,
	Addr7,
};

pub use self::eeprom24::{
	AddressingMode,
	Eeprom24,
	Eeprom24Config,
	MAX_EEPROM_SIZE,
	Whence,
};

pub use self::error::{
	I2cError,
	StreamError,
	TransactionError,
};

pub use self::master::I2cMaster;

pub use self::transaction::{
	Transact,
	Transact16x8,
	Transact8x8,
	Transactor,
	Transferred,
	master_transact8x8,
};
