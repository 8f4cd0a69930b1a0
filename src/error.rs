use std::fmt;

use failure::Fail;

use crate::transaction::Transferred;

/// Outcomes callers may want to react to; test with
/// `failure::Error::downcast_ref::<I2cError>()`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Fail)]
pub enum I2cError {
	/// a byte wasn't acknowledged by the device
	#[fail(display = "NACK received")]
	NackReceived,

	/// nothing acknowledged the device address
	#[fail(display = "no such device")]
	NoSuchDevice,

	#[fail(display = "only 7 bit device addresses are supported (got {} bit)", width)]
	UnsupportedAddressWidth { width: u32 },

	#[fail(display = "end of EEPROM array")]
	EndOfStream,

	#[fail(display = "invalid whence")]
	InvalidWhence,

	#[fail(display = "negative position")]
	NegativePosition,

	#[fail(display = "desired position beyond end of EEPROM array")]
	PositionOutOfRange,

	/// bus adapter can't do the requested operation
	#[fail(display = "operation not supported by bus adapter")]
	Unsupported,
}

impl I2cError {
	/// whether `e` is exactly the given outcome
	pub fn is(e: &failure::Error, kind: I2cError) -> bool {
		e.downcast_ref::<I2cError>() == Some(&kind)
	}
}

/// A failed transaction, with the number of bytes transferred before the
/// fault.
#[derive(Debug)]
pub struct TransactionError {
	pub transferred: Transferred,
	pub error: failure::Error,
}

impl TransactionError {
	pub fn new(transferred: Transferred, error: failure::Error) -> Self {
		TransactionError { transferred, error }
	}

	pub fn kind(&self) -> Option<I2cError> {
		self.error.downcast_ref::<I2cError>().cloned()
	}
}

impl fmt::Display for TransactionError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f,
			"transaction failed after writing {} and reading {} bytes: {}",
			self.transferred.written,
			self.transferred.read,
			self.error,
		)
	}
}

impl Fail for TransactionError {
	fn cause(&self) -> Option<&dyn Fail> {
		Some(self.error.as_fail())
	}
}

/// A failed EEPROM read or write; `done` bytes were transferred before the
/// fault.
///
/// After a read the file pointer advanced by `done`. After a write it only
/// covers the completed page chunks; bytes acknowledged in the failing chunk
/// are counted in `done` but the pointer stays at the start of that chunk.
#[derive(Debug)]
pub struct StreamError {
	pub done: usize,
	pub error: failure::Error,
}

impl StreamError {
	pub fn new(done: usize, error: failure::Error) -> Self {
		StreamError { done, error }
	}

	pub fn end_of_stream(done: usize) -> Self {
		StreamError::new(done, I2cError::EndOfStream.into())
	}

	pub fn kind(&self) -> Option<I2cError> {
		self.error.downcast_ref::<I2cError>().cloned()
	}

	pub fn is_end_of_stream(&self) -> bool {
		self.kind() == Some(I2cError::EndOfStream)
	}
}

impl fmt::Display for StreamError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "failed after {} bytes: {}", self.done, self.error)
	}
}

impl Fail for StreamError {
	fn cause(&self) -> Option<&dyn Fail> {
		Some(self.error.as_fail())
	}
}
