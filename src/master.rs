use crate::transaction::{
	Transact16x8,
	Transact8x8,
};

/// Low-level access to an I2C bus.
///
/// The implementor must be the only master on the bus; there is no
/// arbitration, clock stretching or timeout handling at this layer.
pub trait I2cMaster {
	/// start or repeated start condition, depending on bus state
	fn start(&mut self) -> crate::AResult<()>;

	fn stop(&mut self) -> crate::AResult<()>;

	/// read one byte and send an ACK if `ack` is true; the caller must pass
	/// `ack = false` for the last byte before a stop condition.
	fn read_byte(&mut self, ack: bool) -> crate::AResult<u8>;

	/// write one byte; fails with `I2cError::NackReceived` if the device
	/// didn't acknowledge it.
	fn write_byte(&mut self, b: u8) -> crate::AResult<()>;

	/// Adapters that can run 8x8 transactions themselves return `Some`;
	/// `Transactor` then skips the byte level protocol.
	fn as_transact8x8(&mut self) -> Option<&mut dyn Transact8x8> {
		None
	}

	/// see `as_transact8x8`
	fn as_transact16x8(&mut self) -> Option<&mut dyn Transact16x8> {
		None
	}
}

impl<'a, M: ?Sized + I2cMaster> I2cMaster for &'a mut M {
	fn start(&mut self) -> crate::AResult<()> {
		M::start(*self)
	}
	fn stop(&mut self) -> crate::AResult<()> {
		M::stop(*self)
	}
	fn read_byte(&mut self, ack: bool) -> crate::AResult<u8> {
		M::read_byte(*self, ack)
	}
	fn write_byte(&mut self, b: u8) -> crate::AResult<()> {
		M::write_byte(*self, b)
	}
	fn as_transact8x8(&mut self) -> Option<&mut dyn Transact8x8> {
		M::as_transact8x8(*self)
	}
	fn as_transact16x8(&mut self) -> Option<&mut dyn Transact16x8> {
		M::as_transact16x8(*self)
	}
}
