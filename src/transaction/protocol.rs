use crate::addr::{
	Addr,
	require_addr7,
};
use crate::error::{
	I2cError,
	TransactionError,
};
use crate::master::I2cMaster;

use super::Transferred;

// an address byte nobody acknowledged means there is no such device
fn send_device_address<M: ?Sized + I2cMaster>(m: &mut M, b: u8) -> crate::AResult<()> {
	m.write_byte(b).map_err(|e| {
		if I2cError::is(&e, I2cError::NackReceived) {
			I2cError::NoSuchDevice.into()
		} else {
			e
		}
	})
}

/// Runs an 8x8 transaction with the byte level operations of `m`.
///
/// Also useful for adapters implementing `Transact8x8` natively that need
/// a fallback for transactions their hardware can't do.
///
/// A stop condition is sent whenever the start condition succeeded; if the
/// transaction already failed, the result of the stop is ignored and the
/// first error is reported.
pub fn master_transact8x8<M: ?Sized + I2cMaster>(m: &mut M, addr: &dyn Addr, regaddr: u8, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
	let mut done = Transferred::default();

	let addr = match require_addr7(addr) {
		Ok(addr) => addr,
		Err(e) => return Err(TransactionError::new(done, e)),
	};

	trace!("8x8 transaction @{}: reg 0x{:02x}, write {}, read {}", addr, regaddr, w.len(), r.len());

	if let Err(e) = m.start() {
		return Err(TransactionError::new(done, e));
	}

	// everything between (not including) start and stop
	let result = (|| -> crate::AResult<()> {
		send_device_address(m, addr.write_byte())?;
		m.write_byte(regaddr)?;

		for &b in w {
			m.write_byte(b)?;
			done.written += 1;
		}

		if r.is_empty() {
			return Ok(());
		}

		// repeated start
		m.start()?;
		send_device_address(m, addr.read_byte())?;

		let last = r.len() - 1;
		for (i, t) in r.iter_mut().enumerate() {
			*t = m.read_byte(i != last)?;
			done.read += 1;
		}

		Ok(())
	})();

	let result = match result {
		Ok(()) => m.stop(),
		Err(e) => {
			if let Err(stop_err) = m.stop() {
				debug!("ignoring failed stop condition after error: {}", stop_err);
			}
			Err(e)
		},
	};

	match result {
		Ok(()) => Ok(done),
		Err(e) => {
			debug!("8x8 transaction @{} failed: {}", addr, e);
			Err(TransactionError::new(done, e))
		},
	}
}
