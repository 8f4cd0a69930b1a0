use crate::addr::Addr;
use crate::error::TransactionError;

use super::{
	Transact8x8,
	Transferred,
};

// the low register address byte travels as the first "data" byte; don't
// count it as written
fn hide_address_byte(mut done: Transferred) -> Transferred {
	if done.written > 0 {
		done.written -= 1;
	}
	done
}

/// 16x8 transaction as an 8x8 one: the high byte of `regaddr` is sent as
/// 8 bit register address, the low byte as first data byte.
pub fn emulate_transact16x8<T: ?Sized + Transact8x8>(t: &mut T, addr: &dyn Addr, regaddr: u16, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
	let mut wbuf = Vec::with_capacity(1 + w.len());
	wbuf.push(regaddr as u8);
	wbuf.extend_from_slice(w);

	match t.transact8x8(addr, (regaddr >> 8) as u8, &wbuf, r) {
		Ok(done) => Ok(hide_address_byte(done)),
		Err(mut e) => {
			e.transferred = hide_address_byte(e.transferred);
			Err(e)
		},
	}
}
