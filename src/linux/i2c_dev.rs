use std::convert::TryFrom;
use std::fs;
use std::io;
use std::os::unix::io::AsRawFd;

use crate::addr::{
	Addr,
	Addr7,
	require_addr7,
};
use crate::error::{
	I2cError,
	TransactionError,
};
use crate::master::I2cMaster;
use crate::transaction::{
	Transact16x8,
	Transact8x8,
	Transferred,
};

/* from <linux/i2c-dev.h> and <linux/i2c.h> */

const I2C_RDWR: u32 = 0x0707;
const I2C_M_RD: u16 = 0x0001;

#[repr(C)]
struct I2cMsg {
	addr: u16,
	flags: u16,
	len: u16,
	buf: *mut u8,
}

#[repr(C)]
struct I2cRdwrIoctlData {
	msgs: *mut I2cMsg,
	nmsgs: u32,
}

// the i2c core reports an unacknowledged address as ENXIO and a NACK in the
// data phase as EREMOTEIO (most bus drivers at least)
fn from_os_error(e: io::Error) -> failure::Error {
	match e.raw_os_error() {
		Some(libc::ENXIO) => I2cError::NoSuchDevice.into(),
		Some(libc::EREMOTEIO) => I2cError::NackReceived.into(),
		_ => e.into(),
	}
}

fn message_len(len: usize) -> crate::AResult<u16> {
	match u16::try_from(len) {
		Ok(len) => Ok(len),
		Err(_) => bail!("I2C message of {} bytes is too long", len),
	}
}

/// An I2C bus driven through the Linux `i2c-dev` interface.
///
/// The kernel only exposes complete messages, so the byte level operations
/// of `I2cMaster` fail with `I2cError::Unsupported`; both transaction kinds
/// are run natively with a single `I2C_RDWR` ioctl.
#[derive(Debug)]
pub struct LinuxI2cBus {
	file: fs::File,
	path: String,
}

impl LinuxI2cBus {
	pub fn open(path: &str) -> crate::AResult<Self> {
		let file = with_context!(("couldn't open I2C bus {}", path), {
			Ok(fs::OpenOptions::new().read(true).write(true).open(path)?)
		})?;
		info!("Opened I2C bus {}", path);

		Ok(LinuxI2cBus {
			file,
			path: path.into(),
		})
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	fn rdwr(&mut self, addr: Addr7, regaddr: &[u8], w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		let mut done = Transferred::default();

		let mut wbuf = Vec::with_capacity(regaddr.len() + w.len());
		wbuf.extend_from_slice(regaddr);
		wbuf.extend_from_slice(w);

		let lens = message_len(wbuf.len()).and_then(|wlen| Ok((wlen, message_len(r.len())?)));
		let (wlen, rlen) = match lens {
			Ok(lens) => lens,
			Err(e) => return Err(TransactionError::new(done, e)),
		};

		let mut msgs = [
			I2cMsg {
				addr: addr.value() as u16,
				flags: 0,
				len: wlen,
				buf: wbuf.as_mut_ptr(),
			},
			I2cMsg {
				addr: addr.value() as u16,
				flags: I2C_M_RD,
				len: rlen,
				buf: r.as_mut_ptr(),
			},
		];
		let nmsgs = if r.is_empty() { 1 } else { 2 };
		let mut data = I2cRdwrIoctlData {
			msgs: msgs.as_mut_ptr(),
			nmsgs,
		};

		trace!("{}: I2C_RDWR @{}: {} register address bytes, write {}, read {}", self.path, addr, regaddr.len(), w.len(), r.len());

		let res = unsafe {
			libc::ioctl(self.file.as_raw_fd(), I2C_RDWR as _, &mut data as *mut I2cRdwrIoctlData)
		};
		if -1 == res {
			let e = from_os_error(io::Error::last_os_error());
			debug!("{}: I2C_RDWR @{} failed: {}", self.path, addr, e);
			return Err(TransactionError::new(done, e));
		}

		// number of completed messages
		if res >= 1 {
			done.written = w.len();
		}
		if res as u32 != nmsgs {
			return Err(TransactionError::new(done, format_err!("I2C_RDWR transferred only {} of {} messages", res, nmsgs)));
		}
		done.read = r.len();

		Ok(done)
	}
}

impl I2cMaster for LinuxI2cBus {
	fn start(&mut self) -> crate::AResult<()> {
		Err(I2cError::Unsupported.into())
	}

	fn stop(&mut self) -> crate::AResult<()> {
		Err(I2cError::Unsupported.into())
	}

	fn read_byte(&mut self, _ack: bool) -> crate::AResult<u8> {
		Err(I2cError::Unsupported.into())
	}

	fn write_byte(&mut self, _b: u8) -> crate::AResult<()> {
		Err(I2cError::Unsupported.into())
	}

	fn as_transact8x8(&mut self) -> Option<&mut dyn Transact8x8> {
		Some(self)
	}

	fn as_transact16x8(&mut self) -> Option<&mut dyn Transact16x8> {
		Some(self)
	}
}

impl Transact8x8 for LinuxI2cBus {
	fn transact8x8(&mut self, addr: &dyn Addr, regaddr: u8, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		let addr = require_addr7(addr).map_err(|e| TransactionError::new(Transferred::default(), e))?;
		self.rdwr(addr, &[regaddr], w, r)
	}
}

impl Transact16x8 for LinuxI2cBus {
	fn transact16x8(&mut self, addr: &dyn Addr, regaddr: u16, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		let addr = require_addr7(addr).map_err(|e| TransactionError::new(Transferred::default(), e))?;
		self.rdwr(addr, &[(regaddr >> 8) as u8, regaddr as u8], w, r)
	}
}
