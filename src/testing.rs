// Simulated busses and devices shared by the unit tests.

use crate::addr::{
	Addr,
	Addr7,
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

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
	Start,
	Stop,
	Read { b: u8, ack: bool },
	Write(u8),
}

/// Logs bus operations passed to the wrapped master (reads only when they
/// succeeded).
pub struct Recorder<M> {
	pub inner: M,
	pub log: Vec<Event>,
}

impl<M: I2cMaster> Recorder<M> {
	pub fn new(inner: M) -> Self {
		Recorder { inner, log: Vec::new() }
	}
}

impl<M: I2cMaster> I2cMaster for Recorder<M> {
	fn start(&mut self) -> crate::AResult<()> {
		self.log.push(Event::Start);
		self.inner.start()
	}

	fn stop(&mut self) -> crate::AResult<()> {
		self.log.push(Event::Stop);
		self.inner.stop()
	}

	fn read_byte(&mut self, ack: bool) -> crate::AResult<u8> {
		let b = self.inner.read_byte(ack)?;
		self.log.push(Event::Read { b, ack });
		Ok(b)
	}

	fn write_byte(&mut self, b: u8) -> crate::AResult<()> {
		self.log.push(Event::Write(b));
		self.inner.write_byte(b)
	}
}

/// Nothing on the bus answers.
pub struct AlwaysNack;

impl I2cMaster for AlwaysNack {
	fn start(&mut self) -> crate::AResult<()> {
		Ok(())
	}

	fn stop(&mut self) -> crate::AResult<()> {
		Ok(())
	}

	fn read_byte(&mut self, _ack: bool) -> crate::AResult<u8> {
		Ok(0)
	}

	fn write_byte(&mut self, _b: u8) -> crate::AResult<()> {
		Err(I2cError::NackReceived.into())
	}
}

/// Injects faults into an otherwise working bus.
pub struct Faulty<M> {
	pub inner: M,
	pub fail_start: bool,
	pub fail_stop: bool,
	/// fail the n-th (0-based) byte write with the given error
	pub fail_write: Option<(usize, I2cError)>,
	pub fail_read: Option<usize>,
	writes: usize,
	reads: usize,
}

impl<M: I2cMaster> Faulty<M> {
	pub fn new(inner: M) -> Self {
		Faulty {
			inner,
			fail_start: false,
			fail_stop: false,
			fail_write: None,
			fail_read: None,
			writes: 0,
			reads: 0,
		}
	}
}

impl<M: I2cMaster> I2cMaster for Faulty<M> {
	fn start(&mut self) -> crate::AResult<()> {
		if self.fail_start {
			bail!("arbitration lost");
		}
		self.inner.start()
	}

	fn stop(&mut self) -> crate::AResult<()> {
		let res = self.inner.stop();
		if self.fail_stop {
			bail!("stop failed");
		}
		res
	}

	fn read_byte(&mut self, ack: bool) -> crate::AResult<u8> {
		let n = self.reads;
		self.reads += 1;
		if self.fail_read == Some(n) {
			bail!("bus error while reading");
		}
		self.inner.read_byte(ack)
	}

	fn write_byte(&mut self, b: u8) -> crate::AResult<()> {
		let n = self.writes;
		self.writes += 1;
		// the device still sees the byte, it just doesn't like it
		let res = self.inner.write_byte(b);
		if let Some((at, e)) = self.fail_write {
			if at == n {
				return Err(e.into());
			}
		}
		res
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
	Idle,
	StartReceived,
	ReceiveRegaddr,
	Addressed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Direction {
	Read,
	Write,
}

/// 256 byte register file speaking 8x8 transactions; panics on protocol
/// violations.
pub struct MemDev256 {
	addr: Addr7,
	regaddr: u8,
	state: State,
	dir: Direction,
	last_ack: bool,
	pub mem: [u8; 256],
}

impl MemDev256 {
	pub fn new(addr: Addr7) -> Self {
		MemDev256 {
			addr,
			regaddr: 0,
			state: State::Idle,
			dir: Direction::Write,
			last_ack: false,
			mem: [0u8; 256],
		}
	}
}

impl I2cMaster for MemDev256 {
	fn start(&mut self) -> crate::AResult<()> {
		self.state = State::StartReceived;
		Ok(())
	}

	fn stop(&mut self) -> crate::AResult<()> {
		assert!(self.state != State::Idle, "stop condition on idle bus");
		assert!(self.state != State::StartReceived, "stop condition right after start condition");
		if self.state == State::Addressed && self.dir == Direction::Read {
			assert!(!self.last_ack, "stop condition after reading with ACK");
		}
		self.state = State::Idle;
		Ok(())
	}

	fn read_byte(&mut self, ack: bool) -> crate::AResult<u8> {
		assert!(self.state == State::Addressed, "read while not addressed");
		assert!(self.dir == Direction::Read, "read in write mode");
		let b = self.mem[self.regaddr as usize];
		self.regaddr = self.regaddr.wrapping_add(1);
		self.last_ack = ack;
		Ok(b)
	}

	fn write_byte(&mut self, b: u8) -> crate::AResult<()> {
		match self.state {
			State::StartReceived => {
				if b >> 1 != self.addr.value() {
					return Err(I2cError::NackReceived.into());
				}
				if b & 0x01 != 0 {
					self.state = State::Addressed;
					self.dir = Direction::Read;
				} else {
					self.state = State::ReceiveRegaddr;
					self.dir = Direction::Write;
				}
			},
			State::ReceiveRegaddr => {
				self.regaddr = b;
				self.state = State::Addressed;
			},
			State::Addressed => {
				assert!(self.dir == Direction::Write, "write in read mode");
				self.mem[self.regaddr as usize] = b;
				self.regaddr = self.regaddr.wrapping_add(1);
			},
			State::Idle => panic!("write on idle bus"),
		}
		Ok(())
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SimState {
	Idle,
	StartReceived,
	Address { bank: usize, got: usize, acc: usize },
	Writing,
	Reading,
}

/// Byte level model of one or more 24Cxx chips answering from `base`
/// upwards. Writes wrap inside the current page like the real parts do.
pub struct Eeprom24Sim {
	pub mem: Vec<u8>,
	page_size: usize,
	addr_bytes: usize,
	base: u8,
	state: SimState,
	pointer: usize,
}

impl Eeprom24Sim {
	pub fn new(base: Addr7, size: usize, page_size: usize) -> Self {
		let addr_bytes = if size <= (1 << 11) { 1 } else { 2 };
		Eeprom24Sim {
			mem: (0..size).map(|i| 0x24 ^ (i as u8)).collect(),
			page_size,
			addr_bytes,
			base: base.value(),
			state: SimState::Idle,
			pointer: 0,
		}
	}

	fn banks(&self) -> usize {
		let span = 1usize << (8 * self.addr_bytes);
		(self.mem.len() + span - 1) / span
	}
}

impl I2cMaster for Eeprom24Sim {
	fn start(&mut self) -> crate::AResult<()> {
		self.state = SimState::StartReceived;
		Ok(())
	}

	fn stop(&mut self) -> crate::AResult<()> {
		assert!(self.state != SimState::Idle, "stop condition on idle bus");
		self.state = SimState::Idle;
		Ok(())
	}

	fn read_byte(&mut self, _ack: bool) -> crate::AResult<u8> {
		assert!(self.state == SimState::Reading, "read while not addressed for reading");
		let b = self.mem[self.pointer];
		self.pointer = (self.pointer + 1) % self.mem.len();
		Ok(b)
	}

	fn write_byte(&mut self, b: u8) -> crate::AResult<()> {
		match self.state {
			SimState::StartReceived => {
				let dev = b >> 1;
				if dev < self.base || (dev - self.base) as usize >= self.banks() {
					return Err(I2cError::NackReceived.into());
				}
				if b & 0x01 != 0 {
					self.state = SimState::Reading;
				} else {
					let bank = (dev - self.base) as usize;
					self.state = SimState::Address { bank, got: 0, acc: 0 };
				}
			},
			SimState::Address { bank, got, acc } => {
				let acc = (acc << 8) | b as usize;
				let got = got + 1;
				if got == self.addr_bytes {
					self.pointer = ((bank << (8 * self.addr_bytes)) | acc) & (self.mem.len() - 1);
					self.state = SimState::Writing;
				} else {
					self.state = SimState::Address { bank, got, acc };
				}
			},
			SimState::Writing => {
				let page_base = self.pointer & !(self.page_size - 1);
				self.mem[self.pointer] = b;
				self.pointer = page_base | ((self.pointer + 1) & (self.page_size - 1));
			},
			SimState::Reading => return Err(I2cError::NackReceived.into()),
			SimState::Idle => panic!("write on idle bus"),
		}
		Ok(())
	}
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Logged {
	pub addr: Addr7,
	pub regaddr: u16,
	pub wide: bool,
	pub written: Vec<u8>,
	pub read: usize,
}

/// Transactor for 24Cxx style arrays based at 0x50 which refuses any write
/// crossing a page boundary. Optionally fails the n-th written byte (counted
/// over all transactions) with a NACK.
pub struct PageVerifier {
	pub mem: Vec<u8>,
	pub page_size: usize,
	pub log: Vec<Logged>,
	pub fail_at_byte: Option<usize>,
	bytes: usize,
}

impl PageVerifier {
	pub fn new(size: usize, page_size: usize) -> Self {
		PageVerifier {
			mem: (0..size).map(|i| 0x24 ^ (i as u8)).collect(),
			page_size,
			log: Vec::new(),
			fail_at_byte: None,
			bytes: 0,
		}
	}

	fn transact(&mut self, memaddr: usize, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		assert!(w.is_empty() || r.is_empty(), "EEPROM transactions either write or read");

		let page_base = memaddr & !(self.page_size - 1);
		let mut done = Transferred::default();
		let mut memaddr = memaddr;
		for &b in w {
			if self.fail_at_byte == Some(self.bytes) {
				return Err(TransactionError::new(done, I2cError::NackReceived.into()));
			}
			if memaddr & !(self.page_size - 1) != page_base {
				let e = format_err!("write started in page {:#06x}, continued to page {:#06x}", page_base, memaddr);
				return Err(TransactionError::new(done, e));
			}
			self.mem[memaddr] = b;
			memaddr += 1;
			self.bytes += 1;
			done.written += 1;
		}
		for t in r.iter_mut() {
			*t = self.mem[memaddr];
			memaddr += 1;
			done.read += 1;
		}
		Ok(done)
	}
}

impl Transact8x8 for PageVerifier {
	fn transact8x8(&mut self, addr: &dyn Addr, regaddr: u8, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		let memaddr = (((addr.base_addr() & 0x07) as usize) << 8) + regaddr as usize;
		self.log.push(Logged {
			addr: Addr7::new(addr.base_addr() as u8),
			regaddr: regaddr as u16,
			wide: false,
			written: w.to_vec(),
			read: r.len(),
		});
		self.transact(memaddr, w, r)
	}
}

impl Transact16x8 for PageVerifier {
	fn transact16x8(&mut self, addr: &dyn Addr, regaddr: u16, w: &[u8], r: &mut [u8]) -> Result<Transferred, TransactionError> {
		let memaddr = (((addr.base_addr() & 0x07) as usize) << 16) + regaddr as usize;
		self.log.push(Logged {
			addr: Addr7::new(addr.base_addr() as u8),
			regaddr,
			wide: true,
			written: w.to_vec(),
			read: r.len(),
		});
		self.transact(memaddr, w, r)
	}
}
