use std::fmt;
use std::str;

/// I2C device address, without the R/W bit.
///
/// Transaction drivers only accept 7-bit addresses; other widths are
/// rejected before the bus is touched.
pub trait Addr {
	/// device address, right aligned
	fn base_addr(&self) -> u16;

	/// address width in bits (7 or 10)
	fn addr_len(&self) -> u32;
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Addr7(u8);

impl Addr7 {
	pub fn new(addr: u8) -> Self {
		Addr7(addr & 0x7f)
	}

	pub fn value(&self) -> u8 {
		self.0
	}

	// address byte as sent on the bus with the R/W bit cleared
	pub(crate) fn write_byte(&self) -> u8 {
		self.0 << 1
	}

	pub(crate) fn read_byte(&self) -> u8 {
		(self.0 << 1) | 0x01
	}
}

impl Addr for Addr7 {
	fn base_addr(&self) -> u16 {
		self.0 as u16
	}

	fn addr_len(&self) -> u32 {
		7
	}
}

impl fmt::Display for Addr7 {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

impl str::FromStr for Addr7 {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let digits = if s.starts_with("0x") || s.starts_with("0X") { &s[2..] } else { s };
		let value = with_context!(("invalid I2C device address: {:?}", s),
			u8::from_str_radix(digits, 16).map_err(|e| e.into())
		)?;
		ensure!(value <= 0x7f, "invalid I2C device address: {:?} (not a 7-bit address)", s);
		Ok(Addr7(value))
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Addr10(u16);

impl Addr10 {
	pub fn new(addr: u16) -> Self {
		Addr10(addr & 0x03ff)
	}

	pub fn value(&self) -> u16 {
		self.0
	}
}

impl Addr for Addr10 {
	fn base_addr(&self) -> u16 {
		self.0
	}

	fn addr_len(&self) -> u32 {
		10
	}
}

impl fmt::Display for Addr10 {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:03x}", self.0)
	}
}

/// Accepts only 7-bit addresses; anything else is a configuration error.
pub(crate) fn require_addr7(addr: &dyn Addr) -> crate::AResult<Addr7> {
	if addr.addr_len() != 7 {
		return Err(crate::I2cError::UnsupportedAddressWidth { width: addr.addr_len() }.into());
	}
	Ok(Addr7::new(addr.base_addr() as u8))
}
