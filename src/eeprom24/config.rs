use std::fmt;
use std::time::Duration;

/// 16 bit register address plus 3 bits in the device address
pub const MAX_EEPROM_SIZE: usize = 1 << (16 + 3);

/// 24C16 and smaller use 8+3 bits (8 bit register address, up to 3 bits in
/// the device address), 24C32 and up use 16+3 bits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum AddressingMode {
	Small,
	Large,
}

impl AddressingMode {
	/// bits of the array offset carried by the register address; the rest go
	/// into the device address
	pub fn register_bits(self) -> u32 {
		match self {
			AddressingMode::Small => 8,
			AddressingMode::Large => 16,
		}
	}
}

impl fmt::Display for AddressingMode {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			AddressingMode::Small => write!(f, "8+3 bit"),
			AddressingMode::Large => write!(f, "16+3 bit"),
		}
	}
}

/// Geometry of a 24Cxx EEPROM.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Eeprom24Config {
	size: usize,
	page_size: usize,
	write_delay: Duration,
}

impl Eeprom24Config {
	/// `write_delay` is the time a page write needs to settle; it is kept
	/// for callers but not waited for by the driver (and there is no address
	/// polling either).
	pub fn new(size: usize, page_size: usize, write_delay: Duration) -> crate::AResult<Self> {
		let conf = Eeprom24Config { size, page_size, write_delay };
		conf.validate()?;
		Ok(conf)
	}

	pub(super) fn validate(&self) -> crate::AResult<()> {
		ensure!(self.page_size <= self.size,
			"page size ({}) needs to be smaller than array size ({})", self.page_size, self.size
		);
		ensure!(self.size <= MAX_EEPROM_SIZE,
			"invalid size in configuration: {} bytes, a maximum of {} bytes is supported", self.size, MAX_EEPROM_SIZE
		);
		ensure!(self.size.is_power_of_two(), "array size ({}) needs to be a power of 2", self.size);
		ensure!(self.page_size.is_power_of_two(), "page size ({}) needs to be a power of 2", self.page_size);
		Ok(())
	}

	pub fn size(&self) -> usize {
		self.size
	}

	pub fn page_size(&self) -> usize {
		self.page_size
	}

	pub fn write_delay(&self) -> Duration {
		self.write_delay
	}

	pub fn addressing_mode(&self) -> AddressingMode {
		if self.size <= (1 << 11) {
			AddressingMode::Small
		} else {
			AddressingMode::Large
		}
	}
}
