//! Bus adapters for Linux.

mod i2c_dev;

pub use self::i2c_dev::LinuxI2cBus;
