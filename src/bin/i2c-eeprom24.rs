#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate i2c_eeprom24;
use i2c_eeprom24::*;

use std::cmp;
use std::fs;
use std::io::{
	self,
	Read,
	Write,
};
use std::process::exit;
use std::thread;
use std::time::Duration;

use i2c_eeprom24::linux::LinuxI2cBus;

type Eeprom = Eeprom24<Transactor<LinuxI2cBus>>;

// bytes per read transaction (i2c-dev refuses messages above 8192 bytes)
const READ_CHUNK: usize = 4096;

/// known parts: name, array size, page size
const PARTS: &[(&str, usize, usize)] = &[
	("24c01", 128, 8),
	("24c02", 256, 8),
	("24c04", 512, 16),
	("24c08", 1024, 16),
	("24c16", 2048, 16),
	("24c32", 4096, 32),
	("24c64", 8192, 32),
	("24c128", 16384, 64),
	("24c256", 32768, 64),
	("24c512", 65536, 128),
];

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_param_or<T>(matches: &clap::ArgMatches, name: &str, default: T) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	if matches.is_present(name) {
		get_param(matches, name)
	} else {
		Ok(default)
	}
}

fn get_path<'a>(matches: &'a clap::ArgMatches, name: &str) -> AResult<&'a str> {
	match matches.value_of(name) {
		Some(p) => Ok(p),
		None => bail!("missing parameter {}", name),
	}
}

fn config(sub_m: &clap::ArgMatches) -> AResult<Eeprom24Config> {
	let write_delay = Duration::from_millis(get_param_or(sub_m, "write_delay", 5)?);

	let (size, page_size) = if let Some(part) = sub_m.value_of("part") {
		let part = part.to_lowercase();
		match PARTS.iter().find(|&&(name, _, _)| name == part) {
			Some(&(_, size, page_size)) => (size, page_size),
			None => bail!("unknown EEPROM type {:?}", part),
		}
	} else if sub_m.is_present("size") || sub_m.is_present("page_size") {
		(get_param(sub_m, "size")?, get_param(sub_m, "page_size")?)
	} else {
		bail!("need either --type or --size and --page-size");
	};

	Eeprom24Config::new(size, page_size, write_delay)
}

fn open_eeprom(sub_m: &clap::ArgMatches) -> AResult<Eeprom> {
	let device = get_path(sub_m, "DEVICE")?;
	let addr: Addr7 = get_param_or(sub_m, "address", Addr7::new(0x50))?;
	let conf = config(sub_m)?;

	let bus = LinuxI2cBus::open(device)?;
	Eeprom24::from_master(bus, &addr, conf)
}

// position the pointer and check `[offset, offset + len)` is inside the array
fn seek_range<T: Transact>(ee: &mut Eeprom24<T>, offset: usize, len: usize) -> AResult<()> {
	let size = ee.config().size();
	ensure!(offset <= size && len <= size - offset,
		"range {}+{} exceeds EEPROM size ({} bytes)", offset, len, size
	);
	ee.seek(offset as i64, Whence::Start)?;
	Ok(())
}

// chunks are aligned to the span of one device address (and capped to
// READ_CHUNK), so a read never crosses into the next device address
fn read_range<T: Transact>(ee: &mut Eeprom24<T>, offset: usize, len: usize) -> AResult<Vec<u8>> {
	seek_range(ee, offset, len)?;

	let span = cmp::min(1usize << ee.addressing_mode().register_bits(), READ_CHUNK);

	let mut data = vec![0u8; len];
	let mut done = 0;
	while done < len {
		let pos = offset + done;
		let chunk = cmp::min(span - pos % span, len - done);
		let n = ee.read(&mut data[done..done + chunk]).map_err(|e| {
			let msg = format!("reading EEPROM at offset {}", pos);
			failure::Error::from(e).context(msg)
		})?;
		done += n;
	}

	Ok(data)
}

// one page per call, and wait for the write cycle in between
fn write_range(ee: &mut Eeprom, offset: usize, data: &[u8]) -> AResult<()> {
	seek_range(ee, offset, data.len())?;

	let page_size = ee.config().page_size();
	let write_delay = ee.config().write_delay();
	let mut done = 0;
	while done < data.len() {
		let pos = offset + done;
		let chunk = cmp::min(page_size - pos % page_size, data.len() - done);
		let n = ee.write(&data[done..done + chunk]).map_err(|e| {
			let msg = format!("writing EEPROM at offset {}", pos);
			failure::Error::from(e).context(msg)
		})?;
		done += n;
		thread::sleep(write_delay);
	}

	Ok(())
}

fn range_len(sub_m: &clap::ArgMatches, ee: &Eeprom, offset: usize) -> AResult<usize> {
	let size = ee.config().size();
	ensure!(offset <= size, "offset {} beyond EEPROM size ({} bytes)", offset, size);
	get_param_or(sub_m, "length", size - offset)
}

fn probe(sub_m: &clap::ArgMatches) -> AResult<()> {
	let device = get_path(sub_m, "DEVICE")?;
	let mut t = Transactor::new(LinuxI2cBus::open(device)?);

	for a in 0x03..=0x77 {
		let addr = Addr7::new(a);
		match t.transact8x8(&addr, 0, &[], &mut [0u8; 1]) {
			Ok(_) => println!("{}", addr),
			Err(ref e) if e.kind() == Some(I2cError::NoSuchDevice) => (),
			Err(e) => println!("{} ({})", addr, e.error),
		}
	}

	Ok(())
}

fn dump(sub_m: &clap::ArgMatches) -> AResult<()> {
	let mut ee = open_eeprom(sub_m)?;
	let offset: usize = get_param_or(sub_m, "offset", 0)?;
	let len = range_len(sub_m, &ee, offset)?;

	let data = read_range(&mut ee, offset, len)?;
	io::stdout().write_all(&data)?;

	Ok(())
}

fn write(sub_m: &clap::ArgMatches) -> AResult<()> {
	let mut ee = open_eeprom(sub_m)?;
	let offset: usize = get_param_or(sub_m, "offset", 0)?;

	let mut data = Vec::new();
	io::stdin().read_to_end(&mut data)?;

	write_range(&mut ee, offset, &data)?;
	info!("Wrote {} bytes at offset {}", data.len(), offset);

	Ok(())
}

fn verify(sub_m: &clap::ArgMatches) -> AResult<()> {
	let mut ee = open_eeprom(sub_m)?;
	let offset: usize = get_param_or(sub_m, "offset", 0)?;
	let file = get_path(sub_m, "FILE")?;

	let expected = fs::read(file).map_err(|e| {
		let msg = format!("couldn't read {}", file);
		failure::Error::from(e).context(msg)
	})?;
	let actual = read_range(&mut ee, offset, expected.len())?;

	let mut mismatches = 0;
	for (i, (&e, &a)) in expected.iter().zip(actual.iter()).enumerate() {
		if e != a {
			if mismatches < 16 {
				eprintln!("@{:06x}: expected {:02x}, got {:02x}", offset + i, e, a);
			}
			mismatches += 1;
		}
	}

	if mismatches > 0 {
		bail!("{} of {} bytes differ", mismatches, expected.len());
	}
	println!("Verified {} bytes successfully", expected.len());

	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@subcommand probe =>
			(about: "list addresses answering on the bus")
			(@arg DEVICE: +required "I2C bus device (e.g. /dev/i2c-1)")
		)
		(@subcommand dump =>
			(about: "dump EEPROM as binary to stdout")
			(@arg DEVICE: +required "I2C bus device (e.g. /dev/i2c-1)")
			(@arg address: -a --address +takes_value "EEPROM device address (hex, default 50)")
			(@arg part: -t --type +takes_value "EEPROM type (24c01 .. 24c512)")
			(@arg size: --size +takes_value "array size in bytes (instead of --type)")
			(@arg page_size: --("page-size") +takes_value "page size in bytes (instead of --type)")
			(@arg write_delay: --("write-delay") +takes_value "milliseconds to wait after each page write (default 5)")
			(@arg offset: -o --offset +takes_value "start at offset (default 0)")
			(@arg length: -l --length +takes_value "number of bytes (default: up to end of array)")
		)
		(@subcommand write =>
			(about: "write data from stdin to EEPROM")
			(@arg DEVICE: +required "I2C bus device (e.g. /dev/i2c-1)")
			(@arg address: -a --address +takes_value "EEPROM device address (hex, default 50)")
			(@arg part: -t --type +takes_value "EEPROM type (24c01 .. 24c512)")
			(@arg size: --size +takes_value "array size in bytes (instead of --type)")
			(@arg page_size: --("page-size") +takes_value "page size in bytes (instead of --type)")
			(@arg write_delay: --("write-delay") +takes_value "milliseconds to wait after each page write (default 5)")
			(@arg offset: -o --offset +takes_value "start at offset (default 0)")
		)
		(@subcommand verify =>
			(about: "compare EEPROM contents with a file")
			(@arg DEVICE: +required "I2C bus device (e.g. /dev/i2c-1)")
			(@arg FILE: +required "expected contents")
			(@arg address: -a --address +takes_value "EEPROM device address (hex, default 50)")
			(@arg part: -t --type +takes_value "EEPROM type (24c01 .. 24c512)")
			(@arg size: --size +takes_value "array size in bytes (instead of --type)")
			(@arg page_size: --("page-size") +takes_value "page size in bytes (instead of --type)")
			(@arg write_delay: --("write-delay") +takes_value "milliseconds to wait after each page write (default 5)")
			(@arg offset: -o --offset +takes_value "start at offset (default 0)")
		)
	).get_matches();

	match matches.subcommand() {
		("probe", Some(sub_m)) => {
			probe(sub_m)
		}
		("dump", Some(sub_m)) => {
			dump(sub_m)
		}
		("write", Some(sub_m)) => {
			write(sub_m)
		}
		("verify", Some(sub_m)) => {
			verify(sub_m)
		}
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
