use dotenv::var;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Wiring and geometry of the display.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// I²C character device the expander sits on.
    pub i2c_bus: String,
    /// 7-bit address of the MCP23008.
    pub address: u8,
    pub pin_rs: u8,
    /// `None` if the R/W pin of the display is tied to GND.
    pub pin_rw: Option<u8>,
    pub pin_e: u8,
    /// 4 entries for a 4-bit bus, 8 for an 8-bit bus.
    pub pins_data: Vec<u8>,
    pub columns: u8,
    pub lines: u8,
    pub tall_font: bool,
    /// Keep the expander latch in memory instead of reading it before each pin change.
    pub cache_register: bool,
}

impl Config {
    fn path() -> String {
        var("CONFIG_FILE").unwrap_or_else(|_| "config.json".to_string())
    }

    /// Loads the config from `CONFIG_FILE`, or `config.json` if it isn't set.
    ///
    /// Returns `Ok(None)` only if the file doesn't exist. A file that can't be read or parsed is
    /// an error, so it never gets replaced by the defaults.
    pub fn try_load() -> eyre::Result<Option<Self>> {
        Self::load_from(Path::new(&Self::path()))
    }

    fn load_from(config_path: &Path) -> eyre::Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = File::open(config_path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_json::from_reader(reader)
            .map_err(|err| eyre::eyre!("Invalid config {}: {}", config_path.display(), err))?;
        Ok(Some(config))
    }

    pub fn save(&self) -> eyre::Result<()> {
        self.save_to(Path::new(&Self::path()))
    }

    fn save_to(&self, config_path: &Path) -> eyre::Result<()> {
        let file = File::create(config_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Overrides the bus, address and data pins from `MCPLCD_*` environment variables.
    pub fn apply_env(&mut self) -> eyre::Result<()> {
        if let Ok(bus) = var("MCPLCD_I2C_BUS") {
            self.i2c_bus = bus;
        }
        if let Ok(address) = var("MCPLCD_I2C_ADDRESS") {
            self.address = parse_address(&address)?;
        }
        if let Ok(pins) = var("MCPLCD_PINS_DATA") {
            self.pins_data = parse_pin_bus(&pins)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            i2c_bus: "/dev/i2c-1".to_string(),
            address: 0x20,
            pin_rs: 1,
            pin_rw: None,
            pin_e: 2,
            pins_data: vec![3, 4, 5, 6],
            columns: 16,
            lines: 2,
            tall_font: false,
            cache_register: true,
        }
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal address.
pub fn parse_address(address: &str) -> eyre::Result<u8> {
    let address = address.trim();
    let parsed = match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => address.parse()?,
    };
    Ok(parsed)
}

pub fn parse_pin_bus(pin_str: &str) -> eyre::Result<Vec<u8>> {
    let pins = pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()?;
    if pins.len() != 4 && pins.len() != 8 {
        return Err(eyre::eyre!("Invalid number of data pins: {}", pins.len()));
    }
    Ok(pins)
}
