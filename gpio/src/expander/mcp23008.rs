use crate::{GpioError, GpioResult, OutputRegister};
use embedded_hal::i2c::I2c;
use log::{debug, trace};
use std::fmt::{Debug, Formatter};

/// Register addresses of the MCP23008.
mod reg {
    /// I/O direction, a set bit makes the line an input.
    pub const IODIR: u8 = 0x00;
    /// Pull-up resistors of input lines.
    pub const GPPU: u8 = 0x06;
    /// Port value. Reading returns the line levels.
    pub const GPIO: u8 = 0x09;
    /// Output latch. Reading returns the last value written.
    pub const OLAT: u8 = 0x0A;
}

/// Microchip MCP23008 8-bit I²C GPIO expander.
///
/// Only the single 8-bit port is exposed. Its output latch is the [OutputRegister].
pub struct Mcp23008<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Debug for Mcp23008<I2C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mcp23008(0x{:02x})", self.address)
    }
}

impl<I2C: I2c> Mcp23008<I2C> {
    /// Address with A2, A1 and A0 tied low.
    pub const DEFAULT_ADDRESS: u8 = 0x20;

    /// Creates a new MCP23008 driver. Doesn't touch the bus.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if `address` is outside `0x20..=0x27`, the only addresses
    ///   the A2..A0 straps can select.
    pub fn new(i2c: I2C, address: u8) -> GpioResult<Self> {
        if !(0x20..=0x27).contains(&address) {
            return Err(GpioError::InvalidArgument);
        }
        Ok(Mcp23008 { i2c, address })
    }

    /// Gets the 7-bit I²C address of the expander.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Sets the direction of all eight lines. A set bit makes the line an input, so `0x00`
    /// turns every line into an output.
    pub fn set_direction(&mut self, inputs: u8) -> GpioResult<()> {
        debug!("{:?} direction: {:08b}", self, inputs);
        self.write_register(reg::IODIR, inputs)
    }

    /// Enables the internal pull-up resistors of the lines whose bit is set.
    pub fn set_pull_ups(&mut self, mask: u8) -> GpioResult<()> {
        self.write_register(reg::GPPU, mask)
    }

    /// Reads the current level of all eight lines.
    pub fn read_inputs(&mut self) -> GpioResult<u8> {
        self.read_register(reg::GPIO)
    }

    /// Releases the I²C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_register(&mut self, register: u8, value: u8) -> GpioResult<()> {
        trace!("{:?} write [{:02x}] = {:08b}", self, register, value);
        self.i2c
            .write(self.address, &[register, value])
            .map_err(GpioError::from_i2c)
    }

    fn read_register(&mut self, register: u8) -> GpioResult<u8> {
        let mut buffer = [0u8];
        self.i2c
            .write_read(self.address, &[register], &mut buffer)
            .map_err(GpioError::from_i2c)?;
        trace!("{:?} read [{:02x}] = {:08b}", self, register, buffer[0]);
        Ok(buffer[0])
    }
}

impl<I2C: I2c> OutputRegister for Mcp23008<I2C> {
    fn read_output(&mut self) -> GpioResult<u8> {
        self.read_register(reg::OLAT)
    }

    fn write_output(&mut self, value: u8) -> GpioResult<()> {
        self.write_register(reg::OLAT, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExpanderPin;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDRESS: u8 = 0x20;

    #[derive(Debug)]
    struct NoBus;

    impl ErrorType for NoBus {
        type Error = ErrorKind;
    }

    impl I2c for NoBus {
        fn transaction(&mut self, _: u8, _: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn rejects_addresses_outside_the_strap_range() {
        assert!(Mcp23008::new(NoBus, 0x27).is_ok());
        assert_eq!(
            Mcp23008::new(NoBus, 0x1F).map(|mcp| mcp.address()),
            Err(GpioError::InvalidArgument)
        );
        assert_eq!(
            Mcp23008::new(NoBus, 0x28).map(|mcp| mcp.address()),
            Err(GpioError::InvalidArgument)
        );
    }

    #[test]
    fn configures_all_lines_as_outputs() {
        let expectations = [I2cTransaction::write(ADDRESS, vec![0x00, 0x00])];
        let mut mcp = Mcp23008::new(I2cMock::new(&expectations), ADDRESS).unwrap();

        mcp.set_direction(0x00).unwrap();

        mcp.release().done();
    }

    #[test]
    fn output_register_uses_the_latch() {
        let expectations = [
            I2cTransaction::write_read(ADDRESS, vec![0x0A], vec![0b0000_0110]),
            I2cTransaction::write(ADDRESS, vec![0x0A, 0b1000_0110]),
        ];
        let mut mcp = Mcp23008::new(I2cMock::new(&expectations), ADDRESS).unwrap();

        mcp.write_pin(ExpanderPin::GP7, true).unwrap();

        mcp.release().done();
    }

    #[test]
    fn reads_inputs_and_sets_pull_ups() {
        let expectations = [
            I2cTransaction::write(ADDRESS, vec![0x06, 0xF0]),
            I2cTransaction::write_read(ADDRESS, vec![0x09], vec![0b1010_0000]),
        ];
        let mut mcp = Mcp23008::new(I2cMock::new(&expectations), ADDRESS).unwrap();

        mcp.set_pull_ups(0xF0).unwrap();
        assert_eq!(mcp.read_inputs(), Ok(0b1010_0000));

        mcp.release().done();
    }

    #[test]
    fn bus_errors_keep_their_kind() {
        let expectations = [
            I2cTransaction::write(ADDRESS, vec![0x0A, 0x01]).with_error(ErrorKind::Other),
        ];
        let mut mcp = Mcp23008::new(I2cMock::new(&expectations), ADDRESS).unwrap();

        assert_eq!(mcp.write_output(0x01), Err(GpioError::Bus(ErrorKind::Other)));

        mcp.release().done();
    }
}
