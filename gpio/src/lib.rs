pub mod expander;
pub mod lcd;

#[cfg(test)]
pub(crate) mod testing;

use bitvec::prelude::*;
use std::fmt::{Debug, Display, Formatter};
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum GpioError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("the feature is not supported on this backend")]
    NotSupported,
    #[error("I2C bus error: {0}")]
    Bus(embedded_hal::i2c::ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl GpioError {
    /// Keeps only the kind of an `embedded-hal` I2C error, so the error type stays the same
    /// for every bus implementation.
    pub fn from_i2c<E: embedded_hal::i2c::Error>(err: E) -> Self {
        GpioError::Bus(err.kind())
    }
}

pub type GpioResult<T> = Result<T, GpioError>;

/// One of the eight output lines of an 8-bit GPIO expander, identified by its bit position
/// in the output register.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ExpanderPin(u8);

impl ExpanderPin {
    pub const GP0: ExpanderPin = ExpanderPin(0);
    pub const GP1: ExpanderPin = ExpanderPin(1);
    pub const GP2: ExpanderPin = ExpanderPin(2);
    pub const GP3: ExpanderPin = ExpanderPin(3);
    pub const GP4: ExpanderPin = ExpanderPin(4);
    pub const GP5: ExpanderPin = ExpanderPin(5);
    pub const GP6: ExpanderPin = ExpanderPin(6);
    pub const GP7: ExpanderPin = ExpanderPin(7);

    /// Number of lines of the expander.
    pub const COUNT: usize = 8;

    /// Gets the pin at the given bit position.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if `index` is not in `0..8`.
    pub fn new(index: u8) -> GpioResult<Self> {
        if index as usize >= Self::COUNT {
            return Err(GpioError::InvalidArgument);
        }
        Ok(ExpanderPin(index))
    }

    /// Gets the bit position of the pin.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Gets the register mask with only this pin's bit set.
    pub fn mask(self) -> u8 {
        1 << self.0
    }
}

impl TryFrom<u8> for ExpanderPin {
    type Error = GpioError;

    fn try_from(index: u8) -> GpioResult<Self> {
        ExpanderPin::new(index)
    }
}

impl Display for ExpanderPin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GP{}", self.0)
    }
}

/// The output latch of an 8-bit GPIO expander, shared by every line wired to it.
///
/// Implementations only move whole bytes. Single lines are set by [OutputRegister::write_pin],
/// which reads the latch, changes one bit and writes the byte back. That read-modify-write is
/// not atomic: if the register is reachable from more than one execution context, the caller
/// has to serialize access.
pub trait OutputRegister: Debug {
    /// Reads the last byte written to the output latch.
    fn read_output(&mut self) -> GpioResult<u8>;

    /// Replaces the whole output latch.
    fn write_output(&mut self, value: u8) -> GpioResult<()>;

    /// Sets a single output line, leaving the other seven untouched.
    ///
    /// Costs one [OutputRegister::read_output] and one [OutputRegister::write_output].
    fn write_pin(&mut self, pin: ExpanderPin, level: bool) -> GpioResult<()> {
        let mut value = self.read_output()?;
        value.view_bits_mut::<Lsb0>().set(pin.index(), level);
        self.write_output(value)
    }
}
