use crate::{GpioResult, OutputRegister};
use log::debug;

/// Keeps a copy of an output latch in memory.
///
/// Reads are answered from the copy without any bus traffic, writes go straight through to the
/// wrapped register. Setting a single line with [OutputRegister::write_pin] therefore becomes an
/// in-memory bit operation followed by one bus write.
///
/// The copy is only authoritative while nothing else writes the wrapped register. After an
/// external write, call [ShadowRegister::refresh].
#[derive(Debug)]
pub struct ShadowRegister<R> {
    inner: R,
    value: u8,
}

impl<R: OutputRegister> ShadowRegister<R> {
    /// Wraps `inner`, reading its latch once to prime the copy.
    pub fn new(mut inner: R) -> GpioResult<Self> {
        let value = inner.read_output()?;
        debug!("Shadowing {:?}, latch {:08b}", inner, value);
        Ok(ShadowRegister { inner, value })
    }

    /// Wraps `inner`, writing `value` to its latch instead of reading it.
    pub fn with_value(mut inner: R, value: u8) -> GpioResult<Self> {
        inner.write_output(value)?;
        debug!("Shadowing {:?}, latch reset to {:08b}", inner, value);
        Ok(ShadowRegister { inner, value })
    }

    /// Gets the cached latch value.
    pub fn cached(&self) -> u8 {
        self.value
    }

    /// Re-reads the latch from the wrapped register.
    pub fn refresh(&mut self) -> GpioResult<u8> {
        self.value = self.inner.read_output()?;
        Ok(self.value)
    }

    /// Unwraps the register.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: OutputRegister> OutputRegister for ShadowRegister<R> {
    fn read_output(&mut self) -> GpioResult<u8> {
        Ok(self.value)
    }

    fn write_output(&mut self, value: u8) -> GpioResult<()> {
        self.inner.write_output(value)?;
        self.value = value;
        Ok(())
    }
}
