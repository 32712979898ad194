use crate::lcd::hd44780::driver::HD44780Driver;
use crate::{ExpanderPin, GpioResult, OutputRegister};
use bitvec::prelude::*;
use embedded_hal::delay::DelayNs;
use log::{trace, warn};
use std::fmt::{Debug, Formatter};

/// Line of the expander switching the backlight, outside the LCD pin roles.
pub const BACKLIGHT_PIN: ExpanderPin = ExpanderPin::GP7;

/// Width of each enable phase. The controller needs 450 ns.
const ENABLE_PULSE_US: u32 = 1;
/// Wait after each latch. Ordinary instructions take 37 µs, the busy flag is never read.
const EXECUTION_US: u32 = 100;

/// Data lines of the controller, as expander pins. Index 0 is D0.
///
/// In 4-bit mode the four wired lines carry D0..D3 of each nibble.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExpanderHD44780Bus {
    Bus8Bit([ExpanderPin; 8]),
    Bus4Bit([ExpanderPin; 4]),
}

impl ExpanderHD44780Bus {
    pub fn is_8bit(&self) -> bool {
        matches!(self, ExpanderHD44780Bus::Bus8Bit(_))
    }

    pub fn is_4bit(&self) -> bool {
        matches!(self, ExpanderHD44780Bus::Bus4Bit(_))
    }

    pub fn pins(&self) -> &[ExpanderPin] {
        match self {
            ExpanderHD44780Bus::Bus8Bit(pins) => pins,
            ExpanderHD44780Bus::Bus4Bit(pins) => pins,
        }
    }
}

/// HD44780 driver for a controller wired to the output lines of an 8-bit GPIO expander.
///
/// Every line is a bit of one shared [OutputRegister], so each pin change is a read-modify-write
/// of the whole register. Wrap the register in a
/// [ShadowRegister](crate::expander::ShadowRegister) to drop the read half.
///
/// The E pin is held high for 1 µs and the controller then gets 100 µs to process the byte,
/// which covers every instruction except clear and home. Those wait on their own.
pub struct ExpanderHD44780Driver<'a, D> {
    register: &'a mut dyn OutputRegister,
    pin_e: ExpanderPin,
    pin_rw: Option<ExpanderPin>,
    pin_rs: ExpanderPin,
    data_bus: ExpanderHD44780Bus,
    delay: D,
}

impl<'a, D: DelayNs> ExpanderHD44780Driver<'a, D> {
    /// Creates a new driver using a 4-bit data bus.
    ///
    /// # Parameters
    ///
    /// - `register`: Output register of the expander. Shared by every line, including the
    ///   backlight on [BACKLIGHT_PIN].
    /// - `pin_e`: Enable line.
    /// - `pin_rw`: Optional read/write line. The driver never reads, so it only ever drives it
    ///   low. If not provided, the R/W pin of the display must be connected to GND.
    /// - `pin_rs`: Register select line.
    /// - `data_bus`: The expander lines wired to display pins DB4..DB7, which carry D0..D3 of
    ///   each nibble, lowest bit first.
    /// - `delay`: Blocking delay used for every wait.
    pub fn new_4bit(
        register: &'a mut dyn OutputRegister,
        pin_e: ExpanderPin,
        pin_rw: Option<ExpanderPin>,
        pin_rs: ExpanderPin,
        data_bus: [ExpanderPin; 4],
        delay: D,
    ) -> Self {
        Self::new(
            register,
            pin_e,
            pin_rw,
            pin_rs,
            ExpanderHD44780Bus::Bus4Bit(data_bus),
            delay,
        )
    }

    /// Creates a new driver using an 8-bit data bus.
    ///
    /// Eight data lines plus RS and E don't fit on eight expander lines, so some roles will
    /// share a line. See [ExpanderHD44780Driver::new_4bit] for the parameters.
    pub fn new_8bit(
        register: &'a mut dyn OutputRegister,
        pin_e: ExpanderPin,
        pin_rw: Option<ExpanderPin>,
        pin_rs: ExpanderPin,
        data_bus: [ExpanderPin; 8],
        delay: D,
    ) -> Self {
        Self::new(
            register,
            pin_e,
            pin_rw,
            pin_rs,
            ExpanderHD44780Bus::Bus8Bit(data_bus),
            delay,
        )
    }

    fn new(
        register: &'a mut dyn OutputRegister,
        pin_e: ExpanderPin,
        pin_rw: Option<ExpanderPin>,
        pin_rs: ExpanderPin,
        data_bus: ExpanderHD44780Bus,
        delay: D,
    ) -> Self {
        let mut used = bitarr![u8, Lsb0; 0; 8];
        let roles = [pin_e, pin_rs]
            .into_iter()
            .chain(pin_rw)
            .chain(data_bus.pins().iter().copied());
        for pin in roles {
            if used.replace(pin.index(), true) {
                warn!("{} is assigned to more than one LCD line", pin);
            }
        }
        if used[BACKLIGHT_PIN.index()] {
            warn!("{} drives both an LCD line and the backlight", BACKLIGHT_PIN);
        }

        ExpanderHD44780Driver {
            register,
            pin_e,
            pin_rw,
            pin_rs,
            data_bus,
            delay,
        }
    }

    /// Gets the data lines.
    pub fn data_bus(&self) -> ExpanderHD44780Bus {
        self.data_bus
    }

    /// Sets an optional line. Unwired lines cost no bus transaction.
    fn write_pin(&mut self, pin: Option<ExpanderPin>, level: bool) -> GpioResult<()> {
        match pin {
            Some(pin) => self.register.write_pin(pin, level),
            None => Ok(()),
        }
    }

    fn pulse_e(&mut self) -> GpioResult<()> {
        self.register.write_pin(self.pin_e, false)?;
        self.delay.delay_us(ENABLE_PULSE_US);
        self.register.write_pin(self.pin_e, true)?;
        self.delay.delay_us(ENABLE_PULSE_US);
        self.register.write_pin(self.pin_e, false)?;
        self.delay.delay_us(EXECUTION_US);
        Ok(())
    }

    /// Puts the lowest `width` bits of `value` on D0.. and latches them.
    fn write_bits(&mut self, value: u8, width: usize) -> GpioResult<()> {
        let data_bus = self.data_bus;
        for (pin, level) in data_bus
            .pins()
            .iter()
            .take(width)
            .zip(value.view_bits::<Lsb0>().iter().by_vals())
        {
            self.register.write_pin(*pin, level)?;
        }
        self.pulse_e()
    }

    fn send(&mut self, data: u8, rs: bool) -> GpioResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);

        // Set RS pin
        self.register.write_pin(self.pin_rs, rs)?;

        // Set RW pin to write
        self.write_pin(self.pin_rw, false)?;

        match self.data_bus {
            ExpanderHD44780Bus::Bus8Bit(_) => self.write_bits(data, 8),
            ExpanderHD44780Bus::Bus4Bit(_) => {
                let high_nibble = (data >> 4) & 0x0F;
                let low_nibble = data & 0x0F;
                trace!("Writing HN: {:04b}", high_nibble);
                self.write_bits(high_nibble, 4)?;
                trace!("Writing LN: {:04b}", low_nibble);
                self.write_bits(low_nibble, 4)
            }
        }
    }
}

impl<D> Debug for ExpanderHD44780Driver<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpanderHD44780Driver")
            .field("register", &self.register)
            .field("pin_e", &self.pin_e)
            .field("pin_rw", &self.pin_rw)
            .field("pin_rs", &self.pin_rs)
            .field("data_bus", &self.data_bus)
            .finish_non_exhaustive()
    }
}

impl<D: DelayNs> HD44780Driver for ExpanderHD44780Driver<'_, D> {
    fn is_8bit(&self) -> bool {
        self.data_bus.is_8bit()
    }

    /// Switches the backlight line directly, without a command or data cycle.
    fn set_backlight(&mut self, on: bool) -> GpioResult<()> {
        trace!("Backlight: {}", on);
        self.register.write_pin(BACKLIGHT_PIN, on)
    }

    fn reset_control_lines(&mut self) -> GpioResult<()> {
        self.register.write_pin(self.pin_rs, false)?;
        self.register.write_pin(self.pin_e, false)?;
        self.write_pin(self.pin_rw, false)
    }

    fn write_nibble(&mut self, nibble: u8) -> GpioResult<()> {
        trace!("Writing nibble: {:04b}", nibble & 0x0F);
        self.write_bits(nibble & 0x0F, 4)
    }

    fn send_command(&mut self, command: u8) -> GpioResult<()> {
        self.send(command, false)
    }

    fn send_data(&mut self, data: u8) -> GpioResult<()> {
        self.send(data, true)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
