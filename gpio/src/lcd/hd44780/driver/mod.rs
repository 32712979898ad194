mod expander;

use crate::lcd::hd44780::command::*;
use crate::{GpioError, GpioResult};
pub use expander::*;
use std::fmt::Debug;

/// Time the controller needs to clear the display or return home.
const SLOW_INSTRUCTION_MS: u32 = 2;

/// Transport side of an HD44780 controller.
///
/// Implementors move single bytes and nibbles to the controller. The instruction set is composed
/// on top of them by the provided methods. The flag arguments are the raw bits of the
/// [command](crate::lcd::hd44780::command) module, other bits are dropped.
pub trait HD44780Driver: Debug {
    /// Whether all eight data lines are wired, fixed at construction.
    fn is_8bit(&self) -> bool;

    /// Clears the display and sets the cursor to the home position.
    ///
    /// Waits for the controller to finish, as clearing takes far longer than other instructions.
    fn clear_display(&mut self) -> GpioResult<()> {
        self.send_command(CLEAR_DISPLAY)?;
        self.delay_ms(SLOW_INSTRUCTION_MS);
        Ok(())
    }

    /// Sets the cursor to the home position and undoes any display shift.
    ///
    /// Waits for the controller to finish, like [HD44780Driver::clear_display].
    fn return_home(&mut self) -> GpioResult<()> {
        self.send_command(RETURN_HOME)?;
        self.delay_ms(SLOW_INSTRUCTION_MS);
        Ok(())
    }

    /// Sets the text direction and autoscroll, see [entry_mode].
    fn entry_mode_set(&mut self, flags: u8) -> GpioResult<()> {
        self.send_command(ENTRY_MODE_SET | (flags & entry_mode::MASK))
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off, see [display_control].
    fn display_control(&mut self, flags: u8) -> GpioResult<()> {
        self.send_command(DISPLAY_CONTROL | (flags & display_control::MASK))
    }

    /// Moves the cursor or shifts the display by one position, see [cursor_shift].
    fn cursor_shift(&mut self, flags: u8) -> GpioResult<()> {
        self.send_command(CURSOR_SHIFT | (flags & cursor_shift::MASK))
    }

    /// Sets the bus width, line count and font, see [function_set].
    fn function_set(&mut self, flags: u8) -> GpioResult<()> {
        self.send_command(FUNCTION_SET | (flags & function_set::MASK))
    }

    /// Sets the CGRAM address. Following data bytes are written to the glyph rows.
    fn set_cgram_address(&mut self, address: u8) -> GpioResult<()> {
        self.send_command(SET_CGRAM_ADDRESS | (address & CGRAM_ADDRESS_MASK))
    }

    /// Sets the DDRAM address. Following data bytes are written as characters.
    fn set_ddram_address(&mut self, address: u8) -> GpioResult<()> {
        self.send_command(SET_DDRAM_ADDRESS | (address & DDRAM_ADDRESS_MASK))
    }

    /// Turns the backlight on or off.
    ///
    /// # Errors
    /// - `GpioError::NotSupported` if the transport has no backlight line.
    fn set_backlight(&mut self, _on: bool) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }

    // Low-level operations
    // The instructions above and the initialization sequence of
    // [LiquidCrystal](crate::lcd::hd44780::LiquidCrystal) are built on these.

    /// Drives RS, E and RW (when wired) low.
    fn reset_control_lines(&mut self) -> GpioResult<()>;

    /// Latches the lowest 4 bits on D0..D3 with a single enable pulse, leaving RS as it is.
    ///
    /// Only used by the initialization sequence, while the controller may still be in 8-bit mode.
    fn write_nibble(&mut self, nibble: u8) -> GpioResult<()>;

    /// Sends an instruction byte to the HD44780 controller.
    /// Sets the RS pin to 0 (command).
    fn send_command(&mut self, command: u8) -> GpioResult<()>;

    /// Sends a data byte to the HD44780 controller.
    /// Sets the RS pin to 1 (data).
    fn send_data(&mut self, data: u8) -> GpioResult<()>;

    /// Blocks for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Towards lower addresses.
    Left,
    /// Towards higher addresses.
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records what the provided methods send.
    #[derive(Debug, Default)]
    struct Recorder {
        sent: Vec<(bool, u8)>,
        waited_ms: u32,
    }

    impl HD44780Driver for Recorder {
        fn is_8bit(&self) -> bool {
            false
        }

        fn reset_control_lines(&mut self) -> GpioResult<()> {
            Ok(())
        }

        fn write_nibble(&mut self, _nibble: u8) -> GpioResult<()> {
            Ok(())
        }

        fn send_command(&mut self, command: u8) -> GpioResult<()> {
            self.sent.push((false, command));
            Ok(())
        }

        fn send_data(&mut self, data: u8) -> GpioResult<()> {
            self.sent.push((true, data));
            Ok(())
        }

        fn delay_ms(&mut self, ms: u32) {
            self.waited_ms += ms;
        }
    }

    #[test]
    fn instruction_encoding() {
        let mut driver = Recorder::default();
        driver.entry_mode_set(entry_mode::ENTRY_LEFT).unwrap();
        driver.display_control(display_control::DISPLAY_ON | display_control::BLINK_ON).unwrap();
        driver.cursor_shift(cursor_shift::DISPLAY_MOVE | cursor_shift::MOVE_RIGHT).unwrap();
        driver.function_set(function_set::DATA_8BIT | function_set::TWO_LINES).unwrap();
        driver.set_cgram_address(3 << 3).unwrap();
        driver.set_ddram_address(0x45).unwrap();

        let commands: Vec<u8> = driver.sent.iter().map(|&(_, byte)| byte).collect();
        assert_eq!(commands, [0x06, 0x0D, 0x1C, 0x38, 0x58, 0xC5]);
        assert!(driver.sent.iter().all(|&(rs, _)| !rs));
    }

    #[test]
    fn flags_outside_the_instruction_are_dropped() {
        let mut driver = Recorder::default();
        driver.display_control(0xFF).unwrap();
        driver.set_ddram_address(0xFF).unwrap();
        driver.set_cgram_address(0xFF).unwrap();

        assert_eq!(driver.sent, [(false, 0x0F), (false, 0xFF), (false, 0x7F)]);
    }

    #[test]
    fn clear_and_home_wait_for_the_controller() {
        let mut driver = Recorder::default();
        driver.clear_display().unwrap();
        driver.return_home().unwrap();

        assert_eq!(driver.sent, [(false, 0x01), (false, 0x02)]);
        assert_eq!(driver.waited_ms, 4);
    }

    #[test]
    fn backlight_is_optional() {
        let mut driver = Recorder::default();
        assert_eq!(driver.set_backlight(true), Err(GpioError::NotSupported));
    }
}
