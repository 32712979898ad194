use crate::GpioResult;
use crate::lcd::hd44780::command::{cursor_shift, display_control, entry_mode, function_set};
use crate::lcd::hd44780::driver::{CursorDirection, HD44780Driver};
use log::{debug, warn};
use std::fmt;

/// DDRAM address of the first column of each row.
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Settling time the controller needs after power-up.
const POWER_UP_MS: u32 = 50;
/// Waits after each of the three synchronization writes.
const SYNC_DELAYS_MS: [u32; 3] = [5, 5, 1];

/// Character cell size.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Font {
    #[default]
    Dots5x8,
    /// Only honored by the controller in single-line mode.
    Dots5x10,
}

/// Lifecycle of a [LiquidCrystal].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DisplayState {
    /// Pins and bus width are known, the controller hasn't been initialized.
    RoleAssigned,
    /// [LiquidCrystal::begin] completed, every operation is available.
    Ready,
}

/// A character LCD on an HD44780 controller.
///
/// Keeps the configuration the controller can't report back: the function set, display control
/// and entry mode flags. Every change of a flag is sent right away as the full instruction, the
/// controller has no way to update a single flag.
///
/// Create it with [LiquidCrystal::new], then call [LiquidCrystal::begin] once before anything
/// else. Operations before `begin` are sent to an uninitialized controller.
#[derive(Debug)]
pub struct LiquidCrystal<T> {
    driver: T,
    state: DisplayState,

    function_flags: u8,
    control_flags: u8,
    entry_flags: u8,

    columns: u8,
    lines: u8,
    current_line: u8,
}

impl<T: HD44780Driver> LiquidCrystal<T> {
    /// Takes over a driver with its pins assigned. The display starts as a single line of
    /// 5x8 cells, with the bus width of the driver.
    pub fn new(driver: T) -> Self {
        let function_flags = Self::bus_width_flag(&driver);
        LiquidCrystal {
            driver,
            state: DisplayState::RoleAssigned,
            function_flags,
            control_flags: 0,
            entry_flags: 0,
            columns: 0,
            lines: 1,
            current_line: 0,
        }
    }

    fn bus_width_flag(driver: &T) -> u8 {
        if driver.is_8bit() {
            function_set::DATA_8BIT
        } else {
            0
        }
    }

    /// Initializes the controller.
    ///
    /// Waits for the controller to power up, then synchronizes it with the instruction
    /// sequence from the HD44780 datasheet. The controller may be in 8-bit mode or in the
    /// middle of a 4-bit transfer, so the function set nibble `0011` is latched three times
    /// before `0010` selects 4-bit mode. In 8-bit mode the full function set is sent three times
    /// instead. Afterwards:
    /// - sets bus width, line count and font,
    /// - turns the display on with cursor and blink off,
    /// - clears the display,
    /// - sets left-to-right text without autoscroll.
    ///
    /// `columns` is only remembered. A `lines` of 0 is treated as 1. The 5x10 font is only
    /// selected for a single line, the controller ignores it otherwise.
    ///
    /// Returns `true` once the sequence has been sent. The controller doesn't acknowledge
    /// anything, so there is no other outcome short of a bus error.
    pub fn begin(&mut self, columns: u8, lines: u8, font: Font) -> GpioResult<bool> {
        if lines == 0 {
            warn!("LCD configured with 0 lines, using 1");
        }
        let lines = lines.max(1);

        self.columns = columns;
        self.lines = lines;
        self.current_line = 0;

        self.function_flags = Self::bus_width_flag(&self.driver);
        if lines > 1 {
            self.function_flags |= function_set::TWO_LINES;
        }
        if font == Font::Dots5x10 {
            if lines == 1 {
                self.function_flags |= function_set::FONT_5X10;
            } else {
                warn!("5x10 font is not available with {} lines", lines);
            }
        }

        self.driver.delay_ms(POWER_UP_MS);
        self.driver.reset_control_lines()?;

        // Synchronize
        for delay_ms in SYNC_DELAYS_MS {
            if self.driver.is_8bit() {
                self.driver.function_set(self.function_flags)?;
            } else {
                self.driver.write_nibble(0b0011)?;
            }
            self.driver.delay_ms(delay_ms);
        }
        if !self.driver.is_8bit() {
            self.driver.write_nibble(0b0010)?;
        }

        self.driver.function_set(self.function_flags)?;

        self.control_flags = display_control::DISPLAY_ON;
        self.driver.display_control(self.control_flags)?;

        self.clear()?;

        self.entry_flags = entry_mode::ENTRY_LEFT;
        self.driver.entry_mode_set(self.entry_flags)?;

        self.state = DisplayState::Ready;
        debug!(
            "LCD ready: {}x{}, function set {:08b}",
            columns, lines, self.function_flags
        );
        Ok(true)
    }

    /// Clears the display and moves the cursor to (0, 0).
    pub fn clear(&mut self) -> GpioResult<()> {
        self.driver.clear_display()?;
        self.current_line = 0;
        Ok(())
    }

    /// Moves the cursor to (0, 0) and undoes scrolling, keeping the text.
    pub fn home(&mut self) -> GpioResult<()> {
        self.driver.return_home()?;
        self.current_line = 0;
        Ok(())
    }

    /// Moves the cursor to `col` on `row`, both starting at 0.
    ///
    /// Rows past the last configured line are clamped to the last line. Columns are not checked,
    /// the controller wraps the address on its own.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> GpioResult<()> {
        let last_row = self.lines.min(ROW_OFFSETS.len() as u8) - 1;
        let row = row.min(last_row);
        self.current_line = row;
        self.driver
            .set_ddram_address(col.wrapping_add(ROW_OFFSETS[row as usize]))
    }

    /// Turns the display on or off. The text stays in memory while it's off.
    pub fn set_display(&mut self, on: bool) -> GpioResult<()> {
        self.update_control(display_control::DISPLAY_ON, on)
    }

    /// Shows or hides the underline cursor.
    pub fn set_cursor_visible(&mut self, visible: bool) -> GpioResult<()> {
        self.update_control(display_control::CURSOR_ON, visible)
    }

    /// Turns blinking of the cursor cell on or off.
    pub fn set_blink(&mut self, on: bool) -> GpioResult<()> {
        self.update_control(display_control::BLINK_ON, on)
    }

    /// Shifts the visible window by one character. Text already written and the direction of new
    /// text are unaffected.
    pub fn scroll_display(&mut self, direction: CursorDirection) -> GpioResult<()> {
        let mut flags = cursor_shift::DISPLAY_MOVE;
        if direction == CursorDirection::Right {
            flags |= cursor_shift::MOVE_RIGHT;
        }
        self.driver.cursor_shift(flags)
    }

    pub fn scroll_display_left(&mut self) -> GpioResult<()> {
        self.scroll_display(CursorDirection::Left)
    }

    pub fn scroll_display_right(&mut self) -> GpioResult<()> {
        self.scroll_display(CursorDirection::Right)
    }

    /// Sets where the cursor moves after each character: [CursorDirection::Right] for
    /// left-to-right text.
    pub fn set_text_direction(&mut self, direction: CursorDirection) -> GpioResult<()> {
        self.update_entry(entry_mode::ENTRY_LEFT, direction == CursorDirection::Right)
    }

    pub fn left_to_right(&mut self) -> GpioResult<()> {
        self.set_text_direction(CursorDirection::Right)
    }

    pub fn right_to_left(&mut self) -> GpioResult<()> {
        self.set_text_direction(CursorDirection::Left)
    }

    /// With autoscroll on, the display shifts on each character so the cursor stays in place.
    pub fn set_autoscroll(&mut self, on: bool) -> GpioResult<()> {
        self.update_entry(entry_mode::SHIFT_INCREMENT, on)
    }

    /// Writes one character code at the cursor. Codes 0..8 show the custom glyphs.
    pub fn write_byte(&mut self, value: u8) -> GpioResult<()> {
        self.driver.send_data(value)
    }

    /// Writes character codes as they are, in order.
    pub fn write_bytes(&mut self, values: &[u8]) -> GpioResult<()> {
        for &value in values {
            self.driver.send_data(value)?;
        }
        Ok(())
    }

    /// Writes text at the cursor. There is no line wrapping, text past the end of a line follows
    /// the DDRAM layout of the controller.
    ///
    /// ASCII maps directly to the character ROM, anything else is written as `?`.
    pub fn print(&mut self, text: &str) -> GpioResult<()> {
        for c in text.chars() {
            if c.is_ascii() {
                self.driver.send_data(c as u8)?;
            } else {
                warn!("Non-ASCII character: {}", c);
                self.driver.send_data(b'?')?;
            }
        }
        Ok(())
    }

    /// Defines the glyph of character code `slot` (0..8, higher bits are ignored).
    ///
    /// Each byte of `rows` is one pixel row, top first, with the rightmost pixel in bit 0.
    ///
    /// Data written afterwards keeps going to CGRAM, so call [LiquidCrystal::set_cursor],
    /// [LiquidCrystal::clear] or [LiquidCrystal::home] before writing text again.
    pub fn create_char(&mut self, slot: u8, rows: &[u8; 8]) -> GpioResult<()> {
        let slot = slot & 0b111;
        self.driver.set_cgram_address(slot << 3)?;
        self.write_bytes(rows)
    }

    /// Turns the backlight on or off, independently of the controller.
    pub fn set_backlight(&mut self, on: bool) -> GpioResult<()> {
        self.driver.set_backlight(on)
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn lines(&self) -> u8 {
        self.lines
    }

    /// Row of the last cursor placement.
    pub fn current_line(&self) -> u8 {
        self.current_line
    }

    pub fn function_flags(&self) -> u8 {
        self.function_flags
    }

    pub fn display_control_flags(&self) -> u8 {
        self.control_flags
    }

    pub fn entry_mode_flags(&self) -> u8 {
        self.entry_flags
    }

    pub fn driver(&self) -> &T {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut T {
        &mut self.driver
    }

    /// Gives the driver back.
    pub fn release(self) -> T {
        self.driver
    }

    fn update_control(&mut self, flag: u8, on: bool) -> GpioResult<()> {
        self.control_flags = with_flag(self.control_flags, flag, on);
        self.driver.display_control(self.control_flags)
    }

    fn update_entry(&mut self, flag: u8, on: bool) -> GpioResult<()> {
        self.entry_flags = with_flag(self.entry_flags, flag, on);
        self.driver.entry_mode_set(self.entry_flags)
    }
}

fn with_flag(flags: u8, flag: u8, on: bool) -> u8 {
    if on { flags | flag } else { flags & !flag }
}

impl<T: HD44780Driver> fmt::Write for LiquidCrystal<T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s).map_err(|err| {
            warn!("LCD write failed: {}", err);
            fmt::Error
        })
    }
}
