//! HD44780 instruction encoding.
//!
//! Each instruction is identified by its highest set bit, the bits below it are its flags.

pub const CLEAR_DISPLAY: u8 = 0b0000_0001;
pub const RETURN_HOME: u8 = 0b0000_0010;
pub const ENTRY_MODE_SET: u8 = 0b0000_0100;
pub const DISPLAY_CONTROL: u8 = 0b0000_1000;
pub const CURSOR_SHIFT: u8 = 0b0001_0000;
pub const FUNCTION_SET: u8 = 0b0010_0000;
pub const SET_CGRAM_ADDRESS: u8 = 0b0100_0000;
pub const SET_DDRAM_ADDRESS: u8 = 0b1000_0000;

/// Flags of [ENTRY_MODE_SET].
pub mod entry_mode {
    /// Cursor moves right after each character, text runs left to right.
    pub const ENTRY_LEFT: u8 = 0b0000_0010;
    /// The display shifts with each character instead of the cursor (autoscroll).
    pub const SHIFT_INCREMENT: u8 = 0b0000_0001;
    pub const MASK: u8 = ENTRY_LEFT | SHIFT_INCREMENT;
}

/// Flags of [DISPLAY_CONTROL].
pub mod display_control {
    pub const DISPLAY_ON: u8 = 0b0000_0100;
    pub const CURSOR_ON: u8 = 0b0000_0010;
    pub const BLINK_ON: u8 = 0b0000_0001;
    pub const MASK: u8 = DISPLAY_ON | CURSOR_ON | BLINK_ON;
}

/// Flags of [CURSOR_SHIFT].
pub mod cursor_shift {
    /// Shift the whole display instead of moving the cursor.
    pub const DISPLAY_MOVE: u8 = 0b0000_1000;
    pub const MOVE_RIGHT: u8 = 0b0000_0100;
    pub const MASK: u8 = DISPLAY_MOVE | MOVE_RIGHT;
}

/// Flags of [FUNCTION_SET].
pub mod function_set {
    pub const DATA_8BIT: u8 = 0b0001_0000;
    pub const TWO_LINES: u8 = 0b0000_1000;
    /// 5x10 dots font. Ignored by the controller in two-line mode.
    pub const FONT_5X10: u8 = 0b0000_0100;
    pub const MASK: u8 = DATA_8BIT | TWO_LINES | FONT_5X10;
}

/// CGRAM address bits: 8 glyphs of 8 rows.
pub const CGRAM_ADDRESS_MASK: u8 = 0b0011_1111;
/// DDRAM address bits.
pub const DDRAM_ADDRESS_MASK: u8 = 0b0111_1111;
