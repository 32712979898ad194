//! HD44780 character LCD module.
//!
//! The driver is split in two layers:
//! - [driver] moves bytes to the controller. [driver::HD44780Driver] composes the HD44780
//!   instructions on top of `send_command`/`send_data`, and [driver::ExpanderHD44780Driver]
//!   implements those by toggling single lines of an 8-bit GPIO expander register.
//! - [LiquidCrystal] keeps the display configuration (lines, font, display control and entry mode
//!   flags) and offers the high-level operations: cursor positioning, scrolling, text, custom
//!   glyphs and the backlight.
//!
//! The busy flag is never read back. Every instruction is followed by a fixed wait instead.

pub mod command;
pub mod driver;
mod display;

pub use display::*;
