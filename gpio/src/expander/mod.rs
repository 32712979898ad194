//! Output registers of I²C GPIO expanders.
//!
//! [Mcp23008] talks to the expander itself. [ShadowRegister] sits in front of any
//! [OutputRegister](crate::OutputRegister) and keeps the latch value in memory, so setting a single
//! line costs one bus write instead of a read and a write.

mod mcp23008;
mod shadow;

pub use mcp23008::*;
pub use shadow::*;
