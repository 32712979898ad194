//! Recording fakes shared by the unit tests.

use crate::{ExpanderPin, GpioError, GpioResult, OutputRegister};
use embedded_hal::delay::DelayNs;
use std::cell::RefCell;
use std::rc::Rc;

/// Wiring of the reference board: RS on GP1, E on GP2, D0..D3 on GP3..GP6, RW tied low.
pub const RS: ExpanderPin = ExpanderPin::GP1;
pub const E: ExpanderPin = ExpanderPin::GP2;
pub const DATA_4BIT: [ExpanderPin; 4] = [
    ExpanderPin::GP3,
    ExpanderPin::GP4,
    ExpanderPin::GP5,
    ExpanderPin::GP6,
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Event {
    Read(u8),
    Write(u8),
    DelayNs(u32),
    DelayUs(u32),
    DelayMs(u32),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

/// An output register that records every access in a shared log.
#[derive(Debug)]
pub struct FakeRegister {
    value: u8,
    log: Log,
    fail_writes: bool,
}

impl FakeRegister {
    pub fn new(log: &Log) -> Self {
        Self::with_value(log, 0)
    }

    pub fn with_value(log: &Log, value: u8) -> Self {
        FakeRegister {
            value,
            log: log.clone(),
            fail_writes: false,
        }
    }

    /// A register whose writes always fail.
    pub fn failing(log: &Log) -> Self {
        FakeRegister {
            fail_writes: true,
            ..Self::new(log)
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}

impl OutputRegister for FakeRegister {
    fn read_output(&mut self) -> GpioResult<u8> {
        self.log.borrow_mut().push(Event::Read(self.value));
        Ok(self.value)
    }

    fn write_output(&mut self, value: u8) -> GpioResult<()> {
        if self.fail_writes {
            return Err(GpioError::Other("bus stalled".into()));
        }
        self.log.borrow_mut().push(Event::Write(value));
        self.value = value;
        Ok(())
    }
}

/// A delay that returns immediately and records how long it was asked to wait.
#[derive(Debug)]
pub struct FakeDelay {
    log: Log,
}

impl FakeDelay {
    pub fn new(log: &Log) -> Self {
        FakeDelay { log: log.clone() }
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::DelayNs(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.borrow_mut().push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::DelayMs(ms));
    }
}

/// What the controller sees: a value latched on a falling edge of E, or a millisecond wait.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Latched {
    Nibble { rs: bool, value: u8 },
    WaitMs(u32),
}

/// Replays the register writes of a 4-bit bus wired like the reference board and collects what
/// the controller latches. Sub-millisecond waits are dropped.
pub fn latched_4bit(log: &Log) -> Vec<Latched> {
    let mut latched = Vec::new();
    let mut last = 0u8;
    for event in log.borrow().iter() {
        match *event {
            Event::Write(value) => {
                let falling = last & E.mask() != 0 && value & E.mask() == 0;
                if falling {
                    let nibble = DATA_4BIT
                        .iter()
                        .enumerate()
                        .filter(|(_, pin)| value & pin.mask() != 0)
                        .fold(0u8, |acc, (bit, _)| acc | 1 << bit);
                    latched.push(Latched::Nibble {
                        rs: value & RS.mask() != 0,
                        value: nibble,
                    });
                }
                last = value;
            }
            Event::DelayMs(ms) => latched.push(Latched::WaitMs(ms)),
            _ => {}
        }
    }
    latched
}

/// The two nibble latches of a command byte, high nibble first.
pub fn command(byte: u8) -> [Latched; 2] {
    nibbles(byte, false)
}

/// The two nibble latches of a data byte, high nibble first.
pub fn data(byte: u8) -> [Latched; 2] {
    nibbles(byte, true)
}

fn nibbles(byte: u8, rs: bool) -> [Latched; 2] {
    [
        Latched::Nibble { rs, value: byte >> 4 },
        Latched::Nibble { rs, value: byte & 0x0F },
    ]
}

/// Only the register writes of the log, in order.
pub fn writes(log: &Log) -> Vec<u8> {
    log.borrow()
        .iter()
        .filter_map(|event| match event {
            Event::Write(value) => Some(*value),
            _ => None,
        })
        .collect()
}
