//! Property definitions for the Si446x radio
//!
//! Properties are the chip's configuration registers. Each one is addressed
//! by a group byte and an index within the group, written here as a single
//! `u16` (`group << 8 | index`). They are accessed with `SET_PROPERTY` and
//! `GET_PROPERTY`, which move runs of consecutive properties within a group:
//! up to 12 bytes per write and 16 per read.
//!
//! The driver does not cache properties. Every read is a bus transaction.
//!
//! - [`global`]: crystal, clocks, low battery detector and wake-up timer
//! - [`int_ctl`]: interrupt enables, which share their bit layout with the
//!   pending bytes of `GET_INT_STATUS`
//! - [`pkt`]: packet handler and power amplifier

pub mod global;
pub mod int_ctl;
pub mod pkt;

pub use global::*;
pub use int_ctl::*;
pub use pkt::*;

/// Address of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Property(pub u16);

impl Property {
    /// Creates a property address from a group and an index
    pub const fn new(group: PropertyGroup, index: u8) -> Self {
        Self(((group as u16) << 8) | index as u16)
    }

    /// Group byte
    pub const fn group(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Index within the group
    pub const fn index(self) -> u8 {
        self.0 as u8
    }

    /// The property `count` positions further along in the same group
    pub const fn offset(self, count: u8) -> Self {
        Self(((self.group() as u16) << 8) | self.index().wrapping_add(count) as u16)
    }
}

/// Property groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyGroup {
    /// Global configuration
    Global = 0x00,
    /// Interrupt enables
    Int = 0x01,
    /// Fast response register sources
    Frr = 0x02,
    /// Preamble
    Preamble = 0x10,
    /// Sync word
    Sync = 0x11,
    /// Packet handler
    Pkt = 0x12,
    /// Modem
    Modem = 0x20,
    /// RX channel filter coefficients
    ModemChflt = 0x21,
    /// Power amplifier
    Pa = 0x22,
    /// Synthesizer
    Synth = 0x23,
    /// Address match
    Match = 0x30,
    /// Frequency control
    FreqControl = 0x40,
    /// RX hopping
    RxHop = 0x50,
    /// Packet trace interface
    Pti = 0xF0,
}

impl PropertyGroup {
    /// Number of properties in the group
    pub const fn len(self) -> usize {
        match self {
            Self::Global => 0x0A,
            Self::Int => 0x04,
            Self::Frr => 0x04,
            Self::Preamble => 0x0E,
            Self::Sync => 0x06,
            Self::Pkt => 0x40,
            Self::Modem => 0x60,
            Self::ModemChflt => 0x24,
            Self::Pa => 0x07,
            Self::Synth => 0x08,
            Self::Match => 0x0C,
            Self::FreqControl => 0x08,
            Self::RxHop => 0x42,
            Self::Pti => 0x04,
        }
    }

    /// First property of the group
    pub const fn first(self) -> Property {
        Property::new(self, 0)
    }
}
