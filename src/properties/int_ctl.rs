//! Interrupt control properties
//!
//! Each interrupt source belongs to one of three groups: packet handler (PH),
//! modem and chip. The per-group enable properties use the same bit layout as
//! the corresponding pending byte returned by `GET_INT_STATUS`, so the flag
//! types below serve both.
//!
//! Interrupts must be enabled here to assert the nIRQ line. The driver keeps
//! an in-memory copy of these enables to filter status reads.

use bitflags::bitflags;

use super::{Property, PropertyGroup};

/// Group-level enables (address: 0x0100)
///
/// Followed by the PH, modem and chip enables, so all four can be written
/// in one run.
pub const INT_CTL_ENABLE: Property = Property::new(PropertyGroup::Int, 0x00);

/// Packet handler interrupt enables (address: 0x0101)
pub const INT_CTL_PH_ENABLE: Property = Property::new(PropertyGroup::Int, 0x01);

/// Modem interrupt enables (address: 0x0102)
pub const INT_CTL_MODEM_ENABLE: Property = Property::new(PropertyGroup::Int, 0x02);

/// Chip interrupt enables (address: 0x0103)
pub const INT_CTL_CHIP_ENABLE: Property = Property::new(PropertyGroup::Int, 0x03);

bitflags! {
    /// INT_CTL_ENABLE bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IntGroups: u8 {
        /// Packet handler interrupts reach nIRQ
        const PH = 1 << 0;
        /// Modem interrupts reach nIRQ
        const MODEM = 1 << 1;
        /// Chip interrupts reach nIRQ
        const CHIP = 1 << 2;
    }
}

bitflags! {
    /// Packet handler interrupts
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PhInterrupts: u8 {
        /// Address filter matched
        const FILTER_MATCH = 1 << 7;
        /// Address filter missed
        const FILTER_MISS = 1 << 6;
        /// Packet transmission finished
        const PACKET_SENT = 1 << 5;
        /// Valid packet received
        const PACKET_RX = 1 << 4;
        /// Received packet failed CRC
        const CRC_ERROR = 1 << 3;
        /// Received packet failed the alternate CRC
        const ALT_CRC_ERROR = 1 << 2;
        /// TX FIFO below threshold
        const TX_FIFO_ALMOST_EMPTY = 1 << 1;
        /// RX FIFO above threshold
        const RX_FIFO_ALMOST_FULL = 1 << 0;
    }
}

bitflags! {
    /// Modem interrupts
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModemInterrupts: u8 {
        /// RSSI latched
        const RSSI_LATCH = 1 << 7;
        /// Postamble detected
        const POSTAMBLE_DETECT = 1 << 6;
        /// Sync word not detected within the expected window
        const INVALID_SYNC = 1 << 5;
        /// RSSI jump
        const RSSI_JUMP = 1 << 4;
        /// RSSI above threshold
        const RSSI = 1 << 3;
        /// Preamble detection failed
        const INVALID_PREAMBLE = 1 << 2;
        /// Preamble detected
        const PREAMBLE_DETECT = 1 << 1;
        /// Sync word detected, packet data follows
        const SYNC_DETECT = 1 << 0;
    }
}

bitflags! {
    /// Chip interrupts
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChipInterrupts: u8 {
        /// Calibration requested
        const CAL = 1 << 6;
        /// FIFO underflow or overflow
        const FIFO_UNDERFLOW_OVERFLOW_ERROR = 1 << 5;
        /// State changed
        const STATE_CHANGE = 1 << 4;
        /// Command error
        const CMD_ERROR = 1 << 3;
        /// Chip ready after power up
        const CHIP_READY = 1 << 2;
        /// Battery below the low battery threshold
        const LOW_BATT = 1 << 1;
        /// Wake-up timer expired
        const WUT = 1 << 0;
    }
}
