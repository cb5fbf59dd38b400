//! Status commands
//!
//! This module contains commands for querying the radio:
//! - Part and firmware identification
//! - Pending interrupts, which are cleared by the same read
//! - Modem status including the current RSSI
//! - Fast response registers, readable without the command handshake
//!
//! RSSI values are reported in half-dB steps with an offset; see
//! [`rssi_dbm`].

use core::convert::Infallible;

use crate::commands::opcode;
use crate::properties::{ChipInterrupts, ModemInterrupts, PhInterrupts};
use crate::{Command, FromByteArray, NoParameters, ToByteArray};

/// Converts a raw RSSI reading to dBm
pub fn rssi_dbm(raw: u8) -> i16 {
    (raw / 2) as i16 - 134
}

/// PART_INFO response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PartInfo {
    /// Chip mask revision
    pub chip_rev: u8,
    /// Part number, e.g. `0x4463`
    pub part: u16,
    /// Part build
    pub part_build: u8,
    /// ID
    pub id: u16,
    /// Customer ID
    pub customer: u8,
    /// ROM ID (3 = revB1B, 6 = revC2A)
    pub rom_id: u8,
}

impl FromByteArray for PartInfo {
    type Error = Infallible;
    type Array = [u8; 8];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            chip_rev: bytes[0],
            part: u16::from_be_bytes([bytes[1], bytes[2]]),
            part_build: bytes[3],
            id: u16::from_be_bytes([bytes[4], bytes[5]]),
            customer: bytes[6],
            rom_id: bytes[7],
        })
    }
}

/// PART_INFO command (0x01)
///
/// Returns part identification. Useful for checking the SPI wiring.
#[derive(Debug, Clone)]
pub struct GetPartInfo;

impl Command for GetPartInfo {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = PartInfo;

    fn id() -> Self::IdType {
        opcode::PART_INFO
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// FUNC_INFO response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FuncInfo {
    /// External revision
    pub rev_external: u8,
    /// Branch revision
    pub rev_branch: u8,
    /// Internal revision
    pub rev_internal: u8,
    /// Patch ID
    pub patch: u16,
    /// Current functional mode
    pub func: u8,
}

impl FromByteArray for FuncInfo {
    type Error = Infallible;
    type Array = [u8; 6];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            rev_external: bytes[0],
            rev_branch: bytes[1],
            rev_internal: bytes[2],
            patch: u16::from_be_bytes([bytes[3], bytes[4]]),
            func: bytes[5],
        })
    }
}

/// FUNC_INFO command (0x10)
///
/// Returns firmware revision information.
#[derive(Debug, Clone)]
pub struct GetFuncInfo;

impl Command for GetFuncInfo {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = FuncInfo;

    fn id() -> Self::IdType {
        opcode::FUNC_INFO
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// GET_INT_STATUS response
///
/// # Response Format
/// - Byte 0: group pending
/// - Byte 1: group status
/// - Byte 2: packet handler pending
/// - Byte 3: packet handler status
/// - Byte 4: modem pending
/// - Byte 5: modem status
/// - Byte 6: chip pending
/// - Byte 7: chip status
///
/// Only the pending bytes are acted on. Status bytes reflect the live
/// condition whether or not an interrupt was latched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptStatus {
    /// Groups with pending interrupts
    pub int_pending: u8,
    /// Groups with active status
    pub int_status: u8,
    /// Latched packet handler interrupts
    pub ph_pending: PhInterrupts,
    /// Live packet handler status
    pub ph_status: PhInterrupts,
    /// Latched modem interrupts
    pub modem_pending: ModemInterrupts,
    /// Live modem status
    pub modem_status: ModemInterrupts,
    /// Latched chip interrupts
    pub chip_pending: ChipInterrupts,
    /// Live chip status
    pub chip_status: ChipInterrupts,
}

impl FromByteArray for InterruptStatus {
    type Error = Infallible;
    type Array = [u8; 8];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            int_pending: bytes[0],
            int_status: bytes[1],
            ph_pending: PhInterrupts::from_bits_retain(bytes[2]),
            ph_status: PhInterrupts::from_bits_retain(bytes[3]),
            modem_pending: ModemInterrupts::from_bits_retain(bytes[4]),
            modem_status: ModemInterrupts::from_bits_retain(bytes[5]),
            chip_pending: ChipInterrupts::from_bits_retain(bytes[6]),
            chip_status: ChipInterrupts::from_bits_retain(bytes[7]),
        })
    }
}

/// GET_INT_STATUS command (0x20) without arguments
///
/// Returns and clears every pending interrupt.
#[derive(Debug, Clone)]
pub struct GetIntStatus;

impl Command for GetIntStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = InterruptStatus;

    fn id() -> Self::IdType {
        opcode::GET_INT_STATUS
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// Pending interrupts to keep when clearing
///
/// A set bit keeps the corresponding pending interrupt, a clear bit clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeepPending {
    /// Packet handler interrupts to keep
    pub ph: PhInterrupts,
    /// Modem interrupts to keep
    pub modem: ModemInterrupts,
    /// Chip interrupts to keep
    pub chip: ChipInterrupts,
}

impl ToByteArray for KeepPending {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.ph.bits(), self.modem.bits(), self.chip.bits()])
    }
}

/// GET_INT_STATUS command (0x20) with selective clearing
///
/// Clears pending interrupts whose bit is not set in `keep`. The status
/// response is not read back.
#[derive(Debug, Clone)]
pub struct ClearInterrupts {
    /// Pending interrupts left untouched
    pub keep: KeepPending,
}

impl Command for ClearInterrupts {
    type IdType = u8;
    type CommandParameters = KeepPending;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::GET_INT_STATUS
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.keep
    }
}

/// GET_MODEM_STATUS response
///
/// Only the leading part of the response is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemStatus {
    /// Latched modem interrupts
    pub pending: ModemInterrupts,
    /// Live modem status
    pub status: ModemInterrupts,
    /// Current RSSI, raw
    pub current_rssi: u8,
}

impl FromByteArray for ModemStatus {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            pending: ModemInterrupts::from_bits_retain(bytes[0]),
            status: ModemInterrupts::from_bits_retain(bytes[1]),
            current_rssi: bytes[2],
        })
    }
}

impl ToByteArray for ModemInterrupts {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

/// GET_MODEM_STATUS command (0x22)
///
/// Returns the modem status. Modem interrupts whose bit is clear in `keep`
/// are cleared.
///
/// # Important Notes
/// - RSSI is only meaningful in RX
#[derive(Debug, Clone)]
pub struct GetModemStatus {
    /// Modem interrupts left untouched
    pub keep: ModemInterrupts,
}

impl Command for GetModemStatus {
    type IdType = u8;
    type CommandParameters = ModemInterrupts;
    type ResponseParameters = ModemStatus;

    fn id() -> Self::IdType {
        opcode::GET_MODEM_STATUS
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.keep
    }
}

/// Fast response registers
///
/// Readable in a single short SPI exchange without waiting for
/// clear-to-send. What each one holds is set by the `FRR_CTL` properties in
/// the configuration table; the driver expects A to hold the latched RSSI and
/// B the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FastResponseRegister {
    /// Latched RSSI
    A = opcode::FRR_A_READ as isize,
    /// Current state
    B = opcode::FRR_B_READ as isize,
    /// Register C
    C = opcode::FRR_C_READ as isize,
    /// Register D
    D = opcode::FRR_D_READ as isize,
}

impl FastResponseRegister {
    /// Register holding the RSSI latched at sync detection
    pub const LATCHED_RSSI: Self = Self::A;
    /// Register holding the current state
    pub const STATE: Self = Self::B;

    /// Read command byte
    pub fn opcode(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rssi_conversion() {
        assert_eq!(rssi_dbm(0), -134);
        assert_eq!(rssi_dbm(100), -84);
        assert_eq!(rssi_dbm(101), -84);
        assert_eq!(rssi_dbm(255), -7);
    }

    #[test]
    fn interrupt_status_layout() {
        let status = InterruptStatus::from_bytes([0x07, 0x00, 0x30, 0x00, 0x01, 0x00, 0x03, 0x00])
            .unwrap();
        assert_eq!(
            status.ph_pending,
            PhInterrupts::PACKET_SENT | PhInterrupts::PACKET_RX
        );
        assert_eq!(status.modem_pending, ModemInterrupts::SYNC_DETECT);
        assert_eq!(
            status.chip_pending,
            ChipInterrupts::LOW_BATT | ChipInterrupts::WUT
        );
    }

    #[test]
    fn clear_keeps_selected_groups() {
        let keep = KeepPending {
            chip: ChipInterrupts::all(),
            ..Default::default()
        };
        assert_eq!(keep.to_bytes().unwrap(), [0x00, 0x00, 0x7F]);
    }
}
