//! Operational commands
//!
//! This module contains commands that move the radio between states and
//! prepare its FIFOs:
//! - Manual state changes (sleep, SPI active, ready)
//! - Starting transmit and receive, including the states entered
//!   automatically once the operation completes
//! - FIFO reset
//! - Image rejection calibration
//!
//! State transitions requested here take effect immediately. The chip
//! reports its current state through fast response register B.

use bitflags::bitflags;
use core::convert::Infallible;

use crate::commands::opcode;
use crate::{Command, NoParameters, RadioState, ToByteArray};

impl ToByteArray for RadioState {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

/// CHANGE_STATE command (0x34)
///
/// Forces the radio into a new state.
///
/// # Important Notes
/// - Entering [`RadioState::Sleep`] only lasts until the next SPI access,
///   which wakes the chip into [`RadioState::SpiActive`]
/// - Changing state while transmitting aborts the transmission
#[derive(Debug, Clone)]
pub struct ChangeState {
    /// State to enter
    pub state: RadioState,
}

impl Command for ChangeState {
    type IdType = u8;
    type CommandParameters = RadioState;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::CHANGE_STATE
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.state
    }
}

bitflags! {
    /// FIFO reset selection for FIFO_INFO
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FifoReset: u8 {
        /// Reset the RX FIFO
        const RX = 1 << 1;
        /// Reset the TX FIFO
        const TX = 1 << 0;
    }
}

impl ToByteArray for FifoReset {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

/// FIFO_INFO command (0x15)
///
/// Resets the selected FIFOs. With FIFOs combined (the usual 129 byte
/// configuration) both must be reset together.
///
/// The chip also reports FIFO fill levels in the response. They are not
/// needed by the driver and are not read back.
#[derive(Debug, Clone)]
pub struct FifoInfo {
    /// FIFOs to reset
    pub reset: FifoReset,
}

impl Command for FifoInfo {
    type IdType = u8;
    type CommandParameters = FifoReset;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::FIFO_INFO
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.reset
    }
}

/// START_TX parameters
#[derive(Debug, Clone, Copy)]
pub struct TxParams {
    /// Channel number
    pub channel: u8,
    /// State entered automatically once the packet has been sent
    pub on_complete: RadioState,
    /// Number of bytes to send. Zero uses the length configured by the
    /// packet handler properties
    pub length: u16,
    /// Delay before starting, in bit periods
    pub delay: u8,
    /// Number of times to repeat the packet
    pub repeats: u8,
}

impl ToByteArray for TxParams {
    type Error = Infallible;
    type Array = [u8; 6];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let length = self.length.to_be_bytes();
        Ok([
            self.channel,
            self.on_complete.bits() << 4,
            length[0],
            length[1],
            self.delay,
            self.repeats,
        ])
    }
}

/// START_TX command (0x31)
///
/// Transmits the contents of the TX FIFO.
///
/// # Important Notes
/// - The FIFO must be loaded before the command is issued
/// - The PACKET_SENT interrupt is raised once the last bit is out
/// - The chip then moves to `on_complete` without host involvement
#[derive(Debug, Clone)]
pub struct StartTx {
    /// Transmit parameters
    pub params: TxParams,
}

impl Command for StartTx {
    type IdType = u8;
    type CommandParameters = TxParams;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::START_TX
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.params
    }
}

/// START_RX parameters
#[derive(Debug, Clone, Copy)]
pub struct RxParams {
    /// Channel number
    pub channel: u8,
    /// Number of bytes to receive. Zero uses the length configured by the
    /// packet handler properties
    pub length: u16,
    /// State entered when the preamble detection timeout expires
    pub on_timeout: RadioState,
    /// State entered after a valid packet
    pub on_valid: RadioState,
    /// State entered after a packet fails CRC
    pub on_invalid: RadioState,
}

impl ToByteArray for RxParams {
    type Error = Infallible;
    type Array = [u8; 7];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let length = self.length.to_be_bytes();
        Ok([
            self.channel,
            0,
            length[0],
            length[1],
            self.on_timeout.bits(),
            self.on_valid.bits(),
            self.on_invalid.bits(),
        ])
    }
}

/// START_RX command (0x32)
///
/// Enters receive mode on the given channel.
///
/// # Important Notes
/// - The RX FIFO should be cleared first
/// - The chip moves automatically to one of the three configured states
///   depending on how reception ends
#[derive(Debug, Clone)]
pub struct StartRx {
    /// Receive parameters
    pub params: RxParams,
}

impl Command for StartRx {
    type IdType = u8;
    type CommandParameters = RxParams;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::START_RX
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.params
    }
}

/// IRCAL parameters
#[derive(Debug, Clone, Copy)]
pub struct IrcalParams {
    /// Search step size configuration
    pub searching_step_size: u8,
    /// RSSI averaging configuration
    pub searching_rssi_avg: u8,
    /// RX chain setting 1
    pub rx_chain_setting1: u8,
    /// RX chain setting 2
    pub rx_chain_setting2: u8,
}

impl ToByteArray for IrcalParams {
    type Error = Infallible;
    type Array = [u8; 4];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([
            self.searching_step_size,
            self.searching_rssi_avg,
            self.rx_chain_setting1,
            self.rx_chain_setting2,
        ])
    }
}

/// IRCAL command (0x17)
///
/// Image rejection calibration.
///
/// # Important Notes
/// - Can take several seconds to complete
/// - The driver waits for completion without a timeout, since no bound
///   is safe for this command
/// - Normally issued from the configuration table
#[derive(Debug, Clone)]
pub struct Ircal {
    /// Calibration parameters
    pub params: IrcalParams,
}

impl Command for Ircal {
    type IdType = u8;
    type CommandParameters = IrcalParams;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::IRCAL
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.params
    }
}
