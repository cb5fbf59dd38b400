//! Radio command implementations
//!
//! This module contains the Si446x API commands the driver issues, grouped by
//! function:
//!
//! - operational: state changes, TX/RX start, FIFO reset and image rejection
//!   calibration
//! - status: part/firmware information, interrupt and modem status, fast
//!   response registers
//! - gpio: GPIO pin configuration and ADC readings
//!
//! # Command Execution
//! Every command goes through the same handshake:
//!
//! 1. Poll `READ_CMD_BUFF` until the clear-to-send byte reads `0xFF`
//! 2. Send the command byte and its parameters in one chip-select bracket
//! 3. If the command returns data, poll `READ_CMD_BUFF` again; once
//!    clear-to-send is `0xFF` the response bytes follow in the same bracket
//!
//! The chip has a single command buffer. Sending a new command before the
//! previous one has completed corrupts both, which is why step 1 is never
//! skipped.
//!
//! Property access (`SET_PROPERTY`/`GET_PROPERTY`) and FIFO access carry
//! variable-length payloads and are issued directly by
//! [`Device`](crate::Device) rather than through a typed command.

mod gpio;
mod operational;
mod status;

pub use gpio::*;
pub use operational::*;
pub use status::*;

/// Raw opcodes of the Si446x API
pub mod opcode {
    /// Read part information
    pub const PART_INFO: u8 = 0x01;
    /// Boot the chip (issued from the configuration table)
    pub const POWER_UP: u8 = 0x02;
    /// Read firmware information
    pub const FUNC_INFO: u8 = 0x10;
    /// Write up to 12 properties
    pub const SET_PROPERTY: u8 = 0x11;
    /// Read up to 16 properties
    pub const GET_PROPERTY: u8 = 0x12;
    /// Configure GPIO pins
    pub const GPIO_PIN_CFG: u8 = 0x13;
    /// Perform an ADC conversion
    pub const GET_ADC_READING: u8 = 0x14;
    /// Read FIFO counts and optionally reset the FIFOs
    pub const FIFO_INFO: u8 = 0x15;
    /// Image rejection calibration
    pub const IRCAL: u8 = 0x17;
    /// Read and clear all pending interrupts
    pub const GET_INT_STATUS: u8 = 0x20;
    /// Read and clear modem interrupts
    pub const GET_MODEM_STATUS: u8 = 0x22;
    /// Enter TX state
    pub const START_TX: u8 = 0x31;
    /// Enter RX state
    pub const START_RX: u8 = 0x32;
    /// Manually switch the chip state
    pub const CHANGE_STATE: u8 = 0x34;
    /// Read clear-to-send and the command response
    pub const READ_CMD_BUFF: u8 = 0x44;
    /// Read fast response register A
    pub const FRR_A_READ: u8 = 0x50;
    /// Read fast response register B
    pub const FRR_B_READ: u8 = 0x51;
    /// Read fast response register C
    pub const FRR_C_READ: u8 = 0x53;
    /// Read fast response register D
    pub const FRR_D_READ: u8 = 0x57;
    /// Write the TX FIFO
    pub const WRITE_TX_FIFO: u8 = 0x66;
    /// Read the RX FIFO
    pub const READ_RX_FIFO: u8 = 0x77;
}

/// Value of the clear-to-send byte once the chip is ready
pub const CTS_READY: u8 = 0xFF;
