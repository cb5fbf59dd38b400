//! GPIO and ADC commands
//!
//! This module contains commands for:
//! - Configuring the function of the GPIO, nIRQ and SDO pins
//! - Reading the input level of GPIO0..3
//! - Running the auxiliary ADC on a GPIO pin, the supply voltage or the
//!   on-chip temperature sensor
//!
//! The Si446x has 4 general purpose pins plus nIRQ and SDO, which accept a
//! subset of the same functions. A pin given [`GpioMode::DO_NOTHING`] keeps
//! its current configuration.

use core::convert::Infallible;

use bitflags::bitflags;

use crate::commands::opcode;
use crate::{Command, FromByteArray, NoParameters, ToByteArray};

/// Configurable pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioPin {
    /// GPIO0
    Gpio0 = 0,
    /// GPIO1
    Gpio1 = 1,
    /// GPIO2
    Gpio2 = 2,
    /// GPIO3
    Gpio3 = 3,
    /// nIRQ
    Nirq = 4,
    /// SDO
    Sdo = 5,
}

/// Pin function
///
/// Not every function is available on nIRQ and SDO; see the chip's API
/// documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioMode(pub u8);

impl GpioMode {
    /// Leave the pin unchanged
    pub const DO_NOTHING: Self = Self(0x00);
    /// High impedance
    pub const TRISTATE: Self = Self(0x01);
    /// Drive low
    pub const DRIVE0: Self = Self(0x02);
    /// Drive high
    pub const DRIVE1: Self = Self(0x03);
    /// Input
    pub const INPUT: Self = Self(0x04);
    /// 32 kHz clock output
    pub const CLK_32K: Self = Self(0x05);
    /// Divided crystal clock output
    pub const DIV_CLK: Self = Self(0x07);
    /// Clear-to-send output
    pub const CTS: Self = Self(0x08);
    /// Serial data out
    pub const SDO: Self = Self(0x0B);
    /// Power-on reset output
    pub const POR: Self = Self(0x0C);
    /// Wake-up timer output
    pub const WUT: Self = Self(0x0E);
    /// PA enable
    pub const EN_PA: Self = Self(0x0F);
    /// LNA enable
    pub const EN_LNA: Self = Self(0x12);
    /// Antenna switch 1
    pub const ANTENNA_1_SW: Self = Self(0x16);
    /// Antenna switch 2
    pub const ANTENNA_2_SW: Self = Self(0x17);
    /// Sync word detected
    pub const SYNC_WORD_DETECT: Self = Self(0x1A);
    /// Asserted while in TX
    pub const TX_STATE: Self = Self(0x20);
    /// Asserted while in RX
    pub const RX_STATE: Self = Self(0x21);
    /// Low battery
    pub const LOW_BATT: Self = Self(0x24);
    /// nIRQ function (nIRQ pin only)
    pub const NIRQ: Self = Self(0x27);
}

/// Output drive strength, shared by all pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveStrength {
    /// Strongest drive
    High = 0x00,
    /// Medium-high drive
    MediumHigh = 0x20,
    /// Medium-low drive
    MediumLow = 0x40,
    /// Weakest drive
    Low = 0x60,
}

/// GPIO_PIN_CFG parameters
#[derive(Debug, Clone, Copy)]
pub struct GpioConfig {
    /// Function of GPIO0..3, nIRQ and SDO, in [`GpioPin`] order
    pub modes: [GpioMode; 6],
    /// Drive strength for every output
    pub drive: DriveStrength,
}

impl GpioConfig {
    /// Configuration that changes `pin` and leaves every other pin alone
    pub fn single(pin: GpioPin, mode: GpioMode) -> Self {
        let mut modes = [GpioMode::DO_NOTHING; 6];
        modes[pin as usize] = mode;
        Self {
            modes,
            drive: DriveStrength::High,
        }
    }
}

impl ToByteArray for GpioConfig {
    type Error = Infallible;
    type Array = [u8; 7];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut bytes = [0u8; 7];
        for (byte, mode) in bytes.iter_mut().zip(self.modes) {
            *byte = mode.0;
        }
        bytes[6] = self.drive as u8;
        Ok(bytes)
    }
}

/// GPIO_PIN_CFG command (0x13) in write form
#[derive(Debug, Clone)]
pub struct SetGpioPinCfg {
    /// Pin configuration
    pub config: GpioConfig,
}

impl Command for SetGpioPinCfg {
    type IdType = u8;
    type CommandParameters = GpioConfig;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::GPIO_PIN_CFG
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

bitflags! {
    /// Input levels of GPIO0..3
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GpioLevels: u8 {
        /// GPIO0 reads high
        const GPIO0 = 1 << 0;
        /// GPIO1 reads high
        const GPIO1 = 1 << 1;
        /// GPIO2 reads high
        const GPIO2 = 1 << 2;
        /// GPIO3 reads high
        const GPIO3 = 1 << 3;
    }
}

impl FromByteArray for GpioLevels {
    type Error = Infallible;
    type Array = [u8; 4];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        // Bit 7 of each pin's byte is its current level
        let levels = bytes
            .iter()
            .enumerate()
            .fold(0u8, |acc, (pin, byte)| acc | ((byte >> 7) << pin));
        Ok(Self::from_bits_truncate(levels))
    }
}

/// GPIO_PIN_CFG command (0x13) in read form
///
/// Sent without parameters, so no pin changes. Only the four GPIO bytes of
/// the response are read.
#[derive(Debug, Clone)]
pub struct GetGpioPinCfg;

impl Command for GetGpioPinCfg {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = GpioLevels;

    fn id() -> Self::IdType {
        opcode::GPIO_PIN_CFG
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// ADC input range for GPIO conversions, 3.6 V
pub const ADC_RANGE_3V6: u8 = 0x09;

/// Pins the ADC can sample. nIRQ and SDO have no ADC input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcPin {
    Gpio0 = 0,
    Gpio1 = 1,
    Gpio2 = 2,
    Gpio3 = 3,
}

/// Conversion to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcInput {
    /// Voltage on a GPIO pin
    Gpio(AdcPin),
    /// Supply voltage
    Battery,
    /// On-chip temperature sensor
    Temperature,
}

/// GET_ADC_READING parameters
#[derive(Debug, Clone, Copy)]
pub struct AdcParams {
    /// Conversion to run
    pub input: AdcInput,
    /// Speed, 0..=15. Lower values are slower and more accurate
    pub speed: u8,
}

impl ToByteArray for AdcParams {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let speed = (self.speed & 0x0F) << 4;
        Ok(match self.input {
            AdcInput::Gpio(pin) => [0x04 | pin as u8, speed | ADC_RANGE_3V6],
            AdcInput::Battery => [0x08, speed],
            AdcInput::Temperature => [0x10, speed],
        })
    }
}

/// GET_ADC_READING response
///
/// Only the field for the requested input holds a fresh conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcReading {
    /// Raw GPIO conversion
    pub gpio: u16,
    /// Raw supply voltage conversion
    pub battery: u16,
    /// Raw temperature conversion
    pub temperature: u16,
}

impl AdcReading {
    /// Supply voltage in mV
    pub fn battery_mv(&self) -> u16 {
        ((self.battery as u32 * 75) / 32) as u16
    }

    /// Temperature in °C
    pub fn temperature_celsius(&self) -> f32 {
        (899.0 / 4096.0) * self.temperature as f32 - 293.0
    }
}

impl FromByteArray for AdcReading {
    type Error = Infallible;
    type Array = [u8; 6];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            gpio: u16::from_be_bytes([bytes[0], bytes[1]]),
            battery: u16::from_be_bytes([bytes[2], bytes[3]]),
            temperature: u16::from_be_bytes([bytes[4], bytes[5]]),
        })
    }
}

/// GET_ADC_READING command (0x14)
///
/// # Important Notes
/// - The conversion runs before the response is ready, so slower speeds
///   hold off clear-to-send for longer
#[derive(Debug, Clone)]
pub struct GetAdcReading {
    /// Conversion parameters
    pub params: AdcParams,
}

impl Command for GetAdcReading {
    type IdType = u8;
    type CommandParameters = AdcParams;
    type ResponseParameters = AdcReading;

    fn id() -> Self::IdType {
        opcode::GET_ADC_READING
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.params
    }
}
