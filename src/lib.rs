#![no_std]
//! Si446x Radio Driver
//!
//! This crate provides a driver for the Silicon Labs Si4460/1/3/4 sub-GHz
//! packet radio transceivers. The Si446x are highly integrated, low power
//! transceivers for the 119-1050 MHz ISM bands, controlled through a
//! command-and-response API over SPI.
//!
//! # Features
//! - Frequency range: 119-1050 MHz
//! - Modulation support: (G)FSK, 4(G)FSK, OOK
//! - Output power up to +20 dBm (Si4463/4)
//! - 129 byte combined TX/RX FIFO
//! - Wake-up timer and low battery detector for duty-cycled operation
//! - Auxiliary ADC for GPIO voltage, supply voltage and temperature
//!
//! # Architecture
//! The driver is organized into several layers:
//!
//! - [`transport`]: byte-level SPI access with explicit chip-select brackets
//! - [`critical`]: nestable suppression of radio events and bus exclusion
//! - [`device`]: the command protocol
//!   - Clear-to-send polling with a bounded wait
//!   - Typed command execution
//!   - Property, fast response register and FIFO access
//!
//! - [`commands`]: Command definitions
//!   - [`commands::operational`]: state changes, TX/RX start, FIFO reset
//!   - [`commands::status`]: chip information and interrupt status
//!   - [`commands::gpio`]: GPIO configuration and ADC readings
//!
//!   Commands implement the `regiface` [`Command`], [`ToByteArray`] and
//!   [`FromByteArray`] traits, so parameters and responses are typed
//!
//! - [`properties`]: Property addresses and flags
//!   - [`properties::global`]: clocks, low battery detector, wake-up timer
//!   - [`properties::int_ctl`]: interrupt enables
//!   - [`properties::pkt`]: packet handler and PA
//!
//! - [`Si446x`]: the radio driver applications use, including event
//!   dispatch and the auxiliary features
//!
//! # Usage
//! The radio's RF configuration is not built by this crate. Generate a
//! startup table with the vendor's configuration tool (the `radio_config.h`
//! `RADIO_CONFIGURATION_DATA_ARRAY`) and pass it in [`Config`]. It must set
//! up fast response register A as latched RSSI and B as current state, and
//! the packet handler with a one byte length field followed by the payload
//! (or a fixed length matching [`Config::fixed_length`]).
//!
//! Operation follows this sequence:
//!
//! 1. Create the driver with a [`Transport`], delay, SDN pin and [`EventLine`]
//! 2. Call [`Si446x::init`] to reset and configure the radio
//! 3. Register event handlers with [`Si446x::handlers_mut`]
//! 4. Call [`Si446x::receive`] or [`Si446x::transmit`]
//! 5. Call [`Si446x::service`] when nIRQ goes low
//!
//! # Important Notes
//! - Any SPI access wakes a sleeping radio, so [`Si446x::state`] never
//!   reports [`RadioState::Sleep`]
//! - After a packet with a bad CRC the radio is sent to sleep and brought
//!   back by [`Si446x::service`]; call [`Si446x::receive`] again to resume
//! - IR calibration in the startup table can take seconds and is waited on
//!   without a timeout
//!
//! # Example
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::SpiBus;
//! use si446x::{Config, Event, EventKind, EventMode, NoEventLine, Si446x, SpiTransport};
//!
//! static RADIO_CONFIG: [u8; 1] = [0x00];
//!
//! fn on_packet(event: Event) {
//!     if let Event::RxComplete { length, rssi } = event {
//!         // Read `length` bytes with `Si446x::read` from the main loop
//!         let _ = (length, rssi);
//!     }
//! }
//!
//! fn run<SPI: SpiBus, NSS: OutputPin, SDN: OutputPin, D: DelayNs>(
//!     spi: SPI,
//!     nss: NSS,
//!     sdn: SDN,
//!     delay: D,
//! ) -> si446x::Result<()> {
//!     let config = Config::new(&RADIO_CONFIG).with_event_mode(EventMode::Polled);
//!     let mut radio = Si446x::new(SpiTransport::new(spi, nss), delay, sdn, NoEventLine, config);
//!     radio.init()?;
//!     radio.handlers_mut().set(EventKind::RxComplete, on_packet);
//!
//!     radio.receive(0)?;
//!     loop {
//!         radio.service()?;
//!     }
//! }
//! ```

#[macro_use]
mod fmt;

pub mod commands;
pub mod config;
pub mod critical;
pub mod device;
pub mod error;
pub mod events;
pub mod properties;
mod radio;
pub mod state;
pub mod transport;

pub use commands::*;
pub use regiface::{ByteArray, Command, FromByteArray, NoParameters, ToByteArray};
pub use config::{Config, EventMode};
pub use critical::{BusExclusion, EventGuard, EventLine, EventSuppression, NoEventLine};
pub use device::Device;
pub use error::{Error, Result};
pub use events::{Callbacks, EnabledInterrupts, Event, EventKind, Handler, Handlers};
pub use radio::{ChipInfo, Si446x, WutFlags, MAX_PACKET_LEN};
pub use state::RadioState;
pub use transport::{SpiTransport, Transport};
