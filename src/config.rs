//! Driver configuration
//!
//! Everything the driver needs to know at construction time. The radio's own
//! configuration (frequency, modulation, packet format) comes from the
//! startup table generated by the vendor's configuration tool and is applied
//! verbatim during [`init`](crate::Si446x::init).

use crate::{Error, RadioState, Result};

/// Largest record in the startup table, excluding its length byte
pub const MAX_RECORD_LEN: usize = 16;

/// How radio events reach [`service`](crate::Si446x::service)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventMode {
    /// The application calls `service` from the nIRQ interrupt handler.
    /// The event line is unmasked at the end of `init`.
    Interrupt,
    /// The application calls `service` from a poll loop. The event line is
    /// never touched.
    Polled,
}

/// Driver configuration
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// State entered when idle and after a valid packet. Only
    /// [`RadioState::Ready`] and [`RadioState::SpiActive`] are sensible
    pub idle_state: RadioState,
    /// Fixed packet length, or `None` for variable length packets with a
    /// one byte length prefix. Must match the startup table
    pub fixed_length: Option<u8>,
    /// ADC conversion speed, 0..=15
    pub adc_speed: u8,
    /// Event delivery
    pub event_mode: EventMode,
    /// Mask all interrupts around each SPI exchange, for when other
    /// interrupt handlers use the same SPI bus
    pub shared_bus: bool,
    /// Number of clear-to-send polls before giving up on a command
    pub cts_retries: u32,
    /// Delay between clear-to-send polls, in µs
    pub cts_interval_us: u32,
    /// Startup table: `[len, bytes..]` records terminated by a zero length
    pub table: &'static [u8],
}

impl Config {
    /// Creates a configuration with default settings and the given startup
    /// table.
    pub const fn new(table: &'static [u8]) -> Self {
        Self {
            idle_state: RadioState::Ready,
            fixed_length: None,
            adc_speed: 10,
            event_mode: EventMode::Interrupt,
            shared_bus: true,
            cts_retries: 40_000,
            cts_interval_us: 10,
            table,
        }
    }

    pub const fn with_idle_state(mut self, idle_state: RadioState) -> Self {
        self.idle_state = idle_state;
        self
    }

    /// Fixed payload length, without a length byte. At most 128, longer
    /// lengths make [`Si446x::transmit`](crate::Si446x::transmit) fail.
    pub const fn with_fixed_length(mut self, length: u8) -> Self {
        self.fixed_length = Some(length);
        self
    }

    pub const fn with_adc_speed(mut self, speed: u8) -> Self {
        self.adc_speed = speed & 0x0F;
        self
    }

    pub const fn with_event_mode(mut self, mode: EventMode) -> Self {
        self.event_mode = mode;
        self
    }

    pub const fn with_shared_bus(mut self, shared: bool) -> Self {
        self.shared_bus = shared;
        self
    }

    /// Sets the clear-to-send wait. The worst case wait is roughly
    /// `retries * (interval_us + time per poll)`.
    pub const fn with_cts_timing(mut self, retries: u32, interval_us: u32) -> Self {
        self.cts_retries = retries;
        self.cts_interval_us = interval_us;
        self
    }

    /// Iterates over the commands in the startup table.
    pub fn records(&self) -> ConfigRecords<'static> {
        ConfigRecords { table: self.table }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Iterator over the commands of a startup table.
///
/// Stops at the zero length terminator or the end of the table. A record
/// longer than [`MAX_RECORD_LEN`] or running past the end of the table yields
/// [`Error::InvalidConfig`] and ends the iteration.
#[derive(Debug, Clone)]
pub struct ConfigRecords<'a> {
    table: &'a [u8],
}

impl<'a> ConfigRecords<'a> {
    pub fn new(table: &'a [u8]) -> Self {
        Self { table }
    }
}

impl<'a> Iterator for ConfigRecords<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&len, rest) = self.table.split_first()?;
        let len = len as usize;
        if len == 0 {
            self.table = &[];
            return None;
        }
        if len > MAX_RECORD_LEN || len > rest.len() {
            self.table = &[];
            return Some(Err(Error::InvalidConfig));
        }

        let (record, rest) = rest.split_at(len);
        self.table = rest;
        Some(Ok(record))
    }
}
