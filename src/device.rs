//! Si446x Command Interface
//!
//! This module provides the bus-level interface to the radio: command
//! framing, the clear-to-send handshake, property access, fast response
//! registers and FIFO access.
//!
//! The interface is built around the `Device<T, D>` struct which wraps a
//! [`Transport`] and a delay provider and provides methods for:
//! - Executing typed radio commands
//! - Sending raw command bytes, as found in the startup table
//! - Reading and writing properties in runs
//! - Reading fast response registers
//! - Writing the TX FIFO and reading the RX FIFO
//!
//! Every SPI exchange runs under [`BusExclusion`]. `Device` knows nothing
//! about the event line; sequencing multiple commands atomically with
//! respect to radio events is the job of [`Si446x`](crate::Si446x).
//!
//! # Example
//! ```no_run
//! use si446x::{commands::GetPartInfo, Config, Device, SpiTransport};
//! # fn demo<SPI, NSS, D>(spi: SPI, nss: NSS, delay: D) -> si446x::Result<()>
//! # where
//! #     SPI: embedded_hal::spi::SpiBus,
//! #     NSS: embedded_hal::digital::OutputPin,
//! #     D: embedded_hal::delay::DelayNs,
//! # {
//! let mut device = Device::new(SpiTransport::new(spi, nss), delay, &Config::default());
//!
//! let info = device.execute_command(GetPartInfo)?;
//! assert_eq!(info.part, 0x4463);
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

use regiface::{errors::Error as RegifaceError, ByteArray, Command, FromByteArray, ToByteArray};

use crate::commands::{
    opcode, ChangeState, ClearInterrupts, FastResponseRegister, FifoInfo, FifoReset, GetIntStatus,
    InterruptStatus, KeepPending, CTS_READY,
};
use crate::config::Config;
use crate::critical::BusExclusion;
use crate::properties::Property;
use crate::state::RadioState;
use crate::transport::Transport;
use crate::{Error, Result};

/// Largest number of properties written by one SET_PROPERTY
pub const MAX_SET_PROPERTIES: usize = 12;

/// Largest number of properties read by one GET_PROPERTY
pub const MAX_GET_PROPERTIES: usize = 16;

/// Largest command including its opcode
const MAX_REQUEST_LEN: usize = 4 + MAX_SET_PROPERTIES;

/// Bus-level interface to the Si446x radio.
///
/// Wraps a [`Transport`] and a delay provider used while waiting for
/// clear-to-send.
pub struct Device<T, D> {
    transport: T,
    delay: D,
    bus: BusExclusion,
    cts_retries: u32,
    cts_interval_us: u32,
}

impl<T, D> Device<T, D> {
    /// Creates a new Device from a transport and delay provider.
    ///
    /// Only the bus sharing and clear-to-send timing settings of `config`
    /// are used.
    pub fn new(transport: T, delay: D, config: &Config) -> Self {
        Self {
            transport,
            delay,
            bus: BusExclusion::new(config.shared_bus),
            cts_retries: config.cts_retries,
            cts_interval_us: config.cts_interval_us,
        }
    }

    /// Releases the underlying transport and delay provider.
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }

    /// Bus exclusion level used around every exchange
    pub fn bus(&self) -> &BusExclusion {
        &self.bus
    }
}

impl<T, D> Device<T, D>
where
    T: Transport,
    D: DelayNs,
{
    /// Runs `f` inside one chip-select bracket under bus exclusion.
    ///
    /// Chip select is released even when `f` fails.
    fn exchange<R>(&mut self, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let _bus = self.bus.exclusive();
        self.transport.select()?;
        let result = f(&mut self.transport);
        let deselected = self.transport.deselect();
        let value = result?;
        deselected?;
        Ok(value)
    }

    /// Releases chip select outside of any exchange.
    pub fn deselect(&mut self) -> Result<()> {
        let _bus = self.bus.exclusive();
        self.transport.deselect()
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    pub fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    /// Polls clear-to-send once.
    ///
    /// Returns `true` when the radio is ready, in which case `response` has
    /// been filled from the command buffer in the same exchange.
    pub fn poll_clear_to_send(&mut self, response: &mut [u8]) -> Result<bool> {
        self.exchange(|transport| {
            transport.transfer_byte(opcode::READ_CMD_BUFF)?;
            if transport.transfer_byte(0xFF)? != CTS_READY {
                return Ok(false);
            }
            transport.read_bytes(response)?;
            Ok(true)
        })
    }

    /// Polls clear-to-send until the radio is ready, then fills `response`.
    ///
    /// When `bounded` is false this waits forever.
    ///
    /// # Errors
    /// * `Error::CommandTimeout` - not ready after the configured number of polls
    pub fn wait_for_response(&mut self, response: &mut [u8], bounded: bool) -> Result<()> {
        let mut remaining = self.cts_retries;
        loop {
            if self.poll_clear_to_send(response)? {
                return Ok(());
            }
            self.delay.delay_us(self.cts_interval_us);

            if bounded {
                remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    warn!("no clear-to-send after {} polls", self.cts_retries);
                    return Err(Error::CommandTimeout);
                }
            }
        }
    }

    fn transact(&mut self, request: &[u8], response: &mut [u8]) -> Result<()> {
        self.wait_for_response(&mut [], true)?;
        self.exchange(|transport| transport.write_bytes(request))?;

        if request.first() == Some(&opcode::IRCAL) {
            // Calibration can take seconds
            self.wait_for_response(&mut [], false)
        } else if !response.is_empty() {
            self.wait_for_response(response, true)
        } else {
            Ok(())
        }
    }

    /// Sends a raw command, `[opcode, args..]`.
    ///
    /// Waits for clear-to-send first. An IRCAL command is additionally waited
    /// on until it completes, without a timeout.
    ///
    /// # Errors
    /// * `Error::CommandTimeout` - the radio did not become ready
    /// * `Error::Bus` / `Error::Pin` - SPI communication failed
    pub fn send_command(&mut self, request: &[u8]) -> Result<()> {
        self.transact(request, &mut [])
    }

    /// Sends a raw command and reads its response into `response`.
    pub fn send_command_with_response(&mut self, request: &[u8], response: &mut [u8]) -> Result<()> {
        self.transact(request, response)
    }

    /// Executes a typed command on the device.
    ///
    /// # Type Parameters
    /// * `C` - Command type implementing the Command trait with u8 ID
    ///
    /// # Errors
    /// * `Error::InvalidLength` - the parameters do not fit in one command
    /// * `Error::InvalidResponse` - the response could not be decoded
    /// * `Error::CommandTimeout` - the radio did not become ready
    pub fn execute_command<C>(&mut self, command: C) -> Result<C::ResponseParameters>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
    {
        let params = match command.invoking_parameters().to_bytes() {
            Ok(params) => params,
            Err(never) => match never {},
        };
        let params = params.as_ref();
        if params.len() >= MAX_REQUEST_LEN {
            return Err(Error::InvalidLength);
        }

        let mut request = [0u8; MAX_REQUEST_LEN];
        request[0] = C::id();
        request[1..=params.len()].copy_from_slice(params);

        let mut raw_response = <C::ResponseParameters as FromByteArray>::Array::new();
        self.transact(&request[..=params.len()], raw_response.as_mut())?;

        C::ResponseParameters::from_bytes(raw_response)
            .map_err(|_| RegifaceError::DeserializationError.into())
    }

    /// Writes a run of consecutive properties starting at `property`.
    ///
    /// Runs longer than 12 are split over several commands.
    pub fn set_properties(&mut self, property: Property, values: &[u8]) -> Result<()> {
        let mut property = property;
        for chunk in values.chunks(MAX_SET_PROPERTIES) {
            let mut request = [0u8; MAX_REQUEST_LEN];
            request[..4].copy_from_slice(&[
                opcode::SET_PROPERTY,
                property.group(),
                chunk.len() as u8,
                property.index(),
            ]);
            request[4..4 + chunk.len()].copy_from_slice(chunk);
            self.send_command(&request[..4 + chunk.len()])?;
            property = property.offset(chunk.len() as u8);
        }
        Ok(())
    }

    /// Reads a run of consecutive properties starting at `property`.
    ///
    /// Runs longer than 16 are split over several commands.
    pub fn get_properties(&mut self, property: Property, values: &mut [u8]) -> Result<()> {
        let mut property = property;
        for chunk in values.chunks_mut(MAX_GET_PROPERTIES) {
            let count = chunk.len() as u8;
            let request = [opcode::GET_PROPERTY, property.group(), count, property.index()];
            self.send_command_with_response(&request, chunk)?;
            property = property.offset(count);
        }
        Ok(())
    }

    pub fn set_property(&mut self, property: Property, value: u8) -> Result<()> {
        self.set_properties(property, &[value])
    }

    pub fn get_property(&mut self, property: Property) -> Result<u8> {
        let mut value = [0u8];
        self.get_properties(property, &mut value)?;
        Ok(value[0])
    }

    /// Reads a fast response register.
    ///
    /// No clear-to-send handshake is involved, so this is safe to call while
    /// a command is still executing.
    pub fn read_fast_response(&mut self, register: FastResponseRegister) -> Result<u8> {
        self.exchange(|transport| {
            transport.transfer_byte(register.opcode())?;
            transport.transfer_byte(0xFF)
        })
    }

    /// Loads the TX FIFO with an optional length byte followed by `data`.
    pub fn write_tx_fifo(&mut self, length: Option<u8>, data: &[u8]) -> Result<()> {
        self.exchange(|transport| {
            transport.transfer_byte(opcode::WRITE_TX_FIFO)?;
            if let Some(length) = length {
                transport.transfer_byte(length)?;
            }
            transport.write_bytes(data)
        })
    }

    /// Reads `data.len()` bytes from the RX FIFO.
    pub fn read_rx_fifo(&mut self, data: &mut [u8]) -> Result<()> {
        self.exchange(|transport| {
            transport.transfer_byte(opcode::READ_RX_FIFO)?;
            transport.read_bytes(data)
        })
    }

    /// Current state, read from fast response register B.
    ///
    /// # Errors
    /// * `Error::InvalidResponse` - the register holds an unknown state
    pub fn state(&mut self) -> Result<RadioState> {
        let raw = self.read_fast_response(FastResponseRegister::STATE)?;
        RadioState::from_reported(raw).ok_or(Error::InvalidResponse)
    }

    /// RSSI latched at the last sync detection, in dBm.
    pub fn latched_rssi(&mut self) -> Result<i16> {
        let raw = self.read_fast_response(FastResponseRegister::LATCHED_RSSI)?;
        Ok(crate::commands::rssi_dbm(raw))
    }

    pub fn change_state(&mut self, state: RadioState) -> Result<()> {
        self.execute_command(ChangeState { state })?;
        Ok(())
    }

    /// Resets both FIFOs.
    pub fn clear_fifos(&mut self) -> Result<()> {
        self.execute_command(FifoInfo {
            reset: FifoReset::RX | FifoReset::TX,
        })?;
        Ok(())
    }

    /// Reads and clears every pending interrupt.
    pub fn interrupt_status(&mut self) -> Result<InterruptStatus> {
        self.execute_command(GetIntStatus)
    }

    /// Clears pending interrupts except those in `keep`.
    pub fn clear_interrupts(&mut self, keep: KeepPending) -> Result<()> {
        self.execute_command(ClearInterrupts { keep })?;
        Ok(())
    }

    /// Sends every command of a startup table in order.
    ///
    /// # Errors
    /// * `Error::InvalidConfig` - a record is malformed. Records before it
    ///   have already been sent
    pub fn apply_config(&mut self, table: &[u8]) -> Result<()> {
        for record in crate::config::ConfigRecords::new(table) {
            self.send_command(record?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    use super::*;
    use crate::commands::GetPartInfo;
    use crate::transport::SpiTransport;

    /// SPI and NSS transactions for one chip-select bracket
    fn bracket(
        spi: &mut Vec<SpiTransaction<u8>>,
        nss: &mut Vec<PinTransaction>,
        exchange: &[(u8, u8)],
    ) {
        nss.push(PinTransaction::set(State::Low));
        for &(out, back) in exchange {
            spi.push(SpiTransaction::transfer_in_place(vec![out], vec![back]));
        }
        spi.push(SpiTransaction::flush());
        nss.push(PinTransaction::set(State::High));
    }

    fn device(
        spi: &[SpiTransaction<u8>],
        nss: &[PinTransaction],
        config: &Config,
    ) -> Device<SpiTransport<SpiMock<u8>, PinMock>, NoopDelay> {
        Device::new(
            SpiTransport::new(SpiMock::new(spi), PinMock::new(nss)),
            NoopDelay::new(),
            config,
        )
    }

    fn finish(device: Device<SpiTransport<SpiMock<u8>, PinMock>, NoopDelay>) {
        let (transport, _) = device.release();
        let (mut spi, mut nss) = transport.release();
        spi.done();
        nss.done();
    }

    #[test]
    fn part_info_waits_for_cts_twice() {
        let (mut spi, mut nss) = (Vec::new(), Vec::new());
        // Ready for the command
        bracket(&mut spi, &mut nss, &[(0x44, 0x00), (0xFF, 0xFF)]);
        bracket(&mut spi, &mut nss, &[(0x01, 0x00)]);
        // Busy once, then the response follows clear-to-send
        bracket(&mut spi, &mut nss, &[(0x44, 0x00), (0xFF, 0x00)]);
        let response = [0x11, 0x44, 0x63, 0x00, 0x86, 0x00, 0x00, 0x06];
        let mut exchange = vec![(0x44, 0x00), (0xFF, 0xFF)];
        exchange.extend(response.iter().map(|&byte| (0xFF, byte)));
        bracket(&mut spi, &mut nss, &exchange);

        let mut device = device(&spi, &nss, &Config::default());
        let info = device.execute_command(GetPartInfo).unwrap();
        assert_eq!(info.part, 0x4463);
        assert_eq!(info.rom_id, 6);
        finish(device);
    }

    #[test]
    fn bounded_wait_times_out() {
        let (mut spi, mut nss) = (Vec::new(), Vec::new());
        for _ in 0..3 {
            bracket(&mut spi, &mut nss, &[(0x44, 0x00), (0xFF, 0x00)]);
        }

        let config = Config::default().with_cts_timing(3, 10);
        let mut device = device(&spi, &nss, &config);
        assert_eq!(
            device.change_state(RadioState::Ready),
            Err(Error::CommandTimeout)
        );
        finish(device);
    }

    #[test]
    fn ircal_waits_past_retry_limit() {
        let (mut spi, mut nss) = (Vec::new(), Vec::new());
        bracket(&mut spi, &mut nss, &[(0x44, 0x00), (0xFF, 0xFF)]);
        bracket(
            &mut spi,
            &mut nss,
            &[(0x17, 0x00), (0x56, 0x00), (0x10, 0x00), (0xCA, 0x00), (0xF0, 0x00)],
        );
        for _ in 0..5 {
            bracket(&mut spi, &mut nss, &[(0x44, 0x00), (0xFF, 0x00)]);
        }
        bracket(&mut spi, &mut nss, &[(0x44, 0x00), (0xFF, 0xFF)]);

        let config = Config::default().with_cts_timing(2, 10);
        let mut device = device(&spi, &nss, &config);
        device
            .send_command(&[0x17, 0x56, 0x10, 0xCA, 0xF0])
            .unwrap();
        finish(device);
    }

    #[test]
    fn fast_response_skips_handshake() {
        let (mut spi, mut nss) = (Vec::new(), Vec::new());
        bracket(&mut spi, &mut nss, &[(0x51, 0x00), (0xFF, 0x06)]);

        let mut device = device(&spi, &nss, &Config::default().with_shared_bus(false));
        assert_eq!(device.state().unwrap(), RadioState::Rx);
        finish(device);
    }

    #[test]
    fn unknown_state_is_an_error() {
        let (mut spi, mut nss) = (Vec::new(), Vec::new());
        bracket(&mut spi, &mut nss, &[(0x51, 0x00), (0xFF, 0x0C)]);

        let mut device = device(&spi, &nss, &Config::default());
        assert_eq!(device.state(), Err(Error::InvalidResponse));
        finish(device);
    }

    #[test]
    fn tx_fifo_carries_length_prefix() {
        let (mut spi, mut nss) = (Vec::new(), Vec::new());
        bracket(
            &mut spi,
            &mut nss,
            &[(0x66, 0x00), (0x02, 0x00), (0xAB, 0x00), (0xCD, 0x00)],
        );

        let mut device = device(&spi, &nss, &Config::default());
        device.write_tx_fifo(Some(2), &[0xAB, 0xCD]).unwrap();
        finish(device);
    }

    /// Response type that never decodes
    struct Garbled;

    impl FromByteArray for Garbled {
        type Error = ();
        type Array = [u8; 1];

        fn from_bytes(_bytes: Self::Array) -> core::result::Result<Self, Self::Error> {
            Err(())
        }
    }

    struct GetGarbled;

    impl Command for GetGarbled {
        type IdType = u8;
        type CommandParameters = crate::NoParameters;
        type ResponseParameters = Garbled;

        fn id() -> Self::IdType {
            0x01
        }

        fn invoking_parameters(self) -> Self::CommandParameters {
            crate::NoParameters::default()
        }
    }

    #[test]
    fn undecodable_response_is_invalid() {
        let (mut spi, mut nss) = (Vec::new(), Vec::new());
        bracket(&mut spi, &mut nss, &[(0x44, 0x00), (0xFF, 0xFF)]);
        bracket(&mut spi, &mut nss, &[(0x01, 0x00)]);
        bracket(&mut spi, &mut nss, &[(0x44, 0x00), (0xFF, 0xFF), (0xFF, 0x42)]);

        let mut device = device(&spi, &nss, &Config::default());
        assert!(matches!(
            device.execute_command(GetGarbled),
            Err(Error::InvalidResponse)
        ));
        finish(device);
    }
}
