//! High-level radio driver
//!
//! [`Si446x`] owns the [`Device`], the shutdown pin and the event line, and
//! provides the operations an application uses: receive, transmit, sleep,
//! telemetry and event dispatch.
//!
//! Every operation that issues chip commands runs with the event line
//! suppressed, so an event handler never observes a half-finished sequence
//! and never has its own commands interleaved with ours. Operations that fail
//! with [`Error::CommandTimeout`] also deliver [`Event::CommandTimeout`] to
//! its handler, once per operation.
//!
//! # Sharing with an interrupt handler
//! The driver is a single owned value. To call [`Si446x::service`] from the
//! nIRQ interrupt, place it in a `critical_section::Mutex<RefCell<..>>` and
//! implement [`EventLine`] by masking that interrupt. The suppression taken by
//! each operation then keeps the handler from running mid-sequence.

mod dispatch;
mod io;
mod wut;

pub use wut::WutFlags;

use core::ops::{Deref, DerefMut};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::commands::{
    FuncInfo, GetFuncInfo, GetModemStatus, GetPartInfo, KeepPending, PartInfo, RxParams, StartRx,
    StartTx, TxParams,
};
use crate::config::{Config, EventMode};
use crate::critical::{EventGuard, EventLine, EventSuppression};
use crate::device::Device;
use crate::events::{EnabledInterrupts, Event, Handlers};
use crate::properties::{
    ChipInterrupts, IntGroups, ModemInterrupts, PhInterrupts, GLOBAL_LOW_BATT_THRESH,
    INT_CTL_ENABLE, INT_CTL_PH_ENABLE, PA_PWR_LVL, PA_PWR_LVL_MAX, PKT_FIELD_2_LENGTH_7_0,
};
use crate::transport::Transport;
use crate::{Callbacks, Error, RadioState, Result};

/// Largest variable length payload
pub const MAX_PACKET_LEN: u8 = 128;

/// Time SDN is held high, then low, when resetting the chip, in ms
const RESET_PULSE_MS: u32 = 50;

/// Clears packet handler and modem interrupts, keeps chip interrupts
const KEEP_CHIP: KeepPending = KeepPending {
    ph: PhInterrupts::empty(),
    modem: ModemInterrupts::empty(),
    chip: ChipInterrupts::from_bits_retain(0xFF),
};

/// Part and firmware information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipInfo {
    pub part: PartInfo,
    pub firmware: FuncInfo,
}

/// Driver borrowed by [`Si446x::atomically`]. Ends the suppression when
/// dropped, including during unwinding.
struct Atomic<'a, T, D, SDN, L: EventLine>(&'a mut Si446x<T, D, SDN, L>);

impl<T, D, SDN, L: EventLine> Deref for Atomic<'_, T, D, SDN, L> {
    type Target = Si446x<T, D, SDN, L>;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<T, D, SDN, L: EventLine> DerefMut for Atomic<'_, T, D, SDN, L> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0
    }
}

impl<T, D, SDN, L: EventLine> Drop for Atomic<'_, T, D, SDN, L> {
    fn drop(&mut self) {
        self.0.events.exit();
    }
}

/// Si446x radio driver.
///
/// # Type Parameters
/// * `T` - SPI [`Transport`]
/// * `D` - delay provider
/// * `SDN` - shutdown pin
/// * `L` - [`EventLine`] for masking the nIRQ interrupt
pub struct Si446x<T, D, SDN, L> {
    device: Device<T, D>,
    sdn: SDN,
    events: EventSuppression<L>,
    enabled: EnabledInterrupts,
    handlers: Handlers,
    config: Config,
}

impl<T, D, SDN, L> Si446x<T, D, SDN, L>
where
    L: EventLine,
{
    /// Creates a new driver. Nothing is sent to the radio until
    /// [`init`](Self::init).
    pub fn new(transport: T, delay: D, sdn: SDN, line: L, config: Config) -> Self {
        Self {
            device: Device::new(transport, delay, &config),
            sdn,
            events: EventSuppression::new(line),
            enabled: EnabledInterrupts::default(),
            handlers: Handlers::new(),
            config,
        }
    }

    /// Releases the transport, delay provider, shutdown pin and event line.
    pub fn release(self) -> (T, D, SDN, L) {
        let (transport, delay) = self.device.release();
        (transport, delay, self.sdn, self.events.release())
    }

    /// Suppresses radio events until the returned guard is dropped.
    ///
    /// The guard borrows the driver, so this suits code that shares state
    /// with event handlers. To group driver calls, use
    /// [`atomically`](Self::atomically).
    pub fn suppress_events(&self) -> EventGuard<'_, L> {
        self.events.suppress()
    }

    /// Runs `f` with radio events suppressed throughout.
    ///
    /// Use this to make a sequence of driver calls atomic with respect to
    /// [`service`](Self::service), e.g. idling and reconfiguring before
    /// receiving again.
    pub fn atomically<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.events.enter();
        let mut scope = Atomic(self);
        f(&mut *scope)
    }

    pub fn handlers_mut(&mut self) -> &mut Handlers {
        &mut self.handlers
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Interrupts currently passed on to [`service`](Self::service)
    pub fn enabled_interrupts(&self) -> EnabledInterrupts {
        self.enabled
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direct access to the bus-level interface.
    ///
    /// Commands sent this way are not protected against radio events.
    pub fn device(&mut self) -> &mut Device<T, D> {
        &mut self.device
    }

    /// Delivers [`Event::CommandTimeout`] when `result` is a timeout.
    fn report<R>(&self, result: Result<R>) -> Result<R> {
        if let Err(Error::CommandTimeout) = result {
            self.handlers.emit(Event::CommandTimeout);
        }
        result
    }
}

impl<T, D, SDN, L> Si446x<T, D, SDN, L>
where
    T: Transport,
    D: DelayNs,
    SDN: OutputPin,
    L: EventLine,
{
    /// Runs `f` with radio events suppressed, then reports timeouts.
    fn suppressed<R>(
        &mut self,
        f: impl FnOnce(&mut Device<T, D>, &Config, &mut EnabledInterrupts) -> Result<R>,
    ) -> Result<R> {
        let result = {
            let _events = self.events.suppress();
            f(&mut self.device, &self.config, &mut self.enabled)
        };
        self.report(result)
    }

    /// Resets and configures the radio.
    ///
    /// Pulses SDN, sends the startup table, enables the received and invalid
    /// packet interrupts, clears anything pending and puts the radio to
    /// sleep. In [`EventMode::Interrupt`] the event line is then unmasked.
    ///
    /// # Errors
    /// * `Error::InvalidConfig` - the startup table is malformed
    /// * `Error::CommandTimeout` - the radio did not respond
    /// * `Error::Pin` - driving SDN failed
    pub fn init(&mut self) -> Result<()> {
        let result = {
            let _events = self.events.suppress();
            Self::startup(&mut self.device, &mut self.sdn, &self.config)
        };
        self.report(result)?;

        self.enabled = EnabledInterrupts::STARTUP;
        if self.config.event_mode == EventMode::Interrupt {
            self.events.arm();
        }
        debug!("radio initialised");
        Ok(())
    }

    fn startup(device: &mut Device<T, D>, sdn: &mut SDN, config: &Config) -> Result<()> {
        device.deselect()?;

        sdn.set_high().map_err(|_| Error::Pin)?;
        device.delay_ms(RESET_PULSE_MS);
        sdn.set_low().map_err(|_| Error::Pin)?;
        device.delay_ms(RESET_PULSE_MS);

        device.apply_config(config.table)?;

        let startup = EnabledInterrupts::STARTUP;
        device.set_properties(
            INT_CTL_ENABLE,
            &[
                IntGroups::all().bits(),
                startup.ph.bits(),
                startup.modem.bits(),
                startup.chip.bits(),
            ],
        )?;
        device.interrupt_status()?;
        device.change_state(RadioState::Sleep)
    }

    /// Reads part and firmware information.
    pub fn chip_info(&mut self) -> Result<ChipInfo> {
        self.suppressed(|device, _, _| {
            let part = device.execute_command(GetPartInfo)?;
            let firmware = device.execute_command(GetFuncInfo)?;
            Ok(ChipInfo { part, firmware })
        })
    }

    /// Current RSSI in dBm. Only meaningful while receiving.
    pub fn rssi(&mut self) -> Result<i16> {
        self.suppressed(|device, _, _| {
            let status = device.execute_command(GetModemStatus {
                keep: ModemInterrupts::from_bits_retain(0xFF),
            })?;
            Ok(crate::commands::rssi_dbm(status.current_rssi))
        })
    }

    /// Sets the PA output level, 0..=127. Larger values are clamped.
    pub fn set_tx_power(&mut self, level: u8) -> Result<()> {
        let level = level.min(PA_PWR_LVL_MAX);
        self.suppressed(|device, _, _| device.set_property(PA_PWR_LVL, level))
    }

    /// Enables or disables optional events.
    ///
    /// The chip's interrupt enables are read, modified and written back, and
    /// the in-memory copy used by [`service`](Self::service) is updated to
    /// match.
    pub fn configure_callbacks(&mut self, callbacks: Callbacks, enable: bool) -> Result<()> {
        self.suppressed(|device, _, enabled| {
            let mut data = [0u8; 2];
            device.get_properties(INT_CTL_PH_ENABLE, &mut data)?;

            let (ph, modem) = (callbacks.ph().bits(), callbacks.modem().bits());
            if enable {
                data[0] |= ph;
                data[1] |= modem;
            } else {
                data[0] &= !ph;
                data[1] &= !modem;
            }

            device.set_properties(INT_CTL_PH_ENABLE, &data)?;
            enabled.ph = PhInterrupts::from_bits_retain(data[0]);
            enabled.modem = ModemInterrupts::from_bits_retain(data[1]);
            Ok(())
        })
    }

    /// Reads a received payload from the RX FIFO.
    ///
    /// Call after [`Event::RxComplete`] with a buffer of the reported length.
    /// The length prefix has already been consumed.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<()> {
        self.suppressed(|device, _, _| device.read_rx_fifo(buffer))
    }

    /// Transmits `packet` on `channel`.
    ///
    /// The radio enters `on_complete` once the packet is out.
    /// [`Event::Sent`] is delivered if enabled through
    /// [`Callbacks::SENT`].
    ///
    /// # Errors
    /// * `Error::InvalidLength` - longer than 128 bytes, or shorter than the
    ///   configured fixed length, or the fixed length itself is above 128.
    ///   Nothing is sent
    /// * `Error::Busy` - a transmission is in progress. Nothing is written
    pub fn transmit(&mut self, packet: &[u8], channel: u8, on_complete: RadioState) -> Result<()> {
        let payload = match self.config.fixed_length {
            Some(length) if length > MAX_PACKET_LEN => return Err(Error::InvalidLength),
            Some(length) => packet
                .get(..length as usize)
                .ok_or(Error::InvalidLength)?,
            None if packet.len() > MAX_PACKET_LEN as usize => return Err(Error::InvalidLength),
            None => packet,
        };

        self.suppressed(|device, config, _| {
            if device.state()? == RadioState::Tx {
                debug!("transmit rejected, already transmitting");
                return Err(Error::Busy);
            }

            device.change_state(config.idle_state)?;
            device.clear_fifos()?;
            device.clear_interrupts(KEEP_CHIP)?;

            let length = payload.len() as u8;
            match config.fixed_length {
                Some(_) => device.write_tx_fifo(None, payload)?,
                None => {
                    device.write_tx_fifo(Some(length), payload)?;
                    device.set_property(PKT_FIELD_2_LENGTH_7_0, length)?;
                }
            }

            device.execute_command(StartTx {
                params: TxParams {
                    channel,
                    on_complete,
                    length: config.fixed_length.unwrap_or(0) as u16,
                    delay: 0,
                    repeats: 0,
                },
            })?;

            if config.fixed_length.is_none() {
                // Receive uses the same field as its maximum length
                device.set_property(PKT_FIELD_2_LENGTH_7_0, MAX_PACKET_LEN)?;
            }
            trace!("transmitting {} bytes on channel {}", length, channel);
            Ok(())
        })
    }

    /// Starts receiving on `channel`.
    ///
    /// After a valid packet the radio enters the configured idle state.
    /// After an invalid packet it always enters sleep: a CRC failure can
    /// leave the sync detector stuck, and the wake from sleep resets it.
    /// [`service`](Self::service) moves it back to ready when it handles the
    /// failure.
    pub fn receive(&mut self, channel: u8) -> Result<()> {
        self.suppressed(|device, config, _| {
            device.change_state(config.idle_state)?;
            device.clear_fifos()?;
            device.clear_interrupts(KEEP_CHIP)?;
            device.execute_command(StartRx {
                params: RxParams {
                    channel,
                    length: config.fixed_length.unwrap_or(0) as u16,
                    on_timeout: RadioState::NoChange,
                    on_valid: config.idle_state,
                    on_invalid: RadioState::Sleep,
                },
            })?;
            trace!("receiving on channel {}", channel);
            Ok(())
        })
    }

    /// Enters the configured idle state.
    pub fn idle(&mut self) -> Result<()> {
        self.suppressed(|device, config, _| device.change_state(config.idle_state))
    }

    /// Enters sleep. The next SPI access wakes the radio into SPI active.
    ///
    /// # Errors
    /// * `Error::Busy` - a transmission is in progress. The state is unchanged
    pub fn sleep(&mut self) -> Result<()> {
        self.suppressed(|device, _, _| {
            if device.state()? == RadioState::Tx {
                debug!("sleep rejected, transmitting");
                return Err(Error::Busy);
            }
            device.change_state(RadioState::Sleep)
        })
    }

    /// Current state, read live from the radio.
    pub fn state(&mut self) -> Result<RadioState> {
        self.suppressed(|device, _, _| device.state())
    }

    /// Sets the low battery threshold in mV, 1500..=3050. Values outside the
    /// range are clamped.
    ///
    /// The battery is only checked by the wake-up timer; see
    /// [`configure_wake_timer`](Self::configure_wake_timer).
    pub fn set_low_battery_threshold(&mut self, millivolts: u16) -> Result<()> {
        let threshold = (millivolts.clamp(1500, 3050) / 50 - 30) as u8;
        self.suppressed(|device, _, _| device.set_property(GLOBAL_LOW_BATT_THRESH, threshold))
    }
}
