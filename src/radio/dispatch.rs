//! Event dispatch
//!
//! Pending interrupts are read and cleared in one command, filtered through
//! the enabled set and turned into events in a fixed order:
//!
//! 1. sync detected: [`Event::RxBegin`]
//! 2. packet received: [`Event::RxComplete`]
//! 3. CRC error: [`Event::RxInvalid`]
//! 4. packet sent: [`Event::Sent`]
//! 5. low battery: [`Event::LowBattery`]
//! 6. wake-up timer: [`Event::WakeTimer`]

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::digital::Wait;

use super::Si446x;
use crate::commands::rssi_dbm;
use crate::config::Config;
use crate::critical::EventLine;
use crate::device::Device;
use crate::events::{EnabledInterrupts, Event, Handlers};
use crate::properties::{ChipInterrupts, ModemInterrupts, PhInterrupts};
use crate::transport::Transport;
use crate::{Error, RadioState, Result};

impl<T, D, SDN, L> Si446x<T, D, SDN, L>
where
    T: Transport,
    D: DelayNs,
    SDN: OutputPin,
    L: EventLine,
{
    /// Handles pending radio events.
    ///
    /// Call from the nIRQ interrupt handler, or regularly from a poll loop
    /// in [`EventMode::Polled`](crate::EventMode::Polled). Radio events stay
    /// suppressed for the whole call, including while handlers run.
    ///
    /// A received packet is left in the RX FIFO for [`read`](Self::read).
    ///
    /// # Errors
    /// * `Error::CommandTimeout` - the radio did not answer. If the interrupt
    ///   status could not be read nothing is dispatched. A failure after that
    ///   does not stop dispatch: every remaining event is still delivered and
    ///   the first error is returned
    pub fn service(&mut self) -> Result<()> {
        let _events = self.events.suppress();
        dispatch(&mut self.device, &self.config, &self.enabled, &self.handlers)
    }

    /// Waits for nIRQ to go low, then handles pending radio events.
    ///
    /// For async applications that hand the nIRQ pin to the driver instead of
    /// running [`service`](Self::service) from an interrupt handler.
    pub async fn service_on_event<W: Wait>(&mut self, irq: &mut W) -> Result<()> {
        irq.wait_for_low().await.map_err(|_| Error::Pin)?;
        self.service()
    }
}

/// First failure of a dispatch run.
///
/// Timeouts reach the [`Event::CommandTimeout`] handler once, when the first
/// one happens.
struct Failure<'a> {
    handlers: &'a Handlers,
    first: Option<Error>,
    timed_out: bool,
}

impl<'a> Failure<'a> {
    fn new(handlers: &'a Handlers) -> Self {
        Self {
            handlers,
            first: None,
            timed_out: false,
        }
    }

    fn check<R>(&mut self, result: Result<R>) -> Option<R> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                if err == Error::CommandTimeout && !self.timed_out {
                    self.timed_out = true;
                    self.handlers.emit(Event::CommandTimeout);
                }
                self.first.get_or_insert(err);
                None
            }
        }
    }

    /// Latched RSSI, or the bottom of the scale if it could not be read
    fn rssi<T: Transport, D: DelayNs>(&mut self, device: &mut Device<T, D>) -> i16 {
        self.check(device.latched_rssi()).unwrap_or_else(|| rssi_dbm(0))
    }

    fn into_result(self) -> Result<()> {
        match self.first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn dispatch<T, D>(
    device: &mut Device<T, D>,
    config: &Config,
    enabled: &EnabledInterrupts,
    handlers: &Handlers,
) -> Result<()>
where
    T: Transport,
    D: DelayNs,
{
    let mut failure = Failure::new(handlers);
    let Some(status) = failure.check(device.interrupt_status()) else {
        return failure.into_result();
    };

    let ph = status.ph_pending & enabled.ph;
    let modem = status.modem_pending & enabled.modem;
    let chip = status.chip_pending & enabled.chip;
    trace!(
        "pending ph={:#x} modem={:#x} chip={:#x}",
        ph.bits(),
        modem.bits(),
        chip.bits()
    );

    // Everything below has already been cleared on the chip, so a failing
    // command must not keep later events from being delivered

    if modem.contains(ModemInterrupts::SYNC_DETECT) {
        let rssi = failure.rssi(device);
        handlers.emit(Event::RxBegin { rssi });
    }

    if ph.contains(PhInterrupts::PACKET_RX) {
        let length = match config.fixed_length {
            Some(length) => Some(length),
            None => {
                let mut length = [0u8];
                failure
                    .check(device.read_rx_fifo(&mut length))
                    .map(|()| length[0])
            }
        };
        match length {
            Some(length) => {
                let rssi = failure.rssi(device);
                handlers.emit(Event::RxComplete { length, rssi });
            }
            None => warn!("received packet dropped, length unreadable"),
        }
    }

    if ph.contains(PhInterrupts::CRC_ERROR) {
        // Invalid packets send the radio to sleep, which the status read
        // above has already turned into SPI active
        if config.idle_state == RadioState::Ready
            && failure.check(device.state()) == Some(RadioState::SpiActive)
        {
            failure.check(device.change_state(RadioState::Ready));
        }
        let rssi = failure.rssi(device);
        handlers.emit(Event::RxInvalid { rssi });
    }

    if ph.contains(PhInterrupts::PACKET_SENT) {
        handlers.emit(Event::Sent);
    }

    if chip.contains(ChipInterrupts::LOW_BATT) {
        handlers.emit(Event::LowBattery);
    }

    if chip.contains(ChipInterrupts::WUT) {
        handlers.emit(Event::WakeTimer);
    }

    failure.into_result()
}
