//! Simulated Si446x for integration tests
//!
//! Implements just enough of the command API to exercise the driver: the
//! clear-to-send handshake, properties, fast response registers, FIFOs,
//! interrupt status and state changes. Every chip-select bracket is logged.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal_mock::eh1::delay::NoopDelay;
use si446x::{Config, Event, EventLine, EventMode, Result, Si446x, Transport};

pub const SLEEP: u8 = 1;
pub const SPI_ACTIVE: u8 = 2;
pub const READY: u8 = 3;
pub const TX: u8 = 7;
pub const RX: u8 = 8;

/// Startup table used by most tests: a POWER_UP and one property write
pub static TABLE: [u8; 14] = [
    0x07, 0x02, 0x01, 0x00, 0x01, 0xC9, 0xC3, 0x80, // POWER_UP
    0x05, 0x11, 0x00, 0x01, 0x00, 0x52, // GLOBAL_XO_TUNE
];

#[derive(Default)]
pub struct Chip {
    /// MOSI bytes of every completed chip-select bracket
    pub frames: Vec<Vec<u8>>,
    /// Whether the event line was masked when each command frame completed
    pub masked_at_command: Vec<bool>,
    pub properties: HashMap<u16, u8>,
    pub state: u8,
    pub latched_rssi: u8,
    pub current_rssi: u8,
    /// `[ph, modem, chip]` pending interrupts
    pub pending: [u8; 3],
    pub rx_fifo: VecDeque<u8>,
    pub tx_fifo: Vec<u8>,
    pub adc: [u8; 6],
    pub gpio: [u8; 4],
    /// Upcoming clear-to-send polls that report busy
    pub busy_polls: u32,
    pub never_ready: bool,
    /// Ready clear-to-send polls left before the chip stops answering
    pub stall_after: Option<u32>,
    pub sdn_levels: Vec<bool>,
    pub line_masked: bool,
    response: Vec<u8>,
    current: Vec<u8>,
    cts_ok: bool,
}

impl Chip {
    /// Frames that are commands or FIFO writes, excluding clear-to-send
    /// polls, fast response reads and RX FIFO reads
    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.frames
            .iter()
            .filter(|frame| is_command(frame))
            .cloned()
            .collect()
    }

    /// Command frames starting with `opcode`
    pub fn commands_with(&self, opcode: u8) -> Vec<Vec<u8>> {
        self.commands()
            .into_iter()
            .filter(|frame| frame[0] == opcode)
            .collect()
    }

    pub fn property(&self, address: u16) -> u8 {
        self.properties.get(&address).copied().unwrap_or(0)
    }

    pub fn clear_log(&mut self) {
        self.frames.clear();
        self.masked_at_command.clear();
    }

    fn cts(&mut self) -> u8 {
        if let Some(remaining) = self.stall_after.as_mut() {
            if *remaining == 0 {
                return 0x00;
            }
            *remaining -= 1;
        }
        if self.never_ready {
            0x00
        } else if self.busy_polls > 0 {
            self.busy_polls -= 1;
            0x00
        } else {
            0xFF
        }
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        self.current.push(byte);
        let index = self.current.len() - 1;
        match self.current[0] {
            0x44 if index == 1 => {
                let cts = self.cts();
                self.cts_ok = cts == 0xFF;
                cts
            }
            0x44 if index >= 2 && self.cts_ok => {
                self.response.get(index - 2).copied().unwrap_or(0)
            }
            0x50 if index == 1 => self.latched_rssi,
            0x51 if index == 1 => self.state,
            0x77 if index >= 1 => self.rx_fifo.pop_front().unwrap_or(0),
            _ => 0,
        }
    }

    fn execute(&mut self, frame: &[u8]) {
        let args = &frame[1..];
        match frame[0] {
            0x01 => self.response = vec![0x11, 0x44, 0x63, 0x00, 0x86, 0x00, 0x00, 0x06],
            0x10 => self.response = vec![0x06, 0x00, 0x03, 0x00, 0x00, 0x01],
            0x11 => {
                let (group, count, index) = (args[0] as u16, args[1] as usize, args[2]);
                for (offset, &value) in args[3..3 + count].iter().enumerate() {
                    let address = group << 8 | index.wrapping_add(offset as u8) as u16;
                    self.properties.insert(address, value);
                }
            }
            0x12 => {
                let (group, count, index) = (args[0] as u16, args[1], args[2]);
                let values: Vec<u8> = (0..count)
                    .map(|offset| self.property(group << 8 | index.wrapping_add(offset) as u16))
                    .collect();
                self.response = values;
            }
            0x13 if args.is_empty() => self.response = self.gpio.to_vec(),
            0x14 => self.response = self.adc.to_vec(),
            0x15 => {
                self.rx_fifo.clear();
                self.tx_fifo.clear();
            }
            0x20 => {
                let [ph, modem, chip] = self.pending;
                self.response = vec![0, 0, ph, 0, modem, 0, chip, 0];
                if args.is_empty() {
                    self.pending = [0; 3];
                } else {
                    for (pending, keep) in self.pending.iter_mut().zip(args) {
                        *pending &= keep;
                    }
                }
            }
            0x22 => self.response = vec![0, 0, self.current_rssi],
            0x31 => self.state = TX,
            0x32 => self.state = RX,
            0x34 => self.state = args[0],
            0x66 => self.tx_fifo.extend_from_slice(args),
            _ => {}
        }
    }
}

fn is_command(frame: &[u8]) -> bool {
    !matches!(frame[0], 0x44 | 0x50 | 0x51 | 0x53 | 0x57 | 0x77)
}

#[derive(Clone, Default)]
pub struct Sim(pub Rc<RefCell<Chip>>);

impl Sim {
    pub fn new() -> Self {
        let sim = Self::default();
        sim.chip().state = SLEEP;
        sim
    }

    pub fn chip(&self) -> std::cell::RefMut<'_, Chip> {
        self.0.borrow_mut()
    }
}

impl Transport for Sim {
    fn select(&mut self) -> Result<()> {
        let mut chip = self.chip();
        chip.current.clear();
        chip.cts_ok = false;
        // Any SPI activity wakes the chip
        if chip.state == SLEEP {
            chip.state = SPI_ACTIVE;
        }
        Ok(())
    }

    fn deselect(&mut self) -> Result<()> {
        let mut chip = self.chip();
        let mut frame = std::mem::take(&mut chip.current);
        if frame.is_empty() {
            return Ok(());
        }
        if frame[0] == 0x44 {
            frame.truncate(2);
            if chip.cts_ok {
                chip.response.clear();
            }
        } else if is_command(&frame) {
            chip.execute(&frame);
            let masked = chip.line_masked;
            chip.masked_at_command.push(masked);
        }
        chip.frames.push(frame);
        Ok(())
    }

    fn transfer_byte(&mut self, byte: u8) -> Result<u8> {
        Ok(self.chip().transfer(byte))
    }
}

/// Shutdown pin that logs its level
pub struct SimPin(pub Sim);

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        self.0.chip().sdn_levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        self.0.chip().sdn_levels.push(true);
        Ok(())
    }
}

/// Event line that mirrors its mask state into the chip
pub struct SimLine {
    sim: Sim,
    pub unmasks: Cell<u32>,
}

impl EventLine for SimLine {
    fn mask(&self) {
        self.sim.chip().line_masked = true;
    }

    fn unmask(&self) {
        self.sim.chip().line_masked = false;
        self.unmasks.set(self.unmasks.get() + 1);
    }
}

pub type Radio = Si446x<Sim, NoopDelay, SimPin, SimLine>;

pub fn radio_with(config: Config) -> (Radio, Sim) {
    let sim = Sim::new();
    sim.chip().line_masked = true;
    let line = SimLine {
        sim: sim.clone(),
        unmasks: Cell::new(0),
    };
    let radio = Si446x::new(
        sim.clone(),
        NoopDelay::new(),
        SimPin(sim.clone()),
        line,
        config,
    );
    (radio, sim)
}

/// Initialised radio with handlers recording into [`take_events`], and an
/// empty frame log
pub fn radio() -> (Radio, Sim) {
    radio_config(Config::new(&TABLE))
}

pub fn radio_config(config: Config) -> (Radio, Sim) {
    let (mut radio, sim) = radio_with(config);
    radio.init().unwrap();
    record_all(&mut radio);
    sim.chip().clear_log();
    let _ = take_events();
    (radio, sim)
}

pub fn polled() -> Config {
    Config::new(&TABLE).with_event_mode(EventMode::Polled)
}

thread_local! {
    static EVENTS: RefCell<Vec<Event>> = const { RefCell::new(Vec::new()) };
}

pub fn record(event: Event) {
    EVENTS.with(|events| events.borrow_mut().push(event));
}

pub fn take_events() -> Vec<Event> {
    EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
}

pub fn record_all(radio: &mut Radio) {
    use si446x::EventKind::*;
    for kind in [
        RxBegin,
        RxComplete,
        RxInvalid,
        Sent,
        LowBattery,
        WakeTimer,
        CommandTimeout,
    ] {
        radio.handlers_mut().set(kind, record);
    }
}
