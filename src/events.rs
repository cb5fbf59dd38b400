//! Radio events and their handlers
//!
//! [`Si446x::service`](crate::Si446x::service) turns pending chip interrupts
//! into [`Event`]s and passes each one to the handler registered for its
//! [`EventKind`]. Kinds without a handler are dropped silently; registering
//! or removing a handler never changes which interrupts are checked or the
//! order they are dispatched in.
//!
//! Handlers run in the context `service` was called from, which is usually
//! the nIRQ interrupt handler. Keep them short.

use bitflags::bitflags;

use crate::properties::{ChipInterrupts, ModemInterrupts, PhInterrupts};

/// Something the radio wants the application to know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Sync word detected, a packet is arriving. Only delivered when enabled
    /// through [`Callbacks::RX_BEGIN`]
    RxBegin {
        /// RSSI latched at sync detection, dBm
        rssi: i16,
    },
    /// Valid packet received. It stays in the RX FIFO until read with
    /// [`Si446x::read`](crate::Si446x::read)
    RxComplete {
        /// Payload length
        length: u8,
        /// RSSI latched at sync detection, dBm
        rssi: i16,
    },
    /// Packet received with a bad CRC
    RxInvalid {
        /// RSSI latched at sync detection, dBm
        rssi: i16,
    },
    /// Packet transmitted. Only delivered when enabled through
    /// [`Callbacks::SENT`]
    Sent,
    /// Supply voltage below the low battery threshold
    LowBattery,
    /// Wake-up timer expired
    WakeTimer,
    /// The radio stopped answering commands
    CommandTimeout,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::RxBegin { .. } => EventKind::RxBegin,
            Self::RxComplete { .. } => EventKind::RxComplete,
            Self::RxInvalid { .. } => EventKind::RxInvalid,
            Self::Sent => EventKind::Sent,
            Self::LowBattery => EventKind::LowBattery,
            Self::WakeTimer => EventKind::WakeTimer,
            Self::CommandTimeout => EventKind::CommandTimeout,
        }
    }
}

/// Key of the handler table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    RxBegin,
    RxComplete,
    RxInvalid,
    Sent,
    LowBattery,
    WakeTimer,
    CommandTimeout,
}

impl EventKind {
    const COUNT: usize = 7;
}

/// Event handler
pub type Handler = fn(Event);

/// Table of optional event handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Handlers {
    table: [Option<Handler>; EventKind::COUNT],
}

impl Handlers {
    /// Creates an empty table.
    pub const fn new() -> Self {
        Self {
            table: [None; EventKind::COUNT],
        }
    }

    /// Registers `handler` for `kind` and returns the one it replaces.
    pub fn set(&mut self, kind: EventKind, handler: Handler) -> Option<Handler> {
        self.table[kind as usize].replace(handler)
    }

    /// Removes the handler for `kind` and returns it.
    pub fn clear(&mut self, kind: EventKind) -> Option<Handler> {
        self.table[kind as usize].take()
    }

    pub fn get(&self, kind: EventKind) -> Option<Handler> {
        self.table[kind as usize]
    }

    /// Passes `event` to its handler, if any.
    pub fn emit(&self, event: Event) {
        trace!("event {:?}", event);
        if let Some(handler) = self.get(event.kind()) {
            handler(event);
        }
    }
}

bitflags! {
    /// Optional events that must be enabled on the chip before they are
    /// delivered.
    ///
    /// The high byte maps onto the packet handler interrupt enables and the
    /// low byte onto the modem interrupt enables. Received and invalid packet
    /// events are always enabled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Callbacks: u16 {
        /// [`Event::Sent`]
        const SENT = 1 << 13;
        /// [`Event::RxBegin`]
        const RX_BEGIN = 1 << 0;
    }
}

impl Callbacks {
    /// Packet handler interrupt bits
    pub fn ph(self) -> PhInterrupts {
        PhInterrupts::from_bits_retain((self.bits() >> 8) as u8)
    }

    /// Modem interrupt bits
    pub fn modem(self) -> ModemInterrupts {
        ModemInterrupts::from_bits_retain(self.bits() as u8)
    }
}

/// In-memory copy of the chip's interrupt enables.
///
/// Pending interrupts are filtered through this before dispatch, so a bit
/// latched while its source was disabled is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnabledInterrupts {
    pub ph: PhInterrupts,
    pub modem: ModemInterrupts,
    pub chip: ChipInterrupts,
}

impl EnabledInterrupts {
    /// Interrupts enabled by `init`
    pub const STARTUP: Self = Self {
        ph: PhInterrupts::PACKET_RX.union(PhInterrupts::CRC_ERROR),
        modem: ModemInterrupts::empty(),
        chip: ChipInterrupts::empty(),
    };
}
