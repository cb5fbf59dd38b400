//! Critical sections
//!
//! Two nestable exclusion levels protect the radio:
//!
//! - [`EventSuppression`] masks only the radio's nIRQ line, so the event
//!   handler cannot run between the steps of a multi-command sequence and
//!   observe a half-configured chip. Other interrupts keep running.
//! - [`BusExclusion`] masks every interrupt (through the `critical-section`
//!   crate) around individual SPI exchanges, so an unrelated interrupt handler
//!   that shares the SPI bus cannot interleave its own transfers with ours.
//!
//! Both are depth counted. Only the outermost acquisition touches the
//! underlying primitive and only the matching release restores it. Releases
//! happen when the returned guard is dropped, so `?` and early returns inside
//! a protected block are safe.
//!
//! Never hold an [`EventGuard`] around an IR calibration or any other
//! unbounded wait for longer than the application can tolerate missing radio
//! events.

use core::cell::Cell;

use critical_section::RestoreState;

/// Platform hook for masking the radio's event (nIRQ) line.
///
/// Typically implemented by masking the EXTI line or NVIC vector the nIRQ pin
/// is routed to.
pub trait EventLine {
    /// Prevents the radio event handler from being invoked
    fn mask(&self);

    /// Allows the radio event handler to be invoked again
    fn unmask(&self);
}

/// [`EventLine`] for polled operation, where no interrupt is ever attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEventLine;

impl EventLine for NoEventLine {
    fn mask(&self) {}

    fn unmask(&self) {}
}

/// Depth-counted masking of the radio's event line.
///
/// The line is only unmasked on release if it was armed when the outermost
/// guard was taken, so suppression restores the prior state exactly.
pub struct EventSuppression<L> {
    line: L,
    armed: Cell<bool>,
    depth: Cell<u8>,
}

impl<L: EventLine> EventSuppression<L> {
    /// Wraps an event line. The line starts disarmed.
    pub fn new(line: L) -> Self {
        Self {
            line,
            armed: Cell::new(false),
            depth: Cell::new(0),
        }
    }

    /// Masks the event line until the returned guard and every guard nested
    /// inside it have been dropped.
    pub fn suppress(&self) -> EventGuard<'_, L> {
        self.enter();
        EventGuard { owner: self }
    }

    /// Unguarded acquisition. Must be paired with [`exit`](Self::exit).
    pub(crate) fn enter(&self) {
        let depth = self.depth.get();
        if depth == 0 && self.armed.get() {
            self.line.mask();
        }
        self.depth.set(depth.saturating_add(1));
    }

    /// Enables event delivery. Takes effect immediately when no guard is
    /// held, otherwise when the outermost guard is dropped.
    pub fn arm(&self) {
        if !self.armed.replace(true) && self.depth.get() == 0 {
            self.line.unmask();
        }
    }

    /// Disables event delivery until [`arm`](Self::arm) is called again.
    pub fn disarm(&self) {
        if self.armed.replace(false) && self.depth.get() == 0 {
            self.line.mask();
        }
    }

    /// Whether events are delivered when no guard is held
    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }

    /// Current nesting depth. Zero means events are not suppressed.
    pub fn depth(&self) -> u8 {
        self.depth.get()
    }

    /// Returns the wrapped event line.
    pub fn release(self) -> L {
        self.line
    }

    pub(crate) fn exit(&self) {
        let depth = self.depth.get().saturating_sub(1);
        self.depth.set(depth);
        if depth == 0 && self.armed.get() {
            self.line.unmask();
        }
    }
}

/// Scope of an [`EventSuppression`] acquisition.
#[must_use = "events are only suppressed while the guard is alive"]
pub struct EventGuard<'a, L: EventLine> {
    owner: &'a EventSuppression<L>,
}

impl<L: EventLine> Drop for EventGuard<'_, L> {
    fn drop(&mut self) {
        self.owner.exit();
    }
}

/// Depth-counted global interrupt masking around SPI exchanges.
///
/// When the bus is not shared with any interrupt handler, exclusion can be
/// turned off and only the depth counter is maintained.
pub struct BusExclusion {
    enabled: bool,
    depth: Cell<u8>,
    restore: Cell<RestoreState>,
}

impl BusExclusion {
    /// Creates a bus exclusion level. With `enabled` false no interrupts are
    /// ever masked.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            depth: Cell::new(0),
            restore: Cell::new(RestoreState::invalid()),
        }
    }

    /// Masks all interrupts until the returned guard and every guard nested
    /// inside it have been dropped.
    pub fn exclusive(&self) -> BusGuard<'_> {
        let depth = self.depth.get();
        if depth == 0 && self.enabled {
            // SAFETY: released exactly once by the outermost guard's drop,
            // and guards are lexically scoped so acquisitions nest properly.
            let restore = unsafe { critical_section::acquire() };
            self.restore.set(restore);
        }
        self.depth.set(depth.saturating_add(1));
        BusGuard { owner: self }
    }

    /// Current nesting depth
    pub fn depth(&self) -> u8 {
        self.depth.get()
    }

    fn exit(&self) {
        let depth = self.depth.get().saturating_sub(1);
        self.depth.set(depth);
        if depth == 0 && self.enabled {
            let restore = self.restore.replace(RestoreState::invalid());
            // SAFETY: paired with the acquire in `exclusive` at depth 0.
            unsafe { critical_section::release(restore) };
        }
    }
}

/// Scope of a [`BusExclusion`] acquisition.
#[must_use = "interrupts are only masked while the guard is alive"]
pub struct BusGuard<'a> {
    owner: &'a BusExclusion,
}

impl Drop for BusGuard<'_> {
    fn drop(&mut self) {
        self.owner.exit();
    }
}
