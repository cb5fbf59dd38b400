//! Radio operating states
//!
//! The chip owns its state. The driver never caches it: any SPI access wakes
//! a sleeping chip into [`RadioState::SpiActive`], so a remembered value would
//! be wrong as soon as the next command went out. Every read is a live query
//! of fast response register B.

/// Operating state of the radio.
///
/// Also used as the target of state transitions, where
/// [`NoChange`](RadioState::NoChange) means "stay in the current state".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioState {
    /// Remain in the current state (transition target only)
    NoChange = 0x00,
    /// Lowest power state. Never read back, since the read itself wakes the
    /// chip into [`SpiActive`](RadioState::SpiActive)
    Sleep = 0x01,
    /// Woken by SPI activity, only the SPI interface and LDOs are running
    SpiActive = 0x02,
    /// Crystal oscillator running, fastest transition to TX/RX
    Ready = 0x03,
    /// Alternate ready state. Reads back as [`Ready`](RadioState::Ready)
    Ready2 = 0x04,
    /// Synthesizer tuning for TX. Reads back as [`Tx`](RadioState::Tx)
    TxTune = 0x05,
    /// Synthesizer tuning for RX. Reads back as [`Rx`](RadioState::Rx)
    RxTune = 0x06,
    /// Transmitting
    Tx = 0x07,
    /// Receiving
    Rx = 0x08,
}

impl RadioState {
    /// Decodes a state byte as reported by the chip, folding the transient
    /// tuning and alternate ready states into their stable counterparts.
    ///
    /// Returns `None` for values outside the documented range.
    pub fn from_reported(raw: u8) -> Option<Self> {
        let state = match raw & 0x0F {
            0x00 => Self::NoChange,
            0x01 => Self::Sleep,
            0x02 => Self::SpiActive,
            0x03 | 0x04 => Self::Ready,
            0x05 | 0x07 => Self::Tx,
            0x06 | 0x08 => Self::Rx,
            _ => return None,
        };
        Some(state)
    }

    /// Raw state value used in commands
    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl From<RadioState> for u8 {
    fn from(state: RadioState) -> Self {
        state.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_states_fold_into_stable_ones() {
        assert_eq!(RadioState::from_reported(0x04), Some(RadioState::Ready));
        assert_eq!(RadioState::from_reported(0x05), Some(RadioState::Tx));
        assert_eq!(RadioState::from_reported(0x06), Some(RadioState::Rx));
        assert_eq!(RadioState::from_reported(0x02), Some(RadioState::SpiActive));
    }

    #[test]
    fn unknown_state_is_rejected() {
        assert_eq!(RadioState::from_reported(0x09), None);
        assert_eq!(RadioState::from_reported(0x0F), None);
    }
}
