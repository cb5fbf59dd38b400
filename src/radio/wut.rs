//! Wake-up timer
//!
//! The wake-up timer runs from the internal 32 kHz RC oscillator while the
//! radio sleeps. Its period is `4 * m * 2^r / 32.768 kHz`. On expiry it can
//! wake the host, check the supply against the low battery threshold, or
//! both.

use bitflags::bitflags;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::Si446x;
use crate::critical::EventLine;
use crate::properties::{
    ChipInterrupts, WutConfig, WutR, CLK_32K_SETTLE_US, CLK_CFG_32K_SEL_RC, GLOBAL_CLK_CFG,
    GLOBAL_WUT_CONFIG, INT_CTL_CHIP_ENABLE, WUT_R_MAX,
};
use crate::transport::Transport;
use crate::Result;

bitflags! {
    /// Wake-up timer features
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WutFlags: u8 {
        /// Deliver [`Event::WakeTimer`](crate::Event::WakeTimer) on expiry
        const RUN = 1 << 0;
        /// Check the supply on expiry and deliver
        /// [`Event::LowBattery`](crate::Event::LowBattery) when it is below
        /// the threshold
        const BATT = 1 << 1;
        /// Enter RX for the low duty cycle period on expiry
        const RX = 1 << 2;
    }
}

impl<T, D, SDN, L> Si446x<T, D, SDN, L>
where
    T: Transport,
    D: DelayNs,
    SDN: OutputPin,
    L: EventLine,
{
    /// Configures and starts the wake-up timer.
    ///
    /// `r` is the exponent (at most 20), `m` the mantissa and `ldc` the low
    /// duty cycle mantissa. Chip interrupts are enabled according to `flags`.
    /// Flags naming none of the features leave the radio untouched.
    pub fn configure_wake_timer(&mut self, r: u8, m: u16, ldc: u8, flags: WutFlags) -> Result<()> {
        if !flags.intersects(WutFlags::all()) {
            debug!("wake-up timer configuration ignored, no features requested");
            return Ok(());
        }

        self.suppressed(|device, _, enabled| {
            device.set_property(GLOBAL_WUT_CONFIG, 0)?;

            let mut chip = ChipInterrupts::empty();
            chip.set(ChipInterrupts::LOW_BATT, flags.contains(WutFlags::BATT));
            chip.set(ChipInterrupts::WUT, flags.contains(WutFlags::RUN));
            device.set_property(INT_CTL_CHIP_ENABLE, chip.bits())?;
            enabled.chip = chip;

            if device.get_property(GLOBAL_CLK_CFG)? != CLK_CFG_32K_SEL_RC {
                device.set_property(GLOBAL_CLK_CFG, CLK_CFG_32K_SEL_RC)?;
                device.delay_us(CLK_32K_SETTLE_US);
            }

            let mut config = WutConfig::WUT_EN;
            config.set(WutConfig::LBD_EN, flags.contains(WutFlags::BATT));
            config.set(WutConfig::LDC_EN_RX, flags.contains(WutFlags::RX));

            let m = m.to_be_bytes();
            let r = r.min(WUT_R_MAX) | (WutR::LDC_MAX_PERIODS_TWO | WutR::WUT_SLEEP).bits();
            device.set_properties(GLOBAL_WUT_CONFIG, &[config.bits(), m[0], m[1], r, ldc])
        })
    }

    /// Stops the wake-up timer and releases the 32 kHz clock.
    ///
    /// Chip interrupt enables are left as they are.
    pub fn disable_wake_timer(&mut self) -> Result<()> {
        self.suppressed(|device, _, _| {
            device.set_property(GLOBAL_WUT_CONFIG, 0)?;
            device.set_property(GLOBAL_CLK_CFG, 0)
        })
    }
}
