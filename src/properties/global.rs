//! Global properties
//!
//! Clock selection, the low battery detector and the wake-up timer (WUT).
//! The WUT runs from a 32 kHz clock which must be selected in
//! [`GLOBAL_CLK_CFG`] before the timer is enabled.

use bitflags::bitflags;

use super::{Property, PropertyGroup};

/// Crystal oscillator trim
pub const GLOBAL_XO_TUNE: Property = Property::new(PropertyGroup::Global, 0x00);

/// Clock configuration (address: 0x0001)
///
/// Selects the 32 kHz clock source used by the wake-up timer.
pub const GLOBAL_CLK_CFG: Property = Property::new(PropertyGroup::Global, 0x01);

/// Low battery threshold (address: 0x0002)
///
/// Threshold = 1.5 V + value × 50 mV.
pub const GLOBAL_LOW_BATT_THRESH: Property = Property::new(PropertyGroup::Global, 0x02);

/// Global configuration
pub const GLOBAL_CONFIG: Property = Property::new(PropertyGroup::Global, 0x03);

/// Wake-up timer configuration (address: 0x0004)
///
/// Followed by `WUT_M` (2 bytes), `WUT_R` and `WUT_LDC`, so all five can be
/// written in one run.
pub const GLOBAL_WUT_CONFIG: Property = Property::new(PropertyGroup::Global, 0x04);

/// Wake-up timer mantissa, high byte
pub const GLOBAL_WUT_M_15_8: Property = Property::new(PropertyGroup::Global, 0x05);

/// Wake-up timer exponent and sleep behaviour
pub const GLOBAL_WUT_R: Property = Property::new(PropertyGroup::Global, 0x07);

/// Low duty cycle mantissa
pub const GLOBAL_WUT_LDC: Property = Property::new(PropertyGroup::Global, 0x08);

/// Internal 32 kHz RC oscillator selected as WUT clock
pub const CLK_CFG_32K_SEL_RC: u8 = 0x01;

/// Time the 32 kHz clock needs to settle after being selected, in µs
pub const CLK_32K_SETTLE_US: u32 = 300;

bitflags! {
    /// GLOBAL_WUT_CONFIG bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WutConfig: u8 {
        /// Measure the battery voltage each time the timer expires
        const LBD_EN = 1 << 0;
        /// Run the wake-up timer
        const WUT_EN = 1 << 1;
        /// Enter RX for the low duty cycle period each time the timer expires
        const LDC_EN_RX = 0x40;
    }
}

bitflags! {
    /// GLOBAL_WUT_R bits above the 5 bit exponent
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WutR: u8 {
        /// Go back to sleep after the timer event rather than staying in
        /// SPI active
        const WUT_SLEEP = 1 << 5;
        /// Leave low duty cycle mode after two periods without a packet
        const LDC_MAX_PERIODS_TWO = 0x40;
    }
}

/// Highest supported wake-up timer exponent
pub const WUT_R_MAX: u8 = 20;
