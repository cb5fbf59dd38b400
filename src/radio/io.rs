//! ADC, GPIO and property dump

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::Si446x;
use crate::commands::{
    AdcInput, AdcParams, AdcPin, AdcReading, GetAdcReading, GetGpioPinCfg, GpioConfig, GpioLevels,
    GpioMode, GpioPin, SetGpioPinCfg,
};
use crate::critical::EventLine;
use crate::properties::PropertyGroup;
use crate::transport::Transport;
use crate::{Error, Result};

impl<T, D, SDN, L> Si446x<T, D, SDN, L>
where
    T: Transport,
    D: DelayNs,
    SDN: OutputPin,
    L: EventLine,
{
    fn adc(&mut self, input: AdcInput) -> Result<AdcReading> {
        self.suppressed(|device, config, _| {
            device.execute_command(GetAdcReading {
                params: AdcParams {
                    input,
                    speed: config.adc_speed,
                },
            })
        })
    }

    /// Raw ADC reading of the voltage on `pin`, 0..=3.6 V range.
    pub fn adc_gpio(&mut self, pin: AdcPin) -> Result<u16> {
        Ok(self.adc(AdcInput::Gpio(pin))?.gpio)
    }

    /// Supply voltage in mV.
    pub fn adc_battery(&mut self) -> Result<u16> {
        Ok(self.adc(AdcInput::Battery)?.battery_mv())
    }

    /// Chip temperature in °C.
    pub fn adc_temperature(&mut self) -> Result<f32> {
        Ok(self.adc(AdcInput::Temperature)?.temperature_celsius())
    }

    /// Sets the function of one pin. The other pins are left alone and
    /// outputs use high drive strength.
    pub fn write_gpio(&mut self, pin: GpioPin, mode: GpioMode) -> Result<()> {
        self.suppressed(|device, _, _| {
            device.execute_command(SetGpioPinCfg {
                config: GpioConfig::single(pin, mode),
            })?;
            Ok(())
        })
    }

    /// Input levels of GPIO0..3.
    pub fn read_gpio(&mut self) -> Result<GpioLevels> {
        self.suppressed(|device, _, _| device.execute_command(GetGpioPinCfg))
    }

    /// Reads every property of `group` into `buffer`.
    ///
    /// With `None` only the size of the group is returned, so a buffer can be
    /// sized before the real call. Returns the number of properties in the
    /// group.
    ///
    /// # Errors
    /// * `Error::InvalidLength` - `buffer` is smaller than the group
    pub fn dump(&mut self, buffer: Option<&mut [u8]>, group: PropertyGroup) -> Result<usize> {
        let len = group.len();
        let Some(buffer) = buffer else {
            return Ok(len);
        };
        let buffer = buffer.get_mut(..len).ok_or(Error::InvalidLength)?;

        self.suppressed(|device, _, _| device.get_properties(group.first(), buffer))?;
        Ok(len)
    }
}
