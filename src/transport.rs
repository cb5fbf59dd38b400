//! Byte-level SPI transport
//!
//! The Si446x command protocol needs chip select held across a conditional
//! read (the clear-to-send byte decides whether the response follows), so the
//! driver talks to the bus one byte at a time inside an explicit
//! select/deselect bracket rather than through fixed `SpiDevice` transactions.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::{Error, Result};

/// Raw access to the radio's SPI interface.
///
/// Implementations perform no retries and do not interpret the bytes they
/// move. Callers are responsible for bus exclusion.
pub trait Transport {
    /// Asserts the radio's chip select
    fn select(&mut self) -> Result<()>;

    /// Releases the radio's chip select
    fn deselect(&mut self) -> Result<()>;

    /// Exchanges one byte full-duplex and returns the byte clocked in
    fn transfer_byte(&mut self, byte: u8) -> Result<u8>;

    /// Clocks out `bytes`, discarding whatever is clocked in
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.transfer_byte(byte)?;
        }
        Ok(())
    }

    /// Fills `bytes` by clocking out `0xFF` filler
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()> {
        for byte in bytes.iter_mut() {
            *byte = self.transfer_byte(0xFF)?;
        }
        Ok(())
    }
}

/// [`Transport`] over an `embedded-hal` SPI bus and a GPIO chip select.
///
/// NSS is active low. The bus is flushed before NSS is released so the last
/// byte is fully clocked out.
pub struct SpiTransport<SPI, NSS> {
    spi: SPI,
    nss: NSS,
}

impl<SPI, NSS> SpiTransport<SPI, NSS> {
    /// Creates a new transport from an SPI bus and chip-select pin.
    ///
    /// The bus must be configured for mode 0 and at most 10 MHz.
    pub fn new(spi: SPI, nss: NSS) -> Self {
        Self { spi, nss }
    }

    /// Releases the underlying SPI bus and chip-select pin.
    pub fn release(self) -> (SPI, NSS) {
        (self.spi, self.nss)
    }
}

impl<SPI, NSS> Transport for SpiTransport<SPI, NSS>
where
    SPI: SpiBus<u8>,
    NSS: OutputPin,
{
    fn select(&mut self) -> Result<()> {
        self.nss.set_low().map_err(|_| Error::Pin)
    }

    fn deselect(&mut self) -> Result<()> {
        self.spi.flush().map_err(|_| Error::Bus)?;
        self.nss.set_high().map_err(|_| Error::Pin)
    }

    fn transfer_byte(&mut self, byte: u8) -> Result<u8> {
        let mut word = [byte];
        self.spi
            .transfer_in_place(&mut word)
            .map_err(|_| Error::Bus)?;
        Ok(word[0])
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;

    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    use super::*;

    #[test]
    fn bracket_drives_nss_and_flushes() {
        let spi = SpiMock::new(&[
            SpiTransaction::transfer_in_place(vec![0x44], vec![0x00]),
            SpiTransaction::transfer_in_place(vec![0xFF], vec![0xFF]),
            SpiTransaction::flush(),
        ]);
        let nss = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ]);

        let mut transport = SpiTransport::new(spi, nss);
        transport.select().unwrap();
        assert_eq!(transport.transfer_byte(0x44).unwrap(), 0x00);
        assert_eq!(transport.transfer_byte(0xFF).unwrap(), 0xFF);
        transport.deselect().unwrap();

        let (mut spi, mut nss) = transport.release();
        spi.done();
        nss.done();
    }

    #[test]
    fn read_bytes_clocks_filler() {
        let spi = SpiMock::new(&[
            SpiTransaction::transfer_in_place(vec![0xFF], vec![0x12]),
            SpiTransaction::transfer_in_place(vec![0xFF], vec![0x34]),
        ]);
        let nss = PinMock::new(&[] as &[PinTransaction]);

        let mut transport = SpiTransport::new(spi, nss);
        let mut buf = [0u8; 2];
        transport.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34]);

        let (mut spi, mut nss) = transport.release();
        spi.done();
        nss.done();
    }
}
