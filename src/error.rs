//! Driver error type

/// Errors returned by the driver.
///
/// None of these leave the host in an unrecoverable state. A
/// [`CommandTimeout`](Error::CommandTimeout) means the radio stopped answering;
/// subsequent commands may still succeed once it recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SPI communication failed
    Bus,
    /// Driving the chip-select or shutdown pin failed
    Pin,
    /// The radio did not assert clear-to-send within the configured number of polls
    CommandTimeout,
    /// The radio is transmitting and the request would interrupt it
    Busy,
    /// Packet is longer than the FIFO or shorter than the configured fixed length
    InvalidLength,
    /// The static configuration table contains a malformed record
    InvalidConfig,
    /// The radio returned a value outside its documented range
    InvalidResponse,
}

/// Result alias used throughout the driver
pub type Result<T> = core::result::Result<T, Error>;

impl From<regiface::errors::Error> for Error {
    fn from(err: regiface::errors::Error) -> Self {
        match err {
            regiface::errors::Error::BusError => Error::Bus,
            _ => Error::InvalidResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regiface_errors_map_to_driver_errors() {
        assert_eq!(Error::from(regiface::errors::Error::BusError), Error::Bus);
        assert_eq!(
            Error::from(regiface::errors::Error::DeserializationError),
            Error::InvalidResponse
        );
    }
}
