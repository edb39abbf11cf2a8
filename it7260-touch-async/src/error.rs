//! Error types for the IT7260 driver.

use core::fmt::{self, Debug};

use crate::bus::Region;

/// The main error type for the IT7260 driver, generic over the I2C HAL error.
#[derive(PartialEq)]
pub enum Error<E> {
    /// The bus transfer failed.
    Bus(E),
    /// A read was issued to a write-only region or a write to a read-only one.
    WrongDirection(Region),
    /// The payload does not fit into a single write transaction.
    PayloadTooLong(usize),
    /// The identification response did not carry the `ITE` signature.
    NotRecognized,
    /// The controller stayed busy for the whole ready-poll budget.
    Timeout,
    /// A power transition was requested on a session that is not a wake source.
    PowerUnavailable,
}

impl<E: Debug> Debug for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "Bus({err:?})"),
            Self::WrongDirection(region) => write!(f, "WrongDirection({region:?})"),
            Self::PayloadTooLong(len) => write!(f, "PayloadTooLong({len})"),
            Self::NotRecognized => write!(f, "NotRecognized"),
            Self::Timeout => write!(f, "Timeout"),
            Self::PowerUnavailable => write!(f, "PowerUnavailable"),
        }
    }
}

impl<E: Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "i2c transfer failed: {err:?}"),
            Self::WrongDirection(region) => {
                write!(f, "region {region:?} does not support this direction")
            }
            Self::PayloadTooLong(len) => write!(f, "payload of {len} bytes is too long"),
            Self::NotRecognized => write!(f, "cannot identify the touch screen"),
            Self::Timeout => write!(f, "controller stayed busy"),
            Self::PowerUnavailable => write!(f, "device is not a wake source"),
        }
    }
}
