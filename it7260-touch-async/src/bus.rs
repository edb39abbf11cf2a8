//! Addressed buffer-region transport for the IT7260.
//!
//! The controller exposes its internal buffers behind a one-byte selector.
//! Every transaction starts by sending that selector; reads continue in the
//! same combined transfer with a repeated start so no other bus master can
//! slip in between the selector and the data.

use embedded_hal_async::i2c::{I2c, SevenBitAddress};
use heapless::Vec;

use crate::error::Error;

/// Default 7-bit I2C address of the IT7260.
pub const DEFAULT_I2C_ADDRESS: SevenBitAddress = 0x46;

/// Capacity of a write frame, selector byte included.
const WRITE_FRAME_LEN: usize = 16;

// --- Query byte bits ---
const QUERY_DATA_READY_MASK: u8 = 0b1000_0000;
const QUERY_BUSY_MASK: u8 = 0b0000_0001;

/// A buffer region of the controller, addressed by its selector byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Region {
    /// Command buffer (write only).
    Command = 0x20,
    /// System command buffer (write only).
    SystemCommand = 0x40,
    /// Query buffer (read only).
    Query = 0x80,
    /// Command response buffer (read only).
    CommandResponse = 0xA0,
    /// System command response buffer (read only).
    SystemCommandResponse = 0xC0,
    /// Point information buffer (read only).
    PointInfo = 0xE0,
}

impl Region {
    /// The selector byte sent at the start of every transaction.
    pub const fn selector(self) -> u8 {
        self as u8
    }

    /// Whether the host may write to this region.
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Command | Self::SystemCommand)
    }

    /// Whether the host may read from this region.
    pub const fn is_readable(self) -> bool {
        !self.is_writable()
    }
}

/// The status byte of the query buffer.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct QueryByte {
    inner: u8,
}

impl core::fmt::Debug for QueryByte {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueryByte")
            .field("data_ready", &self.data_ready())
            .field("busy", &self.busy())
            .finish()
    }
}

impl From<u8> for QueryByte {
    fn from(val: u8) -> Self {
        Self { inner: val }
    }
}

impl QueryByte {
    /// A point information report is waiting to be read.
    pub fn data_ready(self) -> bool {
        self.inner & QUERY_DATA_READY_MASK != 0
    }

    /// The controller is still processing a command.
    pub fn busy(self) -> bool {
        self.inner & QUERY_BUSY_MASK != 0
    }

    /// The raw byte as read from the bus.
    pub fn raw(self) -> u8 {
        self.inner
    }
}

/// Region-addressed read/write access to one controller on the bus.
pub struct Transport<I2C> {
    i2c: I2C,
    address: SevenBitAddress,
}

impl<I2C> Transport<I2C>
where
    I2C: I2c<SevenBitAddress>,
{
    /// Creates a transport talking to the controller at `address`.
    pub fn new(i2c: I2C, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    /// The 7-bit bus address of the controller.
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Gives the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Reads `buf.len()` bytes from `region`.
    ///
    /// Returns the number of bytes read.
    pub async fn read(&mut self, region: Region, buf: &mut [u8]) -> Result<usize, Error<I2C::Error>> {
        if !region.is_readable() {
            return Err(Error::WrongDirection(region));
        }

        self.i2c
            .write_read(self.address, &[region.selector()], buf)
            .await
            .map_err(|err| {
                log::warn!("Error reading {region:?}: {err:?}");
                Error::Bus(err)
            })?;

        Ok(buf.len())
    }

    /// Writes `payload` to `region` as a single transaction.
    ///
    /// The bus either takes the whole frame or fails, so `Ok` always carries
    /// `payload.len()`.
    pub async fn write(&mut self, region: Region, payload: &[u8]) -> Result<usize, Error<I2C::Error>> {
        if !region.is_writable() {
            return Err(Error::WrongDirection(region));
        }

        let mut frame: Vec<u8, WRITE_FRAME_LEN> = Vec::new();
        if frame.push(region.selector()).is_err() || frame.extend_from_slice(payload).is_err() {
            return Err(Error::PayloadTooLong(payload.len()));
        }

        self.i2c.write(self.address, &frame).await.map_err(|err| {
            log::warn!("Error writing {region:?}: {err:?}");
            Error::Bus(err)
        })?;

        Ok(payload.len())
    }

    /// Reads the query byte.
    pub async fn query(&mut self) -> Result<QueryByte, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.read(Region::Query, &mut buf).await?;
        Ok(QueryByte::from(buf[0]))
    }
}
