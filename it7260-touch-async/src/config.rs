//! Driver configuration.

use embassy_time::Duration;
use embedded_hal_async::i2c::SevenBitAddress;

use crate::bus::DEFAULT_I2C_ADDRESS;

/// How long to wait for the controller to clear its busy bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyPolicy {
    /// Query reads before giving up with [`crate::Error::Timeout`]. At least
    /// one read is always made, so `0` behaves like `1`.
    pub attempts: u32,
    /// Pause between two query reads.
    pub interval: Duration,
}

impl Default for ReadyPolicy {
    fn default() -> Self {
        Self {
            attempts: 1000,
            interval: Duration::from_millis(1),
        }
    }
}

/// Axis ranges declared to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRanges {
    /// Maximum of the host's horizontal axis.
    pub x_max: u16,
    /// Maximum of the host's vertical axis.
    pub y_max: u16,
    /// Maximum reported pressure.
    pub pressure_max: u8,
}

impl Default for AxisRanges {
    fn default() -> Self {
        Self {
            x_max: 600,
            y_max: 1024,
            pressure_max: 16,
        }
    }
}

/// Configuration for an IT7260 session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// 7-bit I2C address of the controller.
    pub address: SevenBitAddress,
    /// Delay between the interrupt and the decode cycle, letting the
    /// controller latch its final values.
    pub debounce: Duration,
    /// Busy-poll budget used by the identify handshake.
    pub ready: ReadyPolicy,
    /// Axis ranges declared at attach time.
    pub axes: AxisRanges,
    /// Whether the touch interrupt may wake the system.
    pub wake_capable: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_I2C_ADDRESS,
            debounce: Duration::from_millis(50),
            ready: ReadyPolicy::default(),
            axes: AxisRanges::default(),
            wake_capable: true,
        }
    }
}

impl Config {
    /// Sets the I2C address.
    pub fn with_address(mut self, address: SevenBitAddress) -> Self {
        self.address = address;
        self
    }

    /// Sets the interrupt debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the busy-poll budget.
    pub fn with_ready(mut self, ready: ReadyPolicy) -> Self {
        self.ready = ready;
        self
    }

    /// Sets the declared axis ranges.
    pub fn with_axes(mut self, axes: AxisRanges) -> Self {
        self.axes = axes;
        self
    }

    /// Sets whether the session is a wake source.
    pub fn with_wake_capable(mut self, wake_capable: bool) -> Self {
        self.wake_capable = wake_capable;
        self
    }
}
