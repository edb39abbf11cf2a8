//! The boundary towards the host's input layer.

use crate::config::AxisRanges;
use crate::report::{Key, TouchEvent};

/// evdev code of the touch contact button (`BTN_TOUCH`).
pub const BTN_TOUCH: u16 = 0x14a;

/// What the session announces to the host once, at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Input device name.
    pub name: &'static str,
    /// Physical path of the device.
    pub phys: &'static str,
    /// Button code of the touch contact.
    pub touch_button: u16,
    /// Keys the device can report, besides the touch contact.
    pub keys: [Key; 4],
    /// Absolute axis ranges.
    pub axes: AxisRanges,
}

impl Capabilities {
    /// Capabilities of an IT7260 panel with the given axis ranges.
    pub fn new(axes: AxisRanges) -> Self {
        Self {
            name: "it7260 touch screen",
            phys: "I2C",
            touch_button: BTN_TOUCH,
            keys: Key::ALL,
            axes,
        }
    }
}

/// A touch position in host axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchSample {
    /// Horizontal position, within `0..=x_max`.
    pub x: u16,
    /// Vertical position, within `0..=y_max`.
    pub y: u16,
    /// Pressure, within `0..=pressure_max`.
    pub pressure: u8,
    /// Whether a finger is on the panel.
    pub contact: bool,
}

impl AxisRanges {
    /// Maps a decoded touch onto the host axes.
    ///
    /// The panel is mounted rotated: the host's horizontal axis is the
    /// controller's second coordinate. Values are clamped to the declared
    /// ranges. Contact follows the raw pressure.
    pub fn to_host(&self, x: u16, y: u16, pressure: u8) -> TouchSample {
        TouchSample {
            x: y.min(self.x_max),
            y: x.min(self.y_max),
            pressure: pressure.min(self.pressure_max),
            contact: pressure != 0,
        }
    }
}

/// Receives decoded input from a session.
///
/// Calls for one decode cycle are always followed by exactly one
/// [`EventSink::sync`].
pub trait EventSink {
    /// Called once when the session is attached.
    fn declare(&mut self, _capabilities: &Capabilities) {}

    /// A touch key changed state.
    fn report_key(&mut self, key: Key, pressed: bool);

    /// A new touch position.
    fn report_touch(&mut self, sample: TouchSample);

    /// Marks the end of one decode cycle's updates.
    fn sync(&mut self);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn declare(&mut self, capabilities: &Capabilities) {
        (**self).declare(capabilities)
    }

    fn report_key(&mut self, key: Key, pressed: bool) {
        (**self).report_key(key, pressed)
    }

    fn report_touch(&mut self, sample: TouchSample) {
        (**self).report_touch(sample)
    }

    fn sync(&mut self) {
        (**self).sync()
    }
}

/// Forwards one decoded event followed by the sync marker.
pub(crate) fn emit<S: EventSink>(sink: &mut S, event: TouchEvent, axes: &AxisRanges) {
    match event {
        TouchEvent::Key { key, pressed } => sink.report_key(key, pressed),
        TouchEvent::Touch { x, y, pressure } => {
            let sample = axes.to_host(x, y, pressure);
            log::info!("xpos = {}, ypos = {}, pressure = {}", sample.x, sample.y, sample.pressure);
            sink.report_touch(sample);
        }
    }
    sink.sync();
}
