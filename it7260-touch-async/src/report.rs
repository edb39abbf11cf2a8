//! Point information report decoding.

/// Size of the point information block.
pub const REPORT_LEN: usize = 14;

/// Tag of a touch-key report.
pub const KEY_REPORT_TAG: u8 = 0x41;

// --- Byte offsets ---
const TAG: usize = 0;
const KEY_INDEX: usize = 1;
const KEY_STATE: usize = 2;
const X_LOW: usize = 2;
const XY_HIGH: usize = 3;
const Y_LOW: usize = 4;
const PRESSURE: usize = 5;

/// Largest value of a packed 12-bit coordinate.
pub const COORDINATE_MAX: u16 = 0x0FFF;

/// The capacitive keys below the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Power key (index `0x01`).
    Power,
    /// Back key (index `0x02`).
    Back,
    /// Menu key (index `0x03`).
    Menu,
    /// Home key (index `0x04`).
    Home,
}

impl Key {
    /// Every key the controller can report.
    pub const ALL: [Key; 4] = [Key::Power, Key::Menu, Key::Back, Key::Home];

    /// Maps the controller's key index to a key.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0x01 => Some(Key::Power),
            0x02 => Some(Key::Back),
            0x03 => Some(Key::Menu),
            0x04 => Some(Key::Home),
            _ => None,
        }
    }

    /// The evdev key code (`KEY_*` in `linux/input-event-codes.h`).
    pub fn code(self) -> u16 {
        match self {
            Key::Power => 116,
            Key::Back => 158,
            Key::Menu => 139,
            Key::Home => 102,
        }
    }
}

/// A decoded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// A touch key changed state.
    Key {
        /// The key.
        key: Key,
        /// Whether it is held down.
        pressed: bool,
    },
    /// A coordinate report in panel space.
    Touch {
        /// First packed coordinate, 12 bits.
        x: u16,
        /// Second packed coordinate, 12 bits.
        y: u16,
        /// Raw pressure.
        pressure: u8,
    },
}

impl TouchEvent {
    /// Whether the event represents something held on the panel.
    pub fn is_down(&self) -> bool {
        match *self {
            TouchEvent::Key { pressed, .. } => pressed,
            TouchEvent::Touch { pressure, .. } => pressure != 0,
        }
    }
}

/// A snapshot of the point information buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportBlock {
    raw: [u8; REPORT_LEN],
}

impl From<[u8; REPORT_LEN]> for ReportBlock {
    fn from(raw: [u8; REPORT_LEN]) -> Self {
        Self { raw }
    }
}

impl ReportBlock {
    /// The report type tag.
    pub fn tag(&self) -> u8 {
        self.raw[TAG]
    }

    /// Whether this is a touch-key report.
    pub fn is_key_report(&self) -> bool {
        self.tag() == KEY_REPORT_TAG
    }

    /// The packed coordinate pair, each 12 bits wide.
    ///
    /// `x` takes its low byte from offset 2 and its high nibble from the low
    /// nibble of offset 3; `y` takes its low byte from offset 4 and its high
    /// nibble from the high nibble of offset 3.
    pub fn coordinates(&self) -> (u16, u16) {
        let high = self.raw[XY_HIGH] as u16;
        let x = ((high & 0x0F) << 8) | self.raw[X_LOW] as u16;
        let y = ((high & 0xF0) << 4) | self.raw[Y_LOW] as u16;
        (x, y)
    }

    /// The raw pressure byte.
    pub fn pressure(&self) -> u8 {
        self.raw[PRESSURE]
    }

    /// The raw report bytes.
    pub fn raw(&self) -> &[u8; REPORT_LEN] {
        &self.raw
    }

    /// Interprets the block.
    ///
    /// Key reports with an unknown key index decode to `None`.
    pub fn decode(&self) -> Option<TouchEvent> {
        if self.is_key_report() {
            let index = self.raw[KEY_INDEX];
            log::info!("the key number {index}");
            let key = Key::from_index(index)?;
            return Some(TouchEvent::Key {
                key,
                pressed: self.raw[KEY_STATE] != 0,
            });
        }

        let (x, y) = self.coordinates();
        Some(TouchEvent::Touch {
            x,
            y,
            pressure: self.pressure(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(head: &[u8]) -> ReportBlock {
        let mut raw = [0u8; REPORT_LEN];
        raw[..head.len()].copy_from_slice(head);
        ReportBlock::from(raw)
    }

    fn packed(x: u16, y: u16, pressure: u8) -> ReportBlock {
        block(&[
            0x00,
            0x00,
            (x & 0xFF) as u8,
            (((y >> 8) as u8 & 0x0F) << 4) | ((x >> 8) as u8 & 0x0F),
            (y & 0xFF) as u8,
            pressure,
        ])
    }

    #[test]
    fn test_key_reports() {
        let expected = [(0x01, Key::Power), (0x02, Key::Back), (0x03, Key::Menu), (0x04, Key::Home)];
        for (index, key) in expected {
            for state in [0x00, 0x01, 0x80, 0xFF] {
                assert_eq!(
                    block(&[KEY_REPORT_TAG, index, state]).decode(),
                    Some(TouchEvent::Key {
                        key,
                        pressed: state != 0
                    })
                );
            }
        }
    }

    #[test]
    fn test_unknown_key_index_is_ignored() {
        for index in [0x00, 0x05, 0x41, 0xFF] {
            assert_eq!(block(&[KEY_REPORT_TAG, index, 0x01]).decode(), None);
        }
    }

    #[test]
    fn test_power_key_pressed() {
        assert_eq!(
            block(&[0x41, 0x01, 0x01]).decode(),
            Some(TouchEvent::Key {
                key: Key::Power,
                pressed: true
            })
        );
    }

    #[test]
    fn test_coordinate_report_bit_packing() {
        let report = block(&[0x00, 0x00, 0x10, 0x23, 0x45, 0x07]);

        assert_eq!(report.coordinates(), (0x310, 0x245));
        let event = report.decode();
        assert_eq!(
            event,
            Some(TouchEvent::Touch {
                x: 784,
                y: 581,
                pressure: 7
            })
        );
        assert!(event.unwrap().is_down());
    }

    #[test]
    fn test_any_other_tag_is_a_touch() {
        for tag in [0x00, 0x01, 0x40, 0x42, 0x80, 0xFF] {
            for pressure in [0x00, 0x01, 0x10, 0xFF] {
                let mut raw = *packed(0x123, 0xABC, pressure).raw();
                raw[0] = tag;
                let event = ReportBlock::from(raw).decode().unwrap();
                assert_eq!(
                    event,
                    TouchEvent::Touch {
                        x: 0x123,
                        y: 0xABC,
                        pressure
                    }
                );
                assert_eq!(event.is_down(), pressure != 0);
            }
        }
    }

    #[test]
    fn test_coordinate_packing_round_trip() {
        // Walk x across its whole range against a y that exercises every nibble.
        for x in 0..=COORDINATE_MAX {
            let y = COORDINATE_MAX - x;
            assert_eq!(packed(x, y, 1).coordinates(), (x, y));
        }
    }

    #[test]
    fn test_key_codes() {
        let codes: [u16; 4] = Key::ALL.map(Key::code);
        assert_eq!(codes, [116, 139, 158, 102]);
    }
}
