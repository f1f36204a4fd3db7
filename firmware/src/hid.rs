//! HID keyboard report assembly and the host-facing seam.

use crate::config::{REPORT_KEYS, REPORT_LEN};
use crate::error::LinkError;
use crate::keys::KeyTracker;

/// Standard HID keyboard input report (8 bytes).
/// Byte 0: modifier keys bitmask
/// Byte 1: reserved (0x00)
/// Bytes 2-7: up to 6 simultaneous keycodes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; REPORT_KEYS],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            keys: [0; REPORT_KEYS],
        }
    }

    pub fn to_bytes(&self) -> [u8; REPORT_LEN] {
        let mut bytes = [0; REPORT_LEN];
        bytes[0] = self.modifiers;
        bytes[1] = self.reserved;
        bytes[2..].copy_from_slice(&self.keys);
        bytes
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

/// Build a report from the held keys, filling at most `capacity` key slots
/// in key-set order. Keys past the last slot are left out of the report but
/// stay tracked.
pub fn build_report(keys: &KeyTracker, capacity: usize) -> KeyboardReport {
    let mut report = KeyboardReport::empty();
    let capacity = capacity.min(REPORT_KEYS);
    let mut slots = report.keys.iter_mut().take(capacity);

    for key in keys.iter() {
        if key.has_modifiers {
            report.modifiers |= key.modifier_bits;
        }
        if key.is_regular_key {
            // Out of slots: silently dropped.
            if let Some(slot) = slots.next() {
                *slot = key.key_code;
            }
        }
    }

    report
}

/// Which input report the host asked for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ProtocolMode {
    #[default]
    Report,
    Boot,
}

/// Lock-key LEDs from the host's output report.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HostLeds(u8);

impl HostLeds {
    const NUM_LOCK: u8 = 0x01;
    const CAPS_LOCK: u8 = 0x02;
    const SCROLL_LOCK: u8 = 0x04;

    /// Decode a host output report. Only the first byte is meaningful.
    pub fn from_report(report: &[u8]) -> Self {
        Self(report.first().copied().unwrap_or(0))
    }

    pub fn num_lock(self) -> bool {
        self.0 & Self::NUM_LOCK != 0
    }

    pub fn caps_lock(self) -> bool {
        self.0 & Self::CAPS_LOCK != 0
    }

    pub fn scroll_lock(self) -> bool {
        self.0 & Self::SCROLL_LOCK != 0
    }
}

/// Hands reports to the HID transport.
pub trait HostLink {
    /// Send one input report on the characteristic that matches `mode`.
    /// Returns [`LinkError::NotConnected`] when no host is connected; the
    /// report is then simply lost.
    fn send_report(&mut self, mode: ProtocolMode, report: &KeyboardReport)
        -> Result<(), LinkError>;
}
