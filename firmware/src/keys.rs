//! Ordered set of currently held keys.
//!
//! Locally scanned keys and keys reported by the other half share one set.
//! Insertion order matters twice over: later layer shifts override earlier
//! ones during translation, and when more keys are held than a report can
//! carry, the oldest ones win the slots.

use heapless::Vec;

use crate::config::{KeySource, MAX_KEYS};

/// A press or release of one logical position.
///
/// `code` is the position for a press and its negation for a release; this
/// is also the wire encoding of a sync delta.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: i8,
    pub source: KeySource,
}

impl KeyEvent {
    /// Press of `position`. `None` for position 0 or positions above 127.
    pub fn press(position: u8, source: KeySource) -> Option<Self> {
        let code = i8::try_from(position).ok().filter(|&c| c > 0)?;
        Some(Self { code, source })
    }

    /// Release of `position`. `None` for position 0 or positions above 127.
    pub fn release(position: u8, source: KeySource) -> Option<Self> {
        Self::press(position, source).map(|event| Self {
            code: -event.code,
            source,
        })
    }

    /// Event for a raw delta. `None` for 0, which encodes nothing.
    pub fn from_delta(code: i8, source: KeySource) -> Option<Self> {
        (code != 0 && code != i8::MIN).then_some(Self { code, source })
    }

    pub fn is_press(&self) -> bool {
        self.code > 0
    }

    pub fn position(&self) -> u8 {
        self.code.unsigned_abs()
    }
}

/// One held key and what translation made of it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ActiveKey {
    pub position: u8,
    pub source: KeySource,
    pub translated: bool,
    pub has_modifiers: bool,
    pub modifier_bits: u8,
    pub is_regular_key: bool,
    pub key_code: u8,
}

impl ActiveKey {
    pub const fn new(position: u8, source: KeySource) -> Self {
        Self {
            position,
            source,
            translated: false,
            has_modifiers: false,
            modifier_bits: 0,
            is_regular_key: false,
            key_code: 0,
        }
    }

    fn is(&self, position: u8, source: KeySource) -> bool {
        self.position == position && self.source == source
    }
}

/// Held keys, oldest first.
pub struct KeyTracker {
    keys: Vec<ActiveKey, MAX_KEYS>,
    limit: usize,
}

impl KeyTracker {
    /// Tracker holding at most `limit` keys (capped at [`MAX_KEYS`]).
    pub fn new(limit: usize) -> Self {
        Self {
            keys: Vec::new(),
            limit: limit.min(MAX_KEYS),
        }
    }

    /// Append a newly held key. Dropped when the set is full, like a
    /// hardware key-rollover limit, and when the key is already held.
    pub fn press(&mut self, position: u8, source: KeySource) {
        if self.contains(position, source) {
            tracing::debug!(position, ?source, "press of held key ignored");
            return;
        }
        if self.keys.len() >= self.limit {
            tracing::debug!(position, ?source, "key set full, press dropped");
            return;
        }
        // Cannot fail: limit <= MAX_KEYS.
        let _ = self.keys.push(ActiveKey::new(position, source));
    }

    /// Remove a held key, keeping the relative order of the rest. Releasing
    /// a key that is not tracked (its press was dropped) does nothing.
    pub fn release(&mut self, position: u8, source: KeySource) {
        match self.keys.iter().position(|key| key.is(position, source)) {
            Some(index) => {
                self.keys.remove(index);
            }
            None => tracing::trace!(position, ?source, "release of untracked key"),
        }
    }

    pub fn apply(&mut self, event: KeyEvent) {
        if event.is_press() {
            self.press(event.position(), event.source);
        } else {
            self.release(event.position(), event.source);
        }
    }

    /// Drop every key from `source`. Returns how many were removed.
    pub fn release_all(&mut self, source: KeySource) -> usize {
        let before = self.keys.len();
        self.keys.retain(|key| key.source != source);
        before - self.keys.len()
    }

    pub fn contains(&self, position: u8, source: KeySource) -> bool {
        self.keys.iter().any(|key| key.is(position, source))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveKey> {
        self.keys.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActiveKey> {
        self.keys.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
