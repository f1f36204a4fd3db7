//! Packed layer-map entries.
//!
//! A [`Code`] is what a keymap stores for one (layer, position) cell. The
//! low byte carries a HID usage or a special marker; the high byte carries
//! modifier bits applied together with the low-byte key:
//!
//! | raw              | meaning                                   |
//! |------------------|-------------------------------------------|
//! | `0x0000`         | transparent, use the next lower layer      |
//! | `0x00E0..0x00E7` | modifier key                              |
//! | `0x00F0..0x00FF` | momentary layer shift to `low - 0xF0`     |
//! | `0xMM00..`       | modifier mask `MM` plus the low-byte key  |
//! | `0x0004..0x00DF` | regular key                               |

use crate::Keycode;

/// Modifier bit masks, in HID modifier-byte order.
pub mod mods {
    pub const LCTRL: u8 = 0x01;
    pub const LSHIFT: u8 = 0x02;
    pub const LALT: u8 = 0x04;
    pub const LGUI: u8 = 0x08;
    pub const RCTRL: u8 = 0x10;
    pub const RSHIFT: u8 = 0x20;
    pub const RALT: u8 = 0x40;
    pub const RGUI: u8 = 0x80;
}

const LAYER_BASE: u8 = 0xF0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Code(u16);

impl Code {
    /// Fall through to the next lower layer.
    pub const TRANS: Code = Code(0);

    pub const fn raw(self) -> u16 {
        self.0
    }

    /// A plain key.
    pub const fn key(kc: Keycode) -> Self {
        Code(kc as u16)
    }

    /// A key sent together with extra modifiers, e.g. `with_mods(LSHIFT, N1)` for `!`.
    pub const fn with_mods(mods: u8, kc: Keycode) -> Self {
        Code(((mods as u16) << 8) | kc as u16)
    }

    /// Momentary shift to `layer` while held. Layers above 15 cannot be encoded.
    pub const fn layer(layer: u8) -> Self {
        Code((LAYER_BASE | (layer & 0x0F)) as u16)
    }

    const fn low(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn is_transparent(self) -> bool {
        self.0 == 0
    }

    pub fn is_layer(self) -> bool {
        self.high() == 0 && self.low() >= LAYER_BASE
    }

    /// Target layer of a layer-shift code.
    pub fn layer_number(self) -> Option<usize> {
        if self.is_layer() {
            Some(usize::from(self.low() - LAYER_BASE))
        } else {
            None
        }
    }

    /// True for modifier keys and for keys combined with a modifier mask.
    pub fn is_modifier(self) -> bool {
        self.modifier_bits() != 0
    }

    /// Bits this code contributes to the report's modifier byte.
    pub fn modifier_bits(self) -> u8 {
        if self.is_layer() {
            return 0;
        }
        let own = Keycode::from_u8(self.low()).map_or(0, Keycode::modifier_bit);
        self.high() | own
    }

    /// The key left over once the modifier part is stripped.
    pub fn base(self) -> Code {
        if self.is_layer() {
            return self;
        }
        match self.low() {
            0xE0..=0xE7 => Code::TRANS,
            low => Code(u16::from(low)),
        }
    }

    /// True for a regular key that belongs in the report's keycode slots.
    pub fn is_key(self) -> bool {
        self.high() == 0 && (0x04..=0xDF).contains(&self.low())
    }

    /// HID usage byte of a regular key.
    pub fn key_code(self) -> u8 {
        self.low()
    }
}

impl From<Keycode> for Code {
    fn from(kc: Keycode) -> Self {
        Code::key(kc)
    }
}
