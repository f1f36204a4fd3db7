//! Default layout for a 4×6-per-half split board.
//!
//! Positions 1–24 belong to the left half (the source unit), 25–48 to the
//! right half (the sink unit). Each half is numbered row-major from its top
//! outer corner, so position `1 + row * 6 + col` on the left and
//! `25 + row * 6 + col` on the right.
//!
//! Layer 0: QWERTY
//! Layer 1: Lower (numbers and symbols)
//! Layer 2: Raise (function keys and navigation)

use crate::code::mods::LSHIFT;
use crate::{Code, Keycode, Keymap};

/// Positions per half.
pub const KEYS_PER_HALF: usize = 24;
/// Positions on the whole board.
pub const KEYS: usize = KEYS_PER_HALF * 2;
/// Number of layers.
pub const NUM_LAYERS: usize = 3;

const fn k(kc: Keycode) -> Code {
    Code::key(kc)
}

const fn sft(kc: Keycode) -> Code {
    Code::with_mods(LSHIFT, kc)
}

/// Key is unused or transparent at this position.
const ___: Code = Code::TRANS;

const TAB: Code = k(Keycode::Tab);
const ESC: Code = k(Keycode::Escape);
const ENT: Code = k(Keycode::Enter);
const SPC: Code = k(Keycode::Space);
const BSP: Code = k(Keycode::Backspace);
const DEL: Code = k(Keycode::Delete);
const LCTL: Code = k(Keycode::LCtrl);
const LSFT: Code = k(Keycode::LShift);
const LALT: Code = k(Keycode::LAlt);
const LGUI: Code = k(Keycode::LGui);
const RSFT: Code = k(Keycode::RShift);
const RALT: Code = k(Keycode::RAlt);
const LOWER: Code = Code::layer(1);
const RAISE: Code = Code::layer(2);

#[rustfmt::skip]
static BASE: [Code; KEYS] = [
    // Left half
    TAB,  k(Keycode::Q), k(Keycode::W), k(Keycode::E), k(Keycode::R), k(Keycode::T),
    LCTL, k(Keycode::A), k(Keycode::S), k(Keycode::D), k(Keycode::F), k(Keycode::G),
    LSFT, k(Keycode::Z), k(Keycode::X), k(Keycode::C), k(Keycode::V), k(Keycode::B),
    ___,  ___,           LGUI,          LALT,          LOWER,         SPC,
    // Right half
    k(Keycode::Y), k(Keycode::U), k(Keycode::I),     k(Keycode::O),   k(Keycode::P),         BSP,
    k(Keycode::H), k(Keycode::J), k(Keycode::K),     k(Keycode::L),   k(Keycode::Semicolon), k(Keycode::Quote),
    k(Keycode::N), k(Keycode::M), k(Keycode::Comma), k(Keycode::Dot), k(Keycode::Slash),     ESC,
    ENT,           RAISE,         RALT,              RSFT,            ___,                   ___,
];

#[rustfmt::skip]
static LOWER_LAYER: [Code; KEYS] = [
    // Left half
    k(Keycode::Grave), k(Keycode::N1), k(Keycode::N2), k(Keycode::N3), k(Keycode::N4), k(Keycode::N5),
    ___,               sft(Keycode::N1), sft(Keycode::N2), sft(Keycode::N3), sft(Keycode::N4), sft(Keycode::N5),
    ___,               ___,            ___,            ___,            ___,            ___,
    ___,               ___,            ___,            ___,            ___,            ___,
    // Right half
    k(Keycode::N6),    k(Keycode::N7),    k(Keycode::N8),       k(Keycode::N9),       k(Keycode::N0),        DEL,
    sft(Keycode::N6),  sft(Keycode::N7),  sft(Keycode::N8),     sft(Keycode::N9),     sft(Keycode::N0),      ___,
    k(Keycode::Minus), k(Keycode::Equal), k(Keycode::LBracket), k(Keycode::RBracket), k(Keycode::Backslash), ___,
    ___,               ___,               ___,                  ___,                  ___,                   ___,
];

#[rustfmt::skip]
static RAISE_LAYER: [Code; KEYS] = [
    // Left half
    k(Keycode::F1), k(Keycode::F2), k(Keycode::F3),  k(Keycode::F4),  k(Keycode::F5),  k(Keycode::F6),
    k(Keycode::F7), k(Keycode::F8), k(Keycode::F9),  k(Keycode::F10), k(Keycode::F11), k(Keycode::F12),
    ___,            ___,            ___,             ___,             ___,             k(Keycode::CapsLock),
    ___,            ___,            ___,             ___,             ___,             ___,
    // Right half
    k(Keycode::PageUp),   k(Keycode::Home),   k(Keycode::Up),          k(Keycode::End),   ___, ___,
    k(Keycode::PageDown), k(Keycode::Left),   k(Keycode::Down),        k(Keycode::Right), ___, ___,
    k(Keycode::Insert),   k(Keycode::Delete), k(Keycode::PrintScreen), ___,               ___, ___,
    ___,                  ___,                ___,                     ___,               ___, ___,
];

static LAYERS: [&[Code]; NUM_LAYERS] = [&BASE, &LOWER_LAYER, &RAISE_LAYER];

/// The default three-layer split keymap.
pub fn keymap() -> Keymap<'static> {
    Keymap::new(&LAYERS)
}
