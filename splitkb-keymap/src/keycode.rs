//! USB HID keyboard usage codes.

/// USB HID keycodes.
/// See USB HID Usage Tables, Section 10 (Keyboard/Keypad Page 0x07).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Keycode {
    /// Error rollover
    None = 0x01,

    // Letters
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,

    // Numbers
    N1 = 0x1E,
    N2 = 0x1F,
    N3 = 0x20,
    N4 = 0x21,
    N5 = 0x22,
    N6 = 0x23,
    N7 = 0x24,
    N8 = 0x25,
    N9 = 0x26,
    N0 = 0x27,

    // Control keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    LBracket = 0x2F,
    RBracket = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Dot = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,

    // Function keys
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,

    // Modifiers (reported in the modifier byte, not the keycode array)
    LCtrl = 0xE0,
    LShift = 0xE1,
    LAlt = 0xE2,
    LGui = 0xE3,
    RCtrl = 0xE4,
    RShift = 0xE5,
    RAlt = 0xE6,
    RGui = 0xE7,
}

/// Every keycode, used for reverse lookups from raw report bytes.
const ALL: &[Keycode] = &[
    Keycode::None,
    Keycode::A, Keycode::B, Keycode::C, Keycode::D, Keycode::E, Keycode::F,
    Keycode::G, Keycode::H, Keycode::I, Keycode::J, Keycode::K, Keycode::L,
    Keycode::M, Keycode::N, Keycode::O, Keycode::P, Keycode::Q, Keycode::R,
    Keycode::S, Keycode::T, Keycode::U, Keycode::V, Keycode::W, Keycode::X,
    Keycode::Y, Keycode::Z,
    Keycode::N1, Keycode::N2, Keycode::N3, Keycode::N4, Keycode::N5,
    Keycode::N6, Keycode::N7, Keycode::N8, Keycode::N9, Keycode::N0,
    Keycode::Enter, Keycode::Escape, Keycode::Backspace, Keycode::Tab,
    Keycode::Space, Keycode::Minus, Keycode::Equal, Keycode::LBracket,
    Keycode::RBracket, Keycode::Backslash, Keycode::Semicolon, Keycode::Quote,
    Keycode::Grave, Keycode::Comma, Keycode::Dot, Keycode::Slash,
    Keycode::CapsLock,
    Keycode::F1, Keycode::F2, Keycode::F3, Keycode::F4, Keycode::F5,
    Keycode::F6, Keycode::F7, Keycode::F8, Keycode::F9, Keycode::F10,
    Keycode::F11, Keycode::F12,
    Keycode::PrintScreen, Keycode::ScrollLock, Keycode::Pause, Keycode::Insert,
    Keycode::Home, Keycode::PageUp, Keycode::Delete, Keycode::End,
    Keycode::PageDown, Keycode::Right, Keycode::Left, Keycode::Down, Keycode::Up,
    Keycode::LCtrl, Keycode::LShift, Keycode::LAlt, Keycode::LGui,
    Keycode::RCtrl, Keycode::RShift, Keycode::RAlt, Keycode::RGui,
];

impl Keycode {
    /// Map a raw usage byte back to its keycode, if this table knows it.
    pub fn from_u8(value: u8) -> Option<Keycode> {
        ALL.iter().copied().find(|kc| *kc as u8 == value)
    }

    /// Modifier-byte bit for this usage, 0 for anything but the eight
    /// modifier keys.
    pub fn modifier_bit(self) -> u8 {
        match self as u8 {
            usage @ 0xE0..=0xE7 => 1 << (usage - 0xE0),
            _ => 0,
        }
    }

    /// Short label for layout renderings.
    pub fn display_name(self) -> &'static str {
        match self {
            Keycode::None => "ERR",
            Keycode::A => "A",
            Keycode::B => "B",
            Keycode::C => "C",
            Keycode::D => "D",
            Keycode::E => "E",
            Keycode::F => "F",
            Keycode::G => "G",
            Keycode::H => "H",
            Keycode::I => "I",
            Keycode::J => "J",
            Keycode::K => "K",
            Keycode::L => "L",
            Keycode::M => "M",
            Keycode::N => "N",
            Keycode::O => "O",
            Keycode::P => "P",
            Keycode::Q => "Q",
            Keycode::R => "R",
            Keycode::S => "S",
            Keycode::T => "T",
            Keycode::U => "U",
            Keycode::V => "V",
            Keycode::W => "W",
            Keycode::X => "X",
            Keycode::Y => "Y",
            Keycode::Z => "Z",
            Keycode::N1 => "1",
            Keycode::N2 => "2",
            Keycode::N3 => "3",
            Keycode::N4 => "4",
            Keycode::N5 => "5",
            Keycode::N6 => "6",
            Keycode::N7 => "7",
            Keycode::N8 => "8",
            Keycode::N9 => "9",
            Keycode::N0 => "0",
            Keycode::Enter => "Ent",
            Keycode::Escape => "Esc",
            Keycode::Backspace => "Bksp",
            Keycode::Tab => "Tab",
            Keycode::Space => "Spc",
            Keycode::Minus => "-",
            Keycode::Equal => "=",
            Keycode::LBracket => "[",
            Keycode::RBracket => "]",
            Keycode::Backslash => "\\",
            Keycode::Semicolon => ";",
            Keycode::Quote => "'",
            Keycode::Grave => "`",
            Keycode::Comma => ",",
            Keycode::Dot => ".",
            Keycode::Slash => "/",
            Keycode::CapsLock => "Caps",
            Keycode::F1 => "F1",
            Keycode::F2 => "F2",
            Keycode::F3 => "F3",
            Keycode::F4 => "F4",
            Keycode::F5 => "F5",
            Keycode::F6 => "F6",
            Keycode::F7 => "F7",
            Keycode::F8 => "F8",
            Keycode::F9 => "F9",
            Keycode::F10 => "F10",
            Keycode::F11 => "F11",
            Keycode::F12 => "F12",
            Keycode::PrintScreen => "PScr",
            Keycode::ScrollLock => "ScrL",
            Keycode::Pause => "Paus",
            Keycode::Insert => "Ins",
            Keycode::Home => "Home",
            Keycode::PageUp => "PgUp",
            Keycode::Delete => "Del",
            Keycode::End => "End",
            Keycode::PageDown => "PgDn",
            Keycode::Right => "\u{2192}",
            Keycode::Left => "\u{2190}",
            Keycode::Down => "\u{2193}",
            Keycode::Up => "\u{2191}",
            Keycode::LCtrl => "Ctrl",
            Keycode::LShift => "Shft",
            Keycode::LAlt => "Alt",
            Keycode::LGui => "Gui",
            Keycode::RCtrl => "RCtl",
            Keycode::RShift => "RSft",
            Keycode::RAlt => "RAlt",
            Keycode::RGui => "RGui",
        }
    }
}
