//! Physical key identifiers reported by the host.

use serde::{Deserialize, Serialize};

/// A physical (or remapped virtual) keyboard key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Keys {
    #[default]
    None,
    Back,
    Tab,
    Enter,
    CapsLock,
    Escape,
    Space,
    PageUp,
    PageDown,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
    PrintScreen,
    Insert,
    Delete,
    Pause,
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    D8,
    D9,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    LeftWindows,
    RightWindows,
    NumPad0,
    NumPad1,
    NumPad2,
    NumPad3,
    NumPad4,
    NumPad5,
    NumPad6,
    NumPad7,
    NumPad8,
    NumPad9,
    Multiply,
    Add,
    Separator,
    Subtract,
    Decimal,
    Divide,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    NumLock,
    Scroll,
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,
    OemSemicolon,
    OemPlus,
    OemComma,
    OemMinus,
    OemPeriod,
    OemQuestion,
    OemTilde,
    OemOpenBrackets,
    OemPipe,
    OemCloseBrackets,
    OemQuotes,
    OemBackslash,
}

impl Keys {
    pub fn is_letter(self) -> bool {
        (Keys::A..=Keys::Z).contains(&self)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, Keys::LeftShift | Keys::RightShift)
    }

    /// Unshifted and shifted characters for keys whose character depends on
    /// the shift state.
    pub fn shift_mapping(self) -> Option<(char, char)> {
        let pair = match self {
            Keys::OemComma => (',', '<'),
            Keys::OemMinus => ('-', '_'),
            Keys::OemOpenBrackets => ('[', '{'),
            Keys::OemCloseBrackets => (']', '}'),
            Keys::OemPeriod => ('.', '>'),
            Keys::OemBackslash | Keys::OemPipe => ('\\', '|'),
            Keys::OemPlus => ('=', '+'),
            Keys::OemQuestion => ('/', '?'),
            Keys::OemQuotes => ('\'', '"'),
            Keys::OemSemicolon => (';', ':'),
            Keys::OemTilde => ('`', '~'),
            Keys::Space => (' ', ' '),
            Keys::Divide => ('/', '/'),
            Keys::Multiply => ('*', '*'),
            Keys::Subtract => ('-', '-'),
            Keys::Add => ('+', '+'),
            Keys::D0 => ('0', ')'),
            Keys::D1 => ('1', '!'),
            Keys::D2 => ('2', '@'),
            Keys::D3 => ('3', '#'),
            Keys::D4 => ('4', '$'),
            Keys::D5 => ('5', '%'),
            Keys::D6 => ('6', '^'),
            Keys::D7 => ('7', '&'),
            Keys::D8 => ('8', '*'),
            Keys::D9 => ('9', '('),
            k if k.is_letter() => {
                let lower = (b'a' + (k as u8 - Keys::A as u8)) as char;
                (lower, lower.to_ascii_uppercase())
            }
            _ => return None,
        };
        Some(pair)
    }

    /// Number pad digit and the navigation key it acts as when NumLock is off.
    pub fn numpad_mapping(self) -> Option<(char, Keys)> {
        let pair = match self {
            Keys::Decimal => ('.', Keys::Delete),
            Keys::NumPad0 => ('0', Keys::Insert),
            Keys::NumPad1 => ('1', Keys::End),
            Keys::NumPad2 => ('2', Keys::Down),
            Keys::NumPad3 => ('3', Keys::PageDown),
            Keys::NumPad4 => ('4', Keys::Left),
            Keys::NumPad5 => ('5', Keys::D5),
            Keys::NumPad6 => ('6', Keys::Right),
            Keys::NumPad7 => ('7', Keys::Home),
            Keys::NumPad8 => ('8', Keys::Up),
            Keys::NumPad9 => ('9', Keys::PageUp),
            _ => return None,
        };
        Some(pair)
    }
}
