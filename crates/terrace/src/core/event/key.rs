//! Keyboard events packed into a single integer code.
//!
//! The low 20 bits hold the key itself: printable characters use their code
//! point, named keys live at `0x100000` and above. Bits 28 to 31 carry the
//! modifier flags. Codes at `0x1000000` and above are dispatch markers used by
//! key maps and never appear on a resolved event except `UNICODE`.
use std::ops::Add;

/// Cursor up.
pub const CURSOR_UP: u32 = 0x100000;
/// Cursor down.
pub const CURSOR_DOWN: u32 = 0x100001;
/// Cursor left.
pub const CURSOR_LEFT: u32 = 0x100002;
/// Cursor right.
pub const CURSOR_RIGHT: u32 = 0x100003;
/// Enter/return.
pub const ENTER: u32 = 0x100004;
/// Backspace.
pub const BACKSPACE: u32 = 0x100005;
/// Forward delete.
pub const DELETE: u32 = 0x100006;
/// Tab.
pub const TAB: u32 = 0x100007;
/// Shift+Tab.
pub const BACKTAB: u32 = 0x100008;
/// F1. F2 through F10 follow consecutively.
pub const F1: u32 = 0x100009;
/// F10.
pub const F10: u32 = F1 + 9;

/// Marker for any printable character binding.
pub const CHAR: u32 = 0x1000000;
/// Marker for the start of a mouse report.
pub const MOUSE: u32 = 0x1000001;
/// Marker for input outside the bound ASCII range.
pub const UNICODE: u32 = 0x1000002;

/// Bits holding the key code proper.
pub const CHAR_MASK: u32 = 0x000f_ffff;
/// Bits reserved for modifiers and dispatch markers.
pub const SPECIAL_MASK: u32 = 0xfff0_0000;
/// Shift modifier bit.
pub const SHIFT_MASK: u32 = 0x1000_0000;
/// Control modifier bit.
pub const CTRL_MASK: u32 = 0x4000_0000;
/// Alt modifier bit.
pub const ALT_MASK: u32 = 0x8000_0000;

/// All modifier bits.
const MODIFIER_MASK: u32 = 0xf000_0000;

/// Return the code for function key `n`, where `n` is in `1..=10`.
pub fn f(n: u8) -> Option<u32> {
    if (1..=10).contains(&n) {
        Some(F1 + u32::from(n) - 1)
    } else {
        None
    }
}

/// Modifier key state.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Mods {
    /// Shift is active.
    pub shift: bool,
    /// Control is active.
    pub ctrl: bool,
    /// Alt is active.
    pub alt: bool,
}

impl Mods {
    /// Extract modifier flags from a packed key code.
    pub fn from_code(code: u32) -> Self {
        Self {
            shift: code & SHIFT_MASK != 0,
            ctrl: code & CTRL_MASK != 0,
            alt: code & ALT_MASK != 0,
        }
    }

    /// The modifier bits to OR onto a key code.
    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.shift {
            bits |= SHIFT_MASK;
        }
        if self.ctrl {
            bits |= CTRL_MASK;
        }
        if self.alt {
            bits |= ALT_MASK;
        }
        bits
    }
}

impl Add<char> for Mods {
    type Output = KeyEvent;

    fn add(self, other: char) -> Self::Output {
        let mut k = KeyEvent::from(other);
        k.code |= self.bits();
        k
    }
}

impl Add<u32> for Mods {
    type Output = KeyEvent;

    /// Combine modifiers with a named key code such as `CURSOR_LEFT`.
    fn add(self, code: u32) -> Self::Output {
        KeyEvent::new(code | self.bits())
    }
}

impl Add<Self> for Mods {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            shift: self.shift || other.shift,
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
        }
    }
}

/// No modifiers pressed.
#[allow(non_upper_case_globals)]
pub const Empty: Mods = Mods {
    shift: false,
    ctrl: false,
    alt: false,
};

/// Shift-only modifier state.
#[allow(non_upper_case_globals)]
pub const Shift: Mods = Mods {
    shift: true,
    ctrl: false,
    alt: false,
};

/// Control-only modifier state.
#[allow(non_upper_case_globals)]
pub const Ctrl: Mods = Mods {
    shift: false,
    ctrl: true,
    alt: false,
};

/// Alt-only modifier state.
#[allow(non_upper_case_globals)]
pub const Alt: Mods = Mods {
    shift: false,
    ctrl: false,
    alt: true,
};

/// A resolved keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Packed key code and modifier bits.
    code: u32,
    /// Raw input for events that do not fit the code space.
    raw: Option<String>,
}

impl KeyEvent {
    /// Construct an event from a packed code.
    pub fn new(code: u32) -> Self {
        Self { code, raw: None }
    }

    /// Construct an event carrying the raw text that produced it.
    pub fn with_raw(code: u32, raw: impl Into<String>) -> Self {
        Self {
            code,
            raw: Some(raw.into()),
        }
    }

    /// The packed code.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Raw unicode input, present for `UNICODE` events.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Is the shift bit set?
    pub fn has_shift(&self) -> bool {
        self.code & SHIFT_MASK != 0
    }

    /// Is the control bit set?
    pub fn has_ctrl(&self) -> bool {
        (self.code >> 30) & 1 == 1
    }

    /// Is the alt bit set?
    pub fn has_alt(&self) -> bool {
        self.code & ALT_MASK != 0
    }

    /// Modifier state of this event.
    pub fn mods(&self) -> Mods {
        Mods::from_code(self.code)
    }

    /// The key with modifier and marker bits stripped.
    pub fn plain_key(&self) -> u32 {
        self.code & !SPECIAL_MASK
    }

    /// Does this event match `code`, ignoring modifiers? Passing a code that
    /// itself carries modifier bits therefore never matches.
    pub fn is_key(&self, code: u32) -> bool {
        self.code & !MODIFIER_MASK == code
    }

    /// True when no modifier or marker bits are set.
    pub fn is_plain(&self) -> bool {
        self.code & !CHAR_MASK == 0
    }

    /// The character for this key, if the key is a code point below the
    /// named-key range.
    pub fn as_char(&self) -> Option<char> {
        if let Some(raw) = &self.raw {
            return raw.chars().next();
        }
        let key = self.code & !MODIFIER_MASK;
        if key >= CURSOR_UP {
            return None;
        }
        char::from_u32(key)
    }
}

impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        let code = c as u32;
        if code > CHAR_MASK {
            Self::with_raw(UNICODE, c.to_string())
        } else {
            Self::new(code)
        }
    }
}

impl From<u32> for KeyEvent {
    fn from(code: u32) -> Self {
        Self::new(code)
    }
}

impl PartialEq<char> for KeyEvent {
    fn eq(&self, c: &char) -> bool {
        *self == Self::from(*c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_bits() {
        let k = Ctrl + 'a';
        assert_eq!(k.code(), 'a' as u32 | CTRL_MASK);
        assert!(k.has_ctrl());
        assert!(!k.has_alt());
        assert!(!k.has_shift());
        assert_eq!(k.plain_key(), 'a' as u32);
        assert!(k.is_key('a' as u32));
        assert!(!k.is_plain());

        let k = Alt + Shift + CURSOR_LEFT;
        assert!(k.has_alt());
        assert!(k.has_shift());
        assert!(!k.has_ctrl());
        assert!(k.is_key(CURSOR_LEFT));
        assert_eq!(k.mods(), Alt + Shift);
    }

    #[test]
    fn plain_keys() {
        let k = KeyEvent::from('q');
        assert!(k.is_plain());
        assert_eq!(k, 'q');
        assert_eq!(k.as_char(), Some('q'));
        assert_eq!(KeyEvent::new(ENTER).as_char(), None);
        assert!(!KeyEvent::new(ENTER).is_plain());
        assert!(!KeyEvent::new(CHAR).is_plain());
        assert!(KeyEvent::from('é').is_plain());
    }

    #[test]
    fn unicode_overflow() {
        // Code points below the named-key range keep their own code.
        let k = KeyEvent::from('🦀');
        assert_eq!(k.code(), 0x1F980);
        assert_eq!(k.raw(), None);
        assert_eq!(k.as_char(), Some('🦀'));

        let k = KeyEvent::from('\u{10FFFD}');
        assert_eq!(k.code(), UNICODE);
        assert_eq!(k.raw(), Some("\u{10FFFD}"));
        assert_eq!(k.as_char(), Some('\u{10FFFD}'));
    }

    #[test]
    fn function_keys() {
        assert_eq!(f(1), Some(F1));
        assert_eq!(f(10), Some(F10));
        assert_eq!(f(0), None);
        assert_eq!(f(11), None);
        assert_eq!(F1, BACKTAB + 1);
    }
}
