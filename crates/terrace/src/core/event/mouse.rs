//! Mouse events packed into a single bit set.
//!
//! Bits 0 to 4 hold exactly one event type, bits 5 to 10 the button and bits
//! 11 to 13 any combination of modifiers.
use geom::Point;

use super::key;

/// Button released.
pub const RELEASED: u32 = 0x1;
/// Button pressed.
pub const PRESSED: u32 = 0x2;
/// Wheel scrolled.
pub const WHEEL: u32 = 0x4;
/// Pointer moved with no button held.
pub const MOVED: u32 = 0x8;
/// Pointer moved with a button held.
pub const DRAGGED: u32 = 0x10;

/// No button involved.
pub const NO_BUTTON: u32 = 0x20;
/// Primary button.
pub const BUTTON1: u32 = 0x40;
/// Middle button.
pub const BUTTON2: u32 = 0x80;
/// Secondary button.
pub const BUTTON3: u32 = 0x100;
/// Wheel up.
pub const WHEEL_UP: u32 = 0x200;
/// Wheel down.
pub const WHEEL_DOWN: u32 = 0x400;

/// Shift held.
pub const SHIFT: u32 = 0x800;
/// Alt held.
pub const ALT: u32 = 0x1000;
/// Control held.
pub const CONTROL: u32 = 0x2000;

/// Bits holding the event type.
pub const TYPE_MASK: u32 = 0x1f;
/// Bits holding the button.
pub const BUTTON_MASK: u32 = 0x7e0;
/// Bits holding modifiers.
pub const MODIFIER_MASK: u32 = 0x3800;

/// Mouse action kinds.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Action {
    /// Button release.
    Released,
    /// Button press.
    Pressed,
    /// Wheel motion.
    Wheel,
    /// Mouse moved without button.
    Moved,
    /// Mouse drag with button held.
    Dragged,
}

impl Action {
    /// The type bit for this action.
    pub fn bits(&self) -> u32 {
        match self {
            Self::Released => RELEASED,
            Self::Pressed => PRESSED,
            Self::Wheel => WHEEL,
            Self::Moved => MOVED,
            Self::Dragged => DRAGGED,
        }
    }

    /// Decode the action from a packed bit set.
    fn from_bits(bits: u32) -> Option<Self> {
        match bits & TYPE_MASK {
            RELEASED => Some(Self::Released),
            PRESSED => Some(Self::Pressed),
            WHEEL => Some(Self::Wheel),
            MOVED => Some(Self::Moved),
            DRAGGED => Some(Self::Dragged),
            _ => None,
        }
    }
}

/// Mouse button codes.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Button {
    /// No button (for move events).
    None,
    /// Left mouse button.
    Left,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Right,
    /// Wheel rolled up.
    WheelUp,
    /// Wheel rolled down.
    WheelDown,
}

impl Button {
    /// The button bit for this button.
    pub fn bits(&self) -> u32 {
        match self {
            Self::None => NO_BUTTON,
            Self::Left => BUTTON1,
            Self::Middle => BUTTON2,
            Self::Right => BUTTON3,
            Self::WheelUp => WHEEL_UP,
            Self::WheelDown => WHEEL_DOWN,
        }
    }

    /// Decode the button from a packed bit set.
    fn from_bits(bits: u32) -> Option<Self> {
        match bits & BUTTON_MASK {
            NO_BUTTON => Some(Self::None),
            BUTTON1 => Some(Self::Left),
            BUTTON2 => Some(Self::Middle),
            BUTTON3 => Some(Self::Right),
            WHEEL_UP => Some(Self::WheelUp),
            WHEEL_DOWN => Some(Self::WheelDown),
            _ => None,
        }
    }
}

/// Translate keyboard modifier state into mouse modifier bits.
fn mod_bits(mods: key::Mods) -> u32 {
    let mut bits = 0;
    if mods.shift {
        bits |= SHIFT;
    }
    if mods.alt {
        bits |= ALT;
    }
    if mods.ctrl {
        bits |= CONTROL;
    }
    bits
}

/// A mouse event at a cell location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Packed type, button and modifier bits.
    bits: u32,
}

impl MouseEvent {
    /// Construct an event from raw bits.
    pub fn new(x: i32, y: i32, bits: u32) -> Self {
        Self { x, y, bits }
    }

    /// Construct an event from structured parts.
    pub fn of(loc: impl Into<Point>, action: Action, button: Button, mods: key::Mods) -> Self {
        let loc = loc.into();
        Self::new(
            loc.x,
            loc.y,
            action.bits() | button.bits() | mod_bits(mods),
        )
    }

    /// The packed bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Event location.
    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// True when every bit in `mask` is set.
    pub fn has(&self, mask: u32) -> bool {
        self.bits & mask == mask
    }

    /// True when a type bit is set.
    pub fn has_type(&self) -> bool {
        self.bits & TYPE_MASK != 0
    }

    /// True when a button bit is set.
    pub fn has_button(&self) -> bool {
        self.bits & BUTTON_MASK != 0
    }

    /// True when any modifier bit is set.
    pub fn has_modifier(&self) -> bool {
        self.bits & MODIFIER_MASK != 0
    }

    /// The action, if exactly one known type bit is set.
    pub fn action(&self) -> Option<Action> {
        Action::from_bits(self.bits)
    }

    /// The button, if exactly one known button bit is set.
    pub fn button(&self) -> Option<Button> {
        Button::from_bits(self.bits)
    }

    /// Modifier state expressed as keyboard modifiers.
    pub fn mods(&self) -> key::Mods {
        key::Mods {
            shift: self.has(SHIFT),
            ctrl: self.has(CONTROL),
            alt: self.has(ALT),
        }
    }

    /// Decode an X10/normal-tracking report, the three bytes following
    /// `ESC [ M`. Coordinates in the report are one-based and offset by 32.
    pub fn from_x10(cb: u8, cx: u8, cy: u8) -> Self {
        let cb = u32::from(cb.saturating_sub(32));
        let x = i32::from(cx.saturating_sub(33));
        let y = i32::from(cy.saturating_sub(33));

        let mut bits = 0;
        if cb & 4 != 0 {
            bits |= SHIFT;
        }
        if cb & 8 != 0 {
            bits |= ALT;
        }
        if cb & 16 != 0 {
            bits |= CONTROL;
        }

        let motion = cb & 32 != 0;
        if cb & 64 != 0 {
            bits |= WHEEL;
            bits |= if cb & 1 == 0 { WHEEL_UP } else { WHEEL_DOWN };
        } else {
            let button = match cb & 3 {
                0 => BUTTON1,
                1 => BUTTON2,
                2 => BUTTON3,
                _ => NO_BUTTON,
            };
            bits |= button;
            bits |= match (motion, button == NO_BUTTON) {
                (true, true) => MOVED,
                (true, false) => DRAGGED,
                (false, true) => RELEASED,
                (false, false) => PRESSED,
            };
        }
        Self::new(x, y, bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::key::{Ctrl, Empty, Shift};

    #[test]
    fn has_type() {
        assert!(!MouseEvent::new(0, 0, 0).has_type());
        assert!(!MouseEvent::new(0, 0, SHIFT).has_type());
        for t in [RELEASED, PRESSED, WHEEL, MOVED, DRAGGED] {
            assert!(MouseEvent::new(0, 0, t).has_type());
        }
        assert!(!MouseEvent::new(0, 0, BUTTON1).has_type());
        assert!(!MouseEvent::new(0, 0, BUTTON3 | CONTROL).has_type());
        assert!(MouseEvent::new(0, 0, SHIFT | DRAGGED).has_type());
    }

    #[test]
    fn has_button() {
        assert!(!MouseEvent::new(0, 0, 0).has_button());
        assert!(!MouseEvent::new(0, 0, ALT).has_button());
        assert!(!MouseEvent::new(0, 0, PRESSED).has_button());
        for b in [BUTTON1, BUTTON2, BUTTON3] {
            assert!(MouseEvent::new(0, 0, b).has_button());
        }
        assert!(MouseEvent::new(0, 0, BUTTON3 | CONTROL).has_button());
        assert!(!MouseEvent::new(0, 0, SHIFT | DRAGGED).has_button());
    }

    #[test]
    fn has_modifier() {
        assert!(!MouseEvent::new(0, 0, 0).has_modifier());
        for m in [SHIFT, ALT, CONTROL] {
            assert!(MouseEvent::new(0, 0, m).has_modifier());
        }
        assert!(!MouseEvent::new(0, 0, BUTTON3 | DRAGGED).has_modifier());
        assert!(MouseEvent::new(0, 0, SHIFT | DRAGGED).has_modifier());
        assert!(MouseEvent::new(0, 0, SHIFT).has(SHIFT));
        assert!(!MouseEvent::new(0, 0, SHIFT).has(ALT));
    }

    #[test]
    fn structured() {
        let m = MouseEvent::of((3, 4), Action::Pressed, Button::Left, Ctrl + Shift);
        assert_eq!(m.bits(), PRESSED | BUTTON1 | CONTROL | SHIFT);
        assert_eq!(m.action(), Some(Action::Pressed));
        assert_eq!(m.button(), Some(Button::Left));
        assert_eq!(m.mods(), Ctrl + Shift);
        assert_eq!(m.location(), Point::new(3, 4));

        let m = MouseEvent::new(0, 0, PRESSED | RELEASED);
        assert_eq!(m.action(), None);
    }

    #[test]
    fn x10_reports() {
        // Left press at column 1, row 1.
        let m = MouseEvent::from_x10(32, 33, 33);
        assert_eq!(m, MouseEvent::of((0, 0), Action::Pressed, Button::Left, Empty));
        // Release.
        let m = MouseEvent::from_x10(35, 40, 35);
        assert_eq!(m.action(), Some(Action::Released));
        assert_eq!(m.location(), Point::new(7, 2));
        // Wheel down.
        let m = MouseEvent::from_x10(32 + 65, 33, 33);
        assert!(m.has(WHEEL | WHEEL_DOWN));
        // Drag with the right button and shift.
        let m = MouseEvent::from_x10(32 + 32 + 4 + 2, 33, 33);
        assert!(m.has(DRAGGED | BUTTON3 | SHIFT));
    }
}
