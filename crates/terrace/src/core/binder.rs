//! Build key maps from terminal capabilities.
use std::time::Duration;

use crate::{
    error::Result,
    event::{
        InputEvent,
        key::{self, KeyEvent},
        mouse::MouseEvent,
    },
    keymap::{DEL, KeyMap, alt, ctrl},
    reader::{BindingReader, Input, InputSource},
};

/// Named terminal capabilities for keys whose sequences vary by terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Start of a mouse report.
    KeyMouse,
    /// Forward delete.
    KeyDc,
    /// Shift+Tab.
    KeyBtab,
    /// Backspace.
    KeyBackspace,
    /// Left arrow.
    KeyLeft,
    /// Right arrow.
    KeyRight,
    /// Up arrow.
    KeyUp,
    /// Down arrow.
    KeyDown,
    /// Function key, `1..=10`.
    KeyF(u8),
}

/// Lookup from capability names to the escape sequences a terminal sends.
pub trait Capabilities {
    /// The sequence for a capability, if the terminal has one.
    fn sequence(&self, cap: Capability) -> Option<String>;
}

/// Sequences sent by xterm-compatible terminals in normal cursor mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct XtermCapabilities;

impl Capabilities for XtermCapabilities {
    fn sequence(&self, cap: Capability) -> Option<String> {
        let s = match cap {
            Capability::KeyMouse => "\x1b[M",
            Capability::KeyDc => "\x1b[3~",
            Capability::KeyBtab => "\x1b[Z",
            Capability::KeyBackspace => "\x08",
            Capability::KeyLeft => "\x1b[D",
            Capability::KeyRight => "\x1b[C",
            Capability::KeyUp => "\x1b[A",
            Capability::KeyDown => "\x1b[B",
            Capability::KeyF(n) => match n {
                1 => "\x1bOP",
                2 => "\x1bOQ",
                3 => "\x1bOR",
                4 => "\x1bOS",
                5 => "\x1b[15~",
                6 => "\x1b[17~",
                7 => "\x1b[18~",
                8 => "\x1b[19~",
                9 => "\x1b[20~",
                10 => "\x1b[21~",
                _ => return None,
            },
        };
        Some(s.into())
    }
}

/// Arrow keys with their capabilities and the final byte of their xterm
/// modified forms.
const ARROWS: [(u32, Capability, char); 4] = [
    (key::CURSOR_LEFT, Capability::KeyLeft, 'D'),
    (key::CURSOR_RIGHT, Capability::KeyRight, 'C'),
    (key::CURSOR_UP, Capability::KeyUp, 'A'),
    (key::CURSOR_DOWN, Capability::KeyDown, 'B'),
];

/// Maps raw terminal input onto packed key codes.
pub struct KeyBinder<'a> {
    /// Capability lookup for the current terminal.
    caps: &'a dyn Capabilities,
}

impl<'a> KeyBinder<'a> {
    /// Construct a binder over a capability lookup.
    pub fn new(caps: &'a dyn Capabilities) -> Self {
        Self { caps }
    }

    /// Populate `keymap` with every binding the event model understands.
    pub fn bind_all(&self, keymap: &mut KeyMap<u32>) {
        keymap.set_unicode(key::UNICODE);
        keymap.bind_range(&key::CHAR, ' ', '~');

        for c in 'a'..='z' {
            let code = c as u32;
            keymap.bind(code | key::ALT_MASK, alt(&c.to_string()));
            keymap.bind(code | key::CTRL_MASK, ctrl(c));
        }

        keymap.bind_opt(key::MOUSE, self.caps.sequence(Capability::KeyMouse));
        keymap.bind(key::ENTER, "\r");
        keymap.bind(key::BACKSPACE, DEL.to_string());
        keymap.bind_opt(key::DELETE, self.caps.sequence(Capability::KeyDc));
        keymap.bind(key::TAB, "\t");
        keymap.bind_opt(key::BACKTAB, self.caps.sequence(Capability::KeyBtab));

        for n in 1..=10 {
            if let Some(code) = key::f(n) {
                keymap.bind_opt(code, self.caps.sequence(Capability::KeyF(n)));
            }
        }

        for (code, cap, suffix) in ARROWS {
            let seq = self.caps.sequence(cap);
            keymap.bind_opt(code | key::ALT_MASK, seq.as_deref().map(alt));
            keymap.bind_opt(code, seq);
            keymap.bind(code | key::CTRL_MASK, format!("\x1b[1;5{suffix}"));
            keymap.bind(code | key::SHIFT_MASK, format!("\x1b[1;2{suffix}"));
        }
    }

    /// Turn a resolved binding into a key event. Marker codes are replaced by
    /// the input that triggered them.
    pub fn resolve(code: u32, sequence: &str) -> KeyEvent {
        match code {
            key::CHAR => sequence
                .chars()
                .next()
                .map_or_else(|| KeyEvent::new(code), KeyEvent::from),
            key::UNICODE => KeyEvent::with_raw(key::UNICODE, sequence),
            _ => KeyEvent::new(code),
        }
    }

    /// Read the next input event, decoding mouse reports that follow the
    /// mouse capability. Returns `None` at end of input.
    pub fn read_event<S: InputSource>(
        reader: &mut BindingReader<S>,
        keymap: &KeyMap<u32>,
    ) -> Result<Option<InputEvent>> {
        loop {
            let Some(binding) = reader.read_binding(keymap)? else {
                return Ok(None);
            };
            if binding.value != key::MOUSE {
                return Ok(Some(InputEvent::Key(Self::resolve(
                    binding.value,
                    &binding.sequence,
                ))));
            }
            let mut report = [0u8; 3];
            for b in report.iter_mut() {
                match reader.read_char(Some(MOUSE_REPORT_TIMEOUT))? {
                    Input::Char(c) => *b = u8::try_from(u32::from(c)).unwrap_or(u8::MAX),
                    Input::Eof => return Ok(None),
                    Input::Timeout => break,
                }
            }
            if report.iter().all(|b| *b != 0) {
                return Ok(Some(InputEvent::Mouse(MouseEvent::from_x10(
                    report[0], report[1], report[2],
                ))));
            }
            tracing::debug!("truncated mouse report discarded");
        }
    }
}

/// How long to wait for the body of a mouse report.
const MOUSE_REPORT_TIMEOUT: Duration = Duration::from_millis(50);
