use std::{
    io::{self, Stdout, Write},
    mem, panic,
    sync::mpsc,
    thread,
    time::Duration,
};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor as ccursor, event as cevent, style, terminal,
};
use scopeguard::{ScopeGuard, guard};

use crate::{
    backend::Terminal,
    binder::{Capabilities, Capability, XtermCapabilities},
    component::{self, Component, RunloopOptions},
    error::{Error, Result},
    geom::{Expanse, Point},
    keymap::{DEL, ESC, alt, ctrl},
    reader::{Input, InputSource},
    screen::{Glyph, ScreenLine},
    style::{Color, StyleBits},
};

/// Map IO results into terrace errors.
fn translate_result<T>(e: io::Result<T>) -> Result<T> {
    e.map_err(|e| Error::Terminal(e.to_string()))
}

/// Translate a terrace color into a crossterm color.
fn translate_color(c: Color) -> style::Color {
    style::Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Attribute pairs applied in order when drawing.
const ATTRIBUTES: [(StyleBits, style::Attribute); 8] = [
    (StyleBits::BOLD, style::Attribute::Bold),
    (StyleBits::FAINT, style::Attribute::Dim),
    (StyleBits::ITALIC, style::Attribute::Italic),
    (StyleBits::UNDERLINE, style::Attribute::Underlined),
    (StyleBits::BLINK, style::Attribute::SlowBlink),
    (StyleBits::INVERSE, style::Attribute::Reverse),
    (StyleBits::CONCEAL, style::Attribute::Hidden),
    (StyleBits::CROSSEDOUT, style::Attribute::CrossedOut),
];

/// Encode a crossterm mouse button as the low bits of an X10 report.
fn button_bits(b: cevent::MouseButton) -> u8 {
    match b {
        cevent::MouseButton::Left => 0,
        cevent::MouseButton::Middle => 1,
        cevent::MouseButton::Right => 2,
    }
}

/// Encode a crossterm mouse event as an X10 mouse report.
fn encode_mouse(m: &cevent::MouseEvent, caps: &dyn Capabilities) -> Option<String> {
    let mut cb = match m.kind {
        cevent::MouseEventKind::Down(b) => button_bits(b),
        cevent::MouseEventKind::Up(_) => 3,
        cevent::MouseEventKind::Drag(b) => 32 | button_bits(b),
        cevent::MouseEventKind::Moved => 32 | 3,
        cevent::MouseEventKind::ScrollUp => 64,
        cevent::MouseEventKind::ScrollDown => 65,
        cevent::MouseEventKind::ScrollLeft | cevent::MouseEventKind::ScrollRight => return None,
    };
    if m.modifiers.contains(cevent::KeyModifiers::SHIFT) {
        cb |= 4;
    }
    if m.modifiers.contains(cevent::KeyModifiers::ALT) {
        cb |= 8;
    }
    if m.modifiers.contains(cevent::KeyModifiers::CONTROL) {
        cb |= 16;
    }
    let coord = |v: u16| char::from(u8::try_from(v.saturating_add(33)).unwrap_or(u8::MAX));
    let mut s = caps.sequence(Capability::KeyMouse)?;
    s.push(char::from(cb + 32));
    s.push(coord(m.column));
    s.push(coord(m.row));
    Some(s)
}

/// Encode an arrow key. Control and shift use the xterm modified forms, which
/// end in the same final byte as the plain sequence.
fn arrow(
    cap: Capability,
    suffix: char,
    mods: cevent::KeyModifiers,
    caps: &dyn Capabilities,
) -> Option<String> {
    if mods.contains(cevent::KeyModifiers::CONTROL) {
        Some(format!("\x1b[1;5{suffix}"))
    } else if mods.contains(cevent::KeyModifiers::SHIFT) {
        Some(format!("\x1b[1;2{suffix}"))
    } else {
        caps.sequence(cap)
    }
}

/// Translate a crossterm event back into the characters a terminal would
/// have sent for it. Events with no such encoding produce `None`.
fn translate_event(e: &cevent::Event, caps: &dyn Capabilities) -> Option<String> {
    match e {
        cevent::Event::Key(k) => {
            if k.kind == cevent::KeyEventKind::Release {
                return None;
            }
            let seq = match k.code {
                cevent::KeyCode::Char(c) => {
                    if k.modifiers.contains(cevent::KeyModifiers::CONTROL) && c.is_ascii() {
                        ctrl(c)
                    } else {
                        c.to_string()
                    }
                }
                cevent::KeyCode::Enter => "\r".into(),
                cevent::KeyCode::Tab => "\t".into(),
                cevent::KeyCode::Esc => ESC.to_string(),
                cevent::KeyCode::Backspace => DEL.to_string(),
                cevent::KeyCode::BackTab => caps.sequence(Capability::KeyBtab)?,
                cevent::KeyCode::Delete => caps.sequence(Capability::KeyDc)?,
                cevent::KeyCode::Left => arrow(Capability::KeyLeft, 'D', k.modifiers, caps)?,
                cevent::KeyCode::Right => arrow(Capability::KeyRight, 'C', k.modifiers, caps)?,
                cevent::KeyCode::Up => arrow(Capability::KeyUp, 'A', k.modifiers, caps)?,
                cevent::KeyCode::Down => arrow(Capability::KeyDown, 'B', k.modifiers, caps)?,
                cevent::KeyCode::F(n) => caps.sequence(Capability::KeyF(n))?,
                _ => return None,
            };
            if k.modifiers.contains(cevent::KeyModifiers::ALT) {
                Some(alt(&seq))
            } else {
                Some(seq)
            }
        }
        cevent::Event::Mouse(m) => encode_mouse(m, caps),
        cevent::Event::Paste(s) => Some(s.clone()),
        _ => None,
    }
}

/// Thread entry that forwards crossterm input into the character channel.
fn event_emitter(tx: mpsc::Sender<char>) -> Result<()> {
    thread::Builder::new()
        .name("terrace-input".into())
        .spawn(move || {
            loop {
                match cevent::read() {
                    Ok(evt) => {
                        let Some(seq) = translate_event(&evt, &XtermCapabilities) else {
                            continue;
                        };
                        for c in seq.chars() {
                            if tx.send(c).is_err() {
                                // The terminal has been dropped.
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Crossterm event read error: {}", e);
                        return;
                    }
                }
            }
        })?;
    Ok(())
}

/// The panic hook that was active before ours, restored on drop.
type PanicHook = Box<dyn Fn(&panic::PanicHookInfo<'_>) + Sync + Send + 'static>;

/// A [`Terminal`] on stdout, reading input through crossterm.
pub struct CrosstermTerminal {
    /// Output handle.
    fp: Stdout,
    /// Raw input, started on first entry to raw mode.
    rx: Option<mpsc::Receiver<char>>,
    /// Session options.
    options: RunloopOptions,
    /// Saved panic hook while ours is installed.
    hook: Option<ScopeGuard<PanicHook, fn(PanicHook)>>,
    /// Key sequences.
    caps: XtermCapabilities,
}

impl CrosstermTerminal {
    /// Construct a terminal with default options.
    pub fn new() -> Self {
        Self::with_options(RunloopOptions::default())
    }

    /// Construct a terminal with custom options.
    pub fn with_options(options: RunloopOptions) -> Self {
        Self {
            fp: io::stdout(),
            rx: None,
            options,
            hook: None,
            caps: XtermCapabilities,
        }
    }

    /// Enter raw mode and enable mouse reporting.
    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.fp.execute(cevent::EnableMouseCapture)?;
        self.fp.execute(ccursor::Hide)?;
        Ok(())
    }

    /// Leave raw mode and restore terminal state.
    fn exit(&mut self) -> io::Result<()> {
        if self.options.clear_on_exit {
            self.fp.execute(terminal::Clear(terminal::ClearType::All))?;
        }
        self.fp.execute(cevent::DisableMouseCapture)?;
        self.fp.execute(ccursor::Show)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Install a hook that restores the terminal before reporting a panic.
    fn install_panic_hook(&mut self) {
        if self.hook.is_some() {
            return;
        }
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|pi| {
            let mut stderr = io::stderr();
            #[allow(unused_must_use)]
            {
                crossterm::execute!(
                    stderr,
                    cevent::DisableMouseCapture,
                    ccursor::Show
                );
                terminal::disable_raw_mode();
                eprintln!("{pi}");
            }
        }));
        let restore: fn(PanicHook) = |hook| panic::set_hook(hook);
        self.hook = Some(guard(previous, restore));
    }

    /// Put the previous panic hook back. The hook cannot be changed while the
    /// thread is unwinding, so in that case ours stays installed.
    fn release_panic_hook(&mut self) {
        let Some(g) = self.hook.take() else {
            return;
        };
        if thread::panicking() {
            mem::forget(ScopeGuard::into_inner(g));
        }
    }

    /// Apply a glyph's style to subsequent output.
    fn apply_style(&mut self, g: &Glyph) -> io::Result<()> {
        // Reset clears colors too, so colors go after it.
        self.fp
            .queue(style::SetAttribute(style::Attribute::Reset))?;
        if let Some(fg) = g.fg {
            self.fp.queue(style::SetForegroundColor(translate_color(fg)))?;
        }
        if let Some(bg) = g.bg {
            self.fp.queue(style::SetBackgroundColor(translate_color(bg)))?;
        }
        for (bit, attr) in ATTRIBUTES {
            if g.attrs.contains(bit) {
                self.fp.queue(style::SetAttribute(attr))?;
            }
        }
        Ok(())
    }

    /// Write the lines and position the cursor.
    fn render(&mut self, lines: &[ScreenLine], cursor: Option<Point>) -> io::Result<()> {
        self.fp.queue(ccursor::Hide)?;
        for (y, line) in lines.iter().enumerate() {
            let y = u16::try_from(y).unwrap_or(u16::MAX);
            self.fp.queue(ccursor::MoveTo(0, y))?;
            for (glyph, text) in line.runs() {
                self.apply_style(&glyph)?;
                self.fp.queue(style::Print(text))?;
            }
        }
        self.fp
            .queue(style::SetAttribute(style::Attribute::Reset))?;
        if let Some(p) = cursor {
            let x = u16::try_from(p.x.max(0)).unwrap_or(u16::MAX);
            let y = u16::try_from(p.y.max(0)).unwrap_or(u16::MAX);
            self.fp.queue(ccursor::MoveTo(x, y))?;
            self.fp.queue(ccursor::Show)?;
        }
        self.fp.flush()
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for CrosstermTerminal {
    fn read(&mut self, timeout: Option<Duration>) -> Result<Input> {
        match self.rx.as_mut() {
            Some(rx) => rx.read(timeout),
            None => Err(Error::Terminal("raw mode not entered".into())),
        }
    }
}

impl Terminal for CrosstermTerminal {
    fn enter_raw_mode(&mut self) -> Result<()> {
        if self.options.install_panic_hook {
            self.install_panic_hook();
        }
        translate_result(self.enter())?;
        if self.rx.is_none() {
            let (tx, rx) = mpsc::channel();
            event_emitter(tx)?;
            self.rx = Some(rx);
        }
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        self.release_panic_hook();
        translate_result(self.exit())
    }

    fn size(&self) -> Result<Expanse> {
        let (cols, rows) = translate_result(terminal::size())?;
        Ok(Expanse::try_from((cols, rows))?)
    }

    fn capabilities(&self) -> &dyn Capabilities {
        &self.caps
    }

    fn draw(&mut self, lines: &[ScreenLine], cursor: Option<Point>) -> Result<()> {
        translate_result(self.render(lines, cursor))
    }
}

/// Run a component on the terminal with default options.
pub fn runloop<C: Component + ?Sized>(component: &mut C) -> Result<C::Output> {
    runloop_with_options(component, RunloopOptions::default())
}

/// Run a component on the terminal with custom options.
pub fn runloop_with_options<C: Component + ?Sized>(
    component: &mut C,
    options: RunloopOptions,
) -> Result<C::Output> {
    let mut terminal = CrosstermTerminal::with_options(options);
    component::run(component, &mut terminal, &options)
}

#[cfg(test)]
mod tests {
    use std::panic::AssertUnwindSafe;

    use super::*;
    use crate::{
        binder::KeyBinder,
        event::{InputEvent, key, mouse},
        keymap::KeyMap,
        reader::{BindingReader, ScriptedInput},
    };

    /// Round a crossterm event through the key binder.
    fn resolve(e: &cevent::Event) -> Result<Option<InputEvent>> {
        let mut km = KeyMap::new();
        KeyBinder::new(&XtermCapabilities).bind_all(&mut km);
        let seq = translate_event(e, &XtermCapabilities).unwrap_or_default();
        let mut reader = BindingReader::new(ScriptedInput::new(&seq));
        KeyBinder::read_event(&mut reader, &km)
    }

    fn key_event(code: cevent::KeyCode, mods: cevent::KeyModifiers) -> cevent::Event {
        cevent::Event::Key(cevent::KeyEvent::new(code, mods))
    }

    #[test]
    fn keys() -> Result<()> {
        let none = cevent::KeyModifiers::NONE;
        assert_eq!(
            resolve(&key_event(cevent::KeyCode::Up, none))?,
            Some(InputEvent::Key(key::KeyEvent::new(key::CURSOR_UP)))
        );
        assert_eq!(
            resolve(&key_event(cevent::KeyCode::Enter, none))?,
            Some(InputEvent::Key(key::KeyEvent::new(key::ENTER)))
        );
        assert_eq!(
            resolve(&key_event(cevent::KeyCode::Char('x'), none))?,
            Some(InputEvent::Key(key::KeyEvent::from('x')))
        );
        assert_eq!(
            resolve(&key_event(cevent::KeyCode::F(5), none))?,
            Some(InputEvent::Key(key::KeyEvent::new(key::F1 + 4)))
        );
        assert_eq!(
            translate_event(
                &key_event(cevent::KeyCode::Char('a'), cevent::KeyModifiers::CONTROL),
                &XtermCapabilities
            ),
            Some("\x01".into())
        );
        assert_eq!(
            translate_event(
                &key_event(cevent::KeyCode::Char('a'), cevent::KeyModifiers::ALT),
                &XtermCapabilities
            ),
            Some("\x1ba".into())
        );
        assert_eq!(
            translate_event(&key_event(cevent::KeyCode::Home, none), &XtermCapabilities),
            None
        );
        Ok(())
    }

    #[test]
    fn modified_arrows() -> Result<()> {
        let ctrl = cevent::KeyModifiers::CONTROL;
        let shift = cevent::KeyModifiers::SHIFT;
        assert_eq!(
            resolve(&key_event(cevent::KeyCode::Left, ctrl))?,
            Some(InputEvent::Key(key::KeyEvent::new((key::Ctrl + key::CURSOR_LEFT).code())))
        );
        assert_eq!(
            resolve(&key_event(cevent::KeyCode::Down, shift))?,
            Some(InputEvent::Key(key::KeyEvent::new((key::Shift + key::CURSOR_DOWN).code())))
        );
        assert_eq!(
            translate_event(&key_event(cevent::KeyCode::Up, ctrl), &XtermCapabilities),
            Some("\x1b[1;5A".into())
        );
        assert_eq!(
            resolve(&key_event(cevent::KeyCode::Right, cevent::KeyModifiers::ALT))?,
            Some(InputEvent::Key(key::KeyEvent::new((key::Alt + key::CURSOR_RIGHT).code())))
        );
        Ok(())
    }

    #[test]
    fn hook_kept_while_unwinding() {
        let mut term = CrosstermTerminal::new();
        term.install_panic_hook();
        assert!(term.hook.is_some());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _cleanup = guard((), |()| term.release_panic_hook());
            panic!("component failed");
        }));
        assert!(outcome.is_err());
        assert!(term.hook.is_none());
        // The previous hook is still reachable: releasing outside a panic
        // restores it without aborting.
        term.install_panic_hook();
        term.release_panic_hook();
        assert!(term.hook.is_none());
    }

    #[test]
    fn mouse_reports() -> Result<()> {
        let e = cevent::Event::Mouse(cevent::MouseEvent {
            kind: cevent::MouseEventKind::Down(cevent::MouseButton::Left),
            column: 4,
            row: 2,
            modifiers: cevent::KeyModifiers::NONE,
        });
        assert_eq!(
            resolve(&e)?,
            Some(InputEvent::Mouse(mouse::MouseEvent::of(
                (4, 2),
                mouse::Action::Pressed,
                mouse::Button::Left,
                key::Empty
            )))
        );
        let e = cevent::Event::Mouse(cevent::MouseEvent {
            kind: cevent::MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: cevent::KeyModifiers::NONE,
        });
        let Some(InputEvent::Mouse(m)) = resolve(&e)? else {
            panic!("expected a mouse event");
        };
        assert!(m.has(mouse::WHEEL | mouse::WHEEL_DOWN));
        Ok(())
    }
}
