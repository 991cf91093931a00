//! The single-threaded render/read loop that drives interactive components.
//!
//! Each turn renders the component into a fresh [`Screen`], draws it, then
//! blocks until the terminal input resolves to one of the component's key
//! bindings. The terminal leaves raw mode on every exit path.
use std::time::Duration;

use tracing::{debug, trace};

use crate::{
    backend::{RawModeSession, Terminal},
    binder::Capabilities,
    error::Result,
    keymap::KeyMap,
    reader::{Binding, BindingReader, DEFAULT_AMBIGUOUS_TIMEOUT},
    screen::Screen,
};

/// Options for running a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunloopOptions {
    /// Install a panic hook that restores the terminal before the panic
    /// message is printed.
    pub install_panic_hook: bool,
    /// Clear the screen when raw mode is left.
    pub clear_on_exit: bool,
    /// Wait applied when a binding is also the prefix of a longer one.
    pub ambiguous_timeout_ms: u64,
}

impl RunloopOptions {
    /// The ambiguous-binding wait.
    pub fn ambiguous_timeout(&self) -> Duration {
        Duration::from_millis(self.ambiguous_timeout_ms)
    }
}

impl Default for RunloopOptions {
    fn default() -> Self {
        Self {
            install_panic_hook: true,
            clear_on_exit: false,
            ambiguous_timeout_ms: u64::try_from(DEFAULT_AMBIGUOUS_TIMEOUT.as_millis())
                .unwrap_or(50),
        }
    }
}

/// An interactive component.
pub trait Component {
    /// The operations key bindings resolve to.
    type Operation: Clone;
    /// The value a finished run produces.
    type Output;

    /// Populate the key map.
    fn bind_keys(&self, keymap: &mut KeyMap<Self::Operation>, caps: &dyn Capabilities);

    /// Draw the current state.
    fn render(&self, screen: &mut Screen) -> Result<()>;

    /// Apply one resolved binding. Returns true when the component is done.
    fn read(&mut self, binding: Binding<Self::Operation>) -> Result<bool>;

    /// The outcome of the run.
    fn result(&self) -> Self::Output;

    /// Called before the terminal enters raw mode.
    fn pre_run(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called after the terminal has been restored.
    fn post_run(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Render the component and hand the frame to the terminal.
fn draw<C, T>(component: &C, screen: &mut Screen, terminal: &mut T) -> Result<()>
where
    C: Component + ?Sized,
    T: Terminal + ?Sized,
{
    let size = terminal.size()?;
    if size == screen.size() {
        screen.clear();
    } else {
        screen.resize(size.rows(), size.columns())?;
    }
    component.render(screen)?;
    let cursor = screen.show_cursor().then(|| screen.cursor_position());
    trace!(rows = size.rows(), columns = size.columns(), "render");
    terminal.draw(&screen.render_lines(), cursor)
}

/// The render/read loop proper.
fn drive<C, T>(component: &mut C, terminal: &mut T, options: &RunloopOptions) -> Result<()>
where
    C: Component + ?Sized,
    T: Terminal + ?Sized,
{
    let mut keymap = KeyMap::new();
    component.bind_keys(&mut keymap, terminal.capabilities());
    let mut screen = Screen::new(0, 0)?;
    let mut reader =
        BindingReader::new(terminal).with_ambiguous_timeout(options.ambiguous_timeout());
    loop {
        draw(component, &mut screen, &mut **reader.source_mut())?;
        let Some(binding) = reader.read_binding(&keymap)? else {
            debug!("input closed");
            return Ok(());
        };
        if component.read(binding)? {
            // One last frame so the final state stays on the terminal.
            return draw(component, &mut screen, &mut **reader.source_mut());
        }
    }
}

/// Run a component to completion on a terminal.
pub fn run<C, T>(component: &mut C, terminal: &mut T, options: &RunloopOptions) -> Result<C::Output>
where
    C: Component + ?Sized,
    T: Terminal + ?Sized,
{
    component.pre_run()?;
    let mut session = RawModeSession::new(terminal)?;
    let outcome = drive(component, session.terminal(), options);
    session.stop()?;
    outcome?;
    component.post_run()?;
    Ok(component.result())
}
