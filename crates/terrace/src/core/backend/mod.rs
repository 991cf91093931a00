//! Terminal providers.

/// Crossterm terminal provider.
pub mod crossterm;

use crate::{
    binder::Capabilities,
    error::Result,
    geom::{Expanse, Point},
    reader::InputSource,
    screen::ScreenLine,
};

/// A terminal the runtime can draw to and read raw input from.
///
/// Input arrives as the characters the terminal sends, escape sequences
/// included, so that key maps built from [`Capabilities`] can resolve them.
pub trait Terminal: InputSource {
    /// Put the terminal into raw mode.
    fn enter_raw_mode(&mut self) -> Result<()>;

    /// Undo [`Terminal::enter_raw_mode`].
    fn restore(&mut self) -> Result<()>;

    /// The current size.
    fn size(&self) -> Result<Expanse>;

    /// Escape sequences for named keys.
    fn capabilities(&self) -> &dyn Capabilities;

    /// Replace the visible contents with `lines`, leaving the cursor at
    /// `cursor` or hiding it.
    fn draw(&mut self, lines: &[ScreenLine], cursor: Option<Point>) -> Result<()>;
}

/// Guard that pairs entering and leaving raw mode.
pub struct RawModeSession<'a, T: Terminal + ?Sized> {
    /// The terminal in raw mode.
    terminal: &'a mut T,
    /// Whether raw mode still has to be undone.
    active: bool,
}

impl<'a, T: Terminal + ?Sized> RawModeSession<'a, T> {
    /// Enter raw mode and create a guard that restores it.
    pub fn new(terminal: &'a mut T) -> Result<Self> {
        terminal.enter_raw_mode()?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// The terminal under the guard.
    pub fn terminal(&mut self) -> &mut T {
        self.terminal
    }

    /// Restore the terminal now rather than on drop.
    pub fn stop(&mut self) -> Result<()> {
        if self.active {
            self.active = false;
            self.terminal.restore()?;
        }
        Ok(())
    }
}

impl<T: Terminal + ?Sized> Drop for RawModeSession<'_, T> {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            drop(self.terminal.restore());
        }
    }
}
