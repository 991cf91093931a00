//! A terminal that replays scripted input and records what was drawn.
use std::time::Duration;

use crate::{
    backend::Terminal,
    binder::{Capabilities, XtermCapabilities},
    error::Result,
    geom::{Expanse, Point},
    reader::{Input, InputSource, ScriptedInput},
    screen::ScreenLine,
};

/// A [`Terminal`] for tests.
#[derive(Debug)]
pub struct ScriptedTerminal {
    /// Pending input.
    input: ScriptedInput,
    /// Reported size.
    size: Expanse,
    /// Text of every frame drawn, one string per row.
    frames: Vec<Vec<String>>,
    /// Cursor position of every frame drawn.
    cursors: Vec<Option<Point>>,
    /// Currently in raw mode?
    raw: bool,
    /// Number of raw mode entries and exits.
    transitions: usize,
    /// Key sequences.
    caps: XtermCapabilities,
}

impl ScriptedTerminal {
    /// A terminal of the given size that will deliver `script` as input.
    pub fn new(rows: i32, columns: i32, script: &str) -> Result<Self> {
        Ok(Self {
            input: ScriptedInput::new(script),
            size: Expanse::new(rows, columns)?,
            frames: vec![],
            cursors: vec![],
            raw: false,
            transitions: 0,
            caps: XtermCapabilities,
        })
    }

    /// Queue more input.
    pub fn push_input(&mut self, more: &str) {
        self.input.push(more);
    }

    /// Change the reported size.
    pub fn set_size(&mut self, rows: i32, columns: i32) -> Result<()> {
        self.size = Expanse::new(rows, columns)?;
        Ok(())
    }

    /// Every frame drawn so far.
    pub fn frames(&self) -> &[Vec<String>] {
        &self.frames
    }

    /// The most recent frame.
    pub fn last_frame(&self) -> Option<&[String]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// The cursor of the most recent frame.
    pub fn last_cursor(&self) -> Option<Point> {
        self.cursors.last().copied().flatten()
    }

    /// Is the terminal in raw mode?
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// How many times raw mode was entered or left.
    pub fn raw_transitions(&self) -> usize {
        self.transitions
    }
}

impl InputSource for ScriptedTerminal {
    fn read(&mut self, timeout: Option<Duration>) -> Result<Input> {
        self.input.read(timeout)
    }
}

impl Terminal for ScriptedTerminal {
    fn enter_raw_mode(&mut self) -> Result<()> {
        self.raw = true;
        self.transitions += 1;
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        self.raw = false;
        self.transitions += 1;
        Ok(())
    }

    fn size(&self) -> Result<Expanse> {
        Ok(self.size)
    }

    fn capabilities(&self) -> &dyn Capabilities {
        &self.caps
    }

    fn draw(&mut self, lines: &[ScreenLine], cursor: Option<Point>) -> Result<()> {
        self.frames.push(lines.iter().map(ScreenLine::text).collect());
        self.cursors.push(cursor);
        Ok(())
    }
}
