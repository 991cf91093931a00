//! A layered character grid.
//!
//! Drawing happens through a [`Writer`] bound to one z-indexed layer. Layers
//! are composited bottom to top when the screen is read back: any cell a
//! higher layer has touched replaces the cell below it wholesale, attributes
//! included.
use std::collections::BTreeMap;

use geom::{Expanse, Point};
use tracing::trace;

use crate::{
    error::Result,
    style::{BorderBits, Color, StyleBits},
};

/// Writers and their builder.
mod writer;

pub use writer::{Writer, WriterBuilder};

/// One grid position's content, style and border state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// Character content.
    pub content: Option<char>,
    /// Foreground color.
    pub fg: Option<Color>,
    /// Background color.
    pub bg: Option<Color>,
    /// Text attributes.
    pub style: Option<StyleBits>,
    /// Accumulated border bits.
    pub border: BorderBits,
}

impl Cell {
    /// The character this cell displays: its content, else a border glyph,
    /// else a space.
    pub fn glyph(&self) -> char {
        match self.content {
            Some(c) => c,
            None if !self.border.is_empty() => self.border.glyph(),
            None => ' ',
        }
    }
}

/// A single z-indexed grid. Cells are `None` until something touches them.
#[derive(Clone, Debug)]
struct Layer {
    /// Row-major cell storage.
    cells: Vec<Option<Cell>>,
    /// Layer dimensions.
    size: Expanse,
}

impl Layer {
    /// Construct an untouched layer.
    fn new(size: Expanse) -> Self {
        Self {
            cells: vec![None; size.area()],
            size,
        }
    }

    /// Convert a coordinate into a storage index, if it is on the grid.
    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if !self.size.rect().contains((x, y)) {
            return None;
        }
        Some(y as usize * self.size.columns() as usize + x as usize)
    }

    /// The cell at a coordinate, creating it if needed. Off-grid coordinates
    /// yield `None`.
    fn touch(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let i = self.idx(x, y)?;
        Some(self.cells[i].get_or_insert_with(Cell::default))
    }

    /// The cell at a coordinate, if it has been touched.
    fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.idx(x, y).and_then(|i| self.cells[i].as_ref())
    }
}

/// A rendered character with its final style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// Displayed character.
    pub ch: char,
    /// Foreground color, if any.
    pub fg: Option<Color>,
    /// Background color, if any.
    pub bg: Option<Color>,
    /// Text attributes.
    pub attrs: StyleBits,
}

impl Glyph {
    /// An unstyled space, used for cells no layer has touched.
    fn blank() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            attrs: StyleBits::empty(),
        }
    }

    /// True when two glyphs share a style and can be emitted in one run.
    pub fn same_style(&self, other: &Self) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.attrs == other.attrs
    }
}

impl From<&Cell> for Glyph {
    fn from(c: &Cell) -> Self {
        Self {
            ch: c.glyph(),
            fg: c.fg,
            bg: c.bg,
            attrs: c.style.unwrap_or_default(),
        }
    }
}

/// One composited row of the screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenLine {
    /// Glyphs, one per column.
    glyphs: Vec<Glyph>,
}

impl ScreenLine {
    /// The row's glyphs.
    pub fn cells(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// The row's characters with styling stripped.
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }

    /// Group the row into maximal runs of identically styled glyphs.
    pub fn runs(&self) -> Vec<(Glyph, String)> {
        let mut runs: Vec<(Glyph, String)> = Vec::new();
        for g in &self.glyphs {
            match runs.last_mut() {
                Some((style, text)) if style.same_style(g) => text.push(g.ch),
                _ => runs.push((*g, g.ch.to_string())),
            }
        }
        runs
    }
}

/// A stack of layers plus cursor state.
#[derive(Clone, Debug)]
pub struct Screen {
    /// Grid size shared by every layer.
    size: Expanse,
    /// Layers keyed by z-index, drawn in ascending order.
    layers: BTreeMap<i32, Layer>,
    /// Should the terminal cursor be visible?
    show_cursor: bool,
    /// Where the terminal cursor should be placed.
    cursor: Point,
}

impl Screen {
    /// Construct a screen with the given dimensions.
    pub fn new(rows: i32, columns: i32) -> Result<Self> {
        Ok(Self {
            size: Expanse::new(rows, columns)?,
            layers: BTreeMap::new(),
            show_cursor: false,
            cursor: Point::zero(),
        })
    }

    /// Change the dimensions, discarding every layer.
    pub fn resize(&mut self, rows: i32, columns: i32) -> Result<()> {
        let size = Expanse::new(rows, columns)?;
        trace!(rows, columns, "screen resize");
        self.size = size;
        self.layers.clear();
        Ok(())
    }

    /// Discard every layer, keeping the dimensions.
    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Number of rows.
    pub fn rows(&self) -> i32 {
        self.size.rows()
    }

    /// Number of columns.
    pub fn columns(&self) -> i32 {
        self.size.columns()
    }

    /// Screen dimensions.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// Start configuring a writer.
    pub fn writer_builder(&mut self) -> WriterBuilder<'_> {
        WriterBuilder::new(self)
    }

    /// A writer for layer 0 with no default color or style.
    pub fn writer(&mut self) -> Writer<'_> {
        self.writer_builder().build()
    }

    /// The layer at `z`, created on first use.
    fn layer_mut(&mut self, z: i32) -> &mut Layer {
        let size = self.size;
        self.layers.entry(z).or_insert_with(|| Layer::new(size))
    }

    /// The topmost touched cell at a coordinate.
    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.layers.values().rev().find_map(|l| l.get(x, y))
    }

    /// The composited grid, row-major. Untouched positions are `None`.
    pub fn cells(&self) -> Vec<Vec<Option<Cell>>> {
        (0..self.rows())
            .map(|y| (0..self.columns()).map(|x| self.cell(x, y).cloned()).collect())
            .collect()
    }

    /// Composite every layer and render each row.
    pub fn render_lines(&self) -> Vec<ScreenLine> {
        (0..self.rows())
            .map(|y| ScreenLine {
                glyphs: (0..self.columns())
                    .map(|x| self.cell(x, y).map_or_else(Glyph::blank, Glyph::from))
                    .collect(),
            })
            .collect()
    }

    /// Is the cursor visible?
    pub fn show_cursor(&self) -> bool {
        self.show_cursor
    }

    /// Set cursor visibility.
    pub fn set_show_cursor(&mut self, show: bool) {
        self.show_cursor = show;
    }

    /// Cursor position.
    pub fn cursor_position(&self) -> Point {
        self.cursor
    }

    /// Set the cursor position.
    pub fn set_cursor_position(&mut self, p: impl Into<Point>) {
        self.cursor = p.into();
    }
}
