use geom::{HorizontalAlign, Rect, VerticalAlign};
use tracing::trace;

use super::{Layer, Screen};
use crate::style::{BorderBits, Color, StyleBits, StyledText, TextStyle};

/// Configures a [`Writer`]: target layer, default color and default style.
pub struct WriterBuilder<'a> {
    /// Screen the writer will draw on.
    screen: &'a mut Screen,
    /// Target layer z-index.
    layer: i32,
    /// Default foreground.
    color: Option<Color>,
    /// Default attributes.
    style: Option<StyleBits>,
}

impl<'a> WriterBuilder<'a> {
    /// Construct a builder targeting layer 0.
    pub(super) fn new(screen: &'a mut Screen) -> Self {
        Self {
            screen,
            layer: 0,
            color: None,
            style: None,
        }
    }

    /// Target layer.
    pub fn layer(mut self, z: i32) -> Self {
        self.layer = z;
        self
    }

    /// Default foreground color.
    pub fn color(mut self, c: Color) -> Self {
        self.color = Some(c);
        self
    }

    /// Default attributes.
    pub fn style(mut self, s: StyleBits) -> Self {
        self.style = Some(s);
        self
    }

    /// Bind the writer to its layer.
    pub fn build(self) -> Writer<'a> {
        Writer {
            layer: self.screen.layer_mut(self.layer),
            color: self.color,
            style: self.style,
        }
    }
}

/// Draws onto one layer of a screen. Every operation clips silently at the
/// grid edge.
pub struct Writer<'a> {
    /// Target layer.
    layer: &'a mut Layer,
    /// Default foreground.
    color: Option<Color>,
    /// Default attributes.
    style: Option<StyleBits>,
}

impl Writer<'_> {
    /// Write a run of characters left to right starting at `(x, y)`.
    fn put(&mut self, chars: impl Iterator<Item = (char, TextStyle)>, x: i32, y: i32) {
        let columns = self.layer.size.columns();
        for (i, (c, style)) in chars.enumerate() {
            let Ok(i) = i32::try_from(i) else { break };
            let col = x.saturating_add(i);
            if col >= columns {
                break;
            }
            let Some(cell) = self.layer.touch(col, y) else {
                continue;
            };
            cell.content = Some(c);
            if let Some(fg) = style.fg.or(self.color) {
                cell.fg = Some(fg);
            }
            if let Some(attrs) = style.attrs.or(self.style) {
                cell.style = Some(attrs);
            }
            if let Some(bg) = style.bg {
                cell.bg = Some(bg);
            }
        }
    }

    /// Write plain text at `(x, y)` using the writer's default color and style.
    pub fn text(&mut self, text: &str, x: i32, y: i32) {
        self.put(text.chars().map(|c| (c, TextStyle::default())), x, y);
    }

    /// Write styled text at `(x, y)`. Attributes present on a character win
    /// over the writer's defaults.
    pub fn styled(&mut self, text: &StyledText, x: i32, y: i32) {
        self.put(text.chars(), x, y);
    }

    /// Write plain text aligned within a rectangle.
    pub fn text_aligned(&mut self, text: &str, rect: Rect, h: HorizontalAlign, v: VerticalAlign) {
        let len = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
        let p = rect.align(len, h, v);
        self.text(text, p.x, p.y);
    }

    /// Draw a box outline. Where edges meet or cross, cells accumulate the
    /// bits of every edge that touches them.
    pub fn border(&mut self, x: i32, y: i32, width: i32, height: i32) {
        trace!(x, y, width, height, "border");
        let right = x.saturating_add(width).saturating_sub(1);
        let bottom = y.saturating_add(height).saturating_sub(1);
        self.border_horizontal(x, right, y);
        self.border_horizontal(x, right, bottom);
        self.border_vertical(x, y, bottom);
        self.border_vertical(right, y, bottom);
    }

    /// Accumulate border bits along a horizontal edge spanning columns
    /// `left..=right`. Only on-grid columns are visited.
    fn border_horizontal(&mut self, left: i32, right: i32, y: i32) {
        let last = right.min(self.layer.size.columns() - 1);
        for i in left.max(0)..=last {
            if let Some(cell) = self.layer.touch(i, y) {
                if i > left {
                    cell.border |= BorderBits::RIGHT;
                }
                if i < right {
                    cell.border |= BorderBits::LEFT;
                }
            }
        }
    }

    /// Accumulate border bits along a vertical edge spanning rows
    /// `top..=bottom`.
    fn border_vertical(&mut self, x: i32, top: i32, bottom: i32) {
        let last = bottom.min(self.layer.size.rows() - 1);
        for i in top.max(0)..=last {
            if let Some(cell) = self.layer.touch(x, i) {
                if i > top {
                    cell.border |= BorderBits::BOTTOM;
                }
                if i < bottom {
                    cell.border |= BorderBits::TOP;
                }
            }
        }
    }

    /// Set the background of every cell in `rect`, leaving content and
    /// foreground alone.
    pub fn background(&mut self, rect: Rect, color: Color) {
        trace!(%color, ?rect, "background");
        let Some(rect) = rect.intersect(&self.layer.size.rect()) else {
            return;
        };
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                if let Some(cell) = self.layer.touch(x, y) {
                    cell.bg = Some(color);
                }
            }
        }
    }
}
