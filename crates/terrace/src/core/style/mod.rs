//! Resolved styling: colors, attribute bits and border bits.
//!
//! Nothing here resolves theme names. Callers hand the screen colors and
//! attribute sets that are already final.

/// Resolved colors.
mod color;

pub use color::Color;

bitflags::bitflags! {
    /// Text attributes as a bitfield.
    ///
    /// Combine with bitwise OR: `StyleBits::BOLD | StyleBits::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleBits: u8 {
        /// Bold weight.
        const BOLD = 1 << 0;
        /// Faint weight.
        const FAINT = 1 << 1;
        /// Italic.
        const ITALIC = 1 << 2;
        /// Underline.
        const UNDERLINE = 1 << 3;
        /// Blink.
        const BLINK = 1 << 4;
        /// Swap foreground and background.
        const INVERSE = 1 << 5;
        /// Hidden text.
        const CONCEAL = 1 << 6;
        /// Strikethrough.
        const CROSSEDOUT = 1 << 7;
    }
}

bitflags::bitflags! {
    /// Border state accumulated on a cell by border drawing.
    ///
    /// A cell on a horizontal edge gets `LEFT` when the edge continues past it
    /// to the right and `RIGHT` when the edge arrives from the left. Vertical
    /// edges set `TOP` and `BOTTOM` the same way. The glyph table is keyed on
    /// this encoding, so a box's top-left corner is `LEFT | TOP`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BorderBits: u8 {
        /// Horizontal edge continues rightward.
        const LEFT = 1 << 0;
        /// Vertical edge continues downward.
        const TOP = 1 << 1;
        /// Horizontal edge arrives from the left.
        const RIGHT = 1 << 2;
        /// Vertical edge arrives from above.
        const BOTTOM = 1 << 3;
    }
}

/// Box-drawing glyphs indexed by `BorderBits`.
const BOX_CHARS: [char; 16] = [
    ' ', '╴', '╵', '┌', '╶', '─', '┐', '┬', '╷', '└', '│', '├', '┘', '┴', '┤', '┼',
];

impl BorderBits {
    /// The glyph drawn for this combination of arms.
    pub fn glyph(&self) -> char {
        BOX_CHARS[usize::from(self.bits() & 0xf)]
    }
}

/// Optional styling attributes. Unset fields fall back to whatever default
/// the writer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextStyle {
    /// Foreground color.
    pub fg: Option<Color>,
    /// Background color.
    pub bg: Option<Color>,
    /// Attribute bits.
    pub attrs: Option<StyleBits>,
}

impl TextStyle {
    /// Set the foreground.
    pub fn fg(mut self, c: Color) -> Self {
        self.fg = Some(c);
        self
    }

    /// Set the background.
    pub fn bg(mut self, c: Color) -> Self {
        self.bg = Some(c);
        self
    }

    /// Set the attributes.
    pub fn attrs(mut self, a: StyleBits) -> Self {
        self.attrs = Some(a);
        self
    }
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Text content.
    pub text: String,
    /// Style applied to every character in `text`.
    pub style: TextStyle,
}

/// Text with per-character styling.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledText {
    /// Spans in display order.
    spans: Vec<Span>,
}

impl StyledText {
    /// Construct empty styled text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a styled span.
    pub fn push(mut self, text: impl Into<String>, style: TextStyle) -> Self {
        self.spans.push(Span {
            text: text.into(),
            style,
        });
        self
    }

    /// Append an unstyled span.
    pub fn plain(self, text: impl Into<String>) -> Self {
        self.push(text, TextStyle::default())
    }

    /// Number of characters across all spans.
    pub fn len(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    /// True when there is no text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over characters with their styles.
    pub fn chars(&self) -> impl Iterator<Item = (char, TextStyle)> + '_ {
        self.spans
            .iter()
            .flat_map(|s| s.text.chars().map(move |c| (c, s.style)))
    }

    /// The text with styling stripped.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

impl From<&str> for StyledText {
    fn from(s: &str) -> Self {
        Self::new().plain(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs() {
        assert_eq!(BorderBits::empty().glyph(), ' ');
        assert_eq!((BorderBits::LEFT | BorderBits::TOP).glyph(), '┌');
        assert_eq!((BorderBits::RIGHT | BorderBits::BOTTOM).glyph(), '┘');
        assert_eq!((BorderBits::LEFT | BorderBits::RIGHT).glyph(), '─');
        assert_eq!((BorderBits::TOP | BorderBits::BOTTOM).glyph(), '│');
        assert_eq!(BorderBits::all().glyph(), '┼');
        assert_eq!((BorderBits::TOP | BorderBits::RIGHT).glyph(), '┐');
    }

    #[test]
    fn styled_text() {
        let t = StyledText::new()
            .push("ab", TextStyle::default().fg(Color::RED))
            .plain("c");
        assert_eq!(t.len(), 3);
        assert_eq!(t.text(), "abc");
        let styles: Vec<_> = t.chars().map(|(_, s)| s.fg).collect();
        assert_eq!(styles, vec![Some(Color::RED), Some(Color::RED), None]);
        assert!(StyledText::from("").is_empty());
    }
}
