/// Horizontal placement of content within a rectangle.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum HorizontalAlign {
    /// Flush against the left edge.
    #[default]
    Left,
    /// Centered, biased left on odd remainders.
    Center,
    /// Flush against the right edge.
    Right,
}

/// Vertical placement of content within a rectangle.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    /// First row.
    #[default]
    Top,
    /// Middle row, biased up on odd heights.
    Center,
    /// Last row.
    Bottom,
}
