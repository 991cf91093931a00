use super::{HorizontalAlign, Point, VerticalAlign};

/// A rectangle with a signed top-left corner.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left column.
    pub x: i32,
    /// Top row.
    pub y: i32,
    /// Width in columns.
    pub width: i32,
    /// Height in rows.
    pub height: i32,
}

impl Rect {
    /// Construct a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last column, saturating.
    fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// One past the last row, saturating.
    fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// True when the rectangle covers no cells.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Does this rectangle contain the point?
    pub fn contains(&self, p: impl Into<Point>) -> bool {
        let p = p.into();
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Intersection of two rectangles, if they overlap.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let r = Self::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y));
        if r.is_empty() { None } else { Some(r) }
    }

    /// Compute the origin of a run of `len` cells placed inside this rectangle
    /// with the given alignment. Centering truncates, so odd remainders bias
    /// toward the left and top.
    pub fn align(&self, len: i32, h: HorizontalAlign, v: VerticalAlign) -> Point {
        let x = match h {
            HorizontalAlign::Left => self.x,
            HorizontalAlign::Center => self.x.saturating_add(self.width / 2 - len / 2),
            HorizontalAlign::Right => self.right().saturating_sub(len),
        };
        let y = match v {
            VerticalAlign::Top => self.y,
            VerticalAlign::Center => self.y.saturating_add(self.height / 2),
            VerticalAlign::Bottom => self.bottom().saturating_sub(1),
        };
        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn align() {
        let r = Rect::new(0, 0, 10, 5);
        assert_eq!(
            r.align(4, HorizontalAlign::Center, VerticalAlign::Center),
            Point::new(3, 2)
        );
        assert_eq!(
            r.align(3, HorizontalAlign::Center, VerticalAlign::Top),
            Point::new(4, 0)
        );
        assert_eq!(
            r.align(3, HorizontalAlign::Right, VerticalAlign::Bottom),
            Point::new(7, 4)
        );
        assert_eq!(
            r.align(3, HorizontalAlign::Left, VerticalAlign::Top),
            Point::new(0, 0)
        );
    }

    #[test]
    fn intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(
            a.intersect(&Rect::new(-2, 5, 4, 10)),
            Some(Rect::new(0, 5, 2, 5))
        );
        assert_eq!(a.intersect(&Rect::new(10, 0, 3, 3)), None);
        assert_eq!(a.intersect(&a), Some(a));
        assert!(a.contains((9, 9)));
        assert!(!a.contains((10, 0)));
        assert!(!a.contains((-1, 3)));
        let huge = Rect::new(i32::MAX - 1, 0, i32::MAX, i32::MAX);
        assert_eq!(huge.intersect(&a), None);
        assert!(huge.contains((i32::MAX - 1, 5)));
    }

    proptest! {
        #[test]
        fn right_alignment_ends_at_edge(x in -50i32..50, w in 0i32..80, len in 0i32..80) {
            let r = Rect::new(x, 0, w, 1);
            let p = r.align(len, HorizontalAlign::Right, VerticalAlign::Top);
            prop_assert_eq!(p.x + len, x + w);
        }
    }
}
