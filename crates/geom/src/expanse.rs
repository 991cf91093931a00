use super::{Error, Rect, Result};

/// An `Expanse` is a size with no location: a count of rows and columns.
/// Both dimensions are guaranteed to be non-negative.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Expanse {
    /// Number of rows.
    rows: i32,
    /// Number of columns.
    columns: i32,
}

impl Expanse {
    /// Construct a size, rejecting negative dimensions.
    pub fn new(rows: i32, columns: i32) -> Result<Self> {
        if rows < 0 || columns < 0 {
            return Err(Error::Geometry(format!(
                "negative dimensions: rows={rows} columns={columns}"
            )));
        }
        Ok(Self { rows, columns })
    }

    /// Number of rows.
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of columns.
    pub fn columns(&self) -> i32 {
        self.columns
    }

    /// The number of cells covered by this expanse.
    pub fn area(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Return a `Rect` with the same dimensions, located at (0, 0).
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.columns, self.rows)
    }
}

impl TryFrom<(u16, u16)> for Expanse {
    type Error = Error;

    /// Convert a `(columns, rows)` pair as reported by terminal size queries.
    fn try_from(v: (u16, u16)) -> Result<Self> {
        Self::new(v.1.into(), v.0.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative() {
        assert!(Expanse::new(-1, 3).is_err());
        assert!(Expanse::new(3, -1).is_err());
        let e = Expanse::new(0, 0).unwrap();
        assert_eq!(e.area(), 0);
    }

    #[test]
    fn terminal_size_order() -> Result<()> {
        let e = Expanse::try_from((80u16, 24u16))?;
        assert_eq!(e.rows(), 24);
        assert_eq!(e.columns(), 80);
        assert_eq!(e.rect(), Rect::new(0, 0, 80, 24));
        Ok(())
    }
}
