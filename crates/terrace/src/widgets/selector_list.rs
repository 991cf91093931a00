//! A paging cursor over an arbitrary list.
//!
//! Unlike [`Selector`](super::Selector), this keeps no filter or selection
//! state: it only tracks which page is visible and which row is current.

/// One visible row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection<'a, T> {
    /// The item.
    pub item: &'a T,
    /// Is this the current row?
    pub selected: bool,
}

/// A window of at most `max` rows over a list, with a wrapping cursor.
#[derive(Debug, Clone)]
pub struct SelectorList<T> {
    /// All items.
    items: Vec<T>,
    /// Window size.
    max: usize,
    /// Index of the first visible item.
    start: usize,
    /// Cursor offset within the window.
    position: usize,
}

impl<T> SelectorList<T> {
    /// An empty list with a window of `max` rows. A window of zero is
    /// treated as one.
    pub fn new(max: usize) -> Self {
        Self {
            items: vec![],
            max: max.max(1),
            start: 0,
            position: 0,
        }
    }

    /// Replace the items and move to the top.
    pub fn reset(&mut self, items: Vec<T>) {
        self.items = items;
        self.start = 0;
        self.position = 0;
    }

    /// The current item.
    pub fn selected(&self) -> Option<&T> {
        self.items.get(self.start + self.position)
    }

    /// The cursor as `(start, position)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.start, self.position)
    }

    /// Move up, scrolling at the top of the window and wrapping to the last
    /// item from the first.
    pub fn scroll_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.start > 0 && self.position == 0 {
            self.start -= 1;
        } else if self.start + self.position == 0 {
            if self.items.len() < self.max {
                self.start = 0;
                self.position = self.items.len() - 1;
            } else {
                self.start = self.items.len() - self.max;
                self.position = self.max - 1;
            }
        } else {
            self.position -= 1;
        }
    }

    /// Move down, scrolling at the bottom of the window and wrapping to the
    /// first item from the last.
    pub fn scroll_down(&mut self) {
        let index = self.start + self.position;
        if index + 1 < self.items.len().min(self.max) {
            self.position += 1;
        } else if index + 1 >= self.items.len() {
            self.start = 0;
            self.position = 0;
        } else if self.position < self.max - 1 {
            self.position += 1;
        } else {
            self.start += 1;
        }
    }

    /// The visible rows.
    pub fn projection(&self) -> Vec<Projection<'_, T>> {
        let current = self.start + self.position;
        self.items
            .iter()
            .enumerate()
            .skip(self.start)
            .take(self.max)
            .map(|(i, item)| Projection {
                item,
                selected: i == current,
            })
            .collect()
    }
}
