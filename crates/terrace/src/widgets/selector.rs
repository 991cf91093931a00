//! A scrollable, filterable item selector.
//!
//! [`Selector`] is the state machine: a canonical item list that never
//! changes order after construction, a filtered view over it, and a
//! `(start, pos)` cursor into a window of at most `max_items` rows.
//! [`SelectorComponent`] binds it to keys and draws it.
use std::cmp::Ordering;

use tracing::debug;

use crate::{
    binder::{Capabilities, Capability},
    component::Component,
    error::{Error, Result},
    keymap::{DEL, KeyMap, ctrl},
    reader::Binding,
    screen::Screen,
    style::{Color, StyleBits, StyledText, TextStyle},
};

/// Default number of visible rows.
pub const DEFAULT_MAX_ITEMS: usize = 5;
/// Largest permitted number of visible rows.
pub const MAX_ITEMS_LIMIT: usize = 32;

/// A named, selectable item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorItem<T> {
    /// Display name, also used for matching.
    name: String,
    /// The value returned when selected.
    item: T,
    /// Disabled items cannot be toggled with select.
    enabled: bool,
    /// Current selection state.
    selected: bool,
}

impl<T> SelectorItem<T> {
    /// An enabled, unselected item.
    pub fn new(name: impl Into<String>, item: T) -> Self {
        Self {
            name: name.into(),
            item,
            enabled: true,
            selected: false,
        }
    }

    /// Set whether the item may be toggled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the initial selection state.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Can the item be toggled?
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Is the item selected?
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Take the value.
    pub fn into_item(self) -> T {
        self.item
    }
}

/// One visible row of the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemState<'a, T> {
    /// The value.
    pub item: &'a T,
    /// The display name.
    pub name: &'a str,
    /// Position within the filtered list.
    pub index: usize,
    /// Can the item be toggled?
    pub enabled: bool,
    /// Is the item selected?
    pub selected: bool,
}

/// Selector operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Toggle the current item.
    Select,
    /// Move the cursor down.
    Down,
    /// Move the cursor up.
    Up,
    /// Finish.
    Exit,
    /// Remove the last filter character.
    Backspace,
    /// Append to the filter.
    Char,
}

/// Decides whether an item matches the filter text.
pub type Matcher<T> = Box<dyn Fn(&SelectorItem<T>, &str) -> bool + Send>;

/// Case-insensitive substring match on the item name.
fn default_matcher<T>(item: &SelectorItem<T>, filter: &str) -> bool {
    item.name.to_lowercase().contains(&filter.to_lowercase())
}

/// The selector state machine.
pub struct Selector<T> {
    /// Prompt name.
    name: String,
    /// Canonical items, in display order.
    items: Vec<SelectorItem<T>>,
    /// Canonical indices of the items passing the filter.
    filtered: Vec<usize>,
    /// Filter text; never empty when present.
    filter: Option<String>,
    /// Single mode: exit toggles the current item and select is inert.
    exit_selects: bool,
    /// Window size.
    max_items: usize,
    /// Filtered index of the first visible row.
    start: usize,
    /// Cursor offset within the window.
    pos: usize,
    /// The filter changed; reset the cursor on the next read.
    stale: bool,
    /// Filter predicate.
    matcher: Matcher<T>,
    /// Name of the item to bring into view initially.
    expose: Option<String>,
    /// Has exit been accepted?
    done: bool,
}

impl<T: 'static> Selector<T> {
    /// Construct a selector.
    fn with_mode(name: impl Into<String>, items: Vec<SelectorItem<T>>, exit_selects: bool) -> Self {
        let mut s = Self {
            name: name.into(),
            filtered: vec![],
            items,
            filter: None,
            exit_selects,
            max_items: DEFAULT_MAX_ITEMS,
            start: 0,
            pos: 0,
            stale: false,
            matcher: Box::new(default_matcher),
            expose: None,
            done: false,
        };
        s.refilter();
        s
    }

    /// A selector that picks the item under the cursor on exit.
    pub fn single(name: impl Into<String>, items: Vec<SelectorItem<T>>) -> Self {
        Self::with_mode(name, items, true)
    }

    /// A selector where items are toggled with select and every selected
    /// item is returned on exit.
    pub fn multi(name: impl Into<String>, items: Vec<SelectorItem<T>>) -> Self {
        Self::with_mode(name, items, false)
    }

    /// Set the window size, which must be in `1..=32`.
    pub fn with_max_items(mut self, max_items: usize) -> Result<Self> {
        if !(1..=MAX_ITEMS_LIMIT).contains(&max_items) {
            return Err(Error::Invalid(format!(
                "max items must be between 1 and {MAX_ITEMS_LIMIT}, got {max_items}"
            )));
        }
        self.max_items = max_items;
        self.apply_expose();
        Ok(self)
    }

    /// Replace the filter predicate.
    pub fn with_matcher(
        mut self,
        matcher: impl Fn(&SelectorItem<T>, &str) -> bool + Send + 'static,
    ) -> Self {
        self.matcher = Box::new(matcher);
        self.refilter();
        self
    }

    /// Order the canonical list. The sort is stable.
    pub fn with_comparator(
        mut self,
        comparator: impl Fn(&SelectorItem<T>, &SelectorItem<T>) -> Ordering,
    ) -> Self {
        self.items.sort_by(comparator);
        self.refilter();
        self.apply_expose();
        self
    }

    /// Start with the named item visible and under the cursor. An unknown
    /// name leaves the cursor at the top.
    pub fn with_default_expose(mut self, name: impl Into<String>) -> Self {
        self.expose = Some(name.into());
        self.apply_expose();
        self
    }

    /// Position the cursor on the exposed item, searching the canonical list.
    fn apply_expose(&mut self) {
        let Some(name) = self.expose.as_deref() else {
            return;
        };
        let Some(i) = self.items.iter().position(|it| it.name == name) else {
            debug!(name, "default item not found");
            return;
        };
        if i < self.max_items {
            self.start = 0;
            self.pos = i;
        } else {
            self.pos = self.max_items - 1;
            self.start = i + 1 - self.max_items;
        }
    }

    /// Recompute the filtered view.
    fn refilter(&mut self) {
        let filter = self.filter.as_deref();
        let matcher = &self.matcher;
        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, it)| filter.is_none_or(|f| matcher(it, f)))
            .map(|(i, _)| i)
            .collect();
    }

    /// Number of rows in the current window.
    fn window_len(&self) -> usize {
        self.filtered
            .len()
            .saturating_sub(self.start)
            .min(self.max_items)
    }

    /// Canonical index of the item under the cursor, if it is visible.
    fn current(&self) -> Option<usize> {
        if self.pos >= self.window_len() {
            return None;
        }
        self.filtered.get(self.start + self.pos).copied()
    }

    /// Flip the selection of the item under the cursor.
    fn toggle_current(&mut self, require_enabled: bool) {
        if let Some(i) = self.current() {
            let it = &mut self.items[i];
            if it.enabled || !require_enabled {
                it.selected = !it.selected;
            }
        }
    }

    /// Apply one operation. `input` is the raw text that triggered it, used
    /// by [`Operation::Char`]. Returns true once the selector is done.
    pub fn read(&mut self, op: Operation, input: &str) -> bool {
        if self.stale {
            self.start = 0;
            self.pos = 0;
            self.stale = false;
        }
        let window = self.window_len();
        let total = self.filtered.len();
        match op {
            Operation::Select => {
                if !self.exit_selects {
                    self.toggle_current(true);
                }
            }
            Operation::Down => {
                if self.pos + 1 < window {
                    self.pos += 1;
                } else if self.start + self.pos + 1 >= total {
                    self.start = 0;
                    self.pos = 0;
                } else {
                    self.start += 1;
                }
            }
            Operation::Up => {
                if self.start > 0 && self.pos == 0 {
                    self.start -= 1;
                } else if self.start == 0 && self.pos == 0 {
                    if window > 0 {
                        self.start = total - self.max_items.min(window);
                        self.pos = window - 1;
                    }
                } else {
                    self.pos -= 1;
                }
            }
            Operation::Char => {
                self.filter.get_or_insert_with(String::new).push_str(input);
                self.refilter();
                self.stale = true;
            }
            Operation::Backspace => {
                if let Some(f) = self.filter.as_mut() {
                    f.pop();
                    if f.is_empty() {
                        self.filter = None;
                    }
                }
                self.refilter();
            }
            Operation::Exit => {
                if self.exit_selects {
                    if window == 0 {
                        return false;
                    }
                    self.toggle_current(false);
                }
                self.done = true;
                return true;
            }
        }
        false
    }

    /// The visible rows.
    pub fn view(&self) -> Vec<ItemState<'_, T>> {
        self.filtered
            .iter()
            .enumerate()
            .skip(self.start)
            .take(self.max_items)
            .map(|(index, &i)| {
                let it = &self.items[i];
                ItemState {
                    item: &it.item,
                    name: &it.name,
                    index,
                    enabled: it.enabled,
                    selected: it.selected,
                }
            })
            .collect()
    }

    /// The cursor as `(start, pos)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.start, self.pos)
    }

    /// The filtered index under the cursor.
    pub fn cursor_row(&self) -> usize {
        self.start + self.pos
    }

    /// Number of items passing the filter.
    pub fn total(&self) -> usize {
        self.filtered.len()
    }

    /// The filter text.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// The prompt name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Is this a single-item selector?
    pub fn is_single(&self) -> bool {
        self.exit_selects
    }

    /// Has exit been accepted?
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Every selected item of the canonical list, in order.
    pub fn result(&self) -> Vec<&SelectorItem<T>> {
        self.items.iter().filter(|it| it.selected).collect()
    }
}

/// Drives a [`Selector`] through the component runtime.
pub struct SelectorComponent<T> {
    /// State machine.
    selector: Selector<T>,
}

impl<T: 'static> SelectorComponent<T> {
    /// Wrap a selector.
    pub fn new(selector: Selector<T>) -> Self {
        Self { selector }
    }

    /// The selector.
    pub fn selector(&self) -> &Selector<T> {
        &self.selector
    }

    /// Style for the leading question mark.
    fn prompt_style() -> TextStyle {
        TextStyle::default().fg(Color::GREEN).attrs(StyleBits::BOLD)
    }

    /// Style for filter and result text.
    fn value_style() -> TextStyle {
        TextStyle::default().fg(Color::rgb(0, 0xaf, 0xff))
    }
}

impl<T: Clone + 'static> Component for SelectorComponent<T> {
    type Operation = Operation;
    type Output = Vec<T>;

    fn bind_keys(&self, keymap: &mut KeyMap<Operation>, caps: &dyn Capabilities) {
        keymap.bind(Operation::Select, " ");
        keymap.bind(Operation::Down, ctrl('E'));
        keymap.bind_opt(Operation::Down, caps.sequence(Capability::KeyDown));
        keymap.bind(Operation::Up, ctrl('Y'));
        keymap.bind_opt(Operation::Up, caps.sequence(Capability::KeyUp));
        keymap.bind(Operation::Exit, "\r");
        keymap.bind(Operation::Backspace, DEL.to_string());
        keymap.bind_opt(Operation::Backspace, caps.sequence(Capability::KeyBackspace));
        // Space and DEL are bound above.
        keymap.bind_range(&Operation::Char, '!', '~');
    }

    fn render(&self, screen: &mut Screen) -> Result<()> {
        let s = &self.selector;
        let mut prompt = StyledText::new()
            .push("? ", Self::prompt_style())
            .push(s.name(), TextStyle::default().attrs(StyleBits::BOLD))
            .plain(" ");
        if s.is_done() {
            let values: Vec<&str> = s.result().iter().map(|it| it.name()).collect();
            prompt = prompt.push(values.join(", "), Self::value_style());
            screen.writer().styled(&prompt, 0, 0);
            screen.set_show_cursor(false);
            return Ok(());
        }
        match s.filter() {
            Some(f) => prompt = prompt.push(f, Self::value_style()),
            None if !s.is_single() => {
                prompt = prompt.push(
                    "[Use arrows to move, space to select, type to filter]",
                    TextStyle::default().attrs(StyleBits::FAINT),
                );
            }
            None => {
                prompt = prompt.push(
                    "[Use arrows to move, type to filter]",
                    TextStyle::default().attrs(StyleBits::FAINT),
                );
            }
        }
        let prompt_len = 2 + s.name().chars().count() + 1 + s.filter().map_or(0, |f| f.chars().count());
        screen.writer().styled(&prompt, 0, 0);

        let cursor_row = s.cursor_row();
        let mut w = screen.writer();
        for (y, row) in (1..).zip(s.view()) {
            let on_cursor = row.index == cursor_row;
            let mut line = StyledText::new();
            line = if on_cursor {
                line.push("> ", Self::value_style())
            } else {
                line.plain("  ")
            };
            if !s.is_single() {
                line = line.plain(if row.selected { "[x] " } else { "[ ] " });
            }
            let style = match (row.enabled, on_cursor) {
                (false, _) => TextStyle::default().attrs(StyleBits::FAINT),
                (true, true) => Self::value_style(),
                (true, false) => TextStyle::default(),
            };
            line = line.push(row.name, style);
            w.styled(&line, 0, y);
        }
        screen.set_show_cursor(true);
        screen.set_cursor_position((i32::try_from(prompt_len).unwrap_or(i32::MAX), 0));
        Ok(())
    }

    fn read(&mut self, binding: Binding<Operation>) -> Result<bool> {
        Ok(self.selector.read(binding.value, &binding.sequence))
    }

    fn result(&self) -> Vec<T> {
        self.selector
            .result()
            .into_iter()
            .map(|it| it.item.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn items(n: usize) -> Vec<SelectorItem<usize>> {
        (0..n).map(|i| SelectorItem::new(format!("item{i}"), i)).collect()
    }

    fn press(s: &mut Selector<usize>, op: Operation, times: usize) {
        for _ in 0..times {
            s.read(op, "");
        }
    }

    #[test]
    fn seven_by_three() -> Result<()> {
        let mut s = Selector::single("pick", items(7)).with_max_items(3)?;
        assert_eq!(s.cursor(), (0, 0));
        press(&mut s, Operation::Down, 6);
        assert_eq!(s.cursor(), (4, 2));
        assert_eq!(s.cursor_row(), 6);
        let names: Vec<&str> = s.view().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["item4", "item5", "item6"]);
        press(&mut s, Operation::Down, 1);
        assert_eq!(s.cursor(), (0, 0));
        Ok(())
    }

    #[test]
    fn up_wraps() -> Result<()> {
        let mut s = Selector::single("pick", items(7)).with_max_items(3)?;
        press(&mut s, Operation::Up, 1);
        assert_eq!(s.cursor(), (4, 2));
        press(&mut s, Operation::Up, 2);
        assert_eq!(s.cursor(), (4, 0));
        press(&mut s, Operation::Up, 1);
        assert_eq!(s.cursor(), (3, 0));

        let mut s = Selector::single("pick", items(2));
        press(&mut s, Operation::Up, 1);
        assert_eq!(s.cursor(), (0, 1));
        Ok(())
    }

    #[test]
    fn max_items_range() {
        assert!(matches!(
            Selector::single("x", items(3)).with_max_items(0),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            Selector::single("x", items(3)).with_max_items(33),
            Err(Error::Invalid(_))
        ));
        assert!(Selector::single("x", items(3)).with_max_items(32).is_ok());
    }

    #[test]
    fn filtering() -> Result<()> {
        let mut s = Selector::multi("pick", items(12)).with_max_items(3)?;
        press(&mut s, Operation::Down, 2);
        s.read(Operation::Char, "1");
        // Cursor resets on the next read, not immediately.
        assert_eq!(s.cursor(), (0, 2));
        assert_eq!(s.filter(), Some("1"));
        assert_eq!(s.total(), 3);
        s.read(Operation::Down, "");
        assert_eq!(s.cursor(), (0, 1));
        let names: Vec<&str> = s.view().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["item1", "item10", "item11"]);
        assert_eq!(s.view()[1].index, 1);

        s.read(Operation::Char, "1");
        assert_eq!(s.total(), 1);
        s.read(Operation::Backspace, "");
        assert_eq!(s.filter(), Some("1"));
        assert_eq!(s.total(), 3);
        s.read(Operation::Backspace, "");
        assert_eq!(s.filter(), None);
        assert_eq!(s.total(), 12);
        s.read(Operation::Backspace, "");
        assert_eq!(s.filter(), None);
        Ok(())
    }

    #[test]
    fn case_insensitive() {
        let mut s = Selector::single(
            "pick",
            vec![
                SelectorItem::new("Apple", 0),
                SelectorItem::new("banana", 1),
                SelectorItem::new("APRICOT", 2),
            ],
        );
        s.read(Operation::Char, "a");
        s.read(Operation::Char, "P");
        let names: Vec<&str> = s.view().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Apple", "APRICOT"]);
    }

    #[test]
    fn custom_matcher() {
        let mut s = Selector::single("pick", items(12)).with_matcher(|it, f| it.name().ends_with(f));
        s.read(Operation::Char, "1");
        let names: Vec<&str> = s.view().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["item1", "item11"]);
    }

    #[test]
    fn empty_filter_blocks_exit() {
        let mut s = Selector::single("pick", items(3));
        s.read(Operation::Char, "z");
        assert!(s.view().is_empty());
        assert!(!s.read(Operation::Exit, "\r"));
        assert!(!s.is_done());
        s.read(Operation::Backspace, "");
        assert!(s.read(Operation::Exit, "\r"));
        assert_eq!(s.result().len(), 1);
        assert_eq!(*s.result()[0].item(), 0);
    }

    #[test]
    fn multi_select() {
        let mut list = items(4);
        list[1] = SelectorItem::new("item1", 1).with_enabled(false);
        list[3] = SelectorItem::new("item3", 3).with_selected(true);
        let mut s = Selector::multi("pick", list);
        s.read(Operation::Select, " ");
        s.read(Operation::Down, "");
        // Disabled items ignore select.
        s.read(Operation::Select, " ");
        s.read(Operation::Down, "");
        s.read(Operation::Select, " ");
        s.read(Operation::Select, " ");
        assert!(s.read(Operation::Exit, "\r"));
        let got: Vec<usize> = s.result().iter().map(|it| *it.item()).collect();
        assert_eq!(got, vec![0, 3]);
    }

    #[test]
    fn single_ignores_select() {
        let mut s = Selector::single("pick", items(3));
        s.read(Operation::Select, " ");
        s.read(Operation::Down, "");
        assert!(s.read(Operation::Exit, "\r"));
        let got: Vec<usize> = s.result().iter().map(|it| *it.item()).collect();
        assert_eq!(got, vec![1]);
    }

    #[test]
    fn default_expose() -> Result<()> {
        let s = Selector::single("pick", items(10))
            .with_max_items(3)?
            .with_default_expose("item7");
        assert_eq!(s.cursor(), (5, 2));
        let s = Selector::single("pick", items(10))
            .with_default_expose("item1")
            .with_max_items(3)?;
        assert_eq!(s.cursor(), (0, 1));
        let s = Selector::single("pick", items(10)).with_default_expose("missing");
        assert_eq!(s.cursor(), (0, 0));
        Ok(())
    }

    #[test]
    fn comparator() {
        let s = Selector::single("pick", items(3))
            .with_comparator(|a, b| b.item().cmp(a.item()))
            .with_default_expose("item0");
        let names: Vec<&str> = s.view().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["item2", "item1", "item0"]);
        assert_eq!(s.cursor(), (0, 2));
    }

    proptest! {
        #[test]
        fn down_from_last_wraps(len in 1usize..60, max in 1usize..=32) {
            prop_assume!(max <= len);
            let mut s = Selector::single("p", items(len)).with_max_items(max).unwrap();
            press(&mut s, Operation::Down, len - 1);
            prop_assert_eq!(s.cursor_row(), len - 1);
            s.read(Operation::Down, "");
            prop_assert_eq!(s.cursor(), (0, 0));
        }

        #[test]
        fn up_from_top_wraps(len in 1usize..60, max in 1usize..=32) {
            prop_assume!(max <= len);
            let mut s = Selector::single("p", items(len)).with_max_items(max).unwrap();
            s.read(Operation::Up, "");
            prop_assert_eq!(s.cursor(), (len - max, max - 1));
            prop_assert_eq!(s.cursor_row(), len - 1);
        }

        #[test]
        fn cursor_stays_in_window(
            len in 0usize..20,
            max in 1usize..=8,
            ops in prop::collection::vec(0u8..5, 0..60),
        ) {
            let mut s = Selector::multi("p", items(len)).with_max_items(max).unwrap();
            for op in ops {
                let (op, input) = match op {
                    0 => (Operation::Down, ""),
                    1 => (Operation::Up, ""),
                    2 => (Operation::Select, " "),
                    3 => (Operation::Char, "1"),
                    _ => (Operation::Backspace, ""),
                };
                s.read(op, input);
                if op != Operation::Char && s.total() > 0 {
                    prop_assert!(s.cursor().1 < max.min(s.total()));
                    prop_assert!(s.cursor_row() < s.total());
                }
            }
        }
    }
}
