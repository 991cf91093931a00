use std::{
    collections::BTreeMap,
    ops::Bound::{Excluded, Unbounded},
};

/// The escape character.
pub const ESC: char = '\x1b';
/// The DEL character most terminals send for backspace.
pub const DEL: char = '\x7f';

/// The control sequence for a letter: `ctrl('a')` is `"\x01"`.
pub fn ctrl(c: char) -> String {
    char::from((c.to_ascii_lowercase() as u8) & 0x1f).to_string()
}

/// Prefix a sequence with escape, as terminals do for Alt.
pub fn alt(seq: &str) -> String {
    format!("{ESC}{seq}")
}

/// A table from raw input sequences to bound values.
///
/// Sequences are kept sorted so that we can cheaply ask whether a partially
/// read sequence could still grow into a longer binding.
#[derive(Debug, Clone)]
pub struct KeyMap<T> {
    /// Bound sequences.
    bindings: BTreeMap<String, T>,
    /// Value for characters outside the ASCII range that have no binding.
    unicode: Option<T>,
}

impl<T> Default for KeyMap<T> {
    fn default() -> Self {
        Self {
            bindings: BTreeMap::new(),
            unicode: None,
        }
    }
}

impl<T: Clone> KeyMap<T> {
    /// Construct an empty key map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to a sequence. Later bindings replace earlier ones. Empty
    /// sequences are ignored.
    pub fn bind(&mut self, value: T, seq: impl Into<String>) {
        let seq = seq.into();
        if !seq.is_empty() {
            self.bindings.insert(seq, value);
        }
    }

    /// Bind `value` to a sequence if one is present. Used with capability
    /// lookups, which may not know the key.
    pub fn bind_opt(&mut self, value: T, seq: Option<String>) {
        if let Some(seq) = seq {
            self.bind(value, seq);
        }
    }

    /// Bind `value` to every single character in an inclusive range.
    pub fn bind_range(&mut self, value: &T, from: char, to: char) {
        for c in from..=to {
            self.bind(value.clone(), c.to_string());
        }
    }

    /// Set the fallback value for unbound non-ASCII input.
    pub fn set_unicode(&mut self, value: T) {
        self.unicode = Some(value);
    }

    /// The fallback value for unbound non-ASCII input.
    pub fn unicode(&self) -> Option<&T> {
        self.unicode.as_ref()
    }

    /// The value bound to exactly this sequence.
    pub fn lookup(&self, seq: &str) -> Option<&T> {
        self.bindings.get(seq)
    }

    /// Is there a binding strictly longer than `seq` that starts with it?
    pub fn has_longer(&self, seq: &str) -> bool {
        self.bindings
            .range::<str, _>((Excluded(seq), Unbounded))
            .next()
            .is_some_and(|(k, _)| k.starts_with(seq))
    }

    /// Number of bound sequences.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_sequences() {
        assert_eq!(ctrl('a'), "\x01");
        assert_eq!(ctrl('E'), "\x05");
        assert_eq!(ctrl('y'), "\x19");
        assert_eq!(alt("x"), "\x1bx");
    }

    #[test]
    fn prefixes() {
        let mut km = KeyMap::new();
        km.bind(1, "\x1b");
        km.bind(2, "\x1b[A");
        km.bind(3, "a");
        km.bind(4, "");
        assert_eq!(km.len(), 3);
        assert!(km.has_longer("\x1b"));
        assert!(km.has_longer("\x1b["));
        assert!(!km.has_longer("\x1b[A"));
        assert!(!km.has_longer("a"));
        assert_eq!(km.lookup("\x1b[A"), Some(&2));
        assert_eq!(km.lookup("\x1b["), None);

        km.bind(5, "a");
        assert_eq!(km.lookup("a"), Some(&5));
        km.bind_range(&6, '0', '9');
        assert_eq!(km.lookup("5"), Some(&6));
        assert_eq!(km.unicode(), None);
        km.set_unicode(7);
        assert_eq!(km.unicode(), Some(&7));
    }
}
