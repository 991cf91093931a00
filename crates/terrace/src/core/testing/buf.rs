//! Utilities for comparing rendered screens in tests.
use crate::screen::Screen;

/// A helper macro to create line slices for the screen match assertions.
#[macro_export]
macro_rules! lines {
    ($($line:literal)*) => {
        &[$($line),*]
    };
}

/// The composited text of every row.
pub fn screen_text(screen: &Screen) -> Vec<String> {
    screen.render_lines().iter().map(|l| l.text()).collect()
}

/// Configurable comparison of a screen against expected lines. Trailing
/// blanks are ignored on both sides.
pub struct LineTest<'a> {
    /// Screen under test.
    screen: &'a Screen,
    /// Optional wildcard character.
    any_char: Option<char>,
}

impl<'a> LineTest<'a> {
    /// Compare against `screen`.
    pub fn new(screen: &'a Screen) -> Self {
        Self {
            screen,
            any_char: None,
        }
    }

    /// Set a character in the expected pattern that matches anything.
    pub fn with_any(mut self, any_char: char) -> Self {
        self.any_char = Some(any_char);
        self
    }

    /// Does one rendered row match its pattern?
    fn line_matches(&self, actual: &str, expected: &str) -> bool {
        let actual: Vec<char> = actual.trim_end().chars().collect();
        let expected: Vec<char> = expected.trim_end().chars().collect();
        if actual.len() > expected.len() {
            return false;
        }
        expected.iter().enumerate().all(|(i, e)| {
            let a = actual.get(i).copied().unwrap_or(' ');
            Some(*e) == self.any_char || a == *e
        })
    }

    /// Returns true if the screen matches the expected lines.
    pub fn matches(&self, expected: &[&str]) -> bool {
        let actual = screen_text(self.screen);
        actual.len() == expected.len()
            && actual
                .iter()
                .zip(expected)
                .all(|(a, e)| self.line_matches(a, e))
    }

    /// Panic with a readable diff unless the screen matches.
    pub fn assert_matches(&self, expected: &[&str]) {
        if !self.matches(expected) {
            let actual = screen_text(self.screen);
            panic!(
                "screen mismatch\nexpected:\n{}\nactual:\n{}",
                expected.join("\n"),
                actual.join("\n")
            );
        }
    }
}

/// Assert that a screen renders to exactly `expected`, ignoring trailing
/// blanks.
pub fn assert_lines(screen: &Screen, expected: &[&str]) {
    LineTest::new(screen).assert_matches(expected);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    #[test]
    fn matching() -> Result<()> {
        let mut s = Screen::new(2, 6)?;
        s.writer().text("ab cd", 0, 0);
        assert_lines(&s, lines!("ab cd" ""));
        assert!(LineTest::new(&s).with_any('?').matches(&["a? c?", ""]));
        assert!(!LineTest::new(&s).matches(&["ab", ""]));
        assert!(!LineTest::new(&s).matches(&["ab cd"]));
        Ok(())
    }
}
