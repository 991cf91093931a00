//! Resolve raw terminal input into key map bindings.
use std::{collections::VecDeque, sync::mpsc, time::Duration};

use crate::{
    error::{Error, Result},
    keymap::KeyMap,
};

/// Wait applied when a complete binding might still grow into a longer one.
pub const DEFAULT_AMBIGUOUS_TIMEOUT: Duration = Duration::from_millis(50);

/// The outcome of a single read from an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A character arrived.
    Char(char),
    /// The timeout elapsed first.
    Timeout,
    /// The source is closed.
    Eof,
}

/// A source of raw terminal characters.
pub trait InputSource {
    /// Read one character, waiting at most `timeout` or forever if `None`.
    fn read(&mut self, timeout: Option<Duration>) -> Result<Input>;
}

impl<S: InputSource + ?Sized> InputSource for &mut S {
    fn read(&mut self, timeout: Option<Duration>) -> Result<Input> {
        (**self).read(timeout)
    }
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn read(&mut self, timeout: Option<Duration>) -> Result<Input> {
        (**self).read(timeout)
    }
}

impl InputSource for mpsc::Receiver<char> {
    fn read(&mut self, timeout: Option<Duration>) -> Result<Input> {
        match timeout {
            None => Ok(self.recv().map_or(Input::Eof, Input::Char)),
            Some(t) => match self.recv_timeout(t) {
                Ok(c) => Ok(Input::Char(c)),
                Err(mpsc::RecvTimeoutError::Timeout) => Ok(Input::Timeout),
                Err(mpsc::RecvTimeoutError::Disconnected) => Ok(Input::Eof),
            },
        }
    }
}

/// An input source that replays a fixed string and then reports end of input.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    /// Characters still to be delivered.
    pending: VecDeque<char>,
}

impl ScriptedInput {
    /// Construct a source that will deliver `script`.
    pub fn new(script: &str) -> Self {
        Self {
            pending: script.chars().collect(),
        }
    }

    /// Queue more input.
    pub fn push(&mut self, more: &str) {
        self.pending.extend(more.chars());
    }

    /// Has all input been consumed?
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn read(&mut self, _timeout: Option<Duration>) -> Result<Input> {
        Ok(self.pending.pop_front().map_or(Input::Eof, Input::Char))
    }
}

/// A resolved binding together with the input that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<T> {
    /// The bound value.
    pub value: T,
    /// The raw sequence that matched.
    pub sequence: String,
}

/// Reads characters from a source until they resolve to a binding.
#[derive(Debug)]
pub struct BindingReader<S> {
    /// Underlying input.
    source: S,
    /// Characters read ahead of the last resolved binding.
    pushback: VecDeque<char>,
    /// How long to wait when a binding is a prefix of a longer one.
    ambiguous_timeout: Duration,
}

impl<S: InputSource> BindingReader<S> {
    /// Construct a reader over a source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            pushback: VecDeque::new(),
            ambiguous_timeout: DEFAULT_AMBIGUOUS_TIMEOUT,
        }
    }

    /// Set the wait used to disambiguate bindings that prefix longer ones.
    pub fn with_ambiguous_timeout(mut self, timeout: Duration) -> Self {
        self.ambiguous_timeout = timeout;
        self
    }

    /// Mutable access to the underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Read a single character, honouring any pushed-back input first.
    pub fn read_char(&mut self, timeout: Option<Duration>) -> Result<Input> {
        if let Some(c) = self.pushback.pop_front() {
            return Ok(Input::Char(c));
        }
        self.source.read(timeout)
    }

    /// Return characters to the front of the input, preserving their order.
    fn unread(&mut self, chars: &str) {
        for c in chars.chars().rev() {
            self.pushback.push_front(c);
        }
    }

    /// Block until input resolves to a binding in `keymap`. Characters that
    /// cannot start any binding are discarded. Returns `None` once the input
    /// is exhausted.
    pub fn read_binding<T: Clone>(&mut self, keymap: &KeyMap<T>) -> Result<Option<Binding<T>>> {
        if keymap.is_empty() && keymap.unicode().is_none() {
            return Err(Error::Invalid("reading from an empty key map".into()));
        }
        let mut seq = String::new();
        // Longest complete binding seen so far, and its length in bytes.
        let mut matched: Option<(T, usize)> = None;

        loop {
            let timeout = matched.as_ref().map(|_| self.ambiguous_timeout);
            match self.read_char(timeout)? {
                Input::Char(c) => seq.push(c),
                Input::Timeout | Input::Eof => {
                    if let Some((value, len)) = matched {
                        self.unread(&seq[len..]);
                        seq.truncate(len);
                        return Ok(Some(Binding {
                            value,
                            sequence: seq,
                        }));
                    }
                    if seq.is_empty() {
                        return Ok(None);
                    }
                    tracing::debug!(?seq, "incomplete input sequence discarded");
                    return Ok(None);
                }
            }

            let longer = keymap.has_longer(&seq);
            if let Some(value) = keymap.lookup(&seq) {
                if !longer {
                    return Ok(Some(Binding {
                        value: value.clone(),
                        sequence: seq,
                    }));
                }
                matched = Some((value.clone(), seq.len()));
                continue;
            }
            if longer {
                continue;
            }

            if let Some((value, len)) = matched.take() {
                self.unread(&seq[len..]);
                seq.truncate(len);
                return Ok(Some(Binding {
                    value,
                    sequence: seq,
                }));
            }

            let mut chars = seq.chars();
            if let (Some(first), Some(unicode)) = (chars.next(), keymap.unicode())
                && !first.is_ascii()
            {
                self.unread(chars.as_str());
                return Ok(Some(Binding {
                    value: unicode.clone(),
                    sequence: first.to_string(),
                }));
            }

            // Nothing can start with this character: drop it and rescan the rest.
            let rest = chars.as_str().to_string();
            tracing::trace!(?seq, "unbound input skipped");
            self.unread(&rest);
            seq.clear();
        }
    }
}
