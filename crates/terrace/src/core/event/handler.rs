//! Composable key and mouse handlers.
//!
//! A handler takes an event and reports whether it consumed it, optionally
//! naming a view that should take focus or capture subsequent input. Handlers
//! are chained with [`HandlerExt`] combinators, which is how events bubble from
//! one handler to the next.
use super::{key::KeyEvent, mouse::MouseEvent};

/// Identifier for a view that a handler wants focused or capturing input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

/// The view a handler wants focused.
pub type FocusTarget = ViewId;
/// The view a handler wants to capture subsequent input.
pub type CaptureTarget = ViewId;

/// Outcome of handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResult<E> {
    /// The event that was handled.
    pub event: Option<E>,
    /// Was the event consumed?
    pub consumed: bool,
    /// View that should receive focus.
    pub focus: Option<ViewId>,
    /// View that should capture subsequent events.
    pub capture: Option<ViewId>,
}

impl<E> HandlerResult<E> {
    /// Construct a result with no capture target.
    pub fn of(event: E, consumed: bool, focus: Option<ViewId>) -> Self {
        Self {
            event: Some(event),
            consumed,
            focus,
            capture: None,
        }
    }

    /// A consumed result.
    pub fn consumed(event: E) -> Self {
        Self::of(event, true, None)
    }

    /// An unconsumed result.
    pub fn not_consumed(event: E) -> Self {
        Self::of(event, false, None)
    }

    /// Set the capture target.
    pub fn with_capture(mut self, view: ViewId) -> Self {
        self.capture = Some(view);
        self
    }
}

/// A single-operation event strategy.
pub trait Handler<E> {
    /// Handle an event.
    fn handle(&mut self, event: &E) -> HandlerResult<E>;
}

impl<E, F> Handler<E> for F
where
    F: FnMut(&E) -> HandlerResult<E>,
{
    fn handle(&mut self, event: &E) -> HandlerResult<E> {
        self(event)
    }
}

/// Boxed keyboard handler.
pub type KeyHandler = Box<dyn FnMut(&KeyEvent) -> HandlerResult<KeyEvent> + Send>;
/// Boxed mouse handler.
pub type MouseHandler = Box<dyn FnMut(&MouseEvent) -> HandlerResult<MouseEvent> + Send>;

/// Predicate deciding whether a chained handler runs.
pub type ResultPredicate<E> = fn(&HandlerResult<E>) -> bool;

/// Two handlers where the second runs only when the predicate holds over the
/// first one's result.
pub struct Conditional<A, B, P> {
    /// Handler that always runs.
    first: A,
    /// Handler that runs when `predicate` holds.
    second: B,
    /// Predicate over the first result.
    predicate: P,
}

impl<E, A, B, P> Handler<E> for Conditional<A, B, P>
where
    A: Handler<E>,
    B: Handler<E>,
    P: FnMut(&HandlerResult<E>) -> bool,
{
    fn handle(&mut self, event: &E) -> HandlerResult<E> {
        let result = self.first.handle(event);
        if (self.predicate)(&result) {
            self.second.handle(event)
        } else {
            result
        }
    }
}

/// Combinators available on every handler.
pub trait HandlerExt<E>: Handler<E> + Sized {
    /// Run `other` after this handler if `predicate` holds over our result.
    /// The chain reports the result of whichever handler ran last.
    fn then_conditionally<B, P>(self, other: B, predicate: P) -> Conditional<Self, B, P>
    where
        B: Handler<E>,
        P: FnMut(&HandlerResult<E>) -> bool,
    {
        Conditional {
            first: self,
            second: other,
            predicate,
        }
    }

    /// Run `other` only if this handler consumed the event.
    fn then_if_consumed<B>(self, other: B) -> Conditional<Self, B, ResultPredicate<E>>
    where
        B: Handler<E>,
    {
        let consumed: ResultPredicate<E> = |r| r.consumed;
        self.then_conditionally(other, consumed)
    }

    /// Run `other` only if this handler did not consume the event.
    fn then_if_not_consumed<B>(self, other: B) -> Conditional<Self, B, ResultPredicate<E>>
    where
        B: Handler<E>,
    {
        let unconsumed: ResultPredicate<E> = |r| !r.consumed;
        self.then_conditionally(other, unconsumed)
    }
}

impl<E, H: Handler<E>> HandlerExt<E> for H {}

/// A handler that echoes the event back without consuming it.
pub fn never_consume<E: Clone>() -> impl FnMut(&E) -> HandlerResult<E> {
    |e: &E| HandlerResult::not_consumed(e.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::event::key::{self, KeyEvent};

    fn counting(
        count: &Arc<AtomicUsize>,
        consume: bool,
    ) -> impl FnMut(&KeyEvent) -> HandlerResult<KeyEvent> + use<> {
        let count = count.clone();
        move |e: &KeyEvent| {
            count.fetch_add(1, Ordering::SeqCst);
            HandlerResult::of(e.clone(), consume, None)
        }
    }

    #[test]
    fn bubbling() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let event = KeyEvent::new(key::ENTER);

        let mut h = counting(&first, false).then_if_not_consumed(counting(&second, true));
        let r = h.handle(&event);
        assert!(r.consumed);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        let mut h = counting(&first, true).then_if_not_consumed(counting(&second, false));
        let r = h.handle(&event);
        assert!(r.consumed);
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn chain_reports_last_run() {
        let n = Arc::new(AtomicUsize::new(0));
        let event = KeyEvent::from('x');

        let focus = |e: &KeyEvent| HandlerResult::of(e.clone(), true, Some(ViewId(7)));
        let mut h = focus.then_if_consumed(never_consume::<KeyEvent>());
        let r = h.handle(&event);
        assert!(!r.consumed);
        assert_eq!(r.focus, None);
        assert_eq!(r.event, Some(event.clone()));

        let mut h = never_consume::<KeyEvent>()
            .then_if_consumed(counting(&n, true))
            .then_conditionally(counting(&n, true), |r| r.event.is_some());
        let r = h.handle(&event);
        assert!(r.consumed);
        assert_eq!(n.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn boxed_handlers() {
        let mut handlers: Vec<KeyHandler> = vec![
            Box::new(never_consume::<KeyEvent>()),
            Box::new(|e: &KeyEvent| HandlerResult::consumed(e.clone()).with_capture(ViewId(1))),
        ];
        let event = KeyEvent::from('a');
        let r = handlers[1].handle(&event);
        assert_eq!(r.capture, Some(ViewId(1)));
        assert!(!handlers[0].handle(&event).consumed);
    }
}
