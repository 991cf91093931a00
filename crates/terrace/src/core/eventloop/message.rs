use std::{
    any::Any,
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    sync::Arc,
};

use super::processor::{Task, TickRequest, TickStop};
use crate::event::{key::KeyEvent, mouse::MouseEvent};

/// Payload text of a redraw request.
pub const REDRAW: &str = "redraw";
/// Payload text of an interrupt request.
pub const INTERRUPT: &str = "int";

/// Coarse classification used for typed subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Process signals such as window resizes.
    Signal,
    /// Keyboard input.
    Key,
    /// Mouse input.
    Mouse,
    /// Runtime notifications such as redraw requests and ticks.
    System,
    /// View-originated notifications.
    View,
    /// Application-defined messages.
    User,
    /// Background work and its progress.
    Task,
}

/// A shared, type-erased payload.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// A unit of traffic on the event loop.
#[derive(Clone)]
pub struct Message {
    /// Classification tag, if any.
    event_type: Option<EventType>,
    /// The payload.
    payload: Payload,
    /// Ordering hint; lower values are delivered first.
    priority: Option<i32>,
    /// Free-form string headers.
    headers: BTreeMap<String, String>,
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("event_type", &self.event_type)
            .field("priority", &self.priority)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl Message {
    /// Construct a tagged message.
    pub fn new<T: Any + Send + Sync>(event_type: EventType, payload: T) -> Self {
        Self {
            event_type: Some(event_type),
            payload: Arc::new(payload),
            priority: None,
            headers: BTreeMap::new(),
        }
    }

    /// Construct a message with no event type. Typed subscriptions never see
    /// these.
    pub fn untagged<T: Any + Send + Sync>(payload: T) -> Self {
        Self {
            event_type: None,
            payload: Arc::new(payload),
            priority: None,
            headers: BTreeMap::new(),
        }
    }

    /// A keyboard event.
    pub fn key(event: KeyEvent) -> Self {
        Self::new(EventType::Key, event)
    }

    /// A mouse event.
    pub fn mouse(event: MouseEvent) -> Self {
        Self::new(EventType::Mouse, event)
    }

    /// A high-priority redraw request.
    pub fn redraw() -> Self {
        Self::new(EventType::System, REDRAW.to_string()).with_priority(0)
    }

    /// A high-priority interrupt request.
    pub fn interrupt() -> Self {
        Self::new(EventType::System, INTERRUPT.to_string()).with_priority(0)
    }

    /// A high-priority signal notification.
    pub fn signal(name: &str) -> Self {
        Self::new(EventType::Signal, name.to_string()).with_priority(0)
    }

    /// A view notification.
    pub fn view<T: Any + Send + Sync>(payload: T) -> Self {
        Self::new(EventType::View, payload)
    }

    /// An application message.
    pub fn user<T: Any + Send + Sync>(payload: T) -> Self {
        Self::new(EventType::User, payload)
    }

    /// A system message asking for ticks.
    pub fn tick(request: TickRequest) -> Self {
        Self::new(EventType::System, request)
    }

    /// A system message stopping a tick stream.
    pub fn tick_stop(id: impl Into<String>) -> Self {
        Self::new(EventType::System, TickStop { id: id.into() }).with_priority(0)
    }

    /// A task message.
    pub fn task(task: Task) -> Self {
        Self::new(EventType::Task, task)
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// A header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// The event type.
    pub fn event_type(&self) -> Option<EventType> {
        self.event_type
    }

    /// The priority.
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    /// Is the payload a `T`?
    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    /// Borrow the payload as a `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Share the payload as a `T`.
    pub fn payload_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.payload.clone().downcast::<T>().ok()
    }
}

/// Heap entry that pops the lowest priority first. Messages without a
/// priority sort after every prioritized one. Ties are unordered.
pub(super) struct Queued(pub(super) Message);

impl Queued {
    /// Sort key; smaller keys are delivered first.
    fn rank(&self) -> (bool, i32) {
        (self.0.priority.is_none(), self.0.priority.unwrap_or(0))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reverse order so the smallest rank is at the top of the max-heap.
impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other.rank().cmp(&self.rank())
    }
}
