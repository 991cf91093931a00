use std::{
    any::Any,
    collections::HashSet,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use tracing::{debug, error};

use super::{
    lock,
    message::{EventType, Message},
    Shared,
};

/// Work a processor hands back to the loop.
pub type Producer = Box<dyn FnOnce(&Emitter) + Send>;

/// The outcome of processing one message.
pub enum Processed {
    /// Publish these messages to subscribers immediately.
    Messages(Vec<Message>),
    /// Run the producer on its own thread. Everything it emits is published.
    Stream(Producer),
}

/// Transforms selected inbound messages before they reach subscribers.
///
/// Processors are consulted in registration order and the first one that
/// accepts a message owns it. A message no processor accepts is published
/// as-is.
pub trait Processor: Send + Sync {
    /// Does this processor want the message?
    fn can_process(&self, message: &Message) -> bool;
    /// Process a message this processor accepted.
    fn process(&self, message: Message) -> Processed;
}

/// Publishes processor output directly to subscribers.
#[derive(Clone)]
pub struct Emitter {
    /// Loop state.
    shared: Arc<Shared>,
}

impl Emitter {
    /// Construct an emitter over the loop's shared state.
    pub(super) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Publish a message. Returns false once the loop has been destroyed, at
    /// which point producers should stop.
    pub fn emit(&self, message: Message) -> bool {
        if !self.shared.is_active() {
            return false;
        }
        self.shared.broadcast(&message);
        true
    }

    /// Is the loop still running?
    pub fn is_active(&self) -> bool {
        self.shared.is_active()
    }
}

/// Ask the tick processor for a stream of ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickRequest {
    /// Identifies the stream; echoed on every tick.
    pub id: String,
    /// Delay before each tick.
    pub interval: Duration,
    /// Number of ticks, or unbounded.
    pub count: Option<u64>,
}

impl TickRequest {
    /// Request an unbounded tick stream.
    pub fn new(id: impl Into<String>, interval: Duration) -> Self {
        Self {
            id: id.into(),
            interval,
            count: None,
        }
    }

    /// Limit the number of ticks.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }
}

/// Stop a tick stream started by a [`TickRequest`] with the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickStop {
    /// The stream to stop.
    pub id: String,
}

/// One tick, published as a system message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    /// The requesting stream.
    pub id: String,
    /// Zero-based tick number.
    pub sequence: u64,
}

/// Turns tick requests into timed streams of [`Tick`] messages.
#[derive(Default)]
pub struct TickProcessor {
    /// Ids of streams that have been asked to stop.
    stopped: Arc<Mutex<HashSet<String>>>,
}

impl TickProcessor {
    /// Construct a tick processor.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Processor for TickProcessor {
    fn can_process(&self, message: &Message) -> bool {
        message.event_type() == Some(EventType::System)
            && (message.is::<TickRequest>() || message.is::<TickStop>())
    }

    fn process(&self, message: Message) -> Processed {
        if let Some(stop) = message.payload::<TickStop>() {
            lock(&self.stopped).insert(stop.id.clone());
            return Processed::Messages(vec![]);
        }
        let Some(request) = message.payload_arc::<TickRequest>() else {
            return Processed::Messages(vec![]);
        };
        lock(&self.stopped).remove(&request.id);
        let stopped = self.stopped.clone();
        debug!(id = %request.id, "starting tick stream");
        Processed::Stream(Box::new(move |emitter: &Emitter| {
            let mut sequence = 0;
            while request.count.is_none_or(|c| sequence < c) {
                thread::sleep(request.interval);
                if lock(&stopped).remove(&request.id) {
                    break;
                }
                let tick = Tick {
                    id: request.id.clone(),
                    sequence,
                };
                if !emitter.emit(Message::new(EventType::System, tick)) {
                    break;
                }
                sequence += 1;
            }
            debug!(id = %request.id, ticks = sequence, "tick stream finished");
        }))
    }
}

/// Body of a task.
type Work = Box<dyn FnOnce(&TaskContext<'_>) + Send>;

/// A unit of background work carried in a task message.
pub struct Task {
    /// Name echoed in every [`TaskEvent`].
    name: String,
    /// The work; taken when the task starts so it runs at most once.
    work: Mutex<Option<Work>>,
}

impl Task {
    /// A task that can report progress.
    pub fn new(name: impl Into<String>, work: impl FnOnce(&TaskContext<'_>) + Send + 'static) -> Self {
        Self {
            name: name.into(),
            work: Mutex::new(Some(Box::new(work))),
        }
    }

    /// A plain task.
    pub fn run(name: impl Into<String>, work: impl FnOnce() + Send + 'static) -> Self {
        Self::new(name, move |_| work())
    }

    /// The task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take the work out of the task.
    fn take(&self) -> Option<Work> {
        lock(&self.work).take()
    }
}

/// Handle given to running task bodies.
pub struct TaskContext<'a> {
    /// Task name.
    name: &'a str,
    /// Output channel.
    emitter: &'a Emitter,
}

impl TaskContext<'_> {
    /// Report progress as a percentage. Returns false if the loop is gone.
    pub fn progress(&self, percent: u8) -> bool {
        self.emitter.emit(TaskEvent::Progress {
            name: self.name.to_string(),
            percent: percent.min(100),
        }
        .into())
    }

    /// Has the loop been destroyed?
    pub fn is_cancelled(&self) -> bool {
        !self.emitter.is_active()
    }

    /// Publish an arbitrary message.
    pub fn emit(&self, message: Message) -> bool {
        self.emitter.emit(message)
    }
}

/// Lifecycle notifications for tasks, published with [`EventType::Task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// The task body is about to run.
    Started {
        /// Task name.
        name: String,
    },
    /// The body reported progress.
    Progress {
        /// Task name.
        name: String,
        /// Completion percentage.
        percent: u8,
    },
    /// The body returned.
    Completed {
        /// Task name.
        name: String,
    },
    /// The body panicked.
    Failed {
        /// Task name.
        name: String,
        /// Panic message.
        reason: String,
    },
}

impl From<TaskEvent> for Message {
    fn from(e: TaskEvent) -> Self {
        Self::new(EventType::Task, e)
    }
}

/// Render a panic payload as text.
fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

/// Runs [`Task`] bodies off the broadcaster thread and reports their
/// lifecycle as [`TaskEvent`]s.
#[derive(Default)]
pub struct TaskProcessor;

impl TaskProcessor {
    /// Construct a task processor.
    pub fn new() -> Self {
        Self
    }
}

impl Processor for TaskProcessor {
    fn can_process(&self, message: &Message) -> bool {
        message.event_type() == Some(EventType::Task) && message.is::<Task>()
    }

    fn process(&self, message: Message) -> Processed {
        let Some(task) = message.payload_arc::<Task>() else {
            return Processed::Messages(vec![]);
        };
        let Some(work) = task.take() else {
            return Processed::Messages(vec![]);
        };
        Processed::Stream(Box::new(move |emitter: &Emitter| {
            let name = task.name().to_string();
            emitter.emit(TaskEvent::Started { name: name.clone() }.into());
            let ctx = TaskContext {
                name: &name,
                emitter,
            };
            match panic::catch_unwind(AssertUnwindSafe(|| work(&ctx))) {
                Ok(()) => {
                    emitter.emit(TaskEvent::Completed { name }.into());
                }
                Err(payload) => {
                    let reason = panic_reason(payload.as_ref());
                    error!(task = %name, %reason, "task failed");
                    emitter.emit(TaskEvent::Failed { name, reason }.into());
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_accepts() {
        let p = TickProcessor::new();
        assert!(p.can_process(&Message::tick(TickRequest::new("a", Duration::ZERO))));
        assert!(p.can_process(&Message::tick_stop("a")));
        assert!(!p.can_process(&Message::user(TickRequest::new("a", Duration::ZERO))));
        assert!(!p.can_process(&Message::redraw()));
    }

    #[test]
    fn task_accepts() {
        let p = TaskProcessor::new();
        assert!(p.can_process(&Message::task(Task::run("t", || {}))));
        assert!(!p.can_process(&Message::new(EventType::Task, "not a task")));
    }

    #[test]
    fn task_runs_once() {
        let p = TaskProcessor::new();
        let m = Message::task(Task::run("t", || {}));
        assert!(matches!(p.process(m.clone()), Processed::Stream(_)));
        assert!(matches!(p.process(m), Processed::Messages(v) if v.is_empty()));
    }

    #[test]
    fn reasons() {
        let s: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_reason(s.as_ref()), "boom");
        let s: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_reason(s.as_ref()), "bang");
        let s: Box<dyn Any + Send> = Box::new(3);
        assert_eq!(panic_reason(s.as_ref()), "task panicked");
    }
}
