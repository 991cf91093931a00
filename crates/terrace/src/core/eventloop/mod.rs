//! A multi-producer, multi-subscriber message bus.
//!
//! Producers on any thread hand messages to [`EventLoop::dispatch`]. A single
//! broadcaster thread drains the bounded inbound queue in priority order,
//! passes each message through the first [`Processor`] that accepts it, and
//! fans the result out to every live subscription. Subscribers only see
//! messages published after they subscribed.

/// Loop configuration.
mod config;
/// Messages and their classification.
mod message;
/// Message processors.
mod processor;

use std::{
    any::Any,
    collections::BinaryHeap,
    marker::PhantomData,
    mem,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError, TrySendError},
    },
    thread,
    time::{Duration, Instant},
};

pub use config::EventLoopConfig;
pub use message::{EventType, INTERRUPT, Message, Payload, REDRAW};
pub use processor::{
    Emitter, Processed, Processor, Producer, Task, TaskContext, TaskEvent, TaskProcessor, Tick,
    TickProcessor, TickRequest, TickStop,
};
use message::Queued;
use tracing::{debug, trace, warn};

use crate::{
    error::{Error, Result},
    event::{key::KeyEvent, mouse::MouseEvent},
};

/// How often the broadcaster wakes to check for shutdown.
const WORKER_POLL: Duration = Duration::from_millis(50);

/// Lock a mutex, recovering the data if a panicking thread poisoned it.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A subscription registered with the broadcaster.
struct Subscriber {
    /// Bounded delivery channel.
    tx: mpsc::SyncSender<Message>,
    /// Dies when the subscriber's stream is dropped.
    alive: Weak<()>,
}

/// A cleanup action run on destroy.
type Disposable = Box<dyn FnOnce() + Send>;

/// State shared between the handle, the broadcaster and producer threads.
pub(crate) struct Shared {
    /// Cleared on destroy.
    active: AtomicBool,
    /// Current subscriptions.
    subscribers: Mutex<Vec<Subscriber>>,
    /// Number of outstanding suspend guards.
    held: Mutex<usize>,
    /// Signalled when `held` drops to zero or the loop is destroyed.
    resume: Condvar,
    /// Cleanup actions, run exactly once on destroy.
    disposables: Mutex<Vec<Disposable>>,
    /// Processors in consultation order.
    processors: Vec<Box<dyn Processor>>,
}

impl Shared {
    /// Is the loop running?
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of subscriptions whose stream is still held.
    fn live_subscribers(&self) -> usize {
        lock(&self.subscribers)
            .iter()
            .filter(|s| s.alive.strong_count() > 0)
            .count()
    }

    /// Deliver a message to every live subscriber, pruning dead ones. A
    /// subscriber whose buffer is full misses this message.
    pub(crate) fn broadcast(&self, message: &Message) {
        let mut subs = lock(&self.subscribers);
        subs.retain(|s| {
            if s.alive.strong_count() == 0 {
                return false;
            }
            match s.tx.try_send(message.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(event_type = ?message.event_type(), "subscriber full, message dropped");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        });
        trace!(subscribers = subs.len(), "broadcast");
    }

    /// Block while any suspend guard is outstanding.
    fn wait_released(&self) {
        let mut held = lock(&self.held);
        while *held > 0 && self.is_active() {
            held = self
                .resume
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Pass a message through the first accepting processor and publish the
    /// outcome.
    fn route(self: &Arc<Self>, message: Message) {
        let Some(processor) = self.processors.iter().find(|p| p.can_process(&message)) else {
            self.broadcast(&message);
            return;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| processor.process(message))) {
            Ok(Processed::Messages(out)) => {
                for m in &out {
                    self.broadcast(m);
                }
            }
            Ok(Processed::Stream(producer)) => {
                let emitter = Emitter::new(self.clone());
                let spawned = thread::Builder::new()
                    .name("terrace-producer".into())
                    .spawn(move || producer(&emitter));
                if let Err(e) = spawned {
                    warn!(error = %e, "could not start producer");
                }
            }
            Err(_) => warn!("processor panicked, message dropped"),
        }
    }
}

/// The broadcaster thread body.
fn broadcaster(shared: &Arc<Shared>, rx: &mpsc::Receiver<Message>) {
    let mut heap = BinaryHeap::new();
    loop {
        let first = match rx.recv_timeout(WORKER_POLL) {
            Ok(m) => m,
            Err(RecvTimeoutError::Timeout) => {
                if shared.is_active() {
                    continue;
                }
                break;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };
        shared.wait_released();
        heap.push(Queued(first));
        while let Ok(m) = rx.try_recv() {
            heap.push(Queued(m));
        }
        while let Some(Queued(m)) = heap.pop() {
            if !shared.is_active() {
                return;
            }
            shared.route(m);
        }
    }
    debug!("broadcaster exiting");
}

/// A cloneable handle for dispatching from other threads.
#[derive(Clone)]
pub struct Dispatcher {
    /// Loop state.
    shared: Arc<Shared>,
    /// Inbound queue.
    inbound: mpsc::SyncSender<Message>,
    /// Retry timing.
    config: EventLoopConfig,
}

impl Dispatcher {
    /// Queue a message for delivery.
    ///
    /// Fails with [`Error::Terminated`] after destroy and with
    /// [`Error::NoSubscribers`] when nobody is listening. A full queue is
    /// retried until the configured timeout, after which the message is
    /// dropped with a warning.
    pub fn dispatch(&self, message: Message) -> Result<()> {
        if !self.shared.is_active() {
            return Err(Error::Terminated);
        }
        if self.shared.live_subscribers() == 0 {
            return Err(Error::NoSubscribers);
        }
        debug!(
            event_type = ?message.event_type(),
            priority = ?message.priority(),
            "dispatch"
        );
        let deadline = Instant::now() + self.config.dispatch_timeout();
        let mut message = message;
        loop {
            match self.inbound.try_send(message) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(m)) => {
                    if Instant::now() >= deadline || !self.shared.is_active() {
                        warn!("Failed to send message");
                        return Ok(());
                    }
                    message = m;
                    thread::sleep(self.config.retry_interval());
                }
                Err(TrySendError::Disconnected(_)) => return Err(Error::Terminated),
            }
        }
    }
}

/// A subscription to every published message.
///
/// Iteration blocks until the next message and ends when the loop is
/// destroyed.
pub struct Events {
    /// Delivery channel.
    rx: mpsc::Receiver<Message>,
    /// Keeps the subscription alive.
    _token: Arc<()>,
}

impl Events {
    /// Wait up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Message> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Take the next message if one is already waiting.
    pub fn try_recv(&self) -> Option<Message> {
        self.rx.try_recv().ok()
    }
}

impl Iterator for Events {
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        self.rx.recv().ok()
    }
}

/// A subscription filtered to one payload type and, optionally, one event
/// type.
pub struct TypedEvents<T> {
    /// Underlying subscription.
    events: Events,
    /// Required event type.
    event_type: Option<EventType>,
    /// Payload type.
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypedEvents<T> {
    /// The payload, if the message passes the filter.
    fn accept(&self, m: &Message) -> Option<Arc<T>> {
        if self.event_type.is_some() && m.event_type() != self.event_type {
            return None;
        }
        m.payload_arc::<T>()
    }

    /// Wait up to `timeout` for the next matching payload.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Arc<T>> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.checked_duration_since(Instant::now())?;
            let m = self.events.recv_timeout(left)?;
            if let Some(v) = self.accept(&m) {
                return Some(v);
            }
        }
    }

    /// Take the next matching payload if one is already waiting.
    pub fn try_recv(&self) -> Option<Arc<T>> {
        while let Some(m) = self.events.try_recv() {
            if let Some(v) = self.accept(&m) {
                return Some(v);
            }
        }
        None
    }
}

impl<T: Any + Send + Sync> Iterator for TypedEvents<T> {
    type Item = Arc<T>;

    fn next(&mut self) -> Option<Arc<T>> {
        loop {
            let m = self.events.next()?;
            if let Some(v) = self.accept(&m) {
                return Some(v);
            }
        }
    }
}

/// Holds back delivery until dropped. Messages dispatched meanwhile are
/// queued and then delivered in priority order.
pub struct Suspended<'a> {
    /// Loop state.
    shared: &'a Shared,
}

impl Drop for Suspended<'_> {
    fn drop(&mut self) {
        let mut held = lock(&self.shared.held);
        *held = held.saturating_sub(1);
        self.shared.resume.notify_all();
    }
}

/// The event loop handle. Dropping it destroys the loop.
pub struct EventLoop {
    /// Dispatch side.
    dispatcher: Dispatcher,
    /// Broadcaster thread.
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl EventLoop {
    /// Start a loop with the default configuration and processors.
    pub fn new() -> Result<Self> {
        Self::with_processors(EventLoopConfig::default(), vec![])
    }

    /// Start a loop with a custom configuration.
    pub fn with_config(config: EventLoopConfig) -> Result<Self> {
        Self::with_processors(config, vec![])
    }

    /// Start a loop with custom processors. These are consulted before the
    /// built-in tick and task processors.
    pub fn with_processors(
        config: EventLoopConfig,
        mut processors: Vec<Box<dyn Processor>>,
    ) -> Result<Self> {
        config.validate()?;
        if config.install_default_processors {
            processors.push(Box::new(TickProcessor::new()));
            processors.push(Box::new(TaskProcessor::new()));
        }
        let shared = Arc::new(Shared {
            active: AtomicBool::new(true),
            subscribers: Mutex::new(vec![]),
            held: Mutex::new(0),
            resume: Condvar::new(),
            disposables: Mutex::new(vec![]),
            processors,
        });
        let (inbound, rx) = mpsc::sync_channel(config.queue_capacity);
        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name("terrace-broadcaster".into())
            .spawn(move || broadcaster(&worker_shared, &rx))?;
        debug!(capacity = config.queue_capacity, "event loop started");
        Ok(Self {
            dispatcher: Dispatcher {
                shared,
                inbound,
                config,
            },
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Loop state.
    fn shared(&self) -> &Arc<Shared> {
        &self.dispatcher.shared
    }

    /// Is the loop running?
    pub fn is_active(&self) -> bool {
        self.shared().is_active()
    }

    /// A cloneable dispatch handle.
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Queue a message. See [`Dispatcher::dispatch`].
    pub fn dispatch(&self, message: Message) -> Result<()> {
        self.dispatcher.dispatch(message)
    }

    /// Forward every message from `source` on a background thread. Failures
    /// on individual messages are logged and skipped. Forwarding stops when
    /// the loop is destroyed.
    pub fn dispatch_stream<I>(&self, source: I) -> Result<()>
    where
        I: IntoIterator<Item = Message>,
        I::IntoIter: Send + 'static,
    {
        if !self.is_active() {
            return Err(Error::Terminated);
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        self.on_destroy(move || flag.store(true, Ordering::SeqCst))?;
        let dispatcher = self.dispatcher();
        let source = source.into_iter();
        thread::Builder::new()
            .name("terrace-forwarder".into())
            .spawn(move || {
                for message in source {
                    if cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                    match dispatcher.dispatch(message) {
                        Ok(()) => {}
                        Err(Error::Terminated) => break,
                        Err(e) => warn!(error = %e, "forwarded message skipped"),
                    }
                }
            })?;
        Ok(())
    }

    /// Subscribe to every message published from now on.
    pub fn events(&self) -> Result<Events> {
        let (tx, rx) = mpsc::sync_channel(self.dispatcher.config.subscriber_capacity);
        let token = Arc::new(());
        let mut subs = lock(&self.shared().subscribers);
        // Checked under the lock so destroy cannot slip in between.
        if !self.is_active() {
            return Err(Error::Terminated);
        }
        subs.push(Subscriber {
            tx,
            alive: Arc::downgrade(&token),
        });
        Ok(Events { rx, _token: token })
    }

    /// Subscribe to messages of `event_type` carrying a `T`.
    pub fn events_of<T: Any + Send + Sync>(&self, event_type: EventType) -> Result<TypedEvents<T>> {
        Ok(TypedEvents {
            events: self.events()?,
            event_type: Some(event_type),
            _marker: PhantomData,
        })
    }

    /// Subscribe to messages carrying a `T`, whatever their event type.
    pub fn payloads<T: Any + Send + Sync>(&self) -> Result<TypedEvents<T>> {
        Ok(TypedEvents {
            events: self.events()?,
            event_type: None,
            _marker: PhantomData,
        })
    }

    /// Keyboard events.
    pub fn key_events(&self) -> Result<TypedEvents<KeyEvent>> {
        self.events_of(EventType::Key)
    }

    /// Mouse events.
    pub fn mouse_events(&self) -> Result<TypedEvents<MouseEvent>> {
        self.events_of(EventType::Mouse)
    }

    /// Textual system notifications such as redraw and interrupt.
    pub fn system_events(&self) -> Result<TypedEvents<String>> {
        self.events_of(EventType::System)
    }

    /// Signal names.
    pub fn signal_events(&self) -> Result<TypedEvents<String>> {
        self.events_of(EventType::Signal)
    }

    /// View notifications carrying a `T`.
    pub fn view_events<T: Any + Send + Sync>(&self) -> Result<TypedEvents<T>> {
        self.events_of(EventType::View)
    }

    /// Task lifecycle notifications.
    pub fn task_events(&self) -> Result<TypedEvents<TaskEvent>> {
        self.events_of(EventType::Task)
    }

    /// Ticks from the tick processor.
    pub fn tick_events(&self) -> Result<TypedEvents<Tick>> {
        self.events_of(EventType::System)
    }

    /// Hold delivery until the returned guard is dropped.
    pub fn suspend(&self) -> Suspended<'_> {
        *lock(&self.shared().held) += 1;
        Suspended {
            shared: self.shared(),
        }
    }

    /// Register a cleanup action to run once when the loop is destroyed. On a
    /// destroyed loop the action runs immediately.
    pub fn on_destroy(&self, f: impl FnOnce() + Send + 'static) -> Result<()> {
        {
            let mut d = lock(&self.shared().disposables);
            if self.is_active() {
                d.push(Box::new(f));
                return Ok(());
            }
        }
        f();
        Ok(())
    }

    /// Stop the loop: run cleanup actions, complete every subscription and
    /// join the broadcaster. Calling this more than once is harmless.
    pub fn destroy(&self) {
        let shared = self.shared();
        let disposables = {
            let mut d = lock(&shared.disposables);
            let mut subs = lock(&shared.subscribers);
            if !shared.active.swap(false, Ordering::SeqCst) {
                return;
            }
            subs.clear();
            mem::take(&mut *d)
        };
        debug!(disposables = disposables.len(), "destroying event loop");
        {
            let _held = lock(&shared.held);
            shared.resume.notify_all();
        }
        for f in disposables {
            f();
        }
        let worker = lock(&self.worker).take();
        if let Some(h) = worker {
            if h.thread().id() == thread::current().id() {
                return;
            }
            if h.join().is_err() {
                warn!("broadcaster panicked");
            }
        }
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use std::{iter, sync::atomic::AtomicUsize};

    use super::*;
    use crate::event::key;

    /// Generous bound for cross-thread delivery in tests.
    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn no_subscribers() -> Result<()> {
        let el = EventLoop::new()?;
        assert_eq!(el.dispatch(Message::redraw()), Err(Error::NoSubscribers));
        let events = el.events()?;
        el.dispatch(Message::redraw())?;
        assert!(events.recv_timeout(WAIT).is_some());
        drop(events);
        assert_eq!(el.dispatch(Message::redraw()), Err(Error::NoSubscribers));
        Ok(())
    }

    #[test]
    fn terminated() -> Result<()> {
        let el = EventLoop::new()?;
        let mut events = el.events()?;
        el.destroy();
        el.destroy();
        assert!(!el.is_active());
        assert_eq!(el.dispatch(Message::redraw()), Err(Error::Terminated));
        assert!(el.events().is_err());
        assert!(events.next().is_none());
        Ok(())
    }

    #[test]
    fn priority_order() -> Result<()> {
        let el = EventLoop::new()?;
        let events = el.payloads::<i32>()?;
        {
            let _hold = el.suspend();
            for p in [3, 1, 4, 0, 2] {
                el.dispatch(Message::user(p).with_priority(p))?;
            }
        }
        let got: Vec<i32> = (0..5)
            .filter_map(|_| events.recv_timeout(WAIT))
            .map(|v| *v)
            .collect();
        assert_eq!(got, vec![0, 1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn typed_streams() -> Result<()> {
        let el = EventLoop::new()?;
        let keys = el.key_events()?;
        let system = el.system_events()?;
        el.dispatch(Message::user(1u8))?;
        el.dispatch(Message::key(KeyEvent::new(key::ENTER)))?;
        el.dispatch(Message::redraw())?;
        assert_eq!(keys.recv_timeout(WAIT).map(|k| k.code()), Some(key::ENTER));
        assert_eq!(system.recv_timeout(WAIT).as_deref().map(String::as_str), Some(REDRAW));
        assert!(keys.try_recv().is_none());
        Ok(())
    }

    #[test]
    fn no_replay() -> Result<()> {
        let el = EventLoop::new()?;
        let early = el.payloads::<u32>()?;
        el.dispatch(Message::user(1u32))?;
        assert_eq!(early.recv_timeout(WAIT).map(|v| *v), Some(1));
        let late = el.payloads::<u32>()?;
        el.dispatch(Message::user(2u32))?;
        assert_eq!(late.recv_timeout(WAIT).map(|v| *v), Some(2));
        assert_eq!(early.recv_timeout(WAIT).map(|v| *v), Some(2));
        Ok(())
    }

    #[test]
    fn destroy_once() -> Result<()> {
        let el = EventLoop::new()?;
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        el.on_destroy(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })?;
        el.destroy();
        el.destroy();
        drop(el);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn forward_stream() -> Result<()> {
        let el = EventLoop::new()?;
        let events = el.payloads::<u16>()?;
        el.dispatch_stream((0..3u16).map(Message::user))?;
        let got: Vec<u16> = (0..3)
            .filter_map(|_| events.recv_timeout(WAIT))
            .map(|v| *v)
            .collect();
        assert_eq!(got, vec![0, 1, 2]);
        Ok(())
    }

    /// Hand one item to a forwarder. With a rendezvous channel this returns
    /// once the forwarder has finished with the previous item.
    fn feed(tx: &mpsc::SyncSender<Message>, v: u16) -> Result<()> {
        tx.send(Message::user(v))
            .map_err(|_| Error::RunLoop("forwarder gone".into()))
    }

    #[test]
    fn forward_skips_failures() -> Result<()> {
        let el = EventLoop::new()?;
        let first = el.payloads::<u16>()?;
        let (tx, rx) = mpsc::sync_channel(0);
        el.dispatch_stream(rx)?;
        feed(&tx, 0)?;
        assert_eq!(first.recv_timeout(WAIT).map(|v| *v), Some(0));

        // Nobody is listening for 1, so forwarding it fails and is skipped.
        drop(first);
        feed(&tx, 1)?;
        feed(&tx, 2)?;
        let second = el.payloads::<u16>()?;
        feed(&tx, 3)?;
        drop(tx);

        let mut got = vec![];
        while let Some(v) = second.recv_timeout(WAIT) {
            got.push(*v);
            if *v == 3 {
                break;
            }
        }
        assert_eq!(got.last(), Some(&3));
        assert!(!got.contains(&1));
        Ok(())
    }

    #[test]
    fn stalled_subscriber_is_bounded() -> Result<()> {
        let config = EventLoopConfig::from_json(r#"{"subscriber_capacity": 4}"#)?;
        let el = EventLoop::with_config(config)?;
        let stalled = el.payloads::<usize>()?;
        let live = el.payloads::<usize>()?;
        for i in 0..10 {
            el.dispatch(Message::user(i))?;
            assert_eq!(live.recv_timeout(WAIT).map(|v| *v), Some(i));
        }
        let buffered: Vec<usize> = iter::from_fn(|| stalled.try_recv()).map(|v| *v).collect();
        assert_eq!(buffered, vec![0, 1, 2, 3]);

        // Once drained, the subscriber receives again.
        el.dispatch(Message::user(10usize))?;
        assert_eq!(live.recv_timeout(WAIT).map(|v| *v), Some(10));
        assert_eq!(stalled.recv_timeout(WAIT).map(|v| *v), Some(10));
        Ok(())
    }

    #[test]
    fn subscribe_during_destroy() -> Result<()> {
        for _ in 0..20 {
            let el = Arc::new(EventLoop::new()?);
            let el2 = el.clone();
            let subscriber = thread::spawn(move || {
                iter::from_fn(|| el2.events().ok())
                    .take(1000)
                    .collect::<Vec<_>>()
            });
            el.destroy();
            let subs = subscriber
                .join()
                .map_err(|_| Error::RunLoop("subscriber panicked".into()))?;
            assert!(lock(&el.shared().subscribers).is_empty());
            for mut s in subs {
                assert!(s.next().is_none());
            }
        }
        Ok(())
    }

    #[test]
    fn tick_stop() -> Result<()> {
        let el = EventLoop::new()?;
        let ticks = el.tick_events()?;
        el.dispatch(Message::tick(TickRequest::new("s", Duration::from_millis(5))))?;
        assert!(ticks.recv_timeout(WAIT).is_some());
        el.dispatch(Message::tick_stop("s"))?;
        // A tick already in flight may still land; after that the stream is quiet.
        let late = iter::from_fn(|| ticks.recv_timeout(Duration::from_millis(100)))
            .take(50)
            .count();
        assert!(late < 50);
        Ok(())
    }

    #[test]
    fn ticks() -> Result<()> {
        let el = EventLoop::new()?;
        let ticks = el.tick_events()?;
        el.dispatch(Message::tick(
            TickRequest::new("t", Duration::from_millis(1)).with_count(3),
        ))?;
        let got: Vec<u64> = (0..3)
            .filter_map(|_| ticks.recv_timeout(WAIT))
            .map(|t| t.sequence)
            .collect();
        assert_eq!(got, vec![0, 1, 2]);
        assert!(ticks.recv_timeout(Duration::from_millis(50)).is_none());
        Ok(())
    }

    #[test]
    fn tasks() -> Result<()> {
        let el = EventLoop::new()?;
        let events = el.task_events()?;
        el.dispatch(Message::task(Task::new("ok", |ctx| {
            ctx.progress(50);
        })))?;
        let got: Vec<TaskEvent> = (0..3)
            .filter_map(|_| events.recv_timeout(WAIT))
            .map(|e| (*e).clone())
            .collect();
        assert_eq!(
            got,
            vec![
                TaskEvent::Started { name: "ok".into() },
                TaskEvent::Progress {
                    name: "ok".into(),
                    percent: 50
                },
                TaskEvent::Completed { name: "ok".into() },
            ]
        );

        el.dispatch(Message::task(Task::run("bad", || panic!("boom"))))?;
        let got: Vec<TaskEvent> = (0..2)
            .filter_map(|_| events.recv_timeout(WAIT))
            .map(|e| (*e).clone())
            .collect();
        assert_eq!(
            got[1],
            TaskEvent::Failed {
                name: "bad".into(),
                reason: "boom".into()
            }
        );
        Ok(())
    }

    /// Swallows user strings and republishes them upper-cased.
    struct Shout;

    impl Processor for Shout {
        fn can_process(&self, message: &Message) -> bool {
            message.event_type() == Some(EventType::User) && message.is::<String>()
        }

        fn process(&self, message: Message) -> Processed {
            let s = message.payload::<String>().cloned().unwrap_or_default();
            Processed::Messages(vec![Message::user(s.to_uppercase())])
        }
    }

    #[test]
    fn custom_processor() -> Result<()> {
        let el = EventLoop::with_processors(EventLoopConfig::default(), vec![Box::new(Shout)])?;
        let events = el.events_of::<String>(EventType::User)?;
        el.dispatch(Message::user("hi".to_string()))?;
        assert_eq!(events.recv_timeout(WAIT).as_deref().map(String::as_str), Some("HI"));
        Ok(())
    }
}
