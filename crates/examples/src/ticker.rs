use std::{io::Write, thread, time::Duration};

use terrace::{
    error::Result,
    eventloop::{EventLoop, Message, Task, TaskEvent, Tick, TickRequest},
};
use tracing::info;

/// How long to wait for any event before giving up.
const IDLE: Duration = Duration::from_secs(5);

/// Run a tick stream and a background task on an event loop, writing each
/// notification to `out` until both have finished.
pub fn run(ticks: u64, interval: Duration, out: &mut dyn Write) -> Result<()> {
    let el = EventLoop::new()?;
    let events = el.events()?;
    el.dispatch(Message::tick(
        TickRequest::new("clock", interval).with_count(ticks),
    ))?;
    let step = interval / 2;
    el.dispatch(Message::task(Task::new("count", move |ctx| {
        for p in (0..=100).step_by(25) {
            if !ctx.progress(p) {
                return;
            }
            thread::sleep(step);
        }
    })))?;

    let mut seen = 0;
    let mut task_done = false;
    while seen < ticks || !task_done {
        let Some(m) = events.recv_timeout(IDLE) else {
            writeln!(out, "timed out")?;
            break;
        };
        if let Some(t) = m.payload::<Tick>() {
            seen += 1;
            writeln!(out, "tick {} {}", t.id, t.sequence)?;
        } else if let Some(e) = m.payload::<TaskEvent>() {
            match e {
                TaskEvent::Started { name } => writeln!(out, "task {name} started")?,
                TaskEvent::Progress { name, percent } => writeln!(out, "task {name} {percent}%")?,
                TaskEvent::Completed { name } => {
                    task_done = true;
                    writeln!(out, "task {name} completed")?;
                }
                TaskEvent::Failed { name, reason } => {
                    task_done = true;
                    writeln!(out, "task {name} failed: {reason}")?;
                }
            }
        }
    }
    info!(ticks = seen, "ticker finished");
    el.destroy();
    Ok(())
}
