//! Background execution
//!
//! Runs the engine on its own thread and streams events over a channel, so a
//! caller can render progress while the run is still in flight.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::engine::run;
use super::events::{ProgressSink, RunEvent, RunReport};
use crate::domain::{RunParameters, Task};
use crate::tracker::IssueTracker;

/// Forwards events into a channel
pub struct ChannelSink {
    tx: Sender<RunEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<RunEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&mut self, event: RunEvent) {
        // A dropped receiver only means nobody is watching; the run goes on
        let _ = self.tx.send(event);
    }
}

/// A run executing on a worker thread
pub struct RunHandle {
    events: Receiver<RunEvent>,
    handle: JoinHandle<RunReport>,
}

impl RunHandle {
    /// Events in emission order; the iterator ends when the run does
    pub fn events(&self) -> mpsc::Iter<'_, RunEvent> {
        self.events.iter()
    }

    /// Waits for the run to finish
    pub fn join(self) -> thread::Result<RunReport> {
        self.handle.join()
    }
}

/// Starts a run on a new thread
pub fn spawn_run(
    tasks: Vec<Task>,
    params: RunParameters,
    tracker: Arc<dyn IssueTracker>,
) -> io::Result<RunHandle> {
    let (tx, rx) = mpsc::channel();

    let handle = thread::Builder::new()
        .name("jitzu-run".to_string())
        .spawn(move || {
            let mut sink = ChannelSink::new(tx);
            run(&tasks, &params, tracker.as_ref(), &mut sink)
        })?;

    Ok(RunHandle { events: rx, handle })
}
