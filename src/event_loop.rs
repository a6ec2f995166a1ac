//! The single consumer of the event queue.
//!
//! Every event is processed to completion before the next is taken.  Deferred
//! actions produced while handling it are posted to the back of the same
//! queue; when the batch does not fit it runs inline instead, in order, so an
//! action is never lost.  The service re-checks each action against the
//! device record when it finally runs.

use embassy_sync::blocking_mutex::raw::RawMutex;
use log::warn;

use crate::app::ports::{EventSink, NodePorts};
use crate::app::service::NodeService;
use crate::error::Result;
use crate::events::{Event, EventQueue, QueueFull};

/// Result of a bounded drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drain {
    /// The queue is empty.
    Idle,
    /// The budget ran out with events still queued.
    MorePending,
}

pub struct EventLoop<'q, M: RawMutex, const N: usize, H, S> {
    queue: &'q EventQueue<M, N>,
    service: NodeService,
    hw: H,
    sink: S,
}

impl<'q, M, const N: usize, H, S> EventLoop<'q, M, N, H, S>
where
    M: RawMutex,
    H: NodePorts,
    S: EventSink,
{
    pub fn new(queue: &'q EventQueue<M, N>, service: NodeService, hw: H, sink: S) -> Self {
        Self {
            queue,
            service,
            hw,
            sink,
        }
    }

    /// Start the service (endpoint registration, initial rendering).
    pub fn start(&mut self) -> Result<()> {
        self.service.start(&mut self.hw, &mut self.sink)
    }

    /// Handle one event and queue what it deferred.  A batch that does not
    /// fit runs inline, in order.
    pub fn dispatch(&mut self, event: Event) {
        let deferred = self.service.handle(event, &mut self.hw, &mut self.sink);
        if deferred.is_empty() {
            return;
        }

        let free = self.queue.capacity().saturating_sub(self.queue.len());
        if free < deferred.len() {
            warn!("event queue full, running {} actions inline", deferred.len());
            for action in deferred {
                self.run_inline(Event::Action(action));
            }
            return;
        }

        let mut pending = deferred.into_iter();
        while let Some(action) = pending.next() {
            if let Err(QueueFull(event)) = self.queue.try_post(Event::Action(action)) {
                // Another producer took the space.
                warn!("event queue full, running {:?} inline", action);
                self.run_inline(event);
                for rest in pending.by_ref() {
                    self.run_inline(Event::Action(rest));
                }
            }
        }
    }

    fn run_inline(&mut self, event: Event) {
        // Actions defer nothing further.
        let _ = self.service.handle(event, &mut self.hw, &mut self.sink);
    }

    /// Process at most `budget` queued events.
    pub fn drain(&mut self, budget: usize) -> Drain {
        for _ in 0..budget {
            match self.queue.try_next() {
                Some(event) => self.dispatch(event),
                None => return Drain::Idle,
            }
        }
        if self.queue.is_empty() {
            Drain::Idle
        } else {
            Drain::MorePending
        }
    }

    /// Process events forever.
    pub async fn run(&mut self) {
        loop {
            let event = self.queue.next().await;
            self.dispatch(event);
        }
    }

    pub fn queue(&self) -> &'q EventQueue<M, N> {
        self.queue
    }

    pub fn service(&self) -> &NodeService {
        &self.service
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
