//! Bounded event queue.
//!
//! Events are produced by:
//! - the mesh stack (lifecycle events)
//! - the protocol transport (inbound requests, send completions)
//! - the button driver and motion-sensor interrupt
//! - the timer driver (expiries)
//! - the application itself (deferred actions)
//!
//! and consumed by exactly one [`EventLoop`](crate::event_loop::EventLoop),
//! in FIFO order, one at a time.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Mesh stack  │────▶│              │     │              │
//! │ Transport   │────▶│  EventQueue  │────▶│  EventLoop   │
//! │ Buttons/IRQ │────▶│  (bounded)   │     │  (consumer)  │
//! │ Timers      │────▶│              │     │              │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! A full queue hands the event back to the producer ([`QueueFull`]);
//! nothing is dropped silently.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use crate::app::actions::AppAction;
use crate::coap::{AxisSelect, Completion, InboundRequest};
use crate::input::InputEvent;
use crate::network::NetworkEvent;
use crate::timers::TimerToken;

/// Default number of pending events.
pub const QUEUE_CAPACITY: usize = 20;

/// Everything the node reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // ── Collaborators ─────────────────────────────────────
    Network(NetworkEvent),
    Request(InboundRequest),
    Completion(Completion),
    Input(InputEvent),
    /// Motion interrupt on the given axis.
    Motion(AxisSelect),
    TimerExpired(TimerToken),

    // ── Internal ──────────────────────────────────────────
    Action(AppAction),
}

/// The queue was full; the event is returned to the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueFull(pub Event);

/// Multi-producer, single-consumer FIFO of [`Event`]s.
///
/// `M` selects the mutex: `CriticalSectionRawMutex` when producers run in
/// interrupt context or other threads, `NoopRawMutex` for single-threaded
/// tests.
pub struct EventQueue<M: RawMutex, const N: usize = QUEUE_CAPACITY> {
    channel: Channel<M, Event, N>,
}

impl<M: RawMutex, const N: usize> Default for EventQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> EventQueue<M, N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue without waiting.
    pub fn try_post(&self, event: Event) -> Result<(), QueueFull> {
        self.channel
            .try_send(event)
            .map_err(|e| match e {
                TrySendError::Full(event) => QueueFull(event),
            })
    }

    /// Enqueue, waiting for space.
    pub async fn post(&self, event: Event) {
        self.channel.send(event).await;
    }

    pub fn try_next(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// Wait for the next event.
    pub async fn next(&self) -> Event {
        self.channel.receive().await
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
