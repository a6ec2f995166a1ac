//! Mesh end-device application core.
//!
//! Reacts to mesh-stack lifecycle events, inbound protocol requests, button
//! gestures, motion interrupts and timer expiries, all delivered through one
//! bounded [`events::EventQueue`] and handled one at a time by the
//! [`event_loop::EventLoop`].  Hardware and stack collaborators sit behind
//! the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod coap;
pub mod config;
pub mod destination;
pub mod device;
pub mod error;
pub mod event_loop;
pub mod events;
pub mod input;
pub mod network;
pub mod reporter;
pub mod timers;

pub use error::{Error, Result};

// Links the std critical-section implementation behind the simulator's
// static queues.
#[cfg(feature = "host-sim")]
use critical_section as _;
