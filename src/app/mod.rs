//! Application core: domain logic, zero I/O.
//!
//! [`service::NodeService`] owns all mutable node state.  Interaction with
//! the mesh stack, the transport and the board happens through the **port
//! traits** in [`ports`], keeping this layer testable without hardware.

pub mod actions;
pub mod events;
pub mod ports;
pub mod service;
