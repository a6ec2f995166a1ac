//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                          | Connects to            |
//! |------------|-------------------------------------|------------------------|
//! | `log_sink` | EventSink                           | `log` facade           |
//! | `sim`      | LedPort, NetworkPort, CoapPort,     | stdout, in-process     |
//! |            | SensorPort, ConsolePort, PowerPort, | fakes and the async    |
//! |            | TimerPort                           | timer task (host only) |

pub mod log_sink;
#[cfg(feature = "host-sim")]
pub mod sim;
