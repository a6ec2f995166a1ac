//! Current outbound report target.

use core::net::Ipv6Addr;

/// Realm-local "all mesh nodes" multicast group.
pub const DEFAULT_DESTINATION: Ipv6Addr = Ipv6Addr::new(0xff03, 0, 0, 0, 0, 0, 0, 0xfc);

/// Holds the address reports are sent to.  Starts at, and resets to,
/// [`DEFAULT_DESTINATION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationRegistry {
    current: Ipv6Addr,
}

impl Default for DestinationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DestinationRegistry {
    pub const fn new() -> Self {
        Self {
            current: DEFAULT_DESTINATION,
        }
    }

    pub fn current(&self) -> Ipv6Addr {
        self.current
    }

    pub fn set(&mut self, addr: Ipv6Addr) {
        self.current = addr;
    }

    pub fn reset(&mut self) {
        self.current = DEFAULT_DESTINATION;
    }

    pub fn is_default(&self) -> bool {
        self.current == DEFAULT_DESTINATION
    }
}
