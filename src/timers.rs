//! Timer slots and the self-re-arming probe task.
//!
//! The node owns a small fixed set of single-shot timers.  Each slot keeps
//! the action to run on expiry and a generation counter.  The
//! generation is handed to the timer driver inside a [`TimerToken`] and
//! echoed back on expiry, so an expiry that raced with a `stop` or a
//! re-`arm` is recognised as stale and ignored.
//!
//! ```text
//!   arm(slot) ──▶ TimerPort::start(token) ··· Event::TimerExpired(token)
//!                                                   │
//!                                  expire(token) ◀──┘
//!                                   │ live? → Some(action), slot disarmed
//!                                   │ stale → None
//! ```

use log::{debug, warn};

use crate::app::ports::TimerPort;
use crate::error::TimerError;

// ═══════════════════════════════════════════════════════════════
//  Slot types
// ═══════════════════════════════════════════════════════════════

/// The node's timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// Periodic counter probe while connected.
    Probe,
    /// Ends an LED indicator pulse.
    IndicatorOff,
    /// Low-power stay-awake window after user input.
    Wake,
}

impl TimerSlot {
    pub const COUNT: usize = 3;
    pub const ALL: [Self; Self::COUNT] = [Self::Probe, Self::IndicatorOff, Self::Wake];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// What to do when a slot expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    ProbeTick,
    IndicatorOff,
    WakeExpired,
}

/// Identifies one arming of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    pub slot: TimerSlot,
    pub generation: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct SlotEntry {
    armed: bool,
    action: Option<TimerAction>,
    generation: u32,
}

// ═══════════════════════════════════════════════════════════════
//  Orchestrator
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct TimerOrchestrator {
    slots: [SlotEntry; TimerSlot::COUNT],
}

impl TimerOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `slot` as a single-shot timer.  An already armed slot is
    /// restarted and its pending expiry becomes stale.
    pub fn arm(
        &mut self,
        slot: TimerSlot,
        interval_ms: u32,
        action: TimerAction,
        timers: &mut impl TimerPort,
    ) -> Result<TimerToken, TimerError> {
        let entry = &mut self.slots[slot.index()];
        entry.generation = entry.generation.wrapping_add(1);
        entry.action = Some(action);

        let token = TimerToken {
            slot,
            generation: entry.generation,
        };
        match timers.start(token, interval_ms) {
            Ok(()) => {
                entry.armed = true;
                debug!("timer {:?} armed for {} ms (gen {})", slot, interval_ms, token.generation);
                Ok(token)
            }
            Err(e) => {
                entry.armed = false;
                warn!("timer {:?} not armed: {}", slot, e);
                Err(e)
            }
        }
    }

    /// Disarm `slot`.  Any expiry already in flight is ignored.
    pub fn stop(&mut self, slot: TimerSlot, timers: &mut impl TimerPort) {
        let entry = &mut self.slots[slot.index()];
        if entry.armed {
            debug!("timer {:?} stopped", slot);
        }
        entry.armed = false;
        entry.generation = entry.generation.wrapping_add(1);
        timers.stop(slot);
    }

    /// Resolve an expiry.  Returns the slot's action if `token` is the live
    /// arming, and disarms the slot.
    pub fn expire(&mut self, token: TimerToken) -> Option<TimerAction> {
        let entry = &mut self.slots[token.slot.index()];
        if !entry.armed || entry.generation != token.generation {
            debug!("timer {:?}: stale expiry (gen {}) ignored", token.slot, token.generation);
            return None;
        }
        entry.armed = false;
        entry.action
    }

    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.slots[slot.index()].armed
    }
}

// ═══════════════════════════════════════════════════════════════
//  Polling task
// ═══════════════════════════════════════════════════════════════

/// Periodic counter probe.  Owns [`TimerSlot::Probe`] and re-arms it after
/// every tick while running.
#[derive(Debug)]
pub struct PollingTask {
    interval_ms: u32,
    running: bool,
    count: u32,
}

impl PollingTask {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            running: false,
            count: 0,
        }
    }

    /// Start (or restart) the probe cycle.
    pub fn start(&mut self, orchestrator: &mut TimerOrchestrator, timers: &mut impl TimerPort) {
        self.running = orchestrator
            .arm(TimerSlot::Probe, self.interval_ms, TimerAction::ProbeTick, timers)
            .is_ok();
    }

    pub fn stop(&mut self, orchestrator: &mut TimerOrchestrator, timers: &mut impl TimerPort) {
        self.running = false;
        orchestrator.stop(TimerSlot::Probe, timers);
    }

    /// Handle a probe expiry.  Returns the counter value to report, or
    /// `None` when the task was stopped in the meantime.
    pub fn on_tick(
        &mut self,
        orchestrator: &mut TimerOrchestrator,
        timers: &mut impl TimerPort,
    ) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.count = self.count.wrapping_add(1);
        self.start(orchestrator, timers);
        Some(self.count)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
