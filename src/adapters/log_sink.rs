//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade, one line per event.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { mode, state } => {
                info!("START | mode={:?} state={:?}", mode, state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            AppEvent::DestinationChanged(addr) => {
                info!("DEST  | {}", addr);
            }
            AppEvent::JoinRequested { app_initiated } => {
                info!("JOIN  | requested (app_initiated={})", app_initiated);
            }
            AppEvent::ReportSent { endpoint, msg_type } => {
                info!("TX    | {} {:?}", endpoint.path(), msg_type);
            }
            AppEvent::ReportRetried(endpoint) => {
                info!("RETRY | {}", endpoint.path());
            }
        }
    }
}
