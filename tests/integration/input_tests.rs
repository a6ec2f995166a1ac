//! Button gestures, motion interrupts and outbound reporting.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;

use meshnode::app::actions::AppAction;
use meshnode::app::events::AppEvent;
use meshnode::app::service::NodeService;
use meshnode::coap::{AxisSelect, Completion, Endpoint, MessageType, SessionStatus};
use meshnode::config::NodeConfig;
use meshnode::destination::DEFAULT_DESTINATION;
use meshnode::device::{DeviceMode, DeviceState};
use meshnode::device::render::LedCommand;
use meshnode::error::TransportError;
use meshnode::event_loop::{Drain, EventLoop};
use meshnode::events::{Event, EventQueue};
use meshnode::input::InputEvent;
use meshnode::network::NetworkEvent;
use meshnode::reporter::SinkRequest;
use meshnode::timers::TimerSlot;

use crate::mock_hw::{Call, MockBoard, OWN_ADDRESS, PEER, RecordingSink};
use crate::support::{Queue, boot, connected, feed, post};

#[test]
fn primary_press_reports_pulses_and_clears() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());

    feed(&mut node, Event::Input(InputEvent::press(0)));

    let sent = node.hw().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].endpoint, Endpoint::Accel);
    assert_eq!(sent[0].remote, DEFAULT_DESTINATION);
    assert_eq!(sent[0].msg_type, MessageType::NonConfirmable);
    assert_eq!(&sent[0].payload[..], b"X:0.10 Y:0.20 Z:0.98");
    assert_eq!(
        node.hw().console(),
        vec!["/accel X:0.10 Y:0.20 Z:0.98\tTo address: ff03::fc"]
    );

    assert!(node.hw().calls.contains(&Call::SetRgb(255, 0, 255)));
    assert_eq!(node.service().state(), DeviceState::LedRgb);
    assert_eq!(node.hw().led_commands(), vec![LedCommand::Rgb]);
    assert!(node.service().is_timer_armed(TimerSlot::IndicatorOff));
    assert!(node.hw().last_timer(TimerSlot::Probe).is_some());

    let off = node.hw().last_timer(TimerSlot::IndicatorOff).unwrap();
    assert!(node.hw().calls.contains(&Call::TimerStart(off, 70)));
    feed(&mut node, Event::TimerExpired(off));
    assert_eq!(node.hw().calls.last(), Some(&Call::AllOff));
    assert!(!node.service().is_timer_armed(TimerSlot::IndicatorOff));
}

#[test]
fn second_pulse_supersedes_first_indicator_timer() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());

    feed(&mut node, Event::Input(InputEvent::press(0)));
    let first = node.hw().last_timer(TimerSlot::IndicatorOff).unwrap();
    feed(&mut node, Event::Motion(AxisSelect::Y));
    let second = node.hw().last_timer(TimerSlot::IndicatorOff).unwrap();
    assert_ne!(first, second);

    node.hw_mut().clear();
    feed(&mut node, Event::TimerExpired(first));
    assert_eq!(node.hw().count(|c| *c == Call::AllOff), 0);
    feed(&mut node, Event::TimerExpired(second));
    assert_eq!(node.hw().count(|c| *c == Call::AllOff), 1);
}

#[test]
fn temperature_to_unicast_sink_retries_once() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, post(Endpoint::Sink, "create"));
    node.hw_mut().clear();

    feed(&mut node, Event::Input(InputEvent::press(1)));
    let sent = node.hw().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].remote, PEER);
    assert_eq!(sent[0].msg_type, MessageType::Confirmable);
    assert_eq!(sent[0].attempt, 0);
    assert!(sent[0].notify_completion);
    assert_eq!(&sent[0].payload[..], b"21.50");

    let failed = |attempt| {
        Event::Completion(Completion {
            endpoint: Endpoint::SensorTemp,
            status: SessionStatus::Failure,
            attempt,
        })
    };

    feed(&mut node, failed(0));
    let sent = node.hw().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].attempt, 1);
    assert!(node.sink().events.contains(&AppEvent::ReportRetried(Endpoint::SensorTemp)));

    feed(&mut node, failed(1));
    assert_eq!(node.hw().sent().len(), 2);
}

#[test]
fn successful_completion_is_not_retried() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(
        &mut node,
        Event::Completion(Completion {
            endpoint: Endpoint::SensorTemp,
            status: SessionStatus::Success,
            attempt: 0,
        }),
    );
    assert!(node.hw().sent().is_empty());
}

#[test]
fn own_sink_renders_reports_locally() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());

    feed(&mut node, Event::Action(AppAction::SendSink(SinkRequest::Create)));
    let sent = node.hw().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].endpoint, Endpoint::Sink);
    assert_eq!(sent[0].remote, DEFAULT_DESTINATION);
    assert_eq!(&sent[0].payload[..], b"create");
    assert_eq!(node.service().destination(), OWN_ADDRESS);
    node.hw_mut().clear();

    feed(&mut node, Event::Input(InputEvent::long_press(2)));
    assert!(node.hw().sent().is_empty());
    assert_eq!(node.service().state(), DeviceState::LedFlash);
    assert_eq!(node.hw().led_commands(), vec![LedCommand::Flash]);

    // Text reports are still echoed before the local short-circuit.
    feed(&mut node, Event::Input(InputEvent::press(1)));
    assert!(node.hw().sent().is_empty());
    assert_eq!(node.hw().console(), vec!["/sensor-temp 21.50\tTo address: fd00::1"]);
}

#[test]
fn long_press_primary_releases_sink_remotely() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, post(Endpoint::Sink, "create"));
    node.hw_mut().clear();

    feed(&mut node, Event::Input(InputEvent::long_press(0)));
    let sent = node.hw().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(&sent[0].payload[..], b"release");
    assert_eq!(sent[0].remote, DEFAULT_DESTINATION);
    assert_eq!(node.service().destination(), DEFAULT_DESTINATION);
}

#[test]
fn sink_command_not_sent_keeps_destination() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    node.hw_mut().send_error = Some(TransportError::NoSession);

    feed(&mut node, Event::Action(AppAction::SendSink(SinkRequest::Create)));
    assert_eq!(node.service().destination(), DEFAULT_DESTINATION);

    feed(&mut node, Event::Input(InputEvent::press(1)));
    assert!(
        !node
            .sink()
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::ReportSent { .. }))
    );
}

#[test]
fn long_press_secondary_releases_locally() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, post(Endpoint::Sink, "create"));
    node.hw_mut().clear();

    feed(&mut node, Event::Input(InputEvent::long_press(1)));
    assert!(node.hw().sent().is_empty());
    assert_eq!(node.service().destination(), DEFAULT_DESTINATION);
}

#[test]
fn random_rgb_goes_to_group_and_runs_here() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, Event::Input(InputEvent::press(2)));

    let sent = node.hw().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].endpoint, Endpoint::Led);
    assert_eq!(&sent[0].payload[..], b"rgb r042 g042 b042");
    assert!(node.hw().calls.contains(&Call::SetRgb(42, 42, 42)));
    assert_eq!(node.service().state(), DeviceState::LedRgb);
    // LED commands are not echoed.
    assert!(node.hw().console().is_empty());
}

#[test]
fn very_long_press_resets() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, Event::Input(InputEvent::very_long_press(3)));
    assert_eq!(node.hw().calls, vec![Call::AllOff, Call::FactoryReset]);
}

#[test]
fn motion_reports_axis_and_pulses_colour() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, Event::Motion(AxisSelect::X));

    let sent = node.hw().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(&sent[0].payload[..], b"X:0.10");
    assert!(node.hw().calls.contains(&Call::SetRgb(255, 0, 0)));
    let off = node.hw().last_timer(TimerSlot::IndicatorOff).unwrap();
    assert!(node.hw().calls.contains(&Call::TimerStart(off, 100)));

    node.hw_mut().clear();
    feed(&mut node, Event::Motion(AxisSelect::None));
    assert!(node.hw().sent().is_empty());
    assert!(node.hw().calls.contains(&Call::SetRgb(0, 0, 0)));
}

#[test]
fn low_power_input_keeps_node_awake() {
    let config = NodeConfig {
        low_power: true,
        ..NodeConfig::default()
    };
    let queue = Queue::new();
    let mut node = connected(&queue, config);

    feed(&mut node, Event::Input(InputEvent::press(1)));
    assert_eq!(node.hw().calls[0], Call::DisallowSleep);
    let wake = node.hw().last_timer(TimerSlot::Wake).unwrap();
    assert!(node.hw().calls.contains(&Call::TimerStart(wake, 5000)));
    assert_eq!(node.hw().sent().len(), 1);

    feed(&mut node, Event::TimerExpired(wake));
    assert_eq!(node.hw().calls.last(), Some(&Call::AllowSleep));
}

#[test]
fn join_retry_can_be_disabled_at_runtime() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, Event::Action(AppAction::SetJoinRetry(false)));
    assert!(!node.service().join_context().retry_allowed);
}

#[test]
fn full_queue_runs_deferred_actions_inline_in_order() {
    let queue: EventQueue<NoopRawMutex, 1> = EventQueue::new();
    let mut node = EventLoop::new(
        &queue,
        NodeService::new(NodeConfig::default()),
        MockBoard::new(),
        RecordingSink::default(),
    );
    node.start().unwrap();
    node.dispatch(Event::Network(NetworkEvent::Connected));
    node.hw_mut().clear();

    // Three deferred actions, one queue slot.
    node.dispatch(Event::Input(InputEvent::press(0)));
    assert!(queue.is_empty());

    let calls = &node.hw().calls;
    let sent = calls.iter().position(|c| matches!(c, Call::Send(_))).unwrap();
    let pulse = calls.iter().position(|c| *c == Call::SetRgb(255, 0, 255)).unwrap();
    assert!(sent < pulse, "report must run before the indicator pulse");
    assert!(node.service().is_timer_armed(TimerSlot::IndicatorOff));
    assert!(node.service().is_timer_armed(TimerSlot::Probe));
    assert_eq!(node.drain(8), Drain::Idle);
}

#[test]
fn queued_presses_join_once() {
    let queue = Queue::new();
    let mut node = boot(&queue, NodeConfig::default());

    queue.try_post(Event::Input(InputEvent::press(0))).unwrap();
    queue.try_post(Event::Input(InputEvent::press(0))).unwrap();
    assert_eq!(node.drain(16), Drain::Idle);

    assert_eq!(node.hw().joins(), 1);
    assert_eq!(node.service().state(), DeviceState::JoiningOrAttaching);
}

#[test]
fn disconnect_queued_behind_press_stops_polling() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());

    queue.try_post(Event::Input(InputEvent::press(0))).unwrap();
    queue.try_post(Event::Network(NetworkEvent::Disconnected)).unwrap();
    assert_eq!(node.drain(16), Drain::Idle);

    assert_eq!(node.service().mode(), DeviceMode::Configuration);
    assert_eq!(node.service().state(), DeviceState::NwkFailure);
    assert!(!node.service().is_probe_running());
    assert!(!node.service().is_timer_armed(TimerSlot::Probe));
    assert!(!node.service().is_timer_armed(TimerSlot::IndicatorOff));
    assert!(node.hw().sent().is_empty());

    // The failure state still accepts a re-join.
    feed(&mut node, Event::Input(InputEvent::press(0)));
    assert_eq!(node.hw().joins(), 1);
}

#[test]
fn motion_while_disconnected_changes_nothing() {
    let queue = Queue::new();
    let mut node = boot(&queue, NodeConfig::default());
    node.hw_mut().clear();

    feed(&mut node, Event::Motion(AxisSelect::Z));
    assert!(node.hw().calls.is_empty());
    assert_eq!(node.service().state(), DeviceState::FactoryDefault);
}
