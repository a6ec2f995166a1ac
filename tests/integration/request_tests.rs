//! Inbound requests from peers.

use meshnode::app::events::AppEvent;
use meshnode::coap::{Endpoint, MessageType, Method, SessionStatus};
use meshnode::config::NodeConfig;
use meshnode::destination::DEFAULT_DESTINATION;
use meshnode::device::render::LedCommand;
use meshnode::device::{DeviceMode, DeviceState};

use crate::mock_hw::{Call, PEER};
use crate::support::{Queue, boot, connected, feed, post, request};

#[test]
fn led_toggle_duplicate_is_acked_but_not_reapplied() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());

    feed(&mut node, post(Endpoint::Led, "toggle"));
    feed(
        &mut node,
        request(
            Endpoint::Led,
            Method::Post,
            MessageType::Confirmable,
            SessionStatus::Duplicate,
            "toggle",
        ),
    );

    assert_eq!(node.hw().led_commands(), vec![LedCommand::Toggle]);
    assert_eq!(node.hw().acks(), vec![(Endpoint::Led, 0x1234, ""), (Endpoint::Led, 0x1234, "")]);
    assert_eq!(node.service().state(), DeviceState::LedToggle);
}

#[test]
fn led_command_switches_configuration_node_to_application() {
    let queue = Queue::new();
    let mut node = boot(&queue, NodeConfig::default());
    feed(&mut node, post(Endpoint::Led, "rgb r10 g20 b30"));

    assert_eq!(node.service().mode(), DeviceMode::Application);
    assert_eq!(node.service().state(), DeviceState::LedRgb);
    assert!(node.hw().calls.contains(&Call::SetRgb(10, 20, 30)));
    assert_eq!(node.hw().led_commands().last(), Some(&LedCommand::Rgb));
}

#[test]
fn bare_rgb_command_still_enters_rgb_state() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, post(Endpoint::Led, "rgb"));

    assert_eq!(node.service().state(), DeviceState::LedRgb);
    assert!(node.hw().calls.contains(&Call::SetRgb(0, 0, 0)));
    assert_eq!(node.hw().led_commands(), vec![LedCommand::Rgb]);
}

#[test]
fn oversized_rgb_fields_wrap_to_a_byte() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, post(Endpoint::Led, "rgb r300 g1000 b255"));

    assert!(node.hw().calls.contains(&Call::SetRgb(44, 232, 255)));
}

#[test]
fn led_without_rgb_degrades_to_on() {
    let config = NodeConfig {
        rgb_led: false,
        ..NodeConfig::default()
    };
    let queue = Queue::new();
    let mut node = connected(&queue, config);
    feed(&mut node, post(Endpoint::Led, "rgb r1 g0 b0"));

    assert_eq!(node.service().state(), DeviceState::LedOn);
    assert_eq!(node.hw().count(|c| matches!(c, Call::SetRgb(..))), 0);
}

#[test]
fn unrecognised_led_command_changes_nothing() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, post(Endpoint::Led, "sparkle"));

    assert!(node.hw().led_commands().is_empty());
    assert_eq!(node.service().state(), DeviceState::NwkConnected);
    assert_eq!(node.hw().acks().len(), 1);
}

#[test]
fn sink_create_and_release_from_peer() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());

    feed(&mut node, post(Endpoint::Sink, "create"));
    assert_eq!(node.service().destination(), PEER);
    feed(&mut node, post(Endpoint::Sink, "create"));
    assert_eq!(node.service().destination(), PEER);

    feed(&mut node, post(Endpoint::Sink, "release"));
    assert_eq!(node.service().destination(), DEFAULT_DESTINATION);
    feed(&mut node, post(Endpoint::Sink, "release"));
    assert_eq!(node.service().destination(), DEFAULT_DESTINATION);

    let changes: Vec<_> = node
        .sink()
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::DestinationChanged(_)))
        .collect();
    assert_eq!(
        changes,
        vec![
            &AppEvent::DestinationChanged(PEER),
            &AppEvent::DestinationChanged(DEFAULT_DESTINATION),
        ]
    );
}

#[test]
fn sink_with_unknown_token_keeps_destination() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, post(Endpoint::Sink, "bogus"));
    assert_eq!(node.service().destination(), DEFAULT_DESTINATION);
    assert_eq!(node.hw().acks().len(), 1);
}

#[test]
fn get_sensor_values_are_acked_with_readings() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());

    let get = |endpoint, payload| {
        request(
            endpoint,
            Method::Get,
            MessageType::Confirmable,
            SessionStatus::Success,
            payload,
        )
    };
    feed(&mut node, get(Endpoint::SensorTemp, ""));
    feed(&mut node, get(Endpoint::Accel, "x"));
    feed(&mut node, get(Endpoint::Accel, "all"));

    assert_eq!(
        node.hw().acks(),
        vec![
            (Endpoint::SensorTemp, 0x1234, "21.50"),
            (Endpoint::Accel, 0x1234, "X:0.10"),
            (Endpoint::Accel, 0x1234, "X:0.10 Y:0.20 Z:0.98"),
        ]
    );
}

#[test]
fn failed_or_non_confirmable_requests_are_not_acked() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());

    feed(
        &mut node,
        request(
            Endpoint::Led,
            Method::Post,
            MessageType::Confirmable,
            SessionStatus::Failure,
            "on",
        ),
    );
    assert!(node.hw().acks().is_empty());
    assert!(node.hw().led_commands().is_empty());

    feed(
        &mut node,
        request(
            Endpoint::Led,
            Method::Post,
            MessageType::NonConfirmable,
            SessionStatus::Success,
            "on",
        ),
    );
    assert!(node.hw().acks().is_empty());
    assert_eq!(node.hw().led_commands(), vec![LedCommand::On]);
}

#[test]
fn counter_post_is_logged_with_sender() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, post(Endpoint::Counter, "17"));
    assert_eq!(node.hw().console(), vec!["Counter 17 From address: fd00::2"]);
    // The counter endpoint never replies.
    assert!(node.hw().acks().is_empty());
}

#[test]
fn remote_temperature_echo_is_truncated() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(&mut node, post(Endpoint::SensorTemp, "23.456789012"));
    feed(&mut node, post(Endpoint::Accel, "Y:0.55"));

    assert_eq!(
        node.hw().console(),
        vec!["23.456789\tFrom address: fd00::2", "Y:0.55\tFrom address: fd00::2"]
    );
}

#[test]
fn duplicate_sensor_post_is_not_echoed_again() {
    let queue = Queue::new();
    let mut node = connected(&queue, NodeConfig::default());
    feed(
        &mut node,
        request(
            Endpoint::SensorTemp,
            Method::Post,
            MessageType::Confirmable,
            SessionStatus::Duplicate,
            "20.0",
        ),
    );
    assert!(node.hw().console().is_empty());
    assert_eq!(node.hw().acks().len(), 1);
}
