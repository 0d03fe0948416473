//! Level 3: Connection Tests
//!
//! Tests the click-click connection gesture: starting, completing,
//! cancelling, refusals, and the path model that follows the graph.

mod common;

use chatflow_editor::{
    Connection, ConnectionError, EditorConfig, Effect, InteractionState, NodeKind,
};
use common::harness::{FlowTestHarness, START};
use slint::Model;

#[test]
fn test_first_handle_click_starts_connecting() {
    let harness = FlowTestHarness::new();
    assert_eq!(harness.click_handle(START), Effect::ConnectionStarted(START.into()));
    assert_eq!(
        harness.state(),
        InteractionState::Connecting {
            source: START.to_string()
        }
    );
    assert_eq!(harness.connection_count(), 0);
}

#[test]
fn test_second_handle_click_connects() {
    let harness = FlowTestHarness::new();
    let effect = harness.connect(START, &harness.message);

    assert_eq!(effect, Effect::Connected(Connection::new(START, harness.message.clone())));
    assert_eq!(harness.state(), InteractionState::Idle);
    assert_eq!(
        *harness.tracker.handle_clicked.borrow(),
        vec![START.to_string(), harness.message.clone()]
    );
    assert_eq!(harness.outgoing(START), vec![harness.message.clone()]);

    let graph = harness.editor.graph();
    let graph = graph.borrow();
    let connection = &graph.connections()[0];
    assert_eq!(connection.id, format!("{START}-{}", harness.message));
}

#[test]
fn test_clicking_own_handle_keeps_connecting() {
    let harness = FlowTestHarness::new();
    harness.click_handle(&harness.message);
    assert_eq!(harness.click_handle(&harness.message), Effect::Nothing);
    assert_eq!(
        harness.state(),
        InteractionState::Connecting {
            source: harness.message.clone()
        }
    );
    assert_eq!(harness.connection_count(), 0);
}

#[test]
fn test_background_click_cancels() {
    let harness = FlowTestHarness::new();
    harness.click_handle(START);
    assert_eq!(harness.click_background(), Effect::ConnectionCancelled(START.into()));
    assert_eq!(harness.state(), InteractionState::Idle);
    assert_eq!(harness.connection_count(), 0);
}

#[test]
fn test_duplicate_connection_refused() {
    let harness = FlowTestHarness::new();
    harness.connect(START, &harness.message);
    let effect = harness.connect(START, &harness.message);

    assert_eq!(
        effect,
        Effect::ConnectionRefused {
            source: START.into(),
            target: harness.message.clone()
        }
    );
    assert_eq!(harness.connection_count(), 1);
    assert_eq!(harness.outgoing(START).len(), 1);
    assert_eq!(harness.state(), InteractionState::Idle);
}

#[test]
fn test_reverse_direction_is_a_different_connection() {
    let harness = FlowTestHarness::new();
    harness.connect(&harness.message, &harness.end);
    harness.connect(&harness.end, &harness.message);
    assert_eq!(harness.connection_count(), 2);
}

#[test]
fn test_direct_connect_reports_reason() {
    let harness = FlowTestHarness::new();
    assert_eq!(
        harness.editor.connect(START, START),
        Err(ConnectionError::SelfConnection(START.into()))
    );
    assert_eq!(
        harness.editor.connect(START, "ghost"),
        Err(ConnectionError::UnknownNode("ghost".into()))
    );
    harness.editor.connect(START, &harness.end).unwrap();
    assert_eq!(
        harness.editor.connect(START, &harness.end),
        Err(ConnectionError::Duplicate {
            from: START.into(),
            to: harness.end.clone()
        })
    );
}

#[test]
fn test_handle_direction_off_by_default() {
    let harness = FlowTestHarness::new();
    assert!(matches!(
        harness.connect(&harness.end, START),
        Effect::Connected(_)
    ));
}

#[test]
fn test_handle_direction_rule_when_enabled() {
    let mut config = EditorConfig::default();
    config.enforce_handle_direction = true;
    let harness = FlowTestHarness::with_config(config);

    assert!(matches!(
        harness.connect(&harness.end, &harness.message),
        Effect::ConnectionRefused { .. }
    ));
    assert!(matches!(
        harness.connect(&harness.message, START),
        Effect::ConnectionRefused { .. }
    ));
    assert!(matches!(
        harness.connect(START, &harness.message),
        Effect::Connected(_)
    ));
}

#[test]
fn test_path_model_tracks_connections() {
    let harness = FlowTestHarness::new();
    let input = harness.add(NodeKind::Input, 475.0, 340.0);
    harness.connect(START, &harness.message);
    harness.connect(&harness.message, &input);
    assert_eq!(harness.paths.row_count(), 2);

    let path = harness
        .path_in_model(&format!("{}-{input}", harness.message))
        .unwrap();
    assert_eq!(path, "M 550 140 C 475 140, 475 340, 400 340");

    harness.delete(&input);
    assert_eq!(harness.paths.row_count(), 1);
}

#[test]
fn test_deleting_connection_root_cancels() {
    let harness = FlowTestHarness::new();
    harness.click_handle(&harness.message);
    harness.delete(&harness.message);

    assert_eq!(harness.state(), InteractionState::Idle);
    // The next handle click starts afresh.
    assert_eq!(harness.click_handle(START), Effect::ConnectionStarted(START.into()));
}

#[test]
fn test_connection_hover_lookup() {
    let harness = FlowTestHarness::new();
    harness.connect(START, &harness.message);
    let id = format!("{START}-{}", harness.message);

    assert_eq!(harness.editor.connection_at(325.0, 141.0), Some(id));
    assert_eq!(harness.editor.connection_at(325.0, 400.0), None);
}
