//! Whole-flow validation.
//!
//! A failed validation is a normal result, not an error: [`validate`] always
//! returns a [`ValidationReport`].

use crate::graph::FlowGraph;
use crate::model::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// How strictly "connected to the flow" is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Every intermediate node touches at least one connection.
    #[default]
    Connectivity,
    /// Every node is reachable by a directed path from some start node.
    Reachability,
}

/// Verdict plus a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub message: String,
}

impl ValidationReport {
    fn pass() -> Self {
        Self {
            ok: true,
            message: "Flow is valid".to_string(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Validate with [`ValidationMode::Connectivity`].
pub fn validate(graph: &FlowGraph) -> ValidationReport {
    validate_with(graph, ValidationMode::Connectivity)
}

/// Rules run in order and the first failure wins:
///
/// 1. at least one `start` node,
/// 2. at least one `end` node,
/// 3. no node left out of the flow, as judged by `mode`.
pub fn validate_with(graph: &FlowGraph, mode: ValidationMode) -> ValidationReport {
    let nodes = graph.nodes();

    if !nodes.iter().any(|n| n.kind == NodeKind::Start) {
        return ValidationReport::fail("Flow must have at least one start node");
    }
    if !nodes.iter().any(|n| n.kind == NodeKind::End) {
        return ValidationReport::fail("Flow must have at least one end node");
    }

    match mode {
        ValidationMode::Connectivity => {
            let touched: HashSet<&str> = graph
                .connections()
                .iter()
                .flat_map(|c| [c.source.as_str(), c.target.as_str()])
                .collect();
            let disconnected = nodes
                .iter()
                .filter(|n| !matches!(n.kind, NodeKind::Start | NodeKind::End))
                .filter(|n| !touched.contains(n.id.as_str()))
                .count();
            if disconnected > 0 {
                return ValidationReport::fail(format!(
                    "{disconnected} node(s) are not connected to the flow"
                ));
            }
        }
        ValidationMode::Reachability => {
            let reached = reachable_from_starts(graph);
            let unreachable = nodes.iter().filter(|n| !reached.contains(n.id.as_str())).count();
            if unreachable > 0 {
                return ValidationReport::fail(format!(
                    "{unreachable} node(s) are not reachable from a start node"
                ));
            }
        }
    }

    ValidationReport::pass()
}

/// Breadth-first walk along `outgoing` from every start node.
fn reachable_from_starts(graph: &FlowGraph) -> HashSet<&str> {
    let mut reached: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = graph
        .nodes()
        .iter()
        .filter(|n| n.kind == NodeKind::Start)
        .map(|n| n.id.as_str())
        .collect();

    while let Some(id) = queue.pop_front() {
        if !reached.insert(id) {
            continue;
        }
        if let Some(targets) = graph.outgoing(id) {
            queue.extend(targets.iter().map(String::as_str));
        }
    }

    reached
}
