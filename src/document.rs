//! The flow document: the JSON unit of export and import.
//!
//! ```json
//! {
//!   "nodes": [{ "id": "start-1", "type": "start", "position": { "x": 100, "y": 100 },
//!               "data": { "label": "Start" }, "connections": [] }],
//!   "connections": [{ "id": "start-1-end-2", "source": "start-1", "target": "end-2" }],
//!   "metadata": { "name": "Untitled Flow", "createdAt": "2024-05-01T12:00:00.000Z", "version": "1.0.0" }
//! }
//! ```

use crate::error::ParseError;
use crate::graph::FlowGraph;
use crate::model::{Connection, Node};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Name given to exported documents.
pub const DEFAULT_DOCUMENT_NAME: &str = "Untitled Flow";

/// Schema version written into exported documents.
pub const DOCUMENT_VERSION: &str = "1.0.0";

/// File name suggested to the download trigger.
pub const EXPORT_FILE_NAME: &str = "chatbot-flow.json";

/// Descriptive data stored alongside the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMetadata {
    pub name: String,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    pub version: String,
}

impl Default for FlowMetadata {
    fn default() -> Self {
        Self {
            name: DEFAULT_DOCUMENT_NAME.to_string(),
            created_at: Utc::now(),
            version: DOCUMENT_VERSION.to_string(),
        }
    }
}

/// A snapshot of a graph plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub metadata: FlowMetadata,
}

impl FlowDocument {
    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Snapshot `graph` with default metadata stamped with the current time.
pub fn export_document(graph: &FlowGraph) -> FlowDocument {
    export_document_with(graph, FlowMetadata::default())
}

/// Snapshot `graph` with caller-provided metadata.
pub fn export_document_with(graph: &FlowGraph, metadata: FlowMetadata) -> FlowDocument {
    FlowDocument {
        nodes: graph.nodes().to_vec(),
        connections: graph.connections().to_vec(),
        metadata,
    }
}

/// Parse and shape-check a flow document.
///
/// `nodes`, `connections` and `metadata` must be present and every node kind
/// must be one of the six known kinds. Node positions must be finite.
/// Referential consistency is not
/// checked here; [`FlowGraph::replace_with`] repairs it when the document is
/// applied.
pub fn parse_document(text: &str) -> Result<FlowDocument, ParseError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let object = value
        .as_object()
        .ok_or_else(|| ParseError::Structure("document must be a JSON object".to_string()))?;

    for key in ["nodes", "connections", "metadata"] {
        if !object.contains_key(key) {
            return Err(ParseError::Structure(format!("missing '{key}'")));
        }
    }

    let document: FlowDocument =
        serde_json::from_value(value).map_err(|err| ParseError::Structure(err.to_string()))?;

    // Out-of-range numbers deserialize to infinity and would export as null.
    if let Some(node) = document
        .nodes
        .iter()
        .find(|n| !n.position.x.is_finite() || !n.position.y.is_finite())
    {
        return Err(ParseError::Structure(format!(
            "node '{}' has a non-finite position",
            node.id
        )));
    }

    Ok(document)
}

/// `createdAt` is written the way browsers print dates: millisecond
/// precision with a `Z` suffix.
mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Formats a timestamp like `createdAt` in exported documents.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DEFAULT_START_ID;
    use crate::model::{ActionRecord, NodeDataPatch, NodeKind, NodeUpdate, Position};
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn sample_graph() -> FlowGraph {
        let mut graph = FlowGraph::new();
        let action = graph.add_node(NodeKind::Action, Position::new(300.0, 80.0)).id.clone();
        let end = graph.add_node(NodeKind::End, Position::new(500.0, 80.0)).id.clone();
        graph.update_node(
            &action,
            NodeUpdate::with_data(NodeDataPatch {
                actions: Some(vec![ActionRecord::new("variable", "name=bob")]),
                ..Default::default()
            }),
        );
        graph.add_connection(DEFAULT_START_ID, &action);
        graph.add_connection(&action, &end);
        graph
    }

    fn fixed_metadata() -> FlowMetadata {
        FlowMetadata {
            name: "Support bot".into(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            version: DOCUMENT_VERSION.into(),
        }
    }

    // ========================================================================
    // Export
    // ========================================================================

    #[test]
    fn test_export_uses_default_metadata() {
        let document = export_document(&FlowGraph::new());
        assert_eq!(document.metadata.name, "Untitled Flow");
        assert_eq!(document.metadata.version, "1.0.0");
        assert_eq!(document.nodes.len(), 1);
    }

    #[test]
    fn test_export_json_shape() {
        let graph = FlowGraph::new();
        let json = export_document_with(&graph, fixed_metadata()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "nodes": [{
                    "id": "start-1",
                    "type": "start",
                    "position": { "x": 100.0, "y": 100.0 },
                    "data": { "label": "Start" },
                    "connections": []
                }],
                "connections": [],
                "metadata": {
                    "name": "Support bot",
                    "createdAt": "2024-05-01T12:00:00.000Z",
                    "version": "1.0.0"
                }
            })
        );
        assert!(json.contains("\n  \"nodes\""), "two-space indentation expected");
    }

    #[test]
    fn test_export_then_parse_preserves_sets() {
        let graph = sample_graph();
        let exported = export_document(&graph);
        let parsed = parse_document(&exported.to_json().unwrap()).unwrap();

        let ids = |doc: &FlowDocument| doc.nodes.iter().map(|n| n.id.clone()).collect::<HashSet<_>>();
        assert_eq!(ids(&parsed), ids(&exported));
        for node in &exported.nodes {
            let other = parsed.nodes.iter().find(|n| n.id == node.id).unwrap();
            assert_eq!(other, node);
        }
        let conns = |doc: &FlowDocument| doc.connections.iter().cloned().collect::<HashSet<_>>();
        assert_eq!(conns(&parsed), conns(&exported));
    }

    // ========================================================================
    // Parse
    // ========================================================================

    #[test]
    fn test_parse_accepts_browser_timestamp() {
        let text = r#"{
            "nodes": [],
            "connections": [],
            "metadata": { "name": "x", "createdAt": "2024-01-02T03:04:05.678Z", "version": "1.0.0" }
        }"#;
        let document = parse_document(text).unwrap();
        assert_eq!(format_timestamp(&document.metadata.created_at), "2024-01-02T03:04:05.678Z");
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(parse_document("{ not json"), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(parse_document("[1, 2]"), Err(ParseError::Structure(_))));
    }

    #[test]
    fn test_parse_rejects_missing_sections() {
        let err = parse_document(r#"{ "nodes": [], "connections": [] }"#).unwrap_err();
        match err {
            ParseError::Structure(msg) => assert_eq!(msg, "missing 'metadata'"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let text = r#"{
            "nodes": [{ "id": "x", "type": "loop", "position": { "x": 0, "y": 0 }, "data": { "label": "X" }, "connections": [] }],
            "connections": [],
            "metadata": { "name": "x", "createdAt": "2024-01-02T03:04:05.678Z", "version": "1.0.0" }
        }"#;
        assert!(matches!(parse_document(text), Err(ParseError::Structure(_))));
    }

    #[test]
    fn test_parse_rejects_out_of_range_position() {
        let text = r#"{
            "nodes": [{ "id": "m-1", "type": "message", "position": { "x": 10, "y": -1e39 },
                        "data": { "label": "M" }, "connections": [] }],
            "connections": [],
            "metadata": { "name": "x", "createdAt": "2024-01-02T03:04:05.678Z", "version": "1.0.0" }
        }"#;
        match parse_document(text).unwrap_err() {
            ParseError::Structure(msg) => assert_eq!(msg, "node 'm-1' has a non-finite position"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(EXPORT_FILE_NAME, "chatbot-flow.json");
    }

    #[test]
    fn test_parse_keeps_unknown_input_type() {
        let text = r#"{
            "nodes": [{ "id": "i", "type": "input", "position": { "x": 1, "y": 2 },
                        "data": { "label": "Ask", "inputType": "color" }, "connections": [] }],
            "connections": [],
            "metadata": { "name": "x", "createdAt": "2024-01-02T03:04:05Z", "version": "2.0.0" }
        }"#;
        let document = parse_document(text).unwrap();
        assert_eq!(document.nodes[0].data.input_type.as_deref(), Some("color"));
        assert_eq!(document.metadata.version, "2.0.0");
    }
}
