//! Node and connection data types shared by the graph, the controller and the
//! document format.

use crate::error::UnknownNodeKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Input types offered by the property form of an `input` node.
pub const INPUT_TYPES: &[&str] = &["text", "email", "number", "phone", "date"];

/// Action kinds offered by the property form of an `action` node.
pub const ACTION_KINDS: &[&str] = &["webhook", "email", "variable"];

/// A point on the canvas, in canvas-local coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp both axes independently to be non-negative.
    pub fn clamp_non_negative(self) -> Self {
        Self {
            x: self.x.max(0.0),
            y: self.y.max(0.0),
        }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// The closed set of flow step categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    Message,
    Condition,
    Input,
    Action,
    End,
}

impl NodeKind {
    /// Every kind, in palette order.
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Start,
        NodeKind::Message,
        NodeKind::Condition,
        NodeKind::Input,
        NodeKind::Action,
        NodeKind::End,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Message => "message",
            NodeKind::Condition => "condition",
            NodeKind::Input => "input",
            NodeKind::Action => "action",
            NodeKind::End => "end",
        }
    }

    /// Default node label: the kind name, capitalized.
    pub fn default_label(self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::Message => "Message",
            NodeKind::Condition => "Condition",
            NodeKind::Input => "Input",
            NodeKind::Action => "Action",
            NodeKind::End => "End",
        }
    }

    /// Name shown on the palette item that creates this kind.
    pub fn palette_label(self) -> &'static str {
        match self {
            NodeKind::Input => "User Input",
            other => other.default_label(),
        }
    }

    /// Every kind except `end` has an output handle.
    pub fn has_output_handle(self) -> bool {
        self != NodeKind::End
    }

    /// Every kind except `start` has an input handle.
    pub fn has_input_handle(self) -> bool {
        self != NodeKind::Start
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

/// One step of an `action` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

impl ActionRecord {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

impl Default for ActionRecord {
    fn default() -> Self {
        Self::new("webhook", "")
    }
}

/// Per-node parameters. Which optional fields matter depends on the
/// [`NodeKind`]; absent fields are omitted from exported documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionRecord>>,
}

impl NodeData {
    /// Data a freshly created node of `kind` starts with.
    pub fn defaults_for(kind: NodeKind) -> Self {
        let mut data = NodeData {
            label: kind.default_label().to_string(),
            ..Default::default()
        };
        match kind {
            NodeKind::Message => data.message = Some("Enter your message here".to_string()),
            NodeKind::Condition => data.condition = Some("Enter condition".to_string()),
            NodeKind::Input => data.input_type = Some("text".to_string()),
            NodeKind::Action => data.actions = Some(Vec::new()),
            NodeKind::Start | NodeKind::End => {}
        }
        data
    }
}

/// Partial update of [`NodeData`]; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDataPatch {
    pub label: Option<String>,
    pub message: Option<String>,
    pub condition: Option<String>,
    pub true_path: Option<String>,
    pub false_path: Option<String>,
    pub input_type: Option<String>,
    pub placeholder: Option<String>,
    pub variable_name: Option<String>,
    pub actions: Option<Vec<ActionRecord>>,
}

impl NodeDataPatch {
    pub fn is_empty(&self) -> bool {
        *self == NodeDataPatch::default()
    }

    pub fn apply(self, data: &mut NodeData) {
        if let Some(label) = self.label {
            data.label = label;
        }
        if self.message.is_some() {
            data.message = self.message;
        }
        if self.condition.is_some() {
            data.condition = self.condition;
        }
        if self.true_path.is_some() {
            data.true_path = self.true_path;
        }
        if self.false_path.is_some() {
            data.false_path = self.false_path;
        }
        if self.input_type.is_some() {
            data.input_type = self.input_type;
        }
        if self.placeholder.is_some() {
            data.placeholder = self.placeholder;
        }
        if self.variable_name.is_some() {
            data.variable_name = self.variable_name;
        }
        if self.actions.is_some() {
            data.actions = self.actions;
        }
    }
}

impl From<NodeData> for NodeDataPatch {
    /// A patch that overwrites every field present in `data`, as a property
    /// form does when it saves.
    fn from(data: NodeData) -> Self {
        Self {
            label: Some(data.label),
            message: data.message,
            condition: data.condition,
            true_path: data.true_path,
            false_path: data.false_path,
            input_type: data.input_type,
            placeholder: data.placeholder,
            variable_name: data.variable_name,
            actions: data.actions,
        }
    }
}

/// Partial update of a node's position and/or data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub position: Option<Position>,
    pub data: Option<NodeDataPatch>,
}

impl NodeUpdate {
    pub fn move_to(position: Position) -> Self {
        Self {
            position: Some(position),
            data: None,
        }
    }

    pub fn with_data(patch: impl Into<NodeDataPatch>) -> Self {
        Self {
            position: None,
            data: Some(patch.into()),
        }
    }
}

/// A flow step placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub data: NodeData,
    /// Targets of this node's outgoing connections. Maintained by
    /// [`FlowGraph`](crate::FlowGraph); documents carry it as `connections`.
    #[serde(rename = "connections", default)]
    pub(crate) outgoing: Vec<String>,
}

impl Node {
    /// A node with the default data for its kind and no outgoing connections.
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data: NodeData::defaults_for(kind),
            outgoing: Vec::new(),
        }
    }

    pub fn outgoing(&self) -> &[String] {
        &self.outgoing
    }

    /// Text shown on the node card.
    pub fn summary(&self) -> String {
        match self.kind {
            NodeKind::Message => non_empty(&self.data.message)
                .unwrap_or("Enter message")
                .to_string(),
            NodeKind::Condition => non_empty(&self.data.condition)
                .unwrap_or("Enter condition")
                .to_string(),
            NodeKind::Input => format!(
                "Input: {}",
                non_empty(&self.data.input_type).unwrap_or("text")
            ),
            NodeKind::Action => format!(
                "Actions: {}",
                self.data.actions.as_ref().map_or(0, Vec::len)
            ),
            NodeKind::Start | NodeKind::End => self.data.label.clone(),
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Id of the connection from `source` to `target`.
pub fn connection_id(source: &str, target: &str) -> String {
    format!("{source}-{target}")
}

/// A directed edge from one node's output to another node's input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: connection_id(&source, &target),
            source,
            target,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
