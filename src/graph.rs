use crate::document::FlowDocument;
use crate::error::ConnectionError;
use crate::model::{Connection, Node, NodeKind, NodeUpdate, Position};
use chrono::Utc;
use std::collections::HashSet;

/// Id of the start node every new graph begins with.
pub const DEFAULT_START_ID: &str = "start-1";

/// Where the implicit start node is placed.
pub const DEFAULT_START_POSITION: Position = Position::new(100.0, 100.0);

/// The node and connection sets of a flow, with referential integrity.
///
/// Every mutation keeps each node's `outgoing` list equal to the targets of
/// the connections it is the source of.
///
/// # Example
///
/// ```
/// use chatflow_editor::{FlowGraph, NodeKind, Position};
///
/// let mut graph = FlowGraph::new();
/// let message = graph.add_node(NodeKind::Message, Position::new(300.0, 100.0)).id.clone();
///
/// assert!(graph.add_connection("start-1", &message).is_some());
/// assert!(graph.add_connection("start-1", &message).is_none()); // duplicate
/// assert_eq!(graph.outgoing("start-1"), Some(&[message][..]));
/// ```
pub struct FlowGraph {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    rules: CompositeRule,
    ids: IdSource,
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowGraph {
    /// A graph holding only the implicit start node.
    pub fn new() -> Self {
        let mut graph = Self::empty();
        graph.nodes.push(Node::new(
            DEFAULT_START_ID,
            NodeKind::Start,
            DEFAULT_START_POSITION,
        ));
        graph
    }

    /// A graph with no nodes at all.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            rules: CompositeRule::standard(),
            ids: IdSource::default(),
        }
    }

    /// Replace the rules consulted before a connection is created.
    pub fn set_rules(&mut self, rules: CompositeRule) {
        self.rules = rules;
    }

    // === Queries ===

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Targets of the connections leaving `id`, or `None` for an unknown node.
    pub fn outgoing(&self, id: &str) -> Option<&[String]> {
        self.node(id).map(Node::outgoing)
    }

    /// Check if a connection with the given direction already exists.
    pub fn has_connection(&self, source: &str, target: &str) -> bool {
        self.connections
            .iter()
            .any(|c| c.source == source && c.target == target)
    }

    /// Connections where `node_id` is the source or the target.
    pub fn connections_touching<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.touches(node_id))
    }

    // === Mutations ===

    /// Create a node of `kind` at `position` with the kind's default data.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> &Node {
        let nodes = &self.nodes;
        let id = self
            .ids
            .next(kind, |candidate| nodes.iter().any(|n| n.id == candidate));
        log::debug!("Adding {} node '{}' at ({}, {})", kind, id, position.x, position.y);
        self.nodes.push(Node::new(id, kind, position));
        &self.nodes[self.nodes.len() - 1]
    }

    /// Merge `update` into the node. Unknown ids are ignored.
    ///
    /// Returns `true` if a node was updated.
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            log::debug!("Ignoring update for unknown node '{}'", id);
            return false;
        };
        if let Some(position) = update.position {
            node.position = position;
        }
        if let Some(patch) = update.data.filter(|p| !p.is_empty()) {
            patch.apply(&mut node.data);
        }
        true
    }

    /// Remove the node together with every connection touching it.
    ///
    /// Start nodes are not special-cased here. Returns the removed node.
    pub fn delete_node(&mut self, id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let removed = self.nodes.remove(index);

        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        self.rebuild_outgoing();

        log::debug!(
            "Deleted node '{}' and {} connection(s)",
            id,
            before - self.connections.len()
        );
        Some(removed)
    }

    /// Connect `source` to `target`.
    ///
    /// Returns `None` without touching the graph when the rules refuse the
    /// pair (self-connection, unknown node, duplicate, ...).
    pub fn add_connection(&mut self, source: &str, target: &str) -> Option<Connection> {
        match self.try_add_connection(source, target) {
            Ok(connection) => Some(connection),
            Err(err) => {
                log::debug!("Connection refused: {}", err);
                None
            }
        }
    }

    /// Like [`add_connection`](Self::add_connection), reporting why a pair was refused.
    pub fn try_add_connection(
        &mut self,
        source: &str,
        target: &str,
    ) -> Result<Connection, ConnectionError> {
        self.rules.check(source, target, self)?;

        let connection = Connection::new(source, target);
        self.connections.push(connection.clone());
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == source) {
            node.outgoing.push(target.to_string());
        }
        log::debug!("Connected '{}' -> '{}'", source, target);
        Ok(connection)
    }

    /// Replace the whole graph with the contents of `document`.
    ///
    /// Duplicate node ids keep their first occurrence. Connections the
    /// graph's rule set refuses are dropped, the same rules that guard
    /// [`FlowGraph::try_add_connection`]. `outgoing` is rebuilt from the surviving connections rather
    /// than trusted from the document.
    pub fn replace_with(&mut self, document: FlowDocument) {
        self.nodes.clear();
        self.connections.clear();

        let mut seen = HashSet::new();
        for mut node in document.nodes {
            if !seen.insert(node.id.clone()) {
                log::warn!("Dropping duplicate node '{}' from document", node.id);
                continue;
            }
            node.outgoing.clear();
            self.nodes.push(node);
        }

        for connection in document.connections {
            match self.rules.check(&connection.source, &connection.target, self) {
                Ok(()) => self.connections.push(Connection::new(connection.source, connection.target)),
                Err(err) => log::warn!("Dropping connection '{}' from document: {}", connection.id, err),
            }
        }
        self.rebuild_outgoing();

        log::debug!(
            "Graph replaced: {} node(s), {} connection(s)",
            self.nodes.len(),
            self.connections.len()
        );
    }

    /// Recompute every node's `outgoing` from the connection list.
    fn rebuild_outgoing(&mut self) {
        for node in &mut self.nodes {
            node.outgoing = self
                .connections
                .iter()
                .filter(|c| c.source == node.id)
                .map(|c| c.target.clone())
                .collect();
        }
    }
}

/// Issues `"<kind>-<millis>"` node ids that never repeat within a session,
/// even when several nodes are created in the same millisecond.
#[derive(Debug, Default)]
struct IdSource {
    last_millis: i64,
}

impl IdSource {
    fn next(&mut self, kind: NodeKind, taken: impl Fn(&str) -> bool) -> String {
        let mut millis = Utc::now().timestamp_millis().max(self.last_millis + 1);
        let mut id = format!("{kind}-{millis}");
        while taken(&id) {
            millis += 1;
            id = format!("{kind}-{millis}");
        }
        self.last_millis = millis;
        id
    }
}

// ============================================================================
// Connection rules
// ============================================================================

/// A check run before a connection is created.
///
/// Implement this to add custom rules and compose them with [`CompositeRule`].
///
/// # Example
///
/// ```
/// use chatflow_editor::{CompositeRule, ConnectionError, ConnectionRule, FlowGraph, NodeKind};
///
/// /// Only `end` nodes may be connected to from a condition.
/// struct ConditionsExitToEnd;
///
/// impl ConnectionRule for ConditionsExitToEnd {
///     fn check(&self, source: &str, target: &str, graph: &FlowGraph) -> Result<(), ConnectionError> {
///         let from_condition = graph.node(source).is_some_and(|n| n.kind == NodeKind::Condition);
///         let to_end = graph.node(target).is_some_and(|n| n.kind == NodeKind::End);
///         if from_condition && !to_end {
///             return Err(ConnectionError::NoInputHandle(target.to_string()));
///         }
///         Ok(())
///     }
/// }
///
/// let mut graph = FlowGraph::new();
/// graph.set_rules(CompositeRule::standard().add(ConditionsExitToEnd));
/// ```
pub trait ConnectionRule {
    fn check(&self, source: &str, target: &str, graph: &FlowGraph) -> Result<(), ConnectionError>;
}

/// Refuses connecting a node to itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelfLoopRule;

impl ConnectionRule for SelfLoopRule {
    fn check(&self, source: &str, target: &str, _graph: &FlowGraph) -> Result<(), ConnectionError> {
        if source == target {
            return Err(ConnectionError::SelfConnection(source.to_string()));
        }
        Ok(())
    }
}

/// Refuses endpoints that are not in the graph.
#[derive(Clone, Copy, Debug, Default)]
pub struct KnownEndpointsRule;

impl ConnectionRule for KnownEndpointsRule {
    fn check(&self, source: &str, target: &str, graph: &FlowGraph) -> Result<(), ConnectionError> {
        for id in [source, target] {
            if !graph.contains(id) {
                return Err(ConnectionError::UnknownNode(id.to_string()));
            }
        }
        Ok(())
    }
}

/// Refuses a second connection between the same ordered pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicatesRule;

impl ConnectionRule for NoDuplicatesRule {
    fn check(&self, source: &str, target: &str, graph: &FlowGraph) -> Result<(), ConnectionError> {
        if graph.has_connection(source, target) {
            return Err(ConnectionError::Duplicate {
                from: source.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }
}

/// Refuses leaving a node without an output handle (`end`) or entering a
/// node without an input handle (`start`).
///
/// Unknown nodes pass; pair it with [`KnownEndpointsRule`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HandleDirectionRule;

impl ConnectionRule for HandleDirectionRule {
    fn check(&self, source: &str, target: &str, graph: &FlowGraph) -> Result<(), ConnectionError> {
        if let Some(node) = graph.node(source) {
            if !node.kind.has_output_handle() {
                return Err(ConnectionError::NoOutputHandle(source.to_string()));
            }
        }
        if let Some(node) = graph.node(target) {
            if !node.kind.has_input_handle() {
                return Err(ConnectionError::NoInputHandle(target.to_string()));
            }
        }
        Ok(())
    }
}

/// Runs rules in the order they were added; the first refusal wins.
#[derive(Default)]
pub struct CompositeRule {
    rules: Vec<Box<dyn ConnectionRule>>,
}

impl CompositeRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Self-loop, unknown-endpoint and duplicate checks.
    pub fn standard() -> Self {
        Self::new()
            .add(SelfLoopRule)
            .add(KnownEndpointsRule)
            .add(NoDuplicatesRule)
    }

    pub fn add<R: ConnectionRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl ConnectionRule for CompositeRule {
    fn check(&self, source: &str, target: &str, graph: &FlowGraph) -> Result<(), ConnectionError> {
        self.rules
            .iter()
            .try_for_each(|rule| rule.check(source, target, graph))
    }
}

// ============================================================================
// Tests
// ============================================================================
