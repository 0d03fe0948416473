//! Connection curves for rendering.
//!
//! [`ConnectionPaths`] turns the graph's connection list into SVG path
//! commands and keeps a bound Slint model in step with it.
//!
//! # Example
//!
//! ```ignore
//! use chatflow_editor::{ConnectionPaths, FlowGraph};
//!
//! let model = Rc::new(VecModel::<ConnectionPath>::default());
//! let mut paths = ConnectionPaths::new();
//! paths.bind_model(model.clone(), |id, commands| ConnectionPath { id, commands });
//! window.set_connection_paths(ModelRc::from(model));
//!
//! // After every graph mutation
//! paths.update(&graph);
//! ```

use crate::geometry::connection_path;
use crate::graph::FlowGraph;
use slint::{Model, SharedString, VecModel};
use std::rc::Rc;

/// Internal trait for auto-syncing to Slint models.
trait ModelSyncer {
    fn sync(&self, paths: &[PathData]);
}

struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<P, F> ModelSyncer for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(SharedString, SharedString) -> P,
{
    fn sync(&self, paths: &[PathData]) {
        for (i, path) in paths.iter().enumerate() {
            let item = (self.constructor)(
                SharedString::from(path.id.as_str()),
                SharedString::from(path.commands.as_str()),
            );
            if i < self.model.row_count() {
                self.model.set_row_data(i, item);
            } else {
                self.model.push(item);
            }
        }
        while self.model.row_count() > paths.len() {
            self.model.remove(self.model.row_count() - 1);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PathData {
    id: String,
    commands: String,
}

/// Rendered path commands for every connection, in connection order.
#[derive(Default)]
pub struct ConnectionPaths {
    paths: Vec<PathData>,
    syncer: Option<Box<dyn ModelSyncer>>,
}

impl ConnectionPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a Slint model for automatic synchronization.
    ///
    /// After binding, every [`update`](Self::update) rewrites the model. The
    /// constructor receives `(connection_id, path_commands)`.
    pub fn bind_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(SharedString, SharedString) -> P + 'static,
    {
        self.syncer = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    /// Recompute every path from current node positions.
    ///
    /// Connections whose endpoints are missing produce no path.
    pub fn update(&mut self, graph: &FlowGraph) {
        self.paths = graph
            .connections()
            .iter()
            .filter_map(|c| {
                let source = graph.node(&c.source)?;
                let target = graph.node(&c.target)?;
                Some(PathData {
                    id: c.id.clone(),
                    commands: connection_path(source, target).to_svg_path(),
                })
            })
            .collect();

        if let Some(syncer) = &self.syncer {
            syncer.sync(&self.paths);
        }
    }

    /// `(connection_id, path_commands)` pairs from the last update.
    pub fn paths(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.paths.iter().map(|p| (p.id.as_str(), p.commands.as_str()))
    }

    pub fn path_for(&self, connection_id: &str) -> Option<&str> {
        self.paths
            .iter()
            .find(|p| p.id == connection_id)
            .map(|p| p.commands.as_str())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
