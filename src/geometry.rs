//! Anchor points and connection curves.
//!
//! Node boxes have a fixed size shared with the rendering layer. Connections
//! leave a node at the middle of its right edge and enter at the middle of
//! the left edge.

use crate::model::{Node, Position};

/// Width of a node box.
pub const NODE_WIDTH: f32 = 150.0;
/// Height of a node box.
pub const NODE_HEIGHT: f32 = 80.0;

/// Right-center of the node box, where outgoing connections start.
pub fn anchor_out(node: &Node) -> Position {
    Position::new(node.position.x + NODE_WIDTH, node.position.y + NODE_HEIGHT / 2.0)
}

/// Left-center of the node box, where incoming connections end.
pub fn anchor_in(node: &Node) -> Position {
    Position::new(node.position.x, node.position.y + NODE_HEIGHT / 2.0)
}

/// Canvas position for a node dropped from the palette.
///
/// `pointer` is in the same coordinate space as `canvas_origin` (e.g. window
/// coordinates); the result is canvas-local and shifted so the node is
/// centered under the pointer.
pub fn drop_position(pointer: Position, canvas_origin: Position, center_offset: Position) -> Position {
    pointer - canvas_origin - center_offset
}

/// Offset that centers a default-sized node under the pointer on drop.
pub const DROP_CENTER_OFFSET: Position = Position::new(NODE_WIDTH / 2.0, 40.0);

/// Cubic bezier between two anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionCurve {
    pub start: Position,
    pub ctrl1: Position,
    pub ctrl2: Position,
    pub end: Position,
}

impl ConnectionCurve {
    /// S-curve whose control points both sit at the horizontal midpoint,
    /// each level with its own endpoint.
    pub fn between(start: Position, end: Position) -> Self {
        let mid_x = (start.x + end.x) / 2.0;
        Self {
            start,
            ctrl1: Position::new(mid_x, start.y),
            ctrl2: Position::new(mid_x, end.y),
            end,
        }
    }

    /// SVG path command, e.g. `"M 250 140 C 325 140, 325 240, 400 240"`.
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.ctrl1.x,
            self.ctrl1.y,
            self.ctrl2.x,
            self.ctrl2.y,
            self.end.x,
            self.end.y
        )
    }

    /// Evaluate the curve at parameter t (0.0 to 1.0).
    pub fn eval(&self, t: f32) -> Position {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.start.x
            + 3.0 * mt2 * t * self.ctrl1.x
            + 3.0 * mt * t2 * self.ctrl2.x
            + t3 * self.end.x;
        let y = mt3 * self.start.y
            + 3.0 * mt2 * t * self.ctrl1.y
            + 3.0 * mt * t2 * self.ctrl2.y
            + t3 * self.end.y;

        Position::new(x, y)
    }

    /// Approximate distance from `point` to the curve.
    ///
    /// Samples the curve into `num_samples` line segments (20 if zero is
    /// passed) and takes the closest segment.
    pub fn distance_to(&self, point: Position, num_samples: usize) -> f32 {
        let samples = if num_samples == 0 { 20 } else { num_samples };

        let mut min_dist_sq = f32::MAX;
        let mut prev = self.start;
        for i in 1..=samples {
            let t = i as f32 / samples as f32;
            let curr = self.eval(t);
            min_dist_sq = min_dist_sq.min(distance_to_segment_sq(point, prev, curr));
            prev = curr;
        }

        min_dist_sq.sqrt()
    }
}

/// Curve from `source`'s output anchor to `target`'s input anchor.
pub fn connection_path(source: &Node, target: &Node) -> ConnectionCurve {
    ConnectionCurve::between(anchor_out(source), anchor_in(target))
}

/// Squared distance from a point to a line segment.
fn distance_to_segment_sq(point: Position, a: Position, b: Position) -> f32 {
    let ab = b - a;
    let ap = point - a;

    let ab_len_sq = ab.x * ab.x + ab.y * ab.y;
    if ab_len_sq < 0.0001 {
        return ap.x * ap.x + ap.y * ap.y;
    }

    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_len_sq).clamp(0.0, 1.0);
    let closest = Position::new(a.x + t * ab.x, a.y + t * ab.y);
    let d = point - closest;
    d.x * d.x + d.y * d.y
}
