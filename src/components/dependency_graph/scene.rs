//! Retained view model of a graph: what the surface draws on each tick.

use super::geometry::{EdgeLine, Point, padded_edge};
use super::graph::{Graph, NodeId};

pub const SURFACE_WIDTH: f64 = 960.0;
pub const SURFACE_HEIGHT: f64 = 500.0;
pub const NODE_RADIUS: f64 = 5.0;
/// Arrowheads end this far outside the target circle.
pub const ARROW_CLEARANCE: f64 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Style {
	pub width: f64,
	pub height: f64,
	pub node_radius: f64,
	pub source_padding: f64,
	pub target_padding: f64,
}

impl Style {
	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

impl Default for Style {
	fn default() -> Self {
		Self {
			width: SURFACE_WIDTH,
			height: SURFACE_HEIGHT,
			node_radius: NODE_RADIUS,
			source_padding: NODE_RADIUS,
			target_padding: NODE_RADIUS + ARROW_CLEARANCE,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeMark {
	pub id: NodeId,
	pub center: Point,
	pub radius: f64,
	/// Tooltip text.
	pub title: String,
	pub fixed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeMark {
	pub source: NodeId,
	pub target: NodeId,
	/// `None` when the endpoints coincide.
	pub line: Option<EdgeLine>,
}

impl EdgeMark {
	/// Empty for degenerate edges, which keeps the path element but draws nothing.
	pub fn path_data(&self) -> String {
		self.line.map(|l| l.path_data()).unwrap_or_default()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	pub width: f64,
	pub height: f64,
	pub nodes: Vec<NodeMark>,
	pub edges: Vec<EdgeMark>,
}

impl Scene {
	pub fn build(graph: &Graph, style: &Style) -> Self {
		let nodes = graph
			.ids()
			.map(|id| {
				let node = graph.node(id);
				NodeMark {
					id,
					center: node.position(),
					radius: style.node_radius,
					title: node.name.clone(),
					fixed: node.is_fixed(),
				}
			})
			.collect();

		let edges = graph
			.links()
			.iter()
			.map(|link| EdgeMark {
				source: link.source,
				target: link.target,
				line: padded_edge(
					graph.node(link.source).position(),
					graph.node(link.target).position(),
					style.source_padding,
					style.target_padding,
				),
			})
			.collect();

		Self {
			width: style.width,
			height: style.height,
			nodes,
			edges,
		}
	}
}
