//! Arena representation of a dependency graph.
//!
//! Nodes live in one `Vec` and links refer to them by [`NodeId`], so the
//! layout engine mutates positions in place without any aliasing of copies.

use std::collections::HashSet;
use std::f64::consts::PI;

use log::debug;
use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;
use thiserror::Error;

use super::geometry::Point;
use super::types::{GraphData, NodeRef};

/// Radius of the ring new nodes are placed on.
const INITIAL_RING_RADIUS: f64 = 100.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
	#[error("link {link} references unknown node {reference}")]
	DanglingLink { link: usize, reference: NodeRef },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	pub(crate) fn from_index(index: usize) -> Self {
		Self(index)
	}

	pub fn index(self) -> usize {
		self.0
	}
}

#[derive(Clone, Debug)]
pub struct Node {
	pub name: String,
	pub x: f64,
	pub y: f64,
	fixed: bool,
	pub(crate) held: bool,
}

impl Node {
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	pub fn set_position(&mut self, p: Point) {
		self.x = p.x;
		self.y = p.y;
	}

	pub fn is_fixed(&self) -> bool {
		self.fixed
	}

	/// Pins the node for the rest of the session. There is no way back.
	pub fn fix(&mut self) {
		self.fixed = true;
	}

	/// Fixed, or currently held by a drag.
	pub fn is_pinned(&self) -> bool {
		self.fixed || self.held
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Link {
	pub source: NodeId,
	pub target: NodeId,
}

impl Link {
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<Node>,
	links: Vec<Link>,
}

impl Graph {
	/// Resolves a wire payload into an arena. Nodes without a position are
	/// spread on a ring around `center`.
	pub fn from_data(data: &GraphData, center: Point) -> Result<Self, GraphError> {
		let count = data.nodes.len();
		let nodes = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let angle = (i as f64) * 2.0 * PI / count as f64;
				Node {
					name: node.name.clone(),
					x: node
						.x
						.unwrap_or(center.x + INITIAL_RING_RADIUS * angle.cos()),
					y: node
						.y
						.unwrap_or(center.y + INITIAL_RING_RADIUS * angle.sin()),
					fixed: node.fixed,
					held: false,
				}
			})
			.collect::<Vec<_>>();

		let mut seen = HashSet::new();
		let mut links = Vec::with_capacity(data.links.len());
		for (i, link) in data.links.iter().enumerate() {
			let source = resolve(&nodes, &link.source, i)?;
			let target = resolve(&nodes, &link.target, i)?;
			let link = Link { source, target };
			if !seen.insert(link) {
				debug!(
					"skipping duplicate link {} -> {}",
					nodes[source.0].name, nodes[target.0].name
				);
				continue;
			}
			links.push(link);
		}

		Ok(Self { nodes, links })
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id.0]
	}

	pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
		&mut self.nodes[id.0]
	}

	pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
		(0..self.nodes.len()).map(NodeId)
	}

	/// Directed view of the links, labelled with node names. Node and edge
	/// indices match [`NodeId`]s and positions in [`Graph::links`].
	pub fn topology(&self) -> DiGraph<&str, ()> {
		let mut topology = DiGraph::with_capacity(self.nodes.len(), self.links.len());
		let indices: Vec<_> = self
			.nodes
			.iter()
			.map(|node| topology.add_node(node.name.as_str()))
			.collect();
		for link in &self.links {
			topology.add_edge(indices[link.source.0], indices[link.target.0], ());
		}
		topology
	}

	/// Graphviz DOT source, one edge per link.
	pub fn to_dot(&self) -> String {
		let labelled = self.topology().map(|_, name| *name, |_, _| "");
		format!("{}", Dot::with_config(&labelled, &[Config::EdgeNoLabel]))
	}
}

fn resolve(nodes: &[Node], reference: &NodeRef, link: usize) -> Result<NodeId, GraphError> {
	let found = match reference {
		NodeRef::Index(i) if *i < nodes.len() => Some(*i),
		NodeRef::Index(_) => None,
		NodeRef::Name(name) => nodes.iter().position(|n| &n.name == name),
	};
	found.map(NodeId).ok_or_else(|| GraphError::DanglingLink {
		link,
		reference: reference.clone(),
	})
}
