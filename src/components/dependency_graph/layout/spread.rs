use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use crate::components::dependency_graph::graph::Graph;

/// Parameters of the charge/spring simulation that relaxes the initial placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpreadParams {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	pub mass: f32,
	pub dt: f32,
}

impl Default for SpreadParams {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			mass: 10.0,
			dt: 0.016,
		}
	}
}

/// Runs `steps` updates of a `force_graph` simulation over the arena and
/// writes the result back. Pinned nodes are anchors and keep their position.
pub(super) fn spread(graph: &mut Graph, params: SpreadParams, steps: usize) {
	if steps == 0 || graph.is_empty() {
		return;
	}

	let mut sim: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
		force_charge: params.force_charge,
		force_spring: params.force_spring,
		force_max: params.force_max,
		node_speed: params.node_speed,
		damping_factor: params.damping_factor,
	});

	let indices = graph
		.nodes()
		.iter()
		.enumerate()
		.map(|(i, node)| {
			sim.add_node(NodeData {
				x: node.x as f32,
				y: node.y as f32,
				mass: params.mass,
				is_anchor: node.is_pinned(),
				user_data: i,
			})
		})
		.collect::<Vec<_>>();

	for link in graph.links() {
		if link.is_self_loop() {
			continue;
		}
		sim.add_edge(
			indices[link.source.index()],
			indices[link.target.index()],
			EdgeData::default(),
		);
	}

	for _ in 0..steps {
		sim.update(params.dt);
	}

	let nodes = graph.nodes_mut();
	let mut rejected = 0;
	sim.visit_nodes(|node| {
		let slot = &mut nodes[node.data.user_data];
		let (x, y) = (node.x() as f64, node.y() as f64);
		if slot.is_pinned() {
			return;
		}
		if x.is_finite() && y.is_finite() {
			slot.x = x;
			slot.y = y;
		} else {
			rejected += 1;
		}
	});
	if rejected > 0 {
		debug!("spread produced {} non-finite positions, kept previous", rejected);
	}
}
