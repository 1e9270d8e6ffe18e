use petgraph::algo::kosaraju_scc;

use crate::components::dependency_graph::geometry::MIN_EDGE_LENGTH;
use crate::components::dependency_graph::graph::{Graph, Node};

use super::pair_direction;

pub(super) const TOLERANCE: f64 = 1e-6;
const MAX_SWEEPS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
}

impl Axis {
	fn coord(self, node: &Node) -> f64 {
		match self {
			Axis::X => node.x,
			Axis::Y => node.y,
		}
	}

	fn shift(self, node: &mut Node, by: f64) {
		match self {
			Axis::X => node.x += by,
			Axis::Y => node.y += by,
		}
	}
}

/// Linked nodes must be ordered along `axis`, target at least
/// `min_separation` past its source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowConstraint {
	pub axis: Axis,
	pub min_separation: f64,
}

/// `right - left >= gap` along `axis`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Separation {
	pub(super) axis: Axis,
	pub(super) left: usize,
	pub(super) right: usize,
	pub(super) gap: f64,
}

/// One separation per link, except links inside a cycle, which cannot all
/// point the same way.
pub(super) fn flow_separations(graph: &Graph, flow: FlowConstraint) -> Vec<Separation> {
	let components = strongly_connected_components(graph);
	graph
		.links()
		.iter()
		.filter(|link| components[link.source.index()] != components[link.target.index()])
		.map(|link| Separation {
			axis: flow.axis,
			left: link.source.index(),
			right: link.target.index(),
			gap: flow.min_separation,
		})
		.collect()
}

/// Component label per node.
fn strongly_connected_components(graph: &Graph) -> Vec<usize> {
	let mut component = vec![0; graph.len()];
	for (label, members) in kosaraju_scc(&graph.topology()).into_iter().enumerate() {
		for node in members {
			component[node.index()] = label;
		}
	}
	component
}

/// How a correction is split between two nodes. Pinned nodes take none of it.
fn shares(a: &Node, b: &Node) -> Option<(f64, f64)> {
	match (a.is_pinned(), b.is_pinned()) {
		(false, false) => Some((0.5, 0.5)),
		(true, false) => Some((0.0, 1.0)),
		(false, true) => Some((1.0, 0.0)),
		(true, true) => None,
	}
}

/// Moves nodes to the nearest layout that satisfies every separation.
///
/// Each constraint remembers how far it has pushed its pair so far; once
/// another constraint opens up slack, that push is partly taken back.
/// Returns the largest violation found before projecting.
pub(super) fn project_separations(nodes: &mut [Node], separations: &[Separation]) -> f64 {
	let mut initial = 0.0;
	let mut pushed = vec![0.0f64; separations.len()];
	for sweep in 0..MAX_SWEEPS {
		let (mut worst, mut moved) = (0.0f64, 0.0f64);
		for (sep, pushed) in separations.iter().zip(pushed.iter_mut()) {
			let (left, right) = (&nodes[sep.left], &nodes[sep.right]);
			let Some((left_share, right_share)) = shares(left, right) else {
				continue;
			};
			let violation = sep.gap - (sep.axis.coord(right) - sep.axis.coord(left));
			worst = worst.max(violation);
			let step = violation.max(-*pushed);
			if step.abs() <= TOLERANCE {
				continue;
			}
			*pushed += step;
			moved = moved.max(step.abs());
			sep.axis.shift(&mut nodes[sep.left], -step * left_share);
			sep.axis.shift(&mut nodes[sep.right], step * right_share);
		}
		if sweep == 0 {
			initial = worst;
		}
		if moved <= TOLERANCE {
			break;
		}
	}
	initial
}

/// Pushes apart every pair of nodes closer than `min_distance`. Returns the
/// largest overlap found before projecting.
pub(super) fn project_overlaps(nodes: &mut [Node], min_distance: f64) -> f64 {
	let n = nodes.len();
	let mut initial = 0.0;
	for sweep in 0..MAX_SWEEPS {
		let mut worst = 0.0f64;
		for i in 0..n {
			for j in (i + 1)..n {
				let delta = nodes[j].position() - nodes[i].position();
				let dist = delta.length();
				let overlap = min_distance - dist;
				if overlap <= TOLERANCE {
					continue;
				}
				let Some((share_i, share_j)) = shares(&nodes[i], &nodes[j]) else {
					continue;
				};
				worst = worst.max(overlap);
				let dir = if dist > MIN_EDGE_LENGTH {
					delta * (1.0 / dist)
				} else {
					pair_direction(j, i)
				};
				let (pi, pj) = (nodes[i].position(), nodes[j].position());
				nodes[i].set_position(pi - dir * (overlap * share_i));
				nodes[j].set_position(pj + dir * (overlap * share_j));
			}
		}
		if sweep == 0 {
			initial = worst;
		}
		if worst <= TOLERANCE {
			break;
		}
	}
	initial
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::dependency_graph::geometry::Point;
	use crate::components::dependency_graph::graph::NodeId;
	use crate::components::dependency_graph::types::{GraphData, GraphLink, GraphNode};

	fn graph(positions: &[(f64, f64)], links: &[(usize, usize)]) -> Graph {
		let data = GraphData {
			nodes: positions
				.iter()
				.enumerate()
				.map(|(i, &(x, y))| GraphNode {
					x: Some(x),
					y: Some(y),
					..GraphNode::named(format!("n{}", i))
				})
				.collect(),
			links: links.iter().map(|&(s, t)| GraphLink::between(s, t)).collect(),
		};
		Graph::from_data(&data, Point::default()).unwrap()
	}

	const DOWN: FlowConstraint = FlowConstraint {
		axis: Axis::Y,
		min_separation: 30.0,
	};

	#[test]
	fn cycles_are_excluded_from_flow() {
		// 0 -> 1 -> 2 -> 1 is a cycle between 1 and 2; 2 -> 2 loops on itself.
		let g = graph(
			&[(0.0, 0.0), (0.0, 0.0), (0.0, 0.0)],
			&[(0, 1), (1, 2), (2, 1), (2, 2)],
		);
		let seps = flow_separations(&g, DOWN);
		assert_eq!(seps.len(), 1);
		assert_eq!((seps[0].left, seps[0].right), (0, 1));
	}

	#[test]
	fn chain_is_separated_downwards() {
		let mut g = graph(&[(0.0, 0.0), (20.0, 0.0), (40.0, 0.0)], &[(0, 1), (1, 2)]);
		let seps = flow_separations(&g, DOWN);
		project_separations(g.nodes_mut(), &seps);

		let y: Vec<f64> = g.nodes().iter().map(|n| n.y).collect();
		assert!(y[1] - y[0] >= 30.0 - 1e-3);
		assert!(y[2] - y[1] >= 30.0 - 1e-3);
		// only the flow axis moves
		assert_eq!(g.nodes()[1].x, 20.0);
	}

	#[test]
	fn pinned_nodes_absorb_nothing() {
		let mut g = graph(&[(0.0, 0.0), (0.0, 0.0)], &[(0, 1)]);
		g.node_mut(NodeId::from_index(0)).fix();
		let seps = flow_separations(&g, DOWN);
		project_separations(g.nodes_mut(), &seps);
		assert_eq!(g.nodes()[0].position(), Point::new(0.0, 0.0));
		assert!((g.nodes()[1].y - 30.0).abs() < 1e-9);
	}

	#[test]
	fn projection_does_not_overshoot() {
		// 1 sits under both 0 and 2; pushing 1 down for 0 makes room for 2.
		let mut g = graph(&[(0.0, 0.0), (0.0, 10.0), (0.0, 20.0)], &[(0, 1), (2, 1)]);
		let seps = flow_separations(&g, DOWN);
		project_separations(g.nodes_mut(), &seps);

		let y: Vec<f64> = g.nodes().iter().map(|n| n.y).collect();
		assert!(y[1] - y[0] >= 30.0 - 1e-3);
		assert!(y[1] - y[2] >= 30.0 - 1e-3);
		// the nearest solution leaves 0 -> 1 slack, not stretched past the gap
		assert!(y[1] - y[0] < 40.0 + 1e-3, "{:?}", y);
		let centroid = y.iter().sum::<f64>() / 3.0;
		assert!((centroid - 10.0).abs() < 1e-3, "{:?}", y);
	}

	#[test]
	fn overlapping_circles_are_pushed_apart() {
		let mut g = graph(&[(0.0, 0.0), (4.0, 0.0), (4.0, 0.0)], &[]);
		project_overlaps(g.nodes_mut(), 11.0);
		let nodes = g.nodes();
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				assert!(nodes[i].position().distance(nodes[j].position()) >= 11.0 - 1e-3);
			}
		}
	}

	#[test]
	fn two_pinned_nodes_stay_overlapped() {
		let mut g = graph(&[(0.0, 0.0), (1.0, 0.0)], &[]);
		for node in g.nodes_mut() {
			node.fix();
		}
		project_overlaps(g.nodes_mut(), 11.0);
		assert_eq!(g.nodes()[1].position(), Point::new(1.0, 0.0));
	}
}
