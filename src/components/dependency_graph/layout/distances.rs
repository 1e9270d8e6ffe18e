use std::collections::HashSet;

use petgraph::algo::dijkstra;
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

use crate::components::dependency_graph::graph::Graph;

/// Ideal distance between nodes that share no path.
pub const DEFAULT_SEPARATION: f64 = 50.0;

/// How the ideal length of each link is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LinkLengths {
	Uniform(f64),
	/// `ideal * (1 + weight * sqrt(|N(u) ∪ N(v)| - |N(u) ∩ N(v)|))`, so links between
	/// nodes with very different neighbourhoods get longer.
	SymmetricDiff { ideal: f64, weight: f64 },
}

impl LinkLengths {
	pub(super) fn compute(&self, graph: &Graph) -> Vec<f64> {
		match *self {
			LinkLengths::Uniform(length) => vec![length; graph.links().len()],
			LinkLengths::SymmetricDiff { ideal, weight } => {
				let neighbours = neighbour_sets(graph);
				graph
					.links()
					.iter()
					.map(|link| {
						let a = &neighbours[link.source.index()];
						let b = &neighbours[link.target.index()];
						let diff = a.symmetric_difference(b).count() as f64;
						ideal * (1.0 + weight * diff.sqrt())
					})
					.collect()
			}
		}
	}
}

fn neighbour_sets(graph: &Graph) -> Vec<HashSet<usize>> {
	let mut sets = vec![HashSet::new(); graph.len()];
	for link in graph.links() {
		if link.is_self_loop() {
			continue;
		}
		let (s, t) = (link.source.index(), link.target.index());
		sets[s].insert(t);
		sets[t].insert(s);
	}
	sets
}

/// Dense symmetric matrix of ideal pair distances.
#[derive(Clone, Debug)]
pub(super) struct DistanceMatrix {
	n: usize,
	values: Vec<f64>,
}

impl DistanceMatrix {
	pub(super) fn get(&self, i: usize, j: usize) -> f64 {
		self.values[i * self.n + j]
	}
}

/// Shortest paths over the undirected link graph, one Dijkstra run per node.
///
/// Pairs in different components get the largest finite distance, or
/// [`DEFAULT_SEPARATION`] when the graph has no links at all.
pub(super) fn shortest_paths(graph: &Graph, lengths: &[f64]) -> DistanceMatrix {
	let n = graph.len();
	let weighted: UnGraph<(), f64> = graph
		.topology()
		.map(|_, _| (), |edge, _| lengths[edge.index()])
		.into_edge_type();

	let mut values = vec![f64::INFINITY; n * n];
	for source in weighted.node_indices() {
		let row = &mut values[source.index() * n..(source.index() + 1) * n];
		for (node, cost) in dijkstra(&weighted, source, None, |edge| *edge.weight()) {
			row[node.index()] = cost;
		}
	}

	let longest = values
		.iter()
		.copied()
		.filter(|d| d.is_finite())
		.fold(0.0, f64::max);
	let fill = if longest > 0.0 {
		longest
	} else {
		DEFAULT_SEPARATION
	};
	for d in values.iter_mut().filter(|d| !d.is_finite()) {
		*d = fill;
	}

	DistanceMatrix { n, values }
}
