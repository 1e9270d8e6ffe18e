//! Constrained force-directed layout.
//!
//! The engine follows a three-phase schedule: unconstrained iterations spread
//! the nodes, user-constraint iterations apply the flow ordering, and
//! all-constraint iterations also resolve node overlaps. After [`Layout::start`]
//! the host advances it with [`Layout::tick`], one iteration per call.

mod constraints;
mod distances;
mod spread;

use log::{debug, info};

use super::geometry::{MIN_EDGE_LENGTH, Point, fallback_direction};
use super::graph::{Graph, Node};
use constraints::{
	Separation, TOLERANCE, flow_separations, project_overlaps, project_separations,
};
use distances::{DistanceMatrix, shortest_paths};

pub use constraints::{Axis, FlowConstraint};
pub use distances::{DEFAULT_SEPARATION, LinkLengths};
pub use spread::SpreadParams;

/// Alternating overlap/flow projections per iteration.
const PROJECTION_ROUNDS: usize = 8;

/// Iterations per phase of [`Layout::start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
	pub unconstrained: usize,
	pub user_constraints: usize,
	pub all_constraints: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	pub link_lengths: LinkLengths,
	pub flow: Option<FlowConstraint>,
	pub avoid_overlaps: bool,
	pub node_radius: f64,
	/// Extra gap kept between circles when avoiding overlaps.
	pub overlap_margin: f64,
	pub schedule: Schedule,
	pub spread: SpreadParams,
	/// Ticking stops once no node moves further than this.
	pub convergence_threshold: f64,
	pub max_ticks: usize,
}

impl LayoutConfig {
	/// Plain descent with uniform link lengths and no constraints.
	pub fn unconstrained() -> Self {
		Self {
			link_lengths: LinkLengths::Uniform(30.0),
			flow: None,
			avoid_overlaps: false,
			node_radius: 5.0,
			overlap_margin: 1.0,
			schedule: Schedule {
				unconstrained: 10,
				user_constraints: 0,
				all_constraints: 0,
			},
			spread: SpreadParams::default(),
			convergence_threshold: 0.01,
			max_ticks: 300,
		}
	}

	pub fn avoid_overlaps(mut self, enabled: bool) -> Self {
		self.avoid_overlaps = enabled;
		self
	}

	pub fn flow_layout(mut self, axis: Axis, min_separation: f64) -> Self {
		self.flow = Some(FlowConstraint {
			axis,
			min_separation,
		});
		self
	}

	pub fn symmetric_diff_link_lengths(mut self, ideal: f64) -> Self {
		self.link_lengths = LinkLengths::SymmetricDiff { ideal, weight: 1.0 };
		self
	}

	pub fn uniform_link_length(mut self, length: f64) -> Self {
		self.link_lengths = LinkLengths::Uniform(length);
		self
	}

	pub fn node_radius(mut self, radius: f64) -> Self {
		self.node_radius = radius;
		self
	}

	pub fn schedule(
		mut self,
		unconstrained: usize,
		user_constraints: usize,
		all_constraints: usize,
	) -> Self {
		self.schedule = Schedule {
			unconstrained,
			user_constraints,
			all_constraints,
		};
		self
	}

	pub fn max_ticks(mut self, ticks: usize) -> Self {
		self.max_ticks = ticks;
		self
	}
}

impl Default for LayoutConfig {
	/// Dependency-graph settings: downward flow, symmetric-difference link
	/// lengths and overlap avoidance, started with 10/20/20 iterations.
	fn default() -> Self {
		Self::unconstrained()
			.avoid_overlaps(true)
			.flow_layout(Axis::Y, 30.0)
			.symmetric_diff_link_lengths(6.0)
			.schedule(10, 20, 20)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Constraints {
	None,
	User,
	All,
}

pub struct Layout {
	config: LayoutConfig,
	size: usize,
	distances: DistanceMatrix,
	linked: Vec<bool>,
	separations: Vec<Separation>,
	ticks: usize,
	converged: bool,
}

impl Layout {
	pub fn new(graph: &Graph, config: LayoutConfig) -> Self {
		let n = graph.len();
		let lengths = config.link_lengths.compute(graph);
		let distances = shortest_paths(graph, &lengths);

		let mut linked = vec![false; n * n];
		for link in graph.links().iter().filter(|l| !l.is_self_loop()) {
			let (s, t) = (link.source.index(), link.target.index());
			linked[s * n + t] = true;
			linked[t * n + s] = true;
		}

		let separations = config
			.flow
			.map(|flow| flow_separations(graph, flow))
			.unwrap_or_default();

		Self {
			config,
			size: n,
			distances,
			linked,
			separations,
			ticks: 0,
			converged: false,
		}
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn ticks(&self) -> usize {
		self.ticks
	}

	pub fn is_converged(&self) -> bool {
		self.converged
	}

	/// Runs the initial schedule to completion.
	pub fn start(&mut self, graph: &mut Graph) {
		let schedule = self.config.schedule;
		spread::spread(graph, self.config.spread, schedule.unconstrained);
		for _ in 0..schedule.unconstrained {
			self.iterate(graph, Constraints::None);
		}
		for _ in 0..schedule.user_constraints {
			self.iterate(graph, Constraints::User);
		}
		for _ in 0..schedule.all_constraints {
			self.iterate(graph, Constraints::All);
		}
		self.ticks = 0;
		self.converged = false;
		info!(
			"layout started: {} nodes, {} links, {} flow constraints",
			graph.len(),
			graph.links().len(),
			self.separations.len()
		);
	}

	/// One iteration with every constraint active. Returns `true` once the
	/// layout has converged or the tick cap is reached.
	pub fn tick(&mut self, graph: &mut Graph) -> bool {
		if self.converged {
			return true;
		}
		let displacement = self.iterate(graph, Constraints::All);
		self.ticks += 1;
		if displacement < self.config.convergence_threshold || self.ticks >= self.config.max_ticks
		{
			debug!(
				"layout converged after {} ticks (last displacement {:.4})",
				self.ticks, displacement
			);
			self.converged = true;
		}
		self.converged
	}

	/// Restarts ticking, e.g. after a node was dragged.
	pub fn resume(&mut self) {
		self.ticks = 0;
		self.converged = false;
	}

	fn is_linked(&self, i: usize, j: usize) -> bool {
		self.linked[i * self.size + j]
	}

	/// Returns the largest distance any node moved.
	fn iterate(&self, graph: &mut Graph, constraints: Constraints) -> f64 {
		let before: Vec<Point> = graph.nodes().iter().map(Node::position).collect();
		let nodes = graph.nodes_mut();

		self.descend(nodes);
		match constraints {
			Constraints::None => {}
			Constraints::All if self.config.avoid_overlaps => {
				let min_distance = 2.0 * self.config.node_radius + self.config.overlap_margin;
				for _ in 0..PROJECTION_ROUNDS {
					let overlap = project_overlaps(nodes, min_distance);
					let flow = project_separations(nodes, &self.separations);
					if overlap <= TOLERANCE && flow <= TOLERANCE {
						break;
					}
				}
			}
			Constraints::User | Constraints::All => {
				project_separations(nodes, &self.separations);
			}
		}

		nodes
			.iter()
			.zip(&before)
			.map(|(node, prev)| node.position().distance(*prev))
			.fold(0.0, f64::max)
	}

	/// Stress descent: every free node is pulled towards where each other
	/// node would like it to be, weighted by `1/d²`.
	///
	/// Pulls between a pair are equal and opposite, and the step is scaled so
	/// the stiffest node covers half the distance to its target. Both ends of
	/// a link moving at once therefore meet at the ideal length.
	fn descend(&self, nodes: &mut [Node]) {
		let positions: Vec<Point> = nodes.iter().map(Node::position).collect();
		let mut pulls = vec![Point::default(); nodes.len()];
		let mut stiffness = 0.0f64;
		for (i, node) in nodes.iter().enumerate() {
			if node.is_pinned() {
				continue;
			}
			let (mut pull, mut weight) = (Point::default(), 0.0);
			for (j, &other) in positions.iter().enumerate() {
				if i == j {
					continue;
				}
				let ideal = self.distances.get(i, j);
				let delta = positions[i] - other;
				let dist = delta.length();
				// unlinked pairs only push apart
				if ideal <= 0.0 || (!self.is_linked(i, j) && dist >= ideal) {
					continue;
				}
				let dir = if dist > MIN_EDGE_LENGTH {
					delta * (1.0 / dist)
				} else {
					pair_direction(i, j)
				};
				let w = 1.0 / (ideal * ideal);
				pull = pull + (other + dir * ideal - positions[i]) * w;
				weight += w;
			}
			pulls[i] = pull;
			stiffness = stiffness.max(weight);
		}
		if stiffness <= 0.0 {
			return;
		}

		let step = 0.5 / stiffness;
		for (node, &pull) in nodes.iter_mut().zip(&pulls) {
			if node.is_pinned() {
				continue;
			}
			let next = node.position() + pull * step;
			if next.is_finite() {
				node.set_position(next);
			}
		}
	}
}

/// Stand-in for the direction from `b` to `a` when both sit on the same spot.
/// Antisymmetric, so the two nodes of a pair move apart.
fn pair_direction(a: usize, b: usize) -> Point {
	if a < b {
		fallback_direction(a, b)
	} else {
		fallback_direction(b, a) * -1.0
	}
}
