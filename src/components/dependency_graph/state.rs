use log::{debug, info};

use super::geometry::Point;
use super::graph::{Graph, GraphError, NodeId};
use super::layout::{Layout, LayoutConfig};
use super::scene::{Scene, Style};
use super::types::GraphData;

/// Pointer slop, in surface units, before a press turns into a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;
pub const HIT_SLOP: f64 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
	pub start: Point,
	pub node_start: Point,
	pub moved: bool,
}

/// One graph rendered at one mount point, with its running layout.
pub struct RenderSession {
	pub graph: Graph,
	pub drag: DragState,
	layout: Layout,
	style: Style,
	running: bool,
}

impl RenderSession {
	/// Builds the arena and runs the initial layout schedule.
	pub fn new(data: &GraphData, config: LayoutConfig, style: Style) -> Result<Self, GraphError> {
		let mut graph = Graph::from_data(data, style.center())?;
		let mut layout = Layout::new(&graph, config);
		layout.start(&mut graph);
		Ok(Self {
			graph,
			drag: DragState::default(),
			layout,
			style,
			running: true,
		})
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn layout(&self) -> &Layout {
		&self.layout
	}

	/// Advances the layout one step. Returns `false` without doing anything
	/// once the layout has settled.
	pub fn tick(&mut self) -> bool {
		if !self.running {
			return false;
		}
		if self.layout.tick(&mut self.graph) {
			self.running = false;
		}
		true
	}

	pub fn scene(&self) -> Scene {
		Scene::build(&self.graph, &self.style)
	}

	pub fn node_at_position(&self, p: Point) -> Option<NodeId> {
		let reach = self.style.node_radius + HIT_SLOP;
		// topmost circle wins, which is the last one drawn
		self.graph
			.ids()
			.filter(|&id| self.graph.node(id).position().distance(p) <= reach)
			.last()
	}

	/// Returns whether the press landed on a node.
	pub fn pointer_down(&mut self, p: Point) -> bool {
		let Some(id) = self.node_at_position(p) else {
			return false;
		};
		self.drag = DragState {
			node: Some(id),
			start: p,
			node_start: self.graph.node(id).position(),
			moved: false,
		};
		true
	}

	pub fn pointer_move(&mut self, p: Point) {
		let Some(id) = self.drag.node else {
			return;
		};
		if !self.drag.moved && self.drag.start.distance(p) < DRAG_THRESHOLD {
			return;
		}
		self.drag.moved = true;

		// fixed only keeps the layout from moving a node, not the user
		let node = self.graph.node_mut(id);
		node.held = true;
		node.set_position(self.drag.node_start + (p - self.drag.start));
		self.wake();
	}

	/// Ends a press. A press that never turned into a drag fixes the node,
	/// which is then returned.
	pub fn pointer_up(&mut self) -> Option<NodeId> {
		let drag = std::mem::take(&mut self.drag);
		let id = drag.node?;
		let node = self.graph.node_mut(id);
		node.held = false;
		if drag.moved {
			self.wake();
			return None;
		}
		node.fix();
		info!("fixed node `{}`", node.name);
		Some(id)
	}

	pub fn pointer_leave(&mut self) {
		if let Some(id) = self.drag.node.take() {
			self.graph.node_mut(id).held = false;
			self.wake();
		}
		self.drag = DragState::default();
	}

	fn wake(&mut self) {
		if !self.running {
			debug!("resuming layout");
		}
		self.layout.resume();
		self.running = true;
	}
}
