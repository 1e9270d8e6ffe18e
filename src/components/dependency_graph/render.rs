use std::collections::HashMap;

use log::{debug, info, warn};

use super::geometry::Point;
use super::layout::LayoutConfig;
use super::scene::{Scene, Style};
use super::state::RenderSession;
use super::types::GraphData;
use crate::error::RenderError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerKind {
	Down(Point),
	Move(Point),
	Up,
	Leave,
}

/// Pointer activity on a mounted surface, in surface coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerInput {
	pub mount: String,
	pub kind: PointerKind,
}

/// Where scenes are drawn. The browser implementation is
/// [`SvgTarget`](super::svg::SvgTarget).
pub trait SceneTarget {
	/// Removes everything previously attached at `mount`. No-op if nothing is.
	fn purge(&mut self, mount: &str);

	/// Creates one element per node and per edge inside `mount`.
	fn attach(&mut self, mount: &str, scene: &Scene) -> Result<(), RenderError>;

	/// Moves the elements attached at `mount` to the positions in `scene`.
	fn update(&mut self, mount: &str, scene: &Scene);

	/// Pointer events gathered since the last call.
	fn poll_input(&mut self) -> Vec<PointerInput> {
		Vec::new()
	}
}

/// Owns one [`RenderSession`] per mount point and keeps them drawn.
pub struct GraphRenderer<T: SceneTarget> {
	target: T,
	config: LayoutConfig,
	style: Style,
	sessions: HashMap<String, RenderSession>,
}

impl<T: SceneTarget> GraphRenderer<T> {
	pub fn new(target: T, config: LayoutConfig, style: Style) -> Self {
		Self {
			target,
			config,
			style,
			sessions: HashMap::new(),
		}
	}

	pub fn target(&self) -> &T {
		&self.target
	}

	pub fn session(&self, mount: &str) -> Option<&RenderSession> {
		self.sessions.get(mount)
	}

	pub fn session_mut(&mut self, mount: &str) -> Option<&mut RenderSession> {
		self.sessions.get_mut(mount)
	}

	/// Replaces whatever is rendered at `mount` with a fresh layout of `data`.
	///
	/// The previous session at `mount`, settled or not, is dropped and its
	/// elements removed before anything new is created.
	pub fn render_graph(&mut self, mount: &str, data: &GraphData) -> Result<(), RenderError> {
		if self.sessions.remove(mount).is_some() {
			debug!("disposing previous session at {}", mount);
		}
		self.target.purge(mount);

		let session = RenderSession::new(data, self.config.clone(), self.style.clone())?;
		self.target.attach(mount, &session.scene())?;
		info!(
			"rendering {} nodes and {} links at {}",
			session.graph.len(),
			session.graph.links().len(),
			mount
		);
		self.sessions.insert(mount.to_owned(), session);
		Ok(())
	}

	/// Drops the session at `mount` and its elements.
	pub fn dispose(&mut self, mount: &str) {
		self.sessions.remove(mount);
		self.target.purge(mount);
	}

	/// One animation frame: applies pointer input, advances every running
	/// layout and redraws the sessions that changed. Returns whether any
	/// session is still moving.
	pub fn frame(&mut self) -> bool {
		let mut dirty = Vec::new();
		for input in self.target.poll_input() {
			let Some(session) = self.sessions.get_mut(&input.mount) else {
				warn!("pointer input for unknown mount {}", input.mount);
				continue;
			};
			match input.kind {
				PointerKind::Down(p) => {
					session.pointer_down(p);
				}
				PointerKind::Move(p) => session.pointer_move(p),
				PointerKind::Up => {
					session.pointer_up();
				}
				PointerKind::Leave => session.pointer_leave(),
			}
			dirty.push(input.mount);
		}

		let mut running = false;
		for (mount, session) in &mut self.sessions {
			if session.tick() {
				running = true;
				dirty.push(mount.clone());
			}
		}

		dirty.sort();
		dirty.dedup();
		for mount in dirty {
			if let Some(session) = self.sessions.get(&mount) {
				self.target.update(&mount, &session.scene());
			}
		}
		running
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::components::dependency_graph::graph::NodeId;
	use crate::components::dependency_graph::types::{GraphLink, GraphNode};

	/// In-memory stand-in for the DOM: a set of known mounts, each holding
	/// the elements attached to it.
	#[derive(Default)]
	pub(crate) struct RecordingTarget {
		pub(crate) mounts: HashMap<String, Vec<Scene>>,
		pub(crate) missing: Vec<String>,
		pub(crate) updates: usize,
		pub(crate) input: Vec<PointerInput>,
	}

	impl RecordingTarget {
		pub(crate) fn attached(&self, mount: &str) -> usize {
			self.mounts.get(mount).map_or(0, Vec::len)
		}
	}

	impl SceneTarget for RecordingTarget {
		fn purge(&mut self, mount: &str) {
			if let Some(scenes) = self.mounts.get_mut(mount) {
				scenes.clear();
			}
		}

		fn attach(&mut self, mount: &str, scene: &Scene) -> Result<(), RenderError> {
			if self.missing.iter().any(|m| m == mount) {
				return Err(RenderError::MissingTarget(mount.to_owned()));
			}
			self.mounts
				.entry(mount.to_owned())
				.or_default()
				.push(scene.clone());
			Ok(())
		}

		fn update(&mut self, mount: &str, scene: &Scene) {
			if let Some(last) = self.mounts.get_mut(mount).and_then(|s| s.last_mut()) {
				*last = scene.clone();
				self.updates += 1;
			}
		}

		fn poll_input(&mut self) -> Vec<PointerInput> {
			std::mem::take(&mut self.input)
		}
	}

	pub(crate) fn chain(names: &[&str]) -> GraphData {
		GraphData {
			nodes: names.iter().map(|n| GraphNode::named(*n)).collect(),
			links: (1..names.len())
				.map(|i| GraphLink::between(i - 1, i))
				.collect(),
		}
	}

	fn renderer() -> GraphRenderer<RecordingTarget> {
		GraphRenderer::new(
			RecordingTarget::default(),
			LayoutConfig::default(),
			Style::default(),
		)
	}

	#[test]
	fn rerendering_a_mount_leaves_one_set_of_elements() {
		let mut r = renderer();
		r.render_graph("#deps", &chain(&["a", "b", "c"])).unwrap();
		r.render_graph("#deps", &chain(&["x", "y"])).unwrap();

		assert_eq!(r.target().attached("#deps"), 1);
		let scene = &r.target().mounts["#deps"][0];
		assert_eq!(scene.nodes.len(), 2);
		assert_eq!(scene.nodes[0].title, "x");
		assert_eq!(r.session("#deps").unwrap().graph.len(), 2);
	}

	#[test]
	fn mounts_are_independent() {
		let mut r = renderer();
		r.render_graph("#left", &chain(&["a", "b"])).unwrap();
		r.render_graph("#right", &chain(&["c"])).unwrap();
		r.render_graph("#left", &chain(&["d", "e", "f"])).unwrap();
		assert_eq!(r.target().attached("#left"), 1);
		assert_eq!(r.target().attached("#right"), 1);
	}

	#[test]
	fn missing_mount_is_reported() {
		let mut r = renderer();
		r.target.missing.push("#nowhere".into());
		let err = r.render_graph("#nowhere", &chain(&["a"])).unwrap_err();
		assert!(matches!(err, RenderError::MissingTarget(ref m) if m == "#nowhere"));
		assert!(r.session("#nowhere").is_none());
	}

	#[test]
	fn dangling_links_are_reported_as_malformed() {
		let mut r = renderer();
		let mut data = chain(&["a", "b"]);
		data.links.push(GraphLink::between(0, 9));
		let err = r.render_graph("#deps", &data).unwrap_err();
		assert!(matches!(err, RenderError::MalformedGraph(_)));
	}

	#[test]
	fn frames_redraw_until_settled() {
		let mut r = renderer();
		r.render_graph("#deps", &chain(&["a", "b", "c", "d"])).unwrap();
		let mut frames = 0;
		while r.frame() {
			frames += 1;
			assert!(frames <= 300);
		}
		let session = r.session("#deps").unwrap();
		assert!(session.layout().ticks() < session.layout().config().max_ticks);
		assert!(r.target().updates > 0);
		assert!(!r.session("#deps").unwrap().is_running());

		let updates = r.target().updates;
		assert!(!r.frame());
		assert_eq!(r.target().updates, updates);
	}

	#[test]
	fn click_input_fixes_a_node() {
		let mut r = renderer();
		r.render_graph("#deps", &chain(&["a", "b"])).unwrap();
		let at = r.session("#deps").unwrap().graph.nodes()[1].position();
		r.target.input = vec![
			PointerInput {
				mount: "#deps".into(),
				kind: PointerKind::Down(at),
			},
			PointerInput {
				mount: "#deps".into(),
				kind: PointerKind::Up,
			},
		];
		r.frame();
		let session = r.session("#deps").unwrap();
		assert!(session.graph.node(NodeId::from_index(1)).is_fixed());
		assert!(r.target().mounts["#deps"][0].nodes[1].fixed);
	}

	#[test]
	fn dispose_clears_the_mount() {
		let mut r = renderer();
		r.render_graph("#deps", &chain(&["a"])).unwrap();
		r.dispose("#deps");
		assert_eq!(r.target().attached("#deps"), 0);
		assert!(r.session("#deps").is_none());
	}
}
