use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, MouseEvent};

use super::geometry::Point;
use super::render::{PointerInput, PointerKind, SceneTarget};
use super::scene::Scene;
use crate::error::RenderError;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

type Listener = Closure<dyn FnMut(MouseEvent)>;

struct Mounted {
	svg: Element,
	circles: Vec<Element>,
	paths: Vec<Element>,
	// Dropping these detaches the handlers, so they live as long as the svg.
	_listeners: Vec<Listener>,
}

/// Draws scenes as `<svg>` elements appended to the mount element.
pub struct SvgTarget {
	document: Document,
	mounted: HashMap<String, Mounted>,
	input: Rc<RefCell<Vec<PointerInput>>>,
}

impl SvgTarget {
	pub fn new() -> Result<Self, RenderError> {
		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or(RenderError::NoWindow)?;
		Ok(Self {
			document,
			mounted: HashMap::new(),
			input: Rc::new(RefCell::new(Vec::new())),
		})
	}

	fn create(&self, tag: &str) -> Result<Element, RenderError> {
		self.document
			.create_element_ns(Some(SVG_NS), tag)
			.map_err(RenderError::from_js)
	}

	fn arrow_marker(&self, id: &str) -> Result<Element, RenderError> {
		let defs = self.create("defs")?;
		let marker = self.create("marker")?;
		for (name, value) in [
			("id", id),
			("viewBox", "0 -5 10 10"),
			("refX", "6"),
			("markerWidth", "3"),
			("markerHeight", "3"),
			("orient", "auto"),
		] {
			marker
				.set_attribute(name, value)
				.map_err(RenderError::from_js)?;
		}
		let head = self.create("path")?;
		head.set_attribute("d", "M0,-5L10,0L0,5")
			.map_err(RenderError::from_js)?;
		head.set_attribute("fill", "#000")
			.map_err(RenderError::from_js)?;
		marker.append_child(&head).map_err(RenderError::from_js)?;
		defs.append_child(&marker).map_err(RenderError::from_js)?;
		Ok(defs)
	}

	fn listen(&self, svg: &Element, mount: &str) -> Result<Vec<Listener>, RenderError> {
		let mut listeners = Vec::new();
		for event in ["mousedown", "mousemove", "mouseup", "mouseleave"] {
			let (queue, mount, target) = (self.input.clone(), mount.to_owned(), svg.clone());
			let cb = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
				let rect = target.get_bounding_client_rect();
				let p = Point::new(
					ev.client_x() as f64 - rect.left(),
					ev.client_y() as f64 - rect.top(),
				);
				let kind = match ev.type_().as_str() {
					"mousedown" => PointerKind::Down(p),
					"mousemove" => PointerKind::Move(p),
					"mouseup" => PointerKind::Up,
					_ => PointerKind::Leave,
				};
				queue.borrow_mut().push(PointerInput {
					mount: mount.clone(),
					kind,
				});
			});
			svg.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
				.map_err(RenderError::from_js)?;
			listeners.push(cb);
		}
		Ok(listeners)
	}
}

/// Element id for the arrowhead marker of one mount.
fn marker_id(mount: &str) -> String {
	let slug: String = mount
		.chars()
		.filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
		.collect();
	format!("{}-arrow", slug)
}

/// Per-frame attribute write; failures are logged.
fn set_attr(el: &Element, name: &str, value: &str) {
	if let Err(err) = el.set_attribute(name, value) {
		debug!("setting `{}` failed: {}", name, RenderError::from_js(err));
	}
}

fn set(el: &Element, name: &str, value: f64) {
	set_attr(el, name, &value.to_string());
}

impl SceneTarget for SvgTarget {
	fn purge(&mut self, mount: &str) {
		if let Some(old) = self.mounted.remove(mount) {
			old.svg.remove();
			debug!("removed svg from {}", mount);
		}
	}

	fn attach(&mut self, mount: &str, scene: &Scene) -> Result<(), RenderError> {
		let container = self
			.document
			.query_selector(mount)
			.map_err(RenderError::from_js)?
			.ok_or_else(|| RenderError::MissingTarget(mount.to_owned()))?;

		let svg = self.create("svg")?;
		set(&svg, "width", scene.width);
		set(&svg, "height", scene.height);
		svg.set_attribute("class", "dependency-graph")
			.map_err(RenderError::from_js)?;

		let marker = marker_id(mount);
		let defs = self.arrow_marker(&marker)?;
		svg.append_child(&defs).map_err(RenderError::from_js)?;

		// edges first so circles are drawn on top
		let mut paths = Vec::with_capacity(scene.edges.len());
		for _ in &scene.edges {
			let path = self.create("path")?;
			path.set_attribute("class", "link")
				.map_err(RenderError::from_js)?;
			path.set_attribute("marker-end", &format!("url(#{})", marker))
				.map_err(RenderError::from_js)?;
			svg.append_child(&path).map_err(RenderError::from_js)?;
			paths.push(path);
		}

		let mut circles = Vec::with_capacity(scene.nodes.len());
		for node in &scene.nodes {
			let circle = self.create("circle")?;
			circle
				.set_attribute("class", "node")
				.map_err(RenderError::from_js)?;
			set(&circle, "r", node.radius);
			let title = self.create("title")?;
			title.set_text_content(Some(&node.title));
			circle.append_child(&title).map_err(RenderError::from_js)?;
			svg.append_child(&circle).map_err(RenderError::from_js)?;
			circles.push(circle);
		}

		let listeners = self.listen(&svg, mount)?;
		container.append_child(&svg).map_err(RenderError::from_js)?;

		self.mounted.insert(
			mount.to_owned(),
			Mounted {
				svg,
				circles,
				paths,
				_listeners: listeners,
			},
		);
		self.update(mount, scene);
		Ok(())
	}

	fn update(&mut self, mount: &str, scene: &Scene) {
		let Some(mounted) = self.mounted.get(mount) else {
			warn!("update for unmounted {}", mount);
			return;
		};
		for (path, edge) in mounted.paths.iter().zip(&scene.edges) {
			set_attr(path, "d", &edge.path_data());
		}
		for (circle, node) in mounted.circles.iter().zip(&scene.nodes) {
			set(circle, "cx", node.center.x);
			set(circle, "cy", node.center.y);
			let class = if node.fixed { "node fixed" } else { "node" };
			set_attr(circle, "class", class);
		}
	}

	fn poll_input(&mut self) -> Vec<PointerInput> {
		std::mem::take(&mut *self.input.borrow_mut())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn marker_ids_are_selector_safe() {
		assert_eq!(marker_id("#dependencies"), "dependencies-arrow");
		assert_eq!(marker_id("div.graph > #a_b"), "divgrapha_b-arrow");
	}
}
