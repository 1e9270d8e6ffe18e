//! Receives render requests from the UI layer and fans them out to the
//! trace chart and the dependency graph.

mod channel;
mod frames;

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::components::dependency_graph::{
	GraphData, GraphRenderer, LayoutConfig, SceneTarget, Style, SvgTarget,
};
use crate::components::trace_chart::{self, ChartBackend, PlotlyBackend};
use crate::error::RenderError;

pub use channel::{RENDER_REQUEST_EVENT, Subscription, dispatch, subscribe};
pub use frames::{AnimationFrames, FrameCallback, FrameScheduler, ManualFrames, drive};

/// DOM ids of the two mount points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementIds {
	pub history: String,
	pub dependencies: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
	pub ids: ElementIds,
	/// Trace series, passed to the chart backend untouched.
	#[serde(default)]
	pub data: Vec<Value>,
	#[serde(default)]
	pub layout: Value,
	#[serde(default)]
	pub graph: GraphData,
}

/// Long-lived handler for [`RenderRequest`]s. Rendering happens on the frame
/// after a request arrives, when the host UI has created the mount elements.
pub struct RenderRequestListener<C, T, S>
where
	C: ChartBackend,
	T: SceneTarget,
	S: FrameScheduler,
{
	charts: Rc<C>,
	graphs: Rc<RefCell<GraphRenderer<T>>>,
	frames: S,
}

impl<C, T, S> RenderRequestListener<C, T, S>
where
	C: ChartBackend + 'static,
	T: SceneTarget + 'static,
	S: FrameScheduler,
{
	pub fn new(charts: C, graphs: Rc<RefCell<GraphRenderer<T>>>, frames: S) -> Self {
		Self {
			charts: Rc::new(charts),
			graphs,
			frames,
		}
	}

	pub fn graphs(&self) -> &Rc<RefCell<GraphRenderer<T>>> {
		&self.graphs
	}

	/// Schedules both renders for the next frame and returns immediately.
	pub fn handle(&self, request: RenderRequest) {
		debug!(
			"render request: history={} dependencies={}",
			request.ids.history, request.ids.dependencies
		);
		let (charts, graphs) = (Rc::clone(&self.charts), Rc::clone(&self.graphs));
		self.frames.request_frame(Box::new(move || {
			let history = &request.ids.history;
			match trace_chart::redraw(&*charts, history, &request.data, &request.layout) {
				Ok(()) => {}
				Err(RenderError::MissingTarget(_)) => {
					warn!("chart element `{}` not found, skipping", history)
				}
				Err(err) => error!("history chart `{}` not drawn: {}", history, err),
			}

			let selector = format!("#{}", request.ids.dependencies);
			if let Err(err) = graphs.borrow_mut().render_graph(&selector, &request.graph) {
				error!("dependency graph at {} not rendered: {}", selector, err);
			}
		}));
	}

	pub fn handle_json(&self, payload: &str) -> Result<(), RenderError> {
		let request: RenderRequest = serde_json::from_str(payload)?;
		self.handle(request);
		Ok(())
	}
}

/// Browser wiring: Plotly for the chart, SVG for the graph, animation frames
/// for scheduling. Subscribes to [`RENDER_REQUEST_EVENT`] and starts the
/// frame loop; both live as long as the page.
pub fn start() -> Result<(), RenderError> {
	let renderer = Rc::new(RefCell::new(GraphRenderer::new(
		SvgTarget::new()?,
		LayoutConfig::default(),
		Style::default(),
	)));
	let listener = Rc::new(RenderRequestListener::new(
		PlotlyBackend,
		renderer.clone(),
		AnimationFrames,
	));
	subscribe(listener)?.keep_alive();
	drive(AnimationFrames, renderer);
	info!("listening for `{}` events", RENDER_REQUEST_EVENT);
	Ok(())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::dependency_graph::render::tests::{RecordingTarget, chain};
	use crate::components::trace_chart::tests::RecordingCharts;

	type TestListener = RenderRequestListener<RecordingCharts, RecordingTarget, ManualFrames>;

	fn listener(charts: RecordingCharts, missing: &[&str]) -> (TestListener, ManualFrames) {
		let target = RecordingTarget {
			missing: missing.iter().map(|s| s.to_string()).collect(),
			..RecordingTarget::default()
		};
		let graphs = Rc::new(RefCell::new(GraphRenderer::new(
			target,
			LayoutConfig::default(),
			Style::default(),
		)));
		let frames = ManualFrames::default();
		(RenderRequestListener::new(charts, graphs, frames.clone()), frames)
	}

	fn request() -> RenderRequest {
		RenderRequest {
			ids: ElementIds {
				history: "history".into(),
				dependencies: "dependencies".into(),
			},
			data: vec![json!({"x": ["2020-01-01"], "y": [12], "type": "scatter"})],
			layout: json!({"title": "downloads"}),
			graph: chain(&["rand", "rand_core", "libc"]),
		}
	}

	#[test]
	fn rendering_waits_for_the_next_frame() {
		let (l, frames) = listener(RecordingCharts::with_elements(&["history"]), &[]);
		l.handle(request());

		assert!(l.charts.calls.borrow().is_empty());
		assert!(l.graphs().borrow().session("#dependencies").is_none());

		assert_eq!(frames.run_frame(), 1);
		assert_eq!(
			*l.charts.calls.borrow(),
			vec!["purge history", "plot history (1 traces)"]
		);
		let graphs = l.graphs().borrow();
		assert_eq!(graphs.session("#dependencies").unwrap().graph.len(), 3);
		assert_eq!(graphs.target().attached("#dependencies"), 1);
	}

	#[test]
	fn missing_chart_element_does_not_stop_the_graph() {
		let (l, frames) = listener(RecordingCharts::default(), &[]);
		l.handle(request());
		frames.run_frame();
		assert!(l.charts.calls.borrow().is_empty());
		assert!(l.graphs().borrow().session("#dependencies").is_some());
	}

	#[test]
	fn chart_library_failure_does_not_stop_the_graph() {
		let charts = RecordingCharts {
			fail_plots: true,
			..RecordingCharts::with_elements(&["history"])
		};
		let (l, frames) = listener(charts, &[]);
		l.handle(request());
		frames.run_frame();
		assert_eq!(*l.charts.calls.borrow(), vec!["purge history"]);
		assert!(l.graphs().borrow().session("#dependencies").is_some());
	}

	#[test]
	fn missing_graph_mount_is_logged_not_raised() {
		let (l, frames) = listener(RecordingCharts::with_elements(&["history"]), &["#dependencies"]);
		l.handle(request());
		frames.run_frame();
		assert_eq!(l.charts.calls.borrow().len(), 2);
		assert!(l.graphs().borrow().session("#dependencies").is_none());
	}

	#[test]
	fn repeated_requests_replace_the_graph() {
		let (l, frames) = listener(RecordingCharts::with_elements(&["history"]), &[]);
		l.handle(request());
		let mut second = request();
		second.graph = chain(&["serde", "serde_derive"]);
		l.handle(second);
		frames.run_frame();

		let graphs = l.graphs().borrow();
		assert_eq!(graphs.target().attached("#dependencies"), 1);
		assert_eq!(graphs.session("#dependencies").unwrap().graph.len(), 2);
	}

	#[test]
	fn json_payloads_are_parsed() {
		let (l, frames) = listener(RecordingCharts::with_elements(&["history"]), &[]);
		l.handle_json(
			r#"{
				"ids": {"history": "history", "dependencies": "dependencies"},
				"data": [],
				"layout": {},
				"graph": {
					"nodes": [{"name": "tokio"}, {"name": "mio"}],
					"links": [{"source": "tokio", "target": "mio"}]
				}
			}"#,
		)
		.unwrap();
		frames.run_frame();
		let graphs = l.graphs().borrow();
		assert_eq!(graphs.session("#dependencies").unwrap().graph.links().len(), 1);
	}

	#[test]
	fn malformed_payloads_are_rejected() {
		let (l, frames) = listener(RecordingCharts::default(), &[]);
		let err = l.handle_json(r#"{"graph": {}}"#).unwrap_err();
		assert!(matches!(err, RenderError::Payload(_)));
		assert_eq!(frames.pending(), 0);
	}
}
