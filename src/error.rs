//! Error types shared by the renderers and the request listener.

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::components::dependency_graph::GraphError;

/// Everything that can go wrong while handling a render request.
#[derive(Debug, Error)]
pub enum RenderError {
	/// The requested mount element is not in the document.
	#[error("mount target `{0}` not found")]
	MissingTarget(String),

	/// Links reference nodes that are not part of the graph.
	#[error("malformed graph: {0}")]
	MalformedGraph(#[from] GraphError),

	/// The browser or a delegated JS library rejected a call.
	#[error("library failure: {0}")]
	Library(String),

	/// The inbound payload did not match the request schema.
	#[error("invalid render request: {0}")]
	Payload(#[from] serde_json::Error),

	/// No `window`/`document` is available (not running in a browser).
	#[error("browser window unavailable")]
	NoWindow,
}

impl RenderError {
	pub(crate) fn from_js(err: JsValue) -> Self {
		Self::Library(
			err.as_string()
				.unwrap_or_else(|| format!("{:?}", err)),
		)
	}
}
