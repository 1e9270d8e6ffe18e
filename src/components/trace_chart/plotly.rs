use js_sys::{Function, JSON, Reflect};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};

use super::ChartBackend;
use crate::error::RenderError;

/// Calls the page-global `Plotly` object.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlotlyBackend;

impl PlotlyBackend {
	fn plotly(&self) -> Result<JsValue, RenderError> {
		let window = web_sys::window().ok_or(RenderError::NoWindow)?;
		let plotly = Reflect::get(&window, &JsValue::from_str("Plotly")).map_err(RenderError::from_js)?;
		if plotly.is_undefined() {
			return Err(RenderError::Library("Plotly is not loaded".into()));
		}
		Ok(plotly)
	}

	fn method(&self, plotly: &JsValue, name: &str) -> Result<Function, RenderError> {
		Reflect::get(plotly, &JsValue::from_str(name))
			.map_err(RenderError::from_js)?
			.dyn_into::<Function>()
			.map_err(|_| RenderError::Library(format!("Plotly.{} is not a function", name)))
	}
}

/// Hands a serde value to JS by round-tripping through `JSON.parse`.
fn to_js(value: &impl serde::Serialize) -> Result<JsValue, RenderError> {
	let text = serde_json::to_string(value)?;
	JSON::parse(&text).map_err(RenderError::from_js)
}

impl ChartBackend for PlotlyBackend {
	fn has_element(&self, element_id: &str) -> bool {
		web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(element_id))
			.is_some()
	}

	fn purge(&self, element_id: &str) -> Result<(), RenderError> {
		let plotly = self.plotly()?;
		self.method(&plotly, "purge")?
			.call1(&plotly, &JsValue::from_str(element_id))
			.map_err(RenderError::from_js)?;
		Ok(())
	}

	fn new_plot(&self, element_id: &str, traces: &[Value], layout: &Value) -> Result<(), RenderError> {
		let plotly = self.plotly()?;
		self.method(&plotly, "newPlot")?
			.call3(
				&plotly,
				&JsValue::from_str(element_id),
				&to_js(&traces)?,
				&to_js(layout)?,
			)
			.map_err(RenderError::from_js)?;
		Ok(())
	}
}
