//! Download-history chart, drawn by an external charting library.

mod plotly;

use log::debug;
use serde_json::Value;

use crate::error::RenderError;

pub use plotly::PlotlyBackend;

/// The part of a charting library the listener needs.
pub trait ChartBackend {
	fn has_element(&self, element_id: &str) -> bool;

	/// Tears down whatever chart owns `element_id`.
	fn purge(&self, element_id: &str) -> Result<(), RenderError>;

	fn new_plot(&self, element_id: &str, traces: &[Value], layout: &Value)
	-> Result<(), RenderError>;
}

/// Clears `element_id` and draws `traces` there. A missing element leaves
/// the library untouched; nothing is retried.
pub fn redraw<C: ChartBackend + ?Sized>(
	charts: &C,
	element_id: &str,
	traces: &[Value],
	layout: &Value,
) -> Result<(), RenderError> {
	if !charts.has_element(element_id) {
		return Err(RenderError::MissingTarget(element_id.to_owned()));
	}
	charts.purge(element_id)?;
	charts.new_plot(element_id, traces, layout)?;
	debug!("plotted {} traces in `{}`", traces.len(), element_id);
	Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
	use std::cell::RefCell;

	use serde_json::json;

	use super::*;

	/// Records calls; knows a fixed set of element ids.
	#[derive(Default)]
	pub(crate) struct RecordingCharts {
		pub(crate) elements: Vec<String>,
		pub(crate) calls: RefCell<Vec<String>>,
		pub(crate) fail_plots: bool,
	}

	impl RecordingCharts {
		pub(crate) fn with_elements(ids: &[&str]) -> Self {
			Self {
				elements: ids.iter().map(|s| s.to_string()).collect(),
				..Self::default()
			}
		}
	}

	impl ChartBackend for RecordingCharts {
		fn has_element(&self, element_id: &str) -> bool {
			self.elements.iter().any(|e| e == element_id)
		}

		fn purge(&self, element_id: &str) -> Result<(), RenderError> {
			self.calls.borrow_mut().push(format!("purge {}", element_id));
			Ok(())
		}

		fn new_plot(
			&self,
			element_id: &str,
			traces: &[Value],
			_layout: &Value,
		) -> Result<(), RenderError> {
			if self.fail_plots {
				return Err(RenderError::Library("Plotly is not defined".into()));
			}
			self.calls
				.borrow_mut()
				.push(format!("plot {} ({} traces)", element_id, traces.len()));
			Ok(())
		}
	}

	#[test]
	fn purges_before_plotting() {
		let charts = RecordingCharts::with_elements(&["history"]);
		redraw(&charts, "history", &[json!({"x": [1], "y": [2]})], &json!({})).unwrap();
		assert_eq!(
			*charts.calls.borrow(),
			vec!["purge history", "plot history (1 traces)"]
		);
	}

	#[test]
	fn missing_element_is_skipped() {
		let charts = RecordingCharts::default();
		let err = redraw(&charts, "history", &[], &json!({})).unwrap_err();
		assert!(matches!(err, RenderError::MissingTarget(_)));
		assert!(charts.calls.borrow().is_empty());
	}

	#[test]
	fn library_failure_is_surfaced_once() {
		let charts = RecordingCharts {
			fail_plots: true,
			..RecordingCharts::with_elements(&["history"])
		};
		let err = redraw(&charts, "history", &[], &json!(null)).unwrap_err();
		assert!(matches!(err, RenderError::Library(_)));
		assert_eq!(*charts.calls.borrow(), vec!["purge history"]);
	}
}
