use leptos::prelude::*;
use log::error;
use serde_json::{Value, json};

use crate::components::dependency_graph::{Graph, GraphData, GraphLink, GraphNode, Style};
use crate::listener::{ElementIds, RenderRequest, dispatch};

const HISTORY_ID: &str = "history";
const DEPENDENCIES_ID: &str = "dependencies";

/// Generate a sample dependency tree: every crate depends on one earlier crate.
fn sample_graph(n: usize) -> GraphData {
	let nodes = (0..n)
		.map(|i| GraphNode::named(format!("crate-{} - 0.{}.0", i, i % 7)))
		.collect();

	let links = (1..n)
		.map(|i| {
			let dependent = (rand_simple(i) * (i as f64)) as usize;
			GraphLink::between(dependent, i)
		})
		.collect();

	GraphData { nodes, links }
}

/// Thirty days of made-up download counts.
fn sample_traces() -> Vec<Value> {
	let (days, downloads): (Vec<String>, Vec<u64>) = (1..=30)
		.map(|d| {
			(
				format!("2020-01-{:02}", d),
				(rand_simple(d) * 5000.0) as u64 + 1000,
			)
		})
		.unzip();
	vec![json!({ "x": days, "y": downloads, "type": "scatter", "name": "downloads" })]
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph = sample_graph(24);
	let dot = Graph::from_data(&graph, Style::default().center())
		.map(|g| g.to_dot())
		.unwrap_or_default();

	// The listener defers drawing to the next frame, by which time both
	// mount points below exist.
	Effect::new(move |_| {
		let request = RenderRequest {
			ids: ElementIds {
				history: HISTORY_ID.into(),
				dependencies: DEPENDENCIES_ID.into(),
			},
			data: sample_traces(),
			layout: json!({ "title": "Downloads per day" }),
			graph: graph.clone(),
		};
		if let Err(err) = dispatch(&request) {
			error!("could not send render request: {}", err);
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="crate-stats">
				<h1>"cratestats"</h1>
				<h2>"Downloads"</h2>
				<div id=HISTORY_ID class="plot-space"></div>
				<h2>"Dependencies"</h2>
				<p class="subtitle">"Drag nodes to reposition. Click a node to pin it."</p>
				<div id=DEPENDENCIES_ID class="graph-space"></div>
				<details>
					<summary>"DOT source"</summary>
					<pre>{dot}</pre>
				</details>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_graph_is_a_tree() {
		let data = sample_graph(24);
		assert_eq!(data.nodes.len(), 24);
		assert_eq!(data.links.len(), 23);
		let graph = Graph::from_data(&data, Style::default().center()).unwrap();
		assert!(graph.links().iter().all(|l| l.source.index() < l.target.index()));
	}

	#[test]
	fn sample_traces_cover_a_month() {
		let traces = sample_traces();
		assert_eq!(traces[0]["x"].as_array().unwrap().len(), 30);
	}
}
