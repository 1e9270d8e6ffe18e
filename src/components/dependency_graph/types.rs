use std::fmt;

use serde::{Deserialize, Serialize};

/// Points at a node of a [`GraphData`] payload, by position in `nodes` or by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
	Index(usize),
	Name(String),
}

impl fmt::Display for NodeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeRef::Index(i) => write!(f, "#{}", i),
			NodeRef::Name(name) => write!(f, "`{}`", name),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	#[serde(default)]
	pub fixed: bool,
}

impl GraphNode {
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			x: None,
			y: None,
			fixed: false,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	pub source: NodeRef,
	pub target: NodeRef,
}

impl GraphLink {
	pub fn between(source: usize, target: usize) -> Self {
		Self {
			source: NodeRef::Index(source),
			target: NodeRef::Index(target),
		}
	}
}

/// Graph description as it arrives on the wire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
}
