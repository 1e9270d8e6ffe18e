//! Force-directed dependency graph rendered into an SVG surface.

pub mod geometry;
pub mod graph;
pub mod layout;
pub(crate) mod render;
mod scene;
mod state;
mod svg;
mod types;

pub use graph::{Graph, GraphError, Link, Node, NodeId};
pub use layout::{Axis, Layout, LayoutConfig, LinkLengths};
pub use render::{GraphRenderer, PointerInput, PointerKind, SceneTarget};
pub use scene::{EdgeMark, NodeMark, Scene, Style};
pub use state::{DragState, RenderSession};
pub use svg::SvgTarget;
pub use types::{GraphData, GraphLink, GraphNode, NodeRef};
