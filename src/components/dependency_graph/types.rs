//! Render-ready node and edge descriptors handed to the canvas.

use serde::Deserialize;

/// Identifier of a component (node) in the dependency model.
pub type ComponentId = String;

/// Marker painted at the end of every edge.
pub const ARROW_MARKER: &str = "arrow";

/// One of the two edge collections the diagram can show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
	/// Topology as it exists today.
	#[default]
	Current,
	/// Planned topology.
	Future,
}

impl View {
	/// Both views, in toggle order.
	pub const ALL: [View; 2] = [View::Current, View::Future];

	/// Button caption for the view toggle.
	pub fn label(self) -> &'static str {
		match self {
			View::Current => "Current State",
			View::Future => "Future State",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Side of a node box an edge attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachSide {
	Top,
	Bottom,
	Left,
	Right,
}

/// Visual style of a node box.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub background: String,
	pub color: String,
	pub border: String,
	/// Clickable nodes show a pointer cursor; only nodes with a known category are.
	pub pointer: bool,
	pub font_size: f64,
	pub padding: f64,
	pub opacity: f64,
}

impl NodeStyle {
	pub const FONT_SIZE: f64 = 12.0;
	pub const PADDING: f64 = 8.0;

	/// Style used when a node's category has no entry in the style catalog.
	pub fn fallback() -> Self {
		Self {
			background: "#ffffff".into(),
			color: "#222222".into(),
			border: "#1a192b".into(),
			pointer: false,
			font_size: Self::FONT_SIZE,
			padding: Self::PADDING,
			opacity: 1.0,
		}
	}
}

impl Default for NodeStyle {
	fn default() -> Self {
		Self::fallback()
	}
}

/// Visual style of an edge. Unset stroke fields use the canvas defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub stroke: Option<String>,
	pub stroke_width: Option<f64>,
	pub opacity: f64,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			stroke: None,
			stroke_width: None,
			opacity: 1.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: ComponentId,
	pub label: String,
	pub category: Option<String>,
	pub style: NodeStyle,
	/// Top-left corner of the node box.
	pub position: Point,
	pub target_side: AttachSide,
	pub source_side: AttachSide,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub id: String,
	pub source: ComponentId,
	pub target: ComponentId,
	pub style: EdgeStyle,
	pub animated: bool,
	pub marker_end: &'static str,
}

impl GraphEdge {
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}
}

/// Nodes participating in at least one edge of a view, plus that view's edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReducedGraph {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl ReducedGraph {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edge_touches_either_endpoint() {
		let edge = GraphEdge {
			id: "edge-0".into(),
			source: "a".into(),
			target: "b".into(),
			style: EdgeStyle::default(),
			animated: false,
			marker_end: ARROW_MARKER,
		};
		assert!(edge.touches("a"));
		assert!(edge.touches("b"));
		assert!(!edge.touches("c"));
	}

	#[test]
	fn fallback_is_plain_white_box() {
		let style = NodeStyle::fallback();
		assert_eq!(style.background, "#ffffff");
		assert_eq!(style.border, "#1a192b");
		assert_eq!(style.color, "#222222");
		assert!(!style.pointer);
		assert_eq!(style, NodeStyle::default());
	}

	#[test]
	fn view_deserializes_lowercase() {
		let view: View = serde_json::from_str("\"future\"").unwrap();
		assert_eq!(view, View::Future);
		assert_eq!(View::default(), View::Current);
	}
}
