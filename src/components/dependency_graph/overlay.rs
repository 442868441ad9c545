//! Hover overlay: per-node opacity and per-edge emphasis derived from the
//! hovered node. The reduced graph itself is never modified.

use std::collections::HashSet;

use super::types::{EdgeStyle, GraphEdge, GraphNode, ReducedGraph};

#[derive(Clone, Debug, PartialEq)]
pub struct OverlayConfig {
	pub dimmed_node_opacity: f64,
	pub highlight_stroke: String,
	pub highlight_stroke_width: f64,
	pub dimmed_stroke: String,
	pub dimmed_stroke_width: f64,
	pub dimmed_edge_opacity: f64,
}

impl Default for OverlayConfig {
	fn default() -> Self {
		Self {
			dimmed_node_opacity: 0.3,
			highlight_stroke: "#2196F3".into(),
			highlight_stroke_width: 3.0,
			dimmed_stroke: "#999".into(),
			dimmed_stroke_width: 1.0,
			dimmed_edge_opacity: 0.2,
		}
	}
}

/// How a node stands out under the current hover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
	/// Nothing is hovered.
	None,
	/// The hovered node.
	Focused,
	/// Directly connected to the hovered node.
	Neighbor,
	/// Hover is elsewhere.
	Dimmed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeOverlay {
	pub id: String,
	pub opacity: f64,
	pub emphasis: Emphasis,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeOverlay {
	pub id: String,
	pub style: EdgeStyle,
	pub animated: bool,
}

/// Styling laid over a reduced graph, parallel to its node and edge lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overlay {
	pub nodes: Vec<NodeOverlay>,
	pub edges: Vec<EdgeOverlay>,
}

impl Overlay {
	/// Copy of `graph` with the overlay merged into node and edge styles.
	pub fn apply(&self, graph: &ReducedGraph) -> ReducedGraph {
		debug_assert_eq!(self.nodes.len(), graph.nodes.len());
		debug_assert_eq!(self.edges.len(), graph.edges.len());
		let nodes = graph
			.nodes
			.iter()
			.zip(&self.nodes)
			.map(|(node, overlay)| {
				let mut node = node.clone();
				node.style.opacity = overlay.opacity;
				node
			})
			.collect();
		let edges = graph
			.edges
			.iter()
			.zip(&self.edges)
			.map(|(edge, overlay)| GraphEdge {
				style: overlay.style.clone(),
				animated: overlay.animated,
				..edge.clone()
			})
			.collect();
		ReducedGraph { nodes, edges }
	}

	pub fn node(&self, id: &str) -> Option<&NodeOverlay> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn edge(&self, id: &str) -> Option<&EdgeOverlay> {
		self.edges.iter().find(|e| e.id == id)
	}
}

/// The node itself and every node sharing an edge with it, in either direction.
pub fn neighborhood<'a>(edges: &'a [GraphEdge], id: &'a str) -> HashSet<&'a str> {
	let mut set = HashSet::from([id]);
	for edge in edges {
		if edge.source == id {
			set.insert(edge.target.as_str());
		}
		if edge.target == id {
			set.insert(edge.source.as_str());
		}
	}
	set
}

pub fn derive_overlay(
	nodes: &[GraphNode],
	edges: &[GraphEdge],
	hovered: Option<&str>,
	config: &OverlayConfig,
) -> Overlay {
	let Some(hovered) = hovered else {
		return Overlay {
			nodes: nodes
				.iter()
				.map(|n| NodeOverlay {
					id: n.id.clone(),
					opacity: 1.0,
					emphasis: Emphasis::None,
				})
				.collect(),
			edges: edges
				.iter()
				.map(|e| EdgeOverlay {
					id: e.id.clone(),
					style: e.style.clone(),
					animated: false,
				})
				.collect(),
		};
	};

	let near = neighborhood(edges, hovered);
	let nodes = nodes
		.iter()
		.map(|n| {
			let emphasis = if n.id == hovered {
				Emphasis::Focused
			} else if near.contains(n.id.as_str()) {
				Emphasis::Neighbor
			} else {
				Emphasis::Dimmed
			};
			let opacity = if emphasis == Emphasis::Dimmed {
				config.dimmed_node_opacity
			} else {
				1.0
			};
			NodeOverlay {
				id: n.id.clone(),
				opacity,
				emphasis,
			}
		})
		.collect();

	let edges = edges
		.iter()
		.map(|e| {
			let touching = e.touches(hovered);
			let style = if touching {
				EdgeStyle {
					stroke: Some(config.highlight_stroke.clone()),
					stroke_width: Some(config.highlight_stroke_width),
					opacity: 1.0,
				}
			} else {
				EdgeStyle {
					stroke: Some(config.dimmed_stroke.clone()),
					stroke_width: Some(config.dimmed_stroke_width),
					opacity: config.dimmed_edge_opacity,
				}
			};
			EdgeOverlay {
				id: e.id.clone(),
				style,
				animated: touching,
			}
		})
		.collect();

	log::debug!("overlay derived for hovered node {hovered:?}");
	Overlay { nodes, edges }
}
