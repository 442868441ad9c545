//! Reduce an edge list to the nodes that take part in it.

use indexmap::IndexSet;

use super::model::{CategoryStyle, Dependency, DependencyModel};
use super::types::{
	ARROW_MARKER, AttachSide, EdgeStyle, GraphEdge, GraphNode, NodeStyle, Point, ReducedGraph, View,
};

/// Build the reduced graph for one view of the model.
pub fn reduce_view(model: &DependencyModel, view: View) -> ReducedGraph {
	reduce(model.edges(view), model)
}

/// Collect every identifier named by `edges`, style it from the catalog and
/// number the edges by position.
///
/// Identifiers missing from the catalog, or whose category has no style, get
/// [`NodeStyle::fallback`]. Parallel edges are kept.
pub fn reduce(edges: &[Dependency], model: &DependencyModel) -> ReducedGraph {
	let ids: IndexSet<&str> = edges
		.iter()
		.flat_map(|e| [e.source.as_str(), e.target.as_str()])
		.collect();

	let nodes = ids
		.into_iter()
		.map(|id| {
			let style = match model.style_of(id) {
				Some(style) => node_style(style),
				None => {
					log::warn!("no style for component {id:?}, using fallback");
					NodeStyle::fallback()
				}
			};
			GraphNode {
				id: id.to_string(),
				label: id.to_string(),
				category: model.category_of(id).map(str::to_string),
				style,
				position: Point::ORIGIN,
				target_side: AttachSide::Top,
				source_side: AttachSide::Bottom,
			}
		})
		.collect::<Vec<_>>();

	let edges = edges
		.iter()
		.enumerate()
		.map(|(idx, e)| GraphEdge {
			id: format!("edge-{idx}"),
			source: e.source.clone(),
			target: e.target.clone(),
			style: EdgeStyle::default(),
			animated: false,
			marker_end: ARROW_MARKER,
		})
		.collect::<Vec<_>>();

	log::debug!("reduced graph: {} nodes, {} edges", nodes.len(), edges.len());
	ReducedGraph { nodes, edges }
}

fn node_style(category: &CategoryStyle) -> NodeStyle {
	let fallback = NodeStyle::fallback();
	NodeStyle {
		background: category.background.clone().unwrap_or(fallback.background),
		color: category.color.clone().unwrap_or(fallback.color),
		border: category.border.clone().unwrap_or(fallback.border),
		pointer: true,
		..fallback
	}
}
