//! Static dependency model: component catalog, per-view edge lists and
//! category styles.

use std::collections::HashMap;

use serde::Deserialize;

use super::error::{ModelError, Result};
use super::layout::LayoutConfig;
use super::types::{ComponentId, View};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Component {
	pub category: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Dependency {
	pub source: ComponentId,
	pub target: ComponentId,
}

impl Dependency {
	pub fn new(source: impl Into<ComponentId>, target: impl Into<ComponentId>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EdgeLists {
	#[serde(default)]
	pub current: Vec<Dependency>,
	#[serde(default)]
	pub future: Vec<Dependency>,
}

/// Colors for every node of one category.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CategoryStyle {
	pub background: Option<String>,
	pub color: Option<String>,
	pub border: Option<String>,
}

/// The document behind both views: which components exist, what they
/// depend on today and after the planned migration, and how each category
/// is painted.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyModel {
	/// Component catalog keyed by id.
	#[serde(default)]
	pub nodes: HashMap<ComponentId, Component>,
	/// Dependency edges of each view.
	#[serde(default)]
	pub edges: EdgeLists,
	/// Styles keyed by category name.
	#[serde(default)]
	pub category_styles: HashMap<String, CategoryStyle>,
	/// Optional overrides for the layered layout.
	#[serde(default)]
	pub layout: LayoutConfig,
}

impl DependencyModel {
	/// Parse a model document and reject edges with empty endpoints.
	pub fn from_json(src: &str) -> Result<Self> {
		let model: DependencyModel = serde_json::from_str(src)?;
		for view in View::ALL {
			let empty = model
				.edges(view)
				.iter()
				.position(|e| e.source.is_empty() || e.target.is_empty());
			if let Some(index) = empty {
				return Err(ModelError::EmptyId { view, index });
			}
		}
		log::debug!(
			"loaded dependency model: {} components, {} current edges, {} future edges",
			model.nodes.len(),
			model.edges.current.len(),
			model.edges.future.len()
		);
		Ok(model)
	}

	/// Edge list of one view, in document order.
	pub fn edges(&self, view: View) -> &[Dependency] {
		match view {
			View::Current => &self.edges.current,
			View::Future => &self.edges.future,
		}
	}

	/// Category of a catalogued component.
	pub fn category_of(&self, id: &str) -> Option<&str> {
		self.nodes.get(id).map(|c| c.category.as_str())
	}

	/// Style of the component's category, if both are known.
	pub fn style_of(&self, id: &str) -> Option<&CategoryStyle> {
		self.category_of(id)
			.and_then(|category| self.category_styles.get(category))
	}

	/// Add a component to the catalog, replacing any previous category.
	pub fn with_component(mut self, id: impl Into<ComponentId>, category: impl Into<String>) -> Self {
		self.nodes.insert(
			id.into(),
			Component {
				category: category.into(),
			},
		);
		self
	}

	/// Append a dependency to one view's edge list.
	pub fn with_edge(mut self, view: View, source: &str, target: &str) -> Self {
		let list = match view {
			View::Current => &mut self.edges.current,
			View::Future => &mut self.edges.future,
		};
		list.push(Dependency::new(source, target));
		self
	}

	/// Register the style of a category.
	pub fn with_style(mut self, category: impl Into<String>, style: CategoryStyle) -> Self {
		self.category_styles.insert(category.into(), style);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::dependency_graph::layout::Direction;

	const DOC: &str = r##"{
		"nodes": {
			"core": { "category": "core" },
			"us": { "category": "country" }
		},
		"edges": {
			"current": [{ "source": "core", "target": "us" }],
			"future": []
		},
		"categoryStyles": {
			"core": { "background": "#2C6496", "color": "#FFFFFF", "border": "#17354F" }
		}
	}"##;

	#[test]
	fn parses_document() {
		let model = DependencyModel::from_json(DOC).unwrap();
		assert_eq!(model.edges(View::Current), &[Dependency::new("core", "us")]);
		assert!(model.edges(View::Future).is_empty());
		assert_eq!(model.category_of("us"), Some("country"));
		assert_eq!(
			model.style_of("core").and_then(|s| s.background.as_deref()),
			Some("#2C6496")
		);
		assert_eq!(model.layout, LayoutConfig::default());
	}

	#[test]
	fn unknown_style_lookup_is_none() {
		let model = DependencyModel::from_json(DOC).unwrap();
		assert_eq!(model.style_of("us"), None);
		assert_eq!(model.style_of("missing"), None);
	}

	#[test]
	fn layout_overrides_are_read() {
		let doc = r#"{ "layout": { "direction": "LR", "rankGap": 120.0, "nodeWidth": 150.0 } }"#;
		let model = DependencyModel::from_json(doc).unwrap();
		assert_eq!(model.layout.direction, Direction::LeftToRight);
		assert_eq!(model.layout.rank_gap, 120.0);
		assert_eq!(model.layout.node_width, 150.0);
		assert_eq!(model.layout.node_height, LayoutConfig::default().node_height);
	}

	#[test]
	fn layout_keys_share_document_casing() {
		let doc = r#"{ "categoryStyles": {}, "layout": { "rank_gap": 120.0, "maxSweeps": 4 } }"#;
		let model = DependencyModel::from_json(doc).unwrap();
		assert_eq!(model.layout.rank_gap, LayoutConfig::default().rank_gap);
		assert_eq!(model.layout.max_sweeps, 4);
	}

	#[test]
	fn deprecated_markers_are_ignored() {
		let doc = r#"{
			"nodes": { "old": { "category": "api", "deprecated": true } },
			"edges": { "current": [{ "source": "old", "target": "new", "deprecated": true }] }
		}"#;
		let model = DependencyModel::from_json(doc).unwrap();
		assert_eq!(model.category_of("old"), Some("api"));
		assert_eq!(model.edges(View::Current), &[Dependency::new("old", "new")]);
	}

	#[test]
	fn rejects_empty_endpoint() {
		let doc = r#"{ "edges": { "future": [{ "source": "a", "target": "b" }, { "source": "", "target": "b" }] } }"#;
		let err = DependencyModel::from_json(doc).unwrap_err();
		assert!(matches!(
			err,
			ModelError::EmptyId {
				view: View::Future,
				index: 1
			}
		));
	}

	#[test]
	fn rejects_malformed_json() {
		let err = DependencyModel::from_json("{ \"edges\": 3 }").unwrap_err();
		assert!(matches!(err, ModelError::Parse(_)));
		assert!(err.to_string().starts_with("invalid dependency model"));
	}
}
