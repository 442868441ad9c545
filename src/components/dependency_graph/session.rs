//! Interaction session: active view, hover state and the derived graph and
//! overlay for both.
//!
//! The laid-out graph is recomputed only when the active view changes; hover
//! events only recompute the overlay.

use super::layout::{LayoutConfig, layout_graph};
use super::model::DependencyModel;
use super::overlay::{Overlay, OverlayConfig, derive_overlay};
use super::reduce::reduce_view;
use super::types::{ComponentId, ReducedGraph, View};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HoverState {
	#[default]
	Idle,
	Hovering(ComponentId),
}

impl HoverState {
	pub fn hovered(&self) -> Option<&str> {
		match self {
			HoverState::Idle => None,
			HoverState::Hovering(id) => Some(id),
		}
	}

	/// Pointer entered `id`. Moves straight from one node to another without
	/// passing through `Idle`. Returns whether the state changed.
	pub fn enter(&mut self, id: &str) -> bool {
		if self.hovered() == Some(id) {
			return false;
		}
		*self = HoverState::Hovering(id.to_string());
		true
	}

	/// Pointer left `id`. Leaving a node other than the hovered one is ignored.
	pub fn leave(&mut self, id: &str) -> bool {
		if self.hovered() != Some(id) {
			return false;
		}
		*self = HoverState::Idle;
		true
	}
}

type ActivateHook = Box<dyn Fn(&str)>;

/// Owns a dependency model and everything derived from it for display: the
/// active view, its laid-out graph, the hover state and its overlay.
pub struct GraphSession {
	model: DependencyModel,
	layout_config: LayoutConfig,
	overlay_config: OverlayConfig,
	active_view: View,
	hover: HoverState,
	graph: ReducedGraph,
	overlay: Overlay,
	on_activate: Option<ActivateHook>,
}

impl GraphSession {
	/// Start on the current view with nothing hovered. Layout settings come
	/// from the model document.
	pub fn new(model: DependencyModel) -> Self {
		let layout_config = model.layout.clone();
		let mut session = Self {
			model,
			layout_config,
			overlay_config: OverlayConfig::default(),
			active_view: View::default(),
			hover: HoverState::Idle,
			graph: ReducedGraph::default(),
			overlay: Overlay::default(),
			on_activate: None,
		};
		session.rebuild();
		session
	}

	/// Replace the layout settings and lay the active view out again.
	pub fn with_layout_config(mut self, config: LayoutConfig) -> Self {
		self.layout_config = config;
		self.rebuild();
		self
	}

	/// Replace the hover styling.
	pub fn with_overlay_config(mut self, config: OverlayConfig) -> Self {
		self.overlay_config = config;
		self.refresh_overlay();
		self
	}

	/// Hook invoked with the node id when a node is activated (clicked).
	pub fn on_node_activate(mut self, hook: impl Fn(&str) + 'static) -> Self {
		self.on_activate = Some(Box::new(hook));
		self
	}

	/// View currently shown.
	pub fn active_view(&self) -> View {
		self.active_view
	}

	/// Id of the hovered node.
	pub fn hovered(&self) -> Option<&str> {
		self.hover.hovered()
	}

	/// Layout settings in effect.
	pub fn layout_config(&self) -> &LayoutConfig {
		&self.layout_config
	}

	/// Laid-out graph of the active view, without hover styling.
	pub fn graph(&self) -> &ReducedGraph {
		&self.graph
	}

	/// Hover styling for the active view.
	pub fn overlay(&self) -> &Overlay {
		&self.overlay
	}

	/// What the canvas paints: the laid-out graph with the overlay applied.
	pub fn scene(&self) -> ReducedGraph {
		self.overlay.apply(&self.graph)
	}

	/// Switch views. An empty selection, or the view already shown, is a no-op.
	/// A real switch clears the hover. Returns whether the view changed.
	pub fn set_view(&mut self, next: Option<View>) -> bool {
		let Some(next) = next else {
			log::warn!("ignoring empty view selection, keeping {:?}", self.active_view);
			return false;
		};
		if next == self.active_view {
			return false;
		}
		log::debug!("switching view {:?} -> {:?}", self.active_view, next);
		self.active_view = next;
		self.hover = HoverState::Idle;
		self.rebuild();
		true
	}

	/// Pointer entered a node. Unknown ids are ignored. Returns whether the
	/// hover changed.
	pub fn pointer_enter(&mut self, id: &str) -> bool {
		if !self.graph.contains(id) {
			log::warn!("pointer entered unknown node {id:?}");
			return false;
		}
		let changed = self.hover.enter(id);
		if changed {
			self.refresh_overlay();
		}
		changed
	}

	/// Pointer left a node. Returns whether the hover changed.
	pub fn pointer_leave(&mut self, id: &str) -> bool {
		let changed = self.hover.leave(id);
		if changed {
			self.refresh_overlay();
		}
		changed
	}

	/// Forward a node activation to the hook, if one is set and the node is
	/// part of the active view.
	pub fn activate(&self, id: &str) -> bool {
		if !self.graph.contains(id) {
			return false;
		}
		match &self.on_activate {
			Some(hook) => {
				hook(id);
				true
			}
			None => false,
		}
	}

	fn rebuild(&mut self) {
		let reduced = reduce_view(&self.model, self.active_view);
		self.graph = layout_graph(reduced, &self.layout_config);
		self.refresh_overlay();
	}

	fn refresh_overlay(&mut self) {
		self.overlay = derive_overlay(
			&self.graph.nodes,
			&self.graph.edges,
			self.hover.hovered(),
			&self.overlay_config,
		);
	}
}
