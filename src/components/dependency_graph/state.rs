use super::layout::bounds;
use super::session::GraphSession;
use super::types::{Point, ReducedGraph, View};

pub const MIN_ZOOM: f64 = 0.3;
pub const MAX_ZOOM: f64 = 2.0;
pub const DEFAULT_ZOOM: f64 = 0.8;
/// Pointer travel (screen pixels) after which a press counts as a pan, not a click.
const CLICK_SLOP: f64 = 3.0;
/// Zoom step of the on-canvas controls.
const ZOOM_STEP: f64 = 1.2;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: DEFAULT_ZOOM,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct FitViewOptions {
	/// Fraction of the content size kept free around it.
	pub padding: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
}

impl Default for FitViewOptions {
	fn default() -> Self {
		Self {
			padding: 0.2,
			min_zoom: 0.5,
			max_zoom: 1.5,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

pub struct CanvasState {
	pub session: GraphSession,
	/// Overlay-styled graph, refreshed whenever hover or view changes.
	pub scene: ReducedGraph,
	pub transform: ViewTransform,
	pub fit: FitViewOptions,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl CanvasState {
	pub fn new(session: GraphSession, width: f64, height: f64) -> Self {
		let scene = session.scene();
		let mut state = Self {
			session,
			scene,
			transform: ViewTransform::default(),
			fit: FitViewOptions::default(),
			pan: PanState::default(),
			width,
			height,
			flow_time: 0.0,
		};
		state.fit_view();
		state
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node whose box contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<&str> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let config = self.session.layout_config();
		self.scene
			.nodes
			.iter()
			.rev()
			.find(|n| {
				let Point { x, y } = n.position;
				gx >= x && gx <= x + config.node_width && gy >= y && gy <= y + config.node_height
			})
			.map(|n| n.id.as_str())
	}

	/// CSS cursor for the screen point: `pointer` over an activatable node.
	pub fn cursor_at(&self, sx: f64, sy: f64) -> &'static str {
		let pointer = self
			.node_at_position(sx, sy)
			.and_then(|id| self.scene.node(id))
			.is_some_and(|n| n.style.pointer);
		if pointer { "pointer" } else { "grab" }
	}

	/// Translate pointer motion into enter/leave events. Returns whether the
	/// hover changed.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> bool {
		let hit = self.node_at_position(sx, sy).map(str::to_string);
		let current = self.session.hovered().map(str::to_string);
		let changed = match (current, hit) {
			(current, Some(id)) if current.as_deref() != Some(id.as_str()) => {
				self.session.pointer_enter(&id)
			}
			(Some(id), None) => self.session.pointer_leave(&id),
			_ => false,
		};
		if changed {
			self.refresh_scene();
		}
		changed
	}

	/// Pointer left the canvas entirely.
	pub fn pointer_out(&mut self) {
		self.pan.active = false;
		if let Some(id) = self.session.hovered().map(str::to_string) {
			if self.session.pointer_leave(&id) {
				self.refresh_scene();
			}
		}
	}

	/// Activate the node under the pointer, unless the press ended a pan.
	pub fn click(&mut self, sx: f64, sy: f64) -> bool {
		if std::mem::take(&mut self.pan.moved) {
			return false;
		}
		match self.node_at_position(sx, sy).map(str::to_string) {
			Some(id) => self.session.activate(&id),
			None => false,
		}
	}

	pub fn set_view(&mut self, next: Option<View>) -> bool {
		let changed = self.session.set_view(next);
		if changed {
			self.refresh_scene();
			self.fit_view();
		}
		changed
	}

	pub fn start_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn drag_pan(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
		if dx.abs() > CLICK_SLOP || dy.abs() > CLICK_SLOP {
			self.pan.moved = true;
		}
		if !self.pan.moved {
			return;
		}
		self.transform.x = self.pan.transform_start_x + dx;
		self.transform.y = self.pan.transform_start_y + dy;
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Wheel zoom around a screen point.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.zoom_about(sx, sy, factor);
	}

	pub fn zoom_in(&mut self) {
		self.zoom_about(self.width / 2.0, self.height / 2.0, ZOOM_STEP);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_about(self.width / 2.0, self.height / 2.0, 1.0 / ZOOM_STEP);
	}

	/// Scale by `factor` keeping the screen point fixed, clamped to
	/// [`MIN_ZOOM`, `MAX_ZOOM`].
	fn zoom_about(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Center the scene and zoom so it fits with padding.
	pub fn fit_view(&mut self) {
		let Some((min, max)) = bounds(&self.scene.nodes, self.session.layout_config()) else {
			self.transform = ViewTransform::default();
			return;
		};
		let pad = 1.0 + self.fit.padding;
		let (w, h) = ((max.x - min.x) * pad, (max.y - min.y) * pad);
		let k = (self.width / w)
			.min(self.height / h)
			.clamp(self.fit.min_zoom, self.fit.max_zoom);
		let (cx, cy) = ((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn refresh_scene(&mut self) {
		self.scene = self.session.scene();
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;
	use crate::components::dependency_graph::model::DependencyModel;

	fn state() -> CanvasState {
		let model = DependencyModel::default()
			.with_edge(View::Current, "a", "b")
			.with_edge(View::Future, "a", "b")
			.with_edge(View::Future, "b", "c");
		CanvasState::new(GraphSession::new(model), 800.0, 600.0)
	}

	/// Screen coordinates of a node's center.
	fn center_of(state: &CanvasState, id: &str) -> (f64, f64) {
		let node = state.scene.nodes.iter().find(|n| n.id == id).unwrap();
		let t = &state.transform;
		(
			(node.position.x + 90.0) * t.k + t.x,
			(node.position.y + 20.0) * t.k + t.y,
		)
	}

	#[test]
	fn fit_view_centers_content() {
		let s = state();
		let (ax, _) = center_of(&s, "a");
		assert!((ax - 400.0).abs() < 1e-6);
		assert!(s.transform.k >= 0.5 && s.transform.k <= 1.5);
	}

	#[test]
	fn hit_test_finds_node() {
		let s = state();
		let (x, y) = center_of(&s, "b");
		assert_eq!(s.node_at_position(x, y), Some("b"));
		assert_eq!(s.node_at_position(1.0, 1.0), None);
	}

	#[test]
	fn pointer_motion_drives_hover() {
		let mut s = state();
		let (x, y) = center_of(&s, "a");
		assert!(s.pointer_move(x, y));
		assert_eq!(s.session.hovered(), Some("a"));
		assert!(s.scene.edges[0].animated);
		assert!(!s.pointer_move(x + 1.0, y));
		assert!(s.pointer_move(1.0, 1.0));
		assert_eq!(s.session.hovered(), None);
		assert!(!s.scene.edges[0].animated);
	}

	#[test]
	fn view_switch_refits_and_restyles() {
		let mut s = state();
		assert!(s.set_view(Some(View::Future)));
		assert_eq!(s.scene.nodes.len(), 3);
		assert!(!s.set_view(None));
		assert_eq!(s.session.active_view(), View::Future);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut s = state();
		for _ in 0..100 {
			s.zoom_at(10.0, 10.0, -1.0);
		}
		assert_eq!(s.transform.k, MAX_ZOOM);
		for _ in 0..100 {
			s.zoom_at(10.0, 10.0, 1.0);
		}
		assert_eq!(s.transform.k, MIN_ZOOM);
	}

	#[test]
	fn click_after_pan_is_not_activation() {
		let hits = Rc::new(Cell::new(0));
		let counter = hits.clone();
		let model = DependencyModel::default().with_edge(View::Current, "a", "b");
		let session =
			GraphSession::new(model).on_node_activate(move |_| counter.set(counter.get() + 1));
		let mut s = CanvasState::new(session, 800.0, 600.0);
		let (x, y) = center_of(&s, "a");
		assert!(s.click(x, y));
		s.start_pan(x, y);
		s.drag_pan(x + 20.0, y);
		s.end_pan();
		assert!(!s.click(x + 20.0, y));
		assert_eq!(hits.get(), 1);
	}

	#[test]
	fn press_within_slop_keeps_viewport() {
		let mut s = state();
		let before = s.transform.clone();
		let (x, y) = center_of(&s, "a");
		s.start_pan(x, y);
		s.drag_pan(x + 2.0, y - 2.0);
		assert_eq!(s.transform, before);
		assert!(!s.pan.moved);
		s.drag_pan(x + 10.0, y);
		assert!(s.pan.moved);
		assert!((s.transform.x - (before.x + 10.0)).abs() < 1e-9);
		assert_eq!(s.transform.y, before.y);
	}

	#[test]
	fn zoom_controls_keep_canvas_center_fixed() {
		let mut s = state();
		let anchor = s.screen_to_graph(400.0, 300.0);
		let k = s.transform.k;
		s.zoom_in();
		assert!((s.transform.k - k * 1.2).abs() < 1e-9);
		let after = s.screen_to_graph(400.0, 300.0);
		assert!((after.0 - anchor.0).abs() < 1e-9 && (after.1 - anchor.1).abs() < 1e-9);
		s.zoom_out();
		assert!((s.transform.k - k).abs() < 1e-9);
		for _ in 0..50 {
			s.zoom_out();
		}
		assert_eq!(s.transform.k, MIN_ZOOM);
		s.fit_view();
		assert!((s.transform.k - k).abs() < 1e-9);
	}

	#[test]
	fn cursor_marks_activatable_nodes() {
		let model = DependencyModel::default()
			.with_component("a", "core")
			.with_style("core", Default::default())
			.with_edge(View::Current, "a", "b");
		let s = CanvasState::new(GraphSession::new(model), 800.0, 600.0);
		let (ax, ay) = center_of(&s, "a");
		let (bx, by) = center_of(&s, "b");
		assert_eq!(s.cursor_at(ax, ay), "pointer");
		assert_eq!(s.cursor_at(bx, by), "grab");
		assert_eq!(s.cursor_at(1.0, 1.0), "grab");
	}

	#[test]
	fn empty_scene_uses_default_transform() {
		let s = CanvasState::new(GraphSession::new(DependencyModel::default()), 800.0, 600.0);
		assert_eq!(s.transform, ViewTransform::default());
	}
}
