use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::layout::{Lane, LayoutConfig, edge_route, lanes};
use super::overlay::Emphasis;
use super::state::CanvasState;
use super::types::{GraphEdge, GraphNode, Point};

const BACKGROUND: &str = "#fafafa";
const DEFAULT_STROKE: &str = "#b1b1b7";
const ARROW_FILL: &str = "#222";
const ARROW_SIZE: f64 = 10.0;
const CORNER_RADIUS: f64 = 3.0;

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let config = state.session.layout_config();
	let (dash, gap) = (5.0, 5.0);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);

	let edge_lanes = lanes(&state.scene.edges);
	for (edge, lane) in state.scene.edges.iter().zip(edge_lanes) {
		let (Some(source), Some(target)) = (
			state.scene.node(&edge.source),
			state.scene.node(&edge.target),
		) else {
			continue;
		};
		draw_edge(ctx, edge, (source, target, lane), config, dash_offset, (dash, gap));
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_global_alpha(1.0);
}

fn draw_edge(
	ctx: &CanvasRenderingContext2d,
	edge: &GraphEdge,
	(source, target, lane): (&GraphNode, &GraphNode, Lane),
	config: &LayoutConfig,
	dash_offset: f64,
	(dash, gap): (f64, f64),
) {
	let route = edge_route(source, target, config, lane);
	let [.., before, end] = route[..] else {
		return;
	};
	let stroke = edge.style.stroke.as_deref().unwrap_or(DEFAULT_STROKE);
	let width = edge.style.stroke_width.unwrap_or(1.0);

	ctx.set_global_alpha(edge.style.opacity);
	ctx.set_stroke_style_str(stroke);
	ctx.set_line_width(width);
	if edge.animated {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	// Stop the line where the arrowhead begins.
	let (ux, uy) = unit(before, end);
	let stop = Point::new(end.x - ux * ARROW_SIZE, end.y - uy * ARROW_SIZE);
	ctx.begin_path();
	ctx.move_to(route[0].x, route[0].y);
	for p in &route[1..route.len() - 1] {
		ctx.line_to(p.x, p.y);
	}
	ctx.line_to(stop.x, stop.y);
	ctx.stroke();

	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_fill_style_str(ARROW_FILL);
	let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
	ctx.begin_path();
	ctx.move_to(end.x, end.y);
	ctx.line_to(stop.x + px, stop.y + py);
	ctx.line_to(stop.x - px, stop.y - py);
	ctx.close_path();
	ctx.fill();
}

/// Direction of the last route segment; falls back to straight down when the
/// segment is degenerate.
fn unit(from: Point, to: Point) -> (f64, f64) {
	let (dx, dy) = (to.x - from.x, to.y - from.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		(0.0, 1.0)
	} else {
		(dx / dist, dy / dist)
	}
}

fn draw_nodes(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let config = state.session.layout_config();
	let overlay = state.session.overlay();
	let (w, h) = (config.node_width, config.node_height);

	for node in &state.scene.nodes {
		let Point { x, y } = node.position;
		let emphasis = overlay
			.node(&node.id)
			.map(|o| o.emphasis)
			.unwrap_or(Emphasis::None);

		ctx.set_global_alpha(node.style.opacity);

		if matches!(emphasis, Emphasis::Focused | Emphasis::Neighbor) {
			let glow = if emphasis == Emphasis::Focused { 6.0 } else { 3.0 };
			ctx.set_fill_style_str("rgba(33, 150, 243, 0.25)");
			rounded_rect(ctx, x - glow, y - glow, w + 2.0 * glow, h + 2.0 * glow, CORNER_RADIUS + glow);
			ctx.fill();
		}

		rounded_rect(ctx, x, y, w, h, CORNER_RADIUS);
		ctx.set_fill_style_str(&node.style.background);
		ctx.fill();
		ctx.set_stroke_style_str(&node.style.border);
		ctx.set_line_width(if emphasis == Emphasis::Focused { 2.0 } else { 1.0 });
		ctx.stroke();

		ctx.set_fill_style_str(&node.style.color);
		ctx.set_font(&format!("{}px sans-serif", node.style.font_size));
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let max_width = w - 2.0 * node.style.padding;
		let _ = ctx.fill_text_with_max_width(&node.label, x + w / 2.0, y + h / 2.0, max_width);
	}
	ctx.set_global_alpha(1.0);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}
