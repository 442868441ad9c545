use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::model::DependencyModel;
use super::render;
use super::session::GraphSession;
use super::state::CanvasState;
use super::types::View;

/// Canvas showing one view of a dependency model.
///
/// `selection` is the raw output of the view toggle; an empty selection keeps
/// the view already shown. `on_view_change` reports the view actually shown,
/// `on_node_activate` receives the id of a clicked node.
#[component]
pub fn DependencyGraphCanvas(
	#[prop(into)] model: Signal<DependencyModel>,
	#[prop(into)] selection: Signal<Option<View>>,
	#[prop(optional, into)] on_view_change: Option<Callback<View>>,
	#[prop(optional, into)] on_node_activate: Option<Callback<String>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			log::error!("no window, dependency graph not mounted");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				log::error!("canvas 2d context unavailable");
				return;
			}
		};

		let mut session = GraphSession::new(model.get());
		if let Some(cb) = on_node_activate {
			session = session.on_node_activate(move |id| cb.run(id.to_string()));
		}
		let initial = selection.get_untracked();
		let mut canvas_state = CanvasState::new(session, w, h);
		canvas_state.set_view(initial);
		if let Some(cb) = on_view_change {
			cb.run(canvas_state.session.active_view());
		}
		*state_init.borrow_mut() = Some(canvas_state);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_view = state.clone();
	Effect::new(move |_| {
		let next = selection.get();
		if let Some(ref mut s) = *state_view.borrow_mut() {
			if s.set_view(next) {
				if let Some(cb) = on_view_change {
					cb.run(s.session.active_view());
				}
			}
		}
	});

	let local_point = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.start_pan(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.pan.active {
				s.drag_pan(x, y);
			} else {
				s.pointer_move(x, y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.end_pan();
		}
	};

	let state_cl = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_cl.borrow_mut() {
			s.click(x, y);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_out();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	let state_cursor = state.clone();
	let cursor = move |ev: &MouseEvent| {
		let Some((x, y)) = local_point(ev) else {
			return;
		};
		let Some(cursor) = state_cursor.borrow().as_ref().map(|s| s.cursor_at(x, y)) else {
			return;
		};
		if let Some(canvas) = canvas_ref.get() {
			let canvas: HtmlCanvasElement = canvas.into();
			// `ElementExt::style` from the leptos prelude shadows the DOM getter.
			let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
		}
	};

	let on_zoom_in = control(state.clone(), CanvasState::zoom_in);
	let on_zoom_out = control(state.clone(), CanvasState::zoom_out);
	let on_fit = control(state.clone(), CanvasState::fit_view);

	view! {
		<div class="dependency-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="dependency-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=move |ev: MouseEvent| {
					cursor(&ev);
					on_mousemove(ev);
				}
				on:mouseup=on_mouseup
				on:click=on_click
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div
				class="graph-controls"
				style="position: absolute; left: 16px; bottom: 16px; display: flex; flex-direction: column; gap: 2px;"
			>
				<button title="Zoom in" on:click=on_zoom_in>"+"</button>
				<button title="Zoom out" on:click=on_zoom_out>"−"</button>
				<button title="Fit view" on:click=on_fit>"⤢"</button>
			</div>
		</div>
	}
}

/// Click handler for one of the zoom/fit buttons.
fn control(
	state: Rc<RefCell<Option<CanvasState>>>,
	action: fn(&mut CanvasState),
) -> impl Fn(MouseEvent) + 'static {
	move |_| {
		if let Some(ref mut s) = *state.borrow_mut() {
			action(s);
		}
	}
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}
