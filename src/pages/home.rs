use leptos::prelude::*;

use crate::components::dependency_graph::{DependencyGraphCanvas, DependencyModel, View};

const TECH_STACK: &str = include_str!("../data/tech_stack.json");
const REPOSITORY_BASE: &str = "https://github.com/PolicyEngine";

/// Selection reported by an exclusive toggle group: clicking the button that
/// is already pressed clears the selection.
fn toggle_selection(active: View, clicked: View) -> Option<View> {
	(active != clicked).then_some(clicked)
}

fn repository_url(id: &str) -> String {
	format!("{REPOSITORY_BASE}/{id}")
}

fn open_repository(id: String) {
	let url = repository_url(&id);
	let Some(window) = web_sys::window() else {
		log::error!("no window to open {url}");
		return;
	};
	if let Err(err) = window.open_with_url_and_target(&url, "_blank") {
		log::error!("failed to open {url}: {err:?}");
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	match DependencyModel::from_json(TECH_STACK) {
		Ok(model) => view! { <StackExplorer model /> }.into_any(),
		Err(err) => {
			log::error!("{err}");
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>
				<p>"Errors: "</p>
				<ul>
					<li>{err.to_string()}</li>
				</ul>
			}
			.into_any()
		}
	}
}

#[component]
fn StackExplorer(model: DependencyModel) -> impl IntoView {
	let (selection, set_selection) = signal(Some(View::Current));
	let (active, set_active) = signal(View::Current);
	let model = Signal::derive(move || model.clone());

	let buttons = View::ALL
		.into_iter()
		.map(|view| {
			view! {
				<button
					class="view-toggle"
					aria-pressed=move || (active.get() == view).to_string()
					on:click=move |_| set_selection.set(toggle_selection(active.get_untracked(), view))
				>
					{view.label()}
				</button>
			}
		})
		.collect_view();

	view! {
		<div class="fullscreen-graph">
			<DependencyGraphCanvas
				model=model
				selection=selection
				on_view_change=move |view: View| set_active.set(view)
				on_node_activate=open_repository
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"PolicyEngine Tech Stack Architecture"</h1>
				<div class="view-toggle-group" role="group" aria-label="architecture view">
					{buttons}
				</div>
				<p class="subtitle">
					"Click on any component to visit its GitHub repository. Hover over nodes to highlight connections."
				</p>
				<Show when=move || active.get() == View::Future>
					<p class="key-changes">
						<strong>"Key Changes:"</strong>
						" policyengine-api removed • policyengine.py expanded role • unified policyengine-data package • new country models (IL, NG) • TypeScript app v2"
					</p>
				</Show>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reclicking_pressed_button_clears_selection() {
		assert_eq!(toggle_selection(View::Current, View::Current), None);
		assert_eq!(toggle_selection(View::Current, View::Future), Some(View::Future));
	}

	#[test]
	fn repository_links_use_node_id() {
		assert_eq!(
			repository_url("policyengine-core"),
			"https://github.com/PolicyEngine/policyengine-core"
		);
	}

	#[test]
	fn bundled_model_loads() {
		let model = DependencyModel::from_json(TECH_STACK).unwrap();
		assert!(!model.edges(View::Current).is_empty());
		assert!(!model.edges(View::Future).is_empty());
		for view in View::ALL {
			for edge in model.edges(view) {
				assert!(model.style_of(&edge.source).is_some(), "{}", edge.source);
				assert!(model.style_of(&edge.target).is_some(), "{}", edge.target);
			}
		}
	}
}
