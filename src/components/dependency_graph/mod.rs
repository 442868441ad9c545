mod component;
mod error;
mod layout;
mod model;
mod overlay;
mod reduce;
mod render;
mod session;
mod state;
mod types;

pub use component::DependencyGraphCanvas;
pub use error::ModelError;
pub use model::DependencyModel;
pub use overlay::Emphasis;
pub use session::GraphSession;
pub use types::View;
