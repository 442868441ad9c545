//! Errors raised while loading a dependency model document.

use thiserror::Error;

use super::types::View;

/// Why a model document was rejected.
#[derive(Debug, Error)]
pub enum ModelError {
	/// The document is not valid JSON or does not match the model shape.
	#[error("invalid dependency model: {0}")]
	Parse(#[from] serde_json::Error),

	/// An edge names an empty component identifier.
	#[error("edge {index} of the {view:?} view has an empty endpoint")]
	EmptyId {
		/// View whose edge list holds the edge.
		view: View,
		/// Position of the edge in that list.
		index: usize,
	},
}

pub type Result<T> = std::result::Result<T, ModelError>;
