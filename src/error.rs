//! Error types returned by mounting, the reactive store and the router.

use core::fmt::{self, Display, Formatter};
use thiserror::Error;

/// The mount target is not an [***Element***](https://developer.mozilla.org/en-US/docs/Web/API/element) in the live document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid mount target: expected a connected `Element` but found {found}")]
pub struct TargetError {
	pub found: String,
}

/// Mounted content is structurally invalid.
///
/// `index` locates the offending entry if a list of descriptors was mounted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct StructureError {
	pub index: Option<usize>,
	pub reason: String,
}

impl Display for StructureError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.index {
			Some(index) => write!(f, "invalid mount content at index {}: {}", index, self.reason),
			None => write!(f, "invalid mount content: {}", self.reason),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
	#[error(transparent)]
	Target(#[from] TargetError),
	#[error(transparent)]
	Structure(#[from] StructureError),
	/// A DOM call failed while rendering, for example due to an invalid tag name.
	#[error("DOM operation `{operation}` failed: {message}")]
	Dom { operation: &'static str, message: String },
}

impl MountError {
	pub(crate) fn dom(operation: &'static str, error: &wasm_bindgen::JsValue) -> Self {
		Self::Dom {
			operation,
			message: format!("{:?}", error),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
	#[error("expected a map but found {found}")]
	NotAMap { found: &'static str },
	#[error("expected a list but found {found}")]
	NotAList { found: &'static str },
	#[error("index {index} is out of bounds for a list of length {len}")]
	IndexOutOfBounds { index: usize, len: usize },
	#[error("empty path")]
	EmptyPath,
	#[error("no composite value at path segment `{segment}`")]
	MissingPath { segment: String },
	/// The assigned handle is, or contains, the handle written to.
	#[error("assigning this handle would nest it inside itself")]
	Cycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
	#[error("no global `window` available")]
	NoWindow,
	#[error("DOM operation `{operation}` failed: {message}")]
	Dom { operation: &'static str, message: String },
}

impl RouterError {
	pub(crate) fn dom(operation: &'static str, error: &wasm_bindgen::JsValue) -> Self {
		Self::Dom {
			operation,
			message: format!("{:?}", error),
		}
	}
}
