use crate::{
	error::{MountError, StructureError, TargetError},
	render::Renderer,
	vnode::{Child, Descriptor},
};
use tracing::{info, instrument, trace, trace_span};
use wasm_bindgen::{JsCast, JsValue};

/// What can be mounted: one descriptor or an ordered list of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
	Single(Child),
	List(Vec<Child>),
}

impl From<Descriptor> for Content {
	fn from(descriptor: Descriptor) -> Self {
		Content::Single(Child::Element(descriptor))
	}
}

impl From<Child> for Content {
	fn from(child: Child) -> Self {
		Content::Single(child)
	}
}

impl From<Vec<Descriptor>> for Content {
	fn from(descriptors: Vec<Descriptor>) -> Self {
		Content::List(descriptors.into_iter().map(Child::Element).collect())
	}
}

impl From<Vec<Child>> for Content {
	fn from(children: Vec<Child>) -> Self {
		Content::List(children)
	}
}

impl Content {
	/// Checks that every mounted entry is an element with a tag.
	///
	/// # Errors
	///
	/// Iff that's not the case, naming the offending list index if applicable.
	pub fn validate(&self) -> Result<(), StructureError> {
		match self {
			Content::Single(child) => validate_child(child).map_err(|reason| StructureError { index: None, reason }),
			Content::List(children) => children
				.iter()
				.enumerate()
				.try_for_each(|(index, child)| validate_child(child).map_err(|reason| StructureError { index: Some(index), reason })),
		}
	}

	fn children(&self) -> &[Child] {
		match self {
			Content::Single(child) => core::slice::from_ref(child),
			Content::List(children) => children,
		}
	}
}

fn validate_child(child: &Child) -> Result<(), String> {
	match child {
		Child::Element(descriptor) if descriptor.has_tag() => Ok(()),
		Child::Element(_) => Err("descriptor is missing its tag".to_owned()),
		Child::Text(_) => Err("expected a descriptor but found text".to_owned()),
		Child::Number(_) => Err("expected a descriptor but found a number".to_owned()),
		Child::Empty => Err("expected a descriptor but found nothing".to_owned()),
		Child::Fragment(_) => Err("expected a descriptor but found a nested list".to_owned()),
	}
}

fn validate_target(target: &JsValue) -> Result<&web_sys::Element, TargetError> {
	match target.dyn_ref::<web_sys::Element>() {
		Some(element) if element.is_connected() => Ok(element),
		Some(element) => Err(TargetError {
			found: format!("a detached <{}>", element.local_name()),
		}),
		None => Err(TargetError { found: format!("{:?}", target) }),
	}
}

/// Attached to a specific [`web_sys::Element`], this `struct` replaces its [***childNodes***](https://developer.mozilla.org/en-US/docs/Web/API/Node/childNodes) wholesale on each [`mount`](`MountPoint::mount`).
///
/// There is no reconciliation with previous content: Every mount discards all previous child nodes and their event listeners,
/// including focus and selection state. Restoring those is up to the application.
///
/// Event listeners bound by the current content stay alive as long as the [`MountPoint`] does.
#[derive(Debug)]
pub struct MountPoint {
	element: web_sys::Element,
	renderer: Renderer,
}

impl MountPoint {
	/// # Errors
	///
	/// [`MountError::Target`] iff `target` is not an [`web_sys::Element`] that's connected to a document.
	#[instrument]
	pub fn new_for_element(target: &JsValue) -> Result<Self, MountError> {
		let element = validate_target(target)?.clone();
		let document = element.owner_document().ok_or_else(|| TargetError {
			found: format!("<{}> without owner document", element.local_name()),
		})?;
		Ok(Self {
			element,
			renderer: Renderer::new(document),
		})
	}

	#[must_use]
	pub fn element(&self) -> &web_sys::Element {
		&self.element
	}

	/// The number of event listeners bound by the currently mounted content.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.renderer.listener_count()
	}

	/// Replaces the target's content with `content`.
	///
	/// Rendering happens before the old content is removed,
	/// so the previous content stays in place if this fails.
	///
	/// # Errors
	///
	/// - [`MountError::Target`] iff the target element was detached in the meantime.
	/// - [`MountError::Structure`] iff `content` isn't a descriptor with tag or a list of such.
	/// - [`MountError::Dom`] iff rendering failed.
	#[instrument(skip(self, content))]
	pub fn mount(&mut self, content: impl Into<Content>) -> Result<(), MountError> {
		let content = content.into();
		validate_target(self.element.as_ref())?;
		content.validate()?;

		let mut renderer = Renderer::new(self.renderer.document().clone());
		let mut nodes = Vec::with_capacity(content.children().len());
		for child in content.children() {
			let span = trace_span!("Rendering mounted node", index = nodes.len());
			let _enter = span.enter();
			nodes.extend(renderer.render(child)?);
		}

		let mut removed = 0_usize;
		while let Some(old) = self.element.first_child() {
			self.element.remove_child(&old).map_err(|error| MountError::dom("removeChild", &error))?;
			removed += 1;
		}
		trace!("Removed {} previous node(s).", removed);

		// Drops the previous content's listeners.
		self.renderer = renderer;

		for node in &nodes {
			self.element.append_child(node).map_err(|error| MountError::dom("appendChild", &error))?;
		}
		info!("Mounted {} node(s) with {} event listener(s).", nodes.len(), self.renderer.listener_count());
		Ok(())
	}
}

/// Creates a [`MountPoint`] for `target` and mounts `content` into it.
///
/// Keep the returned [`MountPoint`] alive for as long as the content's event handlers should work.
///
/// # Errors
///
/// See [`MountPoint::new_for_element`] and [`MountPoint::mount`].
pub fn mount(target: &JsValue, content: impl Into<Content>) -> Result<MountPoint, MountError> {
	let mut mount_point = MountPoint::new_for_element(target)?;
	mount_point.mount(content)?;
	Ok(mount_point)
}
