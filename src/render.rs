use crate::{
	error::MountError,
	vnode::{event_name, number_string, AttrValue, Child, Descriptor, Handler},
};
use js_sys::Reflect;
use tracing::{instrument, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

/// One `addEventListener` registration, undone on drop.
struct Listener {
	target: web_sys::EventTarget,
	event: String,
	closure: Closure<dyn Fn(web_sys::Event)>,
}

impl Drop for Listener {
	fn drop(&mut self) {
		// The element is usually detached already, but may still be referenced from JavaScript.
		if let Err(error) = self.target.remove_event_listener_with_callback(&self.event, self.closure.as_ref().unchecked_ref()) {
			warn!("Failed to remove {:?} listener: {:?}", self.event, error)
		}
	}
}

/// Creates live DOM nodes from [`Descriptor`]s.
///
/// The renderer owns the [`Closure`]s of every event listener it binds.
/// They stay callable until [`Renderer::clear_listeners`] is called or the renderer is dropped.
pub struct Renderer {
	document: web_sys::Document,
	listeners: Vec<Listener>,
}

impl core::fmt::Debug for Renderer {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Renderer").field("document", &self.document).field("listeners.len()", &self.listeners.len()).finish()
	}
}

impl Renderer {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self { document, listeners: Vec::new() }
	}

	/// # Errors
	///
	/// Iff there is no global `window` or it has no `document`.
	pub fn for_global_document() -> Result<Self, MountError> {
		let document = web_sys::window().and_then(|window| window.document()).ok_or_else(|| MountError::Dom {
			operation: "window.document",
			message: "no global document".to_owned(),
		})?;
		Ok(Self::new(document))
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	/// The number of event listeners currently bound through this renderer.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Unbinds and frees all event listeners created by this renderer.
	pub fn clear_listeners(&mut self) {
		let count = self.listeners.len();
		self.listeners.clear();
		trace!("Freed {} event listener(s).", count);
	}

	/// Renders `child` into a new, detached DOM node.
	///
	/// [`Child::Empty`] and empty [`Child::Fragment`]s render to [`None`].
	/// Fragments with content are rendered into a [***DocumentFragment***](https://developer.mozilla.org/en-US/docs/Web/API/DocumentFragment) as fallback.
	///
	/// # Errors
	///
	/// Iff a DOM call fails, for example because the tag name is invalid.
	pub fn render(&mut self, child: &Child) -> Result<Option<web_sys::Node>, MountError> {
		match child {
			Child::Element(descriptor) => self.render_element(descriptor).map(|element| Some(element.into())),
			Child::Text(text) => Ok(Some(self.render_text(text).into())),
			Child::Number(number) => Ok(Some(self.render_text(&number_string(*number)).into())),
			Child::Empty => Ok(None),
			Child::Fragment(children) if children.is_empty() => Ok(None),
			Child::Fragment(children) => {
				let fragment = self.document.create_document_fragment();
				self.append_children(fragment.as_ref(), children)?;
				Ok(Some(fragment.into()))
			}
		}
	}

	fn render_text(&self, text: &str) -> web_sys::Text {
		let span = if cfg!(feature = "dangerous-logging") {
			trace_span!("Creating text node", text)
		} else {
			trace_span!("Creating text node", len = text.len())
		};
		let _enter = span.enter();
		self.document.create_text_node(text)
	}

	/// Creates the element for `descriptor`, applies its attributes and renders its children into it.
	///
	/// # Errors
	///
	/// Iff a DOM call fails, for example because the tag name is invalid.
	#[instrument(skip(self, descriptor), fields(tag = descriptor.tag()))]
	pub fn render_element(&mut self, descriptor: &Descriptor) -> Result<web_sys::Element, MountError> {
		let element = self.document.create_element(descriptor.tag()).map_err(|error| MountError::dom("createElement", &error))?;

		for (key, value) in descriptor.attrs().iter() {
			self.apply_attr(&element, key, value)?;
		}

		self.append_children(element.as_ref(), descriptor.children())?;
		Ok(element)
	}

	fn append_children(&mut self, parent: &web_sys::Node, children: &[Child]) -> Result<(), MountError> {
		for child in children {
			match child {
				// Flatten before dispatching so that no DocumentFragment is created for nested lists.
				Child::Fragment(nested) => self.append_children(parent, nested)?,
				child => {
					if let Some(node) = self.render(child)? {
						parent.append_child(&node).map_err(|error| MountError::dom("appendChild", &error))?;
					}
				}
			}
		}
		Ok(())
	}

	fn apply_attr(&mut self, element: &web_sys::Element, key: &str, value: &AttrValue) -> Result<(), MountError> {
		let span = if cfg!(feature = "dangerous-logging") {
			trace_span!("Applying attribute", key, ?value)
		} else {
			trace_span!("Applying attribute", key)
		};
		let _enter = span.enter();

		let js_value = match value {
			AttrValue::Handler(handler) => {
				match event_name(key) {
					Some(event) => self.bind(element, event, handler)?,
					None => warn!("Handler under key {:?} doesn't name an event (expected an `on` prefix). Skipping it.", key),
				}
				return Ok(());
			}
			AttrValue::Text(text) => JsValue::from_str(text),
			AttrValue::Bool(value) => JsValue::from_bool(*value),
			AttrValue::Number(number) => JsValue::from_f64(*number),
		};

		// Live state like `checked` or `value` is only reflected by the property.
		let target: &JsValue = element.as_ref();
		let key_js = JsValue::from_str(key);
		if Reflect::has(target, &key_js).unwrap_or(false) {
			trace!("Assigning property.");
			if Reflect::set(target, &key_js, &js_value).map_err(|error| MountError::dom("Reflect.set", &error))? {
				return Ok(());
			}
			// Read-only, like `input.list` or `button.form`.
			trace!("Property is read-only. Falling back to attribute.");
		}
		trace!("Setting attribute.");
		element
			.set_attribute(key, &value.as_attribute_string().unwrap_or_default())
			.map_err(|error| MountError::dom("setAttribute", &error))
	}

	fn bind(&mut self, element: &web_sys::Element, event: String, handler: &Handler) -> Result<(), MountError> {
		trace!("Binding {:?} listener.", event);
		let handler = handler.clone();
		let closure = Closure::wrap(Box::new(move |dom_event: web_sys::Event| handler(dom_event)) as Box<dyn Fn(web_sys::Event)>);
		let target: &web_sys::EventTarget = element.as_ref();
		target
			.add_event_listener_with_callback(&event, closure.as_ref().unchecked_ref())
			.map_err(|error| MountError::dom("addEventListener", &error))?;
		self.listeners.push(Listener {
			target: target.clone(),
			event,
			closure,
		});
		Ok(())
	}
}
