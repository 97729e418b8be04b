//! Reads live DOM back into [`Descriptor`]s.
//!
//! Only attributes are loaded. Properties assigned during rendering (like `checked`) and event listeners are invisible here.

use crate::vnode::{build, Attrs, Child, Descriptor};
use tracing::trace;
use wasm_bindgen::JsCast;
use web_sys::{Attr, Element, NamedNodeMap, Node, NodeList, Text};

pub fn load_child_nodes(child_nodes: &NodeList) -> Vec<Child> {
	(0..child_nodes.length())
		.filter_map(|i| child_nodes.item(i))
		.filter_map(|child| {
			if let Some(element) = child.dyn_ref::<Element>() {
				Some(Child::Element(load_element(element)))
			} else if let Some(text) = child.dyn_ref::<Text>() {
				Some(Child::Text(text.data()))
			} else {
				trace!("Skipping node of type {}.", child.node_type());
				None
			}
		})
		.collect()
}

pub fn load_element(element: &Element) -> Descriptor {
	let node: &Node = element.as_ref();
	build(element.local_name(), load_attributes(&element.attributes()), load_child_nodes(&node.child_nodes()))
}

pub fn load_attributes(attributes: &NamedNodeMap) -> Attrs {
	(0..attributes.length()).filter_map(|i| attributes.item(i)).map(|attribute| load_attribute(&attribute)).collect()
}

pub fn load_attribute(attribute: &Attr) -> (String, String) {
	(attribute.local_name(), attribute.value())
}
