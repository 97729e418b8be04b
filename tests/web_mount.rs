#![cfg(target_arch = "wasm32")]

use twig_dom::{
	build,
	load::{load_child_nodes, load_element},
	mount,
	vnode::empty,
	Attrs, Child, Content, Descriptor, MountError, MountPoint, StructureError,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

use web_support_::{container, document, init_log};

fn list(items: &[&str]) -> Descriptor {
	build("ul", Attrs::new().with("class", "todo-list"), items.iter().map(|item| build("li", Attrs::new(), vec![*item])).collect::<Vec<_>>())
}

#[wasm_bindgen_test]
fn mounts_single_descriptor() {
	let container = container();
	let mount_point = mount(&container.clone().into(), list(&["a", "b"])).unwrap();

	assert_eq!(container.inner_html(), r#"<ul class="todo-list"><li>a</li><li>b</li></ul>"#);
	assert_eq!(mount_point.element(), &container);
}

#[wasm_bindgen_test]
fn mounts_descriptor_list_in_order() {
	let container = container();
	let mut mount_point = MountPoint::new_for_element(&container.clone().into()).unwrap();
	mount_point.mount(vec![empty("header"), empty("main"), empty("footer")]).unwrap();

	assert_eq!(container.inner_html(), "<header></header><main></main><footer></footer>");
}

#[wasm_bindgen_test]
fn full_replace() {
	let container = container();
	let mut mount_point = MountPoint::new_for_element(&container.clone().into()).unwrap();
	mount_point.mount(list(&["a", "b", "c"])).unwrap();
	mount_point.mount(build("p", Attrs::new().with("id", "replaced"), vec!["only"])).unwrap();

	let fresh = container_with(build("p", Attrs::new().with("id", "replaced"), vec!["only"]));
	assert_eq!(load_child_nodes(&container.child_nodes()), load_child_nodes(&fresh.child_nodes()));
	assert_eq!(container.child_element_count(), 1);
}

fn container_with(descriptor: Descriptor) -> web_sys::Element {
	let container = container();
	let mut mount_point = MountPoint::new_for_element(&container.clone().into()).unwrap();
	mount_point.mount(descriptor).unwrap();
	container
}

#[wasm_bindgen_test]
fn replaces_foreign_content() {
	let container = container();
	container.set_inner_html("<span>server</span>text");
	let _mount_point = mount(&container.clone().into(), empty("main")).unwrap();
	assert_eq!(container.inner_html(), "<main></main>");
}

#[wasm_bindgen_test]
fn empty_list_clears() {
	let container = container();
	let mut mount_point = MountPoint::new_for_element(&container.clone().into()).unwrap();
	mount_point.mount(list(&["a"])).unwrap();
	mount_point.mount(Vec::<Descriptor>::new()).unwrap();
	assert_eq!(container.child_nodes().length(), 0);
}

#[wasm_bindgen_test]
fn missing_tag_is_a_structure_error() {
	let container = container();
	let mut mount_point = MountPoint::new_for_element(&container.clone().into()).unwrap();

	assert_eq!(
		mount_point.mount(Descriptor::default()),
		Err(MountError::Structure(StructureError {
			index: None,
			reason: "descriptor is missing its tag".to_owned()
		}))
	);
	assert!(matches!(
		mount_point.mount(vec![empty("p"), empty("p"), Descriptor::default()]),
		Err(MountError::Structure(StructureError { index: Some(2), .. }))
	));
	assert!(matches!(
		mount_point.mount(Content::List(vec![empty("p").into(), Child::from("text")])),
		Err(MountError::Structure(StructureError { index: Some(1), .. }))
	));
	assert!(matches!(mount_point.mount(Child::Empty), Err(MountError::Structure(StructureError { index: None, .. }))));
}

#[wasm_bindgen_test]
fn invalid_targets() {
	init_log();
	assert!(matches!(MountPoint::new_for_element(&JsValue::from_str("#app")), Err(MountError::Target(_))));
	assert!(matches!(MountPoint::new_for_element(&JsValue::NULL), Err(MountError::Target(_))));
	assert!(matches!(mount(&document().create_text_node("x").into(), empty("p")), Err(MountError::Target(_))));

	let detached = document().create_element("div").unwrap();
	assert!(matches!(mount(&detached.into(), empty("p")), Err(MountError::Target(_))));
}

#[wasm_bindgen_test]
fn detached_after_creation() {
	let container = container();
	let mut mount_point = MountPoint::new_for_element(&container.clone().into()).unwrap();
	container.remove();
	assert!(matches!(mount_point.mount(empty("p")), Err(MountError::Target(_))));
}

#[wasm_bindgen_test]
fn failed_render_keeps_previous_content() {
	let container = container();
	let mut mount_point = MountPoint::new_for_element(&container.clone().into()).unwrap();
	mount_point.mount(list(&["kept"])).unwrap();

	let result = mount_point.mount(build("div", Attrs::new(), vec![empty("not a tag")]));

	assert!(matches!(result, Err(MountError::Dom { .. })));
	assert_eq!(load_element(&container.first_element_child().unwrap()), list(&["kept"]));
}
