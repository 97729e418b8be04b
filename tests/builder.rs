use twig_dom::{
	build,
	vnode::{empty, event_name},
	AttrValue, Attrs, Child, Descriptor,
};

#[test]
fn packages_fields() {
	let descriptor = build("li", Attrs::new().with("class", "completed").with("data-id", 3), vec![Child::from("buy milk"), Child::from(2)]);

	assert_eq!(descriptor.tag(), "li");
	assert_eq!(descriptor.attrs().get("class"), Some(&AttrValue::Text("completed".to_owned())));
	assert_eq!(descriptor.attrs().get("data-id"), Some(&AttrValue::Number(3.0)));
	assert_eq!(descriptor.children(), &[Child::Text("buy milk".to_owned()), Child::Number(2.0)]);
}

#[test]
fn defaults_to_no_attrs() {
	let descriptor = empty("div");
	assert!(descriptor.attrs().is_empty());
	assert!(descriptor.children().is_empty());
	assert!(descriptor.has_tag());
}

#[test]
fn equal_arguments_give_equal_descriptors() {
	let make = || build("p", Attrs::new().with("hidden", false), vec!["a", "b"]);
	assert_eq!(make(), make());
}

#[test]
fn handlers_compare_by_identity() {
	let handler = twig_dom::handler(|_| ());
	let a = build("button", Attrs::new().with("onClick", handler.clone()), Vec::<Child>::new());
	let b = build("button", Attrs::new().with("onClick", handler), Vec::<Child>::new());
	let c = build("button", Attrs::new().on("Click", |_| ()), Vec::<Child>::new());
	assert_eq!(a, b);
	assert_ne!(a, c);
	assert!(matches!(a.attrs().get("onClick"), Some(AttrValue::Handler(_))));
}

#[test]
fn flattens_one_level() {
	let items: Vec<Child> = vec![empty("li").into(), empty("li").into()];
	let descriptor = build("ul", Attrs::new(), vec![Child::from("head"), Child::from(items), Child::from(vec![Child::from(vec!["deep"])])]);

	assert_eq!(descriptor.children().len(), 4);
	assert_eq!(descriptor.children()[0], Child::Text("head".to_owned()));
	assert_eq!(descriptor.children()[1], Child::Element(empty("li")));
	assert_eq!(descriptor.children()[2], Child::Element(empty("li")));
	// Only one level; the renderer flattens the rest.
	assert_eq!(descriptor.children()[3], Child::Fragment(vec![Child::Text("deep".to_owned())]));
}

#[test]
fn none_is_empty() {
	let maybe: Option<Descriptor> = None;
	let descriptor = build("div", Attrs::new(), vec![Child::from(maybe), Child::from(Some("x"))]);
	assert_eq!(descriptor.children(), &[Child::Empty, Child::Text("x".to_owned())]);
}

#[test]
fn missing_tag() {
	assert!(!Descriptor::default().has_tag());
	assert!(!empty("  ").has_tag());
}

#[test]
fn event_names() {
	assert_eq!(event_name("onclick").as_deref(), Some("click"));
	assert_eq!(event_name("onKeyUp").as_deref(), Some("keyup"));
	assert_eq!(event_name("on"), None);
	assert_eq!(event_name("Onclick"), None);
	assert_eq!(event_name("class"), None);
}

#[test]
fn attribute_strings() {
	assert_eq!(AttrValue::from(true).as_attribute_string().as_deref(), Some("true"));
	assert_eq!(AttrValue::from(3).as_attribute_string().as_deref(), Some("3"));
	assert_eq!(AttrValue::from(1.5).as_attribute_string().as_deref(), Some("1.5"));
	assert_eq!(twig_dom::handler(|_| ()).as_attribute_string(), None);
}

#[test]
fn numbers_format_like_javascript() {
	use twig_dom::vnode::number_string;

	assert_eq!(number_string(3.0), "3");
	assert_eq!(number_string(-1.5), "-1.5");
	assert_eq!(number_string(-0.0), "0");
	assert_eq!(number_string(f64::INFINITY), "Infinity");
	assert_eq!(number_string(f64::NEG_INFINITY), "-Infinity");
	assert_eq!(number_string(f64::NAN), "NaN");
	assert_eq!(number_string(1e20), "100000000000000000000");
	assert_eq!(number_string(1e21), "1e+21");
	assert_eq!(number_string(1.25e22), "1.25e+22");
	assert_eq!(number_string(0.000_001), "0.000001");
	assert_eq!(number_string(1.5e-7), "1.5e-7");
	assert_eq!(number_string(123.456), "123.456");
	assert_eq!(AttrValue::from(-0.0).as_attribute_string().as_deref(), Some("0"));
}
