//! Node descriptors: inert, immutable descriptions of DOM elements that don't exist yet.
//!
//! Build them with [`build`] and hand them to a [`Renderer`](`crate::render::Renderer`) or
//! [`MountPoint`](`crate::mount::MountPoint`). Nothing here touches the DOM, and no validation happens before mounting.

use core::{
	fmt::{self, Debug, Formatter},
	iter::FromIterator,
};
use hashbrown::HashMap;
use std::rc::Rc;

/// Attribute keys starting with this (case-sensitive) prefix bind event handlers.
pub const EVENT_PREFIX: &str = "on";

pub type Handler = Rc<dyn Fn(web_sys::Event)>;

/// Wraps `f` into an [`AttrValue::Handler`].
pub fn handler(f: impl Fn(web_sys::Event) + 'static) -> AttrValue {
	AttrValue::Handler(Rc::new(f))
}

#[derive(Clone)]
pub enum AttrValue {
	Text(String),
	Bool(bool),
	Number(f64),
	/// Only bound as event listener under an [`EVENT_PREFIX`]ed key.
	Handler(Handler),
}

impl AttrValue {
	/// The string form used for plain attributes.
	///
	/// [`Handler`](`AttrValue::Handler`)s have none.
	#[must_use]
	pub fn as_attribute_string(&self) -> Option<String> {
		match self {
			AttrValue::Text(text) => Some(text.clone()),
			AttrValue::Bool(value) => Some(value.to_string()),
			AttrValue::Number(number) => Some(number_string(*number)),
			AttrValue::Handler(_) => None,
		}
	}
}

/// Formats `number` the way JavaScript's `String(number)` does.
///
/// `-0` becomes `"0"`, infinities are `"Infinity"` and `"-Infinity"`,
/// and magnitudes from `1e21` up or below `1e-6` use exponent notation (`"1e+21"`, `"1.5e-7"`).
#[must_use]
#[allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn number_string(number: f64) -> String {
	if number.is_nan() {
		return "NaN".to_owned();
	}
	if number == 0.0 {
		return "0".to_owned();
	}
	if number.is_infinite() {
		return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
	}

	let sign = if number < 0.0 { "-" } else { "" };
	// Shortest round-tripping digits, as `d.ddde±x`.
	let exponential = format!("{:e}", number.abs());
	let (mantissa, exponent) = exponential.split_once('e').unwrap_or((&exponential, "0"));
	let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
	let k = digits.len() as i64;
	// Position of the decimal point relative to the start of `digits`.
	let n = exponent.parse::<i64>().unwrap_or(0) + 1;

	let body = if k <= n && n <= 21 {
		format!("{}{}", digits, "0".repeat((n - k) as usize))
	} else if 0 < n && n <= 21 {
		let (int, frac) = digits.split_at(n as usize);
		format!("{}.{}", int, frac)
	} else if -6 < n && n <= 0 {
		format!("0.{}{}", "0".repeat((-n) as usize), digits)
	} else {
		let e = n - 1;
		let e_sign = if e < 0 { '-' } else { '+' };
		let (first, rest) = digits.split_at(1);
		if rest.is_empty() {
			format!("{}e{}{}", first, e_sign, e.abs())
		} else {
			format!("{}.{}e{}{}", first, rest, e_sign, e.abs())
		}
	};
	format!("{}{}", sign, body)
}

impl PartialEq for AttrValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(AttrValue::Text(a), AttrValue::Text(b)) => a == b,
			(AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
			#[allow(clippy::float_cmp)]
			(AttrValue::Number(a), AttrValue::Number(b)) => a == b,
			(AttrValue::Handler(a), AttrValue::Handler(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl Debug for AttrValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			AttrValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
			AttrValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
			AttrValue::Number(number) => f.debug_tuple("Number").field(number).finish(),
			AttrValue::Handler(handler) => f.debug_tuple("Handler").field(&Rc::as_ptr(handler)).finish(),
		}
	}
}

impl From<&str> for AttrValue {
	fn from(text: &str) -> Self {
		AttrValue::Text(text.to_owned())
	}
}

impl From<String> for AttrValue {
	fn from(text: String) -> Self {
		AttrValue::Text(text)
	}
}

impl From<bool> for AttrValue {
	fn from(value: bool) -> Self {
		AttrValue::Bool(value)
	}
}

macro_rules! number_conversions {
	($($from:ty),*$(,)?) => {$(
		impl From<$from> for AttrValue {
			#[allow(clippy::cast_lossless, clippy::cast_precision_loss)]
			fn from(number: $from) -> Self {
				AttrValue::Number(number as f64)
			}
		}

		impl From<$from> for Child {
			#[allow(clippy::cast_lossless, clippy::cast_precision_loss)]
			fn from(number: $from) -> Self {
				Child::Number(number as f64)
			}
		}
	)*};
}
number_conversions!(i32, i64, u32, u64, usize, f32, f64);

/// Attribute, property and event handler assignments of a [`Descriptor`].
///
/// Application order is unspecified, since all assignments commute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs(HashMap<String, AttrValue>);

impl Attrs {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		self.insert(key, value);
		self
	}

	/// Shorthand for `.with(format!("on{}", event), handler(f))`.
	#[must_use]
	pub fn on(self, event: &str, f: impl Fn(web_sys::Event) + 'static) -> Self {
		self.with(format!("{}{}", EVENT_PREFIX, event), handler(f))
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
		self.0.insert(key.into(), value.into())
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&AttrValue> {
		self.0.get(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

/// If `key` denotes an event binding, returns the (lower-cased) event name.
#[must_use]
pub fn event_name(key: &str) -> Option<String> {
	match key.strip_prefix(EVENT_PREFIX) {
		Some(event) if !event.is_empty() => Some(event.to_ascii_lowercase()),
		_ => None,
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
	Element(Descriptor),
	Text(String),
	Number(f64),
	/// Renders nothing.
	Empty,
	/// Spliced into the surrounding child list.
	Fragment(Vec<Child>),
}

impl Default for Child {
	fn default() -> Self {
		Child::Empty
	}
}

impl From<Descriptor> for Child {
	fn from(descriptor: Descriptor) -> Self {
		Child::Element(descriptor)
	}
}

impl From<&str> for Child {
	fn from(text: &str) -> Self {
		Child::Text(text.to_owned())
	}
}

impl From<String> for Child {
	fn from(text: String) -> Self {
		Child::Text(text)
	}
}

impl<T: Into<Child>> From<Option<T>> for Child {
	fn from(child: Option<T>) -> Self {
		child.map_or(Child::Empty, Into::into)
	}
}

impl<T: Into<Child>> From<Vec<T>> for Child {
	fn from(children: Vec<T>) -> Self {
		Child::Fragment(children.into_iter().map(Into::into).collect())
	}
}

/// An immutable description of one prospective element.
///
/// [`Default`] yields a descriptor without a tag, which mounting rejects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptor {
	tag: String,
	attrs: Attrs,
	children: Vec<Child>,
}

impl Descriptor {
	#[must_use]
	pub fn tag(&self) -> &str {
		&self.tag
	}

	#[must_use]
	pub fn attrs(&self) -> &Attrs {
		&self.attrs
	}

	/// Children in rendering order, with top-level [`Child::Fragment`]s already spliced in.
	#[must_use]
	pub fn children(&self) -> &[Child] {
		&self.children
	}

	#[must_use]
	pub fn has_tag(&self) -> bool {
		!self.tag.trim().is_empty()
	}
}

/// Packages `tag`, `attrs` and `children` into a [`Descriptor`].
///
/// [`Child::Fragment`]s among `children` are flattened by one level.
/// Nothing is validated here.
pub fn build<C: Into<Child>>(tag: impl Into<String>, attrs: Attrs, children: impl IntoIterator<Item = C>) -> Descriptor {
	let mut flat = Vec::new();
	for child in children {
		match child.into() {
			Child::Fragment(nested) => flat.extend(nested),
			child => flat.push(child),
		}
	}
	Descriptor {
		tag: tag.into(),
		attrs,
		children: flat,
	}
}

/// [`build`] without attributes or children.
pub fn empty(tag: impl Into<String>) -> Descriptor {
	build(tag, Attrs::new(), Vec::<Child>::new())
}
