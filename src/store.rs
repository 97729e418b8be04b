//! A reactive state container over JSON-shaped data.
//!
//! [`Store::wrap`] turns a [`serde_json::Value`] into a tree of shared composite nodes.
//! Every write through any [`Handle`] into that tree, at any depth, synchronously runs all of the store's subscribers once.
//!
//! ```
//! use serde_json::json;
//! use std::{cell::Cell, rc::Rc};
//! use twig_dom::store::Store;
//!
//! let store = Store::new();
//! let state = store.wrap(json!({ "tasks": [], "filter": "all" }));
//!
//! let renders = Rc::new(Cell::new(0));
//! store.subscribe({
//! 	let renders = Rc::clone(&renders);
//! 	move || renders.set(renders.get() + 1)
//! });
//!
//! state.field("tasks").unwrap().push(json!({ "id": 1, "name": "buy milk", "completed": false })).unwrap();
//! assert_eq!(renders.get(), 1);
//! ```

use crate::error::StoreError;
use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
};
use hashbrown::HashMap;
use serde_json::{Map, Value};
use std::rc::Rc;
use tracing::{instrument, trace, trace_span};

type Subscriber = Rc<dyn Fn()>;

#[derive(Default)]
struct Subscribers {
	next_id: Cell<u64>,
	entries: RefCell<Vec<(u64, Subscriber)>>,
	rounds: Cell<u64>,
}

impl Subscribers {
	fn notify(&self) {
		// Snapshot, so that subscribers can (un)subscribe and write state re-entrantly.
		let snapshot: Vec<Subscriber> = self.entries.borrow().iter().map(|(_, subscriber)| Rc::clone(subscriber)).collect();
		let round = self.rounds.get() + 1;
		self.rounds.set(round);
		let span = trace_span!("Notifying subscribers", round, count = snapshot.len());
		let _enter = span.enter();
		for subscriber in snapshot {
			subscriber()
		}
	}
}

/// Returned by [`Store::subscribe`], used to [`Store::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Owns a subscriber list and hands out [`Handle`]s to reactive data.
///
/// Cloning a [`Store`] yields another reference to the same subscriber list.
#[derive(Clone, Default)]
pub struct Store {
	subscribers: Rc<Subscribers>,
}

impl Debug for Store {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Store")
			.field("subscriber_count", &self.subscriber_count())
			.field("notification_rounds", &self.notification_rounds())
			.finish()
	}
}

impl Store {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Wraps `data` so that writes through the returned [`Handle`] (or any handle read from it) notify this store's subscribers.
	///
	/// Primitive `data` is wrapped into a single-element list, since only maps and lists can be written to.
	#[instrument(skip(data))]
	pub fn wrap(&self, data: Value) -> Handle {
		let target = match Slot::from(data) {
			Slot::Composite(composite) => composite,
			Slot::Primitive(value) => Rc::new(RefCell::new(Composite::List(vec![Slot::Primitive(value)]))),
		};
		Handle {
			target,
			subscribers: Rc::clone(&self.subscribers),
		}
	}

	/// Appends `subscriber` to the subscriber list.
	///
	/// Subscribers run synchronously in subscription order after each write, without arguments.
	pub fn subscribe(&self, subscriber: impl Fn() + 'static) -> Subscription {
		let id = self.subscribers.next_id.get();
		self.subscribers.next_id.set(id + 1);
		self.subscribers.entries.borrow_mut().push((id, Rc::new(subscriber)));
		trace!("Added subscriber {}.", id);
		Subscription(id)
	}

	/// Removes a subscriber. Returns whether it was still subscribed.
	///
	/// A notification round that's already running still calls it.
	pub fn unsubscribe(&self, subscription: Subscription) -> bool {
		let mut entries = self.subscribers.entries.borrow_mut();
		let len = entries.len();
		entries.retain(|(id, _)| *id != subscription.0);
		len != entries.len()
	}

	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		self.subscribers.entries.borrow().len()
	}

	/// How many notification rounds ran so far, nested ones included.
	#[must_use]
	pub fn notification_rounds(&self) -> u64 {
		self.subscribers.rounds.get()
	}
}

type Shared = Rc<RefCell<Composite>>;

enum Composite {
	Map(HashMap<String, Slot>),
	List(Vec<Slot>),
}

impl Composite {
	fn kind(&self) -> &'static str {
		match self {
			Composite::Map(_) => "a map",
			Composite::List(_) => "a list",
		}
	}
}

#[derive(Clone)]
enum Slot {
	Primitive(Value),
	Composite(Shared),
}

impl From<Value> for Slot {
	fn from(value: Value) -> Self {
		match value {
			Value::Object(map) => Slot::Composite(Rc::new(RefCell::new(Composite::Map(map.into_iter().map(|(key, value)| (key, value.into())).collect())))),
			Value::Array(items) => Slot::Composite(Rc::new(RefCell::new(Composite::List(items.into_iter().map(Into::into).collect())))),
			primitive => Slot::Primitive(primitive),
		}
	}
}

impl Slot {
	/// Whether `needle` is this slot's composite or nested anywhere inside it.
	fn contains(&self, needle: &Shared) -> bool {
		match self {
			Slot::Primitive(_) => false,
			Slot::Composite(composite) if Rc::ptr_eq(composite, needle) => true,
			Slot::Composite(composite) => match &*composite.borrow() {
				Composite::Map(map) => map.values().any(|slot| slot.contains(needle)),
				Composite::List(items) => items.iter().any(|slot| slot.contains(needle)),
			},
		}
	}

	fn snapshot(&self) -> Value {
		match self {
			Slot::Primitive(value) => value.clone(),
			Slot::Composite(composite) => match &*composite.borrow() {
				Composite::Map(map) => Value::Object(map.iter().map(|(key, slot)| (key.clone(), slot.snapshot())).collect::<Map<_, _>>()),
				Composite::List(items) => Value::Array(items.iter().map(Slot::snapshot).collect()),
			},
		}
	}
}

/// The result of reading a field: primitives are returned by value, maps and lists as [`Handle`].
#[derive(Clone)]
pub enum Field {
	Value(Value),
	Handle(Handle),
}

impl Field {
	#[must_use]
	pub fn as_handle(&self) -> Option<&Handle> {
		match self {
			Field::Handle(handle) => Some(handle),
			Field::Value(_) => None,
		}
	}

	#[must_use]
	pub fn into_handle(self) -> Option<Handle> {
		match self {
			Field::Handle(handle) => Some(handle),
			Field::Value(_) => None,
		}
	}

	#[must_use]
	pub fn as_value(&self) -> Option<&Value> {
		match self {
			Field::Value(value) => Some(value),
			Field::Handle(_) => None,
		}
	}

	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		self.as_value().and_then(Value::as_str)
	}

	#[must_use]
	pub fn as_bool(&self) -> Option<bool> {
		self.as_value().and_then(Value::as_bool)
	}

	#[must_use]
	pub fn as_i64(&self) -> Option<i64> {
		self.as_value().and_then(Value::as_i64)
	}

	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, Field::Value(Value::Null))
	}

	/// A deep copy of the current value.
	#[must_use]
	pub fn snapshot(&self) -> Value {
		match self {
			Field::Value(value) => value.clone(),
			Field::Handle(handle) => handle.snapshot(),
		}
	}

}

impl Debug for Field {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Field::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Field::Handle(handle) => f.debug_tuple("Handle").field(handle).finish(),
		}
	}
}

impl From<Value> for Field {
	fn from(value: Value) -> Self {
		Field::Value(value)
	}
}

impl From<Handle> for Field {
	/// Assigning a [`Handle`] of the same [`Store`] shares its data instead of copying it.
	/// A [`Handle`] of another [`Store`] is copied.
	fn from(handle: Handle) -> Self {
		Field::Handle(handle)
	}
}

impl From<&Handle> for Field {
	fn from(handle: &Handle) -> Self {
		Field::Handle(handle.clone())
	}
}

macro_rules! field_conversions {
	($($from:ty),*$(,)?) => {$(
		impl From<$from> for Field {
			fn from(value: $from) -> Self {
				Field::Value(value.into())
			}
		}
	)*};
}
field_conversions!(bool, i32, i64, u32, u64, f64, &str, String);

/// A reactive view of one map or list inside a [`Store`]-wrapped tree.
///
/// Handles are cheap to clone. Reading the same nested field repeatedly yields handles over the same storage,
/// so a write through one is visible through all of them (see [`Handle::ptr_eq`]).
#[derive(Clone)]
pub struct Handle {
	target: Shared,
	subscribers: Rc<Subscribers>,
}

impl Debug for Handle {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handle").field("target", &Rc::as_ptr(&self.target)).field("snapshot", &self.snapshot()).finish()
	}
}

impl Handle {
	fn read(&self, slot: &Slot) -> Field {
		match slot {
			Slot::Primitive(value) => Field::Value(value.clone()),
			Slot::Composite(composite) => Field::Handle(Handle {
				target: Rc::clone(composite),
				subscribers: Rc::clone(&self.subscribers),
			}),
		}
	}

	/// Whether both handles view the same underlying map or list.
	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.target, &other.target)
	}

	#[must_use]
	pub fn is_map(&self) -> bool {
		matches!(&*self.target.borrow(), Composite::Map(_))
	}

	#[must_use]
	pub fn is_list(&self) -> bool {
		matches!(&*self.target.borrow(), Composite::List(_))
	}

	/// Reads a map entry, or a list item if `key` parses as index.
	#[must_use]
	pub fn get(&self, key: &str) -> Option<Field> {
		let target = self.target.borrow();
		let slot = match &*target {
			Composite::Map(map) => map.get(key),
			Composite::List(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
		};
		slot.map(|slot| self.read(slot))
	}

	/// Reads a list item.
	#[must_use]
	pub fn at(&self, index: usize) -> Option<Field> {
		match &*self.target.borrow() {
			Composite::List(items) => items.get(index).map(|slot| self.read(slot)),
			Composite::Map(_) => None,
		}
	}

	/// Reads along a `.`-separated path, for example `"tasks.0.name"`.
	#[must_use]
	pub fn get_path(&self, path: &str) -> Option<Field> {
		let mut segments = path.split('.');
		let mut field = self.get(segments.next()?)?;
		for segment in segments {
			field = field.as_handle()?.get(segment)?;
		}
		Some(field)
	}

	/// Reads a nested map or list.
	#[must_use]
	pub fn field(&self, key: &str) -> Option<Handle> {
		self.get(key).and_then(Field::into_handle)
	}

	#[must_use]
	pub fn get_str(&self, key: &str) -> Option<String> {
		self.get(key).and_then(|field| field.as_str().map(ToOwned::to_owned))
	}

	#[must_use]
	pub fn get_bool(&self, key: &str) -> Option<bool> {
		self.get(key).and_then(|field| field.as_bool())
	}

	#[must_use]
	pub fn get_i64(&self, key: &str) -> Option<i64> {
		self.get(key).and_then(|field| field.as_i64())
	}

	/// The number of map entries or list items.
	#[must_use]
	pub fn len(&self) -> usize {
		match &*self.target.borrow() {
			Composite::Map(map) => map.len(),
			Composite::List(items) => items.len(),
		}
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Map keys in unspecified order, or list indices as strings.
	#[must_use]
	pub fn keys(&self) -> Vec<String> {
		match &*self.target.borrow() {
			Composite::Map(map) => map.keys().cloned().collect(),
			Composite::List(items) => (0..items.len()).map(|index| index.to_string()).collect(),
		}
	}

	/// List items in order, or map values in unspecified order.
	#[must_use]
	pub fn items(&self) -> Vec<Field> {
		match &*self.target.borrow() {
			Composite::Map(map) => map.values().map(|slot| self.read(slot)).collect(),
			Composite::List(items) => items.iter().map(|slot| self.read(slot)).collect(),
		}
	}

	/// A deep, non-reactive copy of the current data.
	#[must_use]
	pub fn snapshot(&self) -> Value {
		Slot::Composite(Rc::clone(&self.target)).snapshot()
	}

	/// Turns an assigned value into storage for this tree.
	///
	/// Handles of this store are shared, handles of another store are deep-copied.
	fn adopt(&self, field: Field) -> Result<Slot, StoreError> {
		match field {
			Field::Value(value) => Ok(value.into()),
			Field::Handle(handle) if !Rc::ptr_eq(&handle.subscribers, &self.subscribers) => {
				trace!("Copying a handle of another store.");
				Ok(handle.snapshot().into())
			}
			Field::Handle(handle) => {
				let slot = Slot::Composite(handle.target);
				if slot.contains(&self.target) {
					return Err(StoreError::Cycle);
				}
				Ok(slot)
			}
		}
	}

	/// Runs `write` against the target, then notifies subscribers iff it succeeded.
	///
	/// The target's borrow ends before any subscriber runs.
	fn write<T>(&self, write: impl FnOnce(&mut Composite) -> Result<T, StoreError>) -> Result<T, StoreError> {
		let result = write(&mut *self.target.borrow_mut())?;
		self.subscribers.notify();
		Ok(result)
	}

	/// Writes a map entry, or a list item if `key` parses as index (see [`Handle::set_at`]).
	///
	/// # Errors
	///
	/// Iff this is a list and `key` is not an index in `0..=len`,
	/// or `value` is a handle that is or contains this one.
	pub fn set(&self, key: &str, value: impl Into<Field>) -> Result<(), StoreError> {
		let slot = self.adopt(value.into())?;
		trace!(key = key, "Setting field.");
		self.write(|target| match target {
			Composite::Map(map) => {
				map.insert(key.to_owned(), slot);
				Ok(())
			}
			Composite::List(items) => match key.parse::<usize>() {
				Ok(index) => set_item(items, index, slot),
				Err(_) => Err(StoreError::NotAMap { found: "a list" }),
			},
		})
	}

	/// Replaces a list item. Writing at `len` appends.
	///
	/// # Errors
	///
	/// Iff this is not a list, `index > len`, or `value` is a handle that is or contains this one.
	pub fn set_at(&self, index: usize, value: impl Into<Field>) -> Result<(), StoreError> {
		let slot = self.adopt(value.into())?;
		self.write(|target| match target {
			Composite::List(items) => set_item(items, index, slot),
			other => Err(StoreError::NotAList { found: other.kind() }),
		})
	}

	/// Writes along a `.`-separated path. All but the last segment must name existing maps or lists.
	///
	/// # Errors
	///
	/// Iff the path is empty, an intermediate segment is missing or primitive, or the final write fails.
	pub fn set_path(&self, path: &str, value: impl Into<Field>) -> Result<(), StoreError> {
		if path.is_empty() {
			return Err(StoreError::EmptyPath);
		}
		let (parent, key) = match path.rsplit_once('.') {
			Some((parent, key)) => {
				let parent = match self.get_path(parent) {
					Some(Field::Handle(handle)) => handle,
					_ => return Err(StoreError::MissingPath { segment: parent.to_owned() }),
				};
				(parent, key)
			}
			None => (self.clone(), path),
		};
		parent.set(key, value)
	}

	/// Appends to a list, notifying once.
	///
	/// # Errors
	///
	/// Iff this is not a list or `value` is a handle that is or contains this one.
	pub fn push(&self, value: impl Into<Field>) -> Result<(), StoreError> {
		let slot = self.adopt(value.into())?;
		self.write(|target| match target {
			Composite::List(items) => {
				items.push(slot);
				Ok(())
			}
			other => Err(StoreError::NotAList { found: other.kind() }),
		})
	}

	/// Removes and returns a list item.
	///
	/// # Errors
	///
	/// Iff this is not a list or `index` is out of bounds.
	pub fn remove(&self, index: usize) -> Result<Field, StoreError> {
		let removed = self.write(|target| match target {
			Composite::List(items) if index < items.len() => Ok(items.remove(index)),
			Composite::List(items) => Err(StoreError::IndexOutOfBounds { index, len: items.len() }),
			other => Err(StoreError::NotAList { found: other.kind() }),
		})?;
		Ok(self.read(&removed))
	}

	/// Removes a map entry, returning it if present.
	///
	/// # Errors
	///
	/// Iff this is not a map.
	pub fn remove_key(&self, key: &str) -> Result<Option<Field>, StoreError> {
		let removed = self.write(|target| match target {
			Composite::Map(map) => Ok(map.remove(key)),
			other => Err(StoreError::NotAMap { found: other.kind() }),
		})?;
		Ok(removed.map(|slot| self.read(&slot)))
	}

	/// Keeps only the list items for which `keep` returns `true`, notifying once.
	///
	/// `keep` runs before the list is borrowed mutably, so it may read through other handles.
	///
	/// # Errors
	///
	/// Iff this is not a list.
	pub fn retain(&self, mut keep: impl FnMut(&Field) -> bool) -> Result<(), StoreError> {
		if !self.is_list() {
			return Err(StoreError::NotAList { found: "a map" });
		}
		let verdicts: Vec<bool> = self.items().iter().map(|item| keep(item)).collect();
		self.write(|target| match target {
			Composite::List(items) => {
				let mut verdicts = verdicts.into_iter();
				items.retain(|_| verdicts.next().unwrap_or(true));
				Ok(())
			}
			other => Err(StoreError::NotAList { found: other.kind() }),
		})
	}
}

fn set_item(items: &mut Vec<Slot>, index: usize, slot: Slot) -> Result<(), StoreError> {
	match index.cmp(&items.len()) {
		core::cmp::Ordering::Less => {
			items[index] = slot;
			Ok(())
		}
		core::cmp::Ordering::Equal => {
			items.push(slot);
			Ok(())
		}
		core::cmp::Ordering::Greater => Err(StoreError::IndexOutOfBounds { index, len: items.len() }),
	}
}
