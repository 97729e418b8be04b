//! A thin router over the URL fragment.
//!
//! Routes are normalized by stripping a leading `#` and then a leading `/`,
//! so the root route is the empty string and `""`, `"#"`, `"/"` and `"#/"` all compare equal.

use crate::error::RouterError;
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use std::rc::Rc;
use tracing::{debug, error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast};

/// Normalizes a URL fragment or route name for comparison.
#[must_use]
pub fn normalize_route(route: &str) -> &str {
	let route = route.strip_prefix('#').unwrap_or(route);
	route.strip_prefix('/').unwrap_or(route)
}

type Callback = Rc<dyn Fn(&str)>;

/// The `hashchange` registration, undone on drop.
struct HashChangeListener {
	window: web_sys::Window,
	closure: Closure<dyn Fn()>,
}

impl Drop for HashChangeListener {
	fn drop(&mut self) {
		if let Err(error) = self.window.remove_event_listener_with_callback("hashchange", self.closure.as_ref().unchecked_ref()) {
			warn!("Failed to remove `hashchange` listener: {:?}", error)
		}
	}
}

#[derive(Default)]
struct State {
	current: String,
	callback: Option<Callback>,
}

/// Owns the last-seen route and the navigation callback.
///
/// Cloning a [`Router`] yields another reference to the same state.
/// The `hashchange` listener registered by [`Router::init`] lives as long as the last clone.
#[derive(Clone, Default)]
pub struct Router {
	state: Rc<RefCell<State>>,
	listener: Rc<RefCell<Option<HashChangeListener>>>,
}

impl Debug for Router {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		let mut debug = f.debug_struct("Router");
		if cfg!(feature = "dangerous-logging") {
			debug.field("current", &state.current);
		}
		debug.field("has_callback", &state.callback.is_some()).field("listening", &self.listener.borrow().is_some()).finish()
	}
}

impl Router {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `on_change` and starts listening for `hashchange` on the global `window`.
	///
	/// `on_change` is called once immediately with the current route, and again on each navigation.
	/// It should only write application state.
	/// Calling this again replaces both the callback and the listener.
	///
	/// # Errors
	///
	/// Iff there is no global `window` or the listener can't be registered.
	/// The previous callback and listener then stay in place.
	#[instrument(skip(on_change))]
	pub fn init(&self, on_change: impl Fn(&str) + 'static) -> Result<(), RouterError> {
		let window = web_sys::window().ok_or(RouterError::NoWindow)?;

		let weak_state = Rc::downgrade(&self.state);
		let listener_window = window.clone();
		let closure = Closure::wrap(Box::new(move || {
			let state = match weak_state.upgrade() {
				Some(state) => state,
				None => {
					trace!("Router is gone. Ignoring `hashchange`.");
					return;
				}
			};
			match listener_window.location().hash() {
				Ok(hash) => Router::sync_state(&state, &hash),
				Err(error) => error!("Failed to read `location.hash`: {:?}", error),
			}
		}) as Box<dyn Fn()>);
		window
			.add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref())
			.map_err(|error| RouterError::dom("addEventListener", &error))?;

		// Only once registration succeeded. This also drops the previous listener, if any.
		*self.listener.borrow_mut() = Some(HashChangeListener { window: window.clone(), closure });
		self.set_callback(on_change);

		let hash = window.location().hash().map_err(|error| RouterError::dom("location.hash", &error))?;
		self.sync_from_hash(&hash);
		Ok(())
	}

	/// Replaces the navigation callback without listening for `hashchange` or calling it.
	///
	/// Combine with [`Router::sync_from_hash`] to drive a router without a browser `window`.
	pub fn set_callback(&self, on_change: impl Fn(&str) + 'static) {
		self.state.borrow_mut().callback = Some(Rc::new(on_change));
	}

	/// Records `hash` as current route and calls the navigation callback with the normalized route.
	///
	/// This is what the `hashchange` listener calls.
	pub fn sync_from_hash(&self, hash: &str) {
		Self::sync_state(&self.state, hash)
	}

	fn sync_state(state: &RefCell<State>, hash: &str) {
		let route = normalize_route(hash).to_owned();
		let callback = {
			let mut state = state.borrow_mut();
			state.current.clone_from(&route);
			state.callback.clone()
		};
		if cfg!(feature = "dangerous-logging") {
			debug!("Route changed to {:?}.", route);
		} else {
			debug!("Route changed.");
		}
		// Cloned out, so the callback may query the router.
		if let Some(callback) = callback {
			callback(&route)
		}
	}

	/// The last-seen route, normalized.
	#[must_use]
	pub fn current_route(&self) -> String {
		self.state.borrow().current.clone()
	}

	/// Whether `route` equals the last-seen route after normalizing both.
	///
	/// Meant for presentation only (e.g. highlighting a link), never as source of truth for application data.
	#[must_use]
	pub fn is_active_route(&self, route: &str) -> bool {
		normalize_route(route) == self.state.borrow().current
	}

	/// Sets `location.hash`. The browser then fires `hashchange`, which reaches the callback asynchronously.
	///
	/// # Errors
	///
	/// Iff there is no global `window` or the hash can't be set.
	pub fn navigate(&self, route: &str) -> Result<(), RouterError> {
		let window = web_sys::window().ok_or(RouterError::NoWindow)?;
		window
			.location()
			.set_hash(&format!("#/{}", normalize_route(route)))
			.map_err(|error| RouterError::dom("location.hash", &error))
	}
}
