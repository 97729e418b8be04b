#![doc(html_root_url = "https://docs.rs/twig-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod error;
pub mod load;
pub mod mount;
pub mod render;
pub mod router;
pub mod store;
pub mod vnode;

pub use error::{MountError, RouterError, StoreError, StructureError, TargetError};
pub use mount::{mount, Content, MountPoint};
pub use render::Renderer;
pub use router::Router;
pub use store::{Field, Handle, Store, Subscription};
pub use vnode::{build, handler, AttrValue, Attrs, Child, Descriptor};
