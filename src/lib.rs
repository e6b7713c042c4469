//! Stache - Mustache Template Engine
//!
//! Templates are compiled once with an [`Engine`], then rendered any number
//! of times against one or more [`Value`] roots.
//!
//! ```
//! use stache::{Engine, Store};
//!
//! let template = Engine::new().compile("{{#people}}<li>{{name}}</li>{{/people}}").unwrap();
//! let store = Store::new().with_must(
//!     "people",
//!     serde_json::json!([{"name": "Rob"}, {"name": "Luna"}]),
//! );
//!
//! assert_eq!(
//!     template.render(&[store.into()]).unwrap(),
//!     "<li>Rob</li><li>Luna</li>"
//! );
//! ```
mod compile;
mod engine;
mod log;
mod partial;
mod pipe;
mod region;
mod render;
mod store;
mod tag;
mod value;

pub mod escape;

pub use compile::{compile, tree, Delimiters, Scope, Template};
pub use engine::Engine;
pub use escape::Escape;
pub use log::{Error, ErrorKind, Pointer, Visual};
pub use partial::{FileProvider, PartialProvider, StaticProvider};
pub use region::Region;
pub use store::Store;
pub use tag::{Kind, Tag};
pub use value::{Lambda, Map, Record, Render, Value};
