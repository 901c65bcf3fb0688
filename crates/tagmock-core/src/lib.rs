//! Tag-driven mock data for Rust structs.
//!
//! Fields opt in with `#[tag(mock = "...")]`: a list of `key=value` tokens
//! that pick a generator and constrain its output. A [`Mocker`] compiles the
//! tags of each type once into a [`Schema`] and then fills live values from
//! it.
//!
//! ```ignore
//! use tagmock_core::{Mockable, Mocker};
//!
//! #[derive(Debug, Default, Mockable)]
//! struct User {
//!     #[tag(mock = "key=integer,gte=1,lte=100")]
//!     id: u32,
//!     #[tag(mock = "key=email")]
//!     email: String,
//!     #[tag(mock = "gte=1,lte=3,into,options=rust go zig")]
//!     languages: Vec<String>,
//! }
//!
//! let mut user = User::default();
//! Mocker::new().generate_into(&mut user)?;
//! ```

pub mod context;
pub mod data;
pub mod errors;
pub mod generators;
pub mod mockable;
pub mod options;
pub mod registry;
pub mod schema;
pub mod tags;
pub mod value;

mod materialize;
mod mocker;

pub use context::{CancelHandle, Context, ContextError};
pub use errors::{ConfigError, Error, GenerationError, InputError, SchemaError};
pub use generators::{Generator, GeneratorContext, from_fn};
pub use mockable::{FieldInfo, FloatWidth, IntWidth, Mockable, Shape, TypeInfo};
pub use mocker::Mocker;
pub use options::MockOptions;
pub use schema::{FieldNode, FieldRef, Kind, NodeId, Schema};
pub use tags::{ParsedTag, TagError, TagParser, TagSet, TagValue, parser_fn};
pub use value::{AssignError, Value};

pub use tagmock_derive::Mockable;
pub use tagmock_regen::{Pattern, PatternError, generate as generate_matching};
