//! Field value generators.
//!
//! A generator reads the parsed tags of the field it is bound to and
//! returns a [`Value`]. Built-ins live in [`primitives`] (one per scalar
//! kind plus sequence and struct allocation) and [`semantic`] (phone
//! numbers, e-mail addresses, postal addresses, times).

use rand::RngCore;

use crate::context::Context;
use crate::errors::GenerationError;
use crate::registry::GeneratorRegistry;
use crate::schema::{FieldRef, Kind};
use crate::tags::TagSet;
use crate::value::Value;

pub mod primitives;
pub(crate) mod range;
pub mod semantic;

pub use range::MAX_LENGTH;

pub const SLICE: &str = "slice";
pub const STRUCT: &str = "struct";
pub const STRING: &str = "string";
pub const INTEGER: &str = "integer";
pub const DECIMAL: &str = "decimal";
pub const BOOL: &str = "bool";
pub const MOBILE_PHONE: &str = "mobile_phone";
pub const EMAIL: &str = "email";
pub const ADDRESS: &str = "addr";
pub const TIME: &str = "time";

/// Everything a generator can see for one call.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub field: FieldRef<'a>,
    pub context: &'a Context,
}

impl<'a> GeneratorContext<'a> {
    pub fn tags(&self) -> &'a TagSet {
        &self.field.node().tags
    }

    pub fn kind(&self) -> Kind {
        self.field.kind()
    }

    pub fn alias(&self) -> &'a str {
        &self.field.node().alias
    }

    pub fn is_ptr(&self) -> bool {
        self.field.is_ptr()
    }

    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&'a T> {
        self.context.value::<T>()
    }

    pub(crate) fn unsupported(&self, generator: &str) -> GenerationError {
        GenerationError::Unsupported(format!(
            "{generator} generator cannot fill {} field {}",
            self.kind(),
            self.alias()
        ))
    }
}

pub trait Generator: Send + Sync {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError>;
}

pub struct FnGenerator<F>(F);

impl<F> Generator for FnGenerator<F>
where
    F: Fn(&GeneratorContext<'_>, &mut dyn RngCore) -> Result<Value, GenerationError> + Send + Sync,
{
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        (self.0)(ctx, rng)
    }
}

/// Wraps a closure as a [`Generator`].
pub fn from_fn<F>(generate: F) -> FnGenerator<F>
where
    F: Fn(&GeneratorContext<'_>, &mut dyn RngCore) -> Result<Value, GenerationError> + Send + Sync,
{
    FnGenerator(generate)
}

/// Generator used for scalar fields that name no `key`.
pub fn default_key(kind: Kind) -> Option<&'static str> {
    match kind {
        Kind::Bool => Some(BOOL),
        Kind::Int(_) | Kind::Uint(_) => Some(INTEGER),
        Kind::Float(_) => Some(DECIMAL),
        Kind::String => Some(STRING),
        Kind::Slice | Kind::Struct => None,
    }
}

pub fn register_defaults(registry: &GeneratorRegistry) {
    primitives::register(registry);
    semantic::register(registry);
}
