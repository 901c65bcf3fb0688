use thiserror::Error;

use tagmock_regen::PatternError;

use crate::context::ContextError;
use crate::value::AssignError;

/// Errors raised while compiling a type into a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field {field}: unsupported kind {kind}")]
    UnsupportedKind { field: String, kind: &'static str },
    #[error("field {field}: unknown tag '{key}'")]
    UnknownTag { field: String, key: String },
    #[error("field {field}: unknown generator '{key}'")]
    UnknownGenerator { field: String, key: String },
    #[error("field {field}: invalid tag {key}={value}: {reason}")]
    InvalidTag {
        field: String,
        key: String,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Errors raised by a generator for a single field.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation failed: {0}")]
    Failed(String),
    #[error("unsupported field: {0}")]
    Unsupported(String),
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),
    #[error("assign error: {0}")]
    Assign(#[from] AssignError),
    #[error("generator panicked: {0}")]
    Panicked(String),
}

/// Errors about the target handed to the mocker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{type_name} is not a struct")]
    NotComposite { type_name: &'static str },
    #[error("{type_name} target is empty")]
    Vacant { type_name: &'static str },
}

/// Errors raised while loading mocker options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid options: {0}")]
    Invalid(String),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error returned by [`crate::Mocker`].
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("field {alias}: {source}")]
    Field {
        alias: String,
        #[source]
        source: GenerationError,
    },
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// True when the call stopped because its context was cancelled or timed out.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Error::Context(_) | Error::Schema(SchemaError::Context(_))
        )
    }

    /// Dotted alias of the failing field, when the error belongs to one.
    pub fn field_alias(&self) -> Option<&str> {
        match self {
            Error::Field { alias, .. } => Some(alias),
            Error::Schema(
                SchemaError::UnsupportedKind { field, .. }
                | SchemaError::UnknownTag { field, .. }
                | SchemaError::UnknownGenerator { field, .. }
                | SchemaError::InvalidTag { field, .. },
            ) => Some(field),
            _ => None,
        }
    }
}
