use std::fmt;
use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::context::Context;
use crate::errors::{ConfigError, Error, InputError, SchemaError};
use crate::generators::{self, Generator};
use crate::materialize::Materializer;
use crate::mockable::{Mockable, TypeInfo};
use crate::options::MockOptions;
use crate::registry::{GeneratorRegistry, TagParserRegistry};
use crate::schema::Schema;
use crate::schema::cache::SchemaCache;
use crate::schema::compiler::Compiler;
use crate::tags::{self, TagParser, TagSplitter};

/// Fills tagged struct fields with generated values.
///
/// A mocker owns its registries and schema cache and can be shared across
/// threads. Schemas are compiled once per type and reused.
pub struct Mocker {
    options: MockOptions,
    splitter: TagSplitter,
    cache: SchemaCache,
    generators: GeneratorRegistry,
    tag_parsers: TagParserRegistry,
}

impl Mocker {
    pub fn new() -> Self {
        Self::build(MockOptions::default())
    }

    pub fn with_options(options: MockOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self::build(options))
    }

    fn build(options: MockOptions) -> Self {
        let generators = GeneratorRegistry::new();
        generators::register_defaults(&generators);
        let tag_parsers = TagParserRegistry::new();
        tags::parsers::register(&tag_parsers);
        info!(
            tag = options.tag.as_str(),
            separator = options.separator.as_str(),
            seeded = options.seed.is_some(),
            "mocker ready"
        );
        Self {
            splitter: TagSplitter::new(options.separator.as_str()),
            options,
            cache: SchemaCache::default(),
            generators,
            tag_parsers,
        }
    }

    pub fn options(&self) -> &MockOptions {
        &self.options
    }

    /// Registers a generator under `key`. Returns false when the key is
    /// already taken; built-in keys cannot be replaced.
    pub fn register_generator<G>(&self, key: impl Into<String>, generator: G) -> bool
    where
        G: Generator + 'static,
    {
        self.generators.register(key, Arc::new(generator))
    }

    /// Registers a tag parser under `key`, which also makes `key` a valid tag.
    pub fn register_tag_parser<P>(&self, key: impl Into<String>, parser: P) -> bool
    where
        P: TagParser + 'static,
    {
        self.tag_parsers.register(key, Arc::new(parser))
    }

    pub fn generator_keys(&self) -> Vec<String> {
        self.generators.keys()
    }

    pub fn tag_keys(&self) -> Vec<String> {
        self.tag_parsers.keys()
    }

    /// Number of compiled schemas held by the cache.
    pub fn cached_schemas(&self) -> usize {
        self.cache.len()
    }

    /// Compiled schema for `T`, compiling it on first use.
    pub fn schema<T: Mockable>(&self, context: &Context) -> Result<Arc<Schema>, Error> {
        let info = struct_info::<T>()?;
        Ok(self.compile(info, context)?)
    }

    /// Fills `target` using the configured seed or a fresh random one.
    pub fn generate_into<T: Mockable>(&self, target: &mut T) -> Result<(), Error> {
        self.generate_into_ctx(target, &Context::background())
    }

    pub fn generate_into_ctx<T: Mockable>(&self, target: &mut T, context: &Context) -> Result<(), Error> {
        let mut rng = match self.options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        self.generate_into_with_rng(target, context, &mut rng)
    }

    /// Fills `target` drawing all randomness from `rng`.
    pub fn generate_into_with_rng<T: Mockable>(
        &self,
        target: &mut T,
        context: &Context,
        rng: &mut dyn RngCore,
    ) -> Result<(), Error> {
        let info = struct_info::<T>()?;
        if target.is_vacant() {
            return Err(InputError::Vacant {
                type_name: T::type_info().name,
            }
            .into());
        }
        let schema = self.compile(info, context)?;
        Materializer::new(&schema, context, rng).run(target)
    }

    fn compile(&self, info: TypeInfo, context: &Context) -> Result<Arc<Schema>, SchemaError> {
        self.cache.get_or_compile(info.id, || {
            let schema = Compiler::new(
                &self.options.tag,
                &self.splitter,
                &self.generators,
                &self.tag_parsers,
                context,
            )
            .compile(info)?;
            debug!(
                type_name = info.name,
                nodes = schema.len(),
                "schema compiled"
            );
            Ok(schema)
        })
    }
}

impl Default for Mocker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mocker")
            .field("options", &self.options)
            .field("generators", &self.generators)
            .field("tag_parsers", &self.tag_parsers)
            .field("cached_schemas", &self.cache.len())
            .finish()
    }
}

/// Pointer-free type info of `T`, which must be a struct.
fn struct_info<T: Mockable>() -> Result<TypeInfo, InputError> {
    let declared = T::type_info();
    let (info, _) = declared.strip_pointers();
    if !info.is_struct() {
        return Err(InputError::NotComposite {
            type_name: declared.name,
        });
    }
    Ok(info)
}
