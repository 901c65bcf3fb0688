use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::errors::SchemaError;
use crate::schema::Schema;

/// Compiled schemas keyed by pointer-free type. Lookups take a read lock;
/// compilation is serialized and only successful results are stored.
#[derive(Debug, Default)]
pub(crate) struct SchemaCache {
    compile_lock: Mutex<()>,
    entries: RwLock<HashMap<TypeId, Arc<Schema>>>,
}

impl SchemaCache {
    pub(crate) fn get(&self, id: TypeId) -> Option<Arc<Schema>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub(crate) fn get_or_compile<F>(&self, id: TypeId, compile: F) -> Result<Arc<Schema>, SchemaError>
    where
        F: FnOnce() -> Result<Schema, SchemaError>,
    {
        if let Some(schema) = self.get(id) {
            trace!(type_name = schema.type_name(), "schema cache hit");
            return Ok(schema);
        }
        let _guard = self.compile_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = self.get(id) {
            debug!(type_name = schema.type_name(), "schema compiled by another caller");
            return Ok(schema);
        }
        let schema = Arc::new(compile()?);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&schema));
        Ok(schema)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
