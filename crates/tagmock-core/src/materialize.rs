use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rand::RngCore;
use tracing::warn;

use crate::context::Context;
use crate::errors::{Error, GenerationError};
use crate::generators::GeneratorContext;
use crate::mockable::Mockable;
use crate::schema::{FieldNode, Kind, NodeId, Schema};

/// Walks a schema over a live value in pre-order: each node's own value is
/// assigned before its children are visited.
pub(crate) struct Materializer<'a> {
    schema: &'a Schema,
    context: &'a Context,
    rng: &'a mut dyn RngCore,
}

impl<'a> Materializer<'a> {
    pub(crate) fn new(schema: &'a Schema, context: &'a Context, rng: &'a mut dyn RngCore) -> Self {
        Self {
            schema,
            context,
            rng,
        }
    }

    pub(crate) fn run(&mut self, target: &mut dyn Mockable) -> Result<(), Error> {
        self.visit_struct(target, self.schema.root().id())
    }

    fn visit(&mut self, target: &mut dyn Mockable, id: NodeId) -> Result<(), Error> {
        match self.schema.node(id).kind() {
            Kind::Struct => self.visit_struct(target, id),
            Kind::Slice => self.visit_slice(target, id),
            _ => self.assign(target, id),
        }
    }

    fn visit_struct(&mut self, target: &mut dyn Mockable, id: NodeId) -> Result<(), Error> {
        self.context.check()?;
        self.assign(target, id)?;
        if target.is_vacant() {
            return Ok(());
        }
        let schema = self.schema;
        for &child in schema.node(id).children() {
            let node = schema.node(child);
            let Some(field) = target.field_mut(node.index()) else {
                return Err(field_error(
                    node,
                    GenerationError::Failed(format!(
                        "{} has no field at position {}",
                        schema.node(id).type_name(),
                        node.index()
                    )),
                ));
            };
            self.visit(field, child)?;
        }
        Ok(())
    }

    fn visit_slice(&mut self, target: &mut dyn Mockable, id: NodeId) -> Result<(), Error> {
        self.assign(target, id)?;
        let schema = self.schema;
        let [element] = schema.node(id).children() else {
            return Ok(());
        };
        for position in 0..target.element_count() {
            if let Some(item) = target.element_mut(position) {
                self.visit(item, *element)?;
            }
        }
        Ok(())
    }

    fn assign(&mut self, target: &mut dyn Mockable, id: NodeId) -> Result<(), Error> {
        let schema = self.schema;
        let node = schema.node(id);
        let Some(bound) = node.generator() else {
            return Ok(());
        };
        let ctx = GeneratorContext {
            field: schema.field(id),
            context: self.context,
        };
        let rng = &mut *self.rng;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| bound.generator().generate(&ctx, rng)));
        let value = match outcome {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => return Err(field_error(node, err)),
            Err(payload) => {
                return Err(field_error(
                    node,
                    GenerationError::Panicked(panic_message(payload)),
                ));
            }
        };
        target
            .assign(value)
            .map_err(|err| field_error(node, GenerationError::Assign(err)))
    }
}

fn field_error(node: &FieldNode, source: GenerationError) -> Error {
    warn!(
        field = node.alias(),
        generator = node.generator_key().unwrap_or_default(),
        error = %source,
        "field generation failed"
    );
    Error::Field {
        alias: node.alias().to_string(),
        source,
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "panic during generation".to_string()
}
