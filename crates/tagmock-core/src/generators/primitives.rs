use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::data::LETTERS;
use crate::errors::GenerationError;
use crate::generators::range::{self, DEFAULT_LENGTH_LIMIT, MAX_LENGTH};
use crate::generators::{
    BOOL, DECIMAL, Generator, GeneratorContext, INTEGER, SLICE, STRING, STRUCT,
};
use crate::registry::GeneratorRegistry;
use crate::schema::Kind;
use crate::tags::{EQ, OPTIONS, ParsedTag, REG};
use crate::value::Value;

pub fn register(registry: &GeneratorRegistry) {
    registry.register(SLICE, Arc::new(SliceGenerator));
    registry.register(STRUCT, Arc::new(StructGenerator));
    registry.register(STRING, Arc::new(StringGenerator));
    registry.register(INTEGER, Arc::new(IntegerGenerator));
    registry.register(DECIMAL, Arc::new(DecimalGenerator));
    registry.register(BOOL, Arc::new(BoolGenerator));
}

/// Resizes a sequence from `eq` or a `gt`/`gte`/`lt`/`lte` length range.
pub struct SliceGenerator;

impl Generator for SliceGenerator {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        if ctx.kind() != Kind::Slice {
            return Err(ctx.unsupported(SLICE));
        }
        let tags = ctx.tags();
        if let Some(eq) = tags.get(EQ) {
            let len = eq.as_int().ok_or_else(|| tag_type_error(ctx, eq, "an integer"))?;
            return Ok(Value::Length(to_len(ctx, len)?));
        }
        match random_len(ctx, rng) {
            Some(len) => Ok(Value::Length(to_len(ctx, len)?)),
            None => Ok(Value::Zero),
        }
    }
}

/// Allocates an empty pointer to a struct so its fields can be filled.
pub struct StructGenerator;

impl Generator for StructGenerator {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        if ctx.kind() != Kind::Struct {
            return Err(ctx.unsupported(STRUCT));
        }
        Ok(Value::Allocate)
    }
}

/// Strings from `eq`, `options`, `reg` or random letters of a ranged length.
pub struct StringGenerator;

impl Generator for StringGenerator {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        if ctx.kind() != Kind::String {
            return Err(ctx.unsupported(STRING));
        }
        let tags = ctx.tags();
        if let Some(eq) = tags.get(EQ) {
            let text = eq.as_text().ok_or_else(|| tag_type_error(ctx, eq, "text"))?;
            return Ok(Value::Text(text.to_string()));
        }
        if let Some(options) = tags.get(OPTIONS) {
            let options = options
                .text_list()
                .ok_or_else(|| tag_type_error(ctx, options, "a text list"))?;
            return Ok(range::pick(options, tags, rng).map_or(Value::Zero, |text| Value::Text(text.clone())));
        }
        if let Some(pattern) = tags.get(REG).and_then(ParsedTag::pattern) {
            return Ok(Value::Text(pattern.generate(rng)));
        }
        let Some(len) = random_len(ctx, rng) else {
            return Ok(Value::Zero);
        };
        Ok(Value::Text(random_letters(rng, to_len(ctx, len)?)))
    }
}

/// Integers from `eq`, `options`, `reg` or a range clamped to the field width.
pub struct IntegerGenerator;

impl Generator for IntegerGenerator {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let Some((min, max)) = ctx.kind().int_bounds() else {
            return Err(ctx.unsupported(INTEGER));
        };
        let tags = ctx.tags();
        if let Some(eq) = tags.get(EQ) {
            let value = eq.as_int().ok_or_else(|| tag_type_error(ctx, eq, "an integer"))?;
            return Ok(Value::Int(value));
        }
        if let Some(options) = tags.get(OPTIONS) {
            let options = options
                .int_list()
                .ok_or_else(|| tag_type_error(ctx, options, "an integer list"))?;
            return Ok(range::pick(options, tags, rng).map_or(Value::Zero, |value| Value::Int(*value)));
        }
        if let Some(pattern) = tags.get(REG).and_then(ParsedTag::pattern) {
            let text = pattern.generate(rng);
            return text.parse::<i128>().map(Value::Int).map_err(|_| {
                GenerationError::Failed(format!("pattern output '{text}' is not an integer"))
            });
        }
        let Some((lower, upper)) = range::half_open(tags, ParsedTag::as_int, min, max + 1) else {
            return Ok(Value::Zero);
        };
        let (lower, upper) = (lower.max(min), upper.min(max + 1));
        if lower >= upper {
            return Ok(Value::Zero);
        }
        Ok(Value::Int(range::sample(rng, lower, upper)))
    }
}

/// Decimals from `eq`, `options`, `reg` or a range sampled at the precision
/// of the bounds as written.
pub struct DecimalGenerator;

impl Generator for DecimalGenerator {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        if !ctx.kind().is_float() {
            return Err(ctx.unsupported(DECIMAL));
        }
        let tags = ctx.tags();
        if let Some(eq) = tags.get(EQ) {
            let value = eq.as_float().ok_or_else(|| tag_type_error(ctx, eq, "a decimal"))?;
            return Ok(Value::Float(value));
        }
        if let Some(options) = tags.get(OPTIONS) {
            let options = options
                .float_list()
                .ok_or_else(|| tag_type_error(ctx, options, "a decimal list"))?;
            return Ok(range::pick(options, tags, rng).map_or(Value::Zero, |value| Value::Float(*value)));
        }
        if let Some(pattern) = tags.get(REG).and_then(ParsedTag::pattern) {
            let text = pattern.generate(rng);
            return text.parse::<f64>().map(Value::Float).map_err(|_| {
                GenerationError::Failed(format!("pattern output '{text}' is not a decimal"))
            });
        }
        let scale = range::decimal_scale(tags);
        let factor = scale as f64;
        let read = |tag: &ParsedTag| tag.as_float().map(|value| (value * factor).round() as i128);
        let bounds = range::half_open(
            tags,
            read,
            i128::from(i64::MIN),
            i128::from(i64::MAX) + 1,
        );
        let Some((lower, upper)) = bounds else {
            return Ok(Value::Zero);
        };
        Ok(Value::Float(range::sample(rng, lower, upper) as f64 / factor))
    }
}

/// Booleans from `eq`, weighted `options`, or a fair coin.
pub struct BoolGenerator;

impl Generator for BoolGenerator {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        if ctx.kind() != Kind::Bool {
            return Err(ctx.unsupported(BOOL));
        }
        let tags = ctx.tags();
        if let Some(eq) = tags.get(EQ) {
            let value = eq.as_bool().ok_or_else(|| tag_type_error(ctx, eq, "a boolean"))?;
            return Ok(Value::Bool(value));
        }
        if let Some(options) = tags.get(OPTIONS) {
            let options = options
                .bool_list()
                .ok_or_else(|| tag_type_error(ctx, options, "a boolean list"))?;
            return Ok(range::pick(options, tags, rng).map_or(Value::Zero, |value| Value::Bool(*value)));
        }
        Ok(Value::Bool(rng.random_bool(0.5)))
    }
}

/// Length drawn from the field's bounds. Negative lower bounds produce nothing.
fn random_len(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> Option<i128> {
    let (lower, upper) = range::half_open(ctx.tags(), ParsedTag::as_int, 0, DEFAULT_LENGTH_LIMIT)?;
    if lower < 0 {
        return None;
    }
    Some(range::sample(rng, lower, upper))
}

fn to_len(ctx: &GeneratorContext<'_>, len: i128) -> Result<usize, GenerationError> {
    usize::try_from(len.max(0))
        .ok()
        .filter(|len| *len <= MAX_LENGTH)
        .ok_or_else(|| {
            GenerationError::Failed(format!(
                "length {len} on {} exceeds the limit of {MAX_LENGTH}",
                ctx.alias()
            ))
        })
}

pub(crate) fn random_letters(rng: &mut dyn RngCore, len: usize) -> String {
    (0..len)
        .map(|_| char::from(LETTERS[rng.random_range(0..LETTERS.len())]))
        .collect()
}

fn tag_type_error(ctx: &GeneratorContext<'_>, tag: &ParsedTag, expected: &str) -> GenerationError {
    GenerationError::Failed(format!(
        "{}={} on {} is not {expected}",
        tag.key(),
        tag.raw(),
        ctx.alias()
    ))
}
