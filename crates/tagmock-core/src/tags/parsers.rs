//! Built-in tag parsers.

use std::str::FromStr;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};

use tagmock_regen::Pattern;

use crate::registry::TagParserRegistry;
use crate::schema::Kind;
use crate::tags::{
    ADDR, EQ, GT, GTE, INTO, KEY, LIST_SEPARATOR, LT, LTE, OPTIONS, REG, SKIP, TIME, TagError,
    TagParser, TagValue, WEIGHTS,
};

/// Address levels accepted by `addr`.
pub const ADDRESS_LEVELS: [&str; 3] = ["province", "city", "county"];
/// `time` values for integer fields.
pub const TIMESTAMP_SECONDS: &str = "ts_s";
pub const TIMESTAMP_MILLIS: &str = "ts_ms";

pub fn register(registry: &TagParserRegistry) {
    registry.register(KEY, Arc::new(TextParser));
    registry.register(INTO, Arc::new(TextParser));
    registry.register(SKIP, Arc::new(TextParser));
    registry.register(EQ, Arc::new(EqualParser));
    for key in [GT, GTE, LT, LTE] {
        registry.register(key, Arc::new(NumberParser));
    }
    registry.register(OPTIONS, Arc::new(OptionsParser));
    registry.register(WEIGHTS, Arc::new(WeightsParser));
    registry.register(ADDR, Arc::new(AddressParser));
    registry.register(TIME, Arc::new(TimeParser));
    registry.register(REG, Arc::new(PatternParser));
}

/// Keeps the raw value as text.
struct TextParser;

impl TagParser for TextParser {
    fn parse(&self, _kind: Kind, _key: &str, value: &str) -> Result<TagValue, TagError> {
        Ok(TagValue::Text(value.to_string()))
    }
}

/// `eq`: typed by the field kind. Sequences read it as a length.
struct EqualParser;

impl TagParser for EqualParser {
    fn parse(&self, kind: Kind, key: &str, value: &str) -> Result<TagValue, TagError> {
        match kind {
            Kind::Bool => parse_scalar(key, value).map(TagValue::Bool),
            Kind::Int(_) | Kind::Uint(_) | Kind::Slice => parse_scalar(key, value).map(TagValue::Int),
            Kind::Float(_) => parse_scalar(key, value).map(TagValue::Float),
            Kind::String | Kind::Struct => Ok(TagValue::Text(value.to_string())),
        }
    }
}

/// `gt`, `gte`, `lt`, `lte`: floats for decimal fields, integers otherwise.
struct NumberParser;

impl TagParser for NumberParser {
    fn parse(&self, kind: Kind, key: &str, value: &str) -> Result<TagValue, TagError> {
        if kind.is_float() {
            parse_scalar(key, value).map(TagValue::Float)
        } else {
            parse_scalar(key, value).map(TagValue::Int)
        }
    }
}

/// `options`: space-separated candidates typed by the field kind.
struct OptionsParser;

impl TagParser for OptionsParser {
    fn parse(&self, kind: Kind, key: &str, value: &str) -> Result<TagValue, TagError> {
        let items = list_items(value);
        if items.is_empty() {
            return Err(TagError::new(format!("{key} must list at least one value")));
        }
        match kind {
            Kind::Bool => parse_list(key, &items).map(TagValue::BoolList),
            Kind::Int(_) | Kind::Uint(_) => parse_list(key, &items).map(TagValue::IntList),
            Kind::Float(_) => parse_list(key, &items).map(TagValue::FloatList),
            _ => Ok(TagValue::TextList(
                items.into_iter().map(str::to_string).collect(),
            )),
        }
    }
}

/// `weights`: positive integers paired with `options` by position.
struct WeightsParser;

impl TagParser for WeightsParser {
    fn parse(&self, _kind: Kind, key: &str, value: &str) -> Result<TagValue, TagError> {
        let weights: Vec<i128> = parse_list(key, &list_items(value))?;
        if weights.is_empty() {
            return Err(TagError::new(format!("{key} must list at least one weight")));
        }
        if let Some(weight) = weights.iter().find(|weight| **weight <= 0) {
            return Err(TagError::new(format!("{key} must be positive, got {weight}")));
        }
        Ok(TagValue::IntList(weights))
    }
}

/// `addr`: a subset of province, city and county.
struct AddressParser;

impl TagParser for AddressParser {
    fn parse(&self, _kind: Kind, key: &str, value: &str) -> Result<TagValue, TagError> {
        let levels = list_items(value);
        if levels.is_empty() {
            return Err(TagError::new(format!("{key} must name at least one level")));
        }
        if let Some(level) = levels.iter().find(|level| !ADDRESS_LEVELS.contains(level)) {
            return Err(TagError::new(format!(
                "unknown address level '{level}', expected one of {}",
                ADDRESS_LEVELS.join(", ")
            )));
        }
        Ok(TagValue::TextList(
            levels.into_iter().map(str::to_string).collect(),
        ))
    }
}

/// `time`: a timestamp unit for integers, a strftime layout for strings.
struct TimeParser;

impl TagParser for TimeParser {
    fn parse(&self, kind: Kind, key: &str, value: &str) -> Result<TagValue, TagError> {
        if kind.is_integer() {
            if value == TIMESTAMP_SECONDS || value == TIMESTAMP_MILLIS {
                return Ok(TagValue::Text(value.to_string()));
            }
            return Err(TagError::new(format!(
                "{key} on integers must be {TIMESTAMP_SECONDS} or {TIMESTAMP_MILLIS}"
            )));
        }
        if kind != Kind::String {
            return Err(TagError::new(format!("{key} needs an integer or string field")));
        }
        if value.is_empty() {
            return Err(TagError::new(format!("{key} layout must not be empty")));
        }
        if StrftimeItems::new(value).any(|item| matches!(item, Item::Error)) {
            return Err(TagError::new(format!("invalid time layout '{value}'")));
        }
        Ok(TagValue::Text(value.to_string()))
    }
}

/// `reg`: compiled once here and shared by every generation.
struct PatternParser;

impl TagParser for PatternParser {
    fn parse(&self, _kind: Kind, _key: &str, value: &str) -> Result<TagValue, TagError> {
        let pattern = Pattern::new(value).map_err(|err| TagError::new(err.to_string()))?;
        Ok(TagValue::Pattern(Arc::new(pattern)))
    }
}

fn list_items(value: &str) -> Vec<&str> {
    value
        .split(LIST_SEPARATOR)
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_scalar<T: FromStr>(key: &str, value: &str) -> Result<T, TagError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| TagError::new(format!("cannot read '{value}' as a {key} value")))
}

fn parse_list<T: FromStr>(key: &str, items: &[&str]) -> Result<Vec<T>, TagError> {
    items.iter().map(|item| parse_scalar(key, item)).collect()
}
