//! The field tag language: `key=value` tokens joined by a separator.

use std::sync::Arc;

use thiserror::Error;

use tagmock_regen::Pattern;

use crate::schema::Kind;

pub mod parsers;

pub const TAG_VALUE_SEPARATOR: char = '=';
/// Separator between entries of `options`, `weights` and `addr`.
pub const LIST_SEPARATOR: char = ' ';

pub const KEY: &str = "key";
pub const EQ: &str = "eq";
pub const GT: &str = "gt";
pub const GTE: &str = "gte";
pub const LT: &str = "lt";
pub const LTE: &str = "lte";
pub const OPTIONS: &str = "options";
pub const WEIGHTS: &str = "weights";
pub const INTO: &str = "into";
pub const SKIP: &str = "-";
pub const ADDR: &str = "addr";
pub const TIME: &str = "time";
pub const REG: &str = "reg";

/// Typed value of a parsed tag.
#[derive(Debug, Clone)]
pub enum TagValue {
    Text(String),
    Int(i128),
    Float(f64),
    Bool(bool),
    IntList(Vec<i128>),
    FloatList(Vec<f64>),
    TextList(Vec<String>),
    BoolList(Vec<bool>),
    Pattern(Arc<Pattern>),
}

#[derive(Debug, Clone)]
pub struct ParsedTag {
    key: String,
    raw: String,
    value: TagValue,
}

impl ParsedTag {
    pub fn new(key: impl Into<String>, raw: impl Into<String>, value: TagValue) -> Self {
        Self {
            key: key.into(),
            raw: raw.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> &TagValue {
        &self.value
    }

    pub fn as_int(&self) -> Option<i128> {
        match &self.value {
            TagValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match &self.value {
            TagValue::Float(value) => Some(*value),
            TagValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            TagValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            TagValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn int_list(&self) -> Option<&[i128]> {
        match &self.value {
            TagValue::IntList(values) => Some(values),
            _ => None,
        }
    }

    pub fn float_list(&self) -> Option<&[f64]> {
        match &self.value {
            TagValue::FloatList(values) => Some(values),
            _ => None,
        }
    }

    pub fn text_list(&self) -> Option<&[String]> {
        match &self.value {
            TagValue::TextList(values) => Some(values),
            _ => None,
        }
    }

    pub fn bool_list(&self) -> Option<&[bool]> {
        match &self.value {
            TagValue::BoolList(values) => Some(values),
            _ => None,
        }
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        match &self.value {
            TagValue::Pattern(pattern) => Some(pattern),
            _ => None,
        }
    }
}

/// Parsed tags of one field, in first-seen order. A repeated key keeps its
/// position and takes the later value.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    entries: Vec<ParsedTag>,
}

impl TagSet {
    pub fn get(&self, key: &str) -> Option<&ParsedTag> {
        self.entries.iter().find(|tag| tag.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, tag: ParsedTag) {
        match self.entries.iter_mut().find(|entry| entry.key == tag.key) {
            Some(entry) => *entry = tag,
            None => self.entries.push(tag),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedTag> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|tag| tag.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TagError(String);

impl TagError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Turns the raw value of one tag key into a [`TagValue`] for a field of `kind`.
pub trait TagParser: Send + Sync {
    fn parse(&self, kind: Kind, key: &str, value: &str) -> Result<TagValue, TagError>;
}

pub struct FnTagParser<F>(F);

impl<F> TagParser for FnTagParser<F>
where
    F: Fn(Kind, &str, &str) -> Result<TagValue, TagError> + Send + Sync,
{
    fn parse(&self, kind: Kind, key: &str, value: &str) -> Result<TagValue, TagError> {
        (self.0)(kind, key, value)
    }
}

/// Wraps a closure as a [`TagParser`].
pub fn parser_fn<F>(parse: F) -> FnTagParser<F>
where
    F: Fn(Kind, &str, &str) -> Result<TagValue, TagError> + Send + Sync,
{
    FnTagParser(parse)
}

/// Splits a raw tag into tokens.
///
/// A separator only ends a token when what follows looks like the start of
/// another token: a lowercase key made of `[a-z_]` or the bare `-`, followed
/// by `=`, another separator, or the end of the tag. Separators inside values
/// such as `reg=^\d{1,3}$` are kept.
#[derive(Debug, Clone)]
pub struct TagSplitter {
    separator: String,
}

impl TagSplitter {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn split<'a>(&self, raw: &'a str) -> Vec<&'a str> {
        if raw.is_empty() || self.separator.is_empty() {
            return Vec::new();
        }
        let step = self.separator.len();
        let mut tokens = Vec::new();
        let mut start = 0;
        for (position, _) in raw.match_indices(self.separator.as_str()) {
            if position < start {
                continue;
            }
            if self.starts_token(&raw[position + step..]) {
                tokens.push(&raw[start..position]);
                start = position + step;
            }
        }
        tokens.push(&raw[start..]);
        tokens.retain(|token| !token.is_empty());
        tokens
    }

    fn starts_token(&self, rest: &str) -> bool {
        let key_len = if rest.starts_with(SKIP) {
            SKIP.len()
        } else {
            rest.bytes()
                .take_while(|byte| byte.is_ascii_lowercase() || *byte == b'_')
                .count()
        };
        if key_len == 0 {
            return false;
        }
        let after = &rest[key_len..];
        after.is_empty()
            || after.starts_with(TAG_VALUE_SEPARATOR)
            || after.starts_with(self.separator.as_str())
    }
}

/// Splits `key=value`; a bare key has an empty value.
pub fn split_token(token: &str) -> (&str, &str) {
    token.split_once(TAG_VALUE_SEPARATOR).unwrap_or((token, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(raw: &str) -> Vec<&str> {
        TagSplitter::new(",").split(raw)
    }

    #[test]
    fn splits_plain_tokens() {
        assert_eq!(
            split("key=integer,gte=1,lte=9"),
            vec!["key=integer", "gte=1", "lte=9"]
        );
    }

    #[test]
    fn keeps_separators_inside_values() {
        assert_eq!(
            split(r"reg=^\d{1,3}$,key=string"),
            vec![r"reg=^\d{1,3}$", "key=string"]
        );
        assert_eq!(split("reg=[a-z]{2,}"), vec!["reg=[a-z]{2,}"]);
    }

    #[test]
    fn bare_keys_end_tokens() {
        assert_eq!(
            split("eq=3,into,key=string,-"),
            vec!["eq=3", "into", "key=string", "-"]
        );
    }

    #[test]
    fn multi_char_separator() {
        let splitter = TagSplitter::new(";;");
        assert_eq!(splitter.split("eq=1;;into;;gt=2"), vec!["eq=1", "into", "gt=2"]);
    }

    #[test]
    fn empty_raw_has_no_tokens() {
        assert!(split("").is_empty());
    }

    #[test]
    fn repeated_keys_keep_first_position() {
        let mut tags = TagSet::default();
        tags.insert(ParsedTag::new(EQ, "1", TagValue::Int(1)));
        tags.insert(ParsedTag::new(KEY, "integer", TagValue::Text("integer".into())));
        tags.insert(ParsedTag::new(EQ, "2", TagValue::Int(2)));
        assert_eq!(tags.keys().collect::<Vec<_>>(), vec![EQ, KEY]);
        assert_eq!(tags.get(EQ).and_then(ParsedTag::as_int), Some(2));
    }
}
