use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{Local, Utc};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use crate::data::{
    AREAS, EMAIL_DOMAINS, EMAIL_LOCAL_LEN, MOBILE_PHONE_LEN, MOBILE_PHONE_PREFIXES,
};
use crate::errors::GenerationError;
use crate::generators::primitives::random_letters;
use crate::generators::{ADDRESS, EMAIL, Generator, GeneratorContext, MOBILE_PHONE, TIME};
use crate::registry::GeneratorRegistry;
use crate::schema::Kind;
use crate::tags::parsers::{ADDRESS_LEVELS, TIMESTAMP_MILLIS, TIMESTAMP_SECONDS};
use crate::tags::{self, ParsedTag};
use crate::value::Value;

pub fn register(registry: &GeneratorRegistry) {
    registry.register(MOBILE_PHONE, Arc::new(MobilePhoneGenerator));
    registry.register(EMAIL, Arc::new(EmailGenerator));
    registry.register(ADDRESS, Arc::new(AddressGenerator));
    registry.register(TIME, Arc::new(TimeGenerator));
}

/// Eleven-digit mobile numbers behind a known carrier prefix.
pub struct MobilePhoneGenerator;

impl Generator for MobilePhoneGenerator {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        if ctx.kind() != Kind::String {
            return Err(ctx.unsupported(MOBILE_PHONE));
        }
        let prefix = MOBILE_PHONE_PREFIXES.choose(rng).copied().unwrap_or("130");
        let mut phone = String::with_capacity(MOBILE_PHONE_LEN);
        phone.push_str(prefix);
        while phone.len() < MOBILE_PHONE_LEN {
            phone.push(char::from(b'0' + rng.random_range(0..10u8)));
        }
        Ok(Value::Text(phone))
    }
}

pub struct EmailGenerator;

impl Generator for EmailGenerator {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        if ctx.kind() != Kind::String {
            return Err(ctx.unsupported(EMAIL));
        }
        let (min, max) = EMAIL_LOCAL_LEN;
        let len = rng.random_range(min..=max);
        let mut email = random_letters(rng, len);
        email.push_str(EMAIL_DOMAINS.choose(rng).copied().unwrap_or("@qq.com"));
        Ok(Value::Text(email))
    }
}

/// Space-joined province, city and county names. The `addr` tag picks the
/// levels; output order is always province, city, county.
pub struct AddressGenerator;

impl Generator for AddressGenerator {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        if ctx.kind() != Kind::String {
            return Err(ctx.unsupported(ADDRESS));
        }
        let Some(levels) = ctx.tags().get(tags::ADDR).and_then(ParsedTag::text_list) else {
            return Ok(Value::Text(String::new()));
        };
        let province = AREAS
            .choose(rng)
            .ok_or_else(|| GenerationError::Failed("address table is empty".to_string()))?;
        let city = province
            .cities
            .choose(rng)
            .ok_or_else(|| GenerationError::Failed(format!("{} has no cities", province.name)))?;
        let county = city
            .counties
            .choose(rng)
            .ok_or_else(|| GenerationError::Failed(format!("{} has no counties", city.name)))?;
        let parts: Vec<&str> = ADDRESS_LEVELS
            .iter()
            .zip([province.name, city.name, *county])
            .filter(|(level, _)| levels.iter().any(|wanted| wanted == *level))
            .map(|(_, name)| name)
            .collect();
        Ok(Value::Text(parts.join(" ")))
    }
}

/// Current time, as a Unix timestamp for integer fields or formatted with a
/// strftime layout for strings.
pub struct TimeGenerator;

impl Generator for TimeGenerator {
    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        let Some(tag) = ctx.tags().get(tags::TIME) else {
            return Ok(Value::Zero);
        };
        let layout = tag.raw();
        match ctx.kind() {
            kind if kind.is_integer() => match layout {
                TIMESTAMP_SECONDS => Ok(Value::Int(i128::from(Utc::now().timestamp()))),
                TIMESTAMP_MILLIS => Ok(Value::Int(i128::from(Utc::now().timestamp_millis()))),
                _ => Err(GenerationError::Unsupported(format!(
                    "timestamp unit '{layout}' on {}",
                    ctx.alias()
                ))),
            },
            Kind::String => {
                let mut formatted = String::new();
                write!(formatted, "{}", Local::now().format(layout)).map_err(|_| {
                    GenerationError::Failed(format!("invalid time layout '{layout}'"))
                })?;
                Ok(Value::Text(formatted))
            }
            _ => Err(ctx.unsupported(TIME)),
        }
    }
}
