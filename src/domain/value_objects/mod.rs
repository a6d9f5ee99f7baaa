//! Value Objects for the catalog

use base64::Engine;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::str::FromStr;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a product id of the form `prod_<unix-millis>_<9 base-36 chars>`.
pub fn generate_product_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN).map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char).collect();
    format!("prod_{}_{}", chrono::Utc::now().timestamp_millis(), suffix)
}

/// Splits a comma-delimited tag list, trimming entries and dropping blanks and repeats.
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) { tags.push(tag.to_string()); }
    }
    tags
}

/// Self-contained `data:` URI for an image payload.
pub fn to_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Parses a decimal from free text. Blank or unparseable input yields `None`.
pub fn parse_decimal(input: &str) -> Option<Decimal> {
    let input = input.trim();
    if input.is_empty() { return None; }
    Decimal::from_str(input).or_else(|_| Decimal::from_scientific(input)).ok()
}

/// Parses a whole quantity from free text; fractional input is truncated.
pub fn parse_quantity(input: &str) -> Option<i64> {
    let input = input.trim();
    input.parse::<i64>().ok().or_else(|| parse_decimal(input).and_then(|d| d.trunc().to_i64()))
}

/// Serde helpers tolerant of the loosely typed records found in storage and import files.
///
/// Numbers may arrive as JSON numbers, numeric strings, `null` or garbage; anything
/// that does not parse becomes zero.
pub mod lenient {
    use super::*;

    pub mod decimal {
        use super::*;

        /// Writes the decimal's own digits as a JSON number, so no precision is lost.
        pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
            Number::from_str(&value.normalize().to_string())
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
            let value = Value::deserialize(deserializer)?;
            Ok(match value {
                // Numbers keep their source text, so this is exact.
                Value::Number(n) => parse_decimal(&n.to_string()).unwrap_or_default(),
                Value::String(s) => parse_decimal(&s).unwrap_or_default(),
                _ => Decimal::ZERO,
            })
        }
    }

    pub mod quantity {
        use super::*;

        pub fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_u32(*value)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
            let value = Value::deserialize(deserializer)?;
            let parsed = match value {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
                Value::String(s) => parse_quantity(&s),
                _ => None,
            };
            Ok(parsed.map(|q| q.clamp(0, u32::MAX as i64) as u32).unwrap_or(0))
        }
    }

    /// Opaque text that may have been stored as a number.
    pub mod text {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
            Ok(match Value::deserialize(deserializer)? {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            })
        }
    }
}
