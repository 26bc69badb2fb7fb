use chrono_tz::Tz;
use serde_json::{Map, Value};

use crate::errors::EntryError;
use crate::timestamp_fixer::{self, ZonedTimestamp};

/// An upstream record as delivered: field name to untyped value.
pub type RawFields = Map<String, Value>;

/// Borrowed view over a [`RawFields`] that reports failures against its category.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    category: &'static str,
    fields: &'a RawFields,
}

impl<'a> RawRecord<'a> {
    pub fn new(category: &'static str, fields: &'a RawFields) -> Self {
        Self { category, fields }
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Present values are returned as-is, including JSON `null`.
    pub fn field(&self, name: &'static str) -> Result<&'a Value, EntryError> {
        self.fields.get(name).ok_or(EntryError::MissingField {
            category: self.category,
            field: name,
        })
    }

    pub fn passthrough(&self, name: &'static str) -> Result<Value, EntryError> {
        self.field(name).cloned()
    }

    pub fn str_field(&self, name: &'static str) -> Result<&'a str, EntryError> {
        let value = self.field(name)?;
        value
            .as_str()
            .ok_or_else(|| self.invalid(name, "a string", value))
    }

    pub fn f64_field(&self, name: &'static str) -> Result<f64, EntryError> {
        let value = self.field(name)?;
        let parsed = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|number| number.is_finite())
            .ok_or_else(|| self.invalid(name, "a number", value))
    }

    pub fn epoch_field(&self, name: &'static str) -> Result<i64, EntryError> {
        let value = self.field(name)?;
        let parsed = match value {
            Value::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.is_finite() && float.fract() == 0.0)
                    .filter(|float| *float >= i64::MIN as f64 && *float <= i64::MAX as f64)
                    .map(|float| float as i64)
            }),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(name, "an integer epoch value", value))
    }

    /// Truthiness of a completion flag, accepting API booleans and CSV export strings.
    pub fn flag_field(&self, name: &'static str) -> Result<bool, EntryError> {
        let value = self.field(name)?;
        let parsed = match value {
            Value::Bool(flag) => Some(*flag),
            Value::Null => Some(false),
            Value::Number(number) => number.as_f64().map(|n| n != 0.0),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" => Some(true),
                "false" | "f" | "no" | "n" | "0" | "" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(name, "a boolean flag", value))
    }

    pub fn epoch_timestamp(
        &self,
        name: &'static str,
        canonical: Tz,
    ) -> Result<ZonedTimestamp, EntryError> {
        let epoch = self.epoch_field(name)?;
        timestamp_fixer::correct_epoch_seconds(epoch, canonical).map_err(|source| {
            EntryError::MalformedTimestamp {
                category: self.category,
                field: name,
                source,
            }
        })
    }

    pub fn wall_clock_timestamp(
        &self,
        name: &'static str,
        canonical: Tz,
    ) -> Result<ZonedTimestamp, EntryError> {
        let text = self.str_field(name)?;
        timestamp_fixer::parse_wall_clock(text, canonical).map_err(|source| {
            EntryError::MalformedTimestamp {
                category: self.category,
                field: name,
                source,
            }
        })
    }

    fn invalid(&self, name: &'static str, expected: &'static str, found: &Value) -> EntryError {
        EntryError::InvalidField {
            category: self.category,
            field: name,
            expected,
            found: found.to_string(),
        }
    }
}
