use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("epoch value {0} is outside the representable range")]
    EpochOutOfRange(i64),

    #[error("'{value}' does not match any accepted wall-clock format ({formats})")]
    UnparseableWallClock { value: String, formats: String },

    #[error("local time {local} cannot be resolved in {zone}")]
    UnresolvableLocalTime { local: NaiveDateTime, zone: String },
}

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("{category} record is missing required field '{field}'")]
    MissingField {
        category: &'static str,
        field: &'static str,
    },

    #[error("{category} record field '{field}' should be {expected}, found {found}")]
    InvalidField {
        category: &'static str,
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("{category} record field '{field}' holds a malformed timestamp: {source}")]
    MalformedTimestamp {
        category: &'static str,
        field: &'static str,
        #[source]
        source: TimestampError,
    },

    #[error("{category} normalization requires caller-supplied '{name}'")]
    MissingContext {
        category: &'static str,
        name: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no canonical timezone configured (set --timezone, a config file, PUMPSYNC_TIMEZONE or TIMEZONE_NAME)")]
    MissingTimezone,

    #[error("unknown timezone '{name}': {reason}")]
    InvalidTimezone { name: String, reason: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
#[error("record {index} could not be normalized: {source}")]
pub struct BatchError {
    pub index: usize,
    #[source]
    pub source: EntryError,
}
