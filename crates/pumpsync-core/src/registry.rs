use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::NormalizerConfig;
use crate::entries;
use crate::errors::{BatchError, EntryError};
use crate::model::CanonicalRecord;
use crate::raw::RawFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryCategory {
    StreamBasal,
    Suspension,
    Cgm,
    Iob,
    ExportBasal,
    Bolus,
}

impl EntryCategory {
    pub const ALL: [EntryCategory; 6] = [
        EntryCategory::StreamBasal,
        EntryCategory::Suspension,
        EntryCategory::Cgm,
        EntryCategory::Iob,
        EntryCategory::ExportBasal,
        EntryCategory::Bolus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntryCategory::StreamBasal => "stream-basal",
            EntryCategory::Suspension => "suspension",
            EntryCategory::Cgm => "cgm",
            EntryCategory::Iob => "iob",
            EntryCategory::ExportBasal => "export-basal",
            EntryCategory::Bolus => "bolus",
        }
    }
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("unknown entry category '{0}' (expected one of: stream-basal, suspension, cgm, iob, export-basal, bolus)")]
pub struct UnknownCategory(pub String);

impl FromStr for EntryCategory {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|category| category.name() == normalized)
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

/// Values a mapper needs that the raw record does not carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryContext {
    pub delivery_type: Option<String>,
    pub duration_mins: Option<f64>,
}

impl EntryContext {
    pub fn with_delivery_type(mut self, delivery_type: impl Into<String>) -> Self {
        self.delivery_type = Some(delivery_type.into());
        self
    }

    pub fn with_duration_mins(mut self, duration_mins: f64) -> Self {
        self.duration_mins = Some(duration_mins);
        self
    }
}

/// Dispatches raw records to the mapper for their category.
#[derive(Debug, Clone, Copy)]
pub struct EntryNormalizer {
    config: NormalizerConfig,
}

impl EntryNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn normalize(
        &self,
        category: EntryCategory,
        fields: &RawFields,
        context: &EntryContext,
    ) -> Result<CanonicalRecord, EntryError> {
        let config = &self.config;
        let record: CanonicalRecord = match category {
            EntryCategory::StreamBasal => {
                let delivery_type = context.delivery_type.as_deref().ok_or(
                    EntryError::MissingContext {
                        category: category.name(),
                        name: "delivery_type",
                    },
                )?;
                entries::normalize_stream_basal(fields, delivery_type, config)?.into()
            }
            EntryCategory::Suspension => entries::normalize_suspension(fields, config)?.into(),
            EntryCategory::Cgm => entries::normalize_cgm_reading(fields, config)?.into(),
            EntryCategory::Iob => entries::normalize_iob_snapshot(fields, config)?.into(),
            EntryCategory::ExportBasal => {
                entries::normalize_export_basal(fields, context.duration_mins, config)?.into()
            }
            EntryCategory::Bolus => entries::normalize_bolus(fields, config)?.into(),
        };
        Ok(record)
    }

    /// Normalizes every record, stopping at the first failure.
    pub fn normalize_batch(
        &self,
        category: EntryCategory,
        records: &[RawFields],
        context: &EntryContext,
    ) -> Result<Vec<CanonicalRecord>, BatchError> {
        let mut normalized = Vec::with_capacity(records.len());
        for (index, fields) in records.iter().enumerate() {
            let record = self
                .normalize(category, fields, context)
                .map_err(|source| BatchError { index, source })?;
            debug!(%category, index, time = ?record.time().map(|t| t.to_rfc3339()), "normalized record");
            normalized.push(record);
        }
        info!(
            %category,
            count = normalized.len(),
            timezone = self.config.canonical_timezone().name(),
            "normalized batch"
        );
        Ok(normalized)
    }
}
