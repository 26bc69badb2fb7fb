use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::timestamp_fixer::ZonedTimestamp;

/// Delivery type written for export-form basal rows, which carry none.
pub const UNKNOWN_DELIVERY_TYPE: &str = "Unknown";

/// Basal delivery codes used by the continuous device stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasalEventKind {
    Suspension,
    Profile,
    TempRate,
    Algorithm,
}

impl BasalEventKind {
    pub const ALL: [BasalEventKind; 4] = [
        BasalEventKind::Suspension,
        BasalEventKind::Profile,
        BasalEventKind::TempRate,
        BasalEventKind::Algorithm,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(BasalEventKind::Suspension),
            1 => Some(BasalEventKind::Profile),
            2 => Some(BasalEventKind::TempRate),
            3 => Some(BasalEventKind::Algorithm),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            BasalEventKind::Suspension => 0,
            BasalEventKind::Profile => 1,
            BasalEventKind::TempRate => 2,
            BasalEventKind::Algorithm => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BasalEventKind::Suspension => "Suspension",
            BasalEventKind::Profile => "Profile",
            BasalEventKind::TempRate => "TempRate",
            BasalEventKind::Algorithm => "Algorithm",
        }
    }
}

impl fmt::Display for BasalEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for BasalEventKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown basal event '{trimmed}'"))
    }
}

/// Activity event codes used by the continuous device stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityEventKind {
    Sleep,
    Exercise,
    AutoBolus,
    CarbOnly,
}

impl ActivityEventKind {
    pub const ALL: [ActivityEventKind; 4] = [
        ActivityEventKind::Sleep,
        ActivityEventKind::Exercise,
        ActivityEventKind::AutoBolus,
        ActivityEventKind::CarbOnly,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ActivityEventKind::Sleep),
            2 => Some(ActivityEventKind::Exercise),
            3 => Some(ActivityEventKind::AutoBolus),
            4 => Some(ActivityEventKind::CarbOnly),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            ActivityEventKind::Sleep => 1,
            ActivityEventKind::Exercise => 2,
            ActivityEventKind::AutoBolus => 3,
            ActivityEventKind::CarbOnly => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityEventKind::Sleep => "Sleep",
            ActivityEventKind::Exercise => "Exercise",
            ActivityEventKind::AutoBolus => "AutoBolus",
            ActivityEventKind::CarbOnly => "CarbOnly",
        }
    }
}

impl fmt::Display for ActivityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for ActivityEventKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown activity event '{trimmed}'"))
    }
}

/// Basal delivery in either the stream or the export form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasalEntry {
    pub time: ZonedTimestamp,
    pub delivery_type: String,
    pub duration_mins: Option<f64>,
    pub basal_rate: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuspensionEntry {
    pub time: ZonedTimestamp,
    pub continuation: Value,
    #[serde(rename = "suspendReason")]
    pub suspend_reason: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CgmEntry {
    pub time: ZonedTimestamp,
    pub reading: Value,
    pub reading_type: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IobEntry {
    pub time: ZonedTimestamp,
    pub iob: Value,
    pub event_id: Value,
}

/// A bolus delivery. `complete` and `extended_bolus` serialize as `"1"` / `""`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BolusEntry {
    pub description: String,
    #[serde(serialize_with = "presence_flag")]
    pub complete: bool,
    pub completion: Value,
    pub request_time: Option<ZonedTimestamp>,
    pub completion_time: Option<ZonedTimestamp>,
    pub insulin: Value,
    pub carbs: Value,
    pub user_override: Value,
    #[serde(serialize_with = "presence_flag")]
    pub extended_bolus: bool,
    pub bolex_completion_time: Option<ZonedTimestamp>,
    pub bolex_start_time: Option<ZonedTimestamp>,
}

fn presence_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "1" } else { "" })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanonicalRecord {
    Basal(BasalEntry),
    Suspension(SuspensionEntry),
    Cgm(CgmEntry),
    Iob(IobEntry),
    Bolus(BolusEntry),
}

impl CanonicalRecord {
    /// The record's primary timestamp. Bolus rows have none of their own.
    pub fn time(&self) -> Option<&ZonedTimestamp> {
        match self {
            CanonicalRecord::Basal(entry) => Some(&entry.time),
            CanonicalRecord::Suspension(entry) => Some(&entry.time),
            CanonicalRecord::Cgm(entry) => Some(&entry.time),
            CanonicalRecord::Iob(entry) => Some(&entry.time),
            CanonicalRecord::Bolus(_) => None,
        }
    }

    /// Untyped form for loosely-typed consumers.
    pub fn into_fields(self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "canonical record serialized to a non-object: {other}"
            ))),
        }
    }
}

impl From<BasalEntry> for CanonicalRecord {
    fn from(entry: BasalEntry) -> Self {
        CanonicalRecord::Basal(entry)
    }
}

impl From<SuspensionEntry> for CanonicalRecord {
    fn from(entry: SuspensionEntry) -> Self {
        CanonicalRecord::Suspension(entry)
    }
}

impl From<CgmEntry> for CanonicalRecord {
    fn from(entry: CgmEntry) -> Self {
        CanonicalRecord::Cgm(entry)
    }
}

impl From<IobEntry> for CanonicalRecord {
    fn from(entry: IobEntry) -> Self {
        CanonicalRecord::Iob(entry)
    }
}

impl From<BolusEntry> for CanonicalRecord {
    fn from(entry: BolusEntry) -> Self {
        CanonicalRecord::Bolus(entry)
    }
}
