use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use pumpsync_core::RawFields;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Csv,
            _ => InputFormat::Json,
        }
    }
}

pub fn read_records(path: &Path, format: InputFormat) -> Result<Vec<RawFields>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open input file '{}'", path.display()))?;
    match format {
        InputFormat::Json => read_json(file)
            .with_context(|| format!("Failed to read JSON records from '{}'", path.display())),
        InputFormat::Csv => read_csv(file)
            .with_context(|| format!("Failed to read CSV records from '{}'", path.display())),
    }
}

/// A JSON array of objects.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<RawFields>> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = value else {
        bail!("expected a top-level JSON array of records");
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(fields),
            other => bail!("record {index} is not a JSON object: {other}"),
        })
        .collect()
}

/// CSV with a header row. Every cell becomes a string value keyed by its header.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawFields>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row.with_context(|| format!("CSV row {index} is unreadable"))?;
        let fields: RawFields = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(fields);
    }
    Ok(records)
}
