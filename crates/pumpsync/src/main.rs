mod input;

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pumpsync_core::{EntryCategory, EntryContext, EntryNormalizer, NormalizerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::input::InputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Normalize insulin pump and CGM records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a file of raw records and print one JSON object per line
    Normalize(NormalizeArgs),
    /// Resolve the canonical timezone and print it
    CheckConfig(ConfigArgs),
    /// List the record categories understood by `normalize`
    Categories,
}

#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// Canonical IANA timezone, overriding the config file and environment
    #[arg(long)]
    timezone: Option<String>,

    /// TOML file with a top-level `timezone` key
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct NormalizeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Record category of every row in the input file
    #[arg(long)]
    category: EntryCategory,

    /// Input format; inferred from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    /// Delivery type label for stream basal records
    #[arg(long)]
    delivery_type: Option<String>,

    /// Segment duration in minutes for export basal records
    #[arg(long)]
    duration_mins: Option<f64>,

    #[arg(value_name = "FILE")]
    file: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Normalize(args) => normalize(args),
        Command::CheckConfig(args) => {
            let config = resolve_config(&args)?;
            println!("{}", config.canonical_timezone().name());
            Ok(())
        }
        Command::Categories => {
            for category in EntryCategory::ALL {
                println!("{category}");
            }
            Ok(())
        }
    }
}

fn normalize(args: NormalizeArgs) -> Result<()> {
    let config = resolve_config(&args.config)?;
    let normalizer = EntryNormalizer::new(config);

    let format = args
        .format
        .unwrap_or_else(|| InputFormat::from_path(&args.file));
    let records = input::read_records(&args.file, format)?;
    info!(
        file = %args.file.display(),
        ?format,
        count = records.len(),
        "loaded raw records"
    );

    if args.delivery_type.is_some() && args.category != EntryCategory::StreamBasal {
        warn!(category = %args.category, "--delivery-type only applies to stream-basal records");
    }
    if args.duration_mins.is_some() && args.category != EntryCategory::ExportBasal {
        warn!(category = %args.category, "--duration-mins only applies to export-basal records");
    }

    let context = EntryContext {
        delivery_type: args.delivery_type,
        duration_mins: args.duration_mins,
    };
    let normalized = normalizer
        .normalize_batch(args.category, &records, &context)
        .with_context(|| format!("Failed to normalize '{}'", args.file.display()))?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for record in &normalized {
        serde_json::to_writer(&mut out, record).context("Failed to serialize record")?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    info!(count = normalized.len(), "wrote canonical records");
    Ok(())
}

fn resolve_config(args: &ConfigArgs) -> Result<NormalizerConfig> {
    if args.timezone.is_none() && args.config.is_none() {
        dotenvy::dotenv().ok();
    }
    resolve_config_with(args, |key| std::env::var(key).ok())
}

/// `--timezone` wins over `--config`, which wins over the environment.
fn resolve_config_with<F>(args: &ConfigArgs, lookup: F) -> Result<NormalizerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = args.timezone.as_deref() {
        return NormalizerConfig::from_timezone_name(name)
            .context("--timezone is not a usable canonical timezone");
    }
    if let Some(path) = args.config.as_deref() {
        return NormalizerConfig::load(path)
            .with_context(|| format!("Failed to load config file '{}'", path.display()));
    }
    NormalizerConfig::from_lookup(lookup)
        .context("PUMPSYNC_TIMEZONE (or TIMEZONE_NAME) must be set")
}
