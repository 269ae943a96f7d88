mod epoch;
mod format;
mod parse;
mod pattern;
mod types;
mod zone;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use types::TimeZoneInfo;

#[derive(Parser)]
#[command(name = "datenorm", version, about = "Date/time normalization utility")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a string against a pattern; prints the decomposed instant as
    /// JSON, or `null` when nothing matched
    Parse {
        value: String,
        /// Pattern in either dialect
        #[arg(short, long)]
        format: String,
        /// Fallback pattern tried when the primary fails
        #[arg(long)]
        alt: Option<String>,
    },
    /// Format an epoch-millisecond value as local wall-clock time
    Format {
        #[arg(allow_negative_numbers = true)]
        epoch_ms: f64,
        #[arg(short, long)]
        pattern: String,
        /// Render the wall clock of this IANA zone instead
        #[arg(short, long)]
        zone: Option<String>,
    },
    /// Shift an epoch value between a catalog zone and the local zone
    Convert {
        #[arg(allow_negative_numbers = true)]
        epoch_ms: f64,
        /// Catalog zone id
        #[arg(short, long)]
        zone: String,
        /// Path to the zone catalog JSON
        #[arg(short, long)]
        catalog: PathBuf,
        /// Convert local-to-zone instead of zone-to-local
        #[arg(long)]
        to_zone: bool,
    },
    /// Render an absolute duration in UTC terms
    Duration {
        milliseconds: f64,
        #[arg(short, long, default_value = "H:mm:ss")]
        pattern: String,
    },
    /// Print the current time in the given pattern
    Now {
        #[arg(short, long, default_value = "YYYY-MM-DD HH:mm:ss")]
        pattern: String,
    },
    /// List the entries of a catalog file
    Zones { catalog: PathBuf },
}

fn load_catalog_file(path: &Path) -> anyhow::Result<Vec<TimeZoneInfo>> {
    let file =
        File::open(path).with_context(|| format!("opening catalog {}", path.display()))?;
    Ok(zone::load_catalog(file)?)
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Parse { value, format, alt } => {
            match parse::parse_with_alternative(&value, &format, alt.as_deref()) {
                Some(instant) => println!("{}", serde_json::to_string(&instant)?),
                None => println!("null"),
            }
        }
        Command::Format {
            epoch_ms,
            pattern,
            zone,
        } => {
            let rendered = match zone {
                Some(id) => format::format_in_time_zone(epoch_ms, &id, &pattern),
                None => format::format(epoch_ms, &pattern, true),
            };
            match rendered {
                Some(s) => println!("{s}"),
                None => println!("null"),
            }
        }
        Command::Convert {
            epoch_ms,
            zone: zone_id,
            catalog,
            to_zone,
        } => {
            let catalog = load_catalog_file(&catalog)?;
            let shifted = if to_zone {
                zone::convert_to_other(epoch_ms, &zone_id, &catalog)?
            } else {
                zone::convert_to_local(epoch_ms, &zone_id, &catalog)?
            };
            println!("{shifted}");
        }
        Command::Duration {
            milliseconds,
            pattern,
        } => println!("{}", format::format_duration(milliseconds, &pattern)),
        Command::Now { pattern } => println!("{}", format::current_time_in_format(&pattern)),
        Command::Zones { catalog } => {
            for tz in load_catalog_file(&catalog)? {
                println!("{}\t{:+}\t{}", tz.time_zone_id, tz.minute_offset, tz.label);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    zone::init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
