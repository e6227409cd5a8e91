//! `rulewash` command-line front end.
//!
//! Reads a JSON object of field values (strings or `null`) and a rules
//! config file, runs one validation pass and prints a JSON report:
//!
//! ```text
//! rulewash --rules form.json --values submitted.json
//! echo '{"name": "Hello"}' | rulewash --rules form.json
//! ```
//!
//! Exits with status 1 when any field is rejected.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use indexmap::IndexMap;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rulewash::{Config, FieldOutcome, Validator};

#[derive(Parser, Debug)]
#[command(name = "rulewash", version, about = "Validate and sanitize form fields against rule expressions")]
struct Cli {
    /// Rules config file (JSON)
    #[arg(short, long)]
    rules: PathBuf,

    /// Values file (JSON object); reads stdin when omitted or "-"
    #[arg(short, long)]
    values: Option<PathBuf>,

    /// Join error messages with the HTML separator
    #[arg(long)]
    html: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_values(path: Option<&PathBuf>) -> Result<IndexMap<String, Option<String>>> {
    let content = match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read values file {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read values from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("values must be a JSON object of strings or nulls")
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = Config::load(&cli.rules)
        .with_context(|| format!("failed to load rules from {}", cli.rules.display()))?;
    let values = read_values(cli.values.as_ref())?;

    let mut validator = Validator::from_config(&config);
    validator.set_values(values);
    let valid = validator.run();
    info!(valid, fields = validator.clean_values().len(), "Validation finished");

    let errors = if cli.html {
        validator.all_errors_html()
    } else {
        validator.all_errors()
    };
    let rejected: IndexMap<&str, Vec<String>> = validator
        .outcomes()
        .values()
        .filter_map(|outcome| match outcome {
            FieldOutcome::Rejected(rejection) => Some((rejection.field(), outcome.reasons())),
            FieldOutcome::Accepted(_) => None,
        })
        .collect();
    let report = serde_json::json!({
        "valid": valid,
        "clean": validator.clean_values(),
        "rejected": rejected,
        "errors": validator.errors(),
        "error_text": errors,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
