//! MMP Validator CLI - check monthly monitoring plan uploads
//!
//! # Main Commands
//!
//! ```bash
//! mmp-validator validate plan.xlsx             # Validate a plan, records to stdout
//! mmp-validator validate plan.csv --json       # Full result as JSON
//! mmp-validator serve                          # Start HTTP server (port 3000)
//! ```
//!
//! # ID Commands
//!
//! ```bash
//! mmp-validator generate-id --month 5 --year 2023 --region KSL
//! mmp-validator parse-id M-052023-V1.2-KSL
//! mmp-validator check-site-code KOKH230524-0001
//! mmp-validator next-version 1.2 --major
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use mmp_validator::{
    apply_hub_check, create_validation_headline, create_validation_summary, generate_id,
    increment_version, load_hub_catalogue, parse_id, validate_file, validate_site_code,
    UploadedFile, ValidationOptions, Version,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mmp-validator")]
#[command(about = "Validate monthly monitoring plan uploads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plan file (CSV, XLSX, XLS, ODS)
    Validate {
        /// Input plan file
        input: PathBuf,

        /// JSON file with validation options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Date used when a visit date is missing (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Selected hub id; requires --hubs
        #[arg(long, requires = "hubs")]
        hub: Option<String>,

        /// Hub catalogue JSON file
        #[arg(long)]
        hubs: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the whole result instead of just the records
        #[arg(long)]
        json: bool,

        /// Suppress progress logs
        #[arg(short, long)]
        quiet: bool,
    },

    /// Build a plan ID
    GenerateId {
        #[arg(long)]
        month: u32,

        #[arg(long)]
        year: u32,

        #[arg(long, default_value = "1")]
        major: u32,

        #[arg(long, default_value = "0")]
        minor: u32,

        #[arg(long)]
        region: String,
    },

    /// Split a plan ID into its parts
    ParseId {
        id: String,
    },

    /// Check a site code's format
    CheckSiteCode {
        code: String,
    },

    /// Compute the next plan version (e.g. 1.2)
    NextVersion {
        current: String,

        /// Bump major instead of minor
        #[arg(long)]
        major: bool,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            input,
            config,
            today,
            hub,
            hubs,
            output,
            json,
            quiet,
        } => {
            cmd_validate(
                &input,
                config.as_deref(),
                today,
                hub.as_deref().zip(hubs.as_deref()),
                output.as_deref(),
                json,
                quiet,
            )
            .await
        }

        Commands::GenerateId {
            month,
            year,
            major,
            minor,
            region,
        } => cmd_generate_id(month, year, major, minor, &region),

        Commands::ParseId { id } => cmd_parse_id(&id),

        Commands::CheckSiteCode { code } => cmd_check_site_code(&code),

        Commands::NextVersion { current, major } => cmd_next_version(&current, major),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_validate(
    input: &Path,
    config: Option<&Path>,
    today: Option<NaiveDate>,
    hub: Option<(&str, &Path)>,
    output: Option<&Path>,
    json: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Validating: {}", input.display());

    let mut options = match config {
        Some(path) => ValidationOptions::from_json_file(path)?,
        None => ValidationOptions::default(),
    };
    if today.is_some() {
        options.today = today;
    }
    options.quiet |= quiet;

    let file = UploadedFile::from_path(input)?;
    let mut result = validate_file(&file, &options, None).await;

    if let Some((hub_id, catalogue)) = hub {
        let hubs = load_hub_catalogue(catalogue)?;
        apply_hub_check(&mut result, hub_id, &hubs);
    }

    eprintln!("\n📊 {}", create_validation_headline(&result));
    eprintln!("{}\n", create_validation_summary(&result));

    let content = if json {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string_pretty(&result.records)?
    };
    write_output(&content, output)?;

    if !result.is_valid {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_generate_id(
    month: u32,
    year: u32,
    major: u32,
    minor: u32,
    region: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(1..=12).contains(&month) {
        return Err(format!("month must be 1-12, got {}", month).into());
    }
    println!("{}", generate_id(month, year, major, minor, region));
    Ok(())
}

fn cmd_parse_id(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_id(id).ok_or_else(|| format!("Not a plan ID: {}", id))?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

fn cmd_check_site_code(code: &str) -> Result<(), Box<dyn std::error::Error>> {
    if validate_site_code(code) {
        eprintln!("✓ {} is a valid site code", code.trim());
        Ok(())
    } else {
        Err(format!("{} is not a valid site code (expected e.g. KOKH230524-0001)", code).into())
    }
}

fn cmd_next_version(current: &str, major: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (maj, min) = current
        .trim_start_matches(['V', 'v'])
        .split_once('.')
        .ok_or_else(|| format!("Expected MAJOR.MINOR, got {}", current))?;
    let version = Version::new(maj.parse()?, min.parse()?);
    println!("{}", increment_version(version, major));
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    mmp_validator::server::start_server(port).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
