//! `AeroWx` CLI
//!
//! Decode aerodrome observation and forecast documents to JSON.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::process::ExitCode;

use aerowx::config::AeroWxConfig;
use aerowx::parse::{read_document, render_json};
use aerowx::taf::{TimelineOptions, segment_timeline};
use aerowx::{AeroWxError, decode_weather_code, parse_metar_xml, parse_taf_xml, telemetry};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

/// AeroWx CLI
#[derive(Parser)]
#[command(name = "aerowx")]
#[command(author, version, about = "Aerodrome weather report decoder", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: <config dir>/aerowx/config.toml)
    #[arg(short, long, global = true, env = "AEROWX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an observation (METAR) document
    ///
    /// Example: aerowx metar metar.xml
    Metar {
        /// Document path, `-` for stdin
        file: PathBuf,
    },

    /// Decode a forecast (TAF) document into an hourly timeline
    ///
    /// Example: aerowx taf --segments taf.xml
    Taf {
        /// Document path, `-` for stdin
        file: PathBuf,

        /// Do not infer mist for reduced visibility without weather
        #[arg(long)]
        no_mist: bool,

        /// Print runs of hours with the same weather icon instead of the record
        #[arg(long)]
        segments: bool,
    },

    /// Decode a single coded weather token such as +TSRA
    Decode {
        /// Coded token or code-list reference
        token: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            match error.downcast_ref::<AeroWxError>() {
                Some(aerowx_error) => eprintln!("Error: {}", aerowx_error.user_message()),
                None => eprintln!("Error: {error:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AeroWxConfig::load_from_path(cli.config)?;
    telemetry::init_tracing(&config.logging, cli.verbose)?;
    debug!(?config, "Configuration loaded");

    let pretty = config.output.pretty;

    let output = match cli.command {
        Commands::Metar { file } => {
            let xml = read_document(&file)?;
            let record = parse_metar_xml(&xml)?;
            info!(found = record.is_some(), "Decoded observation document");
            render_json(&record, pretty)?
        }
        Commands::Taf {
            file,
            no_mist,
            segments,
        } => {
            let options = TimelineOptions {
                infer_mist: config.timeline_options().infer_mist && !no_mist,
            };
            let xml = read_document(&file)?;
            let record = parse_taf_xml(&xml, &options)?;
            info!(found = record.is_some(), "Decoded forecast document");

            if segments {
                let runs = record.map(|record| {
                    segment_timeline(&record.timeline, |slot| slot.display.weather_icon.clone())
                });
                render_json(&runs, pretty)?
            } else {
                render_json(&record, pretty)?
            }
        }
        Commands::Decode { token } => {
            let decoded = decode_weather_code(&token)
                .ok_or_else(|| AeroWxError::validation("weather token must not be empty"))?;
            render_json(&decoded, pretty).context("Failed to render token")?
        }
    };

    println!("{output}");
    Ok(())
}
