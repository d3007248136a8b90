// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use avos_engine::{ChartConfig, ChartInput, Filters, RadarChart, Search, Viewport};

#[derive(Parser)]
#[command(name = "avos")]
#[command(version)]
#[command(about = "Lay out coded survey papers on the A-VO-S radar chart", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a payload and lay it out for a viewport
    Layout(LayoutArgs),
    /// Print the aggregated points and the journal legend
    Aggregate(AggregateArgs),
}

#[derive(Args)]
struct LayoutArgs {
    /// JSON payload with papers, scores, bibliography and tooltipContent
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    width: f64,

    #[arg(long)]
    height: f64,

    /// JSON file overriding any subset of the chart configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only papers published in MIN..=MAX stay interactive, e.g. 2015,2020
    #[arg(long, value_parser = parse_years)]
    years: Option<[i32; 2]>,

    /// Only papers from these journals stay interactive (repeatable)
    #[arg(long = "journal")]
    journals: Vec<String>,

    /// Only papers with exactly this label stay interactive
    #[arg(long)]
    search: Option<String>,

    /// Write here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct AggregateArgs {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_years(s: &str) -> std::result::Result<[i32; 2], String> {
    let (min, max) = s
        .split_once(',')
        .ok_or_else(|| format!("expected MIN,MAX, got '{s}'"))?;
    let min: i32 = min.trim().parse().map_err(|e| format!("bad year '{min}': {e}"))?;
    let max: i32 = max.trim().parse().map_err(|e| format!("bad year '{max}': {e}"))?;
    if min > max {
        return Err(format!("empty year range {min},{max}"));
    }
    Ok([min, max])
}

fn read_input(path: &Path) -> Result<ChartInput> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn read_config(path: Option<&Path>) -> Result<ChartConfig> {
    let Some(path) = path else {
        return Ok(ChartConfig::default());
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    ChartConfig::from_json(&contents).with_context(|| format!("loading config {}", path.display()))
}

fn write_output(path: Option<&Path>, json: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn layout(args: LayoutArgs) -> Result<()> {
    let config = read_config(args.config.as_deref())?;
    let input = read_input(&args.input)?;
    let viewport = Viewport::new(args.width, args.height)?;

    let mut chart = RadarChart::new(config)?;
    chart.load(input);
    chart.apply_filters(
        Filters {
            years: args.years,
            journals: args.journals,
        },
        Search::new(args.search.unwrap_or_default()),
    );
    let output = chart.layout(viewport)?;
    info!(
        points = output.data.len(),
        width = viewport.width(),
        height = viewport.height(),
        "laid out chart"
    );

    write_output(args.output.as_deref(), &serde_json::to_string_pretty(&output)?)
}

fn aggregate(args: AggregateArgs) -> Result<()> {
    let config = read_config(args.config.as_deref())?;
    let input = read_input(&args.input)?;

    let mut chart = RadarChart::new(config)?;
    chart.load(input);

    write_output(
        args.output.as_deref(),
        &serde_json::to_string_pretty(chart.aggregation())?,
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // logs go to stderr so stdout stays a single JSON document
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Layout(args) => layout(args),
        Commands::Aggregate(args) => aggregate(args),
    }
}
