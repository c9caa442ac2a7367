use activity_heatmap::date_index::parse_date;
use activity_heatmap::renderer;
use activity_heatmap::window::Period;
use activity_heatmap::{logging, ActivityPayload, EngineConfig, HeatmapEngine, HeatmapView};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "heatmap")]
#[command(about = "Activity heatmap: week grid, month labels and streak stats", long_about = None)]
struct Cli {
    /// Also append logs to heatmap.log in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the heatmap for an activity payload
    Render {
        /// Path to the activity payload JSON
        #[arg(long)]
        payload: PathBuf,

        /// Reference day for streaks and "active today" (defaults to the local date)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,

        /// Engine config JSON (level thresholds, minimum label width, server stats policy)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Reporting period (year, halfyear, quarter, month). Supplies month labels when the payload has none.
        #[arg(long, value_parser = Period::parse)]
        period: Option<Period>,

        /// Insert empty days so the dataset covers the whole period
        #[arg(long, requires = "period")]
        fill_window: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check an activity payload against the bundled JSON schema
    Validate {
        /// Path to the activity payload JSON
        #[arg(long)]
        payload: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Md,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            payload,
            today,
            config,
            period,
            fill_window,
            format,
            output,
        } => {
            logging::init_logging(cli.log_dir.as_deref(), "render")?;
            let request = RenderRequest {
                payload,
                today: today.unwrap_or_else(|| Local::now().date_naive()),
                config,
                period,
                fill_window,
            };
            let view = build_view(&request)?;

            let rendered = match format {
                Format::Json => serde_json::to_string_pretty(&view)
                    .context("Failed to serialize heatmap view")?,
                Format::Md => renderer::md::render(&view)?,
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write output: {}", path.display()))?;
                    tracing::info!("Heatmap written to: {}", path.display());
                }
                None => println!("{}", rendered),
            }
            Ok(())
        }
        Commands::Validate { payload } => {
            logging::init_logging(cli.log_dir.as_deref(), "validate")?;
            let loaded = ActivityPayload::load_and_validate(&payload)?;
            // Schema-valid payloads can still carry impossible dates or totals
            loaded.records().with_context(|| {
                format!("Payload {} has invalid records", payload.display())
            })?;
            println!(
                "{}: valid ({} days, {} month labels)",
                payload.display(),
                loaded.dates.len(),
                loaded.months.len()
            );
            Ok(())
        }
    }
}

struct RenderRequest {
    payload: PathBuf,
    today: NaiveDate,
    config: Option<PathBuf>,
    period: Option<Period>,
    fill_window: bool,
}

fn build_view(request: &RenderRequest) -> Result<HeatmapView> {
    let config = match &request.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = HeatmapEngine::new(config)?;
    let mut payload = ActivityPayload::load_and_validate(&request.payload)?;

    let Some(period) = request.period else {
        return Ok(engine.build(&payload, request.today)?);
    };

    let window = period.window(request.today)?;
    if payload.months.is_empty() {
        payload.months = window.month_labels();
    }

    if !request.fill_window {
        return Ok(engine.build(&payload, request.today)?);
    }

    let records = window.densify(payload.records()?)?;
    tracing::info!(
        days = records.len(),
        "Filled {:?} window {} to {}",
        period,
        window.from,
        window.to
    );
    Ok(engine.build_from_records(
        records,
        &payload.months,
        payload.stats.as_ref(),
        request.today,
    )?)
}
