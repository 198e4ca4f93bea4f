//! stocklight CLI - inventory KPI reporting batch jobs

#![deny(warnings)]

// Each subcommand is one batch run: connect, query, transform in memory,
// render, exit. The connection is released before rendering; any failure
// aborts the run with a diagnostic and a non-zero exit status.

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use stocklight_core::reports::{
    monthly_kpis, seasonal_demand, sell_through, status_counts, stock_status_heatmap,
};
use stocklight_core::{html, render, DataSource, SourceConfig, SourceOptions};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "stocklight")]
#[command(about = "Inventory KPI reporting - traffic-light dashboards, stock-status heatmaps, and sell-through charts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to config file (default: stocklight.config.json, then environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overriding the configured one
    #[arg(long, global = true)]
    database: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Output file path (default: stdout)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly KPI dashboard with traffic lights per store
    MonthlyKpis {
        /// Number of trailing months in the sparkline panels
        #[arg(long, default_value_t = monthly_kpis::DEFAULT_SPARKLINE_WINDOW)]
        window: usize,
    },
    /// Product-level stock status heatmap across stores
    StockStatus,
    /// Inventory status counts by store plus region issue heatmap
    StatusCounts,
    /// Average units sold by product category and season
    SeasonalDemand,
    /// Monthly sell-through rate, units sold, and inventory by region
    SellThrough,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let rendered = match cli.command {
        Commands::MonthlyKpis { window } => {
            let dashboard = with_source(&config, |source| monthly_kpis::run(source, window))?;
            match cli.format {
                OutputFormat::Text => render::render_dashboard_text(&dashboard),
                OutputFormat::Json => render::render_json(&dashboard)?,
                OutputFormat::Html => html::render_html_dashboard(&dashboard),
            }
        }
        Commands::StockStatus => {
            let heatmap = with_source(&config, stock_status_heatmap::run)?;
            match cli.format {
                OutputFormat::Text => render::render_heatmap_text(&heatmap),
                OutputFormat::Json => render::render_json(&heatmap)?,
                OutputFormat::Html => html::render_html_heatmap(&heatmap),
            }
        }
        Commands::StatusCounts => {
            let counts = with_source(&config, status_counts::run)?;
            match cli.format {
                OutputFormat::Text => render::render_status_counts_text(&counts),
                OutputFormat::Json => render::render_json(&counts)?,
                OutputFormat::Html => html::render_html_status_counts(&counts),
            }
        }
        Commands::SeasonalDemand => {
            let demand = with_source(&config, seasonal_demand::run)?;
            match cli.format {
                OutputFormat::Text => render::render_seasonal_text(&demand),
                OutputFormat::Json => render::render_json(&demand)?,
                OutputFormat::Html => html::render_html_seasonal(&demand),
            }
        }
        Commands::SellThrough => {
            let report = with_source(&config, sell_through::run)?;
            match cli.format {
                OutputFormat::Text => render::render_sell_through_text(&report),
                OutputFormat::Json => render::render_json(&report)?,
                OutputFormat::Html => html::render_html_sell_through(&report),
            }
        }
    };

    match cli.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            eprintln!("report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Resolve connection options from file and environment, fail-fast.
fn load_config(cli: &Cli) -> anyhow::Result<SourceConfig> {
    let mut options = SourceOptions::load(cli.config.as_deref())
        .context("failed to load connection options")?;
    if cli.database.is_some() {
        options.database = cli.database.clone();
        options.driver.get_or_insert_with(|| "sqlite".to_string());
    }
    options
        .resolve()
        .context("connection configuration is incomplete")
}

/// Connect, run one report, and release the connection before rendering.
fn with_source<T>(
    config: &SourceConfig,
    job: impl FnOnce(&DataSource) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let spinner = query_spinner();
    let source = DataSource::connect(config).context("could not reach the database")?;
    let result = job(&source);
    // Release on both paths; close errors only matter if the job succeeded
    let closed = source.close();
    spinner.finish_and_clear();
    let report = result?;
    closed.context("failed to release the database connection")?;
    Ok(report)
}

fn query_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("querying inventory data...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();
}
