// Entry point and high-level CLI flow.
//
// - Loads the dataset once through a `DatasetHandle`; a load error aborts
//   before anything is rendered.
// - One-shot mode builds the filter criteria from flags, renders, prints
//   (table or JSON) and optionally exports.
// - Interactive mode lets the user change filters and re-render in a loop.
//
// Exit codes:
//   0 - Success
//   1 - Invalid arguments, bad config, or the dataset failed to load
mod cli;
mod config;
mod interactive;
mod output;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use superstore_dashboard::util::format_int;
use superstore_dashboard::{dashboard, Dataset, DatasetHandle, LoadReport, ViewModel};
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    init_logging(&args);
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("{:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: write a default superstore.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);
    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            path.display()
        );
    }
    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {} with default settings.", path.display());
    Ok(())
}

/// Logs go to stderr so JSON on stdout stays clean. `RUST_LOG` wins when set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn print_load_summary(report: &LoadReport) {
    info!(
        "Processing dataset... ({} rows loaded, {} dropped, encoding {})",
        format_int(report.loaded_rows),
        format_int(report.dropped_rows),
        report.encoding
    );
    if report.missing_ship_dates > 0 {
        warn!(
            "{} rows have no ship date; shipping delay is missing for them",
            format_int(report.missing_ship_dates)
        );
    }
    if report.zero_sales_rows > 0 {
        info!(
            "{} rows have zero sales; profit margin left undefined",
            format_int(report.zero_sales_rows)
        );
    }
}

fn print_domain(dataset: &Dataset) {
    let d = dataset.domain();
    println!("Regions:        {}", d.regions.join(", "));
    println!("Categories:     {}", d.categories.join(", "));
    println!("Sub-Categories: {}", d.sub_categories.join(", "));
    match d.date_range {
        Some((start, end)) => println!("Order dates:    {} to {}", start, end),
        None => println!("Order dates:    (no rows)"),
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::resolve(args.config.as_deref())?;
    config.merge_with_args(&args);

    let handle = DatasetHandle::new(config.load_options()?);
    let dataset = handle.get().with_context(|| {
        format!(
            "Failed to load dataset {}",
            handle.options().path.display()
        )
    })?;
    print_load_summary(dataset.load_report());

    if args.list_domain {
        print_domain(dataset);
        return Ok(());
    }

    let opts = config.report_options();
    if args.interactive {
        interactive::run(dataset, &opts, config.report.preview_rows);
        return Ok(());
    }

    let criteria = args.criteria(dataset.domain());
    debug!("Criteria: {:?}", criteria);

    let summaries = dashboard::summarize(dataset, &criteria, &opts);
    let view = ViewModel::build(&summaries, dataset.len());
    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&view)?);
            if let Some(ref dir) = args.export_dir {
                output::export(dir, &summaries, &view)?;
                info!("Exported tables to {}", dir.display());
            }
        }
        OutputFormat::Table => {
            output::print_dashboard(&view, &summaries, config.report.preview_rows);
            if let Some(ref dir) = args.export_dir {
                output::export(dir, &summaries, &view)?;
                println!("(Full tables exported to {})", dir.display());
            }
        }
    }
    Ok(())
}
