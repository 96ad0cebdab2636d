//! car-sales-report - car sales summary generator
//!
//! Reads a JSON dataset of car sales, computes the top revenue model, the
//! top selling model and the most popular model year, renders the result as
//! a PDF report and emails it as an attachment.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (unreadable data, bad price, rendering or mail failure)

mod analysis;
mod cli;
mod config;
mod error;
mod loader;
mod mail;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, ConfigSource};
use error::ReportError;
use indicatif::{ProgressBar, ProgressStyle};
use models::SalesSummary;
use report::{FontSource, ReportDocument};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration first so general.verbose can raise the log level
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("car-sales-report v{}", env!("CARGO_PKG_VERSION"));
    source.log();
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_report(&args, &config) {
        error!("Report failed: {}", e);
        eprintln!("\n❌ Error: {}", e);
        for cause in e.chain().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        if let Some(report_error) = e.downcast_ref::<ReportError>() {
            if report_error.is_load_error() {
                eprintln!("   Check the --input path or general.input in the config file.");
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .car-report.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::DEFAULT_CONFIG_FILE))?;

    println!(
        "✅ Created {} with default settings.",
        config::DEFAULT_CONFIG_FILE
    );
    println!("   Edit it to customize the input, report title, fonts and mail relay.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete report workflow.
fn run_report(args: &Args, config: &Config) -> Result<()> {
    // Steps 1-4: load, aggregate, tabulate, render
    let summary = build_report(config)?;

    if let Some(ref path) = args.summary_json {
        report::write_json_summary(&summary, path)?;
        info!("Summary written to {}", path.display());
    }

    if args.dry_run {
        println!(
            "\n✅ Dry run complete. Report saved to {}; no email was sent.",
            config.report.output.display()
        );
        return Ok(());
    }

    // Step 5: email the report
    let receiver = config
        .mail
        .recipient_for(args.user.as_deref())
        .context("No recipient: pass --user or --recipient, or set USER")?;

    send_report(config, &summary, &receiver, !args.quiet)?;

    println!(
        "\n✅ Report saved to {} and sent to {}",
        config.report.output.display(),
        receiver
    );
    Ok(())
}

/// Load the dataset, summarize it and render the PDF report.
fn build_report(config: &Config) -> Result<SalesSummary> {
    info!("Loading sales data from {}", config.general.input.display());
    let records = loader::load_data(&config.general.input)?;

    let summary = analysis::process_data(&records)?;
    for line in summary.lines() {
        info!("{}", line);
    }

    let table = report::cars_to_table(&records);
    let summary_html = summary.to_html();
    let document = ReportDocument {
        title: &config.report.title,
        summary_html: &summary_html,
        table: &table,
        generated_at: Utc::now(),
    };
    let fonts = FontSource {
        dir: config.report.fonts_dir.clone(),
        family: config.report.font_family.clone(),
    };

    info!("Rendering report to {}", config.report.output.display());
    report::generate(&config.report.output, &document, &fonts)?;

    Ok(summary)
}

/// Compose the report email and hand it to the SMTP relay.
fn send_report(
    config: &Config,
    summary: &SalesSummary,
    receiver: &str,
    show_progress: bool,
) -> Result<()> {
    let message = mail::generate(
        &config.mail.sender,
        receiver,
        &config.report.title,
        &summary.to_text(),
        &config.report.output,
    )?;

    let mailer = mail::Mailer::new(&config.mail.smtp_host, config.mail.smtp_port);

    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };
    spinner.set_message(format!(
        "Sending report to {} via {}:{}",
        receiver, config.mail.smtp_host, config.mail.smtp_port
    ));

    let result = mailer.send(&message);
    spinner.finish_and_clear();
    result?;

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so where the config came from is returned
/// and logged by the caller.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::File(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((
            config,
            ConfigSource::File(PathBuf::from(config::DEFAULT_CONFIG_FILE)),
        )),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Fallback(format!("{:#}", e)))),
    }
}
