//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// car-sales-report - summarize car sales into a PDF and email it
///
/// Reads a JSON list of car sales, finds the top sellers and the most
/// popular model year, renders a PDF report and emails it to the user.
///
/// Examples:
///   car-sales-report
///   car-sales-report --input ../car_sales.json --user jdoe
///   car-sales-report --dry-run --output ./cars.pdf
///   car-sales-report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path of the JSON sales dataset
    ///
    /// Defaults to car_sales.json or the value from .car-report.toml.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output path for the PDF report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .car-report.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report title, also used as the email subject
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Directory containing the report font family
    #[arg(long, value_name = "DIR")]
    pub fonts_dir: Option<PathBuf>,

    /// User name the report is addressed to
    ///
    /// The recipient is <USER>@<mail.domain>. Falls back to $USER.
    #[arg(short, long, value_name = "USER", env = "USER")]
    pub user: Option<String>,

    /// Full recipient address, overriding --user
    #[arg(long, value_name = "ADDRESS")]
    pub recipient: Option<String>,

    /// SMTP relay host
    #[arg(long, value_name = "HOST")]
    pub smtp_host: Option<String>,

    /// SMTP relay port
    #[arg(long, value_name = "PORT")]
    pub smtp_port: Option<u16>,

    /// Also write the computed summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Render the report without sending the email
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .car-report.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref title) = self.title {
            if title.trim().is_empty() {
                return Err("Report title must not be empty".to_string());
            }
        }

        if self.smtp_port == Some(0) {
            return Err("SMTP port must be between 1 and 65535".to_string());
        }

        if let Some(ref input) = self.input {
            if input.is_dir() {
                return Err(format!("Input path is a directory: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `verbose_by_default` comes from `general.verbose` in the config file;
    /// `--quiet` still wins over it.
    pub fn log_level(&self, verbose_by_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_by_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: None,
            output: None,
            config: None,
            title: None,
            fonts_dir: None,
            user: Some("student".to_string()),
            recipient: None,
            smtp_host: None,
            smtp_port: None,
            summary_json: None,
            dry_run: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "car-sales-report",
            "--input",
            "data.json",
            "--smtp-port",
            "2525",
            "--user",
            "jdoe",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("data.json")));
        assert_eq!(args.smtp_port, Some(2525));
        assert_eq!(args.user.as_deref(), Some("jdoe"));
        assert!(args.dry_run);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_port_and_blank_title() {
        let mut args = make_args();
        args.smtp_port = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.title = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.init_config = true;
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config_verbose() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
