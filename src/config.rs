//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.car-report.toml` files.

use crate::mail::{DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use crate::report::fonts::DEFAULT_FONT_FAMILY;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".car-report.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Email settings.
    #[serde(default)]
    pub mail: MailConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the JSON sales dataset.
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            verbose: false,
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("car_sales.json")
}

/// PDF report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where the PDF is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Report title, also used as the email subject.
    #[serde(default = "default_title")]
    pub title: String,

    /// Directory holding the font family. Searched automatically when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts_dir: Option<PathBuf>,

    /// Font family name, used as the font file prefix.
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            title: default_title(),
            fonts_dir: None,
            font_family: default_font_family(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("/tmp/cars.pdf")
}

fn default_title() -> String {
    "Sales summary for last month".to_string()
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

/// Email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Sender address.
    #[serde(default = "default_sender")]
    pub sender: String,

    /// Domain appended to the user name to form the recipient address.
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Full recipient address. Takes precedence over user and domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: default_sender(),
            domain: default_domain(),
            recipient: None,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
        }
    }
}

fn default_sender() -> String {
    "automation@example.com".to_string()
}

fn default_domain() -> String {
    "example.com".to_string()
}

fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl MailConfig {
    /// Resolve the recipient address for `user`.
    ///
    /// Returns `None` when neither a recipient nor a user name is known.
    pub fn recipient_for(&self, user: Option<&str>) -> Option<String> {
        if let Some(recipient) = &self.recipient {
            return Some(recipient.clone());
        }

        user.map(str::trim)
            .filter(|user| !user.is_empty())
            .map(|user| format!("{}@{}", user, self.domain))
    }
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file.
    File(PathBuf),
    /// No config file present; built-in defaults.
    Defaults,
    /// The default config file could not be used; built-in defaults.
    Fallback(String),
}

impl ConfigSource {
    /// Log the source once logging is initialized.
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Fallback(reason) => {
                warn!("Failed to load {}: {}", DEFAULT_CONFIG_FILE, reason);
                warn!("Using default configuration");
            }
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.general.input = input.clone();
        }
        if let Some(ref output) = args.output {
            self.report.output = output.clone();
        }
        if let Some(ref title) = args.title {
            self.report.title = title.clone();
        }
        if let Some(ref fonts_dir) = args.fonts_dir {
            self.report.fonts_dir = Some(fonts_dir.clone());
        }
        if let Some(ref host) = args.smtp_host {
            self.mail.smtp_host = host.clone();
        }
        if let Some(port) = args.smtp_port {
            self.mail.smtp_port = port;
        }
        if let Some(ref recipient) = args.recipient {
            self.mail.recipient = Some(recipient.clone());
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
