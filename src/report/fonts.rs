//! Font discovery for the PDF renderer.
//!
//! `genpdf` needs a TrueType family on disk: `{family}-Regular.ttf`,
//! `-Bold`, `-Italic` and `-BoldItalic` in a single directory.

use genpdf::fonts::{self, FontData, FontFamily};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable pointing at a font directory.
pub const FONTS_DIR_ENV: &str = "CAR_REPORT_FONTS_DIR";

/// Family used when none is configured.
pub const DEFAULT_FONT_FAMILY: &str = "LiberationSans";

const STYLE_SUFFIXES: &[&str] = &["Regular", "Bold", "Italic", "BoldItalic"];

const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/TTF",
    "/Library/Fonts",
];

/// Failure to find or load the report font family.
#[derive(Debug, Error)]
pub enum FontError {
    /// No searched directory holds all four styles.
    #[error(
        "no complete '{family}' font family found; checked: {}. Set {} or report.fonts_dir",
        attempts.join(", "),
        FONTS_DIR_ENV
    )]
    NotFound { family: String, attempts: Vec<String> },

    /// The files exist but `genpdf` could not parse them.
    #[error("failed to load font family '{family}' from {}: {message}", dir.display())]
    Load {
        family: String,
        dir: PathBuf,
        message: String,
    },
}

/// Where to look for the report font family.
#[derive(Debug, Clone)]
pub struct FontSource {
    /// Explicit directory. When set, no other location is searched.
    pub dir: Option<PathBuf>,
    /// Family name used as the file name prefix.
    pub family: String,
}

impl Default for FontSource {
    fn default() -> Self {
        Self {
            dir: None,
            family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

impl FontSource {
    fn candidates(&self) -> Vec<PathBuf> {
        if let Some(dir) = &self.dir {
            return vec![dir.clone()];
        }

        let mut candidates = Vec::new();

        if let Ok(path) = env::var(FONTS_DIR_ENV) {
            if !path.trim().is_empty() {
                candidates.push(PathBuf::from(path));
            }
        }

        candidates.extend(SYSTEM_FONT_DIRS.iter().map(PathBuf::from));
        candidates
    }

    fn missing_files(&self, dir: &Path) -> Vec<String> {
        STYLE_SUFFIXES
            .iter()
            .map(|suffix| format!("{}-{}.ttf", self.family, suffix))
            .filter(|name| !dir.join(name).is_file())
            .collect()
    }

    /// Find the first directory holding the complete family.
    pub fn resolve(&self) -> Result<PathBuf, FontError> {
        let mut attempts = Vec::new();

        for candidate in self.candidates() {
            if !candidate.is_dir() {
                attempts.push(format!("{} (directory missing)", candidate.display()));
                continue;
            }

            let missing = self.missing_files(&candidate);
            if missing.is_empty() {
                debug!("Using fonts from {}", candidate.display());
                return Ok(candidate);
            }

            attempts.push(format!(
                "{} (missing {})",
                candidate.display(),
                missing.join(", ")
            ));
        }

        Err(FontError::NotFound {
            family: self.family.clone(),
            attempts,
        })
    }

    /// Load the font family for a `genpdf` document.
    pub fn load(&self) -> Result<FontFamily<FontData>, FontError> {
        let dir = self.resolve()?;
        fonts::from_files(&dir, &self.family, None).map_err(|err| FontError::Load {
            family: self.family.clone(),
            dir,
            message: err.to_string(),
        })
    }
}
