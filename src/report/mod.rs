//! Report generation modules.

pub mod fonts;
pub mod generator;
pub mod table;

pub use fonts::FontSource;
pub use generator::{generate, write_json_summary, ReportDocument};
pub use table::cars_to_table;
