//! PDF report generation.
//!
//! This module renders the sales summary and the sales table into a PDF
//! document, and exports the summary as JSON on request.

use crate::error::ReportError;
use crate::models::SalesSummary;
use crate::report::fonts::FontSource;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::style::Style;
use genpdf::{Document, Element as _, SimplePageDecorator};
use std::path::Path;
use tracing::{debug, info};

/// Relative widths of the ID, Car, Price and Total Sales columns.
const COLUMN_WEIGHTS: [usize; 4] = [1, 5, 2, 2];

const TITLE_FONT_SIZE: u8 = 18;

/// Page margins in millimetres.
const PAGE_MARGINS_MM: i32 = 15;

/// Everything that goes into the PDF.
#[derive(Debug, Clone)]
pub struct ReportDocument<'a> {
    pub title: &'a str,
    /// Summary lines separated by `<br/>`.
    pub summary_html: &'a str,
    /// Header row followed by data rows.
    pub table: &'a [Vec<String>],
    pub generated_at: DateTime<Utc>,
}

/// Split an HTML summary on `<br/>` into non-empty paragraphs.
pub fn summary_paragraphs(summary_html: &str) -> Vec<&str> {
    summary_html
        .split("<br/>")
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Render `document` as a PDF at `output_path`.
pub fn generate(
    output_path: &Path,
    document: &ReportDocument<'_>,
    fonts: &FontSource,
) -> Result<(), ReportError> {
    let render_error = |message: String| ReportError::Render {
        path: output_path.to_path_buf(),
        message,
    };

    let font_family = fonts.load().map_err(|err| render_error(err.to_string()))?;
    let mut doc = Document::new(font_family);
    doc.set_title(document.title);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(PAGE_MARGINS_MM);
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new(document.title.to_string())
            .styled(Style::new().bold().with_font_size(TITLE_FONT_SIZE)),
    );
    doc.push(
        Paragraph::new(format!(
            "Generated {}",
            document.generated_at.format("%Y-%m-%d %H:%M UTC")
        ))
        .styled(Style::new().italic()),
    );
    doc.push(Break::new(1));

    for line in summary_paragraphs(document.summary_html) {
        doc.push(Paragraph::new(line.to_string()));
    }
    doc.push(Break::new(1));

    doc.push(build_table(document.table).map_err(|err| render_error(err.to_string()))?);

    debug!(
        "Rendering {} table rows to {}",
        document.table.len(),
        output_path.display()
    );
    doc.render_to_file(output_path)
        .map_err(|err| render_error(err.to_string()))?;

    info!("Report written to {}", output_path.display());
    Ok(())
}

fn build_table(rows: &[Vec<String>]) -> Result<TableLayout, genpdf::error::Error> {
    let mut table = TableLayout::new(COLUMN_WEIGHTS.to_vec());
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    for (index, row) in rows.iter().enumerate() {
        let mut table_row = table.row();
        for cell in row {
            let paragraph = Paragraph::new(cell.clone()).padded(1);
            if index == 0 {
                table_row.push_element(paragraph.styled(Style::new().bold()));
            } else {
                table_row.push_element(paragraph);
            }
        }
        table_row.push()?;
    }

    Ok(table)
}

/// Serialize the summary as pretty JSON.
pub fn generate_json_summary(summary: &SalesSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Write the JSON summary to a file.
pub fn write_json_summary(summary: &SalesSummary, path: &Path) -> Result<()> {
    let content = generate_json_summary(summary)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Car, PopularYear, RevenueLeader, SaleRecord};
    use crate::report::table::cars_to_table;
    use tempfile::TempDir;

    fn create_test_records() -> Vec<SaleRecord> {
        vec![
            SaleRecord {
                id: 1,
                car: Car {
                    car_make: "Honda".to_string(),
                    car_model: "Civic".to_string(),
                    car_year: 2020,
                },
                price: "$20000".to_string(),
                total_sales: 5,
            },
            SaleRecord {
                id: 2,
                car: Car {
                    car_make: "Ford".to_string(),
                    car_model: "F150".to_string(),
                    car_year: 2020,
                },
                price: "$30000".to_string(),
                total_sales: 3,
            },
        ]
    }

    fn create_test_summary() -> SalesSummary {
        let record = create_test_records().remove(0);
        SalesSummary {
            top_revenue: Some(RevenueLeader {
                record: record.clone(),
                revenue: 100000.0,
            }),
            top_sales: Some(record),
            popular_year: PopularYear {
                year: 2020,
                total_sales: 8,
            },
            sales_by_year: [(2020, 8)].into_iter().collect(),
        }
    }

    #[test]
    fn test_summary_paragraphs() {
        let paragraphs = summary_paragraphs("first<br/>second<br/> <br/>third<br/>");
        assert_eq!(paragraphs, vec!["first", "second", "third"]);
        assert!(summary_paragraphs("").is_empty());
    }

    #[test]
    fn test_generate_pdf() {
        let fonts = FontSource::default();
        if fonts.resolve().is_err() {
            eprintln!("skipping PDF rendering test: no report fonts available");
            return;
        }

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("cars.pdf");
        let summary_html = create_test_summary().to_html();
        let table = cars_to_table(&create_test_records());
        let document = ReportDocument {
            title: "Sales summary for last month",
            summary_html: &summary_html,
            table: &table,
            generated_at: Utc::now(),
        };

        generate(&output, &document, &fonts).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_generate_without_fonts_fails() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("cars.pdf");
        let table = cars_to_table(&create_test_records());
        let document = ReportDocument {
            title: "Sales summary",
            summary_html: "line<br/>",
            table: &table,
            generated_at: Utc::now(),
        };
        let fonts = FontSource {
            dir: Some(dir.path().join("no-fonts-here")),
            ..FontSource::default()
        };

        let err = generate(&output, &document, &fonts).unwrap_err();
        match err {
            ReportError::Render { ref path, ref message } => {
                assert_eq!(path, &output);
                assert!(message.contains("no complete 'LiberationSans' font family found"));
                assert!(message.contains("no-fonts-here (directory missing)"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_generate_json_summary() {
        let json = generate_json_summary(&create_test_summary()).unwrap();

        assert!(json.contains("\"top_revenue\""));
        assert!(json.contains("\"popular_year\""));
        assert!(json.contains("\"2020\": 8"));
    }

    #[test]
    fn test_write_json_summary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");

        write_json_summary(&create_test_summary(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["popular_year"]["year"], 2020);
        assert_eq!(value["top_sales"]["id"], 1);
    }
}
