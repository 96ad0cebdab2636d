//! Data models for the sales report.
//!
//! This module contains the sales records read from the input dataset and
//! the summary derived from them.

use crate::error::ReportError;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The car a sales record refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    /// Manufacturer, e.g. "Ford".
    pub car_make: String,
    /// Model name, e.g. "Club Wagon".
    pub car_model: String,
    /// Model year. Accepted as a JSON number or a numeric string.
    #[serde(deserialize_with = "deserialize_year")]
    pub car_year: u32,
}

impl Car {
    /// Returns the display name used in the summary and the table.
    pub fn display_name(&self) -> String {
        format_car(self)
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.car_make, self.car_model, self.car_year)
    }
}

/// Formats a car as `"{make} {model} ({year})"`.
pub fn format_car(car: &Car) -> String {
    car.to_string()
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearRepr {
        Number(u32),
        Text(String),
    }

    match YearRepr::deserialize(deserializer)? {
        YearRepr::Number(year) => Ok(year),
        YearRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid car_year {:?}", text))),
    }
}

/// One entry of the sales dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Record identifier.
    pub id: u64,
    /// The car that was sold.
    pub car: Car,
    /// Unit price as written in the dataset, e.g. "$24999.99".
    pub price: String,
    /// Number of units sold.
    pub total_sales: u64,
}

impl SaleRecord {
    /// Returns the unit price as a number.
    pub fn price_amount(&self) -> Result<f64, ReportError> {
        parse_price(&self.price).ok_or_else(|| ReportError::Format {
            id: self.id,
            raw: self.price.clone(),
        })
    }

    /// Returns `price * total_sales`.
    ///
    /// A product that overflows to infinity is reported as a format error
    /// on the record's price.
    pub fn revenue(&self) -> Result<f64, ReportError> {
        let revenue = self.price_amount()? * self.total_sales as f64;
        if !revenue.is_finite() {
            return Err(ReportError::Format {
                id: self.id,
                raw: self.price.clone(),
            });
        }
        Ok(revenue)
    }
}

/// Parses a currency string such as `"$24,999.99"` into an amount.
///
/// Surrounding whitespace and dollar signs are stripped. Commas are accepted
/// only as thousands separators in the integer part. Returns `None` unless
/// the rest is a finite number.
pub fn parse_price(raw: &str) -> Option<f64> {
    let stripped = raw.trim().trim_matches('$').trim();
    if stripped.is_empty() {
        return None;
    }

    let digits = strip_thousands_separators(stripped)?;
    digits.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Removes `,` group separators, rejecting misplaced ones (`"1,2,3"`,
/// `"12,34"`, or a comma after the decimal point).
fn strip_thousands_separators(number: &str) -> Option<String> {
    if !number.contains(',') {
        return Some(number.to_string());
    }

    let (integer, fraction) = match number.find('.') {
        Some(dot) => number.split_at(dot),
        None => (number, ""),
    };
    if fraction.contains(',') {
        return None;
    }

    let unsigned = integer.trim_start_matches(['-', '+']);
    let sign = &integer[..integer.len() - unsigned.len()];
    if sign.len() > 1 {
        return None;
    }

    let mut groups = unsigned.split(',');
    let leading = groups.next()?;
    let is_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());
    if leading.is_empty() || leading.len() > 3 || !is_digits(leading) {
        return None;
    }

    let mut joined = format!("{}{}", sign, leading);
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        joined.push_str(group);
    }
    joined.push_str(fraction);
    Some(joined)
}

/// The record that generated the most revenue.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueLeader {
    pub record: SaleRecord,
    /// `price * total_sales` for the record.
    pub revenue: f64,
}

/// The model year with the highest aggregated sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopularYear {
    pub year: u32,
    pub total_sales: u64,
}

/// Summary statistics computed over the whole dataset.
#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    /// `None` when no record has positive revenue.
    pub top_revenue: Option<RevenueLeader>,
    /// `None` when no record has positive sales.
    pub top_sales: Option<SaleRecord>,
    pub popular_year: PopularYear,
    /// Units sold per model year.
    pub sales_by_year: BTreeMap<u32, u64>,
}

impl SalesSummary {
    /// Returns the three human-readable summary lines.
    pub fn lines(&self) -> Vec<String> {
        let revenue_line = match &self.top_revenue {
            Some(leader) => format!(
                "The {} generated the most revenue: ${:.2}",
                leader.record.car, leader.revenue
            ),
            None => "No car generated any revenue.".to_string(),
        };

        let sales_line = match &self.top_sales {
            Some(record) => format!(
                "The {} had the most sales: {}",
                record.car, record.total_sales
            ),
            None => "No car recorded any sales.".to_string(),
        };

        let year_line = format!(
            "The most popular year was {} with {} sales.",
            self.popular_year.year, self.popular_year.total_sales
        );

        vec![revenue_line, sales_line, year_line]
    }

    /// Summary lines joined with `<br/>` for the PDF renderer.
    pub fn to_html(&self) -> String {
        let mut html = self.lines().join("<br/>");
        html.push_str("<br/>");
        html
    }

    /// Summary lines joined with newlines for the email body.
    pub fn to_text(&self) -> String {
        self.lines().join("\n")
    }
}
