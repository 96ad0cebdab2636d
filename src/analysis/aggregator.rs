//! Sales aggregation and statistics.
//!
//! This module computes the summary statistics shown at the top of the
//! report: the record with the most revenue, the record with the most units
//! sold and the model year with the most units sold.

use crate::error::ReportError;
use crate::models::{PopularYear, RevenueLeader, SaleRecord, SalesSummary};
use std::collections::BTreeMap;
use tracing::debug;

/// Compute the sales summary in a single pass over `records`.
///
/// Leaders only change on a strictly greater value, so the first record wins
/// a tie. Fails on the first price that is not a valid amount.
pub fn process_data(records: &[SaleRecord]) -> Result<SalesSummary, ReportError> {
    if records.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    let mut max_revenue = 0.0_f64;
    let mut top_revenue: Option<RevenueLeader> = None;
    let mut max_sales = 0_u64;
    let mut top_sales: Option<SaleRecord> = None;
    let mut sales_by_year: BTreeMap<u32, u64> = BTreeMap::new();

    for record in records {
        let revenue = record.revenue()?;
        if revenue > max_revenue {
            max_revenue = revenue;
            top_revenue = Some(RevenueLeader {
                record: record.clone(),
                revenue,
            });
        }

        if record.total_sales > max_sales {
            max_sales = record.total_sales;
            top_sales = Some(record.clone());
        }

        *sales_by_year.entry(record.car.car_year).or_insert(0) += record.total_sales;
    }

    let popular_year = most_popular_year(&sales_by_year).ok_or(ReportError::EmptyDataset)?;

    debug!(
        "Aggregated {} records across {} model years",
        records.len(),
        sales_by_year.len()
    );

    Ok(SalesSummary {
        top_revenue,
        top_sales,
        popular_year,
        sales_by_year,
    })
}

/// Pick the year with the most units sold.
///
/// Years are visited in ascending order and only replaced on a strictly
/// greater total, so the smallest year wins a tie.
pub fn most_popular_year(sales_by_year: &BTreeMap<u32, u64>) -> Option<PopularYear> {
    let mut best: Option<PopularYear> = None;

    for (&year, &total_sales) in sales_by_year {
        match best {
            Some(current) if total_sales <= current.total_sales => {}
            _ => best = Some(PopularYear { year, total_sales }),
        }
    }

    best
}
