//! Tabular view of the sales records.

use crate::models::SaleRecord;

/// Column headers of the sales table.
pub const TABLE_HEADER: [&str; 4] = ["ID", "Car", "Price", "Total Sales"];

/// Turn the records into a header row followed by one row per record.
pub fn cars_to_table(records: &[SaleRecord]) -> Vec<Vec<String>> {
    let mut table = Vec::with_capacity(records.len() + 1);
    table.push(TABLE_HEADER.iter().map(|h| h.to_string()).collect());

    for record in records {
        table.push(vec![
            record.id.to_string(),
            record.car.display_name(),
            record.price.clone(),
            record.total_sales.to_string(),
        ]);
    }

    table
}
