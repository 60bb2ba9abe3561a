use std::path::Path;

use chrono::NaiveDate;

use super::{parse_currency, parse_date, IngestStats, RowView};
use crate::error::AppError;

/// One row of an Amazon order export. Immutable once read.
#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: String,
    /// Lowercased buyer email, the customer identity.
    pub email: String,
    pub buyer_name: String,
    pub product: String,
    pub price: f64,
    /// None when the export carried an unparseable date; such orders are
    /// excluded from eligibility, not from the import.
    pub order_date: Option<NaiveDate>,
    pub status: String,
}

/// Result of reading an order export.
#[derive(Debug)]
pub struct OrderImport {
    pub orders: Vec<Order>,
    pub stats: IngestStats,
}

const EMAIL_ALIASES: &[&str] = &["Buyer Email", "Buyer email", "Email"];
const NAME_ALIASES: &[&str] = &["Buyer Name", "Buyer name", "Recipient Name"];
const DATE_ALIASES: &[&str] = &["Purchase Date", "Order Date", "purchase-date"];
const PRODUCT_ALIASES: &[&str] = &["Product Name", "Title", "product-name"];
const ORDER_ID_ALIASES: &[&str] = &["Order ID", "Amazon Order Id", "order-id"];
const PRICE_ALIASES: &[&str] = &["Item Price", "item-price", "Item Total"];
const STATUS_ALIASES: &[&str] = &["Order Status", "order-status", "Status"];

/// Read an order export. Rows without a buyer email are dropped and
/// counted; everything else is tolerated.
pub fn load_orders(path: &Path) -> Result<OrderImport, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::Config(format!("cannot read orders from {}: {e}", path.display())))?;

    let headers = reader.headers()?.clone();
    let mut orders = Vec::new();
    let mut stats = IngestStats::default();

    for (idx, record) in reader.records().enumerate() {
        let row_no = idx + 1;
        stats.rows_read += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                stats.drop_row(row_no, format!("unreadable row: {e}"));
                continue;
            }
        };
        let row = RowView::new(&headers, &record);

        let Some(email) = row.get(EMAIL_ALIASES) else {
            stats.drop_row(row_no, "missing buyer email");
            continue;
        };

        let order_date = match row.get(DATE_ALIASES) {
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    tracing::debug!(row = row_no, raw, "unparseable order date");
                }
                parsed
            }
            None => None,
        };

        orders.push(Order {
            order_id: row.get(ORDER_ID_ALIASES).unwrap_or("").to_string(),
            email: email.to_lowercase(),
            buyer_name: row.get(NAME_ALIASES).unwrap_or("Valued Customer").to_string(),
            product: row.get(PRODUCT_ALIASES).unwrap_or("Unknown Product").to_string(),
            price: parse_currency(row.get(PRICE_ALIASES)),
            order_date,
            status: row.get(STATUS_ALIASES).unwrap_or("Unknown").to_string(),
        });
    }

    tracing::info!(
        read = stats.rows_read,
        dropped = stats.rows_dropped,
        "Order export loaded"
    );
    Ok(OrderImport { orders, stats })
}
