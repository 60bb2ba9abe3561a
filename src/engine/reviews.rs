use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::template::{render, TemplateContext};
use crate::config::ReviewThresholds;
use crate::error::AppError;
use crate::ingest::orders::Order;
use crate::ledger::{outside_cooldown, Ledger};

/// All orders for one customer, keyed by lowercased email.
#[derive(Debug)]
pub struct CustomerHistory {
    pub email: String,
    pub name: String,
    pub orders: Vec<Order>,
    pub total_spent: f64,
}

impl CustomerHistory {
    /// Most recent dated order; undated orders sort last.
    pub fn latest_order(&self) -> Option<&Order> {
        self.orders
            .iter()
            .max_by_key(|o| o.order_date.unwrap_or(NaiveDate::MIN))
    }
}

/// Group an order export by customer.
pub fn group_customers(orders: &[Order]) -> Vec<CustomerHistory> {
    let mut by_email: BTreeMap<String, CustomerHistory> = BTreeMap::new();
    for order in orders {
        let entry = by_email
            .entry(order.email.clone())
            .or_insert_with(|| CustomerHistory {
                email: order.email.clone(),
                name: order.buyer_name.clone(),
                orders: Vec::new(),
                total_spent: 0.0,
            });
        entry.total_spent += order.price;
        entry.orders.push(order.clone());
    }
    by_email.into_values().collect()
}

/// A customer cleared for a review request.
#[derive(Debug, Clone)]
pub struct EligibleCustomer {
    pub email: String,
    pub name: String,
    pub first_name: String,
    pub order_count: usize,
    pub total_spent: f64,
    pub latest_product: String,
    pub days_since_order: i64,
}

/// Outcome of the eligibility pass.
#[derive(Debug, Default)]
pub struct ReviewSelection {
    pub eligible: Vec<EligibleCustomer>,
    /// Customers meeting the repeat threshold before further predicates.
    pub repeat_customers: usize,
    /// Repeat customers whose latest order carried no parseable date.
    pub missing_date: usize,
}

// Each predicate stands alone; eligibility is their conjunction.

pub fn is_repeat(order_count: usize, min_purchases: u32) -> bool {
    order_count >= min_purchases as usize
}

pub fn within_window(days_since: i64, min_days: i64, max_days: i64) -> bool {
    days_since >= min_days && days_since <= max_days
}

pub fn is_delivered(status: &str) -> bool {
    status.to_uppercase().contains("DELIVER")
}

/// Apply the full predicate conjunction over grouped customers.
pub fn select_eligible(
    customers: &[CustomerHistory],
    today: NaiveDate,
    now: DateTime<Utc>,
    thresholds: &ReviewThresholds,
    ledger: &dyn Ledger,
) -> Result<ReviewSelection, AppError> {
    let mut selection = ReviewSelection::default();

    for customer in customers {
        if !is_repeat(customer.orders.len(), thresholds.min_purchases) {
            continue;
        }
        selection.repeat_customers += 1;

        let Some(latest) = customer.latest_order() else { continue };
        let Some(order_date) = latest.order_date else {
            selection.missing_date += 1;
            continue;
        };

        let days_since = today.signed_duration_since(order_date).num_days();
        if !within_window(
            days_since,
            thresholds.min_days_since_order,
            thresholds.max_days_since_order,
        ) {
            continue;
        }
        if !is_delivered(&latest.status) {
            continue;
        }
        if !outside_cooldown(ledger, &customer.email, now, thresholds.cooldown_days)? {
            tracing::debug!(email = %customer.email, "inside cool-down window, skipped");
            continue;
        }

        selection.eligible.push(EligibleCustomer {
            email: customer.email.clone(),
            name: customer.name.clone(),
            first_name: customer
                .name
                .split_whitespace()
                .next()
                .unwrap_or("")
                .to_string(),
            order_count: customer.orders.len(),
            total_spent: customer.total_spent,
            latest_product: latest.product.clone(),
            days_since_order: days_since,
        });
    }

    Ok(selection)
}

/// Short product name for the subject line: first four words.
fn short_product(product: &str) -> String {
    product.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// Render the personalized email draft for one eligible customer.
pub fn build_draft(customer: &EligibleCustomer, thresholds: &ReviewThresholds) -> String {
    let mut ctx = TemplateContext::new(thresholds.missing_field_text.clone())
        .set("product_name", short_product(&customer.latest_product))
        .set("order_count", customer.order_count.to_string())
        .set("sender_name", thresholds.sender_name.clone());
    if !customer.first_name.is_empty() {
        ctx = ctx.set("first_name", customer.first_name.clone());
    }
    render(&thresholds.email_template, &ctx)
}

pub const CSV_HEADER: &[&str] = &[
    "Email",
    "First Name",
    "Order Count",
    "Total Spent",
    "Latest Product",
    "Days Since Order",
    "Email Draft",
];

/// One upload-ready CSV row. The draft is flattened onto one line.
pub fn csv_row(customer: &EligibleCustomer, draft: &str) -> Vec<String> {
    vec![
        customer.email.clone(),
        customer.first_name.clone(),
        customer.order_count.to_string(),
        format!("${:.2}", customer.total_spent),
        customer.latest_product.clone(),
        customer.days_since_order.to_string(),
        draft.replace('\n', " | "),
    ]
}

/// One ready-to-send block for the text artifact.
pub fn draft_block(customer: &EligibleCustomer, draft: &str) -> String {
    format!(
        "To: {}\nCustomer: {} ({} orders, ${:.2})\n{}\n{}\n{}\n\n",
        customer.email,
        customer.name,
        customer.order_count,
        customer.total_spent,
        "-".repeat(60),
        draft,
        "=".repeat(60),
    )
}
