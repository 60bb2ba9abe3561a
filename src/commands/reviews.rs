use std::path::PathBuf;

use chrono::{Local, NaiveDate, Utc};
use clap::Args;

use crate::engine::{report, reviews};
use crate::error::AppError;
use crate::ingest::orders;
use crate::ledger::Ledger;
use crate::AppContext;

/// Generate review-request drafts from an order export.
#[derive(Debug, Args)]
pub struct ReviewsArgs {
    /// Order export CSV. Defaults to `<data_dir>/orders.csv`.
    #[arg(long)]
    pub orders: Option<PathBuf>,

    /// Run date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn execute(ctx: &AppContext, args: &ReviewsArgs) -> Result<(), AppError> {
    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let now = Utc::now();
    let path = args
        .orders
        .clone()
        .unwrap_or_else(|| ctx.data_dir.join("orders.csv"));

    let import = orders::load_orders(&path)?;
    let customers = reviews::group_customers(&import.orders);
    let ledger = ctx.ledger();
    let selection = reviews::select_eligible(
        &customers,
        today,
        now,
        &ctx.config.reviews,
        ledger.as_ref(),
    )?;

    tracing::info!(
        customers = customers.len(),
        repeat = selection.repeat_customers,
        eligible = selection.eligible.len(),
        "Eligibility pass complete"
    );

    let mut summary = report::RunSummary::new("review requests");
    summary.records_read = import.stats.rows_read;
    summary.dropped_malformed = import.stats.rows_dropped;
    summary.insufficient_data = selection.missing_date;
    summary.eligible = selection.eligible.len();

    if selection.eligible.is_empty() {
        println!("No eligible customers today.\n\n{}", summary.render());
        return Ok(());
    }

    let mut rows = Vec::new();
    let mut blocks = format!(
        "Review Request Email Drafts - {}\n{}\n\n",
        today.format("%Y-%m-%d"),
        "=".repeat(60)
    );
    for customer in &selection.eligible {
        let draft = reviews::build_draft(customer, &ctx.config.reviews);
        rows.push(reviews::csv_row(customer, &draft));
        blocks.push_str(&reviews::draft_block(customer, &draft));
    }

    summary.artifacts.push(report::append_csv(
        &ctx.output_dir,
        today,
        "review_requests",
        reviews::CSV_HEADER,
        &rows,
    )?);
    summary
        .artifacts
        .push(report::append_text(&ctx.output_dir, today, "email_drafts", &blocks)?);

    // Drafts are on disk; record the contacts so the cool-down window
    // holds on the next run.
    if !ctx.dry_run {
        for customer in &selection.eligible {
            ledger.record(&customer.email, now)?;
        }
    }

    println!("{}", summary.render());
    Ok(())
}
