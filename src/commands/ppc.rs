use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Args;

use crate::engine::{ppc, report};
use crate::error::AppError;
use crate::ingest::campaigns;
use crate::AppContext;

/// Analyze a campaign performance export and recommend bid actions.
#[derive(Debug, Args)]
pub struct PpcArgs {
    /// Campaign export CSV. Defaults to `<data_dir>/campaigns.csv`.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Run date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// How many recommended actions to print.
    #[arg(long, default_value_t = 15)]
    pub top: usize,

    /// Print the full analysis as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,
}

pub fn execute(ctx: &AppContext, args: &PpcArgs) -> Result<(), AppError> {
    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let path = args
        .input
        .clone()
        .unwrap_or_else(|| ctx.data_dir.join("campaigns.csv"));

    let import = campaigns::load_campaigns(&path)?;
    let results = ppc::analyze_all(&import.campaigns, &ctx.config.ppc);

    let mut summary = report::RunSummary::new("ppc analysis");
    summary.records_read = import.stats.rows_read;
    summary.dropped_malformed = import.stats.rows_dropped;
    summary.insufficient_data = results.iter().filter(|r| !r.judged).count();

    let actions: Vec<&ppc::Analysis> =
        results.iter().filter(|r| r.action.actionable()).collect();
    summary.eligible = actions.len();

    if results.is_empty() {
        println!("No campaigns to analyze.\n\n{}", summary.render());
        return Ok(());
    }

    let summary_rows: Vec<Vec<String>> = results.iter().map(ppc::summary_row).collect();
    summary.artifacts.push(report::append_csv(
        &ctx.output_dir,
        today,
        "summary",
        ppc::SUMMARY_HEADER,
        &summary_rows,
    )?);

    let action_rows: Vec<Vec<String>> =
        actions.iter().map(|r| ppc::actions_row(r)).collect();
    summary.artifacts.push(report::append_csv(
        &ctx.output_dir,
        today,
        "actions",
        ppc::ACTIONS_HEADER,
        &action_rows,
    )?);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let (spend, sales, acos) = ppc::totals(&results);
    println!("PPC Analysis - {}", today.format("%Y-%m-%d"));
    println!("Campaigns analyzed: {}", results.len());
    println!("Actions needed:     {}", actions.len());
    println!("Total spend: ${spend:.2}");
    println!("Total sales: ${sales:.2}");
    match acos {
        Some(a) => println!("Overall ACOS: {:.1}%", a * 100.0),
        None => println!("Overall ACOS: n/a (no attributed sales)"),
    }

    if actions.is_empty() {
        println!("\nAll campaigns performing within target ACOS.");
    } else {
        println!("\nRecommended actions (by priority):");
        for action in actions.iter().take(args.top) {
            println!("\n  [{}] {}", action.priority.as_str(), action.action.as_str());
            println!("  Campaign: {}", action.campaign);
            println!("  {}", action.reason);
        }
        if actions.len() > args.top {
            println!("\n  ... and {} more actions", actions.len() - args.top);
        }
    }

    println!("\n{}", summary.render());
    Ok(())
}
