use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::Args;

use crate::config::weekday_from_name;
use crate::engine::{briefing, report};
use crate::error::AppError;
use crate::AppContext;

/// Generate (and optionally send) the morning briefing.
#[derive(Debug, Args)]
pub struct BriefingArgs {
    /// Briefing date (YYYY-MM-DD). Defaults to today.
    #[arg(long, conflicts_with = "day")]
    pub date: Option<NaiveDate>,

    /// Render the next occurrence of a weekday instead ("monday").
    #[arg(long)]
    pub day: Option<String>,

    /// Send to the configured contacts instead of printing only.
    #[arg(long)]
    pub send: bool,
}

/// Deliverable address for a contact: the number, or the name when no
/// number is on file yet.
pub(crate) fn contact_address(contact: &crate::config::Contact) -> String {
    if contact.number.is_empty() {
        contact.name.clone()
    } else {
        contact.number.clone()
    }
}

/// Next occurrence of the named weekday, counting today as a match.
fn next_occurrence(from: NaiveDate, day: &str) -> Result<NaiveDate, AppError> {
    let target = weekday_from_name(day)
        .ok_or_else(|| AppError::Validation(format!("unknown weekday '{day}'")))?;
    let ahead = (target.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    Ok(from + Duration::days(ahead))
}

pub fn execute(ctx: &AppContext, args: &BriefingArgs) -> Result<(), AppError> {
    let today = Local::now().date_naive();
    let date = match (&args.date, &args.day) {
        (Some(date), _) => *date,
        (None, Some(day)) => next_occurrence(today, day)?,
        (None, None) => today,
    };

    let text = briefing::generate(&ctx.config.household, date);

    if !args.send {
        println!("{text}");
        return Ok(());
    }

    let contacts = &ctx.config.household.contacts;
    if contacts.is_empty() {
        return Err(AppError::Config(
            "no household.contacts configured to send the briefing to".into(),
        ));
    }

    let outputs: Vec<report::Outgoing> = contacts
        .iter()
        .map(|c| report::Outgoing { target: contact_address(c), text: text.clone() })
        .collect();
    let channel = ctx.channel()?;
    let outcomes = report::emit_messages(&outputs, channel.as_ref());

    let mut summary = report::RunSummary::new("briefing");
    summary.eligible = outputs.len();
    summary.absorb_deliveries(&outcomes);
    println!("{}", summary.render());
    Ok(())
}
