use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Args;

use crate::db::repos;
use crate::engine::{reminders, report};
use crate::error::AppError;
use crate::ledger::Ledger;
use crate::AppContext;

/// List today's reminders, or check and send the ones due now.
#[derive(Debug, Args)]
pub struct RemindersArgs {
    /// Send reminders that are due now instead of listing the day.
    #[arg(long)]
    pub check: bool,

    /// Run date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Clock override for --check, "HH:MM". Defaults to the current time.
    #[arg(long)]
    pub at: Option<String>,
}

fn resolve_now(args: &RemindersArgs, date: NaiveDate) -> Result<NaiveDateTime, AppError> {
    match &args.at {
        None => Ok(date.and_time(Local::now().time())),
        Some(raw) => {
            let time = chrono::NaiveTime::parse_from_str(raw, "%H:%M")
                .map_err(|_| AppError::Validation(format!("invalid --at time '{raw}'")))?;
            Ok(date.and_time(time))
        }
    }
}

pub fn execute(ctx: &AppContext, args: &RemindersArgs) -> Result<(), AppError> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let now = resolve_now(args, date)?;
    let cfg = &ctx.config.household;

    let customs = repos::reminders::pending_for_day(&ctx.pool, &date.format("%Y-%m-%d").to_string())?;
    let plan = reminders::plan_for_day(cfg, &customs, date);

    if !args.check {
        let upcoming = reminders::upcoming(&plan, now, 24);
        println!("Reminders for {}:\n", date.format("%A, %B %d"));
        if upcoming.is_empty() {
            println!("No upcoming reminders.");
        } else {
            for instance in upcoming {
                println!("{}", reminders::format_line(instance));
            }
        }
        return Ok(());
    }

    let ledger = ctx.ledger();
    let due = reminders::due(&plan, now, cfg, ledger.as_ref(), date)?;

    let mut summary = report::RunSummary::new("reminders");
    summary.records_read = plan.len();
    summary.eligible = due.len();

    if due.is_empty() {
        println!("No reminders due at this time.\n\n{}", summary.render());
        return Ok(());
    }

    // No contacts configured still means the reminder is shown somewhere.
    let recipients: Vec<String> = if cfg.contacts.is_empty() {
        vec!["console".to_string()]
    } else {
        cfg.contacts
            .iter()
            .map(super::briefing::contact_address)
            .collect()
    };
    let channel = ctx.channel()?;

    for instance in &due {
        let outputs: Vec<report::Outgoing> = recipients
            .iter()
            .map(|r| report::Outgoing { target: r.clone(), text: instance.message.clone() })
            .collect();
        let outcomes = report::emit_messages(&outputs, channel.as_ref());
        let any_delivered = outcomes.iter().any(|o| o.delivered());
        summary.absorb_deliveries(&outcomes);

        // The ledger is the only dedup guard: mark the instance once at
        // least one recipient got it, so a re-run cannot double-send.
        if any_delivered && !ctx.dry_run {
            ledger.record(&reminders::reminder_key(instance, date), chrono::Utc::now())?;
            if instance.kind == reminders::ReminderKind::Custom {
                repos::reminders::mark_delivered(&ctx.pool, &instance.name)?;
            }
        }
    }

    println!("{}", summary.render());
    Ok(())
}
