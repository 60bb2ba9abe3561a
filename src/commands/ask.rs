use chrono::{Duration, Local};
use clap::Args;

use crate::db::repos;
use crate::engine::briefing::{day_schedule, fmt_time, summary as briefing_summary};
use crate::engine::intent::{classify, Intent, HELP_TEXT, NOT_UNDERSTOOD};
use crate::engine::{meals, reminders};
use crate::error::AppError;
use crate::AppContext;

/// Run one natural-language command ("briefing", "remind me to ...").
#[derive(Debug, Args)]
pub struct AskArgs {
    /// The command text. Quoting is optional; words are joined.
    #[arg(required = true)]
    pub text: Vec<String>,
}

pub fn execute(ctx: &AppContext, args: &AskArgs) -> Result<(), AppError> {
    let text = args.text.join(" ");
    let now = Local::now().naive_local();
    let cfg = &ctx.config.household;

    let reply = match classify(&text, now, cfg.default_reminder_hour) {
        Intent::Briefing => briefing_summary(cfg, now.date(), 15),
        Intent::Tomorrow => day_schedule(cfg, now.date() + Duration::days(1)),
        Intent::Activities => day_schedule(cfg, now.date()),
        Intent::Meals => match meals::suggest(cfg, now.date()) {
            Some(s) => {
                let mut lines = vec![format!(
                    "Tonight: {} ({} min)",
                    s.meal.name, s.meal.prep_minutes
                )];
                if s.pool == meals::PoolKind::Quick {
                    lines.insert(0, "Busy night - keeping it quick:".to_string());
                }
                if !s.meal.notes.is_empty() {
                    lines.push(format!("Tip: {}", s.meal.notes));
                }
                lines.join("\n")
            }
            None => "No meal ideas configured yet. Add some under [household.meals].".to_string(),
        },
        Intent::RemindAdd { message, fire_at, defaulted } => {
            if ctx.dry_run {
                format!("(dry run) Would set reminder for {}: {message}", fmt_time(fire_at.time()))
            } else {
                let stored = repos::reminders::create_custom(
                    &ctx.pool,
                    &message,
                    &fire_at.format(reminders::FIRE_AT_FORMAT).to_string(),
                )?;
                tracing::info!(id = %stored.id, "custom reminder stored");
                let mut reply =
                    format!("Reminder set for {}: {message}", fmt_time(fire_at.time()));
                if defaulted {
                    reply.push_str(" (no time given, defaulted - say \"at 7pm\" to pick one)");
                }
                reply
            }
        }
        Intent::Help => HELP_TEXT.to_string(),
        Intent::Unknown => NOT_UNDERSTOOD.to_string(),
    };

    println!("{reply}");
    Ok(())
}
