pub mod ask;
pub mod briefing;
pub mod ppc;
pub mod reminders;
pub mod reviews;
