pub mod briefing;
pub mod channel;
pub mod intent;
pub mod meals;
pub mod ppc;
pub mod reminders;
pub mod report;
pub mod reviews;
pub mod template;
