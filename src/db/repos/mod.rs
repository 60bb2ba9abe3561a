pub mod contacts;
pub mod reminders;
