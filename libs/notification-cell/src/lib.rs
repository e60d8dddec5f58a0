pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::notification_routes;
pub use services::outbox::OutboxService;
pub use services::reminders::build_reminder_schedule;
pub use services::scheduler::ReminderScheduler;
