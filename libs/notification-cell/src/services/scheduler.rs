use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{BookingNotice, ScheduledReminder};
use crate::services::outbox::OutboxService;
use crate::services::reminders::build_reminder_schedule;

const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 30;

/// Explicit reminder queue plus the worker that drains it. Bookings hand
/// their notices over; the worker dispatches whatever has come due on each
/// tick. Reminders already past due at enqueue time go out on the next tick.
pub struct ReminderScheduler {
    outbox: OutboxService,
    queue: Mutex<Vec<ScheduledReminder>>,
    is_shutdown: RwLock<bool>,
    poll_interval: Duration,
}

impl ReminderScheduler {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            outbox: OutboxService::new(config),
            queue: Mutex::new(Vec::new()),
            is_shutdown: RwLock::new(false),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS),
        }
    }

    pub fn with_outbox(outbox: OutboxService) -> Self {
        Self {
            outbox,
            queue: Mutex::new(Vec::new()),
            is_shutdown: RwLock::new(false),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS),
        }
    }

    /// Queue the three reminder waves for a confirmed booking.
    pub async fn schedule_booking(&self, notice: &BookingNotice) {
        let reminders = build_reminder_schedule(notice);
        debug!(
            "Queueing {} reminders for appointment {}",
            reminders.len(),
            notice.appointment_id
        );
        self.enqueue(reminders).await;
    }

    pub async fn enqueue(&self, reminders: Vec<ScheduledReminder>) {
        self.queue.lock().await.extend(reminders);
    }

    /// Snapshot of everything still waiting to fire.
    pub async fn pending(&self) -> Vec<ScheduledReminder> {
        self.queue.lock().await.clone()
    }

    pub async fn shutdown(&self) {
        info!("Shutting down reminder scheduler");
        *self.is_shutdown.write().await = true;
    }

    /// Worker loop. Runs until shutdown, dispatching due reminders once per
    /// poll interval.
    pub async fn run(self: Arc<Self>) {
        info!(
            "Reminder scheduler started (poll interval {}s)",
            self.poll_interval.as_secs()
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            interval.tick().await;

            if *self.is_shutdown.read().await {
                break;
            }

            self.dispatch_due(Utc::now()).await;
        }

        info!("Reminder scheduler stopped");
    }

    /// Deliver every reminder due at or before `now`. Failed deliveries go
    /// back on the queue for the next tick.
    pub async fn dispatch_due(&self, now: DateTime<Utc>) -> usize {
        let due: Vec<ScheduledReminder> = {
            let mut queue = self.queue.lock().await;
            let (due, waiting): (Vec<_>, Vec<_>) =
                queue.drain(..).partition(|reminder| reminder.due_at <= now);
            *queue = waiting;
            due
        };

        if due.is_empty() {
            return 0;
        }

        let mut dispatched = 0;
        for reminder in due {
            match self.outbox.deliver(&reminder.message).await {
                Ok(_) => dispatched += 1,
                Err(e) => {
                    warn!(
                        "Failed to dispatch reminder for appointment {}: {}",
                        reminder.appointment_id, e
                    );
                    self.queue.lock().await.push(reminder);
                }
            }
        }

        if dispatched > 0 {
            debug!("Dispatched {} due reminders", dispatched);
        }
        dispatched
    }
}
