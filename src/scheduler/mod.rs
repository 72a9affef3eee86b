//! Reminder scheduler.
//!
//! A single background loop wakes up on a [`Trigger`], asks the store for
//! tasks whose reminder date has been reached and posts one message per task.
//! A task is marked reminded only after its message was sent; failed sends
//! stay due and are retried on the next wake-up.

mod trigger;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use reminder_core::models::DueReminder;
use reminder_core::Database;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::notify::Notifier;

pub use trigger::Trigger;

/// Storage operations the scheduler needs. Implemented by [`Database`]; tests
/// substitute an in-memory fake.
pub trait ReminderStore: Send + Sync {
    fn due_reminders(&self, today: NaiveDate) -> reminder_core::Result<Vec<DueReminder>>;
    fn is_pending(&self, task_id: i64) -> reminder_core::Result<bool>;
    fn mark_reminded(&self, task_id: i64) -> reminder_core::Result<bool>;
}

impl ReminderStore for Database {
    fn due_reminders(&self, today: NaiveDate) -> reminder_core::Result<Vec<DueReminder>> {
        Database::due_reminders(self, today)
    }

    fn is_pending(&self, task_id: i64) -> reminder_core::Result<bool> {
        Database::is_pending(self, task_id)
    }

    fn mark_reminded(&self, task_id: i64) -> reminder_core::Result<bool> {
        Database::mark_reminded(self, task_id)
    }
}

/// Counts from one scheduler run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

enum Outcome {
    Sent,
    Failed,
    Skipped,
}

pub struct ReminderScheduler {
    store: Arc<dyn ReminderStore>,
    notifier: Arc<dyn Notifier>,
    send_timeout: Duration,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        notifier: Arc<dyn Notifier>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            send_timeout,
        }
    }

    /// Spawn the background loop.
    pub fn spawn(self: Arc<Self>, trigger: Trigger) -> tokio::task::JoinHandle<()> {
        info!("reminder scheduler started ({trigger})");
        tokio::spawn(async move {
            match trigger {
                Trigger::Interval(period) => {
                    let mut interval = tokio::time::interval(period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        interval.tick().await;
                        self.run_once().await;
                    }
                }
                Trigger::Daily(_) => loop {
                    let delay = trigger.delay_from(Local::now().naive_local());
                    debug!("next reminder run in {}s", delay.as_secs());
                    tokio::time::sleep(delay).await;
                    self.run_once().await;
                },
            }
        })
    }

    /// One pass using today's local date.
    pub async fn run_once(&self) -> RunReport {
        self.run_at(Local::now().date_naive()).await
    }

    /// One pass treating `today` as the current date.
    pub async fn run_at(&self, today: NaiveDate) -> RunReport {
        let due = match self.store.due_reminders(today) {
            Ok(due) => due,
            Err(e) => {
                error!("failed to query due reminders: {e}");
                return RunReport::default();
            }
        };

        let mut report = RunReport {
            due: due.len(),
            ..Default::default()
        };
        for reminder in &due {
            match self.remind(reminder).await {
                Outcome::Sent => report.sent += 1,
                Outcome::Failed => report.failed += 1,
                Outcome::Skipped => report.skipped += 1,
            }
        }

        if report.due > 0 {
            info!(
                %today,
                due = report.due,
                sent = report.sent,
                failed = report.failed,
                skipped = report.skipped,
                "reminder run finished"
            );
        } else {
            debug!(%today, "no reminders due");
        }
        report
    }

    async fn remind(&self, reminder: &DueReminder) -> Outcome {
        let task_id = reminder.task_id;

        // Handlers may have deleted the task since the batch was queried.
        match self.store.is_pending(task_id) {
            Ok(true) => {}
            Ok(false) => {
                debug!(task_id, "task deleted or already reminded, skipping");
                return Outcome::Skipped;
            }
            Err(e) => {
                warn!(task_id, "failed to re-check task before sending: {e}");
                return Outcome::Failed;
            }
        }

        let text = render_reminder(reminder);
        let send = self
            .notifier
            .send(&reminder.channel_id, &reminder.mention, &text);
        match tokio::time::timeout(self.send_timeout, send).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(task_id, channel_id = %reminder.channel_id, "failed to send reminder: {e}");
                return Outcome::Failed;
            }
            Err(_) => {
                warn!(
                    task_id,
                    channel_id = %reminder.channel_id,
                    "sending reminder timed out after {}s",
                    self.send_timeout.as_secs()
                );
                return Outcome::Failed;
            }
        }

        match self.store.mark_reminded(task_id) {
            Ok(true) => Outcome::Sent,
            Ok(false) => {
                debug!(task_id, "task disappeared after its reminder was sent");
                Outcome::Sent
            }
            Err(e) => {
                warn!(
                    task_id,
                    "reminder sent but could not be recorded; it will be sent again: {e}"
                );
                Outcome::Failed
            }
        }
    }
}

/// Message body for a reminder, without the mention prefix.
pub fn render_reminder(reminder: &DueReminder) -> String {
    let mut text = format!(
        "{} ({}, {})",
        reminder.task_name,
        reminder.holding_name,
        reminder.holding_date.format("%Y-%m-%d")
    );
    let description = reminder.description.trim();
    if !description.is_empty() {
        text.push('\n');
        text.push_str(description);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reminder(task_id: i64, channel_id: &str) -> DueReminder {
        DueReminder {
            task_id,
            task_name: format!("task {task_id}"),
            description: String::new(),
            days_before: 3,
            holding_id: 1,
            holding_name: "RustConf 2026".into(),
            holding_date: date(2026, 10, 20),
            channel_id: channel_id.into(),
            mention: "staff".into(),
        }
    }

    /// Tasks keyed by id with their reminded flag; every task is due.
    #[derive(Default)]
    struct FakeStore {
        tasks: Mutex<HashMap<i64, (DueReminder, bool)>>,
        fail_query: bool,
        fail_mark: bool,
    }

    impl FakeStore {
        fn with(reminders: Vec<DueReminder>) -> Self {
            Self {
                tasks: Mutex::new(
                    reminders
                        .into_iter()
                        .map(|r| (r.task_id, (r, false)))
                        .collect(),
                ),
                ..Default::default()
            }
        }

        fn reminded(&self, task_id: i64) -> bool {
            self.tasks.lock().get(&task_id).is_some_and(|(_, r)| *r)
        }
    }

    impl ReminderStore for FakeStore {
        fn due_reminders(&self, _today: NaiveDate) -> reminder_core::Result<Vec<DueReminder>> {
            if self.fail_query {
                return Err(reminder_core::Error::validation("query failed"));
            }
            let mut due: Vec<_> = self
                .tasks
                .lock()
                .values()
                .filter(|(_, reminded)| !reminded)
                .map(|(r, _)| r.clone())
                .collect();
            due.sort_by_key(|r| r.task_id);
            Ok(due)
        }

        fn is_pending(&self, task_id: i64) -> reminder_core::Result<bool> {
            Ok(self.tasks.lock().get(&task_id).is_some_and(|(_, r)| !r))
        }

        fn mark_reminded(&self, task_id: i64) -> reminder_core::Result<bool> {
            if self.fail_mark {
                return Err(reminder_core::Error::validation("write failed"));
            }
            match self.tasks.lock().get_mut(&task_id) {
                Some((_, reminded)) if !*reminded => {
                    *reminded = true;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    /// Records sent messages; fails for channels in `failing`, hangs for `hanging`.
    #[derive(Default)]
    struct FakeNotifier {
        sent: Mutex<Vec<(String, String, String)>>,
        failing: HashSet<String>,
        hanging: HashSet<String>,
        delete_on_send: Option<(Arc<FakeStore>, i64)>,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn send(&self, channel_id: &str, mention: &str, text: &str) -> Result<(), UpstreamError> {
            if self.hanging.contains(channel_id) {
                std::future::pending::<()>().await;
            }
            if self.failing.contains(channel_id) {
                return Err(UpstreamError::Status {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            if let Some((store, task_id)) = &self.delete_on_send {
                store.tasks.lock().remove(task_id);
            }
            self.sent
                .lock()
                .push((channel_id.into(), mention.into(), text.into()));
            Ok(())
        }
    }

    fn scheduler(store: Arc<FakeStore>, notifier: Arc<FakeNotifier>) -> ReminderScheduler {
        ReminderScheduler::new(store, notifier, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn sends_and_marks_every_due_task() {
        let store = Arc::new(FakeStore::with(vec![reminder(1, "a"), reminder(2, "b")]));
        let notifier = Arc::new(FakeNotifier::default());

        let report = scheduler(store.clone(), notifier.clone())
            .run_at(date(2026, 10, 17))
            .await;

        assert_eq!(report, RunReport { due: 2, sent: 2, failed: 0, skipped: 0 });
        assert!(store.reminded(1) && store.reminded(2));
        let sent = notifier.sent.lock();
        assert_eq!(sent[0], ("a".into(), "staff".into(), "task 1 (RustConf 2026, 2026-10-20)".into()));
    }

    #[tokio::test]
    async fn a_failed_send_does_not_abort_the_batch() {
        let store = Arc::new(FakeStore::with(vec![
            reminder(1, "a"),
            reminder(2, "broken"),
            reminder(3, "c"),
        ]));
        let notifier = Arc::new(FakeNotifier {
            failing: HashSet::from(["broken".to_string()]),
            ..Default::default()
        });
        let scheduler = scheduler(store.clone(), notifier.clone());

        let report = scheduler.run_at(date(2026, 10, 17)).await;

        assert_eq!(report, RunReport { due: 3, sent: 2, failed: 1, skipped: 0 });
        assert!(store.reminded(1));
        assert!(!store.reminded(2));
        assert!(store.reminded(3));

        // retried on the next run, and only the failed one
        let report = scheduler.run_at(date(2026, 10, 18)).await;
        assert_eq!(report, RunReport { due: 1, sent: 0, failed: 1, skipped: 0 });
        assert_eq!(notifier.sent.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn a_stalled_send_times_out_and_stays_due() {
        let store = Arc::new(FakeStore::with(vec![reminder(1, "stuck"), reminder(2, "b")]));
        let notifier = Arc::new(FakeNotifier {
            hanging: HashSet::from(["stuck".to_string()]),
            ..Default::default()
        });

        let report = scheduler(store.clone(), notifier).run_at(date(2026, 10, 17)).await;

        assert_eq!(report, RunReport { due: 2, sent: 1, failed: 1, skipped: 0 });
        assert!(!store.reminded(1));
        assert!(store.reminded(2));
    }

    #[tokio::test]
    async fn deleted_tasks_are_skipped_without_sending() {
        let store = Arc::new(FakeStore::with(vec![reminder(1, "a")]));
        let notifier = Arc::new(FakeNotifier::default());
        let scheduler = scheduler(store.clone(), notifier.clone());
        let due = store.due_reminders(date(2026, 10, 17)).unwrap();
        store.tasks.lock().remove(&1);

        assert!(matches!(scheduler.remind(&due[0]).await, Outcome::Skipped));
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn a_task_deleted_during_send_counts_as_handled() {
        let store = Arc::new(FakeStore::with(vec![reminder(1, "a")]));
        let notifier = Arc::new(FakeNotifier {
            delete_on_send: Some((store.clone(), 1)),
            ..Default::default()
        });

        let report = scheduler(store.clone(), notifier.clone()).run_at(date(2026, 10, 17)).await;

        assert_eq!(report, RunReport { due: 1, sent: 1, failed: 0, skipped: 0 });
        assert_eq!(notifier.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn a_failed_state_write_leaves_the_task_due() {
        let store = Arc::new(FakeStore {
            fail_mark: true,
            ..FakeStore::with(vec![reminder(1, "a")])
        });
        let notifier = Arc::new(FakeNotifier::default());

        let report = scheduler(store.clone(), notifier.clone()).run_at(date(2026, 10, 17)).await;

        assert_eq!(report, RunReport { due: 1, sent: 0, failed: 1, skipped: 0 });
        assert!(!store.reminded(1));
        assert_eq!(notifier.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn a_query_failure_ends_the_run_quietly() {
        let store = Arc::new(FakeStore {
            fail_query: true,
            ..FakeStore::with(vec![reminder(1, "a")])
        });
        let notifier = Arc::new(FakeNotifier::default());

        let report = scheduler(store, notifier.clone()).run_at(date(2026, 10, 17)).await;

        assert_eq!(report, RunReport::default());
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_loop_runs_immediately_and_then_every_period() {
        let store = Arc::new(FakeStore::with(vec![reminder(1, "a")]));
        let notifier = Arc::new(FakeNotifier::default());
        let scheduler = Arc::new(scheduler(store.clone(), notifier.clone()));

        let handle = scheduler.spawn(Trigger::Interval(Duration::from_secs(60)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(store.reminded(1));

        store.tasks.lock().insert(2, (reminder(2, "b"), false));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(store.reminded(2));
        assert_eq!(notifier.sent.lock().len(), 2);

        handle.abort();
    }

    #[test]
    fn renders_description_on_its_own_line() {
        let mut r = reminder(1, "a");
        r.description = "  Ask about catering  ".into();
        assert_eq!(
            render_reminder(&r),
            "task 1 (RustConf 2026, 2026-10-20)\nAsk about catering"
        );
    }
}
