//! Background tasks feeding and pruning the activity log.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::postgres::PostgresActivityLog;
use crate::domain::ActivityEvent;
use crate::error::ServiceError;

const RETENTION_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Destination for recorded activity.
pub trait ActivitySink {
    /// Durably records one activity.
    fn record(
        &self,
        activity: &ActivityEvent,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

impl ActivitySink for PostgresActivityLog {
    async fn record(&self, activity: &ActivityEvent) -> Result<(), ServiceError> {
        self.save_activity(activity).await.map(|_| ())
    }
}

/// Spawns a task that writes every activity received on `rx` to `sink`
/// until the bus is closed. Write failures are logged and skipped.
pub fn spawn_activity_recorder<S>(
    sink: S,
    mut rx: broadcast::Receiver<ActivityEvent>,
) -> JoinHandle<()>
where
    S: ActivitySink + Send + Sync + 'static,
{
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(activity) => {
                    if let Err(err) = sink.record(&activity).await {
                        tracing::error!(
                            event_id = %activity.event_id(),
                            activity_type = activity.activity_type_str(),
                            error = %err,
                            "failed to record activity"
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "activity recorder lagged; activities dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::info!("activity recorder stopped");
    })
}

/// Spawns a daily task deleting activity older than `retention_days`.
/// Returns `None` when retention is disabled (`0`).
#[must_use]
pub fn spawn_retention_sweeper(
    log: PostgresActivityLog,
    retention_days: u64,
) -> Option<JoinHandle<()>> {
    if retention_days == 0 {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(RETENTION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match log.delete_older_than(retention_days).await {
                Ok(deleted) => tracing::info!(deleted, retention_days, "activity retention sweep"),
                Err(err) => tracing::error!(error = %err, "activity retention sweep failed"),
            }
        }
    }))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ActivityBus, EventId, UserId};
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    struct MemorySink {
        recorded: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl ActivitySink for MemorySink {
        async fn record(&self, activity: &ActivityEvent) -> Result<(), ServiceError> {
            if self.fail {
                return Err(ServiceError::Persistence("database down".to_string()));
            }
            if let Ok(mut recorded) = self.recorded.lock() {
                recorded.push(activity.activity_type_str().to_string());
            }
            Ok(())
        }
    }

    fn activity() -> ActivityEvent {
        ActivityEvent::AttendeeRegistered {
            event_id: EventId::new(),
            user_id: UserId::new(),
            current_attendees: 1,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn records_until_bus_closes() {
        let bus = ActivityBus::new(16);
        let sink = MemorySink::default();
        let handle = spawn_activity_recorder(sink.clone(), bus.subscribe());

        bus.publish(activity());
        bus.publish(activity());
        drop(bus);

        tokio_test::assert_ok!(handle.await);
        let recorded = sink.recorded.lock().map(|r| r.clone()).unwrap_or_default();
        assert_eq!(recorded, vec!["attendee_registered", "attendee_registered"]);
    }

    #[tokio::test]
    async fn sink_failures_do_not_stop_recorder() {
        let bus = ActivityBus::new(16);
        let sink = MemorySink {
            fail: true,
            ..MemorySink::default()
        };
        let handle = spawn_activity_recorder(sink, bus.subscribe());
        bus.publish(activity());
        drop(bus);
        tokio_test::assert_ok!(handle.await);
    }
}
