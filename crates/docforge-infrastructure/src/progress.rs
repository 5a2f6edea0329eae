//! Progress Bus (C10) — `dashmap`-backed per-job broadcast registry. One of
//! the three process-wide shared mutable structures permitted by the design
//! (§9 "Global mutable state").

use dashmap::DashMap;
use tokio::sync::broadcast;

use docforge_domain::ports::{ProgressEvent, ProgressPublisher};
use docforge_domain::value_objects::JobId;

const CHANNEL_CAPACITY: usize = 256;

/// Registry of per-job broadcast channels. Subscribing late only yields
/// future events — broadcast semantics satisfy "best-effort, at-least-once
/// within the lifetime of a subscription" (§4.10).
#[derive(Default)]
pub struct ProgressBus {
    channels: DashMap<JobId, broadcast::Sender<ProgressEvent>>,
}

impl ProgressBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one job's events, creating its channel if this is the
    /// first subscriber.
    pub fn subscribe(&self, job_id: JobId) -> broadcast::Receiver<ProgressEvent> {
        self.channels.entry(job_id).or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0).subscribe()
    }
}

impl ProgressPublisher for ProgressBus {
    /// Never blocks, never fails on zero subscribers: `send` on a broadcast
    /// channel with no receivers simply returns an error that is discarded.
    fn publish(&self, event: ProgressEvent) {
        if let Some(sender) = self.channels.get(&event.job_id()) {
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docforge_domain::ports::progress::CompletionData;

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let bus = ProgressBus::new();
        bus.publish(ProgressEvent::Completed {
            job_id: JobId::new(),
            data: CompletionData { cancelled: false },
        });
    }

    #[tokio::test]
    async fn subscriber_receives_events_published_after_subscribing() {
        let bus = ProgressBus::new();
        let job_id = JobId::new();
        let mut receiver = bus.subscribe(job_id);

        bus.publish(ProgressEvent::Completed {
            job_id,
            data: CompletionData { cancelled: true },
        });

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.job_id(), job_id);
    }
}
