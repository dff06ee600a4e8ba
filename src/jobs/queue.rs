//! Background lookup queue.
//!
//! [`LookupQueue`] accepts content-created notifications and runs each lookup
//! in its own Tokio task after the configured reply delay. A lookup that hits
//! the rate limit on its first attempt is scheduled once more after the
//! retry delay; a second denial drops it.
//!
//! # Example
//!
//! ```rust,ignore
//! let queue = LookupQueue::new(lookup_service);
//! queue.submit(ContentRef::topic(42u64)).await?;
//! ```

use std::sync::Arc;

use anyhow::Result;
use mediabot_common::ContentRef;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use super::lookup::{LookupOutcome, LookupService};

/// Channel capacity for the lookup job queue.
const QUEUE_CAPACITY: usize = 256;

/// Capacity of the outcome broadcast channel.
const EVENT_CAPACITY: usize = 64;

/// Attempts made before a rate-limited lookup is dropped.
pub const MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LookupJob {
    content: ContentRef,
    attempt: u32,
    delay: Duration,
}

/// Emitted when a lookup attempt finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LookupEvent {
    pub content: ContentRef,
    pub attempt: u32,
    pub outcome: LookupOutcome,
}

/// Handle to the background lookup queue.
///
/// The dispatcher task runs until every handle is dropped.
#[derive(Clone)]
pub struct LookupQueue {
    sender: mpsc::Sender<LookupJob>,
    events: broadcast::Sender<LookupEvent>,
    service: Arc<LookupService>,
}

impl LookupQueue {
    /// Create the queue and spawn its dispatcher.
    pub fn new(service: Arc<LookupService>) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        tokio::spawn(dispatch(
            receiver,
            sender.downgrade(),
            service.clone(),
            events.clone(),
        ));

        Self {
            sender,
            events,
            service,
        }
    }

    /// Schedule a lookup for newly created content.
    ///
    /// Returns an error if the dispatcher has stopped.
    pub async fn submit(&self, content: ContentRef) -> Result<()> {
        let delay = self.service.settings().read().bot.reply_delay();
        info!(
            content = %content,
            delay_secs = delay.as_secs(),
            "Submitting lookup job to queue"
        );

        self.sender
            .send(LookupJob {
                content,
                attempt: 1,
                delay,
            })
            .await
            .map_err(|_| anyhow::anyhow!("Lookup queue is closed"))
    }

    /// Receive an event for every finished attempt.
    pub fn subscribe(&self) -> broadcast::Receiver<LookupEvent> {
        self.events.subscribe()
    }
}

/// Drain the job channel, spawning one task per job.
async fn dispatch(
    mut receiver: mpsc::Receiver<LookupJob>,
    retry_sender: mpsc::WeakSender<LookupJob>,
    service: Arc<LookupService>,
    events: broadcast::Sender<LookupEvent>,
) {
    info!("Lookup queue worker started");

    while let Some(job) = receiver.recv().await {
        let service = service.clone();
        let events = events.clone();
        let retry_sender = retry_sender.clone();

        tokio::spawn(async move {
            if !job.delay.is_zero() {
                sleep(job.delay).await;
            }

            let outcome = service.process(job.content, job.attempt).await;
            let _ = events.send(LookupEvent {
                content: job.content,
                attempt: job.attempt,
                outcome,
            });

            if let LookupOutcome::RateLimited { .. } = outcome {
                reschedule(job, &service, retry_sender).await;
            }
        });
    }

    info!("Lookup queue worker stopped (channel closed)");
}

async fn reschedule(
    job: LookupJob,
    service: &LookupService,
    retry_sender: mpsc::WeakSender<LookupJob>,
) {
    if job.attempt >= MAX_ATTEMPTS {
        warn!(
            content = %job.content,
            attempt = job.attempt,
            "Rate limited again, dropping lookup"
        );
        return;
    }

    let delay = service.settings().read().bot.retry_delay();
    let retry = LookupJob {
        content: job.content,
        attempt: job.attempt + 1,
        delay,
    };

    info!(
        content = %job.content,
        delay_secs = delay.as_secs(),
        "Rate limited, rescheduling lookup"
    );

    match retry_sender.upgrade() {
        Some(sender) => {
            if sender.send(retry).await.is_err() {
                warn!(content = %job.content, "Lookup queue closed, retry dropped");
            }
        }
        None => warn!(content = %job.content, "Lookup queue closed, retry dropped"),
    }
}
