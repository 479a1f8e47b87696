//! Persistence queue and its background worker.
//!
//! The queue is the only mutable structure shared between tool handlers and
//! the worker. Producers use `try_send` on a bounded mpsc channel, so an
//! enqueue costs an allocation and a channel push, never a wait on storage.
//! The single consumer preserves FIFO order across `append_log` calls.
//!
//! Overflow policy: the incoming event is dropped with a warning. Voice
//! interaction latency must never depend on storage throughput, so the
//! producer is never blocked, and at-most-once persistence is accepted.

use std::sync::Arc;

use metrics::counter;
use spotter_core::events::{BaseEvent, SessionEvent};
use spotter_core::ids::SessionId;
use spotter_core::log_event::LogEvent;
use spotter_tools::EventSink;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::emitter::EventEmitter;
use crate::storage::LogStore;

/// Producer half of the session's log pipeline.
pub struct PersistenceQueue {
    tx: mpsc::Sender<LogEvent>,
    session_id: SessionId,
    emitter: Arc<EventEmitter>,
}

impl PersistenceQueue {
    /// Create the queue, returning the consumer half for [`spawn_worker`].
    #[must_use]
    pub fn bounded(
        capacity: usize,
        session_id: SessionId,
        emitter: Arc<EventEmitter>,
    ) -> (Arc<Self>, mpsc::Receiver<LogEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Arc::new(Self {
                tx,
                session_id,
                emitter,
            }),
            rx,
        )
    }

    /// Hand an event to the worker. Never blocks, never fails observably.
    ///
    /// Acknowledgment is immediate and independent of the eventual
    /// persistence outcome.
    pub fn enqueue(&self, event: LogEvent) {
        let entity = event.entity;
        match self.tx.try_send(event) {
            Ok(()) => {
                counter!("log_events_enqueued_total", "entity" => entity.as_str()).increment(1);
                let _ = self.emitter.emit(SessionEvent::LogEnqueued {
                    base: BaseEvent::now(self.session_id.as_str()),
                    entity,
                });
            }
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(
                    session_id = %self.session_id,
                    entity = entity.as_str(),
                    summary = %dropped.summary(),
                    "persistence queue full; dropping event"
                );
                counter!("log_events_dropped_total", "reason" => "queue_full").increment(1);
                let _ = self.emitter.emit(SessionEvent::LogDropped {
                    base: BaseEvent::now(self.session_id.as_str()),
                    entity,
                });
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                // Worker already stopped; the session is draining.
                warn!(
                    session_id = %self.session_id,
                    entity = entity.as_str(),
                    summary = %dropped.summary(),
                    "persistence worker stopped; dropping event"
                );
                counter!("log_events_dropped_total", "reason" => "worker_stopped").increment(1);
                let _ = self.emitter.emit(SessionEvent::LogDropped {
                    base: BaseEvent::now(self.session_id.as_str()),
                    entity,
                });
            }
        }
    }
}

impl EventSink for PersistenceQueue {
    fn enqueue(&self, event: LogEvent) {
        PersistenceQueue::enqueue(self, event);
    }
}

/// Spawn the session's single persistence worker.
///
/// The loop suspends on the queue, issues one durable write per event, and
/// keeps going on write failure (the event is logged and discarded; the
/// queue never stalls). On cancellation it stops taking new events,
/// finishes at most the write already in flight, and exits.
pub fn spawn_worker(
    mut rx: mpsc::Receiver<LogEvent>,
    store: Arc<dyn LogStore>,
    session_id: SessionId,
    cancel: CancellationToken,
    emitter: Arc<EventEmitter>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(session_id = %session_id, "persistence worker started");
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(session_id = %session_id, "persistence worker stopping");
                    break;
                }
                maybe = rx.recv() => {
                    let Some(event) = maybe else { break };
                    match store.append_log(&session_id, &event).await {
                        Ok(()) => {
                            counter!("log_events_persisted_total", "entity" => event.entity.as_str())
                                .increment(1);
                        }
                        Err(e) => {
                            // At-most-once: no retry, no stall, no crash.
                            warn!(
                                session_id = %session_id,
                                entity = event.entity.as_str(),
                                summary = %event.summary(),
                                error = %e,
                                "durable write failed; event discarded"
                            );
                            counter!("log_events_write_failed_total").increment(1);
                            let _ = emitter.emit(SessionEvent::LogWriteFailed {
                                base: BaseEvent::now(session_id.as_str()),
                                entity: event.entity,
                            });
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testutil::RecordingLogStore;

    fn queue(capacity: usize) -> (Arc<PersistenceQueue>, mpsc::Receiver<LogEvent>) {
        PersistenceQueue::bounded(
            capacity,
            SessionId::new("sess-1"),
            Arc::new(EventEmitter::new()),
        )
    }

    async fn wait_for_count(store: &RecordingLogStore, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while store.append_count() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("worker did not reach expected append count");
    }

    // --- Enqueue ---

    #[tokio::test]
    async fn enqueue_returns_before_any_write_is_observed() {
        let (q, rx) = queue(16);
        let store = Arc::new(RecordingLogStore::gated());

        // The store's gate is closed: appends cannot complete.
        let worker = spawn_worker(
            rx,
            Arc::clone(&store) as Arc<dyn LogStore>,
            SessionId::new("sess-1"),
            CancellationToken::new(),
            Arc::new(EventEmitter::new()),
        );

        q.enqueue(LogEvent::exercise_set("bench press", 8, 80.0, None));
        // Acknowledged, but nothing durable yet.
        assert_eq!(store.append_count(), 0);

        store.open_gate();
        wait_for_count(&store, 1).await;
        worker.abort();
    }

    #[tokio::test]
    async fn enqueue_never_blocks_when_full() {
        let (q, _rx) = queue(2);
        // No worker draining; the third enqueue must still return.
        q.enqueue(LogEvent::note("one"));
        q.enqueue(LogEvent::note("two"));
        q.enqueue(LogEvent::note("three"));
    }

    #[tokio::test]
    async fn overflow_drops_the_incoming_event() {
        let (q, mut rx) = queue(1);
        q.enqueue(LogEvent::note("kept"));
        q.enqueue(LogEvent::note("dropped"));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.fields["text"], "kept");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn overflow_emits_log_dropped() {
        let emitter = Arc::new(EventEmitter::new());
        let (q, _rx) =
            PersistenceQueue::bounded(1, SessionId::new("sess-1"), Arc::clone(&emitter));
        let mut events = emitter.subscribe();

        q.enqueue(LogEvent::note("kept"));
        q.enqueue(LogEvent::note("dropped"));

        assert_eq!(events.try_recv().unwrap().event_type(), "log_enqueued");
        assert_eq!(events.try_recv().unwrap().event_type(), "log_dropped");
    }

    // --- Worker ---

    #[tokio::test]
    async fn events_reach_the_store_in_fifo_order() {
        let (q, rx) = queue(64);
        let store = Arc::new(RecordingLogStore::new());
        let worker = spawn_worker(
            rx,
            Arc::clone(&store) as Arc<dyn LogStore>,
            SessionId::new("sess-1"),
            CancellationToken::new(),
            Arc::new(EventEmitter::new()),
        );

        for i in 0..50 {
            q.enqueue(LogEvent::note(&format!("event-{i}")));
        }
        wait_for_count(&store, 50).await;

        let texts: Vec<String> = store
            .events()
            .iter()
            .map(|e| e.fields["text"].as_str().unwrap().to_string())
            .collect();
        let expected: Vec<String> = (0..50).map(|i| format!("event-{i}")).collect();
        assert_eq!(texts, expected);
        worker.abort();
    }

    #[tokio::test]
    async fn write_failure_does_not_stall_the_next_event() {
        let (q, rx) = queue(16);
        // Event index 1 (0-based) fails; the rest persist.
        let store = Arc::new(RecordingLogStore::failing_at(1));
        let emitter = Arc::new(EventEmitter::new());
        let mut events = emitter.subscribe();
        let worker = spawn_worker(
            rx,
            Arc::clone(&store) as Arc<dyn LogStore>,
            SessionId::new("sess-1"),
            CancellationToken::new(),
            Arc::clone(&emitter),
        );

        q.enqueue(LogEvent::note("a"));
        q.enqueue(LogEvent::note("b")); // fails
        q.enqueue(LogEvent::note("c"));
        wait_for_count(&store, 2).await;

        let texts: Vec<String> = store
            .events()
            .iter()
            .map(|e| e.fields["text"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["a", "c"]);

        // The failure surfaced as a background event, nothing else.
        let mut saw_failure = false;
        while let Ok(ev) = events.try_recv() {
            if ev.event_type() == "log_write_failed" {
                saw_failure = true;
            }
        }
        assert!(saw_failure);
        worker.abort();
    }

    #[tokio::test]
    async fn cancellation_stops_the_worker_without_draining_the_backlog() {
        let (q, rx) = queue(64);
        let store = Arc::new(RecordingLogStore::gated());
        let cancel = CancellationToken::new();
        let worker = spawn_worker(
            rx,
            Arc::clone(&store) as Arc<dyn LogStore>,
            SessionId::new("sess-1"),
            cancel.clone(),
            Arc::new(EventEmitter::new()),
        );

        for i in 0..10 {
            q.enqueue(LogEvent::note(&format!("event-{i}")));
        }
        // Let the worker pick up the first event, then signal stop and
        // release the gate: the in-flight write finishes, the rest don't.
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        store.open_gate();

        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .expect("worker did not stop after cancellation")
            .unwrap();
        assert!(store.append_count() <= 1);
    }

    #[tokio::test]
    async fn closed_channel_ends_the_worker() {
        let (q, rx) = queue(4);
        let store = Arc::new(RecordingLogStore::new());
        let worker = spawn_worker(
            rx,
            Arc::clone(&store) as Arc<dyn LogStore>,
            SessionId::new("sess-1"),
            CancellationToken::new(),
            Arc::new(EventEmitter::new()),
        );

        q.enqueue(LogEvent::note("last"));
        drop(q);

        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .expect("worker did not stop after channel close")
            .unwrap();
        assert_eq!(store.append_count(), 1);
    }
}
