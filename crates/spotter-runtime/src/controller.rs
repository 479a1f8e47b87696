//! Session controller — the state machine that owns one session.
//!
//! Lifecycle is driven by explicit calls, not framework callbacks:
//! `start()` preloads context and brings up the persistence worker,
//! `attach()` marks the transport live, `invoke()` serves capability calls
//! while Active, and `end()`/`on_detach()` drain and close. Closed is
//! terminal and the only state from which the controller may be dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use metrics::gauge;
use parking_lot::Mutex;
use serde_json::Value;
use spotter_core::events::{BaseEvent, SessionEvent};
use spotter_core::ids::{SessionId, UserId};
use spotter_core::session_state::SessionState;
use spotter_delegate::{DelegationClient, ProviderRouting, Reasoner};
use spotter_tools::schema::ToolDefinition;
use spotter_tools::{Advisor, ContextReader, EventSink, Router, ToolContext, ToolOutcome, builtin_tools};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::config::SessionConfig;
use crate::context_cache::ContextCache;
use crate::emitter::EventEmitter;
use crate::errors::SessionError;
use crate::persistence::{PersistenceQueue, spawn_worker};
use crate::storage::{ContextStore, LogStore};

/// Opaque handle the real-time connection layer passes into [`SessionController::attach`].
///
/// The core does not manage connection establishment; it only records which
/// connection a session is serving.
#[derive(Clone, Debug)]
pub struct TransportHandle {
    /// Connection identifier assigned by the transport layer.
    pub connection_id: String,
}

/// Parts that exist once `start()` has succeeded.
struct Serving {
    cache: Arc<ContextCache>,
    queue: Arc<PersistenceQueue>,
    router: Arc<Router>,
    worker: Option<JoinHandle<()>>,
}

/// Top-level orchestrator for one voice-coaching session.
pub struct SessionController {
    session_id: SessionId,
    user_id: UserId,
    config: SessionConfig,
    context_store: Arc<dyn ContextStore>,
    log_store: Arc<dyn LogStore>,
    advisor: Arc<dyn Advisor>,
    emitter: Arc<EventEmitter>,
    /// Cancelled when the session starts draining.
    cancel: CancellationToken,
    state: Mutex<SessionState>,
    serving: Mutex<Option<Serving>>,
    transport: Mutex<Option<TransportHandle>>,
    /// Tool calls currently executing; Draining waits for this to hit zero.
    in_flight: AtomicUsize,
}

impl SessionController {
    /// Create a controller in `Created`. Nothing runs until `start()`.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        user_id: UserId,
        context_store: Arc<dyn ContextStore>,
        log_store: Arc<dyn LogStore>,
        reasoner: Arc<dyn Reasoner>,
        routing: ProviderRouting,
        config: SessionConfig,
    ) -> Self {
        let advisor: Arc<dyn Advisor> = Arc::new(DelegationClient::with_timeout(
            reasoner,
            routing,
            config.delegate_timeout,
        ));
        Self {
            session_id,
            user_id,
            config,
            context_store,
            log_store,
            advisor,
            emitter: Arc::new(EventEmitter::new()),
            cancel: CancellationToken::new(),
            state: Mutex::new(SessionState::Created),
            serving: Mutex::new(None),
            transport: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// The session this controller owns.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The user this session serves.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.emitter.subscribe()
    }

    /// Capability definitions for the LLM tool layer. Empty before `start()`.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.serving
            .lock()
            .as_ref()
            .map(|s| s.router.definitions())
            .unwrap_or_default()
    }

    /// Tool calls currently executing.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Move `state` along one legal edge.
    fn transition(&self, to: SessionState) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if !state.can_transition_to(to) {
            return Err(SessionError::InvalidTransition { from: *state, to });
        }
        *state = to;
        Ok(())
    }

    /// Preload context and bring up the persistence worker.
    ///
    /// On success the session is `Ready`: the worker is running before any
    /// tool call can be served. On load failure the session is `Closed` and
    /// the caller must abort the connection; there is no partial init.
    #[instrument(skip(self), fields(session_id = %self.session_id, user_id = %self.user_id))]
    pub async fn start(&self) -> Result<(), SessionError> {
        self.transition(SessionState::ContextLoading)?;

        let cache = match ContextCache::load(self.context_store.as_ref(), &self.user_id).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                *self.state.lock() = SessionState::Closed;
                error!(error = %e, "context preload failed; session closed");
                let _ = self.emitter.emit(SessionEvent::SessionClosed {
                    base: BaseEvent::now(self.session_id.as_str()),
                    drained_cleanly: true,
                });
                return Err(SessionError::FatalInit(e));
            }
        };

        let (queue, rx) = PersistenceQueue::bounded(
            self.config.queue_capacity,
            self.session_id.clone(),
            Arc::clone(&self.emitter),
        );
        let worker = spawn_worker(
            rx,
            Arc::clone(&self.log_store),
            self.session_id.clone(),
            self.cancel.child_token(),
            Arc::clone(&self.emitter),
        );

        let registry = builtin_tools(
            Arc::clone(&cache) as Arc<dyn ContextReader>,
            Arc::clone(&queue) as Arc<dyn EventSink>,
            Arc::clone(&self.advisor),
        );
        let router = Arc::new(Router::new(registry));

        *self.serving.lock() = Some(Serving {
            cache,
            queue,
            router,
            worker: Some(worker),
        });
        self.transition(SessionState::Ready)?;

        let _ = self.emitter.emit(SessionEvent::ContextLoaded {
            base: BaseEvent::now(self.session_id.as_str()),
            user_id: self.user_id.to_string(),
        });
        info!("session ready");
        Ok(())
    }

    /// The transport attached; begin serving.
    #[instrument(skip(self, handle), fields(session_id = %self.session_id))]
    pub fn attach(&self, handle: TransportHandle) -> Result<(), SessionError> {
        self.transition(SessionState::Active)?;
        info!(connection_id = %handle.connection_id, "transport attached");
        *self.transport.lock() = Some(handle);
        gauge!("sessions_active").increment(1.0);
        let _ = self.emitter.emit(SessionEvent::SessionActive {
            base: BaseEvent::now(self.session_id.as_str()),
        });
        Ok(())
    }

    /// Invoke one capability.
    ///
    /// Only served while Active. Concurrent calls are isolated: a failure
    /// in one never affects in-flight or subsequent calls.
    pub async fn invoke(
        &self,
        capability: &str,
        args: Value,
    ) -> Result<ToolOutcome, SessionError> {
        {
            // Count the call in-flight under the state lock, so Draining
            // either rejects it or waits for it; never neither.
            let state = self.state.lock();
            if !state.can_serve() {
                return Err(SessionError::NotServing(*state));
            }
            let _ = self.in_flight.fetch_add(1, Ordering::SeqCst);
        }

        let router = self.serving.lock().as_ref().map(|s| Arc::clone(&s.router));
        let Some(router) = router else {
            let _ = self.in_flight.fetch_sub(1, Ordering::SeqCst);
            return Err(SessionError::NotServing(self.state()));
        };

        let ctx = ToolContext {
            session_id: self.session_id.clone(),
            cancellation: self.cancel.child_token(),
        };
        let start = Instant::now();
        let result = router.invoke(capability, args, &ctx).await;
        let _ = self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let is_error = match &result {
            Ok(outcome) => outcome.is_error,
            Err(_) => true,
        };
        let _ = self.emitter.emit(SessionEvent::ToolCompleted {
            base: BaseEvent::now(self.session_id.as_str()),
            capability: capability.to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            is_error,
        });

        result.map_err(SessionError::from)
    }

    /// Re-read the context snapshot and swap it in atomically.
    ///
    /// Failure is contained: the previous snapshot keeps serving.
    pub async fn refresh_context(&self) -> Result<(), SessionError> {
        let cache = self.serving.lock().as_ref().map(|s| Arc::clone(&s.cache));
        let Some(cache) = cache else {
            return Err(SessionError::NotServing(self.state()));
        };
        cache
            .refresh(self.context_store.as_ref())
            .await
            .map_err(SessionError::Refresh)
    }

    /// Transport-initiated end: the connection dropped.
    pub async fn on_detach(&self) -> Result<(), SessionError> {
        self.end().await
    }

    /// End the session: stop accepting calls, let in-flight calls finish,
    /// stop the worker, close.
    ///
    /// Never hangs: every wait is bounded by the shutdown grace period, and
    /// a worker that overruns it is abandoned with a warning. Calling `end`
    /// on a session that is already draining or closed is a no-op.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn end(&self) -> Result<(), SessionError> {
        let from = {
            let mut state = self.state.lock();
            match *state {
                SessionState::Closed | SessionState::Draining => return Ok(()),
                SessionState::ContextLoading => {
                    return Err(SessionError::InvalidTransition {
                        from: *state,
                        to: SessionState::Draining,
                    });
                }
                SessionState::Created | SessionState::Ready => {
                    let from = *state;
                    *state = SessionState::Closed;
                    from
                }
                SessionState::Active => {
                    *state = SessionState::Draining;
                    SessionState::Active
                }
            }
        };

        if from == SessionState::Created {
            // Nothing ever ran.
            let _ = self.emitter.emit(SessionEvent::SessionClosed {
                base: BaseEvent::now(self.session_id.as_str()),
                drained_cleanly: true,
            });
            info!("session closed before start");
            return Ok(());
        }

        if from == SessionState::Active {
            gauge!("sessions_active").decrement(1.0);
            // In-flight calls complete; no new ones are accepted. The wait
            // is bounded so a stuck call cannot hang teardown.
            let wait_in_flight = async {
                while self.in_flight.load(Ordering::SeqCst) > 0 {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            };
            if tokio::time::timeout(self.config.shutdown_grace, wait_in_flight)
                .await
                .is_err()
            {
                warn!("in-flight calls still running at grace expiry; proceeding");
            }
        }

        // Cooperative stop: the worker finishes at most the write in flight.
        self.cancel.cancel();
        let worker = self.serving.lock().as_mut().and_then(|s| s.worker.take());
        let drained_cleanly = match worker {
            Some(mut handle) => {
                match tokio::time::timeout(self.config.shutdown_grace, &mut handle).await {
                    Ok(joined) => {
                        if let Err(e) = joined {
                            warn!(error = %e, "persistence worker ended abnormally");
                        }
                        true
                    }
                    Err(_) => {
                        warn!(
                            grace_ms = self.config.shutdown_grace.as_millis() as u64,
                            "worker did not stop within grace; abandoning it"
                        );
                        handle.abort();
                        false
                    }
                }
            }
            None => true,
        };

        *self.state.lock() = SessionState::Closed;
        *self.transport.lock() = None;
        let _ = self.emitter.emit(SessionEvent::SessionClosed {
            base: BaseEvent::now(self.session_id.as_str()),
            drained_cleanly,
        });
        info!(drained_cleanly, "session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spotter_tools::testutil::sample_context;

    use crate::testutil::{MemContextStore, RecordingLogStore, ScriptedReasoner, stores};

    fn controller_with(
        context_store: Arc<MemContextStore>,
        log_store: Arc<RecordingLogStore>,
        reasoner: Arc<ScriptedReasoner>,
    ) -> SessionController {
        SessionController::new(
            SessionId::new("sess-1"),
            UserId::new("user-1"),
            context_store,
            log_store,
            reasoner,
            ProviderRouting::default(),
            SessionConfig::default(),
        )
    }

    fn controller() -> SessionController {
        let (ctx_store, log_store) = stores(sample_context());
        controller_with(ctx_store, log_store, Arc::new(ScriptedReasoner::answering()))
    }

    async fn active_controller() -> SessionController {
        let c = controller();
        c.start().await.unwrap();
        c.attach(TransportHandle {
            connection_id: "conn-1".into(),
        })
        .unwrap();
        c
    }

    // --- Lifecycle ---

    #[tokio::test]
    async fn happy_path_reaches_closed() {
        let c = controller();
        assert_eq!(c.state(), SessionState::Created);

        c.start().await.unwrap();
        assert_eq!(c.state(), SessionState::Ready);

        c.attach(TransportHandle {
            connection_id: "conn-1".into(),
        })
        .unwrap();
        assert_eq!(c.state(), SessionState::Active);

        c.end().await.unwrap();
        assert_eq!(c.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn start_twice_is_an_invalid_transition() {
        let c = controller();
        c.start().await.unwrap();
        let err = c.start().await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn attach_before_start_is_rejected() {
        let c = controller();
        let err = c
            .attach(TransportHandle {
                connection_id: "conn-1".into(),
            })
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn attach_twice_is_rejected() {
        let c = active_controller().await;
        let err = c
            .attach(TransportHandle {
                connection_id: "conn-2".into(),
            })
            .unwrap_err();
        // No transition back into Ready, and no re-attach from Active.
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn fatal_init_closes_the_session() {
        let (_, log_store) = stores(sample_context());
        let c = controller_with(
            Arc::new(MemContextStore::unavailable()),
            log_store,
            Arc::new(ScriptedReasoner::answering()),
        );

        let err = c.start().await.unwrap_err();
        assert!(matches!(err, SessionError::FatalInit(_)));
        assert_eq!(c.state(), SessionState::Closed);

        // The session never reaches Ready and serves nothing afterwards.
        let err = c.invoke("get_meal_plan", json!({})).await.unwrap_err();
        assert!(matches!(err, SessionError::NotServing(SessionState::Closed)));
    }

    #[tokio::test]
    async fn end_before_start_closes_quietly() {
        let c = controller();
        c.end().await.unwrap();
        assert_eq!(c.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn end_from_ready_stops_the_worker() {
        let c = controller();
        c.start().await.unwrap();
        c.end().await.unwrap();
        assert_eq!(c.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn end_is_idempotent() {
        let c = active_controller().await;
        c.end().await.unwrap();
        c.end().await.unwrap();
        assert_eq!(c.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn on_detach_ends_the_session() {
        let c = active_controller().await;
        c.on_detach().await.unwrap();
        assert_eq!(c.state(), SessionState::Closed);
    }

    // --- Serving ---

    #[tokio::test]
    async fn invoke_rejected_outside_active() {
        let c = controller();
        let err = c.invoke("get_meal_plan", json!({})).await.unwrap_err();
        assert!(matches!(err, SessionError::NotServing(SessionState::Created)));

        c.start().await.unwrap();
        let err = c.invoke("get_meal_plan", json!({})).await.unwrap_err();
        assert!(matches!(err, SessionError::NotServing(SessionState::Ready)));
    }

    #[tokio::test]
    async fn invoke_serves_while_active() {
        let c = active_controller().await;
        let outcome = c.invoke("get_todays_workout", json!({})).await.unwrap();
        assert!(outcome.reply.contains("push day"));
    }

    #[tokio::test]
    async fn invoke_rejected_after_end() {
        let c = active_controller().await;
        c.end().await.unwrap();
        let err = c.invoke("get_meal_plan", json!({})).await.unwrap_err();
        assert!(matches!(err, SessionError::NotServing(SessionState::Closed)));
    }

    #[tokio::test]
    async fn unknown_capability_does_not_poison_the_session() {
        let c = active_controller().await;
        let err = c.invoke("order_pizza", json!({})).await.unwrap_err();
        assert!(matches!(err, SessionError::Tool(_)));

        let outcome = c.invoke("get_meal_plan", json!({})).await.unwrap();
        assert!(!outcome.is_error);
        assert_eq!(c.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn definitions_available_once_started() {
        let c = controller();
        assert!(c.definitions().is_empty());
        c.start().await.unwrap();
        assert_eq!(c.definitions().len(), 6);
    }

    // --- Events ---

    #[tokio::test]
    async fn lifecycle_emits_events_in_order() {
        let c = controller();
        let mut rx = c.subscribe();

        c.start().await.unwrap();
        c.attach(TransportHandle {
            connection_id: "conn-1".into(),
        })
        .unwrap();
        let _ = c.invoke("get_meal_plan", json!({})).await.unwrap();
        c.end().await.unwrap();

        let mut types = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            types.push(ev.event_type().to_string());
        }
        assert_eq!(
            types,
            vec![
                "context_loaded",
                "session_active",
                "tool_completed",
                "session_closed",
            ]
        );
    }

    // --- Refresh ---

    #[tokio::test]
    async fn refresh_swaps_the_snapshot_for_new_readers() {
        let (ctx_store, log_store) = stores(sample_context());
        let c = controller_with(
            Arc::clone(&ctx_store),
            log_store,
            Arc::new(ScriptedReasoner::answering()),
        );
        c.start().await.unwrap();
        c.attach(TransportHandle {
            connection_id: "conn-1".into(),
        })
        .unwrap();

        c.refresh_context().await.unwrap();
        // One load at start, one at refresh.
        assert_eq!(ctx_store.load_count(), 2);
    }

    #[tokio::test]
    async fn refresh_before_start_is_rejected() {
        let c = controller();
        let err = c.refresh_context().await.unwrap_err();
        assert!(matches!(err, SessionError::NotServing(_)));
    }
}
