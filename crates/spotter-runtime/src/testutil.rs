//! Shared test doubles for the storage seams.
//!
//! Used by this crate's unit tests and the integration tests; kept as a
//! normal module so both can share one set of fixtures.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use spotter_core::context::UserContext;
use spotter_core::ids::{SessionId, UserId};
use spotter_core::log_event::LogEvent;
use spotter_delegate::{Answer, DelegateError, DelegationRequest, Reasoner};
use tokio::sync::watch;

use crate::storage::{ContextStore, LogStore, StoreError};

/// In-memory `ContextStore` with call counting.
pub struct MemContextStore {
    context: Option<UserContext>,
    unavailable: bool,
    loads: AtomicUsize,
}

impl MemContextStore {
    /// Store that serves the given context for any user.
    #[must_use]
    pub fn with_context(context: UserContext) -> Self {
        Self {
            context: Some(context),
            unavailable: false,
            loads: AtomicUsize::new(0),
        }
    }

    /// Store with no data: every load is `NotFound`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            context: None,
            unavailable: false,
            loads: AtomicUsize::new(0),
        }
    }

    /// Store that fails every call.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            context: None,
            unavailable: true,
            loads: AtomicUsize::new(0),
        }
    }

    /// How many loads were attempted.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextStore for MemContextStore {
    async fn load_user_context(&self, _user_id: &UserId) -> Result<UserContext, StoreError> {
        let _ = self.loads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(StoreError::Unavailable {
                message: "context store down".into(),
            });
        }
        self.context.clone().ok_or(StoreError::NotFound)
    }
}

/// In-memory `LogStore` recording appends in order, with optional gating,
/// per-call delay, and a scripted failure.
pub struct RecordingLogStore {
    events: Mutex<Vec<LogEvent>>,
    attempts: AtomicUsize,
    fail_at: Option<usize>,
    delay: Option<Duration>,
    gate_tx: watch::Sender<bool>,
}

impl RecordingLogStore {
    fn build(fail_at: Option<usize>, delay: Option<Duration>, gate_open: bool) -> Self {
        let (gate_tx, _) = watch::channel(gate_open);
        Self {
            events: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail_at,
            delay,
            gate_tx,
        }
    }

    /// Store where every append succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None, None, true)
    }

    /// Store whose appends block until [`open_gate`](Self::open_gate).
    #[must_use]
    pub fn gated() -> Self {
        Self::build(None, None, false)
    }

    /// Store where the append attempt at `index` (0-based) fails.
    #[must_use]
    pub fn failing_at(index: usize) -> Self {
        Self::build(Some(index), None, true)
    }

    /// Store where every append takes `delay`.
    #[must_use]
    pub fn slow(delay: Duration) -> Self {
        Self::build(None, Some(delay), true)
    }

    /// Release all gated appends, permanently.
    pub fn open_gate(&self) {
        // `send_replace` updates the stored value even when no receiver has
        // subscribed yet; `send` would no-op (and drop the `true`) in that
        // race, leaving gated appends blocked forever.
        let _ = self.gate_tx.send_replace(true);
    }

    /// Successful appends so far.
    #[must_use]
    pub fn append_count(&self) -> usize {
        self.events.lock().len()
    }

    /// Append attempts so far, including failed ones.
    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Successfully appended events, in order.
    #[must_use]
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }
}

impl Default for RecordingLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogStore for RecordingLogStore {
    async fn append_log(&self, _session_id: &SessionId, event: &LogEvent) -> Result<(), StoreError> {
        let mut gate = self.gate_tx.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(attempt) {
            return Err(StoreError::Unavailable {
                message: "write failed".into(),
            });
        }
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// `Reasoner` double that answers, fails, or stalls, with call counting.
pub struct ScriptedReasoner {
    calls: AtomicUsize,
    delay: Option<Duration>,
    fail: bool,
}

impl ScriptedReasoner {
    /// Always answers.
    #[must_use]
    pub fn answering() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: None,
            fail: false,
        }
    }

    /// Always fails with `Unavailable`.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::answering()
        }
    }

    /// Sleeps `delay` before answering (for timeout tests).
    #[must_use]
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::answering()
        }
    }

    /// How many times `route` was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn route(&self, request: &DelegationRequest) -> Result<Answer, DelegateError> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(DelegateError::Unavailable {
                message: "reasoner down".into(),
            });
        }
        Ok(Answer {
            text: format!("{} advice: {}", request.specialist, request.query),
            specialist: request.specialist,
            provider: request.provider,
        })
    }
}

/// Convenience: the standard store pair for controller tests.
#[must_use]
pub fn stores(
    context: UserContext,
) -> (Arc<MemContextStore>, Arc<RecordingLogStore>) {
    (
        Arc::new(MemContextStore::with_context(context)),
        Arc::new(RecordingLogStore::new()),
    )
}
