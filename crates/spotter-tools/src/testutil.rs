//! Shared test utilities for capability handlers.
//!
//! Provides `make_ctx()`, `sample_context()`, and mock collaborators so
//! every handler test module doesn't rebuild the same fixtures.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use spotter_core::context::{
    ExercisePrescription, MealPlan, PlannedMeal, Preferences, UnitSystem, UserContext, WorkoutDay,
    WorkoutPlan,
};
use spotter_core::ids::{SessionId, UserId};
use spotter_core::log_event::LogEvent;
use spotter_core::specialist::SpecialistTag;
use spotter_delegate::{Answer, DelegateError, ReasonerProvider};

use crate::traits::{Advisor, ContextReader, EventSink, ToolContext};

/// Build a standard test `ToolContext`.
#[must_use]
pub fn make_ctx() -> ToolContext {
    ToolContext {
        session_id: SessionId::new("sess-test"),
        cancellation: tokio_util::sync::CancellationToken::new(),
    }
}

/// A realistic snapshot: 3-day plan, 2200 kcal meal plan, one injury.
#[must_use]
pub fn sample_context() -> UserContext {
    UserContext {
        user_id: UserId::new("user-1"),
        workout_plan: WorkoutPlan {
            name: "PPL 3-day".into(),
            days: vec![
                WorkoutDay {
                    day_index: 0,
                    focus: "push".into(),
                    exercises: vec![
                        ExercisePrescription {
                            exercise: "bench press".into(),
                            sets: 3,
                            reps: "8-10".into(),
                            target_weight_kg: Some(80.0),
                            notes: None,
                        },
                        ExercisePrescription {
                            exercise: "overhead press".into(),
                            sets: 3,
                            reps: "10".into(),
                            target_weight_kg: Some(45.0),
                            notes: Some("strict, no leg drive".into()),
                        },
                    ],
                },
                WorkoutDay {
                    day_index: 1,
                    focus: "pull".into(),
                    exercises: vec![ExercisePrescription {
                        exercise: "deadlift".into(),
                        sets: 3,
                        reps: "5".into(),
                        target_weight_kg: Some(140.0),
                        notes: None,
                    }],
                },
                WorkoutDay {
                    day_index: 2,
                    focus: "legs".into(),
                    exercises: vec![ExercisePrescription {
                        exercise: "squat".into(),
                        sets: 4,
                        reps: "6-8".into(),
                        target_weight_kg: Some(110.0),
                        notes: None,
                    }],
                },
            ],
        },
        meal_plan: MealPlan {
            name: "lean bulk".into(),
            daily_kcal: 2200,
            protein_g: 180,
            meals: vec![
                PlannedMeal {
                    name: "breakfast".into(),
                    kcal: 550,
                    description: "oats, whey, berries".into(),
                },
                PlannedMeal {
                    name: "lunch".into(),
                    kcal: 750,
                    description: "chicken, rice, greens".into(),
                },
                PlannedMeal {
                    name: "dinner".into(),
                    kcal: 900,
                    description: "salmon, potatoes, salad".into(),
                },
            ],
        },
        preferences: Preferences {
            coaching_style: "encouraging".into(),
            injuries: vec!["left shoulder impingement".into()],
            unit_system: UnitSystem::Metric,
        },
        loaded_at: Utc::now(),
    }
}

/// `ContextReader` over a fixed snapshot, counting reads.
pub struct StaticContext {
    snapshot: Arc<UserContext>,
    reads: AtomicUsize,
}

impl StaticContext {
    /// Wrap a snapshot.
    #[must_use]
    pub fn new(context: UserContext) -> Self {
        Self {
            snapshot: Arc::new(context),
            reads: AtomicUsize::new(0),
        }
    }

    /// How many times `snapshot()` was called.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ContextReader for StaticContext {
    fn snapshot(&self) -> Arc<UserContext> {
        let _ = self.reads.fetch_add(1, Ordering::SeqCst);
        Arc::clone(&self.snapshot)
    }
}

/// `EventSink` that records everything it is handed.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, in enqueue order.
    #[must_use]
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for RecordingSink {
    fn enqueue(&self, event: LogEvent) {
        self.events.lock().push(event);
    }
}

/// `Advisor` that either answers or fails, counting calls.
pub struct ScriptedAdvisor {
    calls: AtomicUsize,
    last_specialist: Mutex<Option<SpecialistTag>>,
    fail_with: Option<fn() -> DelegateError>,
}

impl ScriptedAdvisor {
    /// Always answers.
    #[must_use]
    pub fn answering() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_specialist: Mutex::new(None),
            fail_with: None,
        }
    }

    /// Always fails with the given error.
    #[must_use]
    pub fn failing(f: fn() -> DelegateError) -> Self {
        Self {
            fail_with: Some(f),
            ..Self::answering()
        }
    }

    /// How many times `ask` was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The specialist tag of the most recent call.
    #[must_use]
    pub fn last_specialist(&self) -> Option<SpecialistTag> {
        *self.last_specialist.lock()
    }
}

#[async_trait]
impl Advisor for ScriptedAdvisor {
    async fn ask(&self, specialist: SpecialistTag, query: &str) -> Result<Answer, DelegateError> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_specialist.lock() = Some(specialist);
        if let Some(f) = self.fail_with {
            return Err(f());
        }
        Ok(Answer {
            text: format!("{specialist} says: {query}"),
            specialist,
            provider: ReasonerProvider::Anthropic,
        })
    }
}
