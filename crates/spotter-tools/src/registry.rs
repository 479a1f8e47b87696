//! Capability registry — the immutable dispatch table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::advice::AskSpecialistTool;
use crate::logs::{LogMealTool, LogSetTool};
use crate::plans::{MealPlanTool, PreferencesTool, TodaysWorkoutTool};
use crate::schema::ToolDefinition;
use crate::traits::{Advisor, ContextReader, EventSink, SessionTool};

/// Fixed, statically known dispatch table from capability name to handler.
///
/// Immutable after construction: there is no dynamic registration at
/// runtime. Duplicate names are a wiring bug; the last one registered wins
/// and a debug assertion catches it in tests.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn SessionTool>>,
}

impl ToolRegistry {
    /// Build a registry from a fixed set of handlers.
    #[must_use]
    pub fn from_tools(tools: Vec<Arc<dyn SessionTool>>) -> Self {
        let mut map: HashMap<String, Arc<dyn SessionTool>> = HashMap::with_capacity(tools.len());
        for tool in tools {
            let previous = map.insert(tool.name().to_string(), tool);
            debug_assert!(previous.is_none(), "duplicate capability name registered");
        }
        Self { tools: map }
    }

    /// Look up a handler by capability name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn SessionTool>> {
        self.tools.get(name)
    }

    /// All registered capability names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Definitions for the LLM tool layer, sorted by name.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// The full built-in capability set, wired to its collaborators.
#[must_use]
pub fn builtin_tools(
    context: Arc<dyn ContextReader>,
    sink: Arc<dyn EventSink>,
    advisor: Arc<dyn Advisor>,
) -> ToolRegistry {
    ToolRegistry::from_tools(vec![
        Arc::new(TodaysWorkoutTool::new(Arc::clone(&context))),
        Arc::new(MealPlanTool::new(Arc::clone(&context))),
        Arc::new(PreferencesTool::new(context)),
        Arc::new(LogSetTool::new(Arc::clone(&sink))),
        Arc::new(LogMealTool::new(sink)),
        Arc::new(AskSpecialistTool::new(advisor)),
    ])
}
