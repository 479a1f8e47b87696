//! Cache-read capabilities.
//!
//! These answer from the context snapshot only. Each handler holds a
//! [`ContextReader`](crate::traits::ContextReader) and nothing else, so
//! touching storage or the network is impossible by construction.

mod meal_plan;
mod preferences;
mod today_workout;

pub use meal_plan::MealPlanTool;
pub use preferences::PreferencesTool;
pub use today_workout::TodaysWorkoutTool;

use spotter_core::context::UnitSystem;

/// Render a weight in the user's units.
pub(crate) fn format_weight(weight_kg: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format!("{weight_kg:.0}kg"),
        UnitSystem::Imperial => format!("{:.0}lb", weight_kg * 2.204_62),
    }
}
