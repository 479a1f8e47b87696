//! Specialist tags — the closed set of delegation targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named category of delegated reasoning.
///
/// The set is closed: an unrecognized tag is a caller error, rejected
/// before any network call is made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialistTag {
    /// Training programming and exercise execution.
    Workout,
    /// Nutrition and meal planning.
    Diet,
    /// Supplementation.
    Supplement,
}

impl SpecialistTag {
    /// All supported tags, for tool definitions and validation messages.
    pub const ALL: [Self; 3] = [Self::Workout, Self::Diet, Self::Supplement];

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workout => "workout",
            Self::Diet => "diet",
            Self::Supplement => "supplement",
        }
    }
}

impl fmt::Display for SpecialistTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized specialist tag.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown specialist tag: {0}")]
pub struct UnknownSpecialist(pub String);

impl FromStr for SpecialistTag {
    type Err = UnknownSpecialist;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "workout" => Ok(Self::Workout),
            "diet" => Ok(Self::Diet),
            "supplement" => Ok(Self::Supplement),
            other => Err(UnknownSpecialist(other.to_string())),
        }
    }
}
