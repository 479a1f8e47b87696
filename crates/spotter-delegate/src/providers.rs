//! LLM-provider selection for delegated calls.
//!
//! Which hosted provider backs a given specialist is configuration, not
//! orchestration: the session controller never sees it. The routing table
//! maps each specialist to a provider, with a default for tags that have
//! no override.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use spotter_core::specialist::SpecialistTag;

/// Hosted LLM provider backing a specialist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasonerProvider {
    /// OpenAI-hosted models.
    OpenAi,
    /// Anthropic-hosted models.
    Anthropic,
    /// Google-hosted models.
    Google,
}

impl ReasonerProvider {
    /// Stable lowercase name, used in request payloads and metric labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }
}

/// Per-specialist provider routing table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderRouting {
    /// Provider used when a specialist has no override.
    pub default: ReasonerProvider,
    /// Per-specialist overrides.
    #[serde(default)]
    pub overrides: HashMap<SpecialistTag, ReasonerProvider>,
}

impl ProviderRouting {
    /// Route every specialist to one provider.
    #[must_use]
    pub fn uniform(provider: ReasonerProvider) -> Self {
        Self {
            default: provider,
            overrides: HashMap::new(),
        }
    }

    /// Override the provider for one specialist.
    #[must_use]
    pub fn with_override(mut self, specialist: SpecialistTag, provider: ReasonerProvider) -> Self {
        let _ = self.overrides.insert(specialist, provider);
        self
    }

    /// The provider that serves `specialist`.
    #[must_use]
    pub fn select(&self, specialist: SpecialistTag) -> ReasonerProvider {
        self.overrides.get(&specialist).copied().unwrap_or(self.default)
    }
}

impl Default for ProviderRouting {
    fn default() -> Self {
        Self::uniform(ReasonerProvider::Anthropic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_routes_everything_to_default_provider() {
        let routing = ProviderRouting::uniform(ReasonerProvider::OpenAi);
        for tag in SpecialistTag::ALL {
            assert_eq!(routing.select(tag), ReasonerProvider::OpenAi);
        }
    }

    #[test]
    fn override_applies_to_one_specialist_only() {
        let routing = ProviderRouting::uniform(ReasonerProvider::Anthropic)
            .with_override(SpecialistTag::Diet, ReasonerProvider::Google);
        assert_eq!(routing.select(SpecialistTag::Diet), ReasonerProvider::Google);
        assert_eq!(routing.select(SpecialistTag::Workout), ReasonerProvider::Anthropic);
    }

    #[test]
    fn provider_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReasonerProvider::OpenAi).unwrap(),
            "\"openai\""
        );
    }
}
