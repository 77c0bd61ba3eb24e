//! Static registry of supported provider/model descriptors.
//!
//! The catalog is built once at startup and never mutated. Entries keep
//! their insertion order so menu numbering stays stable across runs.

use indexmap::IndexMap;

/// Which client implementation a descriptor's credential drives.
///
/// Dispatch on this enum, never on substrings of the model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Google Gemini via the generateContent HTTP API
    Gemini,
}

/// Static metadata for one supported model/provider pairing.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Unique id, also the key in the credential file
    pub provider_id: String,
    /// Human-readable name for menus
    pub display_name: String,
    /// Model id as the provider's API expects it
    pub api_model_id: String,
    /// Pricing label shown next to the model
    pub pricing_tier: String,
    /// Environment variable checked before the credential file
    pub credential_env_var: String,
    /// Short prompt used to validate a credential before persisting it
    pub test_prompt: String,
    /// Selects the client constructor
    pub kind: ProviderKind,
}

/// Immutable, insertion-ordered collection of [`ModelDescriptor`]s.
pub struct ModelCatalog {
    entries: IndexMap<String, ModelDescriptor>,
}

impl ModelCatalog {
    /// Build a catalog from descriptors, keeping their order.
    pub fn new(descriptors: impl IntoIterator<Item = ModelDescriptor>) -> Self {
        let entries = descriptors
            .into_iter()
            .map(|d| (d.provider_id.clone(), d))
            .collect();
        Self { entries }
    }

    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self::new([ModelDescriptor {
            provider_id: "gemini".to_string(),
            display_name: "Gemini 2.0 Flash".to_string(),
            api_model_id: "gemini-2.0-flash-exp".to_string(),
            pricing_tier: "Free".to_string(),
            credential_env_var: "GOOGLE_API_KEY".to_string(),
            test_prompt: "Say 'Hello' if you can hear me.".to_string(),
            kind: ProviderKind::Gemini,
        }])
    }

    /// Look up a descriptor by provider id.
    pub fn get(&self, provider_id: &str) -> Option<&ModelDescriptor> {
        self.entries.get(provider_id)
    }

    /// All descriptors in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
