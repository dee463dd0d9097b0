// Builtin presets for OpenAI-compatible chat completion providers
//
// A preset supplies the base URL, the default model and the environment
// variable conventionally holding the provider's API key.

/// A builtin provider preset
/// Note: This is hardcoded data, not deserialized from files
#[derive(Debug, Clone)]
pub struct ProviderPreset {
    /// Provider ID (e.g., "cerebras", "openai")
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Base URL for the API, without the `/chat/completions` suffix
    pub base_url: &'static str,
    /// Known models for this provider
    pub models: &'static [(&'static str, bool)], // (model_name, is_default)
    /// Environment variable holding the API key
    pub api_key_env: &'static str,
}

impl ProviderPreset {
    /// The model flagged as default, or the first listed one
    pub fn default_model(&self) -> Option<&'static str> {
        self.models
            .iter()
            .find(|(_, is_default)| *is_default)
            .or_else(|| self.models.first())
            .map(|(name, _)| *name)
    }
}

/// Builtin provider presets
pub static PROVIDERS: &[ProviderPreset] = &[
    ProviderPreset {
        id: "cerebras",
        name: "Cerebras",
        base_url: "https://api.cerebras.ai/v1",
        models: &[
            ("llama3.3-70b", true), // default
            ("llama3.1-8b", false),
            ("qwen-3-32b", false),
        ],
        api_key_env: "CEREBRAS_API_KEY",
    },
    ProviderPreset {
        id: "openai",
        name: "OpenAI",
        base_url: "https://api.openai.com/v1",
        models: &[("gpt-4o-mini", true), ("gpt-4o", false)],
        api_key_env: "OPENAI_API_KEY",
    },
];

/// Get a provider preset by ID
pub fn get_provider_preset(id: &str) -> Option<&'static ProviderPreset> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Get all provider presets
pub fn get_all_provider_presets() -> &'static [ProviderPreset] {
    PROVIDERS
}
