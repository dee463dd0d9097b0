// Configuration: provider presets and the TOML settings file

pub mod providers;
pub mod settings;

pub use providers::{get_all_provider_presets, get_provider_preset, ProviderPreset};
pub use settings::{ModelSettings, ResearchSettings, ServerSettings, Settings, SettingsOverrides};
