//! Server application state shared across handlers

use crate::config::Settings;
use crate::llm::ClientFactory;
use crate::shutdown::ShutdownState;
use std::sync::Arc;

/// Shared state for the server. Model clients are not stored here: each
/// request builds its own from its credentials through `client_factory`.
#[derive(Clone)]
pub struct ServerAppState {
    /// Effective settings (file merged with command-line flags)
    pub settings: Arc<Settings>,

    /// Builds a model client per research run
    pub client_factory: Arc<dyn ClientFactory>,

    /// Shutdown state
    pub shutdown_state: ShutdownState,
}

impl ServerAppState {
    pub fn new(
        settings: Settings,
        client_factory: Arc<dyn ClientFactory>,
        shutdown_state: ShutdownState,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            client_factory,
            shutdown_state,
        }
    }
}
