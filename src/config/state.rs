// Application state module
// Holds everything a connection needs, built once at startup and shared read-only

use super::types::Config;
use crate::generator::PasswordGenerator;

/// Application state
pub struct AppState {
    pub config: Config,
    pub generator: PasswordGenerator,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let generator = PasswordGenerator::from_config(&config.generator);
        Self { config, generator }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
