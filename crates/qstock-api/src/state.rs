//! Application state shared by the handlers.

use std::sync::Arc;
use std::time::Duration;

use qstock_hal::Backend;

use crate::config::{Config, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SHOTS};

/// How `/predict` runs its job.
#[derive(Debug, Clone)]
pub struct PredictSettings {
    /// Shots per submission.
    pub shots: u32,
    /// Interval between job status polls.
    pub poll_interval: Duration,
}

impl Default for PredictSettings {
    fn default() -> Self {
        Self {
            shots: DEFAULT_SHOTS,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl From<&Config> for PredictSettings {
    fn from(config: &Config) -> Self {
        Self {
            shots: config.shots,
            poll_interval: config.poll_interval,
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// The backend every prediction runs on, created once at startup.
    pub backend: Arc<dyn Backend>,
    /// Prediction settings.
    pub predict: PredictSettings,
}

impl AppState {
    /// Create state with default prediction settings.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            predict: PredictSettings::default(),
        }
    }

    /// Set the prediction settings.
    pub fn with_predict_settings(mut self, predict: PredictSettings) -> Self {
        self.predict = predict;
        self
    }
}
