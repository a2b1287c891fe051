//! Default values.

use crate::schema::*;
use botmetrics_common::{Frequency, LogFormat};

/// Bot selected when the config names none.
pub const DEFAULT_BOT_NAME: &str = "HAiBot";

/// Backend URL used when the config names none.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            dashboard: DashboardConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            rate_limit_per_second: 10,
            max_idle_per_host: 10,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bot_name: DEFAULT_BOT_NAME.to_string(),
            default_frequency: Frequency::Weekly,
            offered_frequencies: Frequency::ALL.to_vec(),
            default_range_days: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file_path: None,
        }
    }
}
