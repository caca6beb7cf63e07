use crate::error::{AppError, Result};
use crate::utils::validation;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub listen_addr: String,
    pub poll_interval_secs: u64,
    pub items_per_page: usize,
    /// Upper bound on items requested per fetch; unbounded when absent.
    pub fetch_limit: Option<u32>,
    pub namespaces: Vec<String>,
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
    pub notification_history: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            poll_interval_secs: 10,
            items_per_page: 10,
            fetch_limit: None,
            namespaces: vec!["default".to_string()],
            label_selector: None,
            field_selector: None,
            notification_history: 50,
        }
    }
}

impl DashboardConfig {
    /// Reads the file named by `DASHBOARD_CONFIG`, or falls back to defaults.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => {
                tracing::info!("{} not set, using default configuration", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        tracing::info!(path = %path.display(), "Loaded configuration file");
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(AppError::Validation(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }

        if self.fetch_limit == Some(0) {
            return Err(AppError::Validation("fetch_limit must be at least 1".to_string()));
        }

        validation::validate_items_per_page(self.items_per_page)?;
        validation::validate_namespace_selection(&self.namespaces)?;

        if let Some(ref selector) = self.label_selector {
            validation::validate_label_selector(selector)?;
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
