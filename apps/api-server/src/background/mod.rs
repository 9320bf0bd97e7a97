//! Periodic callers of the scheduler sweep.

#[cfg(feature = "scheduler")]
mod scheduler;

#[cfg(feature = "scheduler")]
pub use scheduler::{Scheduler, register_sweep};

/// Settings for the opt-in periodic sweep.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Run the sweep from inside the server process.
    pub enabled: bool,
    /// Six-field cron expression (seconds first).
    pub sweep_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sweep_cron: "0 * * * * *".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.enabled),
            sweep_cron: std::env::var("SWEEP_CRON").unwrap_or(defaults.sweep_cron),
        }
    }
}
