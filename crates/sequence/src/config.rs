//! Per-group tunables for sequence dispatch.

use std::time::Duration;

use modelgate_core::CoreError;

/// Tunable parameters for a single job group.
///
/// All fields are fixed at group construction. Defaults match the serving
/// defaults: one queued job per session and a 60-second idle threshold.
#[derive(Debug, Clone)]
pub struct SequenceConfig {
    /// How long a session may go without a successful append before its
    /// group stops accepting input. Also the idle monitor's tick period.
    pub max_idle: Duration,
    /// Maximum number of jobs queued for the session at any moment.
    pub max_queue_size: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            max_idle: Duration::from_secs(60),
            max_queue_size: 1,
        }
    }
}

impl SequenceConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `SEQUENCE_MAX_IDLE_MS`    | `60000` |
    /// | `SEQUENCE_MAX_QUEUE_SIZE` | `1`     |
    pub fn from_env() -> Self {
        let max_idle_ms: u64 = std::env::var("SEQUENCE_MAX_IDLE_MS")
            .unwrap_or_else(|_| "60000".into())
            .parse()
            .expect("SEQUENCE_MAX_IDLE_MS must be a valid u64");

        let max_queue_size: usize = std::env::var("SEQUENCE_MAX_QUEUE_SIZE")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("SEQUENCE_MAX_QUEUE_SIZE must be a valid usize");

        Self {
            max_idle: Duration::from_millis(max_idle_ms),
            max_queue_size,
        }
    }

    /// Check that the configuration can actually drive a group.
    ///
    /// A zero-capacity queue could never hold a job, and a zero idle
    /// threshold would make the monitor spin.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_queue_size == 0 {
            return Err(CoreError::Validation(
                "max_queue_size must be at least 1".to_string(),
            ));
        }
        if self.max_idle.is_zero() {
            return Err(CoreError::Validation(
                "max_idle must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SequenceConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = SequenceConfig {
            max_queue_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_idle_threshold_rejected() {
        let config = SequenceConfig {
            max_idle: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
