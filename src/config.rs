//! Declarative wait-policy configuration (feature `config`).
//!
//! ```rust
//! use retrier::config::PolicyConfig;
//! use retrier::WaitPolicy;
//! use std::time::Duration;
//!
//! let config: PolicyConfig = serde_json::from_str(
//!     r#"{ "backoff": { "kind": "exponential", "unit_ms": 100 },
//!          "max_interval_ms": 1000,
//!          "max_attempts": 4 }"#,
//! ).unwrap();
//! let policy = config.build().unwrap();
//! assert_eq!(policy.wait(2).unwrap(), Duration::from_millis(400));
//! assert_eq!(policy.wait(4).unwrap(), Duration::from_secs(1));
//! assert!(policy.wait(5).unwrap_err().is_exhausted());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backoff::{Backoff, BoxWaitPolicy};
use crate::combinator::WaitPolicyExt;

/// Base backoff strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffConfig {
    /// `2^attempt * unit_ms`; `unit_ms` defaults to one second.
    Exponential {
        #[serde(default = "default_exponential_unit_ms")]
        unit_ms: u64,
    },
    /// `attempt * unit_ms`.
    Linear { unit_ms: u64 },
    /// `delay_ms` for every attempt.
    Constant { delay_ms: u64 },
    /// No wait at all.
    Immediate,
}

fn default_exponential_unit_ms() -> u64 {
    1_000
}

impl BackoffConfig {
    pub fn to_backoff(self) -> Backoff {
        match self {
            Self::Exponential { unit_ms } => {
                Backoff::exponential_with_unit(Duration::from_millis(unit_ms))
            }
            Self::Linear { unit_ms } => Backoff::linear(Duration::from_millis(unit_ms)),
            Self::Constant { delay_ms } => Backoff::constant(Duration::from_millis(delay_ms)),
            Self::Immediate => Backoff::immediate(),
        }
    }
}

/// A base backoff plus optional bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub backoff: BackoffConfig,
    /// Highest attempt index allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

/// Errors produced when validating a [`PolicyConfig`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("min_interval_ms ({min}) must be <= max_interval_ms ({max})")]
    MinAboveMax { min: u64, max: u64 },
    #[error("deadline_ms must be greater than zero")]
    ZeroDeadline,
}

impl PolicyConfig {
    pub fn new(backoff: BackoffConfig) -> Self {
        Self {
            backoff,
            max_attempts: None,
            min_interval_ms: None,
            max_interval_ms: None,
            deadline_ms: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(min), Some(max)) = (self.min_interval_ms, self.max_interval_ms) {
            if min > max {
                return Err(ConfigError::MinAboveMax { min, max });
            }
        }
        if self.deadline_ms == Some(0) {
            return Err(ConfigError::ZeroDeadline);
        }
        Ok(())
    }

    /// Compose the policy as backoff → min interval → max interval → max attempts → deadline.
    pub fn build(&self) -> Result<BoxWaitPolicy, ConfigError> {
        self.validate()?;
        let mut policy = self.backoff.to_backoff().boxed();
        if let Some(floor) = self.min_interval_ms {
            policy = policy.min_interval(Duration::from_millis(floor)).boxed();
        }
        if let Some(ceiling) = self.max_interval_ms {
            policy = policy.max_interval(Duration::from_millis(ceiling)).boxed();
        }
        if let Some(limit) = self.max_attempts {
            policy = policy.max_attempts(limit).boxed();
        }
        if let Some(limit) = self.deadline_ms {
            policy = policy.deadline(Duration::from_millis(limit)).boxed();
        }
        Ok(policy)
    }
}
