//! Config - Mediator の構築時設定
//!
//! 設定項目は `max_arity`（1 回の publish / 1 つの handler が持てる引数の最大数）だけです。

use serde::Deserialize;

/// Default capacity: handlers and publish calls carry at most two values.
pub const DEFAULT_MAX_ARITY: usize = 2;

/// Largest parameter list a handler can declare (`Fn(A1, ..., A8)`).
pub const MAX_SUPPORTED_ARITY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediatorConfig {
    pub max_arity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_arity={given} is out of range (supported: 0..={max})")]
    ArityOutOfRange { given: usize, max: usize },
}

impl MediatorConfig {
    pub fn new(max_arity: usize) -> Self {
        Self { max_arity }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_arity > MAX_SUPPORTED_ARITY {
            return Err(ConfigError::ArityOutOfRange {
                given: self.max_arity,
                max: MAX_SUPPORTED_ARITY,
            });
        }
        Ok(())
    }
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            max_arity: DEFAULT_MAX_ARITY,
        }
    }
}
