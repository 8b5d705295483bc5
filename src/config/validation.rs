//! Configuration validation.

use crate::config::loader::Config;
use crate::download::bulk::MAX_CONCURRENCY;
use crate::error::{Error, Result};

/// Validate a merged configuration before the pipeline starts.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.options.concurrency == 0 {
        return Err(Error::ConfigValidation {
            field: "concurrency".into(),
            message: "must be at least 1".into(),
        });
    }
    if config.options.concurrency > MAX_CONCURRENCY {
        return Err(Error::ConfigValidation {
            field: "concurrency".into(),
            message: format!("must be at most {}", MAX_CONCURRENCY),
        });
    }
    if config.options.retries > 10 {
        return Err(Error::ConfigValidation {
            field: "retries".into(),
            message: "must be at most 10".into(),
        });
    }
    if config.session.user_agent.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: "user_agent".into(),
            message: "must not be empty".into(),
        });
    }
    Ok(())
}
