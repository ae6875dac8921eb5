//! Pool configuration options

use std::time::Duration;

/// Configuration for pool behavior
///
/// # Examples
///
/// ```
/// use respool::PoolConfig;
/// use std::time::Duration;
///
/// let config = PoolConfig::new()
///     .with_timeout(Duration::from_secs(5))
///     .opened();
///
/// assert_eq!(config.operation_timeout, Some(Duration::from_secs(5)));
/// assert!(config.start_open);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Timeout bounding async acquire operations
    pub operation_timeout: Option<Duration>,

    /// Whether the pool accepts acquisitions immediately, without an
    /// explicit call to `open`
    pub start_open: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Some(Duration::from_secs(30)),
            start_open: false,
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for async operations
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Start the pool in the open state
    ///
    /// By default a new pool is closed and `acquire` fast-fails until
    /// `open` is called.
    pub fn opened(mut self) -> Self {
        self.start_open = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_start_closed() {
        let config = PoolConfig::default();
        assert!(!config.start_open);
        assert_eq!(config.operation_timeout, Some(Duration::from_secs(30)));
    }
}
