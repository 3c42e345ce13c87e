//! Compiled-in lock configuration
//!
//! There is no configuration file: the lock must behave identically no matter
//! what the invoking environment looks like.

use std::time::Duration;

use crate::buffer::DEFAULT_CAPACITY;
use crate::grab::GrabPolicy;

/// Session configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockConfig {
    /// Secret buffer capacity in bytes
    pub capacity: usize,
    /// Retry budget for acquiring exclusive input
    pub grab: GrabPolicy,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            grab: GrabPolicy::default(),
        }
    }
}

impl LockConfig {
    /// Create a config for testing (tiny retry budget, no sleeping)
    pub fn testing() -> Self {
        Self {
            capacity: 32,
            grab: GrabPolicy {
                max_attempts: 3,
                retry_delay: Duration::ZERO,
            },
        }
    }

    /// Override the buffer capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Override the grab retry policy
    pub fn with_grab_policy(mut self, grab: GrabPolicy) -> Self {
        self.grab = grab;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LockConfig::default();
        assert_eq!(config.capacity, 255);
        assert_eq!(config.grab.max_attempts, 1000);
        assert_eq!(config.grab.retry_delay, Duration::from_millis(1));
    }

    #[test]
    fn test_testing_preset_never_sleeps() {
        let config = LockConfig::testing();
        assert_eq!(config.grab.retry_delay, Duration::ZERO);
        assert!(config.grab.max_attempts > 0);
    }
}
