use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunables for an [`EventLoop`](super::EventLoop).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLoopConfig {
    /// Messages that may wait for the broadcaster before producers block.
    pub queue_capacity: usize,
    /// Messages each subscriber may leave unread. Further messages are
    /// dropped for that subscriber until it catches up.
    pub subscriber_capacity: usize,
    /// How long `dispatch` keeps retrying a full queue before dropping.
    pub dispatch_timeout_ms: u64,
    /// Pause between retries against a full queue.
    pub retry_interval_ms: u64,
    /// Install the tick and task processors after any custom ones.
    pub install_default_processors: bool,
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            subscriber_capacity: 1024,
            dispatch_timeout_ms: 1000,
            retry_interval_ms: 10,
            install_default_processors: true,
        }
    }
}

impl EventLoopConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// default values.
    pub fn from_json(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(Error::Invalid("queue_capacity must be positive".into()));
        }
        if self.subscriber_capacity == 0 {
            return Err(Error::Invalid("subscriber_capacity must be positive".into()));
        }
        if self.retry_interval_ms == 0 {
            return Err(Error::Invalid("retry_interval_ms must be positive".into()));
        }
        if self.retry_interval_ms > self.dispatch_timeout_ms {
            return Err(Error::Invalid(
                "retry_interval_ms must not exceed dispatch_timeout_ms".into(),
            ));
        }
        Ok(())
    }

    /// Overall dispatch timeout.
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }

    /// Retry interval.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json() -> Result<()> {
        let c = EventLoopConfig::from_json(r#"{"queue_capacity": 8}"#)?;
        assert_eq!(c.queue_capacity, 8);
        assert_eq!(c.dispatch_timeout(), Duration::from_millis(1000));
        assert_eq!(c.retry_interval(), Duration::from_millis(10));
        assert!(c.install_default_processors);

        assert!(matches!(
            EventLoopConfig::from_json(r#"{"queue_capacity": 0}"#),
            Err(Error::Invalid(_))
        ));
        assert_eq!(c.subscriber_capacity, 1024);
        assert!(matches!(
            EventLoopConfig::from_json(r#"{"subscriber_capacity": 0}"#),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            EventLoopConfig::from_json(r#"{"retry_interval_ms": 5000}"#),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            EventLoopConfig::from_json("{"),
            Err(Error::Config(_))
        ));
        Ok(())
    }
}
