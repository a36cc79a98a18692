//! Origin service: the unthrottled backend behind `/gpt0`.

use std::time::Duration;

use crate::config::OriginSettings;
use crate::observability::metrics;

/// Payload served by every origin fetch.
pub const ORIGIN_PAYLOAD: &str = "hello world";

/// Immutable origin settings resolved at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OriginConfig {
    pub response_delay: Duration,
}

impl From<&OriginSettings> for OriginConfig {
    fn from(settings: &OriginSettings) -> Self {
        Self {
            response_delay: settings.response_delay(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OriginService {
    config: OriginConfig,
}

impl OriginService {
    pub fn new(config: OriginConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OriginConfig {
        &self.config
    }

    /// Return the payload, after the configured delay if any.
    ///
    /// The delay suspends only the calling task.
    pub async fn fetch(&self) -> &'static str {
        if !self.config.response_delay.is_zero() {
            tokio::time::sleep(self.config.response_delay).await;
        }
        metrics::record_origin_fetch();
        ORIGIN_PAYLOAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_fetch_without_delay() {
        let origin = OriginService::new(OriginConfig::default());
        assert_eq!(origin.fetch().await, "hello world");
    }

    #[tokio::test]
    async fn test_fetch_waits_for_delay() {
        let origin = OriginService::new(OriginConfig {
            response_delay: Duration::from_millis(10),
        });

        let start = Instant::now();
        assert_eq!(origin.fetch().await, "hello world");
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_does_not_serialize_requests() {
        let origin = OriginService::new(OriginConfig {
            response_delay: Duration::from_secs(1),
        });

        let start = tokio::time::Instant::now();
        let (a, b, c) = tokio::join!(origin.fetch(), origin.fetch(), origin.fetch());
        assert_eq!([a, b, c], [ORIGIN_PAYLOAD; 3]);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = OriginSettings {
            response_delay_secs: 0.01,
        };
        assert_eq!(
            OriginConfig::from(&settings).response_delay,
            Duration::from_millis(10)
        );
    }
}
