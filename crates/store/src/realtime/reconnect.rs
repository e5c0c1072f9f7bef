//! Exponential-backoff reconnection to the realtime service.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::client::{RealtimeClient, RealtimeStream};

/// Tunable parameters for the backoff strategy.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// The next backoff delay, clamped to [`ReconnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Retry [`RealtimeClient::connect`] until it succeeds (`Some`) or
/// `cancel` fires (`None`).
pub async fn reconnect_loop(
    client: &RealtimeClient,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Option<RealtimeStream> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        // Wait first: callers only get here after a failure.
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
        tracing::info!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Reconnecting to realtime service",
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Realtime reconnect cancelled");
                return None;
            }
            result = client.connect() => match result {
                Ok(stream) => {
                    tracing::info!(attempt, "Reconnected to realtime service");
                    return Some(stream);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Reconnect attempt {attempt} failed");
                }
            }
        }

        delay = next_delay(delay, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_sequence_caps_at_max() {
        let config = ReconnectConfig::default();
        let mut delay = config.initial_delay;
        for expected in [1, 2, 4, 8, 16, 30, 30] {
            assert_eq!(delay.as_secs(), expected);
            delay = next_delay(delay, &config);
        }
    }

    #[test]
    fn custom_multiplier() {
        let config = ReconnectConfig {
            multiplier: 1.5,
            ..Default::default()
        };
        assert_eq!(
            next_delay(Duration::from_secs(2), &config),
            Duration::from_secs(3)
        );
    }

    #[tokio::test]
    async fn cancelled_token_stops_reconnect() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let client = RealtimeClient::new("ws://127.0.0.1:9/realtime/v1/websocket".into());
        let result = reconnect_loop(&client, &ReconnectConfig::default(), &cancel).await;
        assert!(result.is_none());
    }
}
