//! Event-stream subscriptions: the push channel and the periodic timers.

use std::time::Duration;

use futures_util::StreamExt;
use iced::Subscription;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use coolwatch_api::{PushEvent, ServerConfig};

use crate::message::Message;

/// Lifecycle of the push-channel connection, surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// A connection attempt is in flight.
    #[default]
    Connecting,
    /// The channel is open and events are flowing.
    Open,
    /// The channel closed; one reconnect attempt is pending.
    ClosedPendingRetry,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Open => "Live",
            ConnectionState::ClosedPendingRetry => "Reconnecting...",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

/// The slice of configuration the push subscription depends on.
/// Doubles as the subscription identity: changing it restarts the stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PushConfig {
    pub server: ServerConfig,
    pub reconnect_delay_secs: u64,
}

/// Create a subscription that owns the push-channel lifecycle.
///
/// One loop iteration per connection: connect, drain frames until the
/// channel closes or errors, then sleep the fixed reconnect delay and go
/// again. The single sleep is the only retry timer, so no amount of
/// close/error signals can schedule more than one pending attempt.
/// Failures are never fatal; they only show up as `ConnectionChanged`.
pub fn push_subscription(config: PushConfig) -> Subscription<Message> {
    Subscription::run_with(config, move |config| {
        let config = config.clone();
        async_stream::stream! {
            let delay = Duration::from_secs(config.reconnect_delay_secs);

            loop {
                yield Message::ConnectionChanged(ConnectionState::Connecting);

                match config.server.ws_url() {
                    Ok(url) => match connect_async(url.as_str()).await {
                        Ok((mut socket, _response)) => {
                            tracing::info!(%url, "Push channel connected");
                            yield Message::ConnectionChanged(ConnectionState::Open);

                            while let Some(frame) = socket.next().await {
                                match frame {
                                    Ok(WsMessage::Text(raw)) => {
                                        match PushEvent::decode(raw.as_str()) {
                                            Ok(PushEvent::Unknown) => {
                                                tracing::debug!("Ignoring unknown push event type");
                                            }
                                            Ok(event) => yield Message::PushEventReceived(event),
                                            Err(e) => {
                                                tracing::warn!(
                                                    error = %e,
                                                    "Failed to decode push event"
                                                );
                                            }
                                        }
                                    }
                                    Ok(WsMessage::Close(_)) => break,
                                    Ok(_) => {}
                                    Err(e) => {
                                        tracing::warn!(error = %e, "Push channel error");
                                        break;
                                    }
                                }
                            }

                            tracing::info!("Push channel closed");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Push channel connect failed");
                        }
                    },
                    Err(e) => {
                        tracing::error!(error = %e, "Invalid push endpoint");
                    }
                }

                yield Message::ConnectionChanged(ConnectionState::ClosedPendingRetry);
                tokio::time::sleep(delay).await;
            }
        }
    })
}

/// Periodic trigger for the authoritative full refresh. Runs regardless
/// of push-channel health; it is the consistency backstop.
pub fn refresh_subscription(period_secs: u64) -> Subscription<Message> {
    iced::time::every(Duration::from_secs(period_secs)).map(|_| Message::RefreshTick)
}

/// Periodic trigger for the alert badge count.
pub fn badge_subscription(period_secs: u64) -> Subscription<Message> {
    iced::time::every(Duration::from_secs(period_secs)).map(|_| Message::AlertBadgeTick)
}

/// One-second tick for relative timestamps and notice dismissal.
pub fn tick_subscription() -> Subscription<Message> {
    iced::time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_labels() {
        assert_eq!(ConnectionState::Open.label(), "Live");
        assert_eq!(ConnectionState::Connecting.label(), "Connecting...");
        assert_eq!(
            ConnectionState::ClosedPendingRetry.label(),
            "Reconnecting..."
        );
    }

    #[test]
    fn test_only_open_state_is_open() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(!ConnectionState::ClosedPendingRetry.is_open());
    }
}
