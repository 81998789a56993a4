// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live notification subscription over a websocket.
//!
//! The backend authenticates the socket from a `token` query parameter and
//! pushes one JSON notification per text frame.

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::Notification;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{error::Error as WsError, protocol::Message},
};

type WebSocketStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Socket URL for a token; the token is URL-encoded into the query.
pub fn notification_url(config: &Config, token: &str) -> String {
    format!(
        "{}/ws/notifications/?token={}",
        config.ws_base_url(),
        urlencoding::encode(token)
    )
}

pub struct NotificationStream {
    ws_stream: WebSocketStream,
}

impl NotificationStream {
    /// Open the subscription for the given access token.
    pub async fn connect(config: &Config, token: &str) -> Result<Self> {
        let url = notification_url(config, token);

        let (ws_stream, _) = match connect_async(url.as_str()).await {
            Ok(result) => result,
            Err(WsError::Http(response)) => {
                let status = response.status().as_u16();
                return Err(match status {
                    401 | 403 => ClientError::Unauthorized,
                    code => ClientError::Network(format!("Notification socket HTTP error: {}", code)),
                });
            }
            Err(e) => {
                return Err(ClientError::Network(format!(
                    "Notification socket connection failed: {}",
                    e
                )))
            }
        };

        tracing::info!("Notification socket connected");
        Ok(Self { ws_stream })
    }

    /// Next pushed notification; `None` once the socket closes.
    ///
    /// Frames that do not decode as a notification are logged and skipped.
    pub async fn next(&mut self) -> Option<Result<Notification>> {
        loop {
            match self.ws_stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<Notification>(text.as_str()) {
                        Ok(notification) => return Some(Ok(notification)),
                        Err(e) => {
                            tracing::warn!(error = %e, "Skipping undecodable notification frame");
                            continue;
                        }
                    }
                }
                Some(Ok(Message::Ping(payload))) => {
                    if let Err(e) = self.ws_stream.send(Message::Pong(payload)).await {
                        return Some(Err(ClientError::Network(e.to_string())));
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "Notification socket closed by server");
                    return None;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Some(Err(ClientError::Network(e.to_string()))),
                None => return None,
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.ws_stream
            .close(None)
            .await
            .map_err(|e| ClientError::Network(format!("Failed to close notification socket: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_url_encodes_token() {
        let config = Config::default()
            .with_api_base_url("https://api.curapets.example/")
            .unwrap();
        assert_eq!(
            notification_url(&config, "a.b+c/d"),
            "wss://api.curapets.example/ws/notifications/?token=a.b%2Bc%2Fd"
        );
    }
}
