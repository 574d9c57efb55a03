// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;

use crate::sinks::UdpMetricSink;
use crate::types::MetricResult;
use crate::{DEFAULT_HOST, DEFAULT_PORT, EPHEMERAL_LIFETIME};

/// Settings for a UDP backed `StatsdClient`.
///
/// Nothing is resolved or bound until the config is turned into a client
/// with `StatsdClient::from_config`.
///
/// # Example
///
/// ```
/// use dogstatsd::{ClientConfig, DEFAULT_PORT};
///
/// let config = ClientConfig::new("", 0)
///     .with_global_tags(vec!["env:prod".to_string()]);
///
/// assert_eq!("localhost", config.host);
/// assert_eq!(DEFAULT_PORT, config.port);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Caller owned socket to send over. Never closed by the client.
    pub shared_socket: Option<Arc<UdpSocket>>,
    /// Tags written first on every metric, in order, without deduplication.
    pub global_tags: Vec<String>,
    /// Idle time after which an ephemeral socket is closed.
    pub ephemeral_lifetime: Duration,
}

impl ClientConfig {
    /// An empty host means `DEFAULT_HOST` and port `0` means `DEFAULT_PORT`.
    pub fn new<H>(host: H, port: u16) -> Self
    where
        H: Into<String>,
    {
        let host = host.into();
        ClientConfig {
            host: if host.is_empty() { DEFAULT_HOST.to_string() } else { host },
            port: if port == 0 { DEFAULT_PORT } else { port },
            ..Default::default()
        }
    }

    pub fn with_shared_socket(self, socket: Arc<UdpSocket>) -> Self {
        Self {
            shared_socket: Some(socket),
            ..self
        }
    }

    pub fn with_global_tags<I, T>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            global_tags: tags.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn with_ephemeral_lifetime(self, lifetime: Duration) -> Self {
        Self {
            ephemeral_lifetime: lifetime,
            ..self
        }
    }

    /// Resolve the host and build the transport described by this config.
    pub(crate) fn build_sink(&self) -> MetricResult<UdpMetricSink> {
        let mut builder = UdpMetricSink::builder((self.host.as_str(), self.port))?
            .ephemeral_lifetime(self.ephemeral_lifetime);

        if let Some(ref socket) = self.shared_socket {
            builder = builder.shared_socket(Arc::clone(socket));
        }

        Ok(builder.build())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            shared_socket: None,
            global_tags: Vec::new(),
            ephemeral_lifetime: EPHEMERAL_LIFETIME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClientConfig;
    use crate::{DEFAULT_HOST, DEFAULT_PORT, EPHEMERAL_LIFETIME};
    use std::net::UdpSocket;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(DEFAULT_HOST, config.host);
        assert_eq!(DEFAULT_PORT, config.port);
        assert!(config.shared_socket.is_none());
        assert!(config.global_tags.is_empty());
        assert_eq!(EPHEMERAL_LIFETIME, config.ephemeral_lifetime);
    }

    #[test]
    fn test_client_config_new_falls_back_to_defaults() {
        let config = ClientConfig::new("", 0);
        assert_eq!("localhost", config.host);
        assert_eq!(8125, config.port);
    }

    #[test]
    fn test_client_config_new_keeps_explicit_values() {
        let config = ClientConfig::new("metrics.example.com", 9125);
        assert_eq!("metrics.example.com", config.host);
        assert_eq!(9125, config.port);
    }

    #[test]
    fn test_client_config_with_methods() {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").unwrap());
        let config = ClientConfig::new("127.0.0.1", 8125)
            .with_shared_socket(Arc::clone(&socket))
            .with_global_tags(["env:prod", "canary"])
            .with_ephemeral_lifetime(Duration::from_millis(10));

        assert!(config.shared_socket.is_some());
        assert_eq!(vec!["env:prod", "canary"], config.global_tags);
        assert_eq!(Duration::from_millis(10), config.ephemeral_lifetime);
    }

    #[test]
    fn test_client_config_build_sink_shared() {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").unwrap());
        let config = ClientConfig::new("127.0.0.1", 8125).with_shared_socket(Arc::clone(&socket));
        let sink = config.build_sink().unwrap();

        assert!(sink.has_shared_socket());
        assert_eq!(8125, sink.addr().port());
    }
}
