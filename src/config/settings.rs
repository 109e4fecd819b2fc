use serde::Deserialize;

/// Top-level configuration settings for the hub.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
    pub log: LogSettings,
}

/// Where the hub listens, which path performs the WebSocket upgrade, and how
/// much slack each connection's writer gets.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Frames a connection may have queued before it is dropped as too slow.
    pub queue_capacity: usize,
    pub write_timeout_ms: u64,
}

/// Broker endpoint, the shared channel name and the resubscribe backoff.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BrokerSettings {
    pub url: String,
    pub channel: String,
    pub retry_initial_ms: u64,
    pub retry_max_ms: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
}

impl Settings {
    /// The `host:port` pair handed to the listener.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Partial configuration settings loaded from files or environment.
///
/// Every field is optional; missing values are taken from the defaults in
/// [`PartialSettings::merge`].
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub queue_capacity: Option<usize>,
    pub write_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialBrokerSettings {
    pub url: Option<String>,
    pub channel: Option<String>,
    pub retry_initial_ms: Option<u64>,
    pub retry_max_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl PartialSettings {
    pub fn merge(self, default: Settings) -> Settings {
        let server = self.server.unwrap_or_default();
        let broker = self.broker.unwrap_or_default();
        let log = self.log.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(default.server.host),
                port: server.port.unwrap_or(default.server.port),
                path: server.path.unwrap_or(default.server.path),
                queue_capacity: server
                    .queue_capacity
                    .unwrap_or(default.server.queue_capacity),
                write_timeout_ms: server
                    .write_timeout_ms
                    .unwrap_or(default.server.write_timeout_ms),
            },
            broker: BrokerSettings {
                url: broker.url.unwrap_or(default.broker.url),
                channel: broker.channel.unwrap_or(default.broker.channel),
                retry_initial_ms: broker
                    .retry_initial_ms
                    .unwrap_or(default.broker.retry_initial_ms),
                retry_max_ms: broker.retry_max_ms.unwrap_or(default.broker.retry_max_ms),
            },
            log: LogSettings {
                level: log.level.unwrap_or(default.log.level),
            },
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                path: "/ws".to_string(),
                queue_capacity: 256,
                write_timeout_ms: 10_000,
            },
            broker: BrokerSettings {
                url: "redis://127.0.0.1:6379".to_string(),
                channel: "myChannel".to_string(),
                retry_initial_ms: 500,
                retry_max_ms: 30_000,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}
