use duet_core::IceServerConfig;
use duet_core::utils::DEFAULT_STUN_ADDR;
use std::env;
use std::time::Duration;

pub const SERVER_URL_ENV: &str = "DUET_SERVER_URL";
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:5000/ws";

#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    /// 0 retries forever.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            max_attempts: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub ice_servers: Vec<IceServerConfig>,
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults, with the server address taken from `DUET_SERVER_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                config.server_url = url.trim().to_owned();
            }
        }
        config
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<IceServerConfig>) -> Self {
        self.ice_servers = ice_servers;
        self
    }
}
