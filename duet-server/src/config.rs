use std::env;
use std::net::SocketAddr;
use tracing::warn;

pub const ADDR_ENV: &str = "DUET_ADDR";
pub const HISTORY_LIMIT_ENV: &str = "DUET_HISTORY_LIMIT";
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Chat messages kept per room; older ones are dropped first.
    pub history_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `DUET_ADDR` and `DUET_HISTORY_LIMIT`.
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var(ADDR_ENV) {
            match raw.trim().parse() {
                Ok(addr) => config.addr = addr,
                Err(e) => warn!("Ignoring {}={:?}: {}", ADDR_ENV, raw, e),
            }
        }
        if let Ok(raw) = env::var(HISTORY_LIMIT_ENV) {
            match raw.trim().parse() {
                Ok(limit) => config.history_limit = limit,
                Err(e) => warn!("Ignoring {}={:?}: {}", HISTORY_LIMIT_ENV, raw, e),
            }
        }

        config
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }
}
