use std::time::Duration;

use serde::Deserialize;
use pushwire_core::error::{PushError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    pub endpoint: EndpointSection,

    #[serde(default)]
    pub timing: TimingSection,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PushError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.endpoint.validate()?;
        self.timing.validate()?;

        Ok(())
    }
}

/// Which connector deployment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Production,
    Demo,
}

impl Environment {
    pub fn host(self) -> &'static str {
        match self {
            Environment::Production => "www.mews.li",
            Environment::Demo => "demo.mews.li",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSection {
    #[serde(default)]
    pub environment: Environment,

    /// Overrides the environment host when set.
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_path")]
    pub path: String,

    pub client_token: String,
    pub access_token: String,
}

impl EndpointSection {
    pub fn validate(&self) -> Result<()> {
        if self.client_token.trim().is_empty() {
            return Err(PushError::Config("endpoint.client_token must not be empty".into()));
        }
        if self.access_token.trim().is_empty() {
            return Err(PushError::Config("endpoint.access_token must not be empty".into()));
        }
        if matches!(&self.host, Some(h) if h.trim().is_empty()) {
            return Err(PushError::Config("endpoint.host must not be empty when set".into()));
        }
        if !self.path.starts_with('/') {
            return Err(PushError::Config("endpoint.path must start with '/'".into()));
        }
        Ok(())
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(self.environment.host())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingSection {
    /// Peer-liveness window; re-armed by every pong.
    #[serde(default = "default_pong_wait_ms")]
    pub pong_wait_ms: u64,

    /// Keepalive period. Defaults to 9/10 of `pong_wait_ms`.
    #[serde(default)]
    pub ping_period_ms: Option<u64>,

    #[serde(default = "default_write_wait_ms")]
    pub write_wait_ms: u64,

    #[serde(default = "default_close_grace_ms")]
    pub close_grace_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            pong_wait_ms: default_pong_wait_ms(),
            ping_period_ms: None,
            write_wait_ms: default_write_wait_ms(),
            close_grace_ms: default_close_grace_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl TimingSection {
    pub fn validate(&self) -> Result<()> {
        let nonzero = [
            ("timing.pong_wait_ms", self.pong_wait_ms),
            ("timing.ping_period_ms", self.ping_period_ms()),
            ("timing.write_wait_ms", self.write_wait_ms),
            ("timing.close_grace_ms", self.close_grace_ms),
            ("timing.connect_timeout_ms", self.connect_timeout_ms),
        ];
        for (name, v) in nonzero {
            if v == 0 {
                return Err(PushError::Config(format!("{name} must be greater than 0")));
            }
        }
        if self.ping_period_ms() >= self.pong_wait_ms {
            return Err(PushError::Config(
                "timing.ping_period_ms must be less than pong_wait_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn ping_period_ms(&self) -> u64 {
        self.ping_period_ms
            .unwrap_or(self.pong_wait_ms.saturating_mul(9) / 10)
    }

    pub fn pong_wait(&self) -> Duration {
        Duration::from_millis(self.pong_wait_ms)
    }
    pub fn ping_period(&self) -> Duration {
        Duration::from_millis(self.ping_period_ms())
    }
    pub fn write_wait(&self) -> Duration {
        Duration::from_millis(self.write_wait_ms)
    }
    pub fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_path() -> String {
    "/ws/connector".into()
}
fn default_pong_wait_ms() -> u64 {
    60000
}
fn default_write_wait_ms() -> u64 {
    10000
}
fn default_close_grace_ms() -> u64 {
    10000
}
fn default_connect_timeout_ms() -> u64 {
    10000
}
