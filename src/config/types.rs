use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Service name used in docker-compose.yml for the UI container.
pub const UI_SERVICE: &str = "sourced-ui";
pub const DEFAULT_UI_PORT: u16 = 8088;
pub const DEFAULT_USER: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";
/// Floor for `poll_interval_ms`, so a zero never turns polling into a busy loop.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell-style command line for the orchestration tool, e.g. `docker compose`.
    pub compose_command: String,
    /// Explicit working directory; the active one under the sourced home otherwise.
    pub workdir: Option<String>,
    pub ui_service: String,
    pub ui_port: u16,
    pub ui_user: String,
    pub ui_password: String,
    /// Seconds `web` waits for the UI.
    pub web_timeout: u64,
    /// Seconds `start` waits for the UI after starting the containers.
    pub start_timeout: u64,
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compose_command: "docker-compose".to_string(),
            workdir: None,
            ui_service: UI_SERVICE.to_string(),
            ui_port: DEFAULT_UI_PORT,
            ui_user: DEFAULT_USER.to_string(),
            ui_password: DEFAULT_PASSWORD.to_string(),
            web_timeout: 2,
            start_timeout: 60,
            poll_interval_ms: 1000,
        }
    }
}

impl Config {
    pub fn ui_settings(&self) -> UiSettings {
        UiSettings {
            service: self.ui_service.clone(),
            port: self.ui_port,
            user: self.ui_user.clone(),
            password: self.ui_password.clone(),
            poll_interval: Duration::from_millis(
                self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS),
            ),
            spinner_threshold: UiSettings::SPINNER_THRESHOLD,
        }
    }

    pub fn web_timeout(&self) -> Duration {
        Duration::from_secs(self.web_timeout)
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout)
    }
}

/// Everything the UI opener needs to know about the UI service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiSettings {
    pub service: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub poll_interval: Duration,
    /// The spinner is only shown for timeouts strictly above this.
    pub spinner_threshold: Duration,
}

impl UiSettings {
    pub const SPINNER_THRESHOLD: Duration = Duration::from_secs(5);
}

impl Default for UiSettings {
    fn default() -> Self {
        Config::default().ui_settings()
    }
}
