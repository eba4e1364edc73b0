use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use sward_navigation::MissionPlan;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "SWARD";

/// Runner settings, see `config/default.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub control: ControlConfig,
    pub drive: DriveConfig,
    pub mission: MissionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Navigation tick rate (Hz).
    pub nav_rate_hz: u32,
    /// Drive thread period (µs).
    pub drive_period_us: u64,
    /// Longest accepted gap between applied drive commands (ms).
    pub watchdog_timeout_ms: u64,
    /// Simulated mission time limit (s).
    pub time_limit_s: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            nav_rate_hz: 20,
            drive_period_us: 10_000,
            watchdog_timeout_ms: 250,
            time_limit_s: 900,
        }
    }
}

impl ControlConfig {
    pub fn nav_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.nav_rate_hz.max(1)))
    }

    pub fn drive_period(&self) -> Duration {
        Duration::from_micros(self.drive_period_us)
    }

    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_millis(self.watchdog_timeout_ms)
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_s)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Cruise speed on the mow path (m/s).
    pub mow_speed: f32,
    /// Speed for slow legs and final approaches (m/s).
    pub slow_speed: f32,
    /// Speed when the next leg continues straight on (m/s).
    pub straight_speed: f32,
    /// Turn rate limit (rad/s).
    pub max_angular_speed: f32,
    /// Proportional gain on heading error.
    pub angular_gain: f32,
    /// A target counts as reached within this distance (m).
    pub target_tolerance: f32,
    /// Distance between the drive wheels (m).
    pub wheel_base: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            mow_speed: 0.3,
            slow_speed: 0.1,
            straight_speed: 0.5,
            max_angular_speed: 1.5,
            angular_gain: 2.0,
            target_tolerance: 0.1,
            wheel_base: 0.4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Mission plan TOML file.
    pub plan_path: String,
    /// Head for the dock once the mow path is done.
    pub dock_after_mow: bool,
    /// Fraction of the mow path already done, 0.0..=1.0.
    pub resume_progress: f32,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            plan_path: "missions/demo.toml".into(),
            dock_after_mow: true,
            resume_progress: 0.0,
        }
    }
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .and_then(|config| config.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

/// Reads a mission plan (perimeter, exclusions, dock and mow paths) from TOML.
pub fn load_mission(path: &str) -> Result<MissionPlan, ConfigError> {
    info!("Loading mission plan from {}", path);
    Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .build()?
        .try_deserialize()
}
