use std::error::Error;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::{Deserialize, Serialize};
use xrnet_embedded::{NetifParam, SmartConfigStatus, SysInfo};

pub const CONFIG_ENV: &str = "XRNET_MOCK_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    /// Wall-clock run time before the button monitor is stopped.
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    /// Address handed out by the simulated DHCP client once bound.
    pub dhcp_lease: NetifParam,
    /// Networks the simulated driver can associate with.
    pub known_ssids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Press {
    pub at_ms: u64,
    pub hold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Button {
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    pub presses: Vec<Press>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Outcome {
    Credentials {
        ssid: String,
        passphrase: String,
        random_num: u8,
    },
    Failure {
        status: SmartConfigStatus,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartConfig {
    pub key: String,
    /// How long the simulated listener takes to decode credentials.
    pub listen_ms: u64,
    pub timeout_ms: u64,
    pub ack_timeout_ms: u64,
    pub fail_ack: bool,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub simulation: Simulation,
    pub sysinfo: SysInfo,
    pub network: Network,
    pub button: Button,
    pub smart_config: SmartConfig,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            let path = Self::normalize_path(&path)?;
            return Ok(toml::from_str(&fs::read_to_string(path)?)?);
        }

        Ok(toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/default.toml"
        )))?)
    }

    fn normalize_path(path: &str) -> io::Result<PathBuf> {
        let path_buf = PathBuf::from(path);

        Ok(if path_buf.is_absolute() {
            path_buf
        } else {
            env::current_dir()?.join(path_buf)
        })
    }
}
