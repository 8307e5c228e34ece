mod button;
mod events;

pub use button::*;
pub use events::*;

use alloc::string::String;
use alloc::vec::Vec;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

pub const SMART_CONFIG_KEY_LEN: usize = 16;

/// Why a smart config round ended without credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmartConfigStatus {
    Failed,
    Timeout,
    InvalidParam,
    Stopped,
}

/// Credentials decoded by a successful smart config round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartConfigResult {
    pub ssid: Vec<u8>,
    pub passphrase: String,
    /// Echoed back to the sender during the acknowledgment handshake.
    pub random_num: u8,
}

#[allow(async_fn_in_trait)]
pub trait SmartConfig {
    type Error;

    async fn set_key(&mut self, key: &[u8; SMART_CONFIG_KEY_LEN]) -> Result<(), Self::Error>;

    /// Listen for provisioning traffic until credentials arrive or `timeout` elapses.
    async fn start(&mut self, timeout: Duration) -> Result<SmartConfigResult, SmartConfigStatus>;

    async fn ack_start(&mut self, random_num: u8, timeout: Duration) -> Result<(), Self::Error>;

    async fn stop(&mut self) -> Result<(), Self::Error>;
}
