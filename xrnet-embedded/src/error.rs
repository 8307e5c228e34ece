use core::fmt;

use crate::provision::SmartConfigStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SysInfoUnavailable,
    InvalidMode(u8),
    NoInterface,
    DriverError,
    DhcpStartFailed,
    SmartConfig(SmartConfigStatus),
    QueueFull,
    UnknownEvent(u16),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SysInfoUnavailable => write!(f, "System info unavailable"),
            Error::InvalidMode(mode) => write!(f, "Invalid wlan mode {}", mode),
            Error::NoInterface => write!(f, "No network interface"),
            Error::DriverError => write!(f, "WLAN driver error"),
            Error::DhcpStartFailed => write!(f, "DHCP start failed"),
            Error::SmartConfig(status) => write!(f, "Smart config failed: {:?}", status),
            Error::QueueFull => write!(f, "Event queue full"),
            Error::UnknownEvent(kind) => write!(f, "Unknown network event {}", kind),
        }
    }
}

impl core::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
