mod callbacks;
mod controller;
mod event;
#[cfg(test)]
pub(crate) mod mock;
mod netif;

pub use callbacks::*;
pub use controller::*;
pub use event::*;
pub use netif::*;

use core::fmt;
use core::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::sysinfo::NetifParam;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WlanMode {
    Station,
    HostAp,
    Monitor,
}

impl WlanMode {
    pub const fn as_raw(self) -> u8 {
        match self {
            WlanMode::Station => 0,
            WlanMode::HostAp => 1,
            WlanMode::Monitor => 2,
        }
    }
}

impl TryFrom<u8> for WlanMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WlanMode::Station),
            1 => Ok(WlanMode::HostAp),
            2 => Ok(WlanMode::Monitor),
            other => Err(Error::InvalidMode(other)),
        }
    }
}

impl fmt::Display for WlanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WlanMode::Station => write!(f, "sta"),
            WlanMode::HostAp => write!(f, "hostap"),
            WlanMode::Monitor => write!(f, "monitor"),
        }
    }
}

/// DHCP client states as reported by the TCP/IP stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhcpState {
    Off,
    Requesting,
    Init,
    Rebooting,
    Rebinding,
    Renewing,
    Selecting,
    Informing,
    Checking,
    Permanent,
    Bound,
    BackingOff,
}

/// Snapshot of an interface handed to the link/status callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceStatus {
    pub up: bool,
    pub link_up: bool,
    pub address: NetifParam,
}

impl InterfaceStatus {
    pub fn down() -> Self {
        Self {
            up: false,
            link_up: false,
            address: NetifParam::new(
                Ipv4Addr::UNSPECIFIED,
                Ipv4Addr::UNSPECIFIED,
                Ipv4Addr::UNSPECIFIED,
            ),
        }
    }
}

/// TCP/IP stack view of the WLAN network interface.
///
/// Implementations are responsible for marshalling calls onto the stack's own
/// thread where the stack requires it.
#[allow(async_fn_in_trait)]
pub trait NetInterface {
    type Error;

    /// Mode the driver created this interface for.
    fn mode(&self) -> WlanMode;

    fn is_up(&self) -> bool;

    fn is_link_up(&self) -> bool;

    /// `None` when no DHCP client has been attached to the interface.
    fn dhcp_state(&self) -> Option<DhcpState>;

    fn address(&self) -> NetifParam;

    fn set_callbacks(&mut self, callbacks: NetifCallbacks);

    async fn set_addr(&mut self, param: &NetifParam) -> Result<(), Self::Error>;

    async fn clear_addr(&mut self) -> Result<(), Self::Error>;

    async fn set_up(&mut self) -> Result<(), Self::Error>;

    async fn set_down(&mut self) -> Result<(), Self::Error>;

    async fn set_link_up(&mut self) -> Result<(), Self::Error>;

    async fn set_link_down(&mut self) -> Result<(), Self::Error>;

    async fn dhcp_start(&mut self) -> Result<(), Self::Error>;

    async fn dhcp_stop(&mut self) -> Result<(), Self::Error>;

    async fn dhcp_release(&mut self) -> Result<(), Self::Error>;
}

/// Vendor WLAN driver together with the board's DHCP server.
#[allow(async_fn_in_trait)]
pub trait WlanDriver {
    type Error;
    type Interface: NetInterface;

    async fn attach(&mut self) -> Result<(), Self::Error>;

    async fn detach(&mut self) -> Result<(), Self::Error>;

    async fn create_interface(&mut self, mode: WlanMode) -> Result<Self::Interface, Self::Error>;

    async fn delete_interface(&mut self, interface: Self::Interface) -> Result<(), Self::Error>;

    async fn start(&mut self, interface: &mut Self::Interface) -> Result<(), Self::Error>;

    async fn stop(&mut self) -> Result<(), Self::Error>;

    /// Set station credentials; `None` joins an open network.
    async fn sta_set(&mut self, ssid: &[u8], passphrase: Option<&str>) -> Result<(), Self::Error>;

    async fn sta_enable(&mut self) -> Result<(), Self::Error>;

    async fn sta_disable(&mut self) -> Result<(), Self::Error>;

    /// Tell the driver which address the station obtained.
    async fn set_ip_addr(&mut self, addr: Ipv4Addr) -> Result<(), Self::Error>;

    async fn dhcp_server_start(&mut self) -> Result<(), Self::Error>;

    async fn dhcp_server_stop(&mut self) -> Result<(), Self::Error>;
}
