mod memory;

pub use memory::*;

use core::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::network::WlanMode;

/// Address triple applied to an interface when it is not using DHCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetifParam {
    pub ip_addr: Ipv4Addr,
    pub net_mask: Ipv4Addr,
    pub gateway: Ipv4Addr,
}

impl NetifParam {
    pub const fn new(ip_addr: Ipv4Addr, net_mask: Ipv4Addr, gateway: Ipv4Addr) -> Self {
        Self {
            ip_addr,
            net_mask,
            gateway,
        }
    }
}

/// Board-wide network settings, owned by the system and read on every use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysInfo {
    pub wlan_mode: WlanMode,
    pub sta_use_dhcp: bool,
    pub netif_sta_param: NetifParam,
    pub netif_ap_param: NetifParam,
}

impl Default for SysInfo {
    fn default() -> Self {
        Self {
            wlan_mode: WlanMode::Station,
            sta_use_dhcp: true,
            netif_sta_param: NetifParam::new(
                Ipv4Addr::new(192, 168, 51, 100),
                Ipv4Addr::new(255, 255, 255, 0),
                Ipv4Addr::new(192, 168, 51, 1),
            ),
            netif_ap_param: NetifParam::new(
                Ipv4Addr::new(192, 168, 51, 1),
                Ipv4Addr::new(255, 255, 255, 0),
                Ipv4Addr::new(192, 168, 51, 1),
            ),
        }
    }
}

pub trait SysInfoStore {
    fn get(&self) -> Option<&SysInfo>;

    fn get_mut(&mut self) -> Option<&mut SysInfo>;
}
