use crate::sysinfo::{NetifParam, SysInfo};
use crate::{Error, Result};

use super::{DhcpState, NetInterface, WlanMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    Dhcp,
    Static(NetifParam),
}

/// One bring-up or bring-down request for an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetifConf {
    pub bring_up: bool,
    pub addressing: Addressing,
}

impl NetifConf {
    /// Pick the addressing for the configured WLAN mode. Stations follow their
    /// DHCP flag, access points always use their static parameters and no
    /// other mode carries an IP configuration.
    pub fn from_sysinfo(sysinfo: &SysInfo, bring_up: bool) -> Result<Self> {
        let addressing = match sysinfo.wlan_mode {
            WlanMode::Station if sysinfo.sta_use_dhcp => Addressing::Dhcp,
            WlanMode::Station => Addressing::Static(sysinfo.netif_sta_param),
            WlanMode::HostAp => Addressing::Static(sysinfo.netif_ap_param),
            mode => {
                log::error!("invalid wlan mode {}", mode);
                return Err(Error::InvalidMode(mode.as_raw()));
            }
        };

        Ok(Self {
            bring_up,
            addressing,
        })
    }
}

fn dhcp_started(state: Option<DhcpState>) -> bool {
    matches!(state, Some(state) if state != DhcpState::Off)
}

/// Apply `conf` to `nif`, skipping any step whose outcome already holds.
pub async fn netif_config<I: NetInterface>(nif: &mut I, conf: &NetifConf) -> Result<()> {
    if conf.bring_up {
        if nif.is_up() {
            log::info!("netif is already up");
            return Ok(());
        }

        match conf.addressing {
            Addressing::Dhcp => {
                if dhcp_started(nif.dhcp_state()) {
                    log::info!("DHCP is already started");
                    return Ok(());
                }

                log::info!("start DHCP...");
                nif.dhcp_start().await.map_err(|_| {
                    log::error!("DHCP start failed!");
                    Error::DhcpStartFailed
                })?;
            }
            Addressing::Static(param) => {
                nif.set_addr(&param).await.map_err(|_| Error::DriverError)?;
                nif.set_up().await.map_err(|_| Error::DriverError)?;
            }
        }
    } else {
        match conf.addressing {
            Addressing::Dhcp => {
                // An attached client is torn down even when it reports `Off`.
                if nif.dhcp_state().is_none() {
                    log::info!("DHCP is not started");
                    return Ok(());
                }

                if nif.is_link_up() {
                    log::info!("release DHCP");
                    nif.dhcp_release().await.map_err(|_| Error::DriverError)?;
                } else {
                    log::info!("bring down netif");
                    bring_down(nif).await?;
                }

                log::info!("stop DHCP");
                nif.dhcp_stop().await.map_err(|_| Error::DriverError)?;
            }
            Addressing::Static(_) => {
                if !nif.is_up() {
                    log::info!("netif is already down");
                    return Ok(());
                }

                log::info!("bring down netif");
                bring_down(nif).await?;
            }
        }
    }

    Ok(())
}

async fn bring_down<I: NetInterface>(nif: &mut I) -> Result<()> {
    nif.set_down().await.map_err(|_| Error::DriverError)?;
    nif.clear_addr().await.map_err(|_| Error::DriverError)
}
