use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

use crate::sysinfo::SysInfoStore;
use crate::{Error, Result};

use super::{
    DhcpState, NetEvent, NetEventQueue, NetInterface, NetMessage, NetifCallbacks, NetifConf,
    WlanDriver, WlanMode, netif_config,
};

/// Controller shared between the event loop and the provisioning task.
pub type SharedNetController<D, S> = Mutex<CriticalSectionRawMutex, NetController<D, S>>;

/// Bring the interface up or down according to the system info.
pub async fn net_config<I, S>(nif: &mut I, sysinfo: &S, bring_up: bool) -> Result<()>
where
    I: NetInterface,
    S: SysInfoStore,
{
    let Some(info) = sysinfo.get() else {
        log::error!("failed to get sysinfo");
        return Err(Error::SysInfoUnavailable);
    };

    let conf = NetifConf::from_sysinfo(info, bring_up)?;
    netif_config(nif, &conf).await
}

pub struct NetController<D: WlanDriver, S: SysInfoStore> {
    driver: D,
    sysinfo: S,
    events: &'static NetEventQueue,
    interface: Option<D::Interface>,
}

impl<D: WlanDriver, S: SysInfoStore> NetController<D, S> {
    pub fn new(driver: D, sysinfo: S, events: &'static NetEventQueue) -> Self {
        Self {
            driver,
            sysinfo,
            events,
            interface: None,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn sysinfo(&self) -> &S {
        &self.sysinfo
    }

    pub fn sysinfo_mut(&mut self) -> &mut S {
        &mut self.sysinfo
    }

    pub fn interface(&self) -> Option<&D::Interface> {
        self.interface.as_ref()
    }

    pub fn interface_mut(&mut self) -> Option<&mut D::Interface> {
        self.interface.as_mut()
    }

    /// Mode of the current interface, `None` while the subsystem is stopped.
    pub fn mode(&self) -> Option<WlanMode> {
        self.interface.as_ref().map(|nif| nif.mode())
    }

    pub fn is_network_up(&self) -> bool {
        self.interface
            .as_ref()
            .is_some_and(|nif| nif.is_up() && nif.is_link_up())
    }

    pub async fn configure(&mut self, bring_up: bool) -> Result<()> {
        let nif = self.interface.as_mut().ok_or(Error::NoInterface)?;
        net_config(nif, &self.sysinfo, bring_up).await
    }

    pub async fn open(&mut self, mode: WlanMode) -> Result<D::Interface> {
        log::debug!("open netif, mode {}", mode);

        self.driver.attach().await.map_err(|_| Error::DriverError)?;
        let mut nif = self
            .driver
            .create_interface(mode)
            .await
            .map_err(|_| Error::DriverError)?;
        nif.set_callbacks(NetifCallbacks::new(self.events));
        self.driver
            .start(&mut nif)
            .await
            .map_err(|_| Error::DriverError)?;

        if let Some(info) = self.sysinfo.get_mut() {
            info.wlan_mode = mode;
        }

        Ok(nif)
    }

    /// Hand the interface back to the driver. Every teardown step runs even
    /// when an earlier one fails; the first failure is returned.
    pub async fn close(&mut self, nif: D::Interface) -> Result<()> {
        log::debug!("close netif, mode {}", nif.mode());

        let mut result = Ok(());

        if self.driver.stop().await.is_err() {
            log::error!("wlan stop failed");
            result = Err(Error::DriverError);
        }
        if self.driver.delete_interface(nif).await.is_err() {
            log::error!("wlan interface delete failed");
            result = result.and(Err(Error::DriverError));
        }
        if self.driver.detach().await.is_err() {
            log::error!("wlan detach failed");
            result = result.and(Err(Error::DriverError));
        }

        result
    }

    pub async fn sys_start(&mut self, mode: WlanMode) -> Result<()> {
        if self.interface.is_some() {
            log::warn!("network subsystem already started");
            return Ok(());
        }

        let nif = self.open(mode).await?;
        self.interface = Some(nif);
        Ok(())
    }

    pub async fn sys_stop(&mut self) -> Result<()> {
        let Some(nif) = self.interface.take() else {
            return Ok(());
        };

        let mut result = Ok(());
        if nif.mode() == WlanMode::HostAp && self.driver.dhcp_server_stop().await.is_err() {
            log::error!("dhcp server stop failed");
            result = Err(Error::DriverError);
        }

        let closed = self.close(nif).await;
        result.and(closed)
    }

    pub async fn switch_mode(&mut self, mode: WlanMode) -> Result<()> {
        let Some(cur_mode) = self.mode() else {
            return self.sys_start(mode).await;
        };

        log::debug!("switch wlan mode {} --> {}", cur_mode, mode);

        if mode == cur_mode {
            log::info!("no need to switch wlan mode {}", cur_mode);
            return Ok(());
        }

        if self.interface.as_ref().is_some_and(|nif| nif.is_up()) {
            if let Err(err) = self.configure(false).await {
                log::warn!("bring down netif failed: {}", err);
            }
        }

        let link_up = self.interface.as_ref().is_some_and(|nif| nif.is_link_up());
        if cur_mode == WlanMode::Station && link_up {
            self.driver
                .sta_disable()
                .await
                .map_err(|_| Error::DriverError)?;
        }

        match mode {
            WlanMode::HostAp => self.restart(mode).await,
            WlanMode::Station | WlanMode::Monitor if cur_mode == WlanMode::HostAp => {
                self.restart(mode).await
            }
            WlanMode::Station | WlanMode::Monitor => {
                if let Some(nif) = self.interface.take() {
                    self.close(nif).await?;
                }
                let nif = self.open(mode).await?;
                self.interface = Some(nif);
                Ok(())
            }
        }
    }

    async fn restart(&mut self, mode: WlanMode) -> Result<()> {
        self.sys_stop().await?;
        self.sys_start(mode).await
    }

    pub async fn connect_station(&mut self, ssid: &[u8], passphrase: Option<&str>) -> Result<()> {
        self.driver
            .sta_set(ssid, passphrase)
            .await
            .map_err(|_| Error::DriverError)?;
        self.driver.sta_enable().await.map_err(|_| Error::DriverError)
    }

    pub async fn event_process(&mut self, message: NetMessage) {
        log::info!("msg <{}>", message.event);

        match message.event {
            NetEvent::WlanConnected => {
                let Some(nif) = self.interface.as_mut() else {
                    return;
                };
                if nif.set_link_up().await.is_err() {
                    log::error!("set link up failed");
                }
                if let Err(err) = self.configure(true).await {
                    log::error!("bring up network failed: {}", err);
                }
            }
            NetEvent::WlanDisconnected => {
                let Some(nif) = self.interface.as_mut() else {
                    return;
                };
                if nif.set_link_down().await.is_err() {
                    log::error!("set link down failed");
                }

                let dhcp_pending = matches!(
                    nif.dhcp_state(),
                    Some(state) if state != DhcpState::Off && state != DhcpState::Bound
                );
                if dhcp_pending {
                    if let Err(err) = self.configure(false).await {
                        log::error!("bring down network failed: {}", err);
                    }
                }
            }
            NetEvent::WlanScanSuccess
            | NetEvent::WlanScanFailed
            | NetEvent::Wlan4WayHandshakeFailed
            | NetEvent::WlanConnectFailed
            | NetEvent::NetworkDown => {}
            NetEvent::NetworkUp => {
                let Some(nif) = self.interface.as_ref() else {
                    return;
                };

                let result = match nif.mode() {
                    WlanMode::Station => {
                        let addr = nif.address().ip_addr;
                        self.driver.set_ip_addr(addr).await
                    }
                    WlanMode::HostAp => self.driver.dhcp_server_start().await,
                    mode => {
                        log::error!("Invalid wlan mode {}", mode);
                        Ok(())
                    }
                };

                if result.is_err() {
                    log::error!("network up handling failed");
                }
            }
        }
    }

    /// Dispatch a raw `(type, data)` pair from the system event bus.
    pub async fn event_process_raw(&mut self, kind: u16, data: u32) {
        match NetEvent::try_from(kind) {
            Ok(event) => self.event_process(NetMessage::new(event, data)).await,
            Err(_) => log::warn!("unknown msg ({}, {})", kind, data),
        }
    }
}

/// Consume the network event queue forever.
pub async fn run_event_loop<D, S>(controller: &SharedNetController<D, S>, queue: &NetEventQueue) -> !
where
    D: WlanDriver,
    S: SysInfoStore,
{
    loop {
        let message = queue.receive().await;
        controller.lock().await.event_process(message).await;
    }
}
