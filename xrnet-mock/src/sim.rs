use std::convert::Infallible;
use std::fmt;
use std::net::Ipv4Addr;

use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::{ErrorType, InputPin};
use xrnet_embedded::{
    DhcpState, InterfaceStatus, NetEvent, NetEventQueue, NetInterface, NetifCallbacks, NetifParam,
    SMART_CONFIG_KEY_LEN, SmartConfig, SmartConfigResult, SmartConfigStatus, WlanDriver, WlanMode,
    net_ctrl_msg_post,
};

use crate::settings::{Outcome, Press};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    NotAttached,
    NoCredentials,
    NotStation,
    AckTimeout,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NotAttached => write!(f, "Driver not attached"),
            SimError::NoCredentials => write!(f, "No station credentials"),
            SimError::NotStation => write!(f, "Station mode not started"),
            SimError::AckTimeout => write!(f, "Smart config ack timed out"),
        }
    }
}

impl std::error::Error for SimError {}

/// Interface whose DHCP client binds as soon as it is started.
pub struct SimNetif {
    mode: WlanMode,
    up: bool,
    link_up: bool,
    dhcp: Option<DhcpState>,
    address: NetifParam,
    lease: NetifParam,
    callbacks: Option<NetifCallbacks>,
}

impl SimNetif {
    fn new(mode: WlanMode, lease: NetifParam) -> Self {
        Self {
            mode,
            up: false,
            link_up: false,
            dhcp: None,
            address: InterfaceStatus::down().address,
            lease,
            callbacks: None,
        }
    }

    fn status(&self) -> InterfaceStatus {
        InterfaceStatus {
            up: self.up,
            link_up: self.link_up,
            address: self.address,
        }
    }

    fn notify_status(&self) {
        if let Some(callbacks) = &self.callbacks {
            callbacks.status_changed(&self.status());
        }
    }

    fn notify_link(&self) {
        if let Some(callbacks) = &self.callbacks {
            callbacks.link_changed(&self.status());
        }
    }
}

impl NetInterface for SimNetif {
    type Error = Infallible;

    fn mode(&self) -> WlanMode {
        self.mode
    }

    fn is_up(&self) -> bool {
        self.up
    }

    fn is_link_up(&self) -> bool {
        self.link_up
    }

    fn dhcp_state(&self) -> Option<DhcpState> {
        self.dhcp
    }

    fn address(&self) -> NetifParam {
        self.address
    }

    fn set_callbacks(&mut self, callbacks: NetifCallbacks) {
        self.callbacks = Some(callbacks);
    }

    async fn set_addr(&mut self, param: &NetifParam) -> Result<(), Self::Error> {
        self.address = *param;
        Ok(())
    }

    async fn clear_addr(&mut self) -> Result<(), Self::Error> {
        self.address = InterfaceStatus::down().address;
        Ok(())
    }

    async fn set_up(&mut self) -> Result<(), Self::Error> {
        self.up = true;
        self.notify_status();
        Ok(())
    }

    async fn set_down(&mut self) -> Result<(), Self::Error> {
        self.up = false;
        self.notify_status();
        Ok(())
    }

    async fn set_link_up(&mut self) -> Result<(), Self::Error> {
        self.link_up = true;
        self.notify_link();
        Ok(())
    }

    async fn set_link_down(&mut self) -> Result<(), Self::Error> {
        self.link_up = false;
        self.notify_link();
        Ok(())
    }

    async fn dhcp_start(&mut self) -> Result<(), Self::Error> {
        self.dhcp = Some(DhcpState::Bound);
        self.address = self.lease;
        self.up = true;
        tracing::debug!("dhcp bound {}", self.lease.ip_addr);
        self.notify_status();
        Ok(())
    }

    async fn dhcp_stop(&mut self) -> Result<(), Self::Error> {
        self.dhcp = Some(DhcpState::Off);
        Ok(())
    }

    async fn dhcp_release(&mut self) -> Result<(), Self::Error> {
        self.up = false;
        self.address = InterfaceStatus::down().address;
        self.notify_status();
        Ok(())
    }
}

/// Driver that reports association results through the network event queue.
pub struct SimWlanDriver {
    events: &'static NetEventQueue,
    lease: NetifParam,
    known_ssids: Vec<String>,
    attached: bool,
    mode: Option<WlanMode>,
    ssid: Option<Vec<u8>>,
    associated: bool,
    station_addr: Option<Ipv4Addr>,
    dhcp_server_running: bool,
}

impl SimWlanDriver {
    pub fn new(events: &'static NetEventQueue, lease: NetifParam, known_ssids: Vec<String>) -> Self {
        Self {
            events,
            lease,
            known_ssids,
            attached: false,
            mode: None,
            ssid: None,
            associated: false,
            station_addr: None,
            dhcp_server_running: false,
        }
    }

    pub fn station_addr(&self) -> Option<Ipv4Addr> {
        self.station_addr
    }

    pub fn dhcp_server_running(&self) -> bool {
        self.dhcp_server_running
    }

    fn post(&self, event: NetEvent) {
        // A full queue is already logged by the post.
        let _ = net_ctrl_msg_post(self.events, event, 0);
    }
}

impl WlanDriver for SimWlanDriver {
    type Error = SimError;
    type Interface = SimNetif;

    async fn attach(&mut self) -> Result<(), Self::Error> {
        self.attached = true;
        Ok(())
    }

    async fn detach(&mut self) -> Result<(), Self::Error> {
        self.attached = false;
        Ok(())
    }

    async fn create_interface(&mut self, mode: WlanMode) -> Result<Self::Interface, Self::Error> {
        if !self.attached {
            return Err(SimError::NotAttached);
        }
        Ok(SimNetif::new(mode, self.lease))
    }

    async fn delete_interface(&mut self, interface: Self::Interface) -> Result<(), Self::Error> {
        if let Some(callbacks) = &interface.callbacks {
            callbacks.removed();
        }
        Ok(())
    }

    async fn start(&mut self, interface: &mut Self::Interface) -> Result<(), Self::Error> {
        tracing::info!("wlan driver started in {} mode", interface.mode);
        self.mode = Some(interface.mode);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        self.mode = None;
        self.associated = false;
        Ok(())
    }

    async fn sta_set(&mut self, ssid: &[u8], passphrase: Option<&str>) -> Result<(), Self::Error> {
        tracing::info!(
            "station credentials set for {} ({})",
            String::from_utf8_lossy(ssid),
            if passphrase.is_some() { "secured" } else { "open" }
        );
        self.ssid = Some(ssid.to_vec());
        Ok(())
    }

    async fn sta_enable(&mut self) -> Result<(), Self::Error> {
        if self.mode != Some(WlanMode::Station) {
            return Err(SimError::NotStation);
        }
        let ssid = self.ssid.as_deref().ok_or(SimError::NoCredentials)?;

        if self.known_ssids.iter().any(|known| known.as_bytes() == ssid) {
            self.associated = true;
            self.post(NetEvent::WlanConnected);
        } else {
            self.post(NetEvent::WlanConnectFailed);
        }
        Ok(())
    }

    async fn sta_disable(&mut self) -> Result<(), Self::Error> {
        if self.associated {
            self.associated = false;
            self.post(NetEvent::WlanDisconnected);
        }
        Ok(())
    }

    async fn set_ip_addr(&mut self, addr: Ipv4Addr) -> Result<(), Self::Error> {
        tracing::info!("station address {}", addr);
        self.station_addr = Some(addr);
        Ok(())
    }

    async fn dhcp_server_start(&mut self) -> Result<(), Self::Error> {
        tracing::info!("dhcp server started");
        self.dhcp_server_running = true;
        Ok(())
    }

    async fn dhcp_server_stop(&mut self) -> Result<(), Self::Error> {
        tracing::info!("dhcp server stopped");
        self.dhcp_server_running = false;
        Ok(())
    }
}

/// Button that reads low during each scheduled press.
pub struct SimPin {
    started: Instant,
    presses: Vec<Press>,
}

impl SimPin {
    pub fn new(presses: Vec<Press>) -> Self {
        Self {
            started: Instant::now(),
            presses,
        }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        let elapsed = self.started.elapsed().as_millis();
        Ok(self
            .presses
            .iter()
            .any(|press| elapsed >= press.at_ms && elapsed < press.at_ms + press.hold_ms))
    }
}

pub struct SimSmartConfig {
    listen: Duration,
    outcome: Outcome,
    fail_ack: bool,
    key: Option<[u8; SMART_CONFIG_KEY_LEN]>,
}

impl SimSmartConfig {
    pub fn new(listen: Duration, outcome: Outcome, fail_ack: bool) -> Self {
        Self {
            listen,
            outcome,
            fail_ack,
            key: None,
        }
    }
}

impl SmartConfig for SimSmartConfig {
    type Error = SimError;

    async fn set_key(&mut self, key: &[u8; SMART_CONFIG_KEY_LEN]) -> Result<(), Self::Error> {
        self.key = Some(*key);
        Ok(())
    }

    async fn start(&mut self, timeout: Duration) -> Result<SmartConfigResult, SmartConfigStatus> {
        if self.key.is_none() {
            return Err(SmartConfigStatus::InvalidParam);
        }

        tracing::info!("smart config listening");
        if self.listen > timeout {
            Timer::after(timeout).await;
            return Err(SmartConfigStatus::Timeout);
        }
        Timer::after(self.listen).await;

        match &self.outcome {
            Outcome::Credentials {
                ssid,
                passphrase,
                random_num,
            } => Ok(SmartConfigResult {
                ssid: ssid.as_bytes().to_vec(),
                passphrase: passphrase.clone(),
                random_num: *random_num,
            }),
            Outcome::Failure { status } => Err(*status),
        }
    }

    async fn ack_start(&mut self, random_num: u8, _timeout: Duration) -> Result<(), Self::Error> {
        if self.fail_ack {
            return Err(SimError::AckTimeout);
        }
        tracing::info!("smart config ack sent ({})", random_num);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        tracing::info!("smart config stopped");
        self.key = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lease() -> NetifParam {
        NetifParam::new(
            Ipv4Addr::new(192, 168, 1, 57),
            Ipv4Addr::new(255, 255, 255, 0),
            Ipv4Addr::new(192, 168, 1, 1),
        )
    }

    fn leak_queue() -> &'static NetEventQueue {
        Box::leak(Box::new(NetEventQueue::new()))
    }

    #[tokio::test]
    async fn test_known_network_reports_connected() {
        let queue = leak_queue();
        let mut driver = SimWlanDriver::new(queue, lease(), vec!["HomeWiFi".to_string()]);
        driver.attach().await.unwrap();
        let mut nif = driver.create_interface(WlanMode::Station).await.unwrap();
        driver.start(&mut nif).await.unwrap();

        assert_eq!(driver.sta_enable().await, Err(SimError::NoCredentials));

        driver.sta_set(b"HomeWiFi", Some("secret123")).await.unwrap();
        driver.sta_enable().await.unwrap();
        assert_eq!(
            queue.try_receive().map(|message| message.event).ok(),
            Some(NetEvent::WlanConnected)
        );

        driver.sta_disable().await.unwrap();
        assert_eq!(
            queue.try_receive().map(|message| message.event).ok(),
            Some(NetEvent::WlanDisconnected)
        );
    }

    #[tokio::test]
    async fn test_unknown_network_reports_failure() {
        let queue = leak_queue();
        let mut driver = SimWlanDriver::new(queue, lease(), vec!["HomeWiFi".to_string()]);
        driver.attach().await.unwrap();
        let mut nif = driver.create_interface(WlanMode::Station).await.unwrap();
        driver.start(&mut nif).await.unwrap();

        driver.sta_set(b"Neighbour", None).await.unwrap();
        driver.sta_enable().await.unwrap();

        assert_eq!(
            queue.try_receive().map(|message| message.event).ok(),
            Some(NetEvent::WlanConnectFailed)
        );
    }

    #[tokio::test]
    async fn test_dhcp_binding_reports_network_up() {
        let queue = leak_queue();
        let mut nif = SimNetif::new(WlanMode::Station, lease());
        nif.set_callbacks(NetifCallbacks::new(queue));

        nif.dhcp_start().await.unwrap();

        assert!(nif.is_up());
        assert_eq!(nif.dhcp_state(), Some(DhcpState::Bound));
        assert_eq!(nif.address(), lease());
        assert_eq!(
            queue.try_receive().map(|message| message.event).ok(),
            Some(NetEvent::NetworkUp)
        );
    }

    #[tokio::test]
    async fn test_smart_config_times_out() {
        let mut smart_config = SimSmartConfig::new(
            Duration::from_millis(50),
            Outcome::Failure {
                status: SmartConfigStatus::Failed,
            },
            false,
        );

        assert_eq!(
            smart_config.start(Duration::from_millis(5)).await,
            Err(SmartConfigStatus::InvalidParam)
        );

        smart_config.set_key(b"1234567812345678").await.unwrap();
        assert_eq!(
            smart_config.start(Duration::from_millis(5)).await,
            Err(SmartConfigStatus::Timeout)
        );
        assert_eq!(
            smart_config.start(Duration::from_millis(100)).await,
            Err(SmartConfigStatus::Failed)
        );
    }

    #[test]
    fn test_pin_reads_low_during_press() {
        let mut pin = SimPin::new(vec![Press {
            at_ms: 0,
            hold_ms: 60_000,
        }]);
        assert!(pin.is_low().unwrap());

        let mut idle = SimPin::new(Vec::new());
        assert!(idle.is_high().unwrap());
    }
}
