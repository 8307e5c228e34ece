use core::cell::RefCell;
use core::net::Ipv4Addr;

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::sysinfo::NetifParam;

use super::{DhcpState, InterfaceStatus, NetInterface, NetifCallbacks, WlanDriver, WlanMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetifCall {
    SetAddr(NetifParam),
    ClearAddr,
    SetUp,
    SetDown,
    SetLinkUp,
    SetLinkDown,
    DhcpStart,
    DhcpStop,
    DhcpRelease,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Attach,
    Detach,
    CreateInterface(WlanMode),
    DeleteInterface(WlanMode),
    Start(WlanMode),
    Stop,
    StaSet(Vec<u8>, Option<String>),
    StaEnable,
    StaDisable,
    SetIpAddr(Ipv4Addr),
    DhcpServerStart,
    DhcpServerStop,
}

/// Interface double that records every mutating call in a shared log.
pub struct MockNetif {
    pub mode: WlanMode,
    pub up: bool,
    pub link_up: bool,
    pub dhcp: Option<DhcpState>,
    pub address: NetifParam,
    pub fail_dhcp_start: bool,
    pub callbacks: Option<NetifCallbacks>,
    pub calls: Rc<RefCell<Vec<NetifCall>>>,
}

impl MockNetif {
    pub fn new(mode: WlanMode) -> Self {
        Self {
            mode,
            up: false,
            link_up: false,
            dhcp: None,
            address: InterfaceStatus::down().address,
            fail_dhcp_start: false,
            callbacks: None,
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<NetifCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: NetifCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl NetInterface for MockNetif {
    type Error = ();

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
        self.record(NetifCall::SetAddr(*param));
        self.address = *param;
        Ok(())
    }

    async fn clear_addr(&mut self) -> Result<(), Self::Error> {
        self.record(NetifCall::ClearAddr);
        self.address = InterfaceStatus::down().address;
        Ok(())
    }

    async fn set_up(&mut self) -> Result<(), Self::Error> {
        self.record(NetifCall::SetUp);
        self.up = true;
        Ok(())
    }

    async fn set_down(&mut self) -> Result<(), Self::Error> {
        self.record(NetifCall::SetDown);
        self.up = false;
        Ok(())
    }

    async fn set_link_up(&mut self) -> Result<(), Self::Error> {
        self.record(NetifCall::SetLinkUp);
        self.link_up = true;
        Ok(())
    }

    async fn set_link_down(&mut self) -> Result<(), Self::Error> {
        self.record(NetifCall::SetLinkDown);
        self.link_up = false;
        Ok(())
    }

    async fn dhcp_start(&mut self) -> Result<(), Self::Error> {
        self.record(NetifCall::DhcpStart);
        if self.fail_dhcp_start {
            return Err(());
        }
        self.dhcp = Some(DhcpState::Requesting);
        Ok(())
    }

    async fn dhcp_stop(&mut self) -> Result<(), Self::Error> {
        self.record(NetifCall::DhcpStop);
        self.dhcp = Some(DhcpState::Off);
        Ok(())
    }

    async fn dhcp_release(&mut self) -> Result<(), Self::Error> {
        self.record(NetifCall::DhcpRelease);
        self.up = false;
        Ok(())
    }
}

/// Driver double; interfaces it creates share its netif call log.
#[derive(Default)]
pub struct MockWlanDriver {
    pub calls: Rc<RefCell<Vec<DriverCall>>>,
    pub netif_calls: Rc<RefCell<Vec<NetifCall>>>,
    pub fail_create: bool,
    pub fail_stop: bool,
    pub fail_dhcp_server_stop: bool,
}

impl MockWlanDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
        self.netif_calls.borrow_mut().clear();
    }

    fn record(&self, call: DriverCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl WlanDriver for MockWlanDriver {
    type Error = ();
    type Interface = MockNetif;

    async fn attach(&mut self) -> Result<(), Self::Error> {
        self.record(DriverCall::Attach);
        Ok(())
    }

    async fn detach(&mut self) -> Result<(), Self::Error> {
        self.record(DriverCall::Detach);
        Ok(())
    }

    async fn create_interface(&mut self, mode: WlanMode) -> Result<Self::Interface, Self::Error> {
        self.record(DriverCall::CreateInterface(mode));
        if self.fail_create {
            return Err(());
        }
        let mut netif = MockNetif::new(mode);
        netif.calls = self.netif_calls.clone();
        Ok(netif)
    }

    async fn delete_interface(&mut self, interface: Self::Interface) -> Result<(), Self::Error> {
        self.record(DriverCall::DeleteInterface(interface.mode));
        Ok(())
    }

    async fn start(&mut self, interface: &mut Self::Interface) -> Result<(), Self::Error> {
        self.record(DriverCall::Start(interface.mode));
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        self.record(DriverCall::Stop);
        if self.fail_stop {
            return Err(());
        }
        Ok(())
    }

    async fn sta_set(&mut self, ssid: &[u8], passphrase: Option<&str>) -> Result<(), Self::Error> {
        self.record(DriverCall::StaSet(
            ssid.to_vec(),
            passphrase.map(|psk| psk.to_string()),
        ));
        Ok(())
    }

    async fn sta_enable(&mut self) -> Result<(), Self::Error> {
        self.record(DriverCall::StaEnable);
        Ok(())
    }

    async fn sta_disable(&mut self) -> Result<(), Self::Error> {
        self.record(DriverCall::StaDisable);
        Ok(())
    }

    async fn set_ip_addr(&mut self, addr: Ipv4Addr) -> Result<(), Self::Error> {
        self.record(DriverCall::SetIpAddr(addr));
        Ok(())
    }

    async fn dhcp_server_start(&mut self) -> Result<(), Self::Error> {
        self.record(DriverCall::DhcpServerStart);
        Ok(())
    }

    async fn dhcp_server_stop(&mut self) -> Result<(), Self::Error> {
        self.record(DriverCall::DhcpServerStop);
        if self.fail_dhcp_server_stop {
            return Err(());
        }
        Ok(())
    }
}
