use super::event::{NetEvent, NetEventQueue, net_ctrl_msg_post};
use super::InterfaceStatus;

/// Link, status and remove hooks the controller wires into every interface it
/// opens. The stack invokes them whenever the interface changes.
#[derive(Clone, Copy)]
pub struct NetifCallbacks {
    events: &'static NetEventQueue,
}

impl NetifCallbacks {
    pub fn new(events: &'static NetEventQueue) -> Self {
        Self { events }
    }

    pub fn link_changed(&self, status: &InterfaceStatus) {
        if status.link_up {
            log::info!("netif is link up");
        } else {
            log::info!("netif is link down");
        }
    }

    pub fn status_changed(&self, status: &InterfaceStatus) {
        let event = if status.up {
            log::info!("netif is up");
            log::info!("address: {}", status.address.ip_addr);
            log::info!("gateway: {}", status.address.gateway);
            log::info!("netmask: {}", status.address.net_mask);
            NetEvent::NetworkUp
        } else {
            log::info!("netif is down");
            NetEvent::NetworkDown
        };

        // A full queue is already logged by the post.
        let _ = net_ctrl_msg_post(self.events, event, 0);
    }

    pub fn removed(&self) {
        log::debug!("netif removed");
    }
}
