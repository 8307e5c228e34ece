use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::{Error, Result};

pub const NET_EVENT_QUEUE_DEPTH: usize = 8;

pub type NetEventQueue = Channel<CriticalSectionRawMutex, NetMessage, NET_EVENT_QUEUE_DEPTH>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetEvent {
    WlanConnected,
    WlanDisconnected,
    WlanScanSuccess,
    WlanScanFailed,
    Wlan4WayHandshakeFailed,
    WlanConnectFailed,
    NetworkUp,
    NetworkDown,
}

impl TryFrom<u16> for NetEvent {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0 => Ok(NetEvent::WlanConnected),
            1 => Ok(NetEvent::WlanDisconnected),
            2 => Ok(NetEvent::WlanScanSuccess),
            3 => Ok(NetEvent::WlanScanFailed),
            4 => Ok(NetEvent::Wlan4WayHandshakeFailed),
            5 => Ok(NetEvent::WlanConnectFailed),
            6 => Ok(NetEvent::NetworkUp),
            7 => Ok(NetEvent::NetworkDown),
            other => Err(Error::UnknownEvent(other)),
        }
    }
}

impl fmt::Display for NetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NetEvent::WlanConnected => "wlan connected",
            NetEvent::WlanDisconnected => "wlan disconnected",
            NetEvent::WlanScanSuccess => "wlan scan success",
            NetEvent::WlanScanFailed => "wlan scan failed",
            NetEvent::Wlan4WayHandshakeFailed => "wlan 4way handshake failed",
            NetEvent::WlanConnectFailed => "wlan connect failed",
            NetEvent::NetworkUp => "network up",
            NetEvent::NetworkDown => "network down",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetMessage {
    pub event: NetEvent,
    pub data: u32,
}

impl NetMessage {
    pub const fn new(event: NetEvent, data: u32) -> Self {
        Self { event, data }
    }
}

/// Queue a network message, waiting for space.
pub async fn net_ctrl_msg_send(queue: &NetEventQueue, event: NetEvent, data: u32) {
    queue.send(NetMessage::new(event, data)).await;
}

/// Queue a network message without waiting; used from callback contexts.
pub fn net_ctrl_msg_post(queue: &NetEventQueue, event: NetEvent, data: u32) -> Result<()> {
    queue.try_send(NetMessage::new(event, data)).map_err(|_| {
        log::warn!("Network event queue full, dropping <{}>", event);
        Error::QueueFull
    })
}
