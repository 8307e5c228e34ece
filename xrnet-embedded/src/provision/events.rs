use alloc::string::String;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use super::SmartConfigStatus;

pub const PROVISIONING_CHANNEL_DEPTH: usize = 4;

pub type ProvisioningChannel =
    Channel<CriticalSectionRawMutex, ProvisioningEvent, PROVISIONING_CHANNEL_DEPTH>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningEvent {
    /// The button was pressed and a smart config round is about to start.
    Requested,
    Provisioned { ssid: String },
    Failed(SmartConfigStatus),
    AckFailed,
    /// The provisioned network is up and the listener has been stopped.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    SmartConfig,
    Connecting,
    Error,
    Connected,
}

impl From<&ProvisioningEvent> for LedMode {
    fn from(event: &ProvisioningEvent) -> Self {
        match event {
            ProvisioningEvent::Requested => LedMode::SmartConfig,
            ProvisioningEvent::Provisioned { .. } => LedMode::Connecting,
            ProvisioningEvent::Failed(_) | ProvisioningEvent::AckFailed => LedMode::Error,
            ProvisioningEvent::Completed => LedMode::Connected,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_led_mode_follows_events() {
        assert_eq!(
            LedMode::from(&ProvisioningEvent::Requested),
            LedMode::SmartConfig
        );
        assert_eq!(
            LedMode::from(&ProvisioningEvent::Provisioned {
                ssid: "HomeWiFi".to_string()
            }),
            LedMode::Connecting
        );
        assert_eq!(
            LedMode::from(&ProvisioningEvent::Failed(SmartConfigStatus::Timeout)),
            LedMode::Error
        );
        assert_eq!(
            LedMode::from(&ProvisioningEvent::Completed),
            LedMode::Connected
        );
    }
}
