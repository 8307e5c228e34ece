use alloc::string::String;

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::InputPin;

use crate::network::{SharedNetController, WlanDriver, WlanMode};
use crate::sysinfo::SysInfoStore;
use crate::{Error, Result};

use super::{
    ProvisioningChannel, ProvisioningEvent, SMART_CONFIG_KEY_LEN, SmartConfig, SmartConfigResult,
    SmartConfigStatus,
};

pub type StopSignal = Signal<CriticalSectionRawMutex, ()>;

pub const DEFAULT_SMART_CONFIG_KEY: [u8; SMART_CONFIG_KEY_LEN] = *b"1234567812345678";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonConfig {
    pub poll_interval: Duration,
    /// Pause after an accepted press before provisioning starts.
    pub debounce: Duration,
    /// Pause between the network coming up and stopping the listener.
    pub link_settle: Duration,
    pub smart_config_timeout: Duration,
    pub ack_timeout: Duration,
    pub key: [u8; SMART_CONFIG_KEY_LEN],
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            debounce: Duration::from_millis(300),
            link_settle: Duration::from_millis(100),
            smart_config_timeout: Duration::from_secs(120),
            ack_timeout: Duration::from_secs(30),
            key: DEFAULT_SMART_CONFIG_KEY,
        }
    }
}

impl ButtonConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_link_settle(mut self, link_settle: Duration) -> Self {
        self.link_settle = link_settle;
        self
    }

    pub fn with_smart_config_timeout(mut self, timeout: Duration) -> Self {
        self.smart_config_timeout = timeout;
        self
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    pub fn with_key(mut self, key: [u8; SMART_CONFIG_KEY_LEN]) -> Self {
        self.key = key;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    Idle,
    Requested,
    AwaitingLink,
    Complete,
}

/// Watches the provisioning button and drives smart config rounds.
///
/// A press is accepted on a low sample. The monitor re-arms only after the pin
/// has been sampled high again, so holding the button starts a single round.
pub struct ButtonMonitor<'a, P, C, D, S>
where
    P: InputPin,
    C: SmartConfig,
    D: WlanDriver,
    S: SysInfoStore,
{
    pin: P,
    smart_config: C,
    controller: &'a SharedNetController<D, S>,
    events: &'a ProvisioningChannel,
    config: ButtonConfig,
    state: ProvisioningState,
    armed: bool,
}

impl<'a, P, C, D, S> ButtonMonitor<'a, P, C, D, S>
where
    P: InputPin,
    C: SmartConfig,
    D: WlanDriver,
    S: SysInfoStore,
{
    pub fn new(
        pin: P,
        smart_config: C,
        controller: &'a SharedNetController<D, S>,
        events: &'a ProvisioningChannel,
    ) -> Self {
        Self {
            pin,
            smart_config,
            controller,
            events,
            config: ButtonConfig::default(),
            state: ProvisioningState::Idle,
            armed: true,
        }
    }

    pub fn with_config(mut self, config: ButtonConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    pub fn state(&self) -> ProvisioningState {
        self.state
    }

    pub fn smart_config(&self) -> &C {
        &self.smart_config
    }

    /// Poll the button until `stop` is signaled.
    pub async fn run(&mut self, stop: &StopSignal) {
        log::info!("button monitor started");

        loop {
            match select(Timer::after(self.config.poll_interval), stop.wait()).await {
                Either::First(()) => self.poll().await,
                Either::Second(()) => break,
            }
        }

        log::info!("button monitor stopped");
    }

    /// Sleep one poll interval, then take a single sample.
    pub async fn tick(&mut self) {
        Timer::after(self.config.poll_interval).await;
        self.poll().await;
    }

    async fn poll(&mut self) {
        if self.sample_pressed() {
            log::info!("smart config button pressed");
            self.publish(ProvisioningEvent::Requested);
            self.state = ProvisioningState::Requested;
            Timer::after(self.config.debounce).await;
        }

        if self.state == ProvisioningState::Requested {
            self.state = match self.provision().await {
                Ok(()) => ProvisioningState::AwaitingLink,
                Err(err) => {
                    log::warn!("smart config round failed: {}", err);
                    ProvisioningState::Idle
                }
            };
        }

        if self.state == ProvisioningState::AwaitingLink
            && self.controller.lock().await.is_network_up()
        {
            Timer::after(self.config.link_settle).await;
            if self.smart_config.stop().await.is_err() {
                log::warn!("smart config stop failed");
            }
            log::info!("provisioned network is up");
            self.state = ProvisioningState::Complete;
            self.publish(ProvisioningEvent::Completed);
        }
    }

    fn sample_pressed(&mut self) -> bool {
        let low = match self.pin.is_low() {
            Ok(low) => low,
            Err(_) => {
                log::warn!("button read failed");
                false
            }
        };

        if !low {
            self.armed = true;
            return false;
        }

        if !self.armed {
            return false;
        }

        self.armed = false;
        true
    }

    async fn provision(&mut self) -> Result<()> {
        self.switch_mode(WlanMode::Monitor).await;
        let outcome = self.listen().await;
        self.switch_mode(WlanMode::Station).await;

        let result = match outcome {
            Ok(result) => result,
            Err(status) => {
                self.publish(ProvisioningEvent::Failed(status));
                return Err(Error::SmartConfig(status));
            }
        };

        let ssid = String::from_utf8_lossy(&result.ssid).into_owned();
        log::info!("smart config ssid: {}", ssid);
        log::debug!("smart config random: {}", result.random_num);

        let passphrase = (!result.passphrase.is_empty()).then_some(result.passphrase.as_str());
        self.controller
            .lock()
            .await
            .connect_station(&result.ssid, passphrase)
            .await?;
        self.publish(ProvisioningEvent::Provisioned { ssid });

        if self
            .smart_config
            .ack_start(result.random_num, self.config.ack_timeout)
            .await
            .is_err()
        {
            log::warn!("smart config ack failed");
            self.publish(ProvisioningEvent::AckFailed);
        }

        Ok(())
    }

    async fn listen(&mut self) -> core::result::Result<SmartConfigResult, SmartConfigStatus> {
        if self.smart_config.set_key(&self.config.key).await.is_err() {
            log::warn!("smart config set key failed");
        }
        self.smart_config
            .start(self.config.smart_config_timeout)
            .await
    }

    async fn switch_mode(&self, mode: WlanMode) {
        if let Err(err) = self.controller.lock().await.switch_mode(mode).await {
            log::error!("switch wlan mode to {} failed: {}", mode, err);
        }
    }

    fn publish(&self, event: ProvisioningEvent) {
        if self.events.try_send(event).is_err() {
            log::warn!("provisioning channel full, event dropped");
        }
    }
}
