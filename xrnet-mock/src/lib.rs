use std::cell::RefCell;
use std::error::Error;
use std::net::Ipv4Addr;
use std::time::Duration as StdDuration;

use embassy_time::Duration;
use xrnet_embedded::{
    ButtonConfig, ButtonMonitor, LedMode, MemorySysInfo, NetController, NetEventQueue,
    ProvisioningChannel, ProvisioningState, SMART_CONFIG_KEY_LEN, SharedNetController, StopSignal,
    WlanMode, run_event_loop,
};

use crate::settings::Settings;
use crate::sim::{SimPin, SimSmartConfig, SimWlanDriver};

pub mod settings;
pub mod sim;

/// What the board looked like when the simulation stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub state: ProvisioningState,
    pub leds: Vec<LedMode>,
    pub mode: Option<WlanMode>,
    pub network_up: bool,
    /// Station address last handed to the driver.
    pub station_addr: Option<Ipv4Addr>,
    pub dhcp_server_running: bool,
}

pub fn button_config(settings: &Settings) -> Result<ButtonConfig, Box<dyn Error>> {
    let key: [u8; SMART_CONFIG_KEY_LEN] = settings
        .smart_config
        .key
        .as_bytes()
        .try_into()
        .map_err(|_| format!("smart config key must be {SMART_CONFIG_KEY_LEN} bytes"))?;

    Ok(ButtonConfig::default()
        .with_poll_interval(Duration::from_millis(settings.button.poll_interval_ms))
        .with_debounce(Duration::from_millis(settings.button.debounce_ms))
        .with_smart_config_timeout(Duration::from_millis(settings.smart_config.timeout_ms))
        .with_ack_timeout(Duration::from_millis(settings.smart_config.ack_timeout_ms))
        .with_key(key))
}

pub async fn run(
    settings: &Settings,
    events: &'static NetEventQueue,
) -> Result<Report, Box<dyn Error>> {
    let driver = SimWlanDriver::new(
        events,
        settings.network.dhcp_lease,
        settings.network.known_ssids.clone(),
    );
    let mut controller =
        NetController::new(driver, MemorySysInfo::new(settings.sysinfo.clone()), events);

    let mode = settings.sysinfo.wlan_mode;
    controller.sys_start(mode).await?;
    if mode == WlanMode::HostAp {
        controller.configure(true).await?;
    }
    tracing::info!("network subsystem started in {} mode", mode);

    let controller = SharedNetController::new(controller);
    let provisioning = ProvisioningChannel::new();
    let stop = StopSignal::new();
    let leds = RefCell::new(Vec::new());

    let mut monitor = ButtonMonitor::new(
        SimPin::new(settings.button.presses.clone()),
        SimSmartConfig::new(
            Duration::from_millis(settings.smart_config.listen_ms),
            settings.smart_config.outcome.clone(),
            settings.smart_config.fail_ack,
        ),
        &controller,
        &provisioning,
    )
    .with_config(button_config(settings)?);

    let led_task = async {
        loop {
            let event = provisioning.receive().await;
            let led = LedMode::from(&event);
            tracing::info!("{:?} -> led {:?}", event, led);
            leds.borrow_mut().push(led);
        }
    };

    let button_task = async {
        tokio::join!(monitor.run(&stop), async {
            tokio::time::sleep(StdDuration::from_millis(settings.simulation.duration_ms)).await;
            stop.signal(());
        });
    };

    tokio::select! {
        _ = run_event_loop(&controller, events) => {},
        _ = led_task => {},
        _ = button_task => {},
    }

    while let Ok(event) = provisioning.try_receive() {
        leds.borrow_mut().push(LedMode::from(&event));
    }

    let controller = controller.lock().await;
    let report = Report {
        state: monitor.state(),
        leds: leds.into_inner(),
        mode: controller.mode(),
        network_up: controller.is_network_up(),
        station_addr: controller.driver().station_addr(),
        dhcp_server_running: controller.driver().dhcp_server_running(),
    };

    tracing::info!("simulation finished: {:?}", report);
    Ok(report)
}
