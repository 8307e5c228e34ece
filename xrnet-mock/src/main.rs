use static_cell::StaticCell;
use xrnet_embedded::NetEventQueue;
use xrnet_mock::run;
use xrnet_mock::settings::Settings;

static NET_EVENTS: StaticCell<NetEventQueue> = StaticCell::new();

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let settings = Settings::new().expect("Failed to load settings.");

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level},xrnet_embedded={level}").into()
        }))
        .init();

    let events: &'static NetEventQueue = NET_EVENTS.init(NetEventQueue::new());

    if let Err(err) = run(&settings, events).await {
        tracing::error!("simulation failed: {}", err);
    }
}
