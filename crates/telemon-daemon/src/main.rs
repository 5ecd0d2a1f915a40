//! Telemon daemon binary.
//!
//! Wires together the acquisition loop, the aggregator, the broadcast
//! hub, and the observer HTTP server. Loads configuration, opens the
//! device bus (fatal if that fails), spawns the long-running tasks, and
//! serves until the process is terminated.
//!
//! # Startup sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `telemon.yaml` (or `$TELEMON_CONFIG`)
//! 3. Build the sensor dispatch table
//! 4. Open the device bus -- failure here stops the process
//! 5. Create the cross-task channels
//! 6. Spawn acquisition, aggregator, and hub tasks
//! 7. Run the observer server for the process lifetime

mod error;
mod simbus;
mod sparkline;

use std::path::Path;

use telemon_core::acquire::{run_acquisition, AcquisitionConfig};
use telemon_core::aggregate::{run_aggregator, AggregatorConfig};
use telemon_core::config::TelemonConfig;
use telemon_core::echo::echo_channel;
use telemon_core::sensors::BusSource;
use telemon_server::hub::{hub_channel, run_hub};
use telemon_server::server::{start_server, ServerConfig};
use telemon_server::state::AppState;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::DaemonError;
use crate::simbus::SimulatedBus;
use crate::sparkline::SparklineRenderer;

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    // 1. Structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("telemond starting");

    // 2. Configuration.
    let config_path =
        std::env::var("TELEMON_CONFIG").unwrap_or_else(|_| String::from("telemon.yaml"));
    let config = TelemonConfig::load(Path::new(&config_path))?;
    info!(
        path = config_path,
        sensors = config.sensors.len(),
        poll_interval_ms = config.acquisition.poll_interval_ms,
        "configuration loaded"
    );

    // 3. Sensor dispatch table.
    let table = config.descriptors()?;

    // 4. Bus handle. The acquisition loop owns the source from here on
    //    and releases the bus when it exits.
    let source = match config.bus.driver.as_str() {
        "sim" => {
            let bus = SimulatedBus::open(config.bus.id, config.bus.addr);
            BusSource::new(bus, table.clone())?
        }
        other => {
            return Err(DaemonError::Bus {
                message: format!("unknown bus driver {other:?} (supported: sim)"),
            });
        }
    };
    info!(
        driver = config.bus.driver,
        bus_id = config.bus.id,
        bus_addr = config.bus.addr,
        "bus opened"
    );

    // 5. Channels. Snapshot and frame channels have capacity 1: producers
    //    drop on full, consumers only ever need the latest.
    let (data_tx, data_rx) = mpsc::channel(1);
    let (echo_client, echo_rx) = echo_channel(config.echo_timeout());
    let (hub, hub_inbox) = hub_channel();

    // 6. Long-running tasks.
    tokio::spawn(run_acquisition(
        source,
        data_tx,
        AcquisitionConfig {
            poll_interval: config.poll_interval(),
            log_every: config.acquisition.log_every,
        },
    ));

    let renderer = SparklineRenderer::from_descriptors(&table);
    tokio::spawn(run_aggregator(
        AggregatorConfig {
            history_capacity: config.acquisition.history_capacity,
            trend_capacity: config.acquisition.trend_capacity,
            trend_interval: config.trend_interval(),
        },
        renderer,
        data_rx,
        echo_rx,
        hub.frames_tx.clone(),
    ));

    tokio::spawn(run_hub(hub_inbox));

    // 7. Observer server, for the process lifetime.
    let state = AppState::new(hub, echo_client, config.poll_interval());
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    start_server(&server_config, state).await?;

    Ok(())
}
