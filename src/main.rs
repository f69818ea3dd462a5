//! # LoRa MQTT Gateway
//!
//! Listen on an RYLR998 LoRa module and republish every received sensor
//! report, field by field, under a configured topic root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lora_mqtt_gateway::config::{Config, LoggingConfig};
use lora_mqtt_gateway::error::GatewayError;
use lora_mqtt_gateway::gateway::Gateway;
use lora_mqtt_gateway::rylr998::Rylr998;
use lora_mqtt_gateway::serial::RadioSerial;
use lora_mqtt_gateway::telemetry::{JsonlPublisher, Publisher, ReportEmitter};

/// Configuration file used when `--config` is not given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "lora-mqtt-gateway.log";

#[derive(Parser, Debug)]
#[command(name = "lora-mqtt-gateway", version, about = "RYLR998 LoRa to MQTT gateway")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Serial device, overrides `serial.port` ("auto" to probe common paths)
    #[arg(short, long)]
    port: Option<String>,

    /// Skip applying radio parameters at startup
    #[arg(long)]
    no_configure: bool,
}

/// Load `path`, falling back to defaults when the file does not exist
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    Config::load(path).with_context(|| format!("loading {}", path.display()))
}

/// Install the tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Logs always go to
/// stdout; when `log_dir` is set they are additionally written to a daily
/// rolling file. The returned guard must be held until exit so buffered
/// lines are flushed.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let (subscriber, guard) = build_subscriber(logging);
    subscriber.init();
    guard
}

fn build_subscriber(logging: &LoggingConfig) -> (impl tracing::Subscriber + Send + Sync, Option<WorkerGuard>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let (file_layer, guard) = if logging.log_dir.is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&logging.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer);
    (subscriber, guard)
}

/// Build the publish collaborator, `None` when no broker is configured
fn build_publisher(config: &Config) -> Result<Option<Box<dyn Publisher>>> {
    if !config.broker.is_configured() {
        info!("No broker configured, reports are logged only");
        return Ok(None);
    }
    if !config.broker.topic_root.ends_with('/') {
        warn!(
            "Topic root {:?} does not end with '/', topics are formed by plain concatenation",
            config.broker.topic_root
        );
    }
    let publisher = JsonlPublisher::open(&config.broker.output)
        .with_context(|| format!("opening publish output {}", config.broker.output))?;
    Ok(Some(Box::new(publisher)))
}

/// Main entry point
///
/// 1. Parse arguments, load configuration, set up logging
/// 2. Open the serial port and check the module answers `AT`
/// 3. Apply radio parameters unless disabled
/// 4. Run one gateway cycle per received line until Ctrl+C or the port closes
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(port) = cli.port {
        config.serial.port = port;
    }
    if cli.no_configure {
        config.radio.configure_on_start = false;
    }

    let _log_guard = init_logging(&config.logging);

    info!("LoRa MQTT Gateway v{} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Configuration: {:?}", config);

    let serial = RadioSerial::open(&config.serial.port, config.serial.baud_rate)?;
    info!("Radio serial port opened at: {}", serial.device_path());

    let mut radio = Rylr998::with_timeout(serial.into_port(), config.serial.command_timeout());

    if radio.test_comm().await? {
        info!("RYLR998 is working");
    } else {
        warn!("No response from RYLR998");
    }

    if config.radio.configure_on_start {
        let report = radio.configure(&config.radio, config.serial.baud_rate).await?;
        if report.all_accepted() {
            info!("Radio configured ({} settings)", report.accepted.len());
        } else {
            warn!("Radio rejected settings: {}", report.rejected.join(", "));
        }
    }

    let emitter = ReportEmitter::new(
        config.broker.topic_root.clone(),
        build_publisher(&config)?,
        config.gateway.display_queue_len,
    );
    let mut gateway = Gateway::new(radio, emitter, config.gateway.document_capacity);

    info!("Listening for LoRa frames");
    info!("Press Ctrl+C to exit");

    let mut cycles: u64 = 0;

    loop {
        tokio::select! {
            line = gateway.next_line() => {
                let line = match line {
                    Ok(line) => line,
                    Err(GatewayError::ChannelClosed) => {
                        error!("Serial port closed");
                        return Err(GatewayError::ChannelClosed.into());
                    }
                    Err(e) => {
                        error!("Serial read failed: {}", e);
                        return Err(e.into());
                    }
                };

                if gateway.handle_line(&line).await.is_some() {
                    cycles += 1;
                }

                for entry in gateway.emitter_mut().display_mut().drain() {
                    debug!("display {}", entry);
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total frames handled: {}", cycles);
                break;
            }
        }
    }

    Ok(())
}
