//! # Serial Communication Module
//!
//! Handles the UART link to the RYLR998 LoRa module.
//!
//! This module handles:
//! - Opening the serial port with 8N1 settings at the module's baud rate
//! - Auto-detecting the device among common USB/UART paths
//! - Wrapping the port in the [`SerialPortIO`] abstraction used by the driver

pub mod port_trait;

pub use port_trait::{SerialPortIO, TokioSerialPort};

use crate::error::{GatewayError, Result};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// Factory default UART rate of the RYLR998
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Config value for `serial.port` that requests auto-detection
pub const AUTO_DETECT_PORT: &str = "auto";

/// Default device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters
    "/dev/ttyACM0", // USB CDC bridges
    "/dev/serial0", // Raspberry Pi header UART
];

/// RYLR998 Serial Port Handler
///
/// Owns the opened port until it is handed to the radio driver.
pub struct RadioSerial {
    /// Serial port handle
    port: TokioSerialPort,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for RadioSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl RadioSerial {
    /// Open the radio on `path`, or auto-detect it when `path` is `"auto"`
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lora_mqtt_gateway::serial::RadioSerial;
    ///
    /// let serial = RadioSerial::open("/dev/ttyUSB0", 115_200)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        if path == AUTO_DETECT_PORT {
            Self::open_with_paths(DEFAULT_DEVICE_PATHS, baud_rate)
        } else {
            Self::open_with_paths(&[path], baud_rate)
        }
    }

    /// Open the radio trying each of `paths` in order
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyUSB0"])
    /// * `baud_rate` - UART speed the module is configured for
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened RYLR998 at {} ({} baud)", path, baud_rate);
                    return Ok(Self {
                        port: TokioSerialPort::new(port),
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(GatewayError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with 8N1, no flow control
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| GatewayError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Hand the port over to the radio driver
    pub fn into_port(self) -> TokioSerialPort {
        self.port
    }
}
