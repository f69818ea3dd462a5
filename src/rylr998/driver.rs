//! # RYLR998 Driver
//!
//! Synchronous request/response over the module's line channel.
//!
//! The driver exclusively owns the port and every command takes `&mut self`,
//! so only one command can be outstanding at a time. A command waits for the
//! next complete line until its deadline; there is no cancellation other than
//! the deadline expiring.

use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, info, warn};

use super::decoder::{classify_response, describe_error};
use super::encoder::*;
use super::protocol::*;
use crate::config::RadioConfig;
use crate::error::{GatewayError, Result};
use crate::serial::SerialPortIO;

/// Default wait for a command response
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(1000);

/// Driver for one RYLR998 module
pub struct Rylr998<P: SerialPortIO> {
    port: P,
    /// Bytes received but not yet returned as a complete line
    buffer: BytesMut,
    /// Set after an overlong line was dropped; the rest of it is skipped
    discarding: bool,
    command_timeout: Duration,
}

impl<P: SerialPortIO> std::fmt::Debug for Rylr998<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rylr998")
            .field("buffered", &self.buffer.len())
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}

/// Outcome of applying a [`RadioConfig`] to the module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureReport {
    /// Commands answered with `+OK`
    pub accepted: Vec<String>,
    /// Commands answered with anything else (or nothing)
    pub rejected: Vec<String>,
}

impl ConfigureReport {
    pub fn all_accepted(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl<P: SerialPortIO> Rylr998<P> {
    pub fn new(port: P) -> Self {
        Self::with_timeout(port, DEFAULT_COMMAND_TIMEOUT)
    }

    pub fn with_timeout(port: P, command_timeout: Duration) -> Self {
        Self {
            port,
            buffer: BytesMut::with_capacity(MAX_LINE_LEN),
            discarding: false,
            command_timeout,
        }
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Wait for the next complete line from the module
    ///
    /// Cancel-safe: partial lines stay buffered if the future is dropped, so
    /// this can sit in a `select!` next to a shutdown signal.
    ///
    /// Bytes that run past [`MAX_LINE_LEN`] without a terminator are noise
    /// (usually a baud mismatch) and are dropped up to the next newline.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ChannelClosed`] at end-of-file and I/O errors
    /// from the port.
    pub async fn next_line(&mut self) -> Result<String> {
        loop {
            while let Some(line) = self.take_line() {
                if self.discarding {
                    self.discarding = false;
                    continue;
                }
                return Ok(line);
            }
            if self.buffer.len() > MAX_LINE_LEN {
                warn!("Discarding {} bytes without a line terminator", self.buffer.len());
                self.buffer.clear();
                self.discarding = true;
            }
            let n = self.port.read_into(&mut self.buffer).await?;
            if n == 0 {
                return Err(GatewayError::ChannelClosed);
            }
        }
    }

    /// Pop one terminated line off the buffer, trailing whitespace trimmed
    fn take_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let raw = self.buffer.split_to(end + 1);
        Some(String::from_utf8_lossy(&raw).trim_end().to_string())
    }

    /// Send a command and wait up to `timeout` for one response line
    ///
    /// Returns the response with trailing whitespace trimmed, or an empty
    /// string when nothing arrived in time. An empty answer is a failure.
    ///
    /// # Errors
    ///
    /// Only I/O failures on the port are errors; a timeout is not.
    pub async fn send_command_with_timeout(&mut self, command: &str, timeout: Duration) -> Result<String> {
        debug!("Sending radio command: {}", command);

        let mut line = String::with_capacity(command.len() + LINE_TERMINATOR.len());
        line.push_str(command);
        line.push_str(LINE_TERMINATOR);

        self.port
            .write_all(line.as_bytes())
            .await
            .map_err(|e| GatewayError::Serial(format!("Failed to write command: {}", e)))?;
        self.port
            .flush()
            .await
            .map_err(|e| GatewayError::Serial(format!("Failed to flush serial port: {}", e)))?;

        match tokio::time::timeout(timeout, self.next_line()).await {
            Ok(Ok(response)) => {
                debug!("Radio response: {}", response);
                Ok(response)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                debug!("No response to {} within {:?}", command, timeout);
                Ok(String::new())
            }
        }
    }

    /// Send a command with the driver's default timeout
    pub async fn send_command(&mut self, command: &str) -> Result<String> {
        self.send_command_with_timeout(command, self.command_timeout).await
    }

    /// Send a mutating command; true only if the answer is exactly `+OK`
    async fn command_ok(&mut self, command: &str) -> Result<bool> {
        let response = self.send_command(command).await?;
        let code = classify_response(&response);
        match &code {
            ResponseCode::Ok => {}
            ResponseCode::Error(err) => warn!("{} rejected: {}", command, describe_error(err)),
            ResponseCode::Timeout => warn!("{} got no response", command),
            ResponseCode::Ready | ResponseCode::Other(_) => {
                warn!("{} got unexpected response: {}", command, response)
            }
        }
        Ok(code.is_ok())
    }

    /// Transmit `data` to the module at `address`
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PayloadTooLarge`] without touching the wire
    /// when `data` exceeds the module's 240 byte limit.
    pub async fn send(&mut self, address: u16, data: &str) -> Result<bool> {
        if data.len() > MAX_SEND_PAYLOAD {
            return Err(GatewayError::PayloadTooLarge {
                len: data.len(),
                max: MAX_SEND_PAYLOAD,
            });
        }
        self.command_ok(&encode_send(address, data)).await
    }

    /// Check that the module answers `AT` with `+OK`
    pub async fn test_comm(&mut self) -> Result<bool> {
        self.command_ok(CMD_TEST).await
    }

    pub async fn set_mode(&mut self, mode: u8, rx_time_ms: u16, low_speed_time_ms: u16) -> Result<bool> {
        self.command_ok(&encode_set_mode(mode, rx_time_ms, low_speed_time_ms)).await
    }

    pub async fn set_band(&mut self, frequency_hz: u32) -> Result<bool> {
        self.command_ok(&encode_set_band(frequency_hz)).await
    }

    pub async fn set_parameter(
        &mut self,
        spreading_factor: u8,
        bandwidth: u8,
        coding_rate: u8,
        preamble: u8,
    ) -> Result<bool> {
        self.command_ok(&encode_set_parameter(spreading_factor, bandwidth, coding_rate, preamble))
            .await
    }

    pub async fn set_address(&mut self, address: u16) -> Result<bool> {
        self.command_ok(&encode_set_address(address)).await
    }

    pub async fn set_network_id(&mut self, network_id: u8) -> Result<bool> {
        self.command_ok(&encode_set_network_id(network_id)).await
    }

    pub async fn set_password(&mut self, password: &str) -> Result<bool> {
        self.command_ok(&encode_set_password(password)).await
    }

    pub async fn set_rf_power(&mut self, power_dbm: u8) -> Result<bool> {
        self.command_ok(&encode_set_rf_power(power_dbm)).await
    }

    pub async fn set_baud_rate(&mut self, baud_rate: u32) -> Result<bool> {
        self.command_ok(&encode_set_baud_rate(baud_rate)).await
    }

    /// Read a setting back; the raw response line is returned
    pub async fn query(&mut self, query: Query) -> Result<String> {
        self.send_command(&encode_query(query)).await
    }

    /// Apply a full radio configuration
    ///
    /// Order: address, network id, band, UART baud rate, RF parameters, then
    /// mode, RF power and password when configured. Every command is
    /// attempted even if an earlier one is rejected.
    pub async fn configure(&mut self, radio: &RadioConfig, baud_rate: u32) -> Result<ConfigureReport> {
        let mut commands = vec![
            encode_set_address(radio.address),
            encode_set_network_id(radio.network_id),
            encode_set_band(radio.band_hz),
            encode_set_baud_rate(baud_rate),
            encode_set_parameter(
                radio.spreading_factor,
                radio.bandwidth,
                radio.coding_rate,
                radio.preamble,
            ),
            encode_set_mode(radio.mode, radio.rx_time_ms, radio.low_speed_time_ms),
        ];
        if let Some(power) = radio.rf_power {
            commands.push(encode_set_rf_power(power));
        }
        if let Some(password) = &radio.password {
            commands.push(encode_set_password(password));
        }

        let mut report = ConfigureReport::default();
        for command in commands {
            if self.command_ok(&command).await? {
                report.accepted.push(command);
            } else {
                report.rejected.push(command);
            }
        }

        info!(
            "Radio configuration applied ({} accepted, {} rejected)",
            report.accepted.len(),
            report.rejected.len()
        );
        Ok(report)
    }
}
