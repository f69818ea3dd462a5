//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{GatewayError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub radio: RadioConfig,
    pub broker: BrokerConfig,
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

/// LoRa radio parameters applied to the module at startup
#[derive(Debug, Deserialize, Clone)]
pub struct RadioConfig {
    #[serde(default = "default_radio_address")]
    pub address: u16,

    #[serde(default = "default_network_id")]
    pub network_id: u8,

    #[serde(default = "default_band_hz")]
    pub band_hz: u32,

    #[serde(default = "default_spreading_factor")]
    pub spreading_factor: u8,

    #[serde(default = "default_bandwidth")]
    pub bandwidth: u8,

    #[serde(default = "default_coding_rate")]
    pub coding_rate: u8,

    #[serde(default = "default_preamble")]
    pub preamble: u8,

    #[serde(default)]
    pub mode: u8,

    #[serde(default = "default_smart_receive_ms")]
    pub rx_time_ms: u16,

    #[serde(default = "default_smart_receive_ms")]
    pub low_speed_time_ms: u16,

    #[serde(default)]
    pub rf_power: Option<u8>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_configure_on_start")]
    pub configure_on_start: bool,
}

/// Publish target configuration
///
/// An empty `output` means no broker is configured.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BrokerConfig {
    #[serde(default)]
    pub topic_root: String,

    #[serde(default)]
    pub output: String,
}

/// Per-cycle processing limits
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    #[serde(default = "default_document_capacity")]
    pub document_capacity: usize,

    #[serde(default = "default_display_queue_len")]
    pub display_queue_len: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_command_timeout_ms() -> u64 { 1000 }

fn default_radio_address() -> u16 { 1 }
fn default_network_id() -> u8 { 18 }
fn default_band_hz() -> u32 { 915_000_000 }
fn default_spreading_factor() -> u8 { 8 }
fn default_bandwidth() -> u8 { 7 }
fn default_coding_rate() -> u8 { 1 }
fn default_preamble() -> u8 { 12 }
fn default_smart_receive_ms() -> u16 { 1000 }
fn default_configure_on_start() -> bool { true }

fn default_document_capacity() -> usize { 16 }
fn default_display_queue_len() -> usize { 8 }

fn default_log_level() -> String { "info".to_string() }

/// UART rates the RYLR998 accepts for `AT+IPR`
const VALID_BAUD_RATES: &[u32] = &[300, 1200, 4800, 9600, 19200, 28800, 38400, 57600, 115200];

/// The only network id that allows a non-default preamble
const PREAMBLE_NETWORK_ID: u8 = 18;

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            address: default_radio_address(),
            network_id: default_network_id(),
            band_hz: default_band_hz(),
            spreading_factor: default_spreading_factor(),
            bandwidth: default_bandwidth(),
            coding_rate: default_coding_rate(),
            preamble: default_preamble(),
            mode: 0,
            rx_time_ms: default_smart_receive_ms(),
            low_speed_time_ms: default_smart_receive_ms(),
            rf_power: None,
            password: None,
            configure_on_start: default_configure_on_start(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            document_capacity: default_document_capacity(),
            display_queue_len: default_display_queue_len(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl SerialConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl BrokerConfig {
    /// True when a publish target has been configured
    pub fn is_configured(&self) -> bool {
        !self.output.is_empty()
    }
}

fn invalid(message: impl std::fmt::Display) -> GatewayError {
    GatewayError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lora_mqtt_gateway::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Serial
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if !VALID_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {:?}",
                VALID_BAUD_RATES
            )));
        }

        if self.serial.command_timeout_ms == 0 || self.serial.command_timeout_ms > 10000 {
            return Err(invalid("command_timeout_ms must be between 1 and 10000"));
        }

        // Radio
        let radio = &self.radio;
        if !(3..=15).contains(&radio.network_id) && radio.network_id != PREAMBLE_NETWORK_ID {
            return Err(invalid("network_id must be between 3 and 15, or 18"));
        }

        if !(862_000_000..=1_020_000_000).contains(&radio.band_hz) {
            return Err(invalid("band_hz must be between 862000000 and 1020000000"));
        }

        if !(5..=11).contains(&radio.spreading_factor) {
            return Err(invalid("spreading_factor must be between 5 and 11"));
        }

        if !(7..=9).contains(&radio.bandwidth) {
            return Err(invalid("bandwidth must be 7 (125kHz), 8 (250kHz) or 9 (500kHz)"));
        }

        if !(1..=4).contains(&radio.coding_rate) {
            return Err(invalid("coding_rate must be between 1 and 4"));
        }

        if radio.network_id == PREAMBLE_NETWORK_ID {
            if !(4..=24).contains(&radio.preamble) {
                return Err(invalid("preamble must be between 4 and 24 when network_id is 18"));
            }
        } else if radio.preamble != 12 {
            return Err(invalid("preamble must be 12 unless network_id is 18"));
        }

        if radio.mode > 2 {
            return Err(invalid("mode must be 0 (transceiver), 1 (sleep) or 2 (smart receive)"));
        }

        for (name, value) in [
            ("rx_time_ms", radio.rx_time_ms),
            ("low_speed_time_ms", radio.low_speed_time_ms),
        ] {
            if !(30..=60000).contains(&value) {
                return Err(invalid(format!("{} must be between 30 and 60000", name)));
            }
        }

        if let Some(power) = radio.rf_power {
            if power > 22 {
                return Err(invalid("rf_power must be between 0 and 22 dBm"));
            }
        }

        if let Some(password) = &radio.password {
            if password.len() != 8 || !password.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid("password must be exactly 8 hex digits"));
            }
        }

        // Broker
        if self.broker.is_configured() && self.broker.topic_root.is_empty() {
            return Err(invalid("topic_root cannot be empty when a broker output is set"));
        }

        // Gateway
        if self.gateway.document_capacity == 0 || self.gateway.document_capacity > 64 {
            return Err(invalid("document_capacity must be between 1 and 64"));
        }

        if self.gateway.display_queue_len == 0 {
            return Err(invalid("display_queue_len must be greater than 0"));
        }

        // Logging
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(!config.broker.is_configured());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyAMA0"

[radio]
address = 2
network_id = 5

[broker]
topic_root = "lora/"
output = "-"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyAMA0");
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.radio.address, 2);
        assert_eq!(config.radio.network_id, 5);
        assert_eq!(config.radio.preamble, 12);
        assert!(config.broker.is_configured());
        assert_eq!(config.gateway.document_capacity, 16);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.command_timeout(), Duration::from_millis(1000));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Config::load("/nonexistent/gateway.toml");
        assert!(matches!(result, Err(GatewayError::Io(_))));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = Config::from_toml("[serial\nport = 1");
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.serial.baud_rate = 420000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_baud_rates() {
        for &baud in VALID_BAUD_RATES {
            let mut config = Config::default();
            config.serial.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_command_timeout_bounds() {
        let mut config = Config::default();
        config.serial.command_timeout_ms = 0;
        assert!(config.validate().is_err());
        config.serial.command_timeout_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_network_id_range() {
        for (id, ok) in [(2, false), (3, true), (15, true), (16, false), (18, true), (19, false)] {
            let mut config = Config::default();
            config.radio.network_id = id;
            assert_eq!(config.validate().is_ok(), ok, "network_id {}", id);
        }
    }

    #[test]
    fn test_band_range() {
        let mut config = Config::default();
        config.radio.band_hz = 433_000_000;
        assert!(config.validate().is_err());
        config.radio.band_hz = 868_000_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_spreading_factor_range() {
        let mut config = Config::default();
        config.radio.spreading_factor = 4;
        assert!(config.validate().is_err());
        config.radio.spreading_factor = 12;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bandwidth_and_coding_rate_ranges() {
        let mut config = Config::default();
        config.radio.bandwidth = 6;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.radio.coding_rate = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_preamble_depends_on_network_id() {
        let mut config = Config::default();
        config.radio.preamble = 24;
        assert!(config.validate().is_ok());
        config.radio.preamble = 25;
        assert!(config.validate().is_err());

        config.radio.network_id = 5;
        config.radio.preamble = 12;
        assert!(config.validate().is_ok());
        config.radio.preamble = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mode_and_smart_receive_times() {
        let mut config = Config::default();
        config.radio.mode = 3;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.radio.mode = 2;
        config.radio.rx_time_ms = 29;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rf_power_and_password() {
        let mut config = Config::default();
        config.radio.rf_power = Some(23);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.radio.password = Some("FABC0002".to_string());
        assert!(config.validate().is_ok());
        config.radio.password = Some("XYZ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_broker_output_requires_topic_root() {
        let mut config = Config::default();
        config.broker.output = "-".to_string();
        assert!(config.validate().is_err());
        config.broker.topic_root = "home/mailbox/".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_document_capacity_bounds() {
        let mut config = Config::default();
        config.gateway.document_capacity = 0;
        assert!(config.validate().is_err());
        config.gateway.document_capacity = 65;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_queue_len_zero() {
        let mut config = Config::default();
        config.gateway.display_queue_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_serial_port(), "/dev/ttyUSB0");
        assert_eq!(default_baud_rate(), 115200);
        assert_eq!(default_command_timeout_ms(), 1000);
        assert_eq!(default_radio_address(), 1);
        assert_eq!(default_network_id(), 18);
        assert_eq!(default_band_hz(), 915_000_000);
        assert_eq!(default_spreading_factor(), 8);
        assert_eq!(default_bandwidth(), 7);
        assert_eq!(default_coding_rate(), 1);
        assert_eq!(default_preamble(), 12);
        assert_eq!(default_document_capacity(), 16);
        assert_eq!(default_display_queue_len(), 8);
        assert_eq!(default_log_level(), "info");
    }
}
