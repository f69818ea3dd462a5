//! # RYLR998 Command Encoder
//!
//! Builds outbound `AT+<NAME>[=<arg>[,<arg>...]]` command lines. The line
//! terminator is added by the driver, not here.

/// Test that the module answers at all
pub const CMD_TEST: &str = "AT";

/// Encode `AT+SEND=<address>,<length>,<data>`
///
/// `length` is the byte length of `data`, which is what the module checks.
///
/// # Examples
///
/// ```
/// use lora_mqtt_gateway::rylr998::encoder::encode_send;
///
/// assert_eq!(encode_send(7, "hi"), "AT+SEND=7,2,hi");
/// ```
pub fn encode_send(address: u16, data: &str) -> String {
    format!("AT+SEND={},{},{}", address, data.len(), data)
}

/// Encode `AT+MODE=<mode>`; smart receive (mode 2) also carries its timing
pub fn encode_set_mode(mode: u8, rx_time_ms: u16, low_speed_time_ms: u16) -> String {
    if mode == 2 {
        format!("AT+MODE={},{},{}", mode, rx_time_ms, low_speed_time_ms)
    } else {
        format!("AT+MODE={}", mode)
    }
}

/// Encode `AT+BAND=<frequency in Hz>`
pub fn encode_set_band(frequency_hz: u32) -> String {
    format!("AT+BAND={}", frequency_hz)
}

/// Encode `AT+PARAMETER=<sf>,<bw>,<cr>,<preamble>`
pub fn encode_set_parameter(spreading_factor: u8, bandwidth: u8, coding_rate: u8, preamble: u8) -> String {
    format!(
        "AT+PARAMETER={},{},{},{}",
        spreading_factor, bandwidth, coding_rate, preamble
    )
}

/// Encode `AT+ADDRESS=<address>`
pub fn encode_set_address(address: u16) -> String {
    format!("AT+ADDRESS={}", address)
}

/// Encode `AT+NETWORKID=<id>`
pub fn encode_set_network_id(network_id: u8) -> String {
    format!("AT+NETWORKID={}", network_id)
}

/// Encode `AT+CPIN=<password>`
pub fn encode_set_password(password: &str) -> String {
    format!("AT+CPIN={}", password)
}

/// Encode `AT+CRFOP=<dBm>`
pub fn encode_set_rf_power(power_dbm: u8) -> String {
    format!("AT+CRFOP={}", power_dbm)
}

/// Encode `AT+IPR=<baud>`
pub fn encode_set_baud_rate(baud_rate: u32) -> String {
    format!("AT+IPR={}", baud_rate)
}

/// Settings that can be read back with `AT+<NAME>?`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Mode,
    Band,
    Parameter,
    Address,
    NetworkId,
    Password,
    RfPower,
    BaudRate,
}

impl Query {
    fn command_name(&self) -> &'static str {
        match self {
            Query::Mode => "MODE",
            Query::Band => "BAND",
            Query::Parameter => "PARAMETER",
            Query::Address => "ADDRESS",
            Query::NetworkId => "NETWORKID",
            Query::Password => "CPIN",
            Query::RfPower => "CRFOP",
            Query::BaudRate => "IPR",
        }
    }
}

/// Encode `AT+<NAME>?`
pub fn encode_query(query: Query) -> String {
    format!("AT+{}?", query.command_name())
}
