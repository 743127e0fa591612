// ! PLC connect paramter

use std::time::Duration;

/// default connect timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// a network type connect parameter struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub ip_address: String,
    pub ip_port: u16,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            ip_address: "192.168.1.100".into(),
            ip_port: 6000,
        }
    }
}

impl Network {
    /// create a new network type connector parameters
    /// * `ip`-connect ip address or host name
    /// * `port`-connect port
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip_address: ip.into(),
            ip_port: port,
        }
    }

    /// replace the connect port
    pub fn with_port(mut self, port: u16) -> Self {
        self.ip_port = port;
        self
    }

    /// `host:port` string used to dial, ipv6 literal is wrapped in brackets
    pub fn socket_addr(&self) -> String {
        if self.ip_address.contains(':') && !self.ip_address.starts_with('[') {
            format!("[{}]:{}", self.ip_address, self.ip_port)
        } else {
            format!("{}:{}", self.ip_address, self.ip_port)
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.socket_addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_addr() {
        assert_eq!(Network::default().socket_addr(), "192.168.1.100:6000");
        assert_eq!(Network::new("::1", 5007).socket_addr(), "[::1]:5007");
        assert_eq!(
            Network::new("plc.local", 1).with_port(5001).to_string(),
            "plc.local:5001"
        );
    }
}
