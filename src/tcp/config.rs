use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use crate::tcp::errors::TcpError;

/// Settings shared by every connection attached to a `Listener`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpConfig {
    /// Local address used by actively opened connections
    pub local_ip: Ipv4Addr,
    /// Ports handed out by `Listener::allocate_port`
    pub ephemeral_ports: RangeInclusive<u16>,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            local_ip: Ipv4Addr::LOCALHOST,
            ephemeral_ports: 49152..=65535,
        }
    }
}

impl TcpConfig {
    pub fn validate(&self) -> Result<(), TcpError> {
        if self.ephemeral_ports.is_empty() {
            return Err(TcpError::InvalidConfig(format!(
                "empty ephemeral port range {:?}",
                self.ephemeral_ports
            )));
        }
        if *self.ephemeral_ports.start() == 0 {
            return Err(TcpError::InvalidConfig("port 0 is not allocatable".to_string()));
        }
        Ok(())
    }
}
