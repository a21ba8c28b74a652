use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpState {
    Closed, // No connection, or connection finished

    // -- Opening states --
    Listen,  // Waiting for SYN
    SynSent, // SYN sent, waiting for SYN-ACK
    SynRcvd, // SYN received, expecting ACK

    // -- Steady state; opened --
    Established, // Connection established, exchanging data

    // -- Passive close --
    LastAck, // FIN sent, waiting for ACK

    // -- Active close --
    FinWait1, // FIN sent, waiting for FIN from peer
    TimeWait, // Both FINs seen; nothing leaves this state
}

impl TcpState {
    /// Our FIN has been sent; the local side won't send data again.
    pub fn is_closing(self) -> bool {
        matches!(self, TcpState::FinWait1 | TcpState::LastAck | TcpState::TimeWait)
    }
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TcpState::Closed => "CLOSED",
            TcpState::Listen => "LISTEN",
            TcpState::SynSent => "SYN-SENT",
            TcpState::SynRcvd => "SYN-RECEIVED",
            TcpState::Established => "ESTABLISHED",
            TcpState::LastAck => "LAST-ACK",
            TcpState::FinWait1 => "FIN-WAIT-1",
            TcpState::TimeWait => "TIME-WAIT",
        };
        f.write_str(name)
    }
}
