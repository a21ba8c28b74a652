use bitflags::bitflags;

bitflags! {
    // Bit positions [ _, _, _, ACK, PSH, RST, SYN, FIN ]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TcpFlags: u8 {
        const ACK = 1 << 4;
        const PSH = 1 << 3;
        const RST = 1 << 2;
        const SYN = 1 << 1;
        const FIN = 1 << 0;
    }
}

impl TcpFlags {
    /// True if the segment carries nothing but an acknowledgment.
    pub fn is_pure_ack(&self) -> bool {
        *self == TcpFlags::ACK
    }

    /// SYN and FIN each occupy one slot of sequence space.
    pub fn consumes_seq_no(&self) -> bool {
        self.intersects(TcpFlags::SYN | TcpFlags::FIN)
    }
}

// -- Unit tests --
