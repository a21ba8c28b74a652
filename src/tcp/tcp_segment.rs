use std::net::SocketAddrV4;
use crate::tcp::tcp_flags::TcpFlags;
use crate::tcp::wrap32::Wrap32;

/// A single protocol segment as handed over by (or to) the packet transport.
/// Encoding into bytes is the transport's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpSegment {
    pub src: SocketAddrV4,
    pub dst: SocketAddrV4,
    pub seq_no: Wrap32,
    pub ack_no: Wrap32,
    pub flags: TcpFlags,
    pub payload: Vec<u8>,
}

impl TcpSegment {
    /// An empty segment from `src` to `dst`; fill in the rest with the setters.
    pub fn new(src: SocketAddrV4, dst: SocketAddrV4) -> Self {
        TcpSegment {
            src,
            dst,
            seq_no: Wrap32::default(),
            ack_no: Wrap32::default(),
            flags: TcpFlags::empty(),
            payload: Vec::new(),
        }
    }

    pub fn seq_no(&mut self, seq_no: Wrap32) -> &mut Self {
        self.seq_no = seq_no;
        self
    }

    pub fn ack_no(&mut self, ack_no: Wrap32) -> &mut Self {
        self.ack_no = ack_no;
        self
    }

    pub fn tcp_flags(&mut self, flags: TcpFlags) -> &mut Self {
        self.flags = flags;
        self
    }

    pub fn payload(&mut self, payload: &[u8]) -> &mut Self {
        self.payload = payload.to_vec();
        self
    }

    pub fn has_payload(&self) -> bool {
        !self.payload.is_empty()
    }

    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}
