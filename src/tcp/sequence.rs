use crate::tcp::tcp_segment::TcpSegment;
use crate::tcp::wrap32::Wrap32;

/// The sequence number the peer will use after `segment`, i.e. the value we
/// acknowledge once `segment` is accepted.
///
/// Payload bytes take precedence: a FIN riding on a data segment does not add
/// its own slot.
pub fn next_seq_no(segment: &TcpSegment) -> Wrap32 {
    if segment.has_payload() {
        segment.seq_no + segment.payload_len() as u32
    } else if segment.flags.consumes_seq_no() {
        segment.seq_no + 1
    } else {
        segment.seq_no
    }
}
