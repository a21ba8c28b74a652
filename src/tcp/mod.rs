pub mod byte_stream;
pub mod config;
pub mod conn;
pub mod errors;
pub mod listener;
pub mod mock;
pub mod sequence;
pub mod state;
pub mod tcp_flags;
pub mod tcp_segment;
pub mod wrap32;

// -- Re-export structs for more concise usage

pub use byte_stream::ByteStream;
pub use config::TcpConfig;
pub use conn::TcpConn;
pub use errors::TcpError;
pub use listener::{Listener, SegmentSink};
pub use mock::MockSink;
pub use sequence::next_seq_no;
pub use state::TcpState;
pub use tcp_flags::TcpFlags;
pub use tcp_segment::TcpSegment;
pub use wrap32::Wrap32;
