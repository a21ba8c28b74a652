use std::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;
use crate::tcp::errors::TcpError;
use crate::tcp::listener::SegmentSink;
use crate::tcp::tcp_segment::TcpSegment;

/// In-memory `SegmentSink` for tests: records every transmitted segment and
/// can be told to fail.
///
/// Nothing is delivered anywhere. To connect two endpoints, drain the queue
/// with `take_sent` and feed it to `Listener::dispatch`.
#[derive(Debug, Default)]
pub struct MockSink {
    sent: Mutex<Vec<TcpSegment>>,
    fail_send: AtomicBool,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every segment transmitted so far
    pub fn sent_segments(&self) -> Vec<TcpSegment> {
        self.sent.lock().clone()
    }

    /// Remove and return every segment transmitted since the last call
    pub fn take_sent(&self) -> Vec<TcpSegment> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn last_sent(&self) -> Option<TcpSegment> {
        self.sent.lock().last().cloned()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }
}

impl SegmentSink for MockSink {
    fn transmit(&self, segment: &TcpSegment) -> Result<(), TcpError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(TcpError::Transport("mock send failure".to_string()));
        }
        self.sent.lock().push(segment.clone());
        Ok(())
    }
}
