use std::collections::HashMap;
use std::net::SocketAddrV4;
use std::sync::{Arc, Weak};
use log::trace;
use parking_lot::Mutex;
use rand::Rng;
use crate::tcp::config::TcpConfig;
use crate::tcp::conn::TcpConn;
use crate::tcp::errors::TcpError;
use crate::tcp::tcp_segment::TcpSegment;

/// Random picks tried before falling back to a linear scan of the port range.
const RANDOM_PORT_ATTEMPTS: usize = 64;

/// Encodes a segment and puts it on the wire.
///
/// Called with the sending connection locked, so an implementation must not
/// deliver synchronously back into that same connection.
pub trait SegmentSink: Send + Sync {
    fn transmit(&self, segment: &TcpSegment) -> Result<(), TcpError>;
}

/// Demultiplexes inbound segments to connections by local endpoint and hands
/// outbound segments to the `SegmentSink`. Shared by every connection using
/// the same transport.
pub struct Listener {
    config: TcpConfig,
    sink: Arc<dyn SegmentSink>,
    endpoints: Mutex<HashMap<SocketAddrV4, Weak<TcpConn>>>,
}

impl Listener {
    pub fn new(sink: Arc<dyn SegmentSink>) -> Arc<Self> {
        Arc::new(Listener {
            config: TcpConfig::default(),
            sink,
            endpoints: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_config(sink: Arc<dyn SegmentSink>, config: TcpConfig) -> Result<Arc<Self>, TcpError> {
        config.validate()?;
        Ok(Arc::new(Listener {
            config,
            sink,
            endpoints: Mutex::new(HashMap::new()),
        }))
    }

    pub fn config(&self) -> &TcpConfig {
        &self.config
    }

    /// Pick a port in the ephemeral range that is not bound on `config.local_ip`.
    pub fn allocate_port(&self) -> Result<u16, TcpError> {
        let endpoints = self.endpoints.lock();
        let ports = self.config.ephemeral_ports.clone();
        let is_free = |port: u16| {
            let addr = SocketAddrV4::new(self.config.local_ip, port);
            endpoints.get(&addr).map_or(true, |conn| conn.strong_count() == 0)
        };

        let mut rng = rand::thread_rng();
        for _ in 0..RANDOM_PORT_ATTEMPTS {
            let port = rng.gen_range(ports.clone());
            if is_free(port) {
                return Ok(port);
            }
        }

        ports.into_iter().find(|&port| is_free(port)).ok_or(TcpError::AddressNotAvailable)
    }

    /// Deliver future segments addressed to `addr` to `conn`.
    pub fn register(&self, addr: SocketAddrV4, conn: &Arc<TcpConn>) -> Result<(), TcpError> {
        let mut endpoints = self.endpoints.lock();
        if let Some(existing) = endpoints.get(&addr) {
            if existing.strong_count() > 0 {
                return Err(TcpError::BindingConflict { addr });
            }
        }
        endpoints.insert(addr, Arc::downgrade(conn));
        Ok(())
    }

    pub fn unregister(&self, addr: SocketAddrV4) {
        self.endpoints.lock().remove(&addr);
    }

    pub fn is_registered(&self, addr: SocketAddrV4) -> bool {
        self.endpoints
            .lock()
            .get(&addr)
            .map_or(false, |conn| conn.strong_count() > 0)
    }

    /// Number of live connections bound to this listener.
    pub fn connection_count(&self) -> usize {
        self.endpoints
            .lock()
            .values()
            .filter(|conn| conn.strong_count() > 0)
            .count()
    }

    /// Drop the entry for `addr` once its connection is gone.
    pub(crate) fn release(&self, addr: SocketAddrV4) {
        let mut endpoints = self.endpoints.lock();
        if endpoints.get(&addr).map_or(false, |conn| conn.strong_count() == 0) {
            endpoints.remove(&addr);
        }
    }

    pub fn transmit(&self, segment: &TcpSegment) -> Result<(), TcpError> {
        self.sink.transmit(segment)
    }

    /// Hand an inbound segment to the connection bound at its destination.
    /// Segments for unbound endpoints are dropped.
    pub fn dispatch(&self, segment: &TcpSegment) -> Result<(), TcpError> {
        let conn = self.endpoints.lock().get(&segment.dst).and_then(Weak::upgrade);
        match conn {
            Some(conn) => conn.handle(segment),
            None => {
                trace!("no connection bound at {}, dropping segment from {}", segment.dst, segment.src);
                Ok(())
            }
        }
    }
}
