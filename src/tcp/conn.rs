use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::{Duration, Instant};
use log::{debug, trace, warn};
use parking_lot::{Condvar, Mutex, MutexGuard};
use rand::random;
use crate::tcp::byte_stream::ByteStream;
use crate::tcp::errors::TcpError;
use crate::tcp::listener::Listener;
use crate::tcp::sequence::next_seq_no;
use crate::tcp::state::TcpState;
use crate::tcp::tcp_flags::TcpFlags;
use crate::tcp::tcp_segment::TcpSegment;
use crate::tcp::wrap32::Wrap32;

/// Why a connection ended up permanently closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shutdown {
    Graceful,
    Reset,
    Aborted,
}

impl Shutdown {
    fn error(self) -> TcpError {
        match self {
            Shutdown::Graceful => TcpError::NotConnected,
            Shutdown::Reset => TcpError::ConnectionReset,
            Shutdown::Aborted => TcpError::ConnectionAborted,
        }
    }
}

/// The TCP Control Block (TCB) holds connection-wide state.
#[derive(Debug)]
struct TcpControlBlock {
    state: TcpState,
    local_addr: SocketAddrV4,
    remote_addr: Option<SocketAddrV4>,
    seq_no: Wrap32,                // Next seq number we send
    last_ack_sent: Option<Wrap32>, // Next seq number we expect from the peer
    recv_buffer: ByteStream,
    registered: bool,
    shutdown: Option<Shutdown>,
    cancelled: bool,
}

/// One end of a connection. Segments come in through `handle` (normally via
/// `Listener::dispatch`); the application drives it with `open`/`listen`,
/// `write`, `read` and `close`. Safe to share between the transport thread
/// and an application thread.
pub struct TcpConn {
    listener: Arc<Listener>,
    tcb: Mutex<TcpControlBlock>,
    state_changed: Condvar,
}

impl TcpConn {
    /// A closed connection with a random initial sequence number.
    pub fn new(listener: &Arc<Listener>) -> Arc<Self> {
        Self::with_isn(listener, Wrap32::new(random::<u32>()))
    }

    pub fn with_isn(listener: &Arc<Listener>, isn: Wrap32) -> Arc<Self> {
        Arc::new(TcpConn {
            listener: Arc::clone(listener),
            tcb: Mutex::new(TcpControlBlock {
                state: TcpState::Closed,
                local_addr: SocketAddrV4::new(listener.config().local_ip, 0),
                remote_addr: None,
                seq_no: isn,
                last_ack_sent: None,
                recv_buffer: ByteStream::new(),
                registered: false,
                shutdown: None,
                cancelled: false,
            }),
            state_changed: Condvar::new(),
        })
    }

    /// Start the 3-way handshake from a fresh ephemeral port.
    pub fn open(self: &Arc<Self>, remote_ip: Ipv4Addr, remote_port: u16) -> Result<(), TcpError> {
        let mut tcb = self.tcb.lock();
        Self::check_unused(&tcb)?;

        let local_port = self.listener.allocate_port()?;
        let local_addr = SocketAddrV4::new(self.listener.config().local_ip, local_port);
        self.listener.register(local_addr, self)?;
        tcb.registered = true;
        tcb.local_addr = local_addr;
        tcb.remote_addr = Some(SocketAddrV4::new(remote_ip, remote_port));

        debug!("{} connecting to {}:{}", local_addr, remote_ip, remote_port);
        if let Err(err) = self.send_segment(&mut tcb, TcpFlags::SYN, &[]) {
            // Give the port back so the connection can be opened again
            self.listener.unregister(local_addr);
            tcb.registered = false;
            tcb.local_addr = SocketAddrV4::new(self.listener.config().local_ip, 0);
            tcb.remote_addr = None;
            return Err(err);
        }
        self.set_state(&mut tcb, TcpState::SynSent);
        Ok(())
    }

    /// Wait for a single peer on `local_ip:local_port`.
    pub fn listen(self: &Arc<Self>, local_ip: Ipv4Addr, local_port: u16) -> Result<(), TcpError> {
        let mut tcb = self.tcb.lock();
        Self::check_unused(&tcb)?;

        let local_addr = SocketAddrV4::new(local_ip, local_port);
        self.listener.register(local_addr, self)?;
        tcb.registered = true;
        tcb.local_addr = local_addr;

        debug!("{} listening", local_addr);
        self.set_state(&mut tcb, TcpState::Listen);
        Ok(())
    }

    /// Process one inbound segment.
    ///
    /// Out-of-order and duplicate segments are dropped silently. A segment the
    /// current state has no transition for closes the connection and is
    /// reported as `ProtocolViolation`.
    ///
    /// Two rows differ from the bare RFC 793 style table: the ACK that completes
    /// a passive open advances `seq_no` past our SYN, and the FIN we answer a
    /// peer FIN with is sent at the current `seq_no` before it is advanced. Both
    /// keep our first data byte (or FIN) at the seq number the peer expects.
    ///
    /// If the reply can't be transmitted the connection is aborted, since its
    /// counters already account for the segment.
    pub fn handle(&self, segment: &TcpSegment) -> Result<(), TcpError> {
        let mut tcb = self.tcb.lock();
        if tcb.state == TcpState::Closed {
            return Ok(());
        }

        let flags = segment.flags;
        if flags.contains(TcpFlags::RST) {
            debug!("{} reset by {}", tcb.local_addr, segment.src);
            tcb.shutdown = Some(Shutdown::Reset);
            self.set_state(&mut tcb, TcpState::Closed);
            return Ok(());
        }

        if let Some(expected) = tcb.last_ack_sent {
            if expected != segment.seq_no {
                trace!(
                    "{} dropping segment seq={} (expected {})",
                    tcb.local_addr, segment.seq_no, expected
                );
                return Ok(());
            }
        }

        let next = next_seq_no(segment);
        tcb.last_ack_sent = Some(tcb.last_ack_sent.map_or(next, |ack| ack.later(next)));
        if segment.has_payload() {
            tcb.recv_buffer.write_bytes(&segment.payload);
        }

        let mut reply_flags = TcpFlags::empty();
        let mut fin_slot_pending = false;
        let state = tcb.state;
        match state {
            TcpState::Listen if flags.contains(TcpFlags::SYN) => {
                tcb.remote_addr = Some(segment.src);
                reply_flags = TcpFlags::SYN;
                self.set_state(&mut tcb, TcpState::SynRcvd);
            }
            TcpState::SynRcvd if flags.contains(TcpFlags::ACK) => {
                // Peer acknowledged our SYN
                tcb.seq_no += 1;
                self.set_state(&mut tcb, TcpState::Established);
            }
            TcpState::SynSent => {
                tcb.seq_no += 1;
                self.set_state(&mut tcb, TcpState::Established);
            }
            TcpState::Established if flags.contains(TcpFlags::FIN) => {
                // Our FIN takes the current seq number; advance past it once sent
                reply_flags = TcpFlags::FIN;
                fin_slot_pending = true;
                self.set_state(&mut tcb, TcpState::LastAck);
            }
            TcpState::Established => {}
            TcpState::LastAck if flags.contains(TcpFlags::ACK) => {
                tcb.shutdown = Some(Shutdown::Graceful);
                self.set_state(&mut tcb, TcpState::Closed);
            }
            TcpState::FinWait1 if flags.contains(TcpFlags::FIN) => {
                tcb.seq_no += 1;
                self.set_state(&mut tcb, TcpState::TimeWait);
            }
            _ => {
                warn!("{} got {:?} in state {}, aborting", tcb.local_addr, flags, state);
                tcb.shutdown = Some(Shutdown::Aborted);
                self.set_state(&mut tcb, TcpState::Closed);
                return Err(TcpError::ProtocolViolation { state, flags });
            }
        }

        // Don't ACK an ACK
        if flags.is_pure_ack() && !segment.has_payload() {
            return Ok(());
        }
        if tcb.state == TcpState::Closed {
            return Ok(());
        }

        if let Err(err) = self.send_segment(&mut tcb, reply_flags, &[]) {
            warn!("{} failed to reply in state {}, aborting: {}", tcb.local_addr, tcb.state, err);
            tcb.shutdown = Some(Shutdown::Aborted);
            self.set_state(&mut tcb, TcpState::Closed);
            return Err(err);
        }
        if fin_slot_pending {
            tcb.seq_no += 1;
        }
        Ok(())
    }

    /// Send `payload` as a single segment, blocking until the connection is
    /// established.
    pub fn write(&self, payload: &[u8]) -> Result<(), TcpError> {
        self.write_until(payload, None)
    }

    /// Like `write`, but gives up with `ConnectionTimeout` after `timeout`.
    pub fn write_timeout(&self, payload: &[u8], timeout: Duration) -> Result<(), TcpError> {
        self.write_until(payload, Some(Instant::now() + timeout))
    }

    fn write_until(&self, payload: &[u8], deadline: Option<Instant>) -> Result<(), TcpError> {
        let mut tcb = self.tcb.lock();
        self.await_established(&mut tcb, deadline)?;
        self.send_segment(&mut tcb, TcpFlags::PSH, payload)
    }

    /// Block until the handshake completes. `None` waits forever.
    pub fn wait_established(&self, timeout: Option<Duration>) -> Result<(), TcpError> {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut tcb = self.tcb.lock();
        self.await_established(&mut tcb, deadline)
    }

    fn await_established(
        &self,
        tcb: &mut MutexGuard<'_, TcpControlBlock>,
        deadline: Option<Instant>,
    ) -> Result<(), TcpError> {
        loop {
            if tcb.state == TcpState::Established {
                return Ok(());
            }
            if let Some(shutdown) = tcb.shutdown {
                return Err(shutdown.error());
            }
            // Our FIN is out, nothing more will be sent
            if tcb.state.is_closing() {
                return Err(TcpError::NotConnected);
            }
            if tcb.cancelled {
                return Err(TcpError::Cancelled);
            }
            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return Err(TcpError::ConnectionTimeout);
                    }
                    self.state_changed.wait_until(tcb, deadline);
                }
                None => self.state_changed.wait(tcb),
            }
        }
    }

    /// Wake every blocked writer with `Cancelled`; later waits fail the same way.
    pub fn cancel(&self) {
        let mut tcb = self.tcb.lock();
        tcb.cancelled = true;
        self.state_changed.notify_all();
    }

    /// Everything received since the last call. Never blocks.
    pub fn read(&self) -> Vec<u8> {
        self.tcb.lock().recv_buffer.take_all()
    }

    /// Send our FIN right away. Does not wait for anything.
    ///
    /// Only a connection that can still send may be closed: a reset or
    /// finished connection reports why it ended, and one that already sent
    /// its FIN gets `InvalidState`.
    pub fn close(&self) -> Result<(), TcpError> {
        let mut tcb = self.tcb.lock();
        if let Some(shutdown) = tcb.shutdown {
            return Err(shutdown.error());
        }
        match tcb.state {
            TcpState::SynSent | TcpState::SynRcvd | TcpState::Established => {}
            TcpState::Closed | TcpState::Listen => return Err(TcpError::NotConnected),
            state => {
                return Err(TcpError::InvalidState(format!("already closing (state {})", state)));
            }
        }
        self.send_segment(&mut tcb, TcpFlags::FIN, &[])?;
        self.set_state(&mut tcb, TcpState::FinWait1);
        Ok(())
    }

    pub fn state(&self) -> TcpState {
        self.tcb.lock().state
    }

    pub fn local_addr(&self) -> SocketAddrV4 {
        self.tcb.lock().local_addr
    }

    pub fn remote_addr(&self) -> Option<SocketAddrV4> {
        self.tcb.lock().remote_addr
    }

    pub fn seq_no(&self) -> Wrap32 {
        self.tcb.lock().seq_no
    }

    pub fn last_ack_sent(&self) -> Option<Wrap32> {
        self.tcb.lock().last_ack_sent
    }

    /// Bytes waiting to be `read`
    pub fn bytes_available(&self) -> usize {
        self.tcb.lock().recv_buffer.bytes_available()
    }

    fn check_unused(tcb: &TcpControlBlock) -> Result<(), TcpError> {
        if tcb.state != TcpState::Closed || tcb.registered || tcb.shutdown.is_some() {
            return Err(TcpError::InvalidState(format!(
                "connection already used (state {})",
                tcb.state
            )));
        }
        Ok(())
    }

    fn set_state(&self, tcb: &mut TcpControlBlock, state: TcpState) {
        if tcb.state != state {
            debug!("{} {} -> {}", tcb.local_addr, tcb.state, state);
            tcb.state = state;
            self.state_changed.notify_all();
        }
    }

    /// Every segment we send goes through here. Always ACK unless it's the first one.
    fn send_segment(&self, tcb: &mut TcpControlBlock, flags: TcpFlags, payload: &[u8]) -> Result<(), TcpError> {
        let remote_addr = tcb.remote_addr.ok_or(TcpError::NotConnected)?;
        let flags = if tcb.state == TcpState::Closed {
            flags
        } else {
            flags | TcpFlags::ACK
        };

        let mut segment = TcpSegment::new(tcb.local_addr, remote_addr);
        segment
            .seq_no(tcb.seq_no)
            .ack_no(tcb.last_ack_sent.unwrap_or_default())
            .tcp_flags(flags)
            .payload(payload);
        self.listener.transmit(&segment)?;

        // Update the seq number with the number of bytes sent
        tcb.seq_no += payload.len() as u32;
        Ok(())
    }
}

impl Drop for TcpConn {
    fn drop(&mut self) {
        let tcb = self.tcb.get_mut();
        if tcb.registered {
            self.listener.release(tcb.local_addr);
        }
    }
}

// -- Unit tests --
