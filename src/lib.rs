//! A small user-space TCP: a connection state machine fed with segments by an
//! external packet transport, with a blocking `write` and a non-blocking `read`.
//!
//! Encoding segments to bytes and putting them on the wire is left to a
//! [`tcp::SegmentSink`]; inbound segments are handed to
//! [`tcp::Listener::dispatch`].

pub mod tcp;
