//! Transport traits for network communication
//!
//! These traits define the interface the session drives. Hosts implement
//! them for their chosen network stack (WebSocket + UDP, in-process loopback,
//! etc.). Everything is poll-based: no method may block, and channel
//! completions are reported from `poll`/`recv` inside the session's tick.

use crate::Result;

/// Something that happened on the control channel since the last poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// The channel finished opening and can carry messages
    Opened,
    /// A text message arrived
    Message(String),
    /// The remote end or the transport closed the channel
    Closed,
    /// A transport error was reported
    Error(String),
}

/// Reliable, ordered, text message channel (e.g. WebSocket)
pub trait ControlChannel {
    /// Queue a text message for sending
    fn send_text(&mut self, text: &str) -> Result<()>;

    /// Take the next pending event (non-blocking)
    ///
    /// Returns `None` when nothing is pending.
    fn poll(&mut self) -> Option<ControlEvent>;

    /// Close the channel; no further events are delivered
    fn close(&mut self);
}

/// Unreliable, unordered datagram channel (e.g. UDP)
pub trait DataChannel {
    /// Send one datagram, best effort
    fn send(&mut self, datagram: &[u8]) -> Result<()>;

    /// Receive one datagram (non-blocking)
    ///
    /// Returns `Ok(None)` if no data is available.
    fn recv(&mut self) -> Result<Option<Vec<u8>>>;

    /// Close the channel
    fn close(&mut self);
}

/// Opens the two channels a session needs
///
/// A failed open is reported as an error value; the session logs it and
/// stays disconnected until the next scene transition asks it to connect.
pub trait Connector {
    /// Control channel type
    type Control: ControlChannel;
    /// Data channel type
    type Data: DataChannel;

    /// Start opening the control channel
    ///
    /// Completion is signalled later by [`ControlEvent::Opened`].
    fn open_control(&mut self) -> Result<Self::Control>;

    /// Open the data channel
    fn open_data(&mut self) -> Result<Self::Data>;
}
