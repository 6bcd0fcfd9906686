//! Scripted in-memory connector
//!
//! Lets tests drive a [`Client`](crate::Client) without a network. The
//! [`ScriptedHandle`] shares state with the channels the connector hands out,
//! so a test can inject server events and inspect what the client sent after
//! the session has taken ownership of the connector.

use crate::transport::{ControlChannel, ControlEvent, Connector, DataChannel};
use crate::{Error, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Wire {
    control_inbox: VecDeque<ControlEvent>,
    data_inbox: VecDeque<Vec<u8>>,
    sent_text: Vec<String>,
    sent_datagrams: Vec<Vec<u8>>,
    control_open: bool,
    data_open: bool,
    control_opens: usize,
    fail_control_open: bool,
    fail_data_open: bool,
    fail_data_recv: bool,
}

/// Test-side view of the scripted channels
#[derive(Debug, Clone, Default)]
pub struct ScriptedHandle {
    wire: Rc<RefCell<Wire>>,
}

impl ScriptedHandle {
    /// Queue a control event for the next poll
    pub fn push_event(&self, event: ControlEvent) {
        self.wire.borrow_mut().control_inbox.push_back(event);
    }

    /// Queue a control text message for the next poll
    pub fn push_message(&self, text: impl Into<String>) {
        self.push_event(ControlEvent::Message(text.into()));
    }

    /// Queue a datagram for the next receive
    pub fn push_datagram(&self, datagram: impl Into<Vec<u8>>) {
        self.wire.borrow_mut().data_inbox.push_back(datagram.into());
    }

    /// Text messages sent by the client so far
    pub fn sent_text(&self) -> Vec<String> {
        self.wire.borrow().sent_text.clone()
    }

    /// Datagrams sent by the client so far
    pub fn sent_datagrams(&self) -> Vec<Vec<u8>> {
        self.wire.borrow().sent_datagrams.clone()
    }

    /// Forget recorded outbound traffic
    pub fn clear_sent(&self) {
        let mut wire = self.wire.borrow_mut();
        wire.sent_text.clear();
        wire.sent_datagrams.clear();
    }

    /// Whether the control channel is currently open
    pub fn is_control_open(&self) -> bool {
        self.wire.borrow().control_open
    }

    /// Whether the data channel is currently open
    pub fn is_data_open(&self) -> bool {
        self.wire.borrow().data_open
    }

    /// Number of successful control channel opens
    pub fn control_opens(&self) -> usize {
        self.wire.borrow().control_opens
    }

    /// Make subsequent control channel opens fail
    pub fn fail_control_open(&self, fail: bool) {
        self.wire.borrow_mut().fail_control_open = fail;
    }

    /// Make subsequent data channel opens fail
    pub fn fail_data_open(&self, fail: bool) {
        self.wire.borrow_mut().fail_data_open = fail;
    }

    /// Make data channel receives fail
    pub fn fail_data_recv(&self, fail: bool) {
        self.wire.borrow_mut().fail_data_recv = fail;
    }
}

/// Connector whose channels are backed by a [`ScriptedHandle`]
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    handle: ScriptedHandle,
}

impl ScriptedConnector {
    /// Create a connector and the handle that scripts it
    pub fn new() -> (Self, ScriptedHandle) {
        let connector = Self::default();
        let handle = connector.handle.clone();
        (connector, handle)
    }
}

impl Connector for ScriptedConnector {
    type Control = ScriptedControl;
    type Data = ScriptedData;

    fn open_control(&mut self) -> Result<ScriptedControl> {
        let mut wire = self.handle.wire.borrow_mut();
        if wire.fail_control_open {
            return Err(Error::Transport("control channel refused".to_string()));
        }
        wire.control_open = true;
        wire.control_opens += 1;
        wire.control_inbox.clear();
        wire.control_inbox.push_back(ControlEvent::Opened);
        Ok(ScriptedControl {
            wire: self.handle.wire.clone(),
        })
    }

    fn open_data(&mut self) -> Result<ScriptedData> {
        let mut wire = self.handle.wire.borrow_mut();
        if wire.fail_data_open {
            return Err(Error::Transport("data channel refused".to_string()));
        }
        wire.data_open = true;
        wire.data_inbox.clear();
        Ok(ScriptedData {
            wire: self.handle.wire.clone(),
        })
    }
}

/// Scripted control channel
#[derive(Debug)]
pub struct ScriptedControl {
    wire: Rc<RefCell<Wire>>,
}

impl ControlChannel for ScriptedControl {
    fn send_text(&mut self, text: &str) -> Result<()> {
        let mut wire = self.wire.borrow_mut();
        if !wire.control_open {
            return Err(Error::Transport("control channel closed".to_string()));
        }
        wire.sent_text.push(text.to_string());
        Ok(())
    }

    fn poll(&mut self) -> Option<ControlEvent> {
        let mut wire = self.wire.borrow_mut();
        if !wire.control_open {
            return None;
        }
        wire.control_inbox.pop_front()
    }

    fn close(&mut self) {
        let mut wire = self.wire.borrow_mut();
        wire.control_open = false;
        wire.control_inbox.clear();
    }
}

/// Scripted data channel
#[derive(Debug)]
pub struct ScriptedData {
    wire: Rc<RefCell<Wire>>,
}

impl DataChannel for ScriptedData {
    fn send(&mut self, datagram: &[u8]) -> Result<()> {
        let mut wire = self.wire.borrow_mut();
        if !wire.data_open {
            return Err(Error::Transport("data channel closed".to_string()));
        }
        wire.sent_datagrams.push(datagram.to_vec());
        Ok(())
    }

    fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        let mut wire = self.wire.borrow_mut();
        if wire.fail_data_recv {
            return Err(Error::Transport("data channel receive failed".to_string()));
        }
        if !wire.data_open {
            return Ok(None);
        }
        Ok(wire.data_inbox.pop_front())
    }

    fn close(&mut self) {
        let mut wire = self.wire.borrow_mut();
        wire.data_open = false;
        wire.data_inbox.clear();
    }
}
