//! Session state machine
//!
//! A [`Client`] is the whole client core: it owns both channels, the local
//! identity, the ghost roster and the send scheduler. The host adapter drives
//! it through four methods:
//!
//! - [`on_scene_load`](Client::on_scene_load) when the host changes scene
//! - [`set_player_info`](Client::set_player_info) with the local pose
//! - [`tick`](Client::tick) once per frame
//! - [`ghost_info`](Client::ghost_info) to learn what to render and remove
//!
//! Connect and disconnect requests are deferred to the start of the next
//! tick, so nothing is torn down while a tick is still using it.

use crate::control::{ClientMessage, MessageKind, ServerMessage};
use crate::ghost::{GhostRegistry, GhostUpdate};
use crate::scheduler::UpdateScheduler;
use crate::transport::{ControlChannel, ControlEvent, Connector, DataChannel};
use crate::{Error, Result};
use ghostsync_core::{PeerId, PlayerSnapshot, UpdateNumber, Zone};
use ghostsync_wire::{decode_datagram, encode_record, Record};
use log::{debug, error, info, trace, warn};
use std::mem;
use std::time::Instant;

/// Scenes in which the client stays offline
pub const NON_INTERACTIVE_SCENES: [&str; 2] = ["TitleScreen", "EndScreen"];

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No channels open
    Disconnected,
    /// Channels open, waiting for the server to assign an id
    Connecting,
    /// Local id assigned
    Connected,
}

/// Client-side synchronization core
pub struct Client<C: Connector> {
    /// Opens the channels
    connector: C,
    /// Reliable control channel, while open
    control: Option<C::Control>,
    /// Unreliable data channel, while open
    data: Option<C::Data>,
    /// Identifier assigned by the server's `Connected` message
    local_id: Option<PeerId>,
    /// Zone of the current scene
    zone: Zone,
    /// Latest local pose not yet sent
    pending: Option<PlayerSnapshot>,
    /// Send cadence and local update numbering
    scheduler: UpdateScheduler,
    /// Remote participants
    ghosts: GhostRegistry,
    /// Open channels at the start of the next tick
    queue_connect: bool,
    /// Tear everything down at the start of the next tick
    queue_disconnect: bool,
}

impl<C: Connector> Client<C> {
    /// Create a disconnected session
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            control: None,
            data: None,
            local_id: None,
            zone: Zone::default(),
            pending: None,
            scheduler: UpdateScheduler::default(),
            ghosts: GhostRegistry::new(),
            queue_connect: false,
            queue_disconnect: false,
        }
    }

    /// Handle a scene transition in the host
    ///
    /// Entering a non-interactive scene schedules a disconnect; entering any
    /// other scene schedules a connect unless one is already established.
    pub fn on_scene_load(&mut self, scene: &str) {
        self.zone = Zone::from_name(scene);
        debug!("Scene {scene:?} loaded, now in {}", self.zone);
        if NON_INTERACTIVE_SCENES.contains(&scene) {
            self.queue_disconnect = true;
            self.queue_connect = false;
        } else if self.local_id.is_none() {
            self.queue_connect = true;
        }
    }

    /// Record the latest local pose, replacing any unsent one
    pub fn set_player_info(&mut self, snapshot: PlayerSnapshot) {
        self.pending = Some(snapshot);
    }

    /// Run one tick at the current time
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Run one tick at `now`
    ///
    /// Applies deferred disconnect/connect requests, sends the local pose if
    /// due, then drains the data and control channels.
    pub fn tick_at(&mut self, now: Instant) {
        if mem::take(&mut self.queue_disconnect) {
            self.disconnect();
        }
        if mem::take(&mut self.queue_connect) && !self.has_channel() {
            self.connect();
        }
        self.send_pending(now);
        self.poll_data(now);
        self.poll_control();
    }

    /// What the host should render and remove, at the current time
    pub fn ghost_info(&mut self) -> GhostUpdate {
        self.ghost_info_at(Instant::now())
    }

    /// What the host should render and remove at `now`
    ///
    /// Every spawned peer listed in `removals` has been dropped from the
    /// spawned set, so each removal is reported exactly once.
    pub fn ghost_info_at(&mut self, now: Instant) -> GhostUpdate {
        let local = self.scheduler.update_number(now);
        self.ghosts.collect(local, self.zone)
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        if self.local_id.is_some() {
            ConnectionState::Connected
        } else if self.has_channel() {
            ConnectionState::Connecting
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Identifier assigned by the server, once connected
    pub fn local_id(&self) -> Option<PeerId> {
        self.local_id
    }

    /// Zone of the current scene
    pub fn current_zone(&self) -> Zone {
        self.zone
    }

    /// Local update number at `now`, once the first send has happened
    pub fn local_update_number(&self, now: Instant) -> Option<UpdateNumber> {
        self.scheduler.update_number(now)
    }

    /// Number of remote participants currently known
    pub fn ghost_count(&self) -> usize {
        self.ghosts.len()
    }

    /// Peers the host has been told to render and not yet to remove
    pub fn spawned(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.ghosts.spawned()
    }

    /// Remote participants
    pub fn ghosts(&self) -> &GhostRegistry {
        &self.ghosts
    }

    /// Send scheduler
    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    /// Whether a local pose is waiting to be sent
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn has_channel(&self) -> bool {
        self.control.is_some() || self.data.is_some()
    }

    fn connect(&mut self) {
        match self.open_channels() {
            Ok((control, data)) => {
                info!("Opened control and data channels");
                self.control = Some(control);
                self.data = Some(data);
            }
            Err(err) => error!("Error connecting: {err}"),
        }
    }

    fn open_channels(&mut self) -> Result<(C::Control, C::Data)> {
        let mut control = self.connector.open_control()?;
        match self.connector.open_data() {
            Ok(data) => Ok((control, data)),
            Err(err) => {
                control.close();
                Err(err)
            }
        }
    }

    fn disconnect(&mut self) {
        let had_channel = self.has_channel();
        if let Some(mut control) = self.control.take() {
            control.close();
        }
        if let Some(mut data) = self.data.take() {
            data.close();
        }
        self.local_id = None;
        self.scheduler.reset();
        // Spawned peers stay until the host has been told to remove them
        self.ghosts.clear();
        if had_channel {
            info!("Disconnected");
        }
    }

    fn send_pending(&mut self, now: Instant) {
        let Some(id) = self.local_id else {
            return;
        };
        self.scheduler.advance(now);
        if self.pending.is_none() {
            return;
        }
        let Some(update_number) = self.scheduler.try_send(now) else {
            return;
        };
        let Some(snapshot) = self.pending.take() else {
            return;
        };

        let record = Record {
            peer: id,
            update_number,
            zone: self.zone,
            snapshot: snapshot.with_id(id),
        };
        trace!("Sending update {update_number}");
        if let Some(data) = self.data.as_mut() {
            if let Err(err) = data.send(&encode_record(&record)) {
                warn!("Failed to send update {update_number}: {err}");
            }
        }
    }

    fn poll_data(&mut self, now: Instant) {
        let Some(data) = self.data.as_mut() else {
            return;
        };
        let mut datagrams = Vec::new();
        loop {
            match data.recv() {
                Ok(Some(datagram)) => datagrams.push(datagram),
                Ok(None) => break,
                Err(err) => {
                    error!("Error receiving on data channel: {err}");
                    break;
                }
            }
        }
        for datagram in datagrams {
            if let Err(err) = self.handle_datagram(&datagram, now) {
                warn!("Dropping datagram: {err}");
            }
        }
    }

    /// Decode a datagram and feed its records to the ghosts
    ///
    /// Returns the number of states accepted. Framing errors reject the
    /// whole datagram before any ghost is touched.
    fn handle_datagram(&mut self, datagram: &[u8], now: Instant) -> Result<usize> {
        let records = decode_datagram(datagram)?;
        let Some(local) = self.scheduler.update_number(now) else {
            debug!("Dropping {} states received before the first send", records.len());
            return Ok(0);
        };
        let own = self.local_id;
        let mut accepted = 0;
        for record in records.iter().filter(|r| Some(r.peer) != own) {
            if self.ghosts.receive(record, local) {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    fn poll_control(&mut self) {
        let Some(control) = self.control.as_mut() else {
            return;
        };
        let mut events = Vec::new();
        while let Some(event) = control.poll() {
            events.push(event);
        }
        for event in events {
            self.handle_control_event(event);
        }
    }

    fn handle_control_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Opened => {
                info!("Control channel established");
                if let Err(err) = self.send_connect() {
                    error!("Failed to send Connect: {err}");
                    self.queue_disconnect = true;
                }
            }
            ControlEvent::Message(text) => {
                if let Err(err) = self.handle_control_message(&text) {
                    warn!("Ignoring control message {text}: {err}");
                }
            }
            ControlEvent::Closed => {
                info!("Disconnected from server");
                self.queue_disconnect = true;
            }
            ControlEvent::Error(message) => error!("Control channel error: {message}"),
        }
    }

    fn send_connect(&mut self) -> Result<()> {
        let text = ClientMessage::Connect.to_json()?;
        match self.control.as_mut() {
            Some(control) => control.send_text(&text),
            None => Err(Error::Transport("control channel is not open".to_string())),
        }
    }

    /// Parse a control message and apply it
    ///
    /// Any `Connected` message flags a disconnect up front; only a valid one
    /// arriving while unconnected withdraws that flag again, so a partially
    /// applied identity can never survive. A disconnect queued earlier in
    /// the same tick stays queued.
    fn handle_control_message(&mut self, text: &str) -> Result<()> {
        let parsed = ServerMessage::parse(text);
        let kind = match &parsed {
            Ok(message) => Some(message.kind()),
            Err(err) => err.kind(),
        };
        let already_queued = self.queue_disconnect;
        if kind == Some(MessageKind::Connected) {
            self.queue_disconnect = true;
        }

        match parsed? {
            ServerMessage::Connected { id, players } => {
                if let Some(current) = self.local_id {
                    warn!("Received Connected message while already connected as {current}");
                    return Ok(());
                }
                for player in players {
                    self.ghosts.add(player);
                }
                self.local_id = Some(id);
                self.queue_disconnect = already_queued;
                info!(
                    "Connected as {id} with {} other players",
                    self.ghosts.len()
                );
            }
            ServerMessage::PlayerJoined { id } => {
                if self.local_id.is_none() {
                    debug!("Ignoring PlayerJoined for {id} before Connected");
                    return Ok(());
                }
                self.ghosts.add(id);
                info!("{id} joined");
            }
            ServerMessage::PlayerLeft { id } => {
                if self.local_id.is_none() {
                    debug!("Ignoring PlayerLeft for {id} before Connected");
                    return Ok(());
                }
                self.ghosts.remove(id);
                info!("{id} left");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedConnector, ScriptedHandle};
    use ghostsync_wire::{decode_record, encode_datagram, RECORD_LEN};
    use std::time::Duration;

    const LEVEL: &str = "Level1";

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    fn session() -> (Client<ScriptedConnector>, ScriptedHandle) {
        let _ = env_logger::builder().is_test(true).try_init();
        let (connector, handle) = ScriptedConnector::new();
        (Client::new(connector), handle)
    }

    /// Client that has opened its channels and sent Connect
    fn connecting(t0: Instant) -> (Client<ScriptedConnector>, ScriptedHandle) {
        let (mut session, handle) = session();
        session.on_scene_load(LEVEL);
        session.tick_at(t0);
        (session, handle)
    }

    /// Client connected as peer 1 with peers 2 and 3 already present
    fn connected(t0: Instant) -> (Client<ScriptedConnector>, ScriptedHandle) {
        let (mut session, handle) = connecting(t0);
        handle.push_message(r#"{"type":"Connected","id":1,"players":[2,3]}"#);
        session.tick_at(t0);
        assert_eq!(session.state(), ConnectionState::Connected);
        (session, handle)
    }

    fn remote(peer: u8, update_number: UpdateNumber, x: f64) -> Record {
        Record {
            peer: PeerId(peer),
            update_number,
            zone: Zone::from_name(LEVEL),
            snapshot: PlayerSnapshot::new([x, 0.0, 0.0], [0.0, 0.0, 0.0]),
        }
    }

    /// Connected session whose scheduler has made its first send at `t1`
    fn sending(t0: Instant, t1: Instant) -> (Client<ScriptedConnector>, ScriptedHandle) {
        let (mut session, handle) = connected(t0);
        session.set_player_info(PlayerSnapshot::default());
        session.tick_at(t1);
        assert!(session.scheduler().is_started());
        handle.clear_sent();
        (session, handle)
    }

    #[test]
    fn test_starts_disconnected() {
        let (session, handle) = session();
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(session.local_id(), None);
        assert_eq!(handle.control_opens(), 0);
    }

    #[test]
    fn test_scene_load_connects_on_next_tick() {
        let t0 = Instant::now();
        let (mut session, handle) = session();
        session.on_scene_load(LEVEL);
        assert_eq!(session.current_zone(), Zone::from_name(LEVEL));
        assert_eq!(handle.control_opens(), 0);

        session.tick_at(t0);
        assert_eq!(session.state(), ConnectionState::Connecting);
        assert!(handle.is_control_open());
        assert!(handle.is_data_open());
        assert_eq!(handle.sent_text(), vec![r#"{"type":"Connect"}"#.to_string()]);
    }

    #[test]
    fn test_title_screen_stays_offline() {
        let t0 = Instant::now();
        let (mut session, handle) = session();
        session.on_scene_load("TitleScreen");
        session.tick_at(t0);
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(handle.control_opens(), 0);
    }

    #[test]
    fn test_leaving_to_title_cancels_queued_connect() {
        let t0 = Instant::now();
        let (mut session, handle) = session();
        session.on_scene_load(LEVEL);
        session.on_scene_load("EndScreen");
        session.tick_at(t0);
        assert_eq!(handle.control_opens(), 0);
    }

    #[test]
    fn test_connected_assigns_id_and_ghosts() {
        let t0 = Instant::now();
        let (session, _handle) = connected(t0);
        assert_eq!(session.local_id(), Some(PeerId(1)));
        assert_eq!(session.ghosts().len(), 2);
        assert!(session.ghosts().contains(PeerId(2)));
        assert!(session.ghosts().contains(PeerId(3)));
    }

    #[test]
    fn test_connected_with_empty_roster() {
        let t0 = Instant::now();
        let (mut session, handle) = connecting(t0);
        handle.push_message(r#"{"type":"Connected","id":0,"players":[]}"#);
        session.tick_at(t0);
        assert_eq!(session.local_id(), Some(PeerId(0)));
        assert!(session.ghosts().is_empty());

        // The disconnect flag was cleared, so the next tick keeps the session
        session.tick_at(ms(t0, 1));
        assert_eq!(session.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_scene_load_while_connected_does_not_reconnect() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        session.on_scene_load("Level2");
        session.tick_at(ms(t0, 1));
        assert_eq!(handle.control_opens(), 1);
        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(session.current_zone(), Zone::from_name("Level2"));
    }

    #[test]
    fn test_duplicate_connected_disconnects() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        handle.push_message(r#"{"type":"Connected","id":5,"players":[]}"#);
        session.tick_at(ms(t0, 1));
        assert_eq!(session.local_id(), Some(PeerId(1)));
        assert_eq!(session.ghosts().len(), 2);

        session.tick_at(ms(t0, 2));
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(!handle.is_control_open());
        assert!(session.ghosts().is_empty());
    }

    #[test]
    fn test_out_of_range_id_rejected() {
        let t0 = Instant::now();
        let (mut session, handle) = connecting(t0);
        handle.push_message(r#"{"type":"Connected","id":300,"players":[]}"#);
        session.tick_at(t0);
        assert_eq!(session.local_id(), None);
        assert_eq!(session.state(), ConnectionState::Connecting);

        session.tick_at(ms(t0, 1));
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(!handle.is_data_open());
    }

    #[test]
    fn test_bad_roster_entry_rejected() {
        let t0 = Instant::now();
        let (mut session, handle) = connecting(t0);
        handle.push_message(r#"{"type":"Connected","id":1,"players":[2,"three"]}"#);
        session.tick_at(t0);
        assert_eq!(session.local_id(), None);
        assert!(session.ghosts().is_empty());

        session.tick_at(ms(t0, 1));
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_garbage_control_messages_ignored() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        for text in ["not json", "[1,2]", r#"{"id":2}"#, r#"{"type":7}"#, r#"{"type":"Dance"}"#] {
            handle.push_message(text);
        }
        session.tick_at(ms(t0, 1));
        session.tick_at(ms(t0, 2));
        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(session.ghosts().len(), 2);
    }

    #[test]
    fn test_roster_changes_ignored_before_connected() {
        let t0 = Instant::now();
        let (mut session, handle) = connecting(t0);
        handle.push_message(r#"{"type":"PlayerJoined","id":4}"#);
        handle.push_message(r#"{"type":"PlayerLeft","id":2}"#);
        session.tick_at(t0);
        assert!(session.ghosts().is_empty());
        assert_eq!(session.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_roster_changes_after_connected() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        handle.push_message(r#"{"type":"PlayerJoined","id":4}"#);
        handle.push_message(r#"{"type":"PlayerLeft","id":2}"#);
        session.tick_at(ms(t0, 1));
        let ids: Vec<_> = session.ghosts().ids().collect();
        assert_eq!(ids, vec![PeerId(3), PeerId(4)]);
    }

    #[test]
    fn test_invalid_join_ignored() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        handle.push_message(r#"{"type":"PlayerJoined","id":-1}"#);
        session.tick_at(ms(t0, 1));
        assert_eq!(session.ghosts().len(), 2);
        assert_eq!(session.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_closed_event_disconnects_next_tick() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        handle.push_event(ControlEvent::Closed);
        session.tick_at(ms(t0, 1));
        assert_eq!(session.state(), ConnectionState::Connected);

        session.tick_at(ms(t0, 2));
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(!handle.is_control_open());
        assert!(!handle.is_data_open());
    }

    #[test]
    fn test_closed_before_connected_still_disconnects() {
        let t0 = Instant::now();
        let (mut session, handle) = connecting(t0);
        handle.push_event(ControlEvent::Closed);
        handle.push_message(r#"{"type":"Connected","id":1,"players":[]}"#);
        session.tick_at(t0);
        assert_eq!(session.local_id(), Some(PeerId(1)));

        session.tick_at(ms(t0, 1));
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(!handle.is_control_open());
    }

    #[test]
    fn test_error_event_only_logged() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        handle.push_event(ControlEvent::Error("timeout".to_string()));
        session.tick_at(ms(t0, 1));
        session.tick_at(ms(t0, 2));
        assert_eq!(session.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_control_open_failure() {
        let t0 = Instant::now();
        let (mut session, handle) = session();
        handle.fail_control_open(true);
        session.on_scene_load(LEVEL);
        session.tick_at(t0);
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(handle.control_opens(), 0);

        // No retry until the next scene load
        handle.fail_control_open(false);
        session.tick_at(ms(t0, 1));
        assert_eq!(handle.control_opens(), 0);
        session.on_scene_load(LEVEL);
        session.tick_at(ms(t0, 2));
        assert_eq!(session.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_data_open_failure_closes_control() {
        let t0 = Instant::now();
        let (mut session, handle) = session();
        handle.fail_data_open(true);
        session.on_scene_load(LEVEL);
        session.tick_at(t0);
        assert_eq!(handle.control_opens(), 1);
        assert!(!handle.is_control_open());
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(handle.sent_text().is_empty());
    }

    #[test]
    fn test_data_receive_error_keeps_session() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        handle.fail_data_recv(true);
        session.tick_at(ms(t0, 1));
        assert_eq!(session.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_no_send_before_connected() {
        let t0 = Instant::now();
        let (mut session, handle) = connecting(t0);
        session.set_player_info(PlayerSnapshot::default());
        session.tick_at(ms(t0, 20));
        assert!(handle.sent_datagrams().is_empty());
        assert!(session.has_pending());
    }

    #[test]
    fn test_first_send_is_update_zero() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        session.set_player_info(PlayerSnapshot::new([1.0, 2.0, 3.0], [0.0, 90.0, 0.0]));
        session.tick_at(ms(t0, 3));

        let sent = handle.sent_datagrams();
        assert_eq!(sent.len(), 1);
        let bytes: [u8; RECORD_LEN] = sent[0].as_slice().try_into().unwrap();
        let record = decode_record(&bytes);
        assert_eq!(record.peer, PeerId(1));
        assert_eq!(record.update_number, 0);
        assert_eq!(record.zone, Zone::from_name(LEVEL));
        assert_eq!(record.snapshot.location(), [1.0, 2.0, 3.0]);
        assert!(!session.has_pending());
    }

    #[test]
    fn test_send_cadence() {
        let t0 = Instant::now();
        let (mut session, handle) = sending(t0, ms(t0, 1));

        session.set_player_info(PlayerSnapshot::default());
        session.tick_at(ms(t0, 6));
        assert!(handle.sent_datagrams().is_empty());
        assert!(session.has_pending());

        session.tick_at(ms(t0, 19));
        let sent = handle.sent_datagrams();
        assert_eq!(sent.len(), 1);
        let bytes: [u8; RECORD_LEN] = sent[0].as_slice().try_into().unwrap();
        assert_eq!(decode_record(&bytes).update_number, 18);
    }

    #[test]
    fn test_skipped_send_keeps_latest_pose() {
        let t0 = Instant::now();
        let (mut session, handle) = sending(t0, ms(t0, 1));

        session.set_player_info(PlayerSnapshot::new([1.0, 0.0, 0.0], [0.0; 3]));
        session.tick_at(ms(t0, 6));
        session.set_player_info(PlayerSnapshot::new([2.0, 0.0, 0.0], [0.0; 3]));
        session.tick_at(ms(t0, 19));

        let sent = handle.sent_datagrams();
        assert_eq!(sent.len(), 1);
        let bytes: [u8; RECORD_LEN] = sent[0].as_slice().try_into().unwrap();
        assert_eq!(decode_record(&bytes).snapshot.location(), [2.0, 0.0, 0.0]);
        assert!(!session.has_pending());
    }

    #[test]
    fn test_local_update_number_follows_first_send() {
        let t0 = Instant::now();
        let (mut session, _handle) = connected(t0);
        assert_eq!(session.local_update_number(ms(t0, 5)), None);

        session.set_player_info(PlayerSnapshot::default());
        session.tick_at(ms(t0, 10));
        assert_eq!(session.local_update_number(ms(t0, 10)), Some(0));
        assert_eq!(session.local_update_number(ms(t0, 110)), Some(100));

        session.on_scene_load("TitleScreen");
        session.tick_at(ms(t0, 120));
        assert_eq!(session.local_update_number(ms(t0, 130)), None);
    }

    #[test]
    fn test_nothing_sent_without_new_pose() {
        let t0 = Instant::now();
        let (mut session, handle) = sending(t0, ms(t0, 1));
        session.tick_at(ms(t0, 40));
        session.tick_at(ms(t0, 80));
        assert!(handle.sent_datagrams().is_empty());
    }

    #[test]
    fn test_states_before_first_send_dropped() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        handle.push_datagram(encode_datagram(&[remote(2, 500, 1.0)]).unwrap());
        session.tick_at(ms(t0, 1));
        let ghost = session.ghosts().get(PeerId(2)).unwrap();
        assert!(ghost.history().is_empty());
    }

    #[test]
    fn test_datagram_feeds_ghosts() {
        let t0 = Instant::now();
        let t1 = ms(t0, 1);
        let (mut session, handle) = sending(t0, t1);

        let datagram = encode_datagram(&[remote(2, 500, 1.0), remote(3, 700, 2.0)]).unwrap();
        assert_eq!(datagram.len(), 48);
        handle.push_datagram(datagram);
        session.tick_at(t1);

        let update = session.ghost_info_at(t1);
        assert_eq!(update.updates.len(), 2);
        assert_eq!(update.updates[0].id(), PeerId(2));
        assert_eq!(update.updates[0].location(), [1.0, 0.0, 0.0]);
        assert_eq!(update.updates[1].id(), PeerId(3));
        assert!(update.removals.is_empty());
        let spawned: Vec<_> = session.ghosts().spawned().collect();
        assert_eq!(spawned, vec![PeerId(2), PeerId(3)]);
    }

    #[test]
    fn test_misframed_datagram_rejected_whole() {
        let t0 = Instant::now();
        let t1 = ms(t0, 1);
        let (mut session, handle) = sending(t0, t1);

        let mut datagram = encode_datagram(&[remote(2, 500, 1.0), remote(3, 700, 2.0)]).unwrap();
        datagram.extend_from_slice(&[0, 0]);
        assert_eq!(datagram.len(), 50);
        handle.push_datagram(datagram);
        session.tick_at(t1);

        for peer in [2, 3] {
            assert!(session.ghosts().get(PeerId(peer)).unwrap().history().is_empty());
        }
        assert!(session.ghost_info_at(t1).is_empty());
    }

    #[test]
    fn test_own_echo_ignored() {
        let t0 = Instant::now();
        let t1 = ms(t0, 1);
        let (mut session, handle) = sending(t0, t1);
        handle.push_datagram(encode_datagram(&[remote(1, 500, 1.0)]).unwrap());
        session.tick_at(t1);
        assert!(!session.ghosts().contains(PeerId(1)));
        assert!(session.ghost_info_at(t1).is_empty());
    }

    #[test]
    fn test_ghost_in_other_zone_not_rendered() {
        let t0 = Instant::now();
        let t1 = ms(t0, 1);
        let (mut session, handle) = sending(t0, t1);
        let mut record = remote(2, 500, 1.0);
        record.zone = Zone::from_name("Level2");
        handle.push_datagram(encode_datagram(&[record]).unwrap());
        session.tick_at(t1);
        assert!(session.ghost_info_at(t1).updates.is_empty());
    }

    #[test]
    fn test_zone_exit_tears_down_and_reports_removals() {
        let t0 = Instant::now();
        let t1 = ms(t0, 1);
        let (mut session, handle) = sending(t0, t1);
        let datagram = encode_datagram(&[remote(2, 500, 1.0), remote(3, 700, 2.0)]).unwrap();
        handle.push_datagram(datagram);
        session.tick_at(t1);
        assert_eq!(session.ghost_info_at(t1).updates.len(), 2);

        session.on_scene_load("TitleScreen");
        session.tick_at(ms(t0, 2));
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(session.ghost_count(), 0);
        assert!(!session.scheduler().is_started());
        assert_eq!(session.spawned().count(), 2);

        let update = session.ghost_info_at(ms(t0, 3));
        assert!(update.updates.is_empty());
        assert_eq!(update.removals, vec![PeerId(2), PeerId(3)]);
        assert!(session.ghost_info_at(ms(t0, 4)).is_empty());
    }

    #[test]
    fn test_reconnect_after_zone_exit() {
        let t0 = Instant::now();
        let (mut session, handle) = connected(t0);
        session.on_scene_load("TitleScreen");
        session.tick_at(ms(t0, 1));
        session.on_scene_load(LEVEL);
        session.tick_at(ms(t0, 2));
        assert_eq!(handle.control_opens(), 2);
        assert_eq!(session.state(), ConnectionState::Connecting);
    }
}
