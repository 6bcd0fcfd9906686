//! Loopback Example
//!
//! Runs a client session against a relay living in the same process.
//! The relay assigns us an id, introduces one other participant and
//! answers every snapshot we send with our own echo plus that participant
//! walking a circle around us. Set `RUST_LOG=debug` to watch the client.

use ghostsync_core::{PeerId, PlayerSnapshot, UpdateNumber, Zone};
use ghostsync_netcode::{
    Client, ClientConfig, Connector, ControlChannel, ControlEvent, DataChannel, ServerMessage,
};
use ghostsync_wire::{decode_datagram, encode_datagrams, Record};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

const SCENE: &str = "Zone_Library";
const FRAMES: u32 = 120;
const FRAME_TIME: Duration = Duration::from_millis(16);

const CLIENT_ID: PeerId = PeerId(1);
const WALKER_ID: PeerId = PeerId(2);
/// How far the walker's clock runs ahead of ours
const WALKER_CLOCK_AHEAD: UpdateNumber = 250;

/// Server state shared by both channels
#[derive(Default)]
struct Relay {
    control_inbox: VecDeque<ControlEvent>,
    datagrams: VecDeque<Vec<u8>>,
}

impl Relay {
    fn on_text(&mut self, text: &str) -> ghostsync_netcode::Result<()> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ghostsync_netcode::Error::Serialization(e.to_string()))?;
        if value["type"] == "Connect" {
            log::info!("Relay: assigning {CLIENT_ID}, introducing {WALKER_ID}");
            let connected = ServerMessage::Connected {
                id: CLIENT_ID,
                players: vec![WALKER_ID],
            };
            self.control_inbox
                .push_back(ControlEvent::Message(connected.to_json()?));
        }
        Ok(())
    }

    fn on_datagram(&mut self, datagram: &[u8]) -> ghostsync_netcode::Result<()> {
        let mut records = decode_datagram(datagram)?;
        let walker: Vec<Record> = records.iter().map(walker_near).collect();
        records.extend(walker);
        self.datagrams.extend(encode_datagrams(&records));
        Ok(())
    }
}

/// The walker's state matching one of ours
fn walker_near(ours: &Record) -> Record {
    let angle = f64::from(ours.update_number) / 1000.0;
    let [x, y, z] = ours.snapshot.location();
    Record {
        peer: WALKER_ID,
        update_number: ours.update_number.saturating_add(WALKER_CLOCK_AHEAD),
        zone: ours.zone,
        snapshot: PlayerSnapshot::new(
            [x + 200.0 * angle.cos(), y + 200.0 * angle.sin(), z],
            [0.0, angle.to_degrees() + 90.0, 0.0],
        ),
    }
}

struct LoopbackConnector {
    relay: Rc<RefCell<Relay>>,
}

impl Connector for LoopbackConnector {
    type Control = LoopbackControl;
    type Data = LoopbackData;

    fn open_control(&mut self) -> ghostsync_netcode::Result<LoopbackControl> {
        self.relay
            .borrow_mut()
            .control_inbox
            .push_back(ControlEvent::Opened);
        Ok(LoopbackControl {
            relay: Rc::clone(&self.relay),
        })
    }

    fn open_data(&mut self) -> ghostsync_netcode::Result<LoopbackData> {
        Ok(LoopbackData {
            relay: Rc::clone(&self.relay),
        })
    }
}

struct LoopbackControl {
    relay: Rc<RefCell<Relay>>,
}

impl ControlChannel for LoopbackControl {
    fn send_text(&mut self, text: &str) -> ghostsync_netcode::Result<()> {
        self.relay.borrow_mut().on_text(text)
    }

    fn poll(&mut self) -> Option<ControlEvent> {
        self.relay.borrow_mut().control_inbox.pop_front()
    }

    fn close(&mut self) {
        self.relay.borrow_mut().control_inbox.clear();
    }
}

struct LoopbackData {
    relay: Rc<RefCell<Relay>>,
}

impl DataChannel for LoopbackData {
    fn send(&mut self, datagram: &[u8]) -> ghostsync_netcode::Result<()> {
        self.relay.borrow_mut().on_datagram(datagram)
    }

    fn recv(&mut self) -> ghostsync_netcode::Result<Option<Vec<u8>>> {
        Ok(self.relay.borrow_mut().datagrams.pop_front())
    }

    fn close(&mut self) {
        self.relay.borrow_mut().datagrams.clear();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Ghostsync Loopback Example ===\n");

    let config = ClientConfig::load("settings.ron")?;
    println!(
        "Playing as {:?} (color {:?}), relay standing in for {}\n",
        config.name(),
        config.color(),
        config.control_uri()
    );

    let relay = Rc::new(RefCell::new(Relay::default()));
    let mut client = Client::new(LoopbackConnector { relay });
    client.on_scene_load(SCENE);
    println!("Entered {SCENE} ({})", Zone::from_name(SCENE));

    let start = Instant::now();
    for frame in 0..FRAMES {
        let t = start.elapsed().as_secs_f64();
        client.set_player_info(PlayerSnapshot::new(
            [100.0 * t, 0.0, 0.0],
            [0.0, 30.0 * t, 0.0],
        ));
        client.tick();

        let update = client.ghost_info();
        if frame % 20 == 0 {
            println!("Frame {frame:3}: {:?}", client.state());
            for snapshot in &update.updates {
                let [x, y, z] = snapshot.location();
                println!(
                    "  {} at ({x:8.1}, {y:8.1}, {z:6.1}) facing {:6.1}",
                    snapshot.id(),
                    snapshot.rotation()[1]
                );
            }
        }
        for id in &update.removals {
            println!("  despawn {id}");
        }

        thread::sleep(FRAME_TIME);
    }

    println!("\nReturning to the title screen");
    client.on_scene_load("TitleScreen");
    client.tick();
    let update = client.ghost_info();
    for id in &update.removals {
        println!("  despawn {id}");
    }
    println!("Final state: {:?}", client.state());

    println!("\n=== Example Complete ===");
    Ok(())
}
