//! A room wraps one game and the two seat channels.
//!
//! Every outbound event is journaled per seat; the journal is the canonical
//! history, so a reconnecting seat is caught up by replaying its suffix
//! rather than by re-running the game. Faults inside game handlers abort this
//! room only.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use minefield_rules::prelude::Tile;

use crate::game::{Event, Game, Seat};
use crate::protocol::{ClientMsg, ServerMsg};

/// Process-local connection identifier.
pub type ConnId = u64;

/// What flows out to a socket pump: a wire message, or an order to close.
#[derive(Debug)]
pub enum Outbound {
    Msg(ServerMsg),
    Close,
}

/// The sending half of an attached seat.
#[derive(Clone, Debug)]
pub struct SeatHandle {
    pub conn: ConnId,
    pub tx: mpsc::UnboundedSender<Outbound>,
}

impl SeatHandle {
    fn send(&self, msg: ServerMsg) {
        // A dead receiver just means the socket is gone; the journal keeps
        // the message for replay.
        let _ = self.tx.send(Outbound::Msg(msg));
    }

    fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }
}

/// Persistent image of a room, stored as JSON keyed by room id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: Option<i64>,
    pub nicks: [String; 2],
    pub keys: [String; 2],
    pub aborted: bool,
    pub game: Game,
    pub messages: [Vec<Event>; 2],
}

pub struct Room {
    /// Store-assigned id; `None` until first saved.
    pub id: Option<i64>,
    /// In-process handle, never persisted.
    pub uid: u64,
    pub nicks: [String; 2],
    pub keys: [String; 2],
    game: Game,
    journals: [Vec<Event>; 2],
    seats: [Option<SeatHandle>; 2],
    aborted: bool,
}

impl Room {
    pub fn new(uid: u64, nicks: [String; 2], keys: [String; 2], game: Game) -> Self {
        Self {
            id: None,
            uid,
            nicks,
            keys,
            game,
            journals: [Vec::new(), Vec::new()],
            seats: [None, None],
            aborted: false,
        }
    }

    pub fn from_snapshot(uid: u64, snapshot: RoomSnapshot) -> Self {
        Self {
            id: snapshot.id,
            uid,
            nicks: snapshot.nicks,
            keys: snapshot.keys,
            game: snapshot.game,
            journals: snapshot.messages,
            seats: [None, None],
            aborted: snapshot.aborted,
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id,
            nicks: self.nicks.clone(),
            keys: self.keys.clone(),
            aborted: self.aborted,
            game: self.game.clone(),
            messages: self.journals.clone(),
        }
    }

    pub fn finished(&self) -> bool {
        self.aborted || self.game.finished()
    }

    /// Seconds the game has been running; used for zombie eviction.
    pub fn game_clock(&self) -> u64 {
        self.game.clock()
    }

    pub fn seat_conn(&self, seat: Seat) -> Option<ConnId> {
        self.seats[seat].as_ref().map(|h| h.conn)
    }

    /// The seat owning `key`, if any.
    pub fn seat_of_key(&self, key: &str) -> Option<Seat> {
        self.keys.iter().position(|k| k == key)
    }

    pub fn start_game(&mut self) {
        log::info!("[room {:?}] starting", self.id);
        self.game.start();
        self.pump();
    }

    /// Journals and fans out everything the game emitted.
    fn pump(&mut self) {
        for (seat, event) in self.game.take_events() {
            log::debug!("[room {:?}] send to {}: {:?}", self.id, seat, event);
            self.journals[seat].push(event.clone());
            if let Some(handle) = &self.seats[seat] {
                handle.send(ServerMsg::Game(event));
            }
        }
    }

    /// Installs a seat connection, evicting any previous one, and catches the
    /// seat up: the `room` greeting, the journal suffix past `n_received`
    /// (minus the stateful move markers), then the live pending move.
    pub fn attach(&mut self, seat: Seat, handle: SeatHandle, n_received: usize) {
        if let Some(old) = self.seats[seat].replace(handle.clone()) {
            old.close();
        }
        handle.send(ServerMsg::Room {
            key: self.keys[seat].clone(),
            nicks: self.nicks.clone(),
            you: seat,
        });
        for event in self.journals[seat].iter().skip(n_received) {
            if matches!(event, Event::StartMove { .. } | Event::EndMove) {
                continue;
            }
            log::debug!("[room {:?}] replay to {}: {:?}", self.id, seat, event);
            handle.send(ServerMsg::Replay { msg: event.clone() });
        }
        self.game.send_move(seat);
        self.pump();
    }

    /// Detaches a seat. The room lives on; delivery resumes on re-attach.
    pub fn detach(&mut self, seat: Seat) {
        self.seats[seat] = None;
    }

    /// Routes an inbound seat message into the game. Validation failures have
    /// already been broadcast as `abort` by the game; a panic inside a
    /// handler aborts this room only.
    pub fn send_to_game(&mut self, seat: Seat, msg: ClientMsg) {
        log::info!("[room {:?}] receive from {}: {:?}", self.id, seat, msg);
        let result = catch_unwind(AssertUnwindSafe(|| match msg {
            ClientMsg::Hand { hand } => self.game.on_hand(seat, hand).err(),
            ClientMsg::Discard { tile } => self.game.on_discard(seat, tile).err(),
            _ => None,
        }));
        match result {
            Ok(rejected) => {
                if let Some(e) = rejected {
                    log::warn!("[room {:?}] rejected input from {}: {}", self.id, seat, e);
                }
                self.pump();
            }
            Err(_) => {
                log::error!("[room {:?}] game handler panicked", self.id);
                self.pump();
                self.abort();
            }
        }
    }

    /// Declares a protocol violation by a seat; the game broadcasts the abort.
    pub fn protocol_error(&mut self, seat: Seat, description: &str) {
        self.game.abort(seat, description);
        self.pump();
    }

    /// Advances the game clock. A panic during the tick aborts this room only.
    pub fn beat(&mut self) {
        if self.finished() {
            return;
        }
        let result = catch_unwind(AssertUnwindSafe(|| self.game.beat()));
        self.pump();
        if result.is_err() {
            log::error!("[room {:?}] beat panicked", self.id);
            self.abort();
        }
    }

    /// Marks the room dead and disconnects both seats. Other rooms and the
    /// server are untouched.
    pub fn abort(&mut self) {
        self.aborted = true;
        for seat in 0..2 {
            if let Some(handle) = self.seats[seat].take() {
                handle.close();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn journal(&self, seat: Seat) -> &[Event] {
        &self.journals[seat]
    }
}

/// Generates an opaque rejoin key.
pub fn make_key(rng: &mut impl rand::Rng) -> String {
    use rand::distributions::Alphanumeric;
    (0..16).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// Convenience constructor used by the registry: a room over a fresh game.
pub fn new_room(uid: u64, nicks: [String; 2], rng: &mut impl rand::Rng, wall: &[Tile], east: Seat) -> Room {
    let keys = [make_key(rng), make_key(rng)];
    Room::new(uid, nicks, keys, Game::new(wall, east))
}
