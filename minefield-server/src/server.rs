//! The session registry: waiting players, rooms, connection routing and the
//! periodic heartbeat.
//!
//! `GameServer` is transport-agnostic. The net layer feeds it connections,
//! parsed messages and ticks; everything here runs on the single server
//! context, so no state is shared across tasks.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use crate::game::{self, Seat};
use crate::protocol::{ClientMsg, LobbyEntry, ServerMsg};
use crate::room::{make_key, new_room, ConnId, Outbound, Room, SeatHandle};
use crate::store::Store;

/// Heartbeats between persistence sweeps.
const SAVE_INTERVAL: u64 = 30;

/// A game stuck this long is aborted by the sweep.
const ZOMBIE_SECONDS: u64 = 60 * 60;

struct Conn {
    tx: mpsc::UnboundedSender<Outbound>,
    /// Waiting-list key while advertised.
    waiting_key: Option<String>,
    /// `(room uid, seat)` while seated.
    seat: Option<(u64, Seat)>,
}

struct Waiting {
    nick: String,
    conn: ConnId,
}

pub struct GameServer {
    waiting: FxHashMap<String, Waiting>,
    rooms: Vec<Room>,
    conns: FxHashMap<ConnId, Conn>,
    store: Box<dyn Store>,
    rng: StdRng,
    /// Heartbeats since startup.
    t: u64,
    next_uid: u64,
    /// Deterministic deals (and East fixed to seat 0) for debugging.
    debug: bool,
}

impl GameServer {
    /// Builds the registry, restoring every unfinished room from the store.
    pub fn new(mut store: Box<dyn Store>, debug: bool) -> Result<Self> {
        let mut next_uid = 0;
        let rooms: Vec<Room> = store
            .load_unfinished()?
            .into_iter()
            .map(|snapshot| {
                next_uid += 1;
                Room::from_snapshot(next_uid, snapshot)
            })
            .collect();
        if !rooms.is_empty() {
            log::info!("restored {} unfinished rooms", rooms.len());
        }
        Ok(Self {
            waiting: FxHashMap::default(),
            rooms,
            conns: FxHashMap::default(),
            store,
            rng: StdRng::from_entropy(),
            t: 0,
            next_uid,
            debug,
        })
    }

    pub fn connect(&mut self, conn: ConnId, tx: mpsc::UnboundedSender<Outbound>) {
        log::info!("[connect] {conn}");
        self.conns.insert(conn, Conn { tx, waiting_key: None, seat: None });
    }

    /// A socket went away: drop the waiting entry or suspend the seat. The
    /// room is never destroyed by a disconnect.
    pub fn disconnect(&mut self, conn: ConnId) {
        log::info!("[disconnect] {conn}");
        let Some(state) = self.conns.remove(&conn) else { return };
        if let Some(key) = state.waiting_key {
            self.waiting.remove(&key);
        }
        if let Some((uid, seat)) = state.seat {
            if let Some(room) = self.room_mut(uid) {
                if room.seat_conn(seat) == Some(conn) {
                    room.detach(seat);
                }
            }
        }
    }

    pub fn handle(&mut self, conn: ConnId, msg: ClientMsg) {
        if !self.conns.contains_key(&conn) {
            return;
        }
        match msg {
            ClientMsg::NewGame { nick } => self.add_player(conn, nick),
            ClientMsg::CancelNewGame {} => self.cancel_player(conn),
            ClientMsg::Join { nick, key } => self.join_player(conn, nick, &key),
            ClientMsg::Rejoin { key, n_received } => self.rejoin_player(conn, &key, n_received),
            ClientMsg::GetGames {} => self.send_games(conn),
            msg @ (ClientMsg::Hand { .. } | ClientMsg::Discard { .. }) => {
                match self.conns[&conn].seat {
                    Some((uid, seat)) => {
                        if let Some(room) = self.room_mut(uid) {
                            room.send_to_game(seat, msg);
                        }
                    }
                    None => log::warn!("[{conn}] game message while not seated"),
                }
            }
        }
    }

    /// An unparseable frame. Seated connections forfeit their game; lobby
    /// connections are just cut.
    pub fn protocol_error(&mut self, conn: ConnId, description: &str) {
        log::warn!("[{conn}] protocol error: {description}");
        match self.conns.get(&conn).and_then(|c| c.seat) {
            Some((uid, seat)) => {
                if let Some(room) = self.room_mut(uid) {
                    room.protocol_error(seat, description);
                }
            }
            None => {
                if let Some(state) = self.conns.get(&conn) {
                    let _ = state.tx.send(Outbound::Close);
                }
            }
        }
    }

    /// One heartbeat: tick every room; periodically persist, evict finished
    /// rooms nobody is attached to, and abort zombies.
    pub fn beat(&mut self) {
        self.t += 1;
        for room in &mut self.rooms {
            room.beat();
        }
        if self.t % SAVE_INTERVAL == 0 {
            self.sweep();
        }
    }

    /// Persists everything and releases dead rooms.
    pub fn stop(&mut self) {
        log::info!("stopping");
        self.save_rooms();
    }

    fn sweep(&mut self) {
        for i in 0..self.rooms.len() {
            if !self.rooms[i].finished() && self.rooms[i].game_clock() > ZOMBIE_SECONDS {
                log::warn!("aborting zombie room {:?}", self.rooms[i].id);
                self.rooms[i].abort();
            }
        }
        self.save_rooms();
        self.rooms.retain(|room| {
            let idle = room.seat_conn(0).is_none() && room.seat_conn(1).is_none();
            if room.finished() && idle {
                log::info!("removing inactive room {:?} from memory", room.id);
                false
            } else {
                true
            }
        });
    }

    fn save_rooms(&mut self) {
        log::debug!("saving {} rooms", self.rooms.len());
        for room in &mut self.rooms {
            if let Err(e) = self.store.save_room(room) {
                log::error!("failed to save room {:?}: {e:#}", room.id);
            }
        }
    }

    fn room_mut(&mut self, uid: u64) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.uid == uid)
    }

    fn add_player(&mut self, conn: ConnId, nick: String) {
        let Some(state) = self.conns.get_mut(&conn) else { return };
        if state.seat.is_some() || state.waiting_key.is_some() {
            log::warn!("[{conn}] new_game while already engaged");
            return;
        }
        let key = make_key(&mut self.rng);
        state.waiting_key = Some(key.clone());
        self.waiting.insert(key, Waiting { nick, conn });
    }

    fn cancel_player(&mut self, conn: ConnId) {
        if let Some(state) = self.conns.get_mut(&conn) {
            if let Some(key) = state.waiting_key.take() {
                self.waiting.remove(&key);
            }
        }
    }

    fn join_player(&mut self, conn: ConnId, nick: String, key: &str) {
        let Some(opponent) = self.waiting.remove(key) else {
            self.send_to(conn, ServerMsg::JoinFailed {
                description: "Opponent not found.".into(),
            });
            return;
        };
        if let Some(state) = self.conns.get_mut(&opponent.conn) {
            state.waiting_key = None;
        }

        self.next_uid += 1;
        let uid = self.next_uid;
        let east = if self.debug { 0 } else { self.rng.gen_range(0..2) };
        let wall = if self.debug {
            game::stacked_wall()
        } else {
            game::shuffled_wall(&mut self.rng)
        };
        let mut room = new_room(uid, [opponent.nick, nick], &mut self.rng, &wall, east);

        for (seat, &conn_id) in [opponent.conn, conn].iter().enumerate() {
            if let Some(state) = self.conns.get_mut(&conn_id) {
                state.seat = Some((uid, seat));
                room.attach(seat, SeatHandle { conn: conn_id, tx: state.tx.clone() }, 0);
            }
        }
        room.start_game();
        // First save assigns the persistent id.
        if let Err(e) = self.store.save_room(&mut room) {
            log::error!("failed to save new room: {e:#}");
        }
        self.rooms.push(room);
    }

    fn rejoin_player(&mut self, conn: ConnId, key: &str, n_received: usize) {
        let Some((uid, seat)) = self
            .rooms
            .iter()
            .find_map(|r| r.seat_of_key(key).map(|seat| (r.uid, seat)))
        else {
            self.send_to(conn, ServerMsg::JoinFailed { description: "No such game.".into() });
            return;
        };

        // Evict whoever currently holds the seat.
        let evicted = self.room_mut(uid).and_then(|r| r.seat_conn(seat));
        if let Some(old_conn) = evicted {
            if old_conn != conn {
                if let Some(old) = self.conns.get_mut(&old_conn) {
                    old.seat = None;
                }
            }
        }

        let Some(state) = self.conns.get_mut(&conn) else { return };
        state.seat = Some((uid, seat));
        let handle = SeatHandle { conn, tx: state.tx.clone() };
        if let Some(room) = self.room_mut(uid) {
            room.attach(seat, handle, n_received);
        }
    }

    fn send_games(&mut self, conn: ConnId) {
        let mut games: Vec<LobbyEntry> = self
            .rooms
            .iter()
            .filter(|room| !room.finished())
            .map(|room| LobbyEntry::Game { nicks: room.nicks.clone() })
            .collect();
        games.extend(self.waiting.iter().map(|(key, w)| LobbyEntry::Player {
            nick: w.nick.clone(),
            key: key.clone(),
        }));
        self.send_to(conn, ServerMsg::Games { games });
    }

    fn send_to(&self, conn: ConnId, msg: ServerMsg) {
        if let Some(state) = self.conns.get(&conn) {
            let _ = state.tx.send(Outbound::Msg(msg));
        }
    }

    /// Diagnostic text for the `/dump` endpoint.
    pub fn dump(&self) -> String {
        use std::fmt::Write;
        let mut out = format!("t = {}\n", self.t);
        let _ = writeln!(out, "waiting = {}", self.waiting.len());
        let _ = writeln!(out, "rooms:");
        for room in &self.rooms {
            let _ = writeln!(
                out,
                "  {:?} {:?} finished={} attached=[{} {}]",
                room.id,
                room.nicks,
                room.finished(),
                room.seat_conn(0).is_some(),
                room.seat_conn(1).is_some(),
            );
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[cfg(test)]
    pub(crate) fn waiting_count(&self) -> usize {
        self.waiting.len()
    }
}
