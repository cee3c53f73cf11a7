//! Two-player Minefield Mahjong match server.
//!
//! Layering, leaf first: [`game`] is the per-room state machine, [`room`]
//! journals its events and routes one pair of seats, [`server`] owns the
//! rooms and the waiting-players index, [`net`] is the websocket edge, and
//! [`store`] persists room snapshots. The rules engine lives in the
//! `minefield-rules` crate.

pub mod game;
pub mod net;
pub mod protocol;
pub mod room;
pub mod server;
pub mod store;
