//! Wire protocol: JSON messages exchanged with seats over the websocket.
//!
//! Both directions use a `{type, ...}` tagged union. Inbound frames whose
//! `type` is unknown fail to parse, which the session layer treats as a
//! protocol error rather than silent success.

use serde::{Deserialize, Serialize};

use minefield_rules::prelude::Tile;

use crate::game::{Event, Seat};

/// Messages a seat may send.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Register as a waiting player.
    NewGame { nick: String },
    /// Withdraw from the waiting list.
    CancelNewGame {},
    /// Join the player advertised under `key`.
    Join { nick: String, key: String },
    /// Reattach to an owned seat, declaring how many events are already held.
    Rejoin {
        key: String,
        #[serde(default)]
        n_received: usize,
    },
    /// Ask for the lobby listing.
    GetGames {},
    /// Commit the 13-tile hand (phase one).
    Hand { hand: Vec<Tile> },
    /// Discard a tile (phase two).
    Discard { tile: Tile },
}

/// Messages the server sends to a seat. Game events pass through untagged
/// so they keep their own `{type, ...}` shape on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Sent on room attach: the seat's rejoin key, both nicks, own index.
    Room { key: String, nicks: [String; 2], you: Seat },
    /// A journaled event re-delivered during reconnect.
    Replay { msg: Event },
    /// Lobby listing.
    Games { games: Vec<LobbyEntry> },
    JoinFailed { description: String },
    #[serde(untagged)]
    Game(Event),
}

/// One row of the lobby listing: a running game or a waiting player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LobbyEntry {
    Game { nicks: [String; 2] },
    Player { nick: String, key: String },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::game::MoveType;

    #[test]
    fn client_messages_parse() {
        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"new_game","nick":"Akagi"}"#).unwrap();
        assert_eq!(msg, ClientMsg::NewGame { nick: "Akagi".into() });

        let msg: ClientMsg = serde_json::from_str(r#"{"type":"discard","tile":"M1"}"#).unwrap();
        assert_eq!(msg, ClientMsg::Discard { tile: "M1".parse().unwrap() });

        // n_received defaults to zero for old clients.
        let msg: ClientMsg = serde_json::from_str(r#"{"type":"rejoin","key":"k"}"#).unwrap();
        assert_eq!(msg, ClientMsg::Rejoin { key: "k".into(), n_received: 0 });
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"boom"}"#).is_err());
    }

    #[test]
    fn game_events_serialize_flat() {
        let msg = ServerMsg::Game(Event::Discarded { player: 1, tile: "S5".parse().unwrap() });
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"discarded","player":1,"tile":"S5"}"#
        );

        let msg = ServerMsg::Replay { msg: Event::PhaseTwo };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"replay","msg":{"type":"phase_two"}}"#
        );
    }

    #[test]
    fn start_move_payload_shape() {
        let msg = ServerMsg::Game(Event::StartMove {
            move_type: MoveType::Discard,
            time_limit: 15,
        });
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"start_move","move_type":"discard","time_limit":15}"#
        );
    }
}
