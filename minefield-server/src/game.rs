//! Core game logic: phases, turns, timeouts, discards, ron detection.
//!
//! A [`Game`] is a pure state machine. Handlers validate input, mutate state
//! and append outbound events to an internal queue; the room drains the queue
//! with [`Game::take_events`] after every call and fans the events out to the
//! seats. The whole struct serializes as the room snapshot.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use minefield_rules::prelude::*;

/// Seat index, 0 or 1.
pub type Seat = usize;

/// Tiles dealt to each seat.
pub const PLAYER_TILES: usize = 34;

/// Discards each seat makes before the hand is exhausted.
pub const DISCARDS: usize = 17;

/// Seconds allowed for hand selection.
pub const HAND_TIME_LIMIT: u64 = 3 * 60;

/// Seconds allowed for each discard.
pub const DISCARD_TIME_LIMIT: u64 = 15;

/// Additional leeway to accommodate connection problems and UI updates.
pub const EXTRA_TIME: u64 = 10;

/// Seat winds by `seat ^ east`: East holds `X1`, the other seat `X3`.
pub const SEAT_WINDS: [Tile; 2] = [Tile::EAST, Tile::WEST];

pub fn other(seat: Seat) -> Seat {
    1 - seat
}

/// A freshly shuffled 136-tile wall.
pub fn shuffled_wall(rng: &mut impl Rng) -> Vec<Tile> {
    let mut wall = full_deck();
    wall.shuffle(rng);
    wall
}

/// The deterministic wall: the 34 distinct tiles repeated four times, so each
/// seat is dealt one of every tile and the dora indicator is `M1`.
pub fn stacked_wall() -> Vec<Tile> {
    (0..minefield_rules::tile::TILE_COPIES).flat_map(|_| all_tiles()).collect()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Hand selection.
    One,
    /// Alternating discards.
    Two,
    /// Terminal.
    Three,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    Hand,
    Discard,
}

/// An open move: what a seat must do, and the game second it must be done by.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PendingMove {
    pub move_type: MoveType,
    pub deadline: u64,
}

/// One outbound message addressed to a seat.
///
/// `start_move.time_limit` is the seconds remaining excluding the
/// server-side grace window, so it can go negative on a late re-send.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    PhaseOne { tiles: Vec<Tile>, dora_ind: Tile, you: Seat, east: Seat },
    StartMove { move_type: MoveType, time_limit: i64 },
    EndMove,
    Hand { hand: Vec<Tile> },
    WaitForPhaseTwo,
    PhaseTwo,
    Discarded { player: Seat, tile: Tile },
    Ron {
        player: Seat,
        hand: Vec<Tile>,
        tile: Tile,
        yaku: Vec<Yaku>,
        yakuman: bool,
        dora: u8,
        points: u32,
        limit: u8,
        uradora_ind: Tile,
    },
    Draw,
    Abort { culprit: Seat, description: String },
}

/// Input validation failures. The rendered message doubles as the `abort`
/// description on the wire.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum GameError {
    #[error("hand: wrong phase")]
    HandWrongPhase,
    #[error("hand: expected 13 tiles")]
    HandSize,
    #[error("hand: hand already sent")]
    HandAlreadySent,
    #[error("hand: tile not found in choices")]
    HandTileNotOwned,
    #[error("discard: wrong phase")]
    DiscardWrongPhase,
    #[error("discard: not your turn")]
    DiscardOutOfTurn,
    #[error("discard: tile not found in choices")]
    DiscardTileNotOwned,
}

/// The per-room game state machine. Serializes as the snapshot of record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    east: Seat,
    initial_tiles: [Vec<Tile>; 2],
    tiles: [Vec<Tile>; 2],
    dora_ind: Tile,
    uradora_ind: Tile,
    hand: [Option<Vec<Tile>>; 2],
    waits: [Option<Vec<Tile>>; 2],
    discards: [Vec<Tile>; 2],
    /// Elapsed game seconds; advanced by [`Game::beat`].
    t: u64,
    moves: [Option<PendingMove>; 2],
    finished: bool,

    #[serde(skip)]
    out: Vec<(Seat, Event)>,
}

impl Game {
    /// Builds a game from an injected wall. The first 34 tiles go to seat 0,
    /// the next 34 to seat 1, then the dora and uradora indicators.
    pub fn new(wall: &[Tile], east: Seat) -> Self {
        debug_assert_eq!(wall.len(), 136);
        Self {
            east,
            initial_tiles: [
                wall[..PLAYER_TILES].to_vec(),
                wall[PLAYER_TILES..PLAYER_TILES * 2].to_vec(),
            ],
            tiles: [
                wall[..PLAYER_TILES].to_vec(),
                wall[PLAYER_TILES..PLAYER_TILES * 2].to_vec(),
            ],
            dora_ind: wall[PLAYER_TILES * 2],
            uradora_ind: wall[PLAYER_TILES * 2 + 1],
            hand: [None, None],
            waits: [None, None],
            discards: [Vec::new(), Vec::new()],
            t: 0,
            moves: [None, None],
            finished: false,
            out: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.finished {
            Phase::Three
        } else if self.hand.iter().all(Option::is_some) {
            Phase::Two
        } else {
            Phase::One
        }
    }

    /// Whose discard is next: East opens each round, then the seat with the
    /// shorter pile.
    pub fn turn(&self) -> Seat {
        if self.discards[0].len() == self.discards[1].len() {
            self.east
        } else {
            other(self.east)
        }
    }

    pub fn east(&self) -> Seat {
        self.east
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Elapsed game seconds.
    pub fn clock(&self) -> u64 {
        self.t
    }

    #[cfg(test)]
    pub(crate) fn remaining_tiles(&self, seat: Seat) -> &[Tile] {
        &self.tiles[seat]
    }

    /// Drains the outbound event queue, in emission order.
    pub fn take_events(&mut self) -> Vec<(Seat, Event)> {
        std::mem::take(&mut self.out)
    }

    fn emit(&mut self, seat: Seat, event: Event) {
        self.out.push((seat, event));
    }

    /// Deals the tiles and opens the hand-selection moves.
    pub fn start(&mut self) {
        for seat in 0..2 {
            self.emit(seat, Event::PhaseOne {
                tiles: self.initial_tiles[seat].clone(),
                dora_ind: self.dora_ind,
                you: seat,
                east: self.east,
            });
            self.start_move(seat, MoveType::Hand, HAND_TIME_LIMIT);
        }
    }

    /// Aborts the game and tells both seats why. No-op once finished.
    pub fn abort(&mut self, culprit: Seat, description: &str) {
        if self.finished {
            return;
        }
        log::warn!("game aborted, culprit {}: {}", culprit, description);
        self.finished = true;
        self.moves = [None, None];
        for seat in 0..2 {
            self.emit(seat, Event::Abort { culprit, description: description.to_owned() });
        }
    }

    /// Advances the game clock by one second, enforcing move deadlines.
    pub fn beat(&mut self) {
        self.t += 1;
        for seat in 0..2 {
            if let Some(m) = self.moves[seat] {
                if self.t >= m.deadline {
                    self.abort(seat, "time limit exceeded");
                    return;
                }
            }
        }
    }

    fn start_move(&mut self, seat: Seat, move_type: MoveType, time_limit: u64) {
        debug_assert!(self.moves[seat].is_none());
        let deadline = self.t + time_limit + EXTRA_TIME;
        self.moves[seat] = Some(PendingMove { move_type, deadline });
        self.send_move(seat);
    }

    fn end_move(&mut self, seat: Seat) {
        self.moves[seat] = None;
        self.emit(seat, Event::EndMove);
    }

    /// Re-emits the seat's current pending move, if any. Called directly by
    /// the room after a replay so a reconnecting seat sees exactly one
    /// observable pending move.
    pub fn send_move(&mut self, seat: Seat) {
        if let Some(m) = self.moves[seat] {
            let time_limit = m.deadline as i64 - self.t as i64 - EXTRA_TIME as i64;
            self.emit(seat, Event::StartMove { move_type: m.move_type, time_limit });
        }
    }

    /// Scoring context for a seat, per the Minefield two-player layout: the
    /// seat wind is the only fanpai wind, there is no round wind.
    fn options(&self, seat: Seat, uradora: bool) -> ScoringContext {
        ScoringContext {
            fanpai_winds: vec![SEAT_WINDS[seat ^ self.east]],
            dora_ind: Some(self.dora_ind),
            uradora_ind: uradora.then_some(self.uradora_ind),
            hotei: self.discards.iter().all(|d| d.len() == DISCARDS),
            ippatsu: self.discards[other(seat)].len() == 1,
        }
    }

    /// Handles a seat committing its 13-tile hand.
    pub fn on_hand(&mut self, seat: Seat, hand: Vec<Tile>) -> Result<(), GameError> {
        let rest = match self.check_hand(seat, &hand) {
            Ok(rest) => rest,
            Err(e) => {
                self.abort(seat, &e.to_string());
                return Err(e);
            }
        };

        self.tiles[seat] = rest;
        let wait_ctx = ScoringContext {
            fanpai_winds: vec![SEAT_WINDS[seat ^ self.east]],
            ..Default::default()
        };
        self.waits[seat] = Some(waits(&hand, &wait_ctx));
        self.hand[seat] = Some(hand.clone());

        self.end_move(seat);
        // Echo the hand so the seat can reconstruct it from a replay.
        self.emit(seat, Event::Hand { hand });

        if self.hand.iter().all(Option::is_some) {
            for s in 0..2 {
                self.emit(s, Event::PhaseTwo);
            }
            self.start_move(self.east, MoveType::Discard, DISCARD_TIME_LIMIT);
        } else {
            self.emit(seat, Event::WaitForPhaseTwo);
        }
        Ok(())
    }

    fn check_hand(&self, seat: Seat, hand: &[Tile]) -> Result<Vec<Tile>, GameError> {
        if self.phase() != Phase::One {
            return Err(GameError::HandWrongPhase);
        }
        if hand.len() != 13 {
            return Err(GameError::HandSize);
        }
        if self.hand[seat].is_some() {
            return Err(GameError::HandAlreadySent);
        }
        remove_tiles(&self.tiles[seat], hand).ok_or(GameError::HandTileNotOwned)
    }

    /// Handles a discard from the seat whose turn it is.
    pub fn on_discard(&mut self, seat: Seat, tile: Tile) -> Result<(), GameError> {
        if let Err(e) = self.check_discard(seat, tile) {
            self.abort(seat, &e.to_string());
            return Err(e);
        }

        let pool = &mut self.tiles[seat];
        if let Some(pos) = pool.iter().position(|&t| t == tile) {
            pool.remove(pos);
        }
        self.discards[seat].push(tile);

        self.end_move(seat);
        for s in 0..2 {
            self.emit(s, Event::Discarded { player: seat, tile });
        }

        if self.ron_candidate(seat, tile) && self.check_ron(seat, tile) {
            return Ok(());
        }

        if self.discards.iter().all(|d| d.len() == DISCARDS) {
            self.finished = true;
            for s in 0..2 {
                self.emit(s, Event::Draw);
            }
        } else {
            self.start_move(self.turn(), MoveType::Discard, DISCARD_TIME_LIMIT);
        }
        Ok(())
    }

    fn check_discard(&self, seat: Seat, tile: Tile) -> Result<(), GameError> {
        if self.phase() != Phase::Two {
            return Err(GameError::DiscardWrongPhase);
        }
        if self.turn() != seat {
            return Err(GameError::DiscardOutOfTurn);
        }
        if !self.tiles[seat].contains(&tile) {
            return Err(GameError::DiscardTileNotOwned);
        }
        Ok(())
    }

    fn seat_waits(&self, seat: Seat) -> &[Tile] {
        self.waits[seat].as_deref().unwrap_or(&[])
    }

    /// Whether the opponent is waiting on `tile` and free of furiten.
    fn ron_candidate(&self, discarder: Seat, tile: Tile) -> bool {
        let winner = other(discarder);
        self.seat_waits(winner).contains(&tile) && !self.furiten(winner)
    }

    /// A seat is furiten when any of its waits appears among its own discards
    /// or the opponent's discards, excluding the opponent's most recent one
    /// (the live ron candidate).
    fn furiten(&self, seat: Seat) -> bool {
        let opp = &self.discards[other(seat)];
        let opp_prior = &opp[..opp.len().saturating_sub(1)];
        self.seat_waits(seat)
            .iter()
            .any(|w| self.discards[seat].contains(w) || opp_prior.contains(w))
    }

    /// Scores the opponent's hand against `tile`; wins only at mangan or
    /// above. The uradora indicator is folded in once the win stands.
    fn check_ron(&mut self, discarder: Seat, tile: Tile) -> bool {
        let winner = other(discarder);
        let mut full = self.hand[winner].clone().unwrap_or_default();
        full.push(tile);
        full.sort_unstable();

        match best_hand(&full, tile, &self.options(winner, false)) {
            Some(score) if score.limit >= MANGAN => {}
            _ => return false,
        }
        let Some(score) = best_hand(&full, tile, &self.options(winner, true)) else {
            return false;
        };

        self.finished = true;
        self.moves = [None, None];
        for seat in 0..2 {
            self.emit(seat, Event::Ron {
                player: winner,
                hand: full.clone(),
                tile,
                yaku: score.yaku.clone(),
                yakuman: score.yakuman,
                dora: score.dora,
                points: BASE_POINTS[score.limit as usize],
                limit: score.limit,
                uradora_ind: self.uradora_ind,
            });
        }
        true
    }
}

/// Multiset subtraction: the pool minus the taken tiles, or `None` if any
/// taken tile is missing.
fn remove_tiles(pool: &[Tile], take: &[Tile]) -> Option<Vec<Tile>> {
    let mut rest = pool.to_vec();
    for tile in take {
        let pos = rest.iter().position(|t| t == tile)?;
        rest.remove(pos);
    }
    Some(rest)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;

    use super::*;

    /// Test harness in the spirit of a message transcript: every handler call
    /// drains the event queue, and assertions pop expected messages in order.
    struct Table {
        game: Game,
        messages: VecDeque<(Seat, Event)>,
    }

    impl Table {
        fn new() -> Self {
            let mut game = Game::new(&stacked_wall(), 0);
            game.start();
            let mut table = Table { game, messages: VecDeque::new() };
            table.drain();
            table
        }

        fn drain(&mut self) {
            self.messages.extend(self.game.take_events());
        }

        fn expect(&mut self, seat: Seat, event: Event) {
            assert_eq!(self.messages.pop_front(), Some((seat, event)));
        }

        fn expect_both(&mut self, event: Event) {
            self.expect(0, event.clone());
            self.expect(1, event);
        }

        fn expect_none(&mut self, msg_type: &str) {
            assert!(
                !self.messages.iter().any(|(_, e)| event_type(e) == msg_type),
                "unexpected {msg_type} in {:?}",
                self.messages
            );
        }

        fn send_hand(&mut self, seat: Seat, hand: &str) {
            self.game.on_hand(seat, tiles_from_str(hand)).unwrap();
            self.drain();
        }

        fn expect_init(&mut self) {
            for seat in 0..2 {
                self.expect(seat, Event::PhaseOne {
                    tiles: all_tiles().collect(),
                    dora_ind: "M1".parse().unwrap(),
                    you: seat,
                    east: 0,
                });
                self.expect(seat, Event::StartMove {
                    move_type: MoveType::Hand,
                    time_limit: HAND_TIME_LIMIT as i64,
                });
            }
        }

        fn start_game(&mut self, hand0: &str, hand1: &str) {
            self.expect_init();
            self.send_hand(0, hand0);
            self.expect(0, Event::EndMove);
            self.expect(0, Event::Hand { hand: tiles_from_str(hand0) });
            self.expect(0, Event::WaitForPhaseTwo);
            self.send_hand(1, hand1);
            self.expect(1, Event::EndMove);
            self.expect(1, Event::Hand { hand: tiles_from_str(hand1) });
            self.expect_both(Event::PhaseTwo);
        }

        fn discard(&mut self, seat: Seat, tile: &str) {
            let tile: Tile = tile.parse().unwrap();
            self.expect(seat, Event::StartMove {
                move_type: MoveType::Discard,
                time_limit: DISCARD_TIME_LIMIT as i64,
            });
            self.game.on_discard(seat, tile).unwrap();
            self.drain();
            self.expect(seat, Event::EndMove);
            self.expect_both(Event::Discarded { player: seat, tile });
        }
    }

    fn event_type(event: &Event) -> &'static str {
        match event {
            Event::PhaseOne { .. } => "phase_one",
            Event::StartMove { .. } => "start_move",
            Event::EndMove => "end_move",
            Event::Hand { .. } => "hand",
            Event::WaitForPhaseTwo => "wait_for_phase_two",
            Event::PhaseTwo => "phase_two",
            Event::Discarded { .. } => "discarded",
            Event::Ron { .. } => "ron",
            Event::Draw => "draw",
            Event::Abort { .. } => "abort",
        }
    }

    #[test]
    fn init_deals_and_opens_hand_moves() {
        let mut table = Table::new();
        table.expect_init();
        assert_eq!(table.game.phase(), Phase::One);
    }

    #[test]
    fn draw_by_exhaustion() {
        let mut table = Table::new();
        table.start_game(
            "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4",
            "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4",
        );
        for _ in 0..DISCARDS {
            for seat in 0..2 {
                let tile = table.game.remaining_tiles(seat)[0].to_string();
                table.discard(seat, &tile);
            }
        }
        table.expect_both(Event::Draw);
        assert!(table.game.finished());
        assert_eq!(table.game.phase(), Phase::Three);
    }

    #[test]
    fn kokushi_ron_with_uradora() {
        // Seat 0 waits thirteen-sided on kokushi; seat 1 cannot reach mangan.
        let mut table = Table::new();
        table.start_game(
            "M1 M9 P1 P9 S1 S9 X1 X2 X3 X4 X5 X6 X7",
            "M1 M2 M3 M4 M5 M6 P7 P8 P9 S1 S2 S3 S4",
        );

        // Seat 1's structural completion carries no yaku, so no ron fires.
        table.discard(0, "S4");
        table.expect_none("ron");

        table.discard(1, "P1");
        table.expect_both(Event::Ron {
            player: 0,
            hand: tiles_from_str("M1 M9 P1 P1 P9 S1 S9 X1 X2 X3 X4 X5 X6 X7"),
            tile: "P1".parse().unwrap(),
            yaku: vec![Yaku::Kokushi],
            yakuman: true,
            dora: 0,
            points: 32000,
            limit: 5,
            uradora_ind: "M2".parse().unwrap(),
        });
        assert!(table.game.finished());
    }

    #[test]
    fn furiten_blocks_ron() {
        // Seat 1 waits on S5 (sanshoku) and S8 (tanyao only); once S8 passes
        // below mangan, a later S5 must not win.
        let mut table = Table::new();
        table.start_game(
            "M2 M9 P1 P9 S1 S9 X1 X2 X3 X4 X5 X6 X7",
            "M6 M7 M8 P6 P7 P8 S2 S3 S4 S5 S6 S7 S8",
        );

        table.discard(0, "S8");
        table.expect_none("ron");

        table.discard(1, "P1");

        table.discard(0, "S5");
        table.expect_none("ron");
    }

    #[test]
    fn short_hand_aborts() {
        let mut table = Table::new();
        table.expect_init();
        let err = table.game.on_hand(1, tiles_from_str("M1 M2 M3"));
        assert_eq!(err, Err(GameError::HandSize));
        table.drain();
        table.expect_both(Event::Abort {
            culprit: 1,
            description: "hand: expected 13 tiles".into(),
        });
        assert!(table.game.finished());
    }

    #[test]
    fn foreign_tiles_abort() {
        let mut table = Table::new();
        table.expect_init();
        let hand = vec!["M1".parse().unwrap(); 13];
        let err = table.game.on_hand(0, hand);
        assert_eq!(err, Err(GameError::HandTileNotOwned));
        table.drain();
        table.expect_both(Event::Abort {
            culprit: 0,
            description: "hand: tile not found in choices".into(),
        });
    }

    #[test]
    fn duplicate_hand_aborts() {
        let mut table = Table::new();
        table.expect_init();
        let hand = "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4";
        table.send_hand(0, hand);
        let err = table.game.on_hand(0, tiles_from_str(hand));
        assert_eq!(err, Err(GameError::HandAlreadySent));
    }

    #[test]
    fn hand_time_limit_aborts_the_laggard() {
        let mut table = Table::new();
        table.expect_init();
        table.send_hand(0, "M2 M9 P1 P9 S1 S9 X1 X2 X3 X4 X5 X6 X7");
        table.expect(0, Event::EndMove);
        table.expect(0, Event::Hand {
            hand: tiles_from_str("M2 M9 P1 P9 S1 S9 X1 X2 X3 X4 X5 X6 X7"),
        });
        table.expect(0, Event::WaitForPhaseTwo);

        for _ in 0..HAND_TIME_LIMIT + EXTRA_TIME {
            table.game.beat();
        }
        table.drain();
        table.expect_both(Event::Abort {
            culprit: 1,
            description: "time limit exceeded".into(),
        });
    }

    #[test]
    fn discard_time_limit_aborts_the_mover() {
        let mut table = Table::new();
        table.start_game(
            "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4",
            "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4",
        );
        table.expect(0, Event::StartMove {
            move_type: MoveType::Discard,
            time_limit: DISCARD_TIME_LIMIT as i64,
        });
        for _ in 0..DISCARD_TIME_LIMIT + EXTRA_TIME {
            table.game.beat();
        }
        table.drain();
        table.expect_both(Event::Abort {
            culprit: 0,
            description: "time limit exceeded".into(),
        });
    }

    #[test]
    fn out_of_turn_discard_aborts() {
        let mut table = Table::new();
        table.start_game(
            "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4",
            "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4",
        );
        let err = table.game.on_discard(1, "P5".parse().unwrap());
        assert_eq!(err, Err(GameError::DiscardOutOfTurn));
        table.drain();
        assert!(table.game.finished());
    }

    #[test]
    fn abort_is_idempotent_once_finished() {
        let mut table = Table::new();
        table.game.abort(0, "first");
        table.game.abort(1, "second");
        table.drain();
        table.expect_init();
        table.expect_both(Event::Abort { culprit: 0, description: "first".into() });
        assert!(table.messages.is_empty());
    }

    #[test]
    fn tile_conservation_holds_throughout() {
        let mut table = Table::new();
        table.start_game(
            "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4",
            "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4",
        );
        for round in 0..5 {
            for seat in 0..2 {
                let tile = table.game.remaining_tiles(seat)[round].to_string();
                table.discard(seat, &tile);
            }
            for seat in 0..2 {
                let mut held: Vec<Tile> = table.game.tiles[seat].clone();
                held.extend(table.game.hand[seat].clone().unwrap());
                held.extend(table.game.discards[seat].clone());
                held.sort_unstable();
                let mut initial = table.game.initial_tiles[seat].clone();
                initial.sort_unstable();
                assert_eq!(held, initial);
            }
            let d0 = table.game.discards[0].len();
            let d1 = table.game.discards[1].len();
            assert!(d0 == d1 || d0 == d1 + 1);
        }
    }

    #[test]
    fn snapshot_roundtrip_preserves_the_machine() {
        let mut table = Table::new();
        table.start_game(
            "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4",
            "M1 M2 M3 M4 M5 M6 M7 M8 M9 P1 P2 P3 P4",
        );
        table.discard(0, "P5");
        let json = serde_json::to_string(&table.game).unwrap();
        let mut restored: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.turn(), 1);
        assert_eq!(restored.phase(), Phase::Two);
        // The restored machine keeps playing.
        restored.on_discard(1, "P5".parse().unwrap()).unwrap();
        assert!(!restored.finished());
    }
}
