//! Rules engine for Minefield Mahjong: the two-player riichi variant where
//! each seat pre-commits a 13-tile hand and then discards from a fixed
//! remaining pool.
//!
//! The crate is pure computation: tile identities, hand decomposition, yaku
//! enumeration, limit scoring and the wait solver. The match server builds
//! on top of it.

pub mod decompose;
pub mod group;
pub mod hand;
pub mod score;
pub mod tile;
pub mod wait;
pub mod yaku;

pub mod prelude {
    //! Convenient re-exports of commonly imported items.
    pub use super::{
        decompose::{decompose_regular, is_kokushi, is_seven_pairs, Decomposition},
        group::Group,
        hand::{all_hands, best_hand, Hand, HandKind, Score, ScoringContext},
        score::{limit_of, BASE_POINTS, MANGAN},
        tile::{all_tiles, full_deck, tiles_from_str, Tile},
        wait::waits,
        yaku::Yaku,
    };
}
