//! Wait solver: which tiles complete a 13-tile hand into a scoring hand.

use super::hand::{best_hand, ScoringContext};
use super::tile::{all_tiles, Tile};

/// Lists every tile that completes `tiles` into a hand with at least one
/// yaku, in tile order. `tiles` need not be sorted.
pub fn waits(tiles: &[Tile], ctx: &ScoringContext) -> Vec<Tile> {
    debug_assert_eq!(tiles.len(), 13);
    all_tiles()
        .filter(|&candidate| {
            let mut full = tiles.to_vec();
            full.push(candidate);
            full.sort_unstable();
            best_hand(&full, candidate, ctx).is_some()
        })
        .collect()
}
