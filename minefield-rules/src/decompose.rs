//! Decomposition of a sorted hand into `[pair, group, group, group, group]`.
//!
//! The enumeration leans on the total order of tiles: each candidate pair is
//! taken at its first defensible position, and the remaining groups are always
//! anchored at the lowest remaining tile, so every distinct decomposition is
//! produced exactly once. Two identical chis still show up as two adjacent
//! groups (iipeiko detection relies on that adjacency).

use itertools::Itertools;

use super::group::Group;
use super::tile::Tile;

/// An ordered decomposition: the pair first, then the remaining groups in the
/// order their anchor appears in the sorted hand.
pub type Decomposition = Vec<Group>;

/// Enumerates every `{pair + groups}` decomposition of a sorted tile multiset.
///
/// The input length must be `3n + 2`; a 14-tile hand yields decompositions of
/// one pair and four groups.
pub fn decompose_regular(tiles: &[Tile]) -> Vec<Decomposition> {
    debug_assert!(tiles.windows(2).all(|w| w[0] <= w[1]), "input must be sorted");

    let mut out = Vec::new();
    let mut acc = Vec::with_capacity(tiles.len() / 3 + 1);
    for i in 0..tiles.len().saturating_sub(1) {
        if tiles[i] != tiles[i + 1] {
            continue;
        }
        // The first two tiles of a triple are not a pair candidate; if a true
        // pair exists among further copies the scan reaches it two slots later.
        if i + 2 < tiles.len() && tiles[i + 1] == tiles[i + 2] {
            continue;
        }
        let rest: Vec<Tile> = tiles[..i].iter().chain(&tiles[i + 2..]).copied().collect();
        acc.push(Group::Pair(tiles[i]));
        peel_groups(&rest, &mut acc, &mut out);
        acc.pop();
    }
    out
}

/// Recursively peels pons and chis anchored at the lowest remaining tile.
/// Depth is bounded by the group count (four for a full hand).
fn peel_groups(rest: &[Tile], acc: &mut Vec<Group>, out: &mut Vec<Decomposition>) {
    let Some(&anchor) = rest.first() else {
        out.push(acc.clone());
        return;
    };
    if rest.len() >= 3 && rest[1] == anchor && rest[2] == anchor {
        acc.push(Group::Pon(anchor));
        peel_groups(&rest[3..], acc, out);
        acc.pop();
    }
    if let Some(after_chi) = remove_chi(rest, anchor) {
        acc.push(Group::Chi(anchor));
        peel_groups(&after_chi, acc, out);
        acc.pop();
    }
}

/// Removes the run `anchor, anchor+1, anchor+2` from a sorted slice, or `None`
/// if the run is not present.
fn remove_chi(rest: &[Tile], anchor: Tile) -> Option<Vec<Tile>> {
    let second = anchor.succ()?;
    let third = anchor.succ2()?;
    let i2 = rest.binary_search(&second).ok()?;
    let i3 = rest.binary_search(&third).ok()?;
    Some(
        rest.iter()
            .enumerate()
            .filter(|&(i, _)| i != 0 && i != i2 && i != i3)
            .map(|(_, &t)| t)
            .collect(),
    )
}

/// Seven distinct pairs. A quad is not two pairs.
pub fn is_seven_pairs(tiles: &[Tile]) -> bool {
    tiles.len() == 14
        && tiles.chunks_exact(2).all(|c| c[0] == c[1])
        && tiles.chunks_exact(2).map(|c| c[0]).tuple_windows().all(|(a, b)| a != b)
}

/// Thirteen orphans: every terminal and honor tile, plus one duplicate
/// among them.
pub fn is_kokushi(tiles: &[Tile]) -> bool {
    tiles.len() == 14
        && tiles.iter().all(|t| t.is_orphan())
        && tiles.iter().dedup().count() == 13
}
