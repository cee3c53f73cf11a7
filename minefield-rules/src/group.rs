//! [Group]: the building blocks of a regular hand.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::tile::Tile;

/// A group of tiles within a hand.
///
/// Can be either:
/// - `pair`: 2 of a kind; e.g. `S2 S2`
/// - `pon`: 3 of a kind; e.g. `P7 P7 P7`
/// - `chi`: 3 consecutive number tiles, anchored at the lowest; e.g. `M2 M3 M4`
///
/// ## `serde` form
///
/// `{type, tile}` where `type` is `"pair"`, `"pon"` or `"chi"`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(tag = "type", content = "tile", rename_all = "lowercase")]
pub enum Group {
    /// The tile argument is the repeated tile.
    Pair(Tile),

    /// The tile argument is the repeated tile.
    Pon(Tile),

    /// The tile argument is the lowest tile in the run.
    Chi(Tile),
}

impl Group {
    /// The anchor tile of this group.
    pub fn tile(self) -> Tile {
        match self {
            Group::Pair(t) | Group::Pon(t) | Group::Chi(t) => t,
        }
    }

    pub fn is_chi(self) -> bool { matches!(self, Group::Chi(_)) }

    pub fn is_pon(self) -> bool { matches!(self, Group::Pon(_)) }

    /// Whether any tile of the group is a 1 or 9 (the junchan criterion).
    pub fn has_terminal(self) -> bool {
        match self {
            Group::Pair(t) | Group::Pon(t) => t.is_terminal(),
            Group::Chi(t) => t.num() == 1 || t.num() == 7,
        }
    }

    /// Whether any tile of the group is a terminal or honor (the chanta criterion).
    pub fn has_orphan(self) -> bool {
        self.has_terminal() || self.tile().is_honor()
    }

    /// Whether the run contains `tile` (always false for pairs and pons).
    pub fn chi_contains(self, tile: Tile) -> bool {
        match self {
            Group::Chi(t) => {
                t.suit() == tile.suit() && t.num() <= tile.num() && tile.num() <= t.num() + 2
            }
            _ => false,
        }
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Group::Pair(t) => write!(f, "pair({t})"),
            Group::Pon(t) => write!(f, "pon({t})"),
            Group::Chi(t) => write!(f, "chi({t})"),
        }
    }
}
