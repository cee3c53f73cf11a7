//! Tile 牌
//!
//! See [`Tile`].

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Represents one tile (牌).
///
/// Encoded as a 6-bit integer:
///
/// | Encoding   | Code        | Category      |
/// |------------|-------------|---------------|
/// | 0  ..= 8   | `M1`..`M9`  | characters    |
/// | 9  ..= 17  | `P1`..`P9`  | dots          |
/// | 18 ..= 26  | `S1`..`S9`  | bamboos       |
/// | 27 ..= 30  | `X1`..`X4`  | winds         |
/// | 31, 32, 33 | `X5`..`X7`  | dragons       |
///
/// The encoding order is exactly the lexicographic order of the two-character
/// codes, so deriving `Ord` gives the wire ordering for free.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile(u8);

/// Number of distinct tiles.
pub const NUM_TILES: u8 = 34;

/// Copies of each distinct tile in a full deck.
pub const TILE_COPIES: usize = 4;

impl Tile {
    pub const EAST: Self = Self(27);
    pub const SOUTH: Self = Self(28);
    pub const WEST: Self = Self(29);
    pub const NORTH: Self = Self(30);
    pub const HAKU: Self = Self(31);
    pub const HATSU: Self = Self(32);
    pub const CHUN: Self = Self(33);

    pub const fn from_encoding(encoding: u8) -> Option<Self> {
        if encoding < NUM_TILES { Some(Self(encoding)) } else { None }
    }

    pub const fn from_suit_num(suit: u8, num: u8) -> Option<Self> {
        match suit {
            0..=2 if 1 <= num && num <= 9 => Some(Self(suit * 9 + num - 1)),
            3 if 1 <= num && num <= 7 => Some(Self(27 + num - 1)),
            _ => None,
        }
    }

    pub const fn encoding(self) -> u8 { self.0 }

    /// Suit index: 0, 1, 2, 3 for M, P, S, X respectively.
    pub const fn suit(self) -> u8 {
        if self.0 < 27 { self.0 / 9 } else { 3 }
    }

    /// Rank within the suit: `1..=9` for number tiles, `1..=7` for honors.
    pub const fn num(self) -> u8 {
        if self.0 < 27 { self.0 % 9 + 1 } else { self.0 - 27 + 1 }
    }

    /// M, P or S.
    pub const fn is_number(self) -> bool { self.0 < 27 }

    pub const fn is_wind(self) -> bool { 27 <= self.0 && self.0 <= 30 }

    pub const fn is_dragon(self) -> bool { 31 <= self.0 && self.0 <= 33 }

    pub const fn is_honor(self) -> bool { self.0 >= 27 }

    /// 1 or 9 of a number suit.
    pub const fn is_terminal(self) -> bool {
        self.0 < 27 && (self.0 % 9 == 0 || self.0 % 9 == 8)
    }

    /// Terminal or honor (the thirteen kokushi tiles).
    pub const fn is_orphan(self) -> bool { self.is_terminal() || self.is_honor() }

    /// For number tiles 1 to 8, the next rank in the same suit.
    pub const fn succ(self) -> Option<Self> {
        if self.is_number() && self.num() <= 8 { Some(Self(self.0 + 1)) } else { None }
    }

    /// For number tiles 1 to 7, the rank two above in the same suit.
    pub const fn succ2(self) -> Option<Self> {
        if self.is_number() && self.num() <= 7 { Some(Self(self.0 + 2)) } else { None }
    }

    /// Given this tile as the dora indicator, returns the indicated dora:
    /// the cyclic successor within the indicator's own category
    /// (`1→2→…→9→1` per number suit, `X1→…→X4→X1`, `X5→X6→X7→X5`).
    pub const fn indicated_dora(self) -> Self {
        match self.0 {
            e if e < 27 => Self(e / 9 * 9 + (e % 9 + 1) % 9),
            e if e < 31 => Self(27 + (e - 27 + 1) % 4),
            e => Self(31 + (e - 31 + 1) % 3),
        }
    }

    /// The standard two-character code of this tile.
    pub const fn as_str(self) -> &'static str {
        [
            "M1", "M2", "M3", "M4", "M5", "M6", "M7", "M8", "M9", //
            "P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8", "P9", //
            "S1", "S2", "S3", "S4", "S5", "S6", "S7", "S8", "S9", //
            "X1", "X2", "X3", "X4", "X5", "X6", "X7", //
        ][self.0 as usize]
    }
}

/// All 34 distinct tiles in order.
pub fn all_tiles() -> impl Iterator<Item = Tile> {
    (0..NUM_TILES).map(Tile)
}

/// The canonical 136-tile deck (4 copies of each tile), sorted.
pub fn full_deck() -> Vec<Tile> {
    all_tiles()
        .flat_map(|t| std::iter::repeat(t).take(TILE_COPIES))
        .collect()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid tile code {0:?}")]
pub struct ParseTileError(pub String);

impl FromStr for Tile {
    type Err = ParseTileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTileError(s.to_owned());
        if let [suit_char, num_char] = s.chars().collect::<Vec<_>>()[..] {
            let suit = match suit_char {
                'M' => 0,
                'P' => 1,
                'S' => 2,
                'X' => 3,
                _ => return Err(err()),
            };
            let num = num_char.to_digit(10).ok_or_else(err)? as u8;
            Self::from_suit_num(suit, num).ok_or_else(err)
        } else {
            Err(err())
        }
    }
}

impl Display for Tile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Debug for Tile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Tiles travel on the wire and in snapshots as their two-character codes.

impl Serialize for Tile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a whitespace-separated list of tile codes, e.g. `"M1 M2 X5"`.
///
/// Panics on malformed input; intended for fixed literals and tests.
pub fn tiles_from_str(s: &str) -> Vec<Tile> {
    s.split_whitespace()
        .map(|code| code.parse().expect("bad tile literal"))
        .collect()
}
