//! All yaku known to the Minefield ruleset.
//!
//! The enum is the unifying key for each yaku; the lower-case name doubles as
//! the wire form inside `ron` payloads.

use serde::{Deserialize, Serialize};

/// A named scoring pattern. A winning hand must carry at least one.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash,
    Serialize, Deserialize,
    strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Yaku {
    /// 平和
    Pinfu,
    /// 一盃口
    Iipeiko,
    /// 二盃口
    Ryanpeiko,
    /// 三色同順
    Sanshoku,
    /// 断幺九
    Tanyao,
    /// 役牌 (counted once per value triplet)
    Fanpai,
    /// 三暗刻
    Sananko,
    /// 小三元
    Shosangen,
    /// 七対子
    Nikoniko,
    /// 混全帯幺九
    Chanta,
    /// 純全帯幺九
    Junchan,
    /// 混一色
    Honitsu,
    /// 清一色
    Chinitsu,
    /// 一発
    Ippatsu,
    /// 河底撈魚
    Hotei,
    /// 大三元
    Daisangen,
    /// 国士無双
    Kokushi,
}

impl Yaku {
    /// Fan value of the yaku in a closed hand (every Minefield hand is
    /// closed). Yakuman are tabled at the kazoe equivalence point.
    pub fn fan(self) -> u8 {
        use Yaku::*;
        match self {
            Pinfu | Iipeiko | Tanyao | Fanpai | Ippatsu | Hotei => 1,
            Sanshoku | Sananko | Shosangen | Nikoniko | Chanta => 2,
            Ryanpeiko | Junchan | Honitsu => 3,
            Chinitsu => 6,
            Daisangen | Kokushi => 13,
        }
    }

    pub fn is_yakuman(self) -> bool {
        matches!(self, Yaku::Daisangen | Yaku::Kokushi)
    }
}
