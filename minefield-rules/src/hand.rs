//! Scoring interpretations of a complete 14-tile hand.

use super::decompose::{decompose_regular, is_kokushi, is_seven_pairs, Decomposition};
use super::group::Group;
use super::score::limit_of;
use super::tile::Tile;
use super::yaku::Yaku;

/// Everything about the table state that affects scoring.
#[derive(Clone, Debug, Default)]
pub struct ScoringContext {
    /// Wind tiles whose triplet is worth fan for this seat.
    pub fanpai_winds: Vec<Tile>,
    /// The revealed dora indicator.
    pub dora_ind: Option<Tile>,
    /// The hidden indicator, revealed only on a win.
    pub uradora_ind: Option<Tile>,
    /// The winning tile was the last discard of the hand.
    pub hotei: bool,
    /// The opponent has made exactly one prior discard.
    pub ippatsu: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HandKind {
    Regular,
    Pairs,
    Kokushi,
}

/// One interpretation of a winning hand: the 14 sorted tiles, the tile that
/// completed them, and (for regular hands) a chosen decomposition.
#[derive(Clone, Debug)]
pub struct Hand<'a> {
    pub tiles: &'a [Tile],
    pub wait: Tile,
    pub kind: HandKind,
    pub groups: Option<Decomposition>,
    pub ctx: &'a ScoringContext,
}

/// Enumerates every interpretation of a sorted 14-tile hand: each regular
/// decomposition, plus the seven-pairs and kokushi forms where they apply.
pub fn all_hands<'a>(
    tiles: &'a [Tile],
    wait: Tile,
    ctx: &'a ScoringContext,
) -> Vec<Hand<'a>> {
    let mut hands: Vec<Hand> = decompose_regular(tiles)
        .into_iter()
        .map(|groups| Hand { tiles, wait, kind: HandKind::Regular, groups: Some(groups), ctx })
        .collect();
    if is_seven_pairs(tiles) {
        hands.push(Hand { tiles, wait, kind: HandKind::Pairs, groups: None, ctx });
    }
    if is_kokushi(tiles) {
        hands.push(Hand { tiles, wait, kind: HandKind::Kokushi, groups: None, ctx });
    }
    hands
}

/// The outcome of scoring one interpretation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Score {
    pub yaku: Vec<Yaku>,
    pub yakuman: bool,
    /// Fan from yaku alone.
    pub fan: u8,
    /// Dora and uradora hits in the 14 tiles.
    pub dora: u8,
    /// Limit code derived from `fan + dora` (see [`limit_of`]).
    pub limit: u8,
}

impl Hand<'_> {
    /// Lists the yaku of this interpretation. A yakuman suppresses everything
    /// else. Fanpai appears once per value triplet.
    pub fn yaku(&self) -> Vec<Yaku> {
        let mut out = Vec::new();
        match self.kind {
            HandKind::Regular => self.group_yaku(&mut out),
            HandKind::Pairs => out.push(Yaku::Nikoniko),
            HandKind::Kokushi => out.push(Yaku::Kokushi),
        }

        if self.tiles.iter().all(|t| !t.is_orphan()) {
            out.push(Yaku::Tanyao);
        }
        let suit_mask: u8 = self.tiles.iter().fold(0, |m, t| m | 1 << t.suit());
        let number_suits = (suit_mask & 0b111).count_ones();
        if number_suits == 1 {
            if suit_mask & 0b1000 != 0 {
                out.push(Yaku::Honitsu);
            } else {
                out.push(Yaku::Chinitsu);
            }
        }

        if self.ctx.ippatsu {
            out.push(Yaku::Ippatsu);
        }
        if self.ctx.hotei {
            out.push(Yaku::Hotei);
        }

        if out.iter().any(|y| y.is_yakuman()) {
            out.retain(|y| y.is_yakuman());
        }
        out
    }

    /// Yaku that inspect the decomposition.
    fn group_yaku(&self, out: &mut Vec<Yaku>) {
        let Some(groups) = &self.groups else { return };
        let pair = groups[0].tile();
        let rest = &groups[1..];

        let pair_is_value = pair.is_dragon() || self.ctx.fanpai_winds.contains(&pair);
        if !pair_is_value
            && rest.iter().all(|g| g.is_chi())
            && rest.iter().any(|&g| self.two_sided(g))
        {
            out.push(Yaku::Pinfu);
        }

        // Identical chis sit adjacently in the decomposition.
        let mut peiko = 0;
        let mut i = 0;
        while i + 1 < rest.len() {
            if rest[i].is_chi() && rest[i] == rest[i + 1] {
                peiko += 1;
                i += 2;
            } else {
                i += 1;
            }
        }
        match peiko {
            1 => out.push(Yaku::Iipeiko),
            2 => out.push(Yaku::Ryanpeiko),
            _ => {}
        }

        let mut chi_nums = [0u16; 3];
        for g in rest {
            if let Group::Chi(t) = g {
                chi_nums[t.suit() as usize] |= 1 << t.num();
            }
        }
        if chi_nums[0] & chi_nums[1] & chi_nums[2] != 0 {
            out.push(Yaku::Sanshoku);
        }

        for g in rest {
            if let Group::Pon(t) = g {
                if t.is_dragon() || self.ctx.fanpai_winds.contains(t) {
                    out.push(Yaku::Fanpai);
                }
            }
        }

        // A pon finished by the winning tile is not concealed, unless the
        // tile can be attributed to a chi instead.
        let wait_fits_chi = rest.iter().any(|g| g.chi_contains(self.wait));
        let concealed_pons = rest
            .iter()
            .filter(|g| matches!(g, Group::Pon(t) if *t != self.wait || wait_fits_chi))
            .count();
        if concealed_pons >= 3 {
            out.push(Yaku::Sananko);
        }

        let dragon_pons = rest
            .iter()
            .filter(|g| matches!(g, Group::Pon(t) if t.is_dragon()))
            .count();
        if dragon_pons == 3 {
            out.push(Yaku::Daisangen);
        } else if dragon_pons == 2 && pair.is_dragon() {
            out.push(Yaku::Shosangen);
        }

        if rest.iter().any(|g| g.is_chi()) {
            if groups.iter().all(|g| g.has_terminal()) {
                out.push(Yaku::Junchan);
            } else if groups.iter().all(|g| g.has_orphan()) {
                out.push(Yaku::Chanta);
            }
        }
    }

    /// The winning tile sits at the low or high end of the run.
    fn two_sided(&self, g: Group) -> bool {
        match g {
            Group::Chi(t) => self.wait == t || Some(self.wait) == t.succ2(),
            _ => false,
        }
    }

    /// Dora and uradora hits in the 14 tiles.
    pub fn dora(&self) -> u8 {
        let mut hits = 0;
        for ind in [self.ctx.dora_ind, self.ctx.uradora_ind].into_iter().flatten() {
            let dora = ind.indicated_dora();
            hits += self.tiles.iter().filter(|&&t| t == dora).count() as u8;
        }
        hits
    }

    /// Scores this interpretation, or `None` if it carries no yaku.
    pub fn score(&self) -> Option<Score> {
        let yaku = self.yaku();
        if yaku.is_empty() {
            return None;
        }
        let yakuman = yaku.iter().any(|y| y.is_yakuman());
        let fan: u8 = yaku.iter().map(|y| y.fan()).sum();
        let dora = self.dora();
        Some(Score { limit: limit_of(fan.saturating_add(dora), yakuman), yaku, yakuman, fan, dora })
    }
}

/// Picks the highest-scoring interpretation of a sorted 14-tile hand, or
/// `None` if no interpretation carries a yaku (such a hand cannot win).
pub fn best_hand(tiles: &[Tile], wait: Tile, ctx: &ScoringContext) -> Option<Score> {
    all_hands(tiles, wait, ctx)
        .iter()
        .filter_map(Hand::score)
        .max_by_key(|s| (s.limit, s.fan + s.dora, s.yakuman, s.yaku.len()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tile::tiles_from_str;
    use crate::yaku::Yaku::*;

    fn east_ctx() -> ScoringContext {
        ScoringContext { fanpai_winds: vec![Tile::EAST], ..Default::default() }
    }

    /// All interpretations of the hand as a set of sorted yaku lists, with
    /// East as the only fanpai wind (as the game does for the dealer).
    fn yaku_sets(tiles_str: &str, wait: &str) -> BTreeSet<Vec<Yaku>> {
        let tiles = tiles_from_str(tiles_str);
        let ctx = east_ctx();
        all_hands(&tiles, wait.parse().unwrap(), &ctx)
            .iter()
            .map(|h| {
                let mut yaku = h.yaku();
                yaku.sort();
                yaku
            })
            .collect()
    }

    fn expect(sets: &[&[Yaku]]) -> BTreeSet<Vec<Yaku>> {
        sets.iter()
            .map(|s| {
                let mut v = s.to_vec();
                v.sort();
                v
            })
            .collect()
    }

    #[test]
    fn iipeiko_tanyao() {
        assert_eq!(
            yaku_sets("M2 M2 M3 M3 M4 M4 P2 P3 P4 P7 P7 P7 S2 S2", "M3"),
            expect(&[&[Iipeiko, Tanyao]])
        );
    }

    #[test]
    fn hand_without_yaku() {
        assert_eq!(
            yaku_sets("M1 M2 M3 M4 M5 M6 M6 M7 M8 P2 P2 P2 X1 X1", "M1"),
            expect(&[&[]])
        );
        let tiles = tiles_from_str("M1 M2 M3 M4 M5 M6 M6 M7 M8 P2 P2 P2 X1 X1");
        assert_eq!(best_hand(&tiles, "M1".parse().unwrap(), &east_ctx()), None);
    }

    #[test]
    fn quad_runs_versus_triplets() {
        assert_eq!(
            yaku_sets("M1 M1 M1 M1 M2 M2 M2 M2 M3 M3 M3 M3 M9 M9", "M1"),
            expect(&[
                &[Pinfu, Ryanpeiko, Junchan, Chinitsu],
                &[Sananko, Chinitsu],
            ])
        );
    }

    #[test]
    fn duplicate_interpretations_collapse() {
        let tiles = tiles_from_str("M1 M2 M2 M3 M3 M3 M3 M4 M4 M4 M5 M5 M6 M6");
        let ctx = east_ctx();
        let hands = all_hands(&tiles, "M1".parse().unwrap(), &ctx);
        assert_eq!(hands.len(), 2);
        assert_eq!(
            yaku_sets("M1 M2 M2 M3 M3 M3 M3 M4 M4 M4 M5 M5 M6 M6", "M1"),
            expect(&[&[Pinfu, Iipeiko, Chinitsu]])
        );
    }

    #[test]
    fn daisangen_suppresses_lesser_yaku() {
        assert_eq!(
            yaku_sets("P1 P2 P3 S5 S5 X5 X5 X5 X6 X6 X6 X7 X7 X7", "S5"),
            expect(&[&[Daisangen]])
        );
    }

    #[test]
    fn shosangen_with_two_fanpai() {
        // The S5 pon is completed by the winning tile, so sananko is out.
        assert_eq!(
            yaku_sets("P1 P2 P3 S5 S5 S5 X5 X5 X5 X6 X6 X6 X7 X7", "S5"),
            expect(&[&[Fanpai, Fanpai, Shosangen]])
        );
    }

    #[test]
    fn sananko_when_wait_sits_in_a_chi() {
        assert_eq!(
            yaku_sets("P1 P2 P3 S9 S9 S9 X5 X5 X5 X6 X6 X7 X7 X7", "P1"),
            expect(&[&[Fanpai, Fanpai, Chanta, Sananko, Shosangen]])
        );
    }

    #[test]
    fn kokushi_yakuman() {
        assert_eq!(
            yaku_sets("M1 M9 P1 P9 S1 S9 S9 X1 X2 X3 X4 X5 X6 X7", "S1"),
            expect(&[&[Kokushi]])
        );
    }

    #[test]
    fn chanta_honitsu_ryanpeiko() {
        // Both the run reading and the seven-pairs reading exist; the run
        // reading scores higher and must win the selection.
        assert_eq!(
            yaku_sets("M1 M1 M2 M2 M3 M3 M7 M7 M8 M8 M9 M9 X5 X5", "M3"),
            expect(&[&[Chanta, Honitsu, Ryanpeiko], &[Nikoniko, Honitsu]])
        );
        let tiles = tiles_from_str("M1 M1 M2 M2 M3 M3 M7 M7 M8 M8 M9 M9 X5 X5");
        let best = best_hand(&tiles, "M3".parse().unwrap(), &east_ctx()).unwrap();
        let mut yaku = best.yaku;
        yaku.sort();
        assert_eq!(yaku, {
            let mut v = vec![Chanta, Honitsu, Ryanpeiko];
            v.sort();
            v
        });
        assert_eq!(best.fan, 8);
        assert_eq!(best.limit, 3);
    }

    #[test]
    fn plain_tanyao() {
        assert_eq!(
            yaku_sets("M2 M3 M4 M5 M6 M7 P3 P3 P3 P5 P6 P7 S4 S4", "M7"),
            expect(&[&[Tanyao]])
        );
    }

    #[test]
    fn seat_wind_pon_is_fanpai() {
        assert_eq!(
            yaku_sets("X1 X1 X1 M2 M3 M4 M5 M6 M7 M8 M8 M8 M9 M9", "X1"),
            expect(&[&[Fanpai, Honitsu]])
        );
        // As a pair the seat wind is worth nothing.
        assert_eq!(
            yaku_sets("X1 X1 M2 M3 M4 M5 M6 M7 M8 M8 M8 M9 M9 M9", "X1"),
            expect(&[&[Honitsu]])
        );
    }

    #[test]
    fn pinfu_tanyao() {
        assert_eq!(
            yaku_sets("M2 M3 M4 M5 M6 M7 P2 P3 P4 P5 P6 P7 P8 P8", "P7"),
            expect(&[&[Pinfu, Tanyao]])
        );
    }

    #[test]
    fn sanshoku_depends_on_the_wait() {
        // S5 completes the 456 run in sou, lining up with man and pin.
        let tiles = tiles_from_str("M4 M5 M6 P4 P5 P6 S2 S3 S4 S4 S5 S6 X2 X2");
        let ctx = east_ctx();
        let s5 = best_hand(&tiles, "S5".parse().unwrap(), &ctx).unwrap();
        assert!(s5.yaku.contains(&Sanshoku));
    }

    #[test]
    fn seven_pairs_count_dora() {
        let tiles = tiles_from_str("M2 M2 M3 M3 P4 P4 P6 P6 S3 S3 S7 S7 X5 X5");
        let ctx = ScoringContext {
            dora_ind: Some("M1".parse().unwrap()),
            ..Default::default()
        };
        let score = best_hand(&tiles, "M2".parse().unwrap(), &ctx).unwrap();
        assert_eq!(score.yaku, vec![Nikoniko]);
        assert_eq!(score.dora, 2);
        assert_eq!(score.fan, 2);
        assert_eq!(score.limit, 0);
    }

    #[test]
    fn uradora_raises_the_limit() {
        let tiles = tiles_from_str("M2 M2 M3 M3 M4 M4 P2 P3 P4 P7 P7 P7 S2 S2");
        let wait = "M3".parse().unwrap();
        let without = ScoringContext {
            dora_ind: Some("M1".parse().unwrap()),
            ..Default::default()
        };
        let with = ScoringContext {
            uradora_ind: Some("P6".parse().unwrap()),
            ..without.clone()
        };
        // iipeiko + tanyao + two M2 dora = 4 fan, below mangan.
        assert_eq!(best_hand(&tiles, wait, &without).unwrap().limit, 0);
        // Three P7 uradora push it to haneman.
        assert_eq!(best_hand(&tiles, wait, &with).unwrap().limit, 2);
    }

    #[test]
    fn ippatsu_and_hotei_come_from_the_context() {
        let tiles = tiles_from_str("M2 M3 M4 M5 M6 M7 P2 P3 P4 P5 P6 P7 P8 P8");
        let wait = "P7".parse().unwrap();
        let ctx = ScoringContext { ippatsu: true, hotei: true, ..Default::default() };
        let score = best_hand(&tiles, wait, &ctx).unwrap();
        let mut yaku = score.yaku;
        yaku.sort();
        let mut want = vec![Pinfu, Tanyao, Ippatsu, Hotei];
        want.sort();
        assert_eq!(yaku, want);
    }
}
