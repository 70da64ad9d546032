use std::path::PathBuf;
use cozy_chess::Move;
use rand::seq::SliceRandom;
use rand::Rng;
use crate::board::Position;
use crate::config::TablebaseQuality;
use crate::error::Result;
use crate::wdl::{dtm_to_gaviota_wdl, dtm_to_wdl, Wdl};
use super::{score_children, shortest, wdl_only, Probe, TablebaseAnswer, Verdict};

/// Opened DTM tables. Reports from the side to move in `pos`.
pub trait DtmTables {
    fn probe_dtm(&self, pos: &Position) -> Probe;

    /// Gaviota files carry no separate WDL data.
    fn probe_wdl(&self, _pos: &Position) -> Probe { Probe::NotFound }
}

pub trait GaviotaOpener: Send {
    fn open(&self, dirs: &[PathBuf]) -> Result<Box<dyn DtmTables>>;
}

pub fn choose<R: Rng>(
    tables: &dyn DtmTables,
    pos: &Position,
    quality: TablebaseQuality,
    wdl1_threshold: i32,
    rng: &mut R,
) -> Option<TablebaseAnswer> {
    let moves = pos.legal_moves();
    if moves.is_empty() { return None; }
    match score_children(pos, &moves, |child| tables.probe_dtm(child)) {
        Some(scored) => Some(select(&scored, quality, wdl1_threshold, rng)),
        None => {
            let (mv, wdl) = wdl_only(pos, &moves, |child| tables.probe_wdl(child), rng)?;
            Some(TablebaseAnswer { verdict: Verdict::Play(mv), wdl, distance: None })
        }
    }
}

/// Keeps the moves that stay on the same side of the 50-move boundaries as
/// the best one, once the half-move clock is counted in.
pub fn good_enough(good: &[(Move, i32)], best_dtm: i32, wdl1_threshold: i32) -> Vec<(Move, i32)> {
    let keep = |dtm: i32| -> bool {
        if best_dtm < 100 {
            dtm < 100
        } else if best_dtm < wdl1_threshold {
            dtm < wdl1_threshold
        } else if best_dtm <= -wdl1_threshold {
            dtm <= -wdl1_threshold
        } else if best_dtm <= -100 {
            dtm <= -100
        } else {
            true
        }
    };
    good.iter().copied().filter(|&(_, dtm)| keep(dtm)).collect()
}

/// `scored` holds mover-frame DTM per legal move; must not be empty.
pub fn select<R: Rng>(scored: &[(Move, i32)], quality: TablebaseQuality, wdl1_threshold: i32, rng: &mut R) -> TablebaseAnswer {
    assert!(!scored.is_empty(), "no moves to select from");
    let best_class = scored.iter().map(|&(_, d)| dtm_to_gaviota_wdl(d)).max().unwrap_or(Wdl::BlessedLoss);
    let good: Vec<(Move, i32)> = scored.iter().copied().filter(|&(_, d)| dtm_to_gaviota_wdl(d) == best_class).collect();
    let best_dtm = good.iter().map(|&(_, d)| d).min().unwrap_or(0);
    let wdl = dtm_to_wdl(best_dtm, wdl1_threshold);

    let picked = match quality {
        TablebaseQuality::Best => shortest(&good, rng),
        TablebaseQuality::Good => good_enough(&good, best_dtm, wdl1_threshold).choose(rng).copied(),
        TablebaseQuality::Suggest => {
            let survivors = good_enough(&good, best_dtm, wdl1_threshold);
            if survivors.len() > 1 {
                let moves = survivors.iter().map(|&(mv, _)| mv).collect();
                return TablebaseAnswer { verdict: Verdict::Suggest(moves), wdl, distance: None };
            }
            survivors.first().copied()
        }
    };
    let (mv, dtm) = picked.unwrap_or(good[0]);
    TablebaseAnswer { verdict: Verdict::Play(mv), wdl, distance: Some(dtm) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn moves(pos: &Position, list: &[(&str, i32)]) -> Vec<(Move, i32)> {
        list.iter().map(|&(m, d)| (pos.parse_uci(m).unwrap(), d)).collect()
    }

    #[test]
    fn filter_prefers_wins_inside_the_counter() {
        let pos = Position::startpos();
        let good = moves(&pos, &[("e2e4", 20), ("d2d4", 99), ("c2c4", 100), ("g1f3", 130)]);
        let kept: Vec<i32> = good_enough(&good, 20, 120).iter().map(|&(_, d)| d).collect();
        assert_eq!(kept, vec![20, 99]);
        let kept: Vec<i32> = good_enough(&good[2..], 100, 120).iter().map(|&(_, d)| d).collect();
        assert_eq!(kept, vec![100]);
        // Any losing best distance is below 100, so every losing move survives
        let losing = moves(&pos, &[("e2e4", -130), ("d2d4", -120), ("c2c4", -110)]);
        assert_eq!(good_enough(&losing, -130, 120).len(), 3);
    }

    #[test]
    fn pseudo_wdl_comes_from_best_dtm() {
        let pos = Position::startpos();
        let scored = moves(&pos, &[("e2e4", 125), ("d2d4", 140), ("c2c4", -3)]);
        let mut rng = SmallRng::seed_from_u64(4);
        let ans = select(&scored, TablebaseQuality::Best, 120, &mut rng);
        assert_eq!(ans.wdl, Wdl::CursedWin);
        assert_eq!(ans.verdict, Verdict::Play(scored[0].0));
        assert_eq!(ans.distance, Some(125));
    }

    #[test]
    fn suggest_with_one_survivor_plays_it() {
        let pos = Position::startpos();
        let scored = moves(&pos, &[("e2e4", 7), ("d2d4", 105)]);
        let mut rng = SmallRng::seed_from_u64(4);
        let ans = select(&scored, TablebaseQuality::Suggest, 120, &mut rng);
        assert_eq!(ans.verdict, Verdict::Play(scored[0].0));
        assert_eq!(ans.wdl, Wdl::Win);
    }
}
