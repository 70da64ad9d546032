use std::path::PathBuf;
use cozy_chess::Move;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use crate::board::Position;
use crate::config::TablebaseQuality;
use crate::error::Result;
use crate::wdl::{dtz_to_wdl, Wdl};
use super::{score_children, shortest, wdl_only, Probe, TablebaseAnswer, Verdict};

/// Opened DTZ tables. Both probes report from the side to move in `pos`.
pub trait DtzTables {
    fn probe_dtz(&self, pos: &Position) -> Probe;
    fn probe_wdl(&self, pos: &Position) -> Probe;
}

pub trait SyzygyOpener: Send {
    /// Opens every directory in `dirs` as one table set.
    fn open(&self, dirs: &[PathBuf]) -> Result<Box<dyn DtzTables>>;
}

pub fn choose<R: Rng>(tables: &dyn DtzTables, pos: &Position, quality: TablebaseQuality, rng: &mut R) -> Option<TablebaseAnswer> {
    let moves = pos.legal_moves();
    if moves.is_empty() { return None; }
    match score_children(pos, &moves, |child| tables.probe_dtz(child)) {
        Some(scored) => Some(select(&scored, quality, rng)),
        None => {
            debug!("No DTZ for every move in {}, using WDL only", pos.fen());
            let (mv, wdl) = wdl_only(pos, &moves, |child| tables.probe_wdl(child), rng)?;
            Some(TablebaseAnswer { verdict: Verdict::Play(mv), wdl, distance: None })
        }
    }
}

/// `scored` holds mover-frame DTZ per legal move; must not be empty.
pub fn select<R: Rng>(scored: &[(Move, i32)], quality: TablebaseQuality, rng: &mut R) -> TablebaseAnswer {
    assert!(!scored.is_empty(), "no moves to select from");
    let best_wdl = scored.iter().map(|&(_, d)| dtz_to_wdl(d)).max().unwrap_or(Wdl::Loss);
    let good: Vec<(Move, i32)> = scored.iter().copied().filter(|&(_, d)| dtz_to_wdl(d) == best_wdl).collect();

    let picked = match quality {
        TablebaseQuality::Good => good.choose(rng).copied(),
        TablebaseQuality::Suggest if good.len() > 1 => {
            let moves = good.iter().map(|&(mv, _)| mv).collect();
            return TablebaseAnswer { verdict: Verdict::Suggest(moves), wdl: best_wdl, distance: None };
        }
        _ => shortest(&good, rng),
    };
    let (mv, dtz) = picked.unwrap_or(good[0]);
    TablebaseAnswer { verdict: Verdict::Play(mv), wdl: best_wdl, distance: Some(dtz) }
}
