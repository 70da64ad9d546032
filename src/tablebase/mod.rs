//! Local endgame tablebases: the DTZ family (syzygy) and the DTM family
//! (gaviota). Table files stay behind the opener traits; handles are opened
//! for one probe batch and dropped with it.

pub mod gaviota;
pub mod syzygy;

pub use gaviota::{DtmTables, GaviotaOpener};
pub use syzygy::{DtzTables, SyzygyOpener};

use cozy_chess::Move;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use crate::board::{Position, Variant};
use crate::config::LocalTablebaseConfig;
use crate::outcome::{MoveCandidate, MoveInfo, PlayResult, Score};
use crate::policy::DrawResignPolicy;
use crate::wdl::Wdl;

/// One table lookup. A miss is a value, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// Precise metric (DTZ or DTM) from the side to move in the probed position.
    Found(i32),
    FoundWdlOnly(Wdl),
    NotFound,
}

impl Probe {
    pub fn distance(self) -> Option<i32> {
        match self {
            Probe::Found(d) => Some(d),
            _ => None,
        }
    }

    pub fn wdl(self) -> Option<Wdl> {
        match self {
            Probe::Found(v) => Wdl::from_i32(v),
            Probe::FoundWdlOnly(w) => Some(w),
            Probe::NotFound => None,
        }
    }
}

/// What a tablebase family decided, before annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Play(Move),
    Suggest(Vec<Move>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TablebaseAnswer {
    pub verdict: Verdict,
    /// Outcome for the mover.
    pub wdl: Wdl,
    /// Mover-frame distance of the played move, when the tables had one.
    pub distance: Option<i32>,
}

impl TablebaseAnswer {
    /// Annotates a played move with the WDL stand-in score and the tablebase
    /// draw/resign flags.
    pub fn into_candidate(self, policy: &DrawResignPolicy) -> MoveCandidate {
        match self.verdict {
            Verdict::Suggest(moves) => MoveCandidate::suggest(moves),
            Verdict::Play(mv) => {
                let info = MoveInfo::with_score(Score::Cp(self.wdl.to_cp()));
                MoveCandidate::Single(policy.apply_tablebase(PlayResult::with_info(mv, info), self.wdl))
            }
        }
    }
}

/// Mover-frame distance of the move leading to `child`, from the raw metric
/// probed there. The child's half-move clock is added to the magnitude so
/// moves that keep the counter running look further away.
pub fn mover_distance(raw: i32, child: &Position) -> i32 {
    let d = -raw;
    if d == 0 { return 0; }
    d + d.signum() * child.halfmove_clock() as i32
}

/// Probes every child with `probe`; `None` as soon as one child misses.
pub(crate) fn score_children<F>(pos: &Position, moves: &[Move], mut probe: F) -> Option<Vec<(Move, i32)>>
where
    F: FnMut(&Position) -> Probe,
{
    moves.iter().map(|&mv| {
        let child = pos.after(mv);
        probe(&child).distance().map(|raw| (mv, mover_distance(raw, &child)))
    }).collect()
}

/// WDL-only re-probe after a precise miss. Always picks uniformly among the
/// best outcome.
pub(crate) fn wdl_only<F, R>(pos: &Position, moves: &[Move], mut probe: F, rng: &mut R) -> Option<(Move, Wdl)>
where
    F: FnMut(&Position) -> Probe,
    R: Rng,
{
    let scored: Vec<(Move, Wdl)> = moves.iter()
        .map(|&mv| probe(&pos.after(mv)).wdl().map(|w| (mv, w.flip())))
        .collect::<Option<_>>()?;
    let best = scored.iter().map(|&(_, w)| w).max()?;
    let good: Vec<&(Move, Wdl)> = scored.iter().filter(|(_, w)| *w == best).collect();
    good.choose(rng).map(|&&(mv, w)| (mv, w))
}

/// Random pick among the entries with the minimum distance.
pub(crate) fn shortest<R: Rng>(moves: &[(Move, i32)], rng: &mut R) -> Option<(Move, i32)> {
    let best = moves.iter().map(|&(_, d)| d).min()?;
    let ties: Vec<&(Move, i32)> = moves.iter().filter(|(_, d)| *d == best).collect();
    ties.choose(rng).map(|&&m| m)
}

pub struct LocalTablebaseSource {
    cfg: LocalTablebaseConfig,
    policy: DrawResignPolicy,
    syzygy: Option<Box<dyn SyzygyOpener>>,
    gaviota: Option<Box<dyn GaviotaOpener>>,
}

impl LocalTablebaseSource {
    pub fn new(cfg: LocalTablebaseConfig, policy: DrawResignPolicy) -> Self {
        Self { cfg, policy, syzygy: None, gaviota: None }
    }

    pub fn with_syzygy(mut self, opener: Box<dyn SyzygyOpener>) -> Self {
        self.syzygy = Some(opener);
        self
    }

    pub fn with_gaviota(mut self, opener: Box<dyn GaviotaOpener>) -> Self {
        self.gaviota = Some(opener);
        self
    }

    fn syzygy_usable(&self, pos: &Position) -> bool {
        let cfg = &self.cfg.syzygy;
        cfg.enabled
            && self.syzygy.is_some()
            && pos.piece_count() <= cfg.max_pieces
            && matches!(pos.variant(), Variant::Standard | Variant::Chess960)
            && !pos.has_castling_rights()
    }

    fn gaviota_usable(&self, pos: &Position) -> bool {
        let cfg = &self.cfg.gaviota;
        cfg.enabled
            && self.gaviota.is_some()
            && pos.piece_count() <= cfg.max_pieces
            && matches!(pos.variant(), Variant::Standard | Variant::Chess960)
    }

    /// DTZ tables first, then DTM tables.
    pub fn probe<R: Rng>(&self, pos: &Position, game_id: &str, rng: &mut R) -> Option<TablebaseAnswer> {
        self.probe_syzygy(pos, game_id, rng).or_else(|| self.probe_gaviota(pos, game_id, rng))
    }

    pub fn lookup<R: Rng>(&self, pos: &Position, game_id: &str, rng: &mut R) -> MoveCandidate {
        match self.probe(pos, game_id, rng) {
            Some(answer) => answer.into_candidate(&self.policy),
            None => MoveCandidate::NoMove,
        }
    }

    fn probe_syzygy<R: Rng>(&self, pos: &Position, game_id: &str, rng: &mut R) -> Option<TablebaseAnswer> {
        if !self.syzygy_usable(pos) { return None; }
        let opener = self.syzygy.as_ref()?;
        let tables = match opener.open(&self.cfg.syzygy.paths) {
            Ok(t) => t,
            Err(e) => { warn!("syzygy tables unavailable: {}", e); return None; }
        };
        let answer = syzygy::choose(tables.as_ref(), pos, self.cfg.syzygy.move_quality, rng)?;
        log_answer("syzygy", pos, &answer, game_id);
        Some(answer)
    }

    fn probe_gaviota<R: Rng>(&self, pos: &Position, game_id: &str, rng: &mut R) -> Option<TablebaseAnswer> {
        if !self.gaviota_usable(pos) { return None; }
        let opener = self.gaviota.as_ref()?;
        let tables = match opener.open(&self.cfg.gaviota.paths) {
            Ok(t) => t,
            Err(e) => { warn!("gaviota tables unavailable: {}", e); return None; }
        };
        let cfg = &self.cfg.gaviota;
        let answer = gaviota::choose(tables.as_ref(), pos, cfg.move_quality, cfg.min_dtm_to_consider_as_wdl_1, rng)?;
        log_answer("gaviota", pos, &answer, game_id);
        Some(answer)
    }
}

pub(crate) fn log_answer(source: &str, pos: &Position, answer: &TablebaseAnswer, game_id: &str) {
    match &answer.verdict {
        Verdict::Suggest(_) => info!("Suggesting moves from {} (wdl: {}) for game {}", source, answer.wdl, game_id),
        Verdict::Play(mv) => match answer.distance {
            Some(d) => info!("Got move {} from {} (wdl: {}, distance: {}) for game {}", pos.uci(*mv), source, answer.wdl, d, game_id),
            None => info!("Got move {} from {} (wdl: {}) for game {}", pos.uci(*mv), source, answer.wdl, game_id),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_grows_with_the_child_clock() {
        let child = Position::from_fen("8/8/8/8/8/2k5/8/K1q5 w - - 7 60", Variant::Standard).unwrap();
        assert_eq!(mover_distance(-3, &child), 10);
        assert_eq!(mover_distance(4, &child), -11);
        assert_eq!(mover_distance(0, &child), 0);
    }

    #[test]
    fn probe_accessors() {
        assert_eq!(Probe::Found(-2).wdl(), Some(Wdl::Loss));
        assert_eq!(Probe::Found(7).wdl(), None);
        assert_eq!(Probe::FoundWdlOnly(Wdl::Draw).distance(), None);
        assert_eq!(Probe::NotFound.wdl(), None);
    }
}
