//! Move sources backed by web services: an online endgame tablebase, the
//! chessdb opening database and lichess cloud analysis.
//!
//! Every failure (transport, status, unexpected JSON, illegal move in the
//! reply) is logged at debug level and counts as a miss.

pub mod opening;
pub mod tablebase;

use std::time::Duration;
use cozy_chess::Move;
use log::{debug, info};
use rand::Rng;
use crate::board::{Position, Variant};
use crate::config::{EgtbProvider, OnlineMovesConfig};
use crate::game::GameState;
use crate::http::HttpClient;
use crate::outcome::{MoveCandidate, PlayResult};
use crate::policy::DrawResignPolicy;
use crate::tablebase::{log_answer, TablebaseAnswer};

pub const LICHESS_TABLEBASE_URL: &str = "http://tablebase.lichess.ovh";
pub const CHESSDB_URL: &str = "https://www.chessdb.cn/cdb.php";
pub const LICHESS_CLOUD_URL: &str = "https://lichess.org/api/cloud-eval";

/// Plies in a row the online opening sources came back empty. Never
/// decreases; once it reaches the maximum the opening sources are skipped
/// for the rest of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfBookCounter {
    count: u32,
    max: u32,
}

impl OutOfBookCounter {
    pub fn new(max: u32) -> Self { Self { count: 0, max } }

    pub fn count(&self) -> u32 { self.count }

    pub fn is_exhausted(&self) -> bool { self.count >= self.max }

    /// Returns true on the miss that exhausts the counter.
    pub fn record_miss(&mut self) -> bool {
        if self.is_exhausted() { return false; }
        self.count += 1;
        self.is_exhausted()
    }
}

/// The legal leading part of a line of UCI moves played from `pos`. Stops
/// at the first move that does not parse.
pub(crate) fn legal_prefix<S: AsRef<str>>(pos: &Position, line: &[S]) -> Vec<Move> {
    let mut cur = pos.clone();
    let mut moves = Vec::with_capacity(line.len());
    for uci in line {
        let Ok(mv) = cur.parse_uci(uci.as_ref()) else { break };
        cur = cur.after(mv);
        moves.push(mv);
    }
    moves
}

pub struct RemoteSource {
    cfg: OnlineMovesConfig,
    policy: DrawResignPolicy,
    http: Box<dyn HttpClient>,
    counter: OutOfBookCounter,
}

impl RemoteSource {
    pub fn new(cfg: OnlineMovesConfig, policy: DrawResignPolicy, http: Box<dyn HttpClient>) -> Self {
        let counter = OutOfBookCounter::new(cfg.max_out_of_book_moves);
        Self { cfg, policy, http, counter }
    }

    pub fn counter(&self) -> OutOfBookCounter { self.counter }

    fn timeout(&self) -> Duration { Duration::from_millis(self.cfg.timeout_ms) }

    fn enough_time(pos: &Position, game: &GameState, min_time_s: u64) -> bool {
        game.clock.time_left(pos.side_to_move()) >= min_time_s * 1000
    }

    fn uses_opening_sources(&self) -> bool {
        self.cfg.chessdb_book.enabled || self.cfg.lichess_cloud_analysis.enabled
    }

    /// Online tablebase first; the opening sources only until exhausted.
    pub fn lookup<R: Rng>(&mut self, pos: &Position, game: &GameState, rng: &mut R) -> MoveCandidate {
        if let Some(answer) = self.egtb_move(pos, game, rng) {
            return answer.into_candidate(&self.policy);
        }
        if !self.counter.is_exhausted() {
            if let Some(result) = self.chessdb_move(pos, game) {
                return MoveCandidate::Single(result);
            }
            if let Some(result) = self.cloud_move(pos, game, rng) {
                return MoveCandidate::Single(result);
            }
        }
        if self.counter.record_miss() && self.uses_opening_sources() {
            info!("Will stop using online opening books for game {}.", game.id);
        }
        MoveCandidate::NoMove
    }

    fn egtb_usable(&self, pos: &Position, game: &GameState) -> bool {
        let cfg = &self.cfg.online_egtb;
        let variant_ok = match cfg.source {
            EgtbProvider::Lichess => matches!(pos.variant(), Variant::Standard | Variant::Chess960),
            EgtbProvider::Chessdb => pos.variant() == Variant::Standard,
        };
        cfg.enabled
            && Self::enough_time(pos, game, cfg.min_time)
            && variant_ok
            && pos.piece_count() <= cfg.max_pieces
            && !pos.has_castling_rights()
    }

    fn egtb_move<R: Rng>(&self, pos: &Position, game: &GameState, rng: &mut R) -> Option<TablebaseAnswer> {
        if !self.egtb_usable(pos, game) { return None; }
        let cfg = &self.cfg.online_egtb;
        let (name, reply) = match cfg.source {
            EgtbProvider::Lichess => ("tablebase.lichess.ovh", tablebase::lichess(self.http.as_ref(), pos, cfg.move_quality, self.timeout(), rng)),
            EgtbProvider::Chessdb => ("chessdb.cn", tablebase::chessdb(self.http.as_ref(), pos, cfg.move_quality, self.timeout(), rng)),
        };
        match reply {
            Ok(Some(answer)) => {
                log_answer(name, pos, &answer, &game.id);
                Some(answer)
            }
            Ok(None) => None,
            Err(e) => { debug!("{} lookup failed for game {}: {}", name, game.id, e); None }
        }
    }

    fn chessdb_move(&self, pos: &Position, game: &GameState) -> Option<PlayResult> {
        let cfg = &self.cfg.chessdb_book;
        if !cfg.enabled || !Self::enough_time(pos, game, cfg.min_time) || pos.variant() != Variant::Standard {
            return None;
        }
        let reply = opening::chessdb(self.http.as_ref(), pos, cfg, self.timeout());
        if cfg.contribute {
            if let Err(e) = opening::chessdb_queue(self.http.as_ref(), pos, self.timeout()) {
                debug!("chessdb.cn contribution failed for game {}: {}", game.id, e);
            }
        }
        match reply {
            Ok(Some(result)) => {
                info!("Got move {} from chessdb.cn for game {}", pos.uci(result.mv), game.id);
                Some(result)
            }
            Ok(None) => None,
            Err(e) => { debug!("chessdb.cn lookup failed for game {}: {}", game.id, e); None }
        }
    }

    fn cloud_move<R: Rng>(&self, pos: &Position, game: &GameState, rng: &mut R) -> Option<PlayResult> {
        let cfg = &self.cfg.lichess_cloud_analysis;
        if !cfg.enabled || !Self::enough_time(pos, game, cfg.min_time) { return None; }
        match opening::lichess_cloud(self.http.as_ref(), pos, cfg, self.timeout(), rng) {
            Ok(Some(result)) => {
                info!("Got move {} from lichess cloud analysis for game {}", pos.uci(result.mv), game.id);
                Some(result)
            }
            Ok(None) => None,
            Err(e) => { debug!("lichess cloud analysis failed for game {}: {}", game.id, e); None }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_saturates() {
        let mut c = OutOfBookCounter::new(2);
        assert!(!c.record_miss());
        assert!(c.record_miss());
        assert!(!c.record_miss());
        assert_eq!(c.count(), 2);
        assert!(c.is_exhausted());
    }

    #[test]
    fn line_parsing_walks_the_position() {
        let pos = Position::startpos();
        assert_eq!(legal_prefix(&pos, &["e2e4", "e7e5", "g1f3"]).len(), 3);
        assert_eq!(legal_prefix(&pos, &["e2e4", "e2e4", "g1f3"]).len(), 1);
        assert!(legal_prefix(&pos, &["e7e5"]).is_empty());
    }
}
