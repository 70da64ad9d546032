//! Built-in homemade engines. Mostly useful for testing the pipeline
//! without an external engine process.

use cozy_chess::Move;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use crate::board::Position;
use crate::error::Result;
use crate::search::alphabeta::{clock_budget, own_clock, SearchParams, Searcher};
use super::{EngineRegistry, HomemadeEngine, SearchLimit, SearchOutcome};

pub fn register_builtin(reg: &mut EngineRegistry) {
    reg.register_homemade("RandomMove", RandomMove::default);
    reg.register_homemade("Alphabetical", || Alphabetical);
    reg.register_homemade("FirstMove", || FirstMove);
    reg.register_homemade("MaterialSearch", MaterialSearch::default);
}

fn candidates(pos: &Position, root_moves: Option<&[Move]>) -> Vec<Move> {
    match root_moves {
        Some(moves) if !moves.is_empty() => moves.to_vec(),
        _ => pos.legal_moves(),
    }
}

/// Plays a random legal move.
pub struct RandomMove {
    rng: SmallRng,
}

impl Default for RandomMove {
    fn default() -> Self { Self { rng: SmallRng::from_entropy() } }
}

impl RandomMove {
    pub fn seeded(seed: u64) -> Self { Self { rng: SmallRng::seed_from_u64(seed) } }
}

impl HomemadeEngine for RandomMove {
    fn search(&mut self, pos: &Position, _limit: &SearchLimit, _ponder: bool, _draw_offered: bool, root_moves: Option<&[Move]>) -> Result<SearchOutcome> {
        let moves = candidates(pos, root_moves);
        Ok(SearchOutcome { mv: moves.choose(&mut self.rng).copied(), ..SearchOutcome::default() })
    }
}

/// Plays the alphabetically first move in UCI notation.
pub struct Alphabetical;

impl HomemadeEngine for Alphabetical {
    fn search(&mut self, pos: &Position, _limit: &SearchLimit, _ponder: bool, _draw_offered: bool, root_moves: Option<&[Move]>) -> Result<SearchOutcome> {
        let mv = candidates(pos, root_moves).into_iter().min_by_key(|&m| pos.uci(m));
        Ok(SearchOutcome { mv, ..SearchOutcome::default() })
    }
}

/// Plays the first move the generator produces.
pub struct FirstMove;

impl HomemadeEngine for FirstMove {
    fn search(&mut self, pos: &Position, _limit: &SearchLimit, _ponder: bool, _draw_offered: bool, root_moves: Option<&[Move]>) -> Result<SearchOutcome> {
        let mv = candidates(pos, root_moves).first().copied();
        Ok(SearchOutcome { mv, ..SearchOutcome::default() })
    }
}

/// Material negamax. Depth/nodes/time come from the limit; with only a
/// clock it spends a fixed share of the remaining time.
pub struct MaterialSearch {
    searcher: Searcher,
    default_depth: u32,
}

impl Default for MaterialSearch {
    fn default() -> Self { Self { searcher: Searcher::default(), default_depth: 4 } }
}

impl HomemadeEngine for MaterialSearch {
    fn search(&mut self, pos: &Position, limit: &SearchLimit, _ponder: bool, _draw_offered: bool, root_moves: Option<&[Move]>) -> Result<SearchOutcome> {
        let clock_time = limit.clock.map(|c| {
            let (left, inc) = own_clock(pos.side_to_move(), &c);
            clock_budget(left, inc)
        });
        let movetime = match (limit.time, clock_time) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let params = SearchParams {
            depth: limit.depth.unwrap_or(self.default_depth),
            max_nodes: limit.nodes,
            movetime,
        };
        let roots = root_moves.unwrap_or(&[]);
        let res = self.searcher.search(pos.board(), roots, params);
        Ok(SearchOutcome { mv: res.bestmove, info: res.info(), ..SearchOutcome::default() })
    }
}
