use std::time::{Duration, Instant};
use cozy_chess::Move;
use log::{info, warn};
use crate::board::Position;
use crate::config::{GoCommands, TimingConfig};
use crate::engine::{EngineProtocol, GameReport, SearchLimit};
use crate::error::Result;
use crate::game::GameState;
use crate::outcome::{PlayResult, Score};
use crate::policy::DrawResignPolicy;
use crate::search::EvalHistory;

/// Per-ply timing facts supplied by the caller.
#[derive(Clone, Copy, Debug)]
pub struct PlyTiming {
    /// When the opponent's move arrived; time since then is charged to us.
    pub start: Instant,
    pub can_ponder: bool,
}

impl PlyTiming {
    pub fn now(can_ponder: bool) -> Self { Self { start: Instant::now(), can_ponder } }

    fn elapsed_ms(&self) -> u64 { self.start.elapsed().as_millis() as u64 }
}

/// Drives the engine for one game: time budgets, go-command caps, the
/// evaluation history and the draw/resign flags on search results.
pub struct SearchController {
    engine: Box<dyn EngineProtocol>,
    go: GoCommands,
    timing: TimingConfig,
    policy: DrawResignPolicy,
    history: EvalHistory,
    closed: bool,
}

impl SearchController {
    pub fn new(engine: Box<dyn EngineProtocol>, go: GoCommands, timing: TimingConfig, policy: DrawResignPolicy) -> Self {
        Self { engine, go, timing, policy, history: EvalHistory::new(), closed: false }
    }

    pub fn history(&self) -> &EvalHistory { &self.history }
    pub fn policy(&self) -> &DrawResignPolicy { &self.policy }
    pub fn engine_name(&self) -> String { self.engine.identity() }
    pub fn engine_mut(&mut self) -> &mut dyn EngineProtocol { self.engine.as_mut() }

    /// Picks the phase-appropriate budget and searches.
    pub fn choose(&mut self, pos: &Position, game: &mut GameState, timing: &PlyTiming, root_moves: Option<&[Move]>) -> Result<Option<PlayResult>> {
        let draw_offered = game.draw_offered_by_opponent();
        if pos.ply() < 2 {
            self.first_search(pos, game, draw_offered, root_moves)
        } else if game.is_correspondence {
            self.correspondence_search(pos, game, timing, draw_offered, root_moves)
        } else {
            self.clock_search(pos, game, timing, draw_offered, root_moves)
        }
    }

    fn first_search(&mut self, pos: &Position, game: &GameState, draw_offered: bool, root_moves: Option<&[Move]>) -> Result<Option<PlayResult>> {
        let search_time = self.timing.first_move_time_ms;
        info!("Searching for time {} for game {}", search_time, game.id);
        // No pondering after the first move since a different clock is used afterwards.
        self.search(pos, SearchLimit::movetime(search_time), false, draw_offered, root_moves)
    }

    fn correspondence_search(&mut self, pos: &Position, game: &GameState, timing: &PlyTiming, draw_offered: bool, root_moves: Option<&[Move]>) -> Result<Option<PlayResult>> {
        let overhead = timing.elapsed_ms() + self.timing.move_overhead_ms;
        let clock_time = game.clock.time_left(pos.side_to_move()).saturating_sub(overhead);
        let search_time = self.timing.correspondence_move_time_ms.min(clock_time);
        info!("Searching for time {} for game {}", search_time, game.id);
        let ponder = timing.can_ponder;
        self.search(pos, SearchLimit::movetime(search_time), ponder, draw_offered, root_moves)
    }

    fn clock_search(&mut self, pos: &Position, game: &mut GameState, timing: &PlyTiming, draw_offered: bool, root_moves: Option<&[Move]>) -> Result<Option<PlayResult>> {
        let overhead = timing.elapsed_ms() + self.timing.move_overhead_ms;
        let left = game.clock.time_left_mut(pos.side_to_move());
        *left = left.saturating_sub(overhead);
        info!("Searching for wtime {} btime {} for game {}", game.clock.wtime, game.clock.btime, game.id);
        let ponder = timing.can_ponder;
        self.search(pos, SearchLimit::clock(game.clock), ponder, draw_offered, root_moves)
    }

    /// Tightens `limit` with the configured go commands.
    pub fn apply_go_commands(&self, mut limit: SearchLimit) -> SearchLimit {
        if let Some(movetime) = self.go.movetime {
            let cap = Duration::from_millis(movetime);
            if limit.time.map_or(true, |t| t > cap) { limit.time = Some(cap); }
        }
        if let Some(depth) = self.go.depth {
            limit.depth = Some(limit.depth.map_or(depth, |d| d.min(depth)));
        }
        if let Some(nodes) = self.go.nodes {
            limit.nodes = Some(limit.nodes.map_or(nodes, |n| n.min(nodes)));
        }
        limit
    }

    pub fn search(&mut self, pos: &Position, limit: SearchLimit, ponder: bool, draw_offered: bool, root_moves: Option<&[Move]>) -> Result<Option<PlayResult>> {
        let limit = self.apply_go_commands(limit);
        let outcome = self.engine.search(pos, &limit, ponder, draw_offered, root_moves)?;
        let Some(mv) = outcome.mv else {
            warn!("{} returned no move", self.engine.identity());
            return Ok(None);
        };
        // A missing score must not trigger a draw offer or resignation.
        self.history.push(outcome.info.score.unwrap_or(Score::Mate(1)));
        let result = PlayResult {
            mv,
            ponder: outcome.ponder,
            info: outcome.info,
            draw_offered: outcome.draw_offered,
            resigned: outcome.resigned,
        };
        Ok(Some(self.policy.apply(result, &self.history, pos.piece_count())))
    }

    pub fn stop(&mut self) { self.engine.stop(); }

    pub fn report_game_result(&mut self, pos: &Position, report: &GameReport) {
        self.engine.report_game_result(pos, report);
    }

    /// Stops any search and quits the engine. Also run on drop.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.closed { return Ok(()); }
        self.closed = true;
        self.engine.stop();
        self.engine.quit()
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() { warn!("engine shutdown failed: {}", e); }
    }
}
