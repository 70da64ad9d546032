//! The per-game move arbitrator: book, then local tablebases, then remote
//! services, then the engine.

use std::fmt;
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use crate::board::Position;
use crate::book::BookSource;
use crate::config::ArbiterConfig;
use crate::engine::{EngineProtocol, GameReport};
use crate::error::Result;
use crate::game::GameState;
use crate::http::HttpClient;
use crate::outcome::{MoveCandidate, PlayResult};
use crate::policy::DrawResignPolicy;
use crate::remote::{OutOfBookCounter, RemoteSource};
use crate::search::{EvalHistory, PlyTiming, SearchController};
use crate::stats::{stat_lines, Comment};
use crate::tablebase::LocalTablebaseSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveSource {
    Book,
    Tablebase,
    Online,
    Engine,
}

impl fmt::Display for MoveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveSource::Book => "book",
            MoveSource::Tablebase => "tablebase",
            MoveSource::Online => "online",
            MoveSource::Engine => "engine",
        };
        f.write_str(name)
    }
}

/// The outcome of one arbitration. `candidate` is `Single` unless the
/// engine had nothing to play.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub candidate: MoveCandidate,
    pub source: MoveSource,
    ply: usize,
}

impl Decision {
    pub fn play_result(&self) -> Option<&PlayResult> { self.candidate.play_result() }

    /// Resignation is never honoured on the first two plies.
    pub fn should_resign(&self) -> bool {
        self.ply >= 2 && self.play_result().map_or(false, |r| r.resigned)
    }

    pub fn offers_draw(&self) -> bool {
        self.play_result().map_or(false, |r| r.draw_offered)
    }
}

/// Owns everything one game needs. Games never share an arbitrator.
pub struct MoveArbitrator {
    controller: SearchController,
    book: Option<BookSource>,
    tablebases: LocalTablebaseSource,
    remote: Option<RemoteSource>,
    rng: SmallRng,
    commentary: Vec<Comment>,
    comment_start: Option<usize>,
}

impl MoveArbitrator {
    /// An arbitrator with only the engine and (unopened) tablebase config.
    /// Attach the other sources with the `with_*` builders.
    pub fn new(cfg: &ArbiterConfig, engine: Box<dyn EngineProtocol>) -> Self {
        let policy = DrawResignPolicy::new(cfg.draw_or_resign.clone());
        let controller = SearchController::new(engine, cfg.go_commands, cfg.timing, policy.clone());
        let rng = match cfg.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            controller,
            book: None,
            tablebases: LocalTablebaseSource::new(cfg.lichess_bot_tbs.clone(), policy),
            remote: None,
            rng,
            commentary: Vec::new(),
            comment_start: None,
        }
    }

    pub fn with_book(mut self, book: BookSource) -> Self {
        self.book = Some(book);
        self
    }

    pub fn with_tablebases(mut self, tablebases: LocalTablebaseSource) -> Self {
        self.tablebases = tablebases;
        self
    }

    pub fn with_remote(mut self, cfg: &ArbiterConfig, http: Box<dyn HttpClient>) -> Self {
        let policy = self.controller.policy().clone();
        self.remote = Some(RemoteSource::new(cfg.online_moves.clone(), policy, http));
        self
    }

    pub fn history(&self) -> &EvalHistory { self.controller.history() }
    pub fn engine_name(&self) -> String { self.controller.engine_name() }
    pub fn out_of_book(&self) -> Option<OutOfBookCounter> { self.remote.as_ref().map(|r| r.counter()) }

    /// Runs the cascade for the position `pos`, where we are to move.
    pub fn choose_move(&mut self, pos: &Position, game: &mut GameState, timing: &PlyTiming) -> Result<Decision> {
        let (candidate, source) = self.consult_sources(pos, game);
        let decision = match candidate {
            MoveCandidate::Single(result) => {
                // A book or tablebase move ends any ponder search still running
                self.controller.stop();
                Decision { candidate: MoveCandidate::Single(result), source, ply: pos.ply() }
            }
            other => {
                let root_moves = other.root_moves();
                let candidate = match self.controller.choose(pos, game, timing, root_moves)? {
                    Some(result) => MoveCandidate::Single(result),
                    None => MoveCandidate::NoMove,
                };
                Decision { candidate, source: MoveSource::Engine, ply: pos.ply() }
            }
        };
        if let Some(result) = decision.play_result() {
            self.add_comment(result, pos);
            self.log_stats();
        }
        Ok(decision)
    }

    fn consult_sources(&mut self, pos: &Position, game: &GameState) -> (MoveCandidate, MoveSource) {
        if let Some(book) = &self.book {
            let found = book.lookup(pos, &game.id, &mut self.rng);
            if found.is_single() { return (found, MoveSource::Book); }
        }
        let found = self.tablebases.lookup(pos, &game.id, &mut self.rng);
        // Suggestions go straight to the engine
        if !found.is_none() { return (found, MoveSource::Tablebase); }
        if let Some(remote) = &mut self.remote {
            let found = remote.lookup(pos, game, &mut self.rng);
            if !found.is_none() { return (found, MoveSource::Online); }
        }
        (MoveCandidate::NoMove, MoveSource::Engine)
    }

    fn add_comment(&mut self, result: &PlayResult, pos: &Position) {
        if self.comment_start.is_none() { self.comment_start = Some(pos.ply()); }
        self.commentary.push(Comment::new(result.info.clone(), pos));
    }

    /// Commentary for the move played at `index` in the game's move list.
    /// Empty for the opponent's moves and for anything before our first.
    pub fn comment_for_board_index(&self, index: usize) -> Comment {
        let Some(start) = self.comment_start else { return Comment::default() };
        if index < start || (index - start) % 2 != 0 { return Comment::default(); }
        self.commentary.get((index - start) / 2).cloned().unwrap_or_default()
    }

    pub fn stats(&self, for_chat: bool) -> Vec<String> {
        self.commentary.last().map(|c| stat_lines(c, for_chat)).unwrap_or_default()
    }

    fn log_stats(&self) {
        for line in self.stats(false) { info!("{}", line); }
    }

    pub fn set_opponent(&mut self, game: &GameState) {
        self.controller.engine_mut().set_opponent(&game.opponent, &game.me);
    }

    pub fn report_game_result(&mut self, pos: &Position, report: &GameReport) {
        self.controller.report_game_result(pos, report);
    }

    pub fn shutdown(&mut self) -> Result<()> { self.controller.shutdown() }
}
