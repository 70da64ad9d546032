use cozy_chess::Move;
use crate::board::Position;
use crate::config::EngineOptions;
use crate::error::Result;
use crate::game::Player;
use super::{EngineProtocol, GameReport, SearchLimit, SearchOutcome};

/// Calls the controller makes on an engine, forwarded to homemade engines
/// through `HomemadeEngine::notify`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification<'a> {
    Configure(&'a EngineOptions),
    BeforeSearch,
    Stop,
    Quit,
}

/// An engine written in Rust rather than driven over a wire protocol.
/// Only `search` is required; the hooks default to doing nothing.
pub trait HomemadeEngine: Send {
    fn search(
        &mut self,
        pos: &Position,
        limit: &SearchLimit,
        ponder: bool,
        draw_offered: bool,
        root_moves: Option<&[Move]>,
    ) -> Result<SearchOutcome>;

    fn on_opponent(&mut self, _opponent: &Player, _me: &Player) {}

    fn on_game_result(&mut self, _pos: &Position, _report: &GameReport) {}

    fn notify(&mut self, _event: Notification<'_>) {}
}

/// Adapts a `HomemadeEngine` to `EngineProtocol`.
pub struct Homemade<E> {
    name: String,
    inner: E,
}

impl<E: HomemadeEngine> Homemade<E> {
    pub fn new(name: impl Into<String>, inner: E) -> Self {
        Self { name: name.into(), inner }
    }
}

impl<E: HomemadeEngine> EngineProtocol for Homemade<E> {
    fn configure(&mut self, options: &EngineOptions) -> Result<()> {
        self.inner.notify(Notification::Configure(options));
        Ok(())
    }

    fn search(
        &mut self,
        pos: &Position,
        limit: &SearchLimit,
        ponder: bool,
        draw_offered: bool,
        root_moves: Option<&[Move]>,
    ) -> Result<SearchOutcome> {
        self.inner.notify(Notification::BeforeSearch);
        self.inner.search(pos, limit, ponder, draw_offered, root_moves)
    }

    fn stop(&mut self) { self.inner.notify(Notification::Stop); }

    fn identity(&self) -> String { self.name.clone() }

    fn quit(&mut self) -> Result<()> {
        self.inner.notify(Notification::Quit);
        Ok(())
    }

    fn set_opponent(&mut self, opponent: &Player, me: &Player) { self.inner.on_opponent(opponent, me); }

    fn report_game_result(&mut self, pos: &Position, report: &GameReport) { self.inner.on_game_result(pos, report); }
}
