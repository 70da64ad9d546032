pub mod homemade;
pub mod strategies;

pub use homemade::{Homemade, HomemadeEngine, Notification};

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use cozy_chess::Move;
use log::debug;
use crate::board::Position;
use crate::config::EngineOptions;
use crate::error::{ArbiterError, Result};
use crate::game::{Clock, Player};
use crate::outcome::MoveInfo;

/// Limits for one search. Absent fields are unconstrained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchLimit {
    pub time: Option<Duration>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    /// Clock the engine budgets against itself.
    pub clock: Option<Clock>,
}

impl SearchLimit {
    pub fn movetime(ms: u64) -> Self {
        Self { time: Some(Duration::from_millis(ms)), ..Self::default() }
    }

    pub fn clock(clock: Clock) -> Self {
        Self { clock: Some(clock), ..Self::default() }
    }
}

/// What the engine answered. `mv` is `None` when it had nothing to play.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchOutcome {
    pub mv: Option<Move>,
    pub ponder: Option<Move>,
    pub info: MoveInfo,
    pub draw_offered: bool,
    pub resigned: bool,
}

/// Final state of a game, for engines that want to hear about it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameReport {
    /// `1-0`, `0-1`, `1/2-1/2` or `*`.
    pub result: String,
    pub termination: String,
}

/// A running engine, whatever the wire protocol. One instance per game.
pub trait EngineProtocol: Send {
    fn configure(&mut self, options: &EngineOptions) -> Result<()>;

    /// Blocks until the engine answers or its limit elapses. `root_moves`
    /// restricts the moves considered at the root.
    fn search(
        &mut self,
        pos: &Position,
        limit: &SearchLimit,
        ponder: bool,
        draw_offered: bool,
        root_moves: Option<&[Move]>,
    ) -> Result<SearchOutcome>;

    /// Interrupts a running search or ponder.
    fn stop(&mut self) {}

    fn identity(&self) -> String;

    fn quit(&mut self) -> Result<()>;

    fn set_opponent(&mut self, _opponent: &Player, _me: &Player) {}

    fn report_game_result(&mut self, _pos: &Position, _report: &GameReport) {}
}

/// Which implementation drives the engine, resolved once per game.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Uci,
    XBoard,
    Homemade(String),
}

impl EngineKind {
    pub fn from_config(protocol: &str, name: &str) -> Result<Self> {
        match protocol {
            "uci" => Ok(EngineKind::Uci),
            "xboard" => Ok(EngineKind::XBoard),
            "homemade" => Ok(EngineKind::Homemade(name.to_string())),
            other => Err(ArbiterError::UnknownProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Uci => write!(f, "uci"),
            EngineKind::XBoard => write!(f, "xboard"),
            EngineKind::Homemade(name) => write!(f, "homemade:{}", name),
        }
    }
}

pub type EngineCtor = Box<dyn Fn(&EngineOptions) -> Result<Box<dyn EngineProtocol>> + Send + Sync>;

/// Name → constructor table. Wire-protocol engines are registered by the
/// embedding application; homemade strategies come pre-registered.
pub struct EngineRegistry {
    ctors: HashMap<EngineKind, EngineCtor>,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        let mut reg = Self { ctors: HashMap::new() };
        strategies::register_builtin(&mut reg);
        reg
    }
}

impl EngineRegistry {
    pub fn empty() -> Self { Self { ctors: HashMap::new() } }

    pub fn register(&mut self, kind: EngineKind, ctor: EngineCtor) {
        self.ctors.insert(kind, ctor);
    }

    pub fn register_homemade<E, F>(&mut self, name: &str, make: F)
    where
        E: HomemadeEngine + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        let engine_name = name.to_string();
        self.register(
            EngineKind::Homemade(name.to_string()),
            Box::new(move |_opts: &EngineOptions| -> Result<Box<dyn EngineProtocol>> {
                Ok(Box::new(Homemade::new(engine_name.clone(), make())))
            }),
        );
    }

    pub fn contains(&self, kind: &EngineKind) -> bool { self.ctors.contains_key(kind) }

    /// Builds and configures the engine. Managed options are stripped first.
    pub fn create(&self, kind: &EngineKind, options: EngineOptions) -> Result<Box<dyn EngineProtocol>> {
        let ctor = self.ctors.get(kind).ok_or_else(|| ArbiterError::EngineNotRegistered(kind.to_string()))?;
        let options = options.without_managed();
        debug!("Starting engine: {}", kind);
        let mut engine = ctor(&options)?;
        engine.configure(&options)?;
        Ok(engine)
    }
}
