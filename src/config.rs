//! Configuration tree for the move sources, keyed like the bot's engine
//! section so an existing config file can be deserialized directly.
//! Every struct defaults field-by-field.

use std::collections::HashMap;
use std::path::PathBuf;
use serde::Deserialize;
use crate::error::{ArbiterError, Result};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    pub polyglot: BookConfig,
    pub lichess_bot_tbs: LocalTablebaseConfig,
    pub online_moves: OnlineMovesConfig,
    pub draw_or_resign: DrawResignConfig,
    pub go_commands: GoCommands,
    pub timing: TimingConfig,
    /// Seed for the per-game RNG; entropy when absent.
    pub seed: Option<u64>,
}

impl ArbiterConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: ArbiterConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.polyglot.enabled && self.polyglot.max_depth == 0 {
            return Err(ArbiterError::Config("polyglot.max_depth must be at least 1".into()));
        }
        let gav = &self.lichess_bot_tbs.gaviota;
        if gav.enabled && gav.min_dtm_to_consider_as_wdl_1 < 100 {
            return Err(ArbiterError::Config("gaviota.min_dtm_to_consider_as_wdl_1 must be at least 100".into()));
        }
        if self.draw_or_resign.resign_score > 0 {
            return Err(ArbiterError::Config("draw_or_resign.resign_score must not be positive".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSelection {
    #[default]
    WeightedRandom,
    UniformRandom,
    BestMove,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub enabled: bool,
    /// Books per variant key, tried in order.
    pub book: HashMap<String, Vec<PathBuf>>,
    /// Full moves the books are consulted for.
    pub max_depth: usize,
    pub selection: BookSelection,
    pub min_weight: u32,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self { enabled: false, book: HashMap::new(), max_depth: 8, selection: BookSelection::default(), min_weight: 1 }
    }
}

/// Move quality for tablebase sources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TablebaseQuality {
    Best,
    #[default]
    Good,
    Suggest,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocalTablebaseConfig {
    pub syzygy: SyzygyConfig,
    pub gaviota: GaviotaConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SyzygyConfig {
    pub enabled: bool,
    pub paths: Vec<PathBuf>,
    pub max_pieces: u32,
    pub move_quality: TablebaseQuality,
}

impl Default for SyzygyConfig {
    fn default() -> Self {
        Self { enabled: false, paths: Vec::new(), max_pieces: 7, move_quality: TablebaseQuality::default() }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GaviotaConfig {
    pub enabled: bool,
    pub paths: Vec<PathBuf>,
    pub max_pieces: u32,
    /// Mate distance from which a win is treated like a cursed win.
    pub min_dtm_to_consider_as_wdl_1: i32,
    pub move_quality: TablebaseQuality,
}

impl Default for GaviotaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            paths: Vec::new(),
            max_pieces: 5,
            min_dtm_to_consider_as_wdl_1: 120,
            move_quality: TablebaseQuality::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OnlineMovesConfig {
    /// Misses of the online opening sources after which they are dropped for the game.
    pub max_out_of_book_moves: u32,
    /// Per-request HTTP timeout.
    pub timeout_ms: u64,
    pub online_egtb: OnlineEgtbConfig,
    pub chessdb_book: ChessdbConfig,
    pub lichess_cloud_analysis: CloudConfig,
}

impl Default for OnlineMovesConfig {
    fn default() -> Self {
        Self {
            max_out_of_book_moves: 10,
            timeout_ms: 2_000,
            online_egtb: OnlineEgtbConfig::default(),
            chessdb_book: ChessdbConfig::default(),
            lichess_cloud_analysis: CloudConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EgtbProvider {
    #[default]
    Lichess,
    Chessdb,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OnlineEgtbConfig {
    pub enabled: bool,
    /// Seconds left on our clock below which the service is not queried.
    pub min_time: u64,
    pub max_pieces: u32,
    pub source: EgtbProvider,
    pub move_quality: TablebaseQuality,
}

impl Default for OnlineEgtbConfig {
    fn default() -> Self {
        Self { enabled: false, min_time: 20, max_pieces: 7, source: EgtbProvider::default(), move_quality: TablebaseQuality::Best }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChessdbQuality {
    Best,
    #[default]
    Good,
    All,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ChessdbConfig {
    pub enabled: bool,
    pub min_time: u64,
    pub move_quality: ChessdbQuality,
    pub min_depth: u32,
    /// Queue unknown positions for analysis on the server.
    pub contribute: bool,
}

impl Default for ChessdbConfig {
    fn default() -> Self {
        Self { enabled: false, min_time: 20, move_quality: ChessdbQuality::default(), min_depth: 20, contribute: true }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudQuality {
    Best,
    #[default]
    Good,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub enabled: bool,
    pub min_time: u64,
    pub move_quality: CloudQuality,
    /// Centipawns a line may trail the top line and still be picked.
    pub max_score_difference: i32,
    pub min_depth: u32,
    pub min_knodes: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self { enabled: false, min_time: 20, move_quality: CloudQuality::default(), max_score_difference: 50, min_depth: 20, min_knodes: 0 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DrawResignConfig {
    pub resign_enabled: bool,
    pub resign_score: i32,
    pub resign_for_egtb_minus_two: bool,
    pub resign_moves: usize,
    pub offer_draw_enabled: bool,
    pub offer_draw_score: i32,
    pub offer_draw_for_egtb_zero: bool,
    pub offer_draw_moves: usize,
    pub offer_draw_pieces: u32,
}

impl Default for DrawResignConfig {
    fn default() -> Self {
        Self {
            resign_enabled: false,
            resign_score: -1000,
            resign_for_egtb_minus_two: true,
            resign_moves: 3,
            offer_draw_enabled: true,
            offer_draw_score: 0,
            offer_draw_for_egtb_zero: true,
            offer_draw_moves: 10,
            offer_draw_pieces: 10,
        }
    }
}

/// Caps layered over every clock-based search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoCommands {
    pub movetime: Option<u64>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub move_overhead_ms: u64,
    pub correspondence_move_time_ms: u64,
    /// Budget for the bot's first move, independent of the clock.
    pub first_move_time_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { move_overhead_ms: 1_000, correspondence_move_time_ms: 60_000, first_move_time_ms: 10_000 }
    }
}

/// Engine options forwarded to `EngineProtocol::configure`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct EngineOptions(pub Vec<(String, String)>);

/// UCI options the search controller drives itself.
const MANAGED_OPTIONS: [&str; 4] = ["uci_chess960", "uci_variant", "multipv", "ponder"];

impl EngineOptions {
    pub fn without_managed(self) -> Self {
        EngineOptions(self.0.into_iter().filter(|(k, _)| !MANAGED_OPTIONS.contains(&k.to_lowercase().as_str())).collect())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}
