use crate::config::DrawResignConfig;
use crate::outcome::{PlayResult, MATE_SCORE};
use crate::search::EvalHistory;
use crate::wdl::Wdl;

/// Draw offers and resignation, decided from the trailing evaluations or
/// from a tablebase verdict.
#[derive(Clone, Debug, Default)]
pub struct DrawResignPolicy {
    cfg: DrawResignConfig,
}

impl DrawResignPolicy {
    pub fn new(cfg: DrawResignConfig) -> Self { Self { cfg } }

    pub fn config(&self) -> &DrawResignConfig { &self.cfg }

    pub fn should_offer_draw(&self, history: &EvalHistory, piece_count: u32) -> bool {
        if !self.cfg.offer_draw_enabled || piece_count > self.cfg.offer_draw_pieces { return false; }
        match history.trailing(self.cfg.offer_draw_moves) {
            Some(window) => window.iter().all(|s| s.cp(MATE_SCORE).abs() <= self.cfg.offer_draw_score),
            None => false,
        }
    }

    pub fn should_resign(&self, history: &EvalHistory) -> bool {
        if !self.cfg.resign_enabled { return false; }
        match history.trailing(self.cfg.resign_moves) {
            Some(window) => window.iter().all(|s| s.cp(MATE_SCORE) <= self.cfg.resign_score),
            None => false,
        }
    }

    /// Sets the flags on a fresh search result. Never clears a flag the
    /// engine set itself.
    pub fn apply(&self, mut result: PlayResult, history: &EvalHistory, piece_count: u32) -> PlayResult {
        if self.should_offer_draw(history, piece_count) { result.draw_offered = true; }
        if self.should_resign(history) { result.resigned = true; }
        result
    }

    /// Flags for a move whose outcome a tablebase has confirmed.
    pub fn tablebase_flags(&self, wdl: Wdl) -> (bool, bool) {
        let draw = self.cfg.offer_draw_enabled && self.cfg.offer_draw_for_egtb_zero && wdl == Wdl::Draw;
        let resign = self.cfg.resign_enabled && self.cfg.resign_for_egtb_minus_two && wdl == Wdl::Loss;
        (draw, resign)
    }

    pub fn apply_tablebase(&self, mut result: PlayResult, wdl: Wdl) -> PlayResult {
        let (draw, resign) = self.tablebase_flags(wdl);
        result.draw_offered |= draw;
        result.resigned |= resign;
        result
    }
}
