pub mod alphabeta;
pub mod controller;
pub mod eval;

pub use controller::{SearchController, PlyTiming};

use crate::outcome::Score;

/// Relative scores of the plies this game's engine searched, oldest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvalHistory {
    scores: Vec<Score>,
}

impl EvalHistory {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, score: Score) { self.scores.push(score); }

    pub fn len(&self) -> usize { self.scores.len() }

    pub fn is_empty(&self) -> bool { self.scores.is_empty() }

    /// The `n` most recent scores, or `None` while fewer were recorded.
    pub fn trailing(&self, n: usize) -> Option<&[Score]> {
        if self.scores.len() < n { return None; }
        Some(&self.scores[self.scores.len() - n..])
    }

    pub fn last(&self) -> Option<Score> { self.scores.last().copied() }
}

impl FromIterator<Score> for EvalHistory {
    fn from_iter<I: IntoIterator<Item = Score>>(iter: I) -> Self {
        Self { scores: iter.into_iter().collect() }
    }
}
