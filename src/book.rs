//! Opening book lookup. File formats stay behind `BookReader`.

use std::path::{Path, PathBuf};
use cozy_chess::Move;
use log::{info, warn};
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::seq::SliceRandom;
use rand::Rng;
use crate::board::Position;
use crate::config::{BookConfig, BookSelection};
use crate::error::Result;
use crate::outcome::{MoveCandidate, PlayResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookEntry {
    pub mv: Move,
    pub weight: u32,
}

/// An opened book.
pub trait BookHandle {
    /// Entries for `pos`, in file order. Empty when the position is unknown.
    fn entries(&self, pos: &Position) -> Vec<BookEntry>;
}

pub trait BookReader: Send {
    fn open(&self, path: &Path) -> Result<Box<dyn BookHandle>>;
}

pub struct BookSource {
    cfg: BookConfig,
    reader: Box<dyn BookReader>,
}

impl BookSource {
    pub fn new(cfg: BookConfig, reader: Box<dyn BookReader>) -> Self { Self { cfg, reader } }

    pub fn config(&self) -> &BookConfig { &self.cfg }

    fn in_book_range(&self, pos: &Position) -> bool {
        pos.ply() < self.cfg.max_depth * 2
    }

    fn books_for(&self, pos: &Position) -> &[PathBuf] {
        self.cfg.book.get(pos.variant().key()).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// First book with a usable entry wins.
    pub fn lookup<R: Rng>(&self, pos: &Position, game_id: &str, rng: &mut R) -> MoveCandidate {
        if !self.cfg.enabled || !self.in_book_range(pos) { return MoveCandidate::NoMove; }
        for path in self.books_for(pos) {
            let handle = match self.reader.open(path) {
                Ok(h) => h,
                Err(e) => { warn!("Skipping book {}: {}", path.display(), e); continue; }
            };
            let entries = handle.entries(pos);
            if let Some(mv) = select(&entries, self.cfg.selection, self.cfg.min_weight, rng) {
                info!("Got move {} from book {} for game {}", pos.uci(mv), path.display(), game_id);
                return MoveCandidate::Single(PlayResult::new(mv));
            }
        }
        MoveCandidate::NoMove
    }
}

/// Applies a selection policy to one book's entries.
pub fn select<R: Rng>(entries: &[BookEntry], selection: BookSelection, min_weight: u32, rng: &mut R) -> Option<Move> {
    match selection {
        BookSelection::WeightedRandom => {
            // min_weight does not apply; zero-weight entries are never drawn
            let dist = WeightedIndex::new(entries.iter().map(|e| e.weight)).ok()?;
            Some(entries[dist.sample(rng)].mv)
        }
        BookSelection::UniformRandom => {
            let usable: Vec<&BookEntry> = entries.iter().filter(|e| e.weight >= min_weight).collect();
            usable.choose(rng).map(|e| e.mv)
        }
        BookSelection::BestMove => {
            let mut best: Option<&BookEntry> = None;
            for e in entries.iter().filter(|e| e.weight >= min_weight) {
                if best.map_or(true, |b| e.weight > b.weight) { best = Some(e); }
            }
            best.map(|e| e.mv)
        }
    }
}
