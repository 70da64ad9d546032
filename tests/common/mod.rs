#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cozy_chess::Move;
use piebot_arbiter::board::Position;
use piebot_arbiter::book::{BookEntry, BookHandle, BookReader};
use piebot_arbiter::engine::{HomemadeEngine, Notification, SearchLimit, SearchOutcome};
use piebot_arbiter::error::{ArbiterError, Result};
use piebot_arbiter::http::HttpClient;
use piebot_arbiter::outcome::{MoveInfo, Score};
use piebot_arbiter::tablebase::{DtmTables, DtzTables, GaviotaOpener, Probe, SyzygyOpener};

/// What a scripted engine saw, shared with the test body.
#[derive(Default)]
pub struct EngineLog {
    pub searches: AtomicUsize,
    pub stops: AtomicUsize,
    pub limits: Mutex<Vec<SearchLimit>>,
    pub root_moves: Mutex<Vec<Option<Vec<Move>>>>,
    pub ponder: Mutex<Vec<bool>>,
    pub draw_offered: Mutex<Vec<bool>>,
}

impl EngineLog {
    pub fn searches(&self) -> usize { self.searches.load(Ordering::SeqCst) }
    pub fn stops(&self) -> usize { self.stops.load(Ordering::SeqCst) }
    pub fn last_limit(&self) -> SearchLimit { *self.limits.lock().unwrap().last().expect("no search") }
}

/// Plays the first candidate move and reports scores from a script, one per
/// search; `None` entries leave the score out.
pub struct ScriptedEngine {
    pub log: Arc<EngineLog>,
    pub scores: Vec<Option<Score>>,
}

impl ScriptedEngine {
    pub fn new(scores: Vec<Option<Score>>) -> (Self, Arc<EngineLog>) {
        let log = Arc::new(EngineLog::default());
        (Self { log: log.clone(), scores }, log)
    }
}

impl HomemadeEngine for ScriptedEngine {
    fn search(&mut self, pos: &Position, limit: &SearchLimit, ponder: bool, draw_offered: bool, root_moves: Option<&[Move]>) -> Result<SearchOutcome> {
        let n = self.log.searches.fetch_add(1, Ordering::SeqCst);
        self.log.limits.lock().unwrap().push(*limit);
        self.log.root_moves.lock().unwrap().push(root_moves.map(|m| m.to_vec()));
        self.log.ponder.lock().unwrap().push(ponder);
        self.log.draw_offered.lock().unwrap().push(draw_offered);
        let mv = match root_moves {
            Some(moves) => moves.first().copied(),
            None => pos.legal_moves().first().copied(),
        };
        let score = self.scores.get(n).copied().flatten();
        Ok(SearchOutcome { mv, info: MoveInfo { score, ..MoveInfo::default() }, ..SearchOutcome::default() })
    }

    fn notify(&mut self, event: Notification<'_>) {
        if event == Notification::Stop { self.log.stops.fetch_add(1, Ordering::SeqCst); }
    }
}

/// Book keyed by FEN.
#[derive(Clone, Default)]
pub struct MapBook {
    pub entries: HashMap<String, Vec<(String, u32)>>,
    pub opens: Arc<AtomicUsize>,
    pub broken: Vec<PathBuf>,
}

struct MapBookHandle {
    entries: HashMap<String, Vec<(String, u32)>>,
}

impl BookHandle for MapBookHandle {
    fn entries(&self, pos: &Position) -> Vec<BookEntry> {
        self.entries.get(&pos.fen()).map(|list| {
            list.iter().filter_map(|(uci, weight)| pos.parse_uci(uci).ok().map(|mv| BookEntry { mv, weight: *weight })).collect()
        }).unwrap_or_default()
    }
}

impl BookReader for MapBook {
    fn open(&self, path: &Path) -> Result<Box<dyn BookHandle>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.broken.iter().any(|p| p == path) {
            return Err(ArbiterError::Book { path: path.to_path_buf(), reason: "bad magic".into() });
        }
        Ok(Box::new(MapBookHandle { entries: self.entries.clone() }))
    }
}

/// Tables keyed by FEN of the probed position. Unlisted positions miss.
#[derive(Clone, Default)]
pub struct MapTables {
    pub metric: HashMap<String, i32>,
    pub wdl: HashMap<String, i32>,
    pub opens: Arc<AtomicUsize>,
}

impl MapTables {
    /// Records `raw` for the position reached by `uci` from `pos`.
    pub fn set_child(&mut self, pos: &Position, uci: &str, raw: i32) {
        let child = pos.after(pos.parse_uci(uci).unwrap());
        self.metric.insert(child.fen(), raw);
    }

    /// Records `raw` for every child of `pos`.
    pub fn fill_children(&mut self, pos: &Position, raw: i32) {
        for mv in pos.legal_moves() {
            self.metric.insert(pos.after(mv).fen(), raw);
        }
    }

    pub fn set_child_wdl(&mut self, pos: &Position, uci: &str, raw: i32) {
        let child = pos.after(pos.parse_uci(uci).unwrap());
        self.wdl.insert(child.fen(), raw);
    }

    pub fn opens(&self) -> usize { self.opens.load(Ordering::SeqCst) }

    fn lookup(map: &HashMap<String, i32>, pos: &Position) -> Probe {
        map.get(&pos.fen()).map_or(Probe::NotFound, |&v| Probe::Found(v))
    }
}

impl DtzTables for MapTables {
    fn probe_dtz(&self, pos: &Position) -> Probe { Self::lookup(&self.metric, pos) }
    fn probe_wdl(&self, pos: &Position) -> Probe { Self::lookup(&self.wdl, pos) }
}

impl DtmTables for MapTables {
    fn probe_dtm(&self, pos: &Position) -> Probe { Self::lookup(&self.metric, pos) }
}

impl SyzygyOpener for MapTables {
    fn open(&self, _dirs: &[PathBuf]) -> Result<Box<dyn DtzTables>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}

impl GaviotaOpener for MapTables {
    fn open(&self, _dirs: &[PathBuf]) -> Result<Box<dyn DtmTables>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}

/// Canned JSON per URL; every request is recorded. Unknown URLs fail like
/// a refused connection.
#[derive(Clone, Default)]
pub struct MockHttp {
    pub replies: HashMap<String, serde_json::Value>,
    pub requests: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
}

impl MockHttp {
    pub fn reply(mut self, url: &str, json: serde_json::Value) -> Self {
        self.replies.insert(url.to_string(), json);
        self
    }

    pub fn request_count(&self) -> usize { self.requests.lock().unwrap().len() }

    pub fn param(&self, index: usize, name: &str) -> Option<String> {
        let requests = self.requests.lock().unwrap();
        requests.get(index)?.1.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }
}

impl HttpClient for MockHttp {
    fn get_json(&self, url: &str, params: &[(&str, String)], _timeout: Duration) -> Result<serde_json::Value> {
        let params = params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        self.requests.lock().unwrap().push((url.to_string(), params));
        self.replies.get(url).cloned().ok_or_else(|| ArbiterError::Http { url: url.to_string(), reason: "connection refused".into() })
    }
}
