use std::time::Duration;
use cozy_chess::Color;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use crate::board::Position;
use crate::config::{ChessdbConfig, ChessdbQuality, CloudConfig, CloudQuality};
use crate::error::Result;
use crate::http::HttpClient;
use crate::outcome::{MoveInfo, PlayResult, Score, MATE_SCORE};
use super::{legal_prefix, CHESSDB_URL, LICHESS_CLOUD_URL};

#[derive(Debug, Deserialize)]
struct ChessdbBookReply {
    status: String,
    score: Option<i32>,
    depth: Option<u32>,
    #[serde(default)]
    pv: Vec<String>,
    #[serde(rename = "move")]
    mv: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudEval {
    depth: u32,
    knodes: u64,
    pvs: Vec<CloudPv>,
}

/// Scores are from white's point of view.
#[derive(Debug, Deserialize)]
struct CloudPv {
    moves: String,
    cp: Option<i32>,
    mate: Option<i32>,
}

impl CloudPv {
    fn white_score(&self) -> Option<Score> {
        match (self.cp, self.mate) {
            (Some(cp), _) => Some(Score::Cp(cp)),
            (None, Some(m)) => Some(Score::Mate(m)),
            (None, None) => None,
        }
    }
}

fn chessdb_params(action: &str, pos: &Position) -> [(&'static str, String); 3] {
    [("action", action.to_string()), ("board", pos.fen()), ("json", "1".to_string())]
}

pub fn chessdb(http: &dyn HttpClient, pos: &Position, cfg: &ChessdbConfig, timeout: Duration) -> Result<Option<PlayResult>> {
    let action = match cfg.move_quality {
        ChessdbQuality::Best => "querypv",
        ChessdbQuality::Good => "querybest",
        ChessdbQuality::All => "query",
    };
    let reply: ChessdbBookReply = serde_json::from_value(http.get_json(CHESSDB_URL, &chessdb_params(action, pos), timeout)?)?;
    if reply.status != "ok" { return Ok(None); }

    if cfg.move_quality != ChessdbQuality::Best {
        let Some(uci) = reply.mv else { return Ok(None) };
        return Ok(Some(PlayResult::new(pos.parse_uci(&uci)?)));
    }
    let (Some(depth), Some(score)) = (reply.depth, reply.score) else { return Ok(None) };
    let Some(first) = reply.pv.first() else { return Ok(None) };
    if depth < cfg.min_depth { return Ok(None); }
    let mv = pos.parse_uci(first)?;
    let info = MoveInfo { score: Some(Score::Cp(score)), depth: Some(depth), pv: legal_prefix(pos, &reply.pv), ..MoveInfo::default() };
    Ok(Some(PlayResult::with_info(mv, info)))
}

/// Asks chessdb.cn to analyse this position later.
pub fn chessdb_queue(http: &dyn HttpClient, pos: &Position, timeout: Duration) -> Result<()> {
    http.get_json(CHESSDB_URL, &chessdb_params("queue", pos), timeout).map(|_| ())
}

pub fn lichess_cloud<R: Rng>(http: &dyn HttpClient, pos: &Position, cfg: &CloudConfig, timeout: Duration, rng: &mut R) -> Result<Option<PlayResult>> {
    let multipv = if cfg.move_quality == CloudQuality::Best { 1 } else { 5 };
    let params = [("fen", pos.fen()), ("multiPv", multipv.to_string()), ("variant", pos.variant().key().to_string())];
    let data = http.get_json(LICHESS_CLOUD_URL, &params, timeout)?;
    if data.get("error").is_some() { return Ok(None); }
    let eval: CloudEval = serde_json::from_value(data)?;
    if eval.depth < cfg.min_depth || eval.knodes < cfg.min_knodes { return Ok(None); }

    let Some(top) = eval.pvs.first() else { return Ok(None) };
    let chosen = match cfg.move_quality {
        CloudQuality::Best => top,
        CloudQuality::Good => {
            let Some(best) = top.white_score() else { return Ok(None) };
            let best = best.cp(MATE_SCORE);
            let max_diff = cfg.max_score_difference;
            let close: Vec<&CloudPv> = eval.pvs.iter().filter(|pv| {
                let Some(s) = pv.white_score() else { return false };
                let s = s.cp(MATE_SCORE);
                match pos.side_to_move() {
                    Color::White => s >= best - max_diff,
                    Color::Black => s <= best + max_diff,
                }
            }).collect();
            close.choose(rng).copied().unwrap_or(top)
        }
    };

    let line: Vec<&str> = chosen.moves.split_whitespace().collect();
    let Some(first) = line.first() else { return Ok(None) };
    let mv = pos.parse_uci(first)?;
    let score = chosen.white_score().map(|s| if pos.side_to_move() == Color::White { s } else { s.negate() });
    let info = MoveInfo {
        score,
        depth: Some(eval.depth),
        nodes: Some(eval.knodes * 1000),
        pv: legal_prefix(pos, &line),
        ..MoveInfo::default()
    };
    Ok(Some(PlayResult::with_info(mv, info)))
}
