use std::time::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use crate::board::{Position, Variant};
use crate::config::TablebaseQuality;
use crate::error::Result;
use crate::http::HttpClient;
use crate::tablebase::{TablebaseAnswer, Verdict};
use crate::wdl::{remote_score_to_dtz, remote_score_to_wdl, Wdl};
use super::{CHESSDB_URL, LICHESS_TABLEBASE_URL};

#[derive(Debug, Deserialize)]
struct LichessReply {
    #[serde(default)]
    moves: Vec<LichessMove>,
}

/// One move of a lichess tablebase reply; the category and distance are
/// for the side to move after it.
#[derive(Debug, Deserialize)]
struct LichessMove {
    uci: String,
    category: String,
    dtz: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ChessdbReply {
    status: String,
    score: Option<i32>,
    #[serde(default)]
    pv: Vec<String>,
    #[serde(default)]
    moves: Vec<ChessdbMove>,
}

#[derive(Debug, Deserialize)]
struct ChessdbMove {
    uci: String,
    score: i32,
}

/// Moves come back best first. Lichess only covers up to 7 pieces in
/// standard chess and 6 elsewhere.
pub fn lichess<R: Rng>(http: &dyn HttpClient, pos: &Position, quality: TablebaseQuality, timeout: Duration, rng: &mut R) -> Result<Option<TablebaseAnswer>> {
    let max_pieces = if pos.variant() == Variant::Standard { 7 } else { 6 };
    if pos.piece_count() > max_pieces { return Ok(None); }

    let url = format!("{}/standard", LICHESS_TABLEBASE_URL);
    let reply: LichessReply = serde_json::from_value(http.get_json(&url, &[("fen", pos.fen())], timeout)?)?;
    let Some(first) = reply.moves.first() else { return Ok(None) };
    let Some(best) = Wdl::from_category(&first.category) else { return Ok(None) };
    let good: Vec<&LichessMove> = reply.moves.iter().filter(|m| Wdl::from_category(&m.category) == Some(best)).collect();
    let wdl = best.flip();

    let chosen = match quality {
        TablebaseQuality::Best => first,
        TablebaseQuality::Suggest if good.len() > 1 => {
            let moves = good.iter().map(|m| pos.parse_uci(&m.uci)).collect::<Result<Vec<_>>>()?;
            return Ok(Some(TablebaseAnswer { verdict: Verdict::Suggest(moves), wdl, distance: None }));
        }
        TablebaseQuality::Suggest => first,
        TablebaseQuality::Good => good.choose(rng).copied().unwrap_or(first),
    };
    let mv = pos.parse_uci(&chosen.uci)?;
    Ok(Some(TablebaseAnswer { verdict: Verdict::Play(mv), wdl, distance: chosen.dtz.map(|d| -d) }))
}

/// chessdb.cn scores are converted with the service's own boundaries.
pub fn chessdb<R: Rng>(http: &dyn HttpClient, pos: &Position, quality: TablebaseQuality, timeout: Duration, rng: &mut R) -> Result<Option<TablebaseAnswer>> {
    let action = if quality == TablebaseQuality::Best { "querypv" } else { "queryall" };
    let params = [("action", action.to_string()), ("board", pos.fen()), ("json", "1".to_string())];
    let reply: ChessdbReply = serde_json::from_value(http.get_json(CHESSDB_URL, &params, timeout)?)?;
    if reply.status != "ok" { return Ok(None); }

    if quality == TablebaseQuality::Best {
        let (Some(score), Some(first)) = (reply.score, reply.pv.first()) else { return Ok(None) };
        let mv = pos.parse_uci(first)?;
        return Ok(Some(TablebaseAnswer {
            verdict: Verdict::Play(mv),
            wdl: remote_score_to_wdl(score),
            distance: Some(remote_score_to_dtz(score)),
        }));
    }

    let Some(first) = reply.moves.first() else { return Ok(None) };
    let best = remote_score_to_wdl(first.score);
    let good: Vec<&ChessdbMove> = reply.moves.iter().filter(|m| remote_score_to_wdl(m.score) == best).collect();
    if quality == TablebaseQuality::Suggest && good.len() > 1 {
        let moves = good.iter().map(|m| pos.parse_uci(&m.uci)).collect::<Result<Vec<_>>>()?;
        return Ok(Some(TablebaseAnswer { verdict: Verdict::Suggest(moves), wdl: best, distance: None }));
    }
    let chosen = good.choose(rng).copied().unwrap_or(first);
    let mv = pos.parse_uci(&chosen.uci)?;
    Ok(Some(TablebaseAnswer {
        verdict: Verdict::Play(mv),
        wdl: remote_score_to_wdl(chosen.score),
        distance: Some(remote_score_to_dtz(chosen.score)),
    }))
}
