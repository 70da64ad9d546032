//! Human-readable statistics for the last move, for logs and chat.

use cozy_chess::Move;
use crate::board::Position;
use crate::outcome::{MoveInfo, Score};

/// lichess chat message limit.
pub const MAX_CHAT_MESSAGE_LEN: usize = 140;
/// The length of ", PV: ".
const PV_SEPARATOR_LEN: usize = 6;

pub fn readable_score(score: Score) -> String {
    match score {
        Score::Mate(n) => format!("#{}", n),
        Score::Cp(cp) => trim_decimals(format!("{:.2}", cp as f64 / 100.0)),
    }
}

// Python-style float text: "1.0", "0.25", "-0.3"
fn trim_decimals(mut s: String) -> String {
    while s.ends_with('0') && !s.ends_with(".0") { s.pop(); }
    s
}

pub fn readable_wdl((w, d, l): (u32, u32, u32)) -> String {
    let total = (w + d + l).max(1) as f64;
    let expectation = (w as f64 + d as f64 / 2.0) / total;
    format!("{:.1}%", expectation * 100.0)
}

pub fn readable_number(n: u64) -> String {
    let x = n as f64;
    if x >= 1e9 { format!("{:.1}B", x / 1e9) }
    else if x >= 1e6 { format!("{:.1}M", x / 1e6) }
    else if x >= 1e3 { format!("{:.1}K", x / 1e3) }
    else { n.to_string() }
}

/// What was recorded about one of our moves. Move lines are rendered
/// against the position the move was chosen in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comment {
    pub info: MoveInfo,
    pub pv_text: Option<String>,
    pub refutation_text: Option<String>,
    pub currmove_text: Option<String>,
}

impl Comment {
    pub fn new(info: MoveInfo, pos: &Position) -> Self {
        let line = |moves: &[Move]| if moves.is_empty() { None } else { Some(pos.variation_text(moves)) };
        let pv_text = line(&info.pv);
        let refutation_text = line(&info.refutation);
        let currmove_text = info.currmove.map(|mv| pos.uci(mv));
        Self { info, pv_text, refutation_text, currmove_text }
    }
}

/// One `Key: value` line per available statistic, in a fixed order:
/// evaluation, winrate, depth, nodes, speed, tablebase hits, principal
/// variation.
pub fn stat_lines(comment: &Comment, for_chat: bool) -> Vec<String> {
    let info = &comment.info;
    let mut lines: Vec<String> = Vec::new();
    if let Some(score) = info.score { lines.push(format!("Evaluation: {}", readable_score(score))); }
    if let Some(wdl) = info.wdl { lines.push(format!("Winrate: {}", readable_wdl(wdl))); }
    if let Some(depth) = info.depth { lines.push(format!("Depth: {}", depth)); }
    if let Some(nodes) = info.nodes { lines.push(format!("Nodes: {}", readable_number(nodes))); }
    if let Some(nps) = info.nps { lines.push(format!("Speed: {}nps", readable_number(nps))); }
    if let Some(tbhits) = info.tbhits { lines.push(format!("Tbhits: {}", readable_number(tbhits))); }
    let Some(pv) = comment.pv_text.as_deref() else { return lines };

    let pv = if for_chat {
        let budget = lines.join(", ").len() + PV_SEPARATOR_LEN;
        truncate_pv(pv, MAX_CHAT_MESSAGE_LEN.saturating_sub(budget))
    } else {
        pv.to_string()
    };
    if !pv.is_empty() { lines.push(format!("Pv: {}", pv)); }
    lines
}

/// Drops moves from the end until the line fits, then a dangling move number.
pub fn truncate_pv(pv: &str, max_len: usize) -> String {
    let mut tokens: Vec<&str> = pv.split_whitespace().collect();
    while !tokens.is_empty() && tokens.join(" ").len() > max_len { tokens.pop(); }
    if tokens.last().map_or(false, |t| t.ends_with('.')) { tokens.pop(); }
    tokens.join(" ")
}
