use std::time::{Duration, Instant};
use cozy_chess::{Board, Color, Move};
use crate::search::eval::{material_eval_cp, piece_value, to_score, DRAW_SCORE, MATE_VALUE};
use crate::game::Clock;
use crate::outcome::{MoveInfo, Score};

#[derive(Default, Debug, Clone, Copy)]
pub struct SearchParams {
    pub depth: u32,
    pub max_nodes: Option<u64>,
    pub movetime: Option<Duration>,
}

#[derive(Default, Debug, Clone)]
pub struct SearchResult {
    pub bestmove: Option<Move>,
    pub score: Option<Score>,
    pub depth: u32,
    pub nodes: u64,
    pub elapsed: Duration,
}

impl SearchResult {
    pub fn info(&self) -> MoveInfo {
        let secs = self.elapsed.as_secs_f64();
        MoveInfo {
            score: self.score,
            depth: Some(self.depth),
            nodes: Some(self.nodes),
            nps: if secs > 0.0 { Some((self.nodes as f64 / secs) as u64) } else { None },
            pv: self.bestmove.into_iter().collect(),
            ..MoveInfo::default()
        }
    }
}

/// Material-only negamax with a capture quiescence, iterative deepening and
/// node/time limits. Backs the `MaterialSearch` homemade strategy.
pub struct Searcher {
    nodes: u64,
    node_limit: u64,
    deadline: Option<Instant>,
    aborted: bool,
}

impl Default for Searcher {
    fn default() -> Self {
        Self { nodes: 0, node_limit: u64::MAX, deadline: None, aborted: false }
    }
}

impl Searcher {
    fn out_of_budget(&mut self) -> bool {
        if self.aborted { return true; }
        if self.nodes >= self.node_limit { self.aborted = true; }
        if let Some(dl) = self.deadline { if Instant::now() >= dl { self.aborted = true; } }
        self.aborted
    }

    fn is_capture(board: &Board, m: Move) -> bool {
        board.colors(!board.side_to_move()).has(m.to)
    }

    fn qsearch(&mut self, board: &Board, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        // Stand pat
        let stand = material_eval_cp(board);
        if stand >= beta { return beta; }
        if stand > alpha { alpha = stand; }

        let mut caps: Vec<Move> = Vec::new();
        board.generate_moves(|ml| {
            for m in ml { if Self::is_capture(board, m) { caps.push(m); } }
            false
        });
        // Most valuable victim first
        caps.sort_by_key(|&m| -board.piece_on(m.to).map(piece_value).unwrap_or(0));
        for m in caps {
            if self.out_of_budget() { break; }
            let mut child = board.clone();
            child.play(m);
            let score = -self.qsearch(&child, -beta, -alpha);
            if score >= beta { return beta; }
            if score > alpha { alpha = score; }
        }
        alpha
    }

    fn alphabeta(&mut self, board: &Board, depth: u32, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        if self.out_of_budget() { return material_eval_cp(board); }
        self.nodes += 1;
        let mut moves: Vec<Move> = Vec::with_capacity(64);
        board.generate_moves(|ml| { moves.extend(ml); false });
        if moves.is_empty() { return Self::eval_terminal(board, ply); }
        if depth == 0 { return self.qsearch(board, alpha, beta); }
        // Captures first
        moves.sort_by_key(|&m| if Self::is_capture(board, m) { 0 } else { 1 });

        let mut best = -MATE_VALUE;
        for m in moves {
            let mut child = board.clone();
            child.play(m);
            let score = -self.alphabeta(&child, depth - 1, -beta, -alpha, ply + 1);
            if score > best { best = score; }
            if best > alpha { alpha = best; }
            if alpha >= beta { break; }
        }
        best
    }

    fn eval_terminal(board: &Board, ply: i32) -> i32 {
        if !(board.checkers()).is_empty() { return -MATE_VALUE + ply; }
        DRAW_SCORE
    }

    fn search_root(&mut self, board: &Board, roots: &[Move], depth: u32) -> Option<(Move, i32)> {
        let mut alpha = -MATE_VALUE;
        let mut best: Option<(Move, i32)> = None;
        for &m in roots {
            let mut child = board.clone();
            child.play(m);
            let score = -self.alphabeta(&child, depth.saturating_sub(1), -MATE_VALUE, -alpha, 1);
            if self.aborted && best.is_some() { break; }
            if best.map_or(true, |(_, bs)| score > bs) { best = Some((m, score)); }
            if score > alpha { alpha = score; }
        }
        best
    }

    /// Searches `roots` (all legal moves when empty). The best move of the
    /// last completed iteration is kept when a limit interrupts the next one.
    pub fn search(&mut self, board: &Board, roots: &[Move], params: SearchParams) -> SearchResult {
        let start = Instant::now();
        self.nodes = 0;
        self.aborted = false;
        self.node_limit = params.max_nodes.unwrap_or(u64::MAX);
        self.deadline = params.movetime.map(|d| start + d);

        let mut moves: Vec<Move> = roots.to_vec();
        if moves.is_empty() {
            board.generate_moves(|ml| { moves.extend(ml); false });
        }
        let mut result = SearchResult::default();
        if moves.is_empty() {
            result.score = Some(to_score(Self::eval_terminal(board, 0)));
            return result;
        }
        result.bestmove = Some(moves[0]);
        for d in 1..=params.depth.max(1) {
            let found = self.search_root(board, &moves, d);
            if self.aborted && d > 1 { break; }
            if let Some((m, s)) = found {
                result.bestmove = Some(m);
                result.score = Some(to_score(s));
                result.depth = d;
                // Best move first for the next iteration
                if let Some(idx) = moves.iter().position(|&x| x == m) { moves.swap(0, idx); }
            }
            if self.aborted { break; }
        }
        result.nodes = self.nodes;
        result.elapsed = start.elapsed();
        result
    }
}

/// Remaining-clock share for engines that manage their own time.
pub fn clock_budget(time_left_ms: u64, inc_ms: u64) -> Duration {
    Duration::from_millis(time_left_ms / 30 + inc_ms * 3 / 4)
}

pub fn own_clock(color: Color, clock: &Clock) -> (u64, u64) {
    match color {
        Color::White => (clock.wtime, clock.winc),
        Color::Black => (clock.btime, clock.binc),
    }
}
