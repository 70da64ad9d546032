use cozy_chess::{Board, Color, Piece};
use crate::outcome::Score;

const PAWN: i32 = 100;
const KNIGHT: i32 = 320;
const BISHOP: i32 = 330;
const ROOK: i32 = 500;
const QUEEN: i32 = 900;

fn count_piece(board: &Board, color: Color, piece: Piece) -> i32 {
    let bb = board.colors(color) & board.pieces(piece);
    bb.len() as i32
}

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => 0,
    }
}

// Positive means White has more material.
pub fn material_eval_cp_side_agnostic(board: &Board) -> i32 {
    Piece::ALL.iter().map(|&p| {
        (count_piece(board, Color::White, p) - count_piece(board, Color::Black, p)) * piece_value(p)
    }).sum()
}

// Material from side-to-move perspective (negamax-friendly)
pub fn material_eval_cp(board: &Board) -> i32 {
    let base = material_eval_cp_side_agnostic(board);
    if board.side_to_move() == Color::White { base } else { -base }
}

// Mate scoring helpers
pub const MATE_VALUE: i32 = 30_000;
pub const DRAW_SCORE: i32 = 0;
const MATE_BAND: i32 = 1_000;

/// Converts a negamax score (mate encoded as `MATE_VALUE - ply`) to a
/// relative `Score` with mate distance in full moves.
pub fn to_score(value: i32) -> Score {
    if value.abs() >= MATE_VALUE - MATE_BAND {
        let plies = MATE_VALUE - value.abs();
        let moves = (plies + 1) / 2;
        if value > 0 { Score::Mate(moves) } else { Score::Mate(-moves) }
    } else {
        Score::Cp(value)
    }
}
