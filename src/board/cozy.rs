use cozy_chess::{Board as CozyBoard, Color, File, GameStatus, Move, Piece, Square};
use serde::Deserialize;
use crate::error::{ArbiterError, Result};

/// Rule set the game is played under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Standard,
    Chess960,
}

impl Variant {
    /// Key used for per-variant configuration (books) and remote endpoints.
    pub fn key(self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Chess960 => "chess960",
        }
    }
}

/// Board state plus the moves played in this game. Immutable from the
/// point of view of the move sources: they derive children with `after`.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    variant: Variant,
    moves: Vec<Move>,
    hashes: Vec<u64>,
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_board(CozyBoard::default(), Variant::Standard)
    }

    pub fn from_board(board: CozyBoard, variant: Variant) -> Self {
        let hashes = vec![board.hash()];
        Self { board, variant, moves: Vec::new(), hashes }
    }

    pub fn from_fen(fen: &str, variant: Variant) -> Result<Self> {
        CozyBoard::from_fen(fen, variant == Variant::Chess960)
            .map(|b| Self::from_board(b, variant))
            .map_err(|e| ArbiterError::Fen(format!("{e:?}")))
    }

    /// Initial position (FEN or `startpos`) followed by UCI moves, the way a
    /// game stream reports it.
    pub fn from_fen_and_moves(fen: Option<&str>, variant: Variant, moves: &[String]) -> Result<Self> {
        let mut pos = match fen {
            Some(f) if f != "startpos" => Self::from_fen(f, variant)?,
            _ => Self::from_board(CozyBoard::default(), variant),
        };
        for m in moves { pos.push_uci(m)?; }
        Ok(pos)
    }

    pub fn board(&self) -> &CozyBoard { &self.board }
    pub fn variant(&self) -> Variant { self.variant }
    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }
    pub fn piece_count(&self) -> u32 { self.board.occupied().len() }
    pub fn halfmove_clock(&self) -> u32 { self.board.halfmove_clock() as u32 }
    pub fn fullmove_number(&self) -> u32 { self.board.fullmove_number() as u32 }
    pub fn fen(&self) -> String { format!("{}", self.board) }

    /// Number of half-moves played since the game's initial position.
    pub fn ply(&self) -> usize { self.moves.len() }
    pub fn moves(&self) -> &[Move] { &self.moves }

    pub fn has_castling_rights(&self) -> bool {
        [Color::White, Color::Black].iter().any(|&c| {
            let rights = self.board.castle_rights(c);
            rights.short.is_some() || rights.long.is_some()
        })
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.board.generate_moves(|ml| { moves.extend(ml); false });
        moves
    }

    pub fn is_checkmate(&self) -> bool {
        self.board.status() == GameStatus::Won
    }

    pub fn is_fifty_moves(&self) -> bool { self.halfmove_clock() >= 100 }

    pub fn is_repetition(&self) -> bool {
        let current = self.board.hash();
        self.hashes.iter().filter(|&&h| h == current).count() >= 3
    }

    /// Copy of this position with `mv` played. `mv` must be legal.
    pub fn after(&self, mv: Move) -> Position {
        let mut child = self.clone();
        child.board.play(mv);
        child.moves.push(mv);
        child.hashes.push(child.board.hash());
        child
    }

    pub fn push_uci(&mut self, uci: &str) -> Result<()> {
        let mv = self.parse_uci(uci)?;
        self.board.play(mv);
        self.moves.push(mv);
        self.hashes.push(self.board.hash());
        Ok(())
    }

    /// Accepts both `e1g1` and king-takes-rook `e1h1` castling notation.
    pub fn parse_uci(&self, uci: &str) -> Result<Move> {
        self.legal_moves()
            .into_iter()
            .find(|&m| self.uci(m) == uci || format!("{}", m) == uci)
            .ok_or_else(|| ArbiterError::IllegalMove { mv: uci.to_string(), fen: self.fen() })
    }

    /// UCI text for `mv`; standard chess uses king-destination castling.
    pub fn uci(&self, mv: Move) -> String {
        if self.variant == Variant::Standard && self.is_castle(mv) {
            let file = if mv.to.file() as usize > mv.from.file() as usize { File::G } else { File::C };
            let to = Square::new(file, mv.from.rank());
            return format!("{}{}", mv.from, to);
        }
        format!("{}", mv)
    }

    fn is_castle(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.colors(self.board.side_to_move()).has(mv.to)
    }

    /// Move-numbered rendering of a line starting here, e.g. `12... e7e5 13. g1f3`.
    /// Stops at the first move that is not legal in the running position.
    pub fn variation_text(&self, line: &[Move]) -> String {
        let mut out: Vec<String> = Vec::with_capacity(line.len() * 2);
        let mut pos = self.clone();
        for (i, &mv) in line.iter().enumerate() {
            if !pos.board.is_legal(mv) { break; }
            let number = pos.fullmove_number();
            if pos.side_to_move() == Color::White {
                out.push(format!("{}.", number));
            } else if i == 0 {
                out.push(format!("{}...", number));
            }
            out.push(pos.uci(mv));
            pos = pos.after(mv);
        }
        out.join(" ")
    }
}
