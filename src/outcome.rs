use cozy_chess::Move;

/// Magnitude a mate score is capped to when compared with centipawns.
pub const MATE_SCORE: i32 = 40_000;

/// Evaluation relative to the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Score {
    Cp(i32),
    /// Mate in `n` moves; negative when the mover is getting mated.
    Mate(i32),
}

impl Score {
    pub fn cp(self, mate_score: i32) -> i32 {
        match self {
            Score::Cp(cp) => cp,
            Score::Mate(n) if n > 0 => mate_score - n,
            Score::Mate(n) => -mate_score - n,
        }
    }

    pub fn negate(self) -> Score {
        match self {
            Score::Cp(cp) => Score::Cp(-cp),
            Score::Mate(n) => Score::Mate(-n),
        }
    }
}

/// Search metadata attached to a move, all optional.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoveInfo {
    pub score: Option<Score>,
    /// Win/draw/loss expectation in permille.
    pub wdl: Option<(u32, u32, u32)>,
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub tbhits: Option<u64>,
    pub hashfull: Option<u32>,
    pub pv: Vec<Move>,
    pub currmove: Option<Move>,
    pub refutation: Vec<Move>,
}

impl MoveInfo {
    pub fn with_score(score: Score) -> Self {
        Self { score: Some(score), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool { *self == MoveInfo::default() }
}

/// A single chosen move with its annotations.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayResult {
    pub mv: Move,
    pub ponder: Option<Move>,
    pub info: MoveInfo,
    pub draw_offered: bool,
    pub resigned: bool,
}

impl PlayResult {
    pub fn new(mv: Move) -> Self {
        Self { mv, ponder: None, info: MoveInfo::default(), draw_offered: false, resigned: false }
    }

    pub fn with_info(mv: Move, info: MoveInfo) -> Self {
        Self { info, ..Self::new(mv) }
    }
}

/// What a move source (or the whole cascade) produced for one ply.
#[derive(Clone, Debug, PartialEq)]
pub enum MoveCandidate {
    Single(PlayResult),
    /// Equally good moves the source could not rank; never empty.
    Suggestions(Vec<Move>),
    NoMove,
}

impl MoveCandidate {
    pub fn suggest(moves: Vec<Move>) -> Self {
        assert!(!moves.is_empty(), "suggestion list must not be empty");
        MoveCandidate::Suggestions(moves)
    }

    pub fn is_single(&self) -> bool { matches!(self, MoveCandidate::Single(_)) }
    pub fn is_none(&self) -> bool { matches!(self, MoveCandidate::NoMove) }

    pub fn play_result(&self) -> Option<&PlayResult> {
        match self {
            MoveCandidate::Single(r) => Some(r),
            _ => None,
        }
    }

    /// Root-move restriction to hand to the engine when falling through.
    pub fn root_moves(&self) -> Option<&[Move]> {
        match self {
            MoveCandidate::Suggestions(moves) => Some(moves),
            _ => None,
        }
    }
}
