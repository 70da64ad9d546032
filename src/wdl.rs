//! Conversions from tablebase and remote-service metrics onto one 5-valued
//! win/draw/loss scale, so moves from different sources can be compared.
//!
//! Every conversion is a piecewise function over inclusive upper bounds. The
//! bounds encode the 50-move rule: a "win" whose distance exceeds the
//! counter window is only a cursed win.

use std::fmt;

/// Canonical outcome from the mover's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Wdl {
    Loss = -2,
    BlessedLoss = -1,
    Draw = 0,
    CursedWin = 1,
    Win = 2,
}

impl Wdl {
    pub fn from_i32(v: i32) -> Option<Wdl> {
        match v {
            -2 => Some(Wdl::Loss),
            -1 => Some(Wdl::BlessedLoss),
            0 => Some(Wdl::Draw),
            1 => Some(Wdl::CursedWin),
            2 => Some(Wdl::Win),
            _ => None,
        }
    }

    pub fn value(self) -> i32 { self as i32 }

    /// The same outcome seen from the other side.
    pub fn flip(self) -> Wdl {
        match self {
            Wdl::Loss => Wdl::Win,
            Wdl::BlessedLoss => Wdl::CursedWin,
            Wdl::Draw => Wdl::Draw,
            Wdl::CursedWin => Wdl::BlessedLoss,
            Wdl::Win => Wdl::Loss,
        }
    }

    /// Centipawn stand-in used to annotate tablebase moves.
    pub fn to_cp(self) -> i32 {
        match self {
            Wdl::Win => 9900,
            Wdl::CursedWin => 500,
            Wdl::Draw => 0,
            Wdl::BlessedLoss => -500,
            Wdl::Loss => -9900,
        }
    }

    /// lichess tablebase category names. `unknown` has no canonical value.
    pub fn from_category(name: &str) -> Option<Wdl> {
        match name {
            "loss" => Some(Wdl::Loss),
            "maybe-loss" | "blessed-loss" => Some(Wdl::BlessedLoss),
            "draw" => Some(Wdl::Draw),
            "cursed-win" | "maybe-win" => Some(Wdl::CursedWin),
            "win" => Some(Wdl::Win),
            _ => None,
        }
    }
}

impl fmt::Display for Wdl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Returns the value of the first `(bound, value)` pair with `x <= bound`,
/// or `last` when `x` is above every bound. Bounds must be ascending.
pub fn piecewise<T: Copy>(ranges: &[(i32, T)], last: T, x: i32) -> T {
    for &(bound, value) in ranges {
        if x <= bound { return value; }
    }
    last
}

pub fn dtz_to_wdl(dtz: i32) -> Wdl {
    piecewise(&[(-100, Wdl::BlessedLoss), (-1, Wdl::Loss), (0, Wdl::Draw), (99, Wdl::Win)], Wdl::CursedWin, dtz)
}

/// Sign-only class of a distance-to-mate, before any 50-move reasoning.
pub fn dtm_to_gaviota_wdl(dtm: i32) -> Wdl {
    piecewise(&[(-1, Wdl::BlessedLoss), (0, Wdl::Draw)], Wdl::CursedWin, dtm)
}

/// `wdl1_threshold` is the mate distance from which a win may no longer
/// survive the 50-move counter. The loss side keeps 100 so we never resign
/// a position that could be a 50-move draw.
pub fn dtm_to_wdl(dtm: i32, wdl1_threshold: i32) -> Wdl {
    piecewise(
        &[(-100, Wdl::BlessedLoss), (-1, Wdl::Loss), (0, Wdl::Draw), (wdl1_threshold - 1, Wdl::Win)],
        Wdl::CursedWin,
        dtm,
    )
}

/// chessdb.cn tablebase scores. -20001 maps to a win: the service reports
/// from the side that has just moved.
pub fn remote_score_to_wdl(score: i32) -> Wdl {
    piecewise(&[(-20001, Wdl::Win), (-1, Wdl::BlessedLoss), (0, Wdl::Draw), (20000, Wdl::CursedWin)], Wdl::Win, score)
}

/// Distance estimate recovered from a chessdb.cn tablebase score.
/// The score comes off the network, so the subtraction saturates.
pub fn remote_score_to_dtz(score: i32) -> i32 {
    let offset: i32 = piecewise(&[(-20001, -30000), (-1, -20000), (0, 0), (20000, 20000)], 30000, score);
    offset.saturating_sub(score)
}
