use cozy_chess::Color;
use serde::Deserialize;
use crate::board::Position;

/// Remaining time and increments in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Clock {
    pub wtime: u64,
    pub btime: u64,
    pub winc: u64,
    pub binc: u64,
}

impl Clock {
    pub fn time_left(&self, color: Color) -> u64 {
        match color {
            Color::White => self.wtime,
            Color::Black => self.btime,
        }
    }

    pub fn time_left_mut(&mut self, color: Color) -> &mut u64 {
        match color {
            Color::White => &mut self.wtime,
            Color::Black => &mut self.btime,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Player {
    pub name: Option<String>,
    pub rating: Option<u32>,
    pub title: Option<String>,
}

/// Per-game mutable record, updated by the caller from the game stream and
/// by the search controller when it charges elapsed time to the clock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub id: String,
    pub clock: Clock,
    pub white_draw_offer: bool,
    pub black_draw_offer: bool,
    pub me: Player,
    pub opponent: Player,
    pub my_color: Color,
    pub is_correspondence: bool,
}

impl GameState {
    pub fn new(id: impl Into<String>, my_color: Color, clock: Clock) -> Self {
        Self {
            id: id.into(),
            clock,
            white_draw_offer: false,
            black_draw_offer: false,
            me: Player::default(),
            opponent: Player::default(),
            my_color,
            is_correspondence: false,
        }
    }

    pub fn opponent_color(&self) -> Color { !self.my_color }

    /// Whether the opponent has a draw offer standing.
    pub fn draw_offered_by_opponent(&self) -> bool {
        match self.opponent_color() {
            Color::White => self.white_draw_offer,
            Color::Black => self.black_draw_offer,
        }
    }
}

/// How a finished game ended, as reported by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    Mate,
    Timeout,
    Resign,
    Abort,
    Draw,
    Other(String),
}

/// Human-readable end-of-game text, sent to engines with the result.
pub fn translate_termination(termination: Option<&Termination>, winner: Option<Color>, pos: &Position) -> String {
    let color_name = |c: Color| if c == Color::White { "White" } else { "Black" };
    match termination {
        Some(Termination::Mate) => winner.map(|w| format!("{} mates", color_name(w))).unwrap_or_default(),
        Some(Termination::Timeout) => "Time forfeiture".to_string(),
        Some(Termination::Resign) => winner.map(|w| format!("{} resigns", color_name(!w))).unwrap_or_default(),
        Some(Termination::Abort) => "Game aborted".to_string(),
        Some(Termination::Draw) => {
            if pos.is_fifty_moves() { "50-move rule".to_string() }
            else if pos.is_repetition() { "Threefold repetition".to_string() }
            else { "Draw by agreement".to_string() }
        }
        Some(Termination::Other(s)) => s.clone(),
        None => String::new(),
    }
}
