// Move arbitration for a lichess bot: book, tablebases, online sources, engine
pub mod arbiter;
pub mod board;
pub mod book;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod http;
pub mod outcome;
pub mod policy;
pub mod remote;
pub mod search;
pub mod stats;
pub mod tablebase;
pub mod wdl;

pub use arbiter::{Decision, MoveArbitrator, MoveSource};
pub use error::{ArbiterError, Result};
