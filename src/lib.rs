//! Runs matches between UCI chess engines and adjudicates the result.
//!
//! Two collaborating drivers: [`engine::EngineDriver`] owns one engine
//! process and speaks its UCI protocol; [`game::GameDriver`] steps a game
//! forward move by move across two engine drivers, applying termination and
//! adjudication rules, and renders the finished game as PGN. The chess rules
//! themselves -- legality, FEN/SAN/LAN, repetition keys -- are treated as an
//! external collaborator's problem; see [`chess_iface`].

pub mod chess_iface;
pub mod engine;
pub mod error;
pub mod game;
pub mod options;
pub mod result;

pub use chess_iface::{Color, Move, Ply, Position};
pub use engine::{BestMoveOutcome, EngineDriver, EngineState, LogSink};
pub use error::{DriverError, Res};
pub use game::GameDriver;
pub use options::{EngineOptions, GameOptions, Sample, Score, SCORE_MATE_NEG, SCORE_MATE_POS};
pub use result::{decode_result, ResultTag};
