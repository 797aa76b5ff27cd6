//! Configuration surface: per-game options, per-engine UCI options, and the
//! training-data samples a match can optionally collect.

use crate::chess_iface::Position;

/// A UCI centipawn score. Forced mates are collapsed to the sentinels below
/// regardless of distance, which keeps resign logic from firing on a mate
/// for the side to move while still never spuriously resigning the side
/// being mated (see spec Open Question in SPEC_FULL.md §9).
pub type Score = i32;

/// Far enough outside any `drawScore`/`resignScore` a user could plausibly
/// configure that it can never be mistaken for a real evaluation.
pub const SCORE_MATE_POS: Score = 1_000_000;
pub const SCORE_MATE_NEG: Score = -1_000_000;

/// Per-side search limits and clock, plus adjudication thresholds.
#[derive(Debug, Clone, Copy)]
pub struct GameOptions {
    pub chess960: bool,

    /// Non-zero entries are emitted as `go` arguments.
    pub nodes: [u64; 2],
    pub depth: [u32; 2],
    pub movetime: [u32; 2],

    /// Starting time budget and increment, in milliseconds.
    pub time: [i64; 2],
    pub increment: [i64; 2],

    /// Declare a draw when both sides' scores stay within `draw_score` for
    /// `2 * draw_count` consecutive plies. `draw_count == 0` disables this.
    pub draw_score: Score,
    pub draw_count: u32,

    /// A side resigns once its own score has stayed at or below
    /// `-resign_score` for `resign_count` consecutive moves of its own.
    /// `resign_count == 0` disables this.
    pub resign_score: Score,
    pub resign_count: u32,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            chess960: false,
            nodes: [0; 2],
            depth: [0; 2],
            movetime: [0; 2],
            time: [0; 2],
            increment: [0; 2],
            draw_score: 0,
            draw_count: 0,
            resign_score: 0,
            resign_count: 0,
        }
    }
}

/// UCI option assignments for one engine, already split out of the
/// `Name=Value,Name=Value` wire form.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub assignments: Vec<(String, String)>,
}

impl EngineOptions {
    pub fn none() -> Self {
        Self::default()
    }

    /// Parses the `Name=Value` comma-separated configuration string from
    /// spec §4.1/§6 into individual assignments.
    pub fn parse(spec: &str) -> Self {
        let assignments = spec
            .split(',')
            .filter(|entry| !entry.trim().is_empty())
            .filter_map(|entry| entry.split_once('='))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .collect();
        Self { assignments }
    }
}

/// A training-data sample recorded for one ply of a game: the position
/// *before* the move played that ply, and the score the moving side's
/// engine reported for it, if any. Interpreting these (e.g. labeling with
/// the eventual game result) is left to the caller.
#[derive(Debug, Clone)]
pub struct Sample {
    pub position: Position,
    pub score: Option<Score>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_assignments() {
        let opts = EngineOptions::parse("Hash=16,Threads=8");
        assert_eq!(
            opts.assignments,
            vec![("Hash".to_string(), "16".to_string()), ("Threads".to_string(), "8".to_string())]
        );
    }

    #[test]
    fn empty_spec_yields_no_assignments() {
        assert!(EngineOptions::parse("").assignments.is_empty());
    }
}
