//! The S1-S7 end-to-end scenarios, driven against scripted engines instead
//! of real UCI binaries: every line an engine would emit over stdout is
//! queued up front, and `GameDriver::play` drives it exactly as it would a
//! live process.

use std::io::Cursor;

use monitors::{EngineDriver, GameDriver, GameOptions, ResultTag};

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn scripted(name: &str, lines: &[&str]) -> EngineDriver {
    let mut text = lines.join("\n");
    text.push('\n');
    let reader = Cursor::new(text.into_bytes());
    let writer = Cursor::new(Vec::new());
    EngineDriver::from_streams(Some(name.to_string()), reader, writer, None).unwrap()
}

/// S1 -- fool's mate.
#[test]
fn foolsmate_ends_in_checkmate_for_white() {
    let mut first = scripted("first", &["uciok", "readyok", "bestmove f2f3", "readyok", "bestmove g2g4"]);
    let mut second = scripted("second", &["uciok", "readyok", "bestmove e7e5", "readyok", "bestmove d8h4"]);

    let mut game = GameDriver::new(STARTPOS, GameOptions::default()).unwrap();
    let result = game.play(&mut first, &mut second).unwrap();

    assert_eq!(result, ResultTag::Checkmate);
    assert_eq!(game.ply_count(), 4);
    let (wire, reason) = game.decode();
    assert_eq!(wire, "0-1");
    assert_eq!(reason, "checkmate");
    assert!(game.pgn().trim_end().ends_with("Qh4# 0-1"));
}

/// S2 -- stalemate.
#[test]
fn queen_shuffle_stalemates_the_black_king() {
    let fen = "7k/5Q2/6K1/8/8/8/8/8 w - - 0 1";
    let mut first = scripted("first", &["uciok", "readyok", "bestmove f7f6"]);
    let mut second = scripted("second", &["uciok"]);

    let mut game = GameDriver::new(fen, GameOptions::default()).unwrap();
    let result = game.play(&mut first, &mut second).unwrap();

    assert_eq!(result, ResultTag::Stalemate);
    assert_eq!(game.decode().0, "1/2-1/2");
}

/// S3 -- fifty-move rule, crossing from 99 to 100 on a quiet king move.
#[test]
fn rule50_counter_reaching_100_ends_the_game() {
    let fen = "4k3/8/8/8/8/8/8/4K3 w - - 99 60";
    let mut first = scripted("first", &["uciok", "readyok", "bestmove e1d1"]);
    let mut second = scripted("second", &["uciok"]);

    let mut game = GameDriver::new(fen, GameOptions::default()).unwrap();
    let result = game.play(&mut first, &mut second).unwrap();

    assert_eq!(result, ResultTag::FiftyMoves);
}

/// S4 -- draw adjudication after 6 consecutive near-zero plies.
#[test]
fn six_consecutive_zero_scores_trigger_draw_adjudication() {
    let mut first = scripted(
        "first",
        &[
            "uciok",
            "readyok",
            "info score cp 0",
            "bestmove g1f3",
            "readyok",
            "info score cp 0",
            "bestmove b1c3",
            "readyok",
            "info score cp 0",
            "bestmove f1b5",
        ],
    );
    let mut second = scripted(
        "second",
        &[
            "uciok",
            "readyok",
            "info score cp 0",
            "bestmove g8f6",
            "readyok",
            "info score cp 0",
            "bestmove b8c6",
            "readyok",
            "info score cp 0",
            "bestmove f8b4",
        ],
    );

    let options = GameOptions { draw_score: 10, draw_count: 3, ..GameOptions::default() };
    let mut game = GameDriver::new(STARTPOS, options).unwrap();
    let result = game.play(&mut first, &mut second).unwrap();

    assert_eq!(result, ResultTag::DrawAdjudication);
}

/// S5 -- resignation after three of `first`'s own moves score far below
/// `-resignScore`.
#[test]
fn three_lopsided_self_evaluations_resign_the_game() {
    let mut first = scripted(
        "first",
        &[
            "uciok",
            "readyok",
            "info score cp -600",
            "bestmove g1f3",
            "readyok",
            "info score cp -600",
            "bestmove b1c3",
            "readyok",
            "info score cp -600",
            "bestmove f1b5",
        ],
    );
    let mut second = scripted("second", &["uciok", "readyok", "bestmove g8f6", "readyok", "bestmove b8c6"]);

    let options = GameOptions { resign_score: 500, resign_count: 3, ..GameOptions::default() };
    let mut game = GameDriver::new(STARTPOS, options).unwrap();
    let result = game.play(&mut first, &mut second).unwrap();

    assert_eq!(result, ResultTag::Resign);
    let (wire, reason) = game.decode();
    assert_eq!(wire, "0-1");
    assert_eq!(reason, "white resigns");
}

/// S6 -- illegal move.
#[test]
fn move_outside_the_legal_set_is_an_illegal_move_loss() {
    let mut first = scripted("first", &["uciok", "readyok", "bestmove e2e5"]);
    let mut second = scripted("second", &["uciok"]);

    let mut game = GameDriver::new(STARTPOS, GameOptions::default()).unwrap();
    let result = game.play(&mut first, &mut second).unwrap();

    assert_eq!(result, ResultTag::IllegalMove);
    assert_eq!(game.decode().0, "0-1");
}

/// S7 -- timeout drain: the scripted engine keeps emitting `info` lines with
/// no `bestmove` until after `stop`.
#[test]
fn exhausted_clock_drains_the_search_before_timing_out() {
    let mut first =
        scripted("first", &["uciok", "readyok", "info depth 1 score cp 5", "info depth 2 score cp 7", "bestmove a2a3"]);
    let mut second = scripted("second", &["uciok"]);

    let options = GameOptions { time: [0, 300_000], ..GameOptions::default() };
    let mut game = GameDriver::new(STARTPOS, options).unwrap();
    let result = game.play(&mut first, &mut second).unwrap();

    assert_eq!(result, ResultTag::TimeLoss);
    assert_eq!(game.decode().0, "0-1");
}
