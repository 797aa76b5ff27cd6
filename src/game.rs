//! The game driver: steps a position forward move by move, evaluating
//! termination and adjudication, and renders the finished game as PGN.

use tracing::{info, warn};

use crate::chess_iface::{self, Color, Move, Ply};
use crate::engine::{BestMoveOutcome, EngineDriver};
use crate::error::Res;
use crate::options::{GameOptions, Sample};
use crate::result::{decode_result, ResultTag};

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

/// Owns the position history of one game plus the two players' names,
/// configuration and termination state. Holds engine handles only by
/// reference for the duration of [`GameDriver::play`] -- it never owns them.
#[derive(Debug)]
pub struct GameDriver {
    positions: Vec<Ply>,
    /// Indexed by color: `names[White]` / `names[Black]`.
    names: [String; 2],
    options: GameOptions,
    result: ResultTag,
    samples: Vec<Sample>,
    draw_ply_count: u32,
    /// Indexed by play order (0 = first engine, 1 = second), matching the
    /// per-side search limits in [`GameOptions`].
    resign_counters: [u32; 2],
}

impl GameDriver {
    /// Parses `opening_fen` into the starting position of a new game.
    pub fn new(opening_fen: &str, options: GameOptions) -> Res<Self> {
        let opening = chess_iface::position_parse(opening_fen, options.chess960)?;
        Ok(Self {
            positions: vec![opening],
            names: [String::new(), String::new()],
            options,
            result: ResultTag::None,
            samples: Vec::new(),
            draw_ply_count: 0,
            resign_counters: [0, 0],
        })
    }

    pub fn result(&self) -> ResultTag {
        self.result
    }

    pub fn ply_count(&self) -> usize {
        self.positions.len() - 1
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The wire result (`1-0`/`0-1`/`1/2-1/2`/`*`) and human-readable reason
    /// for the current (possibly not yet terminal) result tag.
    pub fn decode(&self) -> (&'static str, String) {
        let side = chess_iface::side_to_move(&self.current_position().position);
        decode_result(self.result, side)
    }

    fn current_position(&self) -> &Ply {
        self.positions.last().expect("opening position is always present")
    }

    fn go_line(&self, side: usize) -> String {
        let mut line = String::from("go");
        if self.options.nodes[side] != 0 {
            line += &format!(" nodes {}", self.options.nodes[side]);
        }
        if self.options.depth[side] != 0 {
            line += &format!(" depth {}", self.options.depth[side]);
        }
        if self.options.movetime[side] != 0 {
            line += &format!(" movetime {}", self.options.movetime[side]);
        }
        line
    }

    /// Plays a full game. `first` plays whichever color is to move in the
    /// opening position; `second` plays the other color.
    pub fn play(&mut self, first: &mut EngineDriver, second: &mut EngineDriver) -> Res<ResultTag> {
        let first_color = chess_iface::side_to_move(&self.current_position().position);
        self.names[color_index(first_color)] = first.name().to_string();
        self.names[color_index(chess_iface::other_color(first_color))] = second.name().to_string();

        for engine in [&mut *first, &mut *second] {
            if self.options.chess960 {
                engine.send_line("setoption name UCI_Chess960 value true")?;
            }
            engine.send_line("ucinewgame")?;
        }

        let go_lines = [self.go_line(0), self.go_line(1)];
        let mut time_left = self.options.time;
        let mut pending_move: Option<Move> = None;
        let mut ply = 0usize;

        loop {
            if ply > 0 {
                let mv = pending_move.take().expect("previous iteration recorded a move");
                let next = chess_iface::position_apply(&self.positions[ply - 1].position, &mv)?;
                self.positions.push(next);
            }

            let position = self.positions[ply].position.clone();
            let legal = chess_iface::generate_all_legal_moves(&position);

            if legal.is_empty() {
                self.result =
                    if chess_iface::is_check(&position) { ResultTag::Checkmate } else { ResultTag::Stalemate };
                break;
            }
            if chess_iface::halfmove_clock(&position) >= 100 {
                self.result = ResultTag::FiftyMoves;
                break;
            }
            if chess_iface::insufficient_material(&position) {
                self.result = ResultTag::InsufficientMaterial;
                break;
            }
            if self.count_repetitions(ply) >= 3 {
                self.result = ResultTag::Threefold;
                break;
            }

            let side = ply % 2;
            let engine = if side == 0 { &mut *first } else { &mut *second };

            engine.send_line(&self.build_position_command(ply))?;
            engine.synchronize()?;

            let outcome = engine.request_best_move(&go_lines[side], time_left[side])?;
            let (score, mv_text) = match outcome {
                BestMoveOutcome::Timeout { time_left_ms } => {
                    time_left[side] = time_left_ms;
                    warn!(ply, "engine '{}' timed out", engine.name());
                    self.result = ResultTag::TimeLoss;
                    break;
                }
                BestMoveOutcome::Found { score, mv, time_left_ms } => {
                    time_left[side] = time_left_ms + self.options.increment[side];
                    (score, mv)
                }
            };

            let parsed = chess_iface::lan_to_move(&position, &mv_text);
            let legal_move = parsed.filter(|mv| legal.contains(mv));
            let Some(mv) = legal_move else {
                warn!(ply, mv = %mv_text, "engine '{}' played an illegal move", engine.name());
                self.result = ResultTag::IllegalMove;
                break;
            };

            self.samples.push(Sample { position: position.clone(), score });

            if self.options.draw_count > 0 {
                if score.is_some_and(|s| s.abs() <= self.options.draw_score) {
                    self.draw_ply_count += 1;
                } else {
                    self.draw_ply_count = 0;
                }
                if self.draw_ply_count >= 2 * self.options.draw_count {
                    self.result = ResultTag::DrawAdjudication;
                    break;
                }
            }

            if self.options.resign_count > 0 {
                if score.is_some_and(|s| s <= -self.options.resign_score) {
                    self.resign_counters[side] += 1;
                } else {
                    self.resign_counters[side] = 0;
                }
                if self.resign_counters[side] >= self.options.resign_count {
                    self.result = ResultTag::Resign;
                    break;
                }
            }

            pending_move = Some(mv);
            ply += 1;
        }

        info!(result = ?self.result, plies = self.ply_count(), "game finished");
        Ok(self.result)
    }

    /// Scans back in steps of 2 plies (same side to move), bounded by the
    /// rule50 counter and by available history, counting occurrences of the
    /// current position's repetition key (itself included).
    fn count_repetitions(&self, ply: usize) -> u32 {
        let key = chess_iface::repetition_key(&self.positions[ply].position);
        let rule50 = chess_iface::halfmove_clock(&self.positions[ply].position) as usize;
        let mut count = 1;
        let mut back = 4;
        while back <= rule50 && back <= ply {
            if chess_iface::repetition_key(&self.positions[ply - back].position) == key {
                count += 1;
            }
            back += 2;
        }
        count
    }

    /// Builds `position fen <FEN> [moves ...]`, pruning history to the
    /// earliest ply the rule50 counter still requires.
    fn build_position_command(&self, ply: usize) -> String {
        let rule50 = chess_iface::halfmove_clock(&self.positions[ply].position) as usize;
        let p0 = ply.saturating_sub(rule50);
        let fen = chess_iface::position_to_fen(&self.positions[p0].position);
        let mut cmd = format!("position fen {fen}");
        if p0 < ply {
            cmd.push_str(" moves");
            for i in (p0 + 1)..=ply {
                let mv = self.positions[i].last_move.as_ref().expect("non-root ply has a move");
                cmd.push(' ');
                cmd.push_str(&chess_iface::move_to_lan(mv, self.options.chess960));
            }
        }
        cmd
    }

    /// Renders the game as PGN: the seven-tag prologue, then movetext.
    pub fn pgn(&self) -> String {
        let (wire, reason) = self.decode();
        let opening_fen = chess_iface::position_to_fen(&self.positions[0].position);

        let mut out = String::new();
        out += &format!("[White \"{}\"]\n", self.names[0]);
        out += &format!("[Black \"{}\"]\n", self.names[1]);
        out += &format!("[Result \"{wire}\"]\n");
        out += &format!("[Termination \"{reason}\"]\n");
        out += &format!("[FEN \"{opening_fen}\"]\n");
        if self.options.chess960 {
            out += "[Variant \"Chess960\"]\n";
        }
        out += &format!("[PlyCount \"{}\"]\n", self.ply_count());
        out += "\n";

        let black_to_move_at_start = chess_iface::side_to_move(&self.positions[0].position) == Color::Black;
        let mut move_tokens = 0usize;

        for ply in 1..self.positions.len() {
            let prev = &self.positions[ply - 1].position;
            let mv = self.positions[ply].last_move.as_ref().expect("non-root ply has a move");
            let white_to_move = chess_iface::side_to_move(prev) == Color::White;
            let move_number = chess_iface::fullmove_number(prev);

            if white_to_move {
                out += &format!("{move_number}. ");
            } else if ply == 1 && black_to_move_at_start {
                out += &format!("{move_number}.. ");
            }

            out += &chess_iface::move_to_san(prev, mv);

            move_tokens += 1;
            out.push(if move_tokens % 10 == 0 { '\n' } else { ' ' });
        }

        out += &wire;
        out.push('\n');
        out.push('\n');
        out
    }
}
