//! The chess rule engine as an external collaborator.
//!
//! The rest of the crate never touches `shakmaty` directly -- it only calls
//! through the narrow set of operations below, mirroring how the design
//! treats position representation, move generation, legality, FEN/SAN/LAN
//! conversion and the repetition key as someone else's problem. `shakmaty`
//! happens to be the someone else.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, EnPassantMode, Position as _};

use crate::error::{DriverError, Res};

pub type Position = shakmaty::Chess;
pub type Move = shakmaty::Move;
pub type Color = shakmaty::Color;
pub type MoveList = shakmaty::MoveList;
pub type RepetitionKey = Zobrist64;

/// A single entry in the game's position history: the board after a move,
/// plus the move that produced it (`None` for the opening position).
#[derive(Debug, Clone)]
pub struct Ply {
    pub position: Position,
    pub last_move: Option<Move>,
}

fn castling_mode(chess960: bool) -> CastlingMode {
    if chess960 { CastlingMode::Chess960 } else { CastlingMode::Standard }
}

/// Parses a FEN string into the opening position of a game.
pub fn position_parse(fen: &str, chess960: bool) -> Res<Ply> {
    let setup: Fen = fen.parse().map_err(|e| DriverError::InvalidFen {
        fen: fen.to_string(),
        reason: format!("{e}"),
    })?;
    let position = setup.into_position(castling_mode(chess960)).map_err(|e| DriverError::InvalidFen {
        fen: fen.to_string(),
        reason: format!("{e}"),
    })?;
    Ok(Ply { position, last_move: None })
}

/// Renders a position back to FEN.
pub fn position_to_fen(position: &Position) -> String {
    Fen::from_position(position.clone(), EnPassantMode::Legal).to_string()
}

/// Applies a legal move to `prev`, producing the next ply.
pub fn position_apply(prev: &Position, mv: &Move) -> Res<Ply> {
    let position = prev.clone().play(mv).map_err(|e| DriverError::InvalidFen {
        fen: position_to_fen(prev),
        reason: format!("illegal move {mv}: {e}"),
    })?;
    Ok(Ply { position, last_move: Some(mv.clone()) })
}

pub fn generate_all_legal_moves(position: &Position) -> MoveList {
    position.legal_moves()
}

pub fn insufficient_material(position: &Position) -> bool {
    position.is_insufficient_material()
}

pub fn is_check(position: &Position) -> bool {
    position.is_check()
}

/// Plies since the last capture or pawn move (the "rule50" counter).
pub fn halfmove_clock(position: &Position) -> u32 {
    position.halfmoves()
}

pub fn side_to_move(position: &Position) -> Color {
    position.turn()
}

pub fn other_color(color: Color) -> Color {
    match color {
        Color::White => Color::Black,
        Color::Black => Color::White,
    }
}

pub fn fullmove_number(position: &Position) -> u32 {
    position.fullmoves().get()
}

/// A key equal across transpositions, suitable for threefold repetition.
pub fn repetition_key(position: &Position) -> RepetitionKey {
    position.zobrist_hash(EnPassantMode::Legal)
}

/// Long algebraic notation (what UCI calls a move), e.g. `e2e4`, `e7e8q`.
pub fn move_to_lan(mv: &Move, chess960: bool) -> String {
    if chess960 { UciMove::from_chess960(mv).to_string() } else { UciMove::from_standard(mv).to_string() }
}

/// Parses a LAN/UCI move string in the context of `position`. Returns `None`
/// (never an error) for unparseable or contextually-illegal text, matching
/// the chess module contract's "sentinel on failure" behavior -- callers
/// decide legality themselves by checking membership in the legal move list.
pub fn lan_to_move(position: &Position, lan: &str) -> Option<Move> {
    let uci: UciMove = lan.parse().ok()?;
    uci.to_move(position).ok()
}

/// SAN, including the `+`/`#` suffix computed from the move's own result.
pub fn move_to_san(position: &Position, mv: &Move) -> String {
    SanPlus::from_move(position.clone(), mv).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn fen_round_trips() {
        let ply = position_parse(STARTPOS, false).unwrap();
        assert_eq!(position_to_fen(&ply.position), STARTPOS);
    }

    #[test]
    fn legal_moves_from_startpos() {
        let ply = position_parse(STARTPOS, false).unwrap();
        assert_eq!(generate_all_legal_moves(&ply.position).len(), 20);
        assert!(!is_check(&ply.position));
        assert!(!insufficient_material(&ply.position));
    }

    #[test]
    fn lan_round_trips_through_apply() {
        let ply = position_parse(STARTPOS, false).unwrap();
        let mv = lan_to_move(&ply.position, "e2e4").expect("e2e4 is legal");
        assert_eq!(move_to_lan(&mv, false), "e2e4");
        let next = position_apply(&ply.position, &mv).unwrap();
        assert_eq!(halfmove_clock(&next.position), 0);
        assert_eq!(side_to_move(&next.position), Color::Black);
    }

    #[test]
    fn unparseable_lan_is_none_not_error() {
        let ply = position_parse(STARTPOS, false).unwrap();
        assert!(lan_to_move(&ply.position, "not a move").is_none());
        assert!(lan_to_move(&ply.position, "e2e5").is_none());
    }

    #[test]
    fn san_for_opening_move() {
        let ply = position_parse(STARTPOS, false).unwrap();
        let mv = lan_to_move(&ply.position, "g1f3").unwrap();
        assert_eq!(move_to_san(&ply.position, &mv), "Nf3");
    }
}
