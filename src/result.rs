//! The terminal result tag and its decoding into a wire result + reason.

use crate::chess_iface::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTag {
    None,
    Checkmate,
    Stalemate,
    Threefold,
    FiftyMoves,
    InsufficientMaterial,
    IllegalMove,
    TimeLoss,
    DrawAdjudication,
    Resign,
}

impl ResultTag {
    pub fn is_terminal(self) -> bool {
        self != ResultTag::None
    }
}

/// Decodes a finished game's result tag into the White-point-of-view wire
/// result (`1-0` / `0-1` / `1/2-1/2` / `*`) and a human-readable reason.
/// `side_to_move` is the color to move at the moment the tag was set --
/// needed to attribute losses in the "loser = side to move" variants.
pub fn decode_result(tag: ResultTag, side_to_move: Color) -> (&'static str, String) {
    use ResultTag::*;
    let loses_side_to_move = || if side_to_move == Color::White { "0-1" } else { "1-0" };
    match tag {
        None => ("*", "unterminated".to_string()),
        Checkmate => (loses_side_to_move(), "checkmate".to_string()),
        Stalemate => ("1/2-1/2", "stalemate".to_string()),
        Threefold => ("1/2-1/2", "3 repetitions".to_string()),
        FiftyMoves => ("1/2-1/2", "50 move rule".to_string()),
        InsufficientMaterial => ("1/2-1/2", "insufficient material".to_string()),
        IllegalMove => (loses_side_to_move(), "illegal move".to_string()),
        TimeLoss => (loses_side_to_move(), "time loss".to_string()),
        DrawAdjudication => ("1/2-1/2", "draw by adjudication".to_string()),
        Resign => {
            let resigning_side = if side_to_move == Color::White { "white" } else { "black" };
            (loses_side_to_move(), format!("{resigning_side} resigns"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkmate_loses_for_side_to_move() {
        assert_eq!(decode_result(ResultTag::Checkmate, Color::Black).0, "1-0");
        assert_eq!(decode_result(ResultTag::Checkmate, Color::White).0, "0-1");
    }

    #[test]
    fn draws_are_symmetric() {
        for tag in [ResultTag::Stalemate, ResultTag::Threefold, ResultTag::FiftyMoves, ResultTag::InsufficientMaterial, ResultTag::DrawAdjudication]
        {
            assert_eq!(decode_result(tag, Color::White).0, "1/2-1/2");
            assert_eq!(decode_result(tag, Color::Black).0, "1/2-1/2");
        }
    }

    #[test]
    fn resign_names_the_resigning_side() {
        let (wire, reason) = decode_result(ResultTag::Resign, Color::White);
        assert_eq!(wire, "0-1");
        assert_eq!(reason, "white resigns");
    }
}
