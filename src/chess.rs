// Chess implementation of the rules interface on top of shakmaty
//
// shakmaty positions are immutable values, so reversibility is provided by an
// explicit stack of prior positions. The stack also carries the Zobrist hash of
// every position reached, which is what repetition detection scans.

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Role};

use crate::rules::{GameRules, MoveDescriptor, PieceKind, Side, SquareIndex};

fn piece_kind(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

fn role_of(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}

fn color_of(side: Side) -> Color {
    match side {
        Side::White => Color::White,
        Side::Black => Color::Black,
    }
}

fn hash_of(pos: &Chess) -> u64 {
    pos.zobrist_hash::<Zobrist64>(EnPassantMode::Legal).0
}

impl MoveDescriptor for Move {
    fn moved_piece(&self) -> PieceKind {
        piece_kind(self.role())
    }

    fn captured_piece(&self) -> Option<PieceKind> {
        self.capture().map(piece_kind)
    }

    fn is_castle(&self) -> bool {
        Move::is_castle(self)
    }

    fn is_promotion(&self) -> bool {
        Move::is_promotion(self)
    }

    /// Castling lands on the king's destination, not on the rook
    fn target_square(&self) -> SquareIndex {
        match self.to_uci(CastlingMode::Standard) {
            UciMove::Normal { to, .. } => to as u8,
            _ => self.to() as u8,
        }
    }
}

/// Renders a move in UCI notation (e.g. `e2e4`, `e7e8q`)
pub fn to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// What one undo restores
#[derive(Debug, Clone)]
enum UndoEntry {
    Move(Chess),
    Null(Chess),
}

/// Chess position with an apply/undo stack and repetition history
#[derive(Debug, Clone)]
pub struct ChessPosition {
    current: Chess,
    undo_stack: Vec<UndoEntry>,
    /// Hash of every position reached, current position last
    hashes: Vec<u64>,
}

impl Default for ChessPosition {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}

impl ChessPosition {
    pub fn new(pos: Chess) -> Self {
        let hash = hash_of(&pos);
        ChessPosition {
            current: pos,
            undo_stack: Vec::new(),
            hashes: vec![hash],
        }
    }

    /// Parses a FEN string into a position
    pub fn from_fen(fen: &str) -> Result<Self, String> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e| format!("Invalid FEN '{}': {}", fen, e))?;
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| format!("Illegal position '{}': {}", fen, e))?;
        Ok(Self::new(pos))
    }

    /// Builds the position a game reached: optional FEN start plus UCI moves
    pub fn from_game(fen: Option<&str>, moves: &[String]) -> Result<Self, String> {
        let mut position = match fen {
            Some(f) if !f.trim().is_empty() && f.trim() != "startpos" => Self::from_fen(f)?,
            _ => Self::default(),
        };
        for uci in moves {
            position.play_uci(uci)?;
        }
        Ok(position)
    }

    /// Plays a move for real; it stays part of the repetition history
    pub fn play_uci(&mut self, uci: &str) -> Result<Move, String> {
        let parsed: UciMove = uci
            .trim()
            .parse()
            .map_err(|e| format!("Invalid UCI move '{}': {}", uci, e))?;
        let mv = parsed
            .to_move(&self.current)
            .map_err(|e| format!("Illegal move '{}': {}", uci, e))?;

        self.current.play_unchecked(&mv);
        self.hashes.push(hash_of(&self.current));
        Ok(mv)
    }

    /// Finds the legal move matching a UCI string in the current position
    pub fn parse_uci(&self, uci: &str) -> Result<Move, String> {
        let parsed: UciMove = uci
            .trim()
            .parse()
            .map_err(|e| format!("Invalid UCI move '{}': {}", uci, e))?;
        parsed
            .to_move(&self.current)
            .map_err(|e| format!("Illegal move '{}': {}", uci, e))
    }

    pub fn position(&self) -> &Chess {
        &self.current
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.current.clone(), EnPassantMode::Legal).to_string()
    }

    /// Number of applied moves not yet undone
    pub fn pending_undos(&self) -> usize {
        self.undo_stack.len()
    }

    fn repetitions(&self) -> usize {
        let current = hash_of(&self.current);
        // Positions before the last irreversible move cannot repeat
        let window = (self.current.halfmoves() as usize + 1).min(self.hashes.len());
        self.hashes[self.hashes.len() - window..]
            .iter()
            .filter(|&&h| h == current)
            .count()
    }
}

impl GameRules for ChessPosition {
    type Move = Move;

    fn legal_moves(&self) -> Vec<Move> {
        self.current.legal_moves().into_iter().collect()
    }

    fn legal_captures(&self) -> Vec<Move> {
        self.current.capture_moves().into_iter().collect()
    }

    fn make_move(&mut self, mv: &Move) -> Result<(), String> {
        let previous = self.current.clone();
        self.current.play_unchecked(mv);
        self.undo_stack.push(UndoEntry::Move(previous));
        self.hashes.push(hash_of(&self.current));
        Ok(())
    }

    fn undo_move(&mut self) -> Result<(), String> {
        match self.undo_stack.pop() {
            Some(UndoEntry::Move(previous)) => {
                self.current = previous;
                self.hashes.pop();
                Ok(())
            }
            Some(entry @ UndoEntry::Null(_)) => {
                self.undo_stack.push(entry);
                Err("Undo order violated: a null move is on top of the stack".to_string())
            }
            None => Err("Nothing to undo".to_string()),
        }
    }

    fn make_null_move(&mut self) -> Result<(), String> {
        let previous = self.current.clone();
        let swapped = previous
            .clone()
            .swap_turn()
            .map_err(|e| format!("Cannot pass the turn: {}", e))?;
        self.current = swapped;
        self.undo_stack.push(UndoEntry::Null(previous));
        Ok(())
    }

    fn undo_null_move(&mut self) -> Result<(), String> {
        match self.undo_stack.pop() {
            Some(UndoEntry::Null(previous)) => {
                self.current = previous;
                Ok(())
            }
            Some(entry @ UndoEntry::Move(_)) => {
                self.undo_stack.push(entry);
                Err("Undo order violated: a real move is on top of the stack".to_string())
            }
            None => Err("Nothing to undo".to_string()),
        }
    }

    fn is_checkmate(&self) -> bool {
        self.current.is_checkmate()
    }

    fn is_check(&self) -> bool {
        self.current.is_check()
    }

    fn is_draw(&self) -> bool {
        self.current.is_stalemate() || self.repetitions() >= 3
    }

    fn is_insufficient_material(&self) -> bool {
        self.current.is_insufficient_material()
    }

    fn is_repetition(&self) -> bool {
        self.repetitions() >= 2
    }

    fn halfmove_clock(&self) -> u32 {
        self.current.halfmoves()
    }

    fn fingerprint(&self) -> u64 {
        hash_of(&self.current)
    }

    fn side_to_move(&self) -> Side {
        match self.current.turn() {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }

    fn piece_squares(&self, kind: PieceKind, side: Side) -> Vec<SquareIndex> {
        let board = self.current.board();
        (board.by_role(role_of(kind)) & board.by_color(color_of(side)))
            .into_iter()
            .map(|sq| sq as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position_has_twenty_moves() {
        let pos = ChessPosition::default();
        assert_eq!(pos.legal_moves().len(), 20);
        assert!(pos.legal_captures().is_empty());
        assert_eq!(pos.side_to_move(), Side::White);
    }

    #[test]
    fn test_make_undo_restores_fingerprint() {
        let mut pos = ChessPosition::default();
        let before = pos.fingerprint();
        let mv = pos.parse_uci("e2e4").unwrap();

        pos.make_move(&mv).unwrap();
        assert_ne!(pos.fingerprint(), before);
        assert_eq!(pos.side_to_move(), Side::Black);
        pos.undo_move().unwrap();

        assert_eq!(pos.fingerprint(), before);
        assert_eq!(pos.pending_undos(), 0);
    }

    #[test]
    fn test_undo_on_empty_stack_fails() {
        let mut pos = ChessPosition::default();
        assert!(pos.undo_move().is_err());
        assert!(pos.undo_null_move().is_err());
    }

    #[test]
    fn test_null_move_swaps_turn_and_restores() {
        let mut pos = ChessPosition::default();
        let before = pos.fingerprint();

        pos.make_null_move().unwrap();
        assert_eq!(pos.side_to_move(), Side::Black);
        // A real undo must not pop a null move
        assert!(pos.undo_move().is_err());
        pos.undo_null_move().unwrap();

        assert_eq!(pos.fingerprint(), before);
    }

    #[test]
    fn test_null_move_refused_in_check() {
        // Black king on e8 checked by the rook on e1
        let mut pos = ChessPosition::from_fen("4k3/8/8/8/8/8/8/K3R3 b - - 0 1").unwrap();
        assert!(pos.is_check());
        assert!(pos.make_null_move().is_err());
        assert_eq!(pos.pending_undos(), 0);
    }

    #[test]
    fn test_repetition_from_game_history() {
        let moves: Vec<String> = ["g1f3", "g8f6", "f3g1", "f6g8"]
            .iter()
            .map(|m| m.to_string())
            .collect();
        let pos = ChessPosition::from_game(None, &moves).unwrap();

        assert!(pos.is_repetition());
        assert!(!pos.is_draw());
    }

    #[test]
    fn test_move_descriptor_for_capture_and_castle() {
        let capture = ChessPosition::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let exd5 = capture.parse_uci("e4d5").unwrap();
        assert_eq!(exd5.moved_piece(), PieceKind::Pawn);
        assert_eq!(exd5.captured_piece(), Some(PieceKind::Pawn));
        assert_eq!(exd5.target_square(), 35); // d5

        let castle = ChessPosition::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let short = castle
            .legal_moves()
            .into_iter()
            .find(|m| MoveDescriptor::is_castle(m))
            .expect("castling should be legal");
        assert_eq!(short.moved_piece(), PieceKind::King);
        assert!(!short.is_capture());
        assert_eq!(short.target_square(), 6); // g1

        let long = ChessPosition::from_fen("r3k3/8/8/8/8/8/8/4K3 b q - 0 1").unwrap();
        let queenside = long
            .legal_moves()
            .into_iter()
            .find(|m| MoveDescriptor::is_castle(m))
            .expect("castling should be legal");
        assert_eq!(queenside.target_square(), 58); // c8
    }

    #[test]
    fn test_piece_squares() {
        let pos = ChessPosition::default();
        let white_pawns = pos.piece_squares(PieceKind::Pawn, Side::White);
        assert_eq!(white_pawns.len(), 8);
        assert!(white_pawns.iter().all(|&sq| (8..16).contains(&sq)));
        assert_eq!(pos.piece_squares(PieceKind::King, Side::Black), vec![60]);
    }

    #[test]
    fn test_invalid_input_is_reported() {
        assert!(ChessPosition::from_fen("not a fen").is_err());
        let mut pos = ChessPosition::default();
        assert!(pos.play_uci("e2e5").is_err());
        assert!(pos.play_uci("zz").is_err());
    }

    #[test]
    fn test_uci_rendering() {
        let pos = ChessPosition::default();
        let mv = pos.parse_uci("g1f3").unwrap();
        assert_eq!(to_uci(&mv), "g1f3");
    }
}
