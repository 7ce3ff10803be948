// Rules-engine interface consumed by the search
//
// The search never knows which game it is playing. Everything it needs from the
// position (legal moves, terminal conditions, fingerprints, reversible moves)
// goes through the `GameRules` trait, and everything it needs from a move goes
// through `MoveDescriptor`.

use std::fmt::Debug;

/// Piece kinds scored by the evaluator's material table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// The two sides of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Returns the other side
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

/// Board square index, 0 = a1 .. 63 = h8
pub type SquareIndex = u8;

/// File (column) of a square, 0 = a .. 7 = h
pub fn file_of(square: SquareIndex) -> u8 {
    square % 8
}

/// What the evaluator needs to know about a move
pub trait MoveDescriptor: Clone + Debug + PartialEq {
    /// Kind of the piece being moved
    fn moved_piece(&self) -> PieceKind;
    /// Kind of the piece being captured, if any
    fn captured_piece(&self) -> Option<PieceKind>;
    fn is_castle(&self) -> bool;
    fn is_promotion(&self) -> bool;
    /// Square the moving piece lands on
    fn target_square(&self) -> SquareIndex;

    fn is_capture(&self) -> bool {
        self.captured_piece().is_some()
    }
}

/// Mutable game position with strictly reversible moves
///
/// `make_move`/`undo_move` and `make_null_move`/`undo_null_move` form one LIFO
/// stack: every apply must be undone in reverse order. A failed apply must leave
/// the position unchanged.
pub trait GameRules {
    type Move: MoveDescriptor;

    /// All legal moves for the side to move
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Legal moves that capture something
    fn legal_captures(&self) -> Vec<Self::Move> {
        self.legal_moves()
            .into_iter()
            .filter(|m| m.is_capture())
            .collect()
    }

    fn make_move(&mut self, mv: &Self::Move) -> Result<(), String>;
    fn undo_move(&mut self) -> Result<(), String>;

    /// Passes the turn without moving; fails when passing is illegal (e.g. in check)
    fn make_null_move(&mut self) -> Result<(), String>;
    fn undo_null_move(&mut self) -> Result<(), String>;

    fn is_checkmate(&self) -> bool;
    fn is_check(&self) -> bool;
    /// Draw by the rules of the game (stalemate and similar)
    fn is_draw(&self) -> bool;
    fn is_insufficient_material(&self) -> bool;
    /// Current position already occurred earlier in the game or search line
    fn is_repetition(&self) -> bool;
    /// Plies since the last capture or pawn move
    fn halfmove_clock(&self) -> u32;

    /// Stable identity of the current position (equal positions, equal value)
    fn fingerprint(&self) -> u64;

    fn side_to_move(&self) -> Side;
    fn piece_squares(&self, kind: PieceKind, side: Side) -> Vec<SquareIndex>;
}

/// Applies `mv`, runs `f`, then undoes `mv` whatever `f` returned
pub fn with_move<R, T, F>(rules: &mut R, mv: &R::Move, f: F) -> Result<T, String>
where
    R: GameRules + ?Sized,
    F: FnOnce(&mut R) -> Result<T, String>,
{
    rules.make_move(mv)?;
    let result = f(rules);
    let undo = rules.undo_move();
    let value = result?;
    undo?;
    Ok(value)
}

/// Replays `path` in order, runs `f`, then undoes the path in reverse order
///
/// If a move of the path cannot be applied, the moves already applied are undone
/// before the error is returned.
pub fn with_path<R, T, F>(rules: &mut R, path: &[R::Move], f: F) -> Result<T, String>
where
    R: GameRules + ?Sized,
    F: FnOnce(&mut R) -> Result<T, String>,
{
    let mut applied = 0;
    let mut failure = None;
    for mv in path {
        match rules.make_move(mv) {
            Ok(()) => applied += 1,
            Err(e) => {
                failure = Some(format!("Failed to replay move {:?}: {}", mv, e));
                break;
            }
        }
    }

    let result = match failure {
        Some(e) => Err(e),
        None => f(rules),
    };

    let mut undo_error = None;
    for _ in 0..applied {
        if let Err(e) = rules.undo_move() {
            undo_error.get_or_insert(e);
        }
    }

    let value = result?;
    match undo_error {
        Some(e) => Err(format!("Failed to unwind replayed path: {}", e)),
        None => Ok(value),
    }
}
