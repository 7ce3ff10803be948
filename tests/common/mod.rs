// Shared test doubles for the integration tests
//
// `ScriptedGame` is a tiny hand-built game tree implementing `GameRules`. Every
// position lists its legal moves explicitly, so tests control exactly which
// features the evaluator sees. It counts move generation and apply calls so
// tests can assert that memoized positions are not probed again.

#![allow(dead_code)]

use std::cell::Cell;

use frontier_chess_bot::config::Config;
use frontier_chess_bot::rules::{GameRules, MoveDescriptor, PieceKind, Side, SquareIndex};
use frontier_chess_bot::timer::Clock;

/// Move between two scripted positions
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedMove {
    pub label: String,
    pub to: usize,
    pub moved: PieceKind,
    pub captured: Option<PieceKind>,
    pub target: SquareIndex,
}

impl MoveDescriptor for ScriptedMove {
    fn moved_piece(&self) -> PieceKind {
        self.moved
    }

    fn captured_piece(&self) -> Option<PieceKind> {
        self.captured
    }

    fn is_castle(&self) -> bool {
        false
    }

    fn is_promotion(&self) -> bool {
        false
    }

    fn target_square(&self) -> SquareIndex {
        self.target
    }
}

#[derive(Debug, Clone)]
struct ScriptedPosition {
    moves: Vec<ScriptedMove>,
    fingerprint: u64,
    checkmate: bool,
    in_check: bool,
    draw: bool,
    refuse_entry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    position: usize,
    side: Side,
    null: bool,
}

/// Hand-built game tree; position 0 is the root
#[derive(Debug)]
pub struct ScriptedGame {
    positions: Vec<ScriptedPosition>,
    stack: Vec<Frame>,
    pub legal_move_calls: Cell<usize>,
    pub make_calls: usize,
}

pub const ROOT: usize = 0;

impl ScriptedGame {
    pub fn new() -> Self {
        ScriptedGame {
            positions: vec![Self::blank(0)],
            stack: vec![Frame {
                position: ROOT,
                side: Side::White,
                null: false,
            }],
            legal_move_calls: Cell::new(0),
            make_calls: 0,
        }
    }

    fn blank(fingerprint: u64) -> ScriptedPosition {
        ScriptedPosition {
            moves: Vec::new(),
            fingerprint,
            checkmate: false,
            in_check: false,
            draw: false,
            refuse_entry: false,
        }
    }

    /// Adds a quiet knight move from `from` to a new position and returns that position
    pub fn add(&mut self, from: usize, label: &str) -> usize {
        self.add_move(from, label, None, 0)
    }

    /// Adds a move with full control over capture and target square
    pub fn add_move(&mut self, from: usize, label: &str, captured: Option<PieceKind>, target: SquareIndex) -> usize {
        let to = self.positions.len();
        self.positions.push(Self::blank(1000 + to as u64));
        self.positions[from].moves.push(ScriptedMove {
            label: label.to_string(),
            to,
            moved: PieceKind::Knight,
            captured,
            target,
        });
        to
    }

    /// Adds `count` quiet moves from `from`, labelled `prefix0..`
    pub fn add_many(&mut self, from: usize, prefix: &str, count: usize) -> Vec<usize> {
        (0..count).map(|i| self.add(from, &format!("{}{}", prefix, i))).collect()
    }

    /// The side to move in `position` is mated (in check, no moves)
    pub fn set_checkmate(&mut self, position: usize) {
        let p = &mut self.positions[position];
        p.checkmate = true;
        p.in_check = true;
        p.moves.clear();
    }

    pub fn set_draw(&mut self, position: usize) {
        self.positions[position].draw = true;
    }

    pub fn set_fingerprint(&mut self, position: usize, fingerprint: u64) {
        self.positions[position].fingerprint = fingerprint;
    }

    /// Moves into `position` fail to apply
    pub fn refuse_entry(&mut self, position: usize) {
        self.positions[position].refuse_entry = true;
    }

    pub fn scripted_move(&self, from: usize, label: &str) -> ScriptedMove {
        self.positions[from]
            .moves
            .iter()
            .find(|m| m.label == label)
            .cloned()
            .unwrap_or_else(|| panic!("no move {} from {}", label, from))
    }

    /// Applied moves not yet undone
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    fn top(&self) -> Frame {
        self.stack[self.stack.len() - 1]
    }

    fn current(&self) -> &ScriptedPosition {
        &self.positions[self.top().position]
    }
}

impl GameRules for ScriptedGame {
    type Move = ScriptedMove;

    fn legal_moves(&self) -> Vec<ScriptedMove> {
        self.legal_move_calls.set(self.legal_move_calls.get() + 1);
        self.current().moves.clone()
    }

    fn make_move(&mut self, mv: &ScriptedMove) -> Result<(), String> {
        self.make_calls += 1;
        if !self.current().moves.contains(mv) {
            return Err(format!("{} is not legal here", mv.label));
        }
        if self.positions[mv.to].refuse_entry {
            return Err(format!("refusing to play {}", mv.label));
        }
        let side = self.top().side.opposite();
        self.stack.push(Frame {
            position: mv.to,
            side,
            null: false,
        });
        Ok(())
    }

    fn undo_move(&mut self) -> Result<(), String> {
        match self.stack.last() {
            Some(f) if self.stack.len() > 1 && !f.null => {
                self.stack.pop();
                Ok(())
            }
            _ => Err("nothing to undo".to_string()),
        }
    }

    fn make_null_move(&mut self) -> Result<(), String> {
        if self.current().in_check {
            return Err("cannot pass while in check".to_string());
        }
        let top = self.top();
        self.stack.push(Frame {
            position: top.position,
            side: top.side.opposite(),
            null: true,
        });
        Ok(())
    }

    fn undo_null_move(&mut self) -> Result<(), String> {
        match self.stack.last() {
            Some(f) if f.null => {
                self.stack.pop();
                Ok(())
            }
            _ => Err("no null move to undo".to_string()),
        }
    }

    fn is_checkmate(&self) -> bool {
        self.current().checkmate
    }

    fn is_check(&self) -> bool {
        self.current().in_check
    }

    fn is_draw(&self) -> bool {
        self.current().draw
    }

    fn is_insufficient_material(&self) -> bool {
        false
    }

    fn is_repetition(&self) -> bool {
        false
    }

    fn halfmove_clock(&self) -> u32 {
        0
    }

    fn fingerprint(&self) -> u64 {
        let top = self.top();
        let base = self.current().fingerprint;
        if top.null {
            base ^ 0xdead_beef
        } else {
            base
        }
    }

    fn side_to_move(&self) -> Side {
        self.top().side
    }

    fn piece_squares(&self, _kind: PieceKind, _side: Side) -> Vec<SquareIndex> {
        Vec::new()
    }
}

/// Clock that never advances
pub struct FrozenClock(pub u64);

impl Clock for FrozenClock {
    fn elapsed_ms(&self) -> u64 {
        self.0
    }
}

/// Clock reading 0 for the first `free_reads` reads and `after` afterwards
pub struct CountdownClock {
    reads: Cell<usize>,
    free_reads: usize,
    after: u64,
}

impl CountdownClock {
    pub fn new(free_reads: usize, after: u64) -> Self {
        CountdownClock {
            reads: Cell::new(0),
            free_reads,
            after,
        }
    }
}

impl Clock for CountdownClock {
    fn elapsed_ms(&self) -> u64 {
        let n = self.reads.get();
        self.reads.set(n + 1);
        if n < self.free_reads {
            0
        } else {
            self.after
        }
    }
}

/// Default configuration with deterministic selection
pub fn test_config() -> Config {
    let mut config = Config::default_hardcoded();
    config.selection.tolerance = 0.0;
    config.selection.seed = Some(7);
    config
}
