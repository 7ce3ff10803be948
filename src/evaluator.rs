// Heuristic move evaluator with a per-decision transposition memo
//
// The evaluator scores the position reached by a candidate move. It is called
// with the candidate already applied; any probing it does on top of that (the
// opponent's replies, a passed turn) is undone before it returns, on success and
// on failure alike.

use log::warn;
use std::collections::HashMap;

use crate::config::{PieceValuesConfig, SearchConfig, WeightsConfig};
use crate::rules::{file_of, with_move, GameRules, MoveDescriptor, PieceKind};

/// Evaluator counters for one decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalStats {
    pub evaluations: usize,
    pub memo_hits: usize,
    pub draws: usize,
    pub failures: usize,
}

/// Scores candidate moves and memoizes results by position fingerprint
#[derive(Debug, Clone)]
pub struct Evaluator {
    weights: WeightsConfig,
    pieces: PieceValuesConfig,
    draw_halfmove_limit: u32,
    memo: HashMap<u64, f64>,
    stats: EvalStats,
}

impl Evaluator {
    pub fn new(weights: WeightsConfig, pieces: PieceValuesConfig, search: &SearchConfig) -> Self {
        Evaluator {
            weights,
            pieces,
            draw_halfmove_limit: search.draw_halfmove_limit,
            memo: HashMap::new(),
            stats: EvalStats::default(),
        }
    }

    /// Scores the position reached by `mv`, which must already be applied
    ///
    /// `parent_eval` is the score of the move that led to the position `mv` was
    /// played from (`None` at the root). `mobility_before` is the number of legal
    /// moves the mover had before playing `mv`. Failures are logged and score 0.
    pub fn evaluate<R: GameRules>(
        &mut self,
        rules: &mut R,
        mv: &R::Move,
        parent_eval: Option<f64>,
        mobility_before: usize,
    ) -> f64 {
        self.stats.evaluations += 1;
        match self.try_evaluate(rules, mv, parent_eval, mobility_before) {
            Ok(score) => score,
            Err(e) => {
                self.stats.failures += 1;
                warn!("Evaluation of {:?} failed, scoring it neutral: {}", mv, e);
                0.0
            }
        }
    }

    fn try_evaluate<R: GameRules>(
        &mut self,
        rules: &mut R,
        mv: &R::Move,
        parent_eval: Option<f64>,
        mobility_before: usize,
    ) -> Result<f64, String> {
        if self.is_terminal_draw(rules) {
            self.stats.draws += 1;
            return Ok(0.0);
        }

        let fingerprint = rules.fingerprint();
        if let Some(&score) = self.memo.get(&fingerprint) {
            self.stats.memo_hits += 1;
            return Ok(score);
        }

        let w = &self.weights;
        let mut eval = match parent_eval {
            Some(parent) => -w.inherit_factor * parent,
            None => w.neutral_root_eval,
        };

        if rules.is_checkmate() {
            eval += w.checkmate;
        }
        eval += self.move_features(rules, mv);
        eval += self.threat_features(rules, mv)?;
        if w.null_move_probe {
            eval += self.lookahead_features(rules, mobility_before)?;
        }

        self.memo.insert(fingerprint, eval);
        Ok(eval)
    }

    fn is_terminal_draw<R: GameRules>(&self, rules: &R) -> bool {
        rules.is_draw()
            || rules.is_insufficient_material()
            || rules.is_repetition()
            || rules.halfmove_clock() >= self.draw_halfmove_limit
    }

    /// Bonuses that depend only on the move itself
    fn move_features<R: GameRules>(&self, rules: &R, mv: &R::Move) -> f64 {
        let w = &self.weights;
        let mut eval = 0.0;

        if let Some(captured) = mv.captured_piece() {
            eval += w.capture * self.pieces.value_of(captured);
        }
        if mv.is_castle() {
            eval += w.castle;
        }
        if mv.is_promotion() {
            eval += w.promotion;
        }

        match mv.moved_piece() {
            PieceKind::King => eval -= w.king_move_penalty,
            PieceKind::Pawn => {
                // The opponent is to move now; look for their pawns on our file
                let file = file_of(mv.target_square());
                let blocked = rules
                    .piece_squares(PieceKind::Pawn, rules.side_to_move())
                    .into_iter()
                    .any(|sq| file_of(sq) == file);
                if !blocked {
                    eval += w.passed_pawn;
                }
            }
            _ => {}
        }

        eval
    }

    /// Opponent mobility, capture threats, hanging pieces and allowed mates
    fn threat_features<R: GameRules>(&self, rules: &mut R, mv: &R::Move) -> Result<f64, String> {
        let w = &self.weights;
        let replies = rules.legal_moves();
        let mut eval = -(replies.len() as f64) * w.mobility;
        let mut mate_allowed = false;

        for reply in &replies {
            if let Some(target) = reply.captured_piece() {
                let value = self.pieces.value_of(target);
                if reply.target_square() == mv.target_square() {
                    eval -= w.hang * value;
                }
                eval -= w.threat * value;
            }

            if !mate_allowed {
                mate_allowed = with_move(rules, reply, |r| Ok(r.is_checkmate()))?;
            }
        }

        if mate_allowed {
            eval -= w.checkmate;
        }
        Ok(eval)
    }

    /// Passes the turn to measure our own continuation one ply further
    ///
    /// Not available when passing is illegal (we would be giving check); the term
    /// is then zero.
    fn lookahead_features<R: GameRules>(&self, rules: &mut R, mobility_before: usize) -> Result<f64, String> {
        if rules.make_null_move().is_err() {
            return Ok(0.0);
        }
        let own_moves = rules.legal_moves();
        rules.undo_null_move()?;

        let w = &self.weights;
        let mut eval = (own_moves.len() as f64 - mobility_before as f64) * w.mobility;
        for next in &own_moves {
            if let Some(target) = next.captured_piece() {
                eval += w.threat * self.pieces.value_of(target);
            }
        }
        Ok(eval)
    }

    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    pub fn memoized(&self, fingerprint: u64) -> Option<f64> {
        self.memo.get(&fingerprint).copied()
    }

    pub fn stats(&self) -> EvalStats {
        self.stats
    }

    /// Forgets everything learned during the previous decision
    pub fn clear(&mut self) {
        self.memo.clear();
        self.stats = EvalStats::default();
    }
}
