// Search driver: time-bounded alternating-ply frontier expansion
//
// Each iteration grows one side's frontier one ply deeper. Between plies the
// frontier is deduplicated, scores are averaged upward and out-of-band siblings
// are pruned. When the deadline passes or the ply cap is reached, the selector
// picks the move.

use log::{debug, info, warn};
use rand::Rng;

use crate::backprop::backpropagate;
use crate::config::Config;
use crate::evaluator::{EvalStats, Evaluator};
use crate::frontier::{Frontier, NodeId};
use crate::pruning::prune;
use crate::rules::{with_move, with_path, GameRules};
use crate::selector::{predict_reply, select_root};
use crate::timer::Clock;

/// All mutable state of one decision
///
/// Created empty for every decision and dropped afterwards; nothing survives
/// into the next turn.
#[derive(Debug, Clone)]
pub struct SearchContext<M> {
    pub frontier: Frontier<M>,
    pub evaluator: Evaluator,
    pub stats: SearchStats,
}

impl<M: Clone> SearchContext<M> {
    pub fn new(config: &Config) -> Self {
        SearchContext {
            frontier: Frontier::new(),
            evaluator: Evaluator::new(
                config.weights.clone(),
                config.piece_values.clone(),
                &config.search,
            ),
            stats: SearchStats::default(),
        }
    }
}

/// Counters describing one decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Deepest ply whose expansion started
    pub plies: usize,
    /// True when the deadline cut a ply short
    pub interrupted: bool,
    pub expansions: usize,
    pub failed_expansions: usize,
    pub deduplicated: usize,
    pub pruned: usize,
    pub rescored: usize,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Deadline,
    MaxDepth,
    Exhausted,
}

/// How the returned move was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    /// Picked among root candidates within tolerance
    Search,
    /// Frontier was empty; first legal move
    FirstLegal,
    /// The position has no legal move
    NoMove,
}

/// Outcome of one decision call
#[derive(Debug, Clone)]
pub struct Decision<M> {
    pub chosen: Option<M>,
    pub eval: Option<f64>,
    /// Opponent reply the search expects (diagnostic only)
    pub predicted_reply: Option<M>,
    pub source: DecisionSource,
    pub stop: StopReason,
    pub stats: SearchStats,
    pub eval_stats: EvalStats,
    pub nodes_live: usize,
    pub nodes_created: usize,
    pub elapsed_ms: u64,
}

/// Runs decisions with a fixed configuration
pub struct SearchDriver<'a> {
    config: &'a Config,
}

impl<'a> SearchDriver<'a> {
    pub fn new(config: &'a Config) -> Self {
        SearchDriver { config }
    }

    /// Decides one move for the side to move in `rules`
    ///
    /// The position is unchanged when this returns. `rng` breaks ties among
    /// near-best root moves; pass a seeded generator for reproducible choices.
    pub fn decide<R, C, G>(&self, rules: &mut R, clock: &C, rng: &mut G) -> Decision<R::Move>
    where
        R: GameRules,
        C: Clock,
        G: Rng + ?Sized,
    {
        let ctx = SearchContext::new(self.config);
        let (ctx, stop) = self.run(ctx, rules, clock);
        self.conclude(ctx, stop, rules, clock, rng)
    }

    /// Grows the frontier until the deadline or the ply cap
    pub fn run<R, C>(
        &self,
        mut ctx: SearchContext<R::Move>,
        rules: &mut R,
        clock: &C,
    ) -> (SearchContext<R::Move>, StopReason)
    where
        R: GameRules,
        C: Clock,
    {
        let budget = self.config.timing.effective_budget_ms();
        let max_depth = self.config.search.max_depth;

        // The root ply always runs so that there is something to choose from
        if let Err(e) = self.expand_node(&mut ctx, rules, None) {
            warn!("Root expansion failed: {}", e);
            ctx.stats.failed_expansions += 1;
        }
        ctx.stats.deduplicated += ctx.frontier.dedupe();

        let mut ply = 0;
        let stop = loop {
            if clock.elapsed_ms() >= budget {
                break StopReason::Deadline;
            }
            if ply >= max_depth {
                break StopReason::MaxDepth;
            }

            ply += 1;
            ctx.stats.plies = ply;
            let completed = self.expand_ply(&mut ctx, rules, clock, ply);
            if !completed {
                ctx.stats.interrupted = true;
            }

            ctx.stats.deduplicated += ctx.frontier.dedupe();
            ctx.stats.rescored += backpropagate(&mut ctx.frontier, ply);
            if ply >= 2 {
                let tolerance = self.config.search.prune_tolerance_at(ply);
                ctx.stats.pruned += prune(&mut ctx.frontier, tolerance);
            }

            debug!(
                "Ply {}: {} live nodes ({} created), {}ms elapsed{}",
                ply,
                ctx.frontier.live_count(),
                ctx.frontier.created_count(),
                clock.elapsed_ms(),
                if completed { "" } else { " (interrupted)" }
            );

            if !completed {
                break StopReason::Deadline;
            }
            if ctx.frontier.at_depth(ply).next().is_none() {
                break StopReason::Exhausted;
            }
        };

        (ctx, stop)
    }

    /// Expands every live node of the previous ply; false when the deadline hit
    fn expand_ply<R, C>(&self, ctx: &mut SearchContext<R::Move>, rules: &mut R, clock: &C, ply: usize) -> bool
    where
        R: GameRules,
        C: Clock,
    {
        let budget = self.config.timing.effective_budget_ms();
        let parents: Vec<NodeId> = ctx.frontier.at_depth(ply - 1).map(|n| n.id).collect();

        for parent in parents {
            if let Err(e) = self.expand_node(ctx, rules, Some(parent)) {
                warn!("Skipping expansion of node {}: {}", parent, e);
                ctx.stats.failed_expansions += 1;
            }
            if clock.elapsed_ms() >= budget {
                return false;
            }
        }
        true
    }

    /// Scores all replies to `parent` (or to the root position) and keeps the best
    ///
    /// Replays the parent's move path on `rules` and unwinds it before returning.
    /// Returns the ids of the nodes created.
    pub fn expand_node<R>(
        &self,
        ctx: &mut SearchContext<R::Move>,
        rules: &mut R,
        parent: Option<NodeId>,
    ) -> Result<Vec<NodeId>, String>
    where
        R: GameRules,
    {
        let (path, parent_eval, ply) = match parent {
            Some(p) => {
                let node = ctx.frontier.node(p);
                (ctx.frontier.move_path(p), Some(node.eval), node.depth + 1)
            }
            None => (Vec::new(), None, 0),
        };
        let width = self.config.search.beam_width_at(ply);
        let evaluator = &mut ctx.evaluator;

        let mut scored = with_path(rules, &path, |r| {
            let replies = r.legal_moves();
            let mobility_before = replies.len();
            let mut scored = Vec::with_capacity(replies.len());

            for mv in replies {
                let outcome = with_move(r, &mv, |r| {
                    let eval = evaluator.evaluate(r, &mv, parent_eval, mobility_before);
                    Ok((eval, r.fingerprint()))
                });
                match outcome {
                    Ok((eval, fingerprint)) => scored.push((mv, eval, fingerprint)),
                    Err(e) => warn!("Dropping reply {:?}: {}", mv, e),
                }
            }
            Ok(scored)
        })?;

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(width);

        ctx.stats.expansions += 1;
        Ok(scored
            .into_iter()
            .map(|(mv, eval, fingerprint)| ctx.frontier.insert(mv, eval, parent, fingerprint))
            .collect())
    }

    /// Selects the move and fills in the decision report
    fn conclude<R, C, G>(
        &self,
        ctx: SearchContext<R::Move>,
        stop: StopReason,
        rules: &R,
        clock: &C,
        rng: &mut G,
    ) -> Decision<R::Move>
    where
        R: GameRules,
        C: Clock,
        G: Rng + ?Sized,
    {
        let tolerance = self.config.selection.tolerance;
        let frontier = &ctx.frontier;

        // Removing a root takes its whole subtree with it, so an empty root layer
        // means the opponent layer is empty as well.
        let (selection, source) = match select_root(frontier, tolerance, rng) {
            Some(sel) => (Some(sel), DecisionSource::Search),
            None => (None, DecisionSource::FirstLegal),
        };

        let (chosen, eval, predicted_reply, source) = match selection {
            Some(sel) => {
                let reply = predict_reply(frontier, sel.node, tolerance, rng).map(|r| r.mv);
                (Some(sel.mv), Some(sel.eval), reply, source)
            }
            None => match rules.legal_moves().into_iter().next() {
                Some(mv) => {
                    warn!("Search produced no candidates; playing the first legal move");
                    (Some(mv), None, None, source)
                }
                None => (None, None, None, DecisionSource::NoMove),
            },
        };

        let decision = Decision {
            chosen,
            eval,
            predicted_reply,
            source,
            stop,
            stats: ctx.stats,
            eval_stats: ctx.evaluator.stats(),
            nodes_live: frontier.live_count(),
            nodes_created: frontier.created_count(),
            elapsed_ms: clock.elapsed_ms(),
        };

        info!(
            "Decision: {:?} (eval: {:?}, expected reply: {:?}, plies: {}, nodes: {}/{}, memo hits: {}, stop: {:?}, {}ms)",
            decision.chosen,
            decision.eval,
            decision.predicted_reply,
            decision.stats.plies,
            decision.nodes_live,
            decision.nodes_created,
            decision.eval_stats.memo_hits,
            decision.stop,
            decision.elapsed_ms
        );

        decision
    }
}
