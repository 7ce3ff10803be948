// Final move choice among near-best root candidates
//
// The best score defines a band; every candidate inside it is equally likely to
// be played. Randomness comes from the caller so that tests and replays can
// pin it with a seed.

use rand::Rng;

use crate::frontier::{Frontier, MoveNode, NodeId};
use crate::pruning::within_tolerance;

/// A chosen node together with its move and score
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<M> {
    pub node: NodeId,
    pub mv: M,
    pub eval: f64,
}

/// Picks uniformly among `candidates` that are within `tolerance` of the best
pub fn select_among<'a, M, I, G>(candidates: I, tolerance: f64, rng: &mut G) -> Option<Selection<M>>
where
    M: Clone + 'a,
    I: IntoIterator<Item = &'a MoveNode<M>>,
    G: Rng + ?Sized,
{
    let candidates: Vec<&MoveNode<M>> = candidates.into_iter().collect();
    let best = candidates
        .iter()
        .map(|n| n.eval)
        .max_by(|a, b| a.total_cmp(b))?;

    let eligible: Vec<&MoveNode<M>> = candidates
        .into_iter()
        .filter(|n| n.eval == best || within_tolerance(n.eval, best, tolerance))
        .collect();

    let pick = eligible[rng.random_range(0..eligible.len())];
    Some(Selection {
        node: pick.id,
        mv: pick.mv.clone(),
        eval: pick.eval,
    })
}

/// Chooses among the live root moves
pub fn select_root<M, G>(frontier: &Frontier<M>, tolerance: f64, rng: &mut G) -> Option<Selection<M>>
where
    M: Clone,
    G: Rng + ?Sized,
{
    select_among(frontier.at_depth(0), tolerance, rng)
}

/// Opponent reply the search expects after `root`
pub fn predict_reply<M, G>(frontier: &Frontier<M>, root: NodeId, tolerance: f64, rng: &mut G) -> Option<Selection<M>>
where
    M: Clone,
    G: Rng + ?Sized,
{
    select_among(frontier.children(root), tolerance, rng)
}
