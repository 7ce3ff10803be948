// Score backpropagation by averaging over grandchildren
//
// Scores move up two plies at a time so that a node is always rescored from
// positions where the same side is to move again. The mean treats the retained
// replies as an uncertain distribution instead of assuming best counterplay.

use std::collections::BTreeMap;

use crate::frontier::{Frontier, NodeId};

/// Averages the live nodes at `depth` into their grandparents
///
/// Returns the number of grandparents rescored.
pub fn average_into_grandparents<M: Clone>(frontier: &mut Frontier<M>, depth: usize) -> usize {
    let mut groups: BTreeMap<NodeId, (f64, usize)> = BTreeMap::new();

    for node in frontier.at_depth(depth) {
        if let Some(grandparent) = frontier.grandparent(node.id) {
            let entry = groups.entry(grandparent).or_insert((0.0, 0));
            entry.0 += node.eval;
            entry.1 += 1;
        }
    }

    let rescored = groups.len();
    for (grandparent, (sum, count)) in groups {
        frontier.set_eval(grandparent, sum / count as f64);
    }
    rescored
}

/// Propagates the scores of a freshly expanded ply up towards the root
///
/// Walks `ply`, `ply - 2`, ... while at least two plies remain below.
pub fn backpropagate<M: Clone>(frontier: &mut Frontier<M>, ply: usize) -> usize {
    let mut rescored = 0;
    let mut depth = ply;
    while depth >= 2 {
        rescored += average_into_grandparents(frontier, depth);
        depth -= 2;
    }
    rescored
}
