// Tolerance band test and sibling pruning
//
// Pruning walks every sibling group (nodes sharing a parent, roots sharing
// none), tests the weakest members first against the group's best score and
// drops the first one outside the band together with its whole subtree. Passes
// repeat until nothing changes.

use std::collections::BTreeMap;

use crate::frontier::{Frontier, NodeId};

/// Shifted operands of the tolerance comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceCheck {
    pub adjusted: f64,
    pub best: f64,
}

impl ToleranceCheck {
    pub fn passes(&self) -> bool {
        self.adjusted > self.best
    }
}

/// Computes both sides of the band comparison
///
/// Negative candidates are lifted by 1.5x their magnitude on both operands
/// before the band `c * (1 + t) + 5` is applied.
pub fn tolerance_check(candidate: f64, best: f64, tolerance: f64) -> ToleranceCheck {
    let (mut candidate, mut best) = (candidate, best);
    if candidate < 0.0 {
        let inc = candidate.abs() * 1.5;
        best += inc;
        candidate += inc;
    }

    ToleranceCheck {
        adjusted: candidate * (1.0 + tolerance) + 5.0,
        best,
    }
}

/// True when `candidate` is close enough to `best` to be retained or selected
pub fn within_tolerance(candidate: f64, best: f64, tolerance: f64) -> bool {
    tolerance_check(candidate, best, tolerance).passes()
}

/// Live sibling groups keyed by parent, ordered by parent id
fn sibling_groups<M: Clone>(frontier: &Frontier<M>) -> BTreeMap<Option<NodeId>, Vec<NodeId>> {
    let mut groups: BTreeMap<Option<NodeId>, Vec<NodeId>> = BTreeMap::new();
    for node in frontier.live_nodes() {
        groups.entry(node.parent).or_default().push(node.id);
    }
    groups
}

/// First group member failing the band, weakest first
fn first_outlier<M: Clone>(frontier: &Frontier<M>, members: &[NodeId], tolerance: f64) -> Option<NodeId> {
    let mut live: Vec<NodeId> = members
        .iter()
        .copied()
        .filter(|&id| frontier.is_live(id))
        .collect();
    if live.len() < 2 {
        return None;
    }

    let best = live
        .iter()
        .map(|&id| frontier.node(id).eval)
        .fold(f64::NEG_INFINITY, f64::max);

    live.sort_by(|&a, &b| frontier.node(a).eval.total_cmp(&frontier.node(b).eval));
    live.into_iter()
        .find(|&id| !within_tolerance(frontier.node(id).eval, best, tolerance))
}

/// Removes out-of-band siblings until a fixed point is reached
///
/// Returns the number of nodes removed, descendants included.
pub fn prune<M: Clone>(frontier: &mut Frontier<M>, tolerance: f64) -> usize {
    let mut removed_total = 0;

    loop {
        let mut removed = 0;
        for members in sibling_groups(frontier).into_values() {
            if let Some(outlier) = first_outlier(frontier, &members, tolerance) {
                removed += frontier.remove_subtree(outlier);
            }
        }

        if removed == 0 {
            break;
        }
        removed_total += removed;
    }

    removed_total
}
