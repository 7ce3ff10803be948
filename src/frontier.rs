// Frontier store: an arena of scored move nodes split by side parity
//
// Nodes refer to their parent by arena index. Nothing is ever freed during a
// decision; removal tombstones a node and its whole descendant subtree, so ids
// stay valid for as long as the frontier lives.

use std::collections::HashSet;

/// Stable index of a node inside its frontier
pub type NodeId = usize;

/// One hypothetical move applied at some ply
#[derive(Debug, Clone)]
pub struct MoveNode<M> {
    pub id: NodeId,
    pub mv: M,
    pub eval: f64,
    /// Plies from the root position; root moves have depth 0
    pub depth: usize,
    pub parent: Option<NodeId>,
    /// Fingerprint of the position reached after `mv`
    pub fingerprint: u64,
    live: bool,
}

impl<M> MoveNode<M> {
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Collection this node belongs to: 0 for the searching side, 1 for the opponent
    pub fn side_index(&self) -> usize {
        self.depth % 2
    }
}

/// Two ordered collections of move nodes forming an implicit search tree
#[derive(Debug, Clone)]
pub struct Frontier<M> {
    nodes: Vec<MoveNode<M>>,
    children: Vec<Vec<NodeId>>,
    sides: [Vec<NodeId>; 2],
    live_count: usize,
}

impl<M> Default for Frontier<M> {
    fn default() -> Self {
        Frontier {
            nodes: Vec::new(),
            children: Vec::new(),
            sides: [Vec::new(), Vec::new()],
            live_count: 0,
        }
    }
}

impl<M: Clone> Frontier<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node below `parent` (or at the root) and returns its id
    ///
    /// Panics if `parent` is not an id of this frontier.
    pub fn insert(&mut self, mv: M, eval: f64, parent: Option<NodeId>, fingerprint: u64) -> NodeId {
        let depth = parent.map_or(0, |p| self.nodes[p].depth + 1);
        let id = self.nodes.len();

        self.nodes.push(MoveNode {
            id,
            mv,
            eval,
            depth,
            parent,
            fingerprint,
            live: true,
        });
        self.children.push(Vec::new());
        if let Some(p) = parent {
            self.children[p].push(id);
        }
        self.sides[depth % 2].push(id);
        self.live_count += 1;
        id
    }

    pub fn node(&self, id: NodeId) -> &MoveNode<M> {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&MoveNode<M>> {
        self.nodes.get(id)
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.live)
    }

    /// Overwrites a node's score (backpropagation is the only caller)
    pub fn set_eval(&mut self, id: NodeId, eval: f64) {
        self.nodes[id].eval = eval;
    }

    /// Live nodes of one collection in insertion order
    pub fn side(&self, index: usize) -> impl Iterator<Item = &MoveNode<M>> + '_ {
        self.sides[index % 2]
            .iter()
            .map(move |&id| &self.nodes[id])
            .filter(|n| n.live)
    }

    /// Live nodes at an exact depth in insertion order
    pub fn at_depth(&self, depth: usize) -> impl Iterator<Item = &MoveNode<M>> + '_ {
        self.side(depth % 2).filter(move |n| n.depth == depth)
    }

    /// Live nodes across both collections in creation order
    pub fn live_nodes(&self) -> impl Iterator<Item = &MoveNode<M>> + '_ {
        self.nodes.iter().filter(|n| n.live)
    }

    /// Live direct children of a node
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &MoveNode<M>> + '_ {
        self.children[id]
            .iter()
            .map(move |&c| &self.nodes[c])
            .filter(|n| n.live)
    }

    /// Grandparent of a node, if it is at least two plies deep
    pub fn grandparent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent.and_then(|p| self.nodes[p].parent)
    }

    /// Root ancestor (depth 0) of a node
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(p) = self.nodes[current].parent {
            current = p;
        }
        current
    }

    /// Moves from the root position down to and including `id`
    pub fn move_path(&self, id: NodeId) -> Vec<M> {
        let mut path = Vec::with_capacity(self.nodes[id].depth + 1);
        let mut current = Some(id);
        while let Some(c) = current {
            path.push(self.nodes[c].mv.clone());
            current = self.nodes[c].parent;
        }
        path.reverse();
        path
    }

    /// Tombstones a node and every transitive descendant in both collections
    ///
    /// Returns how many live nodes were removed.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        let mut removed = 0;
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            let node = &mut self.nodes[current];
            if !node.live {
                continue;
            }
            node.live = false;
            removed += 1;
            stack.extend(self.children[current].iter().copied());
        }

        self.live_count -= removed;
        removed
    }

    /// Collapses nodes that reach the same position within each collection
    ///
    /// The first-seen node (lowest id) is kept. Ancestors always have lower ids than
    /// their descendants, so a kept representative can no longer be removed as the
    /// descendant of a later duplicate.
    pub fn dedupe(&mut self) -> usize {
        let mut seen: [HashSet<u64>; 2] = [HashSet::new(), HashSet::new()];
        let mut removed = 0;

        for id in 0..self.nodes.len() {
            let node = &self.nodes[id];
            if !node.live {
                continue;
            }
            if !seen[node.side_index()].insert(node.fingerprint) {
                removed += self.remove_subtree(id);
            }
        }
        removed
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// Nodes ever created, including removed ones
    pub fn created_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest ply holding a live node
    pub fn max_live_depth(&self) -> Option<usize> {
        self.live_nodes().map(|n| n.depth).max()
    }

    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Frontier<&'static str>, [NodeId; 5]) {
        let mut f = Frontier::new();
        let a = f.insert("a", 1.0, None, 10);
        let b = f.insert("b", 2.0, None, 11);
        let a1 = f.insert("a1", 3.0, Some(a), 20);
        let a1x = f.insert("a1x", 4.0, Some(a1), 30);
        let b1 = f.insert("b1", 5.0, Some(b), 21);
        (f, [a, b, a1, a1x, b1])
    }

    #[test]
    fn test_depth_and_parity_follow_parent() {
        let (f, [a, _, a1, a1x, _]) = sample();
        assert_eq!(f.node(a).depth, 0);
        assert_eq!(f.node(a1).depth, 1);
        assert_eq!(f.node(a1x).depth, 2);
        assert_eq!(f.node(a1).side_index(), 1);
        assert_eq!(f.side(0).count(), 3);
        assert_eq!(f.side(1).count(), 2);
    }

    #[test]
    fn test_move_path_root_to_node() {
        let (f, [_, _, _, a1x, _]) = sample();
        assert_eq!(f.move_path(a1x), vec!["a", "a1", "a1x"]);
        assert_eq!(f.grandparent(a1x), Some(0));
    }

    #[test]
    fn test_remove_subtree_crosses_collections() {
        let (mut f, [a, b, a1, a1x, b1]) = sample();
        assert_eq!(f.remove_subtree(a), 3);
        assert!(!f.is_live(a) && !f.is_live(a1) && !f.is_live(a1x));
        assert!(f.is_live(b) && f.is_live(b1));
        assert_eq!(f.live_count(), 2);
        assert_eq!(f.created_count(), 5);

        // Removing an already removed subtree is a no-op
        assert_eq!(f.remove_subtree(a1), 0);
    }

    #[test]
    fn test_dedupe_keeps_first_seen() {
        let mut f = Frontier::new();
        let a = f.insert("a", 1.0, None, 7);
        let b = f.insert("b", 2.0, None, 7);
        let b1 = f.insert("b1", 0.0, Some(b), 8);
        // Same fingerprint on the other side is not a duplicate
        let a1 = f.insert("a1", 0.0, Some(a), 7);

        assert_eq!(f.dedupe(), 2);
        assert!(f.is_live(a));
        assert!(!f.is_live(b) && !f.is_live(b1));
        assert!(f.is_live(a1));
    }

    #[test]
    fn test_root_of_and_children() {
        let (f, [a, _, a1, a1x, _]) = sample();
        assert_eq!(f.root_of(a1x), a);
        assert_eq!(f.children(a).map(|n| n.id).collect::<Vec<_>>(), vec![a1]);
        assert_eq!(f.max_live_depth(), Some(2));
    }
}
