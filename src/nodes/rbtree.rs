// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Borrow;
use std::ops::{Index, IndexMut};

use rand_core::RngCore;

use crate::util::unit_f64;

/// Stable arena index of a node. Never dangles while the node is attached
/// to the tree; freed ids are recycled through the free list.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A node in the weighted red-black tree.
///
/// Leaves (`children == None`) hold one element: `min_key` is the element's
/// own key and `weight` its own weight. Internal nodes hold no element; they
/// carry routing summaries over their subtree:
/// * `min_key == left.min_key`
/// * `weight == left.weight + right.weight`
/// * `count == left.count + right.count`
///
/// Colors live on leaves as well as internal nodes: a split produces two red
/// leaf children, and both fixup passes inspect and recolor leaves.
#[derive(Debug, Clone)]
pub(crate) struct Node<K> {
    pub(crate) min_key: K,
    pub(crate) weight: f64,
    pub(crate) count: usize,
    pub(crate) black: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Option<(NodeId, NodeId)>,
}

impl<K> Node<K> {
    /// A fresh red leaf.
    fn leaf(key: K, weight: f64, parent: Option<NodeId>) -> Self {
        Node {
            min_key: key,
            weight,
            count: 1,
            black: false,
            parent,
            children: None,
        }
    }
}

/// The weighted red-black tree: an arena of nodes plus the root id.
///
/// Ownership is flat (the arena owns every node); `parent` and `children`
/// links are indices, so the parent back-reference cannot form a cycle of
/// owners. A freed slot keeps its last key alive until the slot is reused
/// or the arena is dropped.
#[derive(Debug, Clone)]
pub(crate) struct Tree<K> {
    nodes: Vec<Node<K>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
}

impl<K> Index<NodeId> for Tree<K> {
    type Output = Node<K>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<K> {
        &self.nodes[id.idx()]
    }
}

impl<K> IndexMut<NodeId> for Tree<K> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
        &mut self.nodes[id.idx()]
    }
}

impl<K> Tree<K> {
    pub(crate) fn new() -> Self {
        Tree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
        }
    }

    /// Number of elements, O(1) from the root summary.
    pub(crate) fn len(&self) -> usize {
        self.root.map(|r| self[r].count).unwrap_or(0)
    }

    /// Sum of all element weights, O(1) from the root summary.
    pub(crate) fn total_weight(&self) -> f64 {
        self.root.map(|r| self[r].weight).unwrap_or(0.0)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
    }

    fn alloc(&mut self, node: Node<K>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self[id] = node;
                id
            }
            None => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(node);
                id
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.free.push(id);
    }

    /// The two children of an internal node.
    #[inline]
    fn branch(&self, n: NodeId) -> (NodeId, NodeId) {
        match self[n].children {
            Some(children) => children,
            None => unreachable!(),
        }
    }

    fn sibling(&self, n: NodeId) -> NodeId {
        let p = match self[n].parent {
            Some(p) => p,
            None => unreachable!(),
        };
        let (left, right) = self.branch(p);
        if left == n {
            right
        } else {
            left
        }
    }
}

impl<K: Ord + Clone> Tree<K> {
    /// Descends to the leaf whose key range covers `key`. The caller decides
    /// membership by comparing the leaf's key.
    ///
    /// Routing rule: go right iff `right.min_key <= key`.
    fn leaf_below<BK>(&self, root: NodeId, key: &BK) -> NodeId
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        let mut cur = root;
        while let Some((left, right)) = self[cur].children {
            cur = if self[right].min_key.borrow() <= key {
                right
            } else {
                left
            };
        }
        cur
    }

    pub(crate) fn get<BK>(&self, key: &BK) -> Option<f64>
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        let root = self.root?;
        let leaf = self.leaf_below(root, key);
        if self[leaf].min_key.borrow() == key {
            Some(self[leaf].weight)
        } else {
            None
        }
    }

    /// Insert or update. Returns the previous weight on update. The weight
    /// must already be validated by the caller.
    pub(crate) fn insert(&mut self, key: K, weight: f64) -> Option<f64> {
        let root = match self.root {
            Some(root) => root,
            None => {
                let leaf = self.alloc(Node::leaf(key, weight, None));
                self[leaf].black = true;
                self.root = Some(leaf);
                return None;
            }
        };
        let leaf = self.leaf_below(root, &key);
        if self[leaf].min_key == key {
            let prev = std::mem::replace(&mut self[leaf].weight, weight);
            self.refresh_weights(self[leaf].parent);
            Some(prev)
        } else {
            self.add_entry(root, key, weight);
            // A recolor cascade can reach the root; the root is always black.
            self[root].black = true;
            None
        }
    }

    /// Structural insertion of a key known to be absent: descend to the
    /// covering leaf, updating the summaries along the path, then split it.
    fn add_entry(&mut self, root: NodeId, key: K, weight: f64) {
        let mut cur = root;
        while let Some((left, right)) = self[cur].children {
            self[cur].count += 1;
            self[cur].weight += weight;
            if key < self[cur].min_key {
                self[cur].min_key = key.clone();
            }
            cur = if self[right].min_key <= key { right } else { left };
        }
        self.split(cur, key, weight);
    }

    /// Turns the leaf `at` into an internal node with two fresh red leaf
    /// children, the smaller key on the left, then restores the red-black
    /// invariants walking upward.
    fn split(&mut self, at: NodeId, key: K, weight: f64) {
        let old_key = self[at].min_key.clone();
        let old_weight = self[at].weight;
        let ((lk, lw), (rk, rw)) = if key < old_key {
            ((key, weight), (old_key, old_weight))
        } else {
            ((old_key, old_weight), (key, weight))
        };
        let left = self.alloc(Node::leaf(lk, lw, Some(at)));
        let right = self.alloc(Node::leaf(rk, rw, Some(at)));
        // The node keeps the collapsed leaf's color, so black heights
        // through this position are unchanged.
        self[at].min_key = self[left].min_key.clone();
        self[at].weight = lw + rw;
        self[at].count = 2;
        self[at].children = Some((left, right));
        self.rebalance(left);
    }

    /// Red-black insertion fixup, run from a child of the freshly reddened
    /// node. Each recursive step moves two levels toward the root.
    fn rebalance(&mut self, n: NodeId) {
        let p = match self[n].parent {
            Some(p) => p,
            None => return,
        };
        if self[p].black {
            return;
        }
        let g = match self[p].parent {
            Some(g) => g,
            None => {
                // One level below the root: blacken the parent and stop.
                self[p].black = true;
                return;
            }
        };
        let uncle = self.sibling(p);
        if !self[uncle].black {
            // Red uncle: push the grandparent's black down and recurse.
            self[g].black = false;
            self[p].black = true;
            self[uncle].black = true;
            self.rebalance(g);
        } else if !self[self.sibling(n)].black {
            // Black uncle, red sibling: recolor, rotate at the grandparent
            // on the parent's side, and recurse from there.
            self[p].black = true;
            let (gl, _) = self.branch(g);
            if gl == p {
                let (pl, _) = self.branch(p);
                self[pl].black = true;
                self.rotate_right(g);
            } else {
                let (_, pr) = self.branch(p);
                self[pr].black = true;
                self.rotate_left(g);
            }
            self[g].black = false;
            self.rebalance(g);
        } else {
            // Black uncle, black sibling: one of the four rotation shapes.
            let (pl, pr) = self.branch(p);
            let (gl, gr) = self.branch(g);
            if n == pl && p == gl {
                self.rotate_right(g);
            } else if n == pr && p == gr {
                self.rotate_left(g);
            } else if n == pr {
                self.rotate_left(p);
                self.rotate_right(g);
            } else {
                self.rotate_right(p);
                self.rotate_left(g);
            }
        }
    }

    // Perform these operations:
    //      rotate_right                rotate_left
    //      N    -->    N               N    <--    N
    //     / \   -->   / \             / \   <--   / \
    //    X   C  -->  A   X           X   C  <--  A   X
    //   / \     -->     / \         / \     <--     / \
    //  A   B    -->    B   C       A   B    <--    B   C
    //
    // The subtrees A, B, C are reused in place; only X's summaries are
    // recomputed, from its post-rotation children. O(1).
    fn rotate_right(&mut self, n: NodeId) {
        let (x, c) = self.branch(n);
        let (a, b) = self.branch(x);
        self[n].children = Some((a, x));
        self[x].children = Some((b, c));
        self[x].count = self[b].count + self[c].count;
        self[x].weight = self[b].weight + self[c].weight;
        self[x].min_key = self[b].min_key.clone();
        self[a].parent = Some(n);
        self[c].parent = Some(x);
    }

    fn rotate_left(&mut self, n: NodeId) {
        let (a, x) = self.branch(n);
        let (b, c) = self.branch(x);
        self[n].children = Some((x, c));
        self[x].children = Some((a, b));
        self[x].count = self[a].count + self[b].count;
        self[x].weight = self[a].weight + self[b].weight;
        self[x].min_key = self[a].min_key.clone();
        self[c].parent = Some(n);
        self[a].parent = Some(x);
    }

    /// Recomputes `weight` up the ancestor chain after a weight update.
    fn refresh_weights(&mut self, mut cur: Option<NodeId>) {
        while let Some(n) = cur {
            let (left, right) = self.branch(n);
            self[n].weight = self[left].weight + self[right].weight;
            cur = self[n].parent;
        }
    }

    /// Recomputes `weight` and `min_key` up the ancestor chain after an
    /// unsplit changed the shape below.
    fn refresh_summaries(&mut self, from: NodeId) {
        let mut cur = Some(from);
        while let Some(n) = cur {
            let (left, right) = self.branch(n);
            self[n].weight = self[left].weight + self[right].weight;
            self[n].min_key = self[left].min_key.clone();
            cur = self[n].parent;
        }
    }

    /// Removes `key` and returns its weight, or `None` when absent (in which
    /// case nothing was mutated).
    pub(crate) fn remove<BK>(&mut self, key: &BK) -> Option<f64>
    where
        BK: Ord + ?Sized,
        K: Borrow<BK>,
    {
        let root = self.root?;
        let leaf = self.leaf_below(root, key);
        if self[leaf].min_key.borrow() != key {
            return None;
        }
        let removed = self[leaf].weight;
        if leaf == root {
            self.release(leaf);
            self.root = None;
            return Some(removed);
        }
        let mut cur = root;
        while let Some((left, right)) = self[cur].children {
            self[cur].count -= 1;
            cur = if self[right].min_key.borrow() <= key {
                right
            } else {
                left
            };
        }
        debug_assert_eq!(cur, leaf);
        let parent = match self[leaf].parent {
            Some(p) => p,
            None => unreachable!(),
        };
        let survivor = self.sibling(leaf);
        self.unsplit(parent, survivor, leaf);
        Some(removed)
    }

    /// Collapses `parent` away: it takes on the shape and summaries of the
    /// surviving child, keeping its own color, and the survivor's children
    /// are re-parented onto it. The inverse of `split`.
    fn unsplit(&mut self, parent: NodeId, survivor: NodeId, deleted: NodeId) {
        let nuked_black = self[survivor].black;
        self[parent].min_key = self[survivor].min_key.clone();
        self[parent].weight = self[survivor].weight;
        self[parent].children = self[survivor].children;
        debug_assert_eq!(self[parent].count, self[survivor].count);
        if let Some((left, right)) = self[parent].children {
            self[left].parent = Some(parent);
            self[right].parent = Some(parent);
        }
        self.release(survivor);
        self.release(deleted);
        if let Some(up) = self[parent].parent {
            self.refresh_summaries(up);
        }
        self.unsplit_fix(parent, nuked_black);
    }

    /// Deletion fixup entry point. `nuked_black` is the color lost from every
    /// path through the collapsed position.
    fn unsplit_fix(&mut self, n: NodeId, nuked_black: bool) {
        if self[n].parent.is_none() {
            self[n].black = true;
        } else if !nuked_black {
            // A red node's removal never unbalances black heights.
        } else if !self[n].black {
            self[n].black = true;
        } else {
            self.resolve_double_black(n);
        }
    }

    /// Resolves a double-black deficiency at `n`, walking upward by sibling
    /// and nephew color. `n`'s sibling is always internal here: the sibling
    /// side carries one more black than the deficient side.
    fn resolve_double_black(&mut self, n: NodeId) {
        if !self[n].black {
            self[n].black = true;
            return;
        }
        let p = match self[n].parent {
            Some(p) => p,
            // The deficiency is absorbed at the root.
            None => return,
        };
        let s = self.sibling(n);
        if !self[s].black {
            // Red sibling: rotate it above and retry with a black sibling.
            if self.branch(p).0 == n {
                self.rotate_left(p);
            } else {
                self.rotate_right(p);
            }
            self.resolve_double_black(n);
            return;
        }
        let (sl, sr) = self.branch(s);
        if self[sl].black && self[sr].black {
            // Black sibling with black children: push the deficiency up.
            self[s].black = false;
            self.resolve_double_black(p);
        } else if self.branch(p).0 == n {
            if !self[sr].black {
                // Red far nephew: blacken it and rotate once.
                self[sr].black = true;
                self.rotate_left(p);
            } else {
                // Only the near nephew is red: rotate it outward first.
                self.rotate_right(s);
                self.resolve_double_black(n);
            }
        } else {
            if !self[sl].black {
                self[sl].black = true;
                self.rotate_right(p);
            } else {
                self.rotate_left(s);
                self.resolve_double_black(n);
            }
        }
    }

    /// Weighted random descent: at each internal node, go left with
    /// probability `left.weight / weight`. Returns `None` for an empty tree
    /// or a zero total weight.
    pub(crate) fn sample<R>(&self, rng: &mut R) -> Option<&K>
    where
        R: RngCore + ?Sized,
    {
        let root = self.root?;
        if self[root].weight <= 0.0 {
            return None;
        }
        let mut cur = root;
        while let Some((left, right)) = self[cur].children {
            cur = if unit_f64(rng) < self[left].weight / self[cur].weight {
                left
            } else {
                right
            };
        }
        Some(&self[cur].min_key)
    }

    /// Smallest key, O(1) from the root summary.
    pub(crate) fn min_key(&self) -> Option<&K> {
        self.root.map(|root| &self[root].min_key)
    }

    /// Largest key, O(log n).
    pub(crate) fn max_key(&self) -> Option<&K> {
        let mut cur = self.root?;
        while let Some((_, right)) = self[cur].children {
            cur = right;
        }
        Some(&self[cur].min_key)
    }

    pub(crate) fn iter(&self) -> LeafIter<'_, K> {
        LeafIter {
            tree: self,
            stack: self.root.into_iter().collect(),
            remaining: self.len(),
        }
    }

    pub(crate) fn into_leaves(self) -> IntoLeafIter<K> {
        let stack = self.root.into_iter().collect();
        let remaining = self.len();
        IntoLeafIter {
            tree: self,
            stack,
            remaining,
        }
    }

    /// Verifies every structural invariant, panicking with a description of
    /// the first violation. Test and diagnostic use only.
    pub(crate) fn check(&self) {
        let root = match self.root {
            Some(root) => root,
            None => return,
        };
        assert!(self[root].parent.is_none(), "root must not have a parent");
        assert!(self[root].black, "root must be black");
        self.check_node(root);
    }

    /// Returns the black height of the subtree and its largest key.
    fn check_node(&self, n: NodeId) -> (usize, &K) {
        let node = &self[n];
        assert!(node.weight >= 0.0, "negative weight at node {:?}", n);
        let (left, right) = match node.children {
            None => {
                assert_eq!(node.count, 1, "leaf count must be 1 at node {:?}", n);
                return (node.black as usize, &node.min_key);
            }
            Some(children) => children,
        };
        assert_eq!(self[left].parent, Some(n), "broken parent link at {:?}", left);
        assert_eq!(self[right].parent, Some(n), "broken parent link at {:?}", right);
        if !node.black {
            assert!(
                self[left].black && self[right].black,
                "red node {:?} has a red child",
                n
            );
        }
        let (left_bh, left_max) = self.check_node(left);
        let (right_bh, right_max) = self.check_node(right);
        assert_eq!(
            left_bh, right_bh,
            "black height mismatch below node {:?}",
            n
        );
        assert!(
            node.min_key == self[left].min_key,
            "min_key does not match the left subtree at node {:?}",
            n
        );
        assert!(
            *left_max < self[right].min_key,
            "left subtree crosses the routing boundary at node {:?}",
            n
        );
        assert_eq!(
            node.count,
            self[left].count + self[right].count,
            "count summary out of date at node {:?}",
            n
        );
        let sum = self[left].weight + self[right].weight;
        assert!(
            (node.weight - sum).abs() <= 1e-9 * sum.abs().max(1.0),
            "weight summary out of date at node {:?}: {} vs {}",
            n,
            node.weight,
            sum
        );
        (left_bh + node.black as usize, right_max)
    }

    /// Edges from `n` to its deepest leaf.
    pub(crate) fn depth(&self, n: NodeId) -> usize {
        match self[n].children {
            None => 0,
            Some((left, right)) => 1 + self.depth(left).max(self.depth(right)),
        }
    }

    pub(crate) fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Draws the tree shape as ASCII art: `o` for red nodes, `*` for black,
    /// leaves on the bottom row. Purely diagnostic.
    pub(crate) fn render(&self) -> String {
        let root = match self.root {
            Some(root) => root,
            None => return String::from("(empty)\n"),
        };
        let width = self[root].count * 4;
        let depth = self.depth(root);
        let mut picture = vec![vec![b' '; width]; depth + 1];
        let centre = self.draw(root, &mut picture, 0);
        let mut out = " ".repeat(centre);
        out.push_str("|\n");
        for row in picture.iter().rev() {
            out.push_str(String::from_utf8_lossy(row).trim_end());
            out.push('\n');
        }
        out
    }

    /// Returns the centre x-coordinate of `n` in the picture.
    fn draw(&self, n: NodeId, picture: &mut [Vec<u8>], offset: usize) -> usize {
        let depth = self.depth(n);
        let glyph = if self[n].black { b'*' } else { b'o' };
        if depth == 0 {
            picture[0][4 * offset] = glyph;
            return 4 * offset;
        }
        let (left, right) = self.branch(n);
        let left_centre = self.draw(left, picture, offset);
        let right_centre = self.draw(right, picture, offset + self[left].count);
        let centre = (left_centre + right_centre) / 2;
        for i in left_centre..right_centre {
            picture[depth][i] = b'-';
        }
        for row in picture.iter_mut().take(depth).skip(self.depth(left) + 1) {
            row[left_centre] = b'|';
        }
        for row in picture.iter_mut().take(depth).skip(self.depth(right) + 1) {
            row[right_centre] = b'|';
        }
        picture[depth][centre] = glyph;
        picture[depth][left_centre] = b'/';
        picture[depth][right_centre] = b'\\';
        centre
    }
}

/// Lazy in-order walk over the leaves. O(log n) stack, O(depth) worst case
/// to advance.
#[derive(Debug, Clone)]
pub(crate) struct LeafIter<'a, K> {
    tree: &'a Tree<K>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, K> Iterator for LeafIter<'a, K> {
    type Item = (&'a K, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let mut cur = self.stack.pop()?;
        while let Some((left, right)) = self.tree[cur].children {
            self.stack.push(right);
            cur = left;
        }
        self.remaining -= 1;
        let node = &self.tree[cur];
        Some((&node.min_key, node.weight))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Consuming in-order walk; yields owned keys out of the arena.
#[derive(Debug)]
pub(crate) struct IntoLeafIter<K> {
    tree: Tree<K>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<K: Clone> Iterator for IntoLeafIter<K> {
    type Item = (K, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let mut cur = self.stack.pop()?;
        while let Some((left, right)) = self.tree[cur].children {
            self.stack.push(right);
            cur = left;
        }
        self.remaining -= 1;
        let node = &self.tree[cur];
        Some((node.min_key.clone(), node.weight))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
