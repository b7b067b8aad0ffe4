use super::node::{InteriorNode, LeafNode, Node, NodeId};

/// Fixed-fan-out B+-tree over `i32` keys and `i32` payloads.
///
/// Nodes live in an arena (`Vec<Node>`) addressed by `NodeId`; the tree never
/// frees a node once allocated, matching the reference crate's (and the
/// original `BTree`'s) lack of any delete path — deletion stays unimplemented
/// per spec.
pub struct Tree {
    arena: Vec<Node>,
    root: Option<NodeId>,
    max_keys: usize,
    height: usize,
    num_nodes: usize,
}

impl Tree {
    /// `max_keys` is the fan-out parameter; spec.md §6 requires `>= 4`.
    pub fn new(max_keys: usize) -> Self {
        assert!(max_keys >= 4, "max_keys must be >= 4, got {max_keys}");
        Self {
            arena: Vec::new(),
            root: None,
            max_keys,
            height: 0,
            num_nodes: 0,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn alloc_leaf(&mut self) -> NodeId {
        self.arena.push(Node::new_leaf(self.max_keys));
        self.num_nodes += 1;
        (self.arena.len() - 1) as NodeId
    }

    fn alloc_interior(&mut self, height: u32) -> NodeId {
        self.arena.push(Node::new_interior(self.max_keys, height));
        self.num_nodes += 1;
        (self.arena.len() - 1) as NodeId
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node {
        &self.arena[id as usize]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id as usize]
    }

    /// Descends from `root` choosing the child at `find_key_index` at every
    /// interior node; at the leaf, returns `values[i]` iff `keys[i] == key`.
    pub fn find(&self, key: i32) -> Option<i32> {
        let mut cur = self.root?;
        loop {
            let node = self.node(cur);
            let idx = node.find_key_index(key);
            match node {
                Node::Leaf(leaf) => {
                    return leaf
                        .keys
                        .get(idx)
                        .ok()
                        .filter(|&&k| k == key)
                        .map(|_| *leaf.values.get(idx).expect("keys/values same length"));
                }
                Node::Interior(branch) => {
                    cur = *branch.children.get(idx).expect("child must exist");
                }
            }
        }
    }

    /// Lazily creates a leaf root, descends to the target leaf using the
    /// same rule as `find`, inserts, then splits if the leaf overflowed.
    pub fn insert(&mut self, key: i32, value: i32) {
        let root = match self.root {
            Some(r) => r,
            None => {
                let r = self.alloc_leaf();
                self.root = Some(r);
                r
            }
        };

        let leaf_id = self.leaf_for_insert(root, key);
        let idx = self.node(leaf_id).find_key_index(key);
        self.node_mut(leaf_id)
            .as_leaf_mut()
            .insert_key_value(idx, key, value);
        log::trace!("inserted key {key} at leaf {leaf_id} idx {idx}");

        self.split_from(leaf_id);
    }

    fn leaf_for_insert(&self, root: NodeId, key: i32) -> NodeId {
        let mut cur = root;
        loop {
            let node = self.node(cur);
            if node.is_leaf() {
                return cur;
            }
            let idx = node.find_key_index(key);
            cur = *node.as_interior().children.get(idx).expect("child must exist");
        }
    }

    /// If `node_id`'s key array is below capacity, does nothing and returns
    /// 0. Otherwise partitions it into a left and right half around a pivot
    /// key, inserts the pivot into the parent (allocating a new root if
    /// necessary), and recurses upward. Returns the number of new nodes
    /// created by this call, including a possible new root.
    fn split_from(&mut self, node_id: NodeId) -> usize {
        if self.node(node_id).keys().size() < self.max_keys {
            return 0;
        }

        let (pivot, right_id) = self.make_splitted_node(node_id);

        match self.node(node_id).parent() {
            None => {
                log::debug!("tree height grows to {} (new root)", self.height + 1);
                let height = self.node(node_id).height() + 1;
                let new_root = self.alloc_interior(height);
                {
                    let root_node = self.node_mut(new_root).as_interior_mut();
                    root_node.keys.push(pivot).expect("fresh root has room");
                    root_node
                        .children
                        .push(node_id)
                        .expect("fresh root has room");
                    root_node
                        .children
                        .push(right_id)
                        .expect("fresh root has room");
                }
                self.node_mut(node_id).set_parent(Some(new_root));
                self.node_mut(right_id).set_parent(Some(new_root));
                self.root = Some(new_root);
                self.height += 1;
                2
            }
            Some(parent_id) => {
                log::debug!("split at node {node_id} propagates to parent {parent_id}");
                let idx = self.node(parent_id).find_key_index(pivot);
                self.node_mut(parent_id)
                    .as_interior_mut()
                    .insert_key_pointer(idx, pivot, right_id);
                self.node_mut(right_id).set_parent(Some(parent_id));
                1 + self.split_from(parent_id)
            }
        }
    }

    /// Partitions `node_id` into itself (left) and a newly allocated right
    /// sibling around a pivot key at `(size - 1) / 2` (spec.md §4.2, §9).
    fn make_splitted_node(&mut self, node_id: NodeId) -> (i32, NodeId) {
        let is_leaf = self.node(node_id).is_leaf();
        let parent = self.node(node_id).parent();
        let height = self.node(node_id).height();
        let size = self.node(node_id).keys().size();
        let pivot_idx = (size - 1) / 2;
        let pivot_key = *self.node(node_id).keys().get(pivot_idx).unwrap();

        if is_leaf {
            let right_id = self.alloc_leaf();
            self.node_mut(right_id).set_parent(parent);

            let num_rhs = size - (pivot_idx + 1);
            let (left, right) = self.split_leaf_pair(node_id, right_id);
            right
                .keys
                .bulk_copy_range(0, &mut left.keys, pivot_idx + 1..size)
                .unwrap();
            right
                .values
                .bulk_copy_range(0, &mut left.values, pivot_idx + 1..size)
                .unwrap();
            debug_assert_eq!(right.keys.size(), num_rhs);
            // Left keeps the pivot itself (a B+-tree leaf property).
            left.keys.truncate(pivot_idx + 1).unwrap();
            left.values.truncate(pivot_idx + 1).unwrap();

            (pivot_key, right_id)
        } else {
            let right_id = self.alloc_interior(height);
            self.node_mut(right_id).set_parent(parent);

            let num_keys_rhs = size - (pivot_idx + 1);
            let (left, right) = self.split_interior_pair(node_id, right_id);
            right
                .keys
                .bulk_copy_range(0, &mut left.keys, pivot_idx + 1..size)
                .unwrap();
            right
                .children
                .bulk_copy_range(0, &mut left.children, pivot_idx + 1..size + 1)
                .unwrap();
            debug_assert_eq!(right.keys.size(), num_keys_rhs);
            left.keys.truncate(pivot_idx).unwrap();
            left.children.truncate(pivot_idx + 1).unwrap();

            let moved_children: Vec<NodeId> = right.children.as_slice().to_vec();
            for child in moved_children {
                self.node_mut(child).set_parent(Some(right_id));
            }

            (pivot_key, right_id)
        }
    }

    fn split_leaf_pair(&mut self, left_id: NodeId, right_id: NodeId) -> (&mut LeafNode, &mut LeafNode) {
        debug_assert_ne!(left_id, right_id);
        // SAFETY: left_id != right_id, so these are disjoint elements of the
        // same Vec; splitting the borrow this way avoids a second arena
        // lookup per field while keeping both halves mutably accessible.
        let arena_ptr = self.arena.as_mut_ptr();
        unsafe {
            let left = (*arena_ptr.add(left_id as usize)).as_leaf_mut();
            let right = (*arena_ptr.add(right_id as usize)).as_leaf_mut();
            (left, right)
        }
    }

    fn split_interior_pair(
        &mut self,
        left_id: NodeId,
        right_id: NodeId,
    ) -> (&mut InteriorNode, &mut InteriorNode) {
        debug_assert_ne!(left_id, right_id);
        let arena_ptr = self.arena.as_mut_ptr();
        // SAFETY: see split_leaf_pair.
        unsafe {
            let left = (*arena_ptr.add(left_id as usize)).as_interior_mut();
            let right = (*arena_ptr.add(right_id as usize)).as_interior_mut();
            (left, right)
        }
    }

    /// Debug self-check: interior subtree bounds, leaf key/value parity,
    /// strictly ascending keys, non-root size bounds, and parent-pointer
    /// agreement (spec.md §4.2, §8).
    pub fn check_invariants(&self) -> Result<(), String> {
        match self.root {
            None => Ok(()),
            Some(root) => {
                self.check_node(root, None, None, true)?;
                Ok(())
            }
        }
    }

    fn check_node(
        &self,
        id: NodeId,
        lower: Option<i32>,
        upper: Option<i32>,
        is_root: bool,
    ) -> Result<(), String> {
        let node = self.node(id);
        let keys = node.keys().as_slice();

        for w in keys.windows(2) {
            if w[0] >= w[1] {
                return Err(format!("node {id}: keys not strictly increasing"));
            }
        }
        if let Some(low) = lower {
            if keys.first().is_some_and(|&k| k < low) {
                return Err(format!("node {id}: key below subtree lower bound"));
            }
        }
        if let Some(high) = upper {
            if keys.last().is_some_and(|&k| k > high) {
                return Err(format!("node {id}: key above subtree upper bound"));
            }
        }

        if !is_root {
            let min_keys = self.max_keys / 2 - 1;
            if keys.len() < min_keys {
                return Err(format!(
                    "node {id}: underfull ({} keys, minimum {min_keys})",
                    keys.len()
                ));
            }
            if keys.len() >= self.max_keys {
                return Err(format!("node {id}: at or over capacity"));
            }
        }

        match node {
            Node::Leaf(leaf) => {
                if leaf.keys.size() != leaf.values.size() {
                    return Err(format!("node {id}: keys/values length mismatch"));
                }
                Ok(())
            }
            Node::Interior(branch) => {
                if branch.children.size() != branch.keys.size() + 1 {
                    return Err(format!("node {id}: children count != keys + 1"));
                }
                for i in 0..branch.children.size() {
                    let child = *branch.children.get(i).unwrap();
                    if self.node(child).parent() != Some(id) {
                        return Err(format!("node {id}: child {child} parent mismatch"));
                    }
                    let child_lower = if i == 0 { lower } else { Some(keys[i - 1]) };
                    let child_upper = if i == keys.len() { upper } else { Some(keys[i]) };
                    self.check_node(child, child_lower, child_upper, false)?;
                }
                Ok(())
            }
        }
    }
}
