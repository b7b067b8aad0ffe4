use crate::fixed_vector::FixedVector;

/// Stable handle into a `Tree`'s node arena.
///
/// The reference crate resolves parent/child back-references with raw
/// `NonNull<u8>` pointers into individually heap-allocated, byte-layout
/// blocks, which is the right call when `K`/`V` are generic and the node
/// layout has to be computed from byte budgets. Here `K = V = i32` are fixed,
/// so there is no generic layout to carve; an arena of `Node` values indexed
/// by a plain integer handle is simpler and is exactly what spec.md's own
/// "Design notes" section recommends for this case.
pub type NodeId = u32;

pub(crate) struct LeafNode {
    pub(crate) keys: FixedVector<i32>,
    pub(crate) values: FixedVector<i32>,
    pub(crate) parent: Option<NodeId>,
}

pub(crate) struct InteriorNode {
    pub(crate) keys: FixedVector<i32>,
    pub(crate) children: FixedVector<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) height: u32,
}

pub(crate) enum Node {
    Leaf(LeafNode),
    Interior(InteriorNode),
}

impl Node {
    pub(crate) fn new_leaf(max_keys: usize) -> Self {
        Node::Leaf(LeafNode {
            keys: FixedVector::new(max_keys),
            values: FixedVector::new(max_keys),
            parent: None,
        })
    }

    pub(crate) fn new_interior(max_keys: usize, height: u32) -> Self {
        Node::Interior(InteriorNode {
            keys: FixedVector::new(max_keys),
            children: FixedVector::new(max_keys + 1),
            parent: None,
            height,
        })
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    #[inline]
    pub(crate) fn keys(&self) -> &FixedVector<i32> {
        match self {
            Node::Leaf(l) => &l.keys,
            Node::Interior(b) => &b.keys,
        }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Leaf(l) => l.parent,
            Node::Interior(b) => b.parent,
        }
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Leaf(l) => l.parent = parent,
            Node::Interior(b) => b.parent = parent,
        }
    }

    #[inline]
    pub(crate) fn height(&self) -> u32 {
        match self {
            Node::Leaf(_) => 0,
            Node::Interior(b) => b.height,
        }
    }

    /// Returns the smallest `i` with `keys[i] >= key`, or `keys.len()` if
    /// none. Used identically as an insertion point in leaves and as a
    /// child-selection index in interior nodes (spec.md §4.2).
    pub(crate) fn find_key_index(&self, key: i32) -> usize {
        let keys = self.keys().as_slice();
        match keys.binary_search(&key) {
            Ok(i) | Err(i) => i,
        }
    }

    pub(crate) fn as_leaf(&self) -> &LeafNode {
        match self {
            Node::Leaf(l) => l,
            Node::Interior(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode {
        match self {
            Node::Leaf(l) => l,
            Node::Interior(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_interior(&self) -> &InteriorNode {
        match self {
            Node::Interior(b) => b,
            Node::Leaf(_) => panic!("expected interior node"),
        }
    }

    pub(crate) fn as_interior_mut(&mut self) -> &mut InteriorNode {
        match self {
            Node::Interior(b) => b,
            Node::Leaf(_) => panic!("expected interior node"),
        }
    }
}

impl LeafNode {
    /// Leaf-only: inserts `key`/`value` at `i` in both arrays.
    pub(crate) fn insert_key_value(&mut self, i: usize, key: i32, value: i32) {
        self.keys.insert_at(i, key).expect("leaf insert in bounds");
        self.values
            .insert_at(i, value)
            .expect("leaf insert in bounds");
    }
}

impl InteriorNode {
    /// Interior-only: inserts `key` at `i` and `child` at `i + 1`.
    /// The caller is responsible for updating `child`'s parent pointer in
    /// the arena (this type doesn't have arena access).
    pub(crate) fn insert_key_pointer(&mut self, i: usize, key: i32, child: NodeId) {
        self.keys.insert_at(i, key).expect("branch insert in bounds");
        self.children
            .insert_at(i + 1, child)
            .expect("branch insert in bounds");
    }
}
