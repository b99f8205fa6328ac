use alloc::vec::Vec;
use core::cmp::Ordering;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use crate::ordered_index::{InsertOutcome, InvariantViolation};
use crate::{Color, Key, Record, Registration};

/// Explicit stack for full-tree scans. Red-black height stays below
/// `2 * log2(n + 1)`, so 64 entries covers any realistic tree inline.
type ScanStack = SmallVec<[(Handle, usize); 64]>;

/// The red-black tree backing `OrderedIndex`.
pub(crate) struct RawIndex {
    /// Arena storing all tree nodes. Slot 0 is the sentinel.
    nodes: Arena<Node>,
    /// Handle to the root node, or the sentinel when empty.
    root: Handle,
    /// Number of records (sentinel excluded).
    len: usize,
}

/// How a single fixup iteration restores the red-black invariants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum FixupCase {
    /// Uncle is red: push the violation two levels up.
    Recolor,
    /// Uncle is black and `z` is an inner grandchild: straighten the line first.
    InnerRotate,
    /// Uncle is black and `z` is an outer grandchild: rotate at the grandparent.
    OuterRotate,
}

impl RawIndex {
    /// Creates a new, empty tree holding only the sentinel.
    pub(crate) fn new() -> Self {
        Self::with_arena(Arena::new())
    }

    /// Creates a new tree with room for `capacity` records.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self::with_arena(Arena::with_capacity(capacity.saturating_add(1)))
    }

    fn with_arena(mut nodes: Arena<Node>) -> Self {
        let sentinel = nodes.alloc(Node::sentinel());
        debug_assert_eq!(sentinel, Handle::SENTINEL);
        Self {
            nodes,
            root: Handle::SENTINEL,
            len: 0,
        }
    }

    /// Returns the number of records in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of records the tree can hold without reallocating.
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity().saturating_sub(1)
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node {
        self.nodes.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node {
        debug_assert!(!handle.is_sentinel(), "`RawIndex::node_mut()` - the sentinel is immutable!");
        self.nodes.get_mut(handle)
    }

    #[inline]
    fn color(&self, handle: Handle) -> Color {
        self.node(handle).color()
    }

    #[inline]
    fn parent(&self, handle: Handle) -> Handle {
        self.node(handle).parent()
    }

    #[inline]
    fn child(&self, handle: Handle, side: Side) -> Handle {
        self.node(handle).child(side)
    }

    #[inline]
    fn key(&self, handle: Handle) -> &Key {
        self.node(handle).record().key()
    }

    /// Returns which child slot of its parent `handle` occupies.
    fn side_of(&self, handle: Handle) -> Side {
        if self.child(self.parent(handle), Side::Left) == handle {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Rotates around `pivot` in direction `dir`.
    ///
    /// A left rotation lifts the pivot's right child into its place, a right
    /// rotation its left child. In-order sequence is preserved and colors are
    /// left untouched.
    fn rotate(&mut self, pivot: Handle, dir: Side) {
        let up = dir.opposite();
        let lifted = self.child(pivot, up);
        let inner = self.child(lifted, dir);

        self.node_mut(pivot).set_child(up, inner);
        if !inner.is_sentinel() {
            self.node_mut(inner).set_parent(pivot);
        }

        let parent = self.parent(pivot);
        self.node_mut(lifted).set_parent(parent);
        if parent.is_sentinel() {
            self.root = lifted;
        } else {
            let side = self.side_of(pivot);
            self.node_mut(parent).set_child(side, lifted);
        }

        self.node_mut(lifted).set_child(dir, pivot);
        self.node_mut(pivot).set_parent(lifted);
    }

    /// Returns the number of links between `handle` and the root.
    pub(crate) fn depth(&self, handle: Handle) -> usize {
        let mut depth = 0;
        let mut current = self.parent(handle);
        while !current.is_sentinel() {
            depth += 1;
            current = self.parent(current);
        }
        depth
    }

    /// Searches for `key` by binary descent.
    pub(crate) fn search(&self, key: &Key) -> Option<Handle> {
        let mut current = self.root;
        while !current.is_sentinel() {
            current = match key.cmp(self.key(current)) {
                Ordering::Equal => return Some(current),
                Ordering::Less => self.child(current, Side::Left),
                Ordering::Greater => self.child(current, Side::Right),
            };
        }
        None
    }

    /// Inserts a new record or, if `key` is present, refreshes its timestamp.
    pub(crate) fn insert_or_update(&mut self, key: Key, registration: Registration) -> InsertOutcome {
        let mut parent = Handle::SENTINEL;
        let mut side = Side::Left;
        let mut current = self.root;

        while !current.is_sentinel() {
            parent = current;
            side = match key.cmp(self.key(current)) {
                Ordering::Equal => {
                    self.node_mut(current).record_mut().set_timestamp(registration.timestamp);
                    let depth = self.depth(current);
                    debug!(key = %key, depth, timestamp = registration.timestamp, "updated registration");
                    return InsertOutcome { depth, updated: true };
                }
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            current = self.child(current, side);
        }

        let inserted = self.nodes.alloc(Node::new(Record::new(key, registration)));
        self.node_mut(inserted).set_parent(parent);
        if parent.is_sentinel() {
            self.root = inserted;
        } else {
            self.node_mut(parent).set_child(side, inserted);
        }
        self.len += 1;
        debug_assert_eq!(self.nodes.len(), self.len + 1);

        self.insert_fixup(inserted);

        let depth = self.depth(inserted);
        debug!(key = %self.key(inserted), depth, len = self.len, "inserted registration");
        InsertOutcome { depth, updated: false }
    }

    /// Restores the red-black invariants after linking the red node `z`.
    fn insert_fixup(&mut self, mut z: Handle) {
        // The root is black, so a red parent always has a real grandparent.
        while self.color(self.parent(z)).is_red() {
            let parent = self.parent(z);
            let grandparent = self.parent(parent);
            let side = self.side_of(parent);
            let uncle = self.child(grandparent, side.opposite());

            let case = if self.color(uncle).is_red() {
                FixupCase::Recolor
            } else if z == self.child(parent, side.opposite()) {
                FixupCase::InnerRotate
            } else {
                FixupCase::OuterRotate
            };
            trace!(?case, ?side, key = %self.key(z), "insert fixup");

            match case {
                FixupCase::Recolor => {
                    self.node_mut(parent).set_color(Color::Black);
                    self.node_mut(uncle).set_color(Color::Black);
                    self.node_mut(grandparent).set_color(Color::Red);
                    z = grandparent;
                }
                FixupCase::InnerRotate => {
                    // Becomes an outer configuration; the next iteration finishes it.
                    z = parent;
                    self.rotate(z, side);
                }
                FixupCase::OuterRotate => {
                    self.node_mut(parent).set_color(Color::Black);
                    self.node_mut(grandparent).set_color(Color::Red);
                    self.rotate(grandparent, side.opposite());
                }
            }
        }

        let root = self.root;
        self.node_mut(root).set_color(Color::Black);
    }

    /// Collects every node whose student id equals `student_id`.
    ///
    /// A match can have further matches (other subjects) on both sides, so
    /// both subtrees are searched on equality. Unequal ids prune to one side.
    pub(crate) fn collect_by_student(&self, student_id: i32) -> Vec<Handle> {
        let mut matches = Vec::new();
        self.collect_by_student_from(self.root, student_id, &mut matches);
        matches
    }

    fn collect_by_student_from(&self, handle: Handle, student_id: i32, matches: &mut Vec<Handle>) {
        if handle.is_sentinel() {
            return;
        }

        let node = self.node(handle);
        match student_id.cmp(&node.record().student_id()) {
            Ordering::Less => self.collect_by_student_from(node.left(), student_id, matches),
            Ordering::Greater => self.collect_by_student_from(node.right(), student_id, matches),
            Ordering::Equal => {
                matches.push(handle);
                self.collect_by_student_from(node.left(), student_id, matches);
                self.collect_by_student_from(node.right(), student_id, matches);
            }
        }
    }

    /// Scans the whole tree for `subject`, in pre-order.
    ///
    /// Returns the matches and the sum of their depths.
    pub(crate) fn collect_by_subject(&self, subject: &str) -> (Vec<Handle>, u64) {
        let mut matches = Vec::new();
        let mut depth_sum = 0u64;
        let mut stack = ScanStack::new();
        if !self.root.is_sentinel() {
            stack.push((self.root, 0));
        }

        while let Some((handle, depth)) = stack.pop() {
            let node = self.node(handle);
            if node.record().subject() == subject {
                matches.push(handle);
                depth_sum += depth as u64;
            }
            // Right first so the left subtree is visited first.
            if !node.right().is_sentinel() {
                stack.push((node.right(), depth + 1));
            }
            if !node.left().is_sentinel() {
                stack.push((node.left(), depth + 1));
            }
        }

        (matches, depth_sum)
    }

    /// Returns the leftmost node, or `None` for an empty tree.
    pub(crate) fn first(&self) -> Option<Handle> {
        if self.root.is_sentinel() {
            return None;
        }
        Some(self.leftmost(self.root))
    }

    fn leftmost(&self, mut handle: Handle) -> Handle {
        loop {
            let left = self.child(handle, Side::Left);
            if left.is_sentinel() {
                return handle;
            }
            handle = left;
        }
    }

    /// Returns the in-order successor of `handle`, following parent links.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        let right = self.child(handle, Side::Right);
        if !right.is_sentinel() {
            return Some(self.leftmost(right));
        }

        let mut current = handle;
        let mut parent = self.parent(current);
        while !parent.is_sentinel() && self.child(parent, Side::Right) == current {
            current = parent;
            parent = self.parent(current);
        }
        (!parent.is_sentinel()).then_some(parent)
    }

    /// Counts black nodes on the leftmost root-to-sentinel path.
    pub(crate) fn black_height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while !current.is_sentinel() {
            if self.color(current) == Color::Black {
                height += 1;
            }
            current = self.child(current, Side::Left);
        }
        height
    }

    /// Checks every structural invariant, returning the black-height.
    pub(crate) fn validate(&self) -> Result<usize, InvariantViolation> {
        let sentinel = self.node(Handle::SENTINEL);
        if sentinel.color() != Color::Black {
            return Err(InvariantViolation::SentinelNotBlack);
        }
        if [sentinel.left(), sentinel.right(), sentinel.parent()].iter().any(|link| !link.is_sentinel()) {
            return Err(InvariantViolation::SentinelLinked);
        }

        if !self.root.is_sentinel() {
            if self.color(self.root) != Color::Black {
                return Err(InvariantViolation::RootNotBlack {
                    key: self.key(self.root).clone(),
                });
            }
            if !self.parent(self.root).is_sentinel() {
                return Err(InvariantViolation::BrokenParentLink {
                    key: self.key(self.root).clone(),
                });
            }
        }

        let mut previous = None;
        let mut count = 0;
        let height = self.validate_subtree(self.root, &mut previous, &mut count)?;

        if count != self.len {
            return Err(InvariantViolation::LenMismatch {
                expected: self.len,
                actual: count,
            });
        }
        Ok(height)
    }

    fn validate_subtree(
        &self,
        handle: Handle,
        previous: &mut Option<Handle>,
        count: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        if handle.is_sentinel() {
            return Ok(0);
        }

        let node = self.node(handle);
        for side in [Side::Left, Side::Right] {
            let child = node.child(side);
            if child.is_sentinel() {
                continue;
            }
            if self.parent(child) != handle {
                return Err(InvariantViolation::BrokenParentLink {
                    key: self.key(child).clone(),
                });
            }
            if node.color().is_red() && self.color(child).is_red() {
                return Err(InvariantViolation::RedRed {
                    parent: node.record().key().clone(),
                    child: self.key(child).clone(),
                });
            }
        }

        let left_height = self.validate_subtree(node.left(), previous, count)?;

        if let Some(prev) = *previous
            && self.key(prev) >= node.record().key()
        {
            return Err(InvariantViolation::OutOfOrder {
                previous: self.key(prev).clone(),
                next: node.record().key().clone(),
            });
        }
        *previous = Some(handle);
        *count += 1;

        let right_height = self.validate_subtree(node.right(), previous, count)?;

        if left_height != right_height {
            return Err(InvariantViolation::BlackHeightMismatch {
                key: node.record().key().clone(),
                left: left_height,
                right: right_height,
            });
        }
        Ok(left_height + usize::from(node.color() == Color::Black))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// In-order `(student_id, color, parent student_id)` triples.
    type Shape = Vec<(i32, char, Option<i32>)>;

    impl RawIndex {
        fn shape(&self) -> Shape {
            let mut shape = Vec::new();
            let mut current = self.first();
            while let Some(handle) = current {
                let parent = self.parent(handle);
                shape.push((
                    self.key(handle).student_id(),
                    self.color(handle).tag(),
                    (!parent.is_sentinel()).then(|| self.key(parent).student_id()),
                ));
                current = self.successor(handle);
            }
            shape
        }

        fn insert_ids(&mut self, ids: &[i32]) -> Vec<InsertOutcome> {
            ids.iter().map(|&id| self.insert_or_update(key(id), registration(i64::from(id)))).collect()
        }
    }

    fn key(id: i32) -> Key {
        Key::new(id, "S")
    }

    fn registration(timestamp: i64) -> Registration {
        Registration::new(format!("student{timestamp}"), 1, "010-0000-0000", timestamp)
    }

    fn inserted(depth: usize) -> InsertOutcome {
        InsertOutcome { depth, updated: false }
    }

    #[test]
    fn empty_tree() {
        let tree = RawIndex::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.root.is_sentinel());
        assert_eq!(tree.first(), None);
        assert_eq!(tree.black_height(), 0);
        assert_eq!(tree.validate(), Ok(0));
        assert!(tree.collect_by_student(1).is_empty());
        let (matches, depth_sum) = tree.collect_by_subject("S");
        assert!(matches.is_empty());
        assert_eq!(depth_sum, 0);
    }

    #[test]
    fn first_insert_becomes_black_root() {
        let mut tree = RawIndex::new();
        assert_eq!(tree.insert_ids(&[5]), vec![inserted(0)]);
        assert_eq!(tree.shape(), vec![(5, 'B', None)]);
        assert_eq!(tree.validate(), Ok(1));
    }

    #[test]
    fn left_outer_grandchild_single_rotation() {
        let mut tree = RawIndex::new();
        let outcomes = tree.insert_ids(&[3, 2, 1]);
        assert_eq!(outcomes[2], inserted(1));
        assert_eq!(tree.shape(), vec![(1, 'R', Some(2)), (2, 'B', None), (3, 'R', Some(2))]);
        assert_eq!(tree.validate(), Ok(1));
    }

    #[test]
    fn right_outer_grandchild_single_rotation() {
        let mut tree = RawIndex::new();
        let outcomes = tree.insert_ids(&[1, 2, 3]);
        assert_eq!(outcomes[2], inserted(1));
        assert_eq!(tree.shape(), vec![(1, 'R', Some(2)), (2, 'B', None), (3, 'R', Some(2))]);
        assert_eq!(tree.validate(), Ok(1));
    }

    #[test]
    fn left_inner_grandchild_double_rotation() {
        let mut tree = RawIndex::new();
        let outcomes = tree.insert_ids(&[3, 1, 2]);
        // The inserted node is lifted to the root.
        assert_eq!(outcomes[2], inserted(0));
        assert_eq!(tree.shape(), vec![(1, 'R', Some(2)), (2, 'B', None), (3, 'R', Some(2))]);
        assert_eq!(tree.validate(), Ok(1));
    }

    #[test]
    fn right_inner_grandchild_double_rotation() {
        let mut tree = RawIndex::new();
        let outcomes = tree.insert_ids(&[1, 3, 2]);
        assert_eq!(outcomes[2], inserted(0));
        assert_eq!(tree.shape(), vec![(1, 'R', Some(2)), (2, 'B', None), (3, 'R', Some(2))]);
        assert_eq!(tree.validate(), Ok(1));
    }

    #[test]
    fn right_side_red_uncle_recolors() {
        let mut tree = RawIndex::new();
        let outcomes = tree.insert_ids(&[2, 1, 3, 4]);
        assert_eq!(outcomes[3], inserted(2));
        assert_eq!(
            tree.shape(),
            vec![(1, 'B', Some(2)), (2, 'B', None), (3, 'B', Some(2)), (4, 'R', Some(3))]
        );
        assert_eq!(tree.validate(), Ok(2));
    }

    #[test]
    fn left_side_red_uncle_recolors() {
        let mut tree = RawIndex::new();
        let outcomes = tree.insert_ids(&[3, 2, 4, 1]);
        assert_eq!(outcomes[3], inserted(2));
        assert_eq!(
            tree.shape(),
            vec![(1, 'R', Some(2)), (2, 'B', Some(3)), (3, 'B', None), (4, 'B', Some(3))]
        );
        assert_eq!(tree.validate(), Ok(2));
    }

    #[test]
    fn recolor_then_rotation_higher_up() {
        // Inserting 8 recolors under 6, leaving red 6 under red 4; an outer
        // rotation at the root finishes the fixup.
        let mut tree = RawIndex::new();
        tree.insert_ids(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            tree.shape(),
            vec![
                (1, 'B', Some(2)),
                (2, 'R', Some(4)),
                (3, 'B', Some(2)),
                (4, 'B', None),
                (5, 'B', Some(6)),
                (6, 'R', Some(4)),
                (7, 'B', Some(6)),
                (8, 'R', Some(7)),
            ]
        );
        assert_eq!(tree.validate(), Ok(2));
    }

    #[test]
    fn update_touches_only_timestamp() {
        let mut tree = RawIndex::new();
        tree.insert_ids(&[10, 5, 15, 3]);
        let before = tree.shape();

        let outcome = tree.insert_or_update(key(5), Registration::new("someone else", 9, "n/a", 999));
        assert_eq!(outcome, InsertOutcome { depth: 1, updated: true });
        assert_eq!(tree.shape(), before);
        assert_eq!(tree.len(), 4);

        let record = tree.node(tree.search(&key(5)).unwrap()).record();
        assert_eq!(record.timestamp(), 999);
        assert_eq!(record.student_name(), "student5");
        assert_eq!(record.semester(), 1);
    }

    #[test]
    fn depth_follows_parent_links() {
        let mut tree = RawIndex::new();
        tree.insert_ids(&[2, 1, 3, 4]);
        assert_eq!(tree.depth(tree.search(&key(2)).unwrap()), 0);
        assert_eq!(tree.depth(tree.search(&key(3)).unwrap()), 1);
        assert_eq!(tree.depth(tree.search(&key(4)).unwrap()), 2);
        assert_eq!(tree.search(&key(9)), None);
    }

    #[test]
    fn student_collection_reaches_both_subtrees() {
        let mut tree = RawIndex::new();
        for subject in ["E", "C", "G", "B", "D", "F", "H"] {
            tree.insert_or_update(Key::new(1, subject), registration(0));
        }
        tree.insert_or_update(Key::new(0, "Z"), registration(0));
        tree.insert_or_update(Key::new(2, "A"), registration(0));

        let mut subjects: Vec<String> = tree
            .collect_by_student(1)
            .into_iter()
            .map(|handle| String::from(tree.key(handle).subject()))
            .collect();
        subjects.sort();
        assert_eq!(subjects, ["B", "C", "D", "E", "F", "G", "H"]);
        assert!(tree.collect_by_student(3).is_empty());
    }

    #[test]
    fn subject_scan_sums_depths() {
        let mut tree = RawIndex::new();
        tree.insert_ids(&[2, 1, 3, 4]);
        let (matches, depth_sum) = tree.collect_by_subject("S");
        assert_eq!(matches.len(), 4);
        assert_eq!(depth_sum, 1 + 1 + 2);
        // Pre-order.
        let ids: Vec<i32> = matches.iter().map(|&h| tree.key(h).student_id()).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
    }

    #[test]
    fn validate_detects_red_root() {
        let mut tree = RawIndex::new();
        tree.insert_ids(&[1]);
        let root = tree.root;
        tree.node_mut(root).set_color(Color::Red);
        assert_eq!(tree.validate(), Err(InvariantViolation::RootNotBlack { key: key(1) }));
    }

    #[test]
    fn validate_detects_red_red_and_black_height() {
        let mut tree = RawIndex::new();
        tree.insert_ids(&[2, 1, 3, 4]);
        let three = tree.search(&key(3)).unwrap();
        tree.node_mut(three).set_color(Color::Red);
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::RedRed {
                parent: key(3),
                child: key(4),
            })
        );

        let four = tree.search(&key(4)).unwrap();
        tree.node_mut(four).set_color(Color::Black);
        tree.node_mut(three).set_color(Color::Black);
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BlackHeightMismatch {
                key: key(3),
                left: 0,
                right: 1,
            })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_after_every_insert(ids in prop::collection::vec(-500i32..500, 0..400)) {
            let mut tree = RawIndex::new();
            let mut distinct = alloc::collections::BTreeSet::new();

            for id in ids {
                let updated = !distinct.insert(id);
                let outcome = tree.insert_or_update(key(id), registration(0));
                prop_assert_eq!(outcome.updated, updated);
                prop_assert_eq!(outcome.depth, tree.depth(tree.search(&key(id)).unwrap()));
                prop_assert!(tree.validate().is_ok(), "{:?}", tree.validate());
            }

            prop_assert_eq!(tree.len(), distinct.len());
            prop_assert_eq!(tree.validate(), Ok(tree.black_height()));
        }

        #[test]
        fn update_leaves_shape_unchanged(ids in prop::collection::vec(0i32..200, 1..200), pick in any::<usize>()) {
            let mut tree = RawIndex::new();
            tree.insert_ids(&ids);
            let before = tree.shape();

            let id = ids[pick % ids.len()];
            let outcome = tree.insert_or_update(key(id), registration(-1));
            prop_assert!(outcome.updated);
            prop_assert_eq!(tree.shape(), before);
            prop_assert_eq!(tree.node(tree.search(&key(id)).unwrap()).record().timestamp(), -1);
        }
    }
}
