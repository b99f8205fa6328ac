use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::raw::RawIndex;
use crate::{Color, Key, Record, Registration};

mod capacity;
mod iter;
mod validate;

pub use iter::Iter;
pub use validate::InvariantViolation;

/// Result of [`OrderedIndex::insert_or_update`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct InsertOutcome {
    /// Number of links from the root to the touched record, measured after rebalancing.
    pub depth: usize,
    /// `true` if the key already existed and only its timestamp was refreshed.
    pub updated: bool,
}

/// One row of [`OrderedIndex::list_student`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct StudentEntry {
    pub subject: String,
    pub color: Color,
}

/// Result of [`OrderedIndex::count_subject`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct SubjectCount {
    pub count: usize,
    /// Sum (not average) of the matching records' depths.
    pub depth_sum: u64,
}

/// One row of [`OrderedIndex::top_k_by_timestamp`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RankedEntry {
    pub student_id: i32,
    pub color: Color,
}

/// An ordered index of course registrations, balanced as a [red-black tree].
///
/// Records are keyed by [`Key`] `(student_id, subject)`. Every record lives in a
/// single arena owned by the index; parent links are plain indices into that
/// arena, and a shared black sentinel stands in for missing children.
///
/// Records are never removed. Re-inserting an existing key refreshes its
/// timestamp and nothing else.
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
///
/// # Examples
///
/// ```
/// use roster_tree::{Key, OrderedIndex, Registration};
///
/// let mut index = OrderedIndex::new();
/// index.insert_or_update(Key::new(1, "Math"), Registration::new("Kim", 3, "010-1111-2222", 100));
/// index.insert_or_update(Key::new(1, "CS"), Registration::new("Kim", 3, "010-1111-2222", 50));
/// index.insert_or_update(Key::new(2, "Math"), Registration::new("Lee", 1, "010-3333-4444", 10));
///
/// let subjects: Vec<String> = index.list_student(1).into_iter().map(|entry| entry.subject).collect();
/// assert_eq!(subjects, ["CS", "Math"]);
///
/// assert_eq!(index.count_subject("Math").count, 2);
///
/// let earliest = index.top_k_by_timestamp("Math", 1);
/// assert_eq!(earliest.len(), 1);
/// assert_eq!(earliest[0].student_id, 2);
/// ```
pub struct OrderedIndex {
    raw: RawIndex,
}

impl OrderedIndex {
    /// Creates an empty index.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_tree::OrderedIndex;
    ///
    /// let index = OrderedIndex::new();
    /// assert!(index.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        OrderedIndex { raw: RawIndex::new() }
    }

    /// Returns the number of records in the index.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the index holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Inserts a registration, or refreshes the timestamp of an existing one.
    ///
    /// If `key` is new, a record is created from `registration` and the tree is
    /// rebalanced. If `key` already exists, only its timestamp is overwritten;
    /// name, semester and phone keep their first values and the tree shape is
    /// untouched.
    ///
    /// The returned depth is measured after rebalancing, so a freshly inserted
    /// record may report a shallower depth than its insertion point.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_tree::{InsertOutcome, Key, OrderedIndex, Registration};
    ///
    /// let mut index = OrderedIndex::new();
    /// let first = index.insert_or_update(Key::new(7, "Bio"), Registration::new("Park", 2, "n/a", 5));
    /// assert_eq!(first, InsertOutcome { depth: 0, updated: false });
    ///
    /// let again = index.insert_or_update(Key::new(7, "Bio"), Registration::new("Park", 2, "n/a", 9));
    /// assert_eq!(again, InsertOutcome { depth: 0, updated: true });
    /// assert_eq!(index.get(&Key::new(7, "Bio")).unwrap().timestamp(), 9);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_or_update(&mut self, key: Key, registration: Registration) -> InsertOutcome {
        self.raw.insert_or_update(key, registration)
    }

    /// Returns the record stored under `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Record> {
        let handle = self.raw.search(key)?;
        Some(self.raw.node(handle).record())
    }

    /// Returns `true` if a record is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.raw.search(key).is_some()
    }

    /// Returns the number of links between the root and the record under `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn depth_of(&self, key: &Key) -> Option<usize> {
        let handle = self.raw.search(key)?;
        Some(self.raw.depth(handle))
    }

    /// Returns the color of the record under `key`.
    #[must_use]
    pub fn color_of(&self, key: &Key) -> Option<Color> {
        let handle = self.raw.search(key)?;
        Some(self.raw.node(handle).color())
    }

    /// Returns the number of black records on every root-to-leaf path.
    #[must_use]
    pub fn black_height(&self) -> usize {
        self.raw.black_height()
    }

    /// Lists a student's subjects in lexicographic order, with each record's color.
    ///
    /// An empty result means the student has no records.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_tree::{Key, OrderedIndex, Registration};
    ///
    /// let mut index = OrderedIndex::new();
    /// index.insert_or_update(Key::new(4, "Zoology"), Registration::default());
    /// index.insert_or_update(Key::new(4, "Art"), Registration::default());
    ///
    /// let listed = index.list_student(4);
    /// assert_eq!(listed[0].subject, "Art");
    /// assert_eq!(listed[1].subject, "Zoology");
    /// assert!(index.list_student(99).is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n + m log m) for `m` matches.
    #[must_use]
    pub fn list_student(&self, student_id: i32) -> Vec<StudentEntry> {
        let mut matches = self.raw.collect_by_student(student_id);
        matches.sort_by(|&a, &b| self.raw.node(a).record().subject().cmp(self.raw.node(b).record().subject()));
        matches
            .into_iter()
            .map(|handle| {
                let node = self.raw.node(handle);
                StudentEntry {
                    subject: String::from(node.record().subject()),
                    color: node.color(),
                }
            })
            .collect()
    }

    /// Counts the records for `subject` and sums their depths.
    ///
    /// Subject is the secondary key, so this scans the whole tree.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn count_subject(&self, subject: &str) -> SubjectCount {
        let (matches, depth_sum) = self.raw.collect_by_subject(subject);
        SubjectCount {
            count: matches.len(),
            depth_sum,
        }
    }

    /// Returns up to `k` records for `subject` with the earliest timestamps.
    ///
    /// Results are ordered by ascending timestamp. Equal timestamps keep the
    /// tree's pre-order. `k == 0` yields nothing; `k` past the match count
    /// yields every match.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_tree::{Key, OrderedIndex, Registration};
    ///
    /// let mut index = OrderedIndex::new();
    /// for (id, timestamp) in [(1, 30), (2, 10), (3, 20)] {
    ///     index.insert_or_update(Key::new(id, "Math"), Registration::new("", 1, "", timestamp));
    /// }
    ///
    /// let ids: Vec<i32> = index.top_k_by_timestamp("Math", 2).iter().map(|entry| entry.student_id).collect();
    /// assert_eq!(ids, [2, 3]);
    /// assert!(index.top_k_by_timestamp("Physics", 5).is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n + m log m) for `m` matches.
    #[must_use]
    pub fn top_k_by_timestamp(&self, subject: &str, k: usize) -> Vec<RankedEntry> {
        if k == 0 {
            return Vec::new();
        }

        let (mut matches, _) = self.raw.collect_by_subject(subject);
        matches.sort_by_key(|&handle| self.raw.node(handle).record().timestamp());
        matches.truncate(k);
        matches
            .into_iter()
            .map(|handle| {
                let node = self.raw.node(handle);
                RankedEntry {
                    student_id: node.record().student_id(),
                    color: node.color(),
                }
            })
            .collect()
    }

    /// Returns an iterator over the records in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_tree::{Key, OrderedIndex, Registration};
    ///
    /// let mut index = OrderedIndex::new();
    /// index.insert_or_update(Key::new(2, "A"), Registration::default());
    /// index.insert_or_update(Key::new(1, "B"), Registration::default());
    /// index.insert_or_update(Key::new(1, "A"), Registration::default());
    ///
    /// let keys: Vec<&Key> = index.iter().map(|record| record.key()).collect();
    /// assert_eq!(keys, [&Key::new(1, "A"), &Key::new(1, "B"), &Key::new(2, "A")]);
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.raw)
    }
}

impl Default for OrderedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a OrderedIndex {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl Extend<(Key, Registration)> for OrderedIndex {
    fn extend<T: IntoIterator<Item = (Key, Registration)>>(&mut self, iter: T) {
        for (key, registration) in iter {
            self.insert_or_update(key, registration);
        }
    }
}

impl FromIterator<(Key, Registration)> for OrderedIndex {
    fn from_iter<T: IntoIterator<Item = (Key, Registration)>>(iter: T) -> Self {
        let mut index = OrderedIndex::new();
        index.extend(iter);
        index
    }
}
