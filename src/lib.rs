//! A red-black ordered index of course registrations.
//!
//! This crate provides [`OrderedIndex`], a self-balancing binary search tree keyed by
//! [`Key`] `(student_id, subject)`. Every operation on the key runs in O(log n):
//!
//! - [`insert_or_update`](OrderedIndex::insert_or_update) - Insert a record, or refresh the
//!   timestamp of an existing one, reporting its depth after rebalancing
//! - [`list_student`](OrderedIndex::list_student) - A student's subjects, sorted, with node colors
//! - [`count_subject`](OrderedIndex::count_subject) - Record count and depth sum for a subject
//! - [`top_k_by_timestamp`](OrderedIndex::top_k_by_timestamp) - The earliest `k` registrations
//!   for a subject
//!
//! # Example
//!
//! ```
//! use roster_tree::{Color, Key, OrderedIndex, Registration};
//!
//! let mut index = OrderedIndex::new();
//! index.insert_or_update(Key::new(1, "Math"), Registration::new("Kim", 3, "010-1111-2222", 100));
//! index.insert_or_update(Key::new(1, "CS"), Registration::new("Kim", 3, "010-1111-2222", 50));
//! index.insert_or_update(Key::new(2, "Math"), Registration::new("Lee", 1, "010-3333-4444", 10));
//!
//! // The first record is the root, and the root is always black.
//! assert_eq!(index.color_of(&Key::new(1, "Math")), Some(Color::Black));
//!
//! let count = index.count_subject("Math");
//! assert_eq!((count.count, count.depth_sum), (2, 1));
//!
//! // Subject is the secondary key, so subject queries scan the whole tree.
//! let earliest = index.top_k_by_timestamp("Math", 1);
//! assert_eq!(earliest[0].student_id, 2);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - The library only requires `alloc`
//! - **`cli`** (default) - Builds the `roster` binary, which reads one command per line
//!   (see [`command`])
//!
//! # Implementation
//!
//! Nodes live in a single arena and link to each other by index. Index 0 holds a black
//! sentinel standing in for every missing child and for the root's parent, so rotation
//! and fixup code never branches on absent links. Records are never removed.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod color;
mod key;
mod raw;
mod record;

pub mod command;
pub mod ordered_index;

pub use color::Color;
pub use key::Key;
pub use ordered_index::{InsertOutcome, InvariantViolation, OrderedIndex, RankedEntry, StudentEntry, SubjectCount};
pub use record::{Record, Registration};
