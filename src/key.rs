use alloc::string::String;
use core::fmt;

/// Composite key of a registration: `(student_id, subject)`.
///
/// Keys order by student id first and break ties by comparing subjects
/// lexicographically, so all of a student's registrations are adjacent in
/// in-order traversal.
///
/// # Examples
///
/// ```
/// use roster_tree::Key;
///
/// assert!(Key::new(1, "Math") < Key::new(2, "Art"));
/// assert!(Key::new(1, "CS") < Key::new(1, "Math"));
/// assert_eq!(Key::new(3, "Bio"), Key::new(3, "Bio"));
/// ```
// Field order drives the derived `Ord`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Key {
    student_id: i32,
    subject: String,
}

impl Key {
    /// Creates a key from a student id and a subject.
    #[must_use]
    pub fn new(student_id: i32, subject: impl Into<String>) -> Self {
        Self {
            student_id,
            subject: subject.into(),
        }
    }

    /// Returns the student id.
    #[must_use]
    pub const fn student_id(&self) -> i32 {
        self.student_id
    }

    /// Returns the subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.student_id, self.subject)
    }
}
