use alloc::string::String;

use crate::Key;

/// The non-key fields of a registration, as supplied to
/// [`OrderedIndex::insert_or_update`](crate::OrderedIndex::insert_or_update).
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Registration {
    pub student_name: String,
    pub semester: i32,
    pub phone: String,
    pub timestamp: i64,
}

impl Registration {
    #[must_use]
    pub fn new(student_name: impl Into<String>, semester: i32, phone: impl Into<String>, timestamp: i64) -> Self {
        Self {
            student_name: student_name.into(),
            semester,
            phone: phone.into(),
            timestamp,
        }
    }
}

/// A stored registration: its [`Key`] plus payload.
///
/// The key never changes once stored. Re-inserting an existing key only
/// refreshes [`timestamp`](Record::timestamp).
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Record {
    key: Key,
    student_name: String,
    semester: i32,
    phone: String,
    timestamp: i64,
}

impl Record {
    pub(crate) fn new(key: Key, registration: Registration) -> Self {
        let Registration {
            student_name,
            semester,
            phone,
            timestamp,
        } = registration;
        Self {
            key,
            student_name,
            semester,
            phone,
            timestamp,
        }
    }

    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    #[must_use]
    pub const fn student_id(&self) -> i32 {
        self.key.student_id()
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        self.key.subject()
    }

    #[must_use]
    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    #[must_use]
    pub const fn semester(&self) -> i32 {
        self.semester
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Returns the registration time used for ranking.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: i64) {
        self.timestamp = timestamp;
    }
}
