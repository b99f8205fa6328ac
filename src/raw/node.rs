use crate::{Color, Record};

use super::handle::Handle;

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A tree vertex. The arena owns every node; all three links are plain handles.
pub(crate) struct Node {
    record: Record,
    color: Color,
    left: Handle,
    right: Handle,
    // Back-reference only; never an ownership edge.
    parent: Handle,
}

impl Node {
    /// Creates a detached red node. All links point at the sentinel.
    pub(crate) fn new(record: Record) -> Self {
        Self {
            record,
            color: Color::Red,
            left: Handle::SENTINEL,
            right: Handle::SENTINEL,
            parent: Handle::SENTINEL,
        }
    }

    /// Creates the black, self-linked sentinel.
    pub(crate) fn sentinel() -> Self {
        Self {
            record: Record::default(),
            color: Color::Black,
            left: Handle::SENTINEL,
            right: Handle::SENTINEL,
            parent: Handle::SENTINEL,
        }
    }

    #[inline]
    pub(crate) fn record(&self) -> &Record {
        &self.record
    }

    #[inline]
    pub(crate) fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    #[inline]
    pub(crate) const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub(crate) const fn left(&self) -> Handle {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Handle {
        self.right
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Handle {
        self.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Handle) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Handle {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Handle) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}
