//! Addresses inside the three-page window

use std::cmp::Ordering;

/// Which of the three page buffers a position lives in.
///
/// Declaration order is the total order: previous before current before next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageSlot {
    Prev,
    #[default]
    Current,
    Next,
}

impl PageSlot {
    pub const ALL: [PageSlot; 3] = [PageSlot::Prev, PageSlot::Current, PageSlot::Next];

    /// Offset relative to the current page: -1, 0 or 1
    pub fn relative_offset(self) -> i8 {
        match self {
            PageSlot::Prev => -1,
            PageSlot::Current => 0,
            PageSlot::Next => 1,
        }
    }

    pub fn from_relative_offset(offset: i8) -> Option<Self> {
        match offset {
            -1 => Some(PageSlot::Prev),
            0 => Some(PageSlot::Current),
            1 => Some(PageSlot::Next),
            _ => None,
        }
    }

    pub fn before(self) -> Option<Self> {
        Self::from_relative_offset(self.relative_offset() - 1)
    }
}

/// One column inside the window. Field order defines the ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPosition {
    pub slot: PageSlot,
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    pub fn new(slot: PageSlot, line: usize, column: usize) -> Self {
        Self { slot, line, column }
    }

    pub fn current(line: usize, column: usize) -> Self {
        Self::new(PageSlot::Current, line, column)
    }
}

/// An ordered pair of positions, both ends inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionRange {
    start: TextPosition,
    end: TextPosition,
}

impl SelectionRange {
    /// Build a range, swapping the ends if they arrive out of order.
    pub fn ordered(a: TextPosition, b: TextPosition) -> Self {
        match a.cmp(&b) {
            Ordering::Greater => Self { start: b, end: a },
            _ => Self { start: a, end: b },
        }
    }

    pub fn start(&self) -> TextPosition {
        self.start
    }

    pub fn end(&self) -> TextPosition {
        self.end
    }

    pub fn contains(&self, pos: TextPosition) -> bool {
        self.start <= pos && pos <= self.end
    }
}
