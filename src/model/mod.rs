//! Document model: chapters, pages, lines and columns
//!
//! Produced by an external layout stage and read-only to the navigator and
//! the selection engine, except for the per-column render flags.

mod chapter;
mod column;
mod geometry;
mod line;
mod page;
mod position;
mod window;

pub use chapter::Chapter;
pub use column::{Column, ColumnContent, ColumnFlags};
pub use geometry::{Point, Rect, Size};
pub use line::{Line, LineRole};
pub use page::{Page, PageKind};
pub use position::{PageSlot, SelectionRange, TextPosition};
pub use window::{HitTest, PageWindow};
