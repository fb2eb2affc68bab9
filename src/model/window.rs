//! The three page buffers handed to the renderer, and hit-testing over them

use super::geometry::Point;
use super::page::Page;
use super::position::{PageSlot, SelectionRange, TextPosition};

/// Resolves a viewport point to a column address
pub trait HitTest {
    /// Exact hit: the point must fall inside a column
    fn hit_test(&self, point: Point) -> Option<TextPosition>;

    /// Lenient hit used while dragging: clamps to the nearest column of the
    /// touched line
    fn hit_test_nearest(&self, point: Point) -> Option<TextPosition> {
        self.hit_test(point)
    }
}

/// Previous, current and next page as currently displayed.
///
/// In continuous-scroll mode the previous page sits directly above the
/// current one and the next page directly below; otherwise only the current
/// page is hit-testable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageWindow {
    pub prev: Page,
    pub current: Page,
    pub next: Page,
    pub continuous: bool,
    /// Top of the current page in viewport coordinates
    pub scroll_offset: f32,
}

impl PageWindow {
    pub fn new(prev: Page, current: Page, next: Page) -> Self {
        Self {
            prev,
            current,
            next,
            continuous: false,
            scroll_offset: 0.0,
        }
    }

    pub fn page(&self, slot: PageSlot) -> &Page {
        match slot {
            PageSlot::Prev => &self.prev,
            PageSlot::Current => &self.current,
            PageSlot::Next => &self.next,
        }
    }

    pub fn page_mut(&mut self, slot: PageSlot) -> &mut Page {
        match slot {
            PageSlot::Prev => &mut self.prev,
            PageSlot::Current => &mut self.current,
            PageSlot::Next => &mut self.next,
        }
    }

    pub fn set_page(&mut self, slot: PageSlot, page: Page) {
        *self.page_mut(slot) = page;
    }

    fn slot_top(&self, slot: PageSlot) -> Option<f32> {
        match slot {
            PageSlot::Current => Some(self.scroll_offset),
            PageSlot::Prev if self.continuous => Some(self.scroll_offset - self.prev.height),
            PageSlot::Next if self.continuous => Some(self.scroll_offset + self.current.height),
            _ => None,
        }
    }

    fn locate_line(&self, point: Point) -> Option<(PageSlot, usize)> {
        PageSlot::ALL.into_iter().find_map(|slot| {
            let top = self.slot_top(slot)?;
            let y = point.y - top;
            self.page(slot)
                .lines
                .iter()
                .position(|line| line.contains_y(y))
                .map(|line| (slot, line))
        })
    }

    /// The column immediately before `pos`, crossing line and slot boundaries
    pub fn position_before(&self, pos: TextPosition) -> Option<TextPosition> {
        if pos.column > 0 {
            return Some(TextPosition::new(pos.slot, pos.line, pos.column - 1));
        }
        let mut slot = pos.slot;
        let mut line = pos.line;
        loop {
            while line > 0 {
                line -= 1;
                let len = self.page(slot).line(line).map_or(0, |l| l.columns.len());
                if len > 0 {
                    return Some(TextPosition::new(slot, line, len - 1));
                }
            }
            slot = slot.before()?;
            line = self.page(slot).lines.len();
        }
    }

    /// Positions of every column in `range`, in order
    pub fn positions_in(&self, range: SelectionRange) -> Vec<TextPosition> {
        let mut positions = Vec::new();
        for slot in PageSlot::ALL {
            if slot < range.start().slot || slot > range.end().slot {
                continue;
            }
            for (li, line) in self.page(slot).lines.iter().enumerate() {
                for ci in 0..line.columns.len() {
                    let pos = TextPosition::new(slot, li, ci);
                    if range.contains(pos) {
                        positions.push(pos);
                    }
                }
            }
        }
        positions
    }

    /// Rewrite `selected` flags so exactly the columns in `range` are set
    pub fn mark_selected(&mut self, range: SelectionRange) {
        for slot in PageSlot::ALL {
            let page = self.page_mut(slot);
            for (li, line) in page.lines.iter_mut().enumerate() {
                for ci in 0..line.columns.len() {
                    let inside = range.contains(TextPosition::new(slot, li, ci));
                    line.set_selected(ci, inside);
                }
            }
        }
    }

    pub fn clear_selection(&mut self, clear_search: bool) {
        for slot in PageSlot::ALL {
            for line in &mut self.page_mut(slot).lines {
                line.clear_selection(clear_search);
            }
        }
    }

    pub fn text_in(&self, range: SelectionRange) -> String {
        self.positions_in(range)
            .into_iter()
            .filter_map(|pos| {
                self.page(pos.slot)
                    .line(pos.line)
                    .and_then(|line| line.column(pos.column))
                    .map(|col| col.as_str().to_string())
            })
            .collect()
    }
}

impl HitTest for PageWindow {
    fn hit_test(&self, point: Point) -> Option<TextPosition> {
        let (slot, line_index) = self.locate_line(point)?;
        let line = &self.page(slot).lines[line_index];
        let column = line.columns.iter().position(|c| c.contains_x(point.x))?;
        Some(TextPosition::new(slot, line_index, column))
    }

    fn hit_test_nearest(&self, point: Point) -> Option<TextPosition> {
        let (slot, line_index) = self.locate_line(point)?;
        let columns = &self.page(slot).lines[line_index].columns;
        let first = columns.first()?;
        let column = if point.x < first.start {
            0
        } else {
            columns
                .iter()
                .position(|c| c.contains_x(point.x))
                .unwrap_or(columns.len() - 1)
        };
        Some(TextPosition::new(slot, line_index, column))
    }
}
