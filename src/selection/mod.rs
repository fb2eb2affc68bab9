//! Word-bounded text selection over the page window
//!
//! A long press anchors a selection on the word under the finger; dragging
//! then grows the range forward or backward from that anchor.

mod segment;

use log::debug;

pub use segment::{UnicodeWords, WordSegmenter, segment_containing};

use crate::model::{HitTest, Page, PageSlot, PageWindow, Point, SelectionRange, TextPosition};

/// A paragraph rebuilt from consecutive lines of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub first_line: usize,
    /// Inclusive
    pub last_line: usize,
    /// Character offset of the hit column within `text`
    pub offset: usize,
}

impl Paragraph {
    /// Rebuild the paragraph around (line, column).
    ///
    /// Walks backward until the line before is a paragraph end, then forward
    /// until a paragraph end is included.
    pub fn around(page: &Page, line: usize, column: usize) -> Option<Self> {
        let hit = page.line(line)?;
        let mut text = String::new();
        let mut offset = hit.char_offset_of(column);
        let mut first_line = line;

        for index in (0..line).rev() {
            let prior = &page.lines[index];
            if prior.paragraph_end {
                break;
            }
            text.insert_str(0, &prior.text());
            offset += prior.char_len();
            first_line = index;
        }

        let mut last_line = line;
        for (index, next) in page.lines.iter().enumerate().skip(line) {
            text.push_str(&next.text());
            last_line = index;
            if next.paragraph_end {
                break;
            }
        }

        Some(Self {
            text,
            first_line,
            last_line,
            offset,
        })
    }

    /// Map a character offset back to the column covering it
    pub fn position_at(&self, page: &Page, slot: PageSlot, offset: usize) -> Option<TextPosition> {
        let mut ci = 0;
        for index in self.first_line..=self.last_line {
            let line = page.line(index)?;
            for (j, column) in line.columns.iter().enumerate() {
                let len = column.char_len();
                if offset >= ci && offset < ci + len {
                    return Some(TextPosition::new(slot, index, j));
                }
                ci += len;
            }
        }
        None
    }
}

pub struct SelectionEngine<W = UnicodeWords> {
    segmenter: W,
    anchor: Option<TextPosition>,
    range: Option<SelectionRange>,
}

impl Default for SelectionEngine<UnicodeWords> {
    fn default() -> Self {
        Self::new(UnicodeWords)
    }
}

impl<W: WordSegmenter> SelectionEngine<W> {
    pub fn new(segmenter: W) -> Self {
        Self {
            segmenter,
            anchor: None,
            range: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.range.is_some()
    }

    pub fn anchor(&self) -> Option<TextPosition> {
        self.anchor
    }

    pub fn range(&self) -> Option<SelectionRange> {
        self.range
    }

    /// Select the word under `point`
    pub fn anchor_at(&mut self, window: &mut PageWindow, point: Point) -> Option<SelectionRange> {
        let pos = window.hit_test(point)?;
        self.anchor_at_position(window, pos)
    }

    pub fn anchor_at_position(
        &mut self,
        window: &mut PageWindow,
        pos: TextPosition,
    ) -> Option<SelectionRange> {
        let page = window.page(pos.slot);
        page.line(pos.line)?.column(pos.column)?;

        let paragraph = Paragraph::around(page, pos.line, pos.column)?;
        let bounds = self.segmenter.boundaries(&paragraph.text);
        let (start, end) = segment_containing(&bounds, paragraph.offset)?;

        let start_pos = paragraph.position_at(page, pos.slot, start)?;
        let end_pos = paragraph.position_at(page, pos.slot, end - 1)?;
        let range = SelectionRange::ordered(start_pos, end_pos);

        debug!(
            "anchor at {pos:?}: word [{start}, {end}) in lines {}..={}",
            paragraph.first_line, paragraph.last_line
        );

        window.mark_selected(range);
        self.anchor = Some(pos);
        self.range = Some(range);
        Some(range)
    }

    /// Grow the selection from the anchor toward `point`
    pub fn extend_to(&mut self, window: &mut PageWindow, point: Point) -> Option<SelectionRange> {
        self.anchor?;
        let pos = window.hit_test_nearest(point)?;
        self.extend_to_position(window, pos)
    }

    pub fn extend_to_position(
        &mut self,
        window: &mut PageWindow,
        pos: TextPosition,
    ) -> Option<SelectionRange> {
        let anchor = self.anchor?;
        let (start, end) = if pos < anchor {
            // Backward: stop just before the anchor
            (pos, window.position_before(anchor).unwrap_or(pos))
        } else {
            (anchor, pos)
        };
        let range = SelectionRange::ordered(start, end);

        window.mark_selected(range);
        self.range = Some(range);
        Some(range)
    }

    /// Drop the selection and anchor. Does nothing when no selection is active.
    pub fn cancel(&mut self, window: &mut PageWindow, clear_search: bool) {
        if !self.is_active() {
            return;
        }
        window.clear_selection(clear_search);
        self.anchor = None;
        self.range = None;
    }

    pub fn selected_text(&self, window: &PageWindow) -> Option<String> {
        self.range.map(|range| window.text_in(range))
    }
}
