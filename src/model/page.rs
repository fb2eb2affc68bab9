use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::column::Column;
use super::line::{Line, LineRole};

/// How a page came to be
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageKind {
    /// Laid out from chapter content
    Content,
    /// Stand-in carrying only the chapter title while layout is pending
    TitlePlaceholder,
    /// Synthetic page carrying a system message
    Message,
    /// Nothing to show; the chapter itself is missing
    #[default]
    Empty,
}

/// One screen's worth of laid-out lines
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// Index within the owning chapter
    pub index: usize,
    pub title: String,
    pub lines: Vec<Line>,
    pub chapter_index: usize,
    /// Page count of the owning chapter when this page was produced
    pub chapter_size: usize,
    pub kind: PageKind,
    pub height: f32,
}

impl Page {
    pub fn new(index: usize, chapter_index: usize, title: impl Into<String>, lines: Vec<Line>) -> Self {
        let height = lines.last().map(|l| l.bottom).unwrap_or(0.0);
        Self {
            index,
            title: title.into(),
            lines,
            chapter_index,
            chapter_size: 0,
            kind: PageKind::Content,
            height,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn title_placeholder(title: &str, chapter_index: usize) -> Self {
        Self {
            title: title.to_string(),
            lines: vec![single_line(title, LineRole::Title)],
            chapter_index,
            kind: PageKind::TitlePlaceholder,
            height: 1.0,
            ..Self::default()
        }
    }

    pub fn message(text: &str) -> Self {
        Self {
            lines: vec![single_line(text, LineRole::Body)],
            kind: PageKind::Message,
            height: 1.0,
            ..Self::default()
        }
    }

    pub fn is_content(&self) -> bool {
        self.kind == PageKind::Content
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn text(&self) -> String {
        self.lines.iter().map(Line::text).collect()
    }

    /// Character offset of (line, column) from the start of the page
    pub fn char_position(&self, line: usize, column: usize) -> usize {
        let before: usize = self.lines.iter().take(line).map(Line::char_len).sum();
        let within = self.lines.get(line).map(|l| l.char_offset_of(column)).unwrap_or(0);
        before + within
    }

    /// A copy with narration highlight removed, for non-current slots
    pub fn without_read_aloud(mut self) -> Self {
        for line in &mut self.lines {
            line.set_read_aloud(false);
            line.clear_redraw();
        }
        self
    }

    pub fn redraw_requested(&self) -> bool {
        self.lines.iter().any(Line::redraw_requested)
    }

    pub fn clear_redraw(&mut self) {
        self.lines.iter_mut().for_each(Line::clear_redraw);
    }

    pub fn has_selection(&self) -> bool {
        self.lines
            .iter()
            .any(|l| l.columns.iter().any(Column::is_selected))
    }
}

fn single_line(text: &str, role: LineRole) -> Line {
    let mut x = 0.0;
    let columns = text
        .graphemes(true)
        .map(|g| {
            let start = x;
            x += g.width().max(1) as f32;
            Column::text(g, start, x)
        })
        .collect();
    Line::new(columns, 0.0, 1.0)
        .with_paragraph_end(true)
        .with_role(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_page_is_single_line() {
        let page = Page::message("Loading chapter…");
        assert_eq!(page.kind, PageKind::Message);
        assert_eq!(page.line_count(), 1);
        assert_eq!(page.text(), "Loading chapter…");
        assert!(page.lines[0].paragraph_end);
    }

    #[test]
    fn placeholder_carries_title_only() {
        let page = Page::title_placeholder("Chapter 3", 2);
        assert_eq!(page.kind, PageKind::TitlePlaceholder);
        assert_eq!(page.title, "Chapter 3");
        assert_eq!(page.chapter_index, 2);
        assert!(page.lines[0].is_title());
    }

    #[test]
    fn char_position_spans_lines() {
        let page = Page::new(
            0,
            0,
            "t",
            vec![single_line("hello ", LineRole::Body), single_line("world", LineRole::Body)],
        );
        assert_eq!(page.char_position(0, 0), 0);
        assert_eq!(page.char_position(1, 2), 8);
    }

    #[test]
    fn read_aloud_is_stripped() {
        let mut line = single_line("spoken", LineRole::Body);
        line.set_read_aloud(true);
        let page = Page::new(0, 0, "t", vec![line]).without_read_aloud();
        assert!(!page.lines[0].is_read_aloud());
        assert!(!page.redraw_requested());
    }
}
