//! Plain-text pagination into terminal cells
//!
//! One grapheme becomes one column, one terminal row one line. Wrapped lines
//! keep their trailing spaces so that joining the lines of a paragraph gives
//! back the paragraph text exactly.

use textwrap::WordSeparator;
use textwrap::core::break_words;
use textwrap::wrap_algorithms::wrap_first_fit;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::model::{Chapter, Column, Line, LineRole, Page};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSize {
    pub columns: u16,
    pub rows: u16,
}

impl PageSize {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }
}

/// Wrap one paragraph into row strings, trailing whitespace included
pub fn wrap_paragraph(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let words = WordSeparator::AsciiSpace.find_words(text);
    let words = break_words(words, width);
    let rows = wrap_first_fit(&words, &[width as f64]);
    rows.into_iter()
        .map(|row| {
            row.iter()
                .map(|word| format!("{}{}", word.word, word.whitespace))
                .collect()
        })
        .collect()
}

fn build_line(text: &str, row: usize, paragraph_end: bool, role: LineRole) -> Line {
    let mut x = 0.0;
    let columns = text
        .graphemes(true)
        .map(|g| {
            let start = x;
            x += g.width() as f32;
            Column::text(g, start, x)
        })
        .collect();
    Line::new(columns, row as f32, row as f32 + 1.0)
        .with_paragraph_end(paragraph_end)
        .with_role(role)
}

/// Lay out a chapter. The title heads the first page; paragraphs are
/// separated by newlines and blank lines are dropped.
pub fn paginate(chapter_index: usize, title: &str, text: &str, size: PageSize) -> Vec<Page> {
    let width = size.columns as usize;
    let rows_per_page = size.rows as usize;

    let mut rows: Vec<(String, bool, LineRole)> = Vec::new();
    for row in wrap_paragraph(title, width) {
        rows.push((row, false, LineRole::Title));
    }
    if let Some(last) = rows.last_mut() {
        last.1 = true;
    }
    for paragraph in text.lines().map(str::trim_end).filter(|p| !p.trim().is_empty()) {
        let wrapped = wrap_paragraph(paragraph, width);
        let count = wrapped.len();
        for (i, row) in wrapped.into_iter().enumerate() {
            rows.push((row, i + 1 == count, LineRole::Body));
        }
    }

    rows.chunks(rows_per_page)
        .enumerate()
        .map(|(index, chunk)| {
            let lines = chunk
                .iter()
                .enumerate()
                .map(|(row, (text, end, role))| build_line(text, row, *end, *role))
                .collect();
            Page::new(index, chapter_index, title, lines)
        })
        .collect()
}

pub fn layout_chapter(index: usize, title: &str, text: &str, size: PageSize) -> Chapter {
    Chapter::with_pages(index, title, paginate(index, title, text, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_rows_rejoin_to_paragraph() {
        let text = "the quick brown fox jumps over the lazy dog";
        let rows = wrap_paragraph(text, 10);
        assert!(rows.len() > 1);
        assert_eq!(rows.concat(), text);
        assert!(rows.iter().all(|r| r.trim_end().width() <= 10));
    }

    #[test]
    fn long_word_is_broken() {
        let rows = wrap_paragraph("abcdefghijkl", 5);
        assert_eq!(rows, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn pages_split_by_rows_and_mark_paragraph_ends() {
        let pages = paginate(2, "Title", "one two three\nfour\n\nfive", PageSize::new(8, 3));
        let lines: Vec<_> = pages.iter().flat_map(|p| p.lines.iter()).collect();
        let texts: Vec<_> = lines.iter().map(|l| l.text()).collect();
        assert_eq!(texts, vec!["Title", "one two ", "three", "four", "five"]);
        let ends: Vec<_> = lines.iter().map(|l| l.paragraph_end).collect();
        assert_eq!(ends, vec![true, false, true, true, true]);
        assert!(lines[0].is_title());

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].index, 1);
        assert_eq!(pages[1].chapter_index, 2);
        assert_eq!(pages[1].lines[0].top, 0.0);
    }

    #[test]
    fn wide_graphemes_take_two_cells() {
        let pages = paginate(0, "T", "日本", PageSize::new(10, 5));
        let line = &pages[0].lines[1];
        assert_eq!(line.columns.len(), 2);
        assert_eq!(line.columns[1].start, 2.0);
        assert_eq!(line.columns[1].end, 4.0);
    }

    #[test]
    fn empty_chapter_still_has_title_page() {
        let chapter = layout_chapter(0, "Empty", "", PageSize::new(20, 4));
        assert!(chapter.is_completed());
        assert_eq!(chapter.page_count(), 1);
    }
}
