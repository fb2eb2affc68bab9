use log::{debug, info};

use crate::layout::{PageSize, layout_chapter};
use crate::model::{Chapter, Page};
use crate::navigator::DocumentSource;

/// Raw chapter text before layout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterText {
    pub title: String,
    pub body: String,
}

/// Split a plain-text book into chapters. A line starting with `# ` opens a
/// chapter; text before the first heading becomes an untitled one.
pub fn split_chapters(text: &str) -> Vec<ChapterText> {
    let mut chapters = Vec::new();
    let mut current: Option<ChapterText> = None;
    let mut preface = String::new();

    for line in text.lines() {
        if let Some(title) = line.strip_prefix("# ") {
            if let Some(done) = current.take() {
                chapters.push(done);
            }
            current = Some(ChapterText {
                title: title.trim().to_string(),
                body: String::new(),
            });
            continue;
        }
        let body = match current.as_mut() {
            Some(chapter) => &mut chapter.body,
            None => &mut preface,
        };
        body.push_str(line);
        body.push('\n');
    }
    if let Some(done) = current {
        chapters.push(done);
    }
    if !preface.trim().is_empty() {
        chapters.insert(
            0,
            ChapterText {
                title: "Untitled".to_string(),
                body: preface,
            },
        );
    }
    chapters
}

/// In-memory book. Keeps the current chapter and its neighbours laid out and
/// drops the rest.
pub struct Book {
    texts: Vec<ChapterText>,
    chapters: Vec<Option<Chapter>>,
    size: PageSize,
    chapter_index: usize,
    page_index: Option<usize>,
    continuous: bool,
    laid_out: Vec<Page>,
}

impl Book {
    pub fn new(texts: Vec<ChapterText>, size: PageSize) -> Self {
        let chapters = texts.iter().map(|_| None).collect();
        let mut book = Self {
            texts,
            chapters,
            size,
            chapter_index: 0,
            page_index: Some(0),
            continuous: false,
            laid_out: Vec::new(),
        };
        book.load_window();
        book
    }

    pub fn from_text(text: &str, size: PageSize) -> Self {
        Self::new(split_chapters(text), size)
    }

    pub fn chapter_count(&self) -> usize {
        self.texts.len()
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        self.chapters.get(index).is_some_and(Option::is_some)
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    /// Re-layout for a new page size, keeping the cursor in range
    pub fn resize(&mut self, size: PageSize) {
        if size == self.size {
            return;
        }
        info!("relayout for {}x{}", size.columns, size.rows);
        self.size = size;
        self.chapters.iter_mut().for_each(|slot| *slot = None);
        self.load_window();
        let last = self
            .current_chapter()
            .map_or(0, |ch| ch.page_count().saturating_sub(1));
        self.page_index = self.page_index.map(|i| i.min(last));
    }

    /// Jump to a chapter's first page
    pub fn open_chapter(&mut self, index: usize) -> bool {
        if index >= self.texts.len() {
            return false;
        }
        self.chapter_index = index;
        self.page_index = Some(0);
        self.load_window();
        true
    }

    /// Pages laid out since the last call, in layout order
    pub fn take_laid_out(&mut self) -> Vec<Page> {
        std::mem::take(&mut self.laid_out)
    }

    fn load_window(&mut self) {
        let keep = self.chapter_index.saturating_sub(1)..=self.chapter_index + 1;
        for index in 0..self.chapters.len() {
            if !keep.contains(&index) {
                if self.chapters[index].take().is_some() {
                    debug!("evicted chapter {index}");
                }
                continue;
            }
            if self.chapters[index].is_none() {
                let text = &self.texts[index];
                let chapter = layout_chapter(index, &text.title, &text.body, self.size);
                debug!("laid out chapter {index}: {} pages", chapter.page_count());
                self.laid_out.extend(chapter.pages().iter().cloned());
                self.chapters[index] = Some(chapter);
            }
        }
    }

    fn chapter(&self, index: Option<usize>) -> Option<&Chapter> {
        index
            .and_then(|i| self.chapters.get(i))
            .and_then(Option::as_ref)
    }
}

impl DocumentSource for Book {
    fn current_chapter(&self) -> Option<&Chapter> {
        self.chapter(Some(self.chapter_index))
    }

    fn next_chapter(&self) -> Option<&Chapter> {
        self.chapter(Some(self.chapter_index + 1))
    }

    fn prev_chapter(&self) -> Option<&Chapter> {
        self.chapter(self.chapter_index.checked_sub(1))
    }

    fn chapter_index(&self) -> usize {
        self.chapter_index
    }

    fn page_index(&self) -> Option<usize> {
        self.page_index
    }

    fn set_page_index(&mut self, index: usize) {
        self.page_index = Some(index);
    }

    fn is_continuous_scroll(&self) -> bool {
        self.continuous
    }

    fn set_continuous_scroll(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    fn has_next_chapter(&self) -> bool {
        self.chapter_index + 1 < self.texts.len()
    }

    fn has_prev_chapter(&self) -> bool {
        self.chapter_index > 0
    }

    fn move_to_next_chapter(&mut self, _commit: bool) -> bool {
        if !self.has_next_chapter() {
            return false;
        }
        self.chapter_index += 1;
        self.page_index = Some(0);
        self.load_window();
        true
    }

    fn move_to_prev_chapter(&mut self, _commit: bool, land_on_last: bool) -> bool {
        if !self.has_prev_chapter() {
            return false;
        }
        self.chapter_index -= 1;
        self.load_window();
        let last = self
            .current_chapter()
            .map_or(0, |ch| ch.page_count().saturating_sub(1));
        self.page_index = Some(if land_on_last { last } else { 0 });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Front matter.\n# One\nFirst chapter body.\n# Two\nSecond.\n# Three\nThird.\n";

    #[test]
    fn headings_split_chapters() {
        let chapters = split_chapters(TEXT);
        let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Untitled", "One", "Two", "Three"]);
        assert_eq!(chapters[1].body, "First chapter body.\n");
    }

    #[test]
    fn only_neighbours_stay_loaded() {
        let mut book = Book::from_text(TEXT, PageSize::new(40, 10));
        assert!(book.is_loaded(0) && book.is_loaded(1) && !book.is_loaded(2));

        assert!(book.move_to_next_chapter(true));
        assert!(book.move_to_next_chapter(true));
        assert_eq!(book.chapter_index(), 2);
        assert!(!book.is_loaded(0));
        assert!(book.is_loaded(3));
        assert!(book.move_to_next_chapter(true));
        assert!(!book.move_to_next_chapter(true));
        assert_eq!(book.chapter_index(), 3);
    }

    #[test]
    fn laid_out_pages_are_reported_once() {
        let mut book = Book::from_text(TEXT, PageSize::new(40, 10));
        assert_eq!(book.take_laid_out().len(), 2);
        assert!(book.take_laid_out().is_empty());
        book.open_chapter(3);
        let reported: Vec<_> = book.take_laid_out().iter().map(|p| p.chapter_index).collect();
        assert_eq!(reported, vec![2, 3]);
    }

    #[test]
    fn resize_clamps_page_index() {
        let long = format!("# Long\n{}", "word ".repeat(200));
        let mut book = Book::from_text(&long, PageSize::new(10, 3));
        let last = book.current_chapter().unwrap().page_count() - 1;
        book.set_page_index(last);
        book.resize(PageSize::new(80, 40));
        assert_eq!(book.page_index(), Some(0));
    }
}
