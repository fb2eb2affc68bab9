use super::page::Page;

/// A titled unit of the document, split into pages.
///
/// Pages are appended by the layout stage; `completed` flips once the last
/// page has been produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chapter {
    pub index: usize,
    pub title: String,
    pages: Vec<Page>,
    completed: bool,
}

impl Chapter {
    pub fn new(index: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            pages: Vec::new(),
            completed: false,
        }
    }

    /// A fully laid out chapter
    pub fn with_pages(index: usize, title: impl Into<String>, pages: Vec<Page>) -> Self {
        let mut chapter = Self::new(index, title);
        for page in pages {
            chapter.push_page(page);
        }
        chapter.complete();
        chapter
    }

    pub fn push_page(&mut self, mut page: Page) {
        page.index = self.pages.len();
        page.chapter_index = self.index;
        self.pages.push(page);
        let size = self.pages.len();
        for page in &mut self.pages {
            page.chapter_size = size;
        }
    }

    pub fn complete(&mut self) {
        self.completed = true;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn last_page(&self) -> Option<&Page> {
        self.pages.last()
    }

    /// True when `index` is the final page of a completed chapter
    pub fn is_last_index(&self, index: usize) -> bool {
        self.completed && index + 1 >= self.pages.len()
    }

    /// True when `index` is the final page laid out so far
    pub fn is_last_index_current(&self, index: usize) -> bool {
        index + 1 >= self.pages.len()
    }
}
