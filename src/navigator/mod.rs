//! Page navigation across page and chapter boundaries
//!
//! The navigator owns no pages. It reads chapters from a [`DocumentSource`],
//! moves the source's cursor, and builds page snapshots on demand.

mod rules;

use log::debug;

use crate::model::{Chapter, Page};
use rules::{Lookup, Resolution, Rule};

/// Chapter cache and cursor owned by the host
pub trait DocumentSource {
    fn current_chapter(&self) -> Option<&Chapter>;
    fn next_chapter(&self) -> Option<&Chapter>;
    fn prev_chapter(&self) -> Option<&Chapter>;

    fn chapter_index(&self) -> usize;

    /// In-chapter page index; `None` until the chapter has been resolved
    fn page_index(&self) -> Option<usize>;
    fn set_page_index(&mut self, index: usize);

    fn is_continuous_scroll(&self) -> bool;

    /// Follow the page animation into or out of continuous scrolling
    fn set_continuous_scroll(&mut self, _continuous: bool) {}

    fn has_next_chapter(&self) -> bool;
    fn has_prev_chapter(&self) -> bool;

    /// Step to the first page of the next chapter. Loading may finish later.
    fn move_to_next_chapter(&mut self, commit: bool) -> bool;

    /// Step to the previous chapter, landing on its last page or its first.
    fn move_to_prev_chapter(&mut self, commit: bool, land_on_last: bool) -> bool;
}

/// The reading position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationCursor {
    pub chapter_index: usize,
    pub page_index: Option<usize>,
}

/// Direction of a page turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageDirection {
    Prev,
    Next,
}

enum Step {
    Chapter,
    Page(usize),
    Blocked(&'static str),
}

pub struct PageNavigator<S> {
    source: S,
    message: Option<String>,
    keep_swipe_tip: String,
    buffers_stale: bool,
}

impl<S: DocumentSource> PageNavigator<S> {
    pub fn new(source: S, keep_swipe_tip: impl Into<String>) -> Self {
        Self {
            source,
            message: None,
            keep_swipe_tip: keep_swipe_tip.into(),
            buffers_stale: true,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn cursor(&self) -> NavigationCursor {
        NavigationCursor {
            chapter_index: self.source.chapter_index(),
            page_index: self.source.page_index(),
        }
    }

    /// Show `message` in place of every page until cleared
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.buffers_stale = true;
    }

    pub fn clear_message(&mut self) {
        if self.message.take().is_some() {
            self.buffers_stale = true;
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Page buffers need recomputing since the last call
    pub fn take_stale(&mut self) -> bool {
        std::mem::take(&mut self.buffers_stale)
    }

    pub fn mark_stale(&mut self) {
        self.buffers_stale = true;
    }

    pub fn has_prev(&self) -> bool {
        self.source.has_prev_chapter() || self.source.page_index().is_some_and(|i| i > 0)
    }

    pub fn has_next(&self) -> bool {
        self.source.has_next_chapter()
            || self
                .source
                .current_chapter()
                .is_some_and(|ch| !on_last_page(ch, self.source.page_index()))
    }

    pub fn has_next_plus(&self) -> bool {
        if self.source.has_next_chapter() {
            return true;
        }
        match (self.source.current_chapter(), self.source.page_index()) {
            (Some(ch), Some(index)) => index + 2 < ch.page_count(),
            (Some(ch), None) => ch.page_count() > 1,
            (None, _) => false,
        }
    }

    pub fn move_to_first(&mut self) {
        self.source.set_page_index(0);
    }

    pub fn move_to_last(&mut self) {
        let last = self
            .source
            .current_chapter()
            .map_or(0, |ch| ch.page_count().saturating_sub(1));
        self.source.set_page_index(last);
    }

    pub fn move_to_next(&mut self, commit: bool) -> bool {
        if !self.has_next() {
            return false;
        }
        let step = self.next_step();
        self.apply(step, commit, PageDirection::Next)
    }

    pub fn move_to_prev(&mut self, commit: bool) -> bool {
        if !self.has_prev() {
            return false;
        }
        let step = self.prev_step();
        self.apply(step, commit, PageDirection::Prev)
    }

    fn next_step(&self) -> Step {
        let current = self.source.current_chapter();
        let cursor = self.source.page_index();
        let at_chapter_end = current.is_none_or(|ch| on_last_page(ch, cursor));

        if at_chapter_end {
            let next_unknown = self.source.next_chapter().is_none();
            if current.is_none() && next_unknown {
                return Step::Blocked("no chapter loaded");
            }
            if self.source.is_continuous_scroll() && next_unknown {
                return Step::Blocked("next chapter not loaded in scroll mode");
            }
            return Step::Chapter;
        }

        match (cursor, current) {
            (None, _) => Step::Blocked("page index undetermined"),
            (Some(index), Some(ch)) if ch.is_last_index_current(index) => {
                Step::Blocked("chapter still laying out")
            }
            (Some(index), _) => Step::Page(index + 1),
        }
    }

    fn prev_step(&self) -> Step {
        match self.source.page_index() {
            None | Some(0) => {
                let prev = self.source.prev_chapter();
                if self.source.current_chapter().is_none() && prev.is_none() {
                    Step::Blocked("no chapter loaded")
                } else if prev.is_some_and(|ch| !ch.is_completed()) {
                    Step::Blocked("previous chapter still laying out")
                } else {
                    Step::Chapter
                }
            }
            Some(index) => {
                if self.source.current_chapter().is_none() {
                    Step::Blocked("current chapter not loaded")
                } else {
                    Step::Page(index - 1)
                }
            }
        }
    }

    fn apply(&mut self, step: Step, commit: bool, direction: PageDirection) -> bool {
        let moved = match (step, direction) {
            (Step::Blocked(reason), _) => {
                debug!("move {direction:?} blocked: {reason}");
                false
            }
            (Step::Page(index), _) => {
                self.source.set_page_index(index);
                true
            }
            (Step::Chapter, PageDirection::Next) => self.source.move_to_next_chapter(commit),
            (Step::Chapter, PageDirection::Prev) => self.source.move_to_prev_chapter(commit, true),
        };
        if moved {
            debug!("moved {direction:?} to {:?}", self.cursor());
            if commit {
                self.buffers_stale = true;
            }
        }
        moved
    }

    fn lookup(&self) -> Lookup<'_> {
        Lookup {
            message: self.message.as_deref(),
            cursor: self.source.page_index(),
            current: self.source.current_chapter(),
            next: self.source.next_chapter(),
            prev: self.source.prev_chapter(),
        }
    }

    fn build(&self, rules: &[Rule], lookahead: bool) -> Page {
        let lookup = self.lookup();
        let page = match rules::resolve(rules, &lookup) {
            Resolution::Message(text) => return Page::message(text),
            Resolution::SwipeTip => return Page::message(&self.keep_swipe_tip),
            Resolution::Empty => return Page::empty(),
            Resolution::Title(ch) => return Page::title_placeholder(&ch.title, ch.index),
            Resolution::Page(page) => page.clone(),
        };
        if lookahead {
            page.without_read_aloud()
        } else {
            page
        }
    }

    pub fn cur_page(&self) -> Page {
        self.build(rules::CURRENT, false)
    }

    pub fn next_page(&self) -> Page {
        self.build(rules::NEXT, true)
    }

    pub fn prev_page(&self) -> Page {
        self.build(rules::PREV, true)
    }

    pub fn next_plus_page(&self) -> Page {
        self.build(rules::NEXT_PLUS, true)
    }
}

fn on_last_page(chapter: &Chapter, cursor: Option<usize>) -> bool {
    match cursor {
        Some(index) => chapter.is_last_index(index),
        None => chapter.is_completed() && chapter.page_count() == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageKind;
    use crate::test_utils::test_helpers::StubSource;

    fn navigator(source: StubSource) -> PageNavigator<StubSource> {
        PageNavigator::new(source, "keep swiping")
    }

    #[test]
    fn steps_through_pages_inside_chapter() {
        let mut nav = navigator(StubSource::loaded(&[3, 2], 0, 0));
        assert!(nav.move_to_next(false));
        assert_eq!(nav.cursor().page_index, Some(1));
        assert!(nav.move_to_prev(false));
        assert_eq!(nav.cursor().page_index, Some(0));
    }

    #[test]
    fn crosses_into_next_chapter_from_last_page() {
        let mut nav = navigator(StubSource::loaded(&[3, 2], 0, 2));
        assert!(nav.move_to_next(true));
        assert_eq!(
            nav.cursor(),
            NavigationCursor {
                chapter_index: 1,
                page_index: Some(0)
            }
        );
        assert!(nav.take_stale());
        assert!(!nav.take_stale());
    }

    #[test]
    fn backward_crossing_lands_on_last_page() {
        let mut nav = navigator(StubSource::loaded(&[3, 2], 1, 0));
        assert!(nav.move_to_prev(false));
        assert_eq!(nav.cursor().chapter_index, 0);
        assert_eq!(nav.cursor().page_index, Some(2));
    }

    #[test]
    fn first_page_of_book_has_no_prev() {
        let mut nav = navigator(StubSource::loaded(&[2], 0, 0));
        assert!(!nav.has_prev());
        let before = nav.cursor();
        assert!(!nav.move_to_prev(true));
        assert_eq!(nav.cursor(), before);
    }

    #[test]
    fn last_page_of_book_has_no_next() {
        let mut nav = navigator(StubSource::loaded(&[1, 2], 1, 1));
        assert!(!nav.has_next());
        assert!(!nav.has_next_plus());
        assert!(!nav.move_to_next(true));
        assert_eq!(nav.cursor().page_index, Some(1));
    }

    #[test]
    fn scroll_mode_refuses_unloaded_next_chapter() {
        let mut source = StubSource::loaded(&[2, 2], 0, 1);
        source.chapters[1] = None;
        source.continuous = true;
        let mut nav = navigator(source);
        assert!(nav.has_next());
        assert!(!nav.move_to_next(true));
        assert_eq!(nav.cursor().chapter_index, 0);

        nav.source_mut().continuous = false;
        assert!(nav.move_to_next(true));
        assert_eq!(nav.cursor().chapter_index, 1);
    }

    #[test]
    fn waits_for_layout_on_last_laid_out_page() {
        let mut source = StubSource::loaded(&[2], 0, 1);
        source.chapters[0] = Some({
            let mut ch = Chapter::new(0, "Growing");
            ch.push_page(Page::empty());
            ch.push_page(Page::empty());
            ch
        });
        let mut nav = navigator(source);
        assert!(nav.has_next());
        assert!(!nav.move_to_next(false));
        assert_eq!(nav.cursor().page_index, Some(1));
    }

    #[test]
    fn incomplete_previous_chapter_blocks_backward_crossing() {
        let mut source = StubSource::loaded(&[2, 2], 1, 0);
        source.chapters[0] = Some(Chapter::new(0, "Pending"));
        let mut nav = navigator(source);
        assert!(!nav.move_to_prev(false));
        assert_eq!(nav.cursor().chapter_index, 1);
    }

    #[test]
    fn move_to_last_handles_empty_chapter() {
        let mut nav = navigator(StubSource::loaded(&[4], 0, 0));
        nav.move_to_last();
        assert_eq!(nav.cursor().page_index, Some(3));

        let mut empty = navigator(StubSource::loaded(&[0], 0, 0));
        empty.move_to_last();
        assert_eq!(empty.cursor().page_index, Some(0));
    }

    #[test]
    fn message_overrides_all_views() {
        let mut nav = navigator(StubSource::loaded(&[3, 3], 0, 1));
        nav.set_message("Chapter failed to load");
        for page in [nav.cur_page(), nav.next_page(), nav.prev_page(), nav.next_plus_page()] {
            assert_eq!(page.kind, PageKind::Message);
            assert_eq!(page.text(), "Chapter failed to load");
        }
        nav.clear_message();
        assert_eq!(nav.cur_page().kind, PageKind::Content);
    }

    #[test]
    fn views_follow_cursor() {
        let nav = navigator(StubSource::loaded(&[3, 3], 0, 1));
        assert_eq!(nav.cur_page().index, 1);
        assert_eq!(nav.prev_page().index, 0);
        assert_eq!(nav.next_page().index, 2);
        let plus = nav.next_plus_page();
        assert_eq!((plus.chapter_index, plus.index), (1, 0));
    }

    #[test]
    fn missing_chapter_gives_empty_page() {
        let mut source = StubSource::loaded(&[3], 0, 0);
        source.chapters[0] = None;
        let nav = navigator(source);
        assert_eq!(nav.cur_page().kind, PageKind::Empty);
        assert_eq!(nav.next_page().kind, PageKind::Empty);
    }

    #[test]
    fn lookahead_pages_drop_read_aloud() {
        let mut source = StubSource::loaded(&[3], 0, 0);
        source.highlight_all_read_aloud();
        let nav = navigator(source);
        assert!(nav.cur_page().lines.iter().any(|l| l.is_read_aloud()));
        assert!(!nav.next_page().lines.iter().any(|l| l.is_read_aloud()));
        assert!(!nav.next_plus_page().lines.iter().any(|l| l.is_read_aloud()));
    }
}
