pub mod test_helpers {
    use crate::event_source::{Event, KeyCode, SimulatedEventSource};
    use crate::model::{Chapter, Column, Line, Page, PageWindow};
    use crate::navigator::DocumentSource;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Page whose lines are one cell tall, one column per char, one cell wide.
    /// The flag marks the line as a paragraph end.
    pub fn page_from_lines(lines: &[(&str, bool)]) -> Page {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(row, (text, paragraph_end))| {
                let columns = text
                    .chars()
                    .enumerate()
                    .map(|(x, c)| Column::text(c.to_string(), x as f32, x as f32 + 1.0))
                    .collect();
                Line::new(columns, row as f32, row as f32 + 1.0).with_paragraph_end(*paragraph_end)
            })
            .collect();
        Page::new(0, 0, "Test", lines)
    }

    pub fn window_with_current(lines: &[(&str, bool)]) -> PageWindow {
        PageWindow::new(Page::empty(), page_from_lines(lines), Page::empty())
    }

    /// Completed chapter with `pages` content pages of two lines each
    pub fn chapter_with_pages(index: usize, pages: usize) -> Chapter {
        let title = format!("Chapter {}", index + 1);
        let pages = (0..pages)
            .map(|p| {
                let mut page = page_from_lines(&[
                    (&format!("Page {} of chapter {}", p + 1, index + 1), false),
                    ("ends here.", true),
                ]);
                page.title = title.clone();
                page
            })
            .collect();
        Chapter::with_pages(index, title, pages)
    }

    /// In-memory document source with directly editable state
    pub struct StubSource {
        pub chapters: Vec<Option<Chapter>>,
        pub chapter_index: usize,
        pub page_index: Option<usize>,
        pub continuous: bool,
    }

    impl StubSource {
        /// One completed chapter per entry in `page_counts`
        pub fn loaded(page_counts: &[usize], chapter_index: usize, page_index: usize) -> Self {
            Self {
                chapters: page_counts
                    .iter()
                    .enumerate()
                    .map(|(i, &n)| Some(chapter_with_pages(i, n)))
                    .collect(),
                chapter_index,
                page_index: Some(page_index),
                continuous: false,
            }
        }

        pub fn highlight_all_read_aloud(&mut self) {
            for slot in &mut self.chapters {
                let Some(chapter) = slot.take() else {
                    continue;
                };
                let pages = chapter
                    .pages()
                    .iter()
                    .cloned()
                    .map(|mut page| {
                        for line in &mut page.lines {
                            line.set_read_aloud(true);
                        }
                        page
                    })
                    .collect();
                *slot = Some(Chapter::with_pages(chapter.index, chapter.title, pages));
            }
        }

        fn chapter(&self, index: Option<usize>) -> Option<&Chapter> {
            index.and_then(|i| self.chapters.get(i)).and_then(Option::as_ref)
        }
    }

    impl DocumentSource for StubSource {
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
            self.chapter_index + 1 < self.chapters.len()
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
            true
        }

        fn move_to_prev_chapter(&mut self, _commit: bool, land_on_last: bool) -> bool {
            if !self.has_prev_chapter() {
                return false;
            }
            self.chapter_index -= 1;
            let last = self
                .current_chapter()
                .map_or(0, |ch| ch.page_count().saturating_sub(1));
            self.page_index = Some(if land_on_last { last } else { 0 });
            true
        }
    }

    /// Builder for creating test scenarios with simulated user input
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl Default for TestScenarioBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events.push(SimulatedEventSource::key(code));
            self
        }

        /// Click without moving (a tap)
        pub fn click(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::mouse_down(column, row));
            self.events.push(SimulatedEventSource::mouse_up(column, row));
            self
        }

        /// Press at `from`, drag through each cell toward `to`, release there
        pub fn drag(mut self, from: (u16, u16), to: (u16, u16)) -> Self {
            self.events.push(SimulatedEventSource::mouse_down(from.0, from.1));
            let steps = from.0.abs_diff(to.0).max(from.1.abs_diff(to.1)).max(1);
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                let x = from.0 as f32 + (to.0 as f32 - from.0 as f32) * t;
                let y = from.1 as f32 + (to.1 as f32 - from.1 as f32) * t;
                self.events
                    .push(SimulatedEventSource::mouse_drag(x.round() as u16, y.round() as u16));
            }
            self.events.push(SimulatedEventSource::mouse_up(to.0, to.1));
            self
        }

        pub fn next_page(self) -> Self {
            self.press_key(KeyCode::Right)
        }

        pub fn prev_page(self) -> Self {
            self.press_key(KeyCode::Left)
        }

        pub fn quit(self) -> Self {
            self.press_char('q')
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Terminal buffer as text, trailing blanks trimmed
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use crate::navigator::DocumentSource;

    #[test]
    fn scenario_builder_expands_gestures() {
        let scenario = TestScenarioBuilder::new()
            .click(3, 4)
            .drag((10, 2), (4, 2))
            .next_page()
            .quit()
            .build();

        // click: 2, drag: down + 6 moves + up, key, quit
        assert_eq!(scenario.events.len(), 2 + 8 + 1 + 1);
    }

    #[test]
    fn page_from_lines_lays_out_unit_cells() {
        let page = page_from_lines(&[("ab", false), ("c", true)]);
        assert_eq!(page.line_count(), 2);
        assert_eq!(page.lines[1].top, 1.0);
        assert_eq!(page.lines[0].columns[1].start, 1.0);
        assert!(page.lines[1].paragraph_end);
        assert_eq!(page.height, 2.0);
    }

    #[test]
    fn stub_source_lands_on_last_page_when_asked() {
        let mut source = StubSource::loaded(&[4, 1], 1, 0);
        assert!(source.move_to_prev_chapter(true, true));
        assert_eq!(source.page_index(), Some(3));
        assert!(source.move_to_next_chapter(true));
        assert!(source.move_to_prev_chapter(true, false));
        assert_eq!(source.page_index(), Some(0));
    }
}
