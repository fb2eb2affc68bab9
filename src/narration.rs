//! Start narration from the beginning of the selection

use log::debug;

use crate::model::{Page, TextPosition};

/// Reading cursor and speech output, as seen by the narration sequence
pub trait NarrationSource {
    /// Advance one page inside the current chapter
    fn move_to_next_page(&mut self) -> bool;

    /// Advance to the next chapter, completing once it is loaded
    fn move_to_next_chapter(&mut self) -> impl Future<Output = bool>;

    fn current_page(&self) -> Page;

    /// Start speaking at a character offset of the current page
    fn read_aloud(&mut self, char_position: usize);
}

/// Step the cursor forward until the selection start is on the current page,
/// then start reading there.
///
/// Dropping the future abandons the sequence between steps; every completed
/// step stays.
pub async fn read_aloud_from_selection<S: NarrationSource>(source: &mut S, start: TextPosition) {
    let mut ahead = start.slot.relative_offset();
    while ahead > 0 {
        if !source.move_to_next_page() {
            let loaded = source.move_to_next_chapter().await;
            debug!("narration crossed chapter boundary (loaded: {loaded})");
        }
        ahead -= 1;
    }
    let position = source.current_page().char_position(start.line, start.column);
    debug!("narration starts at char {position}");
    source.read_aloud(position);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSlot;
    use crate::test_utils::test_helpers::page_from_lines;
    use futures::executor::block_on;

    struct Script {
        pages_left: usize,
        steps: Vec<&'static str>,
        started_at: Option<usize>,
    }

    impl NarrationSource for Script {
        fn move_to_next_page(&mut self) -> bool {
            if self.pages_left == 0 {
                self.steps.push("page-refused");
                return false;
            }
            self.pages_left -= 1;
            self.steps.push("page");
            true
        }

        async fn move_to_next_chapter(&mut self) -> bool {
            self.steps.push("chapter");
            true
        }

        fn current_page(&self) -> Page {
            page_from_lines(&[("first line", false), ("second", true)])
        }

        fn read_aloud(&mut self, char_position: usize) {
            self.started_at = Some(char_position);
        }
    }

    #[test]
    fn selection_on_current_page_reads_in_place() {
        let mut script = Script {
            pages_left: 3,
            steps: Vec::new(),
            started_at: None,
        };
        block_on(read_aloud_from_selection(&mut script, TextPosition::current(1, 2)));
        assert!(script.steps.is_empty());
        assert_eq!(script.started_at, Some(12));
    }

    #[test]
    fn selection_on_next_page_crosses_chapter_when_needed() {
        let mut script = Script {
            pages_left: 0,
            steps: Vec::new(),
            started_at: None,
        };
        let start = TextPosition::new(PageSlot::Next, 0, 3);
        block_on(read_aloud_from_selection(&mut script, start));
        assert_eq!(script.steps, vec!["page-refused", "chapter"]);
        assert_eq!(script.started_at, Some(3));
    }
}
