//! The reading surface: ties pointer input, selection, page turns and the
//! three page buffers together.
//!
//! `Reader` owns no UI. Everything the host has to do in response (menus,
//! bookmarks, narration, progress persistence) goes through [`ReaderHost`].

use std::time::Instant;

use log::{debug, info};

use crate::actions::{RegionActions, TapAction};
use crate::animation::{AnimationKind, AnimationSlot, PageAnimation, PagingBounds};
use crate::gesture::{
    GestureClassifier, GestureContext, GestureIntent, GestureState, PointerEvent, PointerKind,
};
use crate::model::{Page, PageWindow, SelectionRange, Size};
use crate::narration::{self, NarrationSource};
use crate::navigator::{DocumentSource, NavigationCursor, PageDirection, PageNavigator};
use crate::progress::Throttle;
use crate::selection::{SelectionEngine, UnicodeWords, WordSegmenter};
use crate::settings::Settings;

/// UI callbacks. Everything defaults to doing nothing.
#[allow(unused_variables)]
pub trait ReaderHost {
    fn show_action_menu(&mut self) {}

    /// A selection is in place and the finger lifted
    fn show_selection_actions(&mut self, text: &str) {}

    fn add_bookmark(&mut self) {}
    fn edit_content(&mut self) {}
    fn toggle_replace_rules(&mut self) {}
    fn open_chapter_list(&mut self) {}
    fn open_search(&mut self) {}
    fn sync_progress(&mut self) {}

    fn narration_prev_paragraph(&mut self) {}
    fn narration_next_paragraph(&mut self) {}
    fn toggle_narration(&mut self) {}

    /// Start narration at a character offset of the current page
    fn read_aloud(&mut self, char_position: usize) {}

    /// Rate-limited; at most one call per throttle interval
    fn report_progress(&mut self, cursor: NavigationCursor, page: &Page) {}

    fn screen_off_timer_start(&mut self) {}
    fn resume_auto_paging(&mut self) {}
}

/// Host that ignores every callback
pub struct NoopHost;

impl ReaderHost for NoopHost {}

pub struct Reader<S, W = UnicodeWords> {
    navigator: PageNavigator<S>,
    selection: SelectionEngine<W>,
    gestures: GestureClassifier,
    animation: AnimationSlot,
    window: PageWindow,
    /// Cursor the window was last filled for
    shown: Option<NavigationCursor>,
    progress: Throttle<NavigationCursor>,
    actions: RegionActions,
    settings: Settings,
}

impl<S: DocumentSource> Reader<S> {
    pub fn new(source: S, settings: &Settings, viewport: Size) -> Self {
        Self::with_segmenter(source, settings, viewport, UnicodeWords)
    }
}

impl<S: DocumentSource, W: WordSegmenter> Reader<S, W> {
    pub fn with_segmenter(source: S, settings: &Settings, viewport: Size, segmenter: W) -> Self {
        let kind = settings.page_animation;
        let mut navigator = PageNavigator::new(source, settings.keep_swipe_tip.clone());
        navigator.source_mut().set_continuous_scroll(kind.is_continuous());
        let window = PageWindow {
            continuous: kind.is_continuous(),
            ..PageWindow::default()
        };
        let mut reader = Self {
            navigator,
            selection: SelectionEngine::new(segmenter),
            gestures: GestureClassifier::new(settings.gesture_config(), viewport),
            animation: AnimationSlot::new(kind, viewport, settings.animation_duration()),
            window,
            shown: None,
            progress: Throttle::new(settings.progress_throttle()),
            actions: settings.region_actions,
            settings: settings.clone(),
        };
        reader.refresh_content(0);
        reader
    }

    pub fn navigator(&self) -> &PageNavigator<S> {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut PageNavigator<S> {
        &mut self.navigator
    }

    pub fn source(&self) -> &S {
        self.navigator.source()
    }

    /// Mutating the source directly (jumping chapters, re-layout) must be
    /// followed by [`Reader::refresh_content`].
    pub fn source_mut(&mut self) -> &mut S {
        self.navigator.source_mut()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    pub fn animation(&self) -> &dyn PageAnimation {
        self.animation.get()
    }

    pub fn animation_kind(&self) -> AnimationKind {
        self.animation.kind()
    }

    /// The page buffers, recomputed first if navigation left them stale
    pub fn window(&mut self) -> &PageWindow {
        self.sync_window();
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut PageWindow {
        self.sync_window();
        &mut self.window
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.selection.range()
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection.selected_text(&self.window)
    }

    pub fn set_viewport(&mut self, size: Size) {
        self.gestures.set_viewport(size);
        self.animation.set_view_size(size);
    }

    pub fn set_touch_slop(&mut self, slop: f32) {
        self.gestures.set_touch_slop(slop);
    }

    pub fn set_region_actions(&mut self, actions: RegionActions) {
        self.actions = actions;
    }

    fn sync_window(&mut self) {
        if self.navigator.take_stale() {
            self.refresh_content(0);
        }
    }

    /// Reload page buffers: -1 the previous, 1 the next, 0 all three.
    /// In continuous scrolling only a full refresh touches the buffers.
    /// A selection survives a full refresh only while the cursor stays put.
    pub fn refresh_content(&mut self, relative: i8) {
        self.navigator.take_stale();
        if self.window.continuous && relative != 0 {
            return;
        }
        match relative {
            -1 => self.window.prev = self.navigator.prev_page(),
            1 => self.window.next = self.navigator.next_page(),
            _ => {
                let cursor = self.navigator.cursor();
                let same_page = self.shown == Some(cursor);
                self.window.current = self.navigator.cur_page();
                self.window.next = self.navigator.next_page();
                self.window.prev = self.navigator.prev_page();
                self.shown = Some(cursor);
                // Fresh pages carry no selection flags
                match self.selection.range() {
                    Some(range) if same_page => self.window.mark_selected(range),
                    Some(_) => self.selection.cancel(&mut self.window, false),
                    None => {}
                }
            }
        }
    }

    /// Swap the page animation and immediately refresh content for it
    pub fn set_animation_kind(&mut self, kind: AnimationKind) {
        if !self.animation.replace(kind) {
            return;
        }
        let continuous = kind.is_continuous();
        self.window.continuous = continuous;
        self.navigator.source_mut().set_continuous_scroll(continuous);
        self.refresh_content(0);
    }

    fn bounds(&self) -> PagingBounds {
        PagingBounds {
            has_prev: self.navigator.has_prev(),
            has_next: self.navigator.has_next(),
        }
    }

    fn context(&self) -> GestureContext {
        let animation = self.animation.get();
        GestureContext {
            selection_active: self.selection.is_active(),
            animation_moved: animation.is_moved(),
            animation_aborted: animation.aborted(),
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, host: &mut impl ReaderHost) {
        self.sync_window();
        if matches!(event.kind, PointerKind::Down | PointerKind::Up) {
            host.screen_off_timer_start();
        }
        let intents = self.gestures.handle(event, self.context());
        self.apply(intents, event.at, host);
    }

    /// Fire due timers and advance running transitions
    pub fn tick(&mut self, now: Instant, host: &mut impl ReaderHost) {
        let intents = self.gestures.poll_timer(now);
        self.apply(intents, now, host);
        self.pump_animation(now);
        if let Some(cursor) = self.progress.poll(now) {
            let page = self.navigator.cur_page();
            debug!("progress {cursor:?}");
            host.report_progress(cursor, &page);
        }
    }

    /// Earliest instant at which `tick` has something to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.gestures.timer_deadline(), self.progress.due_at()]
            .into_iter()
            .flatten()
            .min()
    }

    /// Wheel input; positive moves forward
    pub fn scroll(&mut self, delta: f32, now: Instant) {
        let bounds = self.bounds();
        self.animation.get_mut().on_scroll(delta, bounds, now);
        self.pump_animation(now);
    }

    fn apply(&mut self, intents: Vec<GestureIntent>, now: Instant, host: &mut impl ReaderHost) {
        for intent in intents {
            match intent {
                GestureIntent::CancelSelection => self.cancel_select(false),
                GestureIntent::Animate(event) => {
                    let bounds = self.bounds();
                    let animation = self.animation.get_mut();
                    if event.kind == PointerKind::Down {
                        animation.on_down(event.at);
                    }
                    animation.on_touch(&event, bounds);
                    self.pump_animation(now);
                }
                GestureIntent::AnchorSelection(point) => {
                    let anchored = self.selection.anchor_at(&mut self.window, point).is_some();
                    debug!("long press anchored: {anchored}");
                    self.gestures.confirm_selection(anchored);
                }
                GestureIntent::ExtendSelection(point) => {
                    self.selection.extend_to(&mut self.window, point);
                }
                GestureIntent::Tap(region) => {
                    let action = self.actions.action_for(region);
                    self.run_action(action, now, host);
                }
                GestureIntent::ShowSelectionActions => {
                    if let Some(text) = self.selected_text() {
                        host.show_selection_actions(&text);
                    }
                }
                GestureIntent::SettleAnimation(event) => {
                    let bounds = self.bounds();
                    self.animation.get_mut().on_touch(&event, bounds);
                    self.pump_animation(now);
                }
                GestureIntent::ResumeAutoPaging => host.resume_auto_paging(),
            }
        }
    }

    fn pump_animation(&mut self, now: Instant) {
        if let Some(direction) = self.animation.get_mut().compute_scroll(now) {
            self.fill_page(direction, now);
        }
    }

    /// Commit a finished page turn
    pub fn fill_page(&mut self, direction: PageDirection, now: Instant) -> bool {
        let moved = match direction {
            PageDirection::Prev => self.navigator.move_to_prev(true),
            PageDirection::Next => self.navigator.move_to_next(true),
        };
        if moved {
            self.progress.trigger(now, self.navigator.cursor());
        }
        moved
    }

    pub fn run_action(&mut self, action: TapAction, now: Instant, host: &mut impl ReaderHost) {
        debug!("tap action {action:?}");
        let duration = self.settings.animation_duration();
        match action {
            TapAction::ShowMenu => host.show_action_menu(),
            TapAction::NextPage => {
                if self.navigator.has_next() {
                    self.animation.get_mut().next_page_by_anim(duration, now);
                    self.pump_animation(now);
                }
            }
            TapAction::PrevPage => {
                if self.navigator.has_prev() {
                    self.animation.get_mut().prev_page_by_anim(duration, now);
                    self.pump_animation(now);
                }
            }
            TapAction::NextChapter => {
                if self.navigator.source_mut().move_to_next_chapter(true) {
                    self.navigator.mark_stale();
                    self.progress.trigger(now, self.navigator.cursor());
                }
            }
            TapAction::PrevChapter => {
                if self.navigator.source_mut().move_to_prev_chapter(true, false) {
                    self.navigator.mark_stale();
                    self.progress.trigger(now, self.navigator.cursor());
                }
            }
            TapAction::NarrationPrevParagraph => host.narration_prev_paragraph(),
            TapAction::NarrationNextParagraph => host.narration_next_paragraph(),
            TapAction::AddBookmark => host.add_bookmark(),
            TapAction::EditContent => host.edit_content(),
            TapAction::ToggleReplaceRules => host.toggle_replace_rules(),
            TapAction::OpenChapterList => host.open_chapter_list(),
            TapAction::OpenSearch => host.open_search(),
            TapAction::SyncProgress => host.sync_progress(),
            TapAction::ToggleNarration => host.toggle_narration(),
        }
    }

    pub fn cancel_select(&mut self, clear_search: bool) {
        self.selection.cancel(&mut self.window, clear_search);
    }

    /// A page finished laying out somewhere in the book
    pub fn on_layout_page_completed(&mut self, index: usize, page: &Page, now: Instant) {
        debug!(
            "layout completed: chapter {} page {index}",
            page.chapter_index
        );
        self.progress.trigger(now, self.navigator.cursor());
        if page.chapter_index == self.navigator.cursor().chapter_index {
            self.navigator.mark_stale();
        }
    }

    /// Move the cursor to the page holding the selection start and begin
    /// narration there
    pub async fn aloud_start_select(&mut self, host: &mut impl ReaderHost) {
        let Some(range) = self.selection.range() else {
            return;
        };
        info!("narration from selection at {:?}", range.start());
        let mut driver = NarrationDriver {
            navigator: &mut self.navigator,
            host,
        };
        narration::read_aloud_from_selection(&mut driver, range.start()).await;
    }
}

struct NarrationDriver<'a, S, H> {
    navigator: &'a mut PageNavigator<S>,
    host: &'a mut H,
}

impl<S: DocumentSource, H: ReaderHost> NarrationSource for NarrationDriver<'_, S, H> {
    fn move_to_next_page(&mut self) -> bool {
        let source = self.navigator.source();
        let next = match (source.current_chapter(), source.page_index()) {
            (Some(chapter), Some(index)) if index + 1 < chapter.page_count() => index + 1,
            _ => return false,
        };
        self.navigator.source_mut().set_page_index(next);
        self.navigator.mark_stale();
        true
    }

    async fn move_to_next_chapter(&mut self) -> bool {
        let moved = self.navigator.source_mut().move_to_next_chapter(false);
        self.navigator.mark_stale();
        moved
    }

    fn current_page(&self) -> Page {
        self.navigator.cur_page()
    }

    fn read_aloud(&mut self, char_position: usize) {
        self.host.read_aloud(char_position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PageKind, PageSlot, Point};
    use crate::test_utils::test_helpers::StubSource;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        progress: Vec<NavigationCursor>,
        narration_at: Option<usize>,
    }

    impl ReaderHost for Recorder {
        fn show_action_menu(&mut self) {
            self.calls.push("menu".into());
        }

        fn show_selection_actions(&mut self, text: &str) {
            self.calls.push(format!("selection:{text}"));
        }

        fn open_search(&mut self) {
            self.calls.push("search".into());
        }

        fn read_aloud(&mut self, char_position: usize) {
            self.narration_at = Some(char_position);
        }

        fn report_progress(&mut self, cursor: NavigationCursor, _page: &Page) {
            self.progress.push(cursor);
        }
    }

    fn settings(kind: AnimationKind) -> Settings {
        Settings {
            page_animation: kind,
            ..Settings::default()
        }
    }

    fn reader(kind: AnimationKind) -> Reader<StubSource> {
        Reader::new(
            StubSource::loaded(&[3, 2], 0, 0),
            &settings(kind),
            Size::new(30.0, 30.0),
        )
    }

    fn ms(t0: Instant, n: u64) -> Instant {
        t0 + Duration::from_millis(n)
    }

    fn tap(reader: &mut Reader<StubSource>, host: &mut Recorder, point: Point, at: Instant) {
        reader.handle_pointer(PointerEvent::down(point, at), host);
        reader.handle_pointer(PointerEvent::up(point, ms(at, 50)), host);
    }

    #[test]
    fn right_edge_tap_turns_page_once_animation_ends() {
        let t0 = Instant::now();
        let mut host = Recorder::default();
        let mut r = reader(AnimationKind::Slide);

        tap(&mut r, &mut host, Point::new(29.0, 15.0), t0);
        assert_eq!(r.navigator().cursor().page_index, Some(0));

        r.tick(ms(t0, 400), &mut host);
        assert_eq!(r.navigator().cursor().page_index, Some(1));
        assert_eq!(r.window().current.index, 1);
    }

    #[test]
    fn centre_tap_opens_menu() {
        let t0 = Instant::now();
        let mut host = Recorder::default();
        let mut r = reader(AnimationKind::None);
        tap(&mut r, &mut host, Point::new(15.0, 15.0), t0);
        assert_eq!(host.calls, vec!["menu"]);
    }

    #[test]
    fn configured_region_action_is_dispatched() {
        let t0 = Instant::now();
        let mut host = Recorder::default();
        let mut r = reader(AnimationKind::None);
        let mut actions = RegionActions::default();
        actions.bottom_left = TapAction::OpenSearch;
        r.set_region_actions(actions);
        tap(&mut r, &mut host, Point::new(1.0, 29.0), t0);
        assert_eq!(host.calls, vec!["search"]);
    }

    #[test]
    fn long_press_selects_word_and_release_shows_actions() {
        let t0 = Instant::now();
        let mut host = Recorder::default();
        let mut r = reader(AnimationKind::None);
        // "Page 1 of chapter 1" on line 0
        let on_chapter = Point::new(12.5, 0.5);

        r.handle_pointer(PointerEvent::down(on_chapter, t0), &mut host);
        r.tick(ms(t0, 600), &mut host);
        assert_eq!(r.gesture_state(), GestureState::Selecting);
        assert_eq!(r.selected_text().as_deref(), Some("chapter"));

        r.handle_pointer(PointerEvent::up(on_chapter, ms(t0, 700)), &mut host);
        assert_eq!(host.calls, vec!["selection:chapter"]);

        // the next press drops the selection without tapping
        r.handle_pointer(PointerEvent::down(on_chapter, ms(t0, 900)), &mut host);
        assert!(r.selection().is_none());
        r.handle_pointer(PointerEvent::up(on_chapter, ms(t0, 950)), &mut host);
        assert_eq!(host.calls.len(), 1);
    }

    #[test]
    fn hold_released_between_ticks_still_selects() {
        let t0 = Instant::now();
        let mut host = Recorder::default();
        let mut r = reader(AnimationKind::None);
        let on_chapter = Point::new(12.5, 0.5);

        r.handle_pointer(PointerEvent::down(on_chapter, t0), &mut host);
        r.handle_pointer(PointerEvent::up(on_chapter, ms(t0, 1_000)), &mut host);

        assert_eq!(r.selected_text().as_deref(), Some("chapter"));
        assert_eq!(host.calls, vec!["selection:chapter"]);
        assert_eq!(r.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn unticked_hold_on_blank_area_neither_selects_nor_taps() {
        let t0 = Instant::now();
        let mut host = Recorder::default();
        let mut r = reader(AnimationKind::None);
        let blank = Point::new(25.0, 20.0);
        r.handle_pointer(PointerEvent::down(blank, t0), &mut host);
        r.handle_pointer(PointerEvent::up(blank, ms(t0, 1_000)), &mut host);
        assert!(r.selection().is_none());
        assert!(host.calls.is_empty());
    }

    #[test]
    fn long_press_on_blank_area_selects_nothing() {
        let t0 = Instant::now();
        let mut host = Recorder::default();
        let mut r = reader(AnimationKind::None);
        let blank = Point::new(25.0, 20.0);
        r.handle_pointer(PointerEvent::down(blank, t0), &mut host);
        r.tick(ms(t0, 700), &mut host);
        assert!(r.selection().is_none());
        r.handle_pointer(PointerEvent::up(blank, ms(t0, 800)), &mut host);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn progress_reports_are_throttled() {
        let t0 = Instant::now();
        let mut host = Recorder::default();
        let mut r = reader(AnimationKind::None);
        let page = r.navigator().cur_page();
        for i in 0..5 {
            r.on_layout_page_completed(i, &page, ms(t0, i as u64 * 20));
        }
        r.tick(ms(t0, 150), &mut host);
        assert!(host.progress.is_empty());
        r.tick(ms(t0, 200), &mut host);
        assert_eq!(host.progress.len(), 1);
        r.tick(ms(t0, 1_000), &mut host);
        assert_eq!(host.progress.len(), 1);
    }

    #[test]
    fn swapping_animation_refreshes_content_immediately() {
        let mut r = reader(AnimationKind::Slide);
        r.navigator_mut().set_message("Loading");
        r.set_animation_kind(AnimationKind::Scroll);
        assert_eq!(r.animation_kind(), AnimationKind::Scroll);
        assert!(r.source().continuous);
        assert_eq!(r.window.current.kind, PageKind::Message);
    }

    #[test]
    fn prev_chapter_action_lands_on_first_page() {
        let t0 = Instant::now();
        let mut host = Recorder::default();
        let mut r = Reader::new(
            StubSource::loaded(&[3, 2], 1, 1),
            &settings(AnimationKind::None),
            Size::new(30.0, 30.0),
        );
        r.run_action(TapAction::PrevChapter, t0, &mut host);
        assert_eq!(
            r.navigator().cursor(),
            NavigationCursor {
                chapter_index: 0,
                page_index: Some(0)
            }
        );
        assert_eq!(r.window().current.chapter_index, 0);
    }

    #[test]
    fn narration_starts_from_selection_on_next_page() {
        let mut host = Recorder::default();
        let mut r = reader(AnimationKind::None);
        let start = crate::model::TextPosition::new(PageSlot::Next, 1, 2);
        let window = &mut r.window;
        r.selection.anchor_at_position(window, start);

        futures::executor::block_on(r.aloud_start_select(&mut host));
        assert_eq!(r.navigator().cursor().page_index, Some(1));
        // the word "ends" opens line 1, after the 19 chars of line 0
        assert_eq!(host.narration_at, Some(19));
    }
}
