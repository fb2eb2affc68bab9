//! Terminal front end: draws the current page and feeds mouse and keyboard
//! input into the [`Reader`].

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use log::{debug, info, warn};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::actions::TapAction;
use crate::animation::AnimationKind;
use crate::book::Book;
use crate::event_source::EventSource;
use crate::gesture::PointerEvent;
use crate::layout::PageSize;
use crate::model::{Line, Page, PageSlot, PageWindow, Point, Size};
use crate::navigator::{DocumentSource, NavigationCursor};
use crate::reader::{Reader, ReaderHost};
use crate::settings::Settings;

const ANIMATION_CYCLE: [AnimationKind; 5] = [
    AnimationKind::None,
    AnimationKind::Slide,
    AnimationKind::Cover,
    AnimationKind::Simulation,
    AnimationKind::Scroll,
];

/// What the reader asked of the UI, kept for drawing and inspection
#[derive(Debug, Default)]
pub struct AppHost {
    pub message: Option<String>,
    pub menu_visible: bool,
    pub bookmarks: Vec<NavigationCursor>,
    pub narrating: bool,
    pub narration_start: Option<usize>,
    pub replace_rules: bool,
    pub last_progress: Option<NavigationCursor>,
    bookmark_requested: bool,
}

impl AppHost {
    fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!("status: {message}");
        self.message = Some(message);
    }
}

impl ReaderHost for AppHost {
    fn show_action_menu(&mut self) {
        self.menu_visible = !self.menu_visible;
    }

    fn show_selection_actions(&mut self, text: &str) {
        let count = text.chars().count();
        self.notify(format!("{count} chars selected  y copy  r read aloud  Esc clear"));
    }

    fn add_bookmark(&mut self) {
        self.bookmark_requested = true;
    }

    fn edit_content(&mut self) {
        self.notify("Editing is not available for plain-text books");
    }

    fn toggle_replace_rules(&mut self) {
        self.replace_rules = !self.replace_rules;
        let state = if self.replace_rules { "on" } else { "off" };
        self.notify(format!("Replace rules {state}"));
    }

    fn open_chapter_list(&mut self) {
        self.notify("Chapters: [ previous  ] next");
    }

    fn open_search(&mut self) {
        self.notify("Search is not available");
    }

    fn sync_progress(&mut self) {
        match self.last_progress {
            Some(cursor) => self.notify(format!(
                "Progress saved at chapter {}",
                cursor.chapter_index + 1
            )),
            None => self.notify("Nothing to sync yet"),
        }
    }

    fn narration_prev_paragraph(&mut self) {
        self.notify("Narration: previous paragraph");
    }

    fn narration_next_paragraph(&mut self) {
        self.notify("Narration: next paragraph");
    }

    fn toggle_narration(&mut self) {
        self.narrating = !self.narrating;
        let state = if self.narrating { "playing" } else { "paused" };
        self.notify(format!("Narration {state}"));
    }

    fn read_aloud(&mut self, char_position: usize) {
        self.narrating = true;
        self.narration_start = Some(char_position);
        self.notify(format!("Reading aloud from char {char_position}"));
    }

    fn report_progress(&mut self, cursor: NavigationCursor, page: &Page) {
        info!(
            "progress: chapter {} page {:?} ({})",
            cursor.chapter_index, cursor.page_index, page.title
        );
        self.last_progress = Some(cursor);
    }
}

pub struct App {
    reader: Reader<Book>,
    host: AppHost,
    page_area: Rect,
}

impl App {
    /// Lay out `text` for a terminal of `area` size
    pub fn new(text: &str, settings: &Settings, area: Rect) -> Self {
        let page_area = Self::page_area_for(area);
        let book = Book::from_text(text, PageSize::new(page_area.width, page_area.height));
        info!(
            "opened book: {} chapters, page {}x{}",
            book.chapter_count(),
            page_area.width,
            page_area.height
        );
        let reader = Reader::new(book, settings, viewport(page_area));
        Self {
            reader,
            host: AppHost::default(),
            page_area,
        }
    }

    pub fn reader(&self) -> &Reader<Book> {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut Reader<Book> {
        &mut self.reader
    }

    pub fn host(&self) -> &AppHost {
        &self.host
    }

    pub fn page_area(&self) -> Rect {
        self.page_area
    }

    /// Text area inside the border, above the status bar
    pub fn page_area_for(area: Rect) -> Rect {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        Block::default().borders(Borders::ALL).inner(chunks[0])
    }

    /// Re-layout when the terminal size changed
    pub fn fit(&mut self, area: Rect) {
        let page_area = Self::page_area_for(area);
        if page_area == self.page_area {
            return;
        }
        self.page_area = page_area;
        self.reader.cancel_select(false);
        self.reader
            .source_mut()
            .resize(PageSize::new(page_area.width, page_area.height));
        self.reader.set_viewport(viewport(page_area));
        self.reader.refresh_content(0);
    }

    fn to_point(&self, mouse: &MouseEvent) -> Point {
        Point::new(
            mouse.column as f32 - self.page_area.x as f32 + 0.5,
            mouse.row as f32 - self.page_area.y as f32 + 0.5,
        )
    }

    /// Returns true when the app should quit
    pub fn handle_event(&mut self, event: Event, now: Instant) -> bool {
        let quit = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, now),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse, now);
                false
            }
            Event::Resize(width, height) => {
                self.fit(Rect::new(0, 0, width, height));
                false
            }
            _ => false,
        };
        self.resolve_bookmark();
        quit
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let point = self.to_point(&mouse);
        let event = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerEvent::down(point, now),
            MouseEventKind::Drag(MouseButton::Left) => PointerEvent::moved(point, now),
            MouseEventKind::Up(MouseButton::Left) => PointerEvent::up(point, now),
            MouseEventKind::ScrollDown => return self.reader.scroll(1.0, now),
            MouseEventKind::ScrollUp => return self.reader.scroll(-1.0, now),
            _ => return,
        };
        self.reader.handle_pointer(event, &mut self.host);
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::PageDown => {
                self.reader.run_action(TapAction::NextPage, now, &mut self.host);
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => {
                self.reader.run_action(TapAction::PrevPage, now, &mut self.host);
            }
            KeyCode::Char(']') => {
                self.reader.run_action(TapAction::NextChapter, now, &mut self.host);
            }
            KeyCode::Char('[') => {
                self.reader.run_action(TapAction::PrevChapter, now, &mut self.host);
            }
            KeyCode::Char('m') => {
                self.reader.run_action(TapAction::ShowMenu, now, &mut self.host);
            }
            KeyCode::Char('b') => {
                self.reader.run_action(TapAction::AddBookmark, now, &mut self.host);
            }
            KeyCode::Esc => {
                if self.host.menu_visible {
                    self.host.menu_visible = false;
                } else {
                    self.reader.cancel_select(false);
                    self.host.message = None;
                }
            }
            KeyCode::Char('y') => self.copy_selection(),
            KeyCode::Char('r') => {
                if self.reader.selection().is_some() {
                    futures::executor::block_on(self.reader.aloud_start_select(&mut self.host));
                } else {
                    self.host.notify("Select text first (long press)");
                }
            }
            KeyCode::Char('a') => self.cycle_animation(),
            _ => {}
        }
        false
    }

    fn copy_selection(&mut self) {
        let Some(text) = self.reader.selected_text() else {
            self.host.notify("Nothing selected");
            return;
        };
        let copied = arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text.clone()));
        match copied {
            Ok(()) => {
                debug!("Copied selection to clipboard");
                self.host.notify(format!("Copied {} chars", text.chars().count()));
            }
            Err(e) => {
                warn!("Failed to copy to clipboard: {e}");
                self.host.notify(format!("Clipboard unavailable: {e}"));
            }
        }
    }

    fn cycle_animation(&mut self) {
        let current = self.reader.animation_kind();
        let index = ANIMATION_CYCLE
            .iter()
            .position(|&kind| kind == current)
            .unwrap_or(0);
        let next = ANIMATION_CYCLE[(index + 1) % ANIMATION_CYCLE.len()];
        self.reader.set_animation_kind(next);
        self.host.notify(format!("Page animation: {next:?}"));
    }

    fn resolve_bookmark(&mut self) {
        if !std::mem::take(&mut self.host.bookmark_requested) {
            return;
        }
        let cursor = self.reader.navigator().cursor();
        self.host.bookmarks.push(cursor);
        self.host.notify(format!(
            "Bookmark added at chapter {}",
            cursor.chapter_index + 1
        ));
    }

    /// Advance timers and animations, forwarding freshly laid-out pages
    pub fn tick(&mut self, now: Instant) {
        let laid_out = self.reader.source_mut().take_laid_out();
        for page in laid_out {
            self.reader.on_layout_page_completed(page.index, &page, now);
        }
        self.reader.tick(now, &mut self.host);
        self.resolve_bookmark();
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        let status = self.status_line();
        let rows = self.page_area.height;
        let window = self.reader.window();
        let title = match window.current.title.as_str() {
            "" => " folio ".to_string(),
            title => format!(" {title} "),
        };
        let lines = page_rows(window, rows);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::DarkGray));
        f.render_widget(block, chunks[0]);
        f.render_widget(Paragraph::new(lines), self.page_area);
        f.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
            chunks[1],
        );

        if self.host.menu_visible {
            draw_menu(f, chunks[0]);
        }
    }

    fn status_line(&self) -> String {
        let cursor = self.reader.navigator().cursor();
        let book = self.reader.source();
        let pages = book.current_chapter().map_or(0, |ch| ch.page_count());
        let page = cursor.page_index.map_or(0, |p| p + 1);
        let mut status = format!(
            " ch {}/{}  p {page}/{pages}",
            cursor.chapter_index + 1,
            book.chapter_count()
        );
        if let Some(message) = &self.host.message {
            status.push_str("  ");
            status.push_str(message);
        }
        status
    }
}

fn viewport(area: Rect) -> Size {
    Size::new(area.width as f32, area.height as f32)
}

/// Screen rows for the window. Continuous mode stacks the next page under
/// the current one, shifted by the scroll offset.
fn page_rows(window: &PageWindow, height: u16) -> Vec<TextLine<'static>> {
    let mut rows = vec![TextLine::default(); height as usize];
    let mut place = |page: &Page, top: f32| {
        for line in &page.lines {
            let row = (top + line.top).round();
            if row >= 0.0 && (row as usize) < rows.len() {
                rows[row as usize] = render_line(line);
            }
        }
    };
    place(window.page(PageSlot::Current), window.scroll_offset);
    if window.continuous {
        place(
            window.page(PageSlot::Next),
            window.scroll_offset + window.current.height,
        );
    }
    rows
}

fn render_line(line: &Line) -> TextLine<'static> {
    let base = if line.is_title() {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let spans: Vec<Span<'static>> = line
        .columns
        .iter()
        .map(|column| {
            let flags = column.flags();
            let mut style = base;
            if flags.search_result {
                style = style.bg(Color::Yellow).fg(Color::Black);
            }
            if flags.read_aloud {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            if flags.selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Span::styled(column.as_str().to_string(), style)
        })
        .collect();
    TextLine::from(spans)
}

fn draw_menu(f: &mut Frame, area: Rect) {
    let help = [
        "→ / space  next page",
        "←          previous page",
        "[ / ]      chapter",
        "b          bookmark",
        "a          page animation",
        "y          copy selection",
        "r          read selection aloud",
        "q          quit",
    ];
    let longest = help.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = (longest as u16 + 4).min(area.width);
    let height = (help.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    let lines: Vec<TextLine> = help.iter().map(|l| TextLine::from(format!(" {l}"))).collect();
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Menu ")),
        popup,
    );
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    loop {
        let size = terminal.size()?;
        app.fit(Rect::new(0, 0, size.width, size.height));
        app.tick(Instant::now());
        terminal.draw(|f| app.draw(f))?;

        let timeout = app
            .reader()
            .next_deadline()
            .map_or(tick_rate, |due| {
                due.saturating_duration_since(Instant::now()).min(tick_rate)
            });
        let mut events_processed = 0;
        while events_processed < 50 && event_source.poll(timeout)? {
            let event = event_source.read()?;
            events_processed += 1;
            if app.handle_event(event, Instant::now()) {
                info!("quit requested");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_source::SimulatedEventSource;
    use crate::test_utils::test_helpers::{capture_terminal_state, create_test_terminal};

    const BOOK: &str = "# First\nAlpha beta gamma.\nDelta epsilon.\n# Second\nZeta eta.\n";

    fn instant_settings() -> Settings {
        Settings {
            page_animation: AnimationKind::None,
            ..Settings::default()
        }
    }

    fn app() -> App {
        App::new(BOOK, &instant_settings(), Rect::new(0, 0, 40, 8))
    }

    #[test]
    fn page_area_sits_inside_border_above_status() {
        let area = App::page_area_for(Rect::new(0, 0, 40, 8));
        assert_eq!(area, Rect::new(1, 1, 38, 5));
    }

    #[test]
    fn renders_first_page_with_title() {
        let mut terminal = create_test_terminal(40, 8);
        let mut app = app();
        terminal.draw(|f| app.draw(f)).unwrap();
        let screen = capture_terminal_state(&terminal);
        assert!(screen.contains(" First "));
        assert!(screen.contains("Alpha beta gamma."));
        assert!(screen.contains("ch 1/2  p 1/1"));
    }

    #[test]
    fn bookmark_key_records_cursor() {
        let mut app = app();
        app.handle_event(SimulatedEventSource::char_key('b'), Instant::now());
        assert_eq!(
            app.host().bookmarks,
            vec![NavigationCursor {
                chapter_index: 0,
                page_index: Some(0)
            }]
        );
    }

    #[test]
    fn animation_key_cycles_kinds() {
        let mut app = app();
        app.handle_event(SimulatedEventSource::char_key('a'), Instant::now());
        assert_eq!(app.reader().animation_kind(), AnimationKind::Slide);
    }

    #[test]
    fn quit_key_ends_loop() {
        let mut terminal = create_test_terminal(40, 8);
        let mut app = app();
        let mut events = SimulatedEventSource::new(vec![SimulatedEventSource::char_key('q')]);
        run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();
        assert_eq!(events.remaining(), 0);
    }
}
