use folio::model::{PageSlot, Point, SelectionRange, TextPosition};
use folio::selection::{SelectionEngine, UnicodeWords};
use folio::test_utils::test_helpers::window_with_current;

fn engine() -> SelectionEngine<UnicodeWords> {
    SelectionEngine::new(UnicodeWords)
}

#[test]
fn long_press_inside_second_line_selects_whole_word() {
    let mut window = window_with_current(&[("hello ", false), ("world", true)]);
    let mut selection = engine();

    // column 1 of "world" is offset 7 of "hello world"
    let range = selection
        .anchor_at(&mut window, Point::new(1.5, 1.5))
        .expect("word under point");
    assert_eq!(range.start(), TextPosition::current(1, 0));
    assert_eq!(range.end(), TextPosition::current(1, 4));
    assert_eq!(selection.anchor(), Some(TextPosition::current(1, 1)));
    assert_eq!(selection.selected_text(&window).as_deref(), Some("world"));
}

#[test]
fn dragging_before_anchor_stops_one_column_short_of_it() {
    let mut window = window_with_current(&[("hello ", false), ("world", true)]);
    let mut selection = engine();
    selection.anchor_at(&mut window, Point::new(2.5, 1.5));

    let range = selection
        .extend_to(&mut window, Point::new(1.5, 0.5))
        .expect("drag resolves");
    assert_eq!(range.start(), TextPosition::current(0, 1));
    assert_eq!(range.end(), TextPosition::current(1, 1));
    assert_eq!(selection.selected_text(&window).as_deref(), Some("ello wo"));
}

#[test]
fn any_drag_sequence_keeps_range_ordered() {
    let mut window = window_with_current(&[
        ("The quick ", false),
        ("brown fox ", false),
        ("jumps.", true),
        ("Over the ", false),
        ("lazy dog.", true),
    ]);
    let mut selection = engine();
    selection.anchor_at(&mut window, Point::new(3.5, 2.5));

    for y in 0..6 {
        for x in 0..12 {
            let point = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if let Some(range) = selection.extend_to(&mut window, point) {
                assert!(range.start() <= range.end(), "{range:?} from {point:?}");
            }
        }
    }
}

#[test]
fn anchoring_is_deterministic() {
    let lines = [("alpha beta ", false), ("gamma", true)];
    let point = Point::new(7.5, 0.5);

    let first = engine().anchor_at(&mut window_with_current(&lines), point);
    let second = engine().anchor_at(&mut window_with_current(&lines), point);
    assert_eq!(first, second);
    assert_eq!(
        first,
        Some(SelectionRange::ordered(
            TextPosition::current(0, 6),
            TextPosition::current(0, 9)
        ))
    );
}

#[test]
fn cancel_twice_equals_cancel_once() {
    let mut window = window_with_current(&[("hello world", true)]);
    let mut selection = engine();
    selection.anchor_at(&mut window, Point::new(0.5, 0.5));
    assert!(window.current.has_selection());

    selection.cancel(&mut window, true);
    let once = window.clone();
    selection.cancel(&mut window, true);

    assert_eq!(window, once);
    assert!(!selection.is_active());
    assert!(selection.anchor().is_none());
    assert!(!window.current.has_selection());
}

#[test]
fn unresolved_points_leave_selection_untouched() {
    let mut window = window_with_current(&[("short", true)]);
    let mut selection = engine();
    assert!(selection.anchor_at(&mut window, Point::new(40.0, 0.5)).is_none());
    assert!(selection.anchor_at(&mut window, Point::new(1.0, 9.0)).is_none());
    assert!(!selection.is_active());

    // no anchor, so there is nothing to extend
    assert!(selection.extend_to(&mut window, Point::new(1.0, 0.5)).is_none());
}

#[test]
fn selection_can_start_on_lookahead_page() {
    let mut window = window_with_current(&[("current", true)]);
    window.next = window_with_current(&[("next page text", true)]).current;
    let mut selection = engine();
    let start = TextPosition::new(PageSlot::Next, 0, 6);
    let range = selection
        .anchor_at_position(&mut window, start)
        .expect("next slot word");
    assert_eq!(window.text_in(range), "page");
}
