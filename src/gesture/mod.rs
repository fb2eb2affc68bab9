//! Pointer stream classification
//!
//! [`GestureClassifier`] turns down/move/up/cancel events into intents. It
//! touches neither the selection nor the animation itself; the caller applies
//! the returned [`GestureIntent`]s and reports back what it sees through a
//! [`GestureContext`].

mod region;
mod timer;

use std::time::{Duration, Instant};

use log::debug;

pub use region::{PRIORITY, RegionGrid};
pub use timer::LongPressTimer;

use crate::actions::Region;
use crate::model::{Point, Size};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub point: Point,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, point: Point, at: Instant) -> Self {
        Self { kind, point, at }
    }

    pub fn down(point: Point, at: Instant) -> Self {
        Self::new(PointerKind::Down, point, at)
    }

    pub fn moved(point: Point, at: Instant) -> Self {
        Self::new(PointerKind::Move, point, at)
    }

    pub fn up(point: Point, at: Instant) -> Self {
        Self::new(PointerKind::Up, point, at)
    }

    pub fn cancel(point: Point, at: Instant) -> Self {
        Self::new(PointerKind::Cancel, point, at)
    }
}

/// What the caller currently observes outside the classifier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureContext {
    pub selection_active: bool,
    pub animation_moved: bool,
    pub animation_aborted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Pressed,
    Dragging,
    LongPressed,
    Selecting,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureIntent {
    /// Drop the selection that was active when the finger went down
    CancelSelection,
    /// Pass the raw event to the page animation
    Animate(PointerEvent),
    /// Long press: select the word at the origin
    AnchorSelection(Point),
    ExtendSelection(Point),
    Tap(Region),
    ShowSelectionActions,
    /// Let the page animation complete or reverse after release
    SettleAnimation(PointerEvent),
    ResumeAutoPaging,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    pub long_press_timeout: Duration,
    /// Movement threshold in viewport units
    pub touch_slop: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_timeout: Duration::from_millis(600),
            touch_slop: 8.0,
        }
    }
}

pub struct GestureClassifier {
    config: GestureConfig,
    grid: RegionGrid,
    timer: LongPressTimer,
    state: GestureState,
    origin: Point,
    last: Point,
    moved: bool,
    long_pressed: bool,
    press_on_selected: bool,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig, viewport: Size) -> Self {
        Self {
            config,
            grid: RegionGrid::new(viewport),
            timer: LongPressTimer::default(),
            state: GestureState::Idle,
            origin: Point::default(),
            last: Point::default(),
            moved: false,
            long_pressed: false,
            press_on_selected: false,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn last_point(&self) -> Point {
        self.last
    }

    pub fn grid(&self) -> &RegionGrid {
        &self.grid
    }

    pub fn set_viewport(&mut self, size: Size) {
        self.grid.resize(size);
    }

    pub fn set_touch_slop(&mut self, slop: f32) {
        self.config.touch_slop = slop;
    }

    /// Deadline of the pending long press, for hosts that sleep until it
    pub fn timer_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Classify one pointer event. A long press that came due before `event.at`
    /// fires first, even if the host has not polled since.
    pub fn handle(&mut self, event: PointerEvent, ctx: GestureContext) -> Vec<GestureIntent> {
        if event.kind != PointerKind::Down
            && self.state == GestureState::Pressed
            && self.timer.poll(event.at)
        {
            return self.overdue_long_press(event);
        }
        match event.kind {
            PointerKind::Down => self.on_down(event, ctx),
            PointerKind::Move => self.on_move(event),
            PointerKind::Up => self.on_release(event, ctx, true),
            PointerKind::Cancel => self.on_release(event, ctx, false),
        }
    }

    /// Fire the long press if it is due
    pub fn poll_timer(&mut self, now: Instant) -> Vec<GestureIntent> {
        if self.state != GestureState::Pressed || !self.timer.poll(now) {
            return Vec::new();
        }
        self.fire_long_press()
    }

    /// Report whether the long press managed to anchor a selection
    pub fn confirm_selection(&mut self, anchored: bool) {
        if self.state == GestureState::LongPressed && anchored {
            self.state = GestureState::Selecting;
            self.press_on_selected = true;
        }
    }

    fn fire_long_press(&mut self) -> Vec<GestureIntent> {
        debug!("long press at {:?}", self.origin);
        self.long_pressed = true;
        self.state = GestureState::LongPressed;
        vec![GestureIntent::AnchorSelection(self.origin)]
    }

    fn overdue_long_press(&mut self, event: PointerEvent) -> Vec<GestureIntent> {
        let mut intents = self.fire_long_press();
        if event.kind == PointerKind::Move {
            // the move is consumed; the next one extends or drags
            self.last = event.point;
            return intents;
        }
        self.state = GestureState::Idle;
        self.press_on_selected = false;
        intents.push(GestureIntent::ShowSelectionActions);
        if event.kind == PointerKind::Cancel {
            intents.push(GestureIntent::ResumeAutoPaging);
        }
        intents
    }

    fn on_down(&mut self, event: PointerEvent, ctx: GestureContext) -> Vec<GestureIntent> {
        let mut intents = Vec::new();
        self.press_on_selected = ctx.selection_active;
        if ctx.selection_active {
            intents.push(GestureIntent::CancelSelection);
        }
        self.long_pressed = false;
        self.moved = false;
        self.timer.arm(event.at, self.config.long_press_timeout);
        self.state = GestureState::Pressed;
        self.origin = event.point;
        self.last = event.point;
        intents.push(GestureIntent::Animate(event));
        intents
    }

    fn on_move(&mut self, event: PointerEvent) -> Vec<GestureIntent> {
        if self.state == GestureState::Idle {
            return Vec::new();
        }
        self.last = event.point;

        if !self.moved {
            let slop = self.config.touch_slop;
            self.moved = self.origin.distance_squared(event.point) > slop * slop;
        }
        if !self.moved {
            return Vec::new();
        }

        self.timer.cancel();
        match self.state {
            GestureState::Selecting => vec![GestureIntent::ExtendSelection(event.point)],
            // nothing anchored; page like a plain drag
            GestureState::LongPressed => {
                self.long_pressed = false;
                self.state = GestureState::Dragging;
                vec![GestureIntent::Animate(event)]
            }
            _ => {
                self.state = GestureState::Dragging;
                vec![GestureIntent::Animate(event)]
            }
        }
    }

    fn on_release(
        &mut self,
        event: PointerEvent,
        ctx: GestureContext,
        allow_tap: bool,
    ) -> Vec<GestureIntent> {
        self.timer.cancel();
        if self.state == GestureState::Idle {
            return Vec::new();
        }
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        let press_on_selected = std::mem::take(&mut self.press_on_selected);
        let mut intents = Vec::new();

        let still = !ctx.animation_moved && !self.moved;
        if allow_tap && still {
            if !self.long_pressed && !press_on_selected {
                intents.extend(self.tap(ctx));
            } else if ctx.selection_active || state == GestureState::Selecting {
                intents.push(GestureIntent::ShowSelectionActions);
            }
            return intents;
        }

        if ctx.selection_active || state == GestureState::Selecting {
            intents.push(GestureIntent::ShowSelectionActions);
        } else if ctx.animation_moved {
            intents.push(GestureIntent::SettleAnimation(event));
        }
        if !allow_tap {
            intents.push(GestureIntent::ResumeAutoPaging);
        }
        intents
    }

    fn tap(&self, ctx: GestureContext) -> Option<GestureIntent> {
        if ctx.selection_active {
            return None;
        }
        let region = self.grid.region_at(self.origin)?;
        if region == Region::Center && ctx.animation_aborted {
            debug!("centre tap swallowed by aborted animation");
            return None;
        }
        debug!("tap in {region:?}");
        Some(GestureIntent::Tap(region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(GestureConfig::default(), Size::new(300.0, 300.0))
    }

    fn ms(t0: Instant, n: u64) -> Instant {
        t0 + Duration::from_millis(n)
    }

    fn idle() -> GestureContext {
        GestureContext::default()
    }

    #[test]
    fn quick_release_is_a_tap() {
        let t0 = Instant::now();
        let mut g = classifier();
        let p = Point::new(290.0, 150.0);
        g.handle(PointerEvent::down(p, t0), idle());
        let intents = g.handle(PointerEvent::up(p, ms(t0, 100)), idle());
        assert_eq!(intents, vec![GestureIntent::Tap(Region::MiddleRight)]);
        assert_eq!(g.state(), GestureState::Idle);
    }

    #[test]
    fn small_jitter_stays_a_tap() {
        let t0 = Instant::now();
        let mut g = classifier();
        g.handle(PointerEvent::down(Point::new(10.0, 10.0), t0), idle());
        assert!(g.handle(PointerEvent::moved(Point::new(15.0, 15.0), ms(t0, 20)), idle()).is_empty());
        let intents = g.handle(PointerEvent::up(Point::new(15.0, 15.0), ms(t0, 40)), idle());
        assert_eq!(intents, vec![GestureIntent::Tap(Region::TopLeft)]);
    }

    #[test]
    fn drag_past_slop_forwards_to_animation_and_cancels_timer() {
        let t0 = Instant::now();
        let mut g = classifier();
        g.handle(PointerEvent::down(Point::new(200.0, 150.0), t0), idle());
        let drag = PointerEvent::moved(Point::new(150.0, 150.0), ms(t0, 50));
        assert_eq!(g.handle(drag, idle()), vec![GestureIntent::Animate(drag)]);
        assert_eq!(g.state(), GestureState::Dragging);

        assert!(g.poll_timer(ms(t0, 700)).is_empty());

        let moving = GestureContext {
            animation_moved: true,
            ..idle()
        };
        let up = PointerEvent::up(Point::new(150.0, 150.0), ms(t0, 800));
        assert_eq!(g.handle(up, moving), vec![GestureIntent::SettleAnimation(up)]);
    }

    #[test]
    fn long_press_anchors_then_drag_extends() {
        let t0 = Instant::now();
        let mut g = classifier();
        let origin = Point::new(100.0, 100.0);
        g.handle(PointerEvent::down(origin, t0), idle());

        assert!(g.poll_timer(ms(t0, 599)).is_empty());
        assert_eq!(g.poll_timer(ms(t0, 600)), vec![GestureIntent::AnchorSelection(origin)]);
        g.confirm_selection(true);
        assert_eq!(g.state(), GestureState::Selecting);

        let selecting = GestureContext {
            selection_active: true,
            ..idle()
        };
        let to = Point::new(160.0, 120.0);
        assert_eq!(
            g.handle(PointerEvent::moved(to, ms(t0, 700)), selecting),
            vec![GestureIntent::ExtendSelection(to)]
        );
        assert_eq!(
            g.handle(PointerEvent::up(to, ms(t0, 800)), selecting),
            vec![GestureIntent::ShowSelectionActions]
        );
    }

    #[test]
    fn long_press_without_move_shows_actions_not_tap() {
        let t0 = Instant::now();
        let mut g = classifier();
        let origin = Point::new(100.0, 100.0);
        g.handle(PointerEvent::down(origin, t0), idle());
        g.poll_timer(ms(t0, 650));
        g.confirm_selection(true);
        let selecting = GestureContext {
            selection_active: true,
            ..idle()
        };
        assert_eq!(
            g.handle(PointerEvent::up(origin, ms(t0, 900)), selecting),
            vec![GestureIntent::ShowSelectionActions]
        );
    }

    #[test]
    fn failed_long_press_suppresses_tap() {
        let t0 = Instant::now();
        let mut g = classifier();
        let origin = Point::new(5.0, 5.0);
        g.handle(PointerEvent::down(origin, t0), idle());
        g.poll_timer(ms(t0, 600));
        g.confirm_selection(false);
        assert!(g.handle(PointerEvent::up(origin, ms(t0, 700)), idle()).is_empty());
    }

    #[test]
    fn hold_released_before_poll_is_a_long_press() {
        let t0 = Instant::now();
        let mut g = classifier();
        let centre = Point::new(150.0, 150.0);
        g.handle(PointerEvent::down(centre, t0), idle());
        assert_eq!(
            g.handle(PointerEvent::up(centre, ms(t0, 1_000)), idle()),
            vec![
                GestureIntent::AnchorSelection(centre),
                GestureIntent::ShowSelectionActions
            ]
        );
        assert_eq!(g.state(), GestureState::Idle);
        assert!(g.timer_deadline().is_none());
    }

    #[test]
    fn cancel_after_due_long_press_still_anchors() {
        let t0 = Instant::now();
        let mut g = classifier();
        let p = Point::new(40.0, 40.0);
        g.handle(PointerEvent::down(p, t0), idle());
        assert_eq!(
            g.handle(PointerEvent::cancel(p, ms(t0, 700)), idle()),
            vec![
                GestureIntent::AnchorSelection(p),
                GestureIntent::ShowSelectionActions,
                GestureIntent::ResumeAutoPaging
            ]
        );
    }

    #[test]
    fn late_move_fires_long_press_then_extends() {
        let t0 = Instant::now();
        let mut g = classifier();
        let origin = Point::new(100.0, 100.0);
        g.handle(PointerEvent::down(origin, t0), idle());

        let far = Point::new(200.0, 100.0);
        assert_eq!(
            g.handle(PointerEvent::moved(far, ms(t0, 650)), idle()),
            vec![GestureIntent::AnchorSelection(origin)]
        );
        g.confirm_selection(true);

        let selecting = GestureContext {
            selection_active: true,
            ..idle()
        };
        let next = Point::new(210.0, 100.0);
        assert_eq!(
            g.handle(PointerEvent::moved(next, ms(t0, 700)), selecting),
            vec![GestureIntent::ExtendSelection(next)]
        );
    }

    #[test]
    fn failed_long_press_then_drag_pages() {
        let t0 = Instant::now();
        let mut g = classifier();
        let origin = Point::new(200.0, 150.0);
        g.handle(PointerEvent::down(origin, t0), idle());
        g.poll_timer(ms(t0, 600));
        g.confirm_selection(false);

        let drag = PointerEvent::moved(Point::new(120.0, 150.0), ms(t0, 700));
        assert_eq!(g.handle(drag, idle()), vec![GestureIntent::Animate(drag)]);
        assert_eq!(g.state(), GestureState::Dragging);

        let moving = GestureContext {
            animation_moved: true,
            ..idle()
        };
        let up = PointerEvent::up(Point::new(120.0, 150.0), ms(t0, 800));
        assert_eq!(g.handle(up, moving), vec![GestureIntent::SettleAnimation(up)]);
    }

    #[test]
    fn press_on_selection_cancels_it_without_tapping() {
        let t0 = Instant::now();
        let mut g = classifier();
        let selecting = GestureContext {
            selection_active: true,
            ..idle()
        };
        let p = Point::new(150.0, 150.0);
        let intents = g.handle(PointerEvent::down(p, t0), selecting);
        assert_eq!(intents[0], GestureIntent::CancelSelection);
        assert!(g.handle(PointerEvent::up(p, ms(t0, 50)), idle()).is_empty());
    }

    #[test]
    fn cancelled_press_never_fires_later() {
        let t0 = Instant::now();
        let mut g = classifier();
        g.handle(PointerEvent::down(Point::new(1.0, 1.0), t0), idle());
        g.handle(PointerEvent::up(Point::new(1.0, 1.0), ms(t0, 10)), idle());
        g.handle(PointerEvent::down(Point::new(1.0, 1.0), ms(t0, 20)), idle());
        g.handle(PointerEvent::moved(Point::new(90.0, 1.0), ms(t0, 30)), idle());
        assert!(g.poll_timer(ms(t0, 5_000)).is_empty());
        assert_eq!(g.state(), GestureState::Dragging);
    }

    #[test]
    fn cancel_never_taps_and_resumes_auto_paging() {
        let t0 = Instant::now();
        let mut g = classifier();
        let p = Point::new(150.0, 150.0);
        g.handle(PointerEvent::down(p, t0), idle());
        assert_eq!(
            g.handle(PointerEvent::cancel(p, ms(t0, 10)), idle()),
            vec![GestureIntent::ResumeAutoPaging]
        );
    }

    #[test]
    fn centre_tap_swallowed_after_abort() {
        let t0 = Instant::now();
        let mut g = classifier();
        let centre = Point::new(150.0, 150.0);
        let aborted = GestureContext {
            animation_aborted: true,
            ..idle()
        };
        g.handle(PointerEvent::down(centre, t0), aborted);
        assert!(g.handle(PointerEvent::up(centre, ms(t0, 10)), aborted).is_empty());

        let corner = Point::new(290.0, 290.0);
        g.handle(PointerEvent::down(corner, t0), aborted);
        assert_eq!(
            g.handle(PointerEvent::up(corner, ms(t0, 10)), aborted),
            vec![GestureIntent::Tap(Region::BottomRight)]
        );
    }

    #[test]
    fn events_without_press_are_ignored() {
        let t0 = Instant::now();
        let mut g = classifier();
        assert!(g.handle(PointerEvent::moved(Point::new(50.0, 50.0), t0), idle()).is_empty());
        assert!(g.handle(PointerEvent::up(Point::new(50.0, 50.0), t0), idle()).is_empty());
    }
}
