//! Page-turn animation contract and the strategies the demo ships with
//!
//! The reader forwards raw pointer events while paging and asks the active
//! strategy, on every tick, whether a page turn has finished. Finished turns
//! come back as a [`PageDirection`] that the reader commits to the navigator.

use std::time::{Duration, Instant};

use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::gesture::{PointerEvent, PointerKind};
use crate::model::{Point, Size};
use crate::navigator::PageDirection;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    None,
    #[default]
    Slide,
    Cover,
    Simulation,
    Scroll,
}

impl AnimationKind {
    pub fn is_continuous(self) -> bool {
        self == AnimationKind::Scroll
    }
}

/// Which neighbours exist, so a drag toward a missing page never starts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PagingBounds {
    pub has_prev: bool,
    pub has_next: bool,
}

impl PagingBounds {
    pub fn allows(&self, direction: PageDirection) -> bool {
        match direction {
            PageDirection::Prev => self.has_prev,
            PageDirection::Next => self.has_next,
        }
    }
}

pub trait PageAnimation {
    fn kind(&self) -> AnimationKind;

    fn set_view_size(&mut self, size: Size);

    /// Finger went down. A running transition is finished on the spot and
    /// the strategy reports itself aborted until the next press.
    fn on_down(&mut self, at: Instant);

    /// Raw pointer events while the gesture pages
    fn on_touch(&mut self, event: &PointerEvent, bounds: PagingBounds);

    /// Wheel or fling input, in viewport units; positive moves forward
    fn on_scroll(&mut self, delta: f32, bounds: PagingBounds, now: Instant);

    /// A drag has displaced the page
    fn is_moved(&self) -> bool;

    fn is_running(&self) -> bool;

    /// The last press cut a running transition short
    fn aborted(&self) -> bool;

    fn next_page_by_anim(&mut self, duration: Duration, now: Instant);

    fn prev_page_by_anim(&mut self, duration: Duration, now: Instant);

    /// Advance the transition; returns a turn that has just completed
    fn compute_scroll(&mut self, now: Instant) -> Option<PageDirection>;

    /// Release any running transition before being replaced
    fn teardown(&mut self);

    fn activate(&mut self);
}

pub fn animation_for(kind: AnimationKind, duration: Duration) -> Box<dyn PageAnimation> {
    match kind {
        AnimationKind::None => Box::new(InstantTurn::default()),
        AnimationKind::Scroll => Box::new(DragTurn::new(kind, Axis::Vertical, duration)),
        AnimationKind::Slide | AnimationKind::Cover | AnimationKind::Simulation => {
            Box::new(DragTurn::new(kind, Axis::Horizontal, duration))
        }
    }
}

/// Owner of the active strategy. Replacing it tears the old one down before
/// the new one is activated.
pub struct AnimationSlot {
    active: Box<dyn PageAnimation>,
    view: Size,
    duration: Duration,
}

impl AnimationSlot {
    pub fn new(kind: AnimationKind, view: Size, duration: Duration) -> Self {
        let mut active = animation_for(kind, duration);
        active.set_view_size(view);
        active.activate();
        Self {
            active,
            view,
            duration,
        }
    }

    pub fn kind(&self) -> AnimationKind {
        self.active.kind()
    }

    pub fn get(&self) -> &dyn PageAnimation {
        self.active.as_ref()
    }

    pub fn get_mut(&mut self) -> &mut dyn PageAnimation {
        self.active.as_mut()
    }

    /// Swap in `kind`. Returns false when it is already active.
    pub fn replace(&mut self, kind: AnimationKind) -> bool {
        if self.active.kind() == kind {
            return false;
        }
        self.install(animation_for(kind, self.duration));
        true
    }

    /// Swap in a caller-built strategy
    pub fn install(&mut self, mut next: Box<dyn PageAnimation>) {
        info!("page animation {:?} -> {:?}", self.active.kind(), next.kind());
        self.active.teardown();
        next.set_view_size(self.view);
        next.activate();
        self.active = next;
    }

    pub fn set_view_size(&mut self, view: Size) {
        self.view = view;
        self.active.set_view_size(view);
    }
}

/// No visual transition: a drag past the slop or a programmatic turn
/// completes on the next tick.
#[derive(Debug, Default)]
pub struct InstantTurn {
    start: Option<Point>,
    direction: Option<PageDirection>,
    pending: Option<PageDirection>,
    moved: bool,
}

impl PageAnimation for InstantTurn {
    fn kind(&self) -> AnimationKind {
        AnimationKind::None
    }

    fn set_view_size(&mut self, _size: Size) {}

    fn on_down(&mut self, _at: Instant) {
        self.moved = false;
        self.direction = None;
    }

    fn on_touch(&mut self, event: &PointerEvent, bounds: PagingBounds) {
        match event.kind {
            PointerKind::Down => self.start = Some(event.point),
            PointerKind::Move => {
                let Some(start) = self.start else { return };
                if self.direction.is_none() {
                    let direction = horizontal_direction(start, event.point);
                    if bounds.allows(direction) {
                        self.direction = Some(direction);
                    }
                }
                self.moved = self.direction.is_some();
            }
            PointerKind::Up => {
                self.pending = self.direction.take();
                self.moved = false;
                self.start = None;
            }
            PointerKind::Cancel => {
                self.direction = None;
                self.moved = false;
                self.start = None;
            }
        }
    }

    fn on_scroll(&mut self, delta: f32, bounds: PagingBounds, _now: Instant) {
        let direction = if delta > 0.0 {
            PageDirection::Next
        } else {
            PageDirection::Prev
        };
        if delta != 0.0 && bounds.allows(direction) {
            self.pending = Some(direction);
        }
    }

    fn is_moved(&self) -> bool {
        self.moved
    }

    fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    fn aborted(&self) -> bool {
        false
    }

    fn next_page_by_anim(&mut self, _duration: Duration, _now: Instant) {
        self.pending = Some(PageDirection::Next);
    }

    fn prev_page_by_anim(&mut self, _duration: Duration, _now: Instant) {
        self.pending = Some(PageDirection::Prev);
    }

    fn compute_scroll(&mut self, _now: Instant) -> Option<PageDirection> {
        self.pending.take()
    }

    fn teardown(&mut self) {
        *self = Self::default();
    }

    fn activate(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug)]
struct Transition {
    started: Instant,
    duration: Duration,
    /// `None` when the page springs back
    commit: Option<PageDirection>,
}

/// Drag-follows-finger turn along one axis. Releasing beyond a quarter of
/// the view commits the turn, anything less springs back.
#[derive(Debug)]
pub struct DragTurn {
    kind: AnimationKind,
    axis: Axis,
    duration: Duration,
    view: Size,
    start: Option<Point>,
    direction: Option<PageDirection>,
    displacement: f32,
    moved: bool,
    running: Option<Transition>,
    finished: Option<PageDirection>,
    aborted: bool,
    active: bool,
}

impl DragTurn {
    pub fn new(kind: AnimationKind, axis: Axis, duration: Duration) -> Self {
        Self {
            kind,
            axis,
            duration,
            view: Size::default(),
            start: None,
            direction: None,
            displacement: 0.0,
            moved: false,
            running: None,
            finished: None,
            aborted: false,
            active: false,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current drag displacement along the axis, in viewport units
    pub fn displacement(&self) -> f32 {
        self.displacement
    }

    fn extent(&self) -> f32 {
        match self.axis {
            Axis::Horizontal => self.view.width,
            Axis::Vertical => self.view.height,
        }
    }

    fn delta(&self, from: Point, to: Point) -> f32 {
        match self.axis {
            Axis::Horizontal => to.x - from.x,
            Axis::Vertical => to.y - from.y,
        }
    }

    fn start_transition(&mut self, commit: Option<PageDirection>, now: Instant) {
        self.running = Some(Transition {
            started: now,
            duration: self.duration,
            commit,
        });
    }

    fn release(&mut self, now: Instant) {
        let commit = self
            .direction
            .filter(|_| self.displacement.abs() * 4.0 >= self.extent());
        debug!(
            "{:?} release: displacement {:.1}, commit {commit:?}",
            self.kind, self.displacement
        );
        if self.direction.is_some() {
            self.start_transition(commit, now);
        }
        self.reset_drag();
    }

    fn reset_drag(&mut self) {
        self.start = None;
        self.direction = None;
        self.displacement = 0.0;
        self.moved = false;
    }
}

impl PageAnimation for DragTurn {
    fn kind(&self) -> AnimationKind {
        self.kind
    }

    fn set_view_size(&mut self, size: Size) {
        self.view = size;
    }

    fn on_down(&mut self, _at: Instant) {
        self.aborted = false;
        if let Some(transition) = self.running.take() {
            self.finished = transition.commit;
            self.aborted = true;
        }
    }

    fn on_touch(&mut self, event: &PointerEvent, bounds: PagingBounds) {
        match event.kind {
            PointerKind::Down => {
                self.reset_drag();
                self.start = Some(event.point);
            }
            PointerKind::Move => {
                let Some(start) = self.start else { return };
                let delta = self.delta(start, event.point);
                if self.direction.is_none() && delta != 0.0 {
                    let direction = if delta < 0.0 {
                        PageDirection::Next
                    } else {
                        PageDirection::Prev
                    };
                    if !bounds.allows(direction) {
                        return;
                    }
                    self.direction = Some(direction);
                }
                self.displacement = delta;
                self.moved = self.direction.is_some();
            }
            PointerKind::Up => self.release(event.at),
            PointerKind::Cancel => {
                if self.direction.is_some() {
                    self.start_transition(None, event.at);
                }
                self.reset_drag();
            }
        }
    }

    fn on_scroll(&mut self, delta: f32, bounds: PagingBounds, now: Instant) {
        if delta == 0.0 || self.running.is_some() {
            return;
        }
        let direction = if delta > 0.0 {
            PageDirection::Next
        } else {
            PageDirection::Prev
        };
        if bounds.allows(direction) {
            self.start_transition(Some(direction), now);
        }
    }

    fn is_moved(&self) -> bool {
        self.moved
    }

    fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn aborted(&self) -> bool {
        self.aborted
    }

    fn next_page_by_anim(&mut self, duration: Duration, now: Instant) {
        self.running = Some(Transition {
            started: now,
            duration,
            commit: Some(PageDirection::Next),
        });
    }

    fn prev_page_by_anim(&mut self, duration: Duration, now: Instant) {
        self.running = Some(Transition {
            started: now,
            duration,
            commit: Some(PageDirection::Prev),
        });
    }

    fn compute_scroll(&mut self, now: Instant) -> Option<PageDirection> {
        if let Some(done) = self.finished.take() {
            return Some(done);
        }
        let transition = self.running?;
        if now.duration_since(transition.started) < transition.duration {
            return None;
        }
        self.running = None;
        transition.commit
    }

    fn teardown(&mut self) {
        self.running = None;
        self.finished = None;
        self.aborted = false;
        self.reset_drag();
        self.active = false;
    }

    fn activate(&mut self) {
        self.active = true;
    }
}

fn horizontal_direction(from: Point, to: Point) -> PageDirection {
    if to.x < from.x {
        PageDirection::Next
    } else {
        PageDirection::Prev
    }
}
