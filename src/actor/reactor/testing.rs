use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use rustc_hash::FxHashSet;

use super::{Event, Reactor, Record};
use crate::actor::broadcast::{BroadcastEvent, BroadcastReceiver};
use crate::common::config::Config;
use crate::model::bubble::{BubbleId, BubbleOptions, ChildId};
use crate::model::touch::{TouchAction, TouchEvent};
use crate::sys::geometry::{Point, Size};
use crate::sys::haptics::HapticSink;
use crate::sys::screen::ScreenMetrics;
use crate::sys::timer::{Clock, ManualClock, Millis};
use crate::sys::window::{OverlayHost, WindowId};

pub const SCREEN: ScreenMetrics = ScreenMetrics {
    width: 1080,
    height: 1920,
    density: 2.0,
    status_bar_height: 48,
};

pub const BUBBLE: Size = Size::new(144, 144);

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Add(WindowId, Point),
    Update(WindowId, Point),
    Remove(WindowId),
    Scale(WindowId, f32),
    Visible(WindowId, bool),
    Click(BubbleId, ChildId),
    CancelLongPress(WindowId),
}

/// Window host that records every call. Clones share the log.
#[derive(Clone, Default)]
pub struct FakeHost {
    calls: Rc<RefCell<Vec<HostCall>>>,
    refused: Rc<RefCell<FxHashSet<ChildId>>>,
}

impl FakeHost {
    pub fn calls(&self) -> Vec<HostCall> { self.calls.borrow().clone() }

    pub fn take_calls(&self) -> Vec<HostCall> { std::mem::take(&mut *self.calls.borrow_mut()) }

    pub fn refuse_clicks_on(&self, child: ChildId) { self.refused.borrow_mut().insert(child); }

    pub fn clicks(&self) -> Vec<(BubbleId, ChildId)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                HostCall::Click(bubble, child) => Some((*bubble, *child)),
                _ => None,
            })
            .collect()
    }

    pub fn updates_of(&self, window: WindowId) -> Vec<Point> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                HostCall::Update(w, p) if *w == window => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl OverlayHost for FakeHost {
    fn add_window(&mut self, window: WindowId, position: Point) {
        self.calls.borrow_mut().push(HostCall::Add(window, position));
    }

    fn update_window(&mut self, window: WindowId, position: Point) {
        self.calls.borrow_mut().push(HostCall::Update(window, position));
    }

    fn remove_window(&mut self, window: WindowId) {
        self.calls.borrow_mut().push(HostCall::Remove(window));
    }

    fn set_scale(&mut self, window: WindowId, scale: f32) {
        self.calls.borrow_mut().push(HostCall::Scale(window, scale));
    }

    fn set_visible(&mut self, window: WindowId, visible: bool) {
        self.calls.borrow_mut().push(HostCall::Visible(window, visible));
    }

    fn perform_click(&mut self, bubble: BubbleId, child: ChildId) -> bool {
        self.calls.borrow_mut().push(HostCall::Click(bubble, child));
        !self.refused.borrow().contains(&child)
    }

    fn cancel_long_press(&mut self, window: WindowId) {
        self.calls.borrow_mut().push(HostCall::CancelLongPress(window));
    }
}

#[derive(Clone, Default)]
pub struct FakeHaptics(Rc<RefCell<Vec<Duration>>>);

impl FakeHaptics {
    pub fn pulses(&self) -> Vec<Duration> { self.0.borrow().clone() }
}

impl HapticSink for FakeHaptics {
    fn vibrate(&mut self, duration: Duration) { self.0.borrow_mut().push(duration); }
}

/// A reactor on a manual clock with fake collaborators.
pub struct Harness {
    pub reactor: Reactor,
    pub host: FakeHost,
    pub haptics: FakeHaptics,
    pub clock: ManualClock,
    pub broadcast_rx: BroadcastReceiver,
    seen: Vec<BroadcastEvent>,
    /// Token of the most recent touch-down.
    pub last_down: Millis,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        let host = FakeHost::default();
        let haptics = FakeHaptics::default();
        let clock = ManualClock::new(1000);
        let (broadcast_tx, broadcast_rx) = crate::actor::channel();
        let reactor = Reactor::new(
            config,
            SCREEN,
            Box::new(host.clone()),
            Box::new(haptics.clone()),
            Box::new(clock.clone()),
            Record::default(),
            Some(broadcast_tx),
        );
        Harness {
            reactor,
            host,
            haptics,
            clock,
            broadcast_rx,
            seen: Vec::new(),
            last_down: 0,
        }
    }

    pub fn add_measured_bubble(&mut self, options: BubbleOptions) -> BubbleId {
        let id = self.reactor.add_bubble(options);
        self.reactor.handle_event(Event::BubbleMeasured(id, BUBBLE));
        id
    }

    /// Advances the clock by `ms`, running every frame on the way.
    pub fn step(&mut self, ms: Millis) {
        let until = self.clock.now() + ms;
        self.reactor.run_until(&self.clock, until);
    }

    /// Sends a touch at raw screen coordinates, with the finger resting on the
    /// bubble's center.
    pub fn touch(&mut self, id: BubbleId, action: TouchAction, x: f32, y: f32) {
        let now = self.clock.now();
        if action == TouchAction::Down {
            self.last_down = now;
        }
        let event = TouchEvent::new(action, x, y, self.last_down, now)
            .with_local(BUBBLE.width as f32 / 2.0, BUBBLE.height as f32 / 2.0);
        self.reactor.handle_event(Event::Touch(id, event));
    }

    /// Every broadcast sent so far.
    pub fn broadcasts(&mut self) -> Vec<BroadcastEvent> {
        while let Ok((_span, event)) = self.broadcast_rx.try_recv() {
            self.seen.push(event);
        }
        self.seen.clone()
    }
}
