//! The Reactor coordinates every bubble on screen with the trash target.
//!
//! It owns the bubble registry, the trash, and the run loop that drives their
//! animations. Events from the platform (touches, measurements, screen and
//! fullscreen changes) come in through [`Reactor::handle_event`]; window
//! updates go out through the [`OverlayHost`] and listener notifications
//! through the broadcast channel.
//!
//! Everything runs on one thread. Bubbles hold no reference back to the
//! reactor: scheduled frames carry a [`BubbleId`] and stop quietly once the
//! id no longer resolves.

mod animation;
mod collision;
mod error;
mod events;
mod replay;

#[cfg(test)]
mod testing;

use std::time::Duration;

use animation::{AnimationScheduler, Message};
pub use error::ReactorError;
use events::touch::TouchEventHandler;
use events::trash::TrashEventHandler;
pub use replay::{Record, replay};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, info, instrument, trace, warn};

use crate::actor;
use crate::actor::broadcast::{BroadcastEvent, BroadcastSender};
use crate::common::config::{Config, DisplayMode};
use crate::model::bubble::{
    Bubble, BubbleId, BubbleOptions, BubbleRequest, Tuning, WidgetState,
};
use crate::model::touch::TouchEvent;
use crate::model::trash::TrashTarget;
use crate::sys::geometry::{Point, Size};
use crate::sys::haptics::{GatedHaptics, HapticSink};
use crate::sys::run_loop::RunLoop;
use crate::sys::screen::ScreenMetrics;
use crate::sys::timer::{Clock, ManualClock, Millis};
use crate::sys::window::{OverlayHost, WindowId};

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Event {
    /// Display size, density or status bar changed.
    ScreenParametersChanged(ScreenMetrics),
    FullscreenChanged(bool),
    /// Attaches a new bubble. It stays inert until its first measurement.
    AddBubble(BubbleOptions),
    BubbleMeasured(BubbleId, Size),
    Touch(BubbleId, TouchEvent),
    SetDisplayMode(DisplayMode),
    RemoveBubble(BubbleId),
    RemoveAll,
}

pub struct Reactor {
    config: Config,
    metrics: ScreenMetrics,
    tuning: Tuning,
    host: Box<dyn OverlayHost>,
    haptics: GatedHaptics<Box<dyn HapticSink>>,
    clock: Box<dyn Clock>,
    broadcast_tx: Option<BroadcastSender>,
    bubbles: SlotMap<BubbleId, Bubble>,
    /// Attach order, oldest first.
    order: Vec<BubbleId>,
    /// The bubble the last accepted gesture belonged to.
    target: Option<BubbleId>,
    trash: TrashTarget,
    run_loop: RunLoop<Message>,
    display_mode: DisplayMode,
    fullscreen: bool,
    /// Cleared by a fullscreen change until the next touch-down.
    move_accepted: bool,
    observer_attached: bool,
    record: Record,
}

impl Reactor {
    pub fn new(
        config: Config,
        metrics: ScreenMetrics,
        host: Box<dyn OverlayHost>,
        haptics: Box<dyn HapticSink>,
        clock: Box<dyn Clock>,
        mut record: Record,
        broadcast_tx: Option<BroadcastSender>,
    ) -> Reactor {
        record.start(clock.now(), &config, &metrics);
        Reactor {
            tuning: Tuning::from_config(&config.bubble, &config.animation),
            haptics: GatedHaptics::new(haptics, config.haptics.enabled),
            trash: TrashTarget::new(&config.trash, metrics),
            display_mode: config.settings.display_mode,
            config,
            metrics,
            host,
            clock,
            broadcast_tx,
            bubbles: SlotMap::with_key(),
            order: Vec::new(),
            target: None,
            run_loop: RunLoop::new(),
            fullscreen: false,
            move_accepted: false,
            observer_attached: false,
            record,
        }
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> { self.bubbles.get(id) }

    /// Bubbles in attach order.
    pub fn bubble_ids(&self) -> &[BubbleId] { &self.order }

    pub fn trash(&self) -> &TrashTarget { &self.trash }

    pub fn display_mode(&self) -> DisplayMode { self.display_mode }

    pub fn metrics(&self) -> &ScreenMetrics { &self.metrics }

    pub fn next_deadline(&self) -> Option<Millis> { self.run_loop.next_deadline() }

    fn now(&self) -> Millis { self.clock.now() }

    fn refresh_interval(&self) -> Millis { self.config.animation.refresh_interval_ms.max(1) }

    fn broadcast(&self, event: BroadcastEvent) {
        if let Some(tx) = &self.broadcast_tx {
            tx.send(event);
        }
    }

    pub async fn run(mut self, mut events: Receiver) {
        loop {
            let wait = self
                .next_deadline()
                .map(|due| Duration::from_millis(due.saturating_sub(self.now())));
            tokio::select! {
                event = events.recv() => match event {
                    Some((span, event)) => {
                        let _guard = span.enter();
                        self.handle_event(event);
                    }
                    None => break,
                },
                _ = sleep_for(wait) => {}
            }
            self.run_due();
        }
        debug!("Reactor event stream closed");
    }

    /// Handles every scheduled message that is due.
    pub fn run_due(&mut self) {
        while let Some((due, message)) = self.run_loop.pop_due(self.now()) {
            trace!(due, ?message, "Run loop message");
            match message {
                Message::TrackingFrame { bubble, first } => {
                    AnimationScheduler::on_tracking_frame(self, bubble, first)
                }
                Message::EdgeFrame(bubble) => AnimationScheduler::on_edge_frame(self, bubble),
                Message::TrashOpen => TrashEventHandler::on_open_delay_elapsed(self),
                Message::TrashFrame => TrashEventHandler::on_frame(self),
            }
        }
    }

    /// Drives the reactor on a manual clock, handling each scheduled message
    /// at its own due time up to `until`.
    pub fn run_until(&mut self, clock: &ManualClock, until: Millis) {
        while let Some(due) = self.next_deadline() {
            if due > until {
                break;
            }
            clock.set(due.max(clock.now()));
            self.run_due();
        }
        clock.set(until.max(clock.now()));
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::Touch(..) => trace!(?event, "Event"),
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self), fields(event=?event))]
    pub fn handle_event(&mut self, event: Event) {
        self.log_event(&event);
        self.record.on_event(self.now(), &event);
        match event {
            Event::ScreenParametersChanged(metrics) => self.on_screen_changed(metrics),
            Event::FullscreenChanged(fullscreen) => self.on_fullscreen_changed(fullscreen),
            Event::AddBubble(options) => {
                self.add_bubble(options);
            }
            Event::BubbleMeasured(id, size) => self.on_bubble_measured(id, size),
            Event::Touch(id, touch) => TouchEventHandler::handle_touch(self, id, touch),
            Event::SetDisplayMode(mode) => self.set_display_mode(mode),
            Event::RemoveBubble(id) => {
                if let Err(err) = self.remove_bubble(id) {
                    warn!(%err, "Ignoring removal");
                }
            }
            Event::RemoveAll => self.remove_all(),
        }
    }

    /// Attaches a bubble and returns its id. The trash window is re-attached
    /// so that it stays above every bubble.
    pub fn add_bubble(&mut self, options: BubbleOptions) -> BubbleId {
        let first = self.bubbles.is_empty();
        let mut bubble = Bubble::new(options, self.tuning.clone(), self.metrics);
        let hidden = match self.display_mode {
            DisplayMode::ShowAlways => false,
            DisplayMode::HideAlways => true,
            DisplayMode::HideOnFullscreen => self.fullscreen,
        };
        let requests = if hidden { bubble.set_visible(false) } else { Vec::new() };
        let id = self.bubbles.insert(bubble);
        self.order.push(id);
        self.host.add_window(WindowId::Bubble(id), Point::ZERO);
        self.apply_bubble_requests(id, requests);

        if first {
            if !self.observer_attached {
                self.host.add_window(WindowId::FullscreenObserver, Point::ZERO);
                self.observer_attached = true;
            }
            self.target = Some(id);
        } else {
            self.host.remove_window(WindowId::Trash);
        }
        self.host.add_window(WindowId::Trash, self.trash.window_origin());
        info!(?id, count = self.order.len(), "Bubble attached");
        id
    }

    /// Detaches a bubble at the host's request.
    pub fn remove_bubble(&mut self, id: BubbleId) -> Result<(), ReactorError> {
        if !self.bubbles.contains_key(id) {
            return Err(ReactorError::UnknownBubble(id));
        }
        self.detach_bubble(id);
        Ok(())
    }

    fn detach_bubble(&mut self, id: BubbleId) {
        if self.bubbles.remove(id).is_none() {
            return;
        }
        self.order.retain(|b| *b != id);
        self.host.remove_window(WindowId::Bubble(id));
        if self.target == Some(id) {
            self.target = self.order.last().copied();
        }
        info!(?id, remaining = self.order.len(), "Bubble detached");
        if self.bubbles.is_empty() {
            info!("Last bubble removed");
            self.broadcast(BroadcastEvent::FloatingFinished);
        }
    }

    /// Detaches the fullscreen observer, the trash and every bubble.
    pub fn remove_all(&mut self) {
        if self.observer_attached {
            self.host.remove_window(WindowId::FullscreenObserver);
            self.observer_attached = false;
        }
        self.host.remove_window(WindowId::Trash);
        for id in std::mem::take(&mut self.order) {
            self.host.remove_window(WindowId::Bubble(id));
        }
        self.bubbles.clear();
        self.target = None;
        self.run_loop.clear();
        self.trash = TrashTarget::new(&self.config.trash, self.metrics);
        info!("All overlay windows removed");
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
        match mode {
            DisplayMode::ShowAlways | DisplayMode::HideOnFullscreen => self.set_all_visible(true),
            DisplayMode::HideAlways => {
                self.set_all_visible(false);
                TrashEventHandler::dismiss(self);
            }
        }
    }

    fn set_all_visible(&mut self, visible: bool) {
        for id in self.order.clone() {
            if let Some(bubble) = self.bubbles.get_mut(id) {
                let requests = bubble.set_visible(visible);
                self.apply_bubble_requests(id, requests);
            }
        }
    }

    fn on_fullscreen_changed(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
        if self.display_mode != DisplayMode::HideOnFullscreen {
            return;
        }
        self.move_accepted = false;
        let Some(target) = self.target else {
            return;
        };
        let state = match self.bubbles.get(target) {
            Some(bubble) => bubble.state(),
            None => return,
        };
        match state {
            WidgetState::Normal => {
                self.set_all_visible(!fullscreen);
                TrashEventHandler::dismiss(self);
            }
            WidgetState::Intersecting => {
                if let Some(bubble) = self.bubbles.get_mut(target) {
                    let requests = bubble.set_finishing();
                    self.apply_bubble_requests(target, requests);
                }
                TrashEventHandler::dismiss(self);
            }
            WidgetState::Finishing => {}
        }
    }

    fn on_screen_changed(&mut self, metrics: ScreenMetrics) {
        self.metrics = metrics;
        self.trash.set_screen(metrics);
        for id in self.order.clone() {
            if let Some(bubble) = self.bubbles.get_mut(id) {
                let requests = bubble.on_screen_changed(metrics);
                self.apply_bubble_requests(id, requests);
            }
        }
        self.host.update_window(WindowId::Trash, self.trash.window_origin());
    }

    fn on_bubble_measured(&mut self, id: BubbleId, size: Size) {
        let Some(bubble) = self.bubbles.get_mut(id) else {
            warn!(?id, "Measurement for unknown bubble");
            return;
        };
        let first = !bubble.is_measured();
        let requests = bubble.on_measured(size);
        let shape = bubble.options().shape;
        let measured = bubble.is_measured();
        self.apply_bubble_requests(id, requests);
        if first && measured {
            self.trash.calc_action_icon_padding(size, shape);
            self.host.update_window(WindowId::Trash, self.trash.window_origin());
        }
    }

    fn apply_bubble_requests(&mut self, id: BubbleId, requests: Vec<BubbleRequest>) {
        let window = WindowId::Bubble(id);
        for request in requests {
            match request {
                BubbleRequest::SetScale(scale) => self.host.set_scale(window, scale),
                BubbleRequest::SetVisible(visible) => self.host.set_visible(window, visible),
                BubbleRequest::CancelLongPress => self.host.cancel_long_press(window),
                BubbleRequest::StartTracking => AnimationScheduler::start_tracking(self, id),
                BubbleRequest::StopTracking => AnimationScheduler::stop_tracking(self, id),
                BubbleRequest::CancelEdgeAnimation => AnimationScheduler::cancel_edge(self, id),
                BubbleRequest::StartEdgeAnimation => AnimationScheduler::start_edge(self, id),
                BubbleRequest::MoveTo(position) => self.host.update_window(window, position),
                BubbleRequest::MovedToEdge { edge, y } => {
                    self.broadcast(BroadcastEvent::MovedToEdge {
                        bubble: id,
                        is_right: edge.is_right(),
                        y,
                    })
                }
                BubbleRequest::PerformClick => TouchEventHandler::perform_click(self, id),
            }
        }
    }
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
pub mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::testing::*;
    use super::*;
    use crate::layout_engine::bounds::Edge;
    use crate::model::bubble::ChildId;
    use crate::model::touch::TouchAction;

    #[test]
    fn first_measurement_places_bubble_and_sizes_trash() {
        let mut h = Harness::new(Config::default());
        let id = h.reactor.add_bubble(BubbleOptions::default().with_child(ChildId(1), true));
        assert!(!h.reactor.bubble(id).unwrap().is_draggable());
        assert_eq!(
            h.host.take_calls(),
            vec![
                HostCall::Add(WindowId::Bubble(id), Point::ZERO),
                HostCall::Add(WindowId::FullscreenObserver, Point::ZERO),
                HostCall::Add(WindowId::Trash, h.reactor.trash().window_origin()),
            ]
        );

        h.reactor.handle_event(Event::BubbleMeasured(id, Size::new(144, 144)));
        let bubble = h.reactor.bubble(id).unwrap();
        assert!(bubble.is_draggable());
        assert_eq!(bubble.position(), Point::new(-36, SCREEN.height - SCREEN.status_bar_height - 144));
        assert_eq!(h.reactor.trash().max_scale(), 1.0);
    }

    #[test]
    fn tap_clicks_topmost_clickable_child_once() {
        let mut h = Harness::new(Config::default());
        let options = BubbleOptions::default()
            .with_child(ChildId(1), true)
            .with_child(ChildId(2), true)
            .with_child(ChildId(3), false);
        let id = h.add_measured_bubble(options);
        h.host.take_calls();

        h.touch(id, TouchAction::Down, 100.0, 1000.0);
        h.step(50);
        h.touch(id, TouchAction::Up, 103.0, 1002.0);
        h.step(1000);

        assert_eq!(h.host.clicks(), vec![(id, ChildId(2))]);
        assert!(h.broadcasts().is_empty());
        assert!(h.reactor.bubble(id).unwrap().edge_run().is_none());
    }

    #[test]
    fn refused_click_falls_through_to_next_child() {
        let mut h = Harness::new(Config::default());
        let options = BubbleOptions::default()
            .with_child(ChildId(1), true)
            .with_child(ChildId(2), true);
        let id = h.add_measured_bubble(options);
        h.host.refuse_clicks_on(ChildId(2));

        h.touch(id, TouchAction::Down, 100.0, 1000.0);
        h.touch(id, TouchAction::Up, 100.0, 1000.0);

        assert_eq!(h.host.clicks(), vec![(id, ChildId(2)), (id, ChildId(1))]);
    }

    #[test]
    fn drag_release_snaps_once_without_clicking() {
        let mut h = Harness::new(Config::default());
        let id = h.add_measured_bubble(BubbleOptions::default().with_child(ChildId(1), true));

        h.touch(id, TouchAction::Down, 100.0, 1000.0);
        for i in 1..=10 {
            h.step(17);
            h.touch(id, TouchAction::Move, 100.0 + 70.0 * i as f32, 1000.0);
        }
        h.touch(id, TouchAction::Up, 800.0, 1000.0);
        h.step(1000);

        assert!(h.host.clicks().is_empty());
        let bubble = h.reactor.bubble(id).unwrap();
        let bounds = *bubble.position_limit();
        assert_eq!(bubble.edge(), Edge::Right);
        assert_eq!(bubble.position().x, bounds.right);
        let resting_y = bubble.position().y;
        let snaps: Vec<_> = h
            .broadcasts()
            .into_iter()
            .filter(|e| matches!(e, BroadcastEvent::MovedToEdge { .. }))
            .collect();
        assert_eq!(
            snaps,
            vec![BroadcastEvent::MovedToEdge {
                bubble: id,
                is_right: true,
                y: resting_y,
            }]
        );
        // The tracking loop stopped with the release.
        assert_eq!(h.reactor.next_deadline(), None);
    }

    #[test]
    fn tracking_moves_window_every_frame_while_held() {
        let mut h = Harness::new(Config::default());
        let id = h.add_measured_bubble(BubbleOptions::default());
        h.host.take_calls();

        h.touch(id, TouchAction::Down, 100.0, 1000.0);
        h.step(17 * 5);
        let updates = h.host.updates_of(WindowId::Bubble(id));
        assert_eq!(updates.len(), 6);
        h.touch(id, TouchAction::Cancel, 100.0, 1000.0);
    }

    #[test]
    fn stale_move_after_new_down_is_unhandled() {
        let mut h = Harness::new(Config::default());
        let id = h.add_measured_bubble(BubbleOptions::default());

        h.touch(id, TouchAction::Down, 100.0, 1000.0);
        let old = h.last_down;
        h.step(30);
        h.touch(id, TouchAction::Down, 500.0, 800.0);
        let sample = h.reactor.bubble(id).unwrap().touch().clone();

        let stale = TouchEvent::new(TouchAction::Move, 900.0, 100.0, old, h.clock.now())
            .with_local(72.0, 72.0);
        h.reactor.handle_event(Event::Touch(id, stale));
        let after = h.reactor.bubble(id).unwrap().touch();
        assert_eq!((after.screen_x, after.screen_y), (sample.screen_x, sample.screen_y));
        assert!(!after.is_move_accepted());
        assert!(!h.reactor.trash().is_shown());
    }

    #[test]
    fn collision_fires_once_per_entry_and_exit() {
        let mut h = Harness::new(Config::default());
        let id = h.add_measured_bubble(BubbleOptions::default());

        h.touch(id, TouchAction::Down, 540.0, 1000.0);
        h.step(17);
        h.touch(id, TouchAction::Move, 540.0, 1100.0);
        h.step(300);
        assert!(h.reactor.trash().is_shown());
        let (cx, cy) = h.reactor.trash().icon_center();
        // Raw Y grows downward; the trash center is in bottom-origin space.
        let over_trash = SCREEN.height as f32 - cy;

        for _ in 0..5 {
            h.touch(id, TouchAction::Move, cx, over_trash);
            h.step(17);
        }
        assert_eq!(h.haptics.pulses(), vec![Duration::from_millis(15)]);
        assert_eq!(h.reactor.bubble(id).unwrap().state(), WidgetState::Intersecting);
        assert!(h.reactor.trash().is_scaled());

        for _ in 0..5 {
            h.touch(id, TouchAction::Move, 540.0, 600.0);
            h.step(17);
        }
        assert_eq!(h.haptics.pulses().len(), 1);
        assert_eq!(h.reactor.bubble(id).unwrap().state(), WidgetState::Normal);
        assert!(!h.reactor.trash().is_scaled());
        let trash_scales: Vec<_> = h
            .host
            .calls()
            .into_iter()
            .filter(|c| matches!(c, HostCall::Scale(WindowId::Trash, _)))
            .collect();
        assert_eq!(trash_scales.len(), 2);

        let states: Vec<_> = h
            .broadcasts()
            .into_iter()
            .filter_map(|e| match e {
                BroadcastEvent::StateChanged { state, .. } => Some(state),
                _ => None,
            })
            .collect();
        assert_eq!(states, vec![WidgetState::Intersecting, WidgetState::Normal]);
    }

    #[test]
    fn dropping_on_trash_removes_bubble_and_finishes() {
        let mut h = Harness::new(Config::default());
        let id = h.add_measured_bubble(BubbleOptions::default());

        h.touch(id, TouchAction::Down, 540.0, 1000.0);
        h.step(17);
        h.touch(id, TouchAction::Move, 540.0, 1100.0);
        h.step(300);
        let (cx, cy) = h.reactor.trash().icon_center();
        h.touch(id, TouchAction::Move, cx, SCREEN.height as f32 - cy);
        h.step(17);
        h.touch(id, TouchAction::Up, cx, SCREEN.height as f32 - cy);
        assert_eq!(h.reactor.bubble(id).unwrap().state(), WidgetState::Finishing);
        assert!(!h.reactor.bubble(id).unwrap().is_visible());

        h.step(1000);
        assert!(h.reactor.bubble(id).is_none());
        assert!(h.reactor.bubble_ids().is_empty());
        assert!(h.host.calls().contains(&HostCall::Remove(WindowId::Bubble(id))));
        let finished = h
            .broadcasts()
            .into_iter()
            .filter(|e| *e == BroadcastEvent::FloatingFinished)
            .count();
        assert_eq!(finished, 1);
    }

    #[test]
    fn trash_close_locks_drags_until_it_ends() {
        let mut h = Harness::new(Config::default());
        let a = h.add_measured_bubble(BubbleOptions::default());
        let b = h.add_measured_bubble(BubbleOptions::default());

        h.touch(a, TouchAction::Down, 100.0, 1000.0);
        h.touch(a, TouchAction::Move, 300.0, 1000.0);
        h.step(300);
        h.touch(a, TouchAction::Up, 300.0, 1000.0);
        assert!(!h.reactor.bubble(a).unwrap().is_draggable());
        assert!(!h.reactor.bubble(b).unwrap().is_draggable());

        h.touch(b, TouchAction::Down, 100.0, 500.0);
        assert_eq!(h.reactor.bubble(b).unwrap().scale(), 1.0);

        h.step(1000);
        assert!(h.reactor.bubble(a).unwrap().is_draggable());
        assert!(h.reactor.bubble(b).unwrap().is_draggable());
        assert_eq!(h.reactor.bubble_ids(), &[a, b]);
    }

    #[test]
    fn held_bubble_opens_trash_after_delay() {
        let mut h = Harness::new(Config::default());
        let id = h.add_measured_bubble(BubbleOptions::default());

        h.touch(id, TouchAction::Down, 100.0, 1000.0);
        h.step(499);
        assert!(!h.reactor.trash().is_shown());
        h.step(300);
        assert!(h.reactor.trash().is_shown());
        assert!(h.host.calls().contains(&HostCall::Visible(WindowId::Trash, true)));
    }

    #[test]
    fn fullscreen_hides_and_restores_bubbles() {
        let mut h = Harness::new(Config::default());
        let a = h.add_measured_bubble(BubbleOptions::default());
        let b = h.add_measured_bubble(BubbleOptions::default());

        h.reactor.handle_event(Event::FullscreenChanged(true));
        assert!(!h.reactor.bubble(a).unwrap().is_visible());
        assert!(!h.reactor.bubble(b).unwrap().is_visible());

        h.reactor.handle_event(Event::FullscreenChanged(false));
        assert!(h.reactor.bubble(a).unwrap().is_visible());
        assert!(h.reactor.bubble(b).unwrap().is_visible());
    }

    #[test]
    fn fullscreen_mid_drag_parks_bubble_and_ignores_rest_of_gesture() {
        let mut h = Harness::new(Config::default());
        let id = h.add_measured_bubble(BubbleOptions::default());

        h.touch(id, TouchAction::Down, 100.0, 1000.0);
        h.touch(id, TouchAction::Move, 300.0, 1000.0);
        h.step(17);
        h.reactor.handle_event(Event::FullscreenChanged(true));
        let bubble = h.reactor.bubble(id).unwrap();
        assert!(!bubble.is_visible());
        assert_eq!(bubble.position().x, bubble.position_limit().left);
        assert!(!bubble.touch().is_move_accepted());

        h.reactor.handle_event(Event::FullscreenChanged(false));
        h.step(500);
        assert!(h.reactor.bubble(id).unwrap().is_draggable());
        h.touch(id, TouchAction::Move, 600.0, 1000.0);
        h.step(300);
        assert!(!h.reactor.trash().is_shown());
    }

    #[test]
    fn fullscreen_while_intersecting_finishes_bubble() {
        let mut h = Harness::new(Config::default());
        let id = h.add_measured_bubble(BubbleOptions::default());

        h.touch(id, TouchAction::Down, 540.0, 1000.0);
        h.step(17);
        h.touch(id, TouchAction::Move, 540.0, 1100.0);
        h.step(300);
        let (cx, cy) = h.reactor.trash().icon_center();
        h.touch(id, TouchAction::Move, cx, SCREEN.height as f32 - cy);
        assert_eq!(h.reactor.bubble(id).unwrap().state(), WidgetState::Intersecting);

        h.reactor.handle_event(Event::FullscreenChanged(true));
        h.step(100);
        assert!(h.reactor.bubble(id).is_none());
        assert!(h.broadcasts().contains(&BroadcastEvent::FloatingFinished));
    }

    #[test]
    fn other_display_modes_ignore_fullscreen() {
        let mut config = Config::default();
        config.settings.display_mode = DisplayMode::ShowAlways;
        let mut h = Harness::new(config);
        let id = h.add_measured_bubble(BubbleOptions::default());
        h.reactor.handle_event(Event::FullscreenChanged(true));
        assert!(h.reactor.bubble(id).unwrap().is_visible());

        h.reactor.handle_event(Event::SetDisplayMode(DisplayMode::HideAlways));
        assert!(!h.reactor.bubble(id).unwrap().is_visible());
        let later = h.reactor.add_bubble(BubbleOptions::default());
        assert!(!h.reactor.bubble(later).unwrap().is_visible());

        h.reactor.handle_event(Event::SetDisplayMode(DisplayMode::ShowAlways));
        assert!(h.reactor.bubble(id).unwrap().is_visible());
        assert!(h.reactor.bubble(later).unwrap().is_visible());
    }

    #[test]
    fn hidden_bubble_ignores_touches() {
        let mut config = Config::default();
        config.settings.display_mode = DisplayMode::HideAlways;
        let mut h = Harness::new(config);
        let id = h.add_measured_bubble(BubbleOptions::default());
        h.host.take_calls();

        h.touch(id, TouchAction::Down, 100.0, 1000.0);
        h.step(100);
        assert!(h.host.calls().is_empty());
    }

    #[test]
    fn frames_for_removed_bubble_stop_quietly() {
        let mut h = Harness::new(Config::default());
        let keep = h.add_measured_bubble(BubbleOptions::default());
        let id = h.add_measured_bubble(BubbleOptions::default());

        h.touch(id, TouchAction::Down, 100.0, 1000.0);
        h.touch(id, TouchAction::Move, 400.0, 1000.0);
        h.step(17);
        h.reactor.handle_event(Event::RemoveBubble(id));
        h.host.take_calls();
        h.step(100);
        assert!(h.host.updates_of(WindowId::Bubble(id)).is_empty());
        assert_eq!(h.reactor.bubble_ids(), &[keep]);
        assert!(!h.broadcasts().contains(&BroadcastEvent::FloatingFinished));

        assert!(matches!(
            h.reactor.remove_bubble(id),
            Err(ReactorError::UnknownBubble(gone)) if gone == id
        ));
    }

    #[test]
    fn rotation_relays_out_every_bubble() {
        let mut h = Harness::new(Config::default());
        let id = h.add_measured_bubble(BubbleOptions::default());
        let before = h.reactor.bubble(id).unwrap().position();
        assert_eq!(before.x, -36);

        let rotated = ScreenMetrics::new(SCREEN.height, SCREEN.width, SCREEN.density, 48);
        h.reactor.handle_event(Event::ScreenParametersChanged(rotated));
        let bubble = h.reactor.bubble(id).unwrap();
        assert_eq!(bubble.position().x, -36);
        assert_eq!(bubble.position().y, bubble.position_limit().bottom);
        assert_eq!(h.reactor.metrics(), &rotated);
    }

    #[test]
    fn remove_all_detaches_everything() {
        let mut h = Harness::new(Config::default());
        let a = h.add_measured_bubble(BubbleOptions::default());
        let b = h.add_measured_bubble(BubbleOptions::default());
        h.host.take_calls();

        h.reactor.handle_event(Event::RemoveAll);
        assert_eq!(
            h.host.take_calls(),
            vec![
                HostCall::Remove(WindowId::FullscreenObserver),
                HostCall::Remove(WindowId::Trash),
                HostCall::Remove(WindowId::Bubble(a)),
                HostCall::Remove(WindowId::Bubble(b)),
            ]
        );
        assert!(h.reactor.bubble_ids().is_empty());
        assert_eq!(h.reactor.next_deadline(), None);
    }

    #[test]
    fn disabled_haptics_stay_silent() {
        let mut config = Config::default();
        config.haptics.enabled = false;
        let mut h = Harness::new(config);
        let id = h.add_measured_bubble(BubbleOptions::default());

        h.touch(id, TouchAction::Down, 540.0, 1000.0);
        h.touch(id, TouchAction::Move, 540.0, 1100.0);
        h.step(300);
        let (cx, cy) = h.reactor.trash().icon_center();
        h.touch(id, TouchAction::Move, cx, SCREEN.height as f32 - cy);
        assert_eq!(h.reactor.bubble(id).unwrap().state(), WidgetState::Intersecting);
        assert!(h.haptics.pulses().is_empty());
    }

    #[test(tokio::test)]
    async fn run_loop_drives_animations_from_channel() {
        let h = Harness::new(Config::default());
        let Harness { mut reactor, host, .. } = h;
        let id = reactor.add_bubble(BubbleOptions::default());
        reactor.handle_event(Event::BubbleMeasured(id, Size::new(144, 144)));
        let (tx, rx) = actor::channel();
        tx.send(Event::SetDisplayMode(DisplayMode::HideAlways));
        drop(tx);
        reactor.run(rx).await;
        assert!(host.calls().contains(&HostCall::Visible(WindowId::Bubble(id), false)));
    }
}
