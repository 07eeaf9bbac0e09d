//! A single floating bubble and the state machine that drags it around.
//!
//! A bubble never talks to the outside world directly. Every operation
//! returns the [`BubbleRequest`]s that the reactor must carry out (window
//! updates, scheduler ticks, listener notifications) in order.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tracing::{debug, trace};

use super::touch::{TouchAction, TouchEvent, TouchSample};
use crate::common::config::{AnimationSettings, BubbleSettings, Shape};
use crate::layout_engine::bounds::{self, Edge};
use crate::layout_engine::easing::{Curve, Overshoot};
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::ScreenMetrics;
use crate::sys::timer::Millis;

new_key_type! {
    pub struct BubbleId;
}

/// Identifies a piece of content inside a bubble that can receive clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChildId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    #[default]
    Normal,
    /// Held by the trash target and following its icon.
    Intersecting,
    /// Dropped on the trash. Hidden and waiting to be removed.
    Finishing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub clickable: bool,
}

/// Per-bubble configuration supplied when the bubble is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleOptions {
    pub shape: Shape,
    pub over_margin: i32,
    /// Child content, bottom-most first.
    #[serde(default)]
    pub children: Vec<Child>,
}

impl BubbleOptions {
    pub fn from_settings(settings: &BubbleSettings) -> Self {
        BubbleOptions {
            shape: settings.shape,
            over_margin: settings.over_margin,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, id: ChildId, clickable: bool) -> Self {
        self.children.push(Child { id, clickable });
        self
    }
}

impl Default for BubbleOptions {
    fn default() -> Self { Self::from_settings(&BubbleSettings::default()) }
}

/// Gesture and animation constants shared by every bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    pub move_threshold_dp: f32,
    pub pressed_scale: f32,
    pub velocity_snap: bool,
    pub capture_duration: Millis,
    pub edge_duration: Millis,
    pub edge_tension: f32,
}

impl Tuning {
    pub fn from_config(bubble: &BubbleSettings, animation: &AnimationSettings) -> Self {
        Tuning {
            move_threshold_dp: bubble.move_threshold_dp,
            pressed_scale: bubble.pressed_scale,
            velocity_snap: bubble.velocity_snap,
            capture_duration: animation.capture_duration_ms,
            edge_duration: animation.edge_duration_ms,
            edge_tension: animation.edge_overshoot_tension,
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from_config(&BubbleSettings::default(), &AnimationSettings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchOutcome {
    /// The bubble consumed the event and the coordinator should see it too.
    Handled,
    /// Stale, below the drag threshold, or the bubble is not interactive.
    #[default]
    Ignored,
}

/// Side effects a bubble asks the reactor to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum BubbleRequest {
    SetScale(f32),
    SetVisible(bool),
    CancelLongPress,
    /// Drop any pending tracking tick and schedule a first one now.
    StartTracking,
    StopTracking,
    /// Drop pending edge frames. The bubble has already forgotten the run.
    CancelEdgeAnimation,
    StartEdgeAnimation,
    MoveTo(Point),
    MovedToEdge { edge: Edge, y: i32 },
    /// Click the topmost clickable child.
    PerformClick,
}

#[derive(Debug, Default)]
pub struct TouchResponse {
    pub outcome: TouchOutcome,
    pub requests: Vec<BubbleRequest>,
}

/// One easing session of the tracking animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRun {
    /// `None` means the run has no duration and sits on its target.
    pub started_at: Option<Millis>,
    pub start: Point,
    pub curve: Curve,
}

impl AnimationRun {
    fn factor(&self, now: Millis, duration: Millis) -> f32 {
        let t = match self.started_at {
            Some(at) => (now.saturating_sub(at) as f32 / duration.max(1) as f32).min(1.0),
            None => 1.0,
        };
        self.curve.evaluate(t)
    }

    fn position(&self, target_x: f32, target_y: f32, factor: f32) -> Point {
        Point::new(lerp(self.start.x, target_x, factor), lerp(self.start.y, target_y, factor))
    }
}

fn lerp(from: i32, to: f32, factor: f32) -> i32 {
    (from as f32 + (to - from as f32) * factor) as i32
}

/// State driven by the tracking scheduler.
#[derive(Debug, Default)]
struct Tracking {
    state: WidgetState,
    state_changed: bool,
    run: Option<AnimationRun>,
    touch_x: f32,
    touch_y: f32,
    capture_x: f32,
    capture_y: f32,
}

impl Tracking {
    fn set_state(&mut self, state: WidgetState) {
        if self.state != state {
            self.state_changed = true;
        }
        self.state = state;
    }

    fn step(
        &mut self,
        first: bool,
        now: Millis,
        current: Point,
        size: Size,
        limit: &Rect,
        duration: Millis,
    ) -> Option<Point> {
        if self.state_changed || first {
            let changed = std::mem::take(&mut self.state_changed);
            self.run = Some(AnimationRun {
                started_at: changed.then_some(now),
                start: current,
                curve: if changed { Curve::Capture } else { Curve::Immediate },
            });
        }
        let run = self.run?;
        let factor = run.factor(now, duration);
        match self.state {
            WidgetState::Normal => {
                let x = limit.clamp_x(self.touch_x as i32);
                let y = limit.clamp_y(self.touch_y as i32);
                Some(run.position(x as f32, y as f32, factor))
            }
            WidgetState::Intersecting => {
                let x = self.capture_x - (size.width / 2) as f32;
                let y = self.capture_y - (size.height / 2) as f32;
                Some(run.position(x, y, factor))
            }
            WidgetState::Finishing => None,
        }
    }
}

/// The release animation that carries a bubble to its edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRun {
    pub from_x: i32,
    pub to_x: i32,
    pub started_at: Millis,
    pub duration: Millis,
    pub interpolator: Overshoot,
}

impl EdgeRun {
    /// X at `now`, and whether the run is over.
    pub fn sample(&self, now: Millis) -> (i32, bool) {
        let t = (now.saturating_sub(self.started_at) as f32 / self.duration.max(1) as f32).min(1.0);
        let factor = self.interpolator.interpolate(t);
        (lerp(self.from_x, self.to_x as f32, factor), t >= 1.0)
    }
}

#[derive(Debug)]
pub struct Bubble {
    options: BubbleOptions,
    tuning: Tuning,
    metrics: ScreenMetrics,
    size: Size,
    position: Point,
    move_limit: Rect,
    position_limit: Rect,
    touch: TouchSample,
    tracking: Tracking,
    edge_run: Option<EdgeRun>,
    edge: Edge,
    scale: f32,
    visible: bool,
    draggable: bool,
    measured: bool,
}

impl Bubble {
    pub fn new(options: BubbleOptions, tuning: Tuning, metrics: ScreenMetrics) -> Self {
        let mut bubble = Bubble {
            options,
            tuning,
            metrics,
            size: Size::ZERO,
            position: Point::ZERO,
            move_limit: Rect::default(),
            position_limit: Rect::default(),
            touch: TouchSample::default(),
            tracking: Tracking::default(),
            edge_run: None,
            edge: Edge::Left,
            scale: 1.0,
            visible: true,
            draggable: false,
            measured: false,
        };
        bubble.update_bounds();
        bubble
    }

    pub fn options(&self) -> &BubbleOptions { &self.options }

    pub fn position(&self) -> Point { self.position }

    pub fn size(&self) -> Size { self.size }

    pub fn state(&self) -> WidgetState { self.tracking.state }

    pub fn scale(&self) -> f32 { self.scale }

    pub fn edge(&self) -> Edge { self.edge }

    pub fn is_visible(&self) -> bool { self.visible }

    pub fn is_draggable(&self) -> bool { self.draggable }

    pub fn is_measured(&self) -> bool { self.measured }

    pub fn touch(&self) -> &TouchSample { &self.touch }

    pub fn tracking_run(&self) -> Option<&AnimationRun> { self.tracking.run.as_ref() }

    pub fn edge_run(&self) -> Option<&EdgeRun> { self.edge_run.as_ref() }

    pub fn move_limit(&self) -> &Rect { &self.move_limit }

    pub fn position_limit(&self) -> &Rect { &self.position_limit }

    /// The bubble's rectangle as implied by the finger, used for collision.
    pub fn window_drawing_rect(&self) -> Rect {
        Rect::from_origin_size(Point::new(self.touch.x_by_touch(), self.y_by_touch()), self.size)
    }

    fn y_by_touch(&self) -> i32 { self.touch.y_by_touch(self.metrics.height, self.size.height) }

    fn update_bounds(&mut self) {
        let screen = self.metrics.size();
        let over_margin = self.options.over_margin.clamp(0, self.size.width.max(0));
        self.move_limit = bounds::movement_bounds(self.size, screen);
        self.position_limit = bounds::position_bounds(
            self.size,
            screen,
            self.metrics.status_bar_height,
            over_margin,
        );
    }

    /// Records the laid-out size. The first measurement places the bubble in
    /// the bottom-left corner, snaps it to its edge and makes it draggable.
    pub fn on_measured(&mut self, size: Size) -> Vec<BubbleRequest> {
        let mut requests = Vec::new();
        if size.is_empty() {
            trace!(?size, "Ignoring empty measurement");
            return requests;
        }
        self.size = size;
        self.update_bounds();
        if self.measured {
            return requests;
        }
        self.measured = true;
        self.position = Point::new(
            0,
            self.metrics.height - self.metrics.status_bar_height - size.height,
        );
        requests.push(BubbleRequest::MoveTo(self.position));
        self.draggable = true;
        self.edge = Edge::Left;
        self.move_to_edge(false, 0, &mut requests);
        debug!(position = ?self.position, ?size, "Bubble placed");
        requests
    }

    /// Re-lays the bubble out for new screen metrics. A change of screen size
    /// sends it back to the edge of the half it was in, at the same relative
    /// height.
    pub fn on_screen_changed(&mut self, metrics: ScreenMetrics) -> Vec<BubbleRequest> {
        let mut requests = Vec::new();
        self.cancel_edge_animation(&mut requests);
        let old = self.metrics;
        let old_height = self.position_limit.height();
        self.metrics = metrics;
        self.update_bounds();
        if self.measured && !old.same_size_as(&metrics) {
            self.position = bounds::relayout_on_resize(
                self.position,
                self.size,
                metrics.width,
                old_height,
                &self.position_limit,
            );
            self.edge = Edge::from_is_right(self.position.x == self.position_limit.right);
            debug!(position = ?self.position, "Relaid out for new screen size");
            requests.push(BubbleRequest::MoveTo(self.position));
        }
        requests
    }

    pub fn on_touch(&mut self, event: &TouchEvent, now: Millis) -> TouchResponse {
        let mut response = TouchResponse::default();
        if !self.visible || !self.draggable {
            trace!(visible = self.visible, draggable = self.draggable, "Bubble not interactive");
            return response;
        }
        let requests = &mut response.requests;
        match event.action {
            TouchAction::Down => {
                self.touch.track(event);
                self.cancel_edge_animation(requests);
                self.touch.begin(event);
                self.set_scale(self.tuning.pressed_scale, requests);
                self.sync_touch_target();
                requests.push(BubbleRequest::StartTracking);
            }
            TouchAction::Move => {
                if !self.touch.is_current(event) {
                    trace!(down_time = event.down_time, "Stale move");
                    return response;
                }
                self.touch.track(event);
                let threshold = self.metrics.dp_to_px(self.tuning.move_threshold_dp);
                if !self.touch.try_accept(threshold) {
                    return response;
                }
                self.sync_touch_target();
                self.touch.record_velocity(event);
            }
            TouchAction::Up | TouchAction::Cancel => {
                if !self.touch.is_current(event) {
                    trace!(down_time = event.down_time, "Stale release");
                    return response;
                }
                self.touch.track(event);
                requests.push(BubbleRequest::StopTracking);
                self.set_scale(1.0, requests);
                if self.touch.is_move_accepted() {
                    self.touch.record_velocity(event);
                    self.move_to_edge(true, now, requests);
                } else {
                    requests.push(BubbleRequest::PerformClick);
                }
                self.touch.velocity.clear();
            }
        }
        response.outcome = TouchOutcome::Handled;
        response
    }

    /// Shows or hides the bubble. Hiding mid-drag parks it on its edge
    /// without animation.
    pub fn set_visible(&mut self, visible: bool) -> Vec<BubbleRequest> {
        let mut requests = Vec::new();
        if !visible {
            requests.push(BubbleRequest::CancelLongPress);
            self.set_scale(1.0, &mut requests);
            if self.touch.is_move_accepted() {
                self.move_to_edge(false, 0, &mut requests);
            }
            requests.push(BubbleRequest::StopTracking);
        }
        if self.visible != visible {
            self.visible = visible;
            requests.push(BubbleRequest::SetVisible(visible));
        }
        requests
    }

    /// Drag lock. A bubble that has not been measured stays locked.
    pub fn set_draggable(&mut self, draggable: bool) { self.draggable = draggable && self.measured; }

    pub fn set_normal(&mut self) {
        self.tracking.set_state(WidgetState::Normal);
        self.sync_touch_target();
    }

    /// Hands the bubble to the trash icon centered at `(center_x, center_y)`.
    pub fn set_intersecting(&mut self, center_x: f32, center_y: f32) {
        self.tracking.set_state(WidgetState::Intersecting);
        self.tracking.capture_x = center_x;
        self.tracking.capture_y = center_y;
    }

    pub fn set_finishing(&mut self) -> Vec<BubbleRequest> {
        self.tracking.set_state(WidgetState::Finishing);
        let mut requests = Vec::new();
        self.cancel_edge_animation(&mut requests);
        requests.extend(self.set_visible(false));
        requests
    }

    /// Advances the tracking animation one frame. `None` stops the scheduler.
    pub fn tracking_frame(&mut self, first: bool, now: Millis) -> Option<Point> {
        let next = self.tracking.step(
            first,
            now,
            self.position,
            self.size,
            &self.move_limit,
            self.tuning.capture_duration,
        )?;
        self.position = next;
        Some(next)
    }

    /// Advances the edge animation one frame. The flag reports the run is
    /// over.
    pub fn edge_frame(&mut self, now: Millis) -> Option<(Point, bool)> {
        let run = self.edge_run?;
        let (x, finished) = run.sample(now);
        self.position.x = x;
        if finished {
            self.edge_run = None;
        }
        Some((self.position, finished))
    }

    fn set_scale(&mut self, scale: f32, requests: &mut Vec<BubbleRequest>) {
        self.scale = scale;
        requests.push(BubbleRequest::SetScale(scale));
    }

    fn sync_touch_target(&mut self) {
        self.tracking.touch_x = self.touch.x_by_touch() as f32;
        self.tracking.touch_y = self.y_by_touch() as f32;
    }

    fn cancel_edge_animation(&mut self, requests: &mut Vec<BubbleRequest>) {
        if self.edge_run.take().is_some() {
            trace!("Edge animation cancelled");
        }
        requests.push(BubbleRequest::CancelEdgeAnimation);
    }

    fn move_to_edge(&mut self, animate: bool, now: Millis, requests: &mut Vec<BubbleRequest>) {
        let current_x = self.touch.x_by_touch();
        let current_y = self.y_by_touch();
        let (goal_x, edge, interpolator) = if self.tuning.velocity_snap && animate {
            let velocity_x = self.touch.velocity.x_velocity();
            let (x, edge) = bounds::snap_target_with_velocity(
                current_x,
                self.size.width,
                self.metrics.width,
                velocity_x,
                self.edge,
                &self.position_limit,
            );
            (x, edge, Overshoot::for_velocity(velocity_x))
        } else {
            let (x, edge) = bounds::snap_target_x(
                current_x,
                self.size.width,
                self.metrics.width,
                &self.position_limit,
            );
            (x, edge, Overshoot::new(self.tuning.edge_tension))
        };
        let goal_y = bounds::clamp_y(current_y, &self.position_limit);
        self.edge = edge;

        if animate {
            self.position.y = goal_y;
            self.edge_run = Some(EdgeRun {
                from_x: current_x,
                to_x: goal_x,
                started_at: now,
                duration: self.tuning.edge_duration,
                interpolator,
            });
            debug!(?edge, from = current_x, to = goal_x, y = goal_y, "Snapping to edge");
            requests.push(BubbleRequest::StartEdgeAnimation);
            requests.push(BubbleRequest::MovedToEdge { edge, y: goal_y });
        } else {
            let goal = Point::new(goal_x, goal_y);
            if self.position != goal {
                self.position = goal;
                requests.push(BubbleRequest::MoveTo(goal));
            }
        }
        self.touch.reset_after_snap();
    }
}
