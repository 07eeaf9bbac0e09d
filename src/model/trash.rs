//! The trash drop target.
//!
//! The icon slides up from below the bottom screen edge while a bubble is
//! being dragged, and grows when a bubble is held over it. Coordinates follow
//! the bubble windows: Y grows upward from the bottom edge.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::common::config::{Shape, TrashSettings};
use crate::layout_engine::easing::Overshoot;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::ScreenMetrics;
use crate::sys::timer::Millis;

const OPEN_TENSION: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrashAnimation {
    Open,
    Close,
    /// Hides the icon at once, still reported as a start and an end.
    ForceClose,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrashRun {
    kind: TrashAnimation,
    from: f32,
    to: f32,
    started_at: Millis,
    duration: Millis,
}

#[derive(Debug)]
pub struct TrashTarget {
    icon: Size,
    bottom_margin: i32,
    duration: Millis,
    screen: ScreenMetrics,
    max_scale: f32,
    padding: Size,
    scaled: bool,
    /// 0 is parked below the screen, 1 is fully shown.
    progress: f32,
    run: Option<TrashRun>,
}

impl TrashTarget {
    pub fn new(settings: &TrashSettings, screen: ScreenMetrics) -> Self {
        TrashTarget {
            icon: Size::new(settings.icon_width, settings.icon_height),
            bottom_margin: settings.bottom_margin,
            duration: settings.animation_duration_ms,
            screen,
            max_scale: 1.0,
            padding: Size::ZERO,
            scaled: false,
            progress: 0.0,
            run: None,
        }
    }

    pub fn set_screen(&mut self, screen: ScreenMetrics) { self.screen = screen; }

    /// Sizes the action icon so a bubble of `bubble` size and `shape` fits
    /// inside it when scaled up, and pads the hit rectangle to match.
    pub fn calc_action_icon_padding(&mut self, bubble: Size, shape: Shape) {
        let coefficient = shape.coefficient();
        let width_scale = bubble.width as f32 / self.icon.width as f32 * coefficient;
        let height_scale = bubble.height as f32 / self.icon.height as f32 * coefficient;
        self.max_scale = width_scale.max(height_scale);
        let pad = |base: i32| {
            let grown = base as f32 * self.max_scale - base as f32;
            ((grown / 2.0).ceil() as i32).max(0)
        };
        self.padding = Size::new(pad(self.icon.width), pad(self.icon.height));
        trace!(max_scale = self.max_scale, padding = ?self.padding, "Trash icon sized");
    }

    pub fn max_scale(&self) -> f32 { self.max_scale }

    pub fn padding(&self) -> Size { self.padding }

    pub fn progress(&self) -> f32 { self.progress }

    pub fn is_shown(&self) -> bool { self.progress > 0.0 }

    pub fn is_scaled(&self) -> bool { self.scaled }

    pub fn scale(&self) -> f32 { if self.scaled { self.max_scale } else { 1.0 } }

    /// Returns whether the scale changed.
    pub fn set_scaled(&mut self, scaled: bool) -> bool {
        let changed = self.scaled != scaled;
        self.scaled = scaled;
        changed
    }

    pub fn is_animating(&self, kind: TrashAnimation) -> bool {
        self.run.is_some_and(|run| run.kind == kind)
    }

    pub fn animation(&self) -> Option<TrashAnimation> { self.run.map(|run| run.kind) }

    /// Center of the icon in window coordinates.
    pub fn icon_center(&self) -> (f32, f32) {
        let half = self.icon.height as f32 / 2.0;
        let shown = (self.bottom_margin as f32) + half;
        let hidden = -half - self.padding.height as f32;
        (
            self.screen.width as f32 / 2.0,
            hidden + (shown - hidden) * self.progress,
        )
    }

    /// Hit rectangle used for collision: the unscaled icon plus its padding.
    pub fn window_drawing_rect(&self) -> Rect {
        let (cx, cy) = self.icon_center();
        let half_w = self.icon.width / 2 + self.padding.width;
        let half_h = self.icon.height / 2 + self.padding.height;
        let (cx, cy) = (cx as i32, cy as i32);
        Rect::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }

    pub fn window_origin(&self) -> Point {
        let rect = self.window_drawing_rect();
        Point::new(rect.left, rect.top)
    }

    /// Starts `kind`, replacing any running animation. Returns `false` when
    /// there was nothing to do.
    pub fn start(&mut self, kind: TrashAnimation, now: Millis) -> bool {
        let (to, duration) = match kind {
            TrashAnimation::Open => (1.0, self.duration),
            TrashAnimation::Close => (0.0, self.duration),
            TrashAnimation::ForceClose => (0.0, 0),
        };
        let settled = self.run.map_or(self.progress, |run| run.to);
        if kind != TrashAnimation::ForceClose && settled == to {
            return false;
        }
        self.run = Some(TrashRun {
            kind,
            from: self.progress,
            to,
            started_at: now,
            duration,
        });
        true
    }

    /// Advances the running animation. Returns the animation that just
    /// finished, if any.
    pub fn frame(&mut self, now: Millis) -> Option<TrashAnimation> {
        let run = self.run?;
        let t = if run.duration == 0 {
            1.0
        } else {
            (now.saturating_sub(run.started_at) as f32 / run.duration as f32).min(1.0)
        };
        let eased = match run.kind {
            TrashAnimation::Open => Overshoot::new(OPEN_TENSION).interpolate(t),
            TrashAnimation::Close | TrashAnimation::ForceClose => t,
        };
        self.progress = run.from + (run.to - run.from) * eased;
        if t < 1.0 {
            return None;
        }
        self.progress = run.to;
        self.run = None;
        Some(run.kind)
    }
}
