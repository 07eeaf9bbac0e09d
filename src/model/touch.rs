use serde::{Deserialize, Serialize};

use super::velocity::VelocityTracker;
use crate::sys::timer::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

impl TouchAction {
    pub fn is_release(self) -> bool { matches!(self, TouchAction::Up | TouchAction::Cancel) }
}

/// One touch sample delivered to a bubble.
///
/// `raw_*` are screen coordinates with Y growing downward from the top edge,
/// as touch panels report them. `local_*` are relative to the bubble's own
/// top-left corner. `down_time` identifies the gesture the sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub raw_x: f32,
    pub raw_y: f32,
    pub local_x: f32,
    pub local_y: f32,
    pub down_time: Millis,
    pub event_time: Millis,
}

impl TouchEvent {
    pub fn new(action: TouchAction, raw_x: f32, raw_y: f32, down_time: Millis, event_time: Millis) -> Self {
        TouchEvent {
            action,
            raw_x,
            raw_y,
            local_x: 0.0,
            local_y: 0.0,
            down_time,
            event_time,
        }
    }

    pub fn with_local(mut self, local_x: f32, local_y: f32) -> Self {
        self.local_x = local_x;
        self.local_y = local_y;
        self
    }
}

/// Finger state for the gesture currently owning a bubble.
#[derive(Debug, Clone, Default)]
pub struct TouchSample {
    pub down_x: f32,
    pub down_y: f32,
    pub screen_x: f32,
    pub screen_y: f32,
    pub local_x: f32,
    pub local_y: f32,
    down_time: Option<Millis>,
    move_accepted: bool,
    pub velocity: VelocityTracker,
}

impl TouchSample {
    /// Caches the latest finger position. Stale events never get here.
    pub fn track(&mut self, event: &TouchEvent) {
        self.screen_x = event.raw_x;
        self.screen_y = event.raw_y;
    }

    pub fn begin(&mut self, event: &TouchEvent) {
        self.down_x = self.screen_x;
        self.down_y = self.screen_y;
        self.local_x = event.local_x;
        self.local_y = event.local_y;
        self.move_accepted = false;
        self.velocity.clear();
        self.velocity.add_movement(event.event_time, event.raw_x, event.raw_y);
        self.down_time = Some(event.down_time);
    }

    /// Whether `event` belongs to the gesture that began with the last DOWN.
    pub fn is_current(&self, event: &TouchEvent) -> bool { self.down_time == Some(event.down_time) }

    pub fn down_time(&self) -> Option<Millis> { self.down_time }

    pub fn is_move_accepted(&self) -> bool { self.move_accepted }

    /// Accepts the gesture as a drag once the finger has travelled further
    /// than `threshold_px` on either axis. Returns the accepted state.
    pub fn try_accept(&mut self, threshold_px: f32) -> bool {
        if !self.move_accepted
            && (self.screen_x - self.down_x).abs() <= threshold_px
            && (self.screen_y - self.down_y).abs() <= threshold_px
        {
            return false;
        }
        self.move_accepted = true;
        true
    }

    pub fn record_velocity(&mut self, event: &TouchEvent) {
        self.velocity.add_movement(event.event_time, event.raw_x, event.raw_y);
        self.velocity.compute_current_velocity(1000);
    }

    /// Bubble X implied by the finger position.
    pub fn x_by_touch(&self) -> i32 { (self.screen_x - self.local_x) as i32 }

    /// Bubble Y implied by the finger position, converted to bottom-origin
    /// overlay coordinates.
    pub fn y_by_touch(&self, screen_height: i32, widget_height: i32) -> i32 {
        (screen_height as f32 - (self.screen_y - self.local_y + widget_height as f32)) as i32
    }

    /// Forgets the drag once the bubble has been sent to an edge.
    pub fn reset_after_snap(&mut self) {
        self.local_x = 0.0;
        self.local_y = 0.0;
        self.down_x = 0.0;
        self.down_y = 0.0;
        self.move_accepted = false;
    }
}
