use serde::{Deserialize, Serialize};

use super::geometry::Point;
use crate::model::bubble::{BubbleId, ChildId};

/// Every overlay surface the reactor attaches to the window host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowId {
    Bubble(BubbleId),
    Trash,
    /// Zero-size window whose only purpose is reporting fullscreen changes.
    FullscreenObserver,
}

/// The platform window manager, as seen by the interaction core.
///
/// Positions are in overlay coordinates (see [`Point`]). Calls are made from
/// the reactor thread only.
pub trait OverlayHost {
    fn add_window(&mut self, window: WindowId, position: Point);

    /// Moves an attached window. Called once per animation tick while a bubble
    /// is being tracked.
    fn update_window(&mut self, window: WindowId, position: Point);

    fn remove_window(&mut self, window: WindowId);

    fn set_scale(&mut self, window: WindowId, scale: f32);

    fn set_visible(&mut self, window: WindowId, visible: bool);

    /// Delivers a click to a child of a bubble. Returns whether the child
    /// consumed it.
    fn perform_click(&mut self, bubble: BubbleId, child: ChildId) -> bool;

    fn cancel_long_press(&mut self, _window: WindowId) {}
}
