//! Frame scheduling for bubble and trash animations.
//!
//! Nothing here sleeps. Every animation advances by handling one
//! [`Message`] and, if it is not finished, posting the next one a refresh
//! interval later on the reactor's run loop.

use tracing::trace;

use super::Reactor;
use crate::model::bubble::BubbleId;
use crate::model::trash::TrashAnimation;
use crate::sys::window::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Moves a bubble toward its finger or its capture point.
    TrackingFrame { bubble: BubbleId, first: bool },
    EdgeFrame(BubbleId),
    /// The long-press delay before the trash appears has elapsed.
    TrashOpen,
    TrashFrame,
}

impl Message {
    fn is_tracking_of(&self, id: BubbleId) -> bool {
        matches!(self, Message::TrackingFrame { bubble, .. } if *bubble == id)
    }

    fn is_edge_of(&self, id: BubbleId) -> bool { matches!(self, Message::EdgeFrame(b) if *b == id) }
}

pub struct AnimationScheduler;

impl AnimationScheduler {
    /// Supersedes any tracking run of `id` with a fresh one starting now.
    pub fn start_tracking(reactor: &mut Reactor, id: BubbleId) {
        Self::stop_tracking(reactor, id);
        let now = reactor.now();
        reactor.run_loop.post_at(now, Message::TrackingFrame { bubble: id, first: true });
    }

    pub fn stop_tracking(reactor: &mut Reactor, id: BubbleId) {
        reactor.run_loop.remove_where(|m| m.is_tracking_of(id));
    }

    pub fn on_tracking_frame(reactor: &mut Reactor, id: BubbleId, first: bool) {
        let now = reactor.now();
        let Some(bubble) = reactor.bubbles.get_mut(id) else {
            trace!(?id, "Bubble gone; tracking stops");
            return;
        };
        let Some(position) = bubble.tracking_frame(first, now) else {
            trace!(?id, "Tracking finished");
            return;
        };
        reactor.host.update_window(WindowId::Bubble(id), position);
        let next = now + reactor.refresh_interval();
        reactor.run_loop.post_at(next, Message::TrackingFrame { bubble: id, first: false });
    }

    pub fn start_edge(reactor: &mut Reactor, id: BubbleId) {
        Self::cancel_edge(reactor, id);
        let now = reactor.now();
        reactor.run_loop.post_at(now, Message::EdgeFrame(id));
    }

    pub fn cancel_edge(reactor: &mut Reactor, id: BubbleId) {
        reactor.run_loop.remove_where(|m| m.is_edge_of(id));
    }

    pub fn on_edge_frame(reactor: &mut Reactor, id: BubbleId) {
        let now = reactor.now();
        let Some(bubble) = reactor.bubbles.get_mut(id) else {
            trace!(?id, "Bubble gone; edge animation stops");
            return;
        };
        let Some((position, finished)) = bubble.edge_frame(now) else {
            return;
        };
        reactor.host.update_window(WindowId::Bubble(id), position);
        if !finished {
            let next = now + reactor.refresh_interval();
            reactor.run_loop.post_at(next, Message::EdgeFrame(id));
        }
    }

    /// Returns whether an animation actually started.
    pub fn start_trash(reactor: &mut Reactor, kind: TrashAnimation) -> bool {
        let now = reactor.now();
        if !reactor.trash.start(kind, now) {
            return false;
        }
        reactor.run_loop.remove_where(|m| *m == Message::TrashFrame);
        reactor.run_loop.post_at(now, Message::TrashFrame);
        true
    }

    /// Returns the trash animation that just ended, if any.
    pub fn on_trash_frame(reactor: &mut Reactor) -> Option<TrashAnimation> {
        let now = reactor.now();
        let finished = reactor.trash.frame(now);
        reactor.host.update_window(WindowId::Trash, reactor.trash.window_origin());
        if finished.is_none() && reactor.trash.animation().is_some() {
            let next = now + reactor.refresh_interval();
            reactor.run_loop.post_at(next, Message::TrashFrame);
        }
        finished
    }
}
