use tracing::{debug, info};

use crate::actor::reactor::Reactor;
use crate::actor::reactor::animation::{AnimationScheduler, Message};
use crate::model::bubble::WidgetState;
use crate::model::touch::TouchAction;
use crate::model::trash::TrashAnimation;
use crate::sys::window::WindowId;

pub struct TrashEventHandler;

impl TrashEventHandler {
    /// Shows the trash while a bubble is held or dragged and hides it on
    /// release.
    pub fn on_bubble_touch(reactor: &mut Reactor, action: TouchAction) {
        Self::cancel_pending_open(reactor);
        match action {
            TouchAction::Down => {
                let due = reactor.now() + reactor.config.trash.open_delay_ms;
                reactor.run_loop.post_at(due, Message::TrashOpen);
            }
            TouchAction::Move => Self::start(reactor, TrashAnimation::Open),
            TouchAction::Up | TouchAction::Cancel => {
                Self::start(reactor, TrashAnimation::Close);
                // Nothing was shown, so no close will finish to collect the
                // dropped bubble.
                if reactor.trash.animation().is_none() {
                    Self::collect_finished(reactor);
                }
            }
        }
    }

    pub fn on_open_delay_elapsed(reactor: &mut Reactor) { Self::start(reactor, TrashAnimation::Open); }

    /// Hides the trash at once.
    pub fn dismiss(reactor: &mut Reactor) {
        Self::cancel_pending_open(reactor);
        Self::start(reactor, TrashAnimation::ForceClose);
    }

    pub fn on_frame(reactor: &mut Reactor) {
        if let Some(kind) = AnimationScheduler::on_trash_frame(reactor) {
            Self::on_animation_end(reactor, kind);
        }
    }

    fn start(reactor: &mut Reactor, kind: TrashAnimation) {
        if !AnimationScheduler::start_trash(reactor, kind) {
            return;
        }
        debug!(?kind, "Trash animation started");
        match kind {
            TrashAnimation::Open => reactor.host.set_visible(WindowId::Trash, true),
            TrashAnimation::Close | TrashAnimation::ForceClose => {
                for bubble in reactor.bubbles.values_mut() {
                    bubble.set_draggable(false);
                }
            }
        }
    }

    fn on_animation_end(reactor: &mut Reactor, kind: TrashAnimation) {
        debug!(?kind, "Trash animation ended");
        if kind != TrashAnimation::Open {
            reactor.host.set_visible(WindowId::Trash, false);
        }
        Self::collect_finished(reactor);
        for bubble in reactor.bubbles.values_mut() {
            bubble.set_draggable(true);
        }
    }

    fn collect_finished(reactor: &mut Reactor) {
        let Some(target) = reactor.target else {
            return;
        };
        if reactor.bubbles.get(target).is_some_and(|b| b.state() == WidgetState::Finishing) {
            info!(?target, "Removing trashed bubble");
            reactor.detach_bubble(target);
        }
    }

    fn cancel_pending_open(reactor: &mut Reactor) {
        reactor.run_loop.remove_where(|m| *m == Message::TrashOpen);
    }
}
