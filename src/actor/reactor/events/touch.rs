use tracing::{trace, warn};

use super::trash::TrashEventHandler;
use crate::actor::reactor::Reactor;
use crate::actor::reactor::collision::CollisionArbiter;
use crate::model::bubble::{BubbleId, TouchOutcome};
use crate::model::touch::{TouchAction, TouchEvent};

pub struct TouchEventHandler;

impl TouchEventHandler {
    pub fn handle_touch(reactor: &mut Reactor, id: BubbleId, event: TouchEvent) {
        let now = reactor.now();
        let Some(bubble) = reactor.bubbles.get_mut(id) else {
            warn!(?id, "Touch for unknown bubble");
            return;
        };
        let response = bubble.on_touch(&event, now);
        reactor.apply_bubble_requests(id, response.requests);
        if response.outcome == TouchOutcome::Ignored {
            return;
        }

        // After a fullscreen change the rest of the gesture is not ours.
        if event.action != TouchAction::Down && !reactor.move_accepted {
            trace!(?id, action = ?event.action, "Coordinator ignoring gesture");
            return;
        }
        if event.action == TouchAction::Down {
            reactor.move_accepted = true;
        }

        CollisionArbiter::on_bubble_touch(reactor, id, event.action);
        if event.action.is_release() {
            reactor.move_accepted = false;
        }
        TrashEventHandler::on_bubble_touch(reactor, event.action);
    }

    /// Clicks the topmost clickable child of `id`, stopping at the first one
    /// that consumes it.
    pub fn perform_click(reactor: &mut Reactor, id: BubbleId) {
        let Some(bubble) = reactor.bubbles.get(id) else {
            return;
        };
        for child in bubble.options().children.iter().rev().filter(|c| c.clickable) {
            if reactor.host.perform_click(id, child.id) {
                trace!(?id, child = ?child.id, "Click consumed");
                return;
            }
        }
        trace!(?id, "Click not consumed");
    }
}
